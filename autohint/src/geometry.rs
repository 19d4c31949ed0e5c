//! Geometric helpers shared by the detection and merging passes.
//!
//! All functions are pure. Coordinates arrive as 16.16 fixed point design
//! units and are converted to `f64` for computation.

use font_types::{BoundingBox, Fixed, Point};
use kurbo::{BezPath, PathEl, Vec2};

use crate::{hint::Orientation, outline::Segment};

/// Converts a fixed point coordinate pair to a float point.
pub fn to_kurbo(point: Point<Fixed>) -> kurbo::Point {
    kurbo::Point::new(point.x.to_f64(), point.y.to_f64())
}

/// Converts a float point to fixed point, rounding to the nearest
/// representable value.
pub fn from_kurbo(point: kurbo::Point) -> Point<Fixed> {
    Point::new(Fixed::from_f64(point.x), Fixed::from_f64(point.y))
}

/// Returns the coordinate of the point along the axis perpendicular to
/// edges of the given orientation.
///
/// Vertical stems are measured in x and horizontal stems in y.
pub fn across(point: kurbo::Point, orientation: Orientation) -> f64 {
    match orientation {
        Orientation::Vertical => point.x,
        Orientation::Horizontal => point.y,
    }
}

/// Returns the coordinate of the point along the edge direction.
pub fn along(point: kurbo::Point, orientation: Orientation) -> f64 {
    match orientation {
        Orientation::Vertical => point.y,
        Orientation::Horizontal => point.x,
    }
}

/// Returns the parameters in `(0, 1)` at which a one dimensional cubic with
/// the given control values has a zero derivative.
pub fn cubic_extrema(p0: f64, p1: f64, p2: f64, p3: f64) -> [Option<f64>; 2] {
    // derivative / 3 = a(1-t)^2 + 2bt(1-t) + ct^2
    let a = p1 - p0;
    let b = p2 - p1;
    let c = p3 - p2;
    let qa = a - 2.0 * b + c;
    let qb = 2.0 * (b - a);
    let qc = a;
    let in_range = |t: f64| (t > 0.0 && t < 1.0).then_some(t);
    const EPSILON: f64 = 1e-12;
    if qa.abs() < EPSILON {
        if qb.abs() < EPSILON {
            return [None, None];
        }
        return [in_range(-qc / qb), None];
    }
    let discriminant = qb * qb - 4.0 * qa * qc;
    if discriminant < 0.0 {
        return [None, None];
    }
    let root = discriminant.sqrt();
    let t0 = (-qb - root) / (2.0 * qa);
    let t1 = (-qb + root) / (2.0 * qa);
    let (t0, t1) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
    match (in_range(t0), in_range(t1)) {
        (None, t) => [t, None],
        (t0, t1) if t0 == t1 => [t0, None],
        (t0, t1) => [t0, t1],
    }
}

/// Evaluates a one dimensional cubic at `t`.
pub fn eval_cubic(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    mt * mt * mt * p0 + 3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t * p3
}

fn extend(bbox: &mut BoundingBox<f64>, point: kurbo::Point) {
    bbox.x_min = bbox.x_min.min(point.x);
    bbox.x_max = bbox.x_max.max(point.x);
    bbox.y_min = bbox.y_min.min(point.y);
    bbox.y_max = bbox.y_max.max(point.y);
}

fn point_bbox(point: kurbo::Point) -> BoundingBox<f64> {
    BoundingBox {
        x_min: point.x,
        y_min: point.y,
        x_max: point.x,
        y_max: point.y,
    }
}

/// Computes the exact bounding box of a segment.
///
/// Curves are bounded by their end points and interior extrema, not by
/// their control points.
pub fn segment_bbox(segment: &Segment) -> BoundingBox<f64> {
    let from = to_kurbo(segment.from());
    let to = to_kurbo(segment.to());
    let mut bbox = point_bbox(from);
    extend(&mut bbox, to);
    if let Segment::Curve { c0, c1, .. } = segment {
        let (c0, c1) = (to_kurbo(*c0), to_kurbo(*c1));
        for t in cubic_extrema(from.x, c0.x, c1.x, to.x).into_iter().flatten() {
            let x = eval_cubic(from.x, c0.x, c1.x, to.x, t);
            bbox.x_min = bbox.x_min.min(x);
            bbox.x_max = bbox.x_max.max(x);
        }
        for t in cubic_extrema(from.y, c0.y, c1.y, to.y).into_iter().flatten() {
            let y = eval_cubic(from.y, c0.y, c1.y, to.y, t);
            bbox.y_min = bbox.y_min.min(y);
            bbox.y_max = bbox.y_max.max(y);
        }
    }
    bbox
}

/// Computes the exact bounding box of a sequence of segments.
///
/// Returns `None` if the sequence is empty.
pub fn segments_bbox<'a>(
    segments: impl IntoIterator<Item = &'a Segment>,
) -> Option<BoundingBox<f64>> {
    segments
        .into_iter()
        .map(segment_bbox)
        .reduce(|mut acc, bbox| {
            extend(&mut acc, kurbo::Point::new(bbox.x_min, bbox.y_min));
            extend(&mut acc, kurbo::Point::new(bbox.x_max, bbox.y_max));
            acc
        })
}

/// Builds a path from a closed contour.
pub fn contour_path(segments: &[Segment]) -> BezPath {
    let mut path = BezPath::new();
    if let Some(first) = segments.first() {
        path.move_to(to_kurbo(first.from()));
    }
    for segment in segments {
        match segment {
            Segment::Line { to, .. } => path.line_to(to_kurbo(*to)),
            Segment::Curve { c0, c1, to, .. } => {
                path.curve_to(to_kurbo(*c0), to_kurbo(*c1), to_kurbo(*to))
            }
        }
    }
    if !segments.is_empty() {
        path.close_path();
    }
    path
}

/// Approximates a closed contour with a polygon whose distance from the
/// true outline is at most `tolerance`.
///
/// The closing point is not repeated.
pub fn flatten(segments: &[Segment], tolerance: f64) -> Vec<kurbo::Point> {
    let mut points = Vec::new();
    kurbo::flatten(&contour_path(segments), tolerance, |el| match el {
        PathEl::MoveTo(p) | PathEl::LineTo(p) => points.push(p),
        _ => {}
    });
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

/// Returns true if `value` lies within `[min - fuzz, max + fuzz]`.
pub fn in_zone(value: Fixed, min: Fixed, max: Fixed, fuzz: Fixed) -> bool {
    value >= min - fuzz && value <= max + fuzz
}

/// Returns the perpendicular distance between two nearly parallel edges.
///
/// The distance is measured from the midpoint of edge `b` to the infinite
/// line through edge `a`. A degenerate `a` falls back to the distance
/// between the midpoints.
pub fn parallel_edge_distance(
    a0: kurbo::Point,
    a1: kurbo::Point,
    b0: kurbo::Point,
    b1: kurbo::Point,
) -> f64 {
    let mid = b0.midpoint(b1);
    distance_to_line(mid, a0, a1)
}

/// Returns the distance from a point to the infinite line through `a` and
/// `b`.
pub fn distance_to_line(point: kurbo::Point, a: kurbo::Point, b: kurbo::Point) -> f64 {
    let dir = b - a;
    let len = dir.hypot();
    if len == 0.0 {
        return (point - a).hypot();
    }
    dir.cross(point - a).abs() / len
}

/// Returns the angle, in degrees within `[0, 90]`, between a vector and the
/// direction of edges with the given orientation.
///
/// A zero length vector has no direction and reports 90 degrees.
pub fn axis_deviation(vector: Vec2, orientation: Orientation) -> f64 {
    if vector.x == 0.0 && vector.y == 0.0 {
        return 90.0;
    }
    let (along, across) = match orientation {
        Orientation::Vertical => (vector.y.abs(), vector.x.abs()),
        Orientation::Horizontal => (vector.x.abs(), vector.y.abs()),
    };
    across.atan2(along).to_degrees()
}

/// Computes the signed area of a polygon.
///
/// The result is positive for counter-clockwise polygons in a y-up
/// coordinate system.
pub fn signed_area(polygon: &[kurbo::Point]) -> f64 {
    let Some(last) = polygon.last() else {
        return 0.0;
    };
    let mut prev = *last;
    let mut area = 0.0;
    for point in polygon {
        area += prev.x * point.y - point.x * prev.y;
        prev = *point;
    }
    area * 0.5
}

/// Returns true if the point is inside the polygon using the even-odd rule.
pub fn point_in_polygon(point: kurbo::Point, polygon: &[kurbo::Point]) -> bool {
    let Some(last) = polygon.last() else {
        return false;
    };
    let mut prev = *last;
    let mut inside = false;
    for current in polygon {
        if (current.y > point.y) != (prev.y > point.y) {
            let x = current.x + (point.y - current.y) * (prev.x - current.x) / (prev.y - current.y);
            if point.x < x {
                inside = !inside;
            }
        }
        prev = *current;
    }
    inside
}

/// Returns the winding number of the polygon around the point.
///
/// Counter-clockwise polygons contribute +1 and clockwise polygons -1.
pub fn winding_number(point: kurbo::Point, polygon: &[kurbo::Point]) -> i32 {
    let Some(last) = polygon.last() else {
        return 0;
    };
    let mut prev = *last;
    let mut winding = 0;
    for current in polygon {
        let side = (*current - prev).cross(point - prev);
        if prev.y <= point.y {
            if current.y > point.y && side > 0.0 {
                winding += 1;
            }
        } else if current.y <= point.y && side < 0.0 {
            winding -= 1;
        }
        prev = *current;
    }
    winding
}

/// Returns the largest distance between the given points and the infinite
/// line through `a` and `b`.
pub fn max_distance_from_line(
    points: impl IntoIterator<Item = kurbo::Point>,
    a: kurbo::Point,
    b: kurbo::Point,
) -> f64 {
    points
        .into_iter()
        .map(|point| distance_to_line(point, a, b))
        .fold(0.0, f64::max)
}
