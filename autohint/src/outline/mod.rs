//! Validated glyph outlines.
//!
//! A [`GlyphOutline`] is the read-only input of every hinting pass. It is
//! built from raw contours, directly or through [`OutlineBuilder`] or the
//! [bez](bez) reader, and construction fails with a
//! [`MalformedOutlineError`] when a contour is not closed or encloses no
//! area.
//!
//! Contour direction is normalized on construction: contours at an even
//! nesting depth run counter-clockwise and contours at an odd depth run
//! clockwise, so that ink always lies to the left of the direction of
//! travel.

pub mod bez;
mod builder;

pub use builder::OutlineBuilder;

use font_types::{Fixed, Point};
use kurbo::Vec2;

use crate::{error::MalformedOutlineError, geometry};

/// Tolerance used when approximating contours with polygons for fill tests.
pub(crate) const FLATTEN_TOLERANCE: f64 = 0.25;

/// A straight line or cubic Bézier segment of a contour.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Segment {
    Line {
        from: Point<Fixed>,
        to: Point<Fixed>,
    },
    Curve {
        from: Point<Fixed>,
        c0: Point<Fixed>,
        c1: Point<Fixed>,
        to: Point<Fixed>,
    },
}

impl Segment {
    pub fn from(&self) -> Point<Fixed> {
        match self {
            Self::Line { from, .. } | Self::Curve { from, .. } => *from,
        }
    }

    pub fn to(&self) -> Point<Fixed> {
        match self {
            Self::Line { to, .. } | Self::Curve { to, .. } => *to,
        }
    }

    pub fn is_curve(&self) -> bool {
        matches!(self, Self::Curve { .. })
    }

    /// Returns the same segment traversed in the opposite direction.
    pub fn reversed(&self) -> Self {
        match *self {
            Self::Line { from, to } => Self::Line { from: to, to: from },
            Self::Curve { from, c0, c1, to } => Self::Curve {
                from: to,
                c0: c1,
                c1: c0,
                to: from,
            },
        }
    }

    /// Returns true if every point of the segment is the same.
    fn is_degenerate(&self) -> bool {
        match self {
            Self::Line { from, to } => from == to,
            Self::Curve { from, c0, c1, to } => from == c0 && c0 == c1 && c1 == to,
        }
    }

    /// Direction of travel when leaving the start point.
    pub fn start_tangent(&self) -> Vec2 {
        let from = geometry::to_kurbo(self.from());
        match self {
            Self::Line { to, .. } => geometry::to_kurbo(*to) - from,
            Self::Curve { c0, c1, to, .. } => [*c0, *c1, *to]
                .into_iter()
                .map(|p| geometry::to_kurbo(p) - from)
                .find(|v| *v != Vec2::ZERO)
                .unwrap_or(Vec2::ZERO),
        }
    }

    /// Direction of travel when arriving at the end point.
    pub fn end_tangent(&self) -> Vec2 {
        let to = geometry::to_kurbo(self.to());
        match self {
            Self::Line { from, .. } => to - geometry::to_kurbo(*from),
            Self::Curve { from, c0, c1, .. } => [*c1, *c0, *from]
                .into_iter()
                .map(|p| to - geometry::to_kurbo(p))
                .find(|v| *v != Vec2::ZERO)
                .unwrap_or(Vec2::ZERO),
        }
    }

    /// Returns the point on the segment at parameter `t`.
    pub fn eval(&self, t: f64) -> kurbo::Point {
        match self {
            Self::Line { from, to } => geometry::to_kurbo(*from).lerp(geometry::to_kurbo(*to), t),
            Self::Curve { from, c0, c1, to } => {
                let [p0, p1, p2, p3] = [*from, *c0, *c1, *to].map(geometry::to_kurbo);
                kurbo::Point::new(
                    geometry::eval_cubic(p0.x, p1.x, p2.x, p3.x, t),
                    geometry::eval_cubic(p0.y, p1.y, p2.y, p3.y, t),
                )
            }
        }
    }
}

/// A closed sequence of joined segments.
#[derive(Clone, PartialEq, Debug)]
pub struct Contour {
    segments: Vec<Segment>,
    depth: usize,
    polygon: Vec<kurbo::Point>,
}

impl Contour {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of other contours enclosing this one.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns true for contours that are not enclosed by any other
    /// contour.
    pub fn is_outer(&self) -> bool {
        self.depth == 0
    }

    /// Polygonal approximation used for fill tests.
    pub fn polygon(&self) -> &[kurbo::Point] {
        &self.polygon
    }

    /// Returns the segment following the one at `index`, wrapping around.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.segments.len()
    }
}

/// Horizontal metrics of a glyph.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlyphMetrics {
    pub advance_width: Fixed,
    pub left_side_bearing: Fixed,
}

/// A named glyph made of validated, direction-normalized contours.
#[derive(Clone, PartialEq, Debug)]
pub struct GlyphOutline {
    name: String,
    metrics: GlyphMetrics,
    contours: Vec<Contour>,
}

impl GlyphOutline {
    /// Validates and normalizes the given contours.
    ///
    /// Zero length segments are removed and contour direction is fixed by
    /// nesting depth. An empty list of contours is valid and produces a
    /// glyph without ink, such as a space.
    pub fn new(
        name: impl Into<String>,
        metrics: GlyphMetrics,
        contours: Vec<Vec<Segment>>,
    ) -> Result<Self, MalformedOutlineError> {
        let mut validated = Vec::with_capacity(contours.len());
        for (ix, segments) in contours.into_iter().enumerate() {
            validated.push(validate_contour(ix, segments)?);
        }
        let polygons: Vec<_> = validated
            .iter()
            .map(|segments| geometry::flatten(segments, FLATTEN_TOLERANCE))
            .collect();
        let mut contours = Vec::with_capacity(validated.len());
        for (ix, mut segments) in validated.into_iter().enumerate() {
            let sample = geometry::to_kurbo(segments[0].from());
            let depth = polygons
                .iter()
                .enumerate()
                .filter(|(other_ix, other)| {
                    *other_ix != ix && geometry::point_in_polygon(sample, other)
                })
                .count();
            let mut polygon = polygons[ix].clone();
            let counter_clockwise = geometry::signed_area(&polygon) > 0.0;
            if counter_clockwise != (depth % 2 == 0) {
                segments.reverse();
                for segment in segments.iter_mut() {
                    *segment = segment.reversed();
                }
                polygon.reverse();
            }
            contours.push(Contour {
                segments,
                depth,
                polygon,
            });
        }
        Ok(Self {
            name: name.into(),
            metrics,
            contours,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> GlyphMetrics {
        self.metrics
    }

    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Returns true if the point is covered by ink under the nonzero fill
    /// rule.
    pub fn contains(&self, point: kurbo::Point) -> bool {
        self.contours
            .iter()
            .map(|contour| geometry::winding_number(point, &contour.polygon))
            .sum::<i32>()
            != 0
    }
}

fn validate_contour(
    contour: usize,
    segments: Vec<Segment>,
) -> Result<Vec<Segment>, MalformedOutlineError> {
    let mut distinct: Vec<Point<Fixed>> = Vec::new();
    for segment in &segments {
        for point in [segment.from(), segment.to()] {
            if !distinct.contains(&point) {
                distinct.push(point);
            }
        }
    }
    if distinct.len() < 2 {
        return Err(MalformedOutlineError::TooFewPoints {
            contour,
            count: distinct.len(),
        });
    }
    let segments: Vec<_> = segments
        .into_iter()
        .filter(|segment| !segment.is_degenerate())
        .collect();
    // segments are non-empty since at least two distinct points exist
    for (ix, segment) in segments.iter().enumerate() {
        let next = &segments[(ix + 1) % segments.len()];
        if segment.to() != next.from() {
            return Err(MalformedOutlineError::OpenContour { contour });
        }
    }
    let mut on_curve: Vec<Point<Fixed>> = Vec::with_capacity(segments.len());
    for (ix, segment) in segments.iter().enumerate() {
        if on_curve.contains(&segment.from()) {
            return Err(MalformedOutlineError::SelfIntersection { contour, point: ix });
        }
        on_curve.push(segment.from());
    }
    let polygon = geometry::flatten(&segments, FLATTEN_TOLERANCE);
    if geometry::signed_area(&polygon).abs() < f64::EPSILON {
        return Err(MalformedOutlineError::DegenerateContour { contour });
    }
    Ok(segments)
}


#[cfg(test)]
mod tests {
    use super::{test_helpers::*, *};

    #[test]
    fn open_contour() {
        let mut segments = rect(0, 0, 100, 100);
        segments.pop();
        let err = GlyphOutline::new("a", GlyphMetrics::default(), vec![segments]).unwrap_err();
        assert_eq!(err, MalformedOutlineError::OpenContour { contour: 0 });
    }

    #[test]
    fn single_point_contour() {
        let segments = vec![Segment::Line {
            from: pt(10, 10),
            to: pt(10, 10),
        }];
        let err = GlyphOutline::new("dot", GlyphMetrics::default(), vec![segments]).unwrap_err();
        assert_eq!(
            err,
            MalformedOutlineError::TooFewPoints {
                contour: 0,
                count: 1
            }
        );
        let err = GlyphOutline::new("empty", GlyphMetrics::default(), vec![vec![]]).unwrap_err();
        assert!(matches!(
            err,
            MalformedOutlineError::TooFewPoints { count: 0, .. }
        ));
    }

    #[test]
    fn zero_area_contour() {
        let segments = polygon(&[(0, 0), (100, 0)]);
        let err = GlyphOutline::new("line", GlyphMetrics::default(), vec![segments]).unwrap_err();
        assert_eq!(err, MalformedOutlineError::DegenerateContour { contour: 0 });
    }

    #[test]
    fn revisited_point() {
        // figure eight touching at (50, 50)
        let segments = polygon(&[(0, 0), (50, 50), (100, 0), (100, 100), (50, 50), (0, 100)]);
        let err = GlyphOutline::new("eight", GlyphMetrics::default(), vec![segments]).unwrap_err();
        assert_eq!(
            err,
            MalformedOutlineError::SelfIntersection {
                contour: 0,
                point: 4
            }
        );
    }

    #[test]
    fn zero_length_segments_dropped() {
        let mut segments = rect(0, 0, 100, 100);
        segments.insert(
            2,
            Segment::Line {
                from: pt(100, 100),
                to: pt(100, 100),
            },
        );
        let outline = glyph("o", vec![segments]);
        assert_eq!(outline.contours()[0].segments().len(), 4);
    }

    #[test]
    fn winding_normalized_by_depth() {
        // outer drawn clockwise, inner drawn counter-clockwise
        let mut outer = rect(0, 0, 300, 300);
        outer.reverse();
        let outer: Vec<_> = outer.iter().map(Segment::reversed).collect();
        let inner = rect(100, 100, 200, 200);
        let outline = glyph("o", vec![outer, inner]);
        let [outer, inner] = outline.contours() else {
            panic!("expected two contours");
        };
        assert!(outer.is_outer());
        assert_eq!(inner.depth(), 1);
        assert!(geometry::signed_area(outer.polygon()) > 0.0);
        assert!(geometry::signed_area(inner.polygon()) < 0.0);
        // the reversed outer contour must still be joined
        let segments = outer.segments();
        for ix in 0..segments.len() {
            assert_eq!(segments[ix].to(), segments[outer.next_index(ix)].from());
        }
        assert!(outline.contains(kurbo::Point::new(50.0, 50.0)));
        assert!(!outline.contains(kurbo::Point::new(150.0, 150.0)));
    }

    #[test]
    fn tangents_skip_coincident_controls() {
        let curve = Segment::Curve {
            from: pt(0, 0),
            c0: pt(0, 0),
            c1: pt(100, 50),
            to: pt(100, 100),
        };
        assert_eq!(curve.start_tangent(), Vec2::new(100.0, 50.0));
        assert_eq!(curve.end_tangent(), Vec2::new(0.0, 50.0));
        let reversed = curve.reversed();
        assert_eq!(reversed.start_tangent(), Vec2::new(0.0, -50.0));
    }
}
