//! Axis aligned edge extraction.

use kurbo::Vec2;

use crate::{
    geometry::{self, across, along},
    hint::Orientation,
    outline::{Contour, GlyphOutline, Segment},
};

/// Distance across the axis within which a round edge extends from its
/// extremum.
const ROUND_BAND: f64 = 4.0;

/// Parameter step used when walking a curve away from an extremum.
const WALK_STEP: f64 = 1.0 / 64.0;

/// Edges closer than this are merged when collinear.
const MERGE_DISTANCE: f64 = 1.0;

/// Direction of travel along the edge axis.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum Travel {
    /// Toward increasing coordinates (up or right).
    Forward,
    /// Toward decreasing coordinates (down or left).
    Backward,
}

impl Travel {
    fn from_delta(delta: f64) -> Option<Self> {
        if delta > 0.0 {
            Some(Self::Forward)
        } else if delta < 0.0 {
            Some(Self::Backward)
        } else {
            None
        }
    }
}

/// A straight or round piece of contour running along an axis.
#[derive(Clone, PartialEq, Debug)]
pub(crate) struct Edge {
    pub contour: usize,
    /// Coordinate across the axis: x for vertical edges, y for horizontal.
    pub position: f64,
    /// Lower bound of the extent along the axis.
    pub start: f64,
    /// Upper bound of the extent along the axis.
    pub end: f64,
    pub travel: Travel,
    /// Deviation from the axis in degrees.
    pub deviation: f64,
    /// Variation of the position along the edge.
    pub spread: f64,
    pub round: bool,
}

impl Edge {
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Length over which the two edges face each other.
    pub fn overlap(&self, other: &Edge) -> f64 {
        self.end.min(other.end) - self.start.max(other.start)
    }

    fn straight(
        contour: usize,
        from: kurbo::Point,
        to: kurbo::Point,
        orientation: Orientation,
        deviation: f64,
    ) -> Option<Self> {
        let travel = Travel::from_delta(along(to, orientation) - along(from, orientation))?;
        let (a0, a1) = (along(from, orientation), along(to, orientation));
        let (c0, c1) = (across(from, orientation), across(to, orientation));
        Some(Self {
            contour,
            position: (c0 + c1) * 0.5,
            start: a0.min(a1),
            end: a0.max(a1),
            travel,
            deviation,
            spread: (c1 - c0).abs(),
            round: false,
        })
    }

    fn try_merge(&mut self, other: &Edge) -> bool {
        if self.contour != other.contour
            || self.travel != other.travel
            || (self.position - other.position).abs() > MERGE_DISTANCE
            || self.overlap(other) < -MERGE_DISTANCE
        {
            return false;
        }
        let (len_a, len_b) = (self.length(), other.length());
        let total = len_a + len_b;
        let lo = (self.position - self.spread * 0.5).min(other.position - other.spread * 0.5);
        let hi = (self.position + self.spread * 0.5).max(other.position + other.spread * 0.5);
        if total > 0.0 {
            self.position = (self.position * len_a + other.position * len_b) / total;
        }
        self.start = self.start.min(other.start);
        self.end = self.end.max(other.end);
        self.deviation = self.deviation.max(other.deviation);
        self.spread = hi - lo;
        self.round = self.round && other.round;
        true
    }
}

/// Extracts the edges of all contours running along the given axis.
///
/// Vertical orientation yields edges that bound vertical stems.
pub(crate) fn extract(
    outline: &GlyphOutline,
    orientation: Orientation,
    angle_tolerance: f64,
) -> Vec<Edge> {
    let mut edges = Vec::new();
    for (ix, contour) in outline.contours().iter().enumerate() {
        edges.extend(merge(contour_edges(
            ix,
            contour,
            orientation,
            angle_tolerance,
        )));
    }
    edges
}

fn contour_edges(
    contour_ix: usize,
    contour: &Contour,
    orientation: Orientation,
    angle_tolerance: f64,
) -> Vec<Edge> {
    let segments = contour.segments();
    let mut edges = Vec::new();
    for (ix, segment) in segments.iter().enumerate() {
        let from = geometry::to_kurbo(segment.from());
        let to = geometry::to_kurbo(segment.to());
        let chord_deviation = geometry::axis_deviation(to - from, orientation);
        match segment {
            Segment::Line { .. } => {
                if chord_deviation <= angle_tolerance {
                    edges.extend(Edge::straight(
                        contour_ix,
                        from,
                        to,
                        orientation,
                        chord_deviation,
                    ));
                }
            }
            Segment::Curve { c0, c1, .. } => {
                if chord_deviation <= angle_tolerance
                    && is_flat(
                        from,
                        to,
                        geometry::to_kurbo(*c0),
                        geometry::to_kurbo(*c1),
                        angle_tolerance,
                    )
                {
                    edges.extend(Edge::straight(
                        contour_ix,
                        from,
                        to,
                        orientation,
                        chord_deviation,
                    ));
                    continue;
                }
                edges.extend(curve_extrema(contour_ix, segment, orientation));
            }
        }
        // smooth joint between two curves at an extremum
        let prev = &segments[(ix + segments.len() - 1) % segments.len()];
        if prev.is_curve() && segment.is_curve() {
            edges.extend(joint_edge(
                contour_ix,
                prev,
                segment,
                orientation,
                angle_tolerance,
            ));
        }
    }
    edges
}

/// Returns true if both control points lie close enough to the chord for the
/// curve to be treated as a straight line.
fn is_flat(
    from: kurbo::Point,
    to: kurbo::Point,
    c0: kurbo::Point,
    c1: kurbo::Point,
    angle_tolerance: f64,
) -> bool {
    let limit = ((to - from).hypot() * angle_tolerance.to_radians().sin()).max(1.0);
    geometry::max_distance_from_line([c0, c1], from, to) <= limit
}

/// Round edges at interior extrema of a curve across the axis.
fn curve_extrema(contour: usize, segment: &Segment, orientation: Orientation) -> Vec<Edge> {
    let Segment::Curve { from, c0, c1, to } = *segment else {
        return Vec::new();
    };
    let [p0, p1, p2, p3] = [from, c0, c1, to].map(|p| across(geometry::to_kurbo(p), orientation));
    geometry::cubic_extrema(p0, p1, p2, p3)
        .into_iter()
        .flatten()
        .filter_map(|t| {
            let travel = travel_at(segment, t, orientation)?;
            let position = across(segment.eval(t), orientation);
            let lo = walk(segment, t, -1.0, position, orientation);
            let hi = walk(segment, t, 1.0, position, orientation);
            Some(Edge {
                contour,
                position,
                start: lo.min(hi),
                end: lo.max(hi),
                travel,
                deviation: 0.0,
                spread: 0.0,
                round: true,
            })
        })
        .collect()
}

/// Round edge where two curves meet with tangents along the axis.
fn joint_edge(
    contour: usize,
    prev: &Segment,
    next: &Segment,
    orientation: Orientation,
    angle_tolerance: f64,
) -> Option<Edge> {
    let incoming = prev.end_tangent();
    let outgoing = next.start_tangent();
    let deviation = geometry::axis_deviation(incoming, orientation)
        .max(geometry::axis_deviation(outgoing, orientation));
    if deviation > angle_tolerance {
        return None;
    }
    let travel = Travel::from_delta(along_vec(incoming, orientation))?;
    if Travel::from_delta(along_vec(outgoing, orientation)) != Some(travel) {
        return None;
    }
    let point = geometry::to_kurbo(next.from());
    let position = across(point, orientation);
    let lo = walk(prev, 1.0, -1.0, position, orientation);
    let hi = walk(next, 0.0, 1.0, position, orientation);
    Some(Edge {
        contour,
        position,
        start: lo.min(hi),
        end: lo.max(hi),
        travel,
        deviation,
        spread: 0.0,
        round: true,
    })
}

fn along_vec(vector: Vec2, orientation: Orientation) -> f64 {
    match orientation {
        Orientation::Vertical => vector.y,
        Orientation::Horizontal => vector.x,
    }
}

fn travel_at(segment: &Segment, t: f64, orientation: Orientation) -> Option<Travel> {
    let before = segment.eval((t - WALK_STEP).max(0.0));
    let after = segment.eval((t + WALK_STEP).min(1.0));
    Travel::from_delta(along(after, orientation) - along(before, orientation))
}

/// Walks from `t` in `direction` while the curve stays within the round
/// band and returns the along-axis coordinate of the last point inside it.
fn walk(segment: &Segment, t: f64, direction: f64, position: f64, orientation: Orientation) -> f64 {
    let mut last = along(segment.eval(t), orientation);
    let mut t = t;
    loop {
        t += direction * WALK_STEP;
        if !(0.0..=1.0).contains(&t) {
            return last;
        }
        let point = segment.eval(t);
        if (across(point, orientation) - position).abs() > ROUND_BAND {
            return last;
        }
        last = along(point, orientation);
    }
}

/// Merges collinear edges of a contour that touch or overlap.
fn merge(mut edges: Vec<Edge>) -> Vec<Edge> {
    let mut merged: Vec<Edge> = Vec::with_capacity(edges.len());
    edges.sort_by(|a, b| a.position.total_cmp(&b.position).then(a.start.total_cmp(&b.start)));
    for edge in edges {
        if let Some(existing) = merged.iter_mut().rev().find(|e| e.travel == edge.travel) {
            if existing.try_merge(&edge) {
                continue;
            }
        }
        merged.push(edge);
    }
    merged
}
