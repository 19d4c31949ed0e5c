//! Flex candidates.

use font_types::Fixed;

use super::{CandidateFeature, FeatureKind};
use crate::{
    geometry::{self, across},
    hint::{FlexPair, Orientation},
    outline::GlyphOutline,
};

/// Smallest displacement of the joint from the chord for a pair of curves
/// to be a flex.
const MIN_DEPTH: f64 = 0.5;

/// Maximum difference across the axis between the outer ends of the pair.
const END_ALIGNMENT: f64 = 1.0;

/// Finds pairs of consecutive curves that form a shallow bump along an
/// axis.
///
/// The tangents at both outer ends and at the joint must lie within the
/// angle tolerance of the axis, the outer ends must be aligned and the
/// joint must be off the chord.
pub(super) fn find(outline: &GlyphOutline, angle_tolerance: f64) -> Vec<CandidateFeature> {
    let mut features = Vec::new();
    for (contour_ix, contour) in outline.contours().iter().enumerate() {
        let segments = contour.segments();
        if segments.len() < 2 {
            continue;
        }
        for (ix, first) in segments.iter().enumerate() {
            let second = &segments[contour.next_index(ix)];
            if !first.is_curve() || !second.is_curve() {
                continue;
            }
            let start = geometry::to_kurbo(first.from());
            let joint = geometry::to_kurbo(first.to());
            let end = geometry::to_kurbo(second.to());
            let chord = end - start;
            let Some(orientation) = Orientation::ALL
                .into_iter()
                .find(|o| geometry::axis_deviation(chord, *o) <= angle_tolerance)
            else {
                continue;
            };
            // a horizontal chord makes a bump in y which is controlled by a
            // horizontal hint
            if (across(start, orientation) - across(end, orientation)).abs() > END_ALIGNMENT {
                continue;
            }
            let tangents = [
                first.start_tangent(),
                first.end_tangent(),
                second.start_tangent(),
                second.end_tangent(),
            ];
            if tangents
                .iter()
                .any(|t| geometry::axis_deviation(*t, orientation) > angle_tolerance)
            {
                continue;
            }
            let depth = geometry::distance_to_line(joint, start, end);
            if depth < MIN_DEPTH {
                continue;
            }
            let chord_position = across(start, orientation);
            let joint_position = across(joint, orientation);
            features.push(CandidateFeature {
                orientation,
                position: Fixed::from_f64(chord_position.min(joint_position)),
                width: Fixed::from_f64(depth),
                kind: FeatureKind::Flex(FlexPair {
                    contour: contour_ix,
                    segment: ix,
                }),
            });
        }
    }
    features
}
