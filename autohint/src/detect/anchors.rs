//! Zone anchors at the extremes of outer contours.

use font_types::Fixed;

use super::{AnchorSide, CandidateFeature, FeatureKind};
use crate::{geometry, hint::Orientation, outline::GlyphOutline};

const EPSILON: f64 = 1e-6;

struct Extreme {
    value: f64,
    flat: bool,
}

impl Extreme {
    fn update(slot: &mut Option<Extreme>, value: f64, flat: bool, better: fn(f64, f64) -> bool) {
        match slot {
            Some(current) if (current.value - value).abs() <= EPSILON => current.flat |= flat,
            Some(current) if !better(value, current.value) => {}
            _ => *slot = Some(Extreme { value, flat }),
        }
    }
}

/// Records the topmost, bottommost, leftmost and rightmost extreme of every
/// outer contour.
///
/// An anchor is round when no straight segment reaches the extreme.
pub(super) fn find(outline: &GlyphOutline) -> Vec<CandidateFeature> {
    let mut features = Vec::new();
    for contour in outline.contours().iter().filter(|c| c.is_outer()) {
        let mut sides: [Option<Extreme>; 4] = Default::default();
        for segment in contour.segments() {
            let bbox = geometry::segment_bbox(segment);
            let flat = !segment.is_curve();
            let greater = |a: f64, b: f64| a > b;
            let less = |a: f64, b: f64| a < b;
            Extreme::update(&mut sides[0], bbox.y_max, flat, greater);
            Extreme::update(&mut sides[1], bbox.y_min, flat, less);
            Extreme::update(&mut sides[2], bbox.x_min, flat, less);
            Extreme::update(&mut sides[3], bbox.x_max, flat, greater);
        }
        let kinds = [
            (AnchorSide::Top, Orientation::Horizontal),
            (AnchorSide::Bottom, Orientation::Horizontal),
            (AnchorSide::Left, Orientation::Vertical),
            (AnchorSide::Right, Orientation::Vertical),
        ];
        for ((side, orientation), extreme) in kinds.into_iter().zip(sides) {
            let Some(extreme) = extreme else {
                continue;
            };
            features.push(CandidateFeature {
                orientation,
                position: Fixed::from_f64(extreme.value),
                width: Fixed::ZERO,
                kind: FeatureKind::Anchor {
                    side,
                    round: !extreme.flat,
                },
            });
        }
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::{test_helpers::*, Segment};

    fn anchor(features: &[CandidateFeature], side: AnchorSide) -> Vec<(f64, bool)> {
        features
            .iter()
            .filter_map(|f| match f.kind {
                FeatureKind::Anchor { side: s, round } if s == side => {
                    Some((f.position.to_f64(), round))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn flat_and_round_extremes() {
        // flat bottom, round top peaking at y = 575
        let segments = vec![
            Segment::Line {
                from: pt(0, 0),
                to: pt(200, 0),
            },
            Segment::Line {
                from: pt(200, 0),
                to: pt(200, 500),
            },
            Segment::Curve {
                from: pt(200, 500),
                c0: pt(200, 600),
                c1: pt(0, 600),
                to: pt(0, 500),
            },
            Segment::Line {
                from: pt(0, 500),
                to: pt(0, 0),
            },
        ];
        let features = find(&glyph("n", vec![segments]));
        assert_eq!(anchor(&features, AnchorSide::Bottom), [(0.0, false)]);
        assert_eq!(anchor(&features, AnchorSide::Top), [(575.0, true)]);
        assert_eq!(anchor(&features, AnchorSide::Left), [(0.0, false)]);
        assert_eq!(anchor(&features, AnchorSide::Right), [(200.0, false)]);
    }

    #[test]
    fn counters_contribute_nothing() {
        let features = find(&glyph(
            "o",
            vec![rect(0, 0, 300, 300), rect(100, 100, 200, 200)],
        ));
        assert_eq!(features.len(), 4);
    }
}
