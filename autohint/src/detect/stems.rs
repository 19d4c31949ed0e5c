//! Pairing edges into stems.

use font_types::Fixed;

use super::{CandidateFeature, Edge, FeatureKind, StemBounds, Travel};
use crate::{hint::Orientation, outline::GlyphOutline};

struct Pair {
    lower: usize,
    upper: usize,
    width: f64,
    deviation: f64,
    variance: f64,
    overlap: f64,
}

/// Pairs opposing edges that enclose ink.
///
/// Each edge belongs to at most one stem. Competing pairs are resolved by
/// preferring the smaller angular deviation, then the smaller width
/// variance, then the narrower stem and finally the lower position.
pub(super) fn pair(
    outline: &GlyphOutline,
    edges: &[Edge],
    orientation: Orientation,
    bounds: &StemBounds,
) -> Vec<CandidateFeature> {
    let (lower_travel, upper_travel) = match orientation {
        // ink is to the left of travel: the left edge runs down
        Orientation::Vertical => (Travel::Backward, Travel::Forward),
        // and the bottom edge runs right
        Orientation::Horizontal => (Travel::Forward, Travel::Backward),
    };
    let mut pairs = Vec::new();
    for (lower_ix, lower) in edges.iter().enumerate() {
        if lower.travel != lower_travel {
            continue;
        }
        for (upper_ix, upper) in edges.iter().enumerate() {
            if upper.travel != upper_travel || upper.position <= lower.position {
                continue;
            }
            let width = upper.position - lower.position;
            if !bounds.contains(width) {
                continue;
            }
            let overlap = lower.overlap(upper);
            if overlap <= 0.0 {
                continue;
            }
            let middle = lower.start.max(upper.start) + overlap * 0.5;
            let sample = match orientation {
                Orientation::Vertical => kurbo::Point::new(lower.position + width * 0.5, middle),
                Orientation::Horizontal => kurbo::Point::new(middle, lower.position + width * 0.5),
            };
            if !outline.contains(sample) {
                continue;
            }
            pairs.push(Pair {
                lower: lower_ix,
                upper: upper_ix,
                width,
                deviation: lower.deviation.max(upper.deviation),
                variance: lower.spread + upper.spread,
                overlap,
            });
        }
    }
    pairs.sort_by(|a, b| {
        a.deviation
            .total_cmp(&b.deviation)
            .then(a.variance.total_cmp(&b.variance))
            .then(a.width.total_cmp(&b.width))
            .then(edges[a.lower].position.total_cmp(&edges[b.lower].position))
            .then(a.lower.cmp(&b.lower))
            .then(a.upper.cmp(&b.upper))
    });
    let mut used = vec![false; edges.len()];
    let mut stems = Vec::new();
    for pair in pairs {
        if used[pair.lower] || used[pair.upper] {
            continue;
        }
        used[pair.lower] = true;
        used[pair.upper] = true;
        let (lower, upper) = (&edges[pair.lower], &edges[pair.upper]);
        stems.push(CandidateFeature {
            orientation,
            position: Fixed::from_f64(lower.position),
            width: Fixed::from_f64(pair.width),
            kind: FeatureKind::Stem {
                deviation: pair.deviation,
                width_variance: pair.variance,
                overlap: pair.overlap,
                round: lower.round || upper.round,
            },
        });
    }
    stems
}
