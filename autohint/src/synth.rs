//! Turning candidate features into hints.

use font_types::Fixed;

use crate::{
    config::HintConfig,
    detect::{AnchorSide, CandidateFeature, FeatureKind, StemBounds},
    error::ValidationError,
    fontinfo::FontMetrics,
    geometry,
    hint::{self, FlexPair, Hint, HintIndex, Orientation},
    outline::{GlyphOutline, FLATTEN_TOLERANCE},
};

/// Score multiplier for stems whose width matches a declared stem width.
const TABLE_MATCH_BONUS: f64 = 1.5;

/// Score multiplier for stems with a round edge.
const ROUND_PENALTY: f64 = 0.9;

/// An extreme of an outer contour used to place alignment zones.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneAnchor {
    pub position: Fixed,
    /// True for the top of a contour, false for its bottom.
    pub top: bool,
    pub round: bool,
}

/// Hints for a single glyph before cross-glyph merging.
#[derive(Clone, PartialEq, Debug)]
pub struct GlyphHints {
    /// Hints in canonical order.
    pub hints: Vec<Hint>,
    /// Top and bottom extremes used by the zone pass.
    pub anchors: Vec<ZoneAnchor>,
    /// Candidates that were dropped and why.
    pub rejected: Vec<ValidationError>,
}

/// Builds the hints for a glyph from its detected features.
///
/// Rejections never fail the glyph: they are logged at trace level and
/// returned alongside the hints.
pub fn synthesize(
    outline: &GlyphOutline,
    features: &[CandidateFeature],
    config: &HintConfig,
    metrics: &FontMetrics,
) -> GlyphHints {
    let mut rejected = Vec::new();
    let mut hints = Vec::new();
    for orientation in Orientation::ALL {
        let stems = score_stems(features, orientation, config, metrics, &mut rejected);
        let mut accepted = resolve_conflicts(stems, &mut rejected);
        if config.allows_counters(outline.name(), orientation) {
            link_counters(&mut accepted, config.counter_tolerance);
            // links are relative to `accepted`, shift them into `hints`
            let base = hints.len();
            for hint in accepted.iter_mut() {
                if let Some(link) = hint.counter.as_mut() {
                    link.0 += base;
                }
            }
        }
        hints.extend(accepted);
    }
    if config.flex_hints {
        for feature in features {
            if let FeatureKind::Flex(pair) = feature.kind {
                match flex_hint(outline, feature, pair, config.flex_straightness) {
                    Ok(hint) => hints.push(hint),
                    Err(error) => rejected.push(error),
                }
            }
        }
    }
    for error in &rejected {
        log::trace!("{}: {error}", outline.name());
    }
    let anchors = features
        .iter()
        .filter_map(|feature| match feature.kind {
            FeatureKind::Anchor { side, round }
                if matches!(side, AnchorSide::Top | AnchorSide::Bottom) =>
            {
                Some(ZoneAnchor {
                    position: feature.position,
                    top: side == AnchorSide::Top,
                    round,
                })
            }
            _ => None,
        })
        .collect();
    GlyphHints {
        hints: hint::sort_canonical(hints),
        anchors,
        rejected,
    }
}

fn score_stems(
    features: &[CandidateFeature],
    orientation: Orientation,
    config: &HintConfig,
    metrics: &FontMetrics,
    rejected: &mut Vec<ValidationError>,
) -> Vec<Hint> {
    let bounds = StemBounds::new(config, metrics, orientation);
    let declared: Vec<f64> = metrics
        .stem_widths(orientation)
        .map(Fixed::to_f64)
        .collect();
    let mut stems = Vec::new();
    for feature in features.iter().filter(|f| f.orientation == orientation) {
        let FeatureKind::Stem {
            deviation,
            overlap,
            round,
            ..
        } = feature.kind
        else {
            continue;
        };
        let width = feature.width.to_f64();
        if !bounds.contains(width) {
            rejected.push(ValidationError::WidthOutOfRange {
                orientation,
                width: feature.width,
                min: Fixed::from_f64(bounds.min),
                max: Fixed::from_f64(bounds.max),
            });
            continue;
        }
        let mut score = overlap / (1.0 + deviation);
        if declared
            .iter()
            .any(|w| (w - width).abs() <= config.stem_cluster_tolerance)
        {
            score *= TABLE_MATCH_BONUS;
        }
        if round {
            score *= ROUND_PENALTY;
        }
        let mut hint = Hint::new(orientation, feature.position, feature.width);
        hint.round = round;
        hint.score = score;
        stems.push(hint);
    }
    stems
}

/// Keeps the strongest of every group of overlapping stems.
///
/// The result is sorted by position.
pub(crate) fn resolve_conflicts(
    mut stems: Vec<Hint>,
    rejected: &mut Vec<ValidationError>,
) -> Vec<Hint> {
    stems.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.sort_key().cmp(&b.sort_key()))
    });
    let mut accepted: Vec<Hint> = Vec::with_capacity(stems.len());
    for stem in stems {
        if accepted.iter().any(|other| other.overlaps(&stem)) {
            rejected.push(ValidationError::Conflict {
                orientation: stem.orientation,
                position: stem.position,
                width: stem.width,
            });
            continue;
        }
        accepted.push(stem);
    }
    accepted.sort_by_key(Hint::sort_key);
    accepted
}

/// Links neighboring stems of similar width, left to right.
///
/// Expects stems of a single orientation sorted by position.
fn link_counters(stems: &mut [Hint], tolerance: f64) {
    let mut ix = 0;
    while ix + 1 < stems.len() {
        let (a, b) = (&stems[ix], &stems[ix + 1]);
        if (a.width - b.width).abs().to_f64() <= tolerance {
            stems[ix].counter = Some(HintIndex(ix + 1));
            stems[ix + 1].counter = Some(HintIndex(ix));
            ix += 2;
        } else {
            ix += 1;
        }
    }
}

fn flex_hint(
    outline: &GlyphOutline,
    feature: &CandidateFeature,
    pair: FlexPair,
    straightness: f64,
) -> Result<Hint, ValidationError> {
    let contour = &outline.contours()[pair.contour];
    let first = contour.segments()[pair.segment];
    let second = contour.segments()[contour.next_index(pair.segment)];
    let start = geometry::to_kurbo(first.from());
    let end = geometry::to_kurbo(second.to());
    for (segment_ix, segment) in [(pair.segment, first), (contour.next_index(pair.segment), second)]
    {
        let points = geometry::flatten(&[segment], FLATTEN_TOLERANCE);
        let deviation = geometry::max_distance_from_line(points, start, end);
        if deviation > straightness {
            return Err(ValidationError::FlexNotStraight {
                contour: pair.contour,
                segment: segment_ix,
                deviation,
            });
        }
    }
    Ok(Hint::flex(
        feature.orientation,
        feature.position,
        feature.width,
        pair,
    ))
}
