//! Feature detection on a single glyph.
//!
//! Detection is a pure function of an outline: it extracts axis aligned
//! edges, pairs them into stems, finds flex curve pairs and records the
//! extremes of outer contours as zone anchors. Nothing here looks at other
//! glyphs; cross-glyph decisions are left to the merger.

mod anchors;
mod edges;
mod flex;
mod stems;

use font_types::Fixed;

use crate::{
    config::HintConfig, fontinfo::FontMetrics, hint::FlexPair, hint::Orientation,
    outline::GlyphOutline,
};

pub(crate) use edges::{Edge, Travel};

/// Which extreme of a contour a zone anchor marks.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnchorSide {
    Top,
    Bottom,
    Left,
    Right,
}

/// Kind specific data for a [`CandidateFeature`].
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeatureKind {
    /// Two opposing edges enclosing ink.
    Stem {
        /// Largest deviation of either edge from its axis, in degrees.
        deviation: f64,
        /// Variation of the distance between the edges along their length.
        width_variance: f64,
        /// Length over which both edges face each other.
        overlap: f64,
        /// True if either edge is a curve extremum.
        round: bool,
    },
    /// Two consecutive shallow curves.
    Flex(FlexPair),
    /// Extreme point of an outer contour.
    Anchor { side: AnchorSide, round: bool },
}

/// A feature found in a glyph outline that may become a hint.
///
/// For stems, `position` is the lower edge and `width` the distance to the
/// upper edge. For flex pairs, the band spans the chord and the joint. For
/// anchors, `position` is the extreme coordinate and `width` is zero.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CandidateFeature {
    pub orientation: Orientation,
    pub position: Fixed,
    pub width: Fixed,
    pub kind: FeatureKind,
}

impl CandidateFeature {
    pub fn is_stem(&self) -> bool {
        matches!(self.kind, FeatureKind::Stem { .. })
    }
}

/// Range of stem widths accepted for an orientation.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct StemBounds {
    pub min: f64,
    pub max: f64,
}

impl StemBounds {
    /// Computes the accepted range from the configuration, widened to 1.5
    /// times the widest stem declared by the font.
    pub fn new(config: &HintConfig, metrics: &FontMetrics, orientation: Orientation) -> Self {
        let declared = metrics
            .max_stem_width(orientation)
            .map(|width| width.to_f64() * 1.5)
            .unwrap_or_default();
        Self {
            min: config.min_stem_width,
            max: config.max_stem_width.max(declared),
        }
    }

    pub fn contains(&self, width: f64) -> bool {
        width >= self.min && width <= self.max
    }
}

/// Finds stems, flex pairs and zone anchors in an outline.
///
/// The result is sorted by orientation and position so that repeated runs
/// produce identical output.
pub fn detect(
    outline: &GlyphOutline,
    config: &HintConfig,
    metrics: &FontMetrics,
) -> Vec<CandidateFeature> {
    let mut features = Vec::new();
    for orientation in Orientation::ALL {
        let bounds = StemBounds::new(config, metrics, orientation);
        let edges = edges::extract(outline, orientation, config.angle_tolerance);
        features.extend(stems::pair(outline, &edges, orientation, &bounds));
    }
    features.extend(flex::find(outline, config.angle_tolerance));
    features.extend(anchors::find(outline));
    features.sort_by(|a, b| {
        (a.orientation, a.position, a.width)
            .cmp(&(b.orientation, b.position, b.width))
            .then_with(|| kind_order(&a.kind).cmp(&kind_order(&b.kind)))
    });
    features
}

fn kind_order(kind: &FeatureKind) -> (u8, usize, usize) {
    match kind {
        FeatureKind::Stem { .. } => (0, 0, 0),
        FeatureKind::Flex(pair) => (1, pair.contour, pair.segment),
        FeatureKind::Anchor { side, .. } => (2, *side as usize, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::test_helpers::*;

    fn stems(features: &[CandidateFeature], orientation: Orientation) -> Vec<(f64, f64)> {
        features
            .iter()
            .filter(|f| f.is_stem() && f.orientation == orientation)
            .map(|f| (f.position.to_f64(), f.width.to_f64()))
            .collect()
    }

    #[test]
    fn single_vertical_stem() {
        let outline = glyph("I", vec![rect(100, 0, 180, 700)]);
        let config = HintConfig {
            min_stem_width: 60.0,
            max_stem_width: 120.0,
            ..Default::default()
        };
        let features = detect(&outline, &config, &FontMetrics::default());
        assert_eq!(stems(&features, Orientation::Vertical), [(100.0, 80.0)]);
        // the bar is far too tall to be a horizontal stem
        assert!(stems(&features, Orientation::Horizontal).is_empty());
    }

    #[test]
    fn bounds_widened_by_declared_stems() {
        let config = HintConfig::default();
        let metrics = FontMetrics {
            stem_snap_v: vec![Fixed::from_i32(200)],
            ..Default::default()
        };
        let bounds = StemBounds::new(&config, &metrics, Orientation::Vertical);
        assert_eq!(bounds.max, 300.0);
        let bounds = StemBounds::new(&config, &metrics, Orientation::Horizontal);
        assert_eq!(bounds.max, 250.0);
    }

    #[test]
    fn detection_is_deterministic() {
        let outline = glyph(
            "H",
            vec![polygon(&[
                (0, 0),
                (80, 0),
                (80, 320),
                (420, 320),
                (420, 0),
                (500, 0),
                (500, 700),
                (420, 700),
                (420, 390),
                (80, 390),
                (80, 700),
                (0, 700),
            ])],
        );
        let config = HintConfig::default();
        let metrics = FontMetrics::default();
        let first = detect(&outline, &config, &metrics);
        for _ in 0..3 {
            assert_eq!(detect(&outline, &config, &metrics), first);
        }
        assert_eq!(
            stems(&first, Orientation::Vertical),
            [(0.0, 80.0), (420.0, 80.0)]
        );
        assert_eq!(stems(&first, Orientation::Horizontal), [(320.0, 70.0)]);
    }
}
