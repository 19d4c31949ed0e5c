//! Tunable thresholds for the hinting pipeline.

/// Configuration settings for a hinting run.
///
/// Lengths are in font design units and the defaults assume a 1000 unit
/// em square. Use [`HintConfig::for_units_per_em`] to scale them for other
/// fonts.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HintConfig {
    /// Maximum deviation, in degrees, of an edge from its axis for the edge
    /// to be considered straight.
    ///
    /// Defaults to 2.9 degrees, which is roughly a slope of 1/20.
    pub angle_tolerance: f64,
    /// Narrowest stem that will be hinted.
    pub min_stem_width: f64,
    /// Widest stem that will be hinted.
    ///
    /// This is widened to 1.5 times the largest entry of the font stem
    /// tables when those contain wider stems.
    pub max_stem_width: f64,
    /// Distance within which flat extrema are clustered into one zone.
    pub zone_tolerance: f64,
    /// Largest overshoot a round extremum may add to a zone.
    pub max_overshoot: f64,
    /// Number of glyphs that must contribute to a zone which does not
    /// match any font metric.
    pub min_zone_support: usize,
    /// Maximum distance between a flex curve and the chord of its pair.
    pub flex_straightness: f64,
    /// Maximum width difference between stems linked by a counter hint.
    pub counter_tolerance: f64,
    /// Distance within which stem widths are grouped when computing the
    /// dominant stems of a font.
    pub stem_cluster_tolerance: f64,
    /// If true, counter hints are generated.
    pub counter_hints: bool,
    /// If true, flex hints are generated.
    pub flex_hints: bool,
    /// Glyphs that are allowed to carry counter hints.
    pub counter_glyphs: CounterGlyphs,
}

impl Default for HintConfig {
    fn default() -> Self {
        Self {
            angle_tolerance: 2.9,
            min_stem_width: 2.0,
            max_stem_width: 250.0,
            zone_tolerance: 2.0,
            max_overshoot: 25.0,
            min_zone_support: 2,
            flex_straightness: 20.0,
            counter_tolerance: 2.0,
            stem_cluster_tolerance: 10.0,
            counter_hints: true,
            flex_hints: true,
            counter_glyphs: CounterGlyphs::default(),
        }
    }
}

impl HintConfig {
    const REFERENCE_UPEM: f64 = 1000.0;

    /// Returns the default configuration with lengths scaled to the given
    /// em square.
    pub fn for_units_per_em(units_per_em: u16) -> Self {
        let scale = units_per_em.max(1) as f64 / Self::REFERENCE_UPEM;
        let defaults = Self::default();
        Self {
            min_stem_width: defaults.min_stem_width * scale,
            max_stem_width: defaults.max_stem_width * scale,
            zone_tolerance: defaults.zone_tolerance * scale,
            max_overshoot: defaults.max_overshoot * scale,
            flex_straightness: defaults.flex_straightness * scale,
            counter_tolerance: defaults.counter_tolerance * scale,
            stem_cluster_tolerance: defaults.stem_cluster_tolerance * scale,
            ..defaults
        }
    }

    /// Returns true if the glyph with the given name may carry counter
    /// hints between stems of the given orientation.
    pub(crate) fn allows_counters(
        &self,
        glyph_name: &str,
        orientation: crate::hint::Orientation,
    ) -> bool {
        use crate::hint::Orientation;
        if !self.counter_hints {
            return false;
        }
        let names = match orientation {
            Orientation::Vertical => &self.counter_glyphs.vertical,
            Orientation::Horizontal => &self.counter_glyphs.horizontal,
        };
        names.is_empty() || names.iter().any(|name| name == glyph_name)
    }
}

/// Per orientation lists of glyphs that may carry counter hints.
///
/// An empty list allows every glyph.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CounterGlyphs {
    /// Glyphs with counters between horizontal stems, such as `equivalence`.
    pub horizontal: Vec<String>,
    /// Glyphs with counters between vertical stems, such as `m`.
    pub vertical: Vec<String>,
}

impl CounterGlyphs {
    /// The glyph lists used when a font does not provide its own.
    pub fn latin() -> Self {
        Self {
            horizontal: ["element", "equivalence", "notelement", "divide"]
                .into_iter()
                .map(String::from)
                .collect(),
            vertical: ["m", "M", "T", "ellipsis"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hint::Orientation;

    #[test]
    fn scaled_defaults() {
        let config = HintConfig::for_units_per_em(2048);
        assert_eq!(config.max_stem_width, 250.0 * 2.048);
        assert_eq!(config.zone_tolerance, 2.0 * 2.048);
        // angles and counts do not scale
        assert_eq!(config.angle_tolerance, 2.9);
        assert_eq!(config.min_zone_support, 2);
        assert_eq!(HintConfig::for_units_per_em(1000), HintConfig::default());
    }

    #[test]
    fn counter_glyph_lists() {
        let mut config = HintConfig::default();
        assert!(config.allows_counters("anything", Orientation::Vertical));
        config.counter_glyphs = CounterGlyphs::latin();
        assert!(config.allows_counters("m", Orientation::Vertical));
        assert!(!config.allows_counters("m", Orientation::Horizontal));
        assert!(config.allows_counters("equivalence", Orientation::Horizontal));
        config.counter_hints = false;
        assert!(!config.allows_counters("m", Orientation::Vertical));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_partial_config() {
        let config: HintConfig = serde_json::from_str(r#"{"max_stem_width": 120.0}"#).unwrap();
        assert_eq!(config.max_stem_width, 120.0);
        assert_eq!(config.min_stem_width, 2.0);
    }
}
