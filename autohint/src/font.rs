//! Hinting a whole font.

use core::fmt;

use crate::{
    config::HintConfig,
    detect,
    error::{MalformedOutlineError, MergerStateError, ValidationError},
    fontinfo::FontMetrics,
    merge::Merger,
    outline::{bez, GlyphMetrics, GlyphOutline, Segment},
    synth::{self, GlyphHints},
    write::HintWriter,
};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// A glyph submitted to a font run.
#[derive(Clone, Debug)]
pub enum GlyphSource {
    /// An outline that has already been validated.
    Outline(GlyphOutline),
    /// Raw contours, validated during the run.
    Contours {
        name: String,
        metrics: GlyphMetrics,
        contours: Vec<Vec<Segment>>,
    },
    /// A glyph in bez text form.
    Bez {
        name: String,
        metrics: GlyphMetrics,
        text: String,
    },
}

impl GlyphSource {
    pub fn name(&self) -> &str {
        match self {
            Self::Outline(outline) => outline.name(),
            Self::Contours { name, .. } | Self::Bez { name, .. } => name,
        }
    }

    fn into_outline(self) -> Result<GlyphOutline, MalformedOutlineError> {
        match self {
            Self::Outline(outline) => Ok(outline),
            Self::Contours {
                name,
                metrics,
                contours,
            } => GlyphOutline::new(name, metrics, contours),
            Self::Bez {
                name,
                metrics,
                text,
            } => bez::read(name, &text, metrics),
        }
    }
}

impl From<GlyphOutline> for GlyphSource {
    fn from(value: GlyphOutline) -> Self {
        Self::Outline(value)
    }
}

/// A glyph that was skipped because its outline is malformed.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GlyphDiagnostic {
    pub name: String,
    pub error: MalformedOutlineError,
}

impl fmt::Display for GlyphDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "glyph '{}': {}", self.name, self.error)
    }
}

/// Result of a font run.
#[derive(Clone, Debug)]
pub struct HintedFont {
    /// The finalized merger holding zones, dominant stems and hint
    /// programs.
    pub merger: Merger,
    /// Glyphs that were excluded from the run.
    pub diagnostics: Vec<GlyphDiagnostic>,
    /// Candidates dropped during synthesis, by glyph name.
    pub rejected: Vec<(String, ValidationError)>,
}

impl HintedFont {
    /// Returns a writer for the hint programs of the run.
    pub fn writer(&self) -> Result<HintWriter<'_>, MergerStateError> {
        HintWriter::new(&self.merger)
    }
}

/// Drives every stage of hinting for a set of glyphs.
#[derive(Clone, Debug)]
pub struct FontHinter {
    config: HintConfig,
    metrics: FontMetrics,
}

impl FontHinter {
    pub fn new(config: HintConfig, metrics: FontMetrics) -> Self {
        Self { config, metrics }
    }

    /// Creates a hinter configured from the font metrics.
    pub fn from_metrics(metrics: FontMetrics) -> Self {
        Self {
            config: metrics.config(),
            metrics,
        }
    }

    pub fn config(&self) -> &HintConfig {
        &self.config
    }

    /// Hints the given glyphs.
    ///
    /// Validation, feature detection and synthesis run per glyph, in
    /// parallel when the `rayon` feature is enabled. Glyphs with malformed
    /// outlines are reported as diagnostics and take no part in the zone
    /// pass.
    pub fn run<I>(&self, sources: I) -> Result<HintedFont, MergerStateError>
    where
        I: IntoIterator,
        I::Item: Into<GlyphSource>,
    {
        let sources: Vec<GlyphSource> = sources.into_iter().map(Into::into).collect();
        #[cfg(feature = "rayon")]
        let processed: Vec<_> = sources
            .into_par_iter()
            .map(|source| self.process(source))
            .collect();
        #[cfg(not(feature = "rayon"))]
        let processed: Vec<_> = sources
            .into_iter()
            .map(|source| self.process(source))
            .collect();
        let mut merger = Merger::new(self.config.clone(), self.metrics.clone());
        let mut diagnostics = Vec::new();
        let mut rejected = Vec::new();
        for result in processed {
            match result {
                Ok((outline, mut hints)) => {
                    let name = outline.name().to_string();
                    rejected.extend(
                        hints
                            .rejected
                            .drain(..)
                            .map(|error| (name.clone(), error)),
                    );
                    merger.add_glyph(outline, hints)?;
                }
                Err(diagnostic) => {
                    log::warn!("skipping {diagnostic}");
                    diagnostics.push(diagnostic);
                }
            }
        }
        merger.collect_zones()?;
        merger.snap_glyphs()?;
        merger.finalize()?;
        log::debug!(
            "hinted {} glyphs, skipped {}",
            merger.glyph_count(),
            diagnostics.len()
        );
        Ok(HintedFont {
            merger,
            diagnostics,
            rejected,
        })
    }

    fn process(
        &self,
        source: GlyphSource,
    ) -> Result<(GlyphOutline, GlyphHints), GlyphDiagnostic> {
        let name = source.name().to_string();
        let outline = source
            .into_outline()
            .map_err(|error| GlyphDiagnostic { name, error })?;
        let features = detect::detect(&outline, &self.config, &self.metrics);
        let hints = synth::synthesize(&outline, &features, &self.config, &self.metrics);
        Ok((outline, hints))
    }
}

#[cfg(test)]
mod tests {
    use font_types::Fixed;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        hint::{counters_are_symmetric, Orientation},
        outline::test_helpers::*,
        zone::ZoneKind,
    };

    fn bez_source(name: &str, text: &str) -> GlyphSource {
        GlyphSource::Bez {
            name: name.into(),
            metrics: GlyphMetrics {
                advance_width: Fixed::from_i32(600),
                left_side_bearing: Fixed::ZERO,
            },
            text: text.into(),
        }
    }

    fn fixture_font() -> Vec<GlyphSource> {
        [
            ("H", hint_test_data::bez::H),
            ("I", hint_test_data::bez::I),
            ("O", hint_test_data::bez::O),
            ("m", hint_test_data::bez::M_LOWER),
            ("n", hint_test_data::bez::N_LOWER),
            ("o", hint_test_data::bez::O_LOWER),
            ("x", hint_test_data::bez::X_LOWER),
        ]
        .into_iter()
        .map(|(name, text)| bez_source(name, text))
        .collect()
    }

    fn hinter() -> FontHinter {
        let metrics = crate::fontinfo::parse(hint_test_data::fontinfo::SANS).unwrap();
        FontHinter::from_metrics(metrics)
    }

    #[test]
    fn deterministic() {
        let _ = env_logger::builder().is_test(true).try_init();
        let first = hinter().run(fixture_font()).unwrap();
        let second = hinter().run(fixture_font()).unwrap();
        assert_eq!(
            first.merger.programs().unwrap(),
            second.merger.programs().unwrap()
        );
        assert_eq!(first.merger.zones(), second.merger.zones());
        let first_charstrings = first.writer().unwrap().charstrings().unwrap();
        let second_charstrings = second.writer().unwrap().charstrings().unwrap();
        assert_eq!(first_charstrings, second_charstrings);
    }

    #[test]
    fn malformed_glyph_excluded() {
        let mut sources = fixture_font();
        let clean = hinter().run(sources.clone()).unwrap();
        sources.push(GlyphSource::Contours {
            name: "dot".into(),
            metrics: GlyphMetrics::default(),
            contours: vec![vec![Segment::Line {
                from: pt(300, 900),
                to: pt(300, 900),
            }]],
        });
        sources.push(bez_source("broken", hint_test_data::bez::MALFORMED));
        let font = hinter().run(sources).unwrap();
        let names: Vec<_> = font.diagnostics.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["dot", "broken"]);
        assert!(matches!(
            font.diagnostics[0].error,
            MalformedOutlineError::TooFewPoints { .. }
        ));
        assert_eq!(font.merger.glyph_count(), clean.merger.glyph_count());
        assert_eq!(font.merger.zones(), clean.merger.zones());
    }

    #[test]
    fn fixture_zones_and_stems() {
        let font = hinter().run(fixture_font()).unwrap();
        let zones = font.merger.zones();
        let (_, baseline) = zones.find_kind(ZoneKind::Baseline).unwrap();
        assert_eq!(baseline.position, Fixed::ZERO);
        let (_, x_height) = zones.find_kind(ZoneKind::XHeight).unwrap();
        assert_eq!(x_height.position, Fixed::from_i32(500));
        let (_, cap_height) = zones.find_kind(ZoneKind::CapHeight).unwrap();
        assert_eq!(cap_height.position, Fixed::from_i32(700));
        let stems = font.merger.stem_snaps().unwrap();
        assert_eq!(stems.vertical.standard, Some(Fixed::from_i32(80)));
        for program in font.merger.programs().unwrap() {
            assert!(counters_are_symmetric(&program.hints), "{}", program.name);
            for hint in &program.hints {
                if let Some(id) = hint.zone {
                    let zone = zones.get(id).unwrap();
                    let edge = if zone.kind.is_top() {
                        hint.end()
                    } else {
                        hint.position
                    };
                    assert_eq!(edge, zone.position, "{}", program.name);
                }
            }
        }
    }

    #[test]
    fn counter_glyph_lists() {
        let font = hinter().run(fixture_font()).unwrap();
        let linked = |name: &str| {
            font.merger
                .glyph_hints(name)
                .unwrap()
                .iter()
                .filter(|h| h.orientation == Orientation::Vertical && h.counter.is_some())
                .count()
        };
        // the fontinfo lists m as the only glyph with vertical counters
        assert_eq!(linked("m"), 2);
        assert_eq!(linked("n"), 0);
        assert_eq!(linked("H"), 0);
    }

    #[test]
    fn flex_survives_to_charstring() {
        let font = hinter()
            .run([bez_source("flex", hint_test_data::bez::FLEX)])
            .unwrap();
        let hints = font.merger.glyph_hints("flex").unwrap();
        assert!(hints.iter().any(|h| h.is_flex()));
        let writer = font.writer().unwrap();
        let charstrings = writer.charstrings().unwrap();
        let data = &charstrings[0].data;
        // depth 50 followed by the flex operator
        assert!(data.windows(3).any(|w| w == [189, 12, 35]));
        let bez = writer.bez().unwrap();
        assert_eq!(bez[0].data.matches(" flx").count(), 1);
    }

    #[test]
    fn outlines_convert_into_sources() {
        let font = FontHinter::new(HintConfig::default(), FontMetrics::default())
            .run([glyph("I", vec![rect(100, 0, 180, 700)])])
            .unwrap();
        let hints = font.merger.glyph_hints("I").unwrap();
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].orientation, Orientation::Vertical);
        assert_eq!(hints[0].position, Fixed::from_i32(100));
        assert_eq!(hints[0].width, Fixed::from_i32(80));
    }
}
