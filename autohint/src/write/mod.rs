//! Serialization of finalized hints.
//!
//! A [`HintWriter`] can only be created from a merger in the
//! [`Finalized`](crate::merge::MergerState::Finalized) state. It produces
//! Type 2 charstrings, a CFF private DICT carrying the font wide zones and
//! stems, and bez glyph text.

mod bez;
mod charstring;
mod dict;

use font_types::Fixed;

use crate::{
    error::{EncodingError, MergerStateError},
    hint::FlexPair,
    merge::{HintProgram, Merger, StemSnaps},
    outline::GlyphOutline,
    zone::ZoneSet,
};

/// Depth operand of the `flex` operator, in hundredths of a device pixel.
///
/// Flex curves shallower than half a pixel are drawn as a straight line.
pub const FLEX_DEPTH: i32 = 50;

/// Encoded data for a single glyph.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EncodedGlyph<T> {
    pub name: String,
    pub data: T,
}

/// Writes the hint programs of a finalized merger.
#[derive(Copy, Clone, Debug)]
pub struct HintWriter<'a> {
    merger: &'a Merger,
    programs: &'a [HintProgram],
    stems: &'a StemSnaps,
}

impl<'a> HintWriter<'a> {
    /// Fails unless the merger is finalized.
    pub fn new(merger: &'a Merger) -> Result<Self, MergerStateError> {
        Ok(Self {
            merger,
            programs: merger.programs()?,
            stems: merger.stem_snaps()?,
        })
    }

    /// Encodes every glyph as a Type 2 charstring.
    pub fn charstrings(&self) -> Result<Vec<EncodedGlyph<Vec<u8>>>, EncodingError> {
        self.encode_all(charstring::encode)
    }

    /// Encodes every glyph as bez text.
    pub fn bez(&self) -> Result<Vec<EncodedGlyph<String>>, EncodingError> {
        self.encode_all(bez::write)
    }

    /// Encodes the zones and dominant stems as a CFF private DICT.
    pub fn private_dict(&self) -> Vec<u8> {
        let blue_fuzz = self.merger.metrics().blue_fuzz.unwrap_or(Fixed::ZERO);
        dict::encode(self.merger.zones(), self.stems, blue_fuzz)
    }

    fn encode_all<T>(
        &self,
        encode: impl Fn(&HintProgram, &GlyphOutline) -> T,
    ) -> Result<Vec<EncodedGlyph<T>>, EncodingError> {
        let zones = self.merger.zones();
        self.programs
            .iter()
            .zip(self.merger.outlines())
            .map(|(program, outline)| {
                validate(program, outline, zones)?;
                Ok(EncodedGlyph {
                    name: program.name.clone(),
                    data: encode(program, outline),
                })
            })
            .collect()
    }
}

/// Checks that every zone and flex reference of a program can be encoded.
fn validate(
    program: &HintProgram,
    outline: &GlyphOutline,
    zones: &ZoneSet,
) -> Result<(), EncodingError> {
    let referenced = program
        .hints
        .iter()
        .filter_map(|hint| hint.zone)
        .chain(program.zones.iter().copied());
    for zone in referenced {
        if zones.get(zone).is_none() {
            return Err(EncodingError::UnknownZone {
                glyph: program.name.clone(),
                zone,
            });
        }
    }
    for pair in program.hints.iter().flat_map(|hint| hint.flex.iter()) {
        if !is_curve_pair(outline, *pair) {
            return Err(EncodingError::InvalidFlex {
                glyph: program.name.clone(),
                contour: pair.contour,
                segment: pair.segment,
            });
        }
    }
    Ok(())
}

fn is_curve_pair(outline: &GlyphOutline, pair: FlexPair) -> bool {
    let Some(contour) = outline.contours().get(pair.contour) else {
        return false;
    };
    let segments = contour.segments();
    if segments.len() < 2 || pair.segment >= segments.len() {
        return false;
    }
    segments[pair.segment].is_curve() && segments[contour.next_index(pair.segment)].is_curve()
}

/// Flex pairs of a program, sorted.
fn flex_pairs(program: &HintProgram) -> Vec<FlexPair> {
    let mut pairs: Vec<_> = program
        .hints
        .iter()
        .flat_map(|hint| hint.flex.iter().copied())
        .collect();
    pairs.sort();
    pairs.dedup();
    pairs
}

/// Order in which the segments of a contour are written.
///
/// Starts at the first segment unless a flex pair wraps around the end of
/// the contour, in which case it starts at the first curve of that pair so
/// both curves are written together. Returns the segment indices and
/// whether each one starts a flex.
fn segment_order(contour_ix: usize, len: usize, flex: &[FlexPair]) -> Vec<(usize, bool)> {
    let is_flex = |segment: usize| {
        flex.binary_search(&FlexPair {
            contour: contour_ix,
            segment,
        })
        .is_ok()
    };
    let start = if len > 1 && is_flex(len - 1) { len - 1 } else { 0 };
    let mut order = Vec::with_capacity(len);
    let mut step = 0;
    while step < len {
        let ix = (start + step) % len;
        let flex_start = step + 1 < len && is_flex(ix);
        order.push((ix, flex_start));
        step += if flex_start { 2 } else { 1 };
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::HintConfig,
        error::Error,
        fontinfo::FontMetrics,
        hint::{Hint, Orientation},
        merge::MergerState,
        outline::test_helpers::*,
        synth::GlyphHints,
        zone::ZoneId,
    };

    fn finalized(hints: Vec<Hint>) -> Merger {
        let mut merger = Merger::new(HintConfig::default(), FontMetrics::default());
        merger
            .add_glyph(
                glyph("I", vec![rect(100, 0, 180, 700)]),
                GlyphHints {
                    hints,
                    anchors: vec![],
                    rejected: vec![],
                },
            )
            .unwrap();
        merger.collect_zones().unwrap();
        merger.snap_glyphs().unwrap();
        merger.finalize().unwrap();
        merger
    }

    #[test]
    fn writer_requires_finalized_merger() {
        let mut merger = Merger::new(HintConfig::default(), FontMetrics::default());
        let err = HintWriter::new(&merger).unwrap_err();
        assert_eq!(err.expected, MergerState::Finalized);
        assert_eq!(err.found, MergerState::Uninitialized);
        merger.collect_zones().unwrap();
        merger.snap_glyphs().unwrap();
        let err: Error = HintWriter::new(&merger).unwrap_err().into();
        assert!(matches!(err, Error::MergerState(_)));
    }

    #[test]
    fn unknown_zone_rejected() {
        let mut hint = Hint::new(Orientation::Vertical, Fixed::from_i32(100), Fixed::from_i32(80));
        hint.zone = Some(ZoneId(3));
        let merger = finalized(vec![hint]);
        let writer = HintWriter::new(&merger).unwrap();
        assert_eq!(
            writer.charstrings().unwrap_err(),
            EncodingError::UnknownZone {
                glyph: "I".into(),
                zone: ZoneId(3)
            }
        );
    }

    #[test]
    fn flex_on_lines_rejected() {
        let hint = Hint::flex(
            Orientation::Horizontal,
            Fixed::from_i32(700),
            Fixed::ONE,
            FlexPair {
                contour: 0,
                segment: 1,
            },
        );
        let merger = finalized(vec![hint]);
        let writer = HintWriter::new(&merger).unwrap();
        assert!(matches!(
            writer.bez().unwrap_err(),
            EncodingError::InvalidFlex { segment: 1, .. }
        ));
    }

    #[test]
    fn wrapping_flex_starts_contour_early() {
        let flex = [FlexPair {
            contour: 0,
            segment: 4,
        }];
        assert_eq!(
            segment_order(0, 5, &flex),
            [(4, true), (1, false), (2, false), (3, false)]
        );
        assert_eq!(
            segment_order(0, 4, &[]),
            [(0, false), (1, false), (2, false), (3, false)]
        );
    }
}
