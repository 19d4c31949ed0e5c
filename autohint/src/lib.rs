//! Stem, zone and flex hint generation for PostScript outlines.
//!
//! Given the closed contours of every glyph in a font, this crate finds
//! stems, round extrema and flex curves, reconciles them into a font wide
//! set of alignment zones and dominant stem widths, and writes the result
//! as Type 2 charstring hints, CFF private DICT entries or bez text.
//!
//! The usual entry point is [`FontHinter`]:
//!
//! ```
//! use autohint::{FontHinter, FontMetrics, GlyphMetrics, GlyphSource};
//!
//! let source = GlyphSource::Bez {
//!     name: "I".into(),
//!     metrics: GlyphMetrics::default(),
//!     text: "sc 100 0 mt 180 0 dt 180 700 dt 100 700 dt cp ed".into(),
//! };
//! let font = FontHinter::from_metrics(FontMetrics::default())
//!     .run([source])
//!     .unwrap();
//! let charstrings = font.writer().unwrap().charstrings().unwrap();
//! assert_eq!(charstrings[0].name, "I");
//! ```
//!
//! The individual stages are also available: [`detect::detect`] and
//! [`synth::synthesize`] work on a single [`GlyphOutline`], while the
//! [`Merger`] and [`HintWriter`] operate on a whole font.

#![forbid(unsafe_code)]

/// Expose the crate providing our fixed point and point types.
pub extern crate font_types as types;

pub mod config;
pub mod detect;
pub mod error;
pub mod fontinfo;
pub mod geometry;
pub mod hint;
pub mod merge;
pub mod outline;
pub mod synth;
pub mod write;
pub mod zone;

mod font;

pub use config::{CounterGlyphs, HintConfig};
pub use error::{
    EncodingError, Error, FontInfoError, MalformedOutlineError, MergerStateError,
    ValidationError,
};
pub use font::{FontHinter, GlyphDiagnostic, GlyphSource, HintedFont};
pub use fontinfo::FontMetrics;
pub use hint::{FlexPair, Hint, HintIndex, Orientation};
pub use merge::{HintProgram, Merger, MergerState};
pub use outline::{GlyphMetrics, GlyphOutline, OutlineBuilder, Segment};
pub use write::{EncodedGlyph, HintWriter};
pub use zone::{Zone, ZoneId, ZoneKind, ZoneSet};
