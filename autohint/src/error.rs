//! Error types for the hinting pipeline.

use core::fmt;

use font_types::Fixed;

use crate::{hint::Orientation, merge::MergerState, zone::ZoneId};

/// Errors caused by glyph outlines that cannot be hinted.
///
/// These are local to a single glyph. The caller decides whether to skip
/// the glyph or abort the font.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum MalformedOutlineError {
    /// The end of the contour does not meet its start, or two consecutive
    /// segments are not joined.
    OpenContour { contour: usize },
    /// The contour has fewer distinct points than required.
    TooFewPoints { contour: usize, count: usize },
    /// The contour encloses no area.
    DegenerateContour { contour: usize },
    /// An on-curve point is visited twice in the same contour.
    SelfIntersection { contour: usize, point: usize },
    /// A coordinate was NaN or infinite.
    NonFinite { contour: usize },
    /// A drawing command was issued before the first move.
    MissingMoveTo,
    /// The bez source could not be parsed.
    Bez { line: usize, message: String },
}

impl fmt::Display for MalformedOutlineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenContour { contour } => write!(f, "contour {contour} is not closed"),
            Self::TooFewPoints { contour, count } => write!(
                f,
                "contour {contour} has {count} distinct point(s), at least 2 are required"
            ),
            Self::DegenerateContour { contour } => {
                write!(f, "contour {contour} does not enclose any area")
            }
            Self::SelfIntersection { contour, point } => write!(
                f,
                "contour {contour} revisits an on-curve point at index {point}"
            ),
            Self::NonFinite { contour } => {
                write!(f, "contour {contour} contains a non-finite coordinate")
            }
            Self::MissingMoveTo => write!(f, "drawing command issued before move to"),
            Self::Bez { line, message } => write!(f, "bez line {line}: {message}"),
        }
    }
}

impl std::error::Error for MalformedOutlineError {}

/// Reasons a candidate feature is rejected during synthesis.
///
/// Rejections are never escalated; they are collected for diagnostics and
/// the candidate is dropped.
#[derive(Clone, PartialEq, Debug)]
pub enum ValidationError {
    /// Stem width outside of the allowed range.
    WidthOutOfRange {
        orientation: Orientation,
        width: Fixed,
        min: Fixed,
        max: Fixed,
    },
    /// Stem overlaps a stronger stem of the same orientation.
    Conflict {
        orientation: Orientation,
        position: Fixed,
        width: Fixed,
    },
    /// One of the curves in a flex pair deviates too far from the chord.
    FlexNotStraight {
        contour: usize,
        segment: usize,
        deviation: f64,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WidthOutOfRange {
                orientation,
                width,
                min,
                max,
            } => write!(
                f,
                "{orientation} stem width {width} outside of allowed range {min}..={max}"
            ),
            Self::Conflict {
                orientation,
                position,
                width,
            } => write!(
                f,
                "{orientation} stem at {position} (width {width}) overlaps a stronger stem"
            ),
            Self::FlexNotStraight {
                contour,
                segment,
                deviation,
            } => write!(
                f,
                "flex at contour {contour} segment {segment} deviates {deviation:.2} units"
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// A merger operation was invoked in the wrong state.
///
/// This indicates misuse by the caller and is not recoverable.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct MergerStateError {
    pub operation: &'static str,
    pub expected: MergerState,
    pub found: MergerState,
}

impl fmt::Display for MergerStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requires the merger to be {:?} but it is {:?}",
            self.operation, self.expected, self.found
        )
    }
}

impl std::error::Error for MergerStateError {}

/// The writer was asked to encode a hint program it cannot represent.
///
/// This indicates a defect in the merger and aborts the run.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum EncodingError {
    /// A hint references a zone that is not in the finalized zone set.
    UnknownZone { glyph: String, zone: ZoneId },
    /// A flex marker does not reference two consecutive curves.
    InvalidFlex {
        glyph: String,
        contour: usize,
        segment: usize,
    },
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownZone { glyph, zone } => {
                write!(f, "glyph '{glyph}' references unknown zone {}", zone.0)
            }
            Self::InvalidFlex {
                glyph,
                contour,
                segment,
            } => write!(
                f,
                "glyph '{glyph}' has a flex marker at contour {contour} segment {segment} that does not cover two curves"
            ),
        }
    }
}

impl std::error::Error for EncodingError {}

/// An error in a fontinfo keyword file.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FontInfoError {
    /// One based line number.
    pub line: usize,
    pub key: String,
    pub kind: FontInfoErrorKind,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FontInfoErrorKind {
    ExpectedNumber(String),
    ExpectedBool(String),
    ExpectedArray(String),
    UnterminatedArray,
    UnterminatedString,
    MissingValue,
}

impl fmt::Display for FontInfoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fontinfo line {} ({}): ", self.line, self.key)?;
        match &self.kind {
            FontInfoErrorKind::ExpectedNumber(found) => {
                write!(f, "number expected instead of '{found}'")
            }
            FontInfoErrorKind::ExpectedBool(found) => {
                write!(f, "true or false expected instead of '{found}'")
            }
            FontInfoErrorKind::ExpectedArray(found) => {
                write!(f, "array in square brackets expected instead of '{found}'")
            }
            FontInfoErrorKind::UnterminatedArray => write!(f, "missing closing ']'"),
            FontInfoErrorKind::UnterminatedString => write!(f, "missing closing ')'"),
            FontInfoErrorKind::MissingValue => write!(f, "keyword has no value"),
        }
    }
}

impl std::error::Error for FontInfoError {}

/// Errors that abort a font run.
#[derive(Clone, Debug)]
pub enum Error {
    MalformedOutline(MalformedOutlineError),
    MergerState(MergerStateError),
    Encoding(EncodingError),
    FontInfo(FontInfoError),
}

impl From<MalformedOutlineError> for Error {
    fn from(value: MalformedOutlineError) -> Self {
        Self::MalformedOutline(value)
    }
}

impl From<MergerStateError> for Error {
    fn from(value: MergerStateError) -> Self {
        Self::MergerState(value)
    }
}

impl From<EncodingError> for Error {
    fn from(value: EncodingError) -> Self {
        Self::Encoding(value)
    }
}

impl From<FontInfoError> for Error {
    fn from(value: FontInfoError) -> Self {
        Self::FontInfo(value)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedOutline(e) => write!(f, "{e}"),
            Self::MergerState(e) => write!(f, "{e}"),
            Self::Encoding(e) => write!(f, "{e}"),
            Self::FontInfo(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {}
