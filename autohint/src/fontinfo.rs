//! Font wide metrics and the fontinfo keyword file.
//!
//! A fontinfo file is a list of `Keyword value` lines where the value is a
//! number, `true` or `false`, a bracketed array or a parenthesized string:
//!
//! ```text
//! FontName (Example-Regular)
//! OrigEmSqUnits 1000
//! CapHeight 700
//! CapOvershoot 12
//! StemSnapV [80 92]
//! VCounterChars [equivalence]
//! ```
//!
//! Unknown keywords are ignored.

use font_types::Fixed;

use crate::{
    config::{CounterGlyphs, HintConfig},
    error::{FontInfoError, FontInfoErrorKind},
    hint::Orientation,
};

/// Position and overshoot of an alignment zone declared by the font.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneSpec {
    pub position: Fixed,
    pub overshoot: Fixed,
}

impl ZoneSpec {
    pub fn new(position: Fixed, overshoot: Fixed) -> Self {
        Self {
            position,
            overshoot,
        }
    }
}

/// Metrics shared by every glyph of a font.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FontMetrics {
    pub font_name: Option<String>,
    pub units_per_em: u16,
    pub baseline: Option<ZoneSpec>,
    pub x_height: Option<ZoneSpec>,
    pub cap_height: Option<ZoneSpec>,
    pub ascender: Option<ZoneSpec>,
    pub descender: Option<ZoneSpec>,
    pub figure_height: Option<ZoneSpec>,
    /// Additional top zones, such as small cap height.
    pub other_top: Vec<ZoneSpec>,
    /// Additional bottom zones, such as superior and ordinal baselines.
    pub other_bottom: Vec<ZoneSpec>,
    /// Stem widths of horizontal stems (StemSnapH).
    pub stem_snap_h: Vec<Fixed>,
    /// Stem widths of vertical stems (StemSnapV).
    pub stem_snap_v: Vec<Fixed>,
    /// Most common horizontal stem widths (DominantH).
    pub dominant_h: Vec<Fixed>,
    /// Most common vertical stem widths (DominantV).
    pub dominant_v: Vec<Fixed>,
    /// Further horizontal stem widths that are hinted but not snapped.
    pub aux_h_stems: Vec<Fixed>,
    /// Further vertical stem widths that are hinted but not snapped.
    pub aux_v_stems: Vec<Fixed>,
    pub counter_glyphs: Option<CounterGlyphs>,
    pub flex_ok: Option<bool>,
    pub blue_fuzz: Option<Fixed>,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            font_name: None,
            units_per_em: 1000,
            baseline: None,
            x_height: None,
            cap_height: None,
            ascender: None,
            descender: None,
            figure_height: None,
            other_top: Vec::new(),
            other_bottom: Vec::new(),
            stem_snap_h: Vec::new(),
            stem_snap_v: Vec::new(),
            dominant_h: Vec::new(),
            dominant_v: Vec::new(),
            aux_h_stems: Vec::new(),
            aux_v_stems: Vec::new(),
            counter_glyphs: None,
            flex_ok: None,
            blue_fuzz: None,
        }
    }
}

impl FontMetrics {
    /// Returns every stem width the font declares for the orientation.
    pub fn stem_widths(&self, orientation: Orientation) -> impl Iterator<Item = Fixed> + '_ {
        let (snap, dominant, aux) = match orientation {
            Orientation::Horizontal => (&self.stem_snap_h, &self.dominant_h, &self.aux_h_stems),
            Orientation::Vertical => (&self.stem_snap_v, &self.dominant_v, &self.aux_v_stems),
        };
        snap.iter().chain(dominant).chain(aux).copied()
    }

    /// Returns the widths used to snap stems of the orientation in the
    /// private dict, if the font declares any.
    pub fn declared_snaps(&self, orientation: Orientation) -> Vec<Fixed> {
        let (snap, dominant) = match orientation {
            Orientation::Horizontal => (&self.stem_snap_h, &self.dominant_h),
            Orientation::Vertical => (&self.stem_snap_v, &self.dominant_v),
        };
        let mut widths = if snap.is_empty() {
            dominant.clone()
        } else {
            snap.clone()
        };
        widths.sort();
        widths.dedup();
        widths
    }

    /// Returns the widest stem the font declares for the orientation.
    pub fn max_stem_width(&self, orientation: Orientation) -> Option<Fixed> {
        self.stem_widths(orientation).max()
    }

    /// Applies font level settings to a configuration.
    pub fn configure(&self, config: &mut HintConfig) {
        if let Some(counter_glyphs) = &self.counter_glyphs {
            config.counter_glyphs = counter_glyphs.clone();
        }
        if let Some(flex_ok) = self.flex_ok {
            config.flex_hints = flex_ok;
        }
    }

    /// Returns the config defaults scaled to the em square of the font with
    /// font level settings applied.
    pub fn config(&self) -> HintConfig {
        let mut config = HintConfig::for_units_per_em(self.units_per_em);
        self.configure(&mut config);
        config
    }
}

/// Parses the contents of a fontinfo file.
pub fn parse(text: &str) -> Result<FontMetrics, FontInfoError> {
    let mut metrics = FontMetrics::default();
    let mut zones = ZoneBuilder::default();
    let mut lines = text.lines().enumerate().map(|(ix, line)| (ix + 1, line));
    while let Some((line_no, line)) = lines.next() {
        let line = strip_comment(line).trim();
        let Some((key, rest)) = split_key(line) else {
            continue;
        };
        let err = |kind: FontInfoErrorKind| FontInfoError {
            line: line_no,
            key: key.to_string(),
            kind,
        };
        let value = read_value(rest, &mut lines).map_err(err)?;
        match key {
            "FontName" => metrics.font_name = Some(value.string()),
            "OrigEmSqUnits" => {
                let upem = value.number().map_err(err)?;
                metrics.units_per_em = upem.round().clamp(16.0, 16384.0) as u16;
            }
            "FlexOK" => metrics.flex_ok = Some(value.boolean().map_err(err)?),
            "BlueFuzz" => metrics.blue_fuzz = Some(value.fixed().map_err(err)?),
            "StemSnapH" => metrics.stem_snap_h = value.fixed_array().map_err(err)?,
            "StemSnapV" => metrics.stem_snap_v = value.fixed_array().map_err(err)?,
            "DominantH" => metrics.dominant_h = value.fixed_or_array().map_err(err)?,
            "DominantV" => metrics.dominant_v = value.fixed_or_array().map_err(err)?,
            "AuxHStems" => metrics.aux_h_stems = value.fixed_array().map_err(err)?,
            "AuxVStems" => metrics.aux_v_stems = value.fixed_array().map_err(err)?,
            // counters between vertical stems
            "HCounterChars" => {
                let names = value.names().map_err(err)?;
                metrics
                    .counter_glyphs
                    .get_or_insert_with(CounterGlyphs::default)
                    .vertical = names;
            }
            // counters between horizontal stems
            "VCounterChars" => {
                let names = value.names().map_err(err)?;
                metrics
                    .counter_glyphs
                    .get_or_insert_with(CounterGlyphs::default)
                    .horizontal = names;
            }
            _ => match ZoneField::from_key(key) {
                Some(field) => zones.set(field, value.fixed().map_err(err)?),
                None => log::debug!("ignoring fontinfo keyword '{key}' on line {line_no}"),
            },
        }
    }
    zones.finish(&mut metrics);
    Ok(metrics)
}

fn strip_comment(line: &str) -> &str {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return "";
    }
    match line.find('%') {
        Some(ix) => &line[..ix],
        None => line,
    }
}

fn split_key(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    match line.find(char::is_whitespace) {
        Some(ix) => Some((&line[..ix], line[ix..].trim())),
        None => Some((line, "")),
    }
}

/// Reads a value starting at `rest`, consuming further lines for arrays or
/// strings that span multiple lines.
fn read_value<'a>(
    rest: &'a str,
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
) -> Result<Value, FontInfoErrorKind> {
    if rest.is_empty() {
        return Err(FontInfoErrorKind::MissingValue);
    }
    let (open, close, unterminated) = match rest.as_bytes()[0] {
        b'[' => ('[', ']', FontInfoErrorKind::UnterminatedArray),
        b'(' => ('(', ')', FontInfoErrorKind::UnterminatedString),
        _ => return Ok(Value::Scalar(rest.to_string())),
    };
    let mut text = rest[open.len_utf8()..].to_string();
    loop {
        if let Some(end) = text.find(close) {
            text.truncate(end);
            return Ok(if open == '[' {
                Value::Array(text.split_whitespace().map(String::from).collect())
            } else {
                Value::String(text.trim().to_string())
            });
        }
        let Some((_, line)) = lines.next() else {
            return Err(unterminated);
        };
        text.push(' ');
        text.push_str(strip_comment(line));
    }
}

#[derive(Clone, Debug)]
enum Value {
    Scalar(String),
    Array(Vec<String>),
    String(String),
}

impl Value {
    fn describe(&self) -> String {
        match self {
            Self::Scalar(s) => s.clone(),
            Self::Array(items) => format!("[{}]", items.join(" ")),
            Self::String(s) => format!("({s})"),
        }
    }

    fn number(&self) -> Result<f64, FontInfoErrorKind> {
        match self {
            // some files wrap single numbers in brackets
            Self::Scalar(s) => parse_number(s),
            Self::Array(items) if items.len() == 1 => parse_number(&items[0]),
            _ => Err(FontInfoErrorKind::ExpectedNumber(self.describe())),
        }
    }

    fn fixed(&self) -> Result<Fixed, FontInfoErrorKind> {
        self.number().map(Fixed::from_f64)
    }

    fn boolean(&self) -> Result<bool, FontInfoErrorKind> {
        match self {
            Self::Scalar(s) if s == "true" => Ok(true),
            Self::Scalar(s) if s == "false" => Ok(false),
            _ => Err(FontInfoErrorKind::ExpectedBool(self.describe())),
        }
    }

    fn fixed_array(&self) -> Result<Vec<Fixed>, FontInfoErrorKind> {
        match self {
            Self::Array(items) => items
                .iter()
                .map(|item| parse_number(item).map(Fixed::from_f64))
                .collect(),
            _ => Err(FontInfoErrorKind::ExpectedArray(self.describe())),
        }
    }

    /// Like `fixed_array` but also accepts a single bare number.
    fn fixed_or_array(&self) -> Result<Vec<Fixed>, FontInfoErrorKind> {
        match self {
            Self::Scalar(_) => self.fixed().map(|value| vec![value]),
            _ => self.fixed_array(),
        }
    }

    fn names(&self) -> Result<Vec<String>, FontInfoErrorKind> {
        match self {
            Self::Array(items) => Ok(items.clone()),
            Self::String(s) => Ok(s.split_whitespace().map(String::from).collect()),
            _ => Err(FontInfoErrorKind::ExpectedArray(self.describe())),
        }
    }

    fn string(&self) -> String {
        match self {
            Self::Scalar(s) | Self::String(s) => s.clone(),
            Self::Array(items) => items.join(" "),
        }
    }
}

fn parse_number(s: &str) -> Result<f64, FontInfoErrorKind> {
    s.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| FontInfoErrorKind::ExpectedNumber(s.to_string()))
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum ZoneSlot {
    Baseline,
    XHeight,
    CapHeight,
    Ascender,
    Descender,
    FigureHeight,
    Height5,
    Height6,
    Baseline5,
    Baseline6,
    SuperiorBaseline,
    OrdinalBaseline,
}

impl ZoneSlot {
    const COUNT: usize = 12;
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
struct ZoneField {
    slot: ZoneSlot,
    overshoot: bool,
}

impl ZoneField {
    fn from_key(key: &str) -> Option<Self> {
        let (slot, overshoot) = match key {
            "BaselineYCoord" => (ZoneSlot::Baseline, false),
            "BaselineOvershoot" => (ZoneSlot::Baseline, true),
            "LcHeight" => (ZoneSlot::XHeight, false),
            "LcOvershoot" => (ZoneSlot::XHeight, true),
            "CapHeight" => (ZoneSlot::CapHeight, false),
            "CapOvershoot" => (ZoneSlot::CapHeight, true),
            "AscenderHeight" => (ZoneSlot::Ascender, false),
            "AscenderOvershoot" => (ZoneSlot::Ascender, true),
            "DescenderHeight" => (ZoneSlot::Descender, false),
            "DescenderOvershoot" => (ZoneSlot::Descender, true),
            "FigHeight" => (ZoneSlot::FigureHeight, false),
            "FigOvershoot" => (ZoneSlot::FigureHeight, true),
            "Height5" => (ZoneSlot::Height5, false),
            "Height5Overshoot" => (ZoneSlot::Height5, true),
            "Height6" => (ZoneSlot::Height6, false),
            "Height6Overshoot" => (ZoneSlot::Height6, true),
            "Baseline5" => (ZoneSlot::Baseline5, false),
            "Baseline5Overshoot" => (ZoneSlot::Baseline5, true),
            "Baseline6" => (ZoneSlot::Baseline6, false),
            "Baseline6Overshoot" => (ZoneSlot::Baseline6, true),
            "SuperiorBaseline" => (ZoneSlot::SuperiorBaseline, false),
            "SuperiorOvershoot" => (ZoneSlot::SuperiorBaseline, true),
            "OrdinalBaseline" => (ZoneSlot::OrdinalBaseline, false),
            "OrdinalOvershoot" => (ZoneSlot::OrdinalBaseline, true),
            _ => return None,
        };
        Some(Self { slot, overshoot })
    }
}

/// Collects zone positions and overshoots, which arrive as separate
/// keywords in any order.
#[derive(Default)]
struct ZoneBuilder {
    positions: [Option<Fixed>; ZoneSlot::COUNT],
    overshoots: [Option<Fixed>; ZoneSlot::COUNT],
}

impl ZoneBuilder {
    fn set(&mut self, field: ZoneField, value: Fixed) {
        let slot = field.slot as usize;
        if field.overshoot {
            self.overshoots[slot] = Some(value);
        } else {
            self.positions[slot] = Some(value);
        }
    }

    fn get(&self, slot: ZoneSlot) -> Option<ZoneSpec> {
        let ix = slot as usize;
        self.positions[ix]
            .map(|position| ZoneSpec::new(position, self.overshoots[ix].unwrap_or_default()))
    }

    fn finish(self, metrics: &mut FontMetrics) {
        metrics.baseline = self.get(ZoneSlot::Baseline);
        metrics.x_height = self.get(ZoneSlot::XHeight);
        metrics.cap_height = self.get(ZoneSlot::CapHeight);
        metrics.ascender = self.get(ZoneSlot::Ascender);
        metrics.descender = self.get(ZoneSlot::Descender);
        metrics.figure_height = self.get(ZoneSlot::FigureHeight);
        metrics.other_top = [ZoneSlot::Height5, ZoneSlot::Height6]
            .into_iter()
            .filter_map(|slot| self.get(slot))
            .collect();
        metrics.other_bottom = [
            ZoneSlot::Baseline5,
            ZoneSlot::Baseline6,
            ZoneSlot::SuperiorBaseline,
            ZoneSlot::OrdinalBaseline,
        ]
        .into_iter()
        .filter_map(|slot| self.get(slot))
        .collect();
    }
}
