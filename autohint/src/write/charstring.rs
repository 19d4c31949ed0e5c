//! Type 2 charstring encoding.
//!
//! See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf>

use font_types::{Fixed, Point};

use super::{flex_pairs, segment_order, FLEX_DEPTH};
use crate::{
    hint::{Hint, HintIndex, Orientation},
    merge::HintProgram,
    outline::{GlyphOutline, Segment},
};

/// Escape byte for two byte operators.
const ESCAPE: u8 = 12;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Operator {
    HStem,
    VStem,
    RLineTo,
    RrCurveTo,
    EndChar,
    HStemHm,
    CntrMask,
    RMoveTo,
    VStemHm,
    Flex,
}

impl Operator {
    fn opcode(self) -> &'static [u8] {
        use Operator::*;
        match self {
            HStem => &[1],
            VStem => &[3],
            RLineTo => &[5],
            RrCurveTo => &[8],
            EndChar => &[14],
            HStemHm => &[18],
            CntrMask => &[20],
            RMoveTo => &[21],
            VStemHm => &[23],
            Flex => &[ESCAPE, 35],
        }
    }
}

/// Appends a charstring operand.
///
/// Integers use the shortest of the one, two and three byte forms, other
/// values are written as 16.16 fixed point after a 255 byte.
pub(crate) fn push_operand(data: &mut Vec<u8>, value: Fixed) {
    // Size   b0 range     Value range              Value calculation
    //--------------------------------------------------------------------------------
    // 1      32 to 246    -107 to +107             b0 - 139
    // 2      247 to 250   +108 to +1131            (b0 - 247) * 256 + b1 + 108
    // 2      251 to 254   -1131 to -108            -(b0 - 251) * 256 - b1 - 108
    // 3      28           -32768 to +32767         b1 << 8 | b2
    // 5      255          16.16 fixed              b1 << 24 | b2 << 16 | b3 << 8 | b4
    let bits = value.to_bits();
    match i16::try_from(bits >> 16) {
        Ok(integer) if bits & 0xFFFF == 0 => push_integer(data, integer),
        _ => {
            data.push(255);
            data.extend_from_slice(&bits.to_be_bytes());
        }
    }
}

/// Appends an integer in the encodings shared by charstrings and DICTs.
///
/// The widest shared form holds 16 bits; callers pick their own format's
/// encoding for anything larger.
pub(crate) fn push_integer(data: &mut Vec<u8>, value: i16) {
    match value {
        -107..=107 => data.push((value + 139) as u8),
        108..=1131 => {
            let value = value - 108;
            data.extend_from_slice(&[(value >> 8) as u8 + 247, value as u8]);
        }
        -1131..=-108 => {
            let value = -value - 108;
            data.extend_from_slice(&[(value >> 8) as u8 + 251, value as u8]);
        }
        _ => {
            data.push(28);
            data.extend_from_slice(&value.to_be_bytes());
        }
    }
}

struct Encoder {
    data: Vec<u8>,
    width: Option<Fixed>,
    current: Point<Fixed>,
}

impl Encoder {
    /// Emits the operands followed by the operator. The glyph width is
    /// prepended to the first operator that clears the stack.
    fn op(&mut self, operands: &[Fixed], operator: Operator) {
        if let Some(width) = self.width.take() {
            push_operand(&mut self.data, width);
        }
        for operand in operands {
            push_operand(&mut self.data, *operand);
        }
        self.data.extend_from_slice(operator.opcode());
    }

    fn delta(&mut self, point: Point<Fixed>) -> [Fixed; 2] {
        let delta = [point.x - self.current.x, point.y - self.current.y];
        self.current = point;
        delta
    }

    fn stems(&mut self, stems: &[&Hint], operator: Operator) {
        if stems.is_empty() {
            return;
        }
        let mut operands = Vec::with_capacity(stems.len() * 2);
        let mut previous_end = Fixed::ZERO;
        for stem in stems {
            operands.push(stem.position - previous_end);
            operands.push(stem.width);
            previous_end = stem.end();
        }
        self.op(&operands, operator);
    }

    fn counter_mask(&mut self, stem_count: usize, stems: [usize; 2]) {
        self.op(&[], Operator::CntrMask);
        let mut mask = vec![0u8; stem_count.div_ceil(8)];
        for stem in stems {
            mask[stem / 8] |= 0x80 >> (stem % 8);
        }
        self.data.extend_from_slice(&mask);
    }

    fn segment(&mut self, segment: &Segment) {
        match segment {
            Segment::Line { to, .. } => {
                let delta = self.delta(*to);
                self.op(&delta, Operator::RLineTo);
            }
            Segment::Curve { c0, c1, to, .. } => {
                let operands = self.curve_deltas(*c0, *c1, *to);
                self.op(&operands, Operator::RrCurveTo);
            }
        }
    }

    fn curve_deltas(&mut self, c0: Point<Fixed>, c1: Point<Fixed>, to: Point<Fixed>) -> [Fixed; 6] {
        let [dx1, dy1] = self.delta(c0);
        let [dx2, dy2] = self.delta(c1);
        let [dx3, dy3] = self.delta(to);
        [dx1, dy1, dx2, dy2, dx3, dy3]
    }

    fn flex(&mut self, first: &Segment, second: &Segment) {
        let mut operands = Vec::with_capacity(13);
        for segment in [first, second] {
            if let Segment::Curve { c0, c1, to, .. } = segment {
                operands.extend(self.curve_deltas(*c0, *c1, *to));
            }
        }
        operands.push(Fixed::from_i32(FLEX_DEPTH));
        self.op(&operands, Operator::Flex);
    }
}

/// Encodes a glyph with its hints as a Type 2 charstring.
///
/// The program must have been validated against the outline.
pub(crate) fn encode(program: &HintProgram, outline: &GlyphOutline) -> Vec<u8> {
    let mut encoder = Encoder {
        data: Vec::new(),
        width: Some(program.advance_width),
        current: Point::new(Fixed::ZERO, Fixed::ZERO),
    };
    // hint indices of stems in stem order, horizontal first
    let stem_hints: Vec<usize> = Orientation::ALL
        .into_iter()
        .flat_map(|orientation| {
            program
                .hints
                .iter()
                .enumerate()
                .filter(move |(_, hint)| hint.orientation == orientation && !hint.is_flex())
                .map(|(ix, _)| ix)
        })
        .collect();
    let stem_index = |hint: HintIndex| stem_hints.iter().position(|ix| *ix == hint.0);
    let counters: Vec<[usize; 2]> = stem_hints
        .iter()
        .enumerate()
        .filter_map(|(stem, hint_ix)| {
            let partner = stem_index(program.hints[*hint_ix].counter?)?;
            (stem < partner).then_some([stem, partner])
        })
        .collect();
    let (hstem_op, vstem_op) = if counters.is_empty() {
        (Operator::HStem, Operator::VStem)
    } else {
        (Operator::HStemHm, Operator::VStemHm)
    };
    let stems_of = |orientation: Orientation| {
        stem_hints
            .iter()
            .map(|ix| &program.hints[*ix])
            .filter(|hint| hint.orientation == orientation)
            .collect::<Vec<_>>()
    };
    encoder.stems(&stems_of(Orientation::Horizontal), hstem_op);
    encoder.stems(&stems_of(Orientation::Vertical), vstem_op);
    for pair in counters {
        encoder.counter_mask(stem_hints.len(), pair);
    }
    let flex = flex_pairs(program);
    for (contour_ix, contour) in outline.contours().iter().enumerate() {
        let segments = contour.segments();
        let order = segment_order(contour_ix, segments.len(), &flex);
        let Some(&(first, _)) = order.first() else {
            continue;
        };
        let start = encoder.delta(segments[first].from());
        encoder.op(&start, Operator::RMoveTo);
        for (step, &(ix, flex_start)) in order.iter().enumerate() {
            let segment = &segments[ix];
            if flex_start {
                encoder.flex(segment, &segments[contour.next_index(ix)]);
            } else if step + 1 == order.len() && !segment.is_curve() {
                // closing line is implied
                encoder.current = segment.to();
            } else {
                encoder.segment(segment);
            }
        }
    }
    encoder.op(&[], Operator::EndChar);
    encoder.data
}
