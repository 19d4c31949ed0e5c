//! CFF private DICT encoding of the font wide hint data.

use font_types::Fixed;

use super::charstring::push_integer;
use crate::{
    merge::{DominantStems, StemSnaps},
    zone::{ZoneKind, ZoneSet},
};

/// Escape byte for two byte operators.
const ESCAPE: u8 = 12;

/// Prefix of a 32 bit integer operand.
const LONG: u8 = 29;

/// Prefix of a real number operand.
const REAL: u8 = 30;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Operator {
    BlueValues,
    OtherBlues,
    StdHw,
    StdVw,
    BlueFuzz,
    StemSnapH,
    StemSnapV,
}

impl Operator {
    fn opcode(self) -> &'static [u8] {
        use Operator::*;
        match self {
            BlueValues => &[6],
            OtherBlues => &[7],
            StdHw => &[10],
            StdVw => &[11],
            BlueFuzz => &[ESCAPE, 11],
            StemSnapH => &[ESCAPE, 12],
            StemSnapV => &[ESCAPE, 13],
        }
    }
}

/// Appends a DICT operand: integers in the short forms and everything else
/// as a binary coded decimal real.
fn push_operand(data: &mut Vec<u8>, value: Fixed) {
    let bits = value.to_bits();
    if bits & 0xFFFF == 0 {
        push_dict_integer(data, bits >> 16);
    } else {
        push_real(data, value.to_f64());
    }
}

/// Appends an integer operand, falling back to the five byte form when the
/// value does not fit in 16 bits.
fn push_dict_integer(data: &mut Vec<u8>, value: i32) {
    match i16::try_from(value) {
        Ok(value) => push_integer(data, value),
        Err(_) => {
            data.push(LONG);
            data.extend_from_slice(&value.to_be_bytes());
        }
    }
}

/// Appends a real number operand.
///
/// Nibbles are the decimal digits, `a` for the decimal point, `e` for a
/// minus sign and `f` to terminate.
fn push_real(data: &mut Vec<u8>, value: f64) {
    let text = format!("{value:.5}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    // leading zeros of the integer part carry no information
    let text = match text.strip_prefix('-') {
        Some(rest) => format!("-{}", rest.strip_prefix('0').unwrap_or(rest)),
        None => text.strip_prefix('0').unwrap_or(text).to_string(),
    };
    let mut nibbles: Vec<u8> = text
        .bytes()
        .map(|byte| match byte {
            b'.' => 0xA,
            b'-' => 0xE,
            digit => digit - b'0',
        })
        .collect();
    nibbles.push(0xF);
    if nibbles.len() % 2 == 1 {
        nibbles.push(0xF);
    }
    data.push(REAL);
    data.extend(nibbles.chunks(2).map(|pair| (pair[0] << 4) | pair[1]));
}

/// Appends an array operand where every value after the first is stored as
/// the difference to its predecessor.
fn push_delta_array(data: &mut Vec<u8>, values: &[Fixed]) {
    let mut previous = Fixed::ZERO;
    for value in values {
        push_operand(data, *value - previous);
        previous = *value;
    }
}

fn entry(data: &mut Vec<u8>, values: &[Fixed], operator: Operator, delta: bool) {
    if values.is_empty() {
        return;
    }
    if delta {
        push_delta_array(data, values);
    } else {
        for value in values {
            push_operand(data, *value);
        }
    }
    data.extend_from_slice(operator.opcode());
}

/// Encodes the zones and dominant stems as private DICT entries.
///
/// `BlueValues` holds the baseline and the top zones and `OtherBlues` the
/// remaining bottom zones, each as ascending (bottom, top) pairs.
pub(crate) fn encode(zones: &ZoneSet, stems: &StemSnaps, blue_fuzz: Fixed) -> Vec<u8> {
    let bands = |blue_values: bool| {
        zones
            .iter()
            .filter(|(_, zone)| ZoneKind::is_blue_value(zone.kind) == blue_values)
            .flat_map(|(_, zone)| {
                let (bottom, top) = zone.bounds();
                [bottom, top]
            })
            .collect::<Vec<_>>()
    };
    let mut data = Vec::new();
    entry(&mut data, &bands(true), Operator::BlueValues, true);
    entry(&mut data, &bands(false), Operator::OtherBlues, true);
    entry(&mut data, &[blue_fuzz], Operator::BlueFuzz, false);
    for (stems, std_op, snap_op) in [
        (&stems.horizontal, Operator::StdHw, Operator::StemSnapH),
        (&stems.vertical, Operator::StdVw, Operator::StemSnapV),
    ] {
        let DominantStems { standard, snaps } = stems;
        entry(&mut data, standard.as_slice(), std_op, false);
        entry(&mut data, snaps, snap_op, true);
    }
    data
}
