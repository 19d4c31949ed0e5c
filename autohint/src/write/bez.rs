//! Bez glyph text output.
//!
//! Hints are written before the path: `bottom top rb` for horizontal stems
//! and `left right ry` for vertical stems, with `rv` and `rm` in place of
//! `rb` and `ry` for stems that carry a counter link. Flex pairs are written
//! as a single `flx` with the twelve absolute coordinates of both curves.

use std::fmt::Write;

use font_types::{Fixed, Point};

use super::{flex_pairs, segment_order};
use crate::{
    hint::Orientation,
    merge::HintProgram,
    outline::{GlyphOutline, Segment},
};

fn number(value: Fixed) -> String {
    let bits = value.to_bits();
    if bits & 0xFFFF == 0 {
        return (bits >> 16).to_string();
    }
    let text = format!("{:.4}", value.to_f64());
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn points(points: &[Point<Fixed>]) -> String {
    points
        .iter()
        .flat_map(|point| [number(point.x), number(point.y)])
        .collect::<Vec<_>>()
        .join(" ")
}

/// Writes a glyph with its hints as bez text.
///
/// The program must have been validated against the outline.
pub(crate) fn write(program: &HintProgram, outline: &GlyphOutline) -> String {
    let mut text = String::new();
    // writing to a String cannot fail
    let _ = write_glyph(&mut text, program, outline);
    text
}

fn write_glyph(
    out: &mut String,
    program: &HintProgram,
    outline: &GlyphOutline,
) -> core::fmt::Result {
    writeln!(out, "% {}", program.name)?;
    writeln!(out, "sc")?;
    for hint in program.hints.iter().filter(|hint| !hint.is_flex()) {
        let operator = match (hint.orientation, hint.counter.is_some()) {
            (Orientation::Horizontal, false) => "rb",
            (Orientation::Horizontal, true) => "rv",
            (Orientation::Vertical, false) => "ry",
            (Orientation::Vertical, true) => "rm",
        };
        writeln!(
            out,
            "{} {} {operator}",
            number(hint.position),
            number(hint.end())
        )?;
    }
    let flex = flex_pairs(program);
    for (contour_ix, contour) in outline.contours().iter().enumerate() {
        let segments = contour.segments();
        let order = segment_order(contour_ix, segments.len(), &flex);
        let Some(&(first, _)) = order.first() else {
            continue;
        };
        writeln!(out, "{} mt", points(&[segments[first].from()]))?;
        for (step, &(ix, flex_start)) in order.iter().enumerate() {
            let segment = &segments[ix];
            if flex_start {
                let mut coords = Vec::with_capacity(6);
                for part in [segment, &segments[contour.next_index(ix)]] {
                    if let Segment::Curve { c0, c1, to, .. } = part {
                        coords.extend([*c0, *c1, *to]);
                    }
                }
                writeln!(out, "{} flx", points(&coords))?;
                continue;
            }
            match segment {
                // cp draws the closing line
                Segment::Line { .. } if step + 1 == order.len() => {}
                Segment::Line { to, .. } => writeln!(out, "{} dt", points(&[*to]))?,
                Segment::Curve { c0, c1, to, .. } => {
                    writeln!(out, "{} ct", points(&[*c0, *c1, *to]))?
                }
            }
        }
        writeln!(out, "cp")?;
    }
    writeln!(out, "ed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        hint::{FlexPair, Hint, HintIndex},
        outline::{bez, test_helpers::*},
    };

    fn fixed(value: i32) -> Fixed {
        Fixed::from_i32(value)
    }

    fn program(outline: &GlyphOutline, hints: Vec<Hint>) -> HintProgram {
        HintProgram {
            name: outline.name().into(),
            advance_width: outline.metrics().advance_width,
            hints,
            zones: vec![],
        }
    }

    #[test]
    fn stems_and_path() {
        let outline = glyph("I", vec![rect(100, 0, 180, 700)]);
        let hints = vec![
            Hint::new(Orientation::Horizontal, fixed(0), Fixed::from_f64(60.5)),
            Hint::new(Orientation::Vertical, fixed(100), fixed(80)),
        ];
        let text = write(&program(&outline, hints), &outline);
        let expected = "% I\nsc\n0 60.5 rb\n100 180 ry\n100 0 mt\n180 0 dt\n180 700 dt\n100 700 dt\ncp\ned\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn counter_stems() {
        let outline = glyph("m", vec![rect(0, 0, 80, 500), rect(300, 0, 380, 500)]);
        let mut hints = vec![
            Hint::new(Orientation::Vertical, fixed(0), fixed(80)),
            Hint::new(Orientation::Vertical, fixed(300), fixed(80)),
        ];
        hints[0].counter = Some(HintIndex(1));
        hints[1].counter = Some(HintIndex(0));
        let text = write(&program(&outline, hints), &outline);
        assert!(text.contains("0 80 rm\n300 380 rm\n"));
        assert_eq!(text.matches("cp").count(), 2);
    }

    #[test]
    fn output_reads_back() {
        let source = "sc 0 0 mt 0 100 dt 300 100 dt 300 0 dt \
                      250 0 200 -5 150 -5 ct 100 -5 50 0 0 0 ct cp ed";
        let outline = bez::read("flex", source, Default::default()).unwrap();
        let first_curve = outline.contours()[0]
            .segments()
            .iter()
            .position(|s| s.is_curve())
            .unwrap();
        let hint = Hint::flex(
            Orientation::Horizontal,
            fixed(-5),
            fixed(5),
            FlexPair {
                contour: 0,
                segment: first_curve,
            },
        );
        let text = write(&program(&outline, vec![hint]), &outline);
        assert_eq!(text.matches("flx").count(), 1);
        assert!(!text.contains(" ct"));
        let reread = bez::read("flex", &text, Default::default()).unwrap();
        assert_eq!(reread.contours(), outline.contours());
    }
}
