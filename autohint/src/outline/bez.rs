//! Reader for the bez glyph text format.
//!
//! A bez glyph is a postfix program: numbers are pushed on an operand stack
//! and consumed by the following operator. A glyph starts with `sc` and
//! ends with `ed`, and `%` starts a comment that runs to the end of the
//! line.
//!
//! ```text
//! % H
//! sc
//! 0 0 mt
//! 80 0 dt
//! 80 700 dt
//! 0 700 dt
//! cp
//! ed
//! ```
//!
//! Hint operators (`rb`, `ry`, `rm`, `rv`) and hint replacement markers are
//! accepted and ignored since hints are recomputed from the outline.

use font_types::Pen;

use super::{GlyphMetrics, GlyphOutline, OutlineBuilder};
use crate::error::MalformedOutlineError;

/// Parses a bez glyph program into a validated outline.
pub fn read(
    name: impl Into<String>,
    source: &str,
    metrics: GlyphMetrics,
) -> Result<GlyphOutline, MalformedOutlineError> {
    let mut reader = Reader::default();
    for (line_ix, line) in source.lines().enumerate() {
        let line_no = line_ix + 1;
        let code = line.split('%').next().unwrap_or_default();
        for token in code.split_whitespace() {
            reader
                .token(token)
                .map_err(|message| MalformedOutlineError::Bez {
                    line: line_no,
                    message,
                })?;
            if reader.ended {
                return reader.pen.finish(name, metrics);
            }
        }
    }
    reader.pen.finish(name, metrics)
}

#[derive(Default)]
struct Reader {
    pen: OutlineBuilder,
    stack: Vec<f64>,
    current: (f64, f64),
    ended: bool,
}

impl Reader {
    fn token(&mut self, token: &str) -> Result<(), String> {
        if let Ok(value) = token.parse::<f64>() {
            self.stack.push(value);
            return Ok(());
        }
        match token {
            "sc" | "sol" | "eol" | "snc" | "enc" | "newcolors" | "preflx1" | "preflx2"
            | "beginsubr" | "endsubr" => {}
            "id" => {
                self.pop_n::<1>(token)?;
            }
            "rb" | "ry" | "rm" | "rv" => {
                self.pop_n::<2>(token)?;
            }
            "ed" => self.ended = true,
            "div" => {
                let [a, b] = self.pop_n(token)?;
                if b == 0.0 {
                    return Err("division by zero".into());
                }
                self.stack.push(a / b);
            }
            "mt" => {
                let [x, y] = self.pop_n(token)?;
                self.move_to(x, y);
            }
            "rmt" => {
                let [dx, dy] = self.pop_n(token)?;
                self.move_to(self.current.0 + dx, self.current.1 + dy);
            }
            "hmt" => {
                let [dx] = self.pop_n(token)?;
                self.move_to(self.current.0 + dx, self.current.1);
            }
            "vmt" => {
                let [dy] = self.pop_n(token)?;
                self.move_to(self.current.0, self.current.1 + dy);
            }
            "dt" => {
                let [x, y] = self.pop_n(token)?;
                self.line_to(x, y);
            }
            "rdt" => {
                let [dx, dy] = self.pop_n(token)?;
                self.line_to(self.current.0 + dx, self.current.1 + dy);
            }
            "hdt" => {
                let [dx] = self.pop_n(token)?;
                self.line_to(self.current.0 + dx, self.current.1);
            }
            "vdt" => {
                let [dy] = self.pop_n(token)?;
                self.line_to(self.current.0, self.current.1 + dy);
            }
            "ct" => {
                let [x1, y1, x2, y2, x3, y3] = self.pop_n(token)?;
                self.curve_to([x1, y1, x2, y2, x3, y3]);
            }
            "rct" => {
                let [dx1, dy1, dx2, dy2, dx3, dy3] = self.pop_n(token)?;
                self.relative_curve_to([dx1, dy1, dx2, dy2, dx3, dy3]);
            }
            "vhct" => {
                let [dy1, dx2, dy2, dx3] = self.pop_n(token)?;
                self.relative_curve_to([0.0, dy1, dx2, dy2, dx3, 0.0]);
            }
            "hvct" => {
                let [dx1, dx2, dy2, dy3] = self.pop_n(token)?;
                self.relative_curve_to([dx1, 0.0, dx2, dy2, 0.0, dy3]);
            }
            "flx" => {
                let [x1, y1, x2, y2, x3, y3, x4, y4, x5, y5, x6, y6] = self.pop_n(token)?;
                self.curve_to([x1, y1, x2, y2, x3, y3]);
                self.curve_to([x4, y4, x5, y5, x6, y6]);
            }
            "cp" => self.pen.close(),
            _ => return Err(format!("unknown operator '{token}'")),
        }
        Ok(())
    }

    fn pop_n<const N: usize>(&mut self, op: &str) -> Result<[f64; N], String> {
        if self.stack.len() < N {
            return Err(format!(
                "'{op}' needs {N} operand(s) but {} are available",
                self.stack.len()
            ));
        }
        let mut values = [0.0; N];
        values.copy_from_slice(&self.stack[self.stack.len() - N..]);
        self.stack.clear();
        Ok(values)
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.pen.move_to(x as f32, y as f32);
        self.current = (x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.pen.line_to(x as f32, y as f32);
        self.current = (x, y);
    }

    fn curve_to(&mut self, [x1, y1, x2, y2, x3, y3]: [f64; 6]) {
        self.pen.curve_to(
            x1 as f32, y1 as f32, x2 as f32, y2 as f32, x3 as f32, y3 as f32,
        );
        self.current = (x3, y3);
    }

    fn relative_curve_to(&mut self, [dx1, dy1, dx2, dy2, dx3, dy3]: [f64; 6]) {
        let (x0, y0) = self.current;
        let (x1, y1) = (x0 + dx1, y0 + dy1);
        let (x2, y2) = (x1 + dx2, y1 + dy2);
        let (x3, y3) = (x2 + dx3, y2 + dy3);
        self.curve_to([x1, y1, x2, y2, x3, y3]);
    }
}
