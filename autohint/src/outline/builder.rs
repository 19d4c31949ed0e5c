//! Building outlines from pen commands.

use font_types::{Fixed, Pen, Point};

use super::{GlyphMetrics, GlyphOutline, Segment};
use crate::error::MalformedOutlineError;

/// Pen that collects drawing commands into a [`GlyphOutline`].
///
/// Quadratic segments are elevated to cubics. Closing a subpath adds a line
/// back to its start when the current point differs from it. A subpath that
/// is left unclosed is accepted only if it already ends where it started.
#[derive(Default, Debug)]
pub struct OutlineBuilder {
    contours: Vec<Vec<Segment>>,
    current: Vec<Segment>,
    start: Option<Point<Fixed>>,
    last: Point<Fixed>,
    error: Option<MalformedOutlineError>,
}

impl OutlineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the builder and validates the collected contours.
    pub fn finish(
        mut self,
        name: impl Into<String>,
        metrics: GlyphMetrics,
    ) -> Result<GlyphOutline, MalformedOutlineError> {
        self.end_subpath();
        if let Some(error) = self.error {
            return Err(error);
        }
        GlyphOutline::new(name, metrics, self.contours)
    }

    fn fail(&mut self, error: MalformedOutlineError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn point(&mut self, x: f32, y: f32) -> Point<Fixed> {
        if !x.is_finite() || !y.is_finite() {
            let contour = self.contours.len();
            self.fail(MalformedOutlineError::NonFinite { contour });
            return self.last;
        }
        Point::new(Fixed::from_f64(x as f64), Fixed::from_f64(y as f64))
    }

    /// Returns the current point, recording an error if no subpath is open.
    fn current_point(&mut self) -> Point<Fixed> {
        if self.start.is_none() {
            self.fail(MalformedOutlineError::MissingMoveTo);
        }
        self.last
    }

    fn end_subpath(&mut self) {
        let Some(start) = self.start.take() else {
            return;
        };
        if self.current.is_empty() {
            return;
        }
        if self.last != start {
            let contour = self.contours.len();
            self.fail(MalformedOutlineError::OpenContour { contour });
        }
        self.contours.push(core::mem::take(&mut self.current));
    }
}

impl Pen for OutlineBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.end_subpath();
        let point = self.point(x, y);
        self.start = Some(point);
        self.last = point;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let from = self.current_point();
        let to = self.point(x, y);
        self.current.push(Segment::Line { from, to });
        self.last = to;
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        let from = self.current_point();
        let control = self.point(cx0, cy0);
        let to = self.point(x, y);
        let two_thirds = |a: Fixed, b: Fixed| a + Fixed::from_f64((b - a).to_f64() * 2.0 / 3.0);
        let c0 = Point::new(two_thirds(from.x, control.x), two_thirds(from.y, control.y));
        let c1 = Point::new(two_thirds(to.x, control.x), two_thirds(to.y, control.y));
        self.current.push(Segment::Curve { from, c0, c1, to });
        self.last = to;
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let from = self.current_point();
        let c0 = self.point(cx0, cy0);
        let c1 = self.point(cx1, cy1);
        let to = self.point(x, y);
        self.current.push(Segment::Curve { from, c0, c1, to });
        self.last = to;
    }

    fn close(&mut self) {
        let Some(start) = self.start else {
            return;
        };
        if self.last != start && !self.current.is_empty() {
            self.current.push(Segment::Line {
                from: self.last,
                to: start,
            });
            self.last = start;
        }
        self.end_subpath();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::test_helpers::pt;

    #[test]
    fn closes_with_line() {
        let mut pen = OutlineBuilder::new();
        pen.move_to(0.0, 0.0);
        pen.line_to(100.0, 0.0);
        pen.line_to(100.0, 100.0);
        pen.close();
        let outline = pen.finish("a", GlyphMetrics::default()).unwrap();
        let segments = outline.contours()[0].segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(
            segments[2],
            Segment::Line {
                from: pt(100, 100),
                to: pt(0, 0)
            }
        );
    }

    #[test]
    fn quadratic_elevated() {
        let mut pen = OutlineBuilder::new();
        pen.move_to(0.0, 0.0);
        pen.quad_to(150.0, 300.0, 300.0, 0.0);
        pen.close();
        let outline = pen.finish("a", GlyphMetrics::default()).unwrap();
        let segments = outline.contours()[0].segments();
        assert!(segments.iter().any(|segment| *segment
            == Segment::Curve {
                from: pt(0, 0),
                c0: pt(100, 200),
                c1: pt(200, 200),
                to: pt(300, 0),
            }
            || *segment
                == Segment::Curve {
                    from: pt(300, 0),
                    c0: pt(200, 200),
                    c1: pt(100, 200),
                    to: pt(0, 0),
                }));
    }

    #[test]
    fn unclosed_subpath_is_open() {
        let mut pen = OutlineBuilder::new();
        pen.move_to(0.0, 0.0);
        pen.line_to(100.0, 0.0);
        pen.line_to(100.0, 100.0);
        pen.move_to(200.0, 0.0);
        let err = pen.finish("a", GlyphMetrics::default()).unwrap_err();
        assert_eq!(err, MalformedOutlineError::OpenContour { contour: 0 });
    }

    #[test]
    fn draw_without_move() {
        let mut pen = OutlineBuilder::new();
        pen.line_to(100.0, 0.0);
        let err = pen.finish("a", GlyphMetrics::default()).unwrap_err();
        assert_eq!(err, MalformedOutlineError::MissingMoveTo);
    }

    #[test]
    fn non_finite_coordinate() {
        let mut pen = OutlineBuilder::new();
        pen.move_to(0.0, 0.0);
        pen.line_to(f32::NAN, 0.0);
        pen.line_to(0.0, 100.0);
        pen.close();
        let err = pen.finish("a", GlyphMetrics::default()).unwrap_err();
        assert_eq!(err, MalformedOutlineError::NonFinite { contour: 0 });
    }
}
