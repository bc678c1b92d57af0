//! Bundled edge routing: a B-spline through the tree path, pulled toward
//! the straight chord between its ends.

use crate::domain::geometry::{PathSink, Point};
use crate::domain::hierarchy::{Hierarchy, NodeId};
use crate::domain::layout::Layout;
use crate::domain::path::CurvePath;

/// Default bundling strength.
pub const DEFAULT_BETA: f64 = 0.85;

/// Curve generator for bundled edges.
///
/// `beta` = 1 follows the tree path fully, `beta` = 0 draws the chord.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BundleCurve {
    pub beta: f64,
}

impl Default for BundleCurve {
    fn default() -> Self {
        Self { beta: DEFAULT_BETA }
    }
}

impl BundleCurve {
    pub fn new(beta: f64) -> Self {
        Self { beta }
    }

    /// Draw the curve through `points` into `sink`.
    ///
    /// Fewer than two points draw nothing.
    pub fn draw<S: PathSink>(&self, points: &[Point], sink: &mut S) {
        let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
            return;
        };
        let j = points.len() - 1;
        if j == 0 {
            return;
        }

        let beta = self.beta;
        let mut basis = Basis::new(sink);
        for (i, p) in points.iter().enumerate() {
            let t = i as f64 / j as f64;
            basis.point(Point::new(
                beta * p.x + (1.0 - beta) * (first.x + t * (last.x - first.x)),
                beta * p.y + (1.0 - beta) * (first.y + t * (last.y - first.y)),
            ));
        }
        basis.finish();
    }

    /// Route the edge `source → target` through their common ancestors.
    pub fn route(
        &self,
        hierarchy: &Hierarchy,
        layout: &Layout,
        source: NodeId,
        target: NodeId,
    ) -> CurvePath {
        let points = layout.points(&hierarchy.path_between(source, target));
        let mut path = CurvePath::new();
        self.draw(&points, &mut path);
        path
    }
}

/// Uniform cubic B-spline emitter: the curve starts at the first point, ends
/// at the last, and is pulled toward the points in between.
struct Basis<'a, S: PathSink> {
    sink: &'a mut S,
    seen: u8,
    p0: Point,
    p1: Point,
}

impl<'a, S: PathSink> Basis<'a, S> {
    fn new(sink: &'a mut S) -> Self {
        Self {
            sink,
            seen: 0,
            p0: Point::default(),
            p1: Point::default(),
        }
    }

    fn point(&mut self, p: Point) {
        match self.seen {
            0 => {
                self.seen = 1;
                self.sink.move_to(p.x, p.y);
            }
            1 => self.seen = 2,
            2 => {
                self.seen = 3;
                self.sink.line_to(
                    (5.0 * self.p0.x + self.p1.x) / 6.0,
                    (5.0 * self.p0.y + self.p1.y) / 6.0,
                );
                self.curve(p);
            }
            _ => self.curve(p),
        }
        self.p0 = self.p1;
        self.p1 = p;
    }

    fn curve(&mut self, p: Point) {
        let (p0, p1) = (self.p0, self.p1);
        self.sink.bezier_curve_to(
            (2.0 * p0.x + p1.x) / 3.0,
            (2.0 * p0.y + p1.y) / 3.0,
            (p0.x + 2.0 * p1.x) / 3.0,
            (p0.y + 2.0 * p1.y) / 3.0,
            (p0.x + 4.0 * p1.x + p.x) / 6.0,
            (p0.y + 4.0 * p1.y + p.y) / 6.0,
        );
    }

    fn finish(mut self) {
        match self.seen {
            3 => {
                let last = self.p1;
                self.curve(last);
                self.sink.line_to(last.x, last.y);
            }
            2 => self.sink.line_to(self.p1.x, self.p1.y),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::Segment;

    fn close(a: Option<Point>, b: Point) -> bool {
        a.is_some_and(|a| (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9)
    }

    fn draw(beta: f64, points: &[Point]) -> CurvePath {
        let mut path = CurvePath::new();
        BundleCurve::new(beta).draw(points, &mut path);
        path
    }

    #[test]
    fn given_two_points_when_drawing_then_single_line() {
        let path = draw(0.85, &[Point::new(0.0, 0.0), Point::new(3.0, 4.0)]);
        assert_eq!(path.len(), 1);
        assert!(matches!(path.segments()[0], Segment::Line(_)));
        assert!(close(path.start(), Point::new(0.0, 0.0)));
        assert!(close(path.end(), Point::new(3.0, 4.0)));
    }

    #[test]
    fn given_one_point_when_drawing_then_empty_path() {
        assert!(draw(0.85, &[Point::new(1.0, 1.0)]).is_empty());
        assert!(draw(0.85, &[]).is_empty());
    }

    #[test]
    fn given_tree_path_when_drawing_then_curve_spans_source_to_target() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(5.0, 5.0),
            Point::new(10.0, 5.0),
            Point::new(15.0, 0.0),
        ];
        let path = draw(0.85, &points);
        assert!(close(path.start(), points[0]));
        assert!(close(path.end(), points[3]));
        for pair in path.segments().windows(2) {
            assert_eq!(pair[0].end(), pair[1].start());
        }
        assert!(path
            .segments()
            .iter()
            .any(|s| matches!(s, Segment::Bezier(_))));
    }

    #[test]
    fn given_zero_beta_when_drawing_then_all_points_on_chord() {
        let points = [Point::new(0.0, 0.0), Point::new(5.0, 9.0), Point::new(10.0, 0.0)];
        let path = draw(0.0, &points);
        for segment in path.segments() {
            assert!(segment.start().y.abs() < 1e-9);
            assert!(segment.end().y.abs() < 1e-9);
        }
    }
}
