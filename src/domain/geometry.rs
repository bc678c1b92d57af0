//! 2D points and the two path segment kinds.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Cartesian point for a polar coordinate, angle measured clockwise from 12 o'clock.
    pub fn from_polar(angle: f64, radius: f64) -> Point {
        Point::new(radius * angle.sin(), -radius * angle.cos())
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Straight segment from `a` to `b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub a: Point,
    pub b: Point,
}

impl Line {
    pub fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// Halves meeting at the midpoint.
    pub fn split(&self) -> (Line, Line) {
        let m = self.a.midpoint(self.b);
        (Line::new(self.a, m), Line::new(m, self.b))
    }
}

// De Casteljau at t = 1/2, as weights over (a, b, c, d).
const L1: [f64; 4] = [4.0 / 8.0, 4.0 / 8.0, 0.0, 0.0];
const L2: [f64; 4] = [2.0 / 8.0, 4.0 / 8.0, 2.0 / 8.0, 0.0];
const MID: [f64; 4] = [1.0 / 8.0, 3.0 / 8.0, 3.0 / 8.0, 1.0 / 8.0];
const R1: [f64; 4] = [0.0, 2.0 / 8.0, 4.0 / 8.0, 2.0 / 8.0];
const R2: [f64; 4] = [0.0, 0.0, 4.0 / 8.0, 4.0 / 8.0];

/// Cubic Bézier curve: anchors `a` and `d`, control points `b` and `c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierCurve {
    pub a: Point,
    pub b: Point,
    pub c: Point,
    pub d: Point,
}

impl BezierCurve {
    pub fn new(a: Point, b: Point, c: Point, d: Point) -> Self {
        Self { a, b, c, d }
    }

    fn blend(&self, [ka, kb, kc, kd]: [f64; 4]) -> Point {
        let (a, b, c, d) = (self.a, self.b, self.c, self.d);
        Point::new(
            ka * a.x + kb * b.x + kc * c.x + kd * d.x,
            ka * a.y + kb * b.y + kc * c.y + kd * d.y,
        )
    }

    /// Point at parameter `t` in `[0, 1]`.
    pub fn point_at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        self.blend([u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t])
    }

    /// Two cubic curves that together trace this one, meeting at `t = 1/2`.
    pub fn split(&self) -> (BezierCurve, BezierCurve) {
        let m = self.blend(MID);
        (
            BezierCurve::new(self.a, self.blend(L1), self.blend(L2), m),
            BezierCurve::new(m, self.blend(R1), self.blend(R2), self.d),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line(Line),
    Bezier(BezierCurve),
}

impl Segment {
    pub fn start(&self) -> Point {
        match self {
            Segment::Line(l) => l.a,
            Segment::Bezier(c) => c.a,
        }
    }

    pub fn end(&self) -> Point {
        match self {
            Segment::Line(l) => l.b,
            Segment::Bezier(c) => c.d,
        }
    }

    pub fn split(&self) -> (Segment, Segment) {
        match self {
            Segment::Line(l) => {
                let (head, tail) = l.split();
                (Segment::Line(head), Segment::Line(tail))
            }
            Segment::Bezier(c) => {
                let (head, tail) = c.split();
                (Segment::Bezier(head), Segment::Bezier(tail))
            }
        }
    }
}

/// SVG path data for a single segment, each starting with its own move-to.
impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Line(l) => write!(f, "M{}L{}", l.a, l.b),
            Segment::Bezier(c) => write!(f, "M{}C{},{},{}", c.a, c.b, c.c, c.d),
        }
    }
}

/// Receiver for path drawing commands.
pub trait PathSink {
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn bezier_curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64);
}
