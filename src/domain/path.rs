//! Segment paths and their recursive bisection into stroke fragments.

use std::fmt;

use crate::domain::error::DomainError;
use crate::domain::geometry::{BezierCurve, Line, PathSink, Point, Segment};

/// Deepest split allowed by [`CurvePath::subdivide`]: 2^16 fragments per path.
pub const MAX_SPLIT_DEPTH: u32 = 16;

/// Ordered, connected run of segments.
///
/// Implements [`PathSink`], so a curve generator can draw straight into it.
/// `move_to` starts over: a path holds a single continuous stroke.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurvePath {
    segments: Vec<Segment>,
    cursor: Option<Point>,
}

impl CurvePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let cursor = segments.last().map(Segment::end);
        Self { segments, cursor }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn start(&self) -> Option<Point> {
        self.segments.first().map(Segment::start)
    }

    pub fn end(&self) -> Option<Point> {
        self.segments.last().map(Segment::end)
    }

    /// Bisect at the middle segment index.
    ///
    /// With an odd segment count the middle segment itself is split, so both
    /// halves meet inside it rather than at a segment boundary.
    pub fn split(&self) -> (CurvePath, CurvePath) {
        let n = self.segments.len();
        let (i, j) = (n / 2, n.div_ceil(2));
        let mut head = self.segments[..i].to_vec();
        let mut tail = self.segments[j..].to_vec();
        if i != j {
            let (ab, ba) = self.segments[i].split();
            head.push(ab);
            tail.insert(0, ba);
        }
        (CurvePath::from_segments(head), CurvePath::from_segments(tail))
    }

    /// Lazily yield `2^depth` fragments from start to end.
    ///
    /// Depth 0 and empty paths yield the path itself once. Each call starts
    /// from scratch.
    pub fn fragments(&self, depth: u32) -> Fragments {
        Fragments {
            stack: vec![(self.clone(), depth)],
        }
    }

    /// Collected [`Self::fragments`], rejecting depths above [`MAX_SPLIT_DEPTH`].
    pub fn subdivide(&self, depth: u32) -> Result<Vec<CurvePath>, DomainError> {
        if depth > MAX_SPLIT_DEPTH {
            return Err(DomainError::InvalidSplitDepth {
                depth,
                max: MAX_SPLIT_DEPTH,
            });
        }
        Ok(self.fragments(depth).collect())
    }

    fn push(&mut self, segment: Segment) {
        self.cursor = Some(segment.end());
        self.segments.push(segment);
    }
}

impl PathSink for CurvePath {
    fn move_to(&mut self, x: f64, y: f64) {
        self.segments.clear();
        self.cursor = Some(Point::new(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let to = Point::new(x, y);
        match self.cursor {
            Some(from) => self.push(Segment::Line(Line::new(from, to))),
            None => self.cursor = Some(to),
        }
    }

    fn bezier_curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        let to = Point::new(x, y);
        match self.cursor {
            Some(from) => self.push(Segment::Bezier(BezierCurve::new(
                from,
                Point::new(x1, y1),
                Point::new(x2, y2),
                to,
            ))),
            None => self.cursor = Some(to),
        }
    }
}

impl fmt::Display for CurvePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Depth-first bisection of a path, see [`CurvePath::fragments`].
#[derive(Debug, Clone)]
pub struct Fragments {
    stack: Vec<(CurvePath, u32)>,
}

impl Iterator for Fragments {
    type Item = CurvePath;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((path, depth)) = self.stack.pop() {
            if depth == 0 || path.is_empty() {
                return Some(path);
            }
            let (head, tail) = path.split();
            // Tail first so the head comes off the stack next
            self.stack.push((tail, depth - 1));
            self.stack.push((head, depth - 1));
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .stack
            .iter()
            .map(|(path, depth)| {
                if path.is_empty() {
                    1
                } else {
                    1usize.checked_shl(*depth).unwrap_or(usize::MAX)
                }
            })
            .fold(0usize, usize::saturating_add);
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn zigzag() -> CurvePath {
        let mut path = CurvePath::new();
        path.move_to(0.0, 0.0);
        path.line_to(1.0, 1.0);
        path.bezier_curve_to(2.0, 2.0, 3.0, 0.0, 4.0, 1.0);
        path.line_to(6.0, 0.0);
        path
    }

    fn endpoints(fragments: &[CurvePath]) -> Vec<(Point, Point)> {
        fragments
            .iter()
            .map(|f| (f.start().unwrap(), f.end().unwrap()))
            .collect()
    }

    #[rstest]
    #[case(0, 1)]
    #[case(1, 2)]
    #[case(3, 8)]
    #[case(6, 64)]
    fn given_depth_when_subdividing_then_yields_power_of_two_fragments(
        #[case] depth: u32,
        #[case] expected: usize,
    ) {
        let fragments = zigzag().fragments(depth);
        assert_eq!(fragments.size_hint(), (expected, Some(expected)));
        assert_eq!(fragments.count(), expected);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(5)]
    fn given_depth_when_subdividing_then_fragments_chain_end_to_end(#[case] depth: u32) {
        let path = zigzag();
        let fragments = path.subdivide(depth).unwrap();
        let ends = endpoints(&fragments);

        assert_eq!(ends.first().unwrap().0, path.start().unwrap());
        assert_eq!(ends.last().unwrap().1, path.end().unwrap());
        for pair in ends.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
    }

    #[test]
    fn given_odd_segment_count_when_splitting_then_middle_segment_is_halved() {
        let (head, tail) = zigzag().split();
        assert_eq!(head.len(), 2);
        assert_eq!(tail.len(), 2);
        assert_eq!(head.end(), tail.start());
        assert!(matches!(head.segments()[1], Segment::Bezier(_)));
    }

    #[test]
    fn given_single_line_when_splitting_once_then_two_halves_of_the_line() {
        let mut path = CurvePath::new();
        path.move_to(0.0, 0.0);
        path.line_to(2.0, 4.0);
        let fragments = path.subdivide(1).unwrap();
        assert_eq!(
            endpoints(&fragments),
            vec![
                (Point::new(0.0, 0.0), Point::new(1.0, 2.0)),
                (Point::new(1.0, 2.0), Point::new(2.0, 4.0)),
            ]
        );
    }

    #[test]
    fn given_empty_path_when_subdividing_then_single_empty_fragment() {
        let fragments = CurvePath::new().subdivide(4).unwrap();
        assert_eq!(fragments, vec![CurvePath::new()]);
    }

    #[test]
    fn given_excessive_depth_when_subdividing_then_errors() {
        let err = zigzag().subdivide(MAX_SPLIT_DEPTH + 1).unwrap_err();
        assert!(matches!(err, DomainError::InvalidSplitDepth { .. }));
    }

    #[test]
    fn given_fragments_when_restarted_then_same_sequence() {
        let path = zigzag();
        let first: Vec<String> = path.fragments(3).map(|f| f.to_string()).collect();
        let second: Vec<String> = path.fragments(3).map(|f| f.to_string()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn given_move_to_when_drawing_then_previous_segments_dropped() {
        let mut path = zigzag();
        path.move_to(10.0, 10.0);
        assert!(path.is_empty());
        path.line_to(11.0, 10.0);
        assert_eq!(path.to_string(), "M10,10L11,10");
    }
}
