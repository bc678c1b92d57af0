//! Radial cluster layout: leaves on the outer ring, groups toward the center.

use std::collections::HashMap;
use std::f64::consts::{PI, TAU};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::geometry::Point;
use crate::domain::hierarchy::{Hierarchy, NodeId};

/// Polar position of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    /// Radians, clockwise from 12 o'clock
    pub angle: f64,
    pub radius: f64,
}

/// Side of a leaf label that touches the ring.
///
/// Labels on the left half are rotated by 180 degrees so they read upright,
/// which puts their end next to the leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelAnchor {
    Start,
    End,
}

impl LabelAnchor {
    /// Whether the label is flipped by 180 degrees.
    pub fn is_flipped(self) -> bool {
        self == LabelAnchor::End
    }
}

impl Placement {
    pub fn point(&self) -> Point {
        Point::from_polar(self.angle, self.radius)
    }

    pub fn label_anchor(&self) -> LabelAnchor {
        if self.angle < PI {
            LabelAnchor::Start
        } else {
            LabelAnchor::End
        }
    }
}

/// Placements for every node of one hierarchy.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    placements: HashMap<NodeId, Placement>,
}

impl Layout {
    pub fn get(&self, idx: NodeId) -> Option<Placement> {
        self.placements.get(&idx).copied()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Cartesian points for a node path; nodes without placement are skipped.
    pub fn points(&self, path: &[NodeId]) -> Vec<Point> {
        path.iter()
            .filter_map(|&idx| self.get(idx))
            .map(|p| p.point())
            .collect()
    }
}

/// Dendrogram-style layout bent into a circle.
///
/// Leaves are spaced evenly around `angle_span`, one unit apart when they
/// share a parent and two units otherwise. A parent sits at the mean angle of
/// its children. Radius grows from 0 at the root to `radius` at the leaves,
/// so every leaf lands on the same ring regardless of its depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterLayout {
    pub angle_span: f64,
    pub radius: f64,
}

impl ClusterLayout {
    pub fn new(radius: f64) -> Self {
        Self {
            angle_span: TAU,
            radius,
        }
    }

    #[instrument(level = "debug", skip(self, hierarchy))]
    pub fn layout(&self, hierarchy: &Hierarchy) -> Layout {
        // (x, y): x in separation units, y in levels above the leaves
        let mut raw: HashMap<NodeId, (f64, f64)> = HashMap::with_capacity(hierarchy.len());
        let mut previous: Option<NodeId> = None;
        let mut x = 0.0;

        for (idx, node) in hierarchy.iter_postorder() {
            if node.is_leaf() {
                if let Some(prev) = previous {
                    x += separation(hierarchy, idx, prev);
                }
                raw.insert(idx, (x, 0.0));
                previous = Some(idx);
            } else {
                let children: Vec<(f64, f64)> =
                    node.children.iter().filter_map(|c| raw.get(c).copied()).collect();
                let mean_x = children.iter().map(|c| c.0).sum::<f64>() / children.len() as f64;
                let max_y = children.iter().map(|c| c.1).fold(0.0, f64::max);
                raw.insert(idx, (mean_x, max_y + 1.0));
            }
        }

        let root = hierarchy.root();
        let left = edge_leaf(hierarchy, root, |children| children.first());
        let right = edge_leaf(hierarchy, root, |children| children.last());
        let x0 = raw[&left].0 - separation(hierarchy, left, right) / 2.0;
        let x1 = raw[&right].0 + separation(hierarchy, right, left) / 2.0;
        let root_y = raw[&root].1;

        let placements = raw
            .into_iter()
            .map(|(idx, (x, y))| {
                let angle = (x - x0) / (x1 - x0) * self.angle_span;
                let depth_ratio = if root_y > 0.0 { y / root_y } else { 1.0 };
                let radius = (1.0 - depth_ratio) * self.radius;
                (idx, Placement { angle, radius })
            })
            .collect::<HashMap<_, _>>();

        debug!("placed {} nodes", placements.len());
        Layout { placements }
    }
}

fn separation(hierarchy: &Hierarchy, a: NodeId, b: NodeId) -> f64 {
    let parent = |n: NodeId| hierarchy.get_node(n).and_then(|node| node.parent);
    if parent(a) == parent(b) {
        1.0
    } else {
        2.0
    }
}

/// Follow first (or last) children down to a leaf.
fn edge_leaf(
    hierarchy: &Hierarchy,
    start: NodeId,
    pick: impl Fn(&[NodeId]) -> Option<&NodeId>,
) -> NodeId {
    let mut current = start;
    while let Some(&next) = hierarchy
        .get_node(current)
        .and_then(|node| pick(node.children.as_slice()))
    {
        current = next;
    }
    current
}
