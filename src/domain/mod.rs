//! Domain layer: hierarchy, links and edge geometry
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod bundle;
pub mod color;
pub mod error;
pub mod geometry;
pub mod hierarchy;
pub mod layout;
pub mod links;
pub mod path;
pub mod record;

pub use bundle::{BundleCurve, DEFAULT_BETA};
pub use color::{ease_quad, fragment_color, rdbu, Rgb, UNSPLIT_COLOR};
pub use error::{DomainError, MalformedHierarchy};
pub use geometry::{BezierCurve, Line, PathSink, Point, Segment};
pub use hierarchy::{
    Hierarchy, HierarchyBuilder, HierarchyResult, NodeData, NodeId, TreeNode, DEFAULT_DELIMITER,
};
pub use layout::{ClusterLayout, LabelAnchor, Layout, Placement};
pub use links::{bilink, resolved_links, LeafLinks, Link};
pub use path::{CurvePath, Fragments, MAX_SPLIT_DEPTH};
pub use record::Record;
