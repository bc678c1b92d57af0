//! Edge bundling service
//!
//! Turns a record file into a linked hierarchy, a radial layout and
//! subdivided, colored edge paths.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    bilink, fragment_color, resolved_links, BundleCurve, ClusterLayout, DomainError, Hierarchy,
    HierarchyBuilder, LabelAnchor, Layout, Record, Rgb, DEFAULT_BETA, DEFAULT_DELIMITER, MAX_SPLIT_DEPTH,
};
use crate::infrastructure::traits::FileSystem;

/// Parameters of one bundling run.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleOptions {
    pub delimiter: String,
    pub implicit_root: Option<String>,
    /// Each edge is cut into `2^split_depth` fragments
    pub split_depth: u32,
    pub beta: f64,
    /// Radius of the leaf ring
    pub radius: f64,
    /// Order children by height, then name, before layout
    pub sort: bool,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            implicit_root: None,
            split_depth: 6,
            beta: DEFAULT_BETA,
            radius: 350.0,
            sort: true,
        }
    }
}

impl From<&Settings> for BundleOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            delimiter: settings.delimiter.clone(),
            implicit_root: settings.implicit_root.clone(),
            split_depth: settings.split_depth,
            beta: settings.beta,
            radius: settings.outer_radius(),
            sort: settings.sort,
        }
    }
}

/// Link counts of one leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeafSummary {
    pub name: String,
    pub outgoing: usize,
    pub incoming: usize,
    /// References that name no leaf
    pub dangling: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafPlacement {
    pub name: String,
    pub angle: f64,
    pub radius: f64,
    pub anchor: LabelAnchor,
    /// Label rotated by 180 degrees to stay upright
    pub flipped: bool,
    pub x: f64,
    pub y: f64,
}

/// One stroke-able piece of an edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fragment {
    pub index: usize,
    pub color: Rgb,
    /// SVG path data
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BundledEdge {
    pub source: String,
    pub target: String,
    pub fragments: Vec<Fragment>,
}

/// Fragments sharing an index across all edges, drawn as one layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    pub index: usize,
    pub color: Rgb,
    pub paths: Vec<String>,
}

/// Output from a bundling run.
#[derive(Debug, Clone)]
pub struct BundleOutput {
    pub hierarchy: Hierarchy,
    pub layout: Layout,
    /// Edges in leaf order, self references omitted
    pub edges: Vec<BundledEdge>,
    pub split_depth: u32,
}

impl BundleOutput {
    /// Edges transposed into per-index layers, at most `2^MAX_SPLIT_DEPTH`.
    pub fn strokes(&self) -> Vec<Stroke> {
        let count = 1usize << self.split_depth.min(MAX_SPLIT_DEPTH);
        (0..count)
            .map(|index| Stroke {
                index,
                color: fragment_color(index, self.split_depth),
                paths: self
                    .edges
                    .iter()
                    .filter_map(|edge| edge.fragments.get(index))
                    .map(|fragment| fragment.path.clone())
                    .collect(),
            })
            .collect()
    }

    pub fn leaf_summaries(&self) -> Vec<LeafSummary> {
        BundleService::leaf_summaries(&self.hierarchy)
    }

    pub fn placements(&self) -> Vec<LeafPlacement> {
        BundleService::placements(&self.hierarchy, &self.layout)
    }
}

/// Service for building bundled edge diagrams from record files.
pub struct BundleService {
    fs: Arc<dyn FileSystem>,
}

impl BundleService {
    /// Create a new bundle service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Read a JSON array of records.
    pub fn load_records(&self, path: &Path) -> ApplicationResult<Vec<Record>> {
        debug!("load_records: path={}", path.display());
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read records", path)?;
        let records: Vec<Record> =
            serde_json::from_str(&content).map_err(|e| ApplicationError::InvalidRecords {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        debug!("load_records: {} records", records.len());
        Ok(records)
    }

    /// Build, optionally sort, and link the hierarchy.
    #[instrument(level = "debug", skip(self, records, options), fields(records = records.len()))]
    pub fn build(&self, records: &[Record], options: &BundleOptions) -> ApplicationResult<Hierarchy> {
        let mut hierarchy = HierarchyBuilder::new()
            .delimiter(options.delimiter.clone())
            .implicit_root(options.implicit_root.clone())
            .build(records)?;
        if options.sort {
            hierarchy.sort_children();
        }
        bilink(&mut hierarchy);
        Ok(hierarchy)
    }

    /// Full pipeline: hierarchy, layout and subdivided edges.
    #[instrument(level = "debug", skip(self, records, options))]
    pub fn bundle(&self, records: &[Record], options: &BundleOptions) -> ApplicationResult<BundleOutput> {
        validate(options)?;
        let hierarchy = self.build(records, options)?;
        let layout = ClusterLayout::new(options.radius).layout(&hierarchy);
        let curve = BundleCurve::new(options.beta);
        let depth = options.split_depth;

        let links = resolved_links(&hierarchy);
        debug!("bundle: routing {} links at depth {}", links.len(), depth);

        let edges: Vec<BundledEdge> = links
            .par_iter()
            .filter_map(|&(source, target)| {
                let path = curve.route(&hierarchy, &layout, source, target);
                if path.is_empty() {
                    trace!("skipping self reference {}", hierarchy.full_name(source));
                    return None;
                }
                let fragments = path
                    .fragments(depth)
                    .enumerate()
                    .map(|(index, fragment)| Fragment {
                        index,
                        color: fragment_color(index, depth),
                        path: fragment.to_string(),
                    })
                    .collect();
                Some(BundledEdge {
                    source: hierarchy.full_name(source),
                    target: hierarchy.full_name(target),
                    fragments,
                })
            })
            .collect();

        Ok(BundleOutput {
            hierarchy,
            layout,
            edges,
            split_depth: depth,
        })
    }

    pub fn bundle_file(&self, path: &Path, options: &BundleOptions) -> ApplicationResult<BundleOutput> {
        let records = self.load_records(path)?;
        self.bundle(&records, options)
    }

    pub fn leaf_summaries(hierarchy: &Hierarchy) -> Vec<LeafSummary> {
        hierarchy
            .leaves()
            .into_iter()
            .filter_map(|leaf| hierarchy.get_node(leaf).map(|node| (leaf, node)))
            .map(|(leaf, node)| LeafSummary {
                name: hierarchy.full_name(leaf),
                outgoing: node.links.outgoing.len(),
                incoming: node.links.incoming.len(),
                dangling: node.links.dangling().map(|l| l.reference.clone()).collect(),
            })
            .collect()
    }

    pub fn placements(hierarchy: &Hierarchy, layout: &Layout) -> Vec<LeafPlacement> {
        hierarchy
            .leaves()
            .into_iter()
            .filter_map(|leaf| {
                let placement = layout.get(leaf)?;
                let point = placement.point();
                let anchor = placement.label_anchor();
                Some(LeafPlacement {
                    name: hierarchy.full_name(leaf),
                    angle: placement.angle,
                    radius: placement.radius,
                    anchor,
                    flipped: anchor.is_flipped(),
                    x: point.x,
                    y: point.y,
                })
            })
            .collect()
    }
}

fn validate(options: &BundleOptions) -> ApplicationResult<()> {
    if options.split_depth > MAX_SPLIT_DEPTH {
        return Err(DomainError::InvalidSplitDepth {
            depth: options.split_depth,
            max: MAX_SPLIT_DEPTH,
        }
        .into());
    }
    if !(0.0..=1.0).contains(&options.beta) {
        return Err(ApplicationError::Config {
            message: format!("beta must be within [0, 1], got {}", options.beta),
        });
    }
    Ok(())
}
