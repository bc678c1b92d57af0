//! Bidirectional leaf links resolved from record references.

use std::collections::HashMap;

use tracing::{debug, instrument, trace};

use crate::domain::hierarchy::{Hierarchy, NodeId};

/// A directed edge between two leaves.
///
/// `target` is None when `reference` names no leaf (a dangling reference).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub source: NodeId,
    pub target: Option<NodeId>,
    /// Full name the source declared
    pub reference: String,
}

impl Link {
    pub fn is_dangling(&self) -> bool {
        self.target.is_none()
    }

    /// Source and target, if the target resolved.
    pub fn endpoints(&self) -> Option<(NodeId, NodeId)> {
        self.target.map(|t| (self.source, t))
    }
}

/// Edges attached to a leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeafLinks {
    /// One entry per declared reference, in declaration order
    pub outgoing: Vec<Link>,
    /// Resolved edges of other leaves pointing here
    pub incoming: Vec<Link>,
}

impl LeafLinks {
    pub fn dangling(&self) -> impl Iterator<Item = &Link> {
        self.outgoing.iter().filter(|l| l.is_dangling())
    }
}

/// Resolve every leaf's references and record the reverse edges.
///
/// Previous link lists are replaced, so calling this twice yields the same
/// result. `incoming` follows leaf pre-order, then declaration order.
#[instrument(level = "debug", skip(hierarchy))]
pub fn bilink(hierarchy: &mut Hierarchy) {
    let leaves = hierarchy.leaves();
    let by_name: HashMap<String, NodeId> = leaves
        .iter()
        .map(|&leaf| (hierarchy.full_name(leaf), leaf))
        .collect();

    let mut resolved = Vec::with_capacity(leaves.len());
    for &leaf in &leaves {
        let outgoing: Vec<Link> = hierarchy
            .node(leaf)
            .references()
            .iter()
            .map(|reference| Link {
                source: leaf,
                target: by_name.get(reference).copied(),
                reference: reference.clone(),
            })
            .collect();
        resolved.push((leaf, outgoing));
    }

    for (leaf, outgoing) in resolved.iter() {
        if let Some(node) = hierarchy.get_node_mut(*leaf) {
            node.links = LeafLinks {
                outgoing: outgoing.clone(),
                incoming: Vec::new(),
            };
        }
    }

    let mut dangling = 0usize;
    for (_, outgoing) in resolved {
        for link in outgoing {
            match link.target {
                Some(target) => {
                    trace!("link {:?} -> {:?}", link.source, target);
                    if let Some(node) = hierarchy.get_node_mut(target) {
                        node.links.incoming.push(link);
                    }
                }
                None => dangling += 1,
            }
        }
    }
    debug!(
        "resolved links for {} leaves, {} dangling references",
        leaves.len(),
        dangling
    );
}

/// All resolved edges in leaf order, the input for edge routing.
pub fn resolved_links(hierarchy: &Hierarchy) -> Vec<(NodeId, NodeId)> {
    hierarchy
        .leaves()
        .into_iter()
        .flat_map(|leaf| {
            hierarchy
                .node(leaf)
                .links
                .outgoing
                .iter()
                .filter_map(Link::endpoints)
                .collect::<Vec<_>>()
        })
        .collect()
}
