use termtree::Tree;
use tracing::instrument;

use crate::domain::{Hierarchy, NodeId};

/// Conversion into a printable `termtree` for the `tree` command.
pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for Hierarchy {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn label(hierarchy: &Hierarchy, idx: NodeId) -> String {
            match hierarchy.get_node(idx) {
                Some(node) if node.is_leaf() => format!(
                    "{} (out: {}, in: {})",
                    node.segment(),
                    node.links.outgoing.len(),
                    node.links.incoming.len()
                ),
                Some(node) => node.segment().to_string(),
                None => String::new(),
            }
        }

        fn build_tree(hierarchy: &Hierarchy, node_idx: NodeId, parent_tree: &mut Tree<String>) {
            if let Some(node) = hierarchy.get_node(node_idx) {
                for &child_idx in &node.children {
                    let mut child_tree = Tree::new(label(hierarchy, child_idx));
                    build_tree(hierarchy, child_idx, &mut child_tree);
                    parent_tree.push(child_tree);
                }
            }
        }

        let root = self.root();
        let mut tree = Tree::new(label(self, root));
        build_tree(self, root, &mut tree);
        tree
    }
}
