//! Arena-backed hierarchy built from dotted record names.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, trace};

use crate::domain::error::{DomainError, MalformedHierarchy};
use crate::domain::links::LeafLinks;
use crate::domain::record::Record;

/// Result type for hierarchy operations.
pub type HierarchyResult<T> = Result<T, DomainError>;

/// Handle of a node inside a [`Hierarchy`].
pub type NodeId = Index;

pub const DEFAULT_DELIMITER: &str = ".";

/// Data payload for tree nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Name with the ancestor prefix stripped
    pub segment: String,
    /// Record declared under this node's full name, None for synthesized groups
    pub record: Option<Record>,
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<NodeId>,
    /// Indices of child nodes in the arena
    pub children: Vec<NodeId>,
    /// Resolved edges, populated on leaves by [`crate::domain::bilink`]
    pub links: LeafLinks,
}

impl TreeNode {
    fn new(segment: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            data: NodeData {
                segment: segment.into(),
                record: None,
            },
            parent,
            children: Vec::new(),
            links: LeafLinks::default(),
        }
    }

    pub fn segment(&self) -> &str {
        &self.data.segment
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Declared references of the record attached to this node.
    pub fn references(&self) -> &[String] {
        self.data
            .record
            .as_ref()
            .map(|r| r.references.as_slice())
            .unwrap_or(&[])
    }
}

/// A strict tree of named nodes.
///
/// Every leaf corresponds to one input record; interior nodes represent shared
/// name prefixes. If the tree was built with an implicit root, that root's
/// segment is not part of any full name.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    arena: Arena<TreeNode>,
    root: NodeId,
    delimiter: String,
    implicit_root: bool,
}

impl Hierarchy {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn has_implicit_root(&self) -> bool {
        self.implicit_root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, idx: NodeId) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node_mut(&mut self, idx: NodeId) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    /// Like [`Self::get_node`] but for handles this hierarchy handed out.
    pub(crate) fn node(&self, idx: NodeId) -> &TreeNode {
        &self.arena[idx]
    }

    pub fn iter(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Leaves in pre-order (left-to-right).
    pub fn leaves(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.is_leaf())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Number of levels, 1 for a lone root.
    pub fn depth(&self) -> usize {
        self.heights().get(&self.root).map_or(0, |h| h + 1)
    }

    /// Height of every node: 0 for leaves, `1 + max(children)` otherwise.
    pub fn heights(&self) -> HashMap<NodeId, usize> {
        let mut heights = HashMap::with_capacity(self.len());
        for (idx, node) in self.iter_postorder() {
            let height = node
                .children
                .iter()
                .filter_map(|c| heights.get(c))
                .max()
                .map_or(0, |h| h + 1);
            heights.insert(idx, height);
        }
        heights
    }

    /// Node itself first, then its parent, up to the root.
    pub fn ancestors(&self, idx: NodeId) -> Ancestors<'_> {
        Ancestors {
            hierarchy: self,
            next: self.arena.get(idx).map(|_| idx),
        }
    }

    /// Number of edges between the node and the root.
    pub fn level(&self, idx: NodeId) -> usize {
        self.ancestors(idx).count().saturating_sub(1)
    }

    /// Full delimited name of a node, reconstructed from its ancestors.
    pub fn full_name(&self, idx: NodeId) -> String {
        let mut segments: Vec<&str> = self
            .ancestors(idx)
            .filter(|&a| !(self.implicit_root && a == self.root))
            .map(|a| self.node(a).segment())
            .collect();
        segments.reverse();
        segments.join(&self.delimiter)
    }

    /// Find a node by its full name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.iter()
            .map(|(idx, _)| idx)
            .find(|&idx| self.full_name(idx) == name)
    }

    pub fn least_common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let above_a: HashSet<NodeId> = self.ancestors(a).collect();
        self.ancestors(b).find(|n| above_a.contains(n))
    }

    /// Nodes from `source` up to the least common ancestor and down to `target`.
    pub fn path_between(&self, source: NodeId, target: NodeId) -> Vec<NodeId> {
        let Some(lca) = self.least_common_ancestor(source, target) else {
            return Vec::new();
        };
        let mut path: Vec<NodeId> = self.ancestors(source).take_while(|&n| n != lca).collect();
        path.push(lca);
        let down: Vec<NodeId> = self.ancestors(target).take_while(|&n| n != lca).collect();
        path.extend(down.into_iter().rev());
        path
    }

    /// Order children by subtree height, then by segment.
    #[instrument(level = "debug", skip(self))]
    pub fn sort_children(&mut self) {
        let heights = self.heights();
        let keys: HashMap<NodeId, (usize, String)> = self
            .arena
            .iter()
            .map(|(idx, node)| (idx, (heights[&idx], node.data.segment.clone())))
            .collect();
        for (_, node) in self.arena.iter_mut() {
            node.children.sort_by(|a, b| compare_keys(&keys[a], &keys[b]));
        }
    }
}

fn compare_keys(a: &(usize, String), b: &(usize, String)) -> Ordering {
    a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1))
}

/// Constructs a [`Hierarchy`] from flat records.
#[derive(Debug, Clone)]
pub struct HierarchyBuilder {
    delimiter: String,
    implicit_root: Option<String>,
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// State of one build call: arena under construction plus the name lookup.
struct BuildState {
    arena: Arena<TreeNode>,
    by_name: HashMap<String, NodeId>,
    top_level: Vec<(String, NodeId)>,
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            implicit_root: None,
        }
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Attach all top-level records to a synthesized root with this segment.
    pub fn implicit_root(mut self, segment: Option<String>) -> Self {
        self.implicit_root = segment;
        self
    }

    /// Build the tree. Fails on empty input, several roots, empty segments
    /// or duplicate record names.
    #[instrument(level = "debug", skip(self, records), fields(records = records.len()))]
    pub fn build(&self, records: &[Record]) -> HierarchyResult<Hierarchy> {
        if self.delimiter.is_empty() {
            return Err(MalformedHierarchy::EmptyDelimiter.into());
        }

        let mut state = BuildState {
            arena: Arena::with_capacity(records.len()),
            by_name: HashMap::with_capacity(records.len()),
            top_level: Vec::new(),
        };

        for record in records {
            if record.name.is_empty() {
                return Err(MalformedHierarchy::EmptyName.into());
            }
            let idx = self.ensure_node(&mut state, &record.name)?;
            let node = &mut state.arena[idx];
            if node.data.record.is_some() {
                return Err(MalformedHierarchy::DuplicateRecord {
                    name: record.name.clone(),
                }
                .into());
            }
            node.data.record = Some(record.clone());
        }

        let root = match (&self.implicit_root, state.top_level.as_slice()) {
            (_, []) => return Err(MalformedHierarchy::NoRoot.into()),
            (Some(segment), top_level) => {
                let root = state.arena.insert(TreeNode::new(segment.clone(), None));
                for &(_, child) in top_level {
                    state.arena[child].parent = Some(root);
                    state.arena[root].children.push(child);
                }
                root
            }
            (None, [(_, root)]) => *root,
            (None, [(first, _), (second, _), ..]) => {
                return Err(MalformedHierarchy::MultipleRoots {
                    first: first.clone(),
                    second: second.clone(),
                }
                .into())
            }
        };

        debug!("built hierarchy with {} nodes", state.arena.len());
        Ok(Hierarchy {
            arena: state.arena,
            root,
            delimiter: self.delimiter.clone(),
            implicit_root: self.implicit_root.is_some(),
        })
    }

    /// Fetch the node for `name`, creating it and any missing ancestors.
    fn ensure_node(&self, state: &mut BuildState, name: &str) -> HierarchyResult<NodeId> {
        if let Some(&idx) = state.by_name.get(name) {
            return Ok(idx);
        }

        // Walk up to the nearest known ancestor, then create top-down
        let mut missing: Vec<&str> = Vec::new();
        let mut parent = None;
        let mut current = name;
        while let Some(i) = current.rfind(self.delimiter.as_str()) {
            let prefix = &current[..i];
            if prefix.is_empty() || i + self.delimiter.len() == current.len() {
                return Err(MalformedHierarchy::EmptySegment {
                    name: name.to_string(),
                }
                .into());
            }
            if let Some(&idx) = state.by_name.get(prefix) {
                parent = Some(idx);
                break;
            }
            missing.push(prefix);
            current = prefix;
        }

        for ancestor in missing.into_iter().rev() {
            parent = Some(self.insert_node(state, ancestor, parent));
        }
        Ok(self.insert_node(state, name, parent))
    }

    fn insert_node(&self, state: &mut BuildState, name: &str, parent: Option<NodeId>) -> NodeId {
        let segment = name
            .rfind(self.delimiter.as_str())
            .map_or(name, |i| &name[i + self.delimiter.len()..]);
        let idx = state.arena.insert(TreeNode::new(segment, parent));
        state.by_name.insert(name.to_string(), idx);
        match parent {
            Some(p) => state.arena[p].children.push(idx),
            None => state.top_level.push((name.to_string(), idx)),
        }
        trace!("created node '{}'", name);
        idx
    }
}

/// Ancestor chain iterator, see [`Hierarchy::ancestors`].
pub struct Ancestors<'a> {
    hierarchy: &'a Hierarchy,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.hierarchy.get_node(current).and_then(|n| n.parent);
        Some(current)
    }
}

pub struct PreOrderIterator<'a> {
    hierarchy: &'a Hierarchy,
    stack: Vec<NodeId>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(hierarchy: &'a Hierarchy) -> Self {
        Self {
            hierarchy,
            stack: vec![hierarchy.root],
        }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.hierarchy.get_node(current) {
                // Push children in reverse order for left-to-right traversal
                self.stack.extend(node.children.iter().rev());
                return Some((current, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    hierarchy: &'a Hierarchy,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(hierarchy: &'a Hierarchy) -> Self {
        Self {
            hierarchy,
            stack: vec![(hierarchy.root, false)],
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if let Some(node) = self.hierarchy.get_node(current) {
                if visited {
                    return Some((current, node));
                }
                self.stack.push((current, true));
                for &child in node.children.iter().rev() {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(names: &[&str]) -> Vec<Record> {
        names.iter().map(|n| Record::new(*n)).collect()
    }

    fn segments(h: &Hierarchy, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&i| h.node(i).segment().to_string()).collect()
    }

    #[test]
    fn given_group_record_after_children_when_building_then_root_carries_record() {
        let input = vec![
            Record::new("a.b"),
            Record::new("a.c"),
            Record::new("a").with_references(["a.b"]),
        ];
        let h = HierarchyBuilder::new().build(&input).unwrap();

        let root = h.node(h.root());
        assert_eq!(root.segment(), "a");
        assert_eq!(root.references(), ["a.b".to_string()]);
        assert_eq!(segments(&h, &h.leaves()), ["b", "c"]);
    }

    #[test]
    fn given_deep_name_when_building_then_synthesizes_groups() {
        let h = HierarchyBuilder::new()
            .build(&records(&["r", "r.x.y.z"]))
            .unwrap();
        assert_eq!(h.len(), 4);
        assert_eq!(h.depth(), 4);
        let leaf = h.leaves()[0];
        assert_eq!(h.full_name(leaf), "r.x.y.z");
        assert_eq!(h.level(leaf), 3);
        let group = h.find("r.x").unwrap();
        assert!(h.node(group).data.record.is_none());
        assert_eq!(h.find("r.q"), None);
    }

    #[test]
    fn given_ten_thousand_segment_name_when_building_then_builds_without_recursion() {
        let name = vec!["a"; 10_000].join(".");
        let h = HierarchyBuilder::new()
            .build(&[Record::new(name.as_str())])
            .unwrap();
        assert_eq!(h.len(), 10_000);
        assert_eq!(h.depth(), 10_000);
        let leaf = h.leaves()[0];
        assert_eq!(h.full_name(leaf), name);
    }

    #[test]
    fn given_empty_inner_segment_below_known_group_when_building_then_errors() {
        let err = HierarchyBuilder::new()
            .build(&records(&["a.b", "a..c"]))
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::MalformedHierarchy(MalformedHierarchy::EmptySegment {
                name: "a..c".into()
            })
        );
    }

    #[test]
    fn given_two_top_level_names_when_building_then_multiple_roots_error() {
        let err = HierarchyBuilder::new()
            .build(&records(&["a.x", "b.y"]))
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::MalformedHierarchy(MalformedHierarchy::MultipleRoots {
                first: "a".into(),
                second: "b".into()
            })
        );
    }

    #[test]
    fn given_implicit_root_when_building_then_groups_hang_below_it() {
        let h = HierarchyBuilder::new()
            .implicit_root(Some("all".into()))
            .build(&records(&["a.x", "b.y"]))
            .unwrap();
        assert_eq!(h.node(h.root()).segment(), "all");
        assert!(h.has_implicit_root());
        let names: Vec<String> = h.leaves().iter().map(|&l| h.full_name(l)).collect();
        assert_eq!(names, ["a.x", "b.y"]);
    }

    #[test]
    fn given_custom_delimiter_when_building_then_splits_on_it() {
        let h = HierarchyBuilder::new()
            .delimiter("::")
            .build(&records(&["std::io::Read", "std::fs"]))
            .unwrap();
        assert_eq!(h.node(h.root()).segment(), "std");
        assert_eq!(h.delimiter(), "::");
        let names: Vec<String> = h.leaves().iter().map(|&l| h.full_name(l)).collect();
        assert_eq!(names, ["std::io::Read", "std::fs"]);
    }

    #[test]
    fn given_trailing_delimiter_when_building_then_empty_segment_error() {
        let err = HierarchyBuilder::new().build(&records(&["a."])).unwrap_err();
        assert!(matches!(
            err,
            DomainError::MalformedHierarchy(MalformedHierarchy::EmptySegment { .. })
        ));
    }

    #[test]
    fn given_duplicate_record_when_building_then_errors() {
        let err = HierarchyBuilder::new()
            .build(&records(&["a.b", "a.b"]))
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::MalformedHierarchy(MalformedHierarchy::DuplicateRecord { .. })
        ));
    }

    #[test]
    fn given_unsorted_children_when_sorting_then_leaves_first_then_by_name() {
        let mut h = HierarchyBuilder::new()
            .build(&records(&["r.g.z", "r.b", "r.a"]))
            .unwrap();
        h.sort_children();
        let root = h.node(h.root());
        assert_eq!(segments(&h, &root.children), ["a", "b", "g"]);
    }

    #[test]
    fn given_siblings_in_different_groups_when_path_between_then_goes_through_lca() {
        let h = HierarchyBuilder::new()
            .build(&records(&["r.a.x", "r.b.y"]))
            .unwrap();
        let x = h.find("r.a.x").unwrap();
        let y = h.find("r.b.y").unwrap();
        let path = h.path_between(x, y);
        assert_eq!(segments(&h, &path), ["x", "a", "r", "b", "y"]);
        assert_eq!(h.path_between(x, x), vec![x]);
    }

    #[test]
    fn given_tree_when_iterating_postorder_then_children_precede_parents() {
        let h = HierarchyBuilder::new()
            .build(&records(&["r.a.x", "r.b"]))
            .unwrap();
        let order: Vec<String> = h
            .iter_postorder()
            .map(|(_, n)| n.segment().to_string())
            .collect();
        assert_eq!(order, ["x", "a", "b", "r"]);
    }
}
