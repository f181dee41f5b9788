//! Read-only snapshot of a frame's original column layout.
//!
//! Structural edits build a [`ReferenceTree`] before they change a frame and
//! hand it to the merger, which uses the original ordinal positions to put
//! re-inserted columns back where they used to be. Nodes are addressed by
//! [`NodeId`] handles; once built, a tree is never mutated.

use crate::{column::Column, frame::Frame, path::ColumnPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceData {
    /// Position among the siblings of the original frame.
    pub original_index: usize,
    /// The column no longer exists in the edited frame.
    pub was_removed: bool,
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    data: ReferenceData,
    parent: Option<NodeId>,
    depth: usize,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ReferenceTree {
    nodes: Vec<Node>,
}

impl ReferenceTree {
    /// Mirrors every column and column group of `frame`.
    pub fn snapshot(frame: &Frame) -> Self {
        let mut tree = Self::with_root();
        tree.add_frame(tree.root(), frame);
        tree
    }

    fn with_root() -> Self {
        Self {
            nodes: vec![Node {
                name: String::new(),
                data: ReferenceData {
                    original_index: 0,
                    was_removed: false,
                },
                parent: None,
                depth: 0,
                children: Vec::new(),
            }],
        }
    }

    fn add_frame(&mut self, parent: NodeId, frame: &Frame) {
        for (index, column) in frame.columns().iter().enumerate() {
            let node = self.add_child(parent, column.name(), index);
            if let Column::Group(group) = column {
                self.add_frame(node, group.frame());
            }
        }
    }

    fn add_child(&mut self, parent: NodeId, name: &str, original_index: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        let depth = self.nodes[parent.0].depth + 1;
        self.nodes.push(Node {
            name: name.to_string(),
            data: ReferenceData {
                original_index,
                was_removed: false,
            },
            parent: Some(parent),
            depth,
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn mark_removed(&mut self, node: NodeId) {
        self.nodes[node.0].data.was_removed = true;
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn data(&self, node: NodeId) -> ReferenceData {
        self.nodes[node.0].data
    }

    pub fn name(&self, node: NodeId) -> &str {
        &self.nodes[node.0].name
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// The root has depth 0, top-level columns depth 1.
    pub fn depth(&self, node: NodeId) -> usize {
        self.nodes[node.0].depth
    }

    /// Children in ascending original index.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn child(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .find(|child| self.name(*child) == name)
    }

    /// Walks up from `node` to its ancestor at `depth`; `node` itself when
    /// it already sits there, `None` when it is shallower.
    pub fn ancestor_at_depth(&self, node: NodeId, depth: usize) -> Option<NodeId> {
        let mut current = node;
        while self.depth(current) > depth {
            current = self.parent(current)?;
        }
        (self.depth(current) == depth).then_some(current)
    }

    pub fn node_at_path(&self, path: &ColumnPath) -> Option<NodeId> {
        path.segments()
            .iter()
            .try_fold(self.root(), |node, segment| self.child(node, segment))
    }

    pub fn path_of(&self, node: NodeId) -> Option<ColumnPath> {
        let mut segments = Vec::new();
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            segments.push(self.name(current).to_string());
            current = parent;
        }
        segments.reverse();
        ColumnPath::new(segments).ok()
    }
}
