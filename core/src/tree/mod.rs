//! Reference graph and display tree
//!
//! [`TreeBuilder`] turns the series of a batch into a [`ReferenceTree`]:
//! an arena of [`TreeNode`]s linked by index. The RT-relationship tree may
//! give a node several parents; [`ReferenceTree::normalize`] splits such
//! nodes into virtual clones so that every node ends up with at most one.

mod builder;
mod display;
mod factory;
mod node;
mod normalize;

pub use builder::TreeBuilder;
pub use display::{DisplayNode, DisplayTree};
pub use factory::create_node;
pub use node::{NodeData, NodeId, ReferenceDetail, TreeNode};

use crate::types::Modality;
use std::collections::{BTreeMap, BTreeSet};

/// Arena of nodes plus the ordered root list
#[derive(Debug, Clone, Default)]
pub struct ReferenceTree {
    nodes: Vec<TreeNode>,
    root: Vec<NodeId>,
    buckets: BTreeMap<Modality, Vec<NodeId>>,
}

impl ReferenceTree {
    /// Adds a node to the arena and to its modality bucket
    pub(crate) fn insert(&mut self, node: TreeNode) -> NodeId {
        let id = self.alloc(node);
        let modality = self.nodes[id.0].modality;
        self.buckets.entry(modality).or_default().push(id);
        id
    }

    /// Adds a node to the arena only
    fn alloc(&mut self, node: TreeNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Adds a parent → child edge unless it already exists
    pub(crate) fn link(&mut self, parent: NodeId, child: NodeId) {
        if !self.nodes[parent.0].children.contains(&child) {
            self.nodes[parent.0].children.push(child);
        }
        if !self.nodes[child.0].parents.contains(&parent) {
            self.nodes[child.0].parents.push(parent);
        }
    }

    pub(crate) fn set_root(&mut self, root: Vec<NodeId>) {
        self.root = root;
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    /// Top-level nodes, in display order
    pub fn root(&self) -> &[NodeId] {
        &self.root
    }

    /// Live nodes of one modality, in insertion order
    pub fn bucket(&self, modality: Modality) -> &[NodeId] {
        self.buckets
            .get(&modality)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Live nodes in arena order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.retired)
            .map(|(idx, node)| (NodeId(idx), node))
    }

    pub fn len(&self) -> usize {
        self.nodes().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live node with the given key
    pub fn find(&self, key: &str) -> Option<NodeId> {
        self.nodes()
            .find(|(_, node)| node.key == key)
            .map(|(id, _)| id)
    }

    pub fn root_keys(&self) -> Vec<&str> {
        self.root
            .iter()
            .map(|id| self.nodes[id.0].key.as_str())
            .collect()
    }

    pub fn child_keys(&self, id: NodeId) -> Vec<&str> {
        self.nodes[id.0]
            .children
            .iter()
            .map(|child| self.nodes[child.0].key.as_str())
            .collect()
    }

    /// Every parent → child edge, by key
    pub fn edges(&self) -> BTreeSet<(String, String)> {
        self.nodes()
            .flat_map(|(_, node)| {
                node.children
                    .iter()
                    .map(move |child| (node.key.clone(), self.nodes[child.0].key.clone()))
            })
            .collect()
    }

    /// Whether every node has at most one parent
    pub fn is_strict(&self) -> bool {
        self.nodes().all(|(_, node)| node.parents.len() <= 1)
    }
}
