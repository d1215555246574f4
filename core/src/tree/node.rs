use crate::model::ReferenceTarget;
use crate::types::Modality;
use std::collections::BTreeMap;

/// Index of a node inside its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Display fields of a node; the shape a tree table binds to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct NodeData {
    pub modality: String,
    pub description: String,
    pub date: String,
    pub study_instance_uid: String,
    pub series_instance_uid: String,
    /// First instance of the series; identifies RT objects
    pub sop_instance_uid: String,
    pub instance_count: usize,
    /// False for series that take no part in RT linking
    pub parsable: bool,
}

/// Links one instance of a node to an object it references
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceDetail {
    pub sop_instance_uid: String,
    pub referenced: ReferenceTarget,
}

impl ReferenceDetail {
    /// Whether the referenced object is represented by `node`
    ///
    /// Instance matches always count. Image nodes are keyed by series, so
    /// a reference naming the series also counts when no instance of the
    /// node matches.
    pub fn points_into(&self, node: &TreeNode) -> bool {
        if let Some(sop) = &self.referenced.sop_instance_uid {
            if node.represents(sop) {
                return true;
            }
        }
        !node.modality.resolver().keyed_by_instance()
            && self.referenced.series_instance_uid.as_deref()
                == Some(node.data.series_instance_uid.as_str())
    }

    /// Whether the referenced instance is one of `sop_instance_uids`
    pub fn references_any(&self, sop_instance_uids: &[String]) -> bool {
        self.referenced
            .sop_instance_uid
            .as_ref()
            .is_some_and(|sop| sop_instance_uids.contains(sop))
    }
}

/// Node of a [`ReferenceTree`](super::ReferenceTree)
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub key: String,
    pub modality: Modality,
    pub data: NodeData,
    pub children: Vec<NodeId>,
    pub parents: Vec<NodeId>,
    /// Instances this node stands for
    pub sop_instance_uids: Vec<String>,
    pub reference_details: Vec<ReferenceDetail>,
    /// Per-instance label, used as description when the series has none
    pub labels: BTreeMap<String, String>,
    pub is_virtual: bool,
    /// Replaced by its clones during normalisation
    pub(crate) retired: bool,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn represents(&self, sop_instance_uid: &str) -> bool {
        self.sop_instance_uids.iter().any(|s| s == sop_instance_uid)
    }

    /// Copy of the scalar fields with fresh, empty relationship lists
    ///
    /// The clone is keyed `<key>_<index>`; callers fill in the instance
    /// subset, reference details and links.
    pub fn virtual_clone(&self, index: usize) -> Self {
        Self {
            key: format!("{}_{}", self.key, index),
            modality: self.modality,
            data: self.data.clone(),
            children: Vec::new(),
            parents: Vec::new(),
            sop_instance_uids: Vec::new(),
            reference_details: Vec::new(),
            labels: self.labels.clone(),
            is_virtual: true,
            retired: false,
        }
    }

    /// Restricts the node to `sop_instance_uids` and the details they own
    ///
    /// The identifying instance and, for labelled series, the description
    /// follow the first instance of the subset.
    pub(crate) fn assign_instances(
        &mut self,
        sop_instance_uids: Vec<String>,
        details: &[ReferenceDetail],
    ) {
        self.reference_details = details
            .iter()
            .filter(|d| sop_instance_uids.contains(&d.sop_instance_uid))
            .cloned()
            .collect();
        if let Some(first) = sop_instance_uids.first() {
            if let Some(label) = self.labels.get(first) {
                self.data.description = label.clone();
            }
            self.data.sop_instance_uid = first.clone();
        }
        self.labels.retain(|sop, _| sop_instance_uids.contains(sop));
        self.data.instance_count = sop_instance_uids.len();
        self.sop_instance_uids = sop_instance_uids;
    }
}
