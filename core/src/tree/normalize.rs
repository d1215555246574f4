//! Multi-parent graph → strict tree
//!
//! Two kinds of split, both producing virtual clones of a node:
//!
//! - a node with several parents gets one clone per parent, holding only
//!   the instances whose references point into that parent;
//! - a node whose non-leaf children reference different subsets of its
//!   instances gets one clone per subset, plus one for the instances no
//!   child references.
//!
//! Running the normaliser on its own output changes nothing.

use super::node::{ReferenceDetail, TreeNode};
use super::{NodeId, ReferenceTree};
use crate::types::Modality;
use log::debug;

impl ReferenceTree {
    /// Splits nodes until every node has at most one parent
    pub fn normalize(&mut self) {
        for modality in Modality::SPLIT_ORDER {
            let snapshot = self.bucket(modality).to_vec();
            for id in snapshot {
                if self.nodes[id.0].retired {
                    continue;
                }
                for node in self.split_if_node_has_two_parents(id) {
                    self.split_if_there_are_more_than_one_children_that_are_not_leafs(node);
                }
            }
        }
    }

    /// One virtual clone per parent; returns the nodes now standing for `id`
    pub(crate) fn split_if_node_has_two_parents(&mut self, id: NodeId) -> Vec<NodeId> {
        let original = self.nodes[id.0].clone();
        if original.parents.len() < 2 {
            return vec![id];
        }
        debug!(
            "Splitting {} across {} parents",
            original.key,
            original.parents.len()
        );

        let mut clones = Vec::with_capacity(original.parents.len());
        for (index, &parent) in original.parents.iter().enumerate() {
            let details = reference_details_by_referenced_sop_instance_uids(
                &original,
                &self.nodes[parent.0],
            );
            let mut sops: Vec<String> = original
                .sop_instance_uids
                .iter()
                .filter(|sop| details.iter().any(|d| &d.sop_instance_uid == *sop))
                .cloned()
                .collect();
            if sops.is_empty() {
                sops = original.sop_instance_uids.clone();
            }

            let mut clone = original.virtual_clone(index);
            clone.parents.push(parent);
            clone.assign_instances(sops, &details);
            let clone_id = self.alloc(clone);

            replace_in(&mut self.nodes[parent.0].children, id, &[clone_id]);
            self.evaluate_children(clone_id, &original.children);
            clones.push(clone_id);
        }

        self.detach_children(id, &original.children);
        self.retire(id, &clones);
        clones
    }

    /// One virtual clone per instance subset referenced by the non-leaf
    /// children, plus the unreferenced remainder
    pub(crate) fn split_if_there_are_more_than_one_children_that_are_not_leafs(
        &mut self,
        id: NodeId,
    ) -> Vec<NodeId> {
        let original = self.nodes[id.0].clone();
        if original.sop_instance_uids.len() < 2 {
            return vec![id];
        }

        let mut partitions: Vec<Vec<String>> = Vec::new();
        for &child in &original.children {
            let child = &self.nodes[child.0];
            if child.is_leaf() {
                continue;
            }
            let subset = referenced_subset(&original, child);
            if !subset.is_empty() && !partitions.contains(&subset) {
                partitions.push(subset);
            }
        }
        let remainder: Vec<String> = original
            .sop_instance_uids
            .iter()
            .filter(|sop| !partitions.iter().any(|p| p.contains(sop)))
            .cloned()
            .collect();
        let remainder_slot = (!remainder.is_empty()).then_some(partitions.len());
        if !remainder.is_empty() {
            partitions.push(remainder);
        }
        if partitions.len() < 2 {
            return vec![id];
        }

        // Children referencing none of the instances (series level) belong
        // to the remainder
        let mut slots = Vec::with_capacity(original.children.len());
        for &child in &original.children {
            let node = &self.nodes[child.0];
            let subset = referenced_subset(&original, node);
            let slot = if subset.is_empty() {
                remainder_slot
            } else if node.is_leaf() {
                partitions
                    .iter()
                    .position(|p| p.iter().any(|sop| subset.contains(sop)))
            } else {
                partitions.iter().position(|p| *p == subset)
            };
            let Some(slot) = slot else {
                debug!(
                    "Not splitting {}: {} references the whole series",
                    original.key, node.key
                );
                return vec![id];
            };
            slots.push((child, slot));
        }
        debug!(
            "Splitting {} into {} instance subsets",
            original.key,
            partitions.len()
        );

        let clones: Vec<NodeId> = partitions
            .iter()
            .enumerate()
            .map(|(index, partition)| {
                let mut clone = original.virtual_clone(index);
                clone.parents = original.parents.clone();
                clone.assign_instances(partition.clone(), &original.reference_details);
                self.alloc(clone)
            })
            .collect();

        for (child, slot) in slots {
            let clone = clones[slot];
            self.nodes[clone.0].children.push(child);
            replace_in(&mut self.nodes[child.0].parents, id, &[clone]);
        }

        for &parent in &original.parents {
            replace_in(&mut self.nodes[parent.0].children, id, &clones);
        }
        self.retire(id, &clones);
        clones
    }

    /// Attaches those of `children` that reference one of the clone's
    /// instances
    fn evaluate_children(&mut self, clone: NodeId, children: &[NodeId]) {
        for &child in children {
            let retained = self.nodes[child.0]
                .reference_details
                .iter()
                .any(|d| d.references_any(&self.nodes[clone.0].sop_instance_uids));
            if retained {
                self.nodes[clone.0].children.push(child);
                self.nodes[child.0].parents.push(clone);
            }
        }
    }

    /// Removes `id` from the parent lists of its former children; children
    /// left without a parent are promoted to root
    fn detach_children(&mut self, id: NodeId, children: &[NodeId]) {
        for &child in children {
            let parents = &mut self.nodes[child.0].parents;
            parents.retain(|p| *p != id);
            if parents.is_empty() && !self.root.contains(&child) {
                debug!("Promoting {} to root", self.nodes[child.0].key);
                self.root.push(child);
            }
        }
    }

    /// Replaces `id` by `clones` in its bucket and, if present, in root
    fn retire(&mut self, id: NodeId, clones: &[NodeId]) {
        let node = &mut self.nodes[id.0];
        node.retired = true;
        let modality = node.modality;
        if let Some(bucket) = self.buckets.get_mut(&modality) {
            replace_in(bucket, id, clones);
        }
        replace_in(&mut self.root, id, clones);
    }
}

/// Details of `node` whose referenced object is represented by `target`
fn reference_details_by_referenced_sop_instance_uids(
    node: &TreeNode,
    target: &TreeNode,
) -> Vec<ReferenceDetail> {
    node.reference_details
        .iter()
        .filter(|d| d.points_into(target))
        .cloned()
        .collect()
}

/// Instances of `node` referenced by `child`, in `node`'s order
fn referenced_subset(node: &TreeNode, child: &TreeNode) -> Vec<String> {
    node.sop_instance_uids
        .iter()
        .filter(|sop| {
            child
                .reference_details
                .iter()
                .any(|d| d.referenced.sop_instance_uid.as_ref() == Some(*sop))
        })
        .cloned()
        .collect()
}

/// Splices `with` in place of the first occurrence of `id`
fn replace_in(list: &mut Vec<NodeId>, id: NodeId, with: &[NodeId]) {
    if let Some(pos) = list.iter().position(|x| *x == id) {
        list.splice(pos..=pos, with.iter().copied());
    }
}
