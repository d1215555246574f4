use super::factory::create_node;
use super::{NodeId, ReferenceTree};
use crate::error::Result;
use crate::model::StudyDictionary;
use crate::types::Modality;
use log::{debug, info};
use std::collections::HashMap;

/// Builds reference trees over every study of a batch
///
/// # Example
///
/// ```
/// use rtlink_core::{StudyDictionary, TreeBuilder};
///
/// let studies = StudyDictionary::new();
/// let tree = TreeBuilder::new(&studies).build().unwrap();
/// assert!(tree.root().is_empty());
/// ```
pub struct TreeBuilder<'a> {
    studies: &'a StudyDictionary,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(studies: &'a StudyDictionary) -> Self {
        Self { studies }
    }

    /// Every series as a root, grouped by modality
    pub fn flat_tree(&self) -> Result<ReferenceTree> {
        let mut tree = self.collect()?;
        let root = Modality::FLAT_ORDER
            .iter()
            .flat_map(|&m| tree.bucket(m).to_vec())
            .collect();
        tree.set_root(root);
        Ok(tree)
    }

    /// RT-relationship graph with every reference resolved; nodes may still
    /// have several parents
    pub fn rt_tree(&self) -> Result<ReferenceTree> {
        let mut tree = self.collect()?;
        let index = Self::index(&tree);

        let mut links = 0;
        for modality in Modality::RESOLUTION_ORDER {
            let resolver = modality.resolver();
            let Some(target) = resolver.target() else {
                continue;
            };
            let by_instance = target.resolver().keyed_by_instance();

            for id in tree.bucket(modality).to_vec() {
                let mut parents: Vec<NodeId> = Vec::new();
                for detail in &tree.node(id).reference_details {
                    let key = if by_instance {
                        detail.referenced.sop_instance_uid.as_deref()
                    } else {
                        detail.referenced.series_instance_uid.as_deref()
                    };
                    let Some(key) = key else {
                        continue;
                    };
                    match index.get(&(target, key.to_string())) {
                        Some(&parent) if parent != id && !parents.contains(&parent) => {
                            parents.push(parent)
                        }
                        Some(_) => {}
                        None => debug!("{} {}: {} not in batch", modality, tree.node(id).key, key),
                    }
                }
                for parent in parents {
                    tree.link(parent, id);
                    links += 1;
                }
            }
        }

        let root: Vec<NodeId> = Modality::FLAT_ORDER
            .iter()
            .flat_map(|&m| tree.bucket(m).to_vec())
            .filter(|&id| tree.node(id).parents.is_empty())
            .collect();
        info!("Resolved {} references, {} root series", links, root.len());
        tree.set_root(root);
        Ok(tree)
    }

    /// Normalised RT-relationship tree: every node has at most one parent
    pub fn build(&self) -> Result<ReferenceTree> {
        let mut tree = self.rt_tree()?;
        tree.normalize();
        Ok(tree)
    }

    /// One node per series, inserted in key order so that buckets do not
    /// depend on registration order
    fn collect(&self) -> Result<ReferenceTree> {
        let mut nodes = Vec::new();
        for study in self.studies.studies() {
            for series in study.series() {
                nodes.push(create_node(study, series)?);
            }
        }
        nodes.sort_by(|a, b| a.key.cmp(&b.key));

        let mut tree = ReferenceTree::default();
        for node in nodes {
            tree.insert(node);
        }
        Ok(tree)
    }

    /// Lookup of (modality, key) → node; RT nodes are reachable through
    /// every instance they hold, image nodes through their series
    fn index(tree: &ReferenceTree) -> HashMap<(Modality, String), NodeId> {
        let mut index = HashMap::new();
        for (id, node) in tree.nodes() {
            if node.modality.resolver().keyed_by_instance() {
                for sop in &node.sop_instance_uids {
                    index.entry((node.modality, sop.clone())).or_insert(id);
                }
            } else {
                index
                    .entry((node.modality, node.data.series_instance_uid.clone()))
                    .or_insert(id);
            }
        }
        index
    }
}
