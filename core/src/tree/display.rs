use super::{NodeData, NodeId, ReferenceTree};
use std::fmt;

/// Owned, nested view of a tree: `{ root: [DisplayNode] }`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct DisplayTree {
    pub root: Vec<DisplayNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct DisplayNode {
    pub key: String,
    pub data: NodeData,
    pub is_virtual: bool,
    pub children: Vec<DisplayNode>,
}

impl DisplayNode {
    fn from_tree(tree: &ReferenceTree, id: NodeId) -> Self {
        let node = tree.node(id);
        Self {
            key: node.key.clone(),
            data: node.data.clone(),
            is_virtual: node.is_virtual,
            children: node
                .children
                .iter()
                .map(|&child| Self::from_tree(tree, child))
                .collect(),
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let data = &self.data;
        write!(
            f,
            "{:indent$}{} [{}]",
            "",
            self.key,
            data.modality,
            indent = depth * 2
        )?;
        if !data.description.is_empty() {
            write!(f, " {}", data.description)?;
        }
        if !data.date.is_empty() {
            write!(f, " {}", data.date)?;
        }
        write!(f, " ({} instances)", data.instance_count)?;
        if self.is_virtual {
            write!(f, " *")?;
        }
        writeln!(f)?;
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl From<&ReferenceTree> for DisplayTree {
    fn from(tree: &ReferenceTree) -> Self {
        Self {
            root: tree
                .root()
                .iter()
                .map(|&id| DisplayNode::from_tree(tree, id))
                .collect(),
        }
    }
}

impl fmt::Display for DisplayTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.root {
            node.write_indented(f, 0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StudyDictionary;
    use crate::testing::{ct_file, parsed, rtstruct_file};
    use crate::tree::TreeBuilder;

    #[test]
    fn test_display_nested() {
        let mut dict = StudyDictionary::new();
        dict.register("ct", parsed(&ct_file("ST1", "CT1", "CT1.1"))).unwrap();
        dict.register("rs", parsed(&rtstruct_file("ST1", "RSS", "RS1", "CT1", &["CT1.1"])))
            .unwrap();
        let tree = TreeBuilder::new(&dict).build().unwrap();
        let display = DisplayTree::from(&tree);

        assert_eq!(display.root.len(), 1);
        assert_eq!(display.root[0].key, "CT1");
        assert_eq!(display.root[0].children[0].key, "RS1");
        assert_eq!(display.root[0].children[0].data.modality, "RTSTRUCT");

        let text = display.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "CT1 [CT] Planning CT 20240105 (1 instances)");
        assert_eq!(lines[1], "  RS1 [RTSTRUCT] RS RS1 20240105 (1 instances)");
    }
}
