//! Detached subtrees: the payload of copy/paste and duplication.

use crate::error::{TreeError, TreeResult};
use crate::id::NodeId;
use crate::model::{ComponentNode, ComponentType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A deep copy of a subtree, held outside any document.
///
/// `nodes` is in depth-first pre-order, starting with `root`. Ids are the
/// ones the nodes had when copied; `PageTree::instantiate` re-mints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub root: NodeId,
    pub nodes: Vec<ComponentNode>,
}

impl Fragment {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&ComponentNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Check the fragment is a closed tree rooted at `root`: every child id
    /// resolves inside the fragment, and no id appears twice.
    pub fn validate(&self) -> TreeResult<()> {
        let first = self
            .nodes
            .first()
            .ok_or_else(|| TreeError::Decode("empty fragment".into()))?;
        if first.id != self.root {
            return Err(TreeError::Decode(format!(
                "fragment starts at {} instead of its root {}",
                first.id, self.root
            )));
        }

        let mut ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if node.ty == ComponentType::Root {
                return Err(TreeError::RootInsertion);
            }
            if !ids.insert(node.id) {
                return Err(TreeError::Decode(format!("fragment repeats {}", node.id)));
            }
        }
        let mut listed = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            for child in &node.children {
                if !ids.contains(child) || !listed.insert(*child) || *child == self.root {
                    return Err(TreeError::Decode(format!(
                        "fragment child {child} of {} is dangling or shared",
                        node.id
                    )));
                }
            }
        }
        if listed.len() + 1 != self.nodes.len() {
            return Err(TreeError::Decode("fragment has unreachable nodes".into()));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| format!("Fragment encode error: {e}"))
    }

    pub fn from_json(json: &str) -> TreeResult<Self> {
        let fragment: Self =
            serde_json::from_str(json).map_err(|e| TreeError::Decode(e.to_string()))?;
        fragment.validate()?;
        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewNode;
    use crate::tree::PageTree;
    use pretty_assertions::assert_eq;

    #[test]
    fn extract_is_preorder_and_valid() {
        let mut tree = PageTree::new();
        let card = tree
            .insert(NewNode::new(ComponentType::Card), tree.root(), 0)
            .unwrap();
        let heading = tree
            .insert(NewNode::new(ComponentType::Heading), card, 0)
            .unwrap();
        let button = tree
            .insert(NewNode::new(ComponentType::Button), card, 1)
            .unwrap();

        let fragment = tree.extract(card).unwrap();
        let order: Vec<NodeId> = fragment.nodes.iter().map(|n| n.id).collect();
        assert_eq!(order, vec![card, heading, button]);
        assert_eq!(fragment.validate(), Ok(()));
    }

    #[test]
    fn paste_into_other_tree() {
        let mut source = PageTree::new();
        let card = source
            .insert(
                NewNode::new(ComponentType::Card).named("Pricing"),
                source.root(),
                0,
            )
            .unwrap();
        source
            .insert(NewNode::new(ComponentType::Text), card, 0)
            .unwrap();
        let json = source.extract(card).unwrap().to_json().unwrap();

        let mut target = PageTree::new();
        let fragment = Fragment::from_json(&json).unwrap();
        let pasted = target.instantiate(&fragment, target.root(), 0).unwrap();
        assert_eq!(target.len(), 3);
        assert_eq!(target.get(pasted).unwrap().name, "Pricing");
        assert_eq!(target.child_ids(pasted).len(), 1);
    }

    #[test]
    fn validate_rejects_dangling_child() {
        let a = NodeId::intern("fragment_a");
        let mut node = crate::model::ComponentNode::new(a, ComponentType::Container);
        node.children.push(NodeId::intern("fragment_missing"));
        let fragment = Fragment {
            root: a,
            nodes: vec![node],
        };
        assert!(matches!(fragment.validate(), Err(TreeError::Decode(_))));
    }

    #[test]
    fn validate_rejects_root_typed_nodes() {
        let a = NodeId::intern("fragment_body");
        let fragment = Fragment {
            root: a,
            nodes: vec![crate::model::ComponentNode::new(a, ComponentType::Root)],
        };
        assert_eq!(fragment.validate(), Err(TreeError::RootInsertion));

        let mut tree = PageTree::new();
        let before = tree.clone();
        let root = tree.root();
        assert_eq!(
            tree.instantiate(&fragment, root, 0),
            Err(TreeError::RootInsertion)
        );
        assert_eq!(tree, before);
    }
}
