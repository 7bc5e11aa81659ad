//! Persistence value for a page tree.
//!
//! `Document` is the plain `{ rootId, idMap }` shape the host stores and
//! reloads. Loading validates the whole structure before a `PageTree` is
//! handed out.

use crate::error::{TreeError, TreeResult};
use crate::id::NodeId;
use crate::integrity;
use crate::model::ComponentNode;
use crate::tree::{PageTree, TreeOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub root_id: NodeId,
    pub id_map: BTreeMap<NodeId, ComponentNode>,
}

impl PageTree {
    /// Snapshot the tree as a detached, serializable value.
    pub fn to_document(&self) -> Document {
        Document {
            root_id: self.root(),
            id_map: self.iter().map(|n| (n.id, n.clone())).collect(),
        }
    }

    /// Rebuild a tree from a document. Rejects structurally broken input
    /// (dangling links, shared children, cycles, orphans).
    pub fn from_document(doc: Document, options: TreeOptions) -> TreeResult<Self> {
        for (key, node) in &doc.id_map {
            if *key != node.id {
                return Err(TreeError::Decode(format!(
                    "idMap key {key} holds node {}",
                    node.id
                )));
            }
        }
        let tree = PageTree::from_parts(doc.root_id, doc.id_map.into_values(), options);
        let violations = integrity::check(&tree);
        if let Some(first) = violations.first() {
            log::warn!("rejecting document: {} integrity problems", violations.len());
            return Err(TreeError::Decode(first.to_string()));
        }
        log::debug!("loaded document with {} nodes", tree.len());
        Ok(tree)
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(&self.to_document())
            .map_err(|e| format!("Document encode error: {e}"))
    }

    pub fn from_json(json: &str, options: TreeOptions) -> TreeResult<Self> {
        let doc: Document =
            serde_json::from_str(json).map_err(|e| TreeError::Decode(e.to_string()))?;
        Self::from_document(doc, options)
    }

    /// Compact binary form (MessagePack, named fields).
    pub fn to_msgpack(&self) -> Result<Vec<u8>, String> {
        rmp_serde::to_vec_named(&self.to_document())
            .map_err(|e| format!("Document encode error: {e}"))
    }

    pub fn from_msgpack(bytes: &[u8], options: TreeOptions) -> TreeResult<Self> {
        let doc: Document =
            rmp_serde::from_slice(bytes).map_err(|e| TreeError::Decode(e.to_string()))?;
        Self::from_document(doc, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentType, NewNode};
    use pretty_assertions::assert_eq;

    fn sample() -> PageTree {
        let mut tree = PageTree::new();
        let s = tree
            .insert(NewNode::new(ComponentType::Section), tree.root(), 0)
            .unwrap();
        tree.insert(
            NewNode::new(ComponentType::Button).prop("text", "Go"),
            s,
            0,
        )
        .unwrap();
        tree
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"rootId\": \"root\""));
        assert!(json.contains("\"idMap\""));
        assert!(json.contains("\"parentId\""));
        assert!(json.contains("\"type\": \"button\""));
    }

    #[test]
    fn json_roundtrip_preserves_tree() {
        let tree = sample();
        let back = PageTree::from_json(&tree.to_json().unwrap(), TreeOptions::default()).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn msgpack_roundtrip_preserves_tree() {
        let tree = sample();
        let bytes = tree.to_msgpack().unwrap();
        let back = PageTree::from_msgpack(&bytes, TreeOptions::default()).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn rejects_dangling_child() {
        let mut doc = sample().to_document();
        let root = doc.root_id;
        doc.id_map
            .get_mut(&root)
            .unwrap()
            .children
            .push(NodeId::intern("document_ghost"));
        let err = PageTree::from_document(doc, TreeOptions::default()).unwrap_err();
        assert!(matches!(err, TreeError::Decode(msg) if msg.contains("document_ghost")));
    }

    #[test]
    fn rejects_mismatched_key() {
        let mut doc = sample().to_document();
        let node = ComponentNode::new(NodeId::intern("document_real"), ComponentType::Text);
        doc.id_map.insert(NodeId::intern("document_alias"), node);
        assert!(PageTree::from_document(doc, TreeOptions::default()).is_err());
    }
}
