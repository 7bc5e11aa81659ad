//! Read models for the panels that sit around the canvas.
//!
//! Panels never walk the store themselves: the layers panel gets flat
//! `LayerRow`s, the renderer gets a `ViewNode` tree. Both are pure
//! functions of the tree (plus selection for layers).

use crate::selection::Selection;
use pb_core::model::{ComponentType, Props};
use pb_core::{NodeId, PageTree, emit_declarations};
use serde::Serialize;

// ─── Layers ──────────────────────────────────────────────────────────────

/// One row of the layers panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRow {
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ComponentType,
    /// Root = 0.
    pub depth: usize,
    pub is_hidden: bool,
    pub is_locked: bool,
    pub is_selected: bool,
    pub has_children: bool,
}

/// Depth-first rows for the whole document, root first.
pub fn layer_rows(tree: &PageTree, selection: &Selection) -> Vec<LayerRow> {
    let mut rows = Vec::with_capacity(tree.len());
    tree.walk(|node, depth| {
        rows.push(LayerRow {
            id: node.id,
            name: node.name.clone(),
            ty: node.ty,
            depth,
            is_hidden: node.is_hidden,
            is_locked: node.is_locked,
            is_selected: selection.is_selected(node.id),
            has_children: !node.children.is_empty(),
        });
    });
    rows
}

// ─── Renderer view ───────────────────────────────────────────────────────

/// Renderer input: what to draw for one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ViewNode {
    #[serde(rename_all = "camelCase")]
    Element {
        id: NodeId,
        tag: &'static str,
        #[serde(rename = "type")]
        ty: ComponentType,
        /// Inline `style` attribute text.
        css: String,
        props: Props,
        children: Vec<ViewNode>,
    },
    /// Drop hint inside an empty container.
    #[serde(rename_all = "camelCase")]
    Placeholder { parent: NodeId },
}

impl ViewNode {
    pub fn id(&self) -> NodeId {
        match self {
            Self::Element { id, .. } => *id,
            Self::Placeholder { parent } => *parent,
        }
    }
}

/// Build the view for `id` and everything under it. Hidden nodes (and
/// their subtrees) are left out; `None` when `id` is hidden or unknown.
pub fn render_view(tree: &PageTree, id: NodeId) -> Option<ViewNode> {
    let node = tree.get(id)?;
    if node.is_hidden {
        return None;
    }

    let mut children: Vec<ViewNode> = node
        .children
        .iter()
        .filter_map(|child| render_view(tree, *child))
        .collect();
    if children.is_empty() && node.ty.accepts_children() {
        children.push(ViewNode::Placeholder { parent: id });
    }

    Some(ViewNode::Element {
        id,
        tag: node.ty.html_tag(),
        ty: node.ty,
        css: emit_declarations(&node.styles),
        props: node.props.clone(),
        children,
    })
}
