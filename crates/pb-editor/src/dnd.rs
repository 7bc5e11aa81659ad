//! Drag-and-drop resolution.
//!
//! A completed drag is an `(active, over)` pair. `resolve_drop` turns it
//! into at most one move:
//!
//! | `over` is…                               | result                              |
//! |------------------------------------------|-------------------------------------|
//! | `active` itself                          | rejected, no-op                     |
//! | container-capable (or has children)      | appended to `over`'s children       |
//! | a childless leaf                         | placed right after `over`, as its sibling |
//! | inside `active`'s own subtree            | rejected (cycle)                    |
//!
//! Pointer movement before the drop only updates a highlight on the
//! `DragSession`; nothing here mutates the tree.

use pb_core::{NodeId, PageTree};

/// A resolved move, ready for `PageTree::reparent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveIntent {
    pub id: NodeId,
    pub new_parent: NodeId,
    /// Final position among `new_parent`'s children.
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropRejection {
    /// Dropped onto itself.
    SelfDrop,
    UnknownNode(NodeId),
    /// The root is never draggable.
    RootDrag,
    Locked(NodeId),
    /// Target lies inside the dragged subtree.
    Cycle,
    /// The node is already where the drop would put it.
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropResolution {
    Move(MoveIntent),
    Reject(DropRejection),
}

impl DropResolution {
    pub fn intent(self) -> Option<MoveIntent> {
        match self {
            Self::Move(intent) => Some(intent),
            Self::Reject(_) => None,
        }
    }
}

/// Where a drop onto `over` lands: `(parent, index)`, with the index
/// counted after `active` (if any) leaves its current list. Containers take
/// the node at the end; leaves take it right after themselves, in their own
/// parent. `None` when `over` is unknown.
pub fn drop_target(tree: &PageTree, active: Option<NodeId>, over: NodeId) -> Option<(NodeId, usize)> {
    let target = tree.get(over)?;
    let without_active = |parent: NodeId| -> Vec<NodeId> {
        tree.child_ids(parent)
            .iter()
            .copied()
            .filter(|c| Some(*c) != active)
            .collect()
    };

    if target.can_host_children() {
        return Some((over, without_active(over).len()));
    }

    let parent = target.parent_id.unwrap_or_else(|| tree.root());
    let siblings = without_active(parent);
    let index = siblings
        .iter()
        .position(|c| *c == over)
        .map_or(siblings.len(), |pos| pos + 1);
    Some((parent, index))
}

/// Resolve a drop of `active` onto `over`.
pub fn resolve_drop(tree: &PageTree, active: NodeId, over: NodeId) -> DropResolution {
    use DropRejection::*;

    if active == over {
        return DropResolution::Reject(SelfDrop);
    }
    let Some(node) = tree.get(active) else {
        return DropResolution::Reject(UnknownNode(active));
    };
    if node.id == tree.root() {
        return DropResolution::Reject(RootDrag);
    }
    if node.is_locked {
        return DropResolution::Reject(Locked(active));
    }
    let Some((new_parent, index)) = drop_target(tree, Some(active), over) else {
        return DropResolution::Reject(UnknownNode(over));
    };
    if new_parent == active || tree.is_ancestor_of(active, new_parent) {
        return DropResolution::Reject(Cycle);
    }
    if node.parent_id == Some(new_parent) && tree.index_in_parent(active) == Some(index) {
        return DropResolution::Reject(Unchanged);
    }

    DropResolution::Move(MoveIntent {
        id: active,
        new_parent,
        index,
    })
}

// ─── Drag session ────────────────────────────────────────────────────────

/// State of one pointer drag, from pickup to drop or cancel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragSession {
    active: Option<NodeId>,
    over: Option<NodeId>,
    /// Parent the node would land in if dropped now (highlight only).
    preview_parent: Option<NodeId>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick up `id`. Fails for the root, locked nodes and unknown ids.
    pub fn start(&mut self, tree: &PageTree, id: NodeId) -> Result<(), DropRejection> {
        let node = tree.get(id).ok_or(DropRejection::UnknownNode(id))?;
        if id == tree.root() {
            return Err(DropRejection::RootDrag);
        }
        if node.is_locked {
            return Err(DropRejection::Locked(id));
        }
        log::trace!("drag start {id}");
        *self = Self {
            active: Some(id),
            over: None,
            preview_parent: None,
        };
        Ok(())
    }

    /// Pointer moved over `over` (or off every node). Updates the tentative
    /// highlight only.
    pub fn over(&mut self, tree: &PageTree, over: Option<NodeId>) {
        let Some(active) = self.active else { return };
        self.over = over;
        self.preview_parent = over
            .map(|o| resolve_drop(tree, active, o))
            .and_then(DropResolution::intent)
            .map(|intent| intent.new_parent);
        log::trace!("drag over {over:?} → preview {:?}", self.preview_parent);
    }

    /// Abort the drag. Never mutates anything.
    pub fn cancel(&mut self) {
        if let Some(active) = self.active {
            log::trace!("drag cancel {active}");
        }
        *self = Self::default();
    }

    /// End the drag and resolve it against the last `over` target.
    /// Returns `None` when no drag was active or the pointer left every node.
    pub fn release(&mut self, tree: &PageTree) -> Option<DropResolution> {
        let session = std::mem::take(self);
        let active = session.active?;
        let over = session.over?;
        Some(resolve_drop(tree, active, over))
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    pub fn over_id(&self) -> Option<NodeId> {
        self.over
    }

    pub fn preview_parent(&self) -> Option<NodeId> {
        self.preview_parent
    }
}
