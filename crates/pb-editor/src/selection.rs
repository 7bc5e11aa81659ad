//! Selection and hover tracking.
//!
//! Selection is an ordered set: click order is kept so "first selected"
//! is meaningful for panels. Hover is a single id, independent of
//! selection. Neither is recorded in history.

use pb_core::{NodeId, PageTree};
use smallvec::SmallVec;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: SmallVec<[NodeId; 4]>,
    hovered: Option<NodeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Click semantics. Plain click replaces the selection with `[id]`, or
    /// clears it for `None` (empty canvas). Additive click (shift) toggles
    /// `id`, keeping the order of the other members.
    /// Returns whether the selection changed.
    pub fn select(&mut self, id: Option<NodeId>, additive: bool) -> bool {
        let before = self.selected.clone();
        match (id, additive) {
            (Some(id), true) => {
                if let Some(pos) = self.selected.iter().position(|s| *s == id) {
                    self.selected.remove(pos);
                } else {
                    self.selected.push(id);
                }
            }
            (Some(id), false) => {
                self.selected.clear();
                self.selected.push(id);
            }
            // Shift-click on empty canvas keeps the selection.
            (None, true) => {}
            (None, false) => self.selected.clear(),
        }
        self.selected != before
    }

    /// Replace the selection wholesale (duplicates dropped, order kept).
    pub fn set(&mut self, ids: impl IntoIterator<Item = NodeId>) -> bool {
        let mut next: SmallVec<[NodeId; 4]> = SmallVec::new();
        for id in ids {
            if !next.contains(&id) {
                next.push(id);
            }
        }
        if next == self.selected {
            return false;
        }
        self.selected = next;
        true
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        changed
    }

    /// Set the hovered id. Returns whether it changed.
    pub fn hover(&mut self, id: Option<NodeId>) -> bool {
        if self.hovered == id {
            return false;
        }
        self.hovered = id;
        true
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.selected
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.selected.first().copied()
    }

    /// The selected id when exactly one node is selected.
    pub fn single(&self) -> Option<NodeId> {
        match self.selected.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Drop ids that no longer exist in `tree`. Returns
    /// `(selection_changed, hover_changed)`.
    pub fn retain_existing(&mut self, tree: &PageTree) -> (bool, bool) {
        let before = self.selected.len();
        self.selected.retain(|id| tree.contains(*id));
        let selection_changed = self.selected.len() != before;

        let hover_changed = match self.hovered {
            Some(id) if !tree.contains(id) => {
                self.hovered = None;
                true
            }
            _ => false,
        };
        (selection_changed, hover_changed)
    }
}
