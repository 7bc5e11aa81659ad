//! Undo/redo history.
//!
//! A linear list of document snapshots plus a cursor. The live document
//! always equals `entries[index]`. Recording truncates the redo branch and
//! appends; undo/redo move the cursor and hand back the snapshot to restore.
//!
//! Snapshots are whole `PageTree`s. Cloning one copies node pointers only,
//! so an entry costs a map of `Arc`s, not a deep copy.
//!
//! Continuous edits (a slider drag, typing in a style field) are bracketed
//! with `begin_gesture` / `end_gesture`: the first record inside the gesture
//! appends an entry, later records overwrite it, so the whole gesture undoes
//! in one step.

use pb_core::PageTree;

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub label: String,
    pub tree: PageTree,
}

#[derive(Debug, Clone)]
struct Gesture {
    label: String,
    /// Nesting depth (0 = closed).
    depth: usize,
    /// Document as it was when the gesture opened.
    before: PageTree,
    /// Whether the gesture has produced its entry yet.
    recorded: bool,
}

/// Manages the snapshot list, cursor, and gesture coalescing.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    index: usize,
    /// Maximum retained entries (0 = unlimited).
    limit: usize,
    gesture: Option<Gesture>,
}

impl History {
    /// Start a history whose first entry is `initial`.
    pub fn new(initial: PageTree, limit: usize) -> Self {
        Self {
            entries: vec![HistoryEntry {
                label: "open".to_string(),
                tree: initial,
            }],
            index: 0,
            limit,
            gesture: None,
        }
    }

    /// Record the document state after a committed mutation.
    pub fn record(&mut self, label: &str, tree: PageTree) {
        if let Some(gesture) = self.gesture.as_mut() {
            if gesture.recorded {
                // Coalesce into the gesture's entry.
                self.entries[self.index].tree = tree;
                log::trace!("history: coalesce into {:?}", gesture.label);
                return;
            }
            gesture.recorded = true;
            let label = gesture.label.clone();
            self.push(label, tree);
            return;
        }
        self.push(label.to_string(), tree);
    }

    fn push(&mut self, label: String, tree: PageTree) {
        let dropped = self.entries.len() - (self.index + 1);
        self.entries.truncate(self.index + 1);
        log::debug!("history: record {label:?} (dropped {dropped} redo entries)");
        self.entries.push(HistoryEntry { label, tree });
        self.index = self.entries.len() - 1;
        self.trim();
    }

    fn trim(&mut self) {
        if self.limit == 0 || self.entries.len() <= self.limit {
            return;
        }
        let excess = self.entries.len() - self.limit;
        self.entries.drain(..excess);
        self.index = self.index.saturating_sub(excess);
        log::debug!("history: trimmed {excess} oldest entries");
    }

    /// Step back. Returns the snapshot to restore, or `None` at the start.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        self.gesture = None;
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        log::debug!("history: undo → {}", self.index);
        self.entries.get(self.index)
    }

    /// Step forward. Returns the snapshot to restore, or `None` at the end.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        self.gesture = None;
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        log::debug!("history: redo → {}", self.index);
        self.entries.get(self.index)
    }

    // ─── Gestures ────────────────────────────────────────────────────────

    /// Open (or nest into) a gesture. `current` is the live document.
    pub fn begin_gesture(&mut self, label: &str, current: &PageTree) {
        match self.gesture.as_mut() {
            Some(gesture) => gesture.depth += 1,
            None => {
                self.gesture = Some(Gesture {
                    label: label.to_string(),
                    depth: 1,
                    before: current.clone(),
                    recorded: false,
                });
            }
        }
    }

    /// Close one gesture level. Returns `true` when the outermost level
    /// closed after producing an entry.
    pub fn end_gesture(&mut self) -> bool {
        let Some(gesture) = self.gesture.as_mut() else {
            return false;
        };
        gesture.depth -= 1;
        if gesture.depth > 0 {
            return false;
        }
        let recorded = gesture.recorded;
        self.gesture = None;
        recorded
    }

    /// Close every gesture level at once.
    pub fn close_gesture(&mut self) {
        self.gesture = None;
    }

    /// Abort the gesture. Drops its entry and returns the pre-gesture
    /// document if anything was recorded, `None` otherwise.
    pub fn cancel_gesture(&mut self) -> Option<PageTree> {
        let gesture = self.gesture.take()?;
        if !gesture.recorded {
            return None;
        }
        self.entries.truncate(self.index);
        if self.entries.is_empty() {
            // The pre-gesture entry was trimmed away; reseed it.
            self.entries.push(HistoryEntry {
                label: "open".to_string(),
                tree: gesture.before.clone(),
            });
        }
        self.index = self.entries.len() - 1;
        log::debug!("history: cancel gesture {:?}", gesture.label);
        Some(gesture.before)
    }

    pub fn in_gesture(&self) -> bool {
        self.gesture.is_some()
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.can_undo()
            .then(|| self.entries[self.index].label.as_str())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.entries
            .get(self.index + 1)
            .map(|entry| entry.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &PageTree {
        &self.entries[self.index].tree
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.label.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::model::{ComponentType, NewNode};
    use pretty_assertions::assert_eq;

    fn with_sections(n: usize) -> PageTree {
        let mut tree = PageTree::new();
        for _ in 0..n {
            tree.insert(NewNode::new(ComponentType::Section), tree.root(), usize::MAX)
                .unwrap();
        }
        tree
    }

    #[test]
    fn undo_redo_walk_the_cursor() {
        let mut history = History::new(with_sections(0), 0);
        let one = with_sections(1);
        history.record("insert section", one.clone());

        assert_eq!(history.undo_label(), Some("insert section"));
        assert_eq!(history.undo().map(|e| e.tree.len()), Some(1));
        assert!(history.undo().is_none());
        assert_eq!(history.redo_label(), Some("insert section"));
        assert_eq!(history.redo().map(|e| e.tree.clone()), Some(one));
        assert!(history.redo().is_none());
    }

    #[test]
    fn record_truncates_redo_branch() {
        let mut history = History::new(with_sections(0), 0);
        history.record("a", with_sections(1));
        history.record("b", with_sections(2));
        history.undo();
        history.record("c", with_sections(3));

        assert!(!history.can_redo());
        assert_eq!(history.labels().collect::<Vec<_>>(), vec!["open", "a", "c"]);
    }

    #[test]
    fn limit_trims_oldest() {
        let mut history = History::new(with_sections(0), 3);
        for i in 1..=5 {
            history.record(&format!("step {i}"), with_sections(i));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert_eq!(
            history.labels().collect::<Vec<_>>(),
            vec!["step 3", "step 4", "step 5"]
        );

        let mut undo_count = 0;
        while history.undo().is_some() {
            undo_count += 1;
        }
        assert_eq!(undo_count, 2);
        assert_eq!(history.current().len(), 4);
    }

    #[test]
    fn gesture_coalesces_into_one_entry() {
        let base = with_sections(0);
        let mut history = History::new(base.clone(), 0);
        history.begin_gesture("resize", &base);
        for i in 1..=4 {
            history.record("ignored", with_sections(i));
        }
        assert!(history.end_gesture());

        assert_eq!(history.len(), 2);
        assert_eq!(history.undo_label(), Some("resize"));
        assert_eq!(history.current().len(), 5);
        assert_eq!(history.undo().map(|e| e.tree.len()), Some(1));
    }

    #[test]
    fn empty_gesture_no_entry() {
        let base = with_sections(0);
        let mut history = History::new(base.clone(), 0);
        history.begin_gesture("drag", &base);
        assert!(!history.end_gesture());
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
    }

    #[test]
    fn nested_gestures_close_at_outermost() {
        let base = with_sections(0);
        let mut history = History::new(base.clone(), 0);
        history.begin_gesture("outer", &base);
        history.begin_gesture("inner", &base);
        history.record("x", with_sections(1));
        assert!(!history.end_gesture());
        history.record("x", with_sections(2));
        assert!(history.end_gesture());
        assert_eq!(history.len(), 2);
        assert_eq!(history.undo_label(), Some("outer"));
    }

    #[test]
    fn cancel_gesture_restores_before() {
        let base = with_sections(1);
        let mut history = History::new(base.clone(), 0);
        history.begin_gesture("slider", &base);
        history.record("x", with_sections(2));
        history.record("x", with_sections(3));

        let restored = history.cancel_gesture().unwrap();
        assert_eq!(restored.len(), base.len());
        assert_eq!(history.len(), 1);
        assert!(!history.in_gesture());
        assert!(!history.can_undo());
    }

    #[test]
    fn cancel_after_trim_reseeds() {
        let base = with_sections(0);
        let mut history = History::new(base.clone(), 1);
        history.begin_gesture("slider", &base);
        history.record("x", with_sections(1));
        assert_eq!(history.len(), 1);

        let restored = history.cancel_gesture().unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.current().len(), 1);
    }
}
