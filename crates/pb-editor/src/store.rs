//! The builder store: one observable state container for the editor.
//!
//! Holds the document tree, selection/hover, history, viewport, drag session
//! and clipboard. Every panel reads through it and every mutation goes
//! through it. A mutation runs against a draft copy of the tree; only a
//! successful, non-empty change replaces the live tree, prunes selection,
//! records history and notifies subscribers. A rejected mutation leaves
//! everything as it was.

use crate::config::EditorConfig;
use crate::dnd::{DragSession, DropRejection, DropResolution, drop_target, resolve_drop};
use crate::error::{EditorError, EditorResult};
use crate::history::History;
use crate::selection::Selection;
use crate::shortcuts::ShortcutAction;
use crate::viewport::{Breakpoint, Viewport};
use pb_core::model::{ComponentNode, ComponentType, NewNode, Props, StyleMap};
use pb_core::{Fragment, NodeId, PageTree, TreeError, TreeResult, parse_declarations};
use std::fmt;

pub type SubscriptionId = u64;

/// Change notifications, delivered after the state is fully updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A mutation was committed (one history entry, or coalesced into the
    /// open gesture's entry).
    TreeChanged { label: String },
    SelectionChanged,
    HoverChanged,
    ViewportChanged,
    /// The tree was replaced by a history snapshot (undo, redo, cancelled
    /// gesture, or a freshly loaded document).
    HistoryMoved { index: usize },
}

type Listener = Box<dyn FnMut(&StoreEvent)>;

pub struct BuilderStore {
    tree: PageTree,
    selection: Selection,
    history: History,
    viewport: Viewport,
    drag: DragSession,
    clipboard: Vec<Fragment>,
    config: EditorConfig,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

impl Default for BuilderStore {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl fmt::Debug for BuilderStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderStore")
            .field("nodes", &self.tree.len())
            .field("selection", &self.selection)
            .field("history_index", &self.history.index())
            .field("history_len", &self.history.len())
            .field("viewport", &self.viewport)
            .field("clipboard", &self.clipboard.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl BuilderStore {
    /// A store holding an empty page.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_tree(PageTree::new(), config)
    }

    /// A store over an existing document. History starts at that document.
    pub fn with_tree(mut tree: PageTree, config: EditorConfig) -> Self {
        tree.set_options(config.tree_options());
        Self {
            history: History::new(tree.clone(), config.history_limit),
            viewport: Viewport::from_config(&config),
            tree,
            selection: Selection::new(),
            drag: DragSession::new(),
            clipboard: Vec::new(),
            config,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Load a persisted document (`{ rootId, idMap }` JSON).
    pub fn from_json(json: &str, config: EditorConfig) -> EditorResult<Self> {
        let tree = PageTree::from_json(json, config.tree_options())?;
        Ok(Self::with_tree(tree, config))
    }

    /// Replace the document, discarding history, selection and any drag.
    pub fn load_json(&mut self, json: &str) -> EditorResult<()> {
        let tree = PageTree::from_json(json, self.config.tree_options())?;
        self.history = History::new(tree.clone(), self.config.history_limit);
        self.tree = tree;
        self.drag.cancel();
        let mut events = vec![StoreEvent::HistoryMoved { index: 0 }];
        if self.selection.clear() {
            events.push(StoreEvent::SelectionChanged);
        }
        if self.selection.hover(None) {
            events.push(StoreEvent::HoverChanged);
        }
        self.emit_all(events);
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, String> {
        self.tree.to_json()
    }

    // ─── Read access ─────────────────────────────────────────────────────

    pub fn tree(&self) -> &PageTree {
        &self.tree
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn clipboard(&self) -> &[Fragment] {
        &self.clipboard
    }

    /// The node the props/style panels edit: present only when exactly one
    /// node is selected.
    pub fn inspected(&self) -> Option<&ComponentNode> {
        self.selection.single().and_then(|id| self.tree.get(id))
    }

    // ─── Subscriptions ───────────────────────────────────────────────────

    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: StoreEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    fn emit_all(&mut self, events: Vec<StoreEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    // ─── Commit pipeline ─────────────────────────────────────────────────

    /// Run `op` on a draft of the tree and commit it if it changed anything.
    fn commit<T>(
        &mut self,
        label: &str,
        op: impl FnOnce(&mut PageTree) -> TreeResult<T>,
    ) -> EditorResult<T> {
        let mut draft = self.tree.clone();
        let out = op(&mut draft).inspect_err(|e| log::warn!("{label} rejected: {e}"))?;
        if draft == self.tree {
            log::trace!("{label}: no change");
            return Ok(out);
        }

        self.tree = draft;
        self.history.record(label, self.tree.clone());
        log::debug!("commit {label:?} (history {})", self.history.index());

        let mut events = vec![StoreEvent::TreeChanged {
            label: label.to_string(),
        }];
        self.prune_selection(&mut events);
        self.emit_all(events);
        Ok(out)
    }

    /// Structural edits never coalesce: close any open gesture first.
    fn commit_structural<T>(
        &mut self,
        label: &str,
        op: impl FnOnce(&mut PageTree) -> TreeResult<T>,
    ) -> EditorResult<T> {
        if self.history.in_gesture() {
            log::debug!("{label}: closing open gesture");
            self.history.close_gesture();
        }
        self.commit(label, op)
    }

    fn prune_selection(&mut self, events: &mut Vec<StoreEvent>) {
        let (selection_changed, hover_changed) = self.selection.retain_existing(&self.tree);
        if selection_changed {
            events.push(StoreEvent::SelectionChanged);
        }
        if hover_changed {
            events.push(StoreEvent::HoverChanged);
        }
    }

    fn ensure_unlocked(&self, id: NodeId) -> EditorResult<()> {
        match self.tree.get(id) {
            Some(node) if node.is_locked => Err(EditorError::Locked(id)),
            Some(_) => Ok(()),
            None => Err(TreeError::NotFound(id).into()),
        }
    }

    // ─── Structural mutations ────────────────────────────────────────────

    /// Insert a new node under `parent` at `index`.
    pub fn insert(&mut self, new: NewNode, parent: NodeId, index: usize) -> EditorResult<NodeId> {
        let label = format!("insert {}", new.ty);
        self.commit_structural(&label, |tree| tree.insert(new, parent, index))
    }

    /// Move `id` under `parent` to final position `index`. Returns `false`
    /// when the node is already there (no history entry).
    pub fn move_node(&mut self, id: NodeId, parent: NodeId, index: usize) -> EditorResult<bool> {
        self.ensure_unlocked(id)?;
        self.commit_structural("move", |tree| tree.reparent(id, parent, index))
    }

    /// Delete `id` and its subtree. Returns the removed ids.
    pub fn remove(&mut self, id: NodeId) -> EditorResult<Vec<NodeId>> {
        self.ensure_unlocked(id)?;
        self.commit_structural("delete", |tree| tree.remove(id))
    }

    /// Deep-copy `id` next to itself. Returns the copy's id.
    pub fn duplicate(&mut self, id: NodeId) -> EditorResult<NodeId> {
        self.commit_structural("duplicate", |tree| tree.clone_subtree(id))
    }

    /// Selected nodes the structural batch ops act on: topmost only, never
    /// the root, never locked.
    fn selected_targets(&self) -> Vec<NodeId> {
        let root = self.tree.root();
        self.tree
            .topmost(self.selection.ids())
            .into_iter()
            .filter(|id| *id != root)
            .filter(|id| {
                let locked = self.tree.get(*id).is_some_and(|n| n.is_locked);
                if locked {
                    log::warn!("skipping locked node {id}");
                }
                !locked
            })
            .collect()
    }

    /// Delete every selected node as one history entry. Returns how many
    /// subtrees were removed.
    pub fn remove_selected(&mut self) -> EditorResult<usize> {
        let targets = self.selected_targets();
        if targets.is_empty() {
            return Ok(0);
        }
        self.commit_structural("delete", |tree| {
            for id in &targets {
                tree.remove(*id)?;
            }
            Ok(targets.len())
        })
    }

    /// Duplicate every selected node as one history entry and select the
    /// copies.
    pub fn duplicate_selected(&mut self) -> EditorResult<Vec<NodeId>> {
        let targets = self.selected_targets();
        if targets.is_empty() {
            return Ok(Vec::new());
        }
        let copies = self.commit_structural("duplicate", |tree| {
            targets
                .iter()
                .map(|id| tree.clone_subtree(*id))
                .collect::<TreeResult<Vec<_>>>()
        })?;
        self.replace_selection(copies.iter().copied());
        Ok(copies)
    }

    pub fn bring_forward(&mut self, id: NodeId) -> EditorResult<bool> {
        self.ensure_unlocked(id)?;
        self.commit_structural("bring forward", |tree| tree.bring_forward(id))
    }

    pub fn send_backward(&mut self, id: NodeId) -> EditorResult<bool> {
        self.ensure_unlocked(id)?;
        self.commit_structural("send backward", |tree| tree.send_backward(id))
    }

    pub fn bring_to_front(&mut self, id: NodeId) -> EditorResult<bool> {
        self.ensure_unlocked(id)?;
        self.commit_structural("bring to front", |tree| tree.bring_to_front(id))
    }

    pub fn send_to_back(&mut self, id: NodeId) -> EditorResult<bool> {
        self.ensure_unlocked(id)?;
        self.commit_structural("send to back", |tree| tree.send_to_back(id))
    }

    /// Wrap sibling nodes in a new container. Returns the wrapper's id.
    pub fn wrap_in_container(&mut self, ids: &[NodeId], ty: ComponentType) -> EditorResult<NodeId> {
        for id in ids {
            self.ensure_unlocked(*id)?;
        }
        let label = format!("wrap in {ty}");
        self.commit_structural(&label, |tree| tree.wrap(ids, ty))
    }

    /// Replace a container with its children.
    pub fn unwrap(&mut self, id: NodeId) -> EditorResult<Vec<NodeId>> {
        self.ensure_unlocked(id)?;
        self.commit_structural("unwrap", |tree| tree.unwrap(id))
    }

    // ─── Content mutations ───────────────────────────────────────────────

    /// Shallow-merge a props patch (props panel save).
    pub fn update_props(&mut self, id: NodeId, patch: Props) -> EditorResult<bool> {
        self.commit("edit props", |tree| tree.update_props(id, patch))
    }

    /// Shallow-merge a styles patch. Empty values remove the property.
    pub fn update_styles(&mut self, id: NodeId, patch: StyleMap) -> EditorResult<bool> {
        self.commit("edit styles", |tree| tree.update_styles(id, patch))
    }

    /// Parse `prop: value; …` text and merge it like `update_styles`.
    pub fn update_styles_css(&mut self, id: NodeId, css: &str) -> EditorResult<bool> {
        let patch = parse_declarations(css).map_err(EditorError::Style)?;
        self.update_styles(id, patch)
    }

    pub fn rename(&mut self, id: NodeId, name: &str) -> EditorResult<bool> {
        self.commit("rename", |tree| tree.set_name(id, name))
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) -> EditorResult<bool> {
        let label = if hidden { "hide" } else { "show" };
        self.commit(label, |tree| tree.set_hidden(id, hidden))
    }

    pub fn set_locked(&mut self, id: NodeId, locked: bool) -> EditorResult<bool> {
        let label = if locked { "lock" } else { "unlock" };
        self.commit(label, |tree| tree.set_locked(id, locked))
    }

    pub fn toggle_hidden(&mut self, id: NodeId) -> EditorResult<bool> {
        let hidden = self.tree.get(id).ok_or(TreeError::NotFound(id))?.is_hidden;
        self.set_hidden(id, !hidden)
    }

    pub fn toggle_locked(&mut self, id: NodeId) -> EditorResult<bool> {
        let locked = self.tree.get(id).ok_or(TreeError::NotFound(id))?.is_locked;
        self.set_locked(id, !locked)
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// Capture the selected subtrees. Returns how many were copied.
    pub fn copy_selected(&mut self) -> EditorResult<usize> {
        let root = self.tree.root();
        let fragments = self
            .tree
            .topmost(self.selection.ids())
            .into_iter()
            .filter(|id| *id != root)
            .map(|id| self.tree.extract(id))
            .collect::<TreeResult<Vec<_>>>()?;
        if fragments.is_empty() {
            return Ok(0);
        }
        log::debug!("copied {} subtrees", fragments.len());
        self.clipboard = fragments;
        Ok(self.clipboard.len())
    }

    /// Copy then delete the selection as one history entry. Locked nodes
    /// are neither copied nor removed; a cut of nothing leaves the
    /// clipboard alone.
    pub fn cut_selected(&mut self) -> EditorResult<usize> {
        let targets = self.selected_targets();
        if targets.is_empty() {
            return Ok(0);
        }
        let fragments = targets
            .iter()
            .map(|id| self.tree.extract(*id))
            .collect::<TreeResult<Vec<_>>>()?;
        let removed = self.commit_structural("cut", |tree| {
            for id in &targets {
                tree.remove(*id)?;
            }
            Ok(targets.len())
        })?;
        self.clipboard = fragments;
        Ok(removed)
    }

    /// Instantiate the clipboard with fresh ids. With a `target`, the
    /// copies land where a drop onto `target` would put them; otherwise at
    /// the end of the page. Selects the pasted nodes.
    pub fn paste(&mut self, target: Option<NodeId>) -> EditorResult<Vec<NodeId>> {
        if self.clipboard.is_empty() {
            return Ok(Vec::new());
        }
        let (parent, index) = match target {
            Some(over) => drop_target(&self.tree, None, over).ok_or(TreeError::NotFound(over))?,
            None => {
                let root = self.tree.root();
                (root, self.tree.child_ids(root).len())
            }
        };
        let fragments = self.clipboard.clone();
        let pasted = self.commit_structural("paste", |tree| {
            fragments
                .iter()
                .enumerate()
                .map(|(offset, fragment)| tree.instantiate(fragment, parent, index + offset))
                .collect::<TreeResult<Vec<_>>>()
        })?;
        self.replace_selection(pasted.iter().copied());
        Ok(pasted)
    }

    // ─── Selection & hover ───────────────────────────────────────────────

    /// Click selection. `None` is a click on empty canvas.
    pub fn select(&mut self, id: Option<NodeId>, additive: bool) -> EditorResult<bool> {
        if let Some(id) = id {
            if !self.tree.contains(id) {
                return Err(TreeError::NotFound(id).into());
            }
        }
        let changed = self.selection.select(id, additive);
        if changed {
            self.emit(StoreEvent::SelectionChanged);
        }
        Ok(changed)
    }

    /// Select every sibling of the first selected node, or every top-level
    /// node when nothing is selected.
    pub fn select_all(&mut self) -> bool {
        let parent = self
            .selection
            .first()
            .and_then(|id| self.tree.parent_of(id))
            .unwrap_or_else(|| self.tree.root());
        let ids = self.tree.child_ids(parent).to_vec();
        self.replace_selection(ids)
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.selection.clear();
        if changed {
            self.emit(StoreEvent::SelectionChanged);
        }
        changed
    }

    fn replace_selection(&mut self, ids: impl IntoIterator<Item = NodeId>) -> bool {
        let changed = self.selection.set(ids);
        if changed {
            self.emit(StoreEvent::SelectionChanged);
        }
        changed
    }

    /// Set the hovered node. Unknown ids clear the hover.
    pub fn hover(&mut self, id: Option<NodeId>) -> bool {
        let id = id.filter(|id| self.tree.contains(*id));
        let changed = self.selection.hover(id);
        if changed {
            self.emit(StoreEvent::HoverChanged);
        }
        changed
    }

    // ─── Drag and drop ───────────────────────────────────────────────────

    pub fn drag_start(&mut self, id: NodeId) -> Result<(), DropRejection> {
        self.drag.start(&self.tree, id)
    }

    /// Pointer moved during a drag: update the tentative highlight.
    pub fn drag_over(&mut self, over: Option<NodeId>) {
        self.drag.over(&self.tree, over);
        self.hover(over);
    }

    /// Abort the drag. No mutation, no history.
    pub fn drag_cancel(&mut self) {
        self.drag.cancel();
    }

    /// Finish the drag. Returns whether the tree changed.
    pub fn drag_end(&mut self) -> EditorResult<bool> {
        match self.drag.release(&self.tree) {
            Some(resolution) => self.apply_drop(resolution),
            None => Ok(false),
        }
    }

    /// Resolve and apply a completed drop of `active` onto `over`.
    pub fn drop_node(&mut self, active: NodeId, over: NodeId) -> EditorResult<bool> {
        let resolution = resolve_drop(&self.tree, active, over);
        self.apply_drop(resolution)
    }

    fn apply_drop(&mut self, resolution: DropResolution) -> EditorResult<bool> {
        match resolution {
            DropResolution::Move(intent) => self.commit_structural("move", |tree| {
                tree.reparent(intent.id, intent.new_parent, intent.index)
            }),
            DropResolution::Reject(reason) => {
                log::trace!("drop rejected: {reason:?}");
                Ok(false)
            }
        }
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Step back one entry. Returns `false` at the start of history.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.undo() else {
            return false;
        };
        self.tree = entry.tree.clone();
        self.after_restore();
        true
    }

    /// Step forward one entry. Returns `false` at the end of history.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.history.redo() else {
            return false;
        };
        self.tree = entry.tree.clone();
        self.after_restore();
        true
    }

    fn after_restore(&mut self) {
        self.drag.cancel();
        let mut events = vec![StoreEvent::HistoryMoved {
            index: self.history.index(),
        }];
        self.prune_selection(&mut events);
        self.emit_all(events);
    }

    /// Open a continuous edit: commits until `end_gesture` collapse into
    /// one history entry labelled `label`.
    pub fn begin_gesture(&mut self, label: &str) {
        self.history.begin_gesture(label, &self.tree);
    }

    /// Close the gesture. Returns whether it produced a history entry.
    pub fn end_gesture(&mut self) -> bool {
        self.history.end_gesture()
    }

    /// Abort the gesture and restore the document from before it.
    /// Returns whether anything had to be rolled back.
    pub fn cancel_gesture(&mut self) -> bool {
        let Some(before) = self.history.cancel_gesture() else {
            return false;
        };
        self.tree = before;
        self.after_restore();
        true
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    fn viewport_changed(&mut self, changed: bool) -> bool {
        if changed {
            self.emit(StoreEvent::ViewportChanged);
        }
        changed
    }

    pub fn zoom_in(&mut self) -> bool {
        let changed = self.viewport.zoom_in();
        self.viewport_changed(changed)
    }

    pub fn zoom_out(&mut self) -> bool {
        let changed = self.viewport.zoom_out();
        self.viewport_changed(changed)
    }

    pub fn reset_zoom(&mut self) -> bool {
        let changed = self.viewport.reset_zoom();
        self.viewport_changed(changed)
    }

    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        let changed = self.viewport.set_zoom(zoom);
        self.viewport_changed(changed)
    }

    pub fn set_breakpoint(&mut self, breakpoint: Breakpoint) -> bool {
        let changed = self.viewport.set_breakpoint(breakpoint);
        self.viewport_changed(changed)
    }

    pub fn toggle_grid(&mut self) -> bool {
        self.viewport.toggle_grid();
        self.viewport_changed(true)
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Execute a shortcut action. Returns whether the document changed.
    pub fn dispatch(&mut self, action: ShortcutAction) -> EditorResult<bool> {
        let single = self.selection.single();
        let changed = match action {
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Delete => self.remove_selected()? > 0,
            ShortcutAction::Duplicate => !self.duplicate_selected()?.is_empty(),
            ShortcutAction::Copy => {
                self.copy_selected()?;
                false
            }
            ShortcutAction::Cut => self.cut_selected()? > 0,
            ShortcutAction::Paste => !self.paste(self.selection.first())?.is_empty(),
            ShortcutAction::SelectAll => {
                self.select_all();
                false
            }
            ShortcutAction::Wrap => {
                let targets = self.selected_targets();
                if targets.is_empty() {
                    false
                } else {
                    let wrapper = self.wrap_in_container(&targets, ComponentType::Container)?;
                    self.replace_selection([wrapper]);
                    true
                }
            }
            ShortcutAction::Unwrap => match single {
                Some(id) => {
                    let lifted = self.unwrap(id)?;
                    self.replace_selection(lifted);
                    true
                }
                None => false,
            },
            ShortcutAction::SendBackward => single.map_or(Ok(false), |id| self.send_backward(id))?,
            ShortcutAction::BringForward => single.map_or(Ok(false), |id| self.bring_forward(id))?,
            ShortcutAction::SendToBack => single.map_or(Ok(false), |id| self.send_to_back(id))?,
            ShortcutAction::BringToFront => single.map_or(Ok(false), |id| self.bring_to_front(id))?,
            ShortcutAction::ZoomIn => {
                self.zoom_in();
                false
            }
            ShortcutAction::ZoomOut => {
                self.zoom_out();
                false
            }
            ShortcutAction::ZoomReset => {
                self.reset_zoom();
                false
            }
            ShortcutAction::ToggleGrid => {
                self.toggle_grid();
                false
            }
            ShortcutAction::Escape => {
                if self.drag.is_active() {
                    self.drag_cancel();
                } else if self.history.in_gesture() {
                    self.cancel_gesture();
                } else {
                    self.clear_selection();
                }
                false
            }
        };
        Ok(changed)
    }
}
