//! WASM bridge for PB: exposes the page-builder store to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The host shell renders the
//! canvas and panels from the JSON read models returned here and forwards
//! pointer and keyboard input back in.

use pb_core::PageTree;
use pb_core::id::NodeId;
use pb_core::model::{ComponentType, NewNode, Props};
use pb_editor::panels::{layer_rows, render_view};
use pb_editor::shortcuts::{ShortcutAction, ShortcutMap};
use pb_editor::{Breakpoint, BuilderStore, EditorConfig, EditorResult, StoreEvent};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// The main WASM-facing editor controller.
///
/// Mutating calls return JSON: `{"ok":true,...}` on success or
/// `{"ok":false,"error":"..."}` when the store rejected the request.
#[wasm_bindgen]
pub struct PageBuilder {
    store: BuilderStore,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryInfo<'a> {
    index: usize,
    labels: Vec<&'a str>,
    can_undo: bool,
    can_redo: bool,
    undo_label: Option<&'a str>,
    redo_label: Option<&'a str>,
}

impl Default for PageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl PageBuilder {
    /// Create an editor over an empty page with default settings.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook_setup();
        Self {
            store: BuilderStore::default(),
        }
    }

    /// Create an editor with a JSON `EditorConfig`. Invalid config falls
    /// back to the defaults.
    pub fn with_config(config_json: &str) -> Self {
        console_error_panic_hook_setup();
        let config = EditorConfig::from_json(config_json).unwrap_or_else(|e| {
            log::warn!("{e}; using default editor config");
            EditorConfig::default()
        });
        Self {
            store: BuilderStore::new(config),
        }
    }

    // ─── Document I/O ────────────────────────────────────────────────────

    /// Replace the document with persisted `{ rootId, idMap }` JSON.
    pub fn load(&mut self, json: &str) -> String {
        status(self.store.load_json(json))
    }

    /// Current document as `{ rootId, idMap }` JSON.
    pub fn to_json(&self) -> String {
        self.store
            .to_json()
            .unwrap_or_else(|e| error_json(&e))
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Insert a component of `type_name` (e.g. `"button"`) under `parent`.
    /// Returns `{"ok":true,"id":"..."}`.
    pub fn insert(&mut self, type_name: &str, parent: &str, index: usize) -> String {
        let ty = match type_name.parse::<ComponentType>() {
            Ok(ty) => ty,
            Err(e) => return error_json(&e),
        };
        id_result(
            self.store
                .insert(NewNode::new(ty), NodeId::intern(parent), index),
        )
    }

    pub fn move_node(&mut self, id: &str, parent: &str, index: usize) -> String {
        changed_result(
            self.store
                .move_node(NodeId::intern(id), NodeId::intern(parent), index),
        )
    }

    pub fn remove(&mut self, id: &str) -> String {
        match self.store.remove(NodeId::intern(id)) {
            Ok(removed) => {
                let ids: Vec<&str> = removed.iter().map(|id| id.as_str()).collect();
                ok_json(serde_json::json!({ "removed": ids }))
            }
            Err(e) => error_json(&e.to_string()),
        }
    }

    pub fn duplicate(&mut self, id: &str) -> String {
        id_result(self.store.duplicate(NodeId::intern(id)))
    }

    /// Shallow-merge a JSON object of props into the node.
    pub fn update_props(&mut self, id: &str, props_json: &str) -> String {
        let patch: Props = match serde_json::from_str(props_json) {
            Ok(p) => p,
            Err(e) => return error_json(&format!("Props parse error: {e}")),
        };
        changed_result(self.store.update_props(NodeId::intern(id), patch))
    }

    /// Merge `prop: value; …` declarations into the node's styles.
    pub fn update_styles(&mut self, id: &str, css: &str) -> String {
        changed_result(self.store.update_styles_css(NodeId::intern(id), css))
    }

    pub fn rename(&mut self, id: &str, name: &str) -> String {
        changed_result(self.store.rename(NodeId::intern(id), name))
    }

    pub fn toggle_hidden(&mut self, id: &str) -> String {
        changed_result(self.store.toggle_hidden(NodeId::intern(id)))
    }

    pub fn toggle_locked(&mut self, id: &str) -> String {
        changed_result(self.store.toggle_locked(NodeId::intern(id)))
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Click selection. An empty id is a click on empty canvas.
    /// Returns `true` if the selection changed.
    pub fn select_by_id(&mut self, node_id: &str, additive: bool) -> bool {
        let id = (!node_id.is_empty()).then(|| NodeId::intern(node_id));
        self.store.select(id, additive).unwrap_or(false)
    }

    pub fn select_all(&mut self) -> bool {
        self.store.select_all()
    }

    pub fn clear_selection(&mut self) -> bool {
        self.store.clear_selection()
    }

    /// Get all selected node IDs as a JSON array.
    pub fn get_selected_ids(&self) -> String {
        let ids: Vec<&str> = self
            .store
            .selection()
            .ids()
            .iter()
            .map(|id| id.as_str())
            .collect();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    /// Set the hovered node. An empty id clears the hover.
    pub fn hover(&mut self, node_id: &str) -> bool {
        let id = (!node_id.is_empty()).then(|| NodeId::intern(node_id));
        self.store.hover(id)
    }

    pub fn get_hovered_id(&self) -> String {
        self.store
            .selection()
            .hovered()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    // ─── Drag and drop ───────────────────────────────────────────────────

    /// Pick up a node. Returns `false` for the root, locked or unknown ids.
    pub fn drag_start(&mut self, node_id: &str) -> bool {
        self.store.drag_start(NodeId::intern(node_id)).is_ok()
    }

    /// Pointer moved during a drag. Returns the id of the container that
    /// would receive the node, or an empty string.
    pub fn drag_over(&mut self, node_id: &str) -> String {
        let over = (!node_id.is_empty()).then(|| NodeId::intern(node_id));
        self.store.drag_over(over);
        self.store
            .drag()
            .preview_parent()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn drag_end(&mut self) -> String {
        changed_result(self.store.drag_end())
    }

    pub fn drag_cancel(&mut self) {
        self.store.drag_cancel();
    }

    /// Apply a completed drop reported by the host's drag library.
    pub fn drop_node(&mut self, active: &str, over: &str) -> String {
        changed_result(
            self.store
                .drop_node(NodeId::intern(active), NodeId::intern(over)),
        )
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.store.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.store.redo()
    }

    /// Start a continuous edit (slider drag, color picking).
    pub fn begin_gesture(&mut self, label: &str) {
        self.store.begin_gesture(label);
    }

    pub fn end_gesture(&mut self) -> bool {
        self.store.end_gesture()
    }

    pub fn cancel_gesture(&mut self) -> bool {
        self.store.cancel_gesture()
    }

    pub fn get_history_json(&self) -> String {
        let history = self.store.history();
        let info = HistoryInfo {
            index: history.index(),
            labels: history.labels().collect(),
            can_undo: history.can_undo(),
            can_redo: history.can_redo(),
            undo_label: history.undo_label(),
            redo_label: history.redo_label(),
        };
        serde_json::to_string(&info).unwrap_or_else(|e| error_json(&e.to_string()))
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) -> bool {
        self.store.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.store.zoom_out()
    }

    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        self.store.set_zoom(zoom)
    }

    /// Switch device preview: `"desktop"`, `"tablet"` or `"mobile"`.
    pub fn set_breakpoint(&mut self, name: &str) -> bool {
        match Breakpoint::ALL.into_iter().find(|b| b.as_str() == name) {
            Some(bp) => self.store.set_breakpoint(bp),
            None => false,
        }
    }

    pub fn toggle_grid(&mut self) -> bool {
        self.store.toggle_grid()
    }

    /// `{"zoom":1,"breakpoint":"desktop","showGrid":false,"canvasWidth":1280}`
    pub fn get_viewport_json(&self) -> String {
        let vp = self.store.viewport();
        let mut value = serde_json::to_value(vp).unwrap_or_default();
        value["canvasWidth"] = serde_json::json!(vp.canvas_width());
        value.to_string()
    }

    // ─── Panel read models ───────────────────────────────────────────────

    /// Flat layer rows, depth-first from the root.
    pub fn get_layers_json(&self) -> String {
        let rows = layer_rows(self.store.tree(), self.store.selection());
        serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
    }

    /// Renderer view of the whole page.
    pub fn get_view_json(&self) -> String {
        let view = render_view(self.store.tree(), self.store.tree().root());
        serde_json::to_string(&view).unwrap_or_else(|_| "null".to_string())
    }

    /// The singly selected node for the props/style panels, or `{}`.
    pub fn get_inspected_json(&self) -> String {
        let Some(node) = self.store.inspected() else {
            return "{}".to_string();
        };
        serde_json::to_string(node).unwrap_or_else(|_| "{}".to_string())
    }

    // ─── Keyboard Shortcut API ───────────────────────────────────────────

    /// Handle a keyboard event. Returns a JSON string:
    /// `{"changed":bool, "action":"<action_name>"}`
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let action = match ShortcutMap::resolve(key, ctrl, shift, alt, meta) {
            Some(a) => a,
            None => return r#"{"changed":false,"action":"none"}"#.to_string(),
        };

        let action_name = action_to_name(action);
        let out = match self.store.dispatch(action) {
            Ok(changed) => serde_json::json!({ "changed": changed, "action": action_name }),
            Err(e) => serde_json::json!({
                "changed": false,
                "action": action_name,
                "error": e.to_string(),
            }),
        };
        out.to_string()
    }

    // ─── Change notifications ────────────────────────────────────────────

    /// Register a JS callback invoked with an event name after each state
    /// change (`"tree"`, `"selection"`, `"hover"`, `"viewport"`, `"history"`).
    /// Returns a handle for `off_change`.
    pub fn on_change(&mut self, callback: js_sys::Function) -> u32 {
        let id = self.store.subscribe(move |event| {
            let name = JsValue::from_str(event_to_name(event));
            if let Err(e) = callback.call1(&JsValue::NULL, &name) {
                web_sys::console::error_1(&e);
            }
        });
        id as u32
    }

    pub fn off_change(&mut self, handle: u32) -> bool {
        self.store.unsubscribe(u64::from(handle))
    }
}

fn action_to_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::Undo => "undo",
        ShortcutAction::Redo => "redo",
        ShortcutAction::Delete => "delete",
        ShortcutAction::Duplicate => "duplicate",
        ShortcutAction::Copy => "copy",
        ShortcutAction::Cut => "cut",
        ShortcutAction::Paste => "paste",
        ShortcutAction::SelectAll => "selectAll",
        ShortcutAction::Wrap => "wrap",
        ShortcutAction::Unwrap => "unwrap",
        ShortcutAction::SendBackward => "sendBackward",
        ShortcutAction::BringForward => "bringForward",
        ShortcutAction::SendToBack => "sendToBack",
        ShortcutAction::BringToFront => "bringToFront",
        ShortcutAction::ZoomIn => "zoomIn",
        ShortcutAction::ZoomOut => "zoomOut",
        ShortcutAction::ZoomReset => "zoomReset",
        ShortcutAction::ToggleGrid => "toggleGrid",
        ShortcutAction::Escape => "escape",
    }
}

fn event_to_name(event: &StoreEvent) -> &'static str {
    match event {
        StoreEvent::TreeChanged { .. } => "tree",
        StoreEvent::SelectionChanged => "selection",
        StoreEvent::HoverChanged => "hover",
        StoreEvent::ViewportChanged => "viewport",
        StoreEvent::HistoryMoved { .. } => "history",
    }
}

// ─── JSON envelopes ──────────────────────────────────────────────────────

fn error_json(msg: &str) -> String {
    serde_json::json!({ "ok": false, "error": msg }).to_string()
}

fn ok_json(mut extra: serde_json::Value) -> String {
    extra["ok"] = serde_json::Value::Bool(true);
    extra.to_string()
}

fn status(result: EditorResult<()>) -> String {
    match result {
        Ok(()) => r#"{"ok":true}"#.to_string(),
        Err(e) => error_json(&e.to_string()),
    }
}

fn changed_result(result: EditorResult<bool>) -> String {
    match result {
        Ok(changed) => ok_json(serde_json::json!({ "changed": changed })),
        Err(e) => error_json(&e.to_string()),
    }
}

fn id_result(result: EditorResult<NodeId>) -> String {
    match result {
        Ok(id) => ok_json(serde_json::json!({ "id": id.as_str() })),
        Err(e) => error_json(&e.to_string()),
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("PB WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone validation (no editor needed) ────────────────────────────

/// Validate a persisted document. Returns JSON: `{"ok":true,"nodes":N}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_document(json: &str) -> String {
    match PageTree::from_json(json, Default::default()) {
        Ok(tree) => ok_json(serde_json::json!({ "nodes": tree.len() })),
        Err(e) => error_json(&e.to_string()),
    }
}

/// Parse `prop: value; …` text into a camelCase style object.
#[wasm_bindgen]
pub fn parse_styles(css: &str) -> String {
    match pb_core::parse_declarations(css) {
        Ok(styles) => ok_json(serde_json::json!({ "styles": styles })),
        Err(e) => error_json(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(json: &str) -> serde_json::Value {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn insert_and_read_back() {
        let mut pb = PageBuilder::new();
        let out = parse(&pb.insert("section", "root", 0));
        assert_eq!(out["ok"], true);
        let id = out["id"].as_str().unwrap().to_string();

        let layers = parse(&pb.get_layers_json());
        assert_eq!(layers[1]["id"], id.as_str());
        assert_eq!(layers[1]["type"], "section");
        assert!(pb.undo());
        assert_eq!(parse(&pb.get_layers_json()).as_array().unwrap().len(), 1);
    }

    #[test]
    fn errors_are_reported_as_json() {
        let mut pb = PageBuilder::new();
        let out = parse(&pb.insert("carousel", "root", 0));
        assert_eq!(out["ok"], false);
        assert!(out["error"].as_str().unwrap().contains("carousel"));

        let out = parse(&pb.remove("root"));
        assert_eq!(out["ok"], false);

        let out = parse(&pb.update_styles("root", "color \"red\""));
        assert_eq!(out["ok"], false);
    }

    #[test]
    fn error_text_with_control_characters_stays_valid_json() {
        let mut pb = PageBuilder::new();
        let out = parse(&pb.remove("line\nbreak\t\"quoted\""));
        assert_eq!(out["ok"], false);
        assert!(out["error"].as_str().unwrap().contains("line\nbreak"));

        let section = parse(&pb.insert("section", "root", 0));
        let id = section["id"].as_str().unwrap();
        assert!(pb.select_by_id(id, false));
        assert_eq!(parse(&pb.toggle_locked(id))["changed"], true);
        let out = parse(&pb.handle_key("]", true, false, false, false));
        assert_eq!(out["action"], "bringForward");
        assert_eq!(out["changed"], false);
        assert!(out["error"].as_str().unwrap().contains("locked"));
    }

    #[test]
    fn handle_key_reports_action() {
        let mut pb = PageBuilder::new();
        let out = parse(&pb.handle_key("z", false, false, false, true));
        assert_eq!(out["action"], "undo");
        assert_eq!(out["changed"], false);
        let out = parse(&pb.handle_key("q", false, false, false, false));
        assert_eq!(out["action"], "none");
    }

    #[test]
    fn viewport_json_includes_canvas_width() {
        let mut pb = PageBuilder::new();
        assert!(pb.set_breakpoint("mobile"));
        assert!(!pb.set_breakpoint("watch"));
        let vp = parse(&pb.get_viewport_json());
        assert_eq!(vp["breakpoint"], "mobile");
        assert_eq!(vp["canvasWidth"], 375.0);
    }

    #[test]
    fn standalone_validation() {
        assert_eq!(parse(&validate_document("{"))["ok"], false);
        let out = parse(&validate_document(
            r#"{"rootId":"root","idMap":{"root":{"id":"root","type":"root","name":"Page"}}}"#,
        ));
        assert_eq!(out["nodes"], 1);
        let out = parse(&parse_styles("background-color: #fff"));
        assert_eq!(out["styles"]["backgroundColor"], "#fff");
    }
}
