//! Keyboard shortcut mapping.
//!
//! Key + modifier combos resolve to semantic `ShortcutAction`s through one
//! binding table, so the wasm host and native tests share the same map.
//! `BuilderStore::dispatch` executes the resolved action.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── History ──
    Undo,
    Redo,

    // ── Selection & clipboard ──
    Delete,
    Duplicate,
    Copy,
    Cut,
    Paste,
    SelectAll,

    // ── Structure ──
    Wrap,
    Unwrap,
    SendBackward,
    BringForward,
    SendToBack,
    BringToFront,

    // ── Canvas ──
    ZoomIn,
    ZoomOut,
    ZoomReset,
    ToggleGrid,

    /// Abort a drag or gesture in progress, else clear the selection.
    Escape,
}

/// Which modifier layer a binding lives on. `Cmd` is ⌘ on macOS and Ctrl
/// elsewhere; both count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Plain,
    Cmd,
    CmdShift,
}

impl Layer {
    fn of(ctrl: bool, shift: bool, meta: bool) -> Option<Self> {
        match (ctrl || meta, shift) {
            (true, true) => Some(Self::CmdShift),
            (true, false) => Some(Self::Cmd),
            (false, false) => Some(Self::Plain),
            // Shift alone is reserved for additive clicks.
            (false, true) => None,
        }
    }
}

/// `(layer, key, action)`. Letter keys match either case.
const BINDINGS: &[(Layer, &str, ShortcutAction)] = {
    use Layer::*;
    use ShortcutAction::*;
    &[
        (CmdShift, "z", Redo),
        (CmdShift, "g", Unwrap),
        (CmdShift, "[", SendToBack),
        (CmdShift, "{", SendToBack),
        (CmdShift, "]", BringToFront),
        (CmdShift, "}", BringToFront),
        (Cmd, "z", Undo),
        (Cmd, "y", Redo),
        (Cmd, "a", SelectAll),
        (Cmd, "d", Duplicate),
        (Cmd, "c", Copy),
        (Cmd, "x", Cut),
        (Cmd, "v", Paste),
        (Cmd, "g", Wrap),
        (Cmd, "=", ZoomIn),
        (Cmd, "+", ZoomIn),
        (Cmd, "-", ZoomOut),
        (Cmd, "0", ZoomReset),
        (Cmd, "[", SendBackward),
        (Cmd, "]", BringForward),
        (Plain, "Delete", Delete),
        (Plain, "Backspace", Delete),
        (Plain, "Escape", Escape),
        (Plain, "g", ToggleGrid),
    ]
};

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Alt never changes the result. Returns `None` if the combo is unbound.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let layer = Layer::of(ctrl, shift, meta)?;
        BINDINGS
            .iter()
            .find(|(l, k, _)| *l == layer && k.eq_ignore_ascii_case(key))
            .map(|(_, _, action)| *action)
    }
}
