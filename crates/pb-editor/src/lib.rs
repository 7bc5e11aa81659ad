pub mod config;
pub mod dnd;
pub mod error;
pub mod history;
pub mod panels;
pub mod selection;
pub mod shortcuts;
pub mod store;
pub mod viewport;

pub use config::EditorConfig;
pub use dnd::{DragSession, DropRejection, DropResolution, MoveIntent, drop_target, resolve_drop};
pub use error::{EditorError, EditorResult};
pub use history::{History, HistoryEntry};
pub use panels::{LayerRow, ViewNode, layer_rows, render_view};
pub use selection::Selection;
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use store::{BuilderStore, StoreEvent, SubscriptionId};
pub use viewport::{Breakpoint, Viewport};
