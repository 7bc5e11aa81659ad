pub mod document;
pub mod error;
pub mod fragment;
pub mod id;
pub mod integrity;
pub mod model;
pub mod style;
pub mod tree;

pub use document::Document;
pub use error::{TreeError, TreeResult};
pub use fragment::Fragment;
pub use id::NodeId;
pub use integrity::{Violation, assert_integrity};
pub use model::*;
pub use style::{emit_declarations, parse_declarations};
pub use tree::{PageTree, TreeOptions};
