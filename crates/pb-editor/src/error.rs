use pb_core::TreeError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("{0}")]
    Style(String),

    #[error("invalid editor config: {0}")]
    Config(String),

    #[error("{0} is locked")]
    Locked(pb_core::NodeId),
}

pub type EditorResult<T> = Result<T, EditorError>;
