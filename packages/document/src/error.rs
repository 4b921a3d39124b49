//! Error types for the document model

use thiserror::Error;

use crate::ids::Id;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("Duplicate id: {0}")]
    DuplicateId(Id),

    #[error("Parent not found: {0}")]
    ParentNotFound(Id),

    #[error("Component {child} claims parent {claimed:?} but is nested under {actual:?}")]
    ParentMismatch {
        child: Id,
        claimed: Option<Id>,
        actual: Option<Id>,
    },

    #[error("Component {parent} lists missing child {child}")]
    DanglingChild { parent: Id, child: Id },

    #[error("Component {0} is unreachable from its parent's children")]
    Orphaned(Id),

    #[error("Component {0} is its own ancestor")]
    Cycle(Id),

    #[error("Registry key {key} does not match id {id}")]
    KeyMismatch { key: String, id: Id },

    #[error("Page {route} has a missing or parented root {root}")]
    InvalidPageRoot { route: String, root: Id },

    #[error("Id counter {next_id} is not above allocated id {id}")]
    StaleIdCounter { next_id: u64, id: Id },

    #[error("Cannot roll back {count} ids with next id {next_id}")]
    IdUnderflow { next_id: u64, count: u64 },

    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for DocumentError {
    fn from(e: serde_json::Error) -> Self {
        DocumentError::Json(e.to_string())
    }
}

pub type DocumentResult<T> = Result<T, DocumentError>;
