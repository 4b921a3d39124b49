//! Error types for the editor

use sitecraft_document::{DocumentError, Id};
use thiserror::Error;

use crate::commands::CommandKind;

/// Failure applying or undoing a command.
///
/// Every variant is raised before the document is touched; a failed command
/// leaves no partial state behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("{0} is handled by the history and cannot be applied directly")]
    NotDispatchable(CommandKind),

    #[error("{0} command was never applied")]
    NotApplied(CommandKind),

    #[error("Parent not found: {0}")]
    ParentNotFound(Id),

    #[error("Moving {0} would create a cycle")]
    CycleDetected(Id),

    #[error("Component {0} has no parent to move from")]
    Unparented(Id),

    #[error("Component {0} is a page root; remove the page instead")]
    PageRoot(Id),

    #[error("Cannot remove the last page in a document")]
    LastPage,

    #[error("Route already in use: {0}")]
    RouteTaken(String),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
