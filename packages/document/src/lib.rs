//! # Sitecraft Document
//!
//! Data model for the site editor: a namespaced [`Context`] of registries,
//! pages keyed by route, and transient [`EditorState`].
//!
//! Components live in a flat id-keyed arena. A component names its parent by
//! id and owns an ordered list of child ids; the nested [`ComponentTree`] is
//! the persisted and undo-payload form.

mod context;
mod document;
mod error;
mod ids;
mod invariants;
pub mod model;
mod serialized;
mod tree;

pub use context::{Context, Translations};
pub use document::{Document, EditorState};
pub use error::{DocumentError, DocumentResult};
pub use ids::{Id, IdGenerator, IdKind};
pub use model::{
    Behavior, BehaviorCall, Breakpoint, Component, ComponentStyle, Declarations, EventHandlers,
    Font, InputValue, Page, PageProps, Style, StyleRules, Theme, ON_APPEAR, ON_SELF_ADDED,
};
pub use serialized::{SerializedContext, SerializedDocument, SerializedPage};
pub use tree::{ComponentTree, Detached, Moved};
