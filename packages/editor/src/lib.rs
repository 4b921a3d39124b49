//! # Sitecraft Editor
//!
//! Reversible command engine over a [`sitecraft_document::Document`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host UI: builds Commands, owns a handle     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: DocumentHandle                      │
//! │  - History: back/forward command stacks     │
//! │  - Dispatcher: apply/undo per variant       │
//! │  - Effects: behavior triggers after commit  │
//! │  - Persistence: save after commit           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ document: arena of components + registries  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Commands are values**: each payload carries what undo needs
//! 2. **Undo is exact**: apply then undo leaves the document content equal
//!    to what it was, id counter included
//! 3. **Single writer**: one handle per open document, no locking
//! 4. **Hooks after commit**: behaviors and saves never see a half-applied
//!    document
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sitecraft_editor::{AddComponent, Command, DocumentHandle, EditorConfig};
//!
//! let mut handle = DocumentHandle::blank(EditorConfig::default());
//! let root = handle.document().pages["/"].root.clone();
//!
//! handle.push_command(Command::AddComponent(AddComponent::new("button").under(root)))?;
//! handle.undo_last_command()?;
//! ```

mod command_op;
mod commands;
mod config;
mod effects;
mod errors;
mod handle;
mod history;

pub use command_op::{Applied, CommandOp};
pub use commands::{
    apply_command, undo_command, AddBehavior, AddBreakpoint, AddComponent, AddPage, AddStyle,
    BehaviorProps, BreakpointProps, Command, CommandKind, ComponentProps, EditBehavior,
    EditBreakpoint, EditComponent, EditPage, EditStyle, Event, Group, Input, MoveComponent,
    NewComponent, Position, RemoveBehavior, RemoveBreakpoint, RemoveComponent, RemovePage,
    RemoveStyle, SetComponentEditorEvent, SetComponentEvent, SetComponentInput,
    SetComponentMixins, SetComponentStyle, SetStyleDeclarations, SetThemeFont, SetThemeVariable,
    SetTranslation, ThemeVariable,
};
pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use effects::{run_effects, BehaviorTrigger, Effect, NoopTrigger};
pub use errors::{CommandError, EditorError};
pub use handle::{DocumentHandle, NoPersistence, Persistence};
pub use history::History;

// Re-export the document model for convenience
pub use sitecraft_document as document;
