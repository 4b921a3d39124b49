//! # Commands
//!
//! Every document edit is a [`Command`]: a serializable payload that carries
//! both the values needed to re-apply it and the values needed to undo it.
//!
//! Wire form is `{"type": "<camelCase variant>", "data": {...}}`.
//!
//! ## Dispatch
//!
//! [`apply_command`] and [`undo_command`] match exhaustively on the variant,
//! so a new variant cannot be added without both arms. `Undo` and `Redo` are
//! requests to the history and fail loudly here.
//!
//! ## Missing targets
//!
//! Attribute edits on a component, style, page or breakpoint that no longer
//! exists are no-ops. Structural commands that would leave an orphan fail
//! with an error before touching the document.

mod attributes;
mod component;
mod group;
mod page;
mod registry;

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::instrument;

use sitecraft_document::Document;

use crate::command_op::{Applied, CommandOp};
use crate::effects::Effect;
use crate::errors::CommandError;

pub use attributes::{
    Event, Input, SetComponentEditorEvent, SetComponentEvent, SetComponentInput,
    SetComponentMixins, SetComponentStyle,
};
pub use component::{
    AddComponent, ComponentProps, EditComponent, MoveComponent, NewComponent, Position,
    RemoveComponent,
};
pub use group::Group;
pub use page::{AddPage, EditPage, RemovePage};
pub use registry::{
    AddBehavior, AddBreakpoint, AddStyle, BehaviorProps, BreakpointProps, EditBehavior,
    EditBreakpoint, EditStyle, RemoveBehavior, RemoveBreakpoint, RemoveStyle, SetStyleDeclarations,
    SetThemeFont, SetThemeVariable, SetTranslation, ThemeVariable,
};

pub(crate) use group::apply_all;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Command {
    AddComponent(AddComponent),
    RemoveComponent(RemoveComponent),
    MoveComponent(MoveComponent),
    EditComponent(EditComponent),
    SetComponentStyle(SetComponentStyle),
    SetComponentMixins(SetComponentMixins),
    SetComponentInput(SetComponentInput),
    SetComponentEvent(SetComponentEvent),
    SetComponentEditorEvent(SetComponentEditorEvent),
    AddStyle(AddStyle),
    EditStyle(EditStyle),
    SetStyleDeclarations(SetStyleDeclarations),
    RemoveStyle(RemoveStyle),
    SetThemeVariable(SetThemeVariable),
    SetThemeFont(SetThemeFont),
    AddPage(AddPage),
    EditPage(EditPage),
    RemovePage(RemovePage),
    AddBreakpoint(AddBreakpoint),
    EditBreakpoint(EditBreakpoint),
    RemoveBreakpoint(RemoveBreakpoint),
    AddBehavior(AddBehavior),
    EditBehavior(EditBehavior),
    RemoveBehavior(RemoveBehavior),
    SetTranslation(SetTranslation),
    Group(Group),
    Undo,
    Redo,
}

/// Variant tag of a [`Command`], for logs and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    AddComponent,
    RemoveComponent,
    MoveComponent,
    EditComponent,
    SetComponentStyle,
    SetComponentMixins,
    SetComponentInput,
    SetComponentEvent,
    SetComponentEditorEvent,
    AddStyle,
    EditStyle,
    SetStyleDeclarations,
    RemoveStyle,
    SetThemeVariable,
    SetThemeFont,
    AddPage,
    EditPage,
    RemovePage,
    AddBreakpoint,
    EditBreakpoint,
    RemoveBreakpoint,
    AddBehavior,
    EditBehavior,
    RemoveBehavior,
    SetTranslation,
    Group,
    Undo,
    Redo,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::AddComponent => "addComponent",
            CommandKind::RemoveComponent => "removeComponent",
            CommandKind::MoveComponent => "moveComponent",
            CommandKind::EditComponent => "editComponent",
            CommandKind::SetComponentStyle => "setComponentStyle",
            CommandKind::SetComponentMixins => "setComponentMixins",
            CommandKind::SetComponentInput => "setComponentInput",
            CommandKind::SetComponentEvent => "setComponentEvent",
            CommandKind::SetComponentEditorEvent => "setComponentEditorEvent",
            CommandKind::AddStyle => "addStyle",
            CommandKind::EditStyle => "editStyle",
            CommandKind::SetStyleDeclarations => "setStyleDeclarations",
            CommandKind::RemoveStyle => "removeStyle",
            CommandKind::SetThemeVariable => "setThemeVariable",
            CommandKind::SetThemeFont => "setThemeFont",
            CommandKind::AddPage => "addPage",
            CommandKind::EditPage => "editPage",
            CommandKind::RemovePage => "removePage",
            CommandKind::AddBreakpoint => "addBreakpoint",
            CommandKind::EditBreakpoint => "editBreakpoint",
            CommandKind::RemoveBreakpoint => "removeBreakpoint",
            CommandKind::AddBehavior => "addBehavior",
            CommandKind::EditBehavior => "editBehavior",
            CommandKind::RemoveBehavior => "removeBehavior",
            CommandKind::SetTranslation => "setTranslation",
            CommandKind::Group => "group",
            CommandKind::Undo => "undo",
            CommandKind::Redo => "redo",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::AddComponent(_) => CommandKind::AddComponent,
            Command::RemoveComponent(_) => CommandKind::RemoveComponent,
            Command::MoveComponent(_) => CommandKind::MoveComponent,
            Command::EditComponent(_) => CommandKind::EditComponent,
            Command::SetComponentStyle(_) => CommandKind::SetComponentStyle,
            Command::SetComponentMixins(_) => CommandKind::SetComponentMixins,
            Command::SetComponentInput(_) => CommandKind::SetComponentInput,
            Command::SetComponentEvent(_) => CommandKind::SetComponentEvent,
            Command::SetComponentEditorEvent(_) => CommandKind::SetComponentEditorEvent,
            Command::AddStyle(_) => CommandKind::AddStyle,
            Command::EditStyle(_) => CommandKind::EditStyle,
            Command::SetStyleDeclarations(_) => CommandKind::SetStyleDeclarations,
            Command::RemoveStyle(_) => CommandKind::RemoveStyle,
            Command::SetThemeVariable(_) => CommandKind::SetThemeVariable,
            Command::SetThemeFont(_) => CommandKind::SetThemeFont,
            Command::AddPage(_) => CommandKind::AddPage,
            Command::EditPage(_) => CommandKind::EditPage,
            Command::RemovePage(_) => CommandKind::RemovePage,
            Command::AddBreakpoint(_) => CommandKind::AddBreakpoint,
            Command::EditBreakpoint(_) => CommandKind::EditBreakpoint,
            Command::RemoveBreakpoint(_) => CommandKind::RemoveBreakpoint,
            Command::AddBehavior(_) => CommandKind::AddBehavior,
            Command::EditBehavior(_) => CommandKind::EditBehavior,
            Command::RemoveBehavior(_) => CommandKind::RemoveBehavior,
            Command::SetTranslation(_) => CommandKind::SetTranslation,
            Command::Group(_) => CommandKind::Group,
            Command::Undo => CommandKind::Undo,
            Command::Redo => CommandKind::Redo,
        }
    }

    /// Wrap several commands as one undoable unit.
    pub fn group(commands: Vec<Command>) -> Self {
        Command::Group(Group { commands })
    }

    /// Replace a group of exactly one command by that command.
    pub fn unwrap_group(self) -> Self {
        let mut command = self;
        loop {
            match command {
                Command::Group(mut group) if group.commands.len() == 1 => {
                    command = group.commands.remove(0);
                }
                other => return other,
            }
        }
    }

    /// Id of the component or registry entry this command created, once
    /// applied.
    pub fn created_id(&self) -> Option<&str> {
        match self {
            Command::AddComponent(data) => data.id.as_deref(),
            Command::AddStyle(data) => data.id.as_deref(),
            Command::AddBreakpoint(data) => data.id.as_deref(),
            Command::AddBehavior(data) => data.id.as_deref(),
            Command::AddPage(data) => data.root_id.as_deref(),
            _ => None,
        }
    }
}

/// Apply a command and return it completed for undo.
#[instrument(level = "debug", skip_all, fields(kind = %command.kind()))]
pub fn apply_command(doc: &mut Document, command: Command) -> Result<Applied<Command>, CommandError> {
    let kind = command.kind();
    let applied = match command {
        Command::AddComponent(data) => data.apply(doc)?.map(Command::AddComponent),
        Command::RemoveComponent(data) => data.apply(doc)?.map(Command::RemoveComponent),
        Command::MoveComponent(data) => data.apply(doc)?.map(Command::MoveComponent),
        Command::EditComponent(data) => data.apply(doc)?.map(Command::EditComponent),
        Command::SetComponentStyle(data) => data.apply(doc)?.map(Command::SetComponentStyle),
        Command::SetComponentMixins(data) => data.apply(doc)?.map(Command::SetComponentMixins),
        Command::SetComponentInput(data) => data.apply(doc)?.map(Command::SetComponentInput),
        Command::SetComponentEvent(data) => data.apply(doc)?.map(Command::SetComponentEvent),
        Command::SetComponentEditorEvent(data) => {
            data.apply(doc)?.map(Command::SetComponentEditorEvent)
        }
        Command::AddStyle(data) => data.apply(doc)?.map(Command::AddStyle),
        Command::EditStyle(data) => data.apply(doc)?.map(Command::EditStyle),
        Command::SetStyleDeclarations(data) => data.apply(doc)?.map(Command::SetStyleDeclarations),
        Command::RemoveStyle(data) => data.apply(doc)?.map(Command::RemoveStyle),
        Command::SetThemeVariable(data) => data.apply(doc)?.map(Command::SetThemeVariable),
        Command::SetThemeFont(data) => data.apply(doc)?.map(Command::SetThemeFont),
        Command::AddPage(data) => data.apply(doc)?.map(Command::AddPage),
        Command::EditPage(data) => data.apply(doc)?.map(Command::EditPage),
        Command::RemovePage(data) => data.apply(doc)?.map(Command::RemovePage),
        Command::AddBreakpoint(data) => data.apply(doc)?.map(Command::AddBreakpoint),
        Command::EditBreakpoint(data) => data.apply(doc)?.map(Command::EditBreakpoint),
        Command::RemoveBreakpoint(data) => data.apply(doc)?.map(Command::RemoveBreakpoint),
        Command::AddBehavior(data) => data.apply(doc)?.map(Command::AddBehavior),
        Command::EditBehavior(data) => data.apply(doc)?.map(Command::EditBehavior),
        Command::RemoveBehavior(data) => data.apply(doc)?.map(Command::RemoveBehavior),
        Command::SetTranslation(data) => data.apply(doc)?.map(Command::SetTranslation),
        Command::Group(data) => data.apply(doc)?.map(Command::Group),
        Command::Undo | Command::Redo => {
            tracing::error!(kind = %kind, "undo/redo dispatched through apply");
            return Err(CommandError::NotDispatchable(kind));
        }
    };
    Ok(applied)
}

/// Revert a command previously returned by [`apply_command`].
#[instrument(level = "debug", skip_all, fields(kind = %command.kind()))]
pub fn undo_command(doc: &mut Document, command: &Command) -> Result<Vec<Effect>, CommandError> {
    match command {
        Command::AddComponent(data) => data.undo(doc),
        Command::RemoveComponent(data) => data.undo(doc),
        Command::MoveComponent(data) => data.undo(doc),
        Command::EditComponent(data) => data.undo(doc),
        Command::SetComponentStyle(data) => data.undo(doc),
        Command::SetComponentMixins(data) => data.undo(doc),
        Command::SetComponentInput(data) => data.undo(doc),
        Command::SetComponentEvent(data) => data.undo(doc),
        Command::SetComponentEditorEvent(data) => data.undo(doc),
        Command::AddStyle(data) => data.undo(doc),
        Command::EditStyle(data) => data.undo(doc),
        Command::SetStyleDeclarations(data) => data.undo(doc),
        Command::RemoveStyle(data) => data.undo(doc),
        Command::SetThemeVariable(data) => data.undo(doc),
        Command::SetThemeFont(data) => data.undo(doc),
        Command::AddPage(data) => data.undo(doc),
        Command::EditPage(data) => data.undo(doc),
        Command::RemovePage(data) => data.undo(doc),
        Command::AddBreakpoint(data) => data.undo(doc),
        Command::EditBreakpoint(data) => data.undo(doc),
        Command::RemoveBreakpoint(data) => data.undo(doc),
        Command::AddBehavior(data) => data.undo(doc),
        Command::EditBehavior(data) => data.undo(doc),
        Command::RemoveBehavior(data) => data.undo(doc),
        Command::SetTranslation(data) => data.undo(doc),
        Command::Group(data) => data.undo(doc),
        Command::Undo | Command::Redo => {
            tracing::error!(kind = %command.kind(), "undo/redo dispatched through undo");
            Err(CommandError::NotDispatchable(command.kind()))
        }
    }
}

/// Log a command that found nothing to act on.
pub(crate) fn missing(kind: CommandKind, target: &str) {
    tracing::debug!(kind = %kind, target = %target, "Target missing, skipping");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_undo_and_redo_are_not_dispatchable() {
        let mut doc = Document::blank("site");
        let before = doc.clone();

        assert_eq!(
            apply_command(&mut doc, Command::Undo).unwrap_err(),
            CommandError::NotDispatchable(CommandKind::Undo)
        );
        assert_eq!(
            apply_command(&mut doc, Command::Redo).unwrap_err(),
            CommandError::NotDispatchable(CommandKind::Redo)
        );
        assert_eq!(doc, before);
    }

    #[test]
    fn test_wire_format() {
        let command: Command = serde_json::from_value(json!({
            "type": "setComponentInput",
            "data": {
                "componentId": "site-component-2",
                "newInput": { "name": "disabled", "is": true }
            }
        }))
        .unwrap();

        let Command::SetComponentInput(data) = &command else {
            panic!("Expected setComponentInput");
        };
        assert_eq!(data.component_id, "site-component-2");
        assert!(data.old_input.is_none());
        assert_eq!(data.new_input.as_ref().unwrap().value.is, json!(true));

        let undo: Command = serde_json::from_value(json!({ "type": "undo" })).unwrap();
        assert_eq!(undo, Command::Undo);
        assert_eq!(serde_json::to_value(&Command::Redo).unwrap(), json!({ "type": "redo" }));
    }

    #[test]
    fn test_unwrap_group() {
        let inner = Command::SetTranslation(SetTranslation {
            lang: "fr".to_string(),
            key: "hello".to_string(),
            old_value: None,
            new_value: Some("bonjour".to_string()),
        });

        let nested = Command::group(vec![Command::group(vec![inner.clone()])]);
        assert_eq!(nested.unwrap_group(), inner);

        let pair = Command::group(vec![inner.clone(), inner]);
        assert_eq!(pair.clone().unwrap_group(), pair);
    }

    #[test]
    fn test_kind_matches_wire_tag() {
        let command = Command::group(vec![]);
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["type"], command.kind().as_str());
    }
}
