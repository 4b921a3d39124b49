//! Attribute-level component commands.
//!
//! Each one removes the old value's effect and installs the new value; undo
//! is the same helper with the arguments swapped. Emptied containers are
//! dropped so apply/undo cycles leave the serialized form untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use sitecraft_document::{
    Component, Declarations, Document, EventHandlers, Id, InputValue, ON_APPEAR,
};

use super::{missing, CommandKind};
use crate::command_op::{Applied, CommandOp};
use crate::effects::Effect;
use crate::errors::CommandError;

fn with_component(doc: &mut Document, id: &str, kind: CommandKind, f: impl FnOnce(&mut Component)) {
    match doc.component_mut(id) {
        Some(component) => f(component),
        None => missing(kind, id),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetComponentStyle {
    pub component_id: Id,
    /// Override selector; `None` targets the component's own rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    pub breakpoint_id: Id,
    #[serde(default)]
    pub pseudo_class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_style: Option<Declarations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_style: Option<Declarations>,
}

impl SetComponentStyle {
    fn install(&self, doc: &mut Document, value: &Option<Declarations>) {
        with_component(doc, &self.component_id, CommandKind::SetComponentStyle, |component| {
            component.style.set_rule(
                self.selector.as_deref(),
                &self.breakpoint_id,
                &self.pseudo_class,
                value.clone(),
            );
        });
    }
}

impl CommandOp for SetComponentStyle {
    fn apply(self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        self.install(doc, &self.new_style);
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        self.install(doc, &self.old_style);
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetComponentMixins {
    pub component_id: Id,
    #[serde(default)]
    pub old_mixins: Vec<Id>,
    #[serde(default)]
    pub new_mixins: Vec<Id>,
}

impl CommandOp for SetComponentMixins {
    fn apply(self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        with_component(doc, &self.component_id, CommandKind::SetComponentMixins, |c| {
            c.style.mixins = self.new_mixins.clone();
        });
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        with_component(doc, &self.component_id, CommandKind::SetComponentMixins, |c| {
            c.style.mixins = self.old_mixins.clone();
        });
        Ok(Vec::new())
    }
}

/// Named input, `{"name": "disabled", "is": true}` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    pub name: String,
    #[serde(flatten)]
    pub value: InputValue,
}

impl Input {
    pub fn new(name: impl Into<String>, is: impl Into<serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            value: InputValue::new(is),
        }
    }
}

fn set_input(component: &mut Component, old: &Option<Input>, new: &Option<Input>) {
    if let Some(old) = old {
        component.inputs.remove(&old.name);
    }
    if let Some(new) = new {
        component.inputs.insert(new.name.clone(), new.value.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetComponentInput {
    pub component_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_input: Option<Input>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_input: Option<Input>,
}

impl CommandOp for SetComponentInput {
    fn apply(self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        with_component(doc, &self.component_id, CommandKind::SetComponentInput, |c| {
            set_input(c, &self.old_input, &self.new_input)
        });
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        with_component(doc, &self.component_id, CommandKind::SetComponentInput, |c| {
            set_input(c, &self.new_input, &self.old_input)
        });
        Ok(Vec::new())
    }
}

/// Named event with its attached behaviors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    #[serde(flatten)]
    pub handlers: EventHandlers,
}

fn set_event(events: &mut BTreeMap<String, EventHandlers>, old: &Option<Event>, new: &Option<Event>) {
    if let Some(old) = old {
        events.remove(&old.name);
    }
    if let Some(new) = new {
        events.insert(new.name.clone(), new.handlers.clone());
    }
}

/// `onAppear` behaviors of the event configuration that just became active.
fn appear_effect(doc: &Document, component_id: &str, active: &Option<Event>) -> Vec<Effect> {
    match active {
        Some(event) if event.name == ON_APPEAR && doc.contains_component(component_id) => {
            Effect::trigger(component_id, ON_APPEAR, &event.handlers)
                .into_iter()
                .collect()
        }
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetComponentEvent {
    pub component_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_event: Option<Event>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_event: Option<Event>,
}

impl CommandOp for SetComponentEvent {
    fn apply(self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        with_component(doc, &self.component_id, CommandKind::SetComponentEvent, |c| {
            set_event(&mut c.events, &self.old_event, &self.new_event)
        });
        let effects = appear_effect(doc, &self.component_id, &self.new_event);
        Ok(Applied::with_effects(self, effects))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        with_component(doc, &self.component_id, CommandKind::SetComponentEvent, |c| {
            set_event(&mut c.events, &self.new_event, &self.old_event)
        });
        Ok(appear_effect(doc, &self.component_id, &self.old_event))
    }
}

/// Same as [`SetComponentEvent`] for editor-only events. Never triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetComponentEditorEvent {
    pub component_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_event: Option<Event>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_event: Option<Event>,
}

impl CommandOp for SetComponentEditorEvent {
    fn apply(self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        with_component(doc, &self.component_id, CommandKind::SetComponentEditorEvent, |c| {
            set_event(&mut c.editor_events, &self.old_event, &self.new_event)
        });
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        with_component(doc, &self.component_id, CommandKind::SetComponentEditorEvent, |c| {
            set_event(&mut c.editor_events, &self.new_event, &self.old_event)
        });
        Ok(Vec::new())
    }
}
