//! Commands over the context registries: style mixins, theme, breakpoints,
//! behaviors and translations.
//!
//! Removing a mixin or breakpoint does not touch components that reference
//! it; dangling ids resolve to nothing at render time.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use sitecraft_document::{
    model, Behavior, Breakpoint, Declarations, Document, Font, Id, IdKind, Style, StyleRules,
};

use super::{missing, CommandKind};
use crate::command_op::{Applied, CommandOp};
use crate::effects::Effect;
use crate::errors::CommandError;

/// Undo of an allocating add: hand the id back, then drop the entry.
fn release<T>(
    doc: &mut Document,
    kind: CommandKind,
    id: &Option<Id>,
    registry: impl FnOnce(&mut Document) -> &mut BTreeMap<Id, T>,
) -> Result<Vec<Effect>, CommandError> {
    let id = id.as_ref().ok_or(CommandError::NotApplied(kind))?;
    doc.context.ids.check_rollback(1)?;
    if registry(doc).remove(id).is_none() {
        missing(kind, id);
        return Ok(Vec::new());
    }
    doc.context.ids.rollback(1)?;
    Ok(Vec::new())
}

fn restore<T: Clone>(registry: &mut BTreeMap<Id, T>, id: &Id, removed: &Option<T>) {
    if let Some(entry) = removed {
        registry.insert(id.clone(), entry.clone());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStyle {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub breakpoints: StyleRules,
    /// Set by apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
}

impl CommandOp for AddStyle {
    fn apply(mut self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        let id = doc.context.allocate(IdKind::Style);
        doc.context.styles.insert(
            id.clone(),
            Style {
                id: id.clone(),
                name: self.name.clone(),
                breakpoints: self.breakpoints.clone(),
            },
        );
        self.id = Some(id);
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        release(doc, CommandKind::AddStyle, &self.id, |doc| &mut doc.context.styles)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditStyle {
    pub style_id: Id,
    pub old_name: String,
    pub new_name: String,
}

impl EditStyle {
    fn rename(&self, doc: &mut Document, name: &str) {
        match doc.context.styles.get_mut(&self.style_id) {
            Some(style) => style.name = name.to_string(),
            None => missing(CommandKind::EditStyle, &self.style_id),
        }
    }
}

impl CommandOp for EditStyle {
    fn apply(self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        self.rename(doc, &self.new_name);
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        self.rename(doc, &self.old_name);
        Ok(Vec::new())
    }
}

/// Set the declarations of a mixin at one breakpoint and pseudo class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStyleDeclarations {
    pub style_id: Id,
    pub breakpoint_id: Id,
    #[serde(default)]
    pub pseudo_class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_style: Option<Declarations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_style: Option<Declarations>,
}

impl SetStyleDeclarations {
    fn install(&self, doc: &mut Document, value: &Option<Declarations>) {
        match doc.context.styles.get_mut(&self.style_id) {
            Some(style) => model::set_rule(
                &mut style.breakpoints,
                &self.breakpoint_id,
                &self.pseudo_class,
                value.clone(),
            ),
            None => missing(CommandKind::SetStyleDeclarations, &self.style_id),
        }
    }
}

impl CommandOp for SetStyleDeclarations {
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
pub struct RemoveStyle {
    pub style_id: Id,
    /// Set by apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

impl CommandOp for RemoveStyle {
    fn apply(mut self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        self.style = doc.context.styles.remove(&self.style_id);
        if self.style.is_none() {
            missing(CommandKind::RemoveStyle, &self.style_id);
        }
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        restore(&mut doc.context.styles, &self.style_id, &self.style);
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeVariable {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetThemeVariable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_variable: Option<ThemeVariable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_variable: Option<ThemeVariable>,
}

fn set_variable(doc: &mut Document, old: &Option<ThemeVariable>, new: &Option<ThemeVariable>) {
    let variables = &mut doc.context.theme.variables;
    if let Some(old) = old {
        variables.remove(&old.name);
    }
    if let Some(new) = new {
        variables.insert(new.name.clone(), new.value.clone());
    }
}

impl CommandOp for SetThemeVariable {
    fn apply(self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        set_variable(doc, &self.old_variable, &self.new_variable);
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        set_variable(doc, &self.new_variable, &self.old_variable);
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetThemeFont {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_font: Option<Font>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_font: Option<Font>,
}

fn set_font(doc: &mut Document, old: &Option<Font>, new: &Option<Font>) {
    let fonts = &mut doc.context.theme.fonts;
    if let Some(old) = old {
        fonts.remove(&old.name);
    }
    if let Some(new) = new {
        fonts.insert(new.name.clone(), new.clone());
    }
}

impl CommandOp for SetThemeFont {
    fn apply(self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        set_font(doc, &self.old_font, &self.new_font);
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        set_font(doc, &self.new_font, &self.old_font);
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakpointProps {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
}

impl BreakpointProps {
    pub fn of(breakpoint: &Breakpoint) -> Self {
        Self {
            name: breakpoint.name.clone(),
            min_width: breakpoint.min_width,
            max_width: breakpoint.max_width,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBreakpoint {
    #[serde(flatten)]
    pub breakpoint: BreakpointProps,
    /// Set by apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
}

impl CommandOp for AddBreakpoint {
    fn apply(mut self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        let id = doc.context.allocate(IdKind::Breakpoint);
        doc.context.breakpoints.insert(
            id.clone(),
            Breakpoint {
                id: id.clone(),
                name: self.breakpoint.name.clone(),
                min_width: self.breakpoint.min_width,
                max_width: self.breakpoint.max_width,
            },
        );
        self.id = Some(id);
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        release(doc, CommandKind::AddBreakpoint, &self.id, |doc| {
            &mut doc.context.breakpoints
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditBreakpoint {
    pub breakpoint_id: Id,
    pub old: BreakpointProps,
    pub new: BreakpointProps,
}

impl EditBreakpoint {
    fn install(&self, doc: &mut Document, props: &BreakpointProps) {
        match doc.context.breakpoints.get_mut(&self.breakpoint_id) {
            Some(breakpoint) => {
                breakpoint.name = props.name.clone();
                breakpoint.min_width = props.min_width;
                breakpoint.max_width = props.max_width;
            }
            None => missing(CommandKind::EditBreakpoint, &self.breakpoint_id),
        }
    }
}

impl CommandOp for EditBreakpoint {
    fn apply(self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        self.install(doc, &self.new);
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        self.install(doc, &self.old);
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveBreakpoint {
    pub breakpoint_id: Id,
    /// Set by apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoint: Option<Breakpoint>,
}

impl CommandOp for RemoveBreakpoint {
    fn apply(mut self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        self.breakpoint = doc.context.breakpoints.remove(&self.breakpoint_id);
        if self.breakpoint.is_none() {
            missing(CommandKind::RemoveBreakpoint, &self.breakpoint_id);
        }
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        restore(&mut doc.context.breakpoints, &self.breakpoint_id, &self.breakpoint);
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorProps {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
    #[serde(default)]
    pub source: String,
}

impl BehaviorProps {
    pub fn of(behavior: &Behavior) -> Self {
        Self {
            name: behavior.name.clone(),
            params: behavior.params.clone(),
            source: behavior.source.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBehavior {
    #[serde(flatten)]
    pub behavior: BehaviorProps,
    /// Set by apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
}

impl CommandOp for AddBehavior {
    fn apply(mut self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        let id = doc.context.allocate(IdKind::Behavior);
        doc.context.behaviors.insert(
            id.clone(),
            Behavior {
                id: id.clone(),
                name: self.behavior.name.clone(),
                params: self.behavior.params.clone(),
                source: self.behavior.source.clone(),
            },
        );
        self.id = Some(id);
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        release(doc, CommandKind::AddBehavior, &self.id, |doc| {
            &mut doc.context.behaviors
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditBehavior {
    pub behavior_id: Id,
    pub old: BehaviorProps,
    pub new: BehaviorProps,
}

impl EditBehavior {
    fn install(&self, doc: &mut Document, props: &BehaviorProps) {
        match doc.context.behaviors.get_mut(&self.behavior_id) {
            Some(behavior) => {
                behavior.name = props.name.clone();
                behavior.params = props.params.clone();
                behavior.source = props.source.clone();
            }
            None => missing(CommandKind::EditBehavior, &self.behavior_id),
        }
    }
}

impl CommandOp for EditBehavior {
    fn apply(self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        self.install(doc, &self.new);
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        self.install(doc, &self.old);
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveBehavior {
    pub behavior_id: Id,
    /// Set by apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<Behavior>,
}

impl CommandOp for RemoveBehavior {
    fn apply(mut self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        self.behavior = doc.context.behaviors.remove(&self.behavior_id);
        if self.behavior.is_none() {
            missing(CommandKind::RemoveBehavior, &self.behavior_id);
        }
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        restore(&mut doc.context.behaviors, &self.behavior_id, &self.behavior);
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTranslation {
    pub lang: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
}

impl CommandOp for SetTranslation {
    fn apply(self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        doc.context
            .set_translation(&self.lang, &self.key, self.new_value.clone());
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        doc.context
            .set_translation(&self.lang, &self.key, self.old_value.clone());
        Ok(Vec::new())
    }
}
