//! Structural component commands.
//!
//! Add allocates ids and records how many it took so undo can hand them
//! back. Remove embeds the whole detached subtree so undo needs nothing but
//! the payload. Move records resolved positions on both ends; its undo is
//! the same move with the ends swapped.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use sitecraft_document::{
    Component, ComponentStyle, ComponentTree, Document, EventHandlers, Id, IdKind, InputValue,
    ON_SELF_ADDED,
};

use super::{missing, CommandKind};
use crate::command_op::{Applied, CommandOp};
use crate::effects::Effect;
use crate::errors::CommandError;

fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// Attributes of a component about to be created
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComponent {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "ComponentStyle::is_empty")]
    pub style: ComponentStyle,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, InputValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub events: BTreeMap<String, EventHandlers>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub editor_events: BTreeMap<String, EventHandlers>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dynamic: bool,
}

impl NewComponent {
    fn build(&self, id: Id, parent: Option<Id>) -> Component {
        let mut component = Component::new(id, self.tag.clone());
        component.parent = parent;
        component.name = self.name.clone();
        component.content = self.content.clone();
        component.style = self.style.clone();
        component.inputs = self.inputs.clone();
        component.events = self.events.clone();
        component.editor_events = self.editor_events.clone();
        component.dynamic = self.dynamic;
        component
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddComponent {
    /// Parent to insert under; `None` creates a detached template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Id>,

    /// Position among the parent's children; appends when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_index: Option<usize>,

    #[serde(flatten)]
    pub component: NewComponent,

    /// Component whose non-dynamic descendants are cloned under the new one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<Id>,

    /// Set by apply: id of the created component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,

    /// Set by apply: ids allocated, the new component plus every clone.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub allocated: u64,
}

impl AddComponent {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            component: NewComponent {
                tag: tag.into(),
                ..NewComponent::default()
            },
            ..Self::default()
        }
    }

    pub fn under(mut self, parent_id: impl Into<Id>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn at(mut self, index: usize) -> Self {
        self.parent_index = Some(index);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.component.name = name.into();
        self
    }

    pub fn cloning(mut self, source_id: impl Into<Id>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }
}

/// Clone `tree` under `parent`, skipping dynamic nodes and their subtrees.
fn clone_subtree(doc: &mut Document, tree: &ComponentTree, parent: &Id) -> Result<(), CommandError> {
    if tree.component.dynamic {
        debug!(source = %tree.id(), "Skipping dynamic child while cloning");
        return Ok(());
    }
    let id = doc.context.allocate(IdKind::Component);
    let mut node = tree.component.clone();
    node.id = id.clone();
    node.parent = Some(parent.clone());
    node.children.clear();
    doc.attach(node, None)?;
    for child in &tree.children {
        clone_subtree(doc, child, &id)?;
    }
    Ok(())
}

impl CommandOp for AddComponent {
    fn apply(mut self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        if let Some(parent_id) = &self.parent_id {
            if !doc.contains_component(parent_id) {
                return Err(CommandError::ParentNotFound(parent_id.clone()));
            }
        }

        // Snapshot before inserting: the source may be the new parent.
        let source = match &self.source_id {
            Some(source_id) => {
                let tree = doc.subtree(source_id);
                if tree.is_none() {
                    missing(CommandKind::AddComponent, source_id);
                }
                tree
            }
            None => None,
        };

        let start = doc.next_id();
        let id = doc.context.allocate(IdKind::Component);
        let component = self.component.build(id.clone(), self.parent_id.clone());
        let index = match doc.attach(component, self.parent_index) {
            Ok(index) => index,
            Err(err) => {
                doc.context.ids.rollback(1)?;
                return Err(err.into());
            }
        };
        if let Some(source) = &source {
            for child in &source.children {
                clone_subtree(doc, child, &id)?;
            }
        }

        self.allocated = doc.next_id() - start;
        if let Some(parent_id) = &self.parent_id {
            self.parent_index = Some(index);
            doc.editor.set_expanded(parent_id, true);
        }
        doc.editor.select(Some(id.clone()));

        let effects = doc
            .component(&id)
            .and_then(|c| c.editor_events.get(ON_SELF_ADDED))
            .and_then(|handlers| Effect::trigger(&id, ON_SELF_ADDED, handlers))
            .into_iter()
            .collect();

        debug!(component_id = %id, allocated = self.allocated, "Added component");
        self.id = Some(id);
        Ok(Applied::with_effects(self, effects))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        let id = self
            .id
            .as_ref()
            .ok_or(CommandError::NotApplied(CommandKind::AddComponent))?;
        if !doc.contains_component(id) {
            missing(CommandKind::AddComponent, id);
            return Ok(Vec::new());
        }
        doc.context.ids.check_rollback(self.allocated)?;
        doc.detach_subtree(id);
        doc.context.ids.rollback(self.allocated)?;
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveComponent {
    pub component_id: Id,

    /// Set by apply: position the subtree was removed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_index: Option<usize>,

    /// Set by apply: the removed subtree. `None` if nothing was removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<ComponentTree>,
}

impl RemoveComponent {
    pub fn new(component_id: impl Into<Id>) -> Self {
        Self {
            component_id: component_id.into(),
            ..Self::default()
        }
    }
}

impl CommandOp for RemoveComponent {
    fn apply(mut self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        if doc.is_page_root(&self.component_id) {
            return Err(CommandError::PageRoot(self.component_id));
        }
        match doc.detach_subtree(&self.component_id) {
            Some(detached) => {
                debug!(
                    component_id = %self.component_id,
                    removed = detached.tree.len(),
                    "Removed component"
                );
                self.parent_id = detached.parent_id;
                self.parent_index = detached.index;
                self.tree = Some(detached.tree);
            }
            None => {
                missing(CommandKind::RemoveComponent, &self.component_id);
                self.parent_id = None;
                self.parent_index = None;
                self.tree = None;
            }
        }
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        if let Some(tree) = &self.tree {
            doc.restore_subtree(tree, self.parent_index)?;
        }
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub parent_id: Id,
    pub index: usize,
}

impl Position {
    pub fn new(parent_id: impl Into<Id>, index: usize) -> Self {
        Self {
            parent_id: parent_id.into(),
            index,
        }
    }
}

/// Move the component at `from` to `to`.
///
/// `to.index` addresses the target's children after the component has been
/// spliced out. The component is found by `component_id` when given,
/// otherwise by `from`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveComponent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<Id>,
    pub from: Position,
    pub to: Position,
}

impl MoveComponent {
    pub fn new(from: Position, to: Position) -> Self {
        Self {
            component_id: None,
            from,
            to,
        }
    }

    fn swapped(&self) -> Self {
        Self {
            component_id: self.component_id.clone(),
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }
}

impl CommandOp for MoveComponent {
    fn apply(self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        let id = match &self.component_id {
            Some(id) => id.clone(),
            None => {
                let at = doc
                    .component(&self.from.parent_id)
                    .and_then(|parent| parent.children.get(self.from.index));
                match at {
                    Some(id) => id.clone(),
                    None => {
                        missing(CommandKind::MoveComponent, &self.from.parent_id);
                        return Ok(Applied::new(self));
                    }
                }
            }
        };
        if !doc.contains_component(&id) {
            missing(CommandKind::MoveComponent, &id);
            return Ok(Applied::new(self));
        }
        if doc.position_of(&id).is_none() {
            return Err(CommandError::Unparented(id));
        }
        if !doc.contains_component(&self.to.parent_id) {
            return Err(CommandError::ParentNotFound(self.to.parent_id));
        }
        if doc.is_ancestor_or_self(&id, &self.to.parent_id) {
            return Err(CommandError::CycleDetected(id));
        }

        let moved = doc
            .move_component(&id, &self.to.parent_id, self.to.index)
            .ok_or_else(|| CommandError::Unparented(id.clone()))?;
        doc.editor.select(Some(id.clone()));

        Ok(Applied::new(MoveComponent {
            component_id: Some(id),
            from: Position::new(moved.from_parent, moved.from_index),
            to: Position::new(self.to.parent_id, moved.to_index),
        }))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        if self.component_id.is_none() {
            // apply found nothing to move
            return Ok(Vec::new());
        }
        self.swapped().apply(doc).map(|applied| applied.effects)
    }
}

/// Name, tag and leaf content of a component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentProps {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ComponentProps {
    pub fn of(component: &Component) -> Self {
        Self {
            name: component.name.clone(),
            tag: component.tag.clone(),
            content: component.content.clone(),
        }
    }

    fn install(&self, doc: &mut Document, id: &str) {
        match doc.component_mut(id) {
            Some(component) => {
                component.name = self.name.clone();
                component.tag = self.tag.clone();
                component.content = self.content.clone();
            }
            None => missing(CommandKind::EditComponent, id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditComponent {
    pub component_id: Id,
    pub old: ComponentProps,
    pub new: ComponentProps,
}

impl CommandOp for EditComponent {
    fn apply(self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        self.new.install(doc, &self.component_id);
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        self.old.install(doc, &self.component_id);
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitecraft_document::BehaviorCall;

    fn root(doc: &Document) -> Id {
        doc.pages["/"].root.clone()
    }

    fn add(doc: &mut Document, command: AddComponent) -> AddComponent {
        command.apply(doc).unwrap().data
    }

    #[test]
    fn test_add_component_appends_and_selects() {
        let mut doc = Document::blank("site");
        let root = root(&doc);

        let added = add(&mut doc, AddComponent::new("button").under(&root));
        let id = added.id.clone().unwrap();

        assert_eq!(added.allocated, 1);
        assert_eq!(added.parent_index, Some(0));
        assert_eq!(doc.component(&root).unwrap().children, vec![id.clone()]);
        assert_eq!(doc.component(&id).unwrap().parent.as_deref(), Some(root.as_str()));
        assert_eq!(doc.editor.selected.as_deref(), Some(id.as_str()));
        assert!(doc.editor.is_expanded(&root));
    }

    #[test]
    fn test_add_component_unknown_parent_fails_cleanly() {
        let mut doc = Document::blank("site");
        let before = doc.clone();

        let err = AddComponent::new("div").under("missing").apply(&mut doc).unwrap_err();

        assert_eq!(err, CommandError::ParentNotFound("missing".to_string()));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_clone_counts_only_copied_nodes() {
        let mut doc = Document::blank("site");
        let root = root(&doc);
        let card = add(&mut doc, AddComponent::new("div").under(&root)).id.unwrap();
        let title = add(&mut doc, AddComponent::new("h2").under(&card)).id.unwrap();
        add(&mut doc, AddComponent::new("span").under(&title));
        let mut generated = AddComponent::new("li").under(&card);
        generated.component.dynamic = true;
        let generated = add(&mut doc, generated).id.unwrap();
        add(&mut doc, AddComponent::new("em").under(&generated));

        let before = doc.clone();
        let copy = add(&mut doc, AddComponent::new("div").under(&root).cloning(&card));

        // the copy itself, h2 and span; the dynamic li and its child are skipped
        assert_eq!(copy.allocated, 3);
        let copy_id = copy.id.clone().unwrap();
        let children = &doc.component(&copy_id).unwrap().children;
        assert_eq!(children.len(), 1);
        assert_eq!(doc.component(&children[0]).unwrap().tag, "h2");

        copy.undo(&mut doc).unwrap();
        assert!(doc.same_content(&before));
        assert_eq!(doc.next_id(), before.next_id());
    }

    #[test]
    fn test_clone_from_own_parent_terminates() {
        let mut doc = Document::blank("site");
        let root = root(&doc);
        let item = add(&mut doc, AddComponent::new("div").under(&root)).id.unwrap();
        add(&mut doc, AddComponent::new("span").under(&item));

        let copy = add(&mut doc, AddComponent::new("div").under(&item).cloning(&item));

        // span is cloned; the new component itself is not part of the source snapshot
        assert_eq!(copy.allocated, 2);
    }

    #[test]
    fn test_self_added_event_produces_effect() {
        let mut doc = Document::blank("site");
        let root = root(&doc);
        let mut command = AddComponent::new("div").under(&root);
        command.component.editor_events.insert(
            ON_SELF_ADDED.to_string(),
            EventHandlers {
                behaviors: vec![BehaviorCall::new("site-behavior-9")],
            },
        );

        let applied = command.apply(&mut doc).unwrap();

        assert_eq!(applied.effects.len(), 1);
        let Effect::TriggerBehaviors { component_id, event, .. } = &applied.effects[0];
        assert_eq!(Some(component_id), applied.data.id.as_ref());
        assert_eq!(event, ON_SELF_ADDED);
    }

    #[test]
    fn test_remove_page_root_is_refused() {
        let mut doc = Document::blank("site");
        let root = root(&doc);

        let err = RemoveComponent::new(&root).apply(&mut doc).unwrap_err();
        assert_eq!(err, CommandError::PageRoot(root));
    }

    #[test]
    fn test_remove_missing_component_is_noop() {
        let mut doc = Document::blank("site");
        let before = doc.clone();

        let applied = RemoveComponent::new("gone").apply(&mut doc).unwrap();
        assert!(applied.data.tree.is_none());
        applied.data.undo(&mut doc).unwrap();
        assert_eq!(doc, before);
    }

    #[test]
    fn test_move_by_position() {
        let mut doc = Document::blank("site");
        let root = root(&doc);
        let a = add(&mut doc, AddComponent::new("div").under(&root)).id.unwrap();
        let b = add(&mut doc, AddComponent::new("div").under(&root)).id.unwrap();
        let pristine = doc.clone();

        let moved = MoveComponent::new(Position::new(&root, 1), Position::new(&a, 0))
            .apply(&mut doc)
            .unwrap()
            .data;

        assert_eq!(moved.component_id.as_deref(), Some(b.as_str()));
        assert_eq!(doc.component(&a).unwrap().children, vec![b.clone()]);
        assert_eq!(doc.editor.selected.as_deref(), Some(b.as_str()));

        moved.undo(&mut doc).unwrap();
        assert!(doc.same_content(&pristine));
    }

    #[test]
    fn test_move_into_descendant_is_refused() {
        let mut doc = Document::blank("site");
        let root = root(&doc);
        let outer = add(&mut doc, AddComponent::new("div").under(&root)).id.unwrap();
        let inner = add(&mut doc, AddComponent::new("div").under(&outer)).id.unwrap();
        let before = doc.clone();

        let mut command = MoveComponent::new(Position::new(&root, 0), Position::new(&inner, 0));
        command.component_id = Some(outer.clone());

        assert_eq!(command.apply(&mut doc).unwrap_err(), CommandError::CycleDetected(outer));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_edit_component_round_trip() {
        let mut doc = Document::blank("site");
        let root = root(&doc);
        let id = add(&mut doc, AddComponent::new("p").under(&root)).id.unwrap();
        let before = doc.clone();

        let old = ComponentProps::of(doc.component(&id).unwrap());
        let new = ComponentProps {
            name: "Intro".to_string(),
            tag: "h1".to_string(),
            content: Some("Welcome".to_string()),
        };
        let applied = EditComponent {
            component_id: id.clone(),
            old,
            new,
        }
        .apply(&mut doc)
        .unwrap();

        assert_eq!(doc.component(&id).unwrap().tag, "h1");
        applied.data.undo(&mut doc).unwrap();
        assert_eq!(doc, before);
    }
}
