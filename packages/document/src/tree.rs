//! # Component Arena
//!
//! Structural operations over the flat component registry. Components refer
//! to their parent by id and own an ordered list of child ids, so there are
//! no reference cycles and a subtree can be detached, serialized and
//! restored without external bookkeeping.
//!
//! [`ComponentTree`] is the nested form used by removal commands and by the
//! persisted document: each node keeps `parentId` and nests its children
//! inline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::document::Document;
use crate::error::{DocumentError, DocumentResult};
use crate::ids::Id;
use crate::model::Component;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentTree {
    #[serde(flatten)]
    pub component: Component,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ComponentTree>,
}

impl ComponentTree {
    pub fn id(&self) -> &Id {
        &self.component.id
    }

    /// Number of nodes in the tree, including the root.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(ComponentTree::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Ids in pre-order.
    pub fn ids(&self) -> Vec<Id> {
        let mut ids = Vec::with_capacity(self.len());
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids(&self, ids: &mut Vec<Id>) {
        ids.push(self.component.id.clone());
        for child in &self.children {
            child.collect_ids(ids);
        }
    }

    /// Every nested node must name its enclosing node as parent.
    fn check_nesting(&self) -> DocumentResult<()> {
        for child in &self.children {
            if child.component.parent.as_ref() != Some(&self.component.id) {
                return Err(DocumentError::ParentMismatch {
                    child: child.component.id.clone(),
                    claimed: child.component.parent.clone(),
                    actual: Some(self.component.id.clone()),
                });
            }
            child.check_nesting()?;
        }
        Ok(())
    }

    /// The root node alone, without child links.
    fn node(&self) -> Component {
        let mut node = self.component.clone();
        node.children.clear();
        node
    }
}

/// Result of [`Document::detach_subtree`]
#[derive(Debug, Clone, PartialEq)]
pub struct Detached {
    pub tree: ComponentTree,
    pub parent_id: Option<Id>,
    pub index: Option<usize>,
}

/// Result of [`Document::move_component`]
#[derive(Debug, Clone, PartialEq)]
pub struct Moved {
    pub from_parent: Id,
    pub from_index: usize,
    pub to_index: usize,
}

impl Document {
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.context.components.get(id)
    }

    pub fn component_mut(&mut self, id: &str) -> Option<&mut Component> {
        self.context.components.get_mut(id)
    }

    pub fn contains_component(&self, id: &str) -> bool {
        self.context.components.contains_key(id)
    }

    /// Parent id and index within the parent's children.
    pub fn position_of(&self, id: &str) -> Option<(Id, usize)> {
        let parent_id = self.component(id)?.parent.as_ref()?;
        let index = self
            .component(parent_id)?
            .children
            .iter()
            .position(|c| c == id)?;
        Some((parent_id.clone(), index))
    }

    pub fn is_page_root(&self, id: &str) -> bool {
        self.pages.values().any(|p| p.root == id)
    }

    /// True if `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: &str, id: &str) -> bool {
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.context.components.len() {
                break;
            }
            current = self.component(cur).and_then(|c| c.parent.as_deref());
        }
        false
    }

    /// Ids of the subtree rooted at `id`, pre-order. Empty if missing.
    pub fn subtree_ids(&self, id: &str) -> Vec<Id> {
        let mut ids = Vec::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(component) = self.component(&current) {
                stack.extend(component.children.iter().rev().cloned());
                ids.push(current);
            }
        }
        ids
    }

    /// Nested copy of the subtree rooted at `id`.
    pub fn subtree(&self, id: &str) -> Option<ComponentTree> {
        let component = self.component(id)?;
        let children = component
            .children
            .iter()
            .filter_map(|child| self.subtree(child))
            .collect();
        let mut node = component.clone();
        node.children.clear();
        Some(ComponentTree {
            component: node,
            children,
        })
    }

    /// Register `component` and splice it into its parent's children.
    ///
    /// `index` defaults to append and is clamped to the child count. Returns
    /// the index actually used (0 for parentless components).
    pub fn attach(&mut self, component: Component, index: Option<usize>) -> DocumentResult<usize> {
        if self.contains_component(&component.id) {
            return Err(DocumentError::DuplicateId(component.id));
        }
        let at = match &component.parent {
            Some(parent_id) => {
                let parent = self
                    .context
                    .components
                    .get_mut(parent_id)
                    .ok_or_else(|| DocumentError::ParentNotFound(parent_id.clone()))?;
                let at = index.unwrap_or(parent.children.len()).min(parent.children.len());
                parent.children.insert(at, component.id.clone());
                at
            }
            None => 0,
        };
        self.context.components.insert(component.id.clone(), component);
        Ok(at)
    }

    /// Remove the subtree rooted at `id`, children before parents.
    ///
    /// The parent's child list loses the entry and every editor index drops
    /// the removed ids. Returns `None` if `id` is not registered.
    pub fn detach_subtree(&mut self, id: &str) -> Option<Detached> {
        let tree = self.subtree(id)?;
        let position = self.position_of(id);
        let ids = self.subtree_ids(id);

        for removed in ids.iter().rev() {
            self.context.components.remove(removed);
        }

        let parent_id = tree.component.parent.clone();
        if let Some((parent, index)) = &position {
            if let Some(parent) = self.context.components.get_mut(parent) {
                parent.children.remove(*index);
            }
        }
        self.editor.forget(&ids, parent_id.as_ref());

        tracing::trace!(component_id = %id, removed = ids.len(), "detached subtree");
        Some(Detached {
            tree,
            parent_id,
            index: position.map(|(_, index)| index),
        })
    }

    /// Re-insert a detached subtree, parent first, at `index` in its parent.
    ///
    /// Validates everything before the first mutation, so a failure leaves
    /// the document untouched.
    pub fn restore_subtree(&mut self, tree: &ComponentTree, index: Option<usize>) -> DocumentResult<usize> {
        tree.check_nesting()?;
        let mut seen = BTreeSet::new();
        for id in tree.ids() {
            if self.contains_component(&id) || !seen.insert(id.clone()) {
                return Err(DocumentError::DuplicateId(id));
            }
        }
        if let Some(parent) = &tree.component.parent {
            if !self.contains_component(parent) {
                return Err(DocumentError::ParentNotFound(parent.clone()));
            }
        }

        let at = self.attach(tree.node(), index)?;
        for child in &tree.children {
            self.restore_nested(child)?;
        }
        Ok(at)
    }

    fn restore_nested(&mut self, tree: &ComponentTree) -> DocumentResult<()> {
        self.attach(tree.node(), None)?;
        for child in &tree.children {
            self.restore_nested(child)?;
        }
        Ok(())
    }

    /// Splice `id` out of its parent and into `to_parent` at `index`.
    ///
    /// `index` addresses the target's children after the removal, so moving
    /// within one parent is a single splice-out then splice-in. Returns
    /// `None` (and changes nothing) if the component is missing or
    /// parentless, or the target is missing or inside the moved subtree.
    pub fn move_component(&mut self, id: &str, to_parent: &str, index: usize) -> Option<Moved> {
        let (from_parent, from_index) = self.position_of(id)?;
        if !self.contains_component(to_parent) || self.is_ancestor_or_self(id, to_parent) {
            return None;
        }

        self.context.components.get_mut(&from_parent)?.children.remove(from_index);
        let target = self.context.components.get_mut(to_parent)?;
        let to_index = index.min(target.children.len());
        target.children.insert(to_index, id.to_string());
        if let Some(component) = self.context.components.get_mut(id) {
            component.parent = Some(to_parent.to_string());
        }

        Some(Moved {
            from_parent,
            from_index,
            to_index,
        })
    }
}
