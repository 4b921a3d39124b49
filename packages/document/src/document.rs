//! # Document
//!
//! The aggregate a command mutates: the [`Context`] registries, the pages
//! keyed by route, and transient [`EditorState`].
//!
//! Editor state is not document content. Structural equality between two
//! documents ([`Document::same_content`]) ignores it.

use std::collections::{BTreeMap, BTreeSet};

use crate::context::Context;
use crate::ids::{Id, IdKind};
use crate::model::{Component, Page, PageProps};

/// Tree-view and selection state owned by the editor UI
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    pub selected: Option<Id>,
    pub expanded: BTreeMap<Id, bool>,
    /// Event names the host renderer has registered listeners for
    pub listeners: BTreeMap<Id, BTreeSet<String>>,
}

impl EditorState {
    pub fn select(&mut self, id: Option<Id>) {
        self.selected = id;
    }

    pub fn set_expanded(&mut self, id: &str, expanded: bool) {
        self.expanded.insert(id.to_string(), expanded);
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.get(id).copied().unwrap_or(false)
    }

    pub fn register_listener(&mut self, id: &str, event: &str) {
        self.listeners
            .entry(id.to_string())
            .or_default()
            .insert(event.to_string());
    }

    pub fn unregister_listener(&mut self, id: &str, event: &str) {
        if let Some(events) = self.listeners.get_mut(id) {
            events.remove(event);
            if events.is_empty() {
                self.listeners.remove(id);
            }
        }
    }

    /// Drop every reference to removed components.
    ///
    /// A removed selection falls back to `fallback` (the removed subtree's
    /// parent, if any).
    pub fn forget(&mut self, removed: &[Id], fallback: Option<&Id>) {
        for id in removed {
            self.expanded.remove(id);
            self.listeners.remove(id);
        }
        if let Some(selected) = &self.selected {
            if removed.contains(selected) {
                self.selected = fallback.cloned();
            }
        }
    }

    pub fn references(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
            || self.expanded.contains_key(id)
            || self.listeners.contains_key(id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub context: Context,
    pub pages: BTreeMap<String, Page>,
    pub editor: EditorState,
}

impl Document {
    /// Empty document with no pages
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::from_context(Context::new(namespace))
    }

    pub fn from_context(context: Context) -> Self {
        Self {
            context,
            pages: BTreeMap::new(),
            editor: EditorState::default(),
        }
    }

    /// Document with a single public `/` page whose root is an empty `body`.
    pub fn blank(namespace: impl Into<String>) -> Self {
        let mut doc = Self::new(namespace);
        let root_id = doc.context.allocate(IdKind::Component);
        let mut root = Component::new(root_id.clone(), "body");
        root.name = "Body".to_string();
        doc.context.components.insert(root_id.clone(), root);
        let props = PageProps {
            name: "Home".to_string(),
            route: "/".to_string(),
            public: true,
            head: None,
        };
        doc.pages.insert("/".to_string(), Page::from_props(props, root_id));
        doc
    }

    pub fn namespace(&self) -> &str {
        self.context.namespace()
    }

    pub fn next_id(&self) -> u64 {
        self.context.next_id()
    }

    pub fn page(&self, route: &str) -> Option<&Page> {
        self.pages.get(route)
    }

    pub fn page_root(&self, route: &str) -> Option<&Component> {
        self.page(route).and_then(|p| self.component(&p.root))
    }

    /// Compare registries and pages, ignoring editor state.
    pub fn same_content(&self, other: &Document) -> bool {
        self.context == other.context && self.pages == other.pages
    }
}
