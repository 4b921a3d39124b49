//! Page commands. Pages are keyed by route, so renaming a route re-keys the
//! page and two pages can never share one.

use serde::{Deserialize, Serialize};

use sitecraft_document::{
    Component, Document, DocumentError, Id, IdKind, Page, PageProps, SerializedPage,
};

use super::{missing, CommandKind};
use crate::command_op::{Applied, CommandOp};
use crate::effects::Effect;
use crate::errors::CommandError;

fn default_root_tag() -> String {
    "body".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPage {
    #[serde(flatten)]
    pub props: PageProps,
    #[serde(default = "default_root_tag")]
    pub root_tag: String,
    /// Set by apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_id: Option<Id>,
}

impl AddPage {
    pub fn new(name: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            props: PageProps {
                name: name.into(),
                route: route.into(),
                public: false,
                head: None,
            },
            root_tag: default_root_tag(),
            root_id: None,
        }
    }
}

impl CommandOp for AddPage {
    fn apply(mut self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        if doc.pages.contains_key(&self.props.route) {
            return Err(CommandError::RouteTaken(self.props.route));
        }
        let root_id = doc.context.allocate(IdKind::Component);
        let mut root = Component::new(root_id.clone(), self.root_tag.clone());
        root.name = "Body".to_string();
        if let Err(err) = doc.attach(root, None) {
            doc.context.ids.rollback(1)?;
            return Err(err.into());
        }
        doc.pages.insert(
            self.props.route.clone(),
            Page::from_props(self.props.clone(), root_id.clone()),
        );
        tracing::debug!(route = %self.props.route, root_id = %root_id, "Added page");
        self.root_id = Some(root_id);
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        let root_id = self
            .root_id
            .as_ref()
            .ok_or(CommandError::NotApplied(CommandKind::AddPage))?;
        doc.context.ids.check_rollback(1)?;
        if doc.pages.remove(&self.props.route).is_none() {
            missing(CommandKind::AddPage, &self.props.route);
            return Ok(Vec::new());
        }
        doc.detach_subtree(root_id);
        doc.context.ids.rollback(1)?;
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditPage {
    pub old: PageProps,
    pub new: PageProps,
}

fn rekey(doc: &mut Document, from: &PageProps, to: &PageProps) -> Result<(), CommandError> {
    if from.route != to.route && doc.pages.contains_key(&to.route) {
        return Err(CommandError::RouteTaken(to.route.clone()));
    }
    match doc.pages.remove(&from.route) {
        Some(page) => {
            doc.pages
                .insert(to.route.clone(), Page::from_props(to.clone(), page.root));
        }
        None => missing(CommandKind::EditPage, &from.route),
    }
    Ok(())
}

impl CommandOp for EditPage {
    fn apply(self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        rekey(doc, &self.old, &self.new)?;
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        rekey(doc, &self.new, &self.old)?;
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovePage {
    pub route: String,
    /// Set by apply: the page and its whole component tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<SerializedPage>,
}

impl RemovePage {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            page: None,
        }
    }
}

impl CommandOp for RemovePage {
    fn apply(mut self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        let Some(page) = doc.pages.get(&self.route) else {
            missing(CommandKind::RemovePage, &self.route);
            return Ok(Applied::new(self));
        };
        if doc.pages.len() == 1 {
            return Err(CommandError::LastPage);
        }
        if !doc.contains_component(&page.root) {
            return Err(DocumentError::InvalidPageRoot {
                route: self.route.clone(),
                root: page.root.clone(),
            }
            .into());
        }

        let root = page.root.clone();
        let props = page.props();
        let detached = doc
            .detach_subtree(&root)
            .ok_or_else(|| CommandError::Document(DocumentError::Orphaned(root.clone())))?;
        doc.pages.remove(&self.route);

        self.page = Some(SerializedPage {
            props,
            root: detached.tree,
        });
        Ok(Applied::new(self))
    }

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        let Some(page) = &self.page else {
            return Ok(Vec::new());
        };
        if doc.pages.contains_key(&self.route) {
            return Err(CommandError::RouteTaken(self.route.clone()));
        }
        doc.restore_subtree(&page.root, None)?;
        doc.pages.insert(
            self.route.clone(),
            Page::from_props(page.props.clone(), page.root.id().clone()),
        );
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::AddComponent;

    #[test]
    fn test_add_page_and_undo() {
        let mut doc = Document::blank("site");
        let before = doc.clone();

        let added = AddPage::new("About", "/about").apply(&mut doc).unwrap().data;
        assert_eq!(added.root_id.as_deref(), Some("site-component-2"));
        assert_eq!(doc.page_root("/about").unwrap().tag, "body");

        added.undo(&mut doc).unwrap();
        assert_eq!(doc, before);
    }

    #[test]
    fn test_add_page_rejects_taken_route() {
        let mut doc = Document::blank("site");
        let before = doc.clone();
        let err = AddPage::new("Home again", "/").apply(&mut doc).unwrap_err();
        assert_eq!(err, CommandError::RouteTaken("/".to_string()));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_edit_page_rekeys_route() {
        let mut doc = Document::blank("site");
        AddPage::new("About", "/about").apply(&mut doc).unwrap();
        let old = doc.pages["/about"].props();
        let new = PageProps {
            route: "/team".to_string(),
            public: true,
            ..old.clone()
        };

        let applied = EditPage { old, new }.apply(&mut doc).unwrap();
        assert!(!doc.pages.contains_key("/about"));
        assert!(doc.pages["/team"].public);

        applied.data.undo(&mut doc).unwrap();
        assert!(doc.pages.contains_key("/about"));
        assert!(!doc.pages.contains_key("/team"));
    }

    #[test]
    fn test_edit_page_onto_existing_route_fails() {
        let mut doc = Document::blank("site");
        AddPage::new("About", "/about").apply(&mut doc).unwrap();
        let old = doc.pages["/about"].props();
        let new = PageProps {
            route: "/".to_string(),
            ..old.clone()
        };
        let err = EditPage { old, new }.apply(&mut doc).unwrap_err();
        assert_eq!(err, CommandError::RouteTaken("/".to_string()));
    }

    #[test]
    fn test_last_page_cannot_be_removed() {
        let mut doc = Document::blank("site");
        let err = RemovePage::new("/").apply(&mut doc).unwrap_err();
        assert_eq!(err, CommandError::LastPage);
        assert_eq!(doc.pages.len(), 1);
    }

    #[test]
    fn test_remove_page_takes_its_tree() {
        let mut doc = Document::blank("site");
        let root = AddPage::new("About", "/about")
            .apply(&mut doc)
            .unwrap()
            .data
            .root_id
            .unwrap();
        AddComponent::new("h1").under(root.clone()).apply(&mut doc).unwrap();
        let before = doc.clone();

        let removed = RemovePage::new("/about").apply(&mut doc).unwrap().data;
        assert!(!doc.contains_component(&root));
        assert_eq!(removed.page.as_ref().unwrap().root.len(), 2);

        removed.undo(&mut doc).unwrap();
        assert!(doc.same_content(&before));
    }

    #[test]
    fn test_remove_missing_page_is_noop() {
        let mut doc = Document::blank("site");
        let before = doc.clone();
        let removed = RemovePage::new("/nowhere").apply(&mut doc).unwrap().data;
        assert!(removed.page.is_none());
        assert_eq!(doc, before);
    }
}
