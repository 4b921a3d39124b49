//! # Serialized Document
//!
//! Canonical persisted form: registries plus pages whose root subtree nests
//! children inline. Detached template components (no parent, not a page
//! root) are kept under `context.components`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::context::{Context, Translations};
use crate::document::Document;
use crate::error::{DocumentError, DocumentResult};
use crate::ids::{Id, IdGenerator};
use crate::model::{Behavior, Breakpoint, Page, PageProps, Style, Theme};
use crate::tree::ComponentTree;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedDocument {
    pub context: SerializedContext,
    #[serde(default)]
    pub pages: BTreeMap<String, SerializedPage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedContext {
    #[serde(flatten)]
    pub ids: IdGenerator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentTree>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub styles: BTreeMap<Id, Style>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub behaviors: BTreeMap<Id, Behavior>,
    #[serde(default, skip_serializing_if = "Theme::is_empty")]
    pub theme: Theme,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub breakpoints: BTreeMap<Id, Breakpoint>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: Translations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedPage {
    #[serde(flatten)]
    pub props: PageProps,
    pub root: ComponentTree,
}

impl Document {
    /// Parentless components that are not page roots.
    pub fn templates(&self) -> Vec<Id> {
        self.context
            .components
            .values()
            .filter(|c| c.parent.is_none() && !self.is_page_root(&c.id))
            .map(|c| c.id.clone())
            .collect()
    }

    pub fn to_serialized(&self) -> SerializedDocument {
        let components = self
            .templates()
            .iter()
            .filter_map(|id| self.subtree(id))
            .collect();

        let mut pages = BTreeMap::new();
        for (route, page) in &self.pages {
            match self.subtree(&page.root) {
                Some(root) => {
                    pages.insert(
                        route.clone(),
                        SerializedPage {
                            props: page.props(),
                            root,
                        },
                    );
                }
                None => tracing::warn!(route = %route, root = %page.root, "page root missing, skipping"),
            }
        }

        SerializedDocument {
            context: SerializedContext {
                ids: self.context.ids.clone(),
                components,
                styles: self.context.styles.clone(),
                behaviors: self.context.behaviors.clone(),
                theme: self.context.theme.clone(),
                breakpoints: self.context.breakpoints.clone(),
                translations: self.context.translations.clone(),
            },
            pages,
        }
    }

    /// Rebuild the arena from the nested form and check its invariants.
    pub fn from_serialized(serialized: SerializedDocument) -> DocumentResult<Self> {
        let SerializedDocument { context, pages } = serialized;
        let mut doc = Document::from_context(Context {
            styles: context.styles,
            behaviors: context.behaviors,
            theme: context.theme,
            breakpoints: context.breakpoints,
            translations: context.translations,
            ..Context::with_ids(context.ids)
        });

        for template in &context.components {
            if template.component.parent.is_some() {
                return Err(DocumentError::ParentMismatch {
                    child: template.id().clone(),
                    claimed: template.component.parent.clone(),
                    actual: None,
                });
            }
            doc.restore_subtree(template, None)?;
        }

        for (route, page) in pages {
            if page.props.route != route || page.root.component.parent.is_some() {
                return Err(DocumentError::InvalidPageRoot {
                    route,
                    root: page.root.id().clone(),
                });
            }
            doc.restore_subtree(&page.root, None)?;
            let root = page.root.id().clone();
            doc.pages.insert(route, Page::from_props(page.props, root));
        }

        doc.check_invariants()?;
        Ok(doc)
    }

    pub fn to_json(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_serialized())?)
    }

    pub fn from_json(json: &str) -> DocumentResult<Self> {
        let serialized: SerializedDocument = serde_json::from_str(json)?;
        Self::from_serialized(serialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Component;
    use crate::IdKind;

    #[test]
    fn test_blank_document_serializes_canonically() {
        let doc = Document::blank("site");
        let json = serde_json::to_value(doc.to_serialized()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "context": { "namespace": "site", "nextId": 2 },
                "pages": {
                    "/": {
                        "name": "Home",
                        "route": "/",
                        "public": true,
                        "root": { "id": "site-component-1", "name": "Body", "tag": "body" }
                    }
                }
            })
        );
    }

    #[test]
    fn test_nested_children_round_trip() {
        let mut doc = Document::blank("site");
        let root = doc.pages["/"].root.clone();
        let id = doc.context.allocate(IdKind::Component);
        let mut button = Component::new(id.clone(), "button");
        button.parent = Some(root.clone());
        doc.attach(button, None).unwrap();

        let template_id = doc.context.allocate(IdKind::Component);
        doc.attach(Component::new(template_id.clone(), "header"), None).unwrap();

        let json = doc.to_json().unwrap();
        assert!(json.contains("\"parentId\""));
        let restored = Document::from_json(&json).unwrap();

        assert!(restored.same_content(&doc));
        assert_eq!(restored.templates(), vec![template_id]);
    }

    #[test]
    fn test_rejects_child_with_wrong_parent() {
        let json = r#"{
            "context": { "namespace": "site", "nextId": 3 },
            "pages": {
                "/": {
                    "name": "Home",
                    "route": "/",
                    "root": {
                        "id": "site-component-1",
                        "tag": "body",
                        "children": [
                            { "id": "site-component-2", "parentId": "elsewhere", "tag": "div" }
                        ]
                    }
                }
            }
        }"#;

        let err = Document::from_json(json).unwrap_err();
        assert!(matches!(err, DocumentError::ParentMismatch { .. }));
    }
}
