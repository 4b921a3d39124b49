//! # Document Model Types
//!
//! Plain data held by the [`Context`](crate::Context) registries and pages.
//!
//! Every collection uses ordered maps and is omitted from serialized output
//! when empty, so an edit followed by its undo serializes byte-for-byte the
//! same as the pristine document.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::ids::Id;

/// Editor event fired right after the component is inserted.
pub const ON_SELF_ADDED: &str = "onSelfAdded";

/// Event fired when the component becomes visible.
pub const ON_APPEAR: &str = "onAppear";

/// CSS property → value
pub type Declarations = BTreeMap<String, String>;

/// Pseudo class (`""` for none, `"hover"`, ...) → declarations
pub type PseudoRules = BTreeMap<String, Declarations>;

/// Breakpoint id → pseudo class rules
pub type StyleRules = BTreeMap<Id, PseudoRules>;

pub fn get_rule<'a>(rules: &'a StyleRules, breakpoint: &str, pseudo: &str) -> Option<&'a Declarations> {
    rules.get(breakpoint).and_then(|p| p.get(pseudo))
}

/// Install or clear the declarations at `[breakpoint][pseudo]`.
///
/// Emptied levels are removed so no empty map is left behind.
pub fn set_rule(rules: &mut StyleRules, breakpoint: &str, pseudo: &str, value: Option<Declarations>) {
    match value {
        Some(declarations) if !declarations.is_empty() => {
            rules
                .entry(breakpoint.to_string())
                .or_default()
                .insert(pseudo.to_string(), declarations);
        }
        _ => {
            if let Some(pseudos) = rules.get_mut(breakpoint) {
                pseudos.remove(pseudo);
                if pseudos.is_empty() {
                    rules.remove(breakpoint);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStyle {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: StyleRules,

    /// Mixin ids, applied in order. May dangle after a mixin is removed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<Id>,

    /// Selector → rules for descendants matched by the selector
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, StyleRules>,
}

impl ComponentStyle {
    pub fn is_empty(&self) -> bool {
        self.custom.is_empty() && self.mixins.is_empty() && self.overrides.is_empty()
    }

    pub fn rule(&self, selector: Option<&str>, breakpoint: &str, pseudo: &str) -> Option<&Declarations> {
        match selector {
            None => get_rule(&self.custom, breakpoint, pseudo),
            Some(selector) => self
                .overrides
                .get(selector)
                .and_then(|rules| get_rule(rules, breakpoint, pseudo)),
        }
    }

    pub fn set_rule(
        &mut self,
        selector: Option<&str>,
        breakpoint: &str,
        pseudo: &str,
        value: Option<Declarations>,
    ) {
        match selector {
            None => set_rule(&mut self.custom, breakpoint, pseudo, value),
            Some(selector) => {
                let rules = self.overrides.entry(selector.to_string()).or_default();
                set_rule(rules, breakpoint, pseudo, value);
                if rules.is_empty() {
                    self.overrides.remove(selector);
                }
            }
        }
    }
}

/// Typed input value (`{"is": true}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputValue {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub is: Value,
}

impl InputValue {
    pub fn new(is: impl Into<Value>) -> Self {
        Self {
            kind: None,
            is: is.into(),
        }
    }
}

/// One scripted callback attached to an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorCall {
    pub behavior_id: Id,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, Value>,
}

impl BehaviorCall {
    pub fn new(behavior_id: impl Into<Id>) -> Self {
        Self {
            behavior_id: behavior_id.into(),
            args: BTreeMap::new(),
        }
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventHandlers {
    #[serde(default)]
    pub behaviors: Vec<BehaviorCall>,
}

/// Live component, stored flat in [`Context::components`](crate::Context).
///
/// `parent` is a lookup key, not an owner: the parent's `children` list is
/// the owning relation. `children` never serializes; the tree form nests
/// children inline instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: Id,

    #[serde(rename = "parentId", default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Id>,

    #[serde(skip)]
    pub children: Vec<Id>,

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

    /// Events fired only inside the editor (e.g. [`ON_SELF_ADDED`])
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub editor_events: BTreeMap<String, EventHandlers>,

    /// Generated at render time; never copied when cloning a subtree.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dynamic: bool,
}

impl Component {
    pub fn new(id: impl Into<Id>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent: None,
            children: Vec::new(),
            name: String::new(),
            tag: tag.into(),
            content: None,
            style: ComponentStyle::default(),
            inputs: BTreeMap::new(),
            events: BTreeMap::new(),
            editor_events: BTreeMap::new(),
            dynamic: false,
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Reusable style mixin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub breakpoints: StyleRules,
}

/// Externally interpreted scripted callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Behavior {
    pub id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
    #[serde(default)]
    pub source: String,
}

/// Viewport-width threshold scoping style declarations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub name: String,
    pub family: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fonts: BTreeMap<String, Font>,
}

impl Theme {
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.fonts.is_empty()
    }
}

/// Page metadata, everything but the root component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageProps {
    pub name: String,
    pub route: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
}

/// Page keyed by route in [`Document::pages`](crate::Document)
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub name: String,
    pub route: String,
    pub public: bool,
    pub head: Option<String>,
    pub root: Id,
}

impl Page {
    pub fn from_props(props: PageProps, root: Id) -> Self {
        Self {
            name: props.name,
            route: props.route,
            public: props.public,
            head: props.head,
            root,
        }
    }

    pub fn props(&self) -> PageProps {
        PageProps {
            name: self.name.clone(),
            route: self.route.clone(),
            public: self.public,
            head: self.head.clone(),
        }
    }
}
