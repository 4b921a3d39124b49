use std::collections::BTreeMap;

use crate::ids::{Id, IdGenerator, IdKind};
use crate::model::{Behavior, Breakpoint, Component, Style, Theme};

/// Language → key → translated text
pub type Translations = BTreeMap<String, BTreeMap<String, String>>;

/// Namespaced registries for one document.
///
/// `components` is the authoritative flat storage for every component,
/// including page roots and detached templates.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    pub ids: IdGenerator,
    pub components: BTreeMap<Id, Component>,
    pub styles: BTreeMap<Id, Style>,
    pub behaviors: BTreeMap<Id, Behavior>,
    pub theme: Theme,
    pub breakpoints: BTreeMap<Id, Breakpoint>,
    pub translations: Translations,
}

impl Context {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::with_ids(IdGenerator::new(namespace))
    }

    pub fn with_ids(ids: IdGenerator) -> Self {
        Self {
            ids,
            components: BTreeMap::new(),
            styles: BTreeMap::new(),
            behaviors: BTreeMap::new(),
            theme: Theme::default(),
            breakpoints: BTreeMap::new(),
            translations: Translations::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        self.ids.namespace()
    }

    pub fn next_id(&self) -> u64 {
        self.ids.next_id()
    }

    pub fn allocate(&mut self, kind: IdKind) -> Id {
        self.ids.new_id(kind)
    }

    /// Every registry id, for counter validation.
    pub(crate) fn all_ids(&self) -> impl Iterator<Item = &Id> {
        self.components
            .keys()
            .chain(self.styles.keys())
            .chain(self.behaviors.keys())
            .chain(self.breakpoints.keys())
    }

    /// Set or clear one translation, dropping the language when it empties.
    pub fn set_translation(&mut self, lang: &str, key: &str, value: Option<String>) {
        match value {
            Some(value) => {
                self.translations
                    .entry(lang.to_string())
                    .or_default()
                    .insert(key.to_string(), value);
            }
            None => {
                if let Some(entries) = self.translations.get_mut(lang) {
                    entries.remove(key);
                    if entries.is_empty() {
                        self.translations.remove(lang);
                    }
                }
            }
        }
    }
}
