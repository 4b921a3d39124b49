//! # History
//!
//! Back/forward command stacks over one document.
//!
//! ## Design
//!
//! - `back` holds applied commands, most recent last; each entry is the
//!   completed payload returned by apply, so undo needs nothing else
//! - Undo reverts the top of `back` and moves it to `forward`
//! - Redo re-pushes the top of `forward` without clearing `forward`
//! - Any other push clears `forward`
//! - A group holding a single command is stored as that command
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = History::new();
//! let mut doc = Document::blank("site");
//!
//! history.push(&mut doc, Command::AddComponent(AddComponent::new("div").under(root)), true)?;
//! history.undo_last(&mut doc)?;
//! history.redo(&mut doc)?;
//! ```

use tracing::{debug, warn};

use sitecraft_document::Document;

use crate::commands::{apply_all, apply_command, undo_command, Command};
use crate::effects::Effect;
use crate::errors::CommandError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    /// Applied commands (most recent last)
    back: Vec<Command>,

    /// Undone commands (most recent last)
    forward: Vec<Command>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `command` and record it for undo.
    ///
    /// `clear_redo` is false only when replaying from `forward`.
    pub fn push(
        &mut self,
        doc: &mut Document,
        command: Command,
        clear_redo: bool,
    ) -> Result<Vec<Effect>, CommandError> {
        let command = command.unwrap_group();
        if matches!(&command, Command::Group(group) if group.commands.is_empty()) {
            debug!("Empty group, nothing recorded");
            if clear_redo {
                self.forward.clear();
            }
            return Ok(Vec::new());
        }

        let applied = apply_command(doc, command)?;
        self.back.push(applied.data.unwrap_group());
        if clear_redo {
            self.forward.clear();
        }
        Ok(applied.effects)
    }

    /// Revert the most recent command. Returns `None` when there is nothing
    /// to undo.
    pub fn undo_last(&mut self, doc: &mut Document) -> Result<Option<Vec<Effect>>, CommandError> {
        let Some(command) = self.back.pop() else {
            return Ok(None);
        };
        match undo_command(doc, &command) {
            Ok(effects) => {
                self.forward.push(command);
                Ok(Some(effects))
            }
            Err(err) => {
                self.back.push(command);
                Err(err)
            }
        }
    }

    /// Re-apply the most recently undone command. Returns `None` when there
    /// is nothing to redo.
    pub fn redo(&mut self, doc: &mut Document) -> Result<Option<Vec<Effect>>, CommandError> {
        let Some(command) = self.forward.pop() else {
            return Ok(None);
        };
        match self.push(doc, command.clone(), false) {
            Ok(effects) => Ok(Some(effects)),
            Err(err) => {
                self.forward.push(command);
                Err(err)
            }
        }
    }

    /// Apply `commands` and fold them into the top of `back`, so they undo
    /// together with the previous entry in one step.
    pub fn merge_last(
        &mut self,
        doc: &mut Document,
        commands: Vec<Command>,
    ) -> Result<Vec<Effect>, CommandError> {
        let applied = apply_all(doc, commands)?;

        let mut merged = match self.back.pop() {
            Some(Command::Group(group)) => group.commands,
            Some(previous) => vec![previous],
            None => Vec::new(),
        };
        merged.extend(applied.data);

        if !merged.is_empty() {
            self.back.push(Command::group(merged).unwrap_group());
        }
        self.forward.clear();
        Ok(applied.effects)
    }

    /// Apply `command` and overwrite the top of `back` with it.
    ///
    /// The previous top is dropped without being undone; `command` is
    /// expected to carry that entry's old values.
    pub fn replace_last(
        &mut self,
        doc: &mut Document,
        command: Command,
    ) -> Result<Vec<Effect>, CommandError> {
        let applied = apply_command(doc, command.unwrap_group())?;
        let command = applied.data.unwrap_group();
        match self.back.last_mut() {
            Some(top) => *top = command,
            None => self.back.push(command),
        }
        Ok(applied.effects)
    }

    pub fn clear_all(&mut self) {
        self.back.clear();
        self.forward.clear();
    }

    /// Drop the oldest `floor(len * fraction)` entries of `back`.
    ///
    /// `fraction` is clamped to `0..=1`. Returns the number dropped.
    pub fn clear_partial(&mut self, fraction: f64) -> usize {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let count = ((self.back.len() as f64) * fraction).floor() as usize;
        let count = count.min(self.back.len());
        self.back.drain(..count);
        if count > 0 {
            debug!(evicted = count, remaining = self.back.len(), "Evicted history");
        }
        count
    }

    /// Evict with `fraction` while `back` is longer than `max` (0 = no limit).
    pub fn enforce_limit(&mut self, max: usize, fraction: f64) {
        if max == 0 || self.back.len() <= max {
            return;
        }
        let evicted = self.clear_partial(fraction);
        if self.back.len() > max {
            // The fraction was too small to get under the limit.
            let excess = self.back.len() - max;
            self.back.drain(..excess);
            warn!(evicted = evicted + excess, max, "History limit forced extra eviction");
        }
    }

    pub fn back(&self) -> &[Command] {
        &self.back
    }

    pub fn forward(&self) -> &[Command] {
        &self.forward
    }

    pub fn last(&self) -> Option<&Command> {
        self.back.last()
    }

    pub fn can_undo(&self) -> bool {
        !self.back.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.forward.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.back.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.forward.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{AddComponent, EditStyle, SetTranslation};

    fn translate(key: &str, value: &str) -> Command {
        Command::SetTranslation(SetTranslation {
            lang: "en".to_string(),
            key: key.to_string(),
            old_value: None,
            new_value: Some(value.to_string()),
        })
    }

    fn add_div(doc: &Document) -> Command {
        let root = doc.pages["/"].root.clone();
        Command::AddComponent(AddComponent::new("div").under(root))
    }

    #[test]
    fn test_history_creation() {
        let history = History::new();
        assert_eq!(history.undo_levels(), 0);
        assert_eq!(history.redo_levels(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_undo_redo() {
        let mut doc = Document::blank("site");
        let mut history = History::new();

        let command = add_div(&doc);
        history.push(&mut doc, command, true).unwrap();
        assert_eq!(history.undo_levels(), 1);
        let added = history.last().unwrap().created_id().unwrap().to_string();
        assert_eq!(added, "site-component-2");

        assert!(history.undo_last(&mut doc).unwrap().is_some());
        assert!(!doc.contains_component(&added));
        assert_eq!(doc.next_id(), 2);
        assert_eq!(history.redo_levels(), 1);

        assert!(history.redo(&mut doc).unwrap().is_some());
        assert!(doc.contains_component(&added));
        assert_eq!(history.undo_levels(), 1);
        assert_eq!(history.redo_levels(), 0);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut doc = Document::blank("site");
        let before = doc.clone();
        let mut history = History::new();

        assert_eq!(history.undo_last(&mut doc).unwrap(), None);
        assert_eq!(history.redo(&mut doc).unwrap(), None);
        assert_eq!(doc, before);
    }

    #[test]
    fn test_new_push_clears_redo() {
        let mut doc = Document::blank("site");
        let mut history = History::new();

        history.push(&mut doc, translate("a", "A"), true).unwrap();
        history.push(&mut doc, translate("b", "B"), true).unwrap();
        history.undo_last(&mut doc).unwrap();
        assert_eq!(history.redo_levels(), 1);

        history.push(&mut doc, translate("c", "C"), true).unwrap();
        assert_eq!(history.redo_levels(), 0);
        assert_eq!(history.redo(&mut doc).unwrap(), None);
        assert!(!doc.context.translations["en"].contains_key("b"));
    }

    #[test]
    fn test_single_command_group_is_unwrapped() {
        let mut doc = Document::blank("site");
        let mut history = History::new();

        let command = translate("title", "Hello");
        history
            .push(&mut doc, Command::group(vec![command.clone()]), true)
            .unwrap();
        assert_eq!(history.last(), Some(&command));
    }

    #[test]
    fn test_empty_group_push_still_clears_redo() {
        let mut doc = Document::blank("site");
        let mut history = History::new();

        history.push(&mut doc, translate("a", "A"), true).unwrap();
        history.undo_last(&mut doc).unwrap();
        assert_eq!(history.redo_levels(), 1);

        let effects = history.push(&mut doc, Command::group(vec![]), true).unwrap();
        assert!(effects.is_empty());
        assert_eq!(history.undo_levels(), 0);
        assert_eq!(history.redo_levels(), 0);
    }

    #[test]
    fn test_failed_undo_keeps_entry() {
        let mut doc = Document::blank("site");
        let mut history = History::new();
        let command = add_div(&doc);
        history.push(&mut doc, command, true).unwrap();

        // Counter already back at the start: rolling back again would underflow.
        doc.context.ids = sitecraft_document::IdGenerator::with_next_id("site", 0);
        assert!(history.undo_last(&mut doc).is_err());
        assert_eq!(history.undo_levels(), 1);
        assert_eq!(history.redo_levels(), 0);
    }

    #[test]
    fn test_merge_last_folds_into_previous() {
        let mut doc = Document::blank("site");
        let mut history = History::new();

        history.push(&mut doc, translate("a", "A"), true).unwrap();
        history
            .merge_last(&mut doc, vec![translate("b", "B"), translate("c", "C")])
            .unwrap();
        assert_eq!(history.undo_levels(), 1);
        let Some(Command::Group(group)) = history.last() else {
            panic!("Expected a group on top");
        };
        assert_eq!(group.commands.len(), 3);

        // Merging into an existing group appends instead of nesting.
        history.merge_last(&mut doc, vec![translate("d", "D")]).unwrap();
        let Some(Command::Group(group)) = history.last() else {
            panic!("Expected a group on top");
        };
        assert_eq!(group.commands.len(), 4);

        history.undo_last(&mut doc).unwrap();
        assert!(doc.context.translations.is_empty());
    }

    #[test]
    fn test_merge_into_empty_history_unwraps() {
        let mut doc = Document::blank("site");
        let mut history = History::new();

        let command = translate("a", "A");
        history.merge_last(&mut doc, vec![command.clone()]).unwrap();
        assert_eq!(history.back(), &[command]);
    }

    #[test]
    fn test_replace_last_overwrites_top() {
        let mut doc = Document::blank("site");
        doc.context.styles.insert(
            "site-style-9".to_string(),
            sitecraft_document::Style {
                id: "site-style-9".to_string(),
                name: "A".to_string(),
                breakpoints: Default::default(),
            },
        );
        let mut history = History::new();

        let rename = |new: &str| {
            Command::EditStyle(EditStyle {
                style_id: "site-style-9".to_string(),
                old_name: "A".to_string(),
                new_name: new.to_string(),
            })
        };
        history.push(&mut doc, rename("B"), true).unwrap();
        history.replace_last(&mut doc, rename("C")).unwrap();

        assert_eq!(history.undo_levels(), 1);
        assert_eq!(doc.context.styles["site-style-9"].name, "C");

        history.undo_last(&mut doc).unwrap();
        assert_eq!(doc.context.styles["site-style-9"].name, "A");
    }

    #[test]
    fn test_clear_partial_drops_oldest() {
        let mut doc = Document::blank("site");
        let mut history = History::new();
        for key in ["a", "b", "c", "d", "e"] {
            history.push(&mut doc, translate(key, key), true).unwrap();
        }

        assert_eq!(history.clear_partial(0.5), 2);
        assert_eq!(history.back()[0], translate("c", "c"));
        assert_eq!(history.last(), Some(&translate("e", "e")));

        assert_eq!(history.clear_partial(-1.0), 0);
        assert_eq!(history.clear_partial(7.0), 3);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_enforce_limit() {
        let mut doc = Document::blank("site");
        let mut history = History::new();
        for key in ["a", "b", "c", "d"] {
            history.push(&mut doc, translate(key, key), true).unwrap();
        }

        history.enforce_limit(3, 0.0);
        assert_eq!(history.undo_levels(), 3);
        history.enforce_limit(0, 1.0);
        assert_eq!(history.undo_levels(), 3);
    }
}
