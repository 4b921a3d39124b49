//! # Document Handle
//!
//! One open document: the document itself, its history, and the two
//! outbound hooks. The host owns one handle per open document and routes
//! every edit through it.
//!
//! Each externally initiated operation runs in three steps:
//! 1. Mutate the document and history
//! 2. Run the returned effects through the [`BehaviorTrigger`]
//! 3. Hand the document to [`Persistence::save`]; failures are logged and
//!    never reach the caller

use tracing::{debug, instrument, warn};

use sitecraft_document::{Document, EditorState};

use crate::commands::Command;
use crate::config::EditorConfig;
use crate::effects::{run_effects, BehaviorTrigger, Effect, NoopTrigger};
use crate::errors::CommandError;
use crate::history::History;

/// Outbound save hook, called after each committed operation.
///
/// `save` runs on the caller's thread and its outcome is only logged.
/// Implementations must not block on storage: take a snapshot and hand it
/// off (queue, channel, worker) before returning.
pub trait Persistence {
    fn save(&mut self, document: &Document) -> anyhow::Result<()>;
}

/// Keeps documents in memory only
#[derive(Debug, Default)]
pub struct NoPersistence;

impl Persistence for NoPersistence {
    fn save(&mut self, _document: &Document) -> anyhow::Result<()> {
        Ok(())
    }
}

pub struct DocumentHandle {
    document: Document,
    history: History,
    config: EditorConfig,
    trigger: Box<dyn BehaviorTrigger>,
    persistence: Box<dyn Persistence>,
}

impl DocumentHandle {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            history: History::new(),
            config: EditorConfig::default(),
            trigger: Box::new(NoopTrigger),
            persistence: Box::new(NoPersistence),
        }
    }

    /// Handle over a blank document in the configured namespace.
    pub fn blank(config: EditorConfig) -> Self {
        Self::new(Document::blank(config.default_namespace.clone())).with_config(config)
    }

    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.config = config.normalized();
        self
    }

    pub fn with_trigger(mut self, trigger: impl BehaviorTrigger + 'static) -> Self {
        self.trigger = Box::new(trigger);
        self
    }

    pub fn with_persistence(mut self, persistence: impl Persistence + 'static) -> Self {
        self.persistence = Box::new(persistence);
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Selection and tree-view state. Not recorded in history.
    pub fn editor_mut(&mut self) -> &mut EditorState {
        &mut self.document.editor
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Apply `command` and record it, clearing redo history.
    pub fn push_command(&mut self, command: Command) -> Result<(), CommandError> {
        self.push_command_with(command, true)
    }

    pub fn push_command_with(&mut self, command: Command, clear_redo: bool) -> Result<(), CommandError> {
        let effects = self.history.push(&mut self.document, command, clear_redo)?;
        self.commit(effects, true);
        Ok(())
    }

    /// Returns false when there was nothing to undo.
    pub fn undo_last_command(&mut self) -> Result<bool, CommandError> {
        match self.history.undo_last(&mut self.document)? {
            Some(effects) => {
                self.commit(effects, true);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns false when there was nothing to redo.
    pub fn redo_command(&mut self) -> Result<bool, CommandError> {
        match self.history.redo(&mut self.document)? {
            Some(effects) => {
                self.commit(effects, true);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn merge_last_command(&mut self, commands: Vec<Command>) -> Result<(), CommandError> {
        let effects = self.history.merge_last(&mut self.document, commands)?;
        self.commit(effects, true);
        Ok(())
    }

    /// Apply `command` over the last history entry. Saves only when `save`
    /// is true, or when it is `None` and the config opts in.
    pub fn replace_last_command(
        &mut self,
        command: Command,
        save: Option<bool>,
    ) -> Result<(), CommandError> {
        let effects = self.history.replace_last(&mut self.document, command)?;
        let save = save.unwrap_or(self.config.save_on_replace);
        self.commit(effects, save);
        Ok(())
    }

    pub fn clear_all_history(&mut self) {
        self.history.clear_all();
        self.save();
    }

    pub fn clear_partial_history(&mut self, fraction: f64) -> usize {
        let evicted = self.history.clear_partial(fraction);
        self.save();
        evicted
    }

    /// Route a wire command: undo and redo go to the history, everything
    /// else is pushed.
    #[instrument(level = "debug", skip_all, fields(kind = %command.kind()))]
    pub fn dispatch(&mut self, command: Command) -> Result<(), CommandError> {
        match command {
            Command::Undo => self.undo_last_command().map(|_| ()),
            Command::Redo => self.redo_command().map(|_| ()),
            other => self.push_command(other),
        }
    }

    fn commit(&mut self, effects: Vec<Effect>, save: bool) {
        self.history
            .enforce_limit(self.config.max_history, self.config.eviction_fraction);
        run_effects(effects, &self.document, self.trigger.as_mut());
        if save {
            self.save();
        } else {
            debug!("Skipping save");
        }
    }

    fn save(&mut self) {
        if let Err(err) = self.persistence.save(&self.document) {
            let error = format!("{err:#}");
            warn!(error = %error, "Failed to save document");
        }
    }
}
