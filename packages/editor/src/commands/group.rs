use serde::{Deserialize, Serialize};
use tracing::warn;

use sitecraft_document::Document;

use super::{apply_command, undo_command, Command};
use crate::command_op::{Applied, CommandOp};
use crate::effects::Effect;
use crate::errors::CommandError;

/// Several commands applied and undone as one unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub commands: Vec<Command>,
}

/// Apply `commands` in order. If one fails, the ones already applied are
/// undone in reverse and the error is returned.
pub(crate) fn apply_all(
    doc: &mut Document,
    commands: Vec<Command>,
) -> Result<Applied<Vec<Command>>, CommandError> {
    let mut applied = Vec::with_capacity(commands.len());
    let mut effects = Vec::new();

    for command in commands {
        match apply_command(doc, command) {
            Ok(result) => {
                effects.extend(result.effects);
                applied.push(result.data);
            }
            Err(err) => {
                for done in applied.iter().rev() {
                    if let Err(undo_err) = undo_command(doc, done) {
                        warn!(kind = %done.kind(), error = %undo_err, "Failed to unwind grouped command");
                    }
                }
                return Err(err);
            }
        }
    }

    Ok(Applied::with_effects(applied, effects))
}

impl CommandOp for Group {
    fn apply(self, doc: &mut Document) -> Result<Applied<Self>, CommandError> {
        Ok(apply_all(doc, self.commands)?.map(|commands| Group { commands }))
    }

    /// Undo members in reverse. If one fails, the members already undone
    /// are applied again in order so the group stays fully applied.
    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError> {
        let mut effects = Vec::new();
        for (position, command) in self.commands.iter().enumerate().rev() {
            match undo_command(doc, command) {
                Ok(undone) => effects.extend(undone),
                Err(err) => {
                    for done in &self.commands[position + 1..] {
                        if let Err(redo_err) = apply_command(doc, done.clone()) {
                            warn!(kind = %done.kind(), error = %redo_err, "Failed to reapply grouped command");
                        }
                    }
                    return Err(err);
                }
            }
        }
        Ok(effects)
    }
}
