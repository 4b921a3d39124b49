use sitecraft_document::Document;

use crate::effects::Effect;
use crate::errors::CommandError;

/// Apply/undo pair for one command payload.
///
/// `apply` consumes the caller's payload and returns it completed with what
/// the inverse needs: allocated ids, removed subtrees, resolved positions.
/// Calling `undo` with that returned payload restores the document content
/// exactly.
pub trait CommandOp: Sized {
    fn apply(self, doc: &mut Document) -> Result<Applied<Self>, CommandError>;

    fn undo(&self, doc: &mut Document) -> Result<Vec<Effect>, CommandError>;
}

/// Completed payload plus the effects to run once the mutation is committed
#[derive(Debug, Clone, PartialEq)]
pub struct Applied<T> {
    pub data: T,
    pub effects: Vec<Effect>,
}

impl<T> Applied<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            effects: Vec::new(),
        }
    }

    pub fn with_effects(data: T, effects: Vec<Effect>) -> Self {
        Self { data, effects }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Applied<U> {
        Applied {
            data: f(self.data),
            effects: self.effects,
        }
    }
}
