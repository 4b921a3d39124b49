use serde::{Deserialize, Serialize};

use crate::error::DocumentError;

/// Identifier of a component, style, behavior or breakpoint.
pub type Id = String;

/// Registry an id is allocated for. Encoded in the middle segment of the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Component,
    Style,
    Behavior,
    Breakpoint,
}

impl IdKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdKind::Component => "component",
            IdKind::Style => "style",
            IdKind::Behavior => "behavior",
            IdKind::Breakpoint => "breakpoint",
        }
    }
}

/// Sequential id allocator for one document namespace.
///
/// Ids look like `{namespace}-{kind}-{n}`. The counter is shared by every
/// kind, so `n` is unique across the whole namespace. Undo of an allocating
/// command hands the ids back with [`IdGenerator::rollback`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdGenerator {
    namespace: String,
    next_id: u64,
}

impl IdGenerator {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::with_next_id(namespace, 1)
    }

    pub fn with_next_id(namespace: impl Into<String>, next_id: u64) -> Self {
        Self {
            namespace: namespace.into(),
            next_id: next_id.max(1),
        }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self, kind: IdKind) -> Id {
        let id = format!("{}-{}-{}", self.namespace, kind.as_str(), self.next_id);
        self.next_id += 1;
        id
    }

    /// Give back the last `count` allocated ids.
    pub fn rollback(&mut self, count: u64) -> Result<(), DocumentError> {
        self.check_rollback(count)?;
        self.next_id -= count;
        Ok(())
    }

    /// Fails if rolling back `count` ids would move the counter below 1.
    pub fn check_rollback(&self, count: u64) -> Result<(), DocumentError> {
        if count >= self.next_id {
            return Err(DocumentError::IdUnderflow {
                next_id: self.next_id,
                count,
            });
        }
        Ok(())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Sequence number of an id allocated in this namespace.
    ///
    /// Returns `None` for ids minted elsewhere (imported content, hand-written
    /// fixtures), which the counter invariant does not cover.
    pub fn sequence_of(&self, id: &str) -> Option<u64> {
        let rest = id.strip_prefix(&self.namespace)?.strip_prefix('-')?;
        let (kind, n) = rest.rsplit_once('-')?;
        if kind.is_empty() || kind.contains('-') {
            return None;
        }
        n.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::new("site");

        let id1 = gen.new_id(IdKind::Component);
        let id2 = gen.new_id(IdKind::Style);
        let id3 = gen.new_id(IdKind::Component);

        assert_eq!(id1, "site-component-1");
        assert_eq!(id2, "site-style-2");
        assert_eq!(id3, "site-component-3");
        assert_eq!(gen.next_id(), 4);
    }

    #[test]
    fn test_rollback_restores_counter() {
        let mut gen = IdGenerator::new("site");
        gen.new_id(IdKind::Component);
        let before = gen.next_id();

        for _ in 0..5 {
            gen.new_id(IdKind::Component);
        }
        gen.rollback(5).unwrap();

        assert_eq!(gen.next_id(), before);
        assert_eq!(gen.new_id(IdKind::Component), "site-component-2");
    }

    #[test]
    fn test_rollback_past_start_fails() {
        let mut gen = IdGenerator::new("site");
        gen.new_id(IdKind::Behavior);

        let err = gen.rollback(2).unwrap_err();
        assert!(matches!(err, DocumentError::IdUnderflow { next_id: 2, count: 2 }));
        assert_eq!(gen.next_id(), 2);
    }

    #[test]
    fn test_sequence_of() {
        let gen = IdGenerator::new("my-site");

        assert_eq!(gen.sequence_of("my-site-component-12"), Some(12));
        assert_eq!(gen.sequence_of("my-site-breakpoint-3"), Some(3));
        assert_eq!(gen.sequence_of("other-component-12"), None);
        assert_eq!(gen.sequence_of("my-site-component-x"), None);
    }
}
