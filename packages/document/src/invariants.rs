use crate::document::Document;
use crate::error::{DocumentError, DocumentResult};

impl Document {
    /// Verify the arena's structural invariants.
    ///
    /// - registry keys match the ids they hold
    /// - every parent lists its child exactly once, and every listed child
    ///   exists and points back
    /// - no component is its own ancestor
    /// - page roots exist and have no parent
    /// - the id counter is above every id allocated in this namespace
    pub fn check_invariants(&self) -> DocumentResult<()> {
        let components = &self.context.components;

        for (key, component) in components {
            if key != &component.id {
                return Err(DocumentError::KeyMismatch {
                    key: key.clone(),
                    id: component.id.clone(),
                });
            }

            if let Some(parent_id) = &component.parent {
                let parent = components
                    .get(parent_id)
                    .ok_or_else(|| DocumentError::ParentNotFound(parent_id.clone()))?;
                let listed = parent.children.iter().filter(|c| *c == key).count();
                if listed != 1 {
                    return Err(DocumentError::Orphaned(key.clone()));
                }
                if self.is_ancestor_or_self(key, parent_id) {
                    return Err(DocumentError::Cycle(key.clone()));
                }
            }

            for child_id in &component.children {
                let child = components.get(child_id).ok_or_else(|| DocumentError::DanglingChild {
                    parent: key.clone(),
                    child: child_id.clone(),
                })?;
                if child.parent.as_ref() != Some(key) {
                    return Err(DocumentError::ParentMismatch {
                        child: child_id.clone(),
                        claimed: child.parent.clone(),
                        actual: Some(key.clone()),
                    });
                }
            }
        }

        for (route, page) in &self.pages {
            let valid = &page.route == route
                && components.get(&page.root).is_some_and(|root| root.parent.is_none());
            if !valid {
                return Err(DocumentError::InvalidPageRoot {
                    route: route.clone(),
                    root: page.root.clone(),
                });
            }
        }

        let ids = &self.context.ids;
        for id in self.context.all_ids() {
            if let Some(n) = ids.sequence_of(id) {
                if n >= ids.next_id() {
                    return Err(DocumentError::StaleIdCounter {
                        next_id: ids.next_id(),
                        id: id.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
