//! # Post-Commit Effects
//!
//! Apply and undo never call out to the behavior interpreter themselves.
//! They return [`Effect`]s, the caller commits the mutation, then runs the
//! effects through a [`BehaviorTrigger`] before control returns to the UI.
//!
//! Effects currently fire for:
//! - a component added with an `onSelfAdded` editor event
//! - an `onAppear` event installed by apply, or reinstated by undo

use sitecraft_document::{BehaviorCall, Document, EventHandlers, Id};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    TriggerBehaviors {
        component_id: Id,
        event: String,
        behaviors: Vec<BehaviorCall>,
    },
}

impl Effect {
    /// Trigger for `handlers`, or `None` when nothing is attached.
    pub fn trigger(component_id: &str, event: &str, handlers: &EventHandlers) -> Option<Self> {
        if handlers.behaviors.is_empty() {
            return None;
        }
        Some(Effect::TriggerBehaviors {
            component_id: component_id.to_string(),
            event: event.to_string(),
            behaviors: handlers.behaviors.clone(),
        })
    }
}

/// Outbound hook to the scripted behavior interpreter.
///
/// The engine ignores whatever the interpreter does with the call.
pub trait BehaviorTrigger {
    fn trigger(
        &mut self,
        behaviors: &[BehaviorCall],
        document: &Document,
        component_id: &str,
        event: Option<&str>,
    );
}

/// Interpreter stand-in that drops every trigger
#[derive(Debug, Default)]
pub struct NoopTrigger;

impl BehaviorTrigger for NoopTrigger {
    fn trigger(&mut self, _: &[BehaviorCall], _: &Document, _: &str, _: Option<&str>) {}
}

/// Run committed effects in order.
pub fn run_effects(effects: Vec<Effect>, document: &Document, trigger: &mut dyn BehaviorTrigger) {
    for effect in effects {
        match effect {
            Effect::TriggerBehaviors {
                component_id,
                event,
                behaviors,
            } => {
                tracing::debug!(
                    component_id = %component_id,
                    event = %event,
                    count = behaviors.len(),
                    "Triggering behaviors"
                );
                trigger.trigger(&behaviors, document, &component_id, Some(&event));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(String, Option<String>, usize)>,
    }

    impl BehaviorTrigger for Recorder {
        fn trigger(&mut self, behaviors: &[BehaviorCall], _: &Document, id: &str, event: Option<&str>) {
            self.calls
                .push((id.to_string(), event.map(str::to_string), behaviors.len()));
        }
    }

    #[test]
    fn test_trigger_skips_empty_handlers() {
        assert!(Effect::trigger("c-1", "onAppear", &EventHandlers::default()).is_none());
    }

    #[test]
    fn test_run_effects_in_order() {
        let doc = Document::blank("site");
        let handlers = EventHandlers {
            behaviors: vec![BehaviorCall::new("site-behavior-1")],
        };
        let effects = vec![
            Effect::trigger("a", "onAppear", &handlers).unwrap(),
            Effect::trigger("b", "onSelfAdded", &handlers).unwrap(),
        ];

        let mut recorder = Recorder::default();
        run_effects(effects, &doc, &mut recorder);

        assert_eq!(
            recorder.calls,
            vec![
                ("a".to_string(), Some("onAppear".to_string()), 1),
                ("b".to_string(), Some("onSelfAdded".to_string()), 1),
            ]
        );
    }
}
