//! What the engine reports back to the host after each update.
//!
//! Outputs carry the property values committed this tick, keyed by target
//! handle and property name, and a separate list of semantic events. Hosts
//! drain both after every `Engine::update()`.

use serde::{Deserialize, Serialize};

use kinema_api_core::Value;

use crate::event::FiredEvent;
use crate::ids::{AnimatableId, TargetId};

/// One property value committed this tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub target: TargetId,
    pub property: String,
    pub value: Value,
}

/// Lifecycle and keyframe signals, in the order they happened.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CoreEvent {
    /// A keyframe event frame was crossed.
    AnimationEvent(FiredEvent),
    /// The animatable reached its end and rewound to `from_frame`.
    AnimationLooped { animatable: AnimatableId },
    AnimationEnded { animatable: AnimatableId },
    AnimatableDisposed { animatable: AnimatableId },
    /// A recoverable problem handled in-place (empty track, dead target, ...).
    Warning { message: String },
}

/// What one `Engine::update` produced. Overwritten by the next update.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    /// Values written to targets, in commit order.
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<CoreEvent>,
}

impl Outputs {
    /// Drop last tick's contents, keeping the allocations.
    pub(crate) fn reset(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    pub(crate) fn record_change(&mut self, target: TargetId, property: String, value: Value) {
        self.changes.push(Change {
            target,
            property,
            value,
        });
    }

    pub(crate) fn record_warning(&mut self, message: String) {
        self.events.push(CoreEvent::Warning { message });
    }

    /// Last committed value for `(target, property)` this tick.
    pub fn change_for(&self, target: TargetId, property: &str) -> Option<&Value> {
        self.changes
            .iter()
            .rev()
            .find(|c| c.target == target && c.property == property)
            .map(|c| &c.value)
    }

    /// Fired keyframe events, in firing order.
    pub fn fired(&self) -> impl Iterator<Item = &FiredEvent> {
        self.events.iter().filter_map(|e| match e {
            CoreEvent::AnimationEvent(fired) => Some(fired),
            _ => None,
        })
    }
}
