//! Frame-triggered animation events.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::ids::{AnimatableId, TargetId};

/// Payload describing one firing of an [`AnimationEvent`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FiredEvent {
    pub animatable: AnimatableId,
    pub target: TargetId,
    /// Name of the animation that owns the event.
    pub animation: String,
    pub frame: f32,
    #[serde(default)]
    pub name: Option<String>,
}

/// Callback run in-line, during the tick, when an event frame is crossed.
#[derive(Clone)]
pub struct EventAction(Rc<dyn Fn(&FiredEvent)>);

impl EventAction {
    pub fn new(f: impl Fn(&FiredEvent) + 'static) -> Self {
        Self(Rc::new(f))
    }

    #[inline]
    pub fn call(&self, event: &FiredEvent) {
        (self.0)(event)
    }
}

impl fmt::Debug for EventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventAction(..)")
    }
}

#[derive(Clone, Debug)]
pub struct AnimationEvent {
    pub frame: f32,
    /// Retire the event after its first firing.
    pub only_once: bool,
    pub name: Option<String>,
    pub action: Option<EventAction>,
}

impl AnimationEvent {
    pub fn new(frame: f32, only_once: bool) -> Self {
        Self {
            frame,
            only_once,
            name: None,
            action: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_action(mut self, f: impl Fn(&FiredEvent) + 'static) -> Self {
        self.action = Some(EventAction::new(f));
        self
    }
}
