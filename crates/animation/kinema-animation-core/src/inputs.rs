//! Input contracts for the core engine.
//!
//! Event consumers cannot reach the engine while it is ticking; they queue
//! commands here instead and the engine applies them before the next step.

use serde::{Deserialize, Serialize};

use crate::ids::{AnimatableId, TargetId};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Inputs {
    /// Animatable-level commands applied before stepping, in order.
    #[serde(default)]
    pub commands: Vec<AnimatableCommand>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_command(mut self, cmd: AnimatableCommand) -> Self {
        self.commands.push(cmd);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AnimatableCommand {
    Pause {
        animatable: AnimatableId,
    },
    Resume {
        animatable: AnimatableId,
    },
    Restart {
        animatable: AnimatableId,
    },
    Reset {
        animatable: AnimatableId,
        restore_original: bool,
    },
    GoToFrame {
        animatable: AnimatableId,
        frame: f32,
    },
    SetSpeedRatio {
        animatable: AnimatableId,
        speed: f32,
    },
    SetWeight {
        animatable: AnimatableId,
        weight: f32,
    },
    /// Stop runtime animations matching `animation` (all when `None`) and,
    /// when given, only those driving `target`.
    Stop {
        animatable: AnimatableId,
        #[serde(default)]
        animation: Option<String>,
        #[serde(default)]
        target: Option<TargetId>,
    },
    SyncWith {
        animatable: AnimatableId,
        root: Option<AnimatableId>,
    },
    Dispose {
        animatable: AnimatableId,
    },
}
