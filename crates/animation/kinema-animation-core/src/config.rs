//! Core configuration for kinema-animation-core.
//!
//! Everything the driver used to read from process-wide flags lives here and
//! is passed explicitly into the engine; interpolation options are threaded
//! down into every `evaluate()` call.

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;

/// Options that change how values are interpolated and blended.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationOptions {
    /// Decompose matrices into scale/rotation/translation before blending.
    /// When false, matrices are lerped component-wise.
    pub precise_matrix_interpolation: bool,
}

impl Default for InterpolationOptions {
    fn default() -> Self {
        Self {
            precise_matrix_interpolation: true,
        }
    }
}

/// Configuration for the driver clock, lockstep stepping and blending.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Global multiplier applied to every elapsed delta.
    pub time_scale: f32,

    /// Ignore the supplied delta and use `constant_delta_ms` (reproducible tests).
    pub use_constant_delta: bool,
    pub constant_delta_ms: f32,

    /// Split each rendered frame into fixed sub-steps.
    pub deterministic_lockstep: bool,
    pub lockstep_step_ms: f32,
    /// Upper bound on sub-steps per frame; surplus time is dropped.
    pub lockstep_max_steps: u32,

    pub interpolation: InterpolationOptions,

    /// Blending speed used by `enable_blending` when none is supplied.
    pub default_blending_speed: f32,

    /// Maximum events to retain per tick before backpressure policy applies.
    pub max_events_per_tick: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            use_constant_delta: false,
            constant_delta_ms: 1000.0 / 60.0,
            deterministic_lockstep: false,
            lockstep_step_ms: 1000.0 / 60.0,
            lockstep_max_steps: 4,
            interpolation: InterpolationOptions::default(),
            default_blending_speed: 0.01,
            max_events_per_tick: 1024,
        }
    }
}

impl Config {
    /// Parse a (possibly partial) JSON config; missing fields take defaults.
    pub fn from_json(s: &str) -> Result<Self, AnimationError> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = Config::from_json(r#"{ "time_scale": 2.0, "interpolation": {} }"#).unwrap();
        assert_eq!(cfg.time_scale, 2.0);
        assert!(cfg.interpolation.precise_matrix_interpolation);
        assert_eq!(cfg.lockstep_max_steps, 4);
    }
}
