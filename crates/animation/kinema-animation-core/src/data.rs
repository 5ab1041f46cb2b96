//! Keyframe track data model: keys, loop modes and named ranges.
//! Value/ValueKind are defined in kinema-api-core.

use serde::{Deserialize, Serialize};

use kinema_api_core::Value;

/// Per-key interpolation override.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyInterpolation {
    /// Hermite when both bracketing keys carry tangents, linear otherwise.
    #[default]
    Auto,
    /// Hold this key's value until the next key.
    Step,
}

/// Behavior once playback passes the end of the played range.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopMode {
    /// Loop and accumulate the per-pass delta, so repeats continue from where
    /// the previous pass ended.
    Relative,
    /// Loop and snap back to the start value.
    #[default]
    Cycle,
    /// Hold the end value; never loops.
    Constant,
}

/// A single sample of a track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub frame: f32,
    pub value: Value,
    /// Slope arriving at this key (units per frame).
    #[serde(default)]
    pub in_tangent: Option<Value>,
    /// Slope leaving this key (units per frame).
    #[serde(default)]
    pub out_tangent: Option<Value>,
    #[serde(default)]
    pub interpolation: KeyInterpolation,
}

impl Keyframe {
    pub fn new(frame: f32, value: Value) -> Self {
        Self {
            frame,
            value,
            in_tangent: None,
            out_tangent: None,
            interpolation: KeyInterpolation::Auto,
        }
    }

    /// Hold `value` until the next key.
    pub fn step(frame: f32, value: Value) -> Self {
        Self {
            interpolation: KeyInterpolation::Step,
            ..Self::new(frame, value)
        }
    }

    pub fn with_tangents(mut self, in_tangent: Value, out_tangent: Value) -> Self {
        self.in_tangent = Some(in_tangent);
        self.out_tangent = Some(out_tangent);
        self
    }
}

/// Named `[from, to]` window over a track's frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationRange {
    pub name: String,
    pub from: f32,
    pub to: f32,
}

impl AnimationRange {
    pub fn new(name: impl Into<String>, from: f32, to: f32) -> Self {
        Self {
            name: name.into(),
            from,
            to,
        }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.to - self.from
    }
}

/// Incremental search hint: the index of the last bracketing key.
/// `None` forces a full search on the next evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyCursor {
    pub index: Option<usize>,
}

impl KeyCursor {
    #[inline]
    pub fn invalidate(&mut self) {
        self.index = None;
    }
}
