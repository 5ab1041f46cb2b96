//! Kinema Animation Core (engine-agnostic)
//!
//! Keyframe tracks (`Animation`), the stateful per-property evaluator
//! (`RuntimeAnimation`), the playback unit (`Animatable`) and the `Engine`
//! that ticks them, blends simultaneous writers and reports changes and
//! events to the host.

pub mod accumulate;
pub mod animatable;
pub mod animation;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod event;
pub mod ids;
pub mod inputs;
pub mod outputs;
pub mod runtime;
pub mod serialize;
pub mod target;

// Re-exports for consumers (hosts)
pub use accumulate::{Accumulator, PropertyKey};
pub use animatable::{Animatable, AnimatableCallback, AnimatableCfg};
pub use animation::{Animation, DEFAULT_BLENDING_SPEED, MIN_KEY_SPACING};
pub use config::{Config, InterpolationOptions};
pub use data::{AnimationRange, KeyCursor, KeyInterpolation, Keyframe, LoopMode};
pub use engine::Engine;
pub use error::AnimationError;
pub use event::{AnimationEvent, EventAction, FiredEvent};
pub use ids::{AnimatableId, IdAllocator, TargetId};
pub use inputs::{AnimatableCommand, Inputs};
pub use outputs::{Change, CoreEvent, Outputs};
pub use runtime::{Advance, CursorState, RuntimeAnimation, TickContext};
pub use serialize::{SerializedAnimation, SerializedEvent, SerializedKey, SerializedRange};
pub use target::{Target, TargetStore};
pub use kinema_api_core::{Value, ValueKind};

pub type Result<T> = std::result::Result<T, AnimationError>;
