//! kinema-api-core: typed animation values and the math/blending primitives
//! the animation core calls (engine-agnostic).

pub mod blend;
pub mod json;
pub mod math;
pub mod value;

pub use json::FlatValue;
pub use value::{Value, ValueError, ValueKind};
