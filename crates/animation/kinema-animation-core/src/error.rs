//! Error types for animation authoring and evaluation.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AnimationError {
    /// Keys or events rejected at authoring time.
    #[error("invalid keyframe data in '{animation}': {reason}")]
    InvalidKeyframeData { animation: String, reason: String },

    /// `evaluate` called on an animation without keys.
    #[error("animation '{animation}' has no keys")]
    EmptyAnimationTrack { animation: String },

    /// Bracketing keys closer together than the minimum key spacing.
    #[error("degenerate key interval in '{animation}' at frame {frame}")]
    DegenerateInterval { animation: String, frame: f32 },

    #[error("invalid range '{name}': [{from}, {to}]")]
    InvalidRange { name: String, from: f32, to: f32 },

    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

impl AnimationError {
    pub(crate) fn invalid_keys(animation: &str, reason: impl Into<String>) -> Self {
        Self::InvalidKeyframeData {
            animation: animation.to_string(),
            reason: reason.into(),
        }
    }

    /// Coarse category for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidKeyframeData { .. } | Self::InvalidRange { .. } => "authoring",
            Self::EmptyAnimationTrack { .. } | Self::DegenerateInterval { .. } => "evaluation",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for AnimationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        let e = AnimationError::invalid_keys("walk", "unsorted");
        assert_eq!(e.category(), "authoring");
        assert_eq!(
            e.to_string(),
            "invalid keyframe data in 'walk': unsorted"
        );
        let empty = AnimationError::EmptyAnimationTrack {
            animation: "idle".into(),
        };
        assert_eq!(empty.category(), "evaluation");
    }

    #[test]
    fn json_errors_convert() {
        let err: AnimationError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, AnimationError::Serialization { .. }));
    }
}
