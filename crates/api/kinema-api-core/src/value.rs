//! Value: typed samples carried by keyframes and written onto animated properties.
//! All numeric types use f32.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discriminant of [`Value`]. An animation declares one kind and every key,
/// tangent and interpolation result of that animation carries it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Scalar,
    Vector2,
    Vector3,
    Quaternion,
    Matrix,
    Color3,
    Color4,
    Size,
}

impl ValueKind {
    /// Number of f32 components in the flat encoding of this kind.
    #[inline]
    pub fn component_count(self) -> usize {
        match self {
            ValueKind::Scalar => 1,
            ValueKind::Vector2 | ValueKind::Size => 2,
            ValueKind::Vector3 | ValueKind::Color3 => 3,
            ValueKind::Quaternion | ValueKind::Color4 => 4,
            ValueKind::Matrix => 16,
        }
    }

    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Scalar => "scalar",
            ValueKind::Vector2 => "vector2",
            ValueKind::Vector3 => "vector3",
            ValueKind::Quaternion => "quaternion",
            ValueKind::Matrix => "matrix",
            ValueKind::Color3 => "color3",
            ValueKind::Color4 => "color4",
            ValueKind::Size => "size",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    Scalar(f32),

    Vector2([f32; 2]),

    Vector3([f32; 3]),

    /// Quaternion (x, y, z, w)
    Quaternion([f32; 4]),

    /// 4x4 matrix, column-major; translation lives in elements 12..15.
    Matrix([f32; 16]),

    /// RGB color
    Color3([f32; 3]),

    /// RGBA color
    Color4([f32; 4]),

    /// (width, height)
    Size([f32; 2]),
}

/// Errors produced when decoding flat component lists into values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("{kind} expects {expected} components, got {actual}")]
    WrongComponentCount {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl Value {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Scalar(_) => ValueKind::Scalar,
            Value::Vector2(_) => ValueKind::Vector2,
            Value::Vector3(_) => ValueKind::Vector3,
            Value::Quaternion(_) => ValueKind::Quaternion,
            Value::Matrix(_) => ValueKind::Matrix,
            Value::Color3(_) => ValueKind::Color3,
            Value::Color4(_) => ValueKind::Color4,
            Value::Size(_) => ValueKind::Size,
        }
    }

    /// Additive identity for a kind. Quaternions and matrices use their
    /// multiplicative identity since that is the neutral rotation/transform.
    pub fn zero(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Scalar => Value::Scalar(0.0),
            ValueKind::Vector2 => Value::Vector2([0.0; 2]),
            ValueKind::Vector3 => Value::Vector3([0.0; 3]),
            ValueKind::Quaternion => Value::Quaternion([0.0, 0.0, 0.0, 1.0]),
            ValueKind::Matrix => Value::Matrix(crate::math::mat4_identity()),
            ValueKind::Color3 => Value::Color3([0.0; 3]),
            ValueKind::Color4 => Value::Color4([0.0; 4]),
            ValueKind::Size => Value::Size([0.0; 2]),
        }
    }

    /// Flat component view (scalar is a single component).
    pub fn components(&self) -> &[f32] {
        match self {
            Value::Scalar(v) => std::slice::from_ref(v),
            Value::Vector2(a) | Value::Size(a) => &a[..],
            Value::Vector3(a) | Value::Color3(a) => &a[..],
            Value::Quaternion(a) | Value::Color4(a) => &a[..],
            Value::Matrix(m) => &m[..],
        }
    }

    pub fn components_mut(&mut self) -> &mut [f32] {
        match self {
            Value::Scalar(v) => std::slice::from_mut(v),
            Value::Vector2(a) | Value::Size(a) => &mut a[..],
            Value::Vector3(a) | Value::Color3(a) => &mut a[..],
            Value::Quaternion(a) | Value::Color4(a) => &mut a[..],
            Value::Matrix(m) => &mut m[..],
        }
    }

    /// Build a value of `kind` from a flat component list.
    pub fn from_components(kind: ValueKind, data: &[f32]) -> Result<Self, ValueError> {
        let expected = kind.component_count();
        if data.len() != expected {
            return Err(ValueError::WrongComponentCount {
                kind: kind.name(),
                expected,
                actual: data.len(),
            });
        }
        let mut out = Value::zero(kind);
        out.components_mut().copy_from_slice(data);
        Ok(out)
    }

    /// True when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.components().iter().all(|c| c.is_finite())
    }

    /// Convenience constructors
    pub fn scalar(v: f32) -> Self {
        Value::Scalar(v)
    }

    pub fn vec3(x: f32, y: f32, z: f32) -> Self {
        Value::Vector3([x, y, z])
    }

    pub fn quat(x: f32, y: f32, z: f32, w: f32) -> Self {
        Value::Quaternion([x, y, z, w])
    }

    pub fn color3(r: f32, g: f32, b: f32) -> Self {
        Value::Color3([r, g, b])
    }

    /// Returns the scalar payload when this is a scalar.
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Value::Scalar(v) => Some(*v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_follow_kind_arity() {
        let kinds = [
            ValueKind::Scalar,
            ValueKind::Vector2,
            ValueKind::Vector3,
            ValueKind::Quaternion,
            ValueKind::Matrix,
            ValueKind::Color3,
            ValueKind::Color4,
            ValueKind::Size,
        ];
        for kind in kinds {
            let v = Value::zero(kind);
            assert_eq!(v.kind(), kind);
            assert_eq!(v.components().len(), kind.component_count());
        }
    }

    #[test]
    fn from_components_rejects_wrong_arity() {
        let err = Value::from_components(ValueKind::Vector3, &[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            ValueError::WrongComponentCount {
                kind: "vector3",
                expected: 3,
                actual: 2
            }
        );
        let ok = Value::from_components(ValueKind::Size, &[4.0, 2.0]).unwrap();
        assert_eq!(ok, Value::Size([4.0, 2.0]));
    }

    #[test]
    fn tagged_serde_shape() {
        let json = serde_json::to_string(&Value::Scalar(1.5)).unwrap();
        assert_eq!(json, r#"{"type":"Scalar","data":1.5}"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Value::Scalar(1.5));
    }
}
