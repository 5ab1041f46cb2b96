//! Flat JSON encoding of values: a bare number for scalars, an array of
//! components for everything else. The kind comes from the surrounding
//! record (an animation's declared data type), not from the payload.

use serde::{Deserialize, Serialize};

use crate::{Value, ValueError, ValueKind};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlatValue {
    Number(f32),
    Components(Vec<f32>),
}

impl FlatValue {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Scalar(v) => FlatValue::Number(*v),
            other => FlatValue::Components(other.components().to_vec()),
        }
    }

    /// Decode into a value of `kind`; the component count must match.
    pub fn to_value(&self, kind: ValueKind) -> Result<Value, ValueError> {
        match self {
            FlatValue::Number(n) => Value::from_components(kind, std::slice::from_ref(n)),
            FlatValue::Components(data) => Value::from_components(kind, data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_is_bare_number() {
        let flat = FlatValue::from_value(&Value::Scalar(2.5));
        assert_eq!(serde_json::to_string(&flat).unwrap(), "2.5");
    }

    #[test]
    fn decode_checks_arity() {
        let flat: FlatValue = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(
            flat.to_value(ValueKind::Vector3).unwrap(),
            Value::Vector3([1.0, 2.0, 3.0])
        );
        assert!(flat.to_value(ValueKind::Quaternion).is_err());
        let single: FlatValue = serde_json::from_str("[4]").unwrap();
        assert_eq!(single.to_value(ValueKind::Scalar).unwrap(), Value::Scalar(4.0));
    }
}
