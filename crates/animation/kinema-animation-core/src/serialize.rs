//! Plain structured record for persisting animations.
//!
//! JSON shape (camelCase):
//! `{ name, property, dataType, loopMode, framesPerSecond, enableBlending?, blendingSpeed?,
//!    keys: [{ frame, value, inTangent?, outTangent?, interpolation? }],
//!    ranges: [{ name, from, to }], events: [{ frame, onlyOnce?, name? }] }`
//!
//! Values are flat: a number for scalars, a component array otherwise; the
//! record's `dataType` says how to read them. Event actions are code and are
//! not persisted.

use serde::{Deserialize, Serialize};

use kinema_api_core::{FlatValue, Value, ValueKind};

use crate::animation::{Animation, DEFAULT_BLENDING_SPEED};
use crate::data::{KeyInterpolation, Keyframe, LoopMode};
use crate::error::AnimationError;
use crate::event::AnimationEvent;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedAnimation {
    pub name: String,
    pub property: String,
    pub data_type: ValueKind,
    #[serde(default)]
    pub loop_mode: LoopMode,
    pub frames_per_second: f32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub enable_blending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blending_speed: Option<f32>,
    pub keys: Vec<SerializedKey>,
    #[serde(default)]
    pub ranges: Vec<SerializedRange>,
    #[serde(default)]
    pub events: Vec<SerializedEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedKey {
    pub frame: f32,
    pub value: FlatValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_tangent: Option<FlatValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_tangent: Option<FlatValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpolation: Option<KeyInterpolation>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedRange {
    pub name: String,
    pub from: f32,
    pub to: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedEvent {
    pub frame: f32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub only_once: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn decode(
    anim: &str,
    what: &str,
    frame: f32,
    flat: &FlatValue,
    kind: ValueKind,
) -> Result<Value, AnimationError> {
    flat.to_value(kind)
        .map_err(|e| AnimationError::invalid_keys(anim, format!("{what} at frame {frame}: {e}")))
}

impl Animation {
    pub fn serialize(&self) -> SerializedAnimation {
        let keys = self
            .keys()
            .iter()
            .map(|k| SerializedKey {
                frame: k.frame,
                value: FlatValue::from_value(&k.value),
                in_tangent: k.in_tangent.as_ref().map(FlatValue::from_value),
                out_tangent: k.out_tangent.as_ref().map(FlatValue::from_value),
                interpolation: match k.interpolation {
                    KeyInterpolation::Auto => None,
                    other => Some(other),
                },
            })
            .collect();
        let ranges = self
            .ranges()
            .map(|r| SerializedRange {
                name: r.name.clone(),
                from: r.from,
                to: r.to,
            })
            .collect();
        let events = self
            .events()
            .iter()
            .map(|e| SerializedEvent {
                frame: e.frame,
                only_once: e.only_once,
                name: e.name.clone(),
            })
            .collect();
        SerializedAnimation {
            name: self.name().to_string(),
            property: self.target_property().to_string(),
            data_type: self.data_type(),
            loop_mode: self.loop_mode(),
            frames_per_second: self.frames_per_second(),
            enable_blending: self.blending_enabled(),
            blending_speed: (self.blending_speed() != DEFAULT_BLENDING_SPEED)
                .then_some(self.blending_speed()),
            keys,
            ranges,
            events,
        }
    }

    /// Rebuild an animation from its record. Keys go through `set_keys`, so a
    /// malformed record is rejected rather than coerced.
    pub fn parse(record: &SerializedAnimation) -> Result<Self, AnimationError> {
        let name = record.name.as_str();
        if !(record.frames_per_second.is_finite() && record.frames_per_second > 0.0) {
            return Err(AnimationError::invalid_keys(
                name,
                format!("framesPerSecond must be > 0, got {}", record.frames_per_second),
            ));
        }
        let kind = record.data_type;
        let mut anim = Animation::new(
            name,
            record.property.as_str(),
            record.frames_per_second,
            kind,
            record.loop_mode,
        );
        anim.set_blending(
            record.enable_blending,
            record.blending_speed.unwrap_or(DEFAULT_BLENDING_SPEED),
        );

        let mut keys = Vec::with_capacity(record.keys.len());
        for k in &record.keys {
            let value = decode(name, "value", k.frame, &k.value, kind)?;
            let in_tangent = k
                .in_tangent
                .as_ref()
                .map(|t| decode(name, "inTangent", k.frame, t, kind))
                .transpose()?;
            let out_tangent = k
                .out_tangent
                .as_ref()
                .map(|t| decode(name, "outTangent", k.frame, t, kind))
                .transpose()?;
            keys.push(Keyframe {
                frame: k.frame,
                value,
                in_tangent,
                out_tangent,
                interpolation: k.interpolation.unwrap_or_default(),
            });
        }
        anim.set_keys(keys)?;

        for r in &record.ranges {
            anim.create_range(r.name.as_str(), r.from, r.to)?;
        }
        for e in &record.events {
            let mut event = AnimationEvent::new(e.frame, e.only_once);
            event.name = e.name.clone();
            anim.add_event(event)?;
        }
        Ok(anim)
    }

    pub fn to_json(&self) -> Result<String, AnimationError> {
        Ok(serde_json::to_string(&self.serialize())?)
    }

    pub fn from_json(s: &str) -> Result<Self, AnimationError> {
        let record: SerializedAnimation = serde_json::from_str(s)?;
        Self::parse(&record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omits_defaults_in_json() {
        let mut anim = Animation::new("fade", "alpha", 30.0, ValueKind::Scalar, LoopMode::Constant);
        anim.set_keys(vec![
            Keyframe::new(0.0, Value::Scalar(0.0)),
            Keyframe::step(10.0, Value::Scalar(1.0)),
        ])
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&anim.to_json().unwrap()).unwrap();
        assert_eq!(json["dataType"], "Scalar");
        assert_eq!(json["loopMode"], "Constant");
        assert!(json.get("enableBlending").is_none());
        assert!(json["keys"][0].get("interpolation").is_none());
        assert_eq!(json["keys"][1]["interpolation"], "Step");
        assert_eq!(json["keys"][1]["value"], 1.0);
    }

    #[test]
    fn rejects_wrong_arity_values() {
        let json = r#"{
            "name": "move", "property": "position", "dataType": "Vector3",
            "framesPerSecond": 30, "keys": [ { "frame": 0, "value": [1, 2] } ]
        }"#;
        let err = Animation::from_json(json).unwrap_err();
        assert!(matches!(err, AnimationError::InvalidKeyframeData { .. }));
    }
}
