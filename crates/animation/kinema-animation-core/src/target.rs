//! Animated objects and their properties.
//!
//! The store owns the targets; runtime animations and animatables only keep
//! `TargetId` handles and check liveness through `contains` before writing.

use hashbrown::HashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use kinema_api_core::Value;

use crate::ids::TargetId;

/// One animated object: a bag of named, typed properties.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub properties: IndexMap<String, Value>,
}

impl Target {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: IndexMap::new(),
        }
    }

    pub fn with_property(mut self, property: impl Into<String>, value: Value) -> Self {
        self.properties.insert(property.into(), value);
        self
    }
}

#[derive(Debug, Default)]
pub struct TargetStore {
    items: HashMap<TargetId, Target>,
}

impl TargetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, id: TargetId, target: Target) {
        self.items.insert(id, target);
    }

    pub(crate) fn remove(&mut self, id: TargetId) -> Option<Target> {
        self.items.remove(&id)
    }

    #[inline]
    pub fn contains(&self, id: TargetId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.items.get(&id)
    }

    pub fn property(&self, id: TargetId, property: &str) -> Option<&Value> {
        self.items.get(&id)?.properties.get(property)
    }

    /// Write a property; returns false when the target is gone.
    pub fn set_property(&mut self, id: TargetId, property: &str, value: Value) -> bool {
        match self.items.get_mut(&id) {
            Some(target) => {
                if let Some(slot) = target.properties.get_mut(property) {
                    *slot = value;
                } else {
                    target.properties.insert(property.to_string(), value);
                }
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_only_to_live_targets() {
        let mut store = TargetStore::new();
        store.insert(TargetId(0), Target::new("box").with_property("alpha", Value::Scalar(1.0)));
        assert!(store.set_property(TargetId(0), "alpha", Value::Scalar(0.5)));
        assert_eq!(store.property(TargetId(0), "alpha"), Some(&Value::Scalar(0.5)));
        assert!(!store.set_property(TargetId(7), "alpha", Value::Scalar(0.5)));
        store.remove(TargetId(0));
        assert!(!store.contains(TargetId(0)));
        assert!(store.is_empty());
    }
}
