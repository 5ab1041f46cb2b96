//! Handles for targets and animatables.
//!
//! Handles are plain indices: holding one never keeps the referenced entity
//! alive, and every lookup goes through the owning store.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TargetId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AnimatableId(pub u32);

/// Hands out ids in creation order; ids are never reused.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next_target: u32,
    next_animatable: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next_target: 0,
            next_animatable: 0,
        }
    }

    #[inline]
    pub fn alloc_target(&mut self) -> TargetId {
        let id = TargetId(self.next_target);
        self.next_target = self.next_target.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_animatable(&mut self) -> AnimatableId {
        let id = AnimatableId(self.next_animatable);
        self.next_animatable = self.next_animatable.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_and_animatable_counters_are_independent() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.alloc_target(), TargetId(0));
        assert_eq!(ids.alloc_animatable(), AnimatableId(0));
        assert_eq!(ids.alloc_target(), TargetId(1));
        assert_eq!(ids.alloc_animatable(), AnimatableId(1));
    }
}
