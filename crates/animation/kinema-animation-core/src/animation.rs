//! Animation: a typed keyframe track for one target property.
//!
//! Model:
//! - Keys are strictly ascending by frame and all carry the declared `data_type`.
//!   Both are checked in `set_keys`, so evaluation never re-checks types.
//! - Segment [k(i) -> k(i+1)] interpolation:
//!   Step keys hold k(i); both tangents present selects cubic Hermite;
//!   otherwise linear (slerp for quaternions, decomposed or component lerp for matrices).
//! - Evaluation at a key's exact frame returns that key's literal value.
//!
//! An Animation is immutable while it is being played: runtime state (cursor,
//! loop counters, retired events) lives in `RuntimeAnimation`.

use indexmap::IndexMap;
use log::debug;

use kinema_api_core::blend::{hermite_values, lerp_values};
use kinema_api_core::{Value, ValueKind};

use crate::config::InterpolationOptions;
use crate::data::{AnimationRange, KeyCursor, KeyInterpolation, Keyframe, LoopMode};
use crate::error::AnimationError;
use crate::event::AnimationEvent;

/// Brackets shorter than this (in frames) are treated as zero-length.
pub const MIN_KEY_SPACING: f32 = 1e-6;

pub const DEFAULT_BLENDING_SPEED: f32 = 0.01;

#[derive(Clone, Debug)]
pub struct Animation {
    name: String,
    target_property: String,
    frames_per_second: f32,
    data_type: ValueKind,
    loop_mode: LoopMode,
    enable_blending: bool,
    blending_speed: f32,
    keys: Vec<Keyframe>,
    ranges: IndexMap<String, AnimationRange>,
    events: Vec<AnimationEvent>,
}

impl Animation {
    pub fn new(
        name: impl Into<String>,
        target_property: impl Into<String>,
        frames_per_second: f32,
        data_type: ValueKind,
        loop_mode: LoopMode,
    ) -> Self {
        Self {
            name: name.into(),
            target_property: target_property.into(),
            frames_per_second,
            data_type,
            loop_mode,
            enable_blending: false,
            blending_speed: DEFAULT_BLENDING_SPEED,
            keys: Vec::new(),
            ranges: IndexMap::new(),
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn target_property(&self) -> &str {
        &self.target_property
    }

    #[inline]
    pub fn frames_per_second(&self) -> f32 {
        self.frames_per_second
    }

    #[inline]
    pub fn data_type(&self) -> ValueKind {
        self.data_type
    }

    #[inline]
    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    #[inline]
    pub fn blending_enabled(&self) -> bool {
        self.enable_blending
    }

    #[inline]
    pub fn blending_speed(&self) -> f32 {
        self.blending_speed
    }

    /// Ease the target toward freshly evaluated values at `speed` per tick.
    pub fn set_blending(&mut self, enable: bool, speed: f32) {
        self.enable_blending = enable;
        self.blending_speed = speed;
    }

    // ----- keys -----

    #[inline]
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Replace all keys. Keys must be strictly ascending by frame and match
    /// the declared data type (tangents included); matrices take no tangents.
    pub fn set_keys(&mut self, keys: Vec<Keyframe>) -> Result<(), AnimationError> {
        self.validate_keys(&keys)?;
        self.keys = keys;
        Ok(())
    }

    fn validate_keys(&self, keys: &[Keyframe]) -> Result<(), AnimationError> {
        let fail = |reason: String| Err(AnimationError::invalid_keys(&self.name, reason));
        for (i, key) in keys.iter().enumerate() {
            if !key.frame.is_finite() {
                return fail(format!("key {i} has a non-finite frame"));
            }
            if key.value.kind() != self.data_type {
                return fail(format!(
                    "key {i} holds a {} but the animation is {}",
                    key.value.kind().name(),
                    self.data_type.name()
                ));
            }
            if !key.value.is_finite() {
                return fail(format!("key {i} has non-finite components"));
            }
            for tangent in [&key.in_tangent, &key.out_tangent].into_iter().flatten() {
                if self.data_type == ValueKind::Matrix {
                    return fail(format!("key {i}: matrix keys cannot carry tangents"));
                }
                if tangent.kind() != self.data_type {
                    return fail(format!(
                        "key {i} tangent is a {} but the animation is {}",
                        tangent.kind().name(),
                        self.data_type.name()
                    ));
                }
            }
            if i > 0 {
                let prev = keys[i - 1].frame;
                if key.frame == prev {
                    return fail(format!("keys {} and {i} share frame {prev}", i - 1));
                }
                if key.frame < prev {
                    return fail(format!(
                        "key {i} at frame {} comes after frame {prev}",
                        key.frame
                    ));
                }
            }
        }
        Ok(())
    }

    /// Frame of the last key, or 0 for an empty track.
    pub fn highest_frame(&self) -> f32 {
        self.keys.last().map(|k| k.frame).unwrap_or(0.0)
    }

    // ----- ranges -----

    /// Register a named range. An existing range with the same name is kept.
    pub fn create_range(
        &mut self,
        name: impl Into<String>,
        from: f32,
        to: f32,
    ) -> Result<(), AnimationError> {
        let name = name.into();
        if !from.is_finite() || !to.is_finite() || from > to {
            return Err(AnimationError::InvalidRange { name, from, to });
        }
        if !self.ranges.contains_key(&name) {
            let range = AnimationRange::new(name.clone(), from, to);
            self.ranges.insert(name, range);
        }
        Ok(())
    }

    /// Remove a named range; with `delete_frames` the keys inside it go too.
    pub fn delete_range(&mut self, name: &str, delete_frames: bool) -> Option<AnimationRange> {
        let range = self.ranges.shift_remove(name)?;
        if delete_frames {
            self.keys
                .retain(|k| k.frame < range.from || k.frame > range.to);
        }
        Some(range)
    }

    pub fn get_range(&self, name: &str) -> Option<&AnimationRange> {
        self.ranges.get(name)
    }

    pub fn ranges(&self) -> impl Iterator<Item = &AnimationRange> {
        self.ranges.values()
    }

    // ----- events -----

    /// Add an event; events stay ordered by frame.
    pub fn add_event(&mut self, event: AnimationEvent) -> Result<(), AnimationError> {
        if !event.frame.is_finite() {
            return Err(AnimationError::invalid_keys(
                &self.name,
                "event frame must be finite",
            ));
        }
        self.events.push(event);
        self.events.sort_by(|a, b| a.frame.total_cmp(&b.frame));
        Ok(())
    }

    /// Remove every event at `frame`; returns how many were removed.
    pub fn remove_events(&mut self, frame: f32) -> usize {
        let before = self.events.len();
        self.events.retain(|e| e.frame != frame);
        before - self.events.len()
    }

    #[inline]
    pub fn events(&self) -> &[AnimationEvent] {
        &self.events
    }

    // ----- evaluation -----

    /// Value at `frame` with a fresh cursor.
    pub fn value_at(
        &self,
        frame: f32,
        opts: &InterpolationOptions,
    ) -> Result<Value, AnimationError> {
        let mut cursor = KeyCursor::default();
        self.evaluate(frame, &mut cursor, opts)
    }

    /// Interpolated value at `frame`. Frames outside the keyed span clamp to
    /// the first/last key. `cursor` carries the last bracket as a search hint.
    pub fn evaluate(
        &self,
        frame: f32,
        cursor: &mut KeyCursor,
        opts: &InterpolationOptions,
    ) -> Result<Value, AnimationError> {
        let keys = &self.keys;
        let n = keys.len();
        if n == 0 {
            return Err(AnimationError::EmptyAnimationTrack {
                animation: self.name.clone(),
            });
        }
        if n == 1 || frame <= keys[0].frame {
            cursor.index = Some(0);
            return Ok(keys[0].value.clone());
        }
        if frame >= keys[n - 1].frame {
            cursor.index = Some(n - 2);
            return Ok(keys[n - 1].value.clone());
        }

        let i = self.locate(frame, cursor);
        cursor.index = Some(i);
        let start = &keys[i];
        let end = &keys[i + 1];

        if frame == start.frame || start.interpolation == KeyInterpolation::Step {
            return Ok(start.value.clone());
        }

        let gradient = match self.gradient(start, end, frame) {
            Ok(g) => g,
            Err(AnimationError::DegenerateInterval { .. }) => {
                debug!(
                    "animation '{}': zero-length bracket at frame {frame}, using later key",
                    self.name
                );
                return Ok(end.value.clone());
            }
            Err(e) => return Err(e),
        };

        if let (Some(out_tangent), Some(in_tangent)) = (&start.out_tangent, &end.in_tangent) {
            let span = end.frame - start.frame;
            if let Some(v) =
                hermite_values(&start.value, out_tangent, &end.value, in_tangent, gradient, span)
            {
                return Ok(v);
            }
        }
        Ok(lerp_values(
            &start.value,
            &end.value,
            gradient,
            opts.precise_matrix_interpolation,
        ))
    }

    /// Index `i` with `keys[i].frame <= frame < keys[i + 1].frame`.
    /// Requires `keys[0].frame < frame < keys[last].frame`.
    fn locate(&self, frame: f32, cursor: &KeyCursor) -> usize {
        let keys = &self.keys;
        let last_bracket = keys.len() - 2;
        if let Some(mut i) = cursor.index.filter(|i| *i <= last_bracket) {
            if keys[i].frame <= frame {
                while i < last_bracket && keys[i + 1].frame <= frame {
                    i += 1;
                }
            } else {
                while i > 0 && keys[i].frame > frame {
                    i -= 1;
                }
            }
            return i;
        }
        keys.partition_point(|k| k.frame <= frame)
            .saturating_sub(1)
            .min(last_bracket)
    }

    fn gradient(&self, start: &Keyframe, end: &Keyframe, frame: f32) -> Result<f32, AnimationError> {
        let span = end.frame - start.frame;
        if span < MIN_KEY_SPACING {
            return Err(AnimationError::DegenerateInterval {
                animation: self.name.clone(),
                frame,
            });
        }
        Ok(((frame - start.frame) / span).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    fn scalar_anim(keys: &[(f32, f32)]) -> Animation {
        let mut anim = Animation::new("a", "p", 30.0, ValueKind::Scalar, LoopMode::Cycle);
        anim.set_keys(
            keys.iter()
                .map(|(f, v)| Keyframe::new(*f, Value::Scalar(*v)))
                .collect(),
        )
        .unwrap();
        anim
    }

    #[test]
    fn cursor_hint_scans_both_directions() {
        let anim = scalar_anim(&[(0.0, 0.0), (10.0, 1.0), (20.0, 2.0), (30.0, 3.0)]);
        let opts = InterpolationOptions::default();
        let mut cursor = KeyCursor::default();
        let v = anim.evaluate(25.0, &mut cursor, &opts).unwrap();
        approx(v.as_scalar().unwrap(), 2.5, 1e-6);
        assert_eq!(cursor.index, Some(2));
        let v = anim.evaluate(5.0, &mut cursor, &opts).unwrap();
        approx(v.as_scalar().unwrap(), 0.5, 1e-6);
        assert_eq!(cursor.index, Some(0));
        let v = anim.evaluate(15.0, &mut cursor, &opts).unwrap();
        approx(v.as_scalar().unwrap(), 1.5, 1e-6);
        assert_eq!(cursor.index, Some(1));
    }

    #[test]
    fn stale_cursor_out_of_bounds_falls_back_to_search() {
        let anim = scalar_anim(&[(0.0, 0.0), (10.0, 1.0)]);
        let mut cursor = KeyCursor { index: Some(42) };
        let v = anim
            .evaluate(5.0, &mut cursor, &InterpolationOptions::default())
            .unwrap();
        approx(v.as_scalar().unwrap(), 0.5, 1e-6);
        assert_eq!(cursor.index, Some(0));
    }

    #[test]
    fn degenerate_bracket_returns_later_key() {
        let anim = scalar_anim(&[(0.0, 1.0), (1e-7, 9.0)]);
        let v = anim
            .value_at(0.5e-7, &InterpolationOptions::default())
            .unwrap();
        assert_eq!(v, Value::Scalar(9.0));
    }
}
