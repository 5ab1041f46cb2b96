//! RuntimeAnimation: the stateful evaluator binding one Animation to one
//! target property under one Animatable.
//!
//! Per call to `animate`:
//! 1. advance the frame (elapsed frames times speed ratio, or an absolute
//!    frame when synchronized), wrapping or clamping per loop mode
//! 2. fire every event crossed since the previous frame, in playback order
//! 3. evaluate the track, apply relative-loop offsets and blending smoothing
//! 4. contribute the value to the tick accumulator (never written directly)
//!
//! The target and host are plain handles. A RuntimeAnimation whose target is
//! gone stops contributing and reports itself as no longer running.

use std::rc::Rc;

use log::warn;

use kinema_api_core::blend::{apply_offset, lerp_values, relative_offset};
use kinema_api_core::Value;

use crate::accumulate::Accumulator;
use crate::animation::Animation;
use crate::config::InterpolationOptions;
use crate::data::{KeyCursor, LoopMode};
use crate::error::AnimationError;
use crate::event::{AnimationEvent, FiredEvent};
use crate::ids::{AnimatableId, TargetId};
use crate::outputs::CoreEvent;
use crate::target::TargetStore;

/// How far to move the playhead this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Advance {
    /// Relative move in frames, before the speed ratio is applied.
    By(f32),
    /// Absolute frame (used by synchronized animatables). While looping, a
    /// frame behind the current one is read as a wrap.
    To(f32),
}

/// Shared per-tick state threaded through every `animate` call.
pub struct TickContext<'a> {
    pub targets: &'a TargetStore,
    pub accumulator: &'a mut Accumulator,
    pub events: &'a mut Vec<CoreEvent>,
    pub opts: InterpolationOptions,
    /// Keyframe events that may still be fired this tick.
    pub event_budget: usize,
    /// Keyframe events dropped because the budget ran out.
    pub dropped_events: usize,
}

impl<'a> TickContext<'a> {
    pub fn new(
        targets: &'a TargetStore,
        accumulator: &'a mut Accumulator,
        events: &'a mut Vec<CoreEvent>,
        opts: InterpolationOptions,
        event_budget: usize,
    ) -> Self {
        Self {
            targets,
            accumulator,
            events,
            opts,
            event_budget,
            dropped_events: 0,
        }
    }

    pub(crate) fn warn(&mut self, message: String) {
        warn!("{message}");
        self.events.push(CoreEvent::Warning { message });
    }
}

/// Incremental evaluation state.
#[derive(Clone, Debug, Default)]
pub struct CursorState {
    pub key: KeyCursor,
    /// Completed passes; negative when playing backwards.
    pub repeat_count: i64,
    /// Last track value before relative offsets and smoothing.
    pub work_value: Option<Value>,
    /// Per-pass delta of a relative loop over the current range.
    pub offset_value: Option<Value>,
    /// Track value at the end of the current range.
    pub high_limit_value: Option<Value>,
    limits_for: Option<(f32, f32)>,
}

impl CursorState {
    fn invalidate(&mut self) {
        self.key.invalidate();
        self.limits_for = None;
    }
}

#[derive(Clone, Debug)]
struct RuntimeEvent {
    event: AnimationEvent,
    retired: bool,
}

#[derive(Clone, Debug)]
struct BlendState {
    enabled: bool,
    speed: f32,
    factor: f32,
    start: Option<Value>,
}

impl BlendState {
    fn restart(&mut self) {
        self.factor = 0.0;
        self.start = None;
    }
}

#[derive(Debug)]
pub struct RuntimeAnimation {
    target: TargetId,
    animation: Rc<Animation>,
    host: AnimatableId,
    current_frame: f32,
    weight: f32,
    current_value: Option<Value>,
    original_value: Option<Value>,
    cursor: CursorState,
    events: Vec<RuntimeEvent>,
    blending: BlendState,
    /// False until the first tick after creation or a rewind; the first
    /// tick's event window includes its starting frame.
    started: bool,
    wrapped: bool,
    halted: bool,
}

impl RuntimeAnimation {
    /// Bind `animation` to `target`, remembering the property's current value
    /// as the original to restore and to blend partial weights against.
    pub fn new(
        target: TargetId,
        animation: Rc<Animation>,
        host: AnimatableId,
        start_frame: f32,
        targets: &TargetStore,
    ) -> Self {
        let original_value = targets
            .property(target, animation.target_property())
            .cloned();
        let events = animation
            .events()
            .iter()
            .cloned()
            .map(|event| RuntimeEvent {
                event,
                retired: false,
            })
            .collect();
        let blending = BlendState {
            enabled: animation.blending_enabled(),
            speed: animation.blending_speed(),
            factor: 0.0,
            start: None,
        };
        Self {
            target,
            animation,
            host,
            current_frame: start_frame,
            weight: -1.0,
            current_value: None,
            original_value,
            cursor: CursorState::default(),
            events,
            blending,
            started: false,
            wrapped: false,
            halted: false,
        }
    }

    #[inline]
    pub fn target(&self) -> TargetId {
        self.target
    }

    #[inline]
    pub fn animation(&self) -> &Rc<Animation> {
        &self.animation
    }

    #[inline]
    pub fn host(&self) -> AnimatableId {
        self.host
    }

    #[inline]
    pub fn current_frame(&self) -> f32 {
        self.current_frame
    }

    #[inline]
    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn current_value(&self) -> Option<&Value> {
        self.current_value.as_ref()
    }

    pub fn original_value(&self) -> Option<&Value> {
        self.original_value.as_ref()
    }

    pub fn cursor(&self) -> &CursorState {
        &self.cursor
    }

    #[inline]
    pub fn repeat_count(&self) -> i64 {
        self.cursor.repeat_count
    }

    /// Whether the last `animate` call wrapped around the range.
    #[inline]
    pub fn wrapped(&self) -> bool {
        self.wrapped
    }

    pub fn is_blending(&self) -> bool {
        self.blending.enabled
    }

    /// Stopped for good: disposed, or its target or track turned out unusable.
    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Events that can still fire (one-shot events drop out once fired).
    pub fn live_events(&self) -> impl Iterator<Item = &AnimationEvent> {
        self.events.iter().filter(|e| !e.retired).map(|e| &e.event)
    }

    pub fn enable_blending(&mut self, speed: f32) {
        self.blending.enabled = true;
        self.blending.speed = speed;
        self.blending.restart();
    }

    pub fn disable_blending(&mut self) {
        self.blending.enabled = false;
        self.blending.restart();
    }

    /// Advance and evaluate; returns whether the animation is still running.
    #[allow(clippy::too_many_arguments)]
    pub fn animate(
        &mut self,
        advance: Advance,
        from: f32,
        to: f32,
        looping: bool,
        speed_ratio: f32,
        weight: f32,
        ctx: &mut TickContext<'_>,
    ) -> bool {
        self.wrapped = false;
        if self.halted {
            return false;
        }
        if !ctx.targets.contains(self.target) {
            self.halt(
                ctx,
                format!(
                    "animation '{}': target {:?} no longer exists",
                    self.animation.name(),
                    self.target
                ),
            );
            return false;
        }
        if self.animation.keys().is_empty() {
            let err = AnimationError::EmptyAnimationTrack {
                animation: self.animation.name().to_string(),
            };
            self.halt(ctx, err.to_string());
            return false;
        }

        let mode = self.animation.loop_mode();
        let looping = looping && mode != LoopMode::Constant && to > from;
        let prev = self.current_frame;
        let delta = match advance {
            Advance::By(elapsed) => elapsed * speed_ratio,
            Advance::To(frame) if looping && frame < prev => (to - prev) + (frame - from),
            Advance::To(frame) => frame - prev,
        };
        let delta = if delta.is_finite() { delta } else { 0.0 };
        let first = !self.started;
        self.started = true;

        let (frame, running) = if looping {
            (self.advance_looping(prev, delta, from, to, first, ctx), true)
        } else {
            self.advance_clamped(prev, delta, from, to, first, ctx)
        };
        self.current_frame = frame;

        match self.value_at_frame(frame, from, to, ctx.opts) {
            Ok(value) => {
                self.set_value(value, weight, ctx);
                running
            }
            Err(e) => {
                self.halt(ctx, e.to_string());
                false
            }
        }
    }

    /// Contribute `value` for this tick. `weight < 0` is unweighted.
    pub fn set_value(&mut self, value: Value, weight: f32, ctx: &mut TickContext<'_>) {
        self.weight = weight;
        let value = self.smooth(value, ctx.targets, &ctx.opts);
        ctx.accumulator.add(
            self.target,
            self.animation.target_property(),
            &value,
            weight,
            self.original_value.as_ref(),
        );
        self.current_value = Some(value);
    }

    /// Rewind to `from`. One-shot events that already fired stay retired.
    pub fn reset(&mut self, from: f32, restore_original: bool, targets: &mut TargetStore) {
        self.current_frame = from;
        self.cursor = CursorState::default();
        self.current_value = None;
        self.blending.restart();
        self.started = false;
        self.wrapped = false;
        if restore_original {
            if let Some(original) = &self.original_value {
                targets.set_property(
                    self.target,
                    self.animation.target_property(),
                    original.clone(),
                );
            }
        }
    }

    /// Jump to `frame`, bypassing the per-tick advance, and write the value
    /// straight to the target. Returns the written value.
    pub fn go_to_frame(
        &mut self,
        frame: f32,
        from: f32,
        to: f32,
        targets: &mut TargetStore,
        opts: &InterpolationOptions,
    ) -> Option<Value> {
        // NaN lands on `from`.
        let frame = frame.max(from).min(to);
        self.current_frame = frame;
        self.cursor.invalidate();
        self.started = false;
        if self.halted || !targets.contains(self.target) {
            return None;
        }
        let value = self.value_at_frame(frame, from, to, *opts).ok()?;
        targets.set_property(
            self.target,
            self.animation.target_property(),
            value.clone(),
        );
        self.current_value = Some(value.clone());
        Some(value)
    }

    /// Release evaluation state; the animation never contributes again.
    pub fn dispose(&mut self) {
        self.halted = true;
        self.cursor = CursorState::default();
        self.events.clear();
        self.current_value = None;
        self.blending.restart();
    }

    fn halt(&mut self, ctx: &mut TickContext<'_>, message: String) {
        self.halted = true;
        ctx.warn(message);
    }

    /// Looping advance; wraps with `from + (frame - from) mod (to - from)`.
    /// A playhead found outside the range is folded back in first.
    fn advance_looping(
        &mut self,
        prev: f32,
        delta: f32,
        from: f32,
        to: f32,
        first: bool,
        ctx: &mut TickContext<'_>,
    ) -> f32 {
        let length = to - from;
        let prev = if prev < from || prev > to {
            from + (prev - from).rem_euclid(length)
        } else {
            prev
        };
        let u = (prev - from) + delta;
        if delta >= 0.0 {
            // Landing exactly on `to` finishes the pass without wrapping.
            if u <= length {
                let frame = from + u;
                self.fire_between(prev, frame, first, true, false, ctx);
                return frame;
            }
            let wraps = ((u / length).floor() as i64).max(1);
            let frame = (from + (u - wraps as f32 * length)).clamp(from, to);
            self.fire_between(prev, to, first, true, false, ctx);
            self.fire_full_passes(wraps - 1, from, to, false, ctx);
            self.fire_between(from, frame, true, true, false, ctx);
            self.cursor.repeat_count = self.cursor.repeat_count.saturating_add(wraps);
            self.wrapped = true;
            self.cursor.key.invalidate();
            frame
        } else {
            if u >= 0.0 {
                let frame = from + u;
                self.fire_between(frame, prev, true, first, true, ctx);
                return frame;
            }
            let wraps = ((-u / length).ceil() as i64).max(1);
            let frame = (from + (u + wraps as f32 * length)).clamp(from, to);
            self.fire_between(from, prev, true, first, true, ctx);
            self.fire_full_passes(wraps - 1, from, to, true, ctx);
            self.fire_between(frame, to, true, true, true, ctx);
            self.cursor.repeat_count = self.cursor.repeat_count.saturating_sub(wraps);
            self.wrapped = true;
            self.cursor.key.invalidate();
            frame
        }
    }

    /// Non-looping advance: stop at `to` (or `from` when playing backwards).
    fn advance_clamped(
        &mut self,
        prev: f32,
        delta: f32,
        from: f32,
        to: f32,
        first: bool,
        ctx: &mut TickContext<'_>,
    ) -> (f32, bool) {
        let next = prev + delta;
        if delta >= 0.0 {
            let (frame, running) = if next >= to { (to, false) } else { (next, true) };
            self.fire_between(prev, frame, first, true, false, ctx);
            (frame, running)
        } else {
            let (frame, running) = if next <= from {
                (from, false)
            } else {
                (next, true)
            };
            self.fire_between(frame, prev, true, first, true, ctx);
            (frame, running)
        }
    }

    fn fire_full_passes(
        &mut self,
        passes: i64,
        from: f32,
        to: f32,
        descending: bool,
        ctx: &mut TickContext<'_>,
    ) {
        for _ in 0..passes {
            let any_live = self
                .events
                .iter()
                .any(|e| !e.retired && e.event.frame >= from && e.event.frame <= to);
            if !any_live {
                break;
            }
            if ctx.event_budget == 0 {
                ctx.dropped_events += 1;
                break;
            }
            self.fire_between(from, to, true, true, descending, ctx);
        }
    }

    /// Fire live events with frames inside the window, in playback order.
    fn fire_between(
        &mut self,
        lo: f32,
        hi: f32,
        lo_inclusive: bool,
        hi_inclusive: bool,
        descending: bool,
        ctx: &mut TickContext<'_>,
    ) {
        if self.events.is_empty() || lo > hi {
            return;
        }
        let n = self.events.len();
        for step in 0..n {
            let i = if descending { n - 1 - step } else { step };
            let entry = &self.events[i];
            if entry.retired {
                continue;
            }
            let f = entry.event.frame;
            let above = if lo_inclusive { f >= lo } else { f > lo };
            let below = if hi_inclusive { f <= hi } else { f < hi };
            if !(above && below) {
                continue;
            }
            if ctx.event_budget == 0 {
                ctx.dropped_events += 1;
                continue;
            }
            ctx.event_budget -= 1;
            let fired = FiredEvent {
                animatable: self.host,
                target: self.target,
                animation: self.animation.name().to_string(),
                frame: f,
                name: entry.event.name.clone(),
            };
            if let Some(action) = &entry.event.action {
                action.call(&fired);
            }
            let once = entry.event.only_once;
            ctx.events.push(CoreEvent::AnimationEvent(fired));
            if once {
                self.events[i].retired = true;
            }
        }
    }

    fn refresh_limits(
        &mut self,
        from: f32,
        to: f32,
        opts: &InterpolationOptions,
    ) -> Result<(), AnimationError> {
        if self.cursor.limits_for == Some((from, to)) {
            return Ok(());
        }
        let high = self.animation.value_at(to, opts)?;
        self.cursor.offset_value = if self.animation.loop_mode() == LoopMode::Relative {
            let low = self.animation.value_at(from, opts)?;
            Some(relative_offset(&low, &high))
        } else {
            None
        };
        self.cursor.high_limit_value = Some(high);
        self.cursor.limits_for = Some((from, to));
        Ok(())
    }

    fn value_at_frame(
        &mut self,
        frame: f32,
        from: f32,
        to: f32,
        opts: InterpolationOptions,
    ) -> Result<Value, AnimationError> {
        self.refresh_limits(from, to, &opts)?;
        let base = match &self.cursor.high_limit_value {
            Some(high) if frame == to => high.clone(),
            _ => self.animation.evaluate(frame, &mut self.cursor.key, &opts)?,
        };
        let value = match &self.cursor.offset_value {
            Some(offset) => apply_offset(&base, offset, self.cursor.repeat_count),
            None => base.clone(),
        };
        self.cursor.work_value = Some(base);
        Ok(value)
    }

    /// Ease from the property's value at the first smoothed tick toward the
    /// evaluated value, `speed` further per tick.
    fn smooth(&mut self, value: Value, targets: &TargetStore, opts: &InterpolationOptions) -> Value {
        let blending = &mut self.blending;
        if !blending.enabled || blending.speed <= 0.0 || blending.factor >= 1.0 {
            return value;
        }
        let target = self.target;
        let property = self.animation.target_property();
        let start = blending.start.get_or_insert_with(|| {
            targets
                .property(target, property)
                .cloned()
                .unwrap_or_else(|| value.clone())
        });
        let out = lerp_values(
            start,
            &value,
            blending.factor.min(1.0),
            opts.precise_matrix_interpolation,
        );
        blending.factor += blending.speed;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use kinema_api_core::ValueKind;

    use crate::data::Keyframe;
    use crate::target::Target;

    fn approx(a: f32, b: f32, eps: f32) {
        assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
    }

    fn track(mode: LoopMode, keys: &[(f32, f32)]) -> Animation {
        let mut anim = Animation::new("t", "x", 30.0, ValueKind::Scalar, mode);
        anim.set_keys(
            keys.iter()
                .map(|(f, v)| Keyframe::new(*f, Value::Scalar(*v)))
                .collect(),
        )
        .unwrap();
        anim
    }

    fn store() -> TargetStore {
        let mut store = TargetStore::new();
        store.insert(
            TargetId(0),
            Target::new("obj").with_property("x", Value::Scalar(0.0)),
        );
        store
    }

    fn bind(anim: Animation, store: &TargetStore, start: f32) -> RuntimeAnimation {
        RuntimeAnimation::new(TargetId(0), Rc::new(anim), AnimatableId(0), start, store)
    }

    #[allow(clippy::too_many_arguments)]
    fn tick(
        ra: &mut RuntimeAnimation,
        store: &TargetStore,
        advance: Advance,
        from: f32,
        to: f32,
        looping: bool,
        speed: f32,
    ) -> (bool, Vec<CoreEvent>) {
        let opts = InterpolationOptions::default();
        let mut acc = Accumulator::new(opts);
        let mut events = Vec::new();
        let mut ctx = TickContext::new(store, &mut acc, &mut events, opts, 1024);
        let running = ra.animate(advance, from, to, looping, speed, -1.0, &mut ctx);
        (running, events)
    }

    fn value(ra: &RuntimeAnimation) -> f32 {
        ra.current_value().and_then(Value::as_scalar).unwrap()
    }

    fn fired_frames(events: &[CoreEvent]) -> Vec<f32> {
        events
            .iter()
            .filter_map(|e| match e {
                CoreEvent::AnimationEvent(f) => Some(f.frame),
                _ => None,
            })
            .collect()
    }

    /// it should wrap cycle playback back into the range
    #[test]
    fn cycle_wraps_into_range() {
        let store = store();
        let mut ra = bind(track(LoopMode::Cycle, &[(0.0, 0.0), (30.0, 10.0)]), &store, 0.0);
        let (running, _) = tick(&mut ra, &store, Advance::By(15.0), 0.0, 30.0, true, 1.0);
        assert!(running);
        approx(value(&ra), 5.0, 1e-5);
        tick(&mut ra, &store, Advance::By(25.0), 0.0, 30.0, true, 1.0);
        approx(ra.current_frame(), 10.0, 1e-4);
        approx(value(&ra), 10.0 / 3.0, 1e-4);
        assert!(ra.wrapped());
        assert_eq!(ra.repeat_count(), 1);
    }

    /// it should accumulate per-pass deltas in relative mode
    #[test]
    fn relative_accumulates_offsets() {
        let store = store();
        let mut ra = bind(track(LoopMode::Relative, &[(0.0, 0.0), (10.0, 2.0)]), &store, 0.0);
        tick(&mut ra, &store, Advance::By(35.0), 0.0, 10.0, true, 1.0);
        assert_eq!(ra.repeat_count(), 3);
        approx(value(&ra), 7.0, 1e-5);
    }

    /// it should clamp constant tracks at the end and stop even when looping
    #[test]
    fn constant_clamps_and_stops() {
        let store = store();
        let mut ra = bind(track(LoopMode::Constant, &[(0.0, 0.0), (10.0, 2.0)]), &store, 0.0);
        let (running, _) = tick(&mut ra, &store, Advance::By(15.0), 0.0, 10.0, true, 1.0);
        assert!(!running);
        assert_eq!(ra.current_value(), Some(&Value::Scalar(2.0)));
        let (running, _) = tick(&mut ra, &store, Advance::By(5.0), 0.0, 10.0, true, 1.0);
        assert!(!running);
        assert_eq!(ra.current_value(), Some(&Value::Scalar(2.0)));
        assert_eq!(ra.current_frame(), 10.0);
    }

    /// it should fire one-shot events once across loops and repeat the rest
    #[test]
    fn one_shot_events_fire_once() {
        let once = Rc::new(Cell::new(0));
        let every = Rc::new(Cell::new(0));
        let mut anim = track(LoopMode::Cycle, &[(0.0, 0.0), (30.0, 10.0)]);
        let c = once.clone();
        anim.add_event(AnimationEvent::new(5.0, true).with_action(move |_| c.set(c.get() + 1)))
            .unwrap();
        let c = every.clone();
        anim.add_event(AnimationEvent::new(5.0, false).with_action(move |_| c.set(c.get() + 1)))
            .unwrap();
        let store = store();
        let mut ra = bind(anim, &store, 0.0);
        for _ in 0..9 {
            tick(&mut ra, &store, Advance::By(10.0), 0.0, 30.0, true, 1.0);
        }
        assert_eq!(once.get(), 1);
        assert_eq!(every.get(), 3);
        assert_eq!(ra.live_events().count(), 1);
    }

    /// it should fire every crossing in ascending order when one tick spans several loops
    #[test]
    fn multi_wrap_fires_in_order() {
        let mut anim = track(LoopMode::Cycle, &[(0.0, 0.0), (30.0, 10.0)]);
        anim.add_event(AnimationEvent::new(20.0, false)).unwrap();
        anim.add_event(AnimationEvent::new(5.0, false)).unwrap();
        let store = store();
        let mut ra = bind(anim, &store, 0.0);
        let (_, events) = tick(&mut ra, &store, Advance::By(70.0), 0.0, 30.0, true, 1.0);
        assert_eq!(fired_frames(&events), vec![5.0, 20.0, 5.0, 20.0, 5.0]);
        assert_eq!(ra.repeat_count(), 2);
        approx(ra.current_frame(), 10.0, 1e-4);
    }

    /// it should fold a playhead found outside the range back in before advancing
    #[test]
    fn out_of_range_playhead_folds_back() {
        let store = store();
        let mut ra = bind(track(LoopMode::Cycle, &[(0.0, 0.0), (30.0, 30.0)]), &store, -20.0);
        // -20 sits 30 frames before `from`: one full 20-frame pass plus 10.
        tick(&mut ra, &store, Advance::By(5.0), 10.0, 30.0, true, 1.0);
        approx(ra.current_frame(), 25.0, 1e-4);
        approx(value(&ra), 25.0, 1e-4);
    }

    /// it should wrap an advance of exactly two ranges onto `from`
    #[test]
    fn exact_double_range_lands_on_from() {
        let store = store();
        let mut ra = bind(track(LoopMode::Cycle, &[(0.0, 0.0), (30.0, 10.0)]), &store, 0.0);
        tick(&mut ra, &store, Advance::By(60.0), 0.0, 30.0, true, 1.0);
        assert_eq!(ra.current_frame(), 0.0);
        assert_eq!(ra.repeat_count(), 2);
        assert_eq!(value(&ra), 0.0);
    }

    /// it should play backwards with mirrored wrapping for negative speed
    #[test]
    fn negative_speed_wraps_backwards() {
        let mut anim = track(LoopMode::Cycle, &[(0.0, 0.0), (30.0, 10.0)]);
        anim.add_event(AnimationEvent::new(25.0, false)).unwrap();
        anim.add_event(AnimationEvent::new(22.0, false)).unwrap();
        let store = store();
        let mut ra = bind(anim, &store, 30.0);
        let (_, events) = tick(&mut ra, &store, Advance::By(10.0), 0.0, 30.0, true, -1.0);
        approx(ra.current_frame(), 20.0, 1e-5);
        assert_eq!(fired_frames(&events), vec![25.0, 22.0]);
        tick(&mut ra, &store, Advance::By(25.0), 0.0, 30.0, true, -1.0);
        approx(ra.current_frame(), 25.0, 1e-4);
        assert_eq!(ra.repeat_count(), -1);
        approx(value(&ra), 25.0 / 3.0, 1e-4);
    }

    /// it should halt with a warning when its target disappears
    #[test]
    fn dead_target_stops_contributing() {
        let mut store = store();
        let mut ra = bind(track(LoopMode::Cycle, &[(0.0, 0.0), (30.0, 10.0)]), &store, 0.0);
        store.remove(TargetId(0));
        let (running, events) = tick(&mut ra, &store, Advance::By(1.0), 0.0, 30.0, true, 1.0);
        assert!(!running);
        assert!(ra.is_halted());
        assert!(matches!(events.as_slice(), [CoreEvent::Warning { .. }]));
    }

    /// it should ease toward the evaluated value when blending is enabled
    #[test]
    fn blending_eases_from_current_value() {
        let mut store = store();
        store.set_property(TargetId(0), "x", Value::Scalar(100.0));
        let mut ra = bind(track(LoopMode::Cycle, &[(0.0, 0.0), (30.0, 0.0)]), &store, 0.0);
        ra.enable_blending(0.5);
        tick(&mut ra, &store, Advance::By(1.0), 0.0, 30.0, true, 1.0);
        approx(value(&ra), 100.0, 1e-5);
        tick(&mut ra, &store, Advance::By(1.0), 0.0, 30.0, true, 1.0);
        approx(value(&ra), 50.0, 1e-5);
        tick(&mut ra, &store, Advance::By(1.0), 0.0, 30.0, true, 1.0);
        approx(value(&ra), 0.0, 1e-5);
    }

    /// it should restore the original value and keep retired events retired on reset
    #[test]
    fn reset_restores_original() {
        let mut anim = track(LoopMode::Cycle, &[(0.0, 0.0), (30.0, 10.0)]);
        anim.add_event(AnimationEvent::new(0.0, true)).unwrap();
        let mut store = store();
        store.set_property(TargetId(0), "x", Value::Scalar(4.0));
        let mut ra = bind(anim, &store, 0.0);
        let (_, events) = tick(&mut ra, &store, Advance::By(3.0), 0.0, 30.0, true, 1.0);
        assert_eq!(fired_frames(&events), vec![0.0]);
        store.set_property(TargetId(0), "x", Value::Scalar(1.0));
        ra.reset(0.0, true, &mut store);
        assert_eq!(store.property(TargetId(0), "x"), Some(&Value::Scalar(4.0)));
        let (_, events) = tick(&mut ra, &store, Advance::By(3.0), 0.0, 30.0, true, 1.0);
        assert!(fired_frames(&events).is_empty());
    }
}
