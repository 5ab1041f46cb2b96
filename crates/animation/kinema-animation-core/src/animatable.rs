//! Animatable: the playback unit the engine ticks.
//!
//! Owns the runtime animations started together for one or more targets and
//! the playback parameters they share (range, loop, speed, weight). Anything
//! that needs other animatables or write access to targets (restart, sync,
//! stop, dispose) goes through the engine.

use std::fmt;
use std::rc::Rc;

use futures::channel::oneshot;
use serde::{Deserialize, Serialize};

use crate::animation::Animation;
use crate::config::InterpolationOptions;
use crate::data::LoopMode;
use crate::ids::{AnimatableId, TargetId};
use crate::outputs::CoreEvent;
use crate::runtime::{Advance, RuntimeAnimation, TickContext};
use crate::target::TargetStore;

/// Playback parameters for `Engine::begin_animation`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatableCfg {
    pub from_frame: f32,
    /// Defaults to the highest key frame among the animations.
    pub to_frame: Option<f32>,
    pub loop_animation: bool,
    pub speed_ratio: f32,
    /// Negative means unweighted.
    pub weight: f32,
    pub dispose_on_end: bool,
}

impl Default for AnimatableCfg {
    fn default() -> Self {
        Self {
            from_frame: 0.0,
            to_frame: None,
            loop_animation: false,
            speed_ratio: 1.0,
            weight: -1.0,
            dispose_on_end: true,
        }
    }
}

impl AnimatableCfg {
    pub fn looping() -> Self {
        Self {
            loop_animation: true,
            ..Self::default()
        }
    }

    pub fn range(mut self, from: f32, to: f32) -> Self {
        self.from_frame = from;
        self.to_frame = Some(to);
        self
    }

    pub fn speed(mut self, speed_ratio: f32) -> Self {
        self.speed_ratio = speed_ratio;
        self
    }

    pub fn weighted(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn keep_on_end(mut self) -> Self {
        self.dispose_on_end = false;
        self
    }
}

/// Callback receiving the animatable's id (end / loop notifications).
#[derive(Clone)]
pub struct AnimatableCallback(Rc<dyn Fn(AnimatableId)>);

impl AnimatableCallback {
    pub fn new(f: impl Fn(AnimatableId) + 'static) -> Self {
        Self(Rc::new(f))
    }

    #[inline]
    pub fn call(&self, id: AnimatableId) {
        (self.0)(id)
    }
}

impl fmt::Debug for AnimatableCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AnimatableCallback(..)")
    }
}

#[derive(Debug)]
pub struct Animatable {
    id: AnimatableId,
    targets: Vec<TargetId>,
    from_frame: f32,
    to_frame: f32,
    loop_animation: bool,
    speed_ratio: f32,
    weight: f32,
    dispose_on_end: bool,
    animation_started: bool,
    paused: bool,
    finished: bool,
    sync_root: Option<AnimatableId>,
    runtime_animations: Vec<RuntimeAnimation>,
    on_animation_end: Option<AnimatableCallback>,
    on_animation_loop: Option<AnimatableCallback>,
    waiters: Vec<oneshot::Sender<()>>,
}

impl Animatable {
    /// A `from_frame` past `to_frame` is read as reverse playback: the bounds
    /// are swapped and the speed ratio negated.
    pub(crate) fn new(id: AnimatableId, cfg: &AnimatableCfg, highest_frame: f32) -> Self {
        let mut from = cfg.from_frame;
        let mut to = cfg.to_frame.unwrap_or(highest_frame);
        let mut speed = cfg.speed_ratio;
        if from > to {
            std::mem::swap(&mut from, &mut to);
            speed = -speed;
        }
        Self {
            id,
            targets: Vec::new(),
            from_frame: from,
            to_frame: to,
            loop_animation: cfg.loop_animation,
            speed_ratio: speed,
            weight: cfg.weight,
            dispose_on_end: cfg.dispose_on_end,
            animation_started: false,
            paused: false,
            finished: false,
            sync_root: None,
            runtime_animations: Vec::new(),
            on_animation_end: None,
            on_animation_loop: None,
            waiters: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> AnimatableId {
        self.id
    }

    pub fn targets(&self) -> &[TargetId] {
        &self.targets
    }

    #[inline]
    pub fn from_frame(&self) -> f32 {
        self.from_frame
    }

    #[inline]
    pub fn to_frame(&self) -> f32 {
        self.to_frame
    }

    #[inline]
    pub fn loop_animation(&self) -> bool {
        self.loop_animation
    }

    pub fn set_loop_animation(&mut self, loop_animation: bool) {
        self.loop_animation = loop_animation;
    }

    #[inline]
    pub fn speed_ratio(&self) -> f32 {
        self.speed_ratio
    }

    pub fn set_speed_ratio(&mut self, speed: f32) {
        self.speed_ratio = speed;
    }

    #[inline]
    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    #[inline]
    pub fn dispose_on_end(&self) -> bool {
        self.dispose_on_end
    }

    #[inline]
    pub fn animation_started(&self) -> bool {
        self.animation_started
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Ended and no longer ticked (kept around when `dispose_on_end` is off).
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[inline]
    pub fn sync_root(&self) -> Option<AnimatableId> {
        self.sync_root
    }

    /// The live runtime animations.
    pub fn runtime_animations(&self) -> &[RuntimeAnimation] {
        &self.runtime_animations
    }

    /// Representative frame: the first runtime animation's current frame.
    /// Synchronized animatables evaluate at their root's normalized position,
    /// so this already reflects the sync.
    pub fn master_frame(&self) -> f32 {
        self.runtime_animations
            .first()
            .map(RuntimeAnimation::current_frame)
            .unwrap_or(self.start_frame())
    }

    /// Normalized position of the master frame in `[from, to]`.
    pub fn progress(&self) -> f32 {
        let range = self.to_frame - self.from_frame;
        if range <= 0.0 {
            return 0.0;
        }
        (self.master_frame() - self.from_frame) / range
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn enable_blending(&mut self, speed: f32) {
        for ra in &mut self.runtime_animations {
            ra.enable_blending(speed);
        }
    }

    pub fn disable_blending(&mut self) {
        for ra in &mut self.runtime_animations {
            ra.disable_blending();
        }
    }

    pub fn on_animation_end(&mut self, f: impl Fn(AnimatableId) + 'static) {
        self.on_animation_end = Some(AnimatableCallback::new(f));
    }

    pub fn on_animation_loop(&mut self, f: impl Fn(AnimatableId) + 'static) {
        self.on_animation_loop = Some(AnimatableCallback::new(f));
    }

    fn start_frame(&self) -> f32 {
        if self.speed_ratio < 0.0 {
            self.to_frame
        } else {
            self.from_frame
        }
    }

    /// Attach one runtime animation per animation for `target`, skipping
    /// animations already bound to that target. Returns how many were added.
    pub(crate) fn append(
        &mut self,
        target: TargetId,
        animations: &[Rc<Animation>],
        store: &TargetStore,
    ) -> usize {
        let start = self.start_frame();
        let mut added = 0;
        for anim in animations {
            let bound = self
                .runtime_animations
                .iter()
                .any(|ra| ra.target() == target && Rc::ptr_eq(ra.animation(), anim));
            if bound {
                continue;
            }
            self.runtime_animations.push(RuntimeAnimation::new(
                target,
                Rc::clone(anim),
                self.id,
                start,
                store,
            ));
            added += 1;
        }
        if added > 0 && !self.targets.contains(&target) {
            self.targets.push(target);
        }
        added
    }

    /// Advance every runtime animation by `delta_ms` of wall time.
    /// Returns whether any is still running.
    pub(crate) fn tick(&mut self, delta_ms: f32, ctx: &mut TickContext<'_>) -> bool {
        self.drive(ctx, |ra| {
            Advance::By(delta_ms * ra.animation().frames_per_second() / 1000.0)
        })
    }

    /// Evaluate every runtime animation at `frame` (sync follower path).
    pub(crate) fn tick_synced(&mut self, frame: f32, ctx: &mut TickContext<'_>) -> bool {
        self.drive(ctx, |_| Advance::To(frame))
    }

    fn drive(
        &mut self,
        ctx: &mut TickContext<'_>,
        advance: impl Fn(&RuntimeAnimation) -> Advance,
    ) -> bool {
        if self.paused {
            return true;
        }
        self.animation_started = true;
        let mut running = false;
        let mut wrapped = false;
        for ra in &mut self.runtime_animations {
            let step = advance(ra);
            running |= ra.animate(
                step,
                self.from_frame,
                self.to_frame,
                self.loop_animation,
                self.speed_ratio,
                self.weight,
                ctx,
            );
            wrapped |= ra.wrapped();
        }
        if wrapped {
            self.notify_loop(ctx.events);
        }
        running
    }

    /// Whether a loop restart could make progress. A zero-length range never
    /// loops.
    pub(crate) fn can_loop(&self) -> bool {
        self.to_frame > self.from_frame
            && self
                .runtime_animations
                .iter()
                .any(|ra| !ra.is_halted() && ra.animation().loop_mode() != LoopMode::Constant)
    }

    pub(crate) fn notify_loop(&self, events: &mut Vec<CoreEvent>) {
        events.push(CoreEvent::AnimationLooped {
            animatable: self.id,
        });
        if let Some(cb) = &self.on_animation_loop {
            cb.call(self.id);
        }
    }

    /// Rewind to the start frame and play again.
    pub(crate) fn restart(&mut self, store: &mut TargetStore) {
        let start = self.start_frame();
        for ra in &mut self.runtime_animations {
            ra.reset(start, false, store);
        }
        self.paused = false;
        self.finished = false;
    }

    pub(crate) fn reset(&mut self, restore_original: bool, store: &mut TargetStore) {
        let start = self.start_frame();
        for ra in &mut self.runtime_animations {
            ra.reset(start, restore_original, store);
        }
    }

    pub(crate) fn go_to_frame(
        &mut self,
        frame: f32,
        store: &mut TargetStore,
        opts: &InterpolationOptions,
    ) {
        for ra in &mut self.runtime_animations {
            ra.go_to_frame(frame, self.from_frame, self.to_frame, store, opts);
        }
    }

    /// Remove runtime animations matching `animation` (any when `None`) and
    /// `target_mask` (any when `None`). Returns how many were removed.
    pub(crate) fn stop(
        &mut self,
        animation: Option<&str>,
        target_mask: Option<&dyn Fn(TargetId) -> bool>,
    ) -> usize {
        let before = self.runtime_animations.len();
        self.runtime_animations.retain_mut(|ra| {
            let name_hit = animation.map_or(true, |n| ra.animation().name() == n);
            let target_hit = target_mask.map_or(true, |mask| mask(ra.target()));
            if name_hit && target_hit {
                ra.dispose();
                false
            } else {
                true
            }
        });
        let runtime_animations = &self.runtime_animations;
        self.targets
            .retain(|t| runtime_animations.iter().any(|ra| ra.target() == *t));
        before - self.runtime_animations.len()
    }

    pub(crate) fn set_sync_root(&mut self, root: Option<AnimatableId>) {
        self.sync_root = root;
    }

    pub(crate) fn add_waiter(&mut self, tx: oneshot::Sender<()>) {
        self.waiters.push(tx);
    }

    /// End of playback: fire `on_animation_end` and resolve waiters.
    pub(crate) fn finish(&mut self, events: &mut Vec<CoreEvent>) {
        self.finished = true;
        events.push(CoreEvent::AnimationEnded {
            animatable: self.id,
        });
        if let Some(cb) = &self.on_animation_end {
            cb.call(self.id);
        }
        self.resolve_waiters();
    }

    pub(crate) fn dispose(&mut self) {
        for ra in &mut self.runtime_animations {
            ra.dispose();
        }
        self.runtime_animations.clear();
        self.targets.clear();
        self.finished = true;
        self.resolve_waiters();
    }

    fn resolve_waiters(&mut self) {
        for tx in self.waiters.drain(..) {
            // A dropped receiver just means nobody is waiting anymore.
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_range_plays_backwards() {
        let cfg = AnimatableCfg::default().range(30.0, 10.0);
        let a = Animatable::new(AnimatableId(3), &cfg, 60.0);
        assert_eq!(a.from_frame(), 10.0);
        assert_eq!(a.to_frame(), 30.0);
        assert_eq!(a.speed_ratio(), -1.0);
        assert_eq!(a.master_frame(), 30.0);
        assert_eq!(a.progress(), 1.0);
    }

    #[test]
    fn default_range_ends_at_highest_frame() {
        let a = Animatable::new(AnimatableId(0), &AnimatableCfg::default(), 48.0);
        assert_eq!(a.to_frame(), 48.0);
        assert_eq!(a.weight(), -1.0);
        assert!(a.dispose_on_end());
        assert_eq!(a.progress(), 0.0);
    }
}
