//! Engine: owns targets and animatables and runs the per-tick animate phase.
//!
//! Per `update`:
//! 1. apply queued commands, pick the delta (constant-delta flag, time scale)
//! 2. split into lockstep sub-steps when enabled
//! 3. per step: tick animatables in dependency order (sync roots before their
//!    followers), commit the accumulator once, then run finish paths
//!
//! Finish paths and lifecycle calls never run while animatables are being
//! iterated, so a callback-triggered stop or dispose lands between steps.

use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{self, FutureExt, LocalBoxFuture};
use hashbrown::HashSet;
use indexmap::IndexMap;
use log::{debug, trace, warn};

use kinema_api_core::Value;

use crate::accumulate::Accumulator;
use crate::animatable::{Animatable, AnimatableCfg};
use crate::animation::Animation;
use crate::config::Config;
use crate::ids::{AnimatableId, IdAllocator, TargetId};
use crate::inputs::{AnimatableCommand, Inputs};
use crate::outputs::{CoreEvent, Outputs};
use crate::runtime::TickContext;
use crate::target::{Target, TargetStore};

#[derive(Debug)]
pub struct Engine {
    cfg: Config,
    ids: IdAllocator,
    targets: TargetStore,
    animatables: IndexMap<AnimatableId, Animatable>,

    // Per-tick state
    outputs: Outputs,
    /// Events raised outside the animate phase; drained into the next outputs.
    pending: Vec<CoreEvent>,
    lockstep_acc_ms: f32,
    event_budget: usize,
    dropped_events: usize,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Engine {
    pub fn new(cfg: Config) -> Self {
        Self {
            event_budget: cfg.max_events_per_tick,
            cfg,
            ids: IdAllocator::new(),
            targets: TargetStore::new(),
            animatables: IndexMap::new(),
            outputs: Outputs::default(),
            pending: Vec::new(),
            lockstep_acc_ms: 0.0,
            dropped_events: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.cfg
    }

    /// Outputs of the last `update`.
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    // ----- targets -----

    pub fn create_target(&mut self, target: Target) -> TargetId {
        let id = self.ids.alloc_target();
        self.targets.insert(id, target);
        id
    }

    /// Remove a target. Runtime animations still bound to it stop on their
    /// next tick.
    pub fn remove_target(&mut self, id: TargetId) -> Option<Target> {
        self.targets.remove(id)
    }

    pub fn set_property(&mut self, id: TargetId, property: &str, value: Value) -> bool {
        self.targets.set_property(id, property, value)
    }

    pub fn property(&self, id: TargetId, property: &str) -> Option<&Value> {
        self.targets.property(id, property)
    }

    pub fn targets(&self) -> &TargetStore {
        &self.targets
    }

    // ----- animatables -----

    /// Start playing `animations` on `target`.
    pub fn begin_animation(
        &mut self,
        target: TargetId,
        animations: &[Rc<Animation>],
        cfg: AnimatableCfg,
    ) -> AnimatableId {
        let highest = animations
            .iter()
            .map(|a| a.highest_frame())
            .fold(0.0f32, f32::max);
        let id = self.ids.alloc_animatable();
        let mut animatable = Animatable::new(id, &cfg, highest);
        animatable.append(target, animations, &self.targets);
        debug!(
            "animatable {:?}: {} animation(s) on {:?}, frames {}..{}, loop={}",
            id,
            animatable.runtime_animations().len(),
            target,
            animatable.from_frame(),
            animatable.to_frame(),
            animatable.loop_animation()
        );
        self.animatables.insert(id, animatable);
        id
    }

    /// Start playing over the named range of the first animation defining it.
    /// Returns `None` when no animation has that range.
    pub fn begin_range(
        &mut self,
        target: TargetId,
        animations: &[Rc<Animation>],
        range: &str,
        cfg: AnimatableCfg,
    ) -> Option<AnimatableId> {
        let (from, to) = animations
            .iter()
            .find_map(|a| a.get_range(range))
            .map(|r| (r.from, r.to))?;
        Some(self.begin_animation(target, animations, cfg.range(from, to)))
    }

    /// Attach more animations for `target` to a running animatable.
    pub fn append_animations(
        &mut self,
        id: AnimatableId,
        target: TargetId,
        animations: &[Rc<Animation>],
    ) -> usize {
        match self.animatables.get_mut(&id) {
            Some(a) => a.append(target, animations, &self.targets),
            None => 0,
        }
    }

    pub fn animatable(&self, id: AnimatableId) -> Option<&Animatable> {
        self.animatables.get(&id)
    }

    pub fn animatable_mut(&mut self, id: AnimatableId) -> Option<&mut Animatable> {
        self.animatables.get_mut(&id)
    }

    pub fn animatables(&self) -> impl Iterator<Item = &Animatable> {
        self.animatables.values()
    }

    pub fn animatables_for_target(&self, target: TargetId) -> Vec<AnimatableId> {
        self.animatables
            .values()
            .filter(|a| a.targets().contains(&target))
            .map(Animatable::id)
            .collect()
    }

    /// Animatables the next update will tick.
    pub fn active_animatables(&self) -> Vec<AnimatableId> {
        self.animatables
            .values()
            .filter(|a| !a.is_finished())
            .map(Animatable::id)
            .collect()
    }

    pub fn pause(&mut self, id: AnimatableId) -> bool {
        self.with_animatable(id, Animatable::pause)
    }

    pub fn resume(&mut self, id: AnimatableId) -> bool {
        self.with_animatable(id, Animatable::resume)
    }

    pub fn set_speed_ratio(&mut self, id: AnimatableId, speed: f32) -> bool {
        self.with_animatable(id, |a| a.set_speed_ratio(speed))
    }

    pub fn set_weight(&mut self, id: AnimatableId, weight: f32) -> bool {
        self.with_animatable(id, |a| a.set_weight(weight))
    }

    /// Ease targets toward new values; `None` uses the configured default speed.
    pub fn enable_blending(&mut self, id: AnimatableId, speed: Option<f32>) -> bool {
        let speed = speed.unwrap_or(self.cfg.default_blending_speed);
        self.with_animatable(id, |a| a.enable_blending(speed))
    }

    pub fn disable_blending(&mut self, id: AnimatableId) -> bool {
        self.with_animatable(id, Animatable::disable_blending)
    }

    fn with_animatable(&mut self, id: AnimatableId, f: impl FnOnce(&mut Animatable)) -> bool {
        match self.animatables.get_mut(&id) {
            Some(a) => {
                f(a);
                true
            }
            None => false,
        }
    }

    /// Rewind to the start frame and play again (also revives a finished,
    /// undisposed animatable).
    pub fn restart(&mut self, id: AnimatableId) -> bool {
        match self.animatables.get_mut(&id) {
            Some(a) => {
                a.restart(&mut self.targets);
                debug!("animatable {id:?} restarted");
                true
            }
            None => false,
        }
    }

    /// Rewind without resuming; optionally restore pre-animation values.
    pub fn reset(&mut self, id: AnimatableId, restore_original: bool) -> bool {
        match self.animatables.get_mut(&id) {
            Some(a) => {
                a.reset(restore_original, &mut self.targets);
                true
            }
            None => false,
        }
    }

    /// Jump every runtime animation to `frame` and write the values to the
    /// targets immediately.
    pub fn go_to_frame(&mut self, id: AnimatableId, frame: f32) -> bool {
        let opts = self.cfg.interpolation;
        match self.animatables.get_mut(&id) {
            Some(a) => {
                a.go_to_frame(frame, &mut self.targets, &opts);
                true
            }
            None => false,
        }
    }

    /// Stop runtime animations matching `animation` and `target_mask` (each
    /// matches everything when `None`). Stopping the last one ends and
    /// disposes the animatable. Returns how many were stopped.
    pub fn stop(
        &mut self,
        id: AnimatableId,
        animation: Option<&str>,
        target_mask: Option<&dyn Fn(TargetId) -> bool>,
    ) -> usize {
        let Some(a) = self.animatables.get_mut(&id) else {
            return 0;
        };
        let removed = a.stop(animation, target_mask);
        if removed > 0 && a.runtime_animations().is_empty() {
            if !a.is_finished() {
                a.finish(&mut self.pending);
            }
            self.dispose(id);
        }
        removed
    }

    /// Stop animations driving `target` across every animatable.
    pub fn stop_animation(&mut self, target: TargetId, animation: Option<&str>) -> usize {
        let mask = move |t: TargetId| t == target;
        self.animatables_for_target(target)
            .into_iter()
            .map(|id| self.stop(id, animation, Some(&mask)))
            .sum()
    }

    /// Evaluate `id` at its root's normalized position from now on; `None`
    /// detaches. Refuses unknown roots and sync cycles.
    pub fn sync_with(&mut self, id: AnimatableId, root: Option<AnimatableId>) -> bool {
        if !self.animatables.contains_key(&id) {
            return false;
        }
        if let Some(root) = root {
            if !self.animatables.contains_key(&root) {
                warn!("sync root {root:?} for {id:?} does not exist");
                return false;
            }
            let mut cursor = Some(root);
            let mut hops = 0;
            while let Some(current) = cursor {
                if current == id {
                    warn!("syncing {id:?} with {root:?} would form a cycle");
                    return false;
                }
                hops += 1;
                if hops > self.animatables.len() {
                    break;
                }
                cursor = self.animatables.get(&current).and_then(Animatable::sync_root);
            }
        }
        if let Some(a) = self.animatables.get_mut(&id) {
            a.set_sync_root(root);
        }
        debug!("animatable {id:?} synced with {root:?}");
        true
    }

    /// Remove an animatable now; waiters resolve and followers detach.
    pub fn dispose(&mut self, id: AnimatableId) -> bool {
        let Some(mut a) = self.animatables.shift_remove(&id) else {
            return false;
        };
        a.dispose();
        for other in self.animatables.values_mut() {
            if other.sync_root() == Some(id) {
                other.set_sync_root(None);
            }
        }
        self.pending
            .push(CoreEvent::AnimatableDisposed { animatable: id });
        debug!("animatable {id:?} disposed");
        true
    }

    /// Resolves once the animatable has finished or been disposed;
    /// immediately when it already has.
    pub fn wait_async(&mut self, id: AnimatableId) -> LocalBoxFuture<'static, ()> {
        match self.animatables.get_mut(&id) {
            Some(a) if !a.is_finished() => {
                let (tx, rx) = oneshot::channel();
                a.add_waiter(tx);
                async move {
                    // Cancellation (sender dropped) counts as done as well.
                    let _ = rx.await;
                }
                .boxed_local()
            }
            _ => future::ready(()).boxed_local(),
        }
    }

    // ----- ticking -----

    /// Advance by `delta_ms` of wall time and return this tick's outputs.
    pub fn update(&mut self, delta_ms: f32, inputs: Inputs) -> &Outputs {
        self.outputs.reset();
        self.event_budget = self.cfg.max_events_per_tick;
        self.dropped_events = 0;

        for cmd in inputs.commands {
            self.apply_command(cmd);
        }
        self.flush_pending();

        let delta = self.frame_delta(delta_ms);
        let step_ms = self.cfg.lockstep_step_ms;
        if self.cfg.deterministic_lockstep && step_ms > 0.0 {
            for _ in 0..self.lockstep_steps(delta) {
                self.step(step_ms);
            }
        } else {
            self.step(delta);
        }

        if self.dropped_events > 0 {
            let message = format!(
                "dropped {} animation event(s) over the per-tick limit of {}",
                self.dropped_events, self.cfg.max_events_per_tick
            );
            warn!("{message}");
            self.outputs.record_warning(message);
        }
        &self.outputs
    }

    fn frame_delta(&self, delta_ms: f32) -> f32 {
        let raw = if self.cfg.use_constant_delta {
            self.cfg.constant_delta_ms
        } else {
            delta_ms
        };
        let scaled = raw * self.cfg.time_scale;
        if scaled.is_finite() {
            scaled
        } else {
            0.0
        }
    }

    /// Fixed sub-steps due this frame. Time beyond `lockstep_max_steps` is
    /// dropped instead of carried over.
    fn lockstep_steps(&mut self, delta_ms: f32) -> u32 {
        let step = self.cfg.lockstep_step_ms;
        self.lockstep_acc_ms = (self.lockstep_acc_ms + delta_ms).max(0.0);
        let due = (self.lockstep_acc_ms / step).floor();
        self.lockstep_acc_ms -= due * step;
        let steps = (due as u32).min(self.cfg.lockstep_max_steps);
        trace!(
            "lockstep: {steps} of {due} step(s) at {step}ms, {}ms carried",
            self.lockstep_acc_ms
        );
        steps
    }

    fn step(&mut self, delta_ms: f32) {
        let order = self.tick_order();
        let mut acc = Accumulator::new(self.cfg.interpolation);
        let mut ended = Vec::new();

        let mut ctx = TickContext::new(
            &self.targets,
            &mut acc,
            &mut self.outputs.events,
            self.cfg.interpolation,
            self.event_budget,
        );
        for (id, root) in order {
            let root_progress = root
                .and_then(|r| self.animatables.get(&r))
                .map(Animatable::progress);
            let Some(a) = self.animatables.get_mut(&id) else {
                continue;
            };
            let running = match root_progress {
                Some(p) => {
                    let frame = a.from_frame() + p * (a.to_frame() - a.from_frame());
                    a.tick_synced(frame, &mut ctx)
                }
                None => a.tick(delta_ms, &mut ctx),
            };
            if !running {
                ended.push(id);
            }
        }
        self.event_budget = ctx.event_budget;
        self.dropped_events += ctx.dropped_events;

        for (key, value) in acc.finalize() {
            if self
                .targets
                .set_property(key.target, &key.property, value.clone())
            {
                self.outputs.record_change(key.target, key.property, value);
            }
        }

        for id in ended {
            self.finish_path(id);
        }
        self.flush_pending();
    }

    /// Active animatables with the sync root each one follows this step.
    /// Unsynchronized ones come first, followers after their root; followers
    /// caught in a cycle run unsynchronized.
    fn tick_order(&self) -> Vec<(AnimatableId, Option<AnimatableId>)> {
        let mut order = Vec::with_capacity(self.animatables.len());
        let mut placed = HashSet::new();
        let mut waiting = Vec::new();
        for a in self.animatables.values().filter(|a| !a.is_finished()) {
            match a.sync_root() {
                Some(root) if root != a.id() && self.animatables.contains_key(&root) => {
                    waiting.push((a.id(), root));
                }
                _ => {
                    order.push((a.id(), None));
                    placed.insert(a.id());
                }
            }
        }
        while !waiting.is_empty() {
            let before = waiting.len();
            waiting.retain(|&(id, root)| {
                let root_ready = placed.contains(&root)
                    || self
                        .animatables
                        .get(&root)
                        .is_some_and(Animatable::is_finished);
                if root_ready {
                    order.push((id, Some(root)));
                    placed.insert(id);
                }
                !root_ready
            });
            if waiting.len() == before {
                break;
            }
        }
        for (id, root) in waiting {
            debug!("animatable {id:?} cannot follow {root:?} (cycle), ticking unsynchronized");
            order.push((id, None));
        }
        order
    }

    /// Nothing left running: loop back if possible, otherwise end (and
    /// dispose when configured to).
    fn finish_path(&mut self, id: AnimatableId) {
        let Some(a) = self.animatables.get_mut(&id) else {
            return;
        };
        if a.loop_animation() && a.can_loop() {
            a.restart(&mut self.targets);
            a.notify_loop(&mut self.pending);
            debug!("animatable {id:?} looped");
            return;
        }
        a.finish(&mut self.pending);
        debug!("animatable {id:?} ended");
        if a.dispose_on_end() {
            self.dispose(id);
        }
    }

    fn flush_pending(&mut self) {
        self.outputs.events.append(&mut self.pending);
    }

    fn apply_command(&mut self, cmd: AnimatableCommand) {
        let handled = match cmd {
            AnimatableCommand::Pause { animatable } => self.pause(animatable),
            AnimatableCommand::Resume { animatable } => self.resume(animatable),
            AnimatableCommand::Restart { animatable } => self.restart(animatable),
            AnimatableCommand::Reset {
                animatable,
                restore_original,
            } => self.reset(animatable, restore_original),
            AnimatableCommand::GoToFrame { animatable, frame } => {
                self.go_to_frame(animatable, frame)
            }
            AnimatableCommand::SetSpeedRatio { animatable, speed } => {
                self.set_speed_ratio(animatable, speed)
            }
            AnimatableCommand::SetWeight { animatable, weight } => {
                self.set_weight(animatable, weight)
            }
            AnimatableCommand::Stop {
                animatable,
                animation,
                target,
            } => {
                let exists = self.animatables.contains_key(&animatable);
                match target {
                    Some(t) => {
                        let mask = move |candidate: TargetId| candidate == t;
                        self.stop(animatable, animation.as_deref(), Some(&mask));
                    }
                    None => {
                        self.stop(animatable, animation.as_deref(), None);
                    }
                }
                exists
            }
            AnimatableCommand::SyncWith { animatable, root } => self.sync_with(animatable, root),
            AnimatableCommand::Dispose { animatable } => self.dispose(animatable),
        };
        if !handled {
            debug!("command ignored: animatable missing or request refused");
        }
    }
}
