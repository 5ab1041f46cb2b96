//! Benchmarks for the per-tick animate phase.
//!
//! Run with: cargo bench -p kinema-animation-core

use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kinema_animation_core::{AnimatableCfg, Animation, Engine, Inputs, Target};

const TARGETS: usize = 500;

fn fixture(name: &str) -> Rc<Animation> {
    let json = kinema_test_fixtures::animations::json(name).expect("fixture json");
    Rc::new(Animation::from_json(&json).expect("fixture parses"))
}

/// One animatable per target, each driving every fixture track.
fn populated_engine() -> Engine {
    let anims: Vec<Rc<Animation>> = kinema_test_fixtures::animations::keys()
        .iter()
        .map(|name| fixture(name))
        .collect();
    let mut engine = Engine::default();
    for i in 0..TARGETS {
        let t = engine.create_target(Target::new(format!("obj-{i}")));
        engine.begin_animation(t, &anims, AnimatableCfg::looping());
    }
    engine
}

fn bench_update(c: &mut Criterion) {
    c.bench_function("update_500_targets", |b| {
        let mut engine = populated_engine();
        b.iter(|| {
            let out = engine.update(black_box(16.0), Inputs::default());
            black_box(out.changes.len());
        });
    });
}

fn bench_blended_update(c: &mut Criterion) {
    c.bench_function("update_500_targets_two_weighted_layers", |b| {
        let walk = fixture("walk-cycle");
        let mut engine = Engine::default();
        for i in 0..TARGETS {
            let t = engine.create_target(Target::new(format!("obj-{i}")));
            engine.begin_animation(t, &[walk.clone()], AnimatableCfg::looping().weighted(0.4));
            engine.begin_animation(
                t,
                &[walk.clone()],
                AnimatableCfg::looping().weighted(0.6).speed(1.5),
            );
        }
        b.iter(|| {
            let out = engine.update(black_box(16.0), Inputs::default());
            black_box(out.changes.len());
        });
    });
}

criterion_group!(benches, bench_update, bench_blended_update);
criterion_main!(benches);
