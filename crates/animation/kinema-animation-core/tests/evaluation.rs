use kinema_animation_core::{
    Animation, AnimationError, AnimationEvent, InterpolationOptions, KeyCursor, Keyframe,
    LoopMode, Value, ValueKind,
};
use kinema_api_core::math::mat4_compose;

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn approx_slice(a: &[f32], b: &[f32], eps: f32) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        approx(*x, *y, eps);
    }
}

fn fixture(name: &str) -> Animation {
    let json = kinema_test_fixtures::animations::json(name).expect("fixture json");
    Animation::from_json(&json).expect("fixture parses")
}

fn scalar(name: &str, mode: LoopMode, keys: &[(f32, f32)]) -> Animation {
    let mut anim = Animation::new(name, "x", 30.0, ValueKind::Scalar, mode);
    anim.set_keys(
        keys.iter()
            .map(|(f, v)| Keyframe::new(*f, Value::Scalar(*v)))
            .collect(),
    )
    .unwrap();
    anim
}

/// it should return each key's literal value at its frame for every fixture
#[test]
fn exact_at_key_frames() {
    let opts = InterpolationOptions::default();
    for name in kinema_test_fixtures::animations::keys() {
        let anim = fixture(&name);
        let mut cursor = KeyCursor::default();
        for key in anim.keys() {
            let v = anim.evaluate(key.frame, &mut cursor, &opts).unwrap();
            assert_eq!(v, key.value, "{name} at frame {}", key.frame);
        }
        // Backwards through the same cursor as well.
        for key in anim.keys().iter().rev() {
            let v = anim.evaluate(key.frame, &mut cursor, &opts).unwrap();
            assert_eq!(v, key.value, "{name} at frame {} (reverse)", key.frame);
        }
    }
}

/// it should clamp frames outside the keyed span to the first/last key
#[test]
fn clamps_outside_keys() {
    let anim = scalar("a", LoopMode::Cycle, &[(10.0, 1.0), (20.0, 3.0)]);
    let opts = InterpolationOptions::default();
    assert_eq!(anim.value_at(-5.0, &opts).unwrap(), Value::Scalar(1.0));
    assert_eq!(anim.value_at(99.0, &opts).unwrap(), Value::Scalar(3.0));
    approx(anim.value_at(15.0, &opts).unwrap().as_scalar().unwrap(), 2.0, 1e-6);
}

/// it should hold step keys until the next key
#[test]
fn step_keys_hold() {
    let anim = fixture("tint");
    let opts = InterpolationOptions::default();
    assert_eq!(
        anim.value_at(5.0, &opts).unwrap(),
        Value::Color4([1.0, 0.0, 0.0, 1.0])
    );
    let Value::Color4(c) = anim.value_at(15.0, &opts).unwrap() else {
        panic!("color4 expected");
    };
    approx_slice(&c, &[0.0, 0.5, 0.5, 0.75], 1e-6);
}

/// it should use cubic Hermite when both bracketing keys carry tangents
#[test]
fn hermite_with_tangents() {
    let anim = fixture("bounce");
    let v = anim
        .value_at(6.0, &InterpolationOptions::default())
        .unwrap()
        .as_scalar()
        .unwrap();
    // p0=0, m0=0.2*12, p1=2, m1=0 at t=0.5: h10=0.125, h01=0.5
    approx(v, 2.4 * 0.125 + 2.0 * 0.5, 1e-5);
}

/// it should slerp quaternions and stay on the unit sphere
#[test]
fn quaternion_slerp() {
    let anim = fixture("spin");
    let Value::Quaternion(q) = anim.value_at(15.0, &InterpolationOptions::default()).unwrap()
    else {
        panic!("quaternion expected");
    };
    let half = std::f32::consts::PI / 8.0;
    approx_slice(&q, &[0.0, half.sin(), 0.0, half.cos()], 1e-5);
    let norm = q.iter().map(|c| c * c).sum::<f32>().sqrt();
    approx(norm, 1.0, 1e-6);
}

/// it should decompose matrices only when precise interpolation is on
#[test]
fn matrix_interpolation_modes() {
    let s = std::f32::consts::FRAC_1_SQRT_2;
    let start = mat4_compose([1.0; 3], [0.0, 0.0, 0.0, 1.0], [0.0, 0.0, 0.0]);
    let end = mat4_compose([1.0; 3], [0.0, 0.0, s, s], [4.0, 0.0, 0.0]);
    let mut anim = Animation::new("turn", "world", 30.0, ValueKind::Matrix, LoopMode::Cycle);
    anim.set_keys(vec![
        Keyframe::new(0.0, Value::Matrix(start)),
        Keyframe::new(10.0, Value::Matrix(end)),
    ])
    .unwrap();

    let precise = InterpolationOptions {
        precise_matrix_interpolation: true,
    };
    let Value::Matrix(m) = anim.value_at(5.0, &precise).unwrap() else {
        panic!("matrix expected");
    };
    approx(m[0], s, 1e-5);
    approx(m[12], 2.0, 1e-5);

    let cheap = InterpolationOptions {
        precise_matrix_interpolation: false,
    };
    let Value::Matrix(m) = anim.value_at(5.0, &cheap).unwrap() else {
        panic!("matrix expected");
    };
    approx(m[0], 0.5, 1e-6);
    approx(m[12], 2.0, 1e-6);
}

/// it should reject unsorted, duplicate and mistyped keys at authoring time
#[test]
fn set_keys_validates() {
    let mut anim = Animation::new("a", "x", 30.0, ValueKind::Scalar, LoopMode::Cycle);
    let unsorted = vec![
        Keyframe::new(5.0, Value::Scalar(0.0)),
        Keyframe::new(1.0, Value::Scalar(1.0)),
    ];
    assert!(matches!(
        anim.set_keys(unsorted),
        Err(AnimationError::InvalidKeyframeData { .. })
    ));
    let duplicate = vec![
        Keyframe::new(1.0, Value::Scalar(0.0)),
        Keyframe::new(1.0, Value::Scalar(1.0)),
    ];
    assert!(anim.set_keys(duplicate).is_err());
    let mistyped = vec![Keyframe::new(0.0, Value::vec3(0.0, 0.0, 0.0))];
    assert!(anim.set_keys(mistyped).is_err());
    let bad_tangent = vec![Keyframe::new(0.0, Value::Scalar(0.0))
        .with_tangents(Value::Scalar(0.0), Value::vec3(0.0, 0.0, 0.0))];
    assert!(anim.set_keys(bad_tangent).is_err());
    // Nothing slipped in.
    assert!(anim.keys().is_empty());
    assert!(matches!(
        anim.value_at(0.0, &InterpolationOptions::default()),
        Err(AnimationError::EmptyAnimationTrack { .. })
    ));
}

/// it should keep ranges by name and report unknown names as None
#[test]
fn ranges_lookup_and_delete() {
    let mut anim = scalar(
        "a",
        LoopMode::Cycle,
        &[(0.0, 0.0), (10.0, 1.0), (20.0, 2.0), (30.0, 3.0)],
    );
    anim.create_range("mid", 5.0, 25.0).unwrap();
    anim.create_range("mid", 0.0, 1.0).unwrap();
    assert_eq!(anim.get_range("mid").map(|r| (r.from, r.to)), Some((5.0, 25.0)));
    assert!(anim.get_range("missing").is_none());
    assert!(matches!(
        anim.create_range("bad", 9.0, 3.0),
        Err(AnimationError::InvalidRange { .. })
    ));

    let removed = anim.delete_range("mid", true).unwrap();
    assert_eq!(removed.length(), 20.0);
    let frames: Vec<f32> = anim.keys().iter().map(|k| k.frame).collect();
    assert_eq!(frames, vec![0.0, 30.0]);
    assert!(anim.delete_range("mid", false).is_none());
}

/// it should keep events ordered by frame and remove them by frame
#[test]
fn events_sorted_and_removable() {
    let mut anim = scalar("a", LoopMode::Cycle, &[(0.0, 0.0), (30.0, 1.0)]);
    anim.add_event(AnimationEvent::new(20.0, false).named("late"))
        .unwrap();
    anim.add_event(AnimationEvent::new(5.0, true).named("early"))
        .unwrap();
    anim.add_event(AnimationEvent::new(20.0, false)).unwrap();
    let frames: Vec<f32> = anim.events().iter().map(|e| e.frame).collect();
    assert_eq!(frames, vec![5.0, 20.0, 20.0]);
    assert_eq!(anim.remove_events(20.0), 2);
    assert_eq!(anim.remove_events(7.0), 0);
    assert!(anim.add_event(AnimationEvent::new(f32::NAN, false)).is_err());
}

/// it should leave the source untouched when a clone is re-keyed
#[test]
fn clone_is_independent() {
    let anim = scalar("a", LoopMode::Cycle, &[(0.0, 0.0), (10.0, 1.0)]);
    let mut copy = anim.clone();
    copy.set_keys(vec![Keyframe::new(0.0, Value::Scalar(5.0))])
        .unwrap();
    assert_eq!(anim.keys().len(), 2);
    assert_eq!(anim.highest_frame(), 10.0);
    assert_eq!(copy.highest_frame(), 0.0);
}
