//! Blending utilities for Value types.
//! - component lerp for scalars, vectors, colors and sizes
//! - quaternion slerp (shortest-arc)
//! - matrix blending: decomposed TRS or plain component lerp
//! - cubic Hermite with tangents
//! - additive offsets for relative looping

use crate::math::{
    dot4, hermite_f32, lerp_array, lerp_f32, mat4_compose, mat4_decompose, negate4,
    normalize_quat, quat_inverse, quat_mul, quat_pow, slerp,
};
use crate::Value;

/// Blend two matrices by decomposing into scale/rotation/translation.
/// Falls back to component lerp when either side cannot be decomposed.
fn decompose_lerp(a: &[f32; 16], b: &[f32; 16], t: f32) -> [f32; 16] {
    match (mat4_decompose(a), mat4_decompose(b)) {
        (Some((sa, ra, ta)), Some((sb, rb, tb))) => mat4_compose(
            lerp_array(&sa, &sb, t),
            slerp(ra, rb, t),
            lerp_array(&ta, &tb, t),
        ),
        _ => lerp_array(a, b, t),
    }
}

/// Interpolate two Values of the same kind. `precise_matrix` selects the
/// decomposed path for matrices. Mismatched kinds return `a` (fail-soft).
pub fn lerp_values(a: &Value, b: &Value, t: f32, precise_matrix: bool) -> Value {
    match (a, b) {
        (Value::Scalar(x), Value::Scalar(y)) => Value::Scalar(lerp_f32(*x, *y, t)),
        (Value::Vector2(x), Value::Vector2(y)) => Value::Vector2(lerp_array(x, y, t)),
        (Value::Vector3(x), Value::Vector3(y)) => Value::Vector3(lerp_array(x, y, t)),
        (Value::Color3(x), Value::Color3(y)) => Value::Color3(lerp_array(x, y, t)),
        (Value::Color4(x), Value::Color4(y)) => Value::Color4(lerp_array(x, y, t)),
        (Value::Size(x), Value::Size(y)) => Value::Size(lerp_array(x, y, t)),
        (Value::Quaternion(x), Value::Quaternion(y)) => Value::Quaternion(slerp(*x, *y, t)),
        (Value::Matrix(x), Value::Matrix(y)) => {
            if precise_matrix {
                Value::Matrix(decompose_lerp(x, y, t))
            } else {
                Value::Matrix(lerp_array(x, y, t))
            }
        }
        _ => a.clone(),
    }
}

fn hermite_array<const N: usize>(
    p0: &[f32; N],
    m0: &[f32; N],
    p1: &[f32; N],
    m1: &[f32; N],
    t: f32,
    scale: f32,
) -> [f32; N] {
    let mut out = [0.0f32; N];
    for i in 0..N {
        out[i] = hermite_f32(p0[i], m0[i] * scale, p1[i], m1[i] * scale, t);
    }
    out
}

/// Cubic Hermite between `v0` (leaving with `out_tangent`) and `v1` (arriving
/// with `in_tangent`). Tangents are per-frame slopes and get multiplied by
/// `tangent_scale` (the bracket length in frames).
///
/// Quaternions are interpolated in 4D after aligning both ends to the same
/// hemisphere, then projected back onto the unit sphere. Matrices have no
/// Hermite form and return `None`, as do mismatched kinds.
pub fn hermite_values(
    v0: &Value,
    out_tangent: &Value,
    v1: &Value,
    in_tangent: &Value,
    t: f32,
    tangent_scale: f32,
) -> Option<Value> {
    let s = tangent_scale;
    let out = match (v0, out_tangent, v1, in_tangent) {
        (Value::Scalar(p0), Value::Scalar(m0), Value::Scalar(p1), Value::Scalar(m1)) => {
            Value::Scalar(hermite_f32(*p0, *m0 * s, *p1, *m1 * s, t))
        }
        (Value::Vector2(p0), Value::Vector2(m0), Value::Vector2(p1), Value::Vector2(m1)) => {
            Value::Vector2(hermite_array(p0, m0, p1, m1, t, s))
        }
        (Value::Vector3(p0), Value::Vector3(m0), Value::Vector3(p1), Value::Vector3(m1)) => {
            Value::Vector3(hermite_array(p0, m0, p1, m1, t, s))
        }
        (Value::Color3(p0), Value::Color3(m0), Value::Color3(p1), Value::Color3(m1)) => {
            Value::Color3(hermite_array(p0, m0, p1, m1, t, s))
        }
        (Value::Color4(p0), Value::Color4(m0), Value::Color4(p1), Value::Color4(m1)) => {
            Value::Color4(hermite_array(p0, m0, p1, m1, t, s))
        }
        (Value::Size(p0), Value::Size(m0), Value::Size(p1), Value::Size(m1)) => {
            Value::Size(hermite_array(p0, m0, p1, m1, t, s))
        }
        (
            Value::Quaternion(p0),
            Value::Quaternion(m0),
            Value::Quaternion(p1),
            Value::Quaternion(m1),
        ) => {
            let (mut p1, mut m1) = (*p1, *m1);
            if dot4(*p0, p1) < 0.0 {
                p1 = negate4(p1);
                m1 = negate4(m1);
            }
            Value::Quaternion(normalize_quat(hermite_array(p0, m0, &p1, &m1, t, s)))
        }
        _ => return None,
    };
    Some(out)
}

/// Offset that one full pass of a relative loop adds: `to - from` for
/// additive kinds, the rotation carrying `from` onto `to` for quaternions.
pub fn relative_offset(from: &Value, to: &Value) -> Value {
    match (from, to) {
        (Value::Quaternion(qf), Value::Quaternion(qt)) => {
            Value::Quaternion(normalize_quat(quat_mul(*qt, quat_inverse(*qf))))
        }
        _ => sub_values(to, from),
    }
}

/// Apply `count` relative-loop offsets to `value`.
pub fn apply_offset(value: &Value, offset: &Value, count: i64) -> Value {
    if count == 0 {
        return value.clone();
    }
    match (value, offset) {
        (Value::Quaternion(q), Value::Quaternion(o)) => {
            Value::Quaternion(normalize_quat(quat_mul(quat_pow(*o, count as f32), *q)))
        }
        _ => add_values(value, &scale_value(offset, count as f32)),
    }
}

fn zip_components(a: &Value, b: &Value, f: impl Fn(f32, f32) -> f32) -> Value {
    if a.kind() != b.kind() {
        return a.clone();
    }
    let mut out = a.clone();
    for (o, y) in out.components_mut().iter_mut().zip(b.components()) {
        *o = f(*o, *y);
    }
    out
}

/// Component-wise sum. Mismatched kinds return `a`.
pub fn add_values(a: &Value, b: &Value) -> Value {
    zip_components(a, b, |x, y| x + y)
}

/// Component-wise difference `a - b`. Mismatched kinds return `a`.
pub fn sub_values(a: &Value, b: &Value) -> Value {
    zip_components(a, b, |x, y| x - y)
}

/// Multiply every component by `s`.
pub fn scale_value(v: &Value, s: f32) -> Value {
    let mut out = v.clone();
    for c in out.components_mut() {
        *c *= s;
    }
    out
}
