//! Math primitives used by interpolation and blending.
//! Quaternions are [x, y, z, w]; matrices are column-major [f32; 16].

/// Linear interpolation for f32
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Lerp for fixed-size arrays
#[inline]
pub fn lerp_array<const N: usize>(a: &[f32; N], b: &[f32; N], t: f32) -> [f32; N] {
    let mut out = [0.0f32; N];
    for i in 0..N {
        out[i] = lerp_f32(a[i], b[i], t);
    }
    out
}

/// Cubic Hermite spline between `p0` and `p1` with tangents `m0`/`m1`.
#[inline]
pub fn hermite_f32(p0: f32, m0: f32, p1: f32, m1: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;
    h00 * p0 + h10 * m0 + h01 * p1 + h11 * m1
}

#[inline]
pub fn dot4(a: [f32; 4], b: [f32; 4]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

/// Normalize a quaternion; a zero quaternion becomes identity.
#[inline]
pub fn normalize_quat(q: [f32; 4]) -> [f32; 4] {
    let mag = dot4(q, q).sqrt();
    if mag == 0.0 {
        [0.0, 0.0, 0.0, 1.0]
    } else {
        [q[0] / mag, q[1] / mag, q[2] / mag, q[3] / mag]
    }
}

#[inline]
pub fn negate4(q: [f32; 4]) -> [f32; 4] {
    [-q[0], -q[1], -q[2], -q[3]]
}

/// Hamilton product `a * b` (apply `b` first, then `a`).
#[inline]
pub fn quat_mul(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    let [ax, ay, az, aw] = a;
    let [bx, by, bz, bw] = b;
    [
        aw * bx + ax * bw + ay * bz - az * by,
        aw * by - ax * bz + ay * bw + az * bx,
        aw * bz + ax * by - ay * bx + az * bw,
        aw * bw - ax * bx - ay * by - az * bz,
    ]
}

/// Inverse of a quaternion (conjugate over squared norm).
#[inline]
pub fn quat_inverse(q: [f32; 4]) -> [f32; 4] {
    let len2 = dot4(q, q);
    if len2 == 0.0 {
        return [0.0, 0.0, 0.0, 1.0];
    }
    [-q[0] / len2, -q[1] / len2, -q[2] / len2, q[3] / len2]
}

/// Raise a rotation to a real power by scaling its angle around the same axis.
pub fn quat_pow(q: [f32; 4], n: f32) -> [f32; 4] {
    let q = normalize_quat(q);
    let half = q[3].clamp(-1.0, 1.0).acos();
    let sin_half = half.sin();
    if sin_half.abs() < 1e-6 {
        return [0.0, 0.0, 0.0, 1.0];
    }
    let axis = [q[0] / sin_half, q[1] / sin_half, q[2] / sin_half];
    let scaled = half * n;
    let s = scaled.sin();
    [axis[0] * s, axis[1] * s, axis[2] * s, scaled.cos()]
}

/// Slerp between two quaternions along the shortest arc.
pub fn slerp(q1: [f32; 4], q2: [f32; 4], t: f32) -> [f32; 4] {
    let qa = normalize_quat(q1);
    let mut qb = normalize_quat(q2);

    let mut dot = dot4(qa, qb);

    // Negative dot takes the long way round; flip one input.
    if dot < 0.0 {
        qb = negate4(qb);
        dot = -dot;
    }

    // Nearly parallel: lerp and renormalize.
    const DOT_THRESHOLD: f32 = 0.9995;
    if dot > DOT_THRESHOLD {
        return normalize_quat(lerp_array(&qa, &qb, t));
    }

    let theta_0 = dot.clamp(-1.0, 1.0).acos();
    let theta = theta_0 * t;
    let sin_theta_0 = theta_0.sin();

    let s0 = (theta_0 - theta).sin() / sin_theta_0;
    let s1 = theta.sin() / sin_theta_0;

    [
        s0 * qa[0] + s1 * qb[0],
        s0 * qa[1] + s1 * qb[1],
        s0 * qa[2] + s1 * qb[2],
        s0 * qa[3] + s1 * qb[3],
    ]
}

pub fn mat4_identity() -> [f32; 16] {
    let mut m = [0.0f32; 16];
    m[0] = 1.0;
    m[5] = 1.0;
    m[10] = 1.0;
    m[15] = 1.0;
    m
}

/// Element at (row, col) of a column-major matrix.
#[inline]
fn at(m: &[f32; 16], row: usize, col: usize) -> f32 {
    m[col * 4 + row]
}

/// Build `T * R * S` from scale, rotation and translation.
pub fn mat4_compose(scale: [f32; 3], rotation: [f32; 4], translation: [f32; 3]) -> [f32; 16] {
    let [x, y, z, w] = normalize_quat(rotation);
    let (xx, yy, zz) = (x * x, y * y, z * z);
    let (xy, xz, yz) = (x * y, x * z, y * z);
    let (wx, wy, wz) = (w * x, w * y, w * z);

    let r = [
        [1.0 - 2.0 * (yy + zz), 2.0 * (xy - wz), 2.0 * (xz + wy)],
        [2.0 * (xy + wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz - wx)],
        [2.0 * (xz - wy), 2.0 * (yz + wx), 1.0 - 2.0 * (xx + yy)],
    ];

    let mut m = [0.0f32; 16];
    for col in 0..3 {
        for row in 0..3 {
            m[col * 4 + row] = r[row][col] * scale[col];
        }
    }
    m[12] = translation[0];
    m[13] = translation[1];
    m[14] = translation[2];
    m[15] = 1.0;
    m
}

/// Split an affine matrix into (scale, rotation, translation).
/// Returns `None` when a scale axis collapses to zero.
pub fn mat4_decompose(m: &[f32; 16]) -> Option<([f32; 3], [f32; 4], [f32; 3])> {
    let translation = [m[12], m[13], m[14]];

    let column_len = |col: usize| {
        let (a, b, c) = (at(m, 0, col), at(m, 1, col), at(m, 2, col));
        (a * a + b * b + c * c).sqrt()
    };
    let mut scale = [column_len(0), column_len(1), column_len(2)];
    if scale.iter().any(|s| *s <= f32::EPSILON) {
        return None;
    }

    let det = at(m, 0, 0) * (at(m, 1, 1) * at(m, 2, 2) - at(m, 1, 2) * at(m, 2, 1))
        - at(m, 0, 1) * (at(m, 1, 0) * at(m, 2, 2) - at(m, 1, 2) * at(m, 2, 0))
        + at(m, 0, 2) * (at(m, 1, 0) * at(m, 2, 1) - at(m, 1, 1) * at(m, 2, 0));
    if det < 0.0 {
        scale[0] = -scale[0];
    }

    let r = |row: usize, col: usize| at(m, row, col) / scale[col];
    let trace = r(0, 0) + r(1, 1) + r(2, 2);
    let rotation = if trace > 0.0 {
        let s = 0.5 / (trace + 1.0).sqrt();
        [
            (r(2, 1) - r(1, 2)) * s,
            (r(0, 2) - r(2, 0)) * s,
            (r(1, 0) - r(0, 1)) * s,
            0.25 / s,
        ]
    } else if r(0, 0) > r(1, 1) && r(0, 0) > r(2, 2) {
        let s = 2.0 * (1.0 + r(0, 0) - r(1, 1) - r(2, 2)).sqrt();
        [
            0.25 * s,
            (r(0, 1) + r(1, 0)) / s,
            (r(0, 2) + r(2, 0)) / s,
            (r(2, 1) - r(1, 2)) / s,
        ]
    } else if r(1, 1) > r(2, 2) {
        let s = 2.0 * (1.0 + r(1, 1) - r(0, 0) - r(2, 2)).sqrt();
        [
            (r(0, 1) + r(1, 0)) / s,
            0.25 * s,
            (r(1, 2) + r(2, 1)) / s,
            (r(0, 2) - r(2, 0)) / s,
        ]
    } else {
        let s = 2.0 * (1.0 + r(2, 2) - r(0, 0) - r(1, 1)).sqrt();
        [
            (r(0, 2) + r(2, 0)) / s,
            (r(1, 2) + r(2, 1)) / s,
            0.25 * s,
            (r(1, 0) - r(0, 1)) / s,
        ]
    };

    Some((scale, normalize_quat(rotation), translation))
}
