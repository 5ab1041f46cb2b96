//! Accumulation of per-property contributions and weighted arbitration.
//!
//! Every runtime animation that writes a property during a tick adds its
//! value here instead of writing the target. After all animatables ran, the
//! accumulator resolves each property once:
//! - total weight >= 1: weighted mean of the contributions
//! - total weight < 1: the pre-animation value fills the remaining share,
//!   `original * (1 - total) + sum(w_i * v_i)`
//!
//! Unweighted contributions count as weight 1.

use indexmap::{Equivalent, IndexMap};

use kinema_api_core::blend::lerp_values;
use kinema_api_core::math::{dot4, mat4_compose, mat4_decompose, negate4, normalize_quat};
use kinema_api_core::Value;

use crate::config::InterpolationOptions;
use crate::ids::TargetId;

/// (target, property) pair identifying one animated slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PropertyKey {
    pub target: TargetId,
    pub property: String,
}

/// Borrowed lookup form of [`PropertyKey`]; hashes identically.
#[derive(Hash)]
struct PropertyRef<'a> {
    target: TargetId,
    property: &'a str,
}

impl Equivalent<PropertyKey> for PropertyRef<'_> {
    fn equivalent(&self, key: &PropertyKey) -> bool {
        self.target == key.target && self.property == key.property
    }
}

/// Weighted sums per value shape.
/// Quaternions are sign-aligned to the first contribution before summing.
/// Matrices (precise mode) are summed as scale/rotation/translation, with a
/// component sum kept for matrices that cannot be decomposed.
#[derive(Clone, Debug)]
enum AccumEntry {
    Linear {
        sum: Value,
    },
    Quat {
        sum: [f32; 4],
        reference: [f32; 4],
    },
    Transform {
        s_sum: [f32; 3],
        r_sum: [f32; 4],
        t_sum: [f32; 3],
        reference: [f32; 4],
        linear: [f32; 16],
        decomposable: bool,
    },
}

fn add_scaled<const N: usize>(sum: &mut [f32; N], v: &[f32; N], w: f32) {
    for i in 0..N {
        sum[i] += v[i] * w;
    }
}

fn aligned(q: [f32; 4], reference: [f32; 4]) -> [f32; 4] {
    if dot4(q, reference) < 0.0 {
        negate4(q)
    } else {
        q
    }
}

impl AccumEntry {
    fn from_value(v: &Value, w: f32, precise_matrix: bool) -> Self {
        match v {
            Value::Quaternion(q) => {
                let mut sum = [0.0; 4];
                add_scaled(&mut sum, q, w);
                AccumEntry::Quat {
                    sum,
                    reference: *q,
                }
            }
            Value::Matrix(m) if precise_matrix => {
                let mut entry = AccumEntry::Transform {
                    s_sum: [0.0; 3],
                    r_sum: [0.0; 4],
                    t_sum: [0.0; 3],
                    reference: [0.0, 0.0, 0.0, 1.0],
                    linear: [0.0; 16],
                    decomposable: true,
                };
                if let (AccumEntry::Transform { reference, .. }, Some((_, r, _))) =
                    (&mut entry, mat4_decompose(m))
                {
                    *reference = r;
                }
                entry.add_value(v, w);
                entry
            }
            other => {
                let mut sum = other.clone();
                for c in sum.components_mut() {
                    *c *= w;
                }
                AccumEntry::Linear { sum }
            }
        }
    }

    fn add_value(&mut self, v: &Value, w: f32) {
        match (self, v) {
            (AccumEntry::Quat { sum, reference }, Value::Quaternion(q)) => {
                add_scaled(sum, &aligned(*q, *reference), w);
            }
            (
                AccumEntry::Transform {
                    s_sum,
                    r_sum,
                    t_sum,
                    reference,
                    linear,
                    decomposable,
                },
                Value::Matrix(m),
            ) => {
                add_scaled(linear, m, w);
                match mat4_decompose(m) {
                    Some((s, r, t)) => {
                        add_scaled(s_sum, &s, w);
                        add_scaled(r_sum, &aligned(r, *reference), w);
                        add_scaled(t_sum, &t, w);
                    }
                    None => *decomposable = false,
                }
            }
            (AccumEntry::Linear { sum }, value) if sum.kind() == value.kind() => {
                for (acc, c) in sum.components_mut().iter_mut().zip(value.components()) {
                    *acc += c * w;
                }
            }
            _ => {
                // Mismatched kind: the contribution is dropped.
            }
        }
    }

    /// Weighted mean of the contributions.
    fn mean(self, w: f32) -> Value {
        let inv = w.recip();
        match self {
            AccumEntry::Linear { mut sum } => {
                for c in sum.components_mut() {
                    *c *= inv;
                }
                sum
            }
            AccumEntry::Quat { sum, .. } => Value::Quaternion(normalize_quat(sum)),
            AccumEntry::Transform {
                s_sum,
                r_sum,
                t_sum,
                linear,
                decomposable,
                ..
            } => {
                if decomposable {
                    let s = [s_sum[0] * inv, s_sum[1] * inv, s_sum[2] * inv];
                    let t = [t_sum[0] * inv, t_sum[1] * inv, t_sum[2] * inv];
                    Value::Matrix(mat4_compose(s, normalize_quat(r_sum), t))
                } else {
                    let mut m = linear;
                    for c in m.iter_mut() {
                        *c *= inv;
                    }
                    Value::Matrix(m)
                }
            }
        }
    }
}

#[derive(Clone, Debug)]
struct Slot {
    entry: AccumEntry,
    weight: f32,
    original: Option<Value>,
}

/// Accumulates per-property contributions across all animatables of a tick.
#[derive(Debug)]
pub struct Accumulator {
    opts: InterpolationOptions,
    map: IndexMap<PropertyKey, Slot>,
}

impl Accumulator {
    pub fn new(opts: InterpolationOptions) -> Self {
        Self {
            opts,
            map: IndexMap::new(),
        }
    }

    /// Record a contribution. `weight < 0` means unweighted (counts as 1).
    /// `original` is the property's pre-animation value, used to fill the
    /// share left over when the total weight stays below 1.
    pub fn add(
        &mut self,
        target: TargetId,
        property: &str,
        value: &Value,
        weight: f32,
        original: Option<&Value>,
    ) {
        let w = if weight < 0.0 { 1.0 } else { weight };
        if w == 0.0 {
            return;
        }
        let lookup = PropertyRef { target, property };
        if let Some(slot) = self.map.get_mut(&lookup) {
            slot.entry.add_value(value, w);
            slot.weight += w;
            if slot.original.is_none() {
                slot.original = original.cloned();
            }
            return;
        }
        self.map.insert(
            PropertyKey {
                target,
                property: property.to_string(),
            },
            Slot {
                entry: AccumEntry::from_value(value, w, self.opts.precise_matrix_interpolation),
                weight: w,
                original: original.cloned(),
            },
        );
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Resolve every slot, in first-contribution order.
    pub fn finalize(self) -> Vec<(PropertyKey, Value)> {
        let precise = self.opts.precise_matrix_interpolation;
        let mut out = Vec::with_capacity(self.map.len());
        for (key, slot) in self.map {
            let total = slot.weight;
            let mean = slot.entry.mean(total);
            let value = match slot.original {
                Some(orig) if total < 1.0 && orig.kind() == mean.kind() => {
                    lerp_values(&orig, &mean, total, precise)
                }
                _ => mean,
            };
            out.push((key, value));
        }
        out
    }
}
