//! Linear algebra over `[f64; 3]` plus tolerance comparisons.
//!
//! Free functions on plain arrays keep the hot propagation loop free of
//! allocations and let the same code serve host and device builds.

use transport_types::state::Real3;

/// Relative tolerance for `soft_equal`.
const SOFT_EQUAL_REL: f64 = 1.0e-10;

/// Absolute tolerance for `soft_zero`.
const SOFT_ZERO_ABS: f64 = 1.0e-12;

/// Straight segment between two points: length and unit direction.
///
/// A zero-length chord carries a zero direction vector rather than NaNs,
/// so downstream distance arithmetic stays finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chord {
    pub length: f64,
    pub dir: Real3,
}

pub fn dot(a: &Real3, b: &Real3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(a: &Real3, b: &Real3) -> Real3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn norm(a: &Real3) -> f64 {
    dot(a, a).sqrt()
}

pub fn scale(a: f64, x: &Real3) -> Real3 {
    [a * x[0], a * x[1], a * x[2]]
}

/// In-place `y += a * x`.
pub fn axpy(a: f64, x: &Real3, y: &mut Real3) {
    y[0] += a * x[0];
    y[1] += a * x[1];
    y[2] += a * x[2];
}

pub fn distance(a: &Real3, b: &Real3) -> f64 {
    let d = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    norm(&d)
}

/// Unit vector along `a`. The input must be nonzero.
pub fn make_unit_vector(a: &Real3) -> Real3 {
    let n = norm(a);
    debug_assert!(n > 0.0, "cannot normalize a zero vector");
    scale(1.0 / n, a)
}

/// Segment from `src` to `dst`.
pub fn make_chord(src: &Real3, dst: &Real3) -> Chord {
    let delta = [dst[0] - src[0], dst[1] - src[1], dst[2] - src[2]];
    let length = norm(&delta);
    let dir = if length > 0.0 {
        scale(1.0 / length, &delta)
    } else {
        [0.0; 3]
    };
    Chord { length, dir }
}

/// Whether the point `origin + t * dir` lies within `tolerance` of
/// `target`. Compares squared distances to avoid the square root.
pub fn is_intercept_close(
    origin: &Real3,
    dir: &Real3,
    t: f64,
    target: &Real3,
    tolerance: f64,
) -> bool {
    let mut delta_sq = 0.0;
    for i in 0..3 {
        let d = origin[i] - target[i] + t * dir[i];
        delta_sq += d * d;
    }
    delta_sq <= tolerance * tolerance
}

/// Relative floating-point comparison at the default tolerance.
pub fn soft_equal(a: f64, b: f64) -> bool {
    soft_near(a, b, SOFT_EQUAL_REL * f64::max(1.0, f64::max(a.abs(), b.abs())))
}

/// Comparison with an explicit absolute tolerance.
pub fn soft_near(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// Whether a length is negligible.
pub fn soft_zero(a: f64) -> bool {
    a.abs() <= SOFT_ZERO_ABS
}

/// Perpendicular distance of `mid` from the line through `start` and
/// `end`. Degenerates to the point distance when the chord has no
/// extent.
pub fn sagitta(start: &Real3, mid: &Real3, end: &Real3) -> f64 {
    let chord = make_chord(start, end);
    if chord.length == 0.0 {
        return distance(start, mid);
    }
    let offset = [mid[0] - start[0], mid[1] - start[1], mid[2] - start[2]];
    let along = dot(&offset, &chord.dir);
    let mut perp = offset;
    axpy(-along, &chord.dir, &mut perp);
    norm(&perp)
}
