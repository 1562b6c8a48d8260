// ─────────────────────────────────────────────────────────────────────
// SCPN Transport Core — Property-Based Tests (proptest) for transport-math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for transport-math using proptest.
//!
//! Covers: chord construction, intercept proximity, vector identities,
//! and momentum-magnitude conservation of the Cash-Karp stepper on
//! rotational systems.

use proptest::prelude::*;
use transport_math::linalg::{
    cross, distance, dot, is_intercept_close, make_chord, make_unit_vector, norm, sagitta,
};
use transport_math::rk::{rkck_step, OdeSystem};
use transport_types::state::OdeState;

fn coord() -> impl Strategy<Value = f64> {
    -50.0f64..50.0
}

// ── Vector Identities ────────────────────────────────────────────────

proptest! {
    /// The cross product is perpendicular to both factors.
    #[test]
    fn cross_is_perpendicular(
        ax in coord(), ay in coord(), az in coord(),
        bx in coord(), by in coord(), bz in coord(),
    ) {
        let a = [ax, ay, az];
        let b = [bx, by, bz];
        let c = cross(&a, &b);
        let scale = norm(&a) * norm(&b);
        prop_assume!(scale > 1e-6);
        prop_assert!(dot(&a, &c).abs() <= 1e-10 * scale * norm(&a),
            "a . (a x b) = {}", dot(&a, &c));
        prop_assert!(dot(&b, &c).abs() <= 1e-10 * scale * norm(&b),
            "b . (a x b) = {}", dot(&b, &c));
    }

    /// Normalization yields a unit vector preserving direction.
    #[test]
    fn unit_vector_has_unit_norm(ax in coord(), ay in coord(), az in coord()) {
        let a = [ax, ay, az];
        prop_assume!(norm(&a) > 1e-6);
        let u = make_unit_vector(&a);
        prop_assert!((norm(&u) - 1.0).abs() < 1e-12, "norm = {}", norm(&u));
        prop_assert!(dot(&u, &a) > 0.0, "direction flipped");
    }
}

// ── Chord Properties ─────────────────────────────────────────────────

proptest! {
    /// Chord length equals point distance, and walking the chord from
    /// the source lands on the destination.
    #[test]
    fn chord_connects_endpoints(
        sx in coord(), sy in coord(), sz in coord(),
        dx in coord(), dy in coord(), dz in coord(),
    ) {
        let src = [sx, sy, sz];
        let dst = [dx, dy, dz];
        let chord = make_chord(&src, &dst);
        prop_assert!((chord.length - distance(&src, &dst)).abs() < 1e-10);
        prop_assume!(chord.length > 1e-6);
        prop_assert!(is_intercept_close(&src, &chord.dir, chord.length, &dst, 1e-8),
            "chord endpoint missed destination");
    }

    /// Reversing a chord flips its direction and keeps its length.
    #[test]
    fn chord_reversal_is_antisymmetric(
        sx in coord(), sy in coord(), sz in coord(),
        dx in coord(), dy in coord(), dz in coord(),
    ) {
        let src = [sx, sy, sz];
        let dst = [dx, dy, dz];
        let fwd = make_chord(&src, &dst);
        let rev = make_chord(&dst, &src);
        prop_assert!((fwd.length - rev.length).abs() < 1e-12);
        prop_assume!(fwd.length > 1e-6);
        for i in 0..3 {
            prop_assert!((fwd.dir[i] + rev.dir[i]).abs() < 1e-12,
                "component {} not mirrored", i);
        }
    }

    /// A midpoint on the segment itself has zero sagitta.
    #[test]
    fn sagitta_vanishes_on_segment(
        sx in coord(), sy in coord(), sz in coord(),
        dx in coord(), dy in coord(), dz in coord(),
        frac in 0.0f64..1.0,
    ) {
        let src = [sx, sy, sz];
        let dst = [dx, dy, dz];
        let mid = [
            src[0] + frac * (dst[0] - src[0]),
            src[1] + frac * (dst[1] - src[1]),
            src[2] + frac * (dst[2] - src[2]),
        ];
        let s = sagitta(&src, &mid, &dst);
        prop_assert!(s < 1e-8, "sagitta = {s} for collinear midpoint");
    }
}

// ── Stepper Properties ───────────────────────────────────────────────

/// Momentum rotates about the z axis at unit rate; magnitude is an
/// exact invariant of the continuous system.
struct ZRotator;

impl OdeSystem for ZRotator {
    fn rhs(&self, y: &OdeState) -> OdeState {
        let t = make_unit_vector(&y.mom);
        OdeState {
            pos: t,
            mom: cross(&t, &[0.0, 0.0, 1.0]),
        }
    }
}

proptest! {
    /// One Cash-Karp step conserves momentum magnitude to tolerance.
    #[test]
    fn rkck_conserves_momentum_magnitude(
        px in -5.0f64..5.0,
        py in -5.0f64..5.0,
        pz in -5.0f64..5.0,
        h in 1e-4f64..0.2,
    ) {
        let mom = [px, py, pz];
        prop_assume!(norm(&mom) > 1.0);
        let y = OdeState { pos: [0.0; 3], mom };
        let result = rkck_step(&ZRotator, &y, h);
        let before = norm(&y.mom);
        let after = norm(&result.end.mom);
        prop_assert!(((after - before) / before).abs() < 1e-6,
            "momentum drifted: {before} -> {after}");
    }

    /// The end position stays within the arc length of the start.
    #[test]
    fn rkck_displacement_bounded_by_arc(
        px in -5.0f64..5.0,
        py in -5.0f64..5.0,
        h in 1e-4f64..0.5,
    ) {
        let mom = [px, py, 1.0];
        let y = OdeState { pos: [1.0, -2.0, 0.5], mom };
        let result = rkck_step(&ZRotator, &y, h);
        let moved = distance(&y.pos, &result.end.pos);
        prop_assert!(moved <= h * (1.0 + 1e-9),
            "moved {moved} beyond arc length {h}");
    }
}
