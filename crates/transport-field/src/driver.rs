//! Adaptive field driver.
//!
//! The driver integrates the equation of motion over a requested arc
//! length and is allowed to deliver less when accuracy demands it: the
//! embedded truncation error must stay below `epsilon_rel_max` and the
//! curved path must stay within `delta_chord` of its own chord. It never
//! delivers a zero-length step.

use transport_math::linalg::{axpy, dot, make_unit_vector, sagitta};
use transport_math::rk::{rk4_step, rkck_step, OdeSystem};
use transport_types::config::FieldDriverOptions;
use transport_types::state::{DriverResult, OdeState, Real3};

/// Hard cap on step halvings inside one `advance` call.
const MAX_HALVINGS: u32 = 64;

/// Contract of a field driver as seen by the propagator.
pub trait FieldDriver {
    /// Integrate up to `step` from `state`, returning the achieved arc
    /// length in `(0, step]` and the end state.
    fn advance(&self, step: f64, state: &OdeState) -> DriverResult;

    /// Tolerances shared with the surrounding substep loop.
    fn driver_options(&self) -> &FieldDriverOptions;
}

/// Squared relative truncation error of one step.
///
/// Position error is scaled by the step length, momentum error by the
/// starting momentum; the worse of the two governs acceptance.
fn rel_err_sq(err: &OdeState, step: f64, mom: &Real3) -> f64 {
    debug_assert!(step > 0.0);
    let errpos2 = dot(&err.pos, &err.pos) / (step * step);
    let errmom2 = dot(&err.mom, &err.mom) / dot(mom, mom);
    f64::max(errpos2, errmom2)
}

/// Reference driver: embedded Cash-Karp 4(5) with halving step control.
#[derive(Debug, Clone)]
pub struct RkDriver<E> {
    options: FieldDriverOptions,
    equation: E,
}

impl<E: OdeSystem> RkDriver<E> {
    pub fn new(options: FieldDriverOptions, equation: E) -> Self {
        RkDriver { options, equation }
    }

    /// Whether a candidate step meets both accuracy criteria.
    fn acceptable(&self, start: &OdeState, end: &OdeState, err: &OdeState, h: f64) -> bool {
        let eps = self.options.epsilon_rel_max;
        if rel_err_sq(err, h, &start.mom) > eps * eps {
            return false;
        }
        // Midpoint of the curve against the chord: a cheap RK4 half-step
        // suffices for the sagitta estimate.
        let mid = rk4_step(&self.equation, start, 0.5 * h);
        sagitta(&start.pos, &mid.pos, &end.pos) <= self.options.delta_chord
    }
}

impl<E: OdeSystem> FieldDriver for RkDriver<E> {
    fn advance(&self, step: f64, state: &OdeState) -> DriverResult {
        debug_assert!(step > 0.0);
        let mut h = step.min(self.options.max_step);

        let mut trial = rkck_step(&self.equation, state, h);
        for _ in 0..MAX_HALVINGS {
            if self.acceptable(state, &trial.end, &trial.err, h) {
                break;
            }
            if 0.5 * h < self.options.minimum_step {
                // Accuracy floor reached; deliver the shortest useful arc.
                break;
            }
            h *= 0.5;
            trial = rkck_step(&self.equation, state, h);
        }

        debug_assert!(h > 0.0 && h <= step);
        DriverResult {
            step: h,
            state: trial.end,
        }
    }

    fn driver_options(&self) -> &FieldDriverOptions {
        &self.options
    }
}

/// Exact straight-line displacement, bypassing the stepper entirely.
/// Useful wherever field-free regions dominate.
#[derive(Debug, Clone)]
pub struct LinearDriver {
    options: FieldDriverOptions,
}

impl LinearDriver {
    pub fn new(options: FieldDriverOptions) -> Self {
        LinearDriver { options }
    }
}

impl FieldDriver for LinearDriver {
    fn advance(&self, step: f64, state: &OdeState) -> DriverResult {
        debug_assert!(step > 0.0);
        let h = step.min(self.options.max_step);
        let mut end = *state;
        let t = make_unit_vector(&state.mom);
        axpy(h, &t, &mut end.pos);
        DriverResult { step: h, state: end }
    }

    fn driver_options(&self) -> &FieldDriverOptions {
        &self.options
    }
}
