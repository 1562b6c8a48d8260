//! Runge-Kutta steppers over phase-space states.
//!
//! Provides a classic RK4 step and an embedded Cash-Karp 4(5) pair whose
//! fifth-order solution comes with a fourth-order error estimate, the
//! basis for adaptive step control in the field driver.

use transport_types::state::OdeState;

use crate::linalg::axpy;

/// Right-hand side of an autonomous first-order ODE system over
/// `OdeState`, parameterized by arc length.
pub trait OdeSystem {
    fn rhs(&self, y: &OdeState) -> OdeState;
}

/// End state and embedded error estimate of one Cash-Karp step.
#[derive(Debug, Clone, Copy)]
pub struct RkStepResult {
    pub end: OdeState,
    pub err: OdeState,
}

// Cash-Karp tableau (Numerical Recipes convention).
const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 3.0 / 10.0;
const A42: f64 = -9.0 / 10.0;
const A43: f64 = 6.0 / 5.0;
const A51: f64 = -11.0 / 54.0;
const A52: f64 = 5.0 / 2.0;
const A53: f64 = -70.0 / 27.0;
const A54: f64 = 35.0 / 27.0;
const A61: f64 = 1631.0 / 55296.0;
const A62: f64 = 175.0 / 512.0;
const A63: f64 = 575.0 / 13824.0;
const A64: f64 = 44275.0 / 110592.0;
const A65: f64 = 253.0 / 4096.0;
const C1: f64 = 37.0 / 378.0;
const C3: f64 = 250.0 / 621.0;
const C4: f64 = 125.0 / 594.0;
const C6: f64 = 512.0 / 1771.0;
const D1: f64 = C1 - 2825.0 / 27648.0;
const D3: f64 = C3 - 18575.0 / 48384.0;
const D4: f64 = C4 - 13525.0 / 55296.0;
const D5: f64 = -277.0 / 14336.0;
const D6: f64 = C6 - 1.0 / 4.0;

/// `y + h * sum(coeff * k)` over both state components.
fn weighted(y: &OdeState, h: f64, terms: &[(f64, &OdeState)]) -> OdeState {
    let mut out = *y;
    for (coeff, k) in terms {
        axpy(h * coeff, &k.pos, &mut out.pos);
        axpy(h * coeff, &k.mom, &mut out.mom);
    }
    out
}

/// `h * sum(coeff * k)` alone, for the error estimate.
fn weighted_delta(h: f64, terms: &[(f64, &OdeState)]) -> OdeState {
    let mut out = OdeState {
        pos: [0.0; 3],
        mom: [0.0; 3],
    };
    for (coeff, k) in terms {
        axpy(h * coeff, &k.pos, &mut out.pos);
        axpy(h * coeff, &k.mom, &mut out.mom);
    }
    out
}

/// One classic fourth-order step of size `h`.
pub fn rk4_step<S: OdeSystem>(system: &S, y: &OdeState, h: f64) -> OdeState {
    let k1 = system.rhs(y);
    let k2 = system.rhs(&weighted(y, h, &[(0.5, &k1)]));
    let k3 = system.rhs(&weighted(y, h, &[(0.5, &k2)]));
    let k4 = system.rhs(&weighted(y, h, &[(1.0, &k3)]));
    weighted(
        y,
        h,
        &[
            (1.0 / 6.0, &k1),
            (1.0 / 3.0, &k2),
            (1.0 / 3.0, &k3),
            (1.0 / 6.0, &k4),
        ],
    )
}

/// One embedded Cash-Karp 4(5) step of size `h`.
pub fn rkck_step<S: OdeSystem>(system: &S, y: &OdeState, h: f64) -> RkStepResult {
    let k1 = system.rhs(y);
    let k2 = system.rhs(&weighted(y, h, &[(A21, &k1)]));
    let k3 = system.rhs(&weighted(y, h, &[(A31, &k1), (A32, &k2)]));
    let k4 = system.rhs(&weighted(y, h, &[(A41, &k1), (A42, &k2), (A43, &k3)]));
    let k5 = system.rhs(&weighted(
        y,
        h,
        &[(A51, &k1), (A52, &k2), (A53, &k3), (A54, &k4)],
    ));
    let k6 = system.rhs(&weighted(
        y,
        h,
        &[(A61, &k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)],
    ));

    let end = weighted(y, h, &[(C1, &k1), (C3, &k3), (C4, &k4), (C6, &k6)]);
    let err = weighted_delta(
        h,
        &[(D1, &k1), (D3, &k3), (D4, &k4), (D5, &k5), (D6, &k6)],
    );
    RkStepResult { end, err }
}
