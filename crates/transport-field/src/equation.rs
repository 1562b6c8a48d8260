//! Lorentz equation of motion along arc length.
//!
//! With momentum p [kg m/s], charge q [C], and field B [T], a track
//! parameterized by its path length s obeys
//!   d pos / ds = p / |p|
//!   d p / ds   = q (p / |p|) x B(pos)
//! so |p| is an exact invariant: the field only rotates the momentum.

use transport_math::linalg::{cross, make_unit_vector, scale};
use transport_math::rk::OdeSystem;
use transport_types::state::OdeState;

use crate::magfield::MagneticField;

/// Equation of motion for one charge in a magnetic field.
#[derive(Debug, Clone)]
pub struct LorentzEquation<F> {
    field: F,
    charge: f64,
}

impl<F: MagneticField> LorentzEquation<F> {
    /// Build for a particle of charge `charge` [C]. Zero charge yields
    /// straight-line motion.
    pub fn new(field: F, charge: f64) -> Self {
        LorentzEquation { field, charge }
    }

    pub fn charge(&self) -> f64 {
        self.charge
    }
}

impl<F: MagneticField> OdeSystem for LorentzEquation<F> {
    fn rhs(&self, y: &OdeState) -> OdeState {
        let tangent = make_unit_vector(&y.mom);
        let b = self.field.value(&y.pos);
        OdeState {
            pos: tangent,
            mom: scale(self.charge, &cross(&tangent, &b)),
        }
    }
}
