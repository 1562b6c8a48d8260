//! Trial-substep classification.
//!
//! After the driver integrates one substep, the chord between its start
//! and end is resolved against the geometry; the outcome determines
//! which transition the substep loop takes. The predicates here are the
//! delicate part: their tie-breaking near surfaces is what keeps the
//! loop convergent.

use transport_math::linalg::{is_intercept_close, make_chord, Chord};
use transport_types::config::FieldPropagatorOptions;
use transport_types::state::{DriverResult, OdeState, Propagation, Real3};

use crate::finder::NextStepFinder;
use crate::geo::GeoTrackView;

/// One integrated substep together with its straight-line geometry
/// answer.
#[derive(Debug, Clone, Copy)]
pub struct TrialSubstep {
    start_pos: Real3,
    start_boundary: bool,
    substep: DriverResult,
    chord: Chord,
    linear_step: Propagation,
    /// Substep length scaled by the intercept fraction along the chord:
    /// the arc length at which the boundary is expected to sit. Can
    /// exceed the substep by the search overreach; non-finite when the
    /// chord is degenerate.
    scaled_substep: f64,
    minimum_substep: f64,
    bump_distance: f64,
    delta_intersection: f64,
}

impl TrialSubstep {
    /// Resolve the chord of a driver result against the geometry.
    pub fn new<G: GeoTrackView, F: NextStepFinder>(
        options: &FieldPropagatorOptions,
        finder: &mut F,
        geo: &mut G,
        start_pos: Real3,
        start_boundary: bool,
        substep: DriverResult,
    ) -> Self {
        debug_assert!(substep.step > 0.0);
        let chord = make_chord(&start_pos, &substep.state.pos);
        let linear_step = finder.find(geo, options, &chord);
        debug_assert!(
            linear_step.distance <= chord.length + options.delta_intersection() * (1.0 + 1e-12),
            "geometry searched past the requested window"
        );
        let scaled_substep = (linear_step.distance / chord.length) * substep.step;

        TrialSubstep {
            start_pos,
            start_boundary,
            substep,
            chord,
            linear_step,
            scaled_substep,
            minimum_substep: options.minimum_substep(),
            bump_distance: options.bump_distance(),
            delta_intersection: options.delta_intersection(),
        }
    }

    /// Integrated end state of the trial.
    pub fn end_state(&self) -> &OdeState {
        &self.substep.state
    }

    /// Arc length the driver actually integrated.
    pub fn substep(&self) -> f64 {
        self.substep.step
    }

    /// Arc length to the expected boundary intercept.
    pub fn scaled_substep(&self) -> f64 {
        self.scaled_substep
    }

    /// The intercept sits at or before the chord end, not merely in the
    /// overreach window.
    pub fn true_boundary(&self) -> bool {
        self.linear_step.distance <= self.chord.length
    }

    /// No surface found, even searching a bit past the chord end.
    pub fn no_boundary(&self) -> bool {
        !self.linear_step.boundary
    }

    /// Starting on a surface and re-hitting one within a bump: the track
    /// cannot leave the surface at this substep length.
    pub fn stuck(&self) -> bool {
        self.start_boundary && self.linear_step.distance < self.bump_distance
    }

    /// The boundary sits essentially at the substep end: refining
    /// further would drop below the minimum substep.
    pub fn length_almost_boundary(&self) -> bool {
        self.linear_step.boundary && self.scaled_substep <= self.minimum_substep
    }

    /// The straight-line intercept point lies within the intersection
    /// tolerance of the curved end point.
    pub fn endpoint_near_boundary(&self) -> bool {
        self.linear_step.boundary
            && is_intercept_close(
                &self.start_pos,
                &self.chord.dir,
                self.linear_step.distance,
                &self.substep.state.pos,
                self.delta_intersection,
            )
    }

    /// The substep closed on itself: no chord direction exists, so the
    /// trial cannot be refined any further.
    pub fn degenerate_chord(&self) -> bool {
        self.chord.length == 0.0
    }
}
