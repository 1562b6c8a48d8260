//! Field propagator: the substep state machine.
//!
//! Advances a charged track along its curved trajectory while honoring
//! geometry boundaries. The driver produces curved arcs; the geometry
//! answers only straight-line queries; this loop reconciles the two.
//! Algorithm per iteration:
//! 1. Ask the driver for up to the trial substep length.
//! 2. Resolve the resulting chord against the geometry.
//! 3. Classify the trial and take exactly one transition: accept the
//!    substep internally, retry a stuck surface with half the arc,
//!    accept a likely boundary hit, or shrink the trial toward the
//!    intercept.
//! 4. Re-derive the loop status and continue while iterating.
//!
//! The loop converges because every transition either advances the
//! position or strictly decreases the trial substep.

use transport_math::linalg::{axpy, distance, make_unit_vector, soft_equal, soft_near, soft_zero};
use transport_types::config::FieldPropagatorOptions;
use transport_types::error::{TransportError, TransportResult};
use transport_types::state::{OdeState, PropagationResult};

use crate::driver::FieldDriver;
use crate::finder::{ChordStepFinder, NextStepFinder, SafetyStepFinder};
use crate::geo::GeoTrackView;
use crate::trial::TrialSubstep;

/// Condition of the substep loop after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstepStatus {
    /// Still performing substeps or trial refinements.
    Iterating,
    /// Terminal: intersected a volume boundary.
    Boundary,
    /// Terminal: covered the requested length inside the volume.
    MovedInternal,
    /// Terminal: the track will not move off its surface.
    Stuck,
    /// Terminal: the substep budget ran out short of the request.
    Looping,
}

/// Mutable per-call state: the borrowed track view, the phase-space
/// state, and the tracked on-boundary flag. Plain data, stack-resident.
#[derive(Debug)]
pub struct GeoFieldState<G> {
    pub geo: G,
    pub ode: OdeState,
    pub boundary: bool,
}

/// Loop bookkeeping plus the transitions that mutate it.
struct Substepper<'a, G> {
    /// Requested propagation length.
    step: f64,
    options: &'a FieldPropagatorOptions,
    state: &'a mut GeoFieldState<G>,
    /// Cumulative arc length accepted.
    travelled: f64,
    /// Arc length to attempt next iteration.
    trial_substep: f64,
    /// Accepted substeps left before the track counts as looping.
    remaining_substeps: i16,
}

impl<'a, G: GeoTrackView> Substepper<'a, G> {
    fn new(step: f64, options: &'a FieldPropagatorOptions, state: &'a mut GeoFieldState<G>) -> Self {
        Substepper {
            step,
            options,
            state,
            travelled: 0.0,
            trial_substep: step,
            remaining_substeps: options.max_substeps,
        }
    }

    fn status(&self) -> SubstepStatus {
        if self.trial_substep > self.options.minimum_substep() && self.remaining_substeps > 0 {
            return SubstepStatus::Iterating;
        }
        if self.remaining_substeps == 0 && self.travelled < self.step {
            return SubstepStatus::Looping;
        }
        if self.travelled > 0.0 {
            if self.state.boundary {
                return SubstepStatus::Boundary;
            }
            return SubstepStatus::MovedInternal;
        }
        // No movement at any substep length
        SubstepStatus::Stuck
    }

    /// No surface along the chord: commit the whole curved substep and
    /// keep going toward the remaining request.
    fn accept_internal(&mut self, trial: &TrialSubstep) {
        self.state.ode = *trial.end_state();
        self.state.boundary = false;
        self.travelled += trial.substep();
        self.trial_substep = self.step - self.travelled;
        self.state.geo.move_internal(&self.state.ode.pos);
        self.remaining_substeps -= 1;
    }

    /// Touching a surface we started on, probably at a near tangent:
    /// halve the arc and retry. Neither the state nor the substep budget
    /// changes.
    fn retry_stuck(&mut self, trial: &TrialSubstep) {
        self.trial_substep = trial.substep() / 2.0;
    }

    /// The substep ended at or just past a surface. Decide whether the
    /// boundary is really hit; either way this ends the search.
    fn accept_likely_boundary(&mut self, trial: &TrialSubstep) {
        // Cross only if at least one holds:
        // 1. the intercept is at or before the substep end point;
        // 2. moving to the intercept stays within the remaining budget,
        //    so the geometry step truly is the shorter one;
        // 3. the chord is degenerate and only the overreach explains the
        //    reported hit.
        let hit = trial.true_boundary()
            || self.travelled + trial.scaled_substep() <= self.trial_substep
            || trial.degenerate_chord();
        if !hit {
            self.state.ode.pos = trial.end_state().pos;
            self.state.geo.move_internal(&self.state.ode.pos);
        }
        self.state.boundary = hit;
        // The scaled length may slightly exceed the substep through the
        // overreach; report conservatively to avoid a coincident second
        // crossing. NaN from a degenerate chord also resolves here.
        self.travelled += f64::min(trial.scaled_substep(), trial.substep());
        self.state.ode.mom = trial.end_state().mom;
        self.trial_substep = 0.0;
    }

    /// A surface was reported but too far past the substep end to
    /// attribute confidently: shrink the next trial to the intercept
    /// estimate and retry.
    fn update_trial_step(&mut self, trial: &TrialSubstep) {
        debug_assert!(
            trial.scaled_substep() < self.trial_substep,
            "trial refinement must strictly decrease"
        );
        self.trial_substep = trial.scaled_substep();
    }

    /// Terminal boundary: land the geometry on the surface and accept
    /// its position as ours. The tolerance in the intercept search makes
    /// this a bounded bump of the integrated position.
    fn cross_to_boundary(&mut self) {
        self.state.geo.move_to_boundary();
        self.state.ode.pos = self.state.geo.pos();
        self.state.boundary = true;
    }

    /// Terminal internal move: repair round-off shortfall so the caller
    /// does not mistake a completed step for a geometry-limited one. The
    /// shortfall is bounded by the minimum-substep cutoff plus the
    /// intercept overreach.
    fn fixup_internal_step(&mut self) {
        let tolerance = self.options.minimum_substep() + self.options.delta_intersection();
        if self.travelled < self.step && soft_near(self.travelled, self.step, tolerance) {
            self.travelled = self.step;
        }
    }

    /// Along-substep movement went through chord directions; the exit
    /// direction must reflect the actual momentum.
    fn restore_direction(&mut self) {
        self.state.geo.set_dir(&make_unit_vector(&self.state.ode.mom));
    }

    /// We could not move at all: every substep length re-hits a surface.
    /// Nudge along the (just restored) momentum direction and hope it
    /// points deeper into the volume.
    fn unstick(&mut self) {
        self.travelled = f64::min(self.options.bump_distance(), self.step);
        let dir = self.state.geo.dir();
        axpy(self.travelled, &dir, &mut self.state.ode.pos);
        self.state.geo.move_internal(&self.state.ode.pos);
        self.state.boundary = false;
    }
}

/// Propagate a charged track along a curved trajectory in a magnetic
/// field, stopping at the requested length or the first volume boundary.
///
/// Owns the per-call [`GeoFieldState`]; the geometry view it wraps keeps
/// tracking the same underlying track across calls. The position of the
/// internal phase-space state stays consistent with the geometry, while
/// the geometry's direction holds trial chords during the loop and the
/// momentum direction after it.
#[derive(Debug)]
pub struct FieldPropagator<D, G, F = ChordStepFinder> {
    options: FieldPropagatorOptions,
    driver: D,
    state: GeoFieldState<G>,
    finder: F,
}

impl<D, G> FieldPropagator<D, G, ChordStepFinder>
where
    D: FieldDriver,
    G: GeoTrackView,
{
    /// Build for a track of scalar momentum `momentum` [kg m/s] moving
    /// along the geometry's current direction.
    pub fn new(
        options: FieldPropagatorOptions,
        driver: D,
        geo: G,
        momentum: f64,
    ) -> TransportResult<Self> {
        Self::with_finder(options, driver, geo, momentum, ChordStepFinder)
    }

    /// Build with substep options derived from the driver's tolerances.
    pub fn from_driver(driver: D, geo: G, momentum: f64) -> TransportResult<Self> {
        let options = FieldPropagatorOptions::from_driver(driver.driver_options());
        Self::new(options, driver, geo, momentum)
    }
}

impl<D, G> FieldPropagator<D, G, SafetyStepFinder>
where
    D: FieldDriver,
    G: GeoTrackView,
{
    /// Like [`FieldPropagator::new`] but skipping boundary queries while
    /// a safety credit lasts.
    pub fn with_safety(
        options: FieldPropagatorOptions,
        driver: D,
        geo: G,
        momentum: f64,
    ) -> TransportResult<Self> {
        Self::with_finder(options, driver, geo, momentum, SafetyStepFinder::default())
    }
}

impl<D, G, F> FieldPropagator<D, G, F>
where
    D: FieldDriver,
    G: GeoTrackView,
    F: NextStepFinder,
{
    pub fn with_finder(
        options: FieldPropagatorOptions,
        driver: D,
        geo: G,
        momentum: f64,
        finder: F,
    ) -> TransportResult<Self> {
        options.validate()?;
        if !momentum.is_finite() || momentum <= 0.0 {
            return Err(TransportError::PhysicsViolation(format!(
                "track momentum must be finite and > 0, got {momentum}"
            )));
        }
        let dir = geo.dir();
        let state = GeoFieldState {
            ode: OdeState {
                pos: geo.pos(),
                mom: [momentum * dir[0], momentum * dir[1], momentum * dir[2]],
            },
            boundary: geo.is_on_boundary(),
            geo,
        };
        Ok(FieldPropagator {
            options,
            driver,
            state,
            finder,
        })
    }

    /// Propagate until the next boundary, however far it is.
    pub fn propagate_to_boundary(&mut self) -> PropagationResult {
        self.propagate(f64::INFINITY)
    }

    /// Propagate up to `step`, or to the first boundary on the way.
    ///
    /// The returned distance is positive and never meaningfully exceeds
    /// the request; accumulation across substeps may overshoot by a
    /// driver-tolerance sliver. The boundary flag matches the geometry
    /// unless the bump heuristic had to dislodge a stuck track.
    pub fn propagate(&mut self, step: f64) -> PropagationResult {
        debug_assert!(step > 0.0);

        let mut sub = Substepper::new(step, &self.options, &mut self.state);
        let mut status = sub.status();
        while status == SubstepStatus::Iterating {
            debug_assert!(soft_zero(distance(&sub.state.ode.pos, &sub.state.geo.pos())));
            debug_assert_eq!(sub.state.boundary, sub.state.geo.is_on_boundary());

            // Advance up to (and usually less than) the trial length
            let end = self.driver.advance(sub.trial_substep, &sub.state.ode);
            debug_assert!(end.step > 0.0 && end.step <= sub.trial_substep);

            let start_pos = sub.state.ode.pos;
            let start_boundary = sub.state.boundary;
            let trial = TrialSubstep::new(
                &self.options,
                &mut self.finder,
                &mut sub.state.geo,
                start_pos,
                start_boundary,
                end,
            );

            if trial.no_boundary() {
                sub.accept_internal(&trial);
            } else if trial.stuck() {
                sub.retry_stuck(&trial);
            } else if trial.length_almost_boundary()
                || trial.endpoint_near_boundary()
                || trial.degenerate_chord()
            {
                sub.accept_likely_boundary(&trial);
            } else {
                sub.update_trial_step(&trial);
            }
            status = sub.status();
        }

        match status {
            SubstepStatus::Boundary => sub.cross_to_boundary(),
            SubstepStatus::MovedInternal => sub.fixup_internal_step(),
            _ => {}
        }

        // Restore the physical direction before any bump so the nudge
        // follows the momentum, not a leftover chord.
        sub.restore_direction();
        if status == SubstepStatus::Stuck {
            sub.unstick();
        }

        let result = PropagationResult {
            distance: sub.travelled,
            boundary: sub.state.boundary,
            looping: status == SubstepStatus::Looping,
        };

        debug_assert!(
            result.distance > 0.0
                && (result.distance <= step || soft_equal(result.distance, step)),
            "distance {} outside (0, {step}]",
            result.distance
        );
        debug_assert!(
            result.boundary == self.state.geo.is_on_boundary() || status == SubstepStatus::Stuck
        );
        result
    }

    pub fn geo(&self) -> &G {
        &self.state.geo
    }

    pub fn geo_mut(&mut self) -> &mut G {
        &mut self.state.geo
    }

    pub fn ode(&self) -> &OdeState {
        &self.state.ode
    }

    /// Release the track view, e.g. to rebuild after a volume crossing.
    pub fn into_geo(self) -> G {
        self.state.geo
    }
}
