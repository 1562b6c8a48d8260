//! Straight-line next-step finders.
//!
//! Both strategies answer "where does this chord meet a surface", always
//! searching `delta_intersection` beyond the chord end so that surfaces
//! sitting just past the endpoint are still reported.

use transport_math::linalg::Chord;
use transport_types::config::FieldPropagatorOptions;
use transport_types::state::Propagation;

use crate::geo::GeoTrackView;

/// Strategy for resolving a chord against the geometry.
pub trait NextStepFinder {
    fn find<G: GeoTrackView>(
        &mut self,
        geo: &mut G,
        options: &FieldPropagatorOptions,
        chord: &Chord,
    ) -> Propagation;
}

/// Direct strategy: orient the track along the chord and query.
///
/// The direction update is skipped for chords below the minimum substep,
/// whose near-zero extent makes the direction numerically meaningless.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChordStepFinder;

impl NextStepFinder for ChordStepFinder {
    fn find<G: GeoTrackView>(
        &mut self,
        geo: &mut G,
        options: &FieldPropagatorOptions,
        chord: &Chord,
    ) -> Propagation {
        if chord.length >= options.minimum_substep() {
            geo.set_dir(&chord.dir);
        }
        geo.find_next_step(chord.length + options.delta_intersection())
    }
}

/// Safety-accelerated strategy.
///
/// Keeps a signed distance credit toward the nearest surface; while the
/// credit covers the search distance, the boundary query is skipped
/// entirely. Semantically equivalent to [`ChordStepFinder`], cheaper in
/// open regions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyStepFinder {
    safety: f64,
}

impl NextStepFinder for SafetyStepFinder {
    fn find<G: GeoTrackView>(
        &mut self,
        geo: &mut G,
        options: &FieldPropagatorOptions,
        chord: &Chord,
    ) -> Propagation {
        let search_dist = chord.length + options.delta_intersection();
        self.safety -= search_dist;
        if self.safety <= 0.0 && !geo.is_on_boundary() {
            self.safety = geo.find_safety(2.0 * search_dist) - search_dist;
        }
        if self.safety > 0.0 {
            // No surface can be reached within this chord.
            return Propagation {
                distance: search_dist,
                boundary: false,
            };
        }
        // The direction may be stale after several skipped queries.
        if chord.length > 0.0 {
            geo.set_dir(&chord.dir);
        }
        geo.find_next_step(search_dist)
    }
}
