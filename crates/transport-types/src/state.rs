// ─────────────────────────────────────────────────────────────────────
// SCPN Transport Core — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

/// 3-vector of finite reals: a position [m] or a momentum [kg m/s]
/// depending on context.
pub type Real3 = [f64; 3];

/// Phase-space state of a charged track: position plus momentum vector.
///
/// The momentum must be nonzero; its magnitude is the scalar momentum and
/// its direction is the travel direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OdeState {
    pub pos: Real3,
    pub mom: Real3,
}

/// Output of one driver call: the arc length actually integrated (which
/// may be shorter than requested, never zero) and the end state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverResult {
    pub step: f64,
    pub state: OdeState,
}

/// Geometry answer to a straight-line boundary query: the distance moved
/// (capped at the search limit) and whether a surface terminates it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Propagation {
    pub distance: f64,
    pub boundary: bool,
}

/// Final outcome of a field propagation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagationResult {
    /// Curved-path distance travelled.
    pub distance: f64,
    /// Whether the track stopped on a volume boundary.
    pub boundary: bool,
    /// Whether the substep budget ran out before reaching the end.
    pub looping: bool,
}
