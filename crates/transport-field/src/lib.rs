// ─────────────────────────────────────────────────────────────────────
// SCPN Transport Core — Transport Field
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Charged-particle propagation through magnetic fields and geometry.
//!
//! The crate composes bottom-up: field models and the Lorentz equation
//! of motion, an adaptive field driver, straight-line boundary finders,
//! the trial-substep classifier, and the substep state machine that
//! reconciles curved arcs with chord-based geometry queries.

pub mod driver;
pub mod equation;
pub mod finder;
pub mod geo;
pub mod magfield;
pub mod propagator;
pub mod trial;
