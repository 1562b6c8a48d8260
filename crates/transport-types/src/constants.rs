// ─────────────────────────────────────────────────────────────────────
// SCPN Transport Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

/// Elementary charge (C)
pub const Q_ELEMENTARY: f64 = 1.602176634e-19;

/// Electron mass (kg)
pub const M_ELECTRON: f64 = 9.1093837015e-31;

/// Proton mass (kg)
pub const M_PROTON: f64 = 1.67262192369e-27;

/// Speed of light (m/s)
pub const C_LIGHT: f64 = 2.99792458e8;

/// Momentum of a 1 MeV/c particle (kg m/s)
pub const P_MEV_C: f64 = 1.0e6 * Q_ELEMENTARY / C_LIGHT;
