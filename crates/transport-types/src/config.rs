// ─────────────────────────────────────────────────────────────────────
// SCPN Transport Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::error::{TransportError, TransportResult};

/// Tolerances and limits for the adaptive field driver.
///
/// Lengths are in meters. The defaults are tuned for detector-scale
/// geometries (millimeter surfaces, micron boundary tolerances).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldDriverOptions {
    /// Smallest arc length worth integrating.
    pub minimum_step: f64,
    /// Cap on a single driver call, so effectively unbounded requests
    /// stay finite inside the integrator.
    pub max_step: f64,
    /// Maximum allowed distance between the curved path and its chord.
    pub delta_chord: f64,
    /// Surface-proximity tolerance for boundary intercepts.
    pub delta_intersection: f64,
    /// Relative truncation error bound per substep.
    pub epsilon_rel_max: f64,
}

impl Default for FieldDriverOptions {
    fn default() -> Self {
        FieldDriverOptions {
            minimum_step: 1.0e-5,
            max_step: 1.0e6,
            delta_chord: 2.5e-2,
            delta_intersection: 1.0e-4,
            epsilon_rel_max: 1.0e-3,
        }
    }
}

impl FieldDriverOptions {
    pub fn validate(&self) -> TransportResult<()> {
        for (name, value) in [
            ("minimum_step", self.minimum_step),
            ("max_step", self.max_step),
            ("delta_chord", self.delta_chord),
            ("delta_intersection", self.delta_intersection),
            ("epsilon_rel_max", self.epsilon_rel_max),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TransportError::ConfigError(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }
        if self.minimum_step >= self.max_step {
            return Err(TransportError::ConfigError(format!(
                "minimum_step ({}) must be below max_step ({})",
                self.minimum_step, self.max_step
            )));
        }
        Ok(())
    }
}

/// Options for the boundary-aware substep loop around the driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldPropagatorOptions {
    pub driver: FieldDriverOptions,
    /// Number of accepted substeps before a track is declared looping.
    pub max_substeps: i16,
}

impl Default for FieldPropagatorOptions {
    fn default() -> Self {
        FieldPropagatorOptions {
            driver: FieldDriverOptions::default(),
            max_substeps: 100,
        }
    }
}

impl FieldPropagatorOptions {
    /// Build from driver tolerances, keeping the default substep budget.
    pub fn from_driver(driver: &FieldDriverOptions) -> Self {
        FieldPropagatorOptions {
            driver: driver.clone(),
            max_substeps: 100,
        }
    }

    /// Load from a JSON file.
    pub fn from_file(path: &str) -> TransportResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&contents)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> TransportResult<()> {
        self.driver.validate()?;
        if self.max_substeps <= 0 {
            return Err(TransportError::ConfigError(format!(
                "max_substeps must be > 0, got {}",
                self.max_substeps
            )));
        }
        Ok(())
    }

    /// Distance close enough to a surface to count as hitting it.
    pub fn delta_intersection(&self) -> f64 {
        self.driver.delta_intersection
    }

    /// Displacement used to dislodge a track that cannot leave a surface.
    pub fn bump_distance(&self) -> f64 {
        0.1 * self.delta_intersection()
    }

    /// Smallest substep the loop will attempt.
    pub fn minimum_substep(&self) -> f64 {
        self.driver.minimum_step
    }
}
