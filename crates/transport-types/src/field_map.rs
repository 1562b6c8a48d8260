// ─────────────────────────────────────────────────────────────────────
// SCPN Transport Core — Field Map Input
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::error::{TransportError, TransportResult};

/// On-disk description of an axisymmetric magnetic field sampled on a
/// uniform R-Z grid.
///
/// Field samples are stored row-major with Z as the slow index: the value
/// at grid node `(iz, ir)` lives at `iz * num_grid_r + ir`. The radial
/// axis starts at R = 0; the vertical axis starts at `offset_z`. Both use
/// the same spacing `delta_grid` [m]; field values are in tesla.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RZMapFieldInput {
    pub num_grid_z: usize,
    pub num_grid_r: usize,
    pub delta_grid: f64,
    pub offset_z: f64,
    pub field_z: Vec<f64>,
    pub field_r: Vec<f64>,
}

impl RZMapFieldInput {
    /// Load and validate a field map from a JSON file.
    pub fn from_file(path: &str) -> TransportResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let input: Self = serde_json::from_str(&contents)?;
        input.validate()?;
        Ok(input)
    }

    pub fn validate(&self) -> TransportResult<()> {
        if self.num_grid_r < 2 || self.num_grid_z < 2 {
            return Err(TransportError::FieldMap(format!(
                "grid must be at least 2x2, got {}x{}",
                self.num_grid_z, self.num_grid_r
            )));
        }
        if !self.delta_grid.is_finite() || self.delta_grid <= 0.0 {
            return Err(TransportError::FieldMap(format!(
                "delta_grid must be finite and > 0, got {}",
                self.delta_grid
            )));
        }
        if !self.offset_z.is_finite() {
            return Err(TransportError::FieldMap(format!(
                "offset_z must be finite, got {}",
                self.offset_z
            )));
        }
        let expected = self.num_grid_r * self.num_grid_z;
        if self.field_z.len() != expected || self.field_r.len() != expected {
            return Err(TransportError::FieldMap(format!(
                "field arrays must have {} samples, got field_z={}, field_r={}",
                expected,
                self.field_z.len(),
                self.field_r.len()
            )));
        }
        if self.field_z.iter().chain(&self.field_r).any(|v| !v.is_finite()) {
            return Err(TransportError::FieldMap(
                "field samples must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
