//! Magnetic field models.
//!
//! The propagation core only needs a point sample `B(pos)`; concrete
//! models range from trivial (zero, uniform) to an interpolated
//! axisymmetric R-Z map loaded from JSON.

use ndarray::Array2;
use transport_math::interp::{interp2d, RzGrid};
use transport_types::error::{TransportError, TransportResult};
use transport_types::field_map::RZMapFieldInput;
use transport_types::state::Real3;

/// Minimum cylindrical radius for decomposing the radial component.
const R_AXIS_MIN: f64 = 1e-12;

/// A static magnetic field sampled pointwise [T].
pub trait MagneticField {
    fn value(&self, pos: &Real3) -> Real3;
}

/// Field-free space.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroField;

impl MagneticField for ZeroField {
    fn value(&self, _pos: &Real3) -> Real3 {
        [0.0; 3]
    }
}

/// Spatially constant field.
#[derive(Debug, Clone, Copy)]
pub struct UniformField {
    field: Real3,
}

impl UniformField {
    pub fn new(field: Real3) -> Self {
        UniformField { field }
    }

    /// Field of magnitude `bz` along +z.
    pub fn along_z(bz: f64) -> Self {
        UniformField {
            field: [0.0, 0.0, bz],
        }
    }
}

impl MagneticField for UniformField {
    fn value(&self, _pos: &Real3) -> Real3 {
        self.field
    }
}

/// Axisymmetric field interpolated bilinearly on a uniform R-Z grid.
///
/// The sampled `(B_r, B_z)` pair is rotated into Cartesian components
/// about the z axis. Positions outside the grid clamp to the edge
/// samples.
#[derive(Debug, Clone)]
pub struct RZMapField {
    grid: RzGrid,
    field_r: Array2<f64>,
    field_z: Array2<f64>,
}

impl RZMapField {
    pub fn new(input: &RZMapFieldInput) -> TransportResult<Self> {
        input.validate()?;
        let shape = (input.num_grid_z, input.num_grid_r);
        let field_z = Array2::from_shape_vec(shape, input.field_z.clone())
            .map_err(|e| TransportError::FieldMap(e.to_string()))?;
        let field_r = Array2::from_shape_vec(shape, input.field_r.clone())
            .map_err(|e| TransportError::FieldMap(e.to_string()))?;
        Ok(RZMapField {
            grid: RzGrid::new(
                input.num_grid_r,
                input.num_grid_z,
                input.delta_grid,
                input.offset_z,
            ),
            field_r,
            field_z,
        })
    }

    pub fn grid(&self) -> &RzGrid {
        &self.grid
    }
}

impl MagneticField for RZMapField {
    fn value(&self, pos: &Real3) -> Real3 {
        let r = (pos[0] * pos[0] + pos[1] * pos[1]).sqrt();
        let z = pos[2];
        let br = interp2d(&self.field_r, &self.grid, r, z);
        let bz = interp2d(&self.field_z, &self.grid, r, z);
        if r < R_AXIS_MIN {
            // On the axis the radial component has no defined azimuth.
            [0.0, 0.0, bz]
        } else {
            [br * pos[0] / r, br * pos[1] / r, bz]
        }
    }
}
