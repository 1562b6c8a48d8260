//! Bilinear interpolation on a uniform R-Z grid.

use ndarray::Array2;

/// Uniform cylindrical grid: R from zero, Z from `offset_z`, shared
/// spacing `delta` in both directions.
#[derive(Debug, Clone)]
pub struct RzGrid {
    pub nr: usize,
    pub nz: usize,
    pub delta: f64,
    pub offset_z: f64,
}

impl RzGrid {
    pub fn new(nr: usize, nz: usize, delta: f64, offset_z: f64) -> Self {
        RzGrid {
            nr,
            nz,
            delta,
            offset_z,
        }
    }

    /// Largest radius covered by the grid.
    pub fn r_max(&self) -> f64 {
        (self.nr - 1) as f64 * self.delta
    }

    /// Vertical extent covered by the grid.
    pub fn z_range(&self) -> (f64, f64) {
        (
            self.offset_z,
            self.offset_z + (self.nz - 1) as f64 * self.delta,
        )
    }
}

/// Bilinear interpolation of `field` (shape `[nz, nr]`) at `(r, z)`.
/// Clamps to the grid edge outside the covered range.
pub fn interp2d(field: &Array2<f64>, grid: &RzGrid, r: f64, z: f64) -> f64 {
    let fr = r / grid.delta;
    let fz = (z - grid.offset_z) / grid.delta;

    let ir0 = (fr.floor() as isize).clamp(0, grid.nr as isize - 2) as usize;
    let iz0 = (fz.floor() as isize).clamp(0, grid.nz as isize - 2) as usize;
    let ir1 = ir0 + 1;
    let iz1 = iz0 + 1;

    let tr = (fr - ir0 as f64).clamp(0.0, 1.0);
    let tz = (fz - iz0 as f64).clamp(0.0, 1.0);

    let v00 = field[[iz0, ir0]];
    let v01 = field[[iz0, ir1]];
    let v10 = field[[iz1, ir0]];
    let v11 = field[[iz1, ir1]];

    (1.0 - tz) * ((1.0 - tr) * v00 + tr * v01) + tz * ((1.0 - tr) * v10 + tr * v11)
}
