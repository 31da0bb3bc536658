use std::f64::consts::PI;

use crate::lens::MassMap;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GeometryError {
    #[error("the mass map must have at least one pixel, found {0}")]
    Size(usize),
    #[error("invalid angular range {0} rad, expected a finite value > 0")]
    Range(f64),
    #[error("invalid map center ({0}, {1})")]
    Center(f64, f64),
    #[error("the lensing map resolution must be at least 1 pixel")]
    Resolution,
}
type Result<T> = std::result::Result<T, GeometryError>;

/// Evaluation grid geometry
///
/// The grid size is the power of 2 one step above the smallest power of 2
/// not less than the mass map size `N`, i.e. `2^(1+ceil(log2(N)))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    /// Number of grid points along one side
    pub grid_size: usize,
    /// Number of pixels along one side of the written maps
    pub output_resolution: usize,
    /// Angular center [rad]
    pub center: [f64; 2],
    /// Angular width [rad]
    pub range: f64,
}
impl GridGeometry {
    /// Derives the grid geometry of a mass map with `n`x`n` pixels
    pub fn resolve(n: usize, center: [f64; 2], range: f64) -> Result<Self> {
        if n == 0 {
            return Err(GeometryError::Size(n));
        }
        if !(range.is_finite() && range > 0.) {
            return Err(GeometryError::Range(range));
        }
        if !center.iter().all(|x| x.is_finite()) {
            return Err(GeometryError::Center(center[0], center[1]));
        }
        Ok(Self {
            grid_size: 2 * n.next_power_of_two(),
            output_resolution: n,
            center,
            range,
        })
    }
    /// Derives the grid geometry from the mass map descriptor
    pub fn from_mass_map<M: MassMap + ?Sized>(mass_map: &M) -> Result<Self> {
        Self::resolve(mass_map.n(), mass_map.center(), mass_map.range_rad())
    }
    /// Overrides the resolution of the written maps
    pub fn with_output_resolution(self, output_resolution: usize) -> Result<Self> {
        if output_resolution == 0 {
            return Err(GeometryError::Resolution);
        }
        Ok(Self {
            output_resolution,
            ..self
        })
    }
    /// Angular width [deg]
    pub fn range_deg(&self) -> f64 {
        self.range * 180. / PI
    }
}
