use std::{fs::File, io::BufReader, path::Path, time::Instant};

use npyz::NpyFile;

use crate::{lens::MassMap, params::ParamFile};

use super::{BackendError, Result};

/// Square map of projected masses
#[derive(Debug, Clone)]
pub struct MassMapData {
    n: usize,
    center: [f64; 2],
    range: f64,
    /// pixel masses [M☉], row major with `y` along the rows
    mass: Vec<f64>,
}
impl MassMapData {
    /// Creates a `n`x`n` mass map from the pixel masses [M☉]
    pub fn new(n: usize, mass: Vec<f64>, center: [f64; 2], range: f64) -> Result<Self> {
        if n == 0 || mass.len() != n * n {
            return Err(BackendError::Shape(vec![mass.len() as u64]));
        }
        if let Some(m) = mass.iter().find(|m| !m.is_finite()) {
            return Err(BackendError::Mass(*m));
        }
        Ok(Self {
            n,
            center,
            range,
            mass,
        })
    }
    /// Loads the pixel masses from a 2D `.npy` file
    pub fn load<P: AsRef<Path>>(path: P, center: [f64; 2], range: f64) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading mass map {:?}...", path);
        let now = Instant::now();
        let file =
            File::open(path).map_err(|e| BackendError::Read(e, path.display().to_string()))?;
        let npy = NpyFile::new(BufReader::new(file))?;
        let shape = npy.shape().to_vec();
        let n = match shape.as_slice() {
            &[ny, nx] if nx == ny => nx as usize,
            _ => return Err(BackendError::Shape(shape)),
        };
        let mass: Vec<f64> = npy.into_vec()?;
        log::info!("... loaded {n}x{n} pixels in {:}ms", now.elapsed().as_millis());
        Self::new(n, mass, center, range)
    }
    /// Loads the mass map given by the `mass_map`, `mass_map_center_x`,
    /// `mass_map_center_y` and `mass_map_range` parameters
    pub fn from_params(params: &ParamFile) -> Result<Self> {
        let center = [
            params.get_parsed("mass_map_center_x")?.unwrap_or(0.),
            params.get_parsed("mass_map_center_y")?.unwrap_or(0.),
        ];
        let range = params.require_parsed("mass_map_range")?;
        Self::load(params.require("mass_map")?, center, range)
    }
    /// Angular size of a pixel [rad]
    pub fn pixel_size(&self) -> f64 {
        self.range / self.n as f64
    }
    pub fn mass(&self) -> &[f64] {
        &self.mass
    }
    pub fn total_mass(&self) -> f64 {
        self.mass.iter().sum()
    }
    /// Angular position of the center of pixel (`i`,`j`) [rad], `i` along x
    pub fn pixel_position(&self, i: usize, j: usize) -> [f64; 2] {
        let d = self.pixel_size();
        let [x0, y0] = self.origin();
        [x0 + (i as f64 + 0.5) * d, y0 + (j as f64 + 0.5) * d]
    }
    /// Lower left corner of the map [rad]
    pub fn origin(&self) -> [f64; 2] {
        let [x, y] = self.center;
        [x - 0.5 * self.range, y - 0.5 * self.range]
    }
    /// Index of the pixel containing the angular position `[x,y]`
    pub fn pixel_at(&self, [x, y]: [f64; 2]) -> Option<usize> {
        let [x0, y0] = self.origin();
        let d = self.pixel_size();
        let (u, v) = ((x - x0) / d, (y - y0) / d);
        if u < 0. || v < 0. {
            return None;
        }
        let (i, j) = (u.floor() as usize, v.floor() as usize);
        (i < self.n && j < self.n).then_some(j * self.n + i)
    }
}
impl MassMap for MassMapData {
    fn n(&self) -> usize {
        self.n
    }
    fn center(&self) -> [f64; 2] {
        self.center
    }
    fn range_rad(&self) -> f64 {
        self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixels() {
        let map = MassMapData::new(4, vec![1.; 16], [0.01, 0.], 0.04).unwrap();
        assert_eq!(map.total_mass(), 16.);
        assert!((map.pixel_size() - 0.01).abs() < 1e-15);
        let [x, y] = map.pixel_position(0, 3);
        assert!((x + 0.005).abs() < 1e-12 && (y - 0.015).abs() < 1e-12);
        assert_eq!(map.pixel_at([x, y]), Some(12));
        assert_eq!(map.pixel_at([0.0149, -0.0199]), Some(2));
        assert_eq!(map.pixel_at([0.04, 0.]), None);
        assert_eq!(map.pixel_at([0., -0.03]), None);
    }

    #[test]
    fn bad_shapes() {
        assert!(matches!(
            MassMapData::new(3, vec![0.; 8], [0.; 2], 0.01),
            Err(BackendError::Shape(_))
        ));
        assert!(matches!(
            MassMapData::new(1, vec![f64::NAN], [0.; 2], 0.01),
            Err(BackendError::Mass(_))
        ));
    }
}
