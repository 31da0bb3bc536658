use crate::{
    lens::{CosmologyParams, Lens, LensError},
    params::ParamFile,
};

use super::{BackendError, Cosmology, MassMapData, Result};

/// Single plane lens made of a mass map
#[derive(Debug, Clone)]
pub struct MassMapLens {
    cosmology: Cosmology,
    mass_map: MassMapData,
    z_lens: f64,
    z_source: f64,
    /// physical area of a mass map pixel [Mpc²]
    pixel_area: f64,
    /// 1/Σcr [Mpc²/M☉]
    sigma_crit_inv: f64,
}
impl MassMapLens {
    pub fn new(
        cosmology: Cosmology,
        mass_map: MassMapData,
        z_lens: f64,
        z_source: f64,
    ) -> Result<Self> {
        if !(z_lens.is_finite() && z_lens > 0.) {
            return Err(BackendError::Redshift(z_lens));
        }
        let mut this = Self {
            cosmology,
            mass_map,
            z_lens,
            z_source,
            pixel_area: 0.,
            sigma_crit_inv: 0.,
        };
        this.update(z_source, true)?;
        Ok(this)
    }
    /// Builds the lens from the `z_lens` and `z_source` parameters,
    /// the [cosmology](Cosmology::from_params) and the [mass map](MassMapData::from_params)
    pub fn from_params(params: &ParamFile) -> Result<Self> {
        let cosmology = Cosmology::from_params(params)?;
        let mass_map = MassMapData::from_params(params)?;
        Self::new(
            cosmology,
            mass_map,
            params.require_parsed("z_lens")?,
            params.require_parsed("z_source")?,
        )
    }
    fn update(&mut self, z_source: f64, full_reset: bool) -> Result<()> {
        if !(z_source.is_finite() && z_source >= 0.) {
            return Err(BackendError::Redshift(z_source));
        }
        if full_reset {
            let d_l = self.cosmology.angular_diameter_distance(0., self.z_lens);
            self.pixel_area = (d_l * self.mass_map.pixel_size()).powi(2);
        }
        self.sigma_crit_inv = self.cosmology.sigma_crit(self.z_lens, z_source).recip();
        self.z_source = z_source;
        if self.sigma_crit_inv == 0. {
            log::warn!(
                "source plane at z={z_source} is not behind the lens at z={}",
                self.z_lens
            );
        }
        Ok(())
    }
    pub fn z_lens(&self) -> f64 {
        self.z_lens
    }
    /// Convergence of each mass map pixel for the current source plane
    pub fn convergence(&self) -> Vec<f64> {
        let scale = self.sigma_crit_inv / self.pixel_area;
        self.mass_map.mass().iter().map(|m| m * scale).collect()
    }
}
impl Lens for MassMapLens {
    type MassMap = MassMapData;

    fn cosmology(&self) -> CosmologyParams {
        self.cosmology.params()
    }
    fn n_planes(&self) -> usize {
        1
    }
    fn source_z(&self) -> f64 {
        self.z_source
    }
    fn mass_map(&self) -> &MassMapData {
        &self.mass_map
    }
    fn reset_source_plane(
        &mut self,
        z: f64,
        full_reset: bool,
    ) -> std::result::Result<(), LensError> {
        Ok(self.update(z, full_reset)?)
    }
}
