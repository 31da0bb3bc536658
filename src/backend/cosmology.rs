use crate::{lens::CosmologyParams, params::ParamFile};

use super::{BackendError, Result};

/// Speed of light [km/s]
pub const SPEED_OF_LIGHT: f64 = 299_792.458;
/// c²/(4πG) [M☉/Mpc]
pub const CRITICAL_DENSITY_FACTOR: f64 = 1.6625e18;
const N_STEP: usize = 1000;

/// ΛCDM cosmology with non-negative curvature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cosmology {
    h: f64,
    omega_matter: f64,
    omega_lambda: f64,
}
impl Default for Cosmology {
    fn default() -> Self {
        Self {
            h: 0.72,
            omega_matter: 0.25,
            omega_lambda: 0.75,
        }
    }
}
impl Cosmology {
    pub fn new(h: f64, omega_matter: f64, omega_lambda: f64) -> Result<Self> {
        let this = Self {
            h,
            omega_matter,
            omega_lambda,
        };
        if !(h > 0. && omega_matter >= 0. && this.omega_curvature() > -1e-9) {
            return Err(BackendError::Cosmology(this.params()));
        }
        Ok(this)
    }
    /// Cosmology from the `hubble`, `omega_matter` and `omega_lambda` parameters
    pub fn from_params(params: &ParamFile) -> Result<Self> {
        let default = Self::default();
        Self::new(
            params.get_parsed("hubble")?.unwrap_or(default.h),
            params
                .get_parsed("omega_matter")?
                .unwrap_or(default.omega_matter),
            params
                .get_parsed("omega_lambda")?
                .unwrap_or(default.omega_lambda),
        )
    }
    pub fn params(&self) -> CosmologyParams {
        CosmologyParams {
            h: self.h,
            omega_matter: self.omega_matter,
            omega_lambda: self.omega_lambda,
        }
    }
    pub fn omega_curvature(&self) -> f64 {
        1. - self.omega_matter - self.omega_lambda
    }
    /// c/H0 [Mpc]
    pub fn hubble_distance(&self) -> f64 {
        SPEED_OF_LIGHT / (100. * self.h)
    }
    fn e(&self, z: f64) -> f64 {
        let a = 1. + z;
        (self.omega_matter * a.powi(3) + self.omega_curvature() * a * a + self.omega_lambda).sqrt()
    }
    /// Line-of-sight comoving distance between `z1` and `z2` [Mpc]
    pub fn comoving_distance(&self, z1: f64, z2: f64) -> f64 {
        if z2 <= z1 {
            return 0.;
        }
        // Simpson's rule
        let dz = (z2 - z1) / N_STEP as f64;
        let f = |i: usize| 1. / self.e(z1 + i as f64 * dz);
        let sum = (1..N_STEP)
            .map(|i| if i % 2 == 0 { 2. * f(i) } else { 4. * f(i) })
            .sum::<f64>()
            + f(0)
            + f(N_STEP);
        self.hubble_distance() * sum * dz / 3.
    }
    /// Transverse comoving distance to `z` [Mpc]
    pub fn transverse_distance(&self, z: f64) -> f64 {
        let d_c = self.comoving_distance(0., z);
        let ok = self.omega_curvature();
        if ok.abs() < 1e-9 {
            return d_c;
        }
        let d_h = self.hubble_distance();
        let sqrt_ok = ok.sqrt();
        d_h / sqrt_ok * (sqrt_ok * d_c / d_h).sinh()
    }
    /// Angular diameter distance of `z2` seen from `z1` [Mpc]
    pub fn angular_diameter_distance(&self, z1: f64, z2: f64) -> f64 {
        if z2 <= z1 {
            return 0.;
        }
        let d_h2 = self.hubble_distance().powi(2);
        let ok = self.omega_curvature().max(0.);
        let d1 = self.transverse_distance(z1);
        let d2 = self.transverse_distance(z2);
        let d12 = d2 * (1. + ok * d1 * d1 / d_h2).sqrt() - d1 * (1. + ok * d2 * d2 / d_h2).sqrt();
        d12 / (1. + z2)
    }
    /// Critical surface density for a lens at `z_lens` and sources at `z_source` [M☉/Mpc²]
    ///
    /// Infinite if the sources are not behind the lens
    pub fn sigma_crit(&self, z_lens: f64, z_source: f64) -> f64 {
        let d_ls = self.angular_diameter_distance(z_lens, z_source);
        if d_ls <= 0. {
            return f64::INFINITY;
        }
        let d_l = self.angular_diameter_distance(0., z_lens);
        let d_s = self.angular_diameter_distance(0., z_source);
        CRITICAL_DENSITY_FACTOR * d_s / (d_l * d_ls)
    }
}
