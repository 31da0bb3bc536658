//! Lens, mass map and evaluation grid capabilities
//!
//! The map pipeline only talks to the lens model through these traits,
//! [backend](crate::backend) provides the mass map lens used by the `lens-maps` binary.

use std::{error::Error, fmt};

use strum_macros::EnumIter;

/// Error type of the lens model collaborators
pub type LensError = Box<dyn Error + Send + Sync>;

/// Key/value configuration lookup
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<&str>;
}

/// Cosmological parameters of a lens model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CosmologyParams {
    /// Hubble parameter in units of 100 km/s/Mpc
    pub h: f64,
    pub omega_matter: f64,
    pub omega_lambda: f64,
}

/// Native sampling of a mass map
pub trait MassMap {
    /// Number of pixels along one side of the (square) map
    fn n(&self) -> usize;
    /// Angular center [rad]
    fn center(&self) -> [f64; 2];
    /// Angular width of the (square) map [rad]
    fn range_rad(&self) -> f64;
}

/// Lens model
pub trait Lens {
    type MassMap: MassMap;

    fn cosmology(&self) -> CosmologyParams;
    /// Number of lens planes
    fn n_planes(&self) -> usize;
    /// Current source plane redshift
    fn source_z(&self) -> f64;
    /// The mass map of the main halo
    fn mass_map(&self) -> &Self::MassMap;
    /// Moves the source plane to redshift `z`
    ///
    /// Only the source dependent quantities are updated unless `full_reset` is set
    fn reset_source_plane(&mut self, z: f64, full_reset: bool) -> Result<(), LensError>;
}

/// Lensing quantities written to the maps
#[derive(EnumIter, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Kappa,
    Gamma1,
    Gamma2,
}
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Kappa => write!(f, "kappa"),
            Quantity::Gamma1 => write!(f, "gamma1"),
            Quantity::Gamma2 => write!(f, "gamma2"),
        }
    }
}

/// Grid of lensing quantities evaluated for the current source plane of a lens
pub trait EvaluationGrid<L: Lens>: Sized {
    /// Samples the lens with `size`x`size` points over `range_x`x`range_y` [rad]
    fn build(
        lens: &L,
        size: usize,
        center: [f64; 2],
        range_x: f64,
        range_y: f64,
    ) -> Result<Self, LensError>;
    /// Writes a `nx`x`ny` map of `quantity` centered on `center`
    ///
    /// A leading `!` in `destination` overwrites an existing file
    fn write_map(
        &self,
        center: [f64; 2],
        nx: usize,
        ny: usize,
        quantity: Quantity,
        destination: &str,
    ) -> Result<(), LensError>;
}
