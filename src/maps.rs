//! Lensing map products
//!
//! The maps of a source redshift `z` are written to `{base}.z{z}` where `z` is
//! printed with as many digits as it needs (`1.0` gives `run.z1`).

use std::{cell::Cell, fmt, str::FromStr};

use crate::{
    geometry::GridGeometry,
    lens::{EvaluationGrid, Lens, LensError, Quantity},
};

/// Marker prefix requesting the grid writer to overwrite an existing file
pub const OVERWRITE: &str = "!";

#[derive(Debug, thiserror::Error)]
#[error("failed to write the {quantity} map to {path}")]
pub struct MapWriteError {
    pub quantity: Quantity,
    pub path: String,
    #[source]
    pub source: LensError,
}

/// Output file naming scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapNaming {
    /// All the quantities of a source redshift share the same file
    #[default]
    PerRedshift,
    /// Each quantity gets its own file: `{base}.z{z}.{quantity}`
    PerQuantity,
}
impl FromStr for MapNaming {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "redshift" => Ok(MapNaming::PerRedshift),
            "quantity" => Ok(MapNaming::PerQuantity),
            _ => Err(format!(r#"expected "redshift" or "quantity", found {s:?}"#)),
        }
    }
}
impl fmt::Display for MapNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapNaming::PerRedshift => write!(f, "redshift"),
            MapNaming::PerQuantity => write!(f, "quantity"),
        }
    }
}

/// Writes the κ, γ1 and γ2 maps of a source redshift
#[derive(Debug)]
pub struct MapProductWriter {
    base: String,
    naming: MapNaming,
    center: [f64; 2],
    resolution: usize,
    warned: Cell<bool>,
}
impl MapProductWriter {
    pub fn new(
        base: impl Into<String>,
        naming: MapNaming,
        center: [f64; 2],
        resolution: usize,
    ) -> Self {
        Self {
            base: base.into(),
            naming,
            center,
            resolution,
            warned: Cell::new(false),
        }
    }
    /// Writer for maps centered on the grid with the grid output resolution
    pub fn from_geometry(
        base: impl Into<String>,
        naming: MapNaming,
        geometry: &GridGeometry,
    ) -> Self {
        Self::new(base, naming, geometry.center, geometry.output_resolution)
    }
    /// Output file of a source redshift
    pub fn output_path(&self, z: f64) -> String {
        format!("{}.z{}", self.base, z)
    }
    /// Output file of a quantity at a source redshift
    pub fn destination(&self, z: f64, quantity: Quantity) -> String {
        match self.naming {
            MapNaming::PerRedshift => self.output_path(z),
            MapNaming::PerQuantity => format!("{}.{}", self.output_path(z), quantity),
        }
    }
    /// Writes the map of `quantity` sampled from `grid`, replacing any existing file
    ///
    /// Returns the path of the file
    pub fn write<L, G>(
        &self,
        grid: &G,
        z: f64,
        quantity: Quantity,
    ) -> Result<String, MapWriteError>
    where
        L: Lens,
        G: EvaluationGrid<L>,
    {
        let path = self.destination(z, quantity);
        if self.naming == MapNaming::PerRedshift
            && quantity != Quantity::Kappa
            && !self.warned.replace(true)
        {
            log::warn!(
                "all maps of a source redshift are written to the same file, \
                 {quantity} replaces the previous map unless the writer keeps them apart"
            );
        }
        log::debug!("writing {quantity} map ({0}x{0}) to {path}", self.resolution);
        grid.write_map(
            self.center,
            self.resolution,
            self.resolution,
            quantity,
            &format!("{OVERWRITE}{path}"),
        )
        .map_err(|source| MapWriteError {
            quantity,
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
    pub fn resolution(&self) -> usize {
        self.resolution
    }
    pub fn naming(&self) -> MapNaming {
        self.naming
    }
}
