//! Console status of a lensing map run

use std::io::{self, Stdout, Write};

use crate::{
    geometry::GridGeometry,
    lens::{CosmologyParams, Lens, MassMap},
    redshifts::RedshiftList,
};

/// Run progress written to the console (or any writer)
pub struct StatusReporter<W: Write = Stdout> {
    out: W,
}
impl Default for StatusReporter {
    fn default() -> Self {
        Self { out: io::stdout() }
    }
}
impl<W: Write> StatusReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
    pub fn into_inner(self) -> W {
        self.out
    }
    pub fn cosmology(&mut self, cosmo: &CosmologyParams) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "cosmology")?;
        writeln!(self.out, "  h: {}", cosmo.h)?;
        writeln!(self.out, "  Omega_m: {}", cosmo.omega_matter)?;
        writeln!(self.out, "  Omega_L: {}", cosmo.omega_lambda)
    }
    pub fn lens<L: Lens>(&mut self, lens: &L, redshifts: &RedshiftList) -> io::Result<()> {
        writeln!(self.out, "lens")?;
        writeln!(self.out, "  number of planes: {}", lens.n_planes())?;
        writeln!(self.out, "  source redshifts: {}", redshifts)
    }
    pub fn mass_map<M: MassMap + ?Sized>(&mut self, mass_map: &M) -> io::Result<()> {
        writeln!(self.out, "mass map")?;
        writeln!(self.out, "  size: {}", mass_map.n())
    }
    pub fn grid(&mut self, geometry: &GridGeometry) -> io::Result<()> {
        let [x, y] = geometry.center;
        writeln!(self.out, "grid")?;
        writeln!(self.out, "  size: {}", geometry.grid_size)?;
        writeln!(self.out, "  center: ({}, {})", x, y)?;
        writeln!(self.out, "  range: {} deg", geometry.range_deg())?;
        writeln!(self.out, "lensing map")?;
        writeln!(
            self.out,
            "  resolution: {0}x{0}",
            geometry.output_resolution
        )
    }
    pub fn source_redshift(&mut self, z: f64) -> io::Result<()> {
        writeln!(self.out, "source redshift {}", z)
    }
    /// Announces a step, flushing so that it shows while the step runs
    pub fn start(&mut self, step: &str) -> io::Result<()> {
        write!(self.out, "  {} ", step)?;
        self.out.flush()
    }
    pub fn done(&mut self) -> io::Result<()> {
        writeln!(self.out, "done")
    }
    pub fn finished(&mut self, minutes: f64) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "finished in {} mins", minutes)?;
        self.out.flush()
    }
}
