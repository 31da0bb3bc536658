//! Lensing maps run
//!
//! For each source redshift, the lens source plane is moved to the redshift,
//! a new grid is built and the κ, γ1 and γ2 maps are written.

use std::{io::Write, marker::PhantomData, time::Instant};

use strum::IntoEnumIterator;

use crate::{
    error::RunError,
    geometry::GridGeometry,
    lens::{ConfigSource, EvaluationGrid, Lens, Quantity},
    maps::{MapNaming, MapProductWriter},
    params::ParamsError,
    redshifts::RedshiftList,
    status::StatusReporter,
};

type Result<T> = std::result::Result<T, RunError>;

/// Settings of a run that do not come from the lens
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Program start, the reported run duration is measured from it
    pub start: Instant,
    /// Resolution of the written maps, the mass map resolution if `None`
    pub output_resolution: Option<usize>,
    pub naming: MapNaming,
}
impl Default for RunOptions {
    fn default() -> Self {
        Self {
            start: Instant::now(),
            output_resolution: None,
            naming: MapNaming::default(),
        }
    }
}

/// State of a lensing maps run
pub struct RunContext<'a, L: Lens> {
    start: Instant,
    lens: &'a mut L,
    redshifts: RedshiftList,
    geometry: GridGeometry,
    writer: MapProductWriter,
}
impl<'a, L: Lens> RunContext<'a, L> {
    /// Resolves the output file, the source redshifts and the grid geometry
    ///
    /// The lens cosmology is reported once the output file is known.
    /// No map is written and the lens is left untouched if any of them is invalid
    pub fn new<C, W>(
        params: &C,
        lens: &'a mut L,
        options: RunOptions,
        status: &mut StatusReporter<W>,
    ) -> Result<Self>
    where
        C: ConfigSource + ?Sized,
        W: Write,
    {
        let outputfile = params
            .get("outputfile")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ParamsError::Missing("outputfile".to_string()))?
            .to_string();
        status.cosmology(&lens.cosmology())?;
        let redshifts = RedshiftList::resolve(params.get("redshifts"), lens.source_z())?;
        let mut geometry = GridGeometry::from_mass_map(lens.mass_map())?;
        if let Some(n) = options.output_resolution {
            geometry = geometry.with_output_resolution(n)?;
        }
        let writer = MapProductWriter::from_geometry(outputfile, options.naming, &geometry);
        Ok(Self {
            start: options.start,
            lens,
            redshifts,
            geometry,
            writer,
        })
    }
    pub fn redshifts(&self) -> &RedshiftList {
        &self.redshifts
    }
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }
    pub fn writer(&self) -> &MapProductWriter {
        &self.writer
    }
    pub fn lens(&self) -> &L {
        &*self.lens
    }
    /// Moves the lens source plane, keeping the source independent quantities
    fn reset_plane(&mut self, z: f64) -> Result<()> {
        log::debug!("source plane reset to z={z}");
        self.lens
            .reset_source_plane(z, false)
            .map_err(|e| RunError::ResetPlane(e, z))
    }
}

/// Paths and duration of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub redshifts: Vec<f64>,
    pub paths: Vec<String>,
    pub minutes: f64,
}

/// Drives a lensing maps run with the grid `G`
pub struct RunDriver<G> {
    grid: PhantomData<G>,
}
impl<G> RunDriver<G> {
    /// Runs through all the source redshifts, stopping at the first error
    pub fn run<L, W>(
        context: &mut RunContext<'_, L>,
        status: &mut StatusReporter<W>,
    ) -> Result<RunSummary>
    where
        L: Lens,
        G: EvaluationGrid<L>,
        W: Write,
    {
        status.lens(&*context.lens, &context.redshifts)?;
        status.mass_map(context.lens.mass_map())?;
        status.grid(&context.geometry)?;

        let GridGeometry {
            grid_size,
            center,
            range,
            ..
        } = context.geometry;
        let mut paths = vec![];
        let redshifts = context.redshifts.to_vec();
        for &z in &redshifts {
            status.source_redshift(z)?;
            context.reset_plane(z)?;

            status.start("grid")?;
            let now = Instant::now();
            let grid = G::build(&*context.lens, grid_size, center, range, range)
                .map_err(|e| RunError::Grid(e, z))?;
            log::info!(
                "grid {0}x{0} built in {1:.3}s",
                grid_size,
                now.elapsed().as_secs_f64()
            );
            status.done()?;

            for quantity in Quantity::iter() {
                match quantity {
                    Quantity::Kappa => status.start("kappa")?,
                    Quantity::Gamma1 => status.start("gamma")?,
                    Quantity::Gamma2 => (),
                }
                let path = context.writer.write::<L, G>(&grid, z, quantity)?;
                if !paths.contains(&path) {
                    paths.push(path);
                }
                if quantity != Quantity::Gamma1 {
                    status.done()?;
                }
            }
        }

        let minutes = context.start.elapsed().as_secs_f64() / 60.;
        status.finished(minutes)?;
        Ok(RunSummary {
            redshifts,
            paths,
            minutes,
        })
    }
}
