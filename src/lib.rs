//! # Weak lensing maps
//!
//! Convergence (κ) and shear (γ1, γ2) maps of a lens for a list of source redshifts.
//!
//! The grid is sized from the lens mass map and is the same for all the source redshifts,
//! for each redshift the lens source plane is moved, a new grid is built and the maps are written:
//! ```no_run
//! use lens_maps::{MassMapGrid, MassMapLens, ParamFile, RunContext, RunDriver, RunOptions, StatusReporter};
//!
//! # fn main() -> anyhow::Result<()> {
//! let params = ParamFile::load("paramfile")?;
//! let mut lens = MassMapLens::from_params(&params)?;
//! let mut status = StatusReporter::default();
//! let mut context = RunContext::new(&params, &mut lens, RunOptions::default(), &mut status)?;
//! RunDriver::<MassMapGrid>::run(&mut context, &mut status)?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
mod error;
pub mod geometry;
pub mod lens;
pub mod maps;
pub mod params;
pub mod redshifts;
pub mod run;
pub mod status;

pub use backend::{MassMapGrid, MassMapLens};
pub use error::RunError;
pub use geometry::GridGeometry;
pub use lens::{EvaluationGrid, Lens, MassMap, Quantity};
pub use maps::{MapNaming, MapProductWriter};
pub use params::ParamFile;
pub use redshifts::RedshiftList;
pub use run::{RunContext, RunDriver, RunOptions, RunSummary};
pub use status::StatusReporter;
