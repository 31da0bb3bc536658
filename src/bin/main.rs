use std::time::Instant;

use anyhow::Context;
use lens_maps::{
    MapNaming, MassMapGrid, MassMapLens, ParamFile, RunContext, RunDriver, RunOptions,
    StatusReporter,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "lens-maps",
    about = "Weak lensing convergence and shear maps of a mass map lens"
)]
struct Opt {
    /// Path to the parameter file
    #[structopt(default_value = "paramfile")]
    paramfile: String,
}

fn main() -> anyhow::Result<()> {
    let start = Instant::now();
    env_logger::init();
    let opt = Opt::from_args();

    let params = ParamFile::load(&opt.paramfile)?;
    let mut lens = MassMapLens::from_params(&params)
        .with_context(|| format!("failed to build the lens from {}", opt.paramfile))?;
    let options = RunOptions {
        start,
        output_resolution: params.get_parsed("output_resolution")?,
        naming: params
            .get_parsed::<MapNaming>("map_naming")?
            .unwrap_or_default(),
    };

    let mut status = StatusReporter::default();
    let mut context = RunContext::new(&params, &mut lens, options, &mut status)?;
    let summary = RunDriver::<MassMapGrid>::run(&mut context, &mut status)?;
    log::info!("{} map file(s) written", summary.paths.len());

    Ok(())
}
