use crate::{
    geometry::GeometryError, lens::LensError, maps::MapWriteError, params::ParamsError,
    redshifts::RedshiftError,
};

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("configuration error")]
    Params(#[from] ParamsError),
    #[error("invalid source redshifts")]
    Redshifts(#[from] RedshiftError),
    #[error("invalid grid geometry")]
    Geometry(#[from] GeometryError),
    #[error("failed to move the source plane to z={1}")]
    ResetPlane(#[source] LensError, f64),
    #[error("failed to build the lensing grid for z={1}")]
    Grid(#[source] LensError, f64),
    #[error("failed to write the lensing maps")]
    Write(#[from] MapWriteError),
    #[error("failed to write the run status")]
    Console(#[from] std::io::Error),
}
