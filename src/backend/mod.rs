//! Mass map lens
//!
//! A single lens plane made of a map of projected masses, read from a `.npy` file.
//! The grid samples the convergence of the mass map pixels and the shear of all
//! the pixels by direct summation, and writes maps as `.npy` files.
//! Direct summation scales as the square of both the grid and the mass map
//! sizes, so the backend suits small mass maps (a few hundred pixels on a side).

use crate::{lens::CosmologyParams, params::ParamsError};

pub mod cosmology;
mod grid;
mod lens;
mod mass_map;
pub use cosmology::Cosmology;
pub use grid::MassMapGrid;
pub use lens::MassMapLens;
pub use mass_map::MassMapData;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("lens parameters error")]
    Params(#[from] ParamsError),
    #[error("unsupported cosmology {0:?}, expected h > 0, Omega_m >= 0 and Omega_m + Omega_L <= 1")]
    Cosmology(CosmologyParams),
    #[error("failed to read {1}")]
    Read(#[source] std::io::Error, String),
    #[error("failed to write {1}")]
    Write(#[source] std::io::Error, String),
    #[error("failed to read or write a numpy array")]
    Npy(#[from] std::io::Error),
    #[error("expected a square 2D mass map, found shape {0:?}")]
    Shape(Vec<u64>),
    #[error("invalid pixel mass {0}")]
    Mass(f64),
    #[error("invalid lens or source redshift {0}")]
    Redshift(f64),
    #[error("the lensing grid needs at least 2x2 points, found {0}")]
    GridSize(usize),
}
type Result<T> = std::result::Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use npyz::WriterBuilder;
    use std::{
        fs::{self, File},
        io::BufWriter,
        path::{Path, PathBuf},
    };

    use rand::Rng;

    use super::*;
    use crate::{
        lens::Lens,
        params::ParamFile,
        run::{RunContext, RunDriver, RunOptions},
        status::StatusReporter,
    };

    fn workspace(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("lens-maps-{name}-{}", std::process::id()));
        fs::create_dir_all(&path).unwrap();
        path
    }

    fn write_mass_map(path: &Path, n: usize) {
        let mut rng = rand::thread_rng();
        let mass: Vec<f64> = (0..n * n).map(|_| rng.gen_range(0f64..1e12)).collect();
        let mut writer = npyz::WriteOptions::<f64>::new()
            .default_dtype()
            .shape(&[n as u64, n as u64])
            .writer(BufWriter::new(File::create(path).unwrap()))
            .begin_nd()
            .unwrap();
        writer.extend(mass).unwrap();
        writer.finish().unwrap();
    }

    fn read_shape(path: &Path) -> Vec<u64> {
        let bytes = fs::read(path).unwrap();
        npyz::NpyFile::new(&bytes[..]).unwrap().shape().to_vec()
    }

    #[test]
    fn lens_from_params() {
        let root = workspace("params");
        let mass_map = root.join("mass.npy");
        write_mass_map(&mass_map, 5);
        let params: ParamFile = format!(
            "mass_map {}\nmass_map_range 1e-3\nmass_map_center_x 2e-3\nz_lens 0.4\nz_source 1.5\nhubble 0.7",
            mass_map.display()
        )
        .parse()
        .unwrap();
        let lens = MassMapLens::from_params(&params).unwrap();
        assert_eq!(lens.source_z(), 1.5);
        assert_eq!(lens.z_lens(), 0.4);
        assert_eq!(lens.cosmology().h, 0.7);
        assert_eq!(lens.cosmology().omega_matter, 0.25);
        assert_eq!(crate::lens::MassMap::n(lens.mass_map()), 5);
        assert_eq!(crate::lens::MassMap::center(lens.mass_map()), [2e-3, 0.]);

        let missing = params.clone().set("mass_map", root.join("nope.npy").display());
        assert!(matches!(
            MassMapLens::from_params(&missing),
            Err(BackendError::Read(..))
        ));
        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn rectangular_mass_map() {
        let root = workspace("shape");
        let path = root.join("mass.npy");
        let mut writer = npyz::WriteOptions::<f64>::new()
            .default_dtype()
            .shape(&[2, 3])
            .writer(BufWriter::new(File::create(&path).unwrap()))
            .begin_nd()
            .unwrap();
        writer.extend(vec![1f64; 6]).unwrap();
        writer.finish().unwrap();
        assert!(matches!(
            MassMapData::load(&path, [0.; 2], 1e-3),
            Err(BackendError::Shape(shape)) if shape == [2, 3]
        ));
        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn maps_for_two_source_redshifts() {
        let root = workspace("run");
        let mass_map = root.join("mass.npy");
        write_mass_map(&mass_map, 6);
        let output = root.join("run1");
        let params: ParamFile = format!(
            "outputfile {}\nredshifts 1.0, 2.0\nmass_map {}\nmass_map_range 1e-3\nz_lens 0.3\nz_source 1.0",
            output.display(),
            mass_map.display()
        )
        .parse()
        .unwrap();
        let mut lens = MassMapLens::from_params(&params).unwrap();
        let options = RunOptions {
            output_resolution: Some(4),
            naming: crate::maps::MapNaming::PerQuantity,
            ..Default::default()
        };
        let mut status = StatusReporter::new(Vec::new());
        let mut context = RunContext::new(&params, &mut lens, options, &mut status).unwrap();
        assert_eq!(context.geometry().grid_size, 16);
        let summary = RunDriver::<MassMapGrid>::run(&mut context, &mut status).unwrap();
        assert_eq!(summary.paths.len(), 6);
        for path in &summary.paths {
            assert_eq!(read_shape(Path::new(path)), [4, 4]);
        }
        assert!(root.join("run1.z1.kappa").exists());
        assert!(root.join("run1.z2.gamma2").exists());
        assert_eq!(lens.source_z(), 2.);
        fs::remove_dir_all(root).unwrap();
    }
}
