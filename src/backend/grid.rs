use std::{
    f64::consts::PI,
    fs::{File, OpenOptions},
    io::BufWriter,
};

use indicatif::{ParallelProgressIterator, ProgressBar};
use npyz::WriterBuilder;
use rayon::prelude::*;

use crate::{
    lens::{EvaluationGrid, Lens, LensError, MassMap, Quantity},
    maps::OVERWRITE,
};

use super::{BackendError, MassMapLens};

/// κ, γ1 and γ2 sampled on a regular grid
///
/// The shear of every grid point sums the contributions of all the non-empty
/// mass map pixels, building a grid costs `O(size² N²)` kernel evaluations.
/// A `1000x1000` mass map on its `2048x2048` grid is out of reach, the grid
/// is meant for mass maps of a few hundred pixels on a side.
#[derive(Debug, Clone)]
pub struct MassMapGrid {
    size: usize,
    center: [f64; 2],
    range: [f64; 2],
    kappa: Vec<f64>,
    gamma1: Vec<f64>,
    gamma2: Vec<f64>,
}
impl MassMapGrid {
    /// Grid points spacing [rad]
    fn step(&self) -> [f64; 2] {
        let [rx, ry] = self.range;
        [rx / self.size as f64, ry / self.size as f64]
    }
    fn origin(&self) -> [f64; 2] {
        let ([x, y], [rx, ry]) = (self.center, self.range);
        [x - 0.5 * rx, y - 0.5 * ry]
    }
    pub fn size(&self) -> usize {
        self.size
    }
    /// Grid values of `quantity`, row major with `y` along the rows
    pub fn values(&self, quantity: Quantity) -> &[f64] {
        match quantity {
            Quantity::Kappa => &self.kappa,
            Quantity::Gamma1 => &self.gamma1,
            Quantity::Gamma2 => &self.gamma2,
        }
    }
    /// Bilinear interpolation of `quantity` at `[x,y]`, clamped to the grid edges
    pub fn interpolate(&self, quantity: Quantity, [x, y]: [f64; 2]) -> f64 {
        let values = self.values(quantity);
        let ([x0, y0], [dx, dy]) = (self.origin(), self.step());
        let n = self.size;
        let locate = |u: f64| {
            let u = u.clamp(0., (n - 1) as f64);
            let i = (u.floor() as usize).min(n - 2);
            (i, u - i as f64)
        };
        let (i, s) = locate((x - x0) / dx - 0.5);
        let (j, t) = locate((y - y0) / dy - 0.5);
        let v = |i: usize, j: usize| values[j * n + i];
        (1. - s) * (1. - t) * v(i, j)
            + s * (1. - t) * v(i + 1, j)
            + (1. - s) * t * v(i, j + 1)
            + s * t * v(i + 1, j + 1)
    }
    /// Resamples `quantity` to a `nx`x`ny` map of the grid field of view centered on `center`
    pub fn resample(&self, center: [f64; 2], nx: usize, ny: usize, quantity: Quantity) -> Vec<f64> {
        let ([cx, cy], [rx, ry]) = (center, self.range);
        (0..ny)
            .flat_map(|j| {
                let y = cy + ((j as f64 + 0.5) / ny as f64 - 0.5) * ry;
                (0..nx).map(move |i| [cx + ((i as f64 + 0.5) / nx as f64 - 0.5) * rx, y])
            })
            .map(|xy| self.interpolate(quantity, xy))
            .collect()
    }
}
impl EvaluationGrid<MassMapLens> for MassMapGrid {
    fn build(
        lens: &MassMapLens,
        size: usize,
        center: [f64; 2],
        range_x: f64,
        range_y: f64,
    ) -> Result<Self, LensError> {
        if size < 2 {
            return Err(BackendError::GridSize(size).into());
        }
        let mass_map = lens.mass_map();
        let n = mass_map.n();
        let d = mass_map.pixel_size();
        let pixel_area = d * d;
        let kappa_map = lens.convergence();
        // lensing pixels as (x, y, κ dA)
        let sources: Vec<[f64; 3]> = kappa_map
            .iter()
            .enumerate()
            .filter(|(_, k)| **k != 0.)
            .map(|(k, kappa)| {
                let [x, y] = mass_map.pixel_position(k % n, k / n);
                [x, y, kappa * pixel_area]
            })
            .collect();
        log::debug!(
            "sampling {0}x{0} grid points from {1} mass pixels",
            size,
            sources.len()
        );

        let mut this = Self {
            size,
            center,
            range: [range_x, range_y],
            kappa: Vec::with_capacity(size * size),
            gamma1: Vec::with_capacity(size * size),
            gamma2: Vec::with_capacity(size * size),
        };
        let ([x0, y0], [dx, dy]) = (this.origin(), this.step());
        let pb = ProgressBar::new(size as u64);
        let rows: Vec<Vec<[f64; 3]>> = (0..size)
            .into_par_iter()
            .progress_with(pb)
            .map(|j| {
                let y = y0 + (j as f64 + 0.5) * dy;
                (0..size)
                    .map(|i| {
                        let x = x0 + (i as f64 + 0.5) * dx;
                        let kappa = mass_map
                            .pixel_at([x, y])
                            .map_or(0., |k| kappa_map[k]);
                        let (g1, g2) = sources
                            .iter()
                            .map(|[xs, ys, w]| (x - xs, y - ys, w))
                            .filter(|(rx, ry, _)| rx.abs() >= 0.5 * d || ry.abs() >= 0.5 * d)
                            .fold((0., 0.), |(g1, g2), (rx, ry, w)| {
                                let r4 = (rx * rx + ry * ry).powi(2);
                                (g1 + w * (ry * ry - rx * rx) / r4, g2 - w * 2. * rx * ry / r4)
                            });
                        [kappa, g1 / PI, g2 / PI]
                    })
                    .collect()
            })
            .collect();
        for [kappa, g1, g2] in rows.into_iter().flatten() {
            this.kappa.push(kappa);
            this.gamma1.push(g1);
            this.gamma2.push(g2);
        }
        Ok(this)
    }

    fn write_map(
        &self,
        center: [f64; 2],
        nx: usize,
        ny: usize,
        quantity: Quantity,
        destination: &str,
    ) -> Result<(), LensError> {
        let (path, overwrite) = match destination.strip_prefix(OVERWRITE) {
            Some(path) => (path, true),
            None => (destination, false),
        };
        let map = self.resample(center, nx, ny, quantity);
        let file = if overwrite {
            File::create(path)
        } else {
            OpenOptions::new().write(true).create_new(true).open(path)
        }
        .map_err(|e| BackendError::Write(e, path.to_string()))?;
        let mut writer = npyz::WriteOptions::<f64>::new()
            .default_dtype()
            .shape(&[ny as u64, nx as u64])
            .writer(BufWriter::new(file))
            .begin_nd()?;
        writer.extend(map)?;
        writer.finish()?;
        log::info!("{quantity} map ({nx}x{ny}) written to {path}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Cosmology, MassMapData};

    fn point_mass() -> MassMapLens {
        let mut mass = vec![0.; 9];
        mass[4] = 1e13;
        let mass_map = MassMapData::new(3, mass, [0.; 2], 3e-4).unwrap();
        MassMapLens::new(Cosmology::default(), mass_map, 0.3, 1.).unwrap()
    }

    #[test]
    fn point_mass_shear() {
        let lens = point_mass();
        let grid = MassMapGrid::build(&lens, 8, [0.; 2], 3e-4, 3e-4).unwrap();
        assert_eq!(grid.size(), 8);
        assert_eq!(grid.values(Quantity::Gamma1).len(), 64);
        let kappa = grid.values(Quantity::Kappa);
        let (g1, g2) = (grid.values(Quantity::Gamma1), grid.values(Quantity::Gamma2));
        // central pixel spans grid points 3 and 4 along each axis
        let center = lens.convergence()[4];
        assert_eq!(kappa[3 * 8 + 3], center);
        assert_eq!(kappa[0], 0.);
        // tangential shear: γ1 < 0 along x and > 0 along y
        assert!(g1[3 * 8 + 7] < 0. && g2[3 * 8 + 7].abs() < 0.5 * g1[3 * 8 + 7].abs());
        assert!(g1[7 * 8 + 3] > 0.);
        // symmetric field
        assert!((g1[3 * 8 + 7] - g1[3 * 8]).abs() < 1e-12 * g1[3 * 8].abs());
        assert!((g2[7 * 8 + 7] - g2[0]).abs() < 1e-12 * g2[0].abs());
        assert!(g2[7 * 8 + 7] < 0.);
    }

    #[test]
    fn interpolation() {
        let lens = point_mass();
        let grid = MassMapGrid::build(&lens, 4, [0.; 2], 3e-4, 3e-4).unwrap();
        let kappa = grid.values(Quantity::Kappa).to_vec();
        // grid points sit at the pixel centers of a map with the grid resolution
        let max = kappa.iter().cloned().fold(0., f64::max);
        let same = grid.resample([0.; 2], 4, 4, Quantity::Kappa);
        assert!(same.iter().zip(&kappa).all(|(a, b)| (a - b).abs() <= 1e-9 * max));
        let coarse = grid.resample([0.; 2], 2, 2, Quantity::Kappa);
        assert_eq!(coarse.len(), 4);
        assert!(coarse.iter().all(|k| *k >= -1e-9 * max && *k <= max * (1. + 1e-9)));
    }

    #[test]
    fn too_small() {
        let lens = point_mass();
        assert!(MassMapGrid::build(&lens, 1, [0.; 2], 3e-4, 3e-4).is_err());
    }

    #[test]
    fn overwrite_marker() {
        let lens = point_mass();
        let grid = MassMapGrid::build(&lens, 4, [0.; 2], 3e-4, 3e-4).unwrap();
        let path = std::env::temp_dir().join(format!("lens-maps-grid-{}.npy", std::process::id()));
        let path = path.to_str().unwrap().to_string();
        grid.write_map([0.; 2], 3, 3, Quantity::Kappa, &format!("!{path}"))
            .unwrap();
        assert!(grid
            .write_map([0.; 2], 3, 3, Quantity::Gamma1, &path)
            .is_err());
        grid.write_map([0.; 2], 3, 3, Quantity::Gamma1, &format!("!{path}"))
            .unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let npy = npyz::NpyFile::new(&bytes[..]).unwrap();
        assert_eq!(npy.shape(), &[3, 3]);
        let map: Vec<f64> = npy.into_vec().unwrap();
        assert_eq!(map, grid.resample([0.; 2], 3, 3, Quantity::Gamma1));
        std::fs::remove_file(&path).unwrap();
    }
}
