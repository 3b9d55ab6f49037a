//! Weighted-grid tessellation (alternative surface-area method).
//!
//! Purpose
//! - Estimate the area of a sheet of particles over a whole trajectory at once:
//!   accumulate particle density on a 3D grid, take the densest z level of each
//!   x-y column as a heightmap, and triangulate the heightmap.
//!
//! Steps
//! - `construct`: bounding box of all frames; `dim = floor(extent / width) + 2`
//!   grid points per axis (the last cell index plus its far corner). Grids
//!   over `MAX_GRID_POINTS` points in total are refused.
//! - `load`: each particle adds `WeightFn` weight to the 8 corners of its cell.
//! - `gen_heightmap`: z index of the maximum weight per column (first on ties).
//! - `tessellate`: each cell becomes two triangles over its four column
//!   heights. Cells with a zero-weight column corner count as empty and are
//!   skipped.
//!
//! Layout: `weights[(i * dimy + j) * dimz + k]`, `heightmap[i * dimy + j]`,
//! `areas[i * (dimy - 1) + j]`.

mod types;

pub use types::{GridCfg, GridError, WeightFn};

use std::io::{self, Write};

use nalgebra::Vector3;

use crate::area::triangle_area;
use crate::cfg::MAX_GRID_POINTS;

#[derive(Clone, Debug, PartialEq)]
pub struct TessellatedGrid {
    pub weights: Vec<f64>,
    pub heightmap: Vec<usize>,
    pub areas: Vec<f64>,
    /// Grid points per axis (cells + 1).
    pub dims: [usize; 3],
    pub cell_width: f64,
    pub origin: Vector3<f64>,
    pub num_empty: usize,
    pub surface_area: f64,
    pub area_per_particle: f64,
}

impl TessellatedGrid {
    /// Run the whole pipeline over `frames` (particle coordinates per frame).
    pub fn build(frames: &[Vec<Vector3<f64>>], cfg: &GridCfg) -> Result<Self, GridError> {
        let mut grid = Self::construct(frames, cfg.cell_width)?;
        grid.load(frames, cfg.weight);
        grid.gen_heightmap();
        let natoms = frames.first().map_or(0, Vec::len);
        grid.tessellate(natoms);
        if grid.num_empty > 0 {
            tracing::warn!(
                num_empty = grid.num_empty,
                cell_width = grid.cell_width,
                "grid cells with empty corners; increase the cell width if the sheet has gaps"
            );
        }
        tracing::debug!(dims = ?grid.dims, surface_area = grid.surface_area, "tessellated grid");
        Ok(grid)
    }

    fn construct(frames: &[Vec<Vector3<f64>>], cell_width: f64) -> Result<Self, GridError> {
        if !(cell_width.is_finite() && cell_width > 0.0) {
            return Err(GridError::InvalidWidth(cell_width));
        }
        let mut lo = Vector3::repeat(f64::INFINITY);
        let mut hi = Vector3::repeat(f64::NEG_INFINITY);
        let mut seen = false;
        for (f, frame) in frames.iter().enumerate() {
            for (p, x) in frame.iter().enumerate() {
                if !x.iter().all(|c| c.is_finite()) {
                    return Err(GridError::NonFinite { frame: f, particle: p });
                }
                lo = lo.inf(x);
                hi = hi.sup(x);
                seen = true;
            }
        }
        if !seen {
            return Err(GridError::NoParticles);
        }
        let extent = hi - lo;
        let axis = |e: f64| (e / cell_width).floor() + 2.0;
        let points = [axis(extent.x), axis(extent.y), axis(extent.z)];
        let mut dims = [0usize; 3];
        for (d, &n) in dims.iter_mut().zip(&points) {
            if !(n <= MAX_GRID_POINTS as f64) {
                return Err(GridError::TooLarge { points });
            }
            *d = n as usize;
        }
        let total = dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .filter(|&t| t <= MAX_GRID_POINTS)
            .ok_or(GridError::TooLarge { points })?;
        Ok(Self {
            weights: vec![0.0; total],
            heightmap: vec![0; dims[0] * dims[1]],
            areas: vec![0.0; (dims[0] - 1) * (dims[1] - 1)],
            dims,
            cell_width,
            origin: lo,
            num_empty: 0,
            surface_area: 0.0,
            area_per_particle: 0.0,
        })
    }

    #[inline]
    fn widx(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.dims[1] + j) * self.dims[2] + k
    }

    pub fn weight(&self, i: usize, j: usize, k: usize) -> f64 {
        self.weights[self.widx(i, j, k)]
    }

    /// z index of the heaviest grid point of column `(i, j)`.
    pub fn height(&self, i: usize, j: usize) -> usize {
        self.heightmap[i * self.dims[1] + j]
    }

    fn grid_point(&self, i: usize, j: usize, k: usize) -> Vector3<f64> {
        self.origin + Vector3::new(i as f64, j as f64, k as f64) * self.cell_width
    }

    fn load(&mut self, frames: &[Vec<Vector3<f64>>], weight: WeightFn) {
        let w = self.cell_width;
        for x in frames.iter().flatten() {
            let cell = (x - self.origin) / w;
            // Particles on the far boundary stay in the last cell.
            let ci = (cell.x.floor() as usize).min(self.dims[0] - 2);
            let cj = (cell.y.floor() as usize).min(self.dims[1] - 2);
            let ck = (cell.z.floor() as usize).min(self.dims[2] - 2);
            for (di, dj, dk) in CORNERS {
                let (i, j, k) = (ci + di, cj + dj, ck + dk);
                let idx = self.widx(i, j, k);
                self.weights[idx] += weight.weight(*x, self.grid_point(i, j, k), w);
            }
        }
    }

    fn column_max(&self, i: usize, j: usize) -> (usize, f64) {
        let base = self.widx(i, j, 0);
        let column = &self.weights[base..base + self.dims[2]];
        column
            .iter()
            .enumerate()
            .fold((0, column[0]), |best, (k, &w)| if w > best.1 { (k, w) } else { best })
    }

    fn gen_heightmap(&mut self) {
        for i in 0..self.dims[0] {
            for j in 0..self.dims[1] {
                let (k, _) = self.column_max(i, j);
                self.heightmap[i * self.dims[1] + j] = k;
            }
        }
    }

    fn tessellate(&mut self, natoms: usize) {
        let [dimx, dimy, _] = self.dims;
        let filled: Vec<bool> = (0..dimx * dimy)
            .map(|c| self.column_max(c / dimy, c % dimy).1 > 0.0)
            .collect();
        let surface = |i: usize, j: usize| self.grid_point(i, j, self.height(i, j));

        let mut num_empty = 0;
        let mut areas = vec![0.0; (dimx - 1) * (dimy - 1)];
        for i in 0..dimx - 1 {
            for j in 0..dimy - 1 {
                let corners = [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)];
                if corners.iter().any(|&(a, b)| !filled[a * dimy + b]) {
                    num_empty += 1;
                    continue;
                }
                let [p00, p10, p11, p01] = corners.map(|(a, b)| surface(a, b));
                areas[i * (dimy - 1) + j] =
                    triangle_area(p00, p10, p11) + triangle_area(p00, p11, p01);
            }
        }
        self.surface_area = areas.iter().sum();
        self.areas = areas;
        self.num_empty = num_empty;
        self.area_per_particle = if natoms == 0 {
            0.0
        } else {
            self.surface_area / natoms as f64
        };
    }

    /// Text summary followed by the heightmap, one x row per line.
    pub fn write_summary<W: Write>(&self, mut out: W) -> io::Result<()> {
        let [dimx, dimy, dimz] = self.dims;
        writeln!(out, "dims\t{dimx}\t{dimy}\t{dimz}")?;
        writeln!(out, "cell_width\t{}", self.cell_width)?;
        writeln!(
            out,
            "origin\t{}\t{}\t{}",
            self.origin.x, self.origin.y, self.origin.z
        )?;
        writeln!(out, "num_empty\t{}", self.num_empty)?;
        writeln!(out, "surface_area\t{}", self.surface_area)?;
        writeln!(out, "area_per_particle\t{}", self.area_per_particle)?;
        writeln!(out, "\nheightmap")?;
        for i in 0..dimx {
            let row: Vec<String> = (0..dimy).map(|j| self.height(i, j).to_string()).collect();
            writeln!(out, "{}", row.join("\t"))?;
        }
        Ok(())
    }
}

const CORNERS: [(usize, usize, usize); 8] = [
    (0, 0, 0),
    (1, 0, 0),
    (0, 1, 0),
    (1, 1, 0),
    (0, 0, 1),
    (1, 0, 1),
    (0, 1, 1),
    (1, 1, 1),
];

#[cfg(test)]
mod tests;
