use std::fmt;

use nalgebra::Vector3;

use crate::cfg::{DEFAULT_CELL_WIDTH, MAX_GRID_POINTS};

/// How a particle weighs the eight grid points of the cell it falls in.
/// Closer grid points get more weight; `diag` is the cell's space diagonal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WeightFn {
    /// `diag - d`.
    Distance,
    /// `diag² - d²`.
    #[default]
    DistanceSquared,
}

impl WeightFn {
    #[inline]
    pub fn weight(self, particle: Vector3<f64>, grid_point: Vector3<f64>, cell_width: f64) -> f64 {
        let diag_sq = 3.0 * cell_width * cell_width;
        let d_sq = (particle - grid_point).norm_squared();
        match self {
            Self::Distance => diag_sq.sqrt() - d_sq.sqrt(),
            Self::DistanceSquared => diag_sq - d_sq,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridCfg {
    /// Edge length of one cubic grid cell, in coordinate units.
    pub cell_width: f64,
    pub weight: WeightFn,
}

impl Default for GridCfg {
    fn default() -> Self {
        Self {
            cell_width: DEFAULT_CELL_WIDTH,
            weight: WeightFn::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GridError {
    InvalidWidth(f64),
    NoParticles,
    NonFinite { frame: usize, particle: usize },
    /// Grid points per axis the cell width would need.
    TooLarge { points: [f64; 3] },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWidth(w) => write!(f, "cell width must be positive and finite, got {w}"),
            Self::NoParticles => write!(f, "no particles to grid"),
            Self::NonFinite { frame, particle } => {
                write!(f, "frame {frame}, particle {particle}: non-finite coordinate")
            }
            Self::TooLarge { points: [x, y, z] } => write!(
                f,
                "grid of {x} x {y} x {z} points exceeds {MAX_GRID_POINTS}; use a wider cell"
            ),
        }
    }
}

impl std::error::Error for GridError {}
