//! Per-frame tessellation of a whole trajectory.
//!
//! Frames are independent: each one gets its own triangulation context, so
//! they run in parallel on a rayon pool with no shared state.

use nalgebra::Vector3;
use rayon::prelude::*;

use crate::area::{frame_area, AreaCfg, AreaError, FrameArea};

/// One trajectory frame: particle coordinates plus box edge lengths.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub coords: Vec<Vector3<f64>>,
    pub box_dims: Vector3<f64>,
}

/// Areas of every frame, in frame order. All areas are totals; divide by
/// `natoms` for area per particle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriArea {
    /// 3D areas (periodic-corrected when requested).
    pub area: Vec<f64>,
    pub area_2d: Option<Vec<f64>>,
    pub area_2d_box: Vec<f64>,
    pub natoms: usize,
    pub nframes: usize,
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f64>() / xs.len() as f64
    }
}

impl TriArea {
    pub fn mean_area(&self) -> f64 {
        mean(&self.area)
    }

    pub fn mean_area_per_particle(&self) -> f64 {
        if self.natoms == 0 {
            0.0
        } else {
            self.mean_area() / self.natoms as f64
        }
    }

    pub fn mean_area_2d(&self) -> Option<f64> {
        self.area_2d.as_deref().map(mean)
    }

    pub fn mean_box_area(&self) -> f64 {
        mean(&self.area_2d_box)
    }
}

/// Tessellate every frame. `threads = None` uses rayon's global pool.
///
/// A failing frame aborts the run; its number is carried in `AreaError::Frame`.
pub fn tessellate_frames(
    frames: &[Frame],
    cfg: &AreaCfg,
    threads: Option<usize>,
) -> Result<TriArea, AreaError> {
    let run = || -> Result<Vec<FrameArea>, AreaError> {
        frames
            .par_iter()
            .enumerate()
            .map(|(i, fr)| {
                frame_area(&fr.coords, fr.box_dims, cfg).map_err(|e| AreaError::Frame {
                    frame: i,
                    source: Box::new(e),
                })
            })
            .collect()
    };
    let per_frame = match threads {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .map_err(|e| AreaError::ThreadPool(e.to_string()))?
            .install(run)?,
        None => run()?,
    };

    let natoms = frames.first().map_or(0, |f| f.coords.len());
    if frames.iter().any(|f| f.coords.len() != natoms) {
        tracing::warn!(
            natoms,
            "frames differ in particle count; per-particle means use the first frame"
        );
    }
    tracing::info!(nframes = frames.len(), natoms, "tessellated frames");

    Ok(TriArea {
        area: per_frame.iter().map(|f| f.area).collect(),
        area_2d: cfg
            .project_2d
            .then(|| per_frame.iter().map(|f| f.area_2d.unwrap_or(0.0)).collect()),
        area_2d_box: per_frame.iter().map(|f| f.box_area_2d).collect(),
        natoms,
        nframes: frames.len(),
    })
}
