//! Surface area of triangulated frames.
//!
//! Purpose
//! - Triangulate the xy projection of one frame and integrate the 3D area of
//!   the resulting triangles (the z coordinates lift the planar mesh).
//! - Optionally report the projected 2D area and a periodic-boundary
//!   correction for particles in a rectangular simulation box.
//!
//! Periodic correction
//! - Particles do not reach the box walls, so the mesh of a sheet spanning a
//!   periodic box stops short of them. The correction pads the frame with
//!   points along the four edges of the `[0, box_x] x [0, box_y]` rectangle,
//!   at most `espace` apart with the corners included, each at the height of
//!   the particle nearest to it in xy. The area of the padded mesh is reported
//!   in place of the plain one, for both the 3D and the projected area.
//!
//! Code cross-refs: `crate::frames::tessellate_frames`, `crate::delaunay`.

use std::fmt;

use nalgebra::{Vector2, Vector3};

use crate::cfg::{DEFAULT_EDGE_SPACING, MAX_EDGE_POINTS};
use crate::delaunay::{triangulate_with, TriangulateCfg, Triangulation, TriangulationError};

/// Options for `frame_area`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaCfg {
    /// Apply the periodic-boundary correction (needs a positive box).
    pub periodic: bool,
    /// Largest gap between box-edge points of the periodic correction.
    pub espace: f64,
    /// Also report the area of the mesh projected onto the xy plane.
    pub project_2d: bool,
    pub triangulate: TriangulateCfg,
}

impl Default for AreaCfg {
    fn default() -> Self {
        Self {
            periodic: false,
            espace: DEFAULT_EDGE_SPACING,
            project_2d: false,
            triangulate: TriangulateCfg::default(),
        }
    }
}

/// Areas of a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameArea {
    pub area: f64,
    pub area_2d: Option<f64>,
    /// `box_x * box_y`.
    pub box_area_2d: f64,
    pub ntriangles: usize,
}

#[derive(Debug)]
pub enum AreaError {
    Triangulation(TriangulationError),
    InvalidBox { reason: String },
    /// Box-edge spacing that is not finite and positive, or too fine for the box.
    InvalidSpacing(f64),
    /// Any failure while processing frame `frame` of a trajectory.
    Frame { frame: usize, source: Box<AreaError> },
    ThreadPool(String),
}

impl fmt::Display for AreaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Triangulation(e) => write!(f, "triangulation failed: {e}"),
            Self::InvalidBox { reason } => write!(f, "invalid box: {reason}"),
            Self::InvalidSpacing(espace) => {
                write!(f, "box-edge spacing must be positive and fit the box, got {espace}")
            }
            Self::Frame { frame, source } => write!(f, "frame {frame}: {source}"),
            Self::ThreadPool(reason) => write!(f, "thread pool: {reason}"),
        }
    }
}

impl std::error::Error for AreaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Triangulation(e) => Some(e),
            Self::Frame { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<TriangulationError> for AreaError {
    fn from(e: TriangulationError) -> Self {
        Self::Triangulation(e)
    }
}

/// Area of the 3D triangle `(a, b, c)`.
#[inline]
pub fn triangle_area(a: Vector3<f64>, b: Vector3<f64>, c: Vector3<f64>) -> f64 {
    (b - a).cross(&(c - a)).norm() / 2.0
}

/// Sum of 3D triangle areas of `tri` over `points`.
pub fn surface_area(points: &[Vector3<f64>], tri: &Triangulation) -> f64 {
    tri.triangles
        .iter()
        .map(|t| triangle_area(points[t[0]], points[t[1]], points[t[2]]))
        .sum()
}

/// Sum of triangle areas with every z zeroed.
pub fn projected_area(points: &[Vector3<f64>], tri: &Triangulation) -> f64 {
    let flat = |i: usize| Vector3::new(points[i].x, points[i].y, 0.0);
    tri.triangles
        .iter()
        .map(|t| triangle_area(flat(t[0]), flat(t[1]), flat(t[2])))
        .sum()
}

fn xy(points: &[Vector3<f64>]) -> Vec<Vector2<f64>> {
    points.iter().map(|p| p.xy()).collect()
}

/// Points along the edges of `[0, box_x] x [0, box_y]`, at most `espace`
/// apart, corners included.
///
/// Each point takes the z of the particle nearest to it in xy; points that
/// coincide with a particle are left out. Without particles z is 0.
pub fn box_edge_points(
    points: &[Vector3<f64>],
    box_dims: Vector3<f64>,
    espace: f64,
) -> Result<Vec<Vector3<f64>>, AreaError> {
    check_padding(box_dims, espace)?;
    let (bx, by) = (box_dims.x, box_dims.y);
    let nx = (bx / espace).ceil().max(1.0) as usize;
    let ny = (by / espace).ceil().max(1.0) as usize;
    let mut edge = Vec::with_capacity(2 * (nx + ny));
    for i in 0..nx {
        let t = i as f64 / nx as f64;
        edge.push(Vector2::new(t * bx, 0.0));
        edge.push(Vector2::new(bx - t * bx, by));
    }
    for k in 0..ny {
        let t = k as f64 / ny as f64;
        edge.push(Vector2::new(bx, t * by));
        edge.push(Vector2::new(0.0, by - t * by));
    }

    let lifted = edge
        .into_iter()
        .filter_map(|q| {
            let nearest = points
                .iter()
                .map(|p| (p, (p.xy() - q).norm_squared()))
                .min_by(|a, b| a.1.total_cmp(&b.1));
            match nearest {
                Some((_, d2)) if d2 == 0.0 => None,
                Some((p, _)) => Some(Vector3::new(q.x, q.y, p.z)),
                None => Some(Vector3::new(q.x, q.y, 0.0)),
            }
        })
        .collect();
    Ok(lifted)
}

fn check_padding(box_dims: Vector3<f64>, espace: f64) -> Result<(), AreaError> {
    for (axis, len) in [("x", box_dims.x), ("y", box_dims.y)] {
        if !(len.is_finite() && len > 0.0) {
            let reason =
                format!("periodic correction needs a positive box {axis} length, got {len}");
            return Err(AreaError::InvalidBox { reason });
        }
    }
    if !(espace.is_finite() && espace > 0.0) {
        return Err(AreaError::InvalidSpacing(espace));
    }
    let npoints = 2.0 * ((box_dims.x / espace).ceil() + (box_dims.y / espace).ceil());
    if npoints > MAX_EDGE_POINTS as f64 {
        return Err(AreaError::InvalidSpacing(espace));
    }
    Ok(())
}

/// Triangulate the xy projection of `points` and integrate its area.
///
/// `box_dims` are the edge lengths of the rectangular simulation box. With
/// `cfg.periodic` the frame is first padded with `box_edge_points`, and the
/// areas and triangle count are those of the padded mesh.
pub fn frame_area(
    points: &[Vector3<f64>],
    box_dims: Vector3<f64>,
    cfg: &AreaCfg,
) -> Result<FrameArea, AreaError> {
    let padded;
    let points = if cfg.periodic {
        let edge = box_edge_points(points, box_dims, cfg.espace)?;
        tracing::trace!(nedge = edge.len(), "padded frame with box-edge points");
        padded = [points, edge.as_slice()].concat();
        padded.as_slice()
    } else {
        points
    };

    let tri = triangulate_with(&xy(points), &cfg.triangulate)?;
    Ok(FrameArea {
        area: surface_area(points, &tri),
        area_2d: cfg.project_2d.then(|| projected_area(points, &tri)),
        box_area_2d: box_dims.x * box_dims.y,
        ntriangles: tri.triangle_count(),
    })
}
