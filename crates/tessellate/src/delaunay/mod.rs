//! Planar Delaunay triangulation (divide and conquer).
//!
//! Purpose
//! - Triangulate a 2D point set so that no point lies strictly inside the
//!   circumcircle of any output triangle.
//!
//! Pipeline
//! - `build::order_points`: reject non-finite input, sort lexicographically,
//!   collapse duplicates per `DedupPolicy`, lay out the extraction walk
//!   (x tie band).
//! - `build::triangulate_range`: recursive construction on an arena of
//!   circular neighbor lists (`adjacency::Mesh`), one per call.
//! - `extract::extract_triangles`: walk every neighbor cycle once.
//!
//! All geometric decisions go through the exact predicates in `crate::predicates`,
//! so degenerate input (collinear runs, cocircular grids) is handled without
//! tolerances: collinear input yields zero triangles, and cocircular ties pick
//! one of the valid diagonals deterministically.

mod adjacency;
mod build;
mod extract;
mod types;
mod validate;

pub use types::{
    AdjacencyError, DedupPolicy, TriangulateCfg, Triangulation, TriangulationError, VertexId,
};
pub use validate::{convex_hull, convex_hull_size, validate_delaunay, DelaunayViolation};

use nalgebra::Vector2;

use adjacency::Mesh;

/// Triangulate with the default configuration (exact order, exact dedup).
pub fn triangulate(points: &[Vector2<f64>]) -> Result<Triangulation, TriangulationError> {
    triangulate_with(points, &TriangulateCfg::default())
}

pub fn triangulate_with(
    points: &[Vector2<f64>],
    cfg: &TriangulateCfg,
) -> Result<Triangulation, TriangulationError> {
    let ordered = build::order_points(points, cfg)?;
    let nverts = ordered.order.len();
    if nverts < 2 {
        return Err(TriangulationError::TooFewPoints {
            points: points.len(),
            distinct: nverts,
        });
    }
    if !ordered.duplicates.is_empty() {
        tracing::warn!(
            dropped = ordered.duplicates.len(),
            "collapsed duplicate points before triangulating"
        );
    }

    let mut mesh = Mesh::new(points, &ordered.order);
    build::triangulate_range(&mut mesh, 0, nverts - 1)?;
    let triangles = extract::extract_triangles(mesh, &ordered.visit);

    tracing::debug!(
        npoints = points.len(),
        nverts,
        ntriangles = triangles.len(),
        "triangulated"
    );
    Ok(Triangulation {
        npoints: points.len(),
        nverts,
        triangles,
        duplicates: ordered.duplicates,
    })
}

/// Triangulate interleaved `x0, y0, x1, y1, ...` coordinates.
pub fn triangulate_flat(coords: &[f64]) -> Result<Triangulation, TriangulationError> {
    if coords.len() % 2 != 0 {
        return Err(TriangulationError::InvalidFlatLength { len: coords.len() });
    }
    let points: Vec<Vector2<f64>> = coords
        .chunks_exact(2)
        .map(|c| Vector2::new(c[0], c[1]))
        .collect();
    triangulate(&points)
}

#[cfg(test)]
mod tests;
