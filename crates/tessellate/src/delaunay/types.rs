//! Data types for the planar Delaunay triangulation.
//!
//! Kept small and explicit so `adjacency`, `build` and `extract` stay readable.

use std::fmt;

/// Position of a vertex in the sorted working order of one triangulation call.
///
/// Not an input index: the input index of a vertex is `Mesh::index(v)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

/// What to do with coincident input points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DedupPolicy {
    /// Collapse points with equal coordinates onto the first occurrence.
    Exact,
    /// Collapse a point onto a kept point within `eps` in both axes.
    Tolerance(f64),
    /// Fail with `TriangulationError::DuplicatePoint`.
    Reject,
}

/// Triangulation configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriangulateCfg {
    /// Width of the x tie band for the extraction walk. `0.0` visits vertices
    /// in lexicographic order; a positive band visits each band of nearly equal
    /// x by increasing y, which fixes the order and leading vertex of the
    /// output triangles. Construction order is not affected.
    pub x_tie_eps: f64,
    pub dedup: DedupPolicy,
}

impl Default for TriangulateCfg {
    fn default() -> Self {
        Self {
            x_tie_eps: 0.0,
            dedup: DedupPolicy::Exact,
        }
    }
}

/// Result of one triangulation call. Triangles hold input point indices and
/// are counter-clockwise.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Triangulation {
    pub npoints: usize,
    /// Distinct points that took part in the triangulation.
    pub nverts: usize,
    pub triangles: Vec<[usize; 3]>,
    /// `(dropped, kept)` input indices of collapsed duplicate points.
    pub duplicates: Vec<(usize, usize)>,
}

impl Triangulation {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Triangles as a flat `3 * triangle_count` index sequence.
    pub fn flat_indices(&self) -> Vec<usize> {
        self.triangles.iter().flatten().copied().collect()
    }

    /// Undirected edges, each once, as `(min, max)` pairs in sorted order.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut out: Vec<(usize, usize)> = self
            .triangles
            .iter()
            .flat_map(|t| [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])])
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

/// Adjacency bookkeeping failures. Any of these means the caller broke the
/// symmetric-edge contract or the geometry produced crossing edges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdjacencyError {
    SelfLoop(VertexId),
    DuplicateEdge(VertexId, VertexId),
    MissingEdge(VertexId, VertexId),
    /// No angular slot around `parent` accepts `neighbor` (it shares a ray
    /// with an existing neighbor).
    NoAngularSlot { parent: VertexId, neighbor: VertexId },
}

impl fmt::Display for AdjacencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfLoop(v) => write!(f, "vertex {} cannot neighbor itself", v.0),
            Self::DuplicateEdge(a, b) => write!(f, "edge ({}, {}) already exists", a.0, b.0),
            Self::MissingEdge(a, b) => write!(f, "edge ({}, {}) does not exist", a.0, b.0),
            Self::NoAngularSlot { parent, neighbor } => write!(
                f,
                "no angular slot for neighbor {} around vertex {}",
                neighbor.0, parent.0
            ),
        }
    }
}

impl std::error::Error for AdjacencyError {}

/// Errors reported by `triangulate`.
#[derive(Clone, Debug, PartialEq)]
pub enum TriangulationError {
    /// Fewer than two (distinct) points.
    TooFewPoints { points: usize, distinct: usize },
    NonFinite { index: usize },
    DuplicatePoint { index: usize, first: usize },
    /// Flat coordinate input whose length is not a multiple of two.
    InvalidFlatLength { len: usize },
    /// `x_tie_eps` negative or not finite.
    InvalidTieBand(f64),
    Adjacency(AdjacencyError),
    /// A bounded loop ran out or no merge candidate existed: an internal defect.
    Inconsistent { stage: &'static str, detail: String },
}

impl TriangulationError {
    pub(crate) fn inconsistent(stage: &'static str, detail: impl Into<String>) -> Self {
        Self::Inconsistent {
            stage,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for TriangulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewPoints { points, distinct } => write!(
                f,
                "need at least 2 distinct points, got {distinct} of {points}"
            ),
            Self::NonFinite { index } => write!(f, "point {index} has a non-finite coordinate"),
            Self::DuplicatePoint { index, first } => {
                write!(f, "point {index} duplicates point {first}")
            }
            Self::InvalidFlatLength { len } => {
                write!(f, "flat coordinate slice of length {len} is not x,y pairs")
            }
            Self::InvalidTieBand(eps) => {
                write!(f, "x tie band must be finite and non-negative, got {eps}")
            }
            Self::Adjacency(e) => write!(f, "adjacency: {e}"),
            Self::Inconsistent { stage, detail } => {
                write!(f, "internal inconsistency in {stage}: {detail}")
            }
        }
    }
}

impl std::error::Error for TriangulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Adjacency(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AdjacencyError> for TriangulationError {
    fn from(e: AdjacencyError) -> Self {
        Self::Adjacency(e)
    }
}
