//! Tessellated surface area of particle frames.
//!
//! Layers, leaves first:
//! - `predicates`: exact orientation and in-circle tests.
//! - `delaunay`: divide-and-conquer Delaunay triangulation of 2D points.
//! - `area`, `frames`: 3D area of the triangulated xy projection, per frame
//!   and over a trajectory (rayon).
//! - `grid`: weighted-grid heightmap tessellation, the alternative method.
//! - `select`: index-file atom groups.
//!
//! API Policy
//! - This crate is project-internal. There is no stable public API; `api`
//!   collects the entry points the CLI and benches use.

pub mod api;
pub mod area;
pub mod cfg;
pub mod delaunay;
pub mod frames;
pub mod grid;
pub mod predicates;
pub mod sample;
pub mod select;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use nalgebra::{Vector2 as Vec2, Vector3 as Vec3};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::area::{frame_area, AreaCfg, FrameArea};
    pub use crate::delaunay::{
        triangulate, triangulate_with, DedupPolicy, TriangulateCfg, Triangulation,
        TriangulationError,
    };
    pub use crate::frames::{tessellate_frames, Frame, TriArea};
    pub use nalgebra::{Vector2 as Vec2, Vector3 as Vec3};
}
