//! Curated internal API (UNSTABLE).
//!
//! Important
//! - Not a public API. A convenience surface for the CLI, benches and
//!   examples; breaking changes are allowed.

// Predicates
pub use crate::predicates::{
    circle_position, in_circle, incircle, left_of, orient2d, orientation, right_of,
    CirclePosition, Orientation,
};
// Triangulation
pub use crate::delaunay::{
    convex_hull, convex_hull_size, triangulate, triangulate_flat, triangulate_with,
    validate_delaunay, DedupPolicy, DelaunayViolation, TriangulateCfg, Triangulation,
    TriangulationError,
};
// Area integration
pub use crate::area::{
    box_edge_points, frame_area, projected_area, surface_area, triangle_area, AreaCfg, AreaError,
    FrameArea,
};
pub use crate::frames::{tessellate_frames, Frame, TriArea};
// Weighted grid
pub use crate::grid::{GridCfg, GridError, TessellatedGrid, WeightFn};
// Selection
pub use crate::select::{select, IndexError, IndexGroups};
// Synthetic input
pub use crate::sample::{jittered_grid, sheet_frame, uniform_cloud, SampleToken, SheetCfg};
