//! Numeric defaults shared by the library and the command line.

/// Grid cell edge length for the weighted-grid method (nm for GROMACS input).
pub const DEFAULT_CELL_WIDTH: f64 = 0.1;
/// Duplicate tolerance used by `DedupPolicy::Tolerance` when a caller asks for
/// tolerant merging without choosing a value.
pub const DEFAULT_DEDUP_EPS: f64 = 1e-12;
/// Largest spacing between the box-edge points added by the periodic
/// correction (nm for GROMACS input).
pub const DEFAULT_EDGE_SPACING: f64 = 0.8;
/// Cap on the number of box-edge points per frame.
pub const MAX_EDGE_POINTS: usize = 1 << 20;
/// Cap on the grid points of one weighted grid.
pub const MAX_GRID_POINTS: usize = 1 << 28;
