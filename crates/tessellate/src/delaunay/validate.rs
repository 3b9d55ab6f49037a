//! Brute-force checks of a finished triangulation, and the convex hull size
//! they are compared against (`2n - 2 - h` triangles for `n` points, `h` on
//! the hull, when not all collinear).

use std::collections::HashMap;
use std::fmt;

use nalgebra::Vector2;

use super::build::lex_cmp;
use super::types::Triangulation;
use crate::predicates::{in_circle, orient2d};

/// First defect found by `validate_delaunay`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DelaunayViolation {
    IndexOutOfRange { triangle: [usize; 3] },
    /// Triangle is clockwise or degenerate.
    NotCounterClockwise { triangle: [usize; 3] },
    /// An undirected edge bounds more than two triangles.
    OverusedEdge { edge: (usize, usize) },
    /// `point` lies strictly inside the circumcircle of `triangle`.
    NotEmpty { triangle: [usize; 3], point: usize },
}

impl fmt::Display for DelaunayViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { triangle } => {
                write!(f, "triangle {triangle:?} indexes past the input")
            }
            Self::NotCounterClockwise { triangle } => {
                write!(f, "triangle {triangle:?} is not counter-clockwise")
            }
            Self::OverusedEdge { edge } => {
                write!(f, "edge {edge:?} bounds more than two triangles")
            }
            Self::NotEmpty { triangle, point } => {
                write!(f, "point {point} lies inside the circumcircle of {triangle:?}")
            }
        }
    }
}

impl std::error::Error for DelaunayViolation {}

/// Check orientation, edge use, and the empty-circumcircle property of every
/// triangle against every input point. O(triangles · points).
pub fn validate_delaunay(
    points: &[Vector2<f64>],
    tri: &Triangulation,
) -> Result<(), DelaunayViolation> {
    let mut edge_use: HashMap<(usize, usize), u8> = HashMap::with_capacity(3 * tri.triangles.len());
    for &t in &tri.triangles {
        if t.iter().any(|&i| i >= points.len()) {
            return Err(DelaunayViolation::IndexOutOfRange { triangle: t });
        }
        let [a, b, c] = t.map(|i| points[i]);
        if orient2d(a, b, c) <= 0.0 {
            return Err(DelaunayViolation::NotCounterClockwise { triangle: t });
        }
        for (u, w) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
            let edge = (u.min(w), u.max(w));
            let count = edge_use.entry(edge).or_insert(0);
            *count += 1;
            if *count > 2 {
                return Err(DelaunayViolation::OverusedEdge { edge });
            }
        }
        if let Some(point) = (0..points.len())
            .filter(|p| !t.contains(p))
            .find(|&p| in_circle(a, b, c, points[p]))
        {
            return Err(DelaunayViolation::NotEmpty { triangle: t, point });
        }
    }
    Ok(())
}

/// Input indices of the convex hull, counter-clockwise from the lowest-x
/// point. Collinear boundary points are kept; exact duplicates appear once.
/// All-collinear input returns its distinct points in sorted order.
pub fn convex_hull(points: &[Vector2<f64>]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..points.len()).collect();
    idx.sort_by(|&i, &j| lex_cmp(&points[i], &points[j]).then(i.cmp(&j)));
    idx.dedup_by(|j, i| points[*i] == points[*j]);
    if idx.len() < 3 {
        return idx;
    }
    let all_collinear = idx
        .windows(3)
        .all(|w| orient2d(points[w[0]], points[w[1]], points[w[2]]) == 0.0);
    if all_collinear {
        return idx;
    }

    let chain = |iter: &mut dyn Iterator<Item = usize>| -> Vec<usize> {
        let mut out: Vec<usize> = Vec::new();
        for i in iter {
            while out.len() >= 2
                && orient2d(points[out[out.len() - 2]], points[out[out.len() - 1]], points[i]) < 0.0
            {
                out.pop();
            }
            out.push(i);
        }
        out
    };
    let mut lower = chain(&mut idx.iter().copied());
    let mut upper = chain(&mut idx.iter().rev().copied());
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Number of convex hull vertices, collinear boundary points included.
pub fn convex_hull_size(points: &[Vector2<f64>]) -> usize {
    convex_hull(points).len()
}
