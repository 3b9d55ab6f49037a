//! Divide-and-conquer construction (Guibas–Stolfi / Lee–Schachter).
//!
//! Vertices are processed in lexicographic (x, then y) order so every
//! recursive range `[lo, hi]` is separable from its sibling by a vertical-ish
//! line. Base cases connect 2 or 3 vertices; merges find the lower and upper
//! common tangents of the two hulls, then zip the seam from bottom to top,
//! deleting edges that fail the empty-circle test.
//!
//! Invariant after `triangulate_range(lo, hi)` returns `(lo, hi)`:
//! `first(lo)` is the counter-clockwise hull successor of `lo` and `first(hi)`
//! the counter-clockwise hull successor of `hi`.

use std::cmp::Ordering;

use nalgebra::Vector2;

use super::adjacency::Mesh;
use super::types::{DedupPolicy, TriangulateCfg, TriangulationError, VertexId};
use crate::predicates::{in_circle, left_of, orient2d, right_of};

type Edge = (VertexId, VertexId);

/// Exact lexicographic comparison of finite points.
#[inline]
pub(crate) fn lex_cmp(a: &Vector2<f64>, b: &Vector2<f64>) -> Ordering {
    a.x.partial_cmp(&b.x)
        .unwrap_or(Ordering::Equal)
        .then(a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal))
}

/// Kept input indices in construction order, the extraction walk, and
/// `(dropped, kept)` duplicates.
pub(crate) struct Ordered {
    /// Input indices in exact lexicographic order; `VertexId(k)` is `order[k]`.
    pub order: Vec<usize>,
    /// Vertex positions in the order extraction visits them.
    pub visit: Vec<usize>,
    pub duplicates: Vec<(usize, usize)>,
}

/// Validate, sort and deduplicate the input.
pub(crate) fn order_points(
    points: &[Vector2<f64>],
    cfg: &TriangulateCfg,
) -> Result<Ordered, TriangulationError> {
    if !(cfg.x_tie_eps.is_finite() && cfg.x_tie_eps >= 0.0) {
        return Err(TriangulationError::InvalidTieBand(cfg.x_tie_eps));
    }
    if let Some(index) = points
        .iter()
        .position(|p| !(p.x.is_finite() && p.y.is_finite()))
    {
        return Err(TriangulationError::NonFinite { index });
    }
    let mut sorted: Vec<usize> = (0..points.len()).collect();
    sorted.sort_by(|&i, &j| lex_cmp(&points[i], &points[j]).then(i.cmp(&j)));

    let mut order: Vec<usize> = Vec::with_capacity(sorted.len());
    let mut duplicates = Vec::new();
    for &i in &sorted {
        let p = &points[i];
        let hit = match cfg.dedup {
            DedupPolicy::Exact => order.last().copied().filter(|&k| points[k] == *p),
            DedupPolicy::Reject => {
                if let Some(&k) = order.last() {
                    if points[k] == *p {
                        return Err(TriangulationError::DuplicatePoint { index: i, first: k });
                    }
                }
                None
            }
            DedupPolicy::Tolerance(eps) => order
                .iter()
                .rev()
                .take_while(|&&k| p.x - points[k].x <= eps)
                .copied()
                .find(|&k| (points[k].y - p.y).abs() <= eps),
        };
        match hit {
            Some(kept) => duplicates.push((i, kept)),
            None => order.push(i),
        }
    }

    let visit = tie_band_walk(points, &order, cfg.x_tie_eps);
    Ok(Ordered {
        order,
        visit,
        duplicates,
    })
}

/// Vertex positions grouped into x bands and ordered by y inside each band.
///
/// A band starts at its first vertex and holds every following vertex whose x
/// is less than `eps` beyond it, so no band is wider than `eps`. Construction
/// keeps the lexicographic order; the band only decides the extraction walk.
fn tie_band_walk(points: &[Vector2<f64>], order: &[usize], eps: f64) -> Vec<usize> {
    let mut walk: Vec<usize> = (0..order.len()).collect();
    if eps == 0.0 {
        return walk;
    }
    let mut start = 0;
    while start < walk.len() {
        let anchor = points[order[start]].x;
        let mut end = start + 1;
        while end < walk.len() && points[order[end]].x - anchor < eps {
            end += 1;
        }
        if end - start > 1 {
            walk[start..end].sort_by(|&i, &j| {
                let (a, b) = (&points[order[i]], &points[order[j]]);
                a.y.partial_cmp(&b.y)
                    .unwrap_or(Ordering::Equal)
                    .then(i.cmp(&j))
            });
        }
        start = end;
    }
    walk
}

/// Triangulate the vertex range `[lo, hi]` (at least two vertices) and return
/// its leftmost and rightmost vertices.
pub(crate) fn triangulate_range(
    mesh: &mut Mesh<'_>,
    lo: usize,
    hi: usize,
) -> Result<(VertexId, VertexId), TriangulationError> {
    if hi <= lo || hi >= mesh.len() {
        return Err(TriangulationError::inconsistent(
            "range",
            format!("invalid vertex range [{lo}, {hi}] over {} vertices", mesh.len()),
        ));
    }
    match hi - lo + 1 {
        2 => {
            mesh.insert_edge(VertexId(lo), VertexId(hi))?;
            Ok((VertexId(lo), VertexId(hi)))
        }
        3 => base_triangle(mesh, lo),
        _ => {
            let mid = lo + (hi - lo) / 2;
            let (ldo, ldi) = triangulate_range(mesh, lo, mid)?;
            let (rdi, rdo) = triangulate_range(mesh, mid + 1, hi)?;
            merge(mesh, ldi, rdi, hi - lo + 1)?;
            Ok((ldo, rdo))
        }
    }
}

fn base_triangle(
    mesh: &mut Mesh<'_>,
    lo: usize,
) -> Result<(VertexId, VertexId), TriangulationError> {
    let (a, b, c) = (VertexId(lo), VertexId(lo + 1), VertexId(lo + 2));
    mesh.insert_edge(a, b)?;
    mesh.insert_edge(b, c)?;
    let o = orient2d(mesh.pos(a), mesh.pos(b), mesh.pos(c));
    if o > 0.0 {
        mesh.insert_edge(a, c)?;
        mesh.set_first(a, b)?;
        mesh.set_first(c, a)?;
    } else if o < 0.0 {
        mesh.insert_edge(a, c)?;
        mesh.set_first(a, c)?;
        mesh.set_first(c, b)?;
    } else {
        // Collinear: a path, no closing edge.
        mesh.set_first(a, b)?;
        mesh.set_first(c, b)?;
    }
    Ok((a, c))
}

fn missing(stage: &'static str, v: VertexId, w: VertexId) -> TriangulationError {
    TriangulationError::inconsistent(stage, format!("{} is not a neighbor of {}", w.0, v.0))
}

type Step = fn(&Mesh<'_>, &'static str, VertexId, VertexId) -> Result<VertexId, TriangulationError>;

fn first_of(
    mesh: &Mesh<'_>,
    stage: &'static str,
    v: VertexId,
) -> Result<VertexId, TriangulationError> {
    mesh.first(v).ok_or_else(|| {
        TriangulationError::inconsistent(stage, format!("vertex {} has no neighbors", v.0))
    })
}

pub(crate) fn pred(
    mesh: &Mesh<'_>,
    stage: &'static str,
    v: VertexId,
    w: VertexId,
) -> Result<VertexId, TriangulationError> {
    mesh.predecessor(v, w).ok_or_else(|| missing(stage, v, w))
}

fn succ(
    mesh: &Mesh<'_>,
    stage: &'static str,
    v: VertexId,
    w: VertexId,
) -> Result<VertexId, TriangulationError> {
    mesh.successor(v, w).ok_or_else(|| missing(stage, v, w))
}

/// Lower common tangent `(left, right)`, starting from the rightmost vertex of
/// the left hull and the leftmost vertex of the right hull.
fn lower_tangent(
    mesh: &Mesh<'_>,
    ldi: VertexId,
    rdi: VertexId,
    bound: usize,
) -> Result<Edge, TriangulationError> {
    const STAGE: &str = "lower tangent";
    let (mut x, mut y) = (ldi, rdi);
    let mut rfast = first_of(mesh, STAGE, y)?;
    let mut lfast = pred(mesh, STAGE, x, first_of(mesh, STAGE, x)?)?;
    for _ in 0..bound {
        if right_of(mesh.pos(rfast), mesh.pos(x), mesh.pos(y)) {
            let old = y;
            y = rfast;
            rfast = succ(mesh, STAGE, y, old)?;
        } else if right_of(mesh.pos(lfast), mesh.pos(x), mesh.pos(y)) {
            let old = x;
            x = lfast;
            lfast = pred(mesh, STAGE, x, old)?;
        } else {
            return Ok((x, y));
        }
    }
    Err(TriangulationError::inconsistent(STAGE, format!("no tangent after {bound} steps")))
}

fn upper_tangent(
    mesh: &Mesh<'_>,
    ldi: VertexId,
    rdi: VertexId,
    bound: usize,
) -> Result<Edge, TriangulationError> {
    const STAGE: &str = "upper tangent";
    let (mut x, mut y) = (ldi, rdi);
    let mut lfast = first_of(mesh, STAGE, x)?;
    let mut rfast = pred(mesh, STAGE, y, first_of(mesh, STAGE, y)?)?;
    for _ in 0..bound {
        if left_of(mesh.pos(rfast), mesh.pos(x), mesh.pos(y)) {
            let old = y;
            y = rfast;
            rfast = pred(mesh, STAGE, y, old)?;
        } else if left_of(mesh.pos(lfast), mesh.pos(x), mesh.pos(y)) {
            let old = x;
            x = lfast;
            lfast = succ(mesh, STAGE, x, old)?;
        } else {
            return Ok((x, y));
        }
    }
    Err(TriangulationError::inconsistent(STAGE, format!("no tangent after {bound} steps")))
}

/// Cut edges `(pivot, cand)` while the next vertex around `pivot` (walking
/// with `step`) lies inside the circle through `l`, `r` and `cand`. Returns the
/// surviving candidate; running out of `bound` steps is an error.
pub(crate) fn prune_candidate(
    mesh: &mut Mesh<'_>,
    (l, r): Edge,
    pivot: VertexId,
    mut cand: VertexId,
    step: Step,
    bound: usize,
) -> Result<VertexId, TriangulationError> {
    const STAGE: &str = "merge";
    for _ in 0..bound {
        let next = step(mesh, STAGE, pivot, cand)?;
        if !in_circle(mesh.pos(l), mesh.pos(r), mesh.pos(cand), mesh.pos(next)) {
            return Ok(cand);
        }
        mesh.remove_edge(pivot, cand)?;
        cand = next;
    }
    Err(TriangulationError::inconsistent(
        STAGE,
        format!("candidates around {} not settled in {bound} steps", pivot.0),
    ))
}

/// Merge two adjacent triangulated ranges of `len` vertices in total.
fn merge(
    mesh: &mut Mesh<'_>,
    ldi: VertexId,
    rdi: VertexId,
    len: usize,
) -> Result<(), TriangulationError> {
    const STAGE: &str = "merge";
    let bound = 2 * len + 2;
    let lower = lower_tangent(mesh, ldi, rdi, bound)?;
    let upper = upper_tangent(mesh, ldi, rdi, bound)?;

    let (mut l, mut r) = lower;
    let mut closed = false;
    for _ in 0..=bound {
        mesh.insert_edge(l, r)?;
        if (l, r) == upper {
            closed = true;
            break;
        }

        // Right candidate: clockwise of l around r.
        let mut rc = pred(mesh, STAGE, r, l)?;
        if left_of(mesh.pos(rc), mesh.pos(l), mesh.pos(r)) {
            let bound = mesh.degree(r);
            rc = prune_candidate(mesh, (l, r), r, rc, pred, bound)?;
        }

        // Left candidate: counter-clockwise of r around l.
        let mut lc = succ(mesh, STAGE, l, r)?;
        if left_of(mesh.pos(lc), mesh.pos(l), mesh.pos(r)) {
            let bound = mesh.degree(l);
            lc = prune_candidate(mesh, (l, r), l, lc, succ, bound)?;
        }

        let r_valid = left_of(mesh.pos(rc), mesh.pos(l), mesh.pos(r));
        let l_valid = left_of(mesh.pos(lc), mesh.pos(l), mesh.pos(r));
        if !r_valid && !l_valid {
            return Err(TriangulationError::inconsistent(
                STAGE,
                format!("no candidate above base ({}, {}) before upper tangent", l.0, r.0),
            ));
        }
        let prefer_right =
            r_valid && in_circle(mesh.pos(lc), mesh.pos(l), mesh.pos(r), mesh.pos(rc));
        if !l_valid || prefer_right {
            r = rc;
        } else {
            l = lc;
        }
    }
    if !closed {
        return Err(TriangulationError::inconsistent(
            STAGE,
            format!("seam did not reach the upper tangent in {bound} steps"),
        ));
    }

    mesh.set_first(lower.0, lower.1)?;
    mesh.set_first(upper.1, upper.0)?;
    Ok(())
}
