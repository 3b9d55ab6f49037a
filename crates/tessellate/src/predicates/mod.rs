//! Exact planar predicates (orientation and in-circle).
//!
//! Purpose
//! - Decide "left / right / on" and "inside / outside / on circle" without
//!   rounding ever flipping an answer. The merge sweep of the triangulator
//!   loops or builds crossing edges as soon as two predicate calls disagree.
//!
//! Scheme
//! - Stage A: evaluate the determinant in plain `f64` and accept its sign when
//!   it clears a forward error bound (Shewchuk's `ccwerrboundA`/`iccerrboundA`).
//! - Otherwise re-evaluate exactly with expansion arithmetic (`expansion.rs`).
//!   The returned value always has the sign of the exact determinant; zero
//!   means exactly collinear / cocircular.
//!
//! Code cross-refs: `delaunay::Mesh::insert_edge`, `delaunay::build`.

mod expansion;

use nalgebra::Vector2;

use expansion::Expansion;

const HALF_EPS: f64 = f64::EPSILON * 0.5;
const CCW_ERR_BOUND_A: f64 = (3.0 + 16.0 * HALF_EPS) * HALF_EPS;
const ICC_ERR_BOUND_A: f64 = (10.0 + 96.0 * HALF_EPS) * HALF_EPS;

/// Position of `c` relative to the directed line `a → b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// `c` is left of `a → b` (a, b, c counter-clockwise).
    CounterClockwise,
    /// `c` is right of `a → b` (a, b, c clockwise).
    Clockwise,
    Collinear,
}

/// Position of `d` relative to the circle through a counter-clockwise triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CirclePosition {
    Inside,
    Outside,
    Cocircular,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CounterClockwise => write!(f, "counter-clockwise"),
            Self::Clockwise => write!(f, "clockwise"),
            Self::Collinear => write!(f, "collinear"),
        }
    }
}

/// Twice the signed area of triangle (a, b, c), with exact sign.
///
/// Positive for a counter-clockwise triple, negative for clockwise, zero iff the
/// three points are exactly collinear. The magnitude is an approximation.
pub fn orient2d(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> f64 {
    let det_left = (a.x - c.x) * (b.y - c.y);
    let det_right = (a.y - c.y) * (b.x - c.x);
    let det = det_left - det_right;
    let err_bound = CCW_ERR_BOUND_A * (det_left.abs() + det_right.abs());
    if det > err_bound || -det > err_bound {
        return det;
    }
    orient2d_exact(a, b, c)
}

fn orient2d_exact(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> f64 {
    let acx = Expansion::diff(a.x, c.x);
    let acy = Expansion::diff(a.y, c.y);
    let bcx = Expansion::diff(b.x, c.x);
    let bcy = Expansion::diff(b.y, c.y);
    acx.mul(&bcy).sub(&acy.mul(&bcx)).estimate()
}

/// Classify `c` against the directed line `a → b`.
#[inline]
pub fn orientation(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> Orientation {
    let det = orient2d(a, b, c);
    if det > 0.0 {
        Orientation::CounterClockwise
    } else if det < 0.0 {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// `p` strictly right of the directed edge `a → b`.
#[inline]
pub fn right_of(p: Vector2<f64>, a: Vector2<f64>, b: Vector2<f64>) -> bool {
    orient2d(p, b, a) > 0.0
}

/// `p` strictly left of the directed edge `a → b`.
#[inline]
pub fn left_of(p: Vector2<f64>, a: Vector2<f64>, b: Vector2<f64>) -> bool {
    orient2d(p, a, b) > 0.0
}

/// Lifted 4×4 in-circle determinant, with exact sign.
///
/// Positive iff `d` lies strictly inside the circle through `a, b, c` when
/// `a, b, c` are counter-clockwise (the sign flips for a clockwise triple).
pub fn incircle(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>, d: Vector2<f64>) -> f64 {
    let adx = a.x - d.x;
    let bdx = b.x - d.x;
    let cdx = c.x - d.x;
    let ady = a.y - d.y;
    let bdy = b.y - d.y;
    let cdy = c.y - d.y;

    let bdxcdy = bdx * cdy;
    let cdxbdy = cdx * bdy;
    let alift = adx * adx + ady * ady;

    let cdxady = cdx * ady;
    let adxcdy = adx * cdy;
    let blift = bdx * bdx + bdy * bdy;

    let adxbdy = adx * bdy;
    let bdxady = bdx * ady;
    let clift = cdx * cdx + cdy * cdy;

    let det = alift * (bdxcdy - cdxbdy) + blift * (cdxady - adxcdy) + clift * (adxbdy - bdxady);
    let permanent = (bdxcdy.abs() + cdxbdy.abs()) * alift
        + (cdxady.abs() + adxcdy.abs()) * blift
        + (adxbdy.abs() + bdxady.abs()) * clift;
    let err_bound = ICC_ERR_BOUND_A * permanent;
    if det > err_bound || -det > err_bound {
        return det;
    }
    incircle_exact(a, b, c, d)
}

fn incircle_exact(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>, d: Vector2<f64>) -> f64 {
    let adx = Expansion::diff(a.x, d.x);
    let bdx = Expansion::diff(b.x, d.x);
    let cdx = Expansion::diff(c.x, d.x);
    let ady = Expansion::diff(a.y, d.y);
    let bdy = Expansion::diff(b.y, d.y);
    let cdy = Expansion::diff(c.y, d.y);

    let alift = adx.mul(&adx).add(&ady.mul(&ady));
    let blift = bdx.mul(&bdx).add(&bdy.mul(&bdy));
    let clift = cdx.mul(&cdx).add(&cdy.mul(&cdy));

    let bc = bdx.mul(&cdy).sub(&cdx.mul(&bdy));
    let ca = cdx.mul(&ady).sub(&adx.mul(&cdy));
    let ab = adx.mul(&bdy).sub(&bdx.mul(&ady));

    alift
        .mul(&bc)
        .add(&blift.mul(&ca))
        .add(&clift.mul(&ab))
        .estimate()
}

/// `d` strictly inside the circle through the counter-clockwise triple `a, b, c`.
#[inline]
pub fn in_circle(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>, d: Vector2<f64>) -> bool {
    incircle(a, b, c, d) > 0.0
}

/// Classify `d` against the circle through `a, b, c` (any orientation of the triple).
///
/// Returns `None` for a collinear triple, which has no circumcircle.
pub fn circle_position(
    a: Vector2<f64>,
    b: Vector2<f64>,
    c: Vector2<f64>,
    d: Vector2<f64>,
) -> Option<CirclePosition> {
    let o = orient2d(a, b, c);
    if o == 0.0 {
        return None;
    }
    let det = incircle(a, b, c, d) * o.signum();
    Some(if det > 0.0 {
        CirclePosition::Inside
    } else if det < 0.0 {
        CirclePosition::Outside
    } else {
        CirclePosition::Cocircular
    })
}
