//! Floating-point expansion arithmetic (exact sums and products of `f64`).
//!
//! An expansion is a sequence of non-overlapping `f64` components ordered by
//! increasing magnitude whose exact sum is the represented value. Zero
//! components are eliminated, so the last component carries the sign.
//!
//! References
//! - Shewchuk, "Adaptive Precision Floating-Point Arithmetic and Fast Robust
//!   Geometric Predicates" (1997), sections 2.5–2.8.

/// `a + b = x + y` exactly, `x = fl(a + b)`.
#[inline]
pub(crate) fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let x = a + b;
    let b_virt = x - a;
    let a_virt = x - b_virt;
    let b_round = b - b_virt;
    let a_round = a - a_virt;
    (x, a_round + b_round)
}

/// Requires `|a| >= |b|`.
#[inline]
fn fast_two_sum(a: f64, b: f64) -> (f64, f64) {
    let x = a + b;
    let b_virt = x - a;
    (x, b - b_virt)
}

/// `a - b = x + y` exactly.
#[inline]
pub(crate) fn two_diff(a: f64, b: f64) -> (f64, f64) {
    let x = a - b;
    let b_virt = a - x;
    let a_virt = x + b_virt;
    let b_round = b_virt - b;
    let a_round = a - a_virt;
    (x, a_round + b_round)
}

/// `a * b = x + y` exactly (fused multiply-add recovers the rounding error).
#[inline]
pub(crate) fn two_product(a: f64, b: f64) -> (f64, f64) {
    let x = a * b;
    (x, a.mul_add(b, -x))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Expansion {
    comps: Vec<f64>,
}

impl Expansion {
    pub(crate) fn zero() -> Self {
        Self { comps: Vec::new() }
    }

    /// Exact `a - b`.
    pub(crate) fn diff(a: f64, b: f64) -> Self {
        let (x, y) = two_diff(a, b);
        Self::from_pair(x, y)
    }

    /// Exact `a * b`.
    #[cfg(test)]
    pub(crate) fn product(a: f64, b: f64) -> Self {
        let (x, y) = two_product(a, b);
        Self::from_pair(x, y)
    }

    fn from_pair(head: f64, tail: f64) -> Self {
        let mut comps = Vec::with_capacity(2);
        if tail != 0.0 {
            comps.push(tail);
        }
        if head != 0.0 {
            comps.push(head);
        }
        Self { comps }
    }

    /// Add a single component (Shewchuk's GROW-EXPANSION with zero elimination).
    fn grow(&self, b: f64) -> Self {
        let mut out = Vec::with_capacity(self.comps.len() + 1);
        let mut q = b;
        for &e in &self.comps {
            let (sum, err) = two_sum(q, e);
            if err != 0.0 {
                out.push(err);
            }
            q = sum;
        }
        if q != 0.0 {
            out.push(q);
        }
        Self { comps: out }
    }

    pub(crate) fn add(&self, other: &Expansion) -> Self {
        let (mut acc, rest) = if self.comps.len() >= other.comps.len() {
            (self.clone(), other)
        } else {
            (other.clone(), self)
        };
        for &c in &rest.comps {
            acc = acc.grow(c);
        }
        acc
    }

    pub(crate) fn neg(&self) -> Self {
        Self {
            comps: self.comps.iter().map(|c| -c).collect(),
        }
    }

    pub(crate) fn sub(&self, other: &Expansion) -> Self {
        self.add(&other.neg())
    }

    /// Multiply by a single `f64` (SCALE-EXPANSION with zero elimination).
    fn scale(&self, b: f64) -> Self {
        let Some((&e0, tail)) = self.comps.split_first() else {
            return Self::zero();
        };
        let mut out = Vec::with_capacity(2 * self.comps.len());
        let (mut q, hh) = two_product(e0, b);
        if hh != 0.0 {
            out.push(hh);
        }
        for &e in tail {
            let (p1, p0) = two_product(e, b);
            let (sum, hh) = two_sum(q, p0);
            if hh != 0.0 {
                out.push(hh);
            }
            let (nq, hh) = fast_two_sum(p1, sum);
            if hh != 0.0 {
                out.push(hh);
            }
            q = nq;
        }
        if q != 0.0 {
            out.push(q);
        }
        Self { comps: out }
    }

    pub(crate) fn mul(&self, other: &Expansion) -> Self {
        let mut acc = Self::zero();
        for &c in &other.comps {
            acc = acc.add(&self.scale(c));
        }
        acc
    }

    /// Most significant component: same sign as the exact value, zero iff the value is zero.
    #[inline]
    pub(crate) fn estimate(&self) -> f64 {
        self.comps.last().copied().unwrap_or(0.0)
    }

    #[cfg(test)]
    pub(crate) fn components(&self) -> &[f64] {
        &self.comps
    }
}
