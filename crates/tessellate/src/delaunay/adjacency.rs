//! Circular neighbor lists stored in one arena.
//!
//! Every vertex owns a cyclic doubly linked list of neighbor nodes ordered
//! counter-clockwise by angle (`next` turns CCW, `prev` turns CW). Nodes live in
//! a single `Vec` and are addressed by `NodeId`; freed nodes go to a free list.
//! Edges are always inserted and removed on both endpoints at once.
//!
//! The `first` neighbor of a vertex is a plain head pointer. The triangulator
//! keeps it pointing at the counter-clockwise convex-hull successor of the
//! extreme vertices of every merged range.

use nalgebra::Vector2;

use super::types::{AdjacencyError, VertexId};
use crate::predicates::orient2d;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NodeId(usize);

#[derive(Clone, Copy, Debug)]
struct Node {
    vertex: VertexId,
    prev: NodeId,
    next: NodeId,
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    /// Input index of the vertex.
    index: usize,
    first: Option<NodeId>,
    degree: usize,
}

/// Adjacency state for one triangulation call.
#[derive(Debug)]
pub(crate) struct Mesh<'a> {
    points: &'a [Vector2<f64>],
    slots: Vec<Slot>,
    nodes: Vec<Node>,
    free: Vec<NodeId>,
}

impl<'a> Mesh<'a> {
    /// `order[k]` is the input index of vertex `VertexId(k)`.
    pub(crate) fn new(points: &'a [Vector2<f64>], order: &[usize]) -> Self {
        let slots = order
            .iter()
            .map(|&index| Slot {
                index,
                first: None,
                degree: 0,
            })
            .collect();
        Self {
            points,
            slots,
            // Planar graphs have fewer than 3n edges, two nodes each.
            nodes: Vec::with_capacity(6 * order.len()),
            free: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn index(&self, v: VertexId) -> usize {
        self.slots[v.0].index
    }

    #[inline]
    pub(crate) fn pos(&self, v: VertexId) -> Vector2<f64> {
        self.points[self.slots[v.0].index]
    }

    #[inline]
    pub(crate) fn degree(&self, v: VertexId) -> usize {
        self.slots[v.0].degree
    }

    pub(crate) fn first(&self, v: VertexId) -> Option<VertexId> {
        self.slots[v.0].first.map(|n| self.nodes[n.0].vertex)
    }

    /// Move the head of `v`'s list to neighbor `w`.
    pub(crate) fn set_first(&mut self, v: VertexId, w: VertexId) -> Result<(), AdjacencyError> {
        let node = self.find(v, w).ok_or(AdjacencyError::MissingEdge(v, w))?;
        self.slots[v.0].first = Some(node);
        Ok(())
    }

    fn find(&self, v: VertexId, w: VertexId) -> Option<NodeId> {
        let head = self.slots[v.0].first?;
        let mut cur = head;
        for _ in 0..self.slots[v.0].degree {
            if self.nodes[cur.0].vertex == w {
                return Some(cur);
            }
            cur = self.nodes[cur.0].next;
        }
        None
    }

    pub(crate) fn contains(&self, v: VertexId, w: VertexId) -> bool {
        self.find(v, w).is_some()
    }

    /// Neighbor of `v` immediately clockwise of `w`. A single-neighbor list
    /// returns `w` itself; `None` when `w` is not a neighbor of `v`.
    pub(crate) fn predecessor(&self, v: VertexId, w: VertexId) -> Option<VertexId> {
        let node = self.find(v, w)?;
        Some(self.nodes[self.nodes[node.0].prev.0].vertex)
    }

    /// Neighbor of `v` immediately counter-clockwise of `w`.
    pub(crate) fn successor(&self, v: VertexId, w: VertexId) -> Option<VertexId> {
        let node = self.find(v, w)?;
        Some(self.nodes[self.nodes[node.0].next.0].vertex)
    }

    /// Neighbors of `v` counter-clockwise, starting at `first(v)`.
    pub(crate) fn neighbors(&self, v: VertexId) -> Neighbors<'_, 'a> {
        Neighbors {
            mesh: self,
            cur: self.slots[v.0].first,
            left: self.slots[v.0].degree,
        }
    }

    /// Add the undirected edge `(a, b)`, placing each endpoint in the other's
    /// list at its angular position.
    pub(crate) fn insert_edge(&mut self, a: VertexId, b: VertexId) -> Result<(), AdjacencyError> {
        if a == b {
            return Err(AdjacencyError::SelfLoop(a));
        }
        if self.contains(a, b) {
            return Err(AdjacencyError::DuplicateEdge(a, b));
        }
        // Locate both slots before touching either list so a failure leaves the
        // mesh unchanged.
        let slot_a = self.angular_slot(a, b)?;
        let slot_b = self.angular_slot(b, a)?;
        self.link_after(a, slot_a, b);
        self.link_after(b, slot_b, a);
        Ok(())
    }

    /// Remove the undirected edge `(a, b)` from both lists.
    pub(crate) fn remove_edge(&mut self, a: VertexId, b: VertexId) -> Result<(), AdjacencyError> {
        let na = self.find(a, b).ok_or(AdjacencyError::MissingEdge(a, b))?;
        let nb = self.find(b, a).ok_or(AdjacencyError::MissingEdge(b, a))?;
        self.unlink(a, na);
        self.unlink(b, nb);
        Ok(())
    }

    /// Drop every node of `v`'s list without touching its neighbors' lists.
    ///
    /// Only for extraction teardown: afterwards the mesh is no longer symmetric.
    pub(crate) fn release(&mut self, v: VertexId) {
        let slot = self.slots[v.0];
        if let Some(head) = slot.first {
            let mut cur = head;
            for _ in 0..slot.degree {
                let next = self.nodes[cur.0].next;
                self.free.push(cur);
                cur = next;
            }
        }
        self.slots[v.0].first = None;
        self.slots[v.0].degree = 0;
    }

    /// Node of `parent`'s list after which `neighbor` belongs; `None` for an
    /// empty list.
    fn angular_slot(
        &self,
        parent: VertexId,
        neighbor: VertexId,
    ) -> Result<Option<NodeId>, AdjacencyError> {
        let Some(head) = self.slots[parent.0].first else {
            return Ok(None);
        };
        let p = self.pos(parent);
        let x = self.pos(neighbor);
        let mut cur = head;
        for _ in 0..self.slots[parent.0].degree {
            let next = self.nodes[cur.0].next;
            let a = self.pos(self.nodes[cur.0].vertex);
            let b = self.pos(self.nodes[next.0].vertex);
            if ccw_between(p, a, x, b, cur == next) {
                return Ok(Some(cur));
            }
            cur = next;
        }
        Err(AdjacencyError::NoAngularSlot { parent, neighbor })
    }

    fn link_after(&mut self, parent: VertexId, after: Option<NodeId>, vertex: VertexId) {
        let id = match after {
            None => {
                let id = self.alloc(vertex);
                self.nodes[id.0].prev = id;
                self.nodes[id.0].next = id;
                self.slots[parent.0].first = Some(id);
                id
            }
            Some(prev) => {
                let id = self.alloc(vertex);
                let next = self.nodes[prev.0].next;
                self.nodes[id.0].prev = prev;
                self.nodes[id.0].next = next;
                self.nodes[prev.0].next = id;
                self.nodes[next.0].prev = id;
                id
            }
        };
        debug_assert_eq!(self.nodes[id.0].vertex, vertex);
        self.slots[parent.0].degree += 1;
    }

    fn unlink(&mut self, parent: VertexId, node: NodeId) {
        let Node { prev, next, .. } = self.nodes[node.0];
        let slot = &mut self.slots[parent.0];
        slot.degree -= 1;
        if slot.degree == 0 {
            slot.first = None;
        } else {
            self.nodes[prev.0].next = next;
            self.nodes[next.0].prev = prev;
            if slot.first == Some(node) {
                slot.first = Some(next);
            }
        }
        self.free.push(node);
    }

    fn alloc(&mut self, vertex: VertexId) -> NodeId {
        let placeholder = NodeId(usize::MAX);
        let node = Node {
            vertex,
            prev: placeholder,
            next: placeholder,
        };
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        }
    }
}

pub(crate) struct Neighbors<'m, 'a> {
    mesh: &'m Mesh<'a>,
    cur: Option<NodeId>,
    left: usize,
}

impl Iterator for Neighbors<'_, '_> {
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        if self.left == 0 {
            return None;
        }
        let cur = self.cur?;
        let node = self.mesh.nodes[cur.0];
        self.cur = Some(node.next);
        self.left -= 1;
        Some(node.vertex)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.left, Some(self.left))
    }
}

/// Direction `x` around `p` lies strictly inside the counter-clockwise arc from
/// direction `a` to direction `b`. `full` marks a one-neighbor list (`a == b`),
/// whose arc is the whole turn.
fn ccw_between(
    p: Vector2<f64>,
    a: Vector2<f64>,
    x: Vector2<f64>,
    b: Vector2<f64>,
    full: bool,
) -> bool {
    let o_ax = orient2d(p, a, x);
    if o_ax == 0.0 && same_ray(p, a, x) {
        return false;
    }
    if full {
        return true;
    }
    let o_xb = orient2d(p, x, b);
    if o_xb == 0.0 && same_ray(p, x, b) {
        return false;
    }
    let o_ab = orient2d(p, a, b);
    if o_ab > 0.0 {
        o_ax > 0.0 && o_xb > 0.0
    } else if o_ab < 0.0 {
        // Reflex arc: inside unless x falls in the closed complementary arc.
        let o_bx = orient2d(p, b, x);
        let o_xa = orient2d(p, x, a);
        !(o_bx > 0.0 && o_xa > 0.0)
    } else if same_ray(p, a, b) {
        false
    } else {
        // a and b opposite: a half turn.
        o_ax > 0.0
    }
}

/// For `u`, `w` collinear with `p`: same direction from `p`. Exact, since the
/// sign of a floating-point difference is exact.
fn same_ray(p: Vector2<f64>, u: Vector2<f64>, w: Vector2<f64>) -> bool {
    let sx = (u.x - p.x).partial_cmp(&0.0) == (w.x - p.x).partial_cmp(&0.0);
    let sy = (u.y - p.y).partial_cmp(&0.0) == (w.y - p.y).partial_cmp(&0.0);
    sx && sy
}
