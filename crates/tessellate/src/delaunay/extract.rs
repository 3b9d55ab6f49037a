//! Triangle extraction from the finished adjacency.

use super::adjacency::Mesh;
use super::types::VertexId;
use crate::predicates::orient2d;

/// Emit every triangle exactly once, counter-clockwise, as input indices.
///
/// Vertices are visited in `walk` order (a permutation of vertex positions)
/// and each walks its neighbor cycle. A consecutive pair `(n, nn)` spans a
/// triangle when both are unconsumed, the turn is strictly counter-clockwise
/// and `n`, `nn` are adjacent. The vertex is then consumed
/// and its list released, so later vertices never re-emit its triangles.
pub(crate) fn extract_triangles(mut mesh: Mesh<'_>, walk: &[usize]) -> Vec<[usize; 3]> {
    let n = mesh.len();
    let mut consumed = vec![false; n];
    let mut triangles = Vec::with_capacity(2 * n);
    let mut ring: Vec<VertexId> = Vec::new();
    for &k in walk {
        let v = VertexId(k);
        ring.clear();
        ring.extend(mesh.neighbors(v));
        if ring.len() >= 2 {
            let pv = mesh.pos(v);
            for (i, &a) in ring.iter().enumerate() {
                let b = ring[(i + 1) % ring.len()];
                if a == b || consumed[a.0] || consumed[b.0] {
                    continue;
                }
                if orient2d(pv, mesh.pos(a), mesh.pos(b)) > 0.0 && mesh.contains(a, b) {
                    triangles.push([mesh.index(v), mesh.index(a), mesh.index(b)]);
                }
            }
        }
        consumed[k] = true;
        mesh.release(v);
    }
    triangles.shrink_to_fit();
    triangles
}
