use super::adjacency::Mesh;
use super::build::{order_points, pred, prune_candidate};
use super::*;
use crate::predicates::orient2d;
use nalgebra::vector;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

fn random_points(n: usize, seed: u64) -> Vec<Vector2<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| vector![rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0)])
        .collect()
}

/// Rotate each triangle to start at its smallest index, then sort.
fn canonical(tri: &Triangulation) -> Vec<[usize; 3]> {
    let mut out: Vec<[usize; 3]> = tri
        .triangles
        .iter()
        .map(|t| {
            let k = (0..3).min_by_key(|&k| t[k]).unwrap();
            [t[k], t[(k + 1) % 3], t[(k + 2) % 3]]
        })
        .collect();
    out.sort_unstable();
    out
}

fn assert_ccw(points: &[Vector2<f64>], tri: &Triangulation) {
    for t in &tri.triangles {
        assert!(orient2d(points[t[0]], points[t[1]], points[t[2]]) > 0.0, "{t:?}");
    }
}

#[test]
fn unit_square_gives_two_triangles() {
    let pts = vec![
        vector![0.0, 0.0],
        vector![1.0, 0.0],
        vector![1.0, 1.0],
        vector![0.0, 1.0],
    ];
    let tri = triangulate(&pts).unwrap();
    assert_eq!(tri.triangle_count(), 2);
    assert_eq!(tri.nverts, 4);
    assert_ccw(&pts, &tri);
    validate_delaunay(&pts, &tri).unwrap();
    // Two triangles share exactly one diagonal: 5 distinct edges.
    assert_eq!(tri.edges().len(), 5);
    assert_eq!(tri.flat_indices().len(), 6);
}

#[test]
fn single_triangle_is_reported_counter_clockwise() {
    // Input given clockwise.
    let pts = vec![vector![0.0, 0.0], vector![0.0, 1.0], vector![1.0, 0.0]];
    let tri = triangulate(&pts).unwrap();
    assert_eq!(tri.triangle_count(), 1);
    assert_ccw(&pts, &tri);
}

#[test]
fn collinear_input_has_no_triangles() {
    let horizontal: Vec<_> = (0..7).map(|i| vector![i as f64, 0.0]).collect();
    assert_eq!(triangulate(&horizontal).unwrap().triangle_count(), 0);
    let vertical: Vec<_> = (0..9).map(|i| vector![2.5, -(i as f64)]).collect();
    assert_eq!(triangulate(&vertical).unwrap().triangle_count(), 0);
    let diagonal: Vec<_> = (0..6).map(|i| vector![0.1 * i as f64, 0.1 * i as f64]).collect();
    // Both coordinates round identically, so the points sit exactly on y = x.
    assert_eq!(triangulate(&diagonal).unwrap().triangle_count(), 0);
    let two = vec![vector![0.0, 0.0], vector![1.0, 5.0]];
    assert_eq!(triangulate(&two).unwrap().triangle_count(), 0);
}

#[test]
fn too_few_points_is_an_error() {
    assert_eq!(
        triangulate(&[]),
        Err(TriangulationError::TooFewPoints { points: 0, distinct: 0 })
    );
    assert_eq!(
        triangulate(&[vector![1.0, 2.0]]),
        Err(TriangulationError::TooFewPoints { points: 1, distinct: 1 })
    );
    let same = vec![vector![1.0, 2.0]; 3];
    assert_eq!(
        triangulate(&same),
        Err(TriangulationError::TooFewPoints { points: 3, distinct: 1 })
    );
}

#[test]
fn non_finite_and_flat_length_are_rejected() {
    let pts = vec![vector![0.0, 0.0], vector![f64::NAN, 1.0], vector![1.0, 0.0]];
    assert_eq!(triangulate(&pts), Err(TriangulationError::NonFinite { index: 1 }));
    let pts = vec![vector![0.0, f64::INFINITY], vector![1.0, 0.0]];
    assert_eq!(triangulate(&pts), Err(TriangulationError::NonFinite { index: 0 }));
    assert_eq!(
        triangulate_flat(&[0.0, 0.0, 1.0]),
        Err(TriangulationError::InvalidFlatLength { len: 3 })
    );
    let tri = triangulate_flat(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]).unwrap();
    assert_eq!(tri.triangles, vec![[0, 1, 2]]);
}

#[test]
fn grid_counts_and_cocircular_ties() {
    for n in [2usize, 3, 5, 8] {
        let mut pts: Vec<Vector2<f64>> = (0..n)
            .flat_map(|i| (0..n).map(move |j| vector![i as f64, j as f64]))
            .collect();
        pts.shuffle(&mut StdRng::seed_from_u64(n as u64));
        let tri = triangulate(&pts).unwrap();
        assert_eq!(tri.triangle_count(), 2 * (n - 1) * (n - 1), "n={n}");
        assert_ccw(&pts, &tri);
        validate_delaunay(&pts, &tri).unwrap();
    }
}

#[test]
fn exactly_cocircular_points_fan_out() {
    // Integer points on x^2 + y^2 = 25.
    let pts: Vec<Vector2<f64>> = [
        (5, 0),
        (4, 3),
        (3, 4),
        (0, 5),
        (-3, 4),
        (-4, 3),
        (-5, 0),
        (-4, -3),
        (-3, -4),
        (0, -5),
        (3, -4),
        (4, -3),
    ]
    .iter()
    .map(|&(x, y)| vector![x as f64, y as f64])
    .collect();
    let tri = triangulate(&pts).unwrap();
    assert_eq!(tri.triangle_count(), pts.len() - 2);
    validate_delaunay(&pts, &tri).unwrap();
}

#[test]
fn random_cloud_is_delaunay_with_euler_count() {
    let pts = random_points(1000, 42);
    let tri = triangulate(&pts).unwrap();
    let h = convex_hull_size(&pts);
    assert_eq!(tri.triangle_count(), 2 * pts.len() - 2 - h);
    assert_ccw(&pts, &tri);
    validate_delaunay(&pts, &tri).unwrap();
}

#[test]
fn repeated_calls_and_permutations_agree() {
    let pts = random_points(300, 5);
    let a = triangulate(&pts).unwrap();
    let b = triangulate(&pts).unwrap();
    assert_eq!(a, b);

    let mut perm: Vec<usize> = (0..pts.len()).collect();
    perm.shuffle(&mut StdRng::seed_from_u64(9));
    let shuffled: Vec<Vector2<f64>> = perm.iter().map(|&i| pts[i]).collect();
    let c = triangulate(&shuffled).unwrap();
    // Map back to original indices; random points are in general position,
    // so the triangulation is unique.
    let back = Triangulation {
        triangles: c
            .triangles
            .iter()
            .map(|t| t.map(|k| perm[k]))
            .collect(),
        ..c.clone()
    };
    assert_eq!(canonical(&a), canonical(&back));
}

#[test]
fn exact_duplicates_collapse_onto_first_occurrence() {
    let pts = vec![
        vector![0.0, 0.0],
        vector![1.0, 0.0],
        vector![0.0, 1.0],
        vector![1.0, 0.0],
        vector![-0.0, 1.0],
    ];
    let tri = triangulate(&pts).unwrap();
    assert_eq!(tri.nverts, 3);
    assert_eq!(tri.duplicates, vec![(4, 2), (3, 1)]);
    assert_eq!(tri.triangle_count(), 1);
    assert!(tri.triangles[0].iter().all(|&i| i < 3));
}

#[test]
fn reject_and_tolerance_policies() {
    let pts = vec![
        vector![0.0, 0.0],
        vector![1.0, 0.0],
        vector![1.0, 0.0],
        vector![0.0, 1.0],
    ];
    let reject = TriangulateCfg {
        dedup: DedupPolicy::Reject,
        ..TriangulateCfg::default()
    };
    assert_eq!(
        triangulate_with(&pts, &reject),
        Err(TriangulationError::DuplicatePoint { index: 2, first: 1 })
    );

    let near = vec![
        vector![0.0, 0.0],
        vector![1.0, 0.0],
        vector![1.0 + 1e-12, -1e-12],
        vector![0.0, 1.0],
    ];
    let tol = TriangulateCfg {
        dedup: DedupPolicy::Tolerance(1e-9),
        ..TriangulateCfg::default()
    };
    let tri = triangulate_with(&near, &tol).unwrap();
    assert_eq!(tri.nverts, 3);
    assert_eq!(tri.duplicates, vec![(2, 1)]);
    assert_eq!(tri.triangle_count(), 1);
    // Exact policy keeps the near-duplicate as its own vertex.
    assert_eq!(triangulate(&near).unwrap().nverts, 4);
}

#[test]
fn tie_band_orders_the_extraction_walk_by_y() {
    let pts = vec![
        vector![0.0, 2.0],
        vector![1e-9, 1.0],
        vector![2e-9, 0.0],
        vector![5.0, 0.0],
    ];
    let exact = order_points(&pts, &TriangulateCfg::default()).unwrap();
    assert_eq!(exact.order, vec![0, 1, 2, 3]);
    assert_eq!(exact.visit, vec![0, 1, 2, 3]);
    let banded = TriangulateCfg {
        x_tie_eps: 1e-6,
        ..TriangulateCfg::default()
    };
    let ordered = order_points(&pts, &banded).unwrap();
    assert_eq!(ordered.order, vec![0, 1, 2, 3]);
    assert_eq!(ordered.visit, vec![2, 1, 0, 3]);

    // Same triangles, listed from the lowest vertex of the band first.
    let plain = triangulate(&pts).unwrap();
    let tri = triangulate_with(&pts, &banded).unwrap();
    assert_eq!(plain.triangles[0][0], 0);
    assert_eq!(tri.triangles[0][0], 2);
    assert_eq!(canonical(&tri), canonical(&plain));
}

#[test]
fn tie_band_is_anchored_to_its_first_point() {
    // Gaps of 0.6 chain past a 1.0 band if measured pairwise.
    let pts = vec![
        vector![0.0, 3.0],
        vector![0.6, 2.0],
        vector![1.2, 1.0],
        vector![1.8, 0.0],
    ];
    let cfg = TriangulateCfg {
        x_tie_eps: 1.0,
        ..TriangulateCfg::default()
    };
    let ordered = order_points(&pts, &cfg).unwrap();
    assert_eq!(ordered.visit, vec![1, 0, 3, 2]);
}

#[test]
fn tie_band_keeps_random_clouds_delaunay() {
    let mut rng = StdRng::seed_from_u64(3);
    let pts: Vec<Vector2<f64>> = (0..1000)
        .map(|_| vector![rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)])
        .collect();
    let plain = triangulate(&pts).unwrap();
    for eps in [1e-6, 1e-4, 1e-3, 0.05] {
        let cfg = TriangulateCfg {
            x_tie_eps: eps,
            ..TriangulateCfg::default()
        };
        let tri = triangulate_with(&pts, &cfg).unwrap();
        validate_delaunay(&pts, &tri).unwrap();
        assert_ccw(&pts, &tri);
        assert_eq!(canonical(&tri), canonical(&plain), "eps = {eps}");
    }
}

#[test]
fn invalid_tie_band_is_rejected() {
    let pts = random_points(10, 1);
    for eps in [-1e-3, f64::NAN, f64::INFINITY] {
        let cfg = TriangulateCfg {
            x_tie_eps: eps,
            ..TriangulateCfg::default()
        };
        assert!(matches!(
            triangulate_with(&pts, &cfg),
            Err(TriangulationError::InvalidTieBand(_))
        ));
    }
}

#[test]
fn candidate_pruning_cuts_then_settles() {
    // Base edge l -> r; around r the candidate (2, 2) has (2.3, 0.8) inside
    // the circle through l, r and itself.
    let pts = vec![
        vector![0.0, 0.0],
        vector![2.0, 0.0],
        vector![2.0, 2.0],
        vector![2.3, 0.8],
    ];
    let (l, r) = (VertexId(0), VertexId(1));
    let build = || {
        let mut mesh = Mesh::new(&pts, &[0, 1, 2, 3]);
        for w in [0, 2, 3] {
            mesh.insert_edge(r, VertexId(w)).unwrap();
        }
        mesh
    };

    let mut mesh = build();
    let rc = mesh.predecessor(r, l).unwrap();
    assert_eq!(rc, VertexId(2));
    let bound = mesh.degree(r);
    let kept = prune_candidate(&mut mesh, (l, r), r, rc, pred, bound).unwrap();
    assert_eq!(kept, VertexId(3));
    assert!(!mesh.contains(r, VertexId(2)));

    // Too few steps to reach a settled candidate.
    let mut mesh = build();
    let err = prune_candidate(&mut mesh, (l, r), r, rc, pred, 1).unwrap_err();
    assert!(matches!(err, TriangulationError::Inconsistent { stage: "merge", .. }));
}

#[test]
fn hull_keeps_collinear_boundary_points() {
    let pts = vec![
        vector![0.0, 0.0],
        vector![1.0, 0.0],
        vector![2.0, 0.0],
        vector![1.0, 1.0],
        vector![1.0, 0.5],
    ];
    let hull = convex_hull(&pts);
    assert_eq!(hull, vec![0, 1, 2, 3]);
    let tri = triangulate(&pts).unwrap();
    assert_eq!(tri.triangle_count(), 2 * 5 - 2 - hull.len());
}

#[test]
fn validation_reports_a_bad_triangle() {
    let pts = vec![
        vector![0.0, 0.0],
        vector![4.0, 0.0],
        vector![0.0, 4.0],
        vector![1.0, 1.0],
    ];
    let bogus = Triangulation {
        npoints: 4,
        nverts: 4,
        triangles: vec![[0, 1, 2]],
        duplicates: Vec::new(),
    };
    assert_eq!(
        validate_delaunay(&pts, &bogus),
        Err(DelaunayViolation::NotEmpty {
            triangle: [0, 1, 2],
            point: 3
        })
    );
    let clockwise = Triangulation {
        triangles: vec![[0, 2, 1]],
        ..bogus
    };
    assert!(matches!(
        validate_delaunay(&pts, &clockwise),
        Err(DelaunayViolation::NotCounterClockwise { .. })
    ));
}
