use super::*;
use nalgebra::vector;

fn flat_sheet() -> Vec<Vector3<f64>> {
    (0..9)
        .flat_map(|i| (0..9).map(move |j| vector![0.25 * i as f64, 0.25 * j as f64, 0.0]))
        .collect()
}

#[test]
fn flat_sheet_has_flat_heightmap_and_full_area() {
    let frames = vec![flat_sheet()];
    let cfg = GridCfg {
        cell_width: 0.5,
        weight: WeightFn::DistanceSquared,
    };
    let grid = TessellatedGrid::build(&frames, &cfg).unwrap();
    assert_eq!(grid.dims, [6, 6, 2]);
    assert!(grid.heightmap.iter().all(|&h| h == 0));
    assert_eq!(grid.num_empty, 0);
    // 5 x 5 cells of 0.5 x 0.5.
    assert!((grid.surface_area - 6.25).abs() < 1e-12);
    assert!((grid.area_per_particle - 6.25 / 81.0).abs() < 1e-12);
    assert_eq!(grid.areas.len(), 25);
}

#[test]
fn raised_layer_moves_the_heightmap() {
    // The sheet at z = 1 appears in two frames, so it outweighs the one at z = 0.
    let low = flat_sheet();
    let high: Vec<_> = flat_sheet().into_iter().map(|p| p + vector![0.0, 0.0, 1.0]).collect();
    let frames = vec![low, high.clone(), high];
    let cfg = GridCfg {
        cell_width: 0.5,
        weight: WeightFn::Distance,
    };
    let grid = TessellatedGrid::build(&frames, &cfg).unwrap();
    assert_eq!(grid.dims, [6, 6, 4]);
    // z = 1.0 sits on grid level 2.
    assert!(grid.heightmap.iter().all(|&h| h == 2), "{:?}", grid.heightmap);
    assert!((grid.surface_area - 6.25).abs() < 1e-12);
}

#[test]
fn sparse_particles_leave_empty_cells() {
    let frames = vec![vec![vector![0.0, 0.0, 0.0], vector![2.0, 2.0, 0.0]]];
    let cfg = GridCfg {
        cell_width: 0.5,
        ..GridCfg::default()
    };
    let grid = TessellatedGrid::build(&frames, &cfg).unwrap();
    assert_eq!(grid.num_empty, 23);
    assert!((grid.surface_area - 0.5).abs() < 1e-12);
}

#[test]
fn weights_follow_the_weight_function() {
    let w = 0.5;
    let atom = vector![0.0, 0.0, 0.0];
    let far = vector![0.5, 0.5, 0.5];
    assert!((WeightFn::Distance.weight(atom, atom, w) - 3f64.sqrt() * w).abs() < 1e-15);
    assert!(WeightFn::Distance.weight(atom, far, w).abs() < 1e-15);
    assert_eq!(WeightFn::DistanceSquared.weight(atom, atom, w), 0.75);
    assert_eq!(WeightFn::DistanceSquared.weight(atom, far, w), 0.0);

    let cfg = GridCfg {
        cell_width: w,
        weight: WeightFn::DistanceSquared,
    };
    let grid = TessellatedGrid::build(&[vec![atom]], &cfg).unwrap();
    assert_eq!(grid.dims, [2, 2, 2]);
    assert_eq!(grid.weight(0, 0, 0), 0.75);
    assert_eq!(grid.weight(1, 1, 1), 0.0);
    assert_eq!(grid.weight(1, 0, 0), 0.5);
}

#[test]
fn invalid_input_is_rejected() {
    let cfg = GridCfg::default();
    assert_eq!(TessellatedGrid::build(&[], &cfg), Err(GridError::NoParticles));
    assert_eq!(
        TessellatedGrid::build(&[vec![]], &GridCfg { cell_width: 0.0, ..cfg }),
        Err(GridError::InvalidWidth(0.0))
    );
    assert_eq!(
        TessellatedGrid::build(&[vec![vector![0.0, f64::NAN, 0.0]]], &cfg),
        Err(GridError::NonFinite { frame: 0, particle: 0 })
    );
}

#[test]
fn oversized_grids_are_refused() {
    let frames = vec![vec![vector![0.0, 0.0, 0.0], vector![8.0, 1.0, 1.0]]];
    // One axis alone would overflow.
    let tiny = GridCfg {
        cell_width: 1e-300,
        ..GridCfg::default()
    };
    assert!(matches!(
        TessellatedGrid::build(&frames, &tiny),
        Err(GridError::TooLarge { .. })
    ));
    // Every axis fits but their product does not.
    let fine = GridCfg {
        cell_width: 1.0 / 1024.0,
        ..GridCfg::default()
    };
    match TessellatedGrid::build(&frames, &fine) {
        Err(GridError::TooLarge { points }) => assert_eq!(points, [8_194.0, 1_026.0, 1_026.0]),
        other => panic!("expected TooLarge, got {other:?}"),
    }
}

#[test]
fn summary_lists_heightmap_rows() {
    let cfg = GridCfg {
        cell_width: 0.5,
        ..GridCfg::default()
    };
    let grid = TessellatedGrid::build(&[flat_sheet()], &cfg).unwrap();
    let mut buf = Vec::new();
    grid.write_summary(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.starts_with("dims\t6\t6\t2\n"));
    assert!(text.contains("num_empty\t0"));
    let rows: Vec<&str> = text.split("heightmap\n").nth(1).unwrap().lines().collect();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0], "0\t0\t0\t0\t0\t0");
}
