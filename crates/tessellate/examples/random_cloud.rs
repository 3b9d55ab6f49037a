//! Triangulate a random cloud and a membrane-like frame, then print counts,
//! the Euler check and areas.
//!
//! Run: cargo run -p tessellate --example random_cloud -- [n] [seed]

use tessellate::api::{
    convex_hull_size, frame_area, sheet_frame, triangulate, uniform_cloud, validate_delaunay,
    AreaCfg, SampleToken, SheetCfg,
};

fn main() {
    let mut args = std::env::args().skip(1);
    let n: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(1_000);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    let pts = uniform_cloud(n, 10.0, SampleToken::new(seed, 0));
    let tri = match triangulate(&pts) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("triangulation failed: {e}");
            std::process::exit(1);
        }
    };
    let h = convex_hull_size(&pts);
    println!(
        "points={} triangles={} hull={} expected={}",
        n,
        tri.triangle_count(),
        h,
        2 * tri.nverts - 2 - h
    );
    if n <= 5_000 {
        match validate_delaunay(&pts, &tri) {
            Ok(()) => println!("empty circumcircle: ok"),
            Err(v) => println!("empty circumcircle: FAILED ({v})"),
        }
    }

    let sheet = SheetCfg {
        natoms: n.min(4_096),
        ..SheetCfg::default()
    };
    let fr = sheet_frame(&sheet, SampleToken::new(seed, 1));
    let cfg = AreaCfg {
        periodic: true,
        project_2d: true,
        ..AreaCfg::default()
    };
    match frame_area(&fr.coords, fr.box_dims, &cfg) {
        Ok(a) => println!(
            "sheet: area={:.4} area_2d={:.4} box={:.4} per_particle={:.5}",
            a.area,
            a.area_2d.unwrap_or(0.0),
            a.box_area_2d,
            a.area / sheet.natoms as f64
        ),
        Err(e) => eprintln!("sheet area failed: {e}"),
    }
}
