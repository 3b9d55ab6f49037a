mod output;
mod provenance;
mod trajectory;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tessellate::api::{
    tessellate_frames, triangulate_with, validate_delaunay, AreaCfg, DedupPolicy, GridCfg,
    TessellatedGrid, TriangulateCfg, WeightFn,
};
use tessellate::cfg::{DEFAULT_CELL_WIDTH, DEFAULT_DEDUP_EPS, DEFAULT_EDGE_SPACING};
use tessellate::Vec2;
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

use output::Summary;
use provenance::Payload;
use trajectory::Trajectory;

#[derive(Parser)]
#[command(name = "tessellate-area")]
#[command(about = "Surface area of particle layers by Delaunay tessellation", version)]
struct Cmd {
    /// Append log output to this file instead of stderr
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Args)]
struct Input {
    /// Trajectory table (.csv or .parquet): frame,x,y,z[,box_x,box_y,box_z]
    #[arg(short = 'f', long = "traj")]
    traj: PathBuf,

    /// GROMACS index file
    #[arg(short = 'n', long = "index")]
    index: Option<PathBuf>,

    /// Index group to use; the first group in the file by default
    #[arg(long, requires = "index")]
    group: Option<String>,
}

impl Input {
    fn load(&self) -> Result<Trajectory> {
        trajectory::load(&self.traj, self.index.as_deref(), self.group.as_deref())
    }

    fn payload(&self, params: serde_json::Value) -> Payload {
        let payload = Payload::new(params).with_input(&self.traj);
        match &self.index {
            Some(ndx) => payload.with_input(ndx),
            None => payload,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Duplicates {
    /// Merge bit-identical points
    Exact,
    /// Merge points closer than a tiny tolerance
    Merge,
    /// Fail on any repeated point
    Reject,
}

impl Duplicates {
    fn policy(self) -> DedupPolicy {
        match self {
            Self::Exact => DedupPolicy::Exact,
            Self::Merge => DedupPolicy::Tolerance(DEFAULT_DEDUP_EPS),
            Self::Reject => DedupPolicy::Reject,
        }
    }
}

#[derive(Args)]
struct AreaArgs {
    #[command(flatten)]
    input: Input,

    /// Per-frame table; .csv and .parquet are written as such, anything else as text
    #[arg(short, long, default_value = "area.dat")]
    out: PathBuf,

    /// Correct for periodic boundaries by padding the box edges
    #[arg(long)]
    corr: bool,

    /// Largest spacing between box-edge points with --corr
    #[arg(long, default_value_t = DEFAULT_EDGE_SPACING)]
    espace: f64,

    /// Also report the area of the xy projection and of the box
    #[arg(long = "2d")]
    two_d: bool,

    /// Worker threads (all cores by default)
    #[arg(long)]
    nthreads: Option<usize>,

    /// Verify the empty-circumcircle property of every frame first
    #[arg(long)]
    check: bool,

    /// Print a JSON summary to stdout instead of the averages
    #[arg(long)]
    json: bool,

    /// Handling of points with equal xy coordinates
    #[arg(long, value_enum, default_value_t = Duplicates::Exact)]
    duplicates: Duplicates,

    /// Points whose x differ by less than this are ordered by y
    #[arg(long, default_value_t = 0.0)]
    x_tie: f64,
}

#[derive(Args)]
struct GridArgs {
    #[command(flatten)]
    input: Input,

    /// Grid summary and heightmap; stdout when omitted
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Grid cell edge length
    #[arg(long, default_value_t = DEFAULT_CELL_WIDTH)]
    width: f64,

    /// Linear distance weights instead of squared
    #[arg(long)]
    lin: bool,
}

#[derive(Subcommand)]
enum Action {
    /// Delaunay-tessellated surface area of every frame
    Area(AreaArgs),
    /// Weighted-grid surface area over the whole trajectory
    Grid(GridArgs),
    /// Print the provenance block
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    init_logging(cmd.log.as_deref(), cmd.verbose)?;
    match cmd.action {
        Action::Area(args) => area(args),
        Action::Grid(args) => grid(args),
        Action::Report => report(),
    }
}

fn init_logging(log: Option<&Path>, verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level);
    match log {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

fn check_frames(traj: &Trajectory, cfg: &TriangulateCfg) -> Result<()> {
    for (id, fr) in traj.ids.iter().zip(&traj.frames) {
        let xy: Vec<Vec2<f64>> = fr.coords.iter().map(|p| Vec2::new(p.x, p.y)).collect();
        let tri = triangulate_with(&xy, cfg).with_context(|| format!("frame {id}"))?;
        validate_delaunay(&xy, &tri).with_context(|| format!("frame {id}: not Delaunay"))?;
    }
    tracing::info!(nframes = traj.frames.len(), "empty-circumcircle check passed");
    Ok(())
}

fn area(args: AreaArgs) -> Result<()> {
    let traj = args.input.load()?;
    tracing::info!(
        traj = %args.input.traj.display(),
        nframes = traj.frames.len(),
        corr = args.corr,
        two_d = args.two_d,
        "area"
    );
    let cfg = AreaCfg {
        periodic: args.corr,
        espace: args.espace,
        project_2d: args.two_d,
        triangulate: TriangulateCfg {
            x_tie_eps: args.x_tie,
            dedup: args.duplicates.policy(),
        },
    };
    if args.check {
        check_frames(&traj, &cfg.triangulate)?;
    }

    let res = tessellate_frames(&traj.frames, &cfg, args.nthreads)
        .context("tessellating trajectory")?;
    let summary = Summary::new(&traj.ids, &traj.natoms(), &res);
    summary.write(&args.out)?;
    let payload = args.input.payload(json!({
        "command": "area",
        "corr": args.corr,
        "espace": args.espace,
        "2d": args.two_d,
        "duplicates": format!("{:?}", args.duplicates),
        "x_tie": args.x_tie,
        "nframes": summary.nframes,
        "mean_area": summary.mean_area,
    }));
    provenance::write_sidecar(&args.out, payload)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("frames: {}", summary.nframes);
        println!("mean area: {:.6}", summary.mean_area);
        println!("mean area/particle: {:.6}", summary.mean_area_per_particle);
        if let Some(a2) = summary.mean_area_2d {
            println!("mean area 2d: {a2:.6}");
            println!("mean box 2d: {:.6}", summary.mean_box_2d);
        }
    }
    tracing::info!(out = %args.out.display(), mean_area = summary.mean_area, "done");
    Ok(())
}

fn grid(args: GridArgs) -> Result<()> {
    let traj = args.input.load()?;
    let cfg = GridCfg {
        cell_width: args.width,
        weight: if args.lin {
            WeightFn::Distance
        } else {
            WeightFn::DistanceSquared
        },
    };
    tracing::info!(nframes = traj.frames.len(), width = args.width, lin = args.lin, "grid");
    let frames: Vec<_> = traj.frames.into_iter().map(|f| f.coords).collect();
    let grid = TessellatedGrid::build(&frames, &cfg).context("building weighted grid")?;

    match &args.out {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            grid.write_summary(BufWriter::new(file))?;
            let payload = args.input.payload(json!({
                "command": "grid",
                "width": args.width,
                "lin": args.lin,
                "surface_area": grid.surface_area,
                "num_empty": grid.num_empty,
            }));
            provenance::write_sidecar(path, payload)?;
        }
        None => grid.write_summary(io::stdout().lock())?,
    }
    tracing::info!(
        surface_area = grid.surface_area,
        area_per_particle = grid.area_per_particle,
        "done"
    );
    Ok(())
}

fn report() -> Result<()> {
    let doc = provenance::block(&Payload::new(json!({})), &[]);
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
