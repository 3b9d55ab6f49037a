//! Trajectory tables: one row per particle per frame.
//!
//! Columns `frame, x, y, z` are required; `box_x, box_y, box_z` are optional
//! and, when present, taken from the first row of each frame. Without them the
//! frame is shifted so its lowest coordinates sit at the origin and the box is
//! its bounding extent. CSV or Parquet by file extension.

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use tessellate::api::{select, Frame, IndexGroups};
use tessellate::Vec3;

const BOX_COLUMNS: [&str; 3] = ["box_x", "box_y", "box_z"];

/// Frames in ascending frame-number order.
#[derive(Clone, Debug)]
pub struct Trajectory {
    pub ids: Vec<i64>,
    pub frames: Vec<Frame>,
}

impl Trajectory {
    pub fn natoms(&self) -> Vec<usize> {
        self.frames.iter().map(|f| f.coords.len()).collect()
    }

    /// Keep only the atoms of one index group in every frame.
    pub fn select(mut self, atoms: &[usize]) -> Result<Self> {
        for (id, fr) in self.ids.iter().zip(self.frames.iter_mut()) {
            fr.coords = select(&fr.coords, atoms).with_context(|| format!("frame {id}"))?;
        }
        Ok(self)
    }
}

pub fn read_table(path: &Path) -> Result<DataFrame> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let lf = match ext {
        "parquet" | "pq" => LazyFrame::scan_parquet(path, ScanArgsParquet::default())?,
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(100))
            .finish()?,
        other => bail!("unsupported trajectory format '{other}' (expected .csv or .parquet)"),
    };
    lf.collect()
        .with_context(|| format!("reading {}", path.display()))
}

fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let s = df
        .column(name)
        .with_context(|| format!("missing column '{name}'"))?
        .cast(&DataType::Float64)?;
    s.f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| v.with_context(|| format!("null '{name}' at row {row}")))
        .collect()
}

fn i64_column(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let s = df
        .column(name)
        .with_context(|| format!("missing column '{name}'"))?
        .cast(&DataType::Int64)?;
    s.i64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| v.with_context(|| format!("null '{name}' at row {row}")))
        .collect()
}

/// Shift `coords` to start at the origin and return their extent.
fn fit_box(coords: &mut [Vec3<f64>]) -> Vec3<f64> {
    let mut lo = Vec3::repeat(f64::INFINITY);
    let mut hi = Vec3::repeat(f64::NEG_INFINITY);
    for p in coords.iter() {
        lo = lo.inf(p);
        hi = hi.sup(p);
    }
    for p in coords.iter_mut() {
        *p -= lo;
    }
    hi - lo
}

pub fn frames_from_table(df: &DataFrame) -> Result<Trajectory> {
    if df.height() == 0 {
        bail!("trajectory table has no rows");
    }
    let frame = i64_column(df, "frame")?;
    let x = f64_column(df, "x")?;
    let y = f64_column(df, "y")?;
    let z = f64_column(df, "z")?;

    let present = BOX_COLUMNS
        .iter()
        .filter(|c| df.column(c).is_ok())
        .count();
    let boxes = match present {
        0 => None,
        3 => Some([
            f64_column(df, BOX_COLUMNS[0])?,
            f64_column(df, BOX_COLUMNS[1])?,
            f64_column(df, BOX_COLUMNS[2])?,
        ]),
        _ => bail!("box columns must be all of box_x, box_y, box_z or none"),
    };
    if boxes.is_none() {
        tracing::info!("no box columns; shifting each frame to the origin of its bounding box");
    }

    let mut rows: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (row, &f) in frame.iter().enumerate() {
        rows.entry(f).or_default().push(row);
    }

    let mut ids = Vec::with_capacity(rows.len());
    let mut frames = Vec::with_capacity(rows.len());
    for (id, idx) in rows {
        let mut coords: Vec<Vec3<f64>> =
            idx.iter().map(|&r| Vec3::new(x[r], y[r], z[r])).collect();
        let box_dims = match &boxes {
            Some([bx, by, bz]) => Vec3::new(bx[idx[0]], by[idx[0]], bz[idx[0]]),
            None => fit_box(&mut coords),
        };
        ids.push(id);
        frames.push(Frame { coords, box_dims });
    }
    Ok(Trajectory { ids, frames })
}

/// Read a trajectory and, when an index file is given, reduce it to one group
/// (the named one, or the first in the file).
pub fn load(path: &Path, index: Option<&Path>, group: Option<&str>) -> Result<Trajectory> {
    let traj = frames_from_table(&read_table(path)?)
        .with_context(|| format!("parsing {}", path.display()))?;
    let Some(index) = index else {
        return Ok(traj);
    };
    let text = std::fs::read_to_string(index)
        .with_context(|| format!("reading {}", index.display()))?;
    let groups =
        IndexGroups::parse(&text).with_context(|| format!("parsing {}", index.display()))?;
    let (name, atoms) = match group {
        Some(name) => (name, groups.get(name)?),
        None => groups.first()?,
    };
    tracing::info!(group = name, natoms = atoms.len(), "selected index group");
    traj.select(atoms)
}
