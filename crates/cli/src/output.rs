//! Per-frame area tables.
//!
//! `.csv` and `.parquet` outputs go through polars; anything else gets the
//! plain whitespace table `FRAME AREA AREA/PARTICLE [AREA2D BOX2D]` followed
//! by `#`-prefixed averages.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tessellate::api::TriArea;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameRow {
    pub frame: i64,
    pub area: f64,
    pub area_per_particle: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_2d: Option<f64>,
    pub box_2d: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub nframes: usize,
    pub natoms: usize,
    pub mean_area: f64,
    pub mean_area_per_particle: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_area_2d: Option<f64>,
    pub mean_box_2d: f64,
    pub frames: Vec<FrameRow>,
}

impl Summary {
    /// `ids` and `natoms` are per frame, parallel to the areas in `res`.
    pub fn new(ids: &[i64], natoms: &[usize], res: &TriArea) -> Self {
        let frames = ids
            .iter()
            .zip(natoms)
            .enumerate()
            .map(|(i, (&frame, &n))| FrameRow {
                frame,
                area: res.area[i],
                area_per_particle: if n == 0 { 0.0 } else { res.area[i] / n as f64 },
                area_2d: res.area_2d.as_ref().map(|a| a[i]),
                box_2d: res.area_2d_box[i],
            })
            .collect();
        Self {
            nframes: res.nframes,
            natoms: res.natoms,
            mean_area: res.mean_area(),
            mean_area_per_particle: res.mean_area_per_particle(),
            mean_area_2d: res.mean_area_2d(),
            mean_box_2d: res.mean_box_area(),
            frames,
        }
    }

    fn has_2d(&self) -> bool {
        self.mean_area_2d.is_some()
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let frame: Vec<i64> = self.frames.iter().map(|r| r.frame).collect();
        let area: Vec<f64> = self.frames.iter().map(|r| r.area).collect();
        let per: Vec<f64> = self.frames.iter().map(|r| r.area_per_particle).collect();
        let box_2d: Vec<f64> = self.frames.iter().map(|r| r.box_2d).collect();
        if self.has_2d() {
            let area_2d: Vec<Option<f64>> = self.frames.iter().map(|r| r.area_2d).collect();
            df!(
                "frame" => frame,
                "area" => area,
                "area_per_particle" => per,
                "area_2d" => area_2d,
                "box_2d" => box_2d
            )
        } else {
            df!(
                "frame" => frame,
                "area" => area,
                "area_per_particle" => per,
                "box_2d" => box_2d
            )
        }
    }

    pub fn write_text<W: Write>(&self, mut out: W) -> io::Result<()> {
        if self.has_2d() {
            writeln!(out, "FRAME AREA AREA/PARTICLE AREA2D BOX2D")?;
        } else {
            writeln!(out, "FRAME AREA AREA/PARTICLE")?;
        }
        for r in &self.frames {
            write!(out, "{} {:.6} {:.6}", r.frame, r.area, r.area_per_particle)?;
            if let Some(a2) = r.area_2d {
                write!(out, " {a2:.6} {:.6}", r.box_2d)?;
            }
            writeln!(out)?;
        }
        writeln!(out, "# frames {}", self.nframes)?;
        writeln!(out, "# mean area {:.6}", self.mean_area)?;
        writeln!(out, "# mean area/particle {:.6}", self.mean_area_per_particle)?;
        if let Some(a2) = self.mean_area_2d {
            writeln!(out, "# mean area2d {a2:.6}")?;
            writeln!(out, "# mean box2d {:.6}", self.mean_box_2d)?;
        }
        out.flush()
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating output dir {}", parent.display()))?;
            }
        }
        let file =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => {
                let mut df = self.to_dataframe()?;
                CsvWriter::new(BufWriter::new(file))
                    .include_header(true)
                    .finish(&mut df)?;
            }
            Some("parquet") => {
                let mut df = self.to_dataframe()?;
                ParquetWriter::new(file).finish(&mut df)?;
            }
            _ => self.write_text(BufWriter::new(file))?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn result(with_2d: bool) -> TriArea {
        TriArea {
            area: vec![10.0, 14.0],
            area_2d: with_2d.then(|| vec![8.0, 9.0]),
            area_2d_box: vec![9.0, 9.0],
            natoms: 4,
            nframes: 2,
        }
    }

    #[test]
    fn text_table_without_projection() {
        let s = Summary::new(&[0, 5], &[4, 4], &result(false));
        let mut buf = Vec::new();
        s.write_text(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "FRAME AREA AREA/PARTICLE");
        assert_eq!(lines[1], "0 10.000000 2.500000");
        assert_eq!(lines[2], "5 14.000000 3.500000");
        assert_eq!(lines[4], "# mean area 12.000000");
        assert_eq!(lines[5], "# mean area/particle 3.000000");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn text_table_with_projection() {
        let s = Summary::new(&[0, 1], &[4, 4], &result(true));
        let mut buf = Vec::new();
        s.write_text(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("FRAME AREA AREA/PARTICLE AREA2D BOX2D\n"));
        assert!(text.contains("\n1 14.000000 3.500000 9.000000 9.000000\n"));
        assert!(text.contains("# mean area2d 8.500000"));
    }

    #[test]
    fn csv_output_goes_through_polars() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/area.csv");
        Summary::new(&[0, 1], &[4, 4], &result(true))
            .write(&path)
            .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("frame,area,area_per_particle,area_2d,box_2d"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn json_omits_missing_projection() {
        let s = Summary::new(&[0, 1], &[4, 4], &result(false));
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["nframes"], 2);
        assert!(v.get("mean_area_2d").is_none());
        assert!(v["frames"][0].get("area_2d").is_none());
    }
}
