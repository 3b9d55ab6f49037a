//! Source lines stay within the 100-column rustfmt width.

use std::fs;
use std::path::{Path, PathBuf};

const MAX_WIDTH: usize = 100;

fn rust_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            rust_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            out.push(path);
        }
    }
}

#[test]
fn no_line_exceeds_the_format_width() {
    let crate_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let roots = ["src", "tests", "benches", "examples", "../cli/src"];
    let mut files = Vec::new();
    for root in roots {
        rust_files(&crate_dir.join(root), &mut files);
    }
    assert!(files.len() > 10, "found only {} source files", files.len());

    let mut long = Vec::new();
    for file in &files {
        let text = fs::read_to_string(file).unwrap();
        for (i, line) in text.lines().enumerate() {
            if line.chars().count() > MAX_WIDTH {
                long.push(format!("{}:{}", file.display(), i + 1));
            }
        }
    }
    assert!(long.is_empty(), "lines over {MAX_WIDTH} columns:\n{}", long.join("\n"));
}
