//! Line-oriented corpus reading.

use anyhow::{Context, Result};
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read up to `max_lines` non-empty lines from `path`, trimmed.
pub fn read_lines(path: &Path, max_lines: usize) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("unable to open {}", path.display()))?;

    let mut lines = Vec::new();
    let mut skipped = 0usize;
    for line in BufReader::new(file).lines() {
        if lines.len() >= max_lines {
            info!("stopped reading {} at {max_lines} lines", path.display());
            break;
        }
        let line = line.with_context(|| format!("failed to read {}", path.display()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            skipped += 1;
            continue;
        }
        lines.push(trimmed.to_string());
    }

    debug!("skipped {skipped} blank lines in {}", path.display());
    Ok(lines)
}
