use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::io::transcript::{read_scored_rows, write_indexed_rows};
use crate::layout::{DataLayout, ensure_dir};
use crate::models::ScoredRow;

/// The most recently modified file directly under `dir`, if any.
fn latest_file(dir: &Path) -> Result<Option<PathBuf>> {
    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("Failed to list directory: {:?}", dir))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        if latest.as_ref().is_none_or(|(t, _)| modified > *t) {
            latest = Some((modified, entry.path()));
        }
    }
    Ok(latest.map(|(_, path)| path))
}

/// Build the consolidated dataset from the latest classification run of each
/// chapter.
///
/// Chapters without any scored file are skipped with a warning. The combined
/// rows are sorted by (chapter_index, dialogue_index, line_index) and written
/// with an explicit synthetic row_index column, stamped so previous
/// consolidations survive.
pub fn run_consolidate(layout: &DataLayout) -> Result<()> {
    let scored_root = layout.emotions_scored_root();
    let mut chapter_dirs: Vec<_> = std::fs::read_dir(&scored_root)
        .with_context(|| format!("Failed to list scored outputs: {:?}", scored_root))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    chapter_dirs.sort();

    info!("Beginning selection of latest classification file for each chapter");
    let mut rows: Vec<ScoredRow> = Vec::new();
    for chapter_dir in chapter_dirs {
        let chapter = chapter_dir
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        match latest_file(&chapter_dir)? {
            Some(path) => {
                info!(
                    "Chapter '{}': selected file '{}'",
                    chapter,
                    path.file_name().and_then(|s| s.to_str()).unwrap_or("?")
                );
                rows.extend(read_scored_rows(&path)?);
            }
            None => {
                warn!("Chapter '{}' does not have any classification file. Skipped.", chapter);
            }
        }
    }

    rows.sort_by_key(|r| (r.chapter_index, r.dialogue_index, r.line_index));

    let out_dir = layout.consolidated();
    ensure_dir(&out_dir)?;
    let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    let out_path = out_dir.join(format!("{stamp}.csv"));
    write_indexed_rows(&out_path, &rows)?;
    info!("Consolidated {} row(s) into {:?}", rows.len(), out_path);

    Ok(())
}
