use anyhow::{Context, Result};
use tracing::info;

use crate::io::transcript::{read_insert_rows, read_rows, write_rows};
use crate::layout::{DataLayout, ensure_dir};
use crate::models::{RowRange, RuleSet, TranscriptRow};

/// Prefix applied to dialogue rendered in an in-fiction constructed language.
pub const GIBBERISH_PREFIX: &str = "(gibberish) ";

/// Configuration for the transcript editor.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Keep rows spoken by the narrator instead of dropping them.
    pub keep_narrator: bool,
    /// Skip gibberish prefixing.
    pub keep_gibberish: bool,
    /// Speakers whose lines are always gibberish, matched exactly.
    pub gibberish_speakers: Vec<String>,
    /// Speaker-class tokens matched as case-insensitive substrings.
    pub gibberish_classes: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            keep_narrator: false,
            keep_gibberish: false,
            gibberish_speakers: [
                "The Curator",
                "Noco",
                "Young boy",
                "Lady of Sap",
                "Golgra",
                "Jar",
                "???",
                "Karatom",
                "Tropa",
                "Peron",
                "Olivierso",
                "Jujubree",
                "Berrami",
                "Eesda",
                "Alexcyclo",
                "Victorifo",
                "Limonsol",
            ]
            .map(String::from)
            .to_vec(),
            gibberish_classes: ["fading", "gestral", "grandis", "faceless"]
                .map(String::from)
                .to_vec(),
        }
    }
}

/// Remove every row falling inside any of the configured ranges.
///
/// Ranges are applied as a union of removals, so rule order never affects
/// the result.
pub fn apply_deletes(rows: Vec<TranscriptRow>, ranges: &[RowRange]) -> Vec<TranscriptRow> {
    rows.into_iter()
        .filter(|row| !ranges.iter().any(|range| range.contains(row.pos())))
        .collect()
}

/// Drop rows spoken by the narrator (exact, case-sensitive match).
pub fn remove_narrator(rows: Vec<TranscriptRow>) -> Vec<TranscriptRow> {
    rows.into_iter()
        .filter(|row| row.speaker.as_deref() != Some("narrator"))
        .collect()
}

/// Prepend the gibberish prefix to lines flagged by speaker identity or
/// speaker class. Lines already carrying the prefix are left alone, so the
/// stage is idempotent.
pub fn prefix_gibberish(rows: Vec<TranscriptRow>, config: &EditorConfig) -> Vec<TranscriptRow> {
    rows.into_iter()
        .map(|mut row| {
            if is_gibberish_speaker(row.speaker.as_deref(), config)
                && !row.line.to_lowercase().contains(GIBBERISH_PREFIX)
            {
                row.line = format!("{GIBBERISH_PREFIX}{}", row.line);
            }
            row
        })
        .collect()
}

fn is_gibberish_speaker(speaker: Option<&str>, config: &EditorConfig) -> bool {
    let Some(speaker) = speaker else {
        return false;
    };
    if config.gibberish_speakers.iter().any(|s| s == speaker) {
        return true;
    }
    let lowered = speaker.to_lowercase();
    config
        .gibberish_classes
        .iter()
        .any(|class| lowered.contains(&class.to_lowercase()))
}

/// Run the full edit pipeline for one chapter's rows, in fixed order:
/// deletes, narrator removal, gibberish prefixing. Each stage produces a
/// complete new row set.
pub fn edit_rows(
    rows: Vec<TranscriptRow>,
    deletes: &[RowRange],
    config: &EditorConfig,
) -> Vec<TranscriptRow> {
    let mut rows = apply_deletes(rows, deletes);
    if !config.keep_narrator {
        rows = remove_narrator(rows);
    }
    if !config.keep_gibberish {
        rows = prefix_gibberish(rows, config);
    }
    rows
}

/// Edit every raw chapter transcript and bring in the custom inserts.
///
/// Raw files are processed in name order; each edited chapter replaces any
/// previous edit of the same stem. Insert files get freshly renumbered line
/// indices and land in the edits directory as chapters of their own.
pub fn run_edit(layout: &DataLayout, rules: &RuleSet, config: &EditorConfig) -> Result<()> {
    ensure_dir(&layout.csv_edits())?;

    let mut raw_files: Vec<_> = std::fs::read_dir(layout.csv_raw())
        .with_context(|| format!("Failed to list raw transcripts: {:?}", layout.csv_raw()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    raw_files.sort();

    for path in raw_files {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()).map(String::from) else {
            continue;
        };

        let rows = read_rows(&path)?;
        let deletes = rules.deletes_for(&stem);
        if !deletes.is_empty() {
            info!("Deleting {} range(s) from '{}'", deletes.len(), stem);
        }

        let edited = edit_rows(rows, &deletes, config);
        let out_path = layout.csv_edits().join(format!("{stem}.csv"));
        write_rows(&out_path, &edited)?;
        info!("Edited '{}': {} row(s)", stem, edited.len());
    }

    for stem in &rules.inserts {
        let in_path = layout.csv_inserts().join(format!("{stem}.csv"));
        let rows = read_insert_rows(&in_path)
            .with_context(|| format!("Failed to read insert file for '{stem}'"))?;
        let out_path = layout.csv_edits().join(format!("{stem}.csv"));
        write_rows(&out_path, &rows)?;
        info!("Inserted '{}': {} row(s)", stem, rows.len());
    }

    Ok(())
}
