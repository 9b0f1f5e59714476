use std::path::Path;

use anyhow::{Context, Result};
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::models::{InsertRow, ScoredRow, TranscriptRow, renumber_inserts};

/// Read a chapter transcript CSV: header row, all fields quoted, UTF-8.
pub fn read_rows(path: &Path) -> Result<Vec<TranscriptRow>> {
    read_csv(path)
}

/// Read an emotion-scored transcript CSV.
pub fn read_scored_rows(path: &Path) -> Result<Vec<ScoredRow>> {
    read_csv(path)
}

/// Read a custom-insert file and renumber its line indices.
///
/// Insert files carry no line_index column; the index is recomputed from the
/// row ordering (reset on dialogue change, else increment).
pub fn read_insert_rows(path: &Path) -> Result<Vec<TranscriptRow>> {
    let rows: Vec<InsertRow> = read_csv(path)?;
    Ok(renumber_inserts(rows))
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open transcript: {:?}", path))?;

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record.with_context(|| format!("Malformed transcript row in {:?}", path))?);
    }
    Ok(rows)
}

/// Write transcript rows with every field quoted, matching the scraper's
/// output convention. Overwrites any existing file.
pub fn write_rows(path: &Path, rows: &[TranscriptRow]) -> Result<()> {
    write_csv(path, rows)
}

/// Write emotion-scored rows. Unscored emotion columns serialize as empty
/// fields.
pub fn write_scored_rows(path: &Path, rows: &[ScoredRow]) -> Result<()> {
    write_csv(path, rows)
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_path(path)
        .with_context(|| format!("Failed to create transcript: {:?}", path))?;

    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write transcript row to {:?}", path))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush transcript: {:?}", path))?;
    Ok(())
}

/// Write the consolidated dataset with an explicit synthetic `row_index`
/// column prepended to the scored schema.
pub fn write_indexed_rows(path: &Path, rows: &[ScoredRow]) -> Result<()> {
    // serde(flatten) is unsupported by the csv serializer, so the records
    // are built by hand in the scored-row column order.
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_path(path)
        .with_context(|| format!("Failed to create consolidated file: {:?}", path))?;

    writer.write_record([
        "row_index",
        "chapter_index",
        "chapter",
        "dialogue_index",
        "line_index",
        "speaker",
        "line",
        "anger",
        "sadness",
        "fear",
        "happiness",
        "ambitious",
        "surprise",
        "neutral",
    ])?;

    let fmt = |v: Option<f64>| v.map(|f| f.to_string()).unwrap_or_default();
    for (row_index, row) in rows.iter().enumerate() {
        writer.write_record([
            row_index.to_string(),
            row.chapter_index.to_string(),
            row.chapter.clone(),
            row.dialogue_index.to_string(),
            row.line_index.to_string(),
            row.speaker.clone().unwrap_or_default(),
            row.line.clone(),
            fmt(row.anger),
            fmt(row.sadness),
            fmt(row.fear),
            fmt(row.happiness),
            fmt(row.ambitious),
            fmt(row.surprise),
            fmt(row.neutral),
        ])?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush consolidated file: {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(dialogue_index: i64, line_index: i64) -> TranscriptRow {
        TranscriptRow {
            chapter_index: 1,
            chapter: "1_Lumiere".to_string(),
            dialogue_index,
            line_index,
            speaker: Some("Gustave".to_string()),
            line: "Tomorrow comes, \"ready or not\".".to_string(),
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1_Lumiere.csv");

        let rows = vec![row(0, 0), row(0, 1), row(1, 0)];
        write_rows(&path, &rows).unwrap();
        let back = read_rows(&path).unwrap();

        assert_eq!(back, rows);
    }

    #[test]
    fn test_all_fields_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_rows(&path, &[row(0, 0)]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(
            header,
            "\"chapter_index\",\"chapter\",\"dialogue_index\",\"line_index\",\"speaker\",\"line\""
        );
    }

    #[test]
    fn test_missing_speaker_round_trips_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut r = row(2, 0);
        r.speaker = None;
        write_rows(&path, std::slice::from_ref(&r)).unwrap();

        let back = read_rows(&path).unwrap();
        assert_eq!(back[0].speaker, None);
    }

    #[test]
    fn test_insert_file_renumbered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("9_Epilogue.csv");
        std::fs::write(
            &path,
            "\"chapter_index\",\"chapter\",\"dialogue_index\",\"speaker\",\"line\"\n\
             \"9\",\"9_Epilogue\",\"0\",\"Verso\",\"One day.\"\n\
             \"9\",\"9_Epilogue\",\"0\",\"Maelle\",\"One day.\"\n\
             \"9\",\"9_Epilogue\",\"1\",\"Verso\",\"Enough.\"\n",
        )
        .unwrap();

        let rows = read_insert_rows(&path).unwrap();
        let positions: Vec<_> = rows.iter().map(|r| r.pos()).collect();
        assert_eq!(positions, vec![(0, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn test_scored_rows_null_scores_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scored.csv");

        let scored = vec![
            ScoredRow::new(row(0, 0), Some([Some(0.9), Some(0.1), None, None, None, None, None])),
            ScoredRow::new(row(0, 1), None),
        ];
        write_scored_rows(&path, &scored).unwrap();
        let back = read_scored_rows(&path).unwrap();

        assert_eq!(back, scored);
        assert!(back[0].is_scored());
        assert!(!back[1].is_scored());
    }

    #[test]
    fn test_indexed_write_prepends_row_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("final.csv");

        let scored = vec![ScoredRow::new(row(0, 0), None), ScoredRow::new(row(0, 1), None)];
        write_indexed_rows(&path, &scored).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert!(lines.next().unwrap().starts_with("\"row_index\""));
        assert!(lines.next().unwrap().starts_with("\"0\""));
        assert!(lines.next().unwrap().starts_with("\"1\""));
    }
}
