use serde::{Deserialize, Serialize};

use super::emotion::EMOTIONS;
use super::range::LinePos;

/// One dialogue line of a chapter transcript.
///
/// Within a chapter file, rows are totally ordered by
/// (dialogue_index, line_index) ascending, and line_index restarts at 0
/// whenever dialogue_index changes. That ordering is assigned upstream and
/// never recomputed here, except for custom inserts (see `renumber_inserts`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRow {
    pub chapter_index: i64,
    pub chapter: String,
    pub dialogue_index: i64,
    pub line_index: i64,
    /// Missing for lines the scraper could not attribute.
    pub speaker: Option<String>,
    pub line: String,
}

impl TranscriptRow {
    /// Position of this row in the chapter ordering.
    pub fn pos(&self) -> LinePos {
        (self.dialogue_index, self.line_index)
    }

    /// The per-segment identifier used as join key with the model's response.
    ///
    /// Derived, not stored: two rows in one segment can never share it
    /// because (dialogue_index, line_index) pairs are unique per chapter.
    pub fn line_id(&self) -> String {
        format!("{}_{}", self.dialogue_index, self.line_index)
    }
}

/// A custom-insert row as authored in an insert file: no line_index yet.
///
/// Inserted content must renumber contiguously against whatever ordering the
/// file implies, regardless of any numbering the source may have carried.
#[derive(Debug, Clone, Deserialize)]
pub struct InsertRow {
    pub chapter_index: i64,
    pub chapter: String,
    pub dialogue_index: i64,
    pub speaker: Option<String>,
    pub line: String,
}

/// Assign line indices to insert rows: reset to 0 when dialogue_index changes
/// from the previous row, else increment.
pub fn renumber_inserts(rows: Vec<InsertRow>) -> Vec<TranscriptRow> {
    let mut out = Vec::with_capacity(rows.len());
    let mut last_dialogue: Option<i64> = None;
    let mut line_index = 0;

    for row in rows {
        if last_dialogue == Some(row.dialogue_index) {
            line_index += 1;
        } else {
            line_index = 0;
        }
        last_dialogue = Some(row.dialogue_index);

        out.push(TranscriptRow {
            chapter_index: row.chapter_index,
            chapter: row.chapter,
            dialogue_index: row.dialogue_index,
            line_index,
            speaker: row.speaker,
            line: row.line,
        });
    }

    out
}

/// A transcript row with the model's emotion scores attached.
///
/// Score columns are `None` for rows the model dropped from its response;
/// the row itself is always preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRow {
    pub chapter_index: i64,
    pub chapter: String,
    pub dialogue_index: i64,
    pub line_index: i64,
    pub speaker: Option<String>,
    pub line: String,
    pub anger: Option<f64>,
    pub sadness: Option<f64>,
    pub fear: Option<f64>,
    pub happiness: Option<f64>,
    pub ambitious: Option<f64>,
    pub surprise: Option<f64>,
    pub neutral: Option<f64>,
}

impl ScoredRow {
    /// Attach scores (in `EMOTIONS` order) to a row. `None` means the model
    /// did not score this row at all.
    pub fn new(row: TranscriptRow, scores: Option<[Option<f64>; EMOTIONS.len()]>) -> Self {
        let [anger, sadness, fear, happiness, ambitious, surprise, neutral] =
            scores.unwrap_or([None; EMOTIONS.len()]);
        Self {
            chapter_index: row.chapter_index,
            chapter: row.chapter,
            dialogue_index: row.dialogue_index,
            line_index: row.line_index,
            speaker: row.speaker,
            line: row.line,
            anger,
            sadness,
            fear,
            happiness,
            ambitious,
            surprise,
            neutral,
        }
    }

    pub fn pos(&self) -> LinePos {
        (self.dialogue_index, self.line_index)
    }

    /// Whether any emotion column carries a score.
    pub fn is_scored(&self) -> bool {
        [
            self.anger,
            self.sadness,
            self.fear,
            self.happiness,
            self.ambitious,
            self.surprise,
            self.neutral,
        ]
        .iter()
        .any(Option::is_some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(dialogue_index: i64, line: &str) -> InsertRow {
        InsertRow {
            chapter_index: 9,
            chapter: "9_Epilogue".to_string(),
            dialogue_index,
            speaker: Some("Verso".to_string()),
            line: line.to_string(),
        }
    }

    #[test]
    fn test_renumber_resets_on_dialogue_change() {
        let rows = renumber_inserts(vec![
            insert(0, "a"),
            insert(0, "b"),
            insert(1, "c"),
            insert(1, "d"),
            insert(1, "e"),
            insert(2, "f"),
        ]);

        let positions: Vec<_> = rows.iter().map(|r| r.pos()).collect();
        assert_eq!(
            positions,
            vec![(0, 0), (0, 1), (1, 0), (1, 1), (1, 2), (2, 0)]
        );
    }

    #[test]
    fn test_renumber_empty() {
        assert!(renumber_inserts(vec![]).is_empty());
    }

    #[test]
    fn test_line_id() {
        let row = TranscriptRow {
            chapter_index: 1,
            chapter: "1_Lumiere".to_string(),
            dialogue_index: 12,
            line_index: 3,
            speaker: Some("Maelle".to_string()),
            line: "For those who come after.".to_string(),
        };
        assert_eq!(row.line_id(), "12_3");
    }

    #[test]
    fn test_line_ids_unique_within_chapter_ordering() {
        // (dialogue_index, line_index) pairs are unique by construction;
        // the derived string key must be too.
        let rows: Vec<TranscriptRow> = [(0, 0), (0, 1), (1, 0), (1, 1), (12, 3)]
            .iter()
            .map(|&(d, l)| TranscriptRow {
                chapter_index: 0,
                chapter: "0_Prologue".to_string(),
                dialogue_index: d,
                line_index: l,
                speaker: None,
                line: String::new(),
            })
            .collect();

        let mut ids: Vec<String> = rows.iter().map(|r| r.line_id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), rows.len());
    }
}
