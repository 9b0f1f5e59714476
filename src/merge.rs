use tracing::warn;

use crate::models::{AnnotationResponse, ScoredRow, TranscriptRow};

/// Left-join a model response onto a segment's rows.
///
/// Every input row comes back exactly once, in input order. Rows whose
/// derived line id has no key in the response keep null emotion columns —
/// a model that dropped a line costs a per-row gap, never data loss. The
/// id itself is a transient join key and does not appear in the output.
pub fn merge_response(rows: Vec<TranscriptRow>, response: &AnnotationResponse) -> Vec<ScoredRow> {
    rows.into_iter()
        .map(|row| {
            let line_id = row.line_id();
            let scores = response.scores_for(&line_id);
            if scores.is_none() {
                warn!(
                    "No annotation for line {} of '{}', keeping row unscored",
                    line_id, row.chapter
                );
            }
            ScoredRow::new(row, scores)
        })
        .collect()
}

/// Concatenate the scored segments of one chapter and restore global chapter
/// order. Segment processing order need not coincide with row order after the
/// split/rejoin round trip, so the final write re-sorts by
/// (dialogue_index, line_index).
pub fn concat_chapter_segments(segments: Vec<Vec<ScoredRow>>) -> Vec<ScoredRow> {
    let mut rows: Vec<ScoredRow> = segments.into_iter().flatten().collect();
    rows.sort_by_key(ScoredRow::pos);
    rows
}
