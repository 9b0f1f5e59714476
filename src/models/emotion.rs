use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Negative emotions the model is asked to score.
pub const NEGATIVE_EMOTIONS: [&str; 3] = ["anger", "sadness", "fear"];

/// Positive emotions the model is asked to score.
pub const POSITIVE_EMOTIONS: [&str; 3] = ["happiness", "ambitious", "surprise"];

/// All emotion columns in output order: negatives, positives, then neutral.
pub const EMOTIONS: [&str; 7] = [
    "anger",
    "sadness",
    "fear",
    "happiness",
    "ambitious",
    "surprise",
    "neutral",
];

/// Short form used in output filenames, e.g. "ang-sad-fea-hap-amb-sur".
pub fn emotions_short() -> String {
    NEGATIVE_EMOTIONS
        .iter()
        .chain(POSITIVE_EMOTIONS.iter())
        .map(|e| &e[..3])
        .collect::<Vec<_>>()
        .join("-")
}

/// The model's per-line scores for one segment, keyed by the derived
/// `"<dialogue_index>_<line_index>"` line id.
///
/// The value-level contract (scores in [0,1] summing to 1, sub-0.1 scores
/// folded into the dominant emotion) is instructed to the model, not
/// re-validated here. Keys may be missing for lines the model dropped; the
/// merge step tolerates that.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationResponse(pub HashMap<String, HashMap<String, f64>>);

impl AnnotationResponse {
    /// Look up the scores for one line id, projected onto the fixed emotion
    /// columns. Emotions the model omitted come back as `None`.
    pub fn scores_for(&self, line_id: &str) -> Option<[Option<f64>; EMOTIONS.len()]> {
        let scores = self.0.get(line_id)?;
        let mut out = [None; EMOTIONS.len()];
        for (i, emotion) in EMOTIONS.iter().enumerate() {
            out[i] = scores.get(*emotion).copied();
        }
        Some(out)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
