use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::range::RowRange;

/// Deletion or split ranges for one chapter stem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeRule {
    /// Chapter stem this rule applies to.
    pub source: String,
    /// Ranges in declaration order.
    pub ranges: Vec<RowRange>,
}

/// Audio cut timestamps for one chapter stem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampRule {
    pub source: String,
    /// "MM:SS" or "HH:MM:SS", in increasing order as authored.
    pub timestamps: Vec<String>,
}

/// The single JSON rule document consumed by the editor and the splitter.
///
/// Deletion ranges need not be disjoint or exhaustive. Split ranges and
/// timestamps for the same stem are authored independently but must agree on
/// segment count; the split stage enforces that.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    /// Row ranges to remove per chapter, applied as a union of removals.
    #[serde(default)]
    pub deletes: Vec<RangeRule>,
    /// Stems of externally authored insert files to bring into the edit set.
    #[serde(default)]
    pub inserts: Vec<String>,
    /// Row ranges partitioning a chapter's transcript into segments.
    #[serde(default)]
    pub splits: Vec<RangeRule>,
    /// Cut timestamps partitioning a chapter's audio into segments.
    #[serde(default)]
    pub timestamps: Vec<TimestampRule>,
}

impl RuleSet {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rule file: {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Malformed rule file: {:?}", path))
    }

    /// All deletion ranges configured for a stem, across every matching rule.
    pub fn deletes_for(&self, stem: &str) -> Vec<RowRange> {
        self.deletes
            .iter()
            .filter(|r| r.source == stem)
            .flat_map(|r| r.ranges.iter().copied())
            .collect()
    }

    /// Split ranges for a stem, if any are configured.
    pub fn splits_for(&self, stem: &str) -> Option<&[RowRange]> {
        self.splits
            .iter()
            .find(|r| r.source == stem)
            .map(|r| r.ranges.as_slice())
    }

    /// Audio cut timestamps for a stem, if any are configured.
    pub fn timestamps_for(&self, stem: &str) -> Option<&[String]> {
        self.timestamps
            .iter()
            .find(|r| r.source == stem)
            .map(|r| r.timestamps.as_slice())
    }

    /// Number of transcript segments the split stage will produce for a stem.
    pub fn csv_segment_count(&self, stem: &str) -> usize {
        self.splits_for(stem).map_or(1, <[RowRange]>::len)
    }

    /// Number of audio segments the split stage will produce for a stem.
    pub fn audio_segment_count(&self, stem: &str) -> usize {
        self.timestamps_for(stem).map_or(1, |ts| ts.len() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::range::RowRange;

    const RULES_JSON: &str = r#"{
        "deletes": [
            {"source": "1_Lumiere", "ranges": [
                {"dial_s": 0, "line_s": 1, "dial_e": 0, "line_e": 1},
                {"dial_s": 7, "line_s": 0, "dial_e": -1, "line_e": -1}
            ]}
        ],
        "inserts": ["9_Epilogue"],
        "splits": [
            {"source": "1_Lumiere", "ranges": [
                {"dial_s": 0, "line_s": 0, "dial_e": 3, "line_e": 2},
                {"dial_s": 4, "line_s": 0, "dial_e": -1, "line_e": -1}
            ]}
        ],
        "timestamps": [
            {"source": "1_Lumiere", "timestamps": ["12:30"]}
        ]
    }"#;

    #[test]
    fn test_parse_rule_document() {
        let rules: RuleSet = serde_json::from_str(RULES_JSON).unwrap();

        let deletes = rules.deletes_for("1_Lumiere");
        assert_eq!(deletes.len(), 2);
        assert_eq!(deletes[0], RowRange::closed((0, 1), (0, 1)));
        assert_eq!(deletes[1], RowRange::open_ended((7, 0)));

        assert_eq!(rules.inserts, vec!["9_Epilogue"]);
        assert_eq!(rules.splits_for("1_Lumiere").unwrap().len(), 2);
        assert!(rules.splits_for("2_Gommage").is_none());
    }

    #[test]
    fn test_segment_counts() {
        let rules: RuleSet = serde_json::from_str(RULES_JSON).unwrap();

        // 2 split ranges, 1 timestamp + 1 = 2 audio segments: aligned.
        assert_eq!(rules.csv_segment_count("1_Lumiere"), 2);
        assert_eq!(rules.audio_segment_count("1_Lumiere"), 2);

        // Unconfigured stems pass through as one whole segment.
        assert_eq!(rules.csv_segment_count("2_Gommage"), 1);
        assert_eq!(rules.audio_segment_count("2_Gommage"), 1);
    }

    #[test]
    fn test_missing_sections_default_empty() {
        let rules: RuleSet = serde_json::from_str(r#"{"deletes": []}"#).unwrap();
        assert!(rules.inserts.is_empty());
        assert!(rules.splits.is_empty());
        assert!(rules.timestamps.is_empty());
    }
}
