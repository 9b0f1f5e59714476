use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::error::PipelineError;
use crate::io::WavBuffer;
use crate::io::transcript::{read_rows, write_rows};
use crate::layout::{DataLayout, clear_files, ensure_dir};
use crate::models::{RowRange, RuleSet, TranscriptRow};
use crate::pairing::resolve_pairs;
use crate::segment::segment_audio;

/// Partition rows into one segment per range, in range-declaration order.
///
/// Ranges authored contiguously and exhaustively reproduce the input exactly
/// when the segments are concatenated back in order.
pub fn split_rows(rows: &[TranscriptRow], ranges: &[RowRange]) -> Vec<Vec<TranscriptRow>> {
    ranges
        .iter()
        .map(|range| {
            rows.iter()
                .filter(|row| range.contains(row.pos()))
                .cloned()
                .collect()
        })
        .collect()
}

/// Verify that the transcript split ranges and the audio timestamps for one
/// stem will produce the same number of segments.
///
/// The two rule lists are authored independently; nothing here recomputes
/// alignment. A count mismatch means the curation is wrong for this chapter
/// and must fail before any segment (or model call) happens for the stem.
pub fn check_alignment(stem: &str, rules: &RuleSet) -> Result<usize, PipelineError> {
    let csv_segments = rules.csv_segment_count(stem);
    let audio_segments = rules.audio_segment_count(stem);
    if csv_segments != audio_segments {
        return Err(PipelineError::SegmentCountMismatch {
            stem: stem.to_string(),
            csv_segments,
            audio_segments,
        });
    }
    Ok(csv_segments)
}

/// Split one chapter's edited transcript and audio into aligned segments.
fn split_chapter(
    layout: &DataLayout,
    rules: &RuleSet,
    stem: &str,
    csv_path: &Path,
    audio_path: &Path,
) -> Result<()> {
    check_alignment(stem, rules)?;

    // Transcript side
    let rows = read_rows(csv_path)?;
    match rules.splits_for(stem) {
        Some(ranges) => {
            info!("Splitting '{}' into {} transcript segment(s)", stem, ranges.len());
            for (i, segment) in split_rows(&rows, ranges).iter().enumerate() {
                let out = layout.csv_splits().join(format!("{stem}_{i}.csv"));
                write_rows(&out, segment)?;
            }
        }
        None => {
            write_rows(&layout.csv_splits().join(format!("{stem}.csv")), &rows)?;
            info!("Transcript '{}' copied as-is", stem);
        }
    }

    // Audio side
    let audio = WavBuffer::load(audio_path)?;
    match rules.timestamps_for(stem) {
        Some(timestamps) => {
            let segments = segment_audio(&audio, timestamps)?;
            for (i, segment) in segments.iter().enumerate() {
                let out = layout.audio_splits().join(format!("{stem}_{i}.wav"));
                segment.save(&out)?;
                info!(
                    "Wrote audio segment {}_{}: {} frame(s)",
                    stem,
                    i,
                    segment.frames()
                );
            }
        }
        None => {
            audio.save(&layout.audio_splits().join(format!("{stem}.wav")))?;
            info!("Audio '{}' copied as-is", stem);
        }
    }

    Ok(())
}

/// Split every paired chapter under the edits directories.
///
/// Stale segments from previous runs are removed first so the split
/// directories always reflect exactly the current rule file. A failing
/// chapter is reported and skipped; the remaining chapters still run.
pub fn run_split(layout: &DataLayout, rules: &RuleSet) -> Result<()> {
    ensure_dir(&layout.csv_splits())?;
    ensure_dir(&layout.audio_splits())?;
    info!("Deleting existing transcript and audio segments");
    clear_files(&layout.csv_splits())?;
    clear_files(&layout.audio_splits())?;

    let pairs = resolve_pairs(&layout.csv_edits(), &layout.audio_edits())
        .context("Failed to resolve transcript/audio pairs")?;

    let mut failed = 0usize;
    for pair in &pairs {
        // Edited chapters are whole files, one part per side.
        let (csv_path, audio_path) = match (pair.csv.parts.first(), pair.audio.parts.first()) {
            (Some(c), Some(a)) => (c, a),
            _ => continue,
        };

        if let Err(e) = split_chapter(layout, rules, &pair.stem, csv_path, audio_path) {
            error!("Chapter '{}' failed, skipping: {:#}", pair.stem, e);
            failed += 1;
        }
    }

    info!(
        "Split complete: {} chapter(s), {} failed",
        pairs.len(),
        failed
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec};

    fn row(dialogue_index: i64, line_index: i64) -> TranscriptRow {
        TranscriptRow {
            chapter_index: 1,
            chapter: "1_Lumiere".to_string(),
            dialogue_index,
            line_index,
            speaker: Some("Gustave".to_string()),
            line: "line".to_string(),
        }
    }

    #[test]
    fn test_split_round_trip() {
        // Contiguous, exhaustive ranges must reproduce the input exactly.
        let rows = vec![row(0, 0), row(0, 1), row(1, 0), row(2, 0), row(2, 1)];
        let ranges = [
            RowRange::closed((0, 0), (0, 1)),
            RowRange::closed((1, 0), (1, 0)),
            RowRange::open_ended((2, 0)),
        ];

        let segments = split_rows(&rows, &ranges);
        assert_eq!(segments.len(), 3);

        let rejoined: Vec<_> = segments.into_iter().flatten().collect();
        assert_eq!(rejoined, rows);
    }

    #[test]
    fn test_check_alignment() {
        let rules: RuleSet = serde_json::from_str(
            r#"{
                "splits": [{"source": "ok", "ranges": [
                    {"dial_s": 0, "line_s": 0, "dial_e": 1, "line_e": 0},
                    {"dial_s": 2, "line_s": 0, "dial_e": -1, "line_e": -1}
                ]},
                {"source": "bad", "ranges": [
                    {"dial_s": 0, "line_s": 0, "dial_e": -1, "line_e": -1}
                ]}],
                "timestamps": [
                    {"source": "ok", "timestamps": ["01:00"]},
                    {"source": "bad", "timestamps": ["01:00"]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(check_alignment("ok", &rules).unwrap(), 2);
        assert_eq!(check_alignment("unconfigured", &rules).unwrap(), 1);
        assert!(matches!(
            check_alignment("bad", &rules),
            Err(PipelineError::SegmentCountMismatch {
                csv_segments: 1,
                audio_segments: 2,
                ..
            })
        ));
    }

    fn write_wav(path: &Path, frames: usize, sample_rate: u32) {
        let buffer = WavBuffer {
            spec: WavSpec {
                channels: 1,
                sample_rate,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
            samples: vec![0i16; frames],
        };
        buffer.save(path).unwrap();
    }

    #[test]
    fn test_run_split_writes_aligned_segments() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        std::fs::create_dir_all(layout.csv_edits()).unwrap();
        std::fs::create_dir_all(layout.audio_edits()).unwrap();

        write_rows(
            &layout.csv_edits().join("1_Lumiere.csv"),
            &[row(0, 0), row(0, 1), row(5, 0)],
        )
        .unwrap();
        // 120 seconds at 100 Hz
        write_wav(&layout.audio_edits().join("1_Lumiere.wav"), 12_000, 100);

        let rules: RuleSet = serde_json::from_str(
            r#"{
                "splits": [{"source": "1_Lumiere", "ranges": [
                    {"dial_s": 0, "line_s": 0, "dial_e": 0, "line_e": 1},
                    {"dial_s": 1, "line_s": 0, "dial_e": -1, "line_e": -1}
                ]}],
                "timestamps": [{"source": "1_Lumiere", "timestamps": ["01:00"]}]
            }"#,
        )
        .unwrap();

        run_split(&layout, &rules).unwrap();

        let seg0 = read_rows(&layout.csv_splits().join("1_Lumiere_0.csv")).unwrap();
        let seg1 = read_rows(&layout.csv_splits().join("1_Lumiere_1.csv")).unwrap();
        assert_eq!(seg0.len(), 2);
        assert_eq!(seg1.len(), 1);

        let wav0 = WavBuffer::load(&layout.audio_splits().join("1_Lumiere_0.wav")).unwrap();
        let wav1 = WavBuffer::load(&layout.audio_splits().join("1_Lumiere_1.wav")).unwrap();
        assert_eq!(wav0.frames(), 6_000);
        assert_eq!(wav1.frames(), 6_000);
    }

    #[test]
    fn test_run_split_skips_misaligned_chapter_but_continues() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        std::fs::create_dir_all(layout.csv_edits()).unwrap();
        std::fs::create_dir_all(layout.audio_edits()).unwrap();

        write_rows(&layout.csv_edits().join("1_Bad.csv"), &[row(0, 0)]).unwrap();
        write_wav(&layout.audio_edits().join("1_Bad.wav"), 1_000, 100);
        write_rows(&layout.csv_edits().join("2_Good.csv"), &[row(0, 0)]).unwrap();
        write_wav(&layout.audio_edits().join("2_Good.wav"), 1_000, 100);

        // 1_Bad: 1 transcript segment vs 2 audio segments
        let rules: RuleSet = serde_json::from_str(
            r#"{"timestamps": [{"source": "1_Bad", "timestamps": ["00:05"]}]}"#,
        )
        .unwrap();

        run_split(&layout, &rules).unwrap();

        // Nothing written for the misaligned chapter, not even one side
        assert!(!layout.csv_splits().join("1_Bad.csv").exists());
        assert!(!layout.audio_splits().join("1_Bad_0.wav").exists());
        // The healthy chapter went through
        assert!(layout.csv_splits().join("2_Good.csv").exists());
        assert!(layout.audio_splits().join("2_Good.wav").exists());
    }

    #[test]
    fn test_run_split_clears_stale_segments() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        std::fs::create_dir_all(layout.csv_edits()).unwrap();
        std::fs::create_dir_all(layout.audio_edits()).unwrap();
        std::fs::create_dir_all(layout.csv_splits()).unwrap();
        std::fs::write(layout.csv_splits().join("ghost_0.csv"), "stale").unwrap();

        run_split(&layout, &RuleSet::default()).unwrap();

        assert!(!layout.csv_splits().join("ghost_0.csv").exists());
    }
}
