use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{error, info};

use crate::error::PipelineError;
use crate::layout::{DataLayout, ensure_dir};
use crate::llm::{OpenAiClient, render_dialogue, system_prompt};
use crate::merge::{concat_chapter_segments, merge_response};
use crate::models::{ScoredRow, emotions_short};
use crate::pairing::{Pair, resolve_pairs};

/// A manual chapter selection: a chapter stem, optionally narrowed to
/// specific segment indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub stem: String,
    pub segments: Option<Vec<usize>>,
}

impl Selection {
    /// Parse `"<stem>"` or `"<stem>:<i>,<j>,..."`.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.split_once(':') {
            None => Ok(Self {
                stem: raw.to_string(),
                segments: None,
            }),
            Some((stem, indices)) => {
                let segments = indices
                    .split(',')
                    .map(|i| i.trim().parse::<usize>())
                    .collect::<Result<Vec<_>, _>>()
                    .with_context(|| format!("Invalid segment indices in selection '{raw}'"))?;
                Ok(Self {
                    stem: stem.to_string(),
                    segments: Some(segments),
                })
            }
        }
    }
}

/// Narrow the discovered pairs to a manual selection. A selection naming a
/// stem that was never paired is a configuration error, caught before any
/// model call.
pub fn select_pairs(pairs: Vec<Pair>, selections: &[Selection]) -> Result<Vec<Pair>, PipelineError> {
    if selections.is_empty() {
        return Ok(pairs);
    }

    let mut selected = Vec::new();
    for selection in selections {
        let Some(mut pair) = pairs.iter().find(|p| p.stem == selection.stem).cloned() else {
            return Err(PipelineError::UnknownChapter(selection.stem.clone()));
        };
        if let Some(indices) = &selection.segments {
            pair.keep_segments(indices);
        }
        selected.push(pair);
    }
    Ok(selected)
}

/// Classify every segment of one chapter and return the scored rows plus the
/// raw provider payloads. Fails on the first bad segment; nothing is written
/// by this function.
async fn classify_chapter(client: &OpenAiClient, pair: &Pair) -> Result<(Vec<ScoredRow>, Vec<Value>)> {
    if pair.csv.parts.len() != pair.audio.parts.len() {
        return Err(PipelineError::SegmentCountMismatch {
            stem: pair.stem.clone(),
            csv_segments: pair.csv.parts.len(),
            audio_segments: pair.audio.parts.len(),
        }
        .into());
    }

    let system = system_prompt();
    let mut segments = Vec::new();
    let mut raw_responses = Vec::new();

    for (i, csv_path, audio_path) in pair.segments() {
        info!("Opening transcript and audio for segment #{i}");
        let rows = crate::io::transcript::read_rows(csv_path)?;
        let audio = std::fs::read(audio_path)
            .with_context(|| format!("Failed to read audio segment: {:?}", audio_path))?;

        info!("Prompting model for segment #{i}");
        let dialogue = render_dialogue(&rows);
        let annotation = client.classify_segment(&system, &dialogue, &audio).await?;

        segments.push(merge_response(rows, &annotation.response));
        raw_responses.push(annotation.raw);
    }

    Ok((concat_chapter_segments(segments), raw_responses))
}

/// Write one classification run's outputs for a chapter: the scored CSV and
/// the raw-response JSON, both stamped with the run time so earlier runs are
/// never overwritten.
pub fn write_run_outputs(
    layout: &DataLayout,
    chapter: &str,
    rows: &[ScoredRow],
    raw_responses: &[Value],
) -> Result<()> {
    let stamp = chrono::Local::now().format("%d-%m-%YT%H-%M");
    let fname = format!("{stamp}_{}", emotions_short());

    let responses_dir = layout.api_responses(chapter);
    ensure_dir(&responses_dir)?;
    let json_path = responses_dir.join(format!("{fname}.json"));
    let file = std::fs::File::create(&json_path)
        .with_context(|| format!("Failed to create response file: {:?}", json_path))?;
    serde_json::to_writer_pretty(file, raw_responses)
        .with_context(|| format!("Failed to write response file: {:?}", json_path))?;
    info!("Written API responses '{fname}.json'");

    let scored_dir = layout.emotions_scored(chapter);
    ensure_dir(&scored_dir)?;
    crate::io::transcript::write_scored_rows(&scored_dir.join(format!("{fname}.csv")), rows)?;
    info!("Written scored file '{fname}.csv'");

    Ok(())
}

/// Classify the selected chapters, one segment at a time, strictly in order.
///
/// Chapters are independent: a configuration or provider failure aborts the
/// current chapter (its outputs are not written) and processing moves on to
/// the next one.
pub async fn run_classify(
    layout: &DataLayout,
    client: &OpenAiClient,
    selections: &[Selection],
) -> Result<()> {
    let pairs = resolve_pairs(&layout.csv_splits(), &layout.audio_splits())
        .context("Failed to resolve segment pairs")?;
    let pairs = select_pairs(pairs, selections)?;

    info!("Beginning classification of {} chapter(s)", pairs.len());
    let mut failed = 0usize;
    for pair in &pairs {
        info!("{}", pair.stem);
        match classify_chapter(client, pair).await {
            Ok((rows, raw_responses)) => {
                write_run_outputs(layout, &pair.stem, &rows, &raw_responses)?;
            }
            Err(e) => {
                error!("Chapter '{}' failed, skipping: {:#}", pair.stem, e);
                failed += 1;
            }
        }
        info!("---");
    }

    info!(
        "Classification complete: {} chapter(s), {} failed",
        pairs.len(),
        failed
    );
    Ok(())
}
