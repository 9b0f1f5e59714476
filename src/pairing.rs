use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

/// One side of a chapter pairing: every file sharing a stem, ordered by part
/// number. A chapter that was never split has a single unnumbered part.
#[derive(Debug, Clone)]
pub struct ChapterFiles {
    pub stem: String,
    pub parts: Vec<PathBuf>,
}

/// A transcript/audio correspondence for one chapter stem. Part `i` of the
/// transcript and part `i` of the audio cover the same narrative span.
#[derive(Debug, Clone)]
pub struct Pair {
    pub stem: String,
    pub csv: ChapterFiles,
    pub audio: ChapterFiles,
}

impl Pair {
    /// Number of aligned segments in this pair.
    pub fn segment_count(&self) -> usize {
        self.csv.parts.len()
    }

    /// Iterate aligned (index, transcript, audio) triples.
    pub fn segments(&self) -> impl Iterator<Item = (usize, &PathBuf, &PathBuf)> {
        self.csv
            .parts
            .iter()
            .zip(self.audio.parts.iter())
            .enumerate()
            .map(|(i, (c, a))| (i, c, a))
    }

    /// Keep only the listed segment indices. Single-part chapters are left
    /// alone: there is nothing to narrow.
    pub fn keep_segments(&mut self, indices: &[usize]) {
        if self.csv.parts.len() <= 1 {
            return;
        }
        let keep = |parts: &[PathBuf]| -> Vec<PathBuf> {
            indices
                .iter()
                .filter_map(|&i| parts.get(i).cloned())
                .collect()
        };
        self.csv.parts = keep(&self.csv.parts);
        self.audio.parts = keep(&self.audio.parts);
    }
}

/// Split a filename stem into its chapter stem and optional part number:
/// a trailing `_<digits>` suffix is a part number from the split stage.
fn stem_and_part(file_stem: &str) -> (&str, u64) {
    if let Some((stem, suffix)) = file_stem.rsplit_once('_') {
        if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(part) = suffix.parse() {
                return (stem, part);
            }
        }
    }
    (file_stem, 0)
}

/// Leading `<N>_` chapter index embedded in a stem, used for output ordering.
fn chapter_index(stem: &str) -> Option<u64> {
    stem.split('_').next()?.parse().ok()
}

fn group_by_stem(dir: &Path) -> Result<BTreeMap<String, Vec<(u64, PathBuf)>>> {
    let mut groups: BTreeMap<String, Vec<(u64, PathBuf)>> = BTreeMap::new();

    for entry in
        std::fs::read_dir(dir).with_context(|| format!("Failed to list directory: {:?}", dir))?
    {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let (stem, part) = stem_and_part(file_stem);
        groups.entry(stem.to_string()).or_default().push((part, path));
    }

    for parts in groups.values_mut() {
        parts.sort_by_key(|(part, _)| *part);
    }
    Ok(groups)
}

/// Discover transcript/audio pairs across two directory trees.
///
/// Files are grouped by stem on each side and inner-joined; a stem present on
/// only one side is excluded with a warning, never an error. The result is
/// ordered by the leading numeric chapter index in the stem, ties broken by
/// stem string order.
pub fn resolve_pairs(csv_dir: &Path, audio_dir: &Path) -> Result<Vec<Pair>> {
    let mut csv_groups = group_by_stem(csv_dir)?;
    let audio_groups = group_by_stem(audio_dir)?;

    let mut pairs = Vec::new();
    for (stem, audio_parts) in audio_groups {
        match csv_groups.remove(&stem) {
            Some(csv_parts) => pairs.push(Pair {
                csv: ChapterFiles {
                    stem: stem.clone(),
                    parts: csv_parts.into_iter().map(|(_, p)| p).collect(),
                },
                audio: ChapterFiles {
                    stem: stem.clone(),
                    parts: audio_parts.into_iter().map(|(_, p)| p).collect(),
                },
                stem,
            }),
            None => warn!("Audio '{}' has no matching transcript, skipping", stem),
        }
    }
    for stem in csv_groups.keys() {
        warn!("Transcript '{}' has no matching audio, skipping", stem);
    }

    pairs.sort_by(|a, b| {
        let ka = (chapter_index(&a.stem).unwrap_or(u64::MAX), &a.stem);
        let kb = (chapter_index(&b.stem).unwrap_or(u64::MAX), &b.stem);
        ka.cmp(&kb)
    });
    Ok(pairs)
}
