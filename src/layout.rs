use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// On-disk layout of the pipeline's data tree.
///
/// Every stage receives this explicitly; nothing reads ambient paths. The
/// tree mirrors the pipeline order: raw transcripts come in, edits replace
/// them, splits partition them, outputs accumulate per classification run.
///
/// ```text
/// <root>/csv/raw/            scraped chapter transcripts
/// <root>/csv/edits/          edited transcripts (+ renumbered inserts)
/// <root>/csv/custom_inserts/ externally authored insert files
/// <root>/csv/splits/         numbered transcript segments
/// <root>/csv/rules.json      the rule document
/// <root>/audio/edits/        chapter audio, one wav per stem
/// <root>/audio/splits/       numbered audio segments
/// <root>/output/api_responses/<chapter>/   raw model responses per run
/// <root>/output/emotions_scored/<chapter>/ scored transcripts per run
/// <root>/output/consolidated/              cross-chapter datasets
/// ```
#[derive(Debug, Clone)]
pub struct DataLayout {
    pub root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn rules_file(&self) -> PathBuf {
        self.root.join("csv").join("rules.json")
    }

    pub fn csv_raw(&self) -> PathBuf {
        self.root.join("csv").join("raw")
    }

    pub fn csv_edits(&self) -> PathBuf {
        self.root.join("csv").join("edits")
    }

    pub fn csv_inserts(&self) -> PathBuf {
        self.root.join("csv").join("custom_inserts")
    }

    pub fn csv_splits(&self) -> PathBuf {
        self.root.join("csv").join("splits")
    }

    pub fn audio_edits(&self) -> PathBuf {
        self.root.join("audio").join("edits")
    }

    pub fn audio_splits(&self) -> PathBuf {
        self.root.join("audio").join("splits")
    }

    pub fn api_responses(&self, chapter: &str) -> PathBuf {
        self.root.join("output").join("api_responses").join(chapter)
    }

    pub fn emotions_scored(&self, chapter: &str) -> PathBuf {
        self.root
            .join("output")
            .join("emotions_scored")
            .join(chapter)
    }

    pub fn emotions_scored_root(&self) -> PathBuf {
        self.root.join("output").join("emotions_scored")
    }

    pub fn consolidated(&self) -> PathBuf {
        self.root.join("output").join("consolidated")
    }
}

/// Create a directory (and parents) if it does not exist yet.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).with_context(|| format!("Failed to create directory: {:?}", path))
}

/// Remove every regular file directly under `path`, leaving the directory
/// itself in place. Re-running the splitter must not leave stale segments
/// from a previous rule file behind.
pub fn clear_files(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    for entry in std::fs::read_dir(path)
        .with_context(|| format!("Failed to list directory: {:?}", path))?
    {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            std::fs::remove_file(entry.path())
                .with_context(|| format!("Failed to remove stale file: {:?}", entry.path()))?;
        }
    }
    Ok(())
}
