use thiserror::Error;

/// Fatal errors that abort processing of the current chapter.
///
/// Configuration errors and incomplete provider responses are never silently
/// swallowed; chapters are independent units of work, so the drivers report
/// the failure and move on to the next chapter. Pairing and annotation gaps
/// are warnings, not errors — they are logged where they occur.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The transcript split ranges and the audio timestamps for one stem
    /// disagree on segment count. Zipping mismatched lengths would misalign
    /// every downstream model call, so this is fatal before anything is
    /// written for the stem.
    #[error(
        "segment count mismatch for '{stem}': {csv_segments} transcript segment(s) vs {audio_segments} audio segment(s)"
    )]
    SegmentCountMismatch {
        stem: String,
        csv_segments: usize,
        audio_segments: usize,
    },

    /// A cut timestamp was not "MM:SS" or "HH:MM:SS".
    #[error("invalid timecode '{0}': expected MM:SS or HH:MM:SS")]
    InvalidTimecode(String),

    /// A manual chapter selection referenced a stem that was never paired.
    #[error("unknown chapter '{0}'")]
    UnknownChapter(String),

    /// The provider flagged its response as incomplete. A partial emotion
    /// distribution would corrupt downstream analytics, so the chapter is
    /// aborted at this segment and nothing is written for it.
    #[error("model response incomplete (finish_reason '{finish_reason}')")]
    IncompleteResponse { finish_reason: String },
}
