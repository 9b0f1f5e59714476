pub mod error;
pub mod io;
pub mod layout;
pub mod llm;
pub mod merge;
pub mod models;
pub mod pairing;
pub mod segment;
pub mod stages;

pub use error::PipelineError;
pub use io::{WavBuffer, read_rows, read_scored_rows, write_rows, write_scored_rows};
pub use layout::DataLayout;
pub use llm::{OpenAiClient, OpenAiConfig, render_dialogue, system_prompt};
pub use merge::{concat_chapter_segments, merge_response};
pub use models::{
    AnnotationResponse, EMOTIONS, RangeEnd, RowRange, RuleSet, ScoredRow, TranscriptRow,
};
pub use pairing::{Pair, resolve_pairs};
pub use segment::{parse_timecode, segment_audio};
pub use stages::{EditorConfig, Selection, run_classify, run_consolidate, run_edit, run_split};
