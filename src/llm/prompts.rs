use crate::models::{NEGATIVE_EMOTIONS, POSITIVE_EMOTIONS, TranscriptRow};

/// Instructions for the audio-understanding model.
///
/// The value-level output contract lives here: scores in [0,1] summing to 1
/// per line, sub-0.1 scores folded into the dominant emotion, keys taken from
/// the transcript's row ids, JSON-only reply.
pub fn system_prompt() -> String {
    format!(
        "## TASK\n\
         Evaluate the likelihood of the emotions in the audio dialogue.\n\
         Consider the actor's interpretation, the background music and the meaning of the words.\n\
         Only classify the following emotions:\n\
         - positive: [{positive}]\n\
         - negative: [{negative}]\n\
         - neutral: [neutral]\n\
         \n\
         ## REQUIREMENTS\n\
         - You will have the transcript of the dialogue. Use the row index as key when returning the estimate for the voice line.\n\
         - Your analysis must rely EXCLUSIVELY on the audio. The transcript is provided ONLY to map voice lines by their row index.\n\
         - Do NOT use the text to infer tone, emotion, or meaning.\n\
         - Make sure to not classify any other emotion apart from those listed.\n\
         - Don't mix positive and negative emotions in a single voice line.\n\
         - Your estimate should be between 0 and 1, and the total should add up to 1.\n\
         - If an emotion has a score lower than 0.1, ignore it and add that score to the highest valued emotions.\n\
         - If an emotion is not scored, return it with a score of 0.0\n\
         - When you reply, do not add any other text. Just reply with a JSON formatted string.",
        positive = POSITIVE_EMOTIONS.join(", "),
        negative = NEGATIVE_EMOTIONS.join(", "),
    )
}

/// Serialize a segment's rows as the newline-joined transcript the model maps
/// voice lines against: `"<dialogue_index>_<line_index> | <speaker>: <line>"`.
///
/// Rows are rendered in chapter order regardless of how the segment file was
/// stored.
pub fn render_dialogue(rows: &[TranscriptRow]) -> String {
    let mut ordered: Vec<&TranscriptRow> = rows.iter().collect();
    ordered.sort_by_key(|r| (r.chapter_index, r.dialogue_index, r.line_index));

    ordered
        .iter()
        .map(|r| {
            format!(
                "{} | {}: {}",
                r.line_id(),
                r.speaker.as_deref().unwrap_or(""),
                r.line
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
