use crate::error::PipelineError;
use crate::io::WavBuffer;

/// Parse a human-authored cut timestamp into whole seconds.
///
/// Two components are minutes:seconds, three are hours:minutes:seconds. Any
/// other shape, or a non-numeric component, is a fatal configuration error.
pub fn parse_timecode(raw: &str) -> Result<u64, PipelineError> {
    let parts: Vec<u64> = raw
        .split(':')
        .map(|p| p.parse::<u64>())
        .collect::<Result<_, _>>()
        .map_err(|_| PipelineError::InvalidTimecode(raw.to_string()))?;

    match parts.as_slice() {
        [m, s] => Ok(m * 60 + s),
        [h, m, s] => Ok(h * 3600 + m * 60 + s),
        _ => Err(PipelineError::InvalidTimecode(raw.to_string())),
    }
}

/// Cut an audio buffer at the given timestamps.
///
/// Cut points are `[0] + timestamps-as-given + [total duration]`; the list is
/// used in authored order, never re-sorted. Second-to-frame conversion
/// truncates. With no timestamps the whole input comes back as one segment,
/// so the output count is always `timestamps.len() + 1` — the number the
/// transcript splitter must agree with for the same stem.
pub fn segment_audio(
    audio: &WavBuffer,
    timestamps: &[String],
) -> Result<Vec<WavBuffer>, PipelineError> {
    let sample_rate = audio.spec.sample_rate as u64;
    let total_frames = audio.frames();

    let mut cut_frames = Vec::with_capacity(timestamps.len() + 2);
    cut_frames.push(0usize);
    for raw in timestamps {
        let secs = parse_timecode(raw)?;
        cut_frames.push((secs * sample_rate) as usize);
    }
    cut_frames.push(total_frames);

    let segments = cut_frames
        .windows(2)
        .map(|w| audio.slice_frames(w[0], w[1]))
        .collect();
    Ok(segments)
}
