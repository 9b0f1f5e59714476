use std::path::Path;

use anyhow::{Context, Result, bail};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// An in-memory PCM waveform: interleaved 16-bit samples plus format spec.
///
/// Slicing operates on frame offsets (one frame = one sample per channel) so
/// segment boundaries stay sample-accurate regardless of channel count. No
/// resampling ever happens here.
#[derive(Debug, Clone)]
pub struct WavBuffer {
    pub spec: WavSpec,
    pub samples: Vec<i16>,
}

impl WavBuffer {
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader =
            WavReader::open(path).with_context(|| format!("Failed to open wav: {:?}", path))?;
        let spec = reader.spec();

        if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
            bail!(
                "Unsupported wav format in {:?}: expected 16-bit integer PCM, got {}-bit {:?}",
                path,
                spec.bits_per_sample,
                spec.sample_format
            );
        }

        let samples = reader
            .samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to decode wav samples: {:?}", path))?;

        Ok(Self { spec, samples })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = WavWriter::create(path, self.spec)
            .with_context(|| format!("Failed to create wav: {:?}", path))?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer
            .finalize()
            .with_context(|| format!("Failed to finalize wav: {:?}", path))?;
        Ok(())
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.spec.channels as usize
    }

    /// Duration in whole seconds, truncated.
    pub fn duration_secs(&self) -> u64 {
        self.frames() as u64 / self.spec.sample_rate as u64
    }

    /// Copy out the frames in `[start_frame, end_frame)`. Bounds are clamped
    /// to the buffer; an inverted range yields an empty segment.
    pub fn slice_frames(&self, start_frame: usize, end_frame: usize) -> Self {
        let channels = self.spec.channels as usize;
        let start = start_frame.min(self.frames()) * channels;
        let end = end_frame.min(self.frames()) * channels;
        let samples = if start < end {
            self.samples[start..end].to_vec()
        } else {
            Vec::new()
        };
        Self {
            spec: self.spec,
            samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn stereo_buffer(frames: usize, sample_rate: u32) -> WavBuffer {
        let spec = WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        // Encode the frame number in both channels so slices are checkable.
        let samples = (0..frames as i16).flat_map(|f| [f, f]).collect();
        WavBuffer { spec, samples }
    }

    #[test]
    fn test_frames_counts_per_channel() {
        let buffer = stereo_buffer(10, 100);
        assert_eq!(buffer.samples.len(), 20);
        assert_eq!(buffer.frames(), 10);
    }

    #[test]
    fn test_slice_is_sample_accurate() {
        let buffer = stereo_buffer(10, 100);
        let slice = buffer.slice_frames(3, 6);

        assert_eq!(slice.frames(), 3);
        assert_eq!(slice.samples, vec![3, 3, 4, 4, 5, 5]);
    }

    #[test]
    fn test_slice_clamps_and_never_inverts() {
        let buffer = stereo_buffer(10, 100);
        assert_eq!(buffer.slice_frames(8, 50).frames(), 2);
        assert_eq!(buffer.slice_frames(50, 60).frames(), 0);
        assert_eq!(buffer.slice_frames(6, 3).frames(), 0);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");

        let buffer = stereo_buffer(100, 44_100);
        buffer.save(&path).unwrap();
        let back = WavBuffer::load(&path).unwrap();

        assert_eq!(back.spec, buffer.spec);
        assert_eq!(back.samples, buffer.samples);
    }
}
