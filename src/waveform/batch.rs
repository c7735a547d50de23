use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::framer::{batch_frames, samples_from_le_bytes};
use super::launcher::DecoderProcess;
use super::{AudioFrame, DecoderConfig, WaveformError};

/// Whole-file waveform as two aligned arrays.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Waveform {
    /// Frame start times: `0, d, 2d, ...` for frame duration `d`.
    pub timestamps_ms: Vec<u64>,
    /// Normalized amplitude of each frame, aligned with `timestamps_ms`.
    pub amplitudes: Vec<f32>,
}

impl Waveform {
    /// Number of frames.
    pub fn len(&self) -> usize {
        self.timestamps_ms.len()
    }

    /// True when the decoder produced no samples.
    pub fn is_empty(&self) -> bool {
        self.timestamps_ms.is_empty()
    }

    /// Iterate the arrays as paired frames.
    pub fn frames(&self) -> impl Iterator<Item = AudioFrame> + '_ {
        self.timestamps_ms
            .iter()
            .zip(&self.amplitudes)
            .map(|(&timestamp_ms, &amplitude)| AudioFrame {
                timestamp_ms,
                amplitude,
            })
    }
}

/// Decode `input` in one pass and compute every frame at once.
///
/// Holds the full decoded sample buffer in memory; prefer [`super::waveform_stream`]
/// for long inputs that can be consumed incrementally.
pub fn waveform_from_file(input: &Path, config: &DecoderConfig) -> Result<Waveform, WaveformError> {
    let mut process = DecoderProcess::spawn(input, config)?;
    let mut raw = Vec::new();
    process
        .read_to_end(&mut raw)
        .map_err(|source| WaveformError::Read { source })?;
    process.finish()?;

    let samples = samples_from_le_bytes(&raw);
    debug!(
        "Decoded {} samples from {} for batch waveform",
        samples.len(),
        input.display()
    );
    Ok(batch_frames(
        &samples,
        config.sample_rate(),
        config.frame_duration_ms(),
        config.amplitude_method(),
    ))
}
