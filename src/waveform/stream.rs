use std::iter::FusedIterator;
use std::path::Path;

use tracing::debug;

use super::framer::FrameReader;
use super::launcher::DecoderProcess;
use super::{AudioFrame, DecoderConfig, WaveformError};

/// Lazy, forward-only sequence of waveform frames backed by a live decoder.
///
/// Each call to `next` reads from the decoder pipe only when no buffered frame
/// is ready. Once the pipe is drained the decoder's exit status is checked and a
/// failure is surfaced as a final `Err` item. Dropping the stream early tears the
/// decoder down.
pub struct WaveformStream {
    frames: FrameReader<DecoderProcess>,
    done: bool,
    emitted: u64,
}

/// Start decoding `input` and return a lazy stream of `(timestamp, amplitude)` frames.
///
/// The decoder binary is located before anything is spawned, so a missing tool
/// fails with [`WaveformError::ToolNotFound`] without side effects.
pub fn waveform_stream(
    input: &Path,
    config: &DecoderConfig,
) -> Result<WaveformStream, WaveformError> {
    let process = DecoderProcess::spawn(input, config)?;
    Ok(WaveformStream {
        frames: FrameReader::new(process, config),
        done: false,
        emitted: 0,
    })
}

impl WaveformStream {
    /// Frames handed out so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl Iterator for WaveformStream {
    type Item = Result<AudioFrame, WaveformError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.frames.next() {
            Some(Ok(frame)) => {
                self.emitted += 1;
                Some(Ok(frame))
            }
            Some(Err(source)) => {
                self.done = true;
                Some(Err(WaveformError::Read { source }))
            }
            None => {
                self.done = true;
                debug!("Waveform stream drained after {} frames", self.emitted);
                self.frames.get_mut().finish().err().map(Err)
            }
        }
    }
}

impl FusedIterator for WaveformStream {}
