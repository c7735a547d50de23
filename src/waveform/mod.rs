mod amplitude;
mod batch;
mod error;
pub mod framer;
pub mod launcher;
mod stream;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use amplitude::{AmplitudeMethod, FULL_SCALE};
pub use batch::{Waveform, waveform_from_file};
pub use error::WaveformError;
pub use stream::{WaveformStream, waveform_stream};

/// One time slice of a waveform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioFrame {
    /// Start of the frame in milliseconds; a multiple of the frame duration.
    pub timestamp_ms: u64,
    /// Normalized amplitude in `[0.0, 1.0]`.
    pub amplitude: f32,
}

/// Validated, immutable settings for one decode call.
#[derive(Clone, Debug, PartialEq)]
pub struct DecoderConfig {
    sample_rate: u32,
    frame_duration_ms: u32,
    amplitude_method: AmplitudeMethod,
    decoder_program: PathBuf,
    stream_chunk_ms: u32,
    teardown_timeout: Duration,
}

impl DecoderConfig {
    /// Decoder output rate used when none is configured.
    pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;
    /// Frame resolution used when none is configured.
    pub const DEFAULT_FRAME_DURATION_MS: u32 = 1;
    /// Audio read from the pipe per internal chunk in stream mode.
    pub const DEFAULT_STREAM_CHUNK_MS: u32 = 50;
    /// Grace period for the decoder to exit before it is killed.
    pub const DEFAULT_TEARDOWN_TIMEOUT: Duration = Duration::from_secs(5);
    /// Decoder looked up on `PATH` by default.
    pub const DEFAULT_DECODER_PROGRAM: &'static str = "ffmpeg";

    /// Build a config, rejecting a zero sample rate or frame duration.
    pub fn new(
        sample_rate: u32,
        frame_duration_ms: u32,
        amplitude_method: AmplitudeMethod,
    ) -> Result<Self, WaveformError> {
        if sample_rate == 0 {
            return Err(WaveformError::invalid("sample_rate must be >= 1"));
        }
        if frame_duration_ms == 0 {
            return Err(WaveformError::invalid("frame_duration_ms must be >= 1"));
        }
        Ok(Self {
            sample_rate,
            frame_duration_ms,
            amplitude_method,
            decoder_program: PathBuf::from(Self::DEFAULT_DECODER_PROGRAM),
            stream_chunk_ms: Self::DEFAULT_STREAM_CHUNK_MS,
            teardown_timeout: Self::DEFAULT_TEARDOWN_TIMEOUT,
        })
    }

    /// Use a different decoder: a bare name searched on `PATH`, or a path.
    pub fn with_decoder_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.decoder_program = program.into();
        self
    }

    /// Change how much audio stream mode requests from the pipe at a time.
    pub fn with_stream_chunk_ms(mut self, stream_chunk_ms: u32) -> Result<Self, WaveformError> {
        if stream_chunk_ms == 0 {
            return Err(WaveformError::invalid("stream_chunk_ms must be >= 1"));
        }
        self.stream_chunk_ms = stream_chunk_ms;
        Ok(self)
    }

    /// Change how long teardown waits for the decoder before killing it.
    pub fn with_teardown_timeout(mut self, timeout: Duration) -> Self {
        self.teardown_timeout = timeout;
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frame_duration_ms(&self) -> u32 {
        self.frame_duration_ms
    }

    pub fn amplitude_method(&self) -> AmplitudeMethod {
        self.amplitude_method
    }

    pub fn decoder_program(&self) -> &Path {
        &self.decoder_program
    }

    pub fn stream_chunk_ms(&self) -> u32 {
        self.stream_chunk_ms
    }

    pub fn teardown_timeout(&self) -> Duration {
        self.teardown_timeout
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            sample_rate: Self::DEFAULT_SAMPLE_RATE,
            frame_duration_ms: Self::DEFAULT_FRAME_DURATION_MS,
            amplitude_method: AmplitudeMethod::default(),
            decoder_program: PathBuf::from(Self::DEFAULT_DECODER_PROGRAM),
            stream_chunk_ms: Self::DEFAULT_STREAM_CHUNK_MS,
            teardown_timeout: Self::DEFAULT_TEARDOWN_TIMEOUT,
        }
    }
}
