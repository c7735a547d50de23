use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failures raised by the waveform pipeline.
#[derive(Debug, Error)]
pub enum WaveformError {
    /// The decoder binary could not be located; nothing was spawned.
    #[error("Decoder `{program}` not found. Install it and make sure it is on PATH")]
    ToolNotFound { program: String },
    /// The decoder process or its output pipe could not be set up.
    #[error("Failed to launch decoder {program}: {source}")]
    DecodeLaunch {
        program: PathBuf,
        source: std::io::Error,
    },
    /// A configuration value was rejected before any I/O happened.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },
    /// Reading the decoder output pipe failed.
    #[error("Failed to read decoder output: {source}")]
    Read { source: std::io::Error },
    /// The decoder ran but exited unsuccessfully.
    #[error("Decoder exited with {status}: {stderr}")]
    DecoderFailed { status: ExitStatus, stderr: String },
}

impl WaveformError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }
}
