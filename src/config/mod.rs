//! TOML settings stored in `.wavecue/config.toml`.
//!
//! Every field has a serde default, so a missing or partial file loads cleanly.
//! Values only reach the waveform engine through
//! [`WaveformSettings::decoder_config`], which validates them.

mod defaults;
mod errors;
mod io;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::waveform::{AmplitudeMethod, DecoderConfig, WaveformError};

use defaults::{
    clamp_tolerance, default_active_cue_tolerance_secs, default_decoder_program,
    default_frame_duration_ms, default_preferred_language, default_sample_rate,
    default_stream_chunk_ms, default_teardown_timeout_ms,
};

pub use errors::ConfigError;
pub use io::{CONFIG_FILE_NAME, config_path, load_from_path, load_or_default, save, save_to_path};

/// Settings persisted in the TOML config file.
///
/// Config keys (TOML): `waveform`, `subtitles`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub waveform: WaveformSettings,
    #[serde(default)]
    pub subtitles: SubtitleSettings,
}

impl AppSettings {
    pub(crate) fn normalized(mut self) -> Self {
        self.subtitles.active_cue_tolerance_secs =
            clamp_tolerance(self.subtitles.active_cue_tolerance_secs);
        self
    }
}

/// Decoder and framing settings.
///
/// Config keys (TOML): `sample_rate`, `frame_duration_ms`, `amplitude_method`,
/// `decoder_program`, `stream_chunk_ms`, `teardown_timeout_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformSettings {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_frame_duration_ms")]
    pub frame_duration_ms: u32,
    #[serde(default)]
    pub amplitude_method: AmplitudeMethod,
    /// Bare program name searched on `PATH`, or an explicit path.
    #[serde(default = "default_decoder_program")]
    pub decoder_program: PathBuf,
    #[serde(default = "default_stream_chunk_ms")]
    pub stream_chunk_ms: u32,
    #[serde(default = "default_teardown_timeout_ms")]
    pub teardown_timeout_ms: u64,
}

impl Default for WaveformSettings {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            frame_duration_ms: default_frame_duration_ms(),
            amplitude_method: AmplitudeMethod::default(),
            decoder_program: default_decoder_program(),
            stream_chunk_ms: default_stream_chunk_ms(),
            teardown_timeout_ms: default_teardown_timeout_ms(),
        }
    }
}

impl WaveformSettings {
    /// Build a validated engine configuration from these settings.
    pub fn decoder_config(&self) -> Result<DecoderConfig, WaveformError> {
        Ok(DecoderConfig::new(
            self.sample_rate,
            self.frame_duration_ms,
            self.amplitude_method,
        )?
        .with_decoder_program(self.decoder_program.clone())
        .with_stream_chunk_ms(self.stream_chunk_ms)?
        .with_teardown_timeout(Duration::from_millis(self.teardown_timeout_ms)))
    }
}

/// Caption lookup and playback-sync settings.
///
/// Config keys (TOML): `preferred_language`, `active_cue_tolerance_secs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleSettings {
    #[serde(default = "default_preferred_language")]
    pub preferred_language: String,
    #[serde(default = "default_active_cue_tolerance_secs")]
    pub active_cue_tolerance_secs: f64,
}

impl Default for SubtitleSettings {
    fn default() -> Self {
        Self {
            preferred_language: default_preferred_language(),
            active_cue_tolerance_secs: default_active_cue_tolerance_secs(),
        }
    }
}
