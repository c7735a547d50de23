use std::path::PathBuf;

use crate::subtitles::timeline::DEFAULT_ACTIVE_TOLERANCE_SECS;
use crate::waveform::DecoderConfig;

pub(super) const DEFAULT_PREFERRED_LANGUAGE: &str = "en";

pub(super) fn default_sample_rate() -> u32 {
    DecoderConfig::DEFAULT_SAMPLE_RATE
}

pub(super) fn default_frame_duration_ms() -> u32 {
    DecoderConfig::DEFAULT_FRAME_DURATION_MS
}

pub(super) fn default_decoder_program() -> PathBuf {
    PathBuf::from(DecoderConfig::DEFAULT_DECODER_PROGRAM)
}

pub(super) fn default_stream_chunk_ms() -> u32 {
    DecoderConfig::DEFAULT_STREAM_CHUNK_MS
}

pub(super) fn default_teardown_timeout_ms() -> u64 {
    DecoderConfig::DEFAULT_TEARDOWN_TIMEOUT.as_millis() as u64
}

pub(super) fn default_preferred_language() -> String {
    DEFAULT_PREFERRED_LANGUAGE.to_string()
}

pub(super) fn default_active_cue_tolerance_secs() -> f64 {
    DEFAULT_ACTIVE_TOLERANCE_SECS
}

pub(super) fn clamp_tolerance(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        DEFAULT_ACTIVE_TOLERANCE_SECS
    }
}
