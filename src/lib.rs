//! Waveform extraction and caption parsing for media files.
//!
//! Audio is decoded by an external `ffmpeg` process into mono 16-bit PCM and
//! reduced to one normalized amplitude per fixed-duration frame, either as a
//! lazy stream or as one batch result. Captions are parsed from SRT and WebVTT.

/// Per-user application directories.
pub mod app_dirs;
/// TOML settings.
pub mod config;
/// Tracing subscriber setup.
pub mod logging;
/// SRT/WebVTT parsing and caption helpers.
pub mod subtitles;
/// Decoder process management and amplitude framing.
pub mod waveform;
