use std::path::PathBuf;
use std::time::Duration;

use tempfile::tempdir;

use super::*;
use crate::app_dirs::{APP_DIR_NAME, ConfigBaseGuard};
use crate::waveform::AmplitudeMethod;

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().unwrap();
    let settings = load_from_path(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
    assert_eq!(settings, AppSettings::default());
    assert_eq!(settings.waveform.sample_rate, 48_000);
    assert_eq!(settings.waveform.frame_duration_ms, 1);
    assert_eq!(settings.waveform.teardown_timeout_ms, 5_000);
    assert_eq!(settings.subtitles.preferred_language, "en");
}

#[test]
fn partial_file_fills_remaining_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[waveform]\namplitude_method = \"peak\"\nsample_rate = 22050\n").unwrap();

    let settings = load_from_path(&path).unwrap();
    assert_eq!(settings.waveform.amplitude_method, AmplitudeMethod::Peak);
    assert_eq!(settings.waveform.sample_rate, 22_050);
    assert_eq!(settings.waveform.stream_chunk_ms, 50);
    assert_eq!(settings.subtitles, SubtitleSettings::default());
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[waveform]\namplitude_method = \"loudness\"\n").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseToml { .. }));
    assert!(err.to_string().starts_with("Malformed settings in "));
}

#[test]
fn negative_tolerance_is_clamped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[subtitles]\nactive_cue_tolerance_secs = -2.0\n").unwrap();

    let settings = load_from_path(&path).unwrap();
    assert_eq!(settings.subtitles.active_cue_tolerance_secs, 0.0);
}

#[test]
fn save_then_load_preserves_settings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
    let mut settings = AppSettings::default();
    settings.waveform.decoder_program = PathBuf::from("/opt/ffmpeg/bin/ffmpeg");
    settings.subtitles.preferred_language = "ja".into();

    save_to_path(&settings, &path).unwrap();
    assert_eq!(load_from_path(&path).unwrap(), settings);
    let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[test]
fn load_or_default_reads_from_app_dir() {
    let dir = tempdir().unwrap();
    let _guard = ConfigBaseGuard::set(dir.path().to_path_buf());
    let mut settings = AppSettings::default();
    settings.waveform.frame_duration_ms = 10;

    let saved_to = save(&settings).unwrap();
    assert_eq!(saved_to, dir.path().join(APP_DIR_NAME).join(CONFIG_FILE_NAME));
    assert_eq!(load_or_default().unwrap().waveform.frame_duration_ms, 10);
}

#[test]
fn decoder_config_carries_every_setting() {
    let settings = WaveformSettings {
        sample_rate: 16_000,
        frame_duration_ms: 20,
        amplitude_method: AmplitudeMethod::Peak,
        decoder_program: PathBuf::from("avconv"),
        stream_chunk_ms: 100,
        teardown_timeout_ms: 250,
    };
    let config = settings.decoder_config().unwrap();
    assert_eq!(config.sample_rate(), 16_000);
    assert_eq!(config.frame_duration_ms(), 20);
    assert_eq!(config.amplitude_method(), AmplitudeMethod::Peak);
    assert_eq!(config.decoder_program(), std::path::Path::new("avconv"));
    assert_eq!(config.stream_chunk_ms(), 100);
    assert_eq!(config.teardown_timeout(), Duration::from_millis(250));
}

#[test]
fn decoder_config_rejects_zero_values() {
    let settings = WaveformSettings {
        frame_duration_ms: 0,
        ..WaveformSettings::default()
    };
    assert!(matches!(
        settings.decoder_config(),
        Err(crate::waveform::WaveformError::InvalidParameter { .. })
    ));
}
