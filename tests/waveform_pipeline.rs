//! End-to-end waveform extraction against a stand-in decoder script.
#![cfg(unix)]

mod support;

use std::io::Read;
use std::path::Path;
use std::time::{Duration, Instant};

use support::decoder::{
    FAILING, LINGERING, LINGERING_DETACHED, PASSTHROUGH, install_fake_decoder, process_alive,
    recorded_pid,
};
use support::pcm::write_raw_pcm;
use wavecue::waveform::launcher::DecoderProcess;
use wavecue::waveform::{
    AmplitudeMethod, AudioFrame, DecoderConfig, FULL_SCALE, WaveformError, waveform_from_file,
    waveform_stream,
};

fn config_for(decoder: &Path, method: AmplitudeMethod) -> DecoderConfig {
    DecoderConfig::new(48_000, 1, method)
        .unwrap()
        .with_decoder_program(decoder)
}

#[test]
fn stream_and_batch_produce_identical_frames() {
    let dir = tempfile::tempdir().unwrap();
    let decoder = install_fake_decoder(dir.path(), "decoder", PASSTHROUGH);
    let input = dir.path().join("input.pcm");
    // Ten whole 48-sample frames plus a ten-sample tail.
    let samples: Vec<i16> = (0..490).map(|idx| ((idx % 48) * 500) as i16).collect();
    write_raw_pcm(&input, &samples);

    for method in [AmplitudeMethod::Rms, AmplitudeMethod::Peak] {
        let config = config_for(&decoder, method);
        let mut stream = waveform_stream(&input, &config).unwrap();
        let streamed: Vec<AudioFrame> = stream.by_ref().collect::<Result<_, _>>().unwrap();
        assert_eq!(stream.emitted(), 11);
        let batch = waveform_from_file(&input, &config).unwrap();

        assert_eq!(streamed.len(), 11);
        assert_eq!(batch.timestamps_ms, (0..11).collect::<Vec<u64>>());
        assert_eq!(batch.frames().collect::<Vec<_>>(), streamed);
    }
}

#[test]
fn partial_tail_is_measured_over_its_own_samples() {
    let dir = tempfile::tempdir().unwrap();
    let decoder = install_fake_decoder(dir.path(), "decoder", PASSTHROUGH);
    let input = dir.path().join("input.pcm");
    let mut samples = vec![0_i16; 48];
    samples.extend([16_000_i16; 5]);
    write_raw_pcm(&input, &samples);

    let config = config_for(&decoder, AmplitudeMethod::Peak);
    let frames: Vec<AudioFrame> = waveform_stream(&input, &config)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        frames,
        vec![
            AudioFrame {
                timestamp_ms: 0,
                amplitude: 0.0
            },
            AudioFrame {
                timestamp_ms: 1,
                amplitude: 16_000.0 / FULL_SCALE
            },
        ]
    );
}

#[test]
fn empty_decoder_output_yields_no_frames() {
    let dir = tempfile::tempdir().unwrap();
    let decoder = install_fake_decoder(dir.path(), "decoder", PASSTHROUGH);
    let input = dir.path().join("silence.pcm");
    write_raw_pcm(&input, &[]);

    let config = config_for(&decoder, AmplitudeMethod::Rms);
    assert_eq!(waveform_stream(&input, &config).unwrap().count(), 0);
    let batch = waveform_from_file(&input, &config).unwrap();
    assert!(batch.is_empty());
    assert!(batch.amplitudes.is_empty());
}

#[test]
fn trailing_odd_byte_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let decoder = install_fake_decoder(dir.path(), "decoder", PASSTHROUGH);
    let input = dir.path().join("odd.pcm");
    let mut bytes: Vec<u8> = std::iter::repeat_n(0x10_u8, 96).collect();
    bytes.push(0x7f);
    std::fs::write(&input, bytes).unwrap();

    let config = config_for(&decoder, AmplitudeMethod::Rms);
    assert_eq!(waveform_stream(&input, &config).unwrap().count(), 1);
    assert_eq!(waveform_from_file(&input, &config).unwrap().len(), 1);
}

#[test]
fn decoder_failure_is_reported_after_its_frames() {
    let dir = tempfile::tempdir().unwrap();
    let decoder = install_fake_decoder(dir.path(), "decoder", FAILING);
    let input = dir.path().join("input.pcm");
    write_raw_pcm(&input, &[1_000; 96]);
    let config = config_for(&decoder, AmplitudeMethod::Rms);

    let items: Vec<_> = waveform_stream(&input, &config).unwrap().collect();
    assert_eq!(items.len(), 3);
    assert!(items[..2].iter().all(|item| item.is_ok()));
    match &items[2] {
        Err(WaveformError::DecoderFailed { status, stderr }) => {
            assert_eq!(status.code(), Some(3));
            assert!(stderr.contains("decode exploded"));
        }
        other => panic!("expected decoder failure, got {other:?}"),
    }

    let err = waveform_from_file(&input, &config).unwrap_err();
    assert!(matches!(err, WaveformError::DecoderFailed { .. }));
}

#[test]
fn abandoning_the_stream_tears_down_the_decoder() {
    let dir = tempfile::tempdir().unwrap();
    let decoder = install_fake_decoder(dir.path(), "decoder", LINGERING);
    let input = dir.path().join("long.pcm");
    write_raw_pcm(&input, &vec![2_000; 48_000 * 4]);
    let config = config_for(&decoder, AmplitudeMethod::Rms)
        .with_teardown_timeout(Duration::from_millis(200));

    let mut stream = waveform_stream(&input, &config).unwrap();
    let first = stream.next().unwrap().unwrap();
    assert_eq!(first.timestamp_ms, 0);
    let pid = recorded_pid(&input);
    assert!(process_alive(pid));

    let started = Instant::now();
    drop(stream);
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(!process_alive(pid), "decoder {pid} survived the dropped stream");
}

#[test]
fn decoder_lingering_after_eof_is_killed_once_drained() {
    let dir = tempfile::tempdir().unwrap();
    let decoder = install_fake_decoder(dir.path(), "decoder", LINGERING_DETACHED);
    let input = dir.path().join("input.pcm");
    write_raw_pcm(&input, &[1_000; 480]);
    let config = config_for(&decoder, AmplitudeMethod::Rms)
        .with_teardown_timeout(Duration::from_millis(200));

    let mut stream = waveform_stream(&input, &config).unwrap();
    let items: Vec<_> = stream.by_ref().collect();
    assert_eq!(items.len(), 10);
    assert!(items.iter().all(|item| item.is_ok()));
    assert_eq!(stream.emitted(), 10);
    // Reaped by the drain itself, before the stream is dropped.
    let pid = recorded_pid(&input);
    assert!(!process_alive(pid), "decoder {pid} outlived the drained stream");
    drop(stream);

    let batch = waveform_from_file(&input, &config).unwrap();
    assert_eq!(batch.len(), 10);
    assert!(!process_alive(recorded_pid(&input)));
}

#[test]
fn decoder_process_reports_its_program_and_output() {
    let dir = tempfile::tempdir().unwrap();
    let decoder = install_fake_decoder(dir.path(), "decoder", PASSTHROUGH);
    let input = dir.path().join("input.pcm");
    write_raw_pcm(&input, &[7; 48]);
    let config = config_for(&decoder, AmplitudeMethod::Rms);

    let mut process = DecoderProcess::spawn(&input, &config).unwrap();
    assert_eq!(process.program(), decoder.as_path());
    let mut raw = Vec::new();
    process.read_to_end(&mut raw).unwrap();
    assert_eq!(raw.len(), 96);
    process.finish().unwrap();
}

#[test]
fn missing_decoder_is_reported_before_spawn() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.pcm");
    write_raw_pcm(&input, &[0; 48]);
    let config = config_for(&dir.path().join("no-such-decoder"), AmplitudeMethod::Rms);

    let err = waveform_from_file(&input, &config).unwrap_err();
    assert!(matches!(err, WaveformError::ToolNotFound { .. }));
}
