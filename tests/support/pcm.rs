use std::path::Path;

/// Write raw mono PCM16LE, the same bytes the decoder puts on its stdout.
pub fn write_raw_pcm(path: &Path, samples: &[i16]) {
    let bytes: Vec<u8> = samples.iter().flat_map(|sample| sample.to_le_bytes()).collect();
    std::fs::write(path, bytes).expect("write raw pcm");
}

/// Write a mono 16-bit WAV file for the real decoder.
pub fn write_test_wav(path: &Path, sample_rate: u32, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav writer");
    for &sample in samples {
        writer.write_sample(sample).expect("write wav sample");
    }
    writer.finalize().expect("finalize wav");
}

/// `len` samples of a sine wave at `freq_hz` and `amplitude` (0..1 of full scale).
pub fn sine(sample_rate: u32, freq_hz: f64, amplitude: f64, len: usize) -> Vec<i16> {
    (0..len)
        .map(|idx| {
            let phase = 2.0 * std::f64::consts::PI * freq_hz * idx as f64 / sample_rate as f64;
            (phase.sin() * amplitude * f64::from(i16::MAX)).round() as i16
        })
        .collect()
}
