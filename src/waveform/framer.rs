//! Byte-to-sample conversion and frame boundary arithmetic.
//!
//! Two strategies live here. [`FrameReader`] pulls bounded chunks from any
//! reader and emits frames of a fixed sample count as soon as they fill, carrying
//! leftover samples across chunk boundaries. [`batch_frames`] works over a fully
//! decoded buffer and places each boundary at `round(i * samples_per_frame)`.
//! Both round half-to-even so they agree whenever a frame spans a whole number of
//! samples.
//!
//! When it does not (44.1 kHz at 1 ms is 44.1 samples) the modes diverge and the
//! gap grows with input length: stream mode yields `ceil(n / frame_size)` frames
//! of exactly `frame_size` samples, batch mode yields `ceil(n / spf)` frames. At
//! 44.1 kHz / 1 ms stream timestamps fall about 2.3 ms behind per second of
//! audio.

use std::io::{self, Read};

use super::{AmplitudeMethod, AudioFrame, DecoderConfig, Waveform};

/// Bytes in one PCM16LE sample.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Convert little-endian byte pairs into samples, dropping an odd trailing byte.
pub fn samples_from_le_bytes(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(BYTES_PER_SAMPLE)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Fractional number of samples covered by one frame.
pub fn samples_per_frame(sample_rate: u32, frame_duration_ms: u32) -> f64 {
    f64::from(sample_rate) * f64::from(frame_duration_ms) / 1000.0
}

/// Whole number of samples grouped into each streamed frame (at least one).
pub fn frame_size(sample_rate: u32, frame_duration_ms: u32) -> usize {
    (samples_per_frame(sample_rate, frame_duration_ms).round_ties_even() as usize).max(1)
}

/// Number of samples requested from the reader per internal chunk.
pub(crate) fn stream_chunk_samples(
    sample_rate: u32,
    frame_duration_ms: u32,
    stream_chunk_ms: u32,
) -> usize {
    let per_frame = samples_per_frame(sample_rate, frame_duration_ms);
    let scaled = per_frame * f64::from(stream_chunk_ms) / f64::from(frame_duration_ms.max(1));
    let chunk = scaled.round_ties_even() as usize;
    if chunk > 0 {
        return chunk;
    }
    let fallback = (f64::from(sample_rate) * f64::from(stream_chunk_ms) / 1000.0).round_ties_even();
    (fallback as usize).max(1)
}

/// Groups incoming samples into fixed-size frames, holding back a partial tail.
#[derive(Debug, Clone)]
pub struct SampleFramer {
    frame_size: usize,
    buffer: Vec<i16>,
    offset: usize,
}

impl SampleFramer {
    /// Create a framer emitting frames of `frame_size` samples (minimum 1).
    pub fn new(frame_size: usize) -> Self {
        Self {
            frame_size: frame_size.max(1),
            buffer: Vec::new(),
            offset: 0,
        }
    }

    /// Samples per full frame.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Samples received but not yet handed out as a frame.
    pub fn pending(&self) -> usize {
        self.buffer.len() - self.offset
    }

    /// Append a chunk of raw bytes after any leftover samples.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.compact();
        self.buffer.extend(
            bytes
                .chunks_exact(BYTES_PER_SAMPLE)
                .map(|pair| i16::from_le_bytes([pair[0], pair[1]])),
        );
    }

    /// Append already-decoded samples after any leftover samples.
    pub fn push_samples(&mut self, samples: &[i16]) {
        self.compact();
        self.buffer.extend_from_slice(samples);
    }

    /// Next complete frame, if enough samples have accumulated.
    pub fn next_frame(&mut self) -> Option<&[i16]> {
        if self.pending() < self.frame_size {
            return None;
        }
        let start = self.offset;
        self.offset += self.frame_size;
        Some(&self.buffer[start..self.offset])
    }

    /// Drain the leftover samples as a final, possibly short, frame.
    pub fn finish(&mut self) -> Option<Vec<i16>> {
        if self.pending() == 0 {
            return None;
        }
        let rest = self.buffer.split_off(self.offset);
        self.buffer.clear();
        self.offset = 0;
        Some(rest)
    }

    fn compact(&mut self) {
        if self.offset > 0 {
            self.buffer.drain(..self.offset);
            self.offset = 0;
        }
    }
}

/// Lazily turns a PCM16LE byte stream into timestamped amplitude frames.
///
/// Reads block only when no complete frame is buffered. The final partial frame
/// is emitted rather than dropped. After an I/O error the reader yields nothing
/// further.
pub struct FrameReader<R> {
    reader: R,
    method: AmplitudeMethod,
    frame_duration_ms: u64,
    framer: SampleFramer,
    chunk: Vec<u8>,
    next_timestamp_ms: u64,
    exhausted: bool,
}

impl<R: Read> FrameReader<R> {
    /// Frame `reader` using the rate, resolution and method of `config`.
    pub fn new(reader: R, config: &DecoderConfig) -> Self {
        let chunk_samples = stream_chunk_samples(
            config.sample_rate(),
            config.frame_duration_ms(),
            config.stream_chunk_ms(),
        );
        Self {
            reader,
            method: config.amplitude_method(),
            frame_duration_ms: u64::from(config.frame_duration_ms()),
            framer: SampleFramer::new(frame_size(
                config.sample_rate(),
                config.frame_duration_ms(),
            )),
            chunk: vec![0; chunk_samples * BYTES_PER_SAMPLE],
            next_timestamp_ms: 0,
            exhausted: false,
        }
    }

    /// Bytes requested from the reader per chunk.
    pub fn chunk_len(&self) -> usize {
        self.chunk.len()
    }

    pub(crate) fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    fn stamp(&mut self, amplitude: f32) -> AudioFrame {
        let frame = AudioFrame {
            timestamp_ms: self.next_timestamp_ms,
            amplitude,
        };
        self.next_timestamp_ms += self.frame_duration_ms;
        frame
    }
}

impl<R: Read> Iterator for FrameReader<R> {
    type Item = io::Result<AudioFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let method = self.method;
            if let Some(amplitude) = self.framer.next_frame().map(|frame| method.measure(frame)) {
                return Some(Ok(self.stamp(amplitude)));
            }
            if self.exhausted {
                return None;
            }
            match fill_chunk(&mut self.reader, &mut self.chunk) {
                Ok(0) => {
                    self.exhausted = true;
                    let amplitude = self.framer.finish().map(|rest| method.measure(&rest))?;
                    return Some(Ok(self.stamp(amplitude)));
                }
                Ok(read) => {
                    // Only the last chunk of a stream can be short, so a dropped odd byte
                    // never misaligns the samples that follow.
                    let chunk = &self.chunk[..read];
                    self.framer.push_bytes(chunk);
                }
                Err(err) => {
                    self.exhausted = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

/// Read until `buf` is full or the reader reports end of stream.
fn fill_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(read) => filled += read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

/// Compute every frame of a fully decoded buffer by index arithmetic.
///
/// Produces `ceil(len / samples_per_frame)` frames; frame `i` spans
/// `round(i * spf)..round((i + 1) * spf)`, clipped to the buffer.
pub fn batch_frames(
    samples: &[i16],
    sample_rate: u32,
    frame_duration_ms: u32,
    method: AmplitudeMethod,
) -> Waveform {
    if samples.is_empty() {
        return Waveform::default();
    }
    let per_frame = samples_per_frame(sample_rate, frame_duration_ms);
    let total_frames = (samples.len() as f64 / per_frame).ceil() as usize;
    let step_ms = u64::from(frame_duration_ms);

    let mut timestamps_ms = Vec::with_capacity(total_frames);
    let mut amplitudes = Vec::with_capacity(total_frames);
    for index in 0..total_frames {
        let start = (index as f64 * per_frame).round_ties_even() as usize;
        let end = ((index + 1) as f64 * per_frame).round_ties_even() as usize;
        let block = samples
            .get(start.min(samples.len())..end.min(samples.len()))
            .unwrap_or(&[]);
        timestamps_ms.push(index as u64 * step_ms);
        amplitudes.push(method.measure(block));
    }
    Waveform {
        timestamps_ms,
        amplitudes,
    }
}
