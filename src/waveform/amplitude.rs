use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::WaveformError;

/// Largest positive signed 16-bit magnitude; amplitudes are normalized against it.
pub const FULL_SCALE: f32 = 32_767.0;

/// Metric used to reduce one frame of samples to a single amplitude.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmplitudeMethod {
    /// Root-mean-square energy of the frame.
    #[default]
    Rms,
    /// Largest absolute sample in the frame.
    Peak,
}

impl AmplitudeMethod {
    /// Reduce `samples` to a normalized amplitude in `[0.0, 1.0]`.
    ///
    /// Empty frames measure `0.0` under both methods.
    pub fn measure(self, samples: &[i16]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let value = match self {
            Self::Rms => rms(samples),
            Self::Peak => peak(samples),
        };
        // i16::MIN is one step past FULL_SCALE.
        value.min(1.0)
    }

    /// Lowercase name used in config files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rms => "rms",
            Self::Peak => "peak",
        }
    }
}

impl fmt::Display for AmplitudeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmplitudeMethod {
    type Err = WaveformError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rms" => Ok(Self::Rms),
            "peak" => Ok(Self::Peak),
            other => Err(WaveformError::invalid(format!(
                "unknown amplitude method `{other}`; choose `rms` or `peak`"
            ))),
        }
    }
}

fn rms(samples: &[i16]) -> f32 {
    let sum_squares: f64 = samples
        .iter()
        .map(|&sample| {
            let value = f64::from(sample);
            value * value
        })
        .sum();
    let mean = sum_squares / samples.len() as f64;
    (mean.sqrt() / f64::from(FULL_SCALE)) as f32
}

fn peak(samples: &[i16]) -> f32 {
    let max = samples
        .iter()
        .map(|sample| sample.unsigned_abs())
        .max()
        .unwrap_or(0);
    f32::from(max) / FULL_SCALE
}
