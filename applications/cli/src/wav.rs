/// WAV input and calibration tone output
use crate::error::{CliError, Result};
use loudscope_engine::SampleBuffer;
use std::path::Path;
use tracing::debug;

/// Decode a WAV file into a validated-shape sample buffer
///
/// Integer formats are scaled to [-1, 1) by their bit depth.
pub fn read_wav(path: &Path) -> Result<SampleBuffer> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    debug!(
        path = %path.display(),
        channels,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        "Decoding WAV"
    );

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => {
            if spec.bits_per_sample != 32 {
                return Err(CliError::UnsupportedFormat(format!(
                    "{}-bit float",
                    spec.bits_per_sample
                )));
            }
            reader
                .into_samples::<f32>()
                .collect::<std::result::Result<Vec<f32>, _>>()?
        }
        hound::SampleFormat::Int => {
            let bits = spec.bits_per_sample;
            if bits == 0 || bits > 32 {
                return Err(CliError::UnsupportedFormat(format!("{}-bit integer", bits)));
            }
            let max_val = (1i64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_val))
                .collect::<std::result::Result<Vec<f32>, _>>()?
        }
    };

    Ok(SampleBuffer::from_interleaved(
        &samples,
        channels,
        spec.sample_rate,
    )?)
}

/// Parameters of a calibration sine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub frequency_hz: f64,
    /// Peak level; 0 dBFS is a full-scale sine
    pub level_dbfs: f64,
    pub seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

impl ToneSpec {
    pub fn amplitude(&self) -> f64 {
        10.0_f64.powf(self.level_dbfs / 20.0)
    }

    pub fn frames(&self) -> usize {
        (self.seconds * f64::from(self.sample_rate)).round() as usize
    }

    fn validate(&self) -> Result<()> {
        let nyquist = f64::from(self.sample_rate) / 2.0;
        if !(self.frequency_hz > 0.0 && self.frequency_hz < nyquist) {
            return Err(CliError::InvalidTone(format!(
                "frequency must be between 0 and {} Hz",
                nyquist
            )));
        }
        if !(self.level_dbfs.is_finite() && self.level_dbfs <= 0.0) {
            return Err(CliError::InvalidTone("level must be at or below 0 dBFS".into()));
        }
        if !(self.seconds.is_finite() && self.seconds > 0.0) {
            return Err(CliError::InvalidTone("duration must be positive".into()));
        }
        if self.channels == 0 {
            return Err(CliError::InvalidTone("at least one channel is required".into()));
        }
        Ok(())
    }
}

/// Write a sine with the same signal on every channel as 32-bit float WAV
pub fn write_tone(path: &Path, tone: &ToneSpec) -> Result<()> {
    tone.validate()?;

    let spec = hound::WavSpec {
        channels: tone.channels,
        sample_rate: tone.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;

    let amplitude = tone.amplitude();
    let step = 2.0 * std::f64::consts::PI * tone.frequency_hz / f64::from(tone.sample_rate);
    for i in 0..tone.frames() {
        let sample = (amplitude * (step * i as f64).sin()) as f32;
        for _ in 0..tone.channels {
            writer.write_sample(sample)?;
        }
    }
    writer.finalize()?;

    debug!(path = %path.display(), frames = tone.frames(), "Tone written");
    Ok(())
}
