//! Analysis settings
//!
//! Every field has a BS.1770 default, so an empty TOML table or an empty
//! environment deserializes to the standard measurement.

use crate::error::{LoudnessError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Momentary integration window
    #[serde(default = "default_momentary_window_ms")]
    pub momentary_window_ms: u32,

    /// Distance between consecutive blocks
    #[serde(default = "default_hop_ms")]
    pub hop_ms: u32,

    /// Number of momentary blocks averaged into one short-term value
    #[serde(default = "default_short_term_blocks")]
    pub short_term_blocks: usize,

    /// Blocks at or below this loudness never count
    #[serde(default = "default_absolute_gate_lufs")]
    pub absolute_gate_lufs: f64,

    /// Blocks further than this below the absolute-gated loudness are dropped
    #[serde(default = "default_relative_gate_lu")]
    pub relative_gate_lu: f64,

    /// Short-term values at or below this are left out of the loudness range
    #[serde(default = "default_lra_floor_lufs")]
    pub lra_floor_lufs: f64,

    #[serde(default = "default_lra_low_percentile")]
    pub lra_low_percentile: f64,

    #[serde(default = "default_lra_high_percentile")]
    pub lra_high_percentile: f64,

    /// Linear sample level above which true peak is refined by interpolation
    #[serde(default = "default_true_peak_refine_threshold")]
    pub true_peak_refine_threshold: f32,

    /// Frames filtered between progress reports and cancellation checks
    #[serde(default = "default_progress_chunk_frames")]
    pub progress_chunk_frames: usize,

    /// Cap on the number of points in the returned time series
    #[serde(default)]
    pub max_series_points: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            momentary_window_ms: default_momentary_window_ms(),
            hop_ms: default_hop_ms(),
            short_term_blocks: default_short_term_blocks(),
            absolute_gate_lufs: default_absolute_gate_lufs(),
            relative_gate_lu: default_relative_gate_lu(),
            lra_floor_lufs: default_lra_floor_lufs(),
            lra_low_percentile: default_lra_low_percentile(),
            lra_high_percentile: default_lra_high_percentile(),
            true_peak_refine_threshold: default_true_peak_refine_threshold(),
            progress_chunk_frames: default_progress_chunk_frames(),
            max_series_points: None,
        }
    }
}

impl AnalysisConfig {
    /// Check that the settings describe a usable measurement
    pub fn validate(&self) -> Result<()> {
        if self.momentary_window_ms == 0 {
            return Err(invalid("momentary_window_ms must be positive"));
        }
        if self.hop_ms == 0 {
            return Err(invalid("hop_ms must be positive"));
        }
        if self.hop_ms > self.momentary_window_ms {
            return Err(invalid(format!(
                "hop_ms ({}) must not exceed momentary_window_ms ({})",
                self.hop_ms, self.momentary_window_ms
            )));
        }
        if self.short_term_blocks == 0 {
            return Err(invalid("short_term_blocks must be positive"));
        }
        if !self.absolute_gate_lufs.is_finite() || !self.lra_floor_lufs.is_finite() {
            return Err(invalid("gate levels must be finite"));
        }
        if !(self.relative_gate_lu.is_finite() && self.relative_gate_lu >= 0.0) {
            return Err(invalid("relative_gate_lu must be a non-negative number"));
        }
        let percentiles = 0.0..1.0;
        if !percentiles.contains(&self.lra_low_percentile)
            || !percentiles.contains(&self.lra_high_percentile)
            || self.lra_low_percentile >= self.lra_high_percentile
        {
            return Err(invalid(format!(
                "LRA percentiles must satisfy 0 <= low < high < 1 (got {} and {})",
                self.lra_low_percentile, self.lra_high_percentile
            )));
        }
        if !(self.true_peak_refine_threshold.is_finite() && self.true_peak_refine_threshold >= 0.0)
        {
            return Err(invalid("true_peak_refine_threshold must be non-negative"));
        }
        if self.progress_chunk_frames == 0 {
            return Err(invalid("progress_chunk_frames must be positive"));
        }
        if self.max_series_points == Some(0) {
            return Err(invalid("max_series_points must be positive when set"));
        }
        Ok(())
    }

    /// Momentary window length in samples
    pub fn window_samples(&self, sample_rate: u32) -> usize {
        ms_to_samples(self.momentary_window_ms, sample_rate)
    }

    /// Hop length in samples
    pub fn hop_samples(&self, sample_rate: u32) -> usize {
        ms_to_samples(self.hop_ms, sample_rate)
    }
}

fn ms_to_samples(ms: u32, sample_rate: u32) -> usize {
    // Round to the nearest sample; never collapse to zero
    let samples = (u64::from(ms) * u64::from(sample_rate) + 500) / 1000;
    (samples as usize).max(1)
}

fn invalid(message: impl Into<String>) -> LoudnessError {
    LoudnessError::InvalidConfig(message.into())
}

// Default values
fn default_momentary_window_ms() -> u32 {
    400
}

fn default_hop_ms() -> u32 {
    100
}

fn default_short_term_blocks() -> usize {
    30
}

fn default_absolute_gate_lufs() -> f64 {
    -70.0
}

fn default_relative_gate_lu() -> f64 {
    10.0
}

fn default_lra_floor_lufs() -> f64 {
    -70.0
}

fn default_lra_low_percentile() -> f64 {
    0.10
}

fn default_lra_high_percentile() -> f64 {
    0.95
}

fn default_true_peak_refine_threshold() -> f32 {
    0.5
}

fn default_progress_chunk_frames() -> usize {
    65536
}
