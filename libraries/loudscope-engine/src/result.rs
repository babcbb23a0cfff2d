//! Analysis results handed back to the caller

use crate::series::LoudnessSeries;
use crate::units::{sentinel, PEAK_FLOOR_DB};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary of one analysis run
///
/// Loudness fields hold `f64::NEG_INFINITY` when nothing passed the gates.
/// Peak fields bottom out at -100 dB for digital silence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Gated program loudness in LUFS
    #[serde(rename = "integrated", with = "sentinel")]
    pub integrated_lufs: f64,

    /// Loudest short-term (3 s) value in LUFS
    #[serde(rename = "shortTermMax", with = "sentinel")]
    pub short_term_max_lufs: f64,

    /// Loudest momentary (400 ms) value in LUFS
    #[serde(with = "sentinel")]
    pub momentary_max_lufs: f64,

    /// Estimated inter-sample peak in dBTP
    #[serde(rename = "truePeak")]
    pub true_peak_dbtp: f64,

    /// Largest sample value in dBFS
    pub sample_peak_dbfs: f64,

    /// Spread of short-term loudness in LU
    #[serde(rename = "lra")]
    pub loudness_range_lu: f64,

    /// Length of the program in seconds
    #[serde(rename = "duration")]
    pub duration_seconds: f64,

    pub sample_rate: u32,

    pub channels: usize,
}

impl AnalysisResult {
    /// Whether no block passed the gates
    pub fn is_silent(&self) -> bool {
        self.integrated_lufs == f64::NEG_INFINITY
    }

    /// Whether the true peak would go over 0 dBTP with `gain_db` applied
    pub fn will_clip_at_gain(&self, gain_db: f64) -> bool {
        self.true_peak_dbtp + gain_db > 0.0
    }

    /// Largest gain that keeps the true peak at or below 0 dBTP
    pub fn max_safe_gain(&self) -> f64 {
        -self.true_peak_dbtp
    }

    /// Gain that brings the program to `target_lufs`, if it has a loudness
    pub fn gain_to_target(&self, target_lufs: f64) -> Option<f64> {
        if self.is_silent() {
            None
        } else {
            Some(target_lufs - self.integrated_lufs)
        }
    }
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self {
            integrated_lufs: f64::NEG_INFINITY,
            short_term_max_lufs: f64::NEG_INFINITY,
            momentary_max_lufs: f64::NEG_INFINITY,
            true_peak_dbtp: PEAK_FLOOR_DB,
            sample_peak_dbfs: PEAK_FLOOR_DB,
            loudness_range_lu: 0.0,
            duration_seconds: 0.0,
            sample_rate: 48000,
            channels: 2,
        }
    }
}

impl fmt::Display for AnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Integrated: {} LUFS, Short-term max: {} LUFS, Range: {:.1} LU, True Peak: {:.1} dBTP, Duration: {:.2} s",
            Level(self.integrated_lufs),
            Level(self.short_term_max_lufs),
            self.loudness_range_lu,
            self.true_peak_dbtp,
            self.duration_seconds
        )
    }
}

/// Formats a level with one decimal, or `-inf` for the silence sentinel
pub struct Level(pub f64);

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_finite() {
            write!(f, "{:.1}", self.0)
        } else {
            f.write_str("-inf")
        }
    }
}

/// Success payload of a run: the summary plus its time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoudnessReport {
    pub result: AnalysisResult,
    pub series: LoudnessSeries,
}
