//! Loudness time series for scrubbing and plotting

use crate::units::sentinel;
use serde::{Deserialize, Serialize};

/// Loudness values (LUFS) on a fixed time grid
///
/// Value `k` belongs to the block starting at `k * step_seconds`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSeries {
    #[serde(with = "sentinel::vec")]
    pub values: Vec<f64>,
    #[serde(rename = "stepTime")]
    pub step_seconds: f64,
}

impl BlockSeries {
    pub fn new(values: Vec<f64>, step_seconds: f64) -> Self {
        Self {
            values,
            step_seconds,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Loudest value, or the silence sentinel for an empty series
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Start time of block `index` in seconds
    pub fn time_of(&self, index: usize) -> f64 {
        index as f64 * self.step_seconds
    }

    /// Value of the block covering `seconds`, if any
    pub fn at_time(&self, seconds: f64) -> Option<f64> {
        if seconds.is_nan() || seconds < 0.0 || self.step_seconds <= 0.0 {
            return None;
        }
        self.values
            .get((seconds / self.step_seconds) as usize)
            .copied()
    }

    /// Reduce to at most `max_points` values
    ///
    /// Each output value is the loudest block of its bucket so short peaks
    /// survive the reduction; the step grows by the bucket size.
    pub fn downsample(&self, max_points: usize) -> Self {
        if max_points == 0 || self.values.len() <= max_points {
            return self.clone();
        }

        let bucket = self.values.len().div_ceil(max_points);
        let values = self
            .values
            .chunks(bucket)
            .map(|chunk| chunk.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .collect();

        Self {
            values,
            step_seconds: self.step_seconds * bucket as f64,
        }
    }
}

/// Momentary and short-term series of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoudnessSeries {
    #[serde(with = "sentinel::vec")]
    pub momentary: Vec<f64>,
    #[serde(with = "sentinel::vec")]
    pub short_term: Vec<f64>,
    #[serde(rename = "stepTime")]
    pub step_seconds: f64,
}

impl LoudnessSeries {
    pub fn new(momentary: BlockSeries, short_term: BlockSeries) -> Self {
        debug_assert_eq!(momentary.len(), short_term.len());
        Self {
            step_seconds: momentary.step_seconds,
            momentary: momentary.values,
            short_term: short_term.values,
        }
    }

    pub fn len(&self) -> usize {
        self.momentary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.momentary.is_empty()
    }

    /// Reduce both series to at most `max_points` values each
    pub fn downsample(&self, max_points: usize) -> Self {
        let momentary = BlockSeries::new(self.momentary.clone(), self.step_seconds);
        let short_term = BlockSeries::new(self.short_term.clone(), self.step_seconds);
        Self::new(
            momentary.downsample(max_points),
            short_term.downsample(max_points),
        )
    }
}
