//! Loudness range (LRA) from short-term values
//!
//! A deliberately simple estimator: short-term values above a fixed floor
//! are sorted and the spread between two percentiles is reported. There is
//! no relative gate as in EBU Tech 3342.

use crate::config::AnalysisConfig;
use crate::error::{LoudnessError, Result};

/// Loudness range in LU; 0 when fewer than two values qualify
///
/// # Errors
/// Returns [`LoudnessError::Allocation`] if the working copy cannot be allocated
pub fn loudness_range(short_term: &[f64], config: &AnalysisConfig) -> Result<f64> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(short_term.len())
        .map_err(|e| LoudnessError::allocation("loudness range", e))?;
    values.extend(
        short_term
            .iter()
            .copied()
            .filter(|&v| v > config.lra_floor_lufs),
    );

    if values.len() < 2 {
        return Ok(0.0);
    }

    values.sort_by(f64::total_cmp);

    let low = values[percentile_index(values.len(), config.lra_low_percentile)];
    let high = values[percentile_index(values.len(), config.lra_high_percentile)];
    Ok(high - low)
}

fn percentile_index(n: usize, percentile: f64) -> usize {
    ((n as f64 * percentile).floor() as usize).min(n - 1)
}
