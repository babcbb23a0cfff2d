//! Short-term loudness: rolling average of the last 30 momentary blocks
//!
//! One output per momentary block. The average is causal, so the first 29
//! outputs average over however many blocks exist so far; that growing
//! window at the start of the program is intentional.

use crate::error::{LoudnessError, Result};
use crate::series::BlockSeries;
use crate::units::{lufs_to_power, power_to_lufs};

/// Average momentary loudness over `blocks` consecutive blocks
///
/// # Errors
/// Returns [`LoudnessError::Allocation`] if the output cannot be allocated
pub fn aggregate(momentary: &BlockSeries, blocks: usize) -> Result<BlockSeries> {
    let blocks = blocks.max(1);
    let mut powers = Vec::new();
    powers
        .try_reserve_exact(momentary.values.len())
        .map_err(|e| LoudnessError::allocation("short-term aggregation", e))?;
    powers.extend(momentary.values.iter().map(|&l| lufs_to_power(l)));

    let mut values = Vec::new();
    values
        .try_reserve_exact(powers.len())
        .map_err(|e| LoudnessError::allocation("short-term aggregation", e))?;

    let mut sum = 0.0_f64;
    for (i, &p) in powers.iter().enumerate() {
        sum += p;
        if i >= blocks {
            sum -= powers[i - blocks];
        }
        sum = sum.max(0.0);

        let len = (i + 1).min(blocks);
        values.push(power_to_lufs(sum / len as f64));
    }

    Ok(BlockSeries::new(values, momentary.step_seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_cardinality() {
        let momentary = BlockSeries::new(vec![-20.0; 75], 0.1);
        let short = aggregate(&momentary, 30).unwrap();
        assert_eq!(short.len(), 75);
        assert_eq!(short.step_seconds, 0.1);
        for &v in &short.values {
            assert!((v - -20.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_growing_window_at_start() {
        // One loud block followed by silence
        let mut values = vec![f64::NEG_INFINITY; 40];
        values[0] = -10.0;
        let short = aggregate(&BlockSeries::new(values, 0.1), 30).unwrap();

        // Output i averages i + 1 blocks while the window is still filling
        for i in 0..30 {
            let expected = -10.0 - 10.0 * ((i + 1) as f64).log10();
            assert!(
                (short.values[i] - expected).abs() < 1e-9,
                "block {}: {} vs {}",
                i,
                short.values[i],
                expected
            );
        }
        // Once the loud block has left the window only silence remains
        assert_eq!(short.values[30], f64::NEG_INFINITY);
        assert_eq!(short.values[39], f64::NEG_INFINITY);
    }

    #[test]
    fn test_empty_series() {
        let short = aggregate(&BlockSeries::new(Vec::new(), 0.1), 30).unwrap();
        assert!(short.is_empty());
    }
}
