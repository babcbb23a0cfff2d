//! Momentary loudness: sliding 400 ms window, 100 ms hop
//!
//! The window sum is maintained incrementally. Each hop subtracts the
//! samples leaving the window and adds the samples entering it, so the whole
//! pass is O(N) regardless of window length.
//!
//! Block `k` covers `[k·hop, k·hop + window)` for
//! `k < floor((N − window) / hop)`.

use crate::error::{LoudnessError, Result};
use crate::series::BlockSeries;
use crate::units::power_to_lufs;

/// Output of the momentary pass
#[derive(Debug, Clone, PartialEq)]
pub struct MomentaryBlocks {
    /// Mean-square power of every block, for gating
    pub powers: Vec<f64>,
    /// Loudness of every block in LUFS
    pub series: BlockSeries,
}

/// Number of blocks produced for `frames` samples
pub fn block_count(frames: usize, window: usize, hop: usize) -> usize {
    if hop == 0 || frames <= window {
        return 0;
    }
    (frames - window) / hop
}

/// Integrate a power series into momentary blocks
///
/// # Errors
/// Returns [`LoudnessError::Allocation`] if the block vectors cannot be
/// allocated
pub fn integrate(
    power: &[f64],
    window: usize,
    hop: usize,
    sample_rate: u32,
) -> Result<MomentaryBlocks> {
    let count = block_count(power.len(), window, hop);
    let step_seconds = hop as f64 / f64::from(sample_rate);

    let mut powers = Vec::new();
    let mut values = Vec::new();
    powers
        .try_reserve_exact(count)
        .and_then(|()| values.try_reserve_exact(count))
        .map_err(|e| LoudnessError::allocation("momentary integration", e))?;

    if count > 0 {
        let mut sum: f64 = power[..window].iter().sum();

        for k in 0..count {
            let mean_square = sum / window as f64;
            powers.push(mean_square.max(0.0));
            values.push(power_to_lufs(mean_square));

            let start = k * hop;
            let leaving: f64 = power[start..start + hop].iter().sum();
            let entering: f64 = power[start + window..start + window + hop].iter().sum();
            // Cancellation can leave a tiny negative residue after loud passages
            sum = (sum - leaving + entering).max(0.0);
        }
    }

    Ok(MomentaryBlocks {
        powers,
        series: BlockSeries::new(values, step_seconds),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_count() {
        assert_eq!(block_count(0, 400, 100), 0);
        assert_eq!(block_count(400, 400, 100), 0);
        assert_eq!(block_count(499, 400, 100), 0);
        assert_eq!(block_count(500, 400, 100), 1);
        assert_eq!(block_count(1000, 400, 100), 6);
        assert_eq!(block_count(48000, 19200, 4800), 6);
    }

    #[test]
    fn test_constant_power() {
        let blocks = integrate(&vec![0.01; 1000], 400, 100, 1000).unwrap();
        assert_eq!(blocks.series.len(), 6);
        assert_eq!(blocks.powers.len(), 6);
        for (&p, &l) in blocks.powers.iter().zip(&blocks.series.values) {
            assert!((p - 0.01).abs() < 1e-12);
            assert!((l - -20.691).abs() < 1e-9);
        }
        assert!((blocks.series.step_seconds - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_matches_direct_sum() {
        let power: Vec<f64> = (0..2000).map(|i| ((i * 37) % 101) as f64 / 100.0).collect();
        let blocks = integrate(&power, 400, 100, 1000).unwrap();

        for (k, &p) in blocks.powers.iter().enumerate() {
            let direct: f64 = power[k * 100..k * 100 + 400].iter().sum::<f64>() / 400.0;
            assert!((p - direct).abs() < 1e-9, "block {}: {} vs {}", k, p, direct);
        }
    }

    #[test]
    fn test_silence_is_sentinel() {
        let blocks = integrate(&vec![0.0; 1000], 400, 100, 1000).unwrap();
        assert!(blocks
            .series
            .values
            .iter()
            .all(|&l| l == f64::NEG_INFINITY));
    }

    #[test]
    fn test_running_sum_never_negative_after_loud_burst() {
        // A huge burst followed by near silence stresses the subtraction
        let mut power = vec![1e6; 400];
        power.extend(std::iter::repeat(1e-12).take(2000));
        let blocks = integrate(&power, 400, 100, 1000).unwrap();
        assert!(blocks.powers.iter().all(|&p| p >= 0.0));
        assert!(blocks.series.values.iter().all(|l| !l.is_nan()));
    }

    #[test]
    fn test_short_input_has_no_blocks() {
        let blocks = integrate(&[0.5; 300], 400, 100, 1000).unwrap();
        assert!(blocks.series.is_empty());
        assert!(blocks.powers.is_empty());
    }
}
