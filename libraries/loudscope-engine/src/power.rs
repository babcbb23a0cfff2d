//! Channel power combining
//!
//! `power[i] = Σ_c weight(c) · x_c[i]²` over the K-weighted channels.

use crate::channel::ChannelPosition;
use crate::error::{LoudnessError, Result};

/// Per-sample combined power, same length as the input channels
pub type PowerSeries = Vec<f64>;

/// Combine weighted channels into one power series
///
/// Channels are zipped with `layout`; the series is as long as the
/// shortest channel, which after validation is every channel.
///
/// # Errors
/// Returns [`LoudnessError::Allocation`] if the series cannot be allocated
pub fn combine(weighted: &[Vec<f32>], layout: &[ChannelPosition]) -> Result<PowerSeries> {
    let frames = weighted.iter().map(Vec::len).min().unwrap_or(0);

    let mut power = PowerSeries::new();
    power
        .try_reserve_exact(frames)
        .map_err(|e| LoudnessError::allocation("power combining", e))?;
    power.resize(frames, 0.0);

    for (channel, position) in weighted.iter().zip(layout) {
        let weight = position.weight();
        if weight == 0.0 {
            continue;
        }
        for (acc, &x) in power.iter_mut().zip(channel) {
            let x = f64::from(x);
            *acc += weight * x * x;
        }
    }

    Ok(power)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::SURROUND_WEIGHT;

    #[test]
    fn test_stereo_sum() {
        let layout = ChannelPosition::default_layout(2);
        let power = combine(&[vec![0.5, 0.0, 1.0], vec![0.5, 1.0, -1.0]], &layout).unwrap();
        assert_eq!(power, vec![0.5, 1.0, 2.0]);
    }

    #[test]
    fn test_surround_weighting_and_lfe_exclusion() {
        let layout = ChannelPosition::default_layout(6);
        // Only LFE (index 3) and Ls (index 4) carry signal
        let mut channels = vec![vec![0.0_f32; 2]; 6];
        channels[3] = vec![1.0, 1.0];
        channels[4] = vec![0.5, 0.0];

        let power = combine(&channels, &layout).unwrap();
        assert!((power[0] - SURROUND_WEIGHT * 0.25).abs() < 1e-12);
        assert_eq!(power[1], 0.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(combine(&[], &[]).unwrap().is_empty());
    }
}
