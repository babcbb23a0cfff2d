//! Two-stage gated integration (integrated loudness)
//!
//! 1. Absolute gate: blocks at or below -70 LUFS are dropped.
//! 2. The mean power of the survivors gives the absolute-gated loudness.
//! 3. Relative gate: blocks more than 10 LU below that level are dropped.
//! 4. The mean power of what is left is the integrated loudness.
//!
//! The relative gate is applied once, as BS.1770 defines it; the threshold
//! is not re-estimated from its own survivors.

use crate::config::AnalysisConfig;
use crate::units::power_to_lufs;

/// Result of gating with the intermediate figures kept for logging
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateOutcome {
    /// Integrated loudness in LUFS, or the silence sentinel
    pub integrated_lufs: f64,
    /// Loudness of the blocks passing the absolute gate
    pub absolute_gated_lufs: f64,
    /// Threshold used by the relative gate
    pub relative_threshold_lufs: f64,
    /// Blocks passing the absolute gate
    pub above_absolute: usize,
    /// Blocks passing both gates
    pub above_relative: usize,
}

/// Gate momentary block powers into an integrated loudness
pub fn gate(block_powers: &[f64], config: &AnalysisConfig) -> GateOutcome {
    let absolute_gate = config.absolute_gate_lufs;

    let (abs_sum, above_absolute) = sum_and_count(
        block_powers
            .iter()
            .copied()
            .filter(|&p| power_to_lufs(p) > absolute_gate),
    );
    if above_absolute == 0 {
        return GateOutcome {
            integrated_lufs: f64::NEG_INFINITY,
            absolute_gated_lufs: f64::NEG_INFINITY,
            relative_threshold_lufs: f64::NEG_INFINITY,
            above_absolute: 0,
            above_relative: 0,
        };
    }

    let absolute_gated_lufs = power_to_lufs(abs_sum / above_absolute as f64);
    let relative_threshold_lufs = absolute_gated_lufs - config.relative_gate_lu;

    let (rel_sum, above_relative) = sum_and_count(block_powers.iter().copied().filter(|&p| {
        let lufs = power_to_lufs(p);
        lufs > absolute_gate && lufs >= relative_threshold_lufs
    }));

    let integrated_lufs = if above_relative == 0 {
        f64::NEG_INFINITY
    } else {
        power_to_lufs(rel_sum / above_relative as f64)
    };

    GateOutcome {
        integrated_lufs,
        absolute_gated_lufs,
        relative_threshold_lufs,
        above_absolute,
        above_relative,
    }
}

/// Integrated loudness of momentary block powers
pub fn integrated_loudness(block_powers: &[f64], config: &AnalysisConfig) -> f64 {
    gate(block_powers, config).integrated_lufs
}

fn sum_and_count(powers: impl Iterator<Item = f64>) -> (f64, usize) {
    powers.fold((0.0, 0), |(sum, n), p| (sum + p, n + 1))
}
