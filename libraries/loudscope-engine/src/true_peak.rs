//! Approximate true-peak estimation
//!
//! Two passes over the raw (unweighted) samples:
//!
//! 1. Sample peak: the largest absolute sample of any channel.
//! 2. Refinement, only when the sample peak is above the threshold
//!    (0.5, about -6 dBFS): around every sample above the threshold the
//!    waveform is evaluated half a sample to either side with a 4-point
//!    Catmull-Rom spline.
//!
//! This stands in for 4x oversampling at a fraction of the cost. Against a
//! polyphase oversampler it typically reads a few tenths of a dB low on
//! program material and can miss more on content close to Nyquist. It is
//! meant for interactive feedback, not for certification.

use serde::{Deserialize, Serialize};

/// Linear peak levels of one program
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PeakMeasurement {
    /// Largest absolute sample value
    pub sample_peak: f64,
    /// Largest value after inter-sample refinement, never below `sample_peak`
    pub true_peak: f64,
}

/// Largest absolute sample across all channels
pub fn sample_peak(channels: &[Vec<f32>]) -> f32 {
    channels
        .iter()
        .flat_map(|channel| channel.iter())
        .fold(0.0_f32, |peak, &s| peak.max(s.abs()))
}

/// Catmull-Rom value halfway between `p1` and `p2`
#[inline]
pub fn catmull_rom_midpoint(p0: f32, p1: f32, p2: f32, p3: f32) -> f32 {
    (-p0 + 9.0 * p1 + 9.0 * p2 - p3) / 16.0
}

/// Measure sample and true peak of all channels
pub fn measure(channels: &[Vec<f32>], refine_threshold: f32) -> PeakMeasurement {
    let sample = sample_peak(channels);
    let mut peak = sample;

    if sample > refine_threshold {
        for channel in channels {
            peak = peak.max(refine_channel(channel, refine_threshold));
        }
    }

    PeakMeasurement {
        sample_peak: f64::from(sample),
        true_peak: f64::from(peak),
    }
}

fn refine_channel(samples: &[f32], threshold: f32) -> f32 {
    let n = samples.len();
    if n < 2 {
        return 0.0;
    }

    // Edges repeat the first / last sample
    let at = |i: isize| -> f32 {
        let clamped = i.clamp(0, n as isize - 1) as usize;
        samples[clamped]
    };

    let mut peak = 0.0_f32;
    for (i, &s) in samples.iter().enumerate() {
        if s.abs() <= threshold {
            continue;
        }
        let i = i as isize;
        // Between i-1 and i
        if i > 0 {
            let before = catmull_rom_midpoint(at(i - 2), at(i - 1), at(i), at(i + 1));
            peak = peak.max(before.abs());
        }
        // Between i and i+1
        if i + 1 < n as isize {
            let after = catmull_rom_midpoint(at(i - 1), at(i), at(i + 1), at(i + 2));
            peak = peak.max(after.abs());
        }
    }
    peak
}
