//! Sequential analysis pipeline
//!
//! ```text
//! SampleBuffer ─► K-weighting ─► power ─► momentary ─► short-term ─► LRA
//!      │                                      │
//!      │                                      └──────► gating ─► integrated
//!      └──────────────► true peak
//! ```
//!
//! Every run allocates its own scratch buffers and drops them before
//! returning, so two runs over the same input give identical results.

use crate::buffer::SampleBuffer;
use crate::config::AnalysisConfig;
use crate::error::{LoudnessError, Result};
use crate::gating;
use crate::kweighting::KWeighting;
use crate::momentary;
use crate::power;
use crate::progress::{CancelFlag, NoProgress, ProgressSink, ProgressTracker};
use crate::range;
use crate::result::{AnalysisResult, LoudnessReport};
use crate::series::LoudnessSeries;
use crate::short_term;
use crate::true_peak;
use crate::units::peak_to_db;
use std::time::Instant;
use tracing::{debug, info};

// Progress checkpoints (percent) at the end of each stage
const WEIGHTING_DONE: u8 = 60;
const POWER_DONE: u8 = 70;
const MOMENTARY_DONE: u8 = 80;
const SHORT_TERM_DONE: u8 = 85;
const GATING_DONE: u8 = 90;
const RANGE_DONE: u8 = 93;
const TRUE_PEAK_DONE: u8 = 98;

/// Loudness measurement engine
///
/// # Example
///
/// ```
/// use loudscope_engine::{AnalysisConfig, LoudnessEngine, SampleBuffer};
///
/// let tone: Vec<f32> = (0..48000)
///     .map(|i| 0.1 * (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 48000.0).sin())
///     .collect();
/// let buffer = SampleBuffer::new(vec![tone], 48000);
///
/// let engine = LoudnessEngine::new(AnalysisConfig::default()).unwrap();
/// let report = engine.analyze_simple(&buffer).unwrap();
/// assert!((report.result.integrated_lufs - -23.0).abs() < 0.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LoudnessEngine {
    config: AnalysisConfig,
}

impl LoudnessEngine {
    /// Create an engine with validated settings
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze without progress reporting or cancellation
    pub fn analyze_simple(&self, buffer: &SampleBuffer) -> Result<LoudnessReport> {
        self.analyze(buffer, &mut NoProgress, &CancelFlag::new())
    }

    /// Run the full pipeline over `buffer`
    ///
    /// Input is validated before any stage runs. Progress only moves forward
    /// and reaches 100 exactly when a report is returned.
    ///
    /// # Errors
    /// Input errors, [`LoudnessError::Cancelled`] when `cancel` is raised,
    /// or [`LoudnessError::Allocation`] naming the stage that ran out of
    /// memory. No partial result is returned in any of these cases.
    pub fn analyze(
        &self,
        buffer: &SampleBuffer,
        progress: &mut dyn ProgressSink,
        cancel: &CancelFlag,
    ) -> Result<LoudnessReport> {
        buffer.validate()?;

        let config = &self.config;
        let sample_rate = buffer.sample_rate();
        let frames = buffer.frames();
        let started = Instant::now();
        let mut progress = ProgressTracker::new(progress);
        progress.set(0);

        debug!(
            sample_rate,
            channels = buffer.channel_count(),
            frames,
            "Starting loudness analysis"
        );

        // Stage 1: K-weighting
        let stage = Instant::now();
        let weighted = self.weight_channels(buffer, &mut progress, cancel)?;
        progress.set(WEIGHTING_DONE);
        debug!(elapsed_ms = stage.elapsed().as_millis(), "K-weighting done");
        check_cancelled(cancel)?;

        // Stage 2: channel power
        let stage = Instant::now();
        let power = power::combine(&weighted, buffer.layout())?;
        drop(weighted);
        progress.set(POWER_DONE);
        debug!(elapsed_ms = stage.elapsed().as_millis(), "Power combining done");
        check_cancelled(cancel)?;

        // Stage 3: momentary blocks
        let stage = Instant::now();
        let window = config.window_samples(sample_rate);
        let hop = config.hop_samples(sample_rate);
        let blocks = momentary::integrate(&power, window, hop, sample_rate)?;
        drop(power);
        progress.set(MOMENTARY_DONE);
        debug!(
            elapsed_ms = stage.elapsed().as_millis(),
            blocks = blocks.series.len(),
            "Momentary integration done"
        );
        check_cancelled(cancel)?;

        // Stage 4: short-term average
        let short_term = short_term::aggregate(&blocks.series, config.short_term_blocks)?;
        progress.set(SHORT_TERM_DONE);
        check_cancelled(cancel)?;

        // Stage 5: gating
        let gate = gating::gate(&blocks.powers, config);
        progress.set(GATING_DONE);
        debug!(
            integrated_lufs = gate.integrated_lufs,
            above_absolute = gate.above_absolute,
            above_relative = gate.above_relative,
            "Gating done"
        );
        check_cancelled(cancel)?;

        // Stage 6: loudness range
        let loudness_range_lu = range::loudness_range(&short_term.values, config)?;
        progress.set(RANGE_DONE);
        check_cancelled(cancel)?;

        // Stage 7: true peak on the raw samples
        let stage = Instant::now();
        let peaks = true_peak::measure(buffer.channels(), config.true_peak_refine_threshold);
        progress.set(TRUE_PEAK_DONE);
        debug!(
            elapsed_ms = stage.elapsed().as_millis(),
            sample_peak = peaks.sample_peak,
            true_peak = peaks.true_peak,
            "True peak done"
        );
        check_cancelled(cancel)?;

        let result = AnalysisResult {
            integrated_lufs: gate.integrated_lufs,
            short_term_max_lufs: short_term.max(),
            momentary_max_lufs: blocks.series.max(),
            true_peak_dbtp: peak_to_db(peaks.true_peak),
            sample_peak_dbfs: peak_to_db(peaks.sample_peak),
            loudness_range_lu,
            duration_seconds: buffer.duration_seconds(),
            sample_rate,
            channels: buffer.channel_count(),
        };

        let mut series = LoudnessSeries::new(blocks.series, short_term);
        if let Some(max_points) = config.max_series_points {
            series = series.downsample(max_points);
        }

        info!(
            elapsed_ms = started.elapsed().as_millis(),
            "Loudness analysis complete: {}", result
        );
        progress.set(100);

        Ok(LoudnessReport { result, series })
    }

    fn weight_channels(
        &self,
        buffer: &SampleBuffer,
        progress: &mut ProgressTracker<'_>,
        cancel: &CancelFlag,
    ) -> Result<Vec<Vec<f32>>> {
        let chunk = self.config.progress_chunk_frames;
        let total = buffer.frames() * buffer.channel_count();
        let mut done = 0;

        let mut weighted = Vec::with_capacity(buffer.channel_count());
        for samples in buffer.channels() {
            let mut out = Vec::new();
            out.try_reserve_exact(samples.len())
                .map_err(|e| LoudnessError::allocation("k-weighting", e))?;

            let mut filter = KWeighting::new(buffer.sample_rate());
            for block in samples.chunks(chunk) {
                check_cancelled(cancel)?;
                filter.process(block, &mut out);
                done += block.len();
                progress.set_within(0, WEIGHTING_DONE, done, total);
            }
            weighted.push(out);
        }
        Ok(weighted)
    }
}

/// Analyze with default settings
pub fn analyze(buffer: &SampleBuffer) -> Result<LoudnessReport> {
    LoudnessEngine::default().analyze_simple(buffer)
}

fn check_cancelled(cancel: &CancelFlag) -> Result<()> {
    if cancel.is_cancelled() {
        Err(LoudnessError::Cancelled)
    } else {
        Ok(())
    }
}
