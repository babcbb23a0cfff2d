//! Program loudness measurement for Loudscope
//!
//! This crate implements the ITU-R BS.1770 / GY/T 262 measurement chain:
//! - K-weighting pre-filter per channel
//! - Momentary (400 ms) and short-term (3 s) loudness series
//! - Integrated loudness with absolute and relative gating
//! - Loudness range (LRA) from short-term percentiles
//! - Approximate true peak (sample peak refined by spline interpolation)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌────────────────┐
//! │ SampleBuffer │ ──► │ AnalysisWorker │ ──► │ LoudnessReport │
//! └──────────────┘     └────────────────┘     └────────────────┘
//!    (moved in)               │  Progress(0..=100)
//!                             ▼
//!                      ┌──────────────┐
//!                      │    Caller    │
//!                      └──────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use loudscope_engine::{AnalysisConfig, AnalysisWorker, SampleBuffer};
//!
//! let buffer = SampleBuffer::from_interleaved(&audio_samples, 2, 48000)?;
//! let handle = AnalysisWorker::spawn(buffer, AnalysisConfig::default())?;
//!
//! let report = handle.wait(|percent| println!("{}%", percent))?;
//! println!("Integrated loudness: {:.1} LUFS", report.result.integrated_lufs);
//! println!("True peak: {:.1} dBTP", report.result.true_peak_dbtp);
//! ```

mod buffer;
mod channel;
mod config;
mod engine;
mod error;
pub mod gating;
pub mod kweighting;
pub mod momentary;
pub mod power;
mod progress;
pub mod range;
mod result;
mod series;
pub mod short_term;
pub mod true_peak;
pub mod units;
mod worker;

pub use buffer::{SampleBuffer, MAX_CHANNELS, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};
pub use channel::{ChannelPosition, SURROUND_WEIGHT};
pub use config::AnalysisConfig;
pub use engine::{analyze, LoudnessEngine};
pub use error::{LoudnessError, Result};
pub use progress::{CancelFlag, NoProgress, ProgressSink, ProgressTracker};
pub use result::{AnalysisResult, Level, LoudnessReport};
pub use series::{BlockSeries, LoudnessSeries};
pub use true_peak::PeakMeasurement;
pub use units::{PEAK_EPSILON, PEAK_FLOOR_DB};
pub use worker::{AnalysisEvent, AnalysisHandle, AnalysisWorker};

/// EBU R128 broadcast reference level (-23 LUFS)
pub const EBU_R128_BROADCAST_LUFS: f64 = -23.0;

/// Common streaming reference level (-14 LUFS)
pub const STREAMING_REFERENCE_LUFS: f64 = -14.0;
