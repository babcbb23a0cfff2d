//! Error types for loudness analysis

use std::collections::TryReserveError;
use thiserror::Error;

/// Result type for loudness operations
pub type Result<T> = std::result::Result<T, LoudnessError>;

/// Errors that can end an analysis run
///
/// Silence is not an error: quiet or empty programs come back as a normal
/// [`AnalysisResult`](crate::AnalysisResult) carrying the silence sentinel.
#[derive(Error, Debug)]
pub enum LoudnessError {
    /// The buffer has no channels at all
    #[error("No audio channels provided for analysis")]
    NoChannels,

    /// A channel holds zero samples
    #[error("Channel {channel} contains no samples")]
    EmptyChannel { channel: usize },

    /// Channels do not share one length
    #[error("Channel {channel} has {found} samples, expected {expected}")]
    ChannelLengthMismatch {
        channel: usize,
        expected: usize,
        found: usize,
    },

    /// NaN or infinite sample
    #[error("Non-finite sample in channel {channel} at index {index}")]
    NonFiniteSample { channel: usize, index: usize },

    /// Invalid sample rate
    #[error("Invalid sample rate: {0} Hz (must be between 8000 and 384000)")]
    InvalidSampleRate(u32),

    /// Invalid channel count
    #[error("Invalid channel count: {0} (must be 1-8)")]
    InvalidChannelCount(usize),

    /// Channel layout does not describe every channel
    #[error("Channel layout has {layout} entries for {channels} channels")]
    LayoutMismatch { channels: usize, layout: usize },

    /// Interleaved input is not a whole number of frames
    #[error("Sample count {samples} is not divisible by channel count {channels}")]
    InterleavedLength { samples: usize, channels: usize },

    /// Analysis settings are out of range
    #[error("Invalid analysis configuration: {0}")]
    InvalidConfig(String),

    /// A scratch buffer could not be allocated
    #[error("Failed to allocate buffer during {stage}: {source}")]
    Allocation {
        stage: &'static str,
        #[source]
        source: TryReserveError,
    },

    /// The background thread could not be started
    #[error("Failed to spawn analysis thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// The background thread went away without reporting a result
    #[error("Analysis worker stopped without reporting a result")]
    WorkerDisconnected,

    /// The run was cancelled by the caller
    #[error("Analysis cancelled")]
    Cancelled,
}

impl LoudnessError {
    /// Whether the error was caused by the input rather than by the run itself
    ///
    /// Input errors are raised before any stage executes.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::NoChannels
                | Self::EmptyChannel { .. }
                | Self::ChannelLengthMismatch { .. }
                | Self::NonFiniteSample { .. }
                | Self::InvalidSampleRate(_)
                | Self::InvalidChannelCount(_)
                | Self::LayoutMismatch { .. }
                | Self::InterleavedLength { .. }
                | Self::InvalidConfig(_)
        )
    }

    pub(crate) fn allocation(stage: &'static str, source: TryReserveError) -> Self {
        Self::Allocation { stage, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_classification() {
        assert!(LoudnessError::NoChannels.is_input_error());
        assert!(LoudnessError::NonFiniteSample {
            channel: 1,
            index: 12
        }
        .is_input_error());
        assert!(!LoudnessError::Cancelled.is_input_error());
        assert!(!LoudnessError::WorkerDisconnected.is_input_error());
    }

    #[test]
    fn test_allocation_error_names_stage() {
        let source = Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err();
        let err = LoudnessError::allocation("power combining", source);
        assert!(err.to_string().contains("power combining"));
        assert!(!err.is_input_error());
    }
}
