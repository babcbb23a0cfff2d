//! Planar sample buffers handed to the engine
//!
//! A [`SampleBuffer`] is produced by whatever decodes the audio and is
//! consumed once by an analysis run. The engine only ever reads it; the
//! K-weighted copy it works on is a separate, run-owned allocation.

use crate::channel::ChannelPosition;
use crate::error::{LoudnessError, Result};

/// Lowest supported sample rate in Hz
pub const MIN_SAMPLE_RATE: u32 = 8000;

/// Highest supported sample rate in Hz
pub const MAX_SAMPLE_RATE: u32 = 384_000;

/// Highest supported channel count
pub const MAX_CHANNELS: usize = 8;

/// One `f32` sequence per channel, all sharing a sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    channels: Vec<Vec<f32>>,
    layout: Vec<ChannelPosition>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Create a buffer from planar channels using the default layout
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        let layout = ChannelPosition::default_layout(channels.len());
        Self {
            channels,
            layout,
            sample_rate,
        }
    }

    /// Create a buffer with an explicit speaker layout
    pub fn with_layout(
        channels: Vec<Vec<f32>>,
        layout: Vec<ChannelPosition>,
        sample_rate: u32,
    ) -> Self {
        Self {
            channels,
            layout,
            sample_rate,
        }
    }

    /// Split interleaved frames (L R L R ... for stereo) into planar channels
    ///
    /// # Errors
    /// Returns error if `channels` is zero or the sample count is not a
    /// whole number of frames
    pub fn from_interleaved(samples: &[f32], channels: usize, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(LoudnessError::NoChannels);
        }
        if samples.len() % channels != 0 {
            return Err(LoudnessError::InterleavedLength {
                samples: samples.len(),
                channels,
            });
        }

        let frames = samples.len() / channels;
        let mut planar: Vec<Vec<f32>> = (0..channels)
            .map(|_| Vec::with_capacity(frames))
            .collect();
        for frame in samples.chunks_exact(channels) {
            for (channel, &sample) in planar.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Ok(Self::new(planar, sample_rate))
    }

    /// Check the buffer against the engine's input contract
    ///
    /// # Errors
    /// Returns the first violation found: missing channels, unsupported
    /// sample rate or channel count, a layout that does not cover every
    /// channel, empty or mismatched channels, or a non-finite sample
    pub fn validate(&self) -> Result<()> {
        if self.channels.is_empty() {
            return Err(LoudnessError::NoChannels);
        }
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            return Err(LoudnessError::InvalidSampleRate(self.sample_rate));
        }
        if self.channels.len() > MAX_CHANNELS {
            return Err(LoudnessError::InvalidChannelCount(self.channels.len()));
        }
        if self.layout.len() != self.channels.len() {
            return Err(LoudnessError::LayoutMismatch {
                channels: self.channels.len(),
                layout: self.layout.len(),
            });
        }

        let expected = self.channels[0].len();
        for (channel, samples) in self.channels.iter().enumerate() {
            if samples.is_empty() {
                return Err(LoudnessError::EmptyChannel { channel });
            }
            if samples.len() != expected {
                return Err(LoudnessError::ChannelLengthMismatch {
                    channel,
                    expected,
                    found: samples.len(),
                });
            }
            if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
                return Err(LoudnessError::NonFiniteSample { channel, index });
            }
        }

        Ok(())
    }

    /// All channels, in layout order
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Samples of one channel
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Speaker position of every channel
    pub fn layout(&self) -> &[ChannelPosition] {
        &self.layout
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Length of the program in seconds
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Give the channel data back to the caller
    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }
}
