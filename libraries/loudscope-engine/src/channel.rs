//! Channel positions and their BS.1770 weights

use serde::{Deserialize, Serialize};

/// Weight applied to side and rear surround channels (+1.5 dB)
pub const SURROUND_WEIGHT: f64 = 1.4125;

/// Loudspeaker position of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelPosition {
    Left,
    Right,
    Center,
    /// LFE channel, excluded from loudness accounting
    LowFrequency,
    LeftSurround,
    RightSurround,
    LeftBackSurround,
    RightBackSurround,
}

impl ChannelPosition {
    /// Power weight of this channel in the channel sum
    pub fn weight(self) -> f64 {
        match self {
            Self::Left | Self::Right | Self::Center => 1.0,
            Self::LeftSurround
            | Self::RightSurround
            | Self::LeftBackSurround
            | Self::RightBackSurround => SURROUND_WEIGHT,
            Self::LowFrequency => 0.0,
        }
    }

    /// Default speaker layout for a channel count
    ///
    /// Follows the usual WAV/SMPTE ordering (L R C LFE Ls Rs ...). Counts
    /// above 8 have no standard layout and are treated as front channels.
    #[allow(clippy::enum_glob_use)]
    pub fn default_layout(channels: usize) -> Vec<Self> {
        use ChannelPosition::*;

        match channels {
            0 => Vec::new(),
            1 => vec![Center],
            2 => vec![Left, Right],
            3 => vec![Left, Right, Center],
            4 => vec![Left, Right, LeftSurround, RightSurround],
            5 => vec![Left, Right, Center, LeftSurround, RightSurround],
            6 => vec![Left, Right, Center, LowFrequency, LeftSurround, RightSurround],
            7 => vec![
                Left,
                Right,
                Center,
                LeftSurround,
                RightSurround,
                LeftBackSurround,
                RightBackSurround,
            ],
            8 => vec![
                Left,
                Right,
                Center,
                LowFrequency,
                LeftSurround,
                RightSurround,
                LeftBackSurround,
                RightBackSurround,
            ],
            n => vec![Center; n],
        }
    }
}
