//! Loudscope command-line front end
//!
//! Decodes WAV files, runs them through the loudness engine and prints the
//! report. This library exposes the pieces used by the binary for testing.

pub mod commands;
pub mod config;
pub mod error;
pub mod report;
pub mod wav;

pub use commands::{analyze_file, analyze_to_string};
pub use self::config::{CliConfig, OutputSettings};
pub use error::{CliError, Result};
pub use wav::{read_wav, write_tone, ToneSpec};
