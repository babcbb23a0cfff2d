/// Command implementations shared by the binary and the tests
use crate::config::CliConfig;
use crate::error::Result;
use crate::report;
use crate::wav;
use loudscope_engine::{AnalysisWorker, LoudnessReport};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Progress is logged in steps of this many percent
const PROGRESS_LOG_STEP: u8 = 10;

/// Decode `path` and measure it on the analysis worker
pub fn analyze_file(path: &Path, config: &CliConfig) -> Result<LoudnessReport> {
    let started = Instant::now();
    let buffer = wav::read_wav(path)?;
    info!(
        "Analyzing {} ({:.2} s, {} ch, {} Hz)",
        path.display(),
        buffer.duration_seconds(),
        buffer.channel_count(),
        buffer.sample_rate()
    );

    let handle = AnalysisWorker::spawn(buffer, config.analysis.clone())?;
    let mut next_log = PROGRESS_LOG_STEP;
    let report = handle.wait(|percent| {
        if percent >= next_log && percent < 100 {
            info!("Progress: {}%", percent);
            next_log = (percent / PROGRESS_LOG_STEP + 1) * PROGRESS_LOG_STEP;
        }
    })?;

    info!(
        "Finished {} in {} ms",
        path.display(),
        started.elapsed().as_millis()
    );
    Ok(report)
}

/// Analyze and render according to the output settings
pub fn analyze_to_string(path: &Path, config: &CliConfig) -> Result<String> {
    let report = analyze_file(path, config)?;
    if config.output.json {
        report::render_json(&report, config.output.series)
    } else {
        Ok(report::render_text(&report, config.output.series))
    }
}
