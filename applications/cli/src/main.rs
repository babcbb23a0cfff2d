/// Loudscope - program loudness meter
use clap::{Parser, Subcommand};
use loudscope_cli::{analyze_to_string, write_tone, CliConfig, ToneSpec};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "loudscope")]
#[command(about = "ITU-R BS.1770 loudness, loudness range and true peak meter", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./loudscope.toml when present)
    #[arg(short, long, global = true, env = "LOUDSCOPE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure a WAV file
    Analyze {
        /// WAV file to measure
        file: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
        /// Include the momentary / short-term series
        #[arg(long)]
        series: bool,
        /// Downsample the series to at most this many points
        #[arg(long)]
        max_points: Option<usize>,
    },
    /// Write a calibration sine to a WAV file
    Tone {
        /// Output WAV path
        output: PathBuf,
        /// Tone frequency in Hz
        #[arg(long, default_value_t = 997.0)]
        frequency: f64,
        /// Peak level in dBFS
        #[arg(long, default_value_t = -20.0, allow_hyphen_values = true)]
        level_dbfs: f64,
        /// Duration in seconds
        #[arg(long, default_value_t = 10.0)]
        seconds: f64,
        #[arg(long, default_value_t = 48000)]
        sample_rate: u32,
        #[arg(long, default_value_t = 1)]
        channels: u16,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so JSON on stdout stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loudscope=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            json,
            series,
            max_points,
        } => {
            let mut config = CliConfig::load(cli.config.as_deref())?;
            config.output.json |= json;
            config.output.series |= series;
            if max_points.is_some() {
                config.analysis.max_series_points = max_points;
            }
            config.validate()?;

            let output = analyze_to_string(&file, &config)?;
            print!("{}", output);
            if config.output.json {
                println!();
            }
        }
        Commands::Tone {
            output,
            frequency,
            level_dbfs,
            seconds,
            sample_rate,
            channels,
        } => {
            let tone = ToneSpec {
                frequency_hz: frequency,
                level_dbfs,
                seconds,
                sample_rate,
                channels,
            };
            write_tone(&output, &tone)?;
            tracing::info!(
                "Wrote {:.1} Hz at {:.1} dBFS, {:.2} s to {}",
                frequency,
                level_dbfs,
                seconds,
                output.display()
            );
        }
        Commands::Config => {
            let config = CliConfig::load(cli.config.as_deref())?;
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
