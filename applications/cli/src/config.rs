/// CLI configuration
use crate::error::{CliError, Result};
use loudscope_engine::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "loudscope.toml";

/// Prefix of environment overrides, e.g. `LOUDSCOPE_ANALYSIS__HOP_MS=50`
pub const ENV_PREFIX: &str = "LOUDSCOPE";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default = "default_output")]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutputSettings {
    /// Print the report as JSON instead of text
    #[serde(default)]
    pub json: bool,

    /// Include the momentary / short-term series in the output
    #[serde(default)]
    pub series: bool,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Double underscore separates sections so snake_case keys survive
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.analysis
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn default_output() -> OutputSettings {
    OutputSettings {
        json: false,
        series: false,
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            output: default_output(),
        }
    }
}
