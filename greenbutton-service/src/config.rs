use serde::Deserialize;
use std::{fs, path::PathBuf};
use time::OffsetDateTime;

pub const CONFIG_ENV: &str = "GREENBUTTON_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "greenbutton-config.toml";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationInformationConfig {
    pub data_custodian_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterpretationConfig {
    /// Pins the moment DST applicability is evaluated at; wall clock when
    /// absent.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub evaluated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Ndjson,
    Csv,
}

fn default_batch_size() -> usize {
    256
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Stdout when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            path: None,
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub application_information: ApplicationInformationConfig,
    #[serde(default)]
    pub interpretation: InterpretationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        use std::env;

        let path = env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let cfg: AppConfig = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.application_information.data_custodian_id.trim().is_empty() {
            return Err(ConfigError::Missing("application_information.data_custodian_id"));
        }
        if self.output.batch_size == 0 {
            return Err(ConfigError::Invalid("output.batch_size must be positive".to_string()));
        }
        Ok(())
    }
}
