//! Configuration management for kqlsh
//!
//! This module handles loading, parsing, and managing configuration from:
//! - Configuration files (TOML format)
//! - Command-line arguments (applied by the CLI layer)
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Autocomplete and suggestion orchestration settings
    #[serde(default)]
    pub suggest: SuggestConfig,

    /// Remote (AI) suggester settings
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Table catalog settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// History configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Suggestion orchestration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestConfig {
    /// Delay after the last keystroke before asking the remote suggester, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Maximum number of local suggestions shown in the popup
    #[serde(default = "default_popup_limit")]
    pub popup_limit: usize,

    /// Number of popup rows visible at once
    #[serde(default = "default_visible_rows")]
    pub visible_rows: usize,

    /// Number of tables whose schema is prefetched once the table list is known
    #[serde(default = "default_prefetch_limit")]
    pub prefetch_limit: usize,

    /// Deadline for a single remote suggestion, in seconds
    #[serde(default = "default_remote_timeout")]
    pub remote_timeout_secs: u64,

    /// Deadline for a single schema fetch, in seconds
    #[serde(default = "default_schema_timeout")]
    pub schema_timeout_secs: u64,
}

/// Remote suggester settings (Azure OpenAI compatible chat completions)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Enable AI-assisted suggestions
    #[serde(default)]
    pub enabled: bool,

    /// Service endpoint, e.g. `https://my-resource.openai.azure.com`
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Model deployment name
    #[serde(default = "default_deployment")]
    pub deployment: String,

    /// API version query parameter
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Completion token budget
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Table catalog settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to a TOML catalog describing tables and their columns
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Name shown in the prompt
    #[serde(default)]
    pub name: Option<String>,
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Enable syntax highlighting
    #[serde(default = "default_true")]
    pub syntax_highlighting: bool,

    /// Enable colored output
    #[serde(default = "default_true")]
    pub color_output: bool,
}

/// Query history configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of history entries
    #[serde(default = "default_max_history_size")]
    pub max_size: usize,

    /// Path to history file
    #[serde(default = "default_history_file")]
    pub file_path: PathBuf,

    /// Enable history persistence
    #[serde(default = "default_true")]
    pub persist: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Path to log file (None for stderr)
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Enable timestamps in logs
    #[serde(default = "default_true")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_debounce_ms() -> u64 {
    500
}

fn default_popup_limit() -> usize {
    10
}

fn default_visible_rows() -> usize {
    8
}

fn default_prefetch_limit() -> usize {
    10
}

fn default_remote_timeout() -> u64 {
    30
}

fn default_schema_timeout() -> u64 {
    10
}

fn default_deployment() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_version() -> String {
    "2024-02-15-preview".to_string()
}

fn default_api_key_env() -> String {
    "AZURE_OPENAI_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_max_history_size() -> usize {
    1000
}

fn default_history_file() -> PathBuf {
    config_dir().join("history")
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".kqlsh")
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            popup_limit: default_popup_limit(),
            visible_rows: default_visible_rows(),
            prefetch_limit: default_prefetch_limit(),
            remote_timeout_secs: default_remote_timeout(),
            schema_timeout_secs: default_schema_timeout(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            deployment: default_deployment(),
            api_version: default_api_version(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            syntax_highlighting: true,
            color_output: true,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_history_size(),
            file_path: default_history_file(),
            persist: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_path: None,
            timestamps: true,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from an explicit path or the default location
    ///
    /// An explicit path must exist. The default location is optional and
    /// falls back to built-in defaults when absent.
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Save configuration to a file
    ///
    /// # Arguments
    /// * `path` - Path where to save the configuration
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render the configuration as TOML text
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("suggest.popup_limit", self.suggest.popup_limit as u64),
            ("suggest.visible_rows", self.suggest.visible_rows as u64),
            ("suggest.remote_timeout_secs", self.suggest.remote_timeout_secs),
            ("suggest.schema_timeout_secs", self.suggest.schema_timeout_secs),
            ("history.max_size", self.history.max_size as u64),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                }
                .into());
            }
        }

        if !(0.0..=2.0).contains(&self.remote.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "remote.temperature".to_string(),
                value: self.remote.temperature.to_string(),
            }
            .into());
        }

        if self.remote.enabled && self.remote.endpoint.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::InvalidValue {
                field: "remote.endpoint".to_string(),
                value: String::new(),
            }
            .into());
        }

        Ok(())
    }

    /// Debounce delay as Duration
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.suggest.debounce_ms)
    }

    /// Remote suggestion deadline as Duration
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.suggest.remote_timeout_secs)
    }

    /// Schema fetch deadline as Duration
    pub fn schema_timeout(&self) -> Duration {
        Duration::from_secs(self.suggest.schema_timeout_secs)
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
