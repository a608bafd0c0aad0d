//! TOML Configuration File Support
//!
//! Centralized configuration for investigation streaming, supporting a TOML
//! file at `~/.config/investigator/stream.toml`.
//!
//! # Configuration Priority
//!
//! Values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! - `$XDG_CONFIG_HOME/investigator/stream.toml` (typically `~/.config/investigator/stream.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [stream]
//! queue_capacity = 64
//!
//! [display]
//! defer_progress = true
//! show_sources = true
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::processor::ProcessorOptions;
use crate::streaming::DEFAULT_QUEUE_CAPACITY;

/// Environment variable for the handoff queue capacity
pub const ENV_QUEUE_CAPACITY: &str = "INVESTIGATOR_QUEUE_CAPACITY";
/// Environment variable toggling progress deferral
pub const ENV_DEFER_PROGRESS: &str = "INVESTIGATOR_DEFER_PROGRESS";
/// Environment variable toggling source blocks
pub const ENV_SHOW_SOURCES: &str = "INVESTIGATOR_SHOW_SOURCES";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Stream section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamToml {
    /// Capacity of the fragment handoff queue
    pub queue_capacity: Option<usize>,
}

/// Display section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayToml {
    /// Hold progress lines back while a block is streaming
    pub defer_progress: Option<bool>,

    /// Show consulted sources
    pub show_sources: Option<bool>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestigatorToml {
    /// Stream configuration section
    pub stream: StreamToml,

    /// Display configuration section
    pub display: DisplayToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved streaming configuration
///
/// Use [`load_config`] to load with proper priority handling, then
/// [`ConfigOverrides::apply`] for command-line values.
#[derive(Clone, Debug)]
pub struct StreamConfig {
    /// Capacity of the fragment handoff queue (at least 1)
    pub queue_capacity: usize,

    /// Hold progress lines back while a block is streaming
    pub defer_progress: bool,

    /// Show consulted sources
    pub show_sources: bool,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            defer_progress: true,
            show_sources: true,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl StreamConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Processor switches derived from this configuration
    #[must_use]
    pub fn processor_options(&self) -> ProcessorOptions {
        ProcessorOptions {
            defer_progress: self.defer_progress,
            show_sources: self.show_sources,
        }
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for a zero queue capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "queue_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/investigator/stream.toml` or
/// `~/.config/investigator/stream.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("investigator").join("stream.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if the
/// resulting values are invalid. A missing config file is not an error.
pub fn load_config() -> Result<StreamConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path, then the process environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed, or
/// if the resulting values are invalid.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<StreamConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration using `env` to look up environment variables
///
/// # Errors
///
/// Same as [`load_config_from_path`].
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<StreamConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = StreamConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: InvestigatorToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut StreamConfig, toml: &InvestigatorToml) {
    if let Some(capacity) = toml.stream.queue_capacity {
        config.queue_capacity = capacity;
    }
    if let Some(defer) = toml.display.defer_progress {
        config.defer_progress = defer;
    }
    if let Some(show) = toml.display.show_sources {
        config.show_sources = show;
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut StreamConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(capacity) = env(ENV_QUEUE_CAPACITY) {
        match capacity.trim().parse::<usize>() {
            Ok(n) => {
                config.queue_capacity = n;
                config.source = ConfigSource::Env;
            }
            Err(_) => {
                tracing::warn!(value = %capacity, "Ignoring non-numeric {ENV_QUEUE_CAPACITY}");
            }
        }
    }
    if let Some(defer) = env(ENV_DEFER_PROGRESS) {
        config.defer_progress = parse_flag(&defer);
        config.source = ConfigSource::Env;
    }
    if let Some(show) = env(ENV_SHOW_SOURCES) {
        config.show_sources = parse_flag(&show);
        config.source = ConfigSource::Env;
    }
}

/// Anything but `0` / `false` / `off` / `no` enables a flag
fn parse_flag(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    !matches!(value.as_str(), "0" | "false" | "off" | "no")
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Queue capacity override
    pub queue_capacity: Option<usize>,

    /// Progress deferral override
    pub defer_progress: Option<bool>,

    /// Source display override
    pub show_sources: Option<bool>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set queue capacity override
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Set progress deferral override
    #[must_use]
    pub fn with_defer_progress(mut self, defer: bool) -> Self {
        self.defer_progress = Some(defer);
        self
    }

    /// Set source display override
    #[must_use]
    pub fn with_show_sources(mut self, show: bool) -> Self {
        self.show_sources = Some(show);
        self
    }

    /// Apply overrides to a configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if the result is invalid.
    pub fn apply(&self, config: &mut StreamConfig) -> Result<(), ConfigError> {
        if self.queue_capacity.is_some()
            || self.defer_progress.is_some()
            || self.show_sources.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(capacity) = self.queue_capacity {
            config.queue_capacity = capacity;
        }
        if let Some(defer) = self.defer_progress {
            config.defer_progress = defer;
        }
        if let Some(show) = self.show_sources {
            config.show_sources = show;
        }

        config.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn write_toml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // =========================================================================
    // Default Configuration Tests
    // =========================================================================

    #[test]
    fn test_default_config() {
        let config = StreamConfig::default();

        assert_eq!(config.queue_capacity, 64);
        assert!(config.defer_progress);
        assert!(config.show_sources);
        assert!(config.config_file_path.is_none());
        assert_eq!(config.source(), ConfigSource::Default);
        assert_eq!(config.processor_options(), ProcessorOptions::default());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(p) = default_config_path() {
            assert!(p.to_string_lossy().contains("investigator"));
            assert!(p.to_string_lossy().ends_with("stream.toml"));
        }
    }

    // =========================================================================
    // TOML Parsing Tests
    // =========================================================================

    #[test]
    fn test_parse_valid_toml() {
        let file = write_toml(
            r#"
[stream]
queue_capacity = 8

[display]
defer_progress = false
show_sources = false
"#,
        );

        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();

        assert_eq!(config.queue_capacity, 8);
        assert!(!config.defer_progress);
        assert!(!config.show_sources);
        assert_eq!(config.config_file_path.as_deref(), Some(file.path()));
        assert_eq!(config.source(), ConfigSource::File);
    }

    #[test]
    fn test_parse_partial_toml() {
        let file = write_toml("[display]\nshow_sources = false\n");

        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();

        assert!(!config.show_sources);
        assert_eq!(config.queue_capacity, 64);
        assert!(config.defer_progress);
    }

    #[test]
    fn test_malformed_toml_error() {
        let file = write_toml("[stream\nqueue_capacity = \"many\"\n");

        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let file = write_toml("[stream]\nqueue_capacity = 0\n");

        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    // =========================================================================
    // Missing File Handling Tests
    // =========================================================================

    #[test]
    fn test_missing_file_graceful() {
        let path = PathBuf::from("/nonexistent/path/stream.toml");
        let config = load_config_with_env(Some(path), no_env).unwrap();

        assert_eq!(config.queue_capacity, 64);
        assert!(config.config_file_path.is_none());
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_no_path_uses_defaults() {
        let config = load_config_with_env(None, no_env).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
    }

    // =========================================================================
    // Priority Ordering Tests
    // =========================================================================

    #[test]
    fn test_env_overrides_file() {
        let file = write_toml("[stream]\nqueue_capacity = 8\n\n[display]\nshow_sources = true\n");
        let env = env_from(&[(ENV_QUEUE_CAPACITY, "16"), (ENV_SHOW_SOURCES, "false")]);

        let config = load_config_with_env(Some(file.path().to_path_buf()), env).unwrap();

        assert_eq!(config.queue_capacity, 16);
        assert!(!config.show_sources);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_invalid_env_capacity_ignored() {
        let env = env_from(&[(ENV_QUEUE_CAPACITY, "lots")]);

        let config = load_config_with_env(None, env).unwrap();

        assert_eq!(config.queue_capacity, 64);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_cli_overrides_env() {
        let env = env_from(&[(ENV_DEFER_PROGRESS, "1")]);
        let mut config = load_config_with_env(None, env).unwrap();
        assert!(config.defer_progress);

        ConfigOverrides::new()
            .with_defer_progress(false)
            .with_queue_capacity(4)
            .apply(&mut config)
            .unwrap();

        assert!(!config.defer_progress);
        assert_eq!(config.queue_capacity, 4);
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_empty_overrides_keep_source() {
        let mut config = StreamConfig::default();
        ConfigOverrides::new().apply(&mut config).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_override_zero_capacity_rejected() {
        let mut config = StreamConfig::default();
        let result = ConfigOverrides::new()
            .with_queue_capacity(0)
            .apply(&mut config);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("true"));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(" FALSE "));
        assert!(!parse_flag("off"));
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI");
        assert_eq!(ConfigSource::Env.to_string(), "environment");
        assert_eq!(ConfigSource::File.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }
}
