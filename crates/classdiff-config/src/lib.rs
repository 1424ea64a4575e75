//! Configuration for the classdiff engine.
//!
//! A config file is TOML with two optional tables:
//!
//! ```toml
//! [matching]
//! max_operation_name_distance = 0.4
//! getter_prefixes = ["get"]
//! test_annotations = ["Test"]
//! single_exact_match_limit = 10
//! multiple_exact_match_limit = 20
//!
//! [logging]
//! level = "info"
//! json = false
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod logging;

pub use logging::{init_tracing, installed_log_buffer, log_subscriber, LogBuffer};

/// Thresholds and naming conventions used while matching operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchingConfig {
    /// Largest normalized name edit distance (0..=1) under which two
    /// operations with differing parameter types still count as compatible.
    #[serde(default = "MatchingConfig::default_max_operation_name_distance")]
    pub max_operation_name_distance: f64,

    /// Invocations whose name starts with one of these prefixes are treated as
    /// accessors and never count as evidence of an extracted operation.
    #[serde(default = "MatchingConfig::default_getter_prefixes")]
    pub getter_prefixes: Vec<String>,

    /// Annotation names (without `@`) marking test operations. Test operations
    /// get a tighter positional bound since test classes are mostly reordered
    /// rather than restructured.
    #[serde(default = "MatchingConfig::default_test_annotations")]
    pub test_annotations: Vec<String>,

    /// With exactly one exact match, inline/extract are accepted while the
    /// unmapped-minus-exact count stays below this limit.
    #[serde(default = "MatchingConfig::default_single_exact_match_limit")]
    pub single_exact_match_limit: usize,

    /// With several exact matches, inline/extract are accepted while the
    /// unmapped-minus-exact count stays below this limit.
    #[serde(default = "MatchingConfig::default_multiple_exact_match_limit")]
    pub multiple_exact_match_limit: usize,
}

impl MatchingConfig {
    fn default_max_operation_name_distance() -> f64 {
        0.4
    }

    fn default_getter_prefixes() -> Vec<String> {
        vec!["get".to_owned()]
    }

    fn default_test_annotations() -> Vec<String> {
        vec!["Test".to_owned()]
    }

    fn default_single_exact_match_limit() -> usize {
        10
    }

    fn default_multiple_exact_match_limit() -> usize {
        20
    }

    pub fn is_getter(&self, invocation_name: &str) -> bool {
        self.getter_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && invocation_name.starts_with(prefix.as_str()))
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            max_operation_name_distance: Self::default_max_operation_name_distance(),
            getter_prefixes: Self::default_getter_prefixes(),
            test_annotations: Self::default_test_annotations(),
            single_exact_match_limit: Self::default_single_exact_match_limit(),
            multiple_exact_match_limit: Self::default_multiple_exact_match_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Either a simple level (`info`, `debug`, ...) or an `EnvFilter`
    /// directive string such as `warn,classdiff_engine=trace`.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,

    /// Mirror logs to stderr (in addition to the in-memory buffer).
    #[serde(default)]
    pub stderr: bool,

    /// Append logs to the given file path. Installing the subscriber fails
    /// when the file cannot be opened.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Number of log lines kept in memory.
    #[serde(default = "LoggingConfig::default_buffer_lines")]
    pub buffer_lines: usize,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_buffer_lines() -> usize {
        2_000
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    pub(crate) fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// The effective filter: the configured level, with `RUST_LOG` merged in
    /// when set.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let config_directives = Self::normalize_level_directives(&self.level);

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: false,
            file: None,
            buffer_lines: Self::default_buffer_lines(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassDiffConfig {
    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("another global tracing subscriber is already installed")]
    SubscriberAlreadySet,
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` embeds a source snippet; keep just the message.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl ClassDiffConfig {
    /// Load and validate a config file from TOML.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::load_from_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded classdiff config");
        Ok(config)
    }

    /// Parse and validate TOML config text.
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config: ClassDiffConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let distance = self.matching.max_operation_name_distance;
        if !(0.0..=1.0).contains(&distance) {
            return Err(ConfigError::Invalid {
                field: "matching.max_operation_name_distance",
                reason: format!("{distance} is outside 0..=1"),
            });
        }
        if self.matching.single_exact_match_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "matching.single_exact_match_limit",
                reason: "must be at least 1".to_owned(),
            });
        }
        if self.matching.multiple_exact_match_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "matching.multiple_exact_match_limit",
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}
