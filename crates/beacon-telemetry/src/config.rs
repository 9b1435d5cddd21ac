//! Telemetry configuration and management

use crate::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::Level;

/// Main telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Global enable/disable toggle
    pub enabled: bool,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Privacy and security settings
    pub privacy: PrivacyConfig,
}

/// Logging-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level written (trace, debug, info, warn, error)
    pub level: LogLevel,

    /// Output format (json, pretty, compact)
    pub format: LogFormat,

    /// Enable console logging
    pub console_enabled: bool,

    /// Enable file logging
    pub file_enabled: bool,

    /// Directory for log files
    pub log_dir: PathBuf,

    /// Base filename for logs
    pub log_file_name: String,

    /// How often the log file rolls over
    pub rotation: LogRotation,

    /// Include source location in logs
    pub include_location: bool,

    /// Include thread names/IDs
    pub include_thread_info: bool,
}

/// Privacy and security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyConfig {
    /// Enable automatic sanitization of sensitive field values
    pub sanitize_enabled: bool,

    /// Patterns to redact from field values (regex patterns)
    pub redaction_patterns: Vec<String>,

    /// Field keys whose values are always redacted
    pub redacted_fields: Vec<String>,
}

/// Log level threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(Error::Config {
                message: format!("Unknown log level '{}'", s),
            }),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Structured JSON format
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(Error::Config {
                message: format!("Unknown log format '{}'", s),
            }),
        }
    }
}

/// Rollover period for file logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Minutely,
    Hourly,
    Daily,
    Never,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            logging: LoggingConfig::default(),
            privacy: PrivacyConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let default_log_dir =
            TelemetryConfig::default_log_dir().unwrap_or_else(|_| PathBuf::from("./logs"));

        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            console_enabled: true,
            file_enabled: false,
            log_dir: default_log_dir,
            log_file_name: "beacon.log".to_string(),
            rotation: LogRotation::Daily,
            include_location: false,
            include_thread_info: false,
        }
    }
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            sanitize_enabled: true,
            redaction_patterns: vec![
                // Credentials embedded in free text: keep the name, drop the value
                r#"(?i)(?P<key>api_?key|token|secret|password)\s*[:=]\s*['"]?[a-zA-Z0-9_\-\.]+['"]?"#
                    .to_string(),
                // Credit card numbers
                r"\b\d{4}[\s\-]?\d{4}[\s\-]?\d{4}[\s\-]?\d{4}\b".to_string(),
                // Social security numbers
                r"\b\d{3}-\d{2}-\d{4}\b".to_string(),
                // Email addresses (partial redaction)
                r"\b(?P<email>[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})\b".to_string(),
            ],
            redacted_fields: vec![
                "password".to_string(),
                "api_key".to_string(),
                "secret".to_string(),
                "token".to_string(),
                "authorization".to_string(),
            ],
        }
    }
}

impl TelemetryConfig {
    /// Load configuration from file or create default
    pub async fn load(config_path: Option<&Path>) -> Result<Self> {
        let config_file = match config_path {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_path()?,
        };

        let mut config = if config_file.exists() {
            let content = tokio::fs::read_to_string(&config_file).await?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        config.load_env_overrides();
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, config_path: Option<&Path>) -> Result<()> {
        let config_file = match config_path {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if let Some(parent) = config_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&config_file, self.to_toml()?).await?;
        Ok(())
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load environment variable overrides
    pub fn load_env_overrides(&mut self) {
        if let Ok(enabled) = std::env::var("BEACON_TELEMETRY_ENABLED") {
            self.enabled = enabled.parse().unwrap_or(self.enabled);
        }

        if let Ok(level) = std::env::var("BEACON_LOG_LEVEL") {
            self.logging.level = level.parse().unwrap_or(self.logging.level);
        }

        if let Ok(format) = std::env::var("BEACON_LOG_FORMAT") {
            self.logging.format = format.parse().unwrap_or(self.logging.format);
        }

        if let Ok(enabled) = std::env::var("BEACON_FILE_LOGGING") {
            self.logging.file_enabled = enabled.parse().unwrap_or(self.logging.file_enabled);
        }

        if let Ok(dir) = std::env::var("BEACON_LOG_DIR") {
            self.logging.log_dir = PathBuf::from(dir);
        }

        if let Ok(enabled) = std::env::var("BEACON_SANITIZE_LOGS") {
            self.privacy.sanitize_enabled =
                enabled.parse().unwrap_or(self.privacy.sanitize_enabled);
        }
    }

    fn default_config_path() -> Result<PathBuf> {
        let project_dirs =
            ProjectDirs::from("rs", "beacon", "beacon").ok_or_else(|| Error::Config {
                message: "Could not determine config directory".to_string(),
            })?;

        Ok(project_dirs.config_dir().join("telemetry.toml"))
    }

    fn default_log_dir() -> Result<PathBuf> {
        let project_dirs =
            ProjectDirs::from("rs", "beacon", "beacon").ok_or_else(|| Error::Config {
                message: "Could not determine log directory".to_string(),
            })?;

        Ok(project_dirs.data_dir().join("logs"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.logging.file_enabled {
            if self.logging.log_file_name.trim().is_empty() {
                return Err(Error::Config {
                    message: "log_file_name must not be empty".to_string(),
                });
            }

            if !self.logging.log_dir.exists() {
                std::fs::create_dir_all(&self.logging.log_dir)?;
            }

            // Test write permissions
            let test_file = self.logging.log_dir.join(".beacon_test");
            std::fs::write(&test_file, "test")?;
            std::fs::remove_file(&test_file)?;
        }

        for pattern in &self.privacy.redaction_patterns {
            regex::Regex::new(pattern).map_err(|e| Error::Config {
                message: format!("Invalid redaction pattern '{}': {}", pattern, e),
            })?;
        }

        Ok(())
    }
}
