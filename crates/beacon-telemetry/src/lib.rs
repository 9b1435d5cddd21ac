//! # Beacon Telemetry
//!
//! The logging backend behind Beacon's diagnostic handlers.
//!
//! ## Features
//!
//! - **Structured Logging**: JSON, pretty and compact output through `tracing`
//! - **File Output**: rolling log files with a non-blocking writer
//! - **Privacy**: redaction of sensitive field values before they are rendered
//! - **Configurable**: TOML file, environment overrides, `RUST_LOG`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use beacon_core::{Field, Logger};
//! use beacon_telemetry::{TelemetryConfig, TelemetrySystem, TracingLogger};
//!
//! #[tokio::main]
//! async fn main() -> beacon_telemetry::Result<()> {
//!     let config = TelemetryConfig::default();
//!     let _guard = TelemetrySystem::init(config.clone()).await?;
//!
//!     let logger = TracingLogger::from_config(&config)?;
//!     logger.info("application started", &[Field::new("version", "0.1.0")]);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod logger;
pub mod sanitization;
pub mod system;


pub use config::{LogFormat, LogLevel, LogRotation, TelemetryConfig};
pub use logger::{TracingLogger, DIAGNOSTIC_TARGET};
pub use sanitization::FieldSanitizer;
pub use system::{TelemetryGuard, TelemetrySystem};

/// Result type for telemetry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Telemetry-specific errors
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] toml::de::Error),

    #[error("Telemetry system error: {message}")]
    System { message: String },
}
