//! Global subscriber installation

use crate::{
    config::{LogFormat, LogRotation, TelemetryConfig},
    Error, Result,
};
use tracing::Level;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs the process-wide `tracing` subscriber that every
/// [`TracingLogger`](crate::TracingLogger) ends up writing to
pub struct TelemetrySystem;

/// Keeps the non-blocking file writer alive; dropping it flushes pending lines
pub struct TelemetryGuard {
    _file_guard: Option<WorkerGuard>,
}

impl TelemetrySystem {
    /// Initialize the telemetry system with the given configuration.
    ///
    /// Fails if a global subscriber is already installed.
    pub async fn init(config: TelemetryConfig) -> Result<TelemetryGuard> {
        config.validate()?;

        let mut layers: Vec<BoxedLayer> = Vec::new();
        if let Some(layer) = Self::build_console_layer(&config) {
            layers.push(layer);
        }

        let (file_layer, file_guard) = Self::build_file_layer(&config).await?;
        if let Some(layer) = file_layer {
            layers.push(layer);
        }

        Registry::default()
            .with(layers)
            .with(Self::build_env_filter(&config)?)
            .try_init()
            .map_err(|e| Error::System {
                message: format!("Failed to initialize tracing subscriber: {}", e),
            })?;

        tracing::info!(
            telemetry.event = "system_initialized",
            telemetry.version = env!("CARGO_PKG_VERSION"),
            log_level = ?config.logging.level,
            log_format = ?config.logging.format,
            file_logging = config.logging.file_enabled,
            sanitization = config.privacy.sanitize_enabled,
            "Telemetry system initialized"
        );

        Ok(TelemetryGuard {
            _file_guard: file_guard,
        })
    }

    /// Build environment filter for log level filtering
    fn build_env_filter(config: &TelemetryConfig) -> Result<EnvFilter> {
        if let Ok(env_filter) = std::env::var("RUST_LOG") {
            return EnvFilter::try_new(env_filter).map_err(|e| Error::Config {
                message: format!("Invalid RUST_LOG directive: {}", e),
            });
        }

        if !config.enabled {
            return Ok(EnvFilter::new("off"));
        }

        let level: Level = config.logging.level.into();
        Ok(EnvFilter::new(level.to_string().to_lowercase()))
    }

    /// Build console logging layer
    fn build_console_layer(config: &TelemetryConfig) -> Option<BoxedLayer> {
        if !config.enabled || !config.logging.console_enabled {
            return None;
        }

        let logging = &config.logging;
        let layer = match logging.format {
            LogFormat::Json => fmt::layer()
                .json()
                .with_target(true)
                .with_file(logging.include_location)
                .with_line_number(logging.include_location)
                .with_thread_ids(logging.include_thread_info)
                .with_thread_names(logging.include_thread_info)
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .pretty()
                .with_target(true)
                .with_file(logging.include_location)
                .with_line_number(logging.include_location)
                .with_thread_ids(logging.include_thread_info)
                .with_thread_names(logging.include_thread_info)
                .boxed(),
            LogFormat::Compact => fmt::layer()
                .compact()
                .with_target(true)
                .with_file(logging.include_location)
                .with_line_number(logging.include_location)
                .with_thread_ids(logging.include_thread_info)
                .with_thread_names(logging.include_thread_info)
                .boxed(),
        };

        Some(layer)
    }

    /// Build file logging layer
    async fn build_file_layer(
        config: &TelemetryConfig,
    ) -> Result<(Option<BoxedLayer>, Option<WorkerGuard>)> {
        if !config.enabled || !config.logging.file_enabled {
            return Ok((None, None));
        }

        let logging = &config.logging;
        tokio::fs::create_dir_all(&logging.log_dir).await?;

        let appender = match logging.rotation {
            LogRotation::Minutely => rolling::minutely(&logging.log_dir, &logging.log_file_name),
            LogRotation::Hourly => rolling::hourly(&logging.log_dir, &logging.log_file_name),
            LogRotation::Daily => rolling::daily(&logging.log_dir, &logging.log_file_name),
            LogRotation::Never => rolling::never(&logging.log_dir, &logging.log_file_name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let layer = match logging.format {
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(logging.include_location)
                .with_line_number(logging.include_location)
                .with_thread_ids(logging.include_thread_info)
                .with_thread_names(logging.include_thread_info)
                .boxed(),
            LogFormat::Pretty => fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(logging.include_location)
                .with_line_number(logging.include_location)
                .with_thread_ids(logging.include_thread_info)
                .with_thread_names(logging.include_thread_info)
                .boxed(),
            LogFormat::Compact => fmt::layer()
                .compact()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(logging.include_location)
                .with_line_number(logging.include_location)
                .with_thread_ids(logging.include_thread_info)
                .with_thread_names(logging.include_thread_info)
                .boxed(),
        };

        Ok((Some(layer), Some(guard)))
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        // Emitted before the file guard flushes, so it still reaches the file
        tracing::info!(
            telemetry.event = "system_shutdown",
            "Telemetry system shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_env_filter_follows_config() {
        std::env::remove_var("RUST_LOG");

        let mut config = TelemetryConfig::default();
        config.logging.level = crate::LogLevel::Debug;
        let filter = TelemetrySystem::build_env_filter(&config).unwrap();
        assert_eq!(filter.to_string(), "debug");

        config.enabled = false;
        let filter = TelemetrySystem::build_env_filter(&config).unwrap();
        assert_eq!(filter.to_string(), "off");
    }

    #[test]
    #[serial]
    fn test_rust_log_overrides_config() {
        std::env::set_var("RUST_LOG", "beacon=trace");

        let filter = TelemetrySystem::build_env_filter(&TelemetryConfig::default()).unwrap();
        assert_eq!(filter.to_string(), "beacon=trace");

        std::env::remove_var("RUST_LOG");
    }

    #[test]
    fn test_console_layer_toggle() {
        let mut config = TelemetryConfig::default();
        for format in [LogFormat::Json, LogFormat::Pretty, LogFormat::Compact] {
            config.logging.format = format;
            assert!(TelemetrySystem::build_console_layer(&config).is_some());
        }

        config.logging.console_enabled = false;
        assert!(TelemetrySystem::build_console_layer(&config).is_none());
    }

    #[tokio::test]
    async fn test_file_layer_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = TelemetryConfig::default();
        config.logging.file_enabled = true;
        config.logging.log_dir = temp_dir.path().join("logs");

        let (layer, guard) = TelemetrySystem::build_file_layer(&config).await.unwrap();
        assert!(layer.is_some());
        assert!(guard.is_some());
        assert!(config.logging.log_dir.is_dir());

        config.enabled = false;
        let (layer, guard) = TelemetrySystem::build_file_layer(&config).await.unwrap();
        assert!(layer.is_none());
        assert!(guard.is_none());
    }
}
