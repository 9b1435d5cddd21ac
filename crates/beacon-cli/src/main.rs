use anyhow::Result;
use beacon_core::Field;
use beacon_diagnostic::{Consumer, DiagnosticService, RequestLog};
use beacon_telemetry::{LogFormat, LogLevel, TelemetryConfig, TelemetrySystem, TracingLogger};
use chrono::Utc;
use clap::Parser;
use std::io;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
#[command(
    about = "Emit one diagnostic event per consumer to check a logging pipeline",
    after_help = "CONSUMERS:\n  victorops, slack, alerta, storage, task-store, reporting, http\n\nEvery selected consumer gets its own handler from a single diagnostic service,\nso each entry carries the matching service field."
)]
struct Cli {
    /// Telemetry configuration file
    #[arg(long, help = "Path to telemetry configuration file")]
    config: Option<std::path::PathBuf>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(long, help = "Set log level")]
    log_level: Option<String>,

    /// Set log format (json, pretty, compact)
    #[arg(long, help = "Set log output format")]
    log_format: Option<String>,

    /// Enable file logging
    #[arg(long, help = "Enable logging to files")]
    file_logging: bool,

    /// Disable file logging
    #[arg(
        long,
        conflicts_with = "file_logging",
        help = "Disable logging to files"
    )]
    no_file_logging: bool,

    /// Set log directory
    #[arg(long, help = "Directory for log files")]
    log_dir: Option<std::path::PathBuf>,

    /// Disable log sanitization (WARNING: may log sensitive data)
    #[arg(long, help = "Disable log data sanitization (UNSAFE)")]
    no_sanitize: bool,

    /// Consumers to exercise; all of them when omitted
    #[arg(long = "consumer", value_enum, help = "Consumer to exercise (repeatable)")]
    consumers: Vec<ConsumerArg>,

    /// Print the effective configuration as TOML and exit
    #[arg(long, help = "Print the effective telemetry configuration and exit")]
    print_config: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ConsumerArg {
    Victorops,
    Slack,
    Alerta,
    Storage,
    TaskStore,
    Reporting,
    Http,
}

impl From<ConsumerArg> for Consumer {
    fn from(arg: ConsumerArg) -> Self {
        match arg {
            ConsumerArg::Victorops => Consumer::VictorOps,
            ConsumerArg::Slack => Consumer::Slack,
            ConsumerArg::Alerta => Consumer::Alerta,
            ConsumerArg::Storage => Consumer::Storage,
            ConsumerArg::TaskStore => Consumer::TaskStore,
            ConsumerArg::Reporting => Consumer::Reporting,
            ConsumerArg::Http => Consumer::Http,
        }
    }
}

/// Create telemetry configuration from CLI arguments
async fn create_telemetry_config(cli: &Cli) -> Result<TelemetryConfig> {
    let mut config = match &cli.config {
        Some(path) => TelemetryConfig::load(Some(path.as_path())).await?,
        None => {
            let mut config = TelemetryConfig::default();
            config.load_env_overrides();
            config
        }
    };

    // CLI flags win over file and environment
    if let Some(level) = &cli.log_level {
        config.logging.level = level.parse::<LogLevel>()?;
    }

    if let Some(format) = &cli.log_format {
        config.logging.format = format.parse::<LogFormat>()?;
    }

    if cli.no_file_logging {
        config.logging.file_enabled = false;
    } else if cli.file_logging {
        config.logging.file_enabled = true;
    }

    if let Some(log_dir) = &cli.log_dir {
        config.logging.log_dir = log_dir.clone();
    }

    if cli.no_sanitize {
        config.privacy.sanitize_enabled = false;
    }

    Ok(config)
}

fn selected_consumers(cli: &Cli) -> Vec<Consumer> {
    if cli.consumers.is_empty() {
        Consumer::ALL.to_vec()
    } else {
        cli.consumers.iter().map(|c| Consumer::from(*c)).collect()
    }
}

/// Emit one representative event through the consumer's handler
fn emit_sample(service: &DiagnosticService<TracingLogger>, consumer: Consumer) {
    let err = io::Error::new(io::ErrorKind::Other, "sample error");

    match consumer {
        Consumer::VictorOps => service
            .new_victorops_handler()
            .with_context(&[Field::new("sample", "victorops")])
            .error("sample event", &err),
        Consumer::Slack => service
            .new_slack_handler()
            .with_context(&[Field::new("sample", "slack")])
            .error("sample event", &err),
        Consumer::Alerta => service
            .new_alerta_handler()
            .with_context(&[Field::new("sample", "alerta")])
            .template_error(&err, &Field::new("resource", "{{ .Name }}")),
        Consumer::Storage => service.new_storage_handler().error("sample event", &err),
        Consumer::TaskStore => service.new_task_store_handler().error(
            "sample event",
            &err,
            &[Field::new("task", "sample")],
        ),
        Consumer::Reporting => service.new_reporting_handler().error("sample event", &err),
        Consumer::Http => service
            .new_http_handler()
            .http_request_completed(&RequestLog {
                host: "127.0.0.1".to_string(),
                username: String::new(),
                start: Utc::now(),
                method: "GET".to_string(),
                uri: "/ping".to_string(),
                protocol: "HTTP/1.1".to_string(),
                status: 204,
                referer: String::new(),
                user_agent: concat!("beacon-emit/", env!("CARGO_PKG_VERSION")).to_string(),
                request_id: "sample".to_string(),
                duration: Duration::ZERO,
            }),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before parsing configuration
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let telemetry_config = create_telemetry_config(&cli).await?;

    if cli.print_config {
        print!("{}", telemetry_config.to_toml()?);
        return Ok(());
    }

    let _telemetry_guard = TelemetrySystem::init(telemetry_config.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Telemetry initialization failed: {}", e))?;

    if !telemetry_config.privacy.sanitize_enabled {
        warn!("Log sanitization disabled - sensitive data may be logged!");
    }

    let service = DiagnosticService::from_config(&telemetry_config)?;
    let consumers = selected_consumers(&cli);

    for consumer in &consumers {
        emit_sample(&service, *consumer);
    }

    info!(emitted = consumers.len(), "Diagnostic sample finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_all_consumers_by_default() {
        let cli = Cli::try_parse_from(["beacon-emit"]).unwrap();
        assert_eq!(selected_consumers(&cli), Consumer::ALL.to_vec());

        let cli =
            Cli::try_parse_from(["beacon-emit", "--consumer", "task-store", "--consumer", "http"])
                .unwrap();
        assert_eq!(
            selected_consumers(&cli),
            vec![Consumer::TaskStore, Consumer::Http]
        );
    }

    #[test]
    fn test_file_logging_flags_conflict() {
        let result = Cli::try_parse_from(["beacon-emit", "--file-logging", "--no-file-logging"]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_flags_override_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("telemetry.toml");
        std::fs::write(&path, "[logging]\nlevel = \"warn\"\nformat = \"pretty\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "beacon-emit",
            "--config",
            path.to_str().unwrap(),
            "--log-format",
            "json",
            "--no-sanitize",
        ])
        .unwrap();

        let config = create_telemetry_config(&cli).await.unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(!config.privacy.sanitize_enabled);
    }

    #[tokio::test]
    async fn test_invalid_level_is_rejected() {
        let cli = Cli::try_parse_from(["beacon-emit", "--log-level", "loud"]).unwrap();
        assert!(create_telemetry_config(&cli).await.is_err());
    }
}
