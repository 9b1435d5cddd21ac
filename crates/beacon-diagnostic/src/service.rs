//! The diagnostic service: one root logger, one handler factory per consumer

use crate::{
    alerta::{AlertaDiagnostic, AlertaHandler},
    http::{HttpDiagnostic, HttpHandler},
    reporting::{ReportingDiagnostic, ReportingHandler},
    slack::{SlackDiagnostic, SlackHandler},
    storage::{StorageDiagnostic, StorageHandler},
    task_store::{TaskStoreDiagnostic, TaskStoreHandler},
    victorops::{VictorOpsDiagnostic, VictorOpsHandler},
};
use beacon_core::{Field, Logger, SERVICE_KEY};
use beacon_telemetry::{TelemetryConfig, TracingLogger};
use std::fmt;

/// Every subsystem the service builds a handler for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Consumer {
    VictorOps,
    Slack,
    Alerta,
    Storage,
    TaskStore,
    Reporting,
    Http,
}

impl Consumer {
    pub const ALL: [Consumer; 7] = [
        Consumer::VictorOps,
        Consumer::Slack,
        Consumer::Alerta,
        Consumer::Storage,
        Consumer::TaskStore,
        Consumer::Reporting,
        Consumer::Http,
    ];

    /// Value of the `service` field on this consumer's entries
    pub fn as_str(&self) -> &'static str {
        match self {
            Consumer::VictorOps => "victorops",
            Consumer::Slack => "slack",
            Consumer::Alerta => "alerta",
            Consumer::Storage => "storage",
            Consumer::TaskStore => "task_store",
            Consumer::Reporting => "reporting",
            Consumer::Http => "http",
        }
    }
}

impl fmt::Display for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owner of the process-wide root logger.
///
/// Create one at startup and pass it to whatever wires subsystems together.
/// Each factory derives a child of the root tagged `service=<consumer>` and
/// wraps it in that consumer's handler; the root itself is never changed.
pub struct DiagnosticService<L: Logger> {
    logger: L,
}

impl<L: Logger> DiagnosticService<L> {
    pub fn new(logger: L) -> Self {
        Self { logger }
    }

    /// The root logger every handler is derived from
    pub fn logger(&self) -> &L {
        &self.logger
    }

    fn tagged(&self, consumer: Consumer) -> L {
        self.logger
            .with_fields(&[Field::new(SERVICE_KEY, consumer.as_str())])
    }

    pub fn new_victorops_handler(&self) -> Box<dyn VictorOpsDiagnostic> {
        Box::new(VictorOpsHandler::new(self.tagged(Consumer::VictorOps)))
    }

    pub fn new_slack_handler(&self) -> Box<dyn SlackDiagnostic> {
        Box::new(SlackHandler::new(self.tagged(Consumer::Slack)))
    }

    pub fn new_alerta_handler(&self) -> Box<dyn AlertaDiagnostic> {
        Box::new(AlertaHandler::new(self.tagged(Consumer::Alerta)))
    }

    pub fn new_storage_handler(&self) -> Box<dyn StorageDiagnostic> {
        Box::new(StorageHandler::new(self.tagged(Consumer::Storage)))
    }

    pub fn new_task_store_handler(&self) -> Box<dyn TaskStoreDiagnostic> {
        Box::new(TaskStoreHandler::new(self.tagged(Consumer::TaskStore)))
    }

    pub fn new_reporting_handler(&self) -> Box<dyn ReportingDiagnostic> {
        Box::new(ReportingHandler::new(self.tagged(Consumer::Reporting)))
    }

    pub fn new_http_handler(&self) -> Box<dyn HttpDiagnostic> {
        Box::new(HttpHandler::new(self.tagged(Consumer::Http)))
    }
}

impl DiagnosticService<TracingLogger> {
    /// Service writing through `tracing`, sanitized as `config` asks.
    ///
    /// Fails only if a redaction pattern does not compile.
    pub fn from_config(config: &TelemetryConfig) -> beacon_telemetry::Result<Self> {
        Ok(Self::new(TracingLogger::from_config(config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::{Level, MemoryLogger, NopLogger};
    use std::io;

    #[test]
    fn test_each_factory_tags_its_consumer() {
        let root = MemoryLogger::new();
        let service = DiagnosticService::new(root.clone());
        let err = io::Error::new(io::ErrorKind::Other, "boom");

        service.new_victorops_handler().error("victorops", &err);
        service.new_slack_handler().error("slack", &err);
        service.new_alerta_handler().error("alerta", &err);
        service.new_storage_handler().error("storage", &err);
        service.new_task_store_handler().error("task_store", &err, &[]);
        service.new_reporting_handler().error("reporting", &err);
        service.new_http_handler().error("http", &err);

        let records = root.records();
        assert_eq!(records.len(), Consumer::ALL.len());
        for (record, consumer) in records.iter().zip(Consumer::ALL) {
            assert_eq!(record.message, consumer.as_str());
            assert_eq!(record.fields[0], Field::new("service", consumer.as_str()));
            assert_eq!(record.count("service"), 1);
        }
    }

    #[test]
    fn test_blank_messages_fall_back_to_event_name() {
        let root = MemoryLogger::new();
        let service = DiagnosticService::new(root.clone());
        let err = io::Error::new(io::ErrorKind::Other, "boom");
        let request = crate::RequestLog {
            host: "10.0.0.7".to_string(),
            username: String::new(),
            start: chrono::Utc::now(),
            method: "GET".to_string(),
            uri: "/".to_string(),
            protocol: "HTTP/1.1".to_string(),
            status: 500,
            referer: String::new(),
            user_agent: String::new(),
            request_id: String::new(),
            duration: std::time::Duration::ZERO,
        };

        let task_store = service.new_task_store_handler();
        task_store.debug("");
        task_store.error("", &err, &[]);
        task_store.error(" ", &err, &[Field::new("task", "t1")]);
        service.new_storage_handler().error("", &err);
        service.new_reporting_handler().error("", &err);
        service.new_slack_handler().error("", &err);
        service.new_victorops_handler().error("\t", &err);
        service.new_alerta_handler().error("", &err);
        let http = service.new_http_handler();
        http.recovery_error("", &err, &request);
        http.error("", &err);

        let messages: Vec<_> = root.records().into_iter().map(|r| r.message).collect();
        assert_eq!(
            messages,
            vec![
                "task store debug",
                "task store error",
                "task store error",
                "storage error",
                "reporting error",
                "slack error",
                "victorops error",
                "alerta error",
                "recovered from http handler panic",
                "http error",
            ]
        );
    }

    #[test]
    fn test_service_tag_is_not_repeated_by_context() {
        let root = MemoryLogger::new();
        let service = DiagnosticService::new(root.clone());

        let scoped = service
            .new_slack_handler()
            .with_context(&[Field::new("handler", "h1")])
            .with_context(&[Field::new("alert", "cpu")]);
        scoped.insecure_skip_verify();

        let record = &root.records()[0];
        assert_eq!(record.level, Level::Warn);
        assert_eq!(
            record.fields,
            vec![
                Field::new("service", "slack"),
                Field::new("handler", "h1"),
                Field::new("alert", "cpu"),
            ]
        );
    }

    #[test]
    fn test_root_logger_is_untouched() {
        let root = MemoryLogger::new().with_fields(&[Field::new("host", "node-1")]);
        let service = DiagnosticService::new(root);

        let _ = service.new_http_handler();
        let _ = service.new_slack_handler().with_context(&[Field::new("k", "v")]);

        assert_eq!(service.logger().fields(), &[Field::new("host", "node-1")]);
    }

    #[test]
    fn test_unavailable_backend_discards() {
        let service = DiagnosticService::new(NopLogger);
        let http = service.new_http_handler();
        http.starting_service();
        http.stopped_service();
    }

    #[test]
    fn test_from_config() {
        let service = DiagnosticService::from_config(&TelemetryConfig::default()).unwrap();
        service.new_reporting_handler();

        let mut config = TelemetryConfig::default();
        config.privacy.redaction_patterns = vec!["(".to_string()];
        assert!(DiagnosticService::from_config(&config).is_err());
    }

    #[test]
    fn test_consumer_names() {
        let names: Vec<_> = Consumer::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(
            names,
            vec!["victorops", "slack", "alerta", "storage", "task_store", "reporting", "http"]
        );
    }
}
