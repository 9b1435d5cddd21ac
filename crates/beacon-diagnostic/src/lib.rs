//! # Beacon Diagnostic
//!
//! One structured logger, many narrow views of it.
//!
//! [`DiagnosticService`] owns the process-wide root logger and hands each
//! collaborating subsystem a handler that exposes only the events that
//! subsystem reports. Every handler is tagged with `service=<consumer>` when
//! it is built. Handlers for alerting integrations can be narrowed further
//! with `with_context`, which returns a new handler and leaves the original
//! untouched.
//!
//! ```rust
//! use beacon_core::{Field, MemoryLogger};
//! use beacon_diagnostic::DiagnosticService;
//!
//! let root = MemoryLogger::new();
//! let service = DiagnosticService::new(root.clone());
//!
//! let slack = service.new_slack_handler();
//! let delivery = slack.with_context(&[Field::new("handler", "ops-channel")]);
//! delivery.insecure_skip_verify();
//!
//! let record = &root.records()[0];
//! assert_eq!(record.field("service"), Some("slack"));
//! assert_eq!(record.field("handler"), Some("ops-channel"));
//! ```

pub mod alerta;
mod context;
pub mod http;
pub mod reporting;
pub mod service;
pub mod slack;
pub mod storage;
pub mod task_store;
pub mod victorops;

pub use alerta::AlertaDiagnostic;
pub use http::{HttpDiagnostic, RequestLog};
pub use reporting::ReportingDiagnostic;
pub use service::{Consumer, DiagnosticService};
pub use slack::SlackDiagnostic;
pub use storage::StorageDiagnostic;
pub use task_store::TaskStoreDiagnostic;
pub use victorops::VictorOpsDiagnostic;

/// Error type every reporting method accepts
pub type DynError = dyn std::error::Error + 'static;

/// Message used whenever an alerting integration runs with certificate
/// verification disabled
pub(crate) const INSECURE_SKIP_VERIFY: &str = "service is configured to skip ssl verification";

/// Caller-supplied message, or `fallback` when it is blank. Every entry
/// carries a non-empty message.
pub(crate) fn message<'a>(message: &'a str, fallback: &'static str) -> &'a str {
    if message.trim().is_empty() {
        fallback
    } else {
        message
    }
}
