//! `tracing` backend for the [`Logger`] capability

use crate::{config::TelemetryConfig, sanitization::FieldSanitizer, Result};
use beacon_core::{DisplayFields, Field, Level, Logger};
use std::sync::Arc;

/// Target every diagnostic event is emitted under
pub const DIAGNOSTIC_TARGET: &str = "beacon::diagnostic";

/// Logger that turns each entry into one `tracing` event.
///
/// Field keys are only known at runtime, so the entry's fields are rendered
/// into a single `fields` value (`k=v k2=v2`). Inherited fields are sanitized
/// once when a child is derived; call fields are sanitized on every entry.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    fields: Arc<[Field]>,
    sanitizer: Option<Arc<FieldSanitizer>>,
}

impl TracingLogger {
    /// Logger without sanitization
    pub fn new() -> Self {
        Self {
            fields: Arc::from(Vec::new()),
            sanitizer: None,
        }
    }

    /// Logger that redacts field values with `sanitizer`
    pub fn with_sanitizer(sanitizer: FieldSanitizer) -> Self {
        Self {
            fields: Arc::from(Vec::new()),
            sanitizer: Some(Arc::new(sanitizer)),
        }
    }

    /// Build the root logger described by `config`
    pub fn from_config(config: &TelemetryConfig) -> Result<Self> {
        if config.enabled && config.privacy.sanitize_enabled {
            Ok(Self::with_sanitizer(FieldSanitizer::new(&config.privacy)?))
        } else {
            Ok(Self::new())
        }
    }

    /// Fields attached to every entry written through this handle
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn sanitized(&self, fields: &[Field]) -> Vec<Field> {
        match &self.sanitizer {
            Some(sanitizer) => sanitizer.sanitize_all(fields),
            None => fields.to_vec(),
        }
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str, fields: &[Field]) {
        let mut all = Vec::with_capacity(self.fields.len() + fields.len());
        all.extend_from_slice(&self.fields);
        all.extend(self.sanitized(fields));

        let fields = DisplayFields(&all);
        match level {
            Level::Debug => tracing::debug!(target: DIAGNOSTIC_TARGET, fields = %fields, "{}", message),
            Level::Info => tracing::info!(target: DIAGNOSTIC_TARGET, fields = %fields, "{}", message),
            Level::Warn => tracing::warn!(target: DIAGNOSTIC_TARGET, fields = %fields, "{}", message),
            Level::Error => tracing::error!(target: DIAGNOSTIC_TARGET, fields = %fields, "{}", message),
        }
    }

    fn with_fields(&self, fields: &[Field]) -> Self {
        let mut derived = Vec::with_capacity(self.fields.len() + fields.len());
        derived.extend_from_slice(&self.fields);
        derived.extend(self.sanitized(fields));

        Self {
            fields: derived.into(),
            sanitizer: self.sanitizer.clone(),
        }
    }
}
