//! Diagnostics for the Alerta alert integration

use crate::{message, DynError, INSECURE_SKIP_VERIFY};
use beacon_core::{Field, Logger};

/// Events the Alerta integration reports
pub trait AlertaDiagnostic: Send + Sync {
    /// A template for an alert attribute failed to render. `field` names the
    /// attribute and the template that failed.
    fn template_error(&self, err: &DynError, field: &Field);

    fn insecure_skip_verify(&self);

    fn error(&self, message: &str, err: &DynError);

    fn with_context(&self, context: &[Field]) -> Box<dyn AlertaDiagnostic>;
}

pub(crate) struct AlertaHandler<L> {
    logger: L,
}

impl<L: Logger> AlertaHandler<L> {
    pub(crate) fn new(logger: L) -> Self {
        Self { logger }
    }
}

impl<L: Logger> AlertaDiagnostic for AlertaHandler<L> {
    fn template_error(&self, err: &DynError, field: &Field) {
        self.logger.error(
            "failed to evaluate Alerta template",
            &[Field::error(err), field.clone()],
        );
    }

    fn insecure_skip_verify(&self) {
        self.logger.warn(INSECURE_SKIP_VERIFY, &[]);
    }

    fn error(&self, msg: &str, err: &DynError) {
        self.logger
            .error(message(msg, "alerta error"), &[Field::error(err)]);
    }

    fn with_context(&self, context: &[Field]) -> Box<dyn AlertaDiagnostic> {
        Box::new(AlertaHandler::new(self.logger.with_fields(context)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::{Level, MemoryLogger};
    use std::io;

    #[test]
    fn test_template_error_fields() {
        let logger = MemoryLogger::new();
        let handler = AlertaHandler::new(logger.clone()).with_context(&[Field::new("handler", "a1")]);

        let err = io::Error::new(io::ErrorKind::InvalidData, "unknown variable .Foo");
        handler.template_error(&err, &Field::new("resource", "{{ .Foo }}"));

        let record = &logger.records()[0];
        assert_eq!(record.level, Level::Error);
        assert_eq!(record.message, "failed to evaluate Alerta template");
        assert_eq!(
            record.fields,
            vec![
                Field::new("handler", "a1"),
                Field::new("error", "unknown variable .Foo"),
                Field::new("resource", "{{ .Foo }}"),
            ]
        );
    }
}
