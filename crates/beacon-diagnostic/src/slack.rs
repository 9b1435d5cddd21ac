//! Diagnostics for the Slack alert integration

use crate::{message, DynError, INSECURE_SKIP_VERIFY};
use beacon_core::{Field, Logger};

/// Events the Slack integration reports
pub trait SlackDiagnostic: Send + Sync {
    /// Certificate verification is disabled. Report it every time the
    /// insecure configuration is in effect.
    fn insecure_skip_verify(&self);

    fn error(&self, message: &str, err: &DynError);

    /// Handler scoped to one unit of work, such as a single alert delivery
    fn with_context(&self, context: &[Field]) -> Box<dyn SlackDiagnostic>;
}

pub(crate) struct SlackHandler<L> {
    logger: L,
}

impl<L: Logger> SlackHandler<L> {
    pub(crate) fn new(logger: L) -> Self {
        Self { logger }
    }
}

impl<L: Logger> SlackDiagnostic for SlackHandler<L> {
    fn insecure_skip_verify(&self) {
        self.logger.warn(INSECURE_SKIP_VERIFY, &[]);
    }

    fn error(&self, msg: &str, err: &DynError) {
        self.logger
            .error(message(msg, "slack error"), &[Field::error(err)]);
    }

    fn with_context(&self, context: &[Field]) -> Box<dyn SlackDiagnostic> {
        Box::new(SlackHandler::new(self.logger.with_fields(context)))
    }
}
