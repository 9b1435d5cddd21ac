//! Diagnostics for the VictorOps alert integration

use crate::{message, DynError};
use beacon_core::{Field, Logger};

/// Events the VictorOps integration reports
pub trait VictorOpsDiagnostic: Send + Sync {
    fn error(&self, message: &str, err: &DynError);

    fn with_context(&self, context: &[Field]) -> Box<dyn VictorOpsDiagnostic>;
}

pub(crate) struct VictorOpsHandler<L> {
    logger: L,
}

impl<L: Logger> VictorOpsHandler<L> {
    pub(crate) fn new(logger: L) -> Self {
        Self { logger }
    }
}

impl<L: Logger> VictorOpsDiagnostic for VictorOpsHandler<L> {
    fn error(&self, msg: &str, err: &DynError) {
        self.logger
            .error(message(msg, "victorops error"), &[Field::error(err)]);
    }

    fn with_context(&self, context: &[Field]) -> Box<dyn VictorOpsDiagnostic> {
        Box::new(VictorOpsHandler::new(self.logger.with_fields(context)))
    }
}
