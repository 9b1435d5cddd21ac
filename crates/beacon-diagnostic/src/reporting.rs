//! Diagnostics for the usage reporting service

use crate::{message, DynError};
use beacon_core::{Field, Logger};

pub trait ReportingDiagnostic: Send + Sync {
    fn error(&self, message: &str, err: &DynError);
}

pub(crate) struct ReportingHandler<L> {
    logger: L,
}

impl<L: Logger> ReportingHandler<L> {
    pub(crate) fn new(logger: L) -> Self {
        Self { logger }
    }
}

impl<L: Logger> ReportingDiagnostic for ReportingHandler<L> {
    fn error(&self, msg: &str, err: &DynError) {
        self.logger
            .error(message(msg, "reporting error"), &[Field::error(err)]);
    }
}
