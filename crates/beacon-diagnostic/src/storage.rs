//! Diagnostics for the storage service

use crate::{message, DynError};
use beacon_core::{Field, Logger};

pub trait StorageDiagnostic: Send + Sync {
    fn error(&self, message: &str, err: &DynError);
}

pub(crate) struct StorageHandler<L> {
    logger: L,
}

impl<L: Logger> StorageHandler<L> {
    pub(crate) fn new(logger: L) -> Self {
        Self { logger }
    }
}

impl<L: Logger> StorageDiagnostic for StorageHandler<L> {
    fn error(&self, msg: &str, err: &DynError) {
        self.logger
            .error(message(msg, "storage error"), &[Field::error(err)]);
    }
}
