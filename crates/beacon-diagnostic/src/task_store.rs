//! Diagnostics for the task store and its storage migration

use crate::{context::report_error, message, DynError};
use beacon_core::{Field, Logger};

/// Events the task store reports.
///
/// The task store has no per-operation handler; context travels with each
/// call instead.
pub trait TaskStoreDiagnostic: Send + Sync {
    fn starting_task(&self, task_id: &str);

    fn started_task(&self, task_id: &str);

    fn finished_task(&self, task_id: &str);

    fn debug(&self, message: &str);

    /// Report a failure with optional context pairs, logged after the error
    /// in the order given
    fn error(&self, message: &str, err: &DynError, context: &[Field]);

    /// `entity` is the kind of record (task, template, ...) and becomes the
    /// field key; `id` is its value
    fn already_migrated(&self, entity: &str, id: &str);

    fn migrated(&self, entity: &str, id: &str);
}

pub(crate) struct TaskStoreHandler<L> {
    logger: L,
}

impl<L: Logger> TaskStoreHandler<L> {
    pub(crate) fn new(logger: L) -> Self {
        Self { logger }
    }
}

impl<L: Logger> TaskStoreDiagnostic for TaskStoreHandler<L> {
    fn starting_task(&self, task_id: &str) {
        self.logger
            .debug("starting enabled task on startup", &[Field::new("task", task_id)]);
    }

    fn started_task(&self, task_id: &str) {
        self.logger
            .debug("started task during startup", &[Field::new("task", task_id)]);
    }

    fn finished_task(&self, task_id: &str) {
        self.logger.debug("task finished", &[Field::new("task", task_id)]);
    }

    fn debug(&self, msg: &str) {
        self.logger.debug(message(msg, "task store debug"), &[]);
    }

    fn error(&self, msg: &str, err: &DynError, context: &[Field]) {
        report_error(&self.logger, message(msg, "task store error"), err, context);
    }

    fn already_migrated(&self, entity: &str, id: &str) {
        self.logger.debug(
            "entity has already been migrated skipping",
            &[Field::new(entity, id)],
        );
    }

    fn migrated(&self, entity: &str, id: &str) {
        self.logger.debug(
            "entity was migrated to new storage service",
            &[Field::new(entity, id)],
        );
    }
}
