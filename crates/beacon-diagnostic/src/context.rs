//! Shared rendering of `error(message, err, context...)` events

use crate::DynError;
use beacon_core::{Field, Logger};

/// Log `message` at error severity with the error first and `context` after
/// it, in the order supplied.
///
/// Callers almost always pass zero, one or two context pairs, so those arities
/// build their field list on the stack. Longer lists fall back to
/// [`report_error_generic`]; both produce the same entry.
pub(crate) fn report_error<L: Logger>(
    logger: &L,
    message: &str,
    err: &DynError,
    context: &[Field],
) {
    match context {
        [] => logger.error(message, &[Field::error(err)]),
        [a] => logger.error(message, &[Field::error(err), a.clone()]),
        [a, b] => logger.error(message, &[Field::error(err), a.clone(), b.clone()]),
        _ => report_error_generic(logger, message, err, context),
    }
}

pub(crate) fn report_error_generic<L: Logger>(
    logger: &L,
    message: &str,
    err: &DynError,
    context: &[Field],
) {
    let mut fields = Vec::with_capacity(context.len() + 1);
    fields.push(Field::error(err));
    fields.extend_from_slice(context);
    logger.error(message, &fields);
}
