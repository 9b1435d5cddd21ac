//! The logger capability diagnostic handlers are built on

use crate::{Field, Level};

/// A structured logger a diagnostic handler can write through.
///
/// Implementations must be safe to share across threads without external
/// locking. [`Logger::with_fields`] never mutates the receiver: it returns an
/// independent handle whose entries carry the receiver's fields followed by
/// the new ones.
pub trait Logger: Send + Sync + 'static {
    /// Emit one entry at `level`
    fn log(&self, level: Level, message: &str, fields: &[Field]);

    /// Derive a child logger carrying `fields` on every entry
    fn with_fields(&self, fields: &[Field]) -> Self
    where
        Self: Sized;

    fn debug(&self, message: &str, fields: &[Field]) {
        self.log(Level::Debug, message, fields);
    }

    fn info(&self, message: &str, fields: &[Field]) {
        self.log(Level::Info, message, fields);
    }

    fn warn(&self, message: &str, fields: &[Field]) {
        self.log(Level::Warn, message, fields);
    }

    fn error(&self, message: &str, fields: &[Field]) {
        self.log(Level::Error, message, fields);
    }
}

/// Logger that discards every entry
#[derive(Debug, Clone, Copy, Default)]
pub struct NopLogger;

impl Logger for NopLogger {
    fn log(&self, _level: Level, _message: &str, _fields: &[Field]) {}

    fn with_fields(&self, _fields: &[Field]) -> Self {
        NopLogger
    }
}
