//! In-memory capture backend

use crate::{Field, Level, Logger};
use std::sync::{Arc, Mutex, MutexGuard};

/// One captured log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub level: Level,
    pub message: String,
    /// Inherited fields first, then the fields supplied with the call
    pub fields: Vec<Field>,
}

impl Record {
    /// Value of the first field named `key`
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .map(|field| field.value.as_str())
    }

    /// Number of fields named `key`
    pub fn count(&self, key: &str) -> usize {
        self.fields.iter().filter(|field| field.key == key).count()
    }
}

/// Logger that records every entry in memory.
///
/// Loggers derived through [`Logger::with_fields`] write into the same
/// record list but each holds its own immutable field set.
#[derive(Debug, Clone)]
pub struct MemoryLogger {
    fields: Arc<[Field]>,
    records: Arc<Mutex<Vec<Record>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self {
            fields: Arc::from(Vec::new()),
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fields attached to every entry written through this handle
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Snapshot of everything recorded so far, oldest first
    pub fn records(&self) -> Vec<Record> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Record>> {
        // A panic while holding the lock cannot leave a Vec half-pushed.
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: Level, message: &str, fields: &[Field]) {
        let mut all = Vec::with_capacity(self.fields.len() + fields.len());
        all.extend_from_slice(&self.fields);
        all.extend_from_slice(fields);

        self.lock().push(Record {
            level,
            message: message.to_string(),
            fields: all,
        });
    }

    fn with_fields(&self, fields: &[Field]) -> Self {
        let derived: Vec<Field> = self.fields.iter().chain(fields).cloned().collect();
        Self {
            fields: derived.into(),
            records: Arc::clone(&self.records),
        }
    }
}
