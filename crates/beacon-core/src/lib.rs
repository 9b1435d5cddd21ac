//! # Beacon Core
//!
//! The vocabulary every Beacon crate shares: the [`Field`] attached to a log
//! entry, the [`Level`] an event is reported at, and the [`Logger`]
//! capability a diagnostic handler wraps.
//!
//! Two in-process backends live here as well. [`MemoryLogger`] records every
//! entry for later inspection, [`NopLogger`] throws everything away.

pub mod field;
pub mod level;
pub mod logger;
pub mod memory;

pub use field::{DisplayFields, Field, ERROR_KEY, SERVICE_KEY};
pub use level::Level;
pub use logger::{Logger, NopLogger};
pub use memory::{MemoryLogger, Record};
