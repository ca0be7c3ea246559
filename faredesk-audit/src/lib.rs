pub mod diff;
pub mod models;
pub mod recorder;

pub use models::{AuditAction, AuditEntry, AuditRecord, FieldChange, NameEditEntry};
pub use recorder::{AuditRecorder, AuditSink};
