//! Audit logging for envelope-plan
//!
//! Every persisted create, update or removal is appended to `audit.log` as one JSON
//! line carrying the row before and after the write.
//!
//! - `AuditEntry`: one logged operation with before/after values.
//! - `AuditLogger`: appends entries to the JSONL file and reads them back.
//! - `summarize_changes`: short field-level summary of an update.

mod diff;
mod entry;
mod logger;

pub use diff::summarize_changes;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
