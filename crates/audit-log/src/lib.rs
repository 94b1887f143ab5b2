//! Append-only structured JSON-lines audit logging for form-relay.
//!
//! Each audit event is serialised as a single newline-terminated JSON object
//! and appended to a log file.  Entries record what happened to a submission
//! (received, answer rejected, payload emitted) and why, without ever copying
//! the submitted text into the log.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use audit_log::{AuditEntry, AuditEventType, AuditSink, AuditSource};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut sink = AuditSink::open("/var/log/form-relay/audit.jsonl")?;
//!
//! sink.log(&AuditEntry::new(
//!     AuditEventType::ProcessStarted,
//!     AuditSource::new("form-relay"),
//!     serde_json::json!({"version": "0.1.0"}),
//! ));
//! sink.close();
//! # Ok(())
//! # }
//! ```

pub mod entry;
pub mod sink;
pub mod writer;

// Re-export primary public types at the crate root for convenience.
pub use entry::{AuditEntry, AuditEventType, AuditSource};
pub use sink::AuditSink;
pub use writer::{AuditWriteError, AuditWriter};
