use std::path::Path;

use crate::entry::AuditEntry;
use crate::writer::{AuditWriteError, AuditWriter};

/// Best-effort front end to an [`AuditWriter`].
///
/// Audit failures must never block a submission, so [`log`](Self::log)
/// reports I/O errors through `tracing::error` and drops the entry instead of
/// returning them.  A disabled sink accepts and discards everything.
pub struct AuditSink {
    writer: Option<AuditWriter>,
    written: usize,
}

impl AuditSink {
    /// Open the audit file at `path`.  Failing to open is an error: a
    /// misconfigured audit path should stop startup.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditWriteError> {
        Ok(Self {
            writer: Some(AuditWriter::open(path)?),
            written: 0,
        })
    }

    /// A sink that records nothing.
    pub fn disabled() -> Self {
        Self {
            writer: None,
            written: 0,
        }
    }

    /// Number of entries successfully written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Append `entry`, logging and skipping it on failure.
    pub fn log(&mut self, entry: &AuditEntry) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        match writer.write(entry) {
            Ok(()) => self.written += 1,
            Err(err) => {
                tracing::error!(%err, event_type = ?entry.event_type, "failed to write audit entry");
            }
        }
    }

    /// Flush outstanding lines; called once at shutdown.
    pub fn close(mut self) {
        if let Some(writer) = self.writer.as_mut() {
            if let Err(err) = writer.flush() {
                tracing::error!(%err, "failed to flush audit log on shutdown");
            }
        }
        tracing::debug!(written = self.written, "audit sink closed");
    }
}
