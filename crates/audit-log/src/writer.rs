use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::entry::AuditEntry;

/// Errors that can occur during audit log I/O.
#[derive(Debug, thiserror::Error)]
pub enum AuditWriteError {
    #[error("failed to create parent directories: {0}")]
    CreateDir(std::io::Error),

    #[error("failed to open audit log file: {0}")]
    OpenFile(std::io::Error),

    #[error("failed to serialize audit entry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write to audit log: {0}")]
    Write(std::io::Error),

    #[error("failed to flush audit log: {0}")]
    Flush(std::io::Error),
}

/// Append-only file writer that serialises [`AuditEntry`] values as JSON-lines.
///
/// Each call to [`write`](Self::write) produces exactly one newline-terminated
/// JSON object in the output file.
pub struct AuditWriter {
    file: BufWriter<File>,
}

impl AuditWriter {
    /// Open (or create) the audit log file at `path` in append mode.
    ///
    /// Parent directories are created automatically if they do not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditWriteError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(AuditWriteError::CreateDir)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(AuditWriteError::OpenFile)?;

        Ok(Self {
            file: BufWriter::new(file),
        })
    }

    /// Serialise `entry` as a single JSON line and append it to the file.
    pub fn write(&mut self, entry: &AuditEntry) -> Result<(), AuditWriteError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        self.file.write_all(&line).map_err(AuditWriteError::Write)
    }

    /// Flush buffered lines to disk.
    pub fn flush(&mut self) -> Result<(), AuditWriteError> {
        self.file.flush().map_err(AuditWriteError::Flush)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{AuditEventType, AuditSource};

    #[test]
    fn writes_one_json_line_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("audit.jsonl");

        let mut writer = AuditWriter::open(&path).unwrap();
        for event in [AuditEventType::ProcessStarted, AuditEventType::ProcessStopped] {
            writer
                .write(&AuditEntry::new(
                    event,
                    AuditSource::new("test"),
                    serde_json::json!({}),
                ))
                .unwrap();
        }
        writer.flush().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: AuditEntry = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.event_type, AuditEventType::ProcessStarted);
    }

    #[test]
    fn appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        std::fs::write(&path, "{\"existing\":true}\n").unwrap();

        let mut writer = AuditWriter::open(&path).unwrap();
        writer
            .write(&AuditEntry::new(
                AuditEventType::PayloadEmitted,
                AuditSource::new("test"),
                serde_json::Value::Null,
            ))
            .unwrap();
        writer.flush().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.starts_with("{\"existing\":true}"));
    }

    #[test]
    fn open_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let err = AuditWriter::open(blocker.join("audit.jsonl")).err().unwrap();
        assert!(matches!(err, AuditWriteError::CreateDir(_)));
    }
}
