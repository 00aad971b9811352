//! Append-only event log file.
//!
//! Each [`write_log`] call opens the file in append mode, writes one line and
//! closes the file again.  No handle is kept between calls, so the file can be
//! rotated or inspected while the server runs.  There is no locking: the
//! server only ever has one session writing at a time.

pub mod memory;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mirror_core::{strip_bom, LogEvent};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::application::EventSink;

pub use memory::MemoryEventSink;

/// Appends `message` followed by a newline to the file at `path`.
///
/// Byte-order-mark characters are removed from `message` first.  The file is
/// created if it does not exist and is never truncated.
///
/// # Errors
///
/// Returns the underlying I/O error if the file cannot be opened or written.
pub async fn write_log(path: &Path, message: &str) -> std::io::Result<()> {
    let mut line = strip_bom(message).into_owned();
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    // tokio's File finishes writes in the background; flush so the line is on
    // disk before the handle is dropped.
    file.flush().await
}

/// [`EventSink`] that appends each event as one line of the log file.
#[derive(Debug, Clone)]
pub struct EventLogFile {
    path: PathBuf,
}

impl EventLogFile {
    /// Creates a sink writing to `path`.  The file is not touched until the
    /// first event is recorded.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EventSink for EventLogFile {
    async fn record(&self, event: &LogEvent) -> std::io::Result<()> {
        write_log(&self.path, &event.to_string()).await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_log_creates_missing_file() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server_log.txt");

        // Act
        write_log(&path, "first").await.unwrap();

        // Assert
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\n");
    }

    #[tokio::test]
    async fn test_write_log_appends_in_call_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");

        write_log(&path, "one").await.unwrap();
        write_log(&path, "two").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[tokio::test]
    async fn test_write_log_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        std::fs::write(&path, "previous run\n").unwrap();

        write_log(&path, "this run").await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "previous run\nthis run\n"
        );
    }

    #[tokio::test]
    async fn test_write_log_strips_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");

        write_log(&path, "\u{feff}Сообщение\u{feff}").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Сообщение\n");
    }

    #[tokio::test]
    async fn test_write_log_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("log.txt");

        let result = write_log(&path, "x").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_event_log_file_writes_rendered_event() {
        let dir = tempfile::tempdir().unwrap();
        let log = EventLogFile::new(dir.path().join("log.txt"));

        log.record(&LogEvent::message_received("hello")).await.unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert!(content.starts_with("Получено сообщение: "));
        assert!(content.ends_with(", Сообщение: hello\n"));
    }
}
