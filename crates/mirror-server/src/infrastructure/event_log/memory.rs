//! In-memory event sink for tests.
//!
//! Records every event in a `Mutex<Vec<...>>` so assertions can inspect the
//! exact sequence a session produced without touching the file system.
//!
//! # Usage in tests
//!
//! ```ignore
//! let sink = MemoryEventSink::new();
//! handle_client(stream, peer, &sink, &policy).await?;
//!
//! let events = sink.events();
//! assert_eq!(events[0].label(), "Клиент подключен");
//! ```
//!
//! # `should_fail` flag
//!
//! [`MemoryEventSink::failing`] builds a sink whose every `record` call
//! returns an I/O error, for testing the error paths of callers.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use mirror_core::LogEvent;

use crate::application::EventSink;

/// A sink that keeps events in memory instead of writing a file.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<LogEvent>>,
    /// When `true`, `record` returns an error and stores nothing.
    pub should_fail: bool,
}

impl MemoryEventSink {
    /// Creates an empty sink that accepts every event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink whose `record` always fails.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Returns a copy of the recorded events in order.
    pub fn events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    /// Returns the rendered log lines in order.
    pub fn lines(&self) -> Vec<String> {
        self.lock().iter().map(ToString::to_string).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        // A panicking test thread must not hide the events from the others.
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl EventSink for MemoryEventSink {
    async fn record(&self, event: &LogEvent) -> std::io::Result<()> {
        if self.should_fail {
            return Err(std::io::Error::other("injected event log failure"));
        }
        self.lock().push(event.clone());
        Ok(())
    }
}
