//! Per-connection session state.

use std::fmt;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use uuid::Uuid;

/// State for one accepted connection, from accept to close.
///
/// Only one `Session` exists at a time because the accept loop serves clients
/// one after another.  The stream itself stays with the connection handler,
/// and the wall-clock connect time is recorded in the `ClientConnected` event.
#[derive(Debug, Clone)]
pub struct Session {
    /// Random identifier used only in console diagnostics.
    pub id: Uuid,
    /// Address of the connected client.
    pub peer: SocketAddr,
    /// Monotonic instant the session started.
    pub started: Instant,
}

impl Session {
    /// Starts a new session for `peer` at the current instant.
    pub fn new(peer: SocketAddr) -> Self {
        Self {
            id: Uuid::new_v4(),
            peer,
            started: Instant::now(),
        }
    }

    /// Time since the session started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// `true` once strictly more than `limit` has passed since the start.
    pub fn has_exceeded(&self, limit: Duration) -> bool {
        self.elapsed() > limit
    }
}

/// Why a session ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The client closed its side of the connection.
    PeerClosed,
    /// The session ran past its time limit and the server closed it.
    TimedOut,
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEnd::PeerClosed => f.write_str("peer closed"),
            SessionEnd::TimedOut => f.write_str("session timeout"),
        }
    }
}

/// Outcome of a session that ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Number of responses sent.
    pub messages: usize,
    /// How the session ended.
    pub end: SessionEnd,
}
