//! Runtime options for the server.
//!
//! [`ServerOptions`] holds everything the server needs apart from the host and
//! port, which come from the configuration file.  It is built once in
//! `main.rs` from the command line and passed by value into
//! [`crate::infrastructure::run_server`]; nothing reads global state.

use std::path::PathBuf;
use std::time::Duration;

use mirror_core::MAX_MESSAGE_BYTES;

/// Default path of the two-line host/port file.
pub const DEFAULT_CONFIG_PATH: &str = "server_config.txt";

/// Default path of the append-only event log.
pub const DEFAULT_LOG_PATH: &str = "server_log.txt";

/// Simulated work delay before each response.
pub const PROCESSING_DELAY: Duration = Duration::from_secs(5);

/// A session is closed after the first response sent once this much time has
/// passed since the client connected.
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(30);

/// Timing and buffer limits for one client session.
///
/// Production always runs with [`SessionPolicy::default`].  Tests build
/// shorter policies so the session state machine can be exercised in
/// milliseconds instead of minutes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Sleep between receiving a message and sending its response.
    pub processing_delay: Duration,
    /// Elapsed session time after which no further message is read.
    ///
    /// Checked only after a response is sent: a client that stays silent is
    /// never disconnected by the server.
    pub session_timeout: Duration,
    /// Maximum bytes consumed by a single receive call.
    pub receive_buffer: usize,
}

impl Default for SessionPolicy {
    /// | Field            | Default    |
    /// |------------------|------------|
    /// | processing_delay | 5 seconds  |
    /// | session_timeout  | 30 seconds |
    /// | receive_buffer   | 1024 bytes |
    fn default() -> Self {
        Self {
            processing_delay: PROCESSING_DELAY,
            session_timeout: SESSION_TIMEOUT,
            receive_buffer: MAX_MESSAGE_BYTES,
        }
    }
}

/// What the accept loop does when a session ends with an I/O error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionErrorPolicy {
    /// Stop the server and return the error.
    #[default]
    Propagate,
    /// Log a warning and accept the next client.
    Continue,
}

/// All runtime options for the server.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Path of the configuration file holding host and port.
    pub config_path: PathBuf,
    /// Path of the event log that receives connection and message entries.
    pub log_path: PathBuf,
    /// Per-session timings.
    pub policy: SessionPolicy,
    /// Behaviour after a failed session.
    pub on_session_error: SessionErrorPolicy,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            policy: SessionPolicy::default(),
            on_session_error: SessionErrorPolicy::default(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
