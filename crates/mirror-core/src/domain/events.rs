//! Event-log entries.
//!
//! Every line in `server_log.txt` is produced by formatting a [`LogEvent`].
//! Events are never stored: a value is built, rendered with `Display`, written
//! and dropped.
//!
//! # Line layout
//!
//! ```text
//! Сервер запущен: 2024-05-01 12:00:00.000000
//! Клиент подключен: 2024-05-01 12:00:01.250000, Адрес: 127.0.0.1:51514
//! Получено сообщение: 2024-05-01 12:00:02.000000, Сообщение: hello
//! Отправлено сообщение: 2024-05-01 12:00:07.000000, Сообщение: olleh. Сервер написан Исаевым М.А.
//! Клиент отключен: 2024-05-01 12:00:09.500000, Адрес: 127.0.0.1:51514
//! ```
//!
//! Payloads are written verbatim.  A response ends in `\n`, so the "sent"
//! entry is followed by an empty line once the writer appends its own newline.

use std::fmt;
use std::net::SocketAddr;

use chrono::{DateTime, Local};

/// `strftime` layout for event timestamps (local time, microsecond precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// The byte-order mark some editors and clients put at the start of text.
const BOM: char = '\u{feff}';

/// One entry in the event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// The server loaded its configuration and is about to bind.
    ServerStarted { at: DateTime<Local> },
    /// A client connection was accepted.
    ClientConnected {
        at: DateTime<Local>,
        peer: SocketAddr,
    },
    /// A non-empty payload was received from the client.
    MessageReceived { at: DateTime<Local>, data: String },
    /// A response was written to the client.
    MessageSent {
        at: DateTime<Local>,
        response: String,
    },
    /// The session ended and the connection is being closed.
    ClientDisconnected {
        at: DateTime<Local>,
        peer: SocketAddr,
    },
}

impl LogEvent {
    /// `ServerStarted` stamped with the current local time.
    pub fn server_started() -> Self {
        LogEvent::ServerStarted { at: Local::now() }
    }

    /// `ClientConnected` stamped with the current local time.
    pub fn client_connected(peer: SocketAddr) -> Self {
        LogEvent::ClientConnected {
            at: Local::now(),
            peer,
        }
    }

    /// `MessageReceived` stamped with the current local time.
    pub fn message_received(data: impl Into<String>) -> Self {
        LogEvent::MessageReceived {
            at: Local::now(),
            data: data.into(),
        }
    }

    /// `MessageSent` stamped with the current local time.
    pub fn message_sent(response: impl Into<String>) -> Self {
        LogEvent::MessageSent {
            at: Local::now(),
            response: response.into(),
        }
    }

    /// `ClientDisconnected` stamped with the current local time.
    pub fn client_disconnected(peer: SocketAddr) -> Self {
        LogEvent::ClientDisconnected {
            at: Local::now(),
            peer,
        }
    }

    /// The fixed label that starts the log line.
    pub fn label(&self) -> &'static str {
        match self {
            LogEvent::ServerStarted { .. } => "Сервер запущен",
            LogEvent::ClientConnected { .. } => "Клиент подключен",
            LogEvent::MessageReceived { .. } => "Получено сообщение",
            LogEvent::MessageSent { .. } => "Отправлено сообщение",
            LogEvent::ClientDisconnected { .. } => "Клиент отключен",
        }
    }

    /// When the event happened.
    pub fn timestamp(&self) -> DateTime<Local> {
        match self {
            LogEvent::ServerStarted { at }
            | LogEvent::ClientConnected { at, .. }
            | LogEvent::MessageReceived { at, .. }
            | LogEvent::MessageSent { at, .. }
            | LogEvent::ClientDisconnected { at, .. } => *at,
        }
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts = self.timestamp().format(TIMESTAMP_FORMAT);
        match self {
            LogEvent::ServerStarted { .. } => write!(f, "{}: {ts}", self.label()),
            LogEvent::ClientConnected { peer, .. } | LogEvent::ClientDisconnected { peer, .. } => {
                write!(f, "{}: {ts}, Адрес: {peer}", self.label())
            }
            LogEvent::MessageReceived { data, .. } => {
                write!(f, "{}: {ts}, Сообщение: {data}", self.label())
            }
            LogEvent::MessageSent { response, .. } => {
                write!(f, "{}: {ts}, Сообщение: {response}", self.label())
            }
        }
    }
}

/// Removes every byte-order-mark character from `message`.
///
/// Borrows when there is nothing to strip.
pub fn strip_bom(message: &str) -> std::borrow::Cow<'_, str> {
    if message.contains(BOM) {
        std::borrow::Cow::Owned(message.replace(BOM, ""))
    } else {
        std::borrow::Cow::Borrowed(message)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
