//! Application layer for mirror-server.
//!
//! Serves one client session: receive, mirror, respond and record each step
//! in the event log.
//!
//! # Responsibilities
//!
//! - The session state machine (`handle_client`)
//! - The [`EventSink`] trait the state machine records events through
//! - The `SessionError` type for failed sessions
//!
//! # What does NOT belong here?
//!
//! - Binding or accepting sockets (that is infrastructure)
//! - Opening the log file (the file-backed `EventSink` is infrastructure)

pub mod handle_client;

pub use handle_client::{handle_client, EventSink, SessionError};
