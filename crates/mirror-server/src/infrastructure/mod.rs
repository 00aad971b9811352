//! Infrastructure layer for mirror-server.
//!
//! Everything that touches the outside world: the configuration file, the
//! event log file and the TCP listener.
//!
//! # Responsibilities
//!
//! - Reading `server_config.txt` into a `ServerConfig`
//! - Appending entries to `server_log.txt`
//! - Binding the listener and running the serial accept loop
//! - Observing the shutdown flag between accepts
//!
//! # What does NOT belong here?
//!
//! - The session state machine (that is the application layer)
//! - Response layout and config syntax (those live in `mirror-core`)
//! - Command-line parsing (that is done in `main.rs`)

pub mod config_file;
pub mod event_log;
pub mod server;

// Re-export the primary entry points so `main.rs` can call them concisely.
pub use config_file::load_config;
pub use event_log::{write_log, EventLogFile, MemoryEventSink};
pub use server::{run_server, run_server_on, ConnectionSource};
