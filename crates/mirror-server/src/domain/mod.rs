//! Domain layer for mirror-server.
//!
//! Plain types with no I/O: the runtime options assembled by `main.rs`, the
//! timing policy for a client session, and the per-connection session state.
//!
//! # What does NOT belong here?
//!
//! - Any `tokio`, `TcpStream`, or file types
//! - Reading the configuration file or writing the event log
//! - The accept loop

pub mod options;
pub mod session;

pub use options::{ServerOptions, SessionErrorPolicy, SessionPolicy};
pub use session::{Session, SessionEnd, SessionSummary};
