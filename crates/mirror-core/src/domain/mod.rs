//! Domain types for the mirror server.
//!
//! Plain data and pure parsing/formatting.  Reading files and talking to
//! sockets is left to the `mirror-server` crate.

pub mod config;
pub mod events;

pub use config::{ConfigError, ServerConfig};
pub use events::LogEvent;
