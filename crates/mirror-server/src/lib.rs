//! mirror-server library crate.
//!
//! A TCP server that answers every message with the message reversed and a
//! fixed signature appended, serving exactly one client at a time and keeping
//! an append-only text log of connections and messages.
//!
//! # Architecture
//!
//! ```text
//! TCP client
//!         ↕  raw text, one message per receive
//! [mirror-server]
//!   ├── domain/           SessionPolicy, ServerOptions, Session
//!   ├── application/      handle_client state machine, EventSink trait
//!   └── infrastructure/
//!         ├── config_file/ server_config.txt → ServerConfig
//!         ├── event_log/   server_log.txt appends (+ in-memory sink)
//!         └── server/      bind + serial accept loop
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain` and `mirror-core`, and on the tokio
//!   stream traits only.
//! - `infrastructure` depends on all other layers and owns files and sockets.

/// Domain layer: options, timing policy, session state.
pub mod domain;

/// Application layer: the per-client session state machine.
pub mod application;

/// Infrastructure layer: config file, event log, TCP accept loop.
pub mod infrastructure;
