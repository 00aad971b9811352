//! # mirror-core
//!
//! Shared library for the mirror server containing the text protocol, the
//! configuration file format, and the event-log line format.
//!
//! This crate has no dependencies on sockets, files, or an async runtime.
//! Everything in it is a pure function or a plain data type, so it can be
//! tested without a network and reused by any front end.
//!
//! # Overview
//!
//! The mirror server reads text from a TCP peer, reverses it, appends a fixed
//! signature and sends it back.  This crate defines:
//!
//! - **`protocol`** – The Mirror Transform and the exact response layout
//!   (`<reversed>. <signature>\n`).
//!
//! - **`domain`** – [`ServerConfig`] and its two-line `key=value` file format,
//!   plus [`LogEvent`], the five kinds of entries written to the event log.

pub mod domain;
pub mod protocol;

// Re-export the most-used items at the crate root so callers can write
// `mirror_core::mirror` instead of `mirror_core::protocol::mirror::mirror`.
pub use domain::config::{ConfigError, ServerConfig, ANY_IPV4_HOST};
pub use domain::events::{strip_bom, LogEvent, TIMESTAMP_FORMAT};
pub use protocol::mirror::{build_response, mirror, MAX_MESSAGE_BYTES, SIGNATURE};
