//! Protocol module containing the Mirror Transform and response layout.

pub mod mirror;

pub use mirror::{build_response, mirror, MAX_MESSAGE_BYTES, SIGNATURE};
