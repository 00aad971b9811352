//! The Mirror Transform and the response the server sends back.
//!
//! Wire format (server → client):
//! ```text
//! <input reversed character-by-character>. Сервер написан Исаевым М.А.\n
//! ```
//!
//! There is no request framing: whatever a single receive call returns is
//! treated as one message, so the input may itself contain newlines.
//!
//! # Characters, not bytes
//!
//! Rust strings are UTF-8.  Reversing the raw bytes of `"привет"` would split
//! each two-byte Cyrillic letter and produce invalid UTF-8.  [`mirror`]
//! reverses Unicode scalar values (`char`s) instead, which is always valid
//! and is the inverse of itself.

/// The fixed trailer appended to every response.
pub const SIGNATURE: &str = "Сервер написан Исаевым М.А.";

/// Maximum number of bytes consumed by one receive call.
pub const MAX_MESSAGE_BYTES: usize = 1024;

/// Returns the characters of `s` in reverse order.
///
/// Pure and total: every input, including the empty string, has a result.
///
/// # Examples
///
/// ```rust
/// use mirror_core::mirror;
///
/// assert_eq!(mirror("hello"), "olleh");
/// assert_eq!(mirror(&mirror("привет")), "привет");
/// ```
pub fn mirror(s: &str) -> String {
    s.chars().rev().collect()
}

/// Builds the full response line for a received payload.
///
/// The result is `mirror(payload) + ". " + SIGNATURE + "\n"`.
///
/// # Examples
///
/// ```rust
/// use mirror_core::build_response;
///
/// assert_eq!(build_response("hello"), "olleh. Сервер написан Исаевым М.А.\n");
/// ```
pub fn build_response(payload: &str) -> String {
    let mirrored = mirror(payload);
    let mut response = String::with_capacity(mirrored.len() + SIGNATURE.len() + 3);
    response.push_str(&mirrored);
    response.push_str(". ");
    response.push_str(SIGNATURE);
    response.push('\n');
    response
}
