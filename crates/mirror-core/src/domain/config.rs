//! Server configuration and its two-line text format.
//!
//! The configuration file looks like this (blank lines are ignored):
//!
//! ```text
//! ip=127.0.0.1
//! port=9000
//! ```
//!
//! Only the *position* of a line matters: the first non-empty line is the
//! host, the second is the port.  The keys in front of `=` are not checked.
//!
//! [`ServerConfig::parse`] is a pure function over the file contents.  Opening
//! the file is done by the server crate, which maps a missing file to
//! [`ConfigError::NotFound`].

use std::fmt;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

/// Error type for loading and parsing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file {} not found", .path.display())]
    NotFound { path: PathBuf },

    /// Any other I/O failure while reading the configuration file.
    #[error("I/O error reading configuration at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fewer than two non-empty lines were found.
    #[error("configuration must contain at least 2 non-empty lines (host and port), found {found}")]
    TooFewLines { found: usize },

    /// A required line has no `=` separator.
    #[error("line {line} has no '=' separator, expected: {expected}=<value>")]
    MissingSeparator { line: usize, expected: &'static str },

    /// The port value is not an integer in `0..=65535`.
    #[error("invalid port value '{value}': {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

impl ConfigError {
    /// Returns `true` for errors caused by the file contents rather than by
    /// the file system.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ConfigError::TooFewLines { .. }
                | ConfigError::MissingSeparator { .. }
                | ConfigError::InvalidPort { .. }
        )
    }
}

/// Address bound when the configured host is empty.
pub const ANY_IPV4_HOST: &str = "0.0.0.0";

/// Host and port the server listens on.
///
/// Built once at startup and never modified.  The host is kept as text; it
/// may be an IP literal or a name such as `localhost`, and is only validated
/// when the listener is bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface address or host name to bind.
    pub host: String,
    /// TCP port.  `0` lets the operating system choose a free port.
    pub port: u16,
}

impl ServerConfig {
    /// Creates a config from already-validated parts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Host to pass to the listener.
    ///
    /// An empty host means every IPv4 interface.
    ///
    /// ```rust
    /// use mirror_core::ServerConfig;
    ///
    /// assert_eq!(ServerConfig::new("", 9000).bind_host(), "0.0.0.0");
    /// assert_eq!(ServerConfig::new("localhost", 9000).bind_host(), "localhost");
    /// ```
    pub fn bind_host(&self) -> &str {
        if self.host.is_empty() {
            ANY_IPV4_HOST
        } else {
            &self.host
        }
    }

    /// Parses the contents of a configuration file.
    ///
    /// Lines are trimmed and empty lines are dropped.  The host is the text
    /// after the first `=` on the first remaining line; the port is the text
    /// after the first `=` on the second.  Both values are trimmed.  Any
    /// lines after the second are ignored.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::TooFewLines`] if fewer than two non-empty lines remain.
    /// - [`ConfigError::MissingSeparator`] if either line lacks `=`.
    /// - [`ConfigError::InvalidPort`] if the port is not an integer in `0..=65535`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mirror_core::ServerConfig;
    ///
    /// let cfg = ServerConfig::parse("ip=127.0.0.1\nport=9000\n").unwrap();
    /// assert_eq!(cfg, ServerConfig::new("127.0.0.1", 9000));
    /// ```
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.len() < 2 {
            return Err(ConfigError::TooFewLines { found: lines.len() });
        }

        let (host_key, host) = lines[0]
            .split_once('=')
            .ok_or(ConfigError::MissingSeparator {
                line: 1,
                expected: "ip",
            })?;

        let (port_key, port) = lines[1]
            .split_once('=')
            .ok_or(ConfigError::MissingSeparator {
                line: 2,
                expected: "port",
            })?;

        let port = port.trim();
        let port = port.parse::<u16>().map_err(|source| ConfigError::InvalidPort {
            value: port.to_string(),
            source,
        })?;

        debug!(
            "parsed configuration: {}={}, {}={port}",
            host_key.trim(),
            host.trim(),
            port_key.trim()
        );

        Ok(Self::new(host.trim(), port))
    }
}

impl fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
