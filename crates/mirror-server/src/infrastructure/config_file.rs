//! Loading the host/port configuration file from disk.
//!
//! The file format and its parsing rules live in
//! [`mirror_core::ServerConfig::parse`]; this module only reads the file and
//! reports failures.

use std::io::ErrorKind;
use std::path::Path;

use mirror_core::{ConfigError, ServerConfig};
use tracing::error;

/// Reads and parses the configuration file at `path`.
///
/// A human-readable diagnostic is logged before any error is returned.
///
/// # Errors
///
/// - [`ConfigError::NotFound`] if `path` does not exist.
/// - [`ConfigError::Io`] for any other read failure, including a file that
///   is not valid UTF-8.
/// - The parse errors described on [`ServerConfig::parse`].
pub async fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let err = ConfigError::NotFound {
                path: path.to_path_buf(),
            };
            error!("{err}");
            return Err(err);
        }
        Err(source) => {
            let err = ConfigError::Io {
                path: path.to_path_buf(),
                source,
            };
            error!("{err}");
            return Err(err);
        }
    };

    ServerConfig::parse(&text).map_err(|e| {
        error!("error in configuration file {}: {e}", path.display());
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_valid_file() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server_config.txt");
        std::fs::write(&path, "ip=127.0.0.1\nport=9000\n").unwrap();

        // Act
        let cfg = load_config(&path).await.unwrap();

        // Assert
        assert_eq!(cfg, ServerConfig::new("127.0.0.1", 9000));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");

        let err = load_config(&path).await.unwrap_err();

        match err {
            ConfigError::NotFound { path: reported } => assert_eq!(reported, path),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_directory_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = load_config(dir.path()).await.unwrap_err();

        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[tokio::test]
    async fn test_non_utf8_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.txt");
        std::fs::write(&path, [0xffu8, 0xfe, b'\n', 0x00]).unwrap();

        let err = load_config(&path).await.unwrap_err();

        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[tokio::test]
    async fn test_malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server_config.txt");
        std::fs::write(&path, "ip=127.0.0.1\n").unwrap();

        let err = load_config(&path).await.unwrap_err();

        assert!(err.is_malformed());
    }
}
