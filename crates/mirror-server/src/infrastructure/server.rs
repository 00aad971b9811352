//! TCP server: startup sequence and the serial accept loop.
//!
//! This module is responsible for:
//!
//! 1. Loading the host/port configuration file.
//! 2. Recording the `ServerStarted` event.
//! 3. Binding a TCP listener on the configured address.
//! 4. Accepting one connection at a time and serving it to completion with
//!    [`handle_client`] before accepting the next.
//! 5. Stopping when the `running` flag is cleared.
//!
//! # One client at a time
//!
//! Sessions are awaited inline, never spawned.  While a client is being
//! served, further clients complete the TCP handshake (the OS queues them in
//! the listen backlog) but get no response until the current session ends.
//!
//! # Shutdown
//!
//! The accept wait is cut into short polls so the `running` flag is checked
//! regularly while idle.  A session that is in progress is not interrupted;
//! the flag is seen once it ends.

use std::io;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use mirror_core::LogEvent;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::application::{handle_client, EventSink};
use crate::domain::{ServerOptions, SessionErrorPolicy, SessionPolicy};
use crate::infrastructure::config_file::load_config;
use crate::infrastructure::event_log::EventLogFile;

/// How long one accept attempt waits before the `running` flag is re-checked.
/// Also the pause after a failed accept.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Where the accept loop takes its connections from.
///
/// Implemented for [`TcpListener`]; tests substitute their own sources.
#[async_trait]
pub trait ConnectionSource: Send + Sync {
    /// Stream type of an accepted connection.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Waits for the next connection.
    async fn accept(&self) -> io::Result<(Self::Stream, SocketAddr)>;
}

#[async_trait]
impl ConnectionSource for TcpListener {
    type Stream = TcpStream;

    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        TcpListener::accept(self).await
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Runs the server until `running` is set to `false`.
///
/// Loads the configuration from `options.config_path`, records the start in
/// the event log at `options.log_path`, binds the listener and hands it to
/// [`run_server_on`].
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the start event
/// cannot be logged, or the listener cannot be bound (address in use,
/// unresolvable host, missing permission).  With
/// [`SessionErrorPolicy::Propagate`], a failed session is also returned.
pub async fn run_server(options: ServerOptions, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    let config = load_config(&options.config_path).await.with_context(|| {
        format!(
            "failed to load configuration from {}",
            options.config_path.display()
        )
    })?;

    let event_log = EventLogFile::new(&options.log_path);
    event_log
        .record(&LogEvent::server_started())
        .await
        .with_context(|| {
            format!(
                "failed to write event log {}",
                options.log_path.display()
            )
        })?;

    // `bind` resolves host names, so `localhost` works as well as IP literals.
    let listener = TcpListener::bind((config.bind_host(), config.port))
        .await
        .with_context(|| format!("failed to bind listener on {config}"))?;

    let local_addr = listener
        .local_addr()
        .context("failed to read bound listener address")?;
    info!(
        "Сервер запущен на {}:{}. Ожидание подключений...",
        config.host,
        local_addr.port()
    );

    let result = run_server_on(
        listener,
        &event_log,
        &options.policy,
        options.on_session_error,
        running,
    )
    .await;

    info!("Сервер остановлен");
    result
}

/// Runs the serial accept loop on an already-bound listener.
///
/// Each accepted connection is served to completion before the next
/// `accept`.  The listener is dropped (closed) when the loop ends.
///
/// # Errors
///
/// With [`SessionErrorPolicy::Propagate`], returns the first failed session
/// with the peer address as context.  Accept errors are logged and the next
/// attempt waits one poll interval.
pub async fn run_server_on<L: ConnectionSource>(
    listener: L,
    sink: &dyn EventSink,
    policy: &SessionPolicy,
    on_session_error: SessionErrorPolicy,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    loop {
        // Check the shutdown flag before each accept attempt.
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        match timeout(ACCEPT_POLL_INTERVAL, listener.accept()).await {
            Ok(Ok((stream, peer))) => {
                info!("Подключен клиент: {peer}");

                match handle_client(stream, peer, sink, policy).await {
                    Ok(summary) => info!(
                        "client {peer} done: {} message(s), {}",
                        summary.messages, summary.end
                    ),
                    Err(e) => match on_session_error {
                        SessionErrorPolicy::Propagate => {
                            return Err(e).with_context(|| format!("session with {peer} failed"));
                        }
                        SessionErrorPolicy::Continue => {
                            warn!("session with {peer} failed: {e}; accepting next client");
                        }
                    },
                }
            }
            Ok(Err(e)) => {
                // Errors such as EMFILE repeat until descriptors are freed.
                error!("accept error: {e}");
                tokio::time::sleep(ACCEPT_POLL_INTERVAL).await;
            }
            Err(_) => {
                // No connection within the poll interval.
            }
        }
    }

    Ok(())
}
