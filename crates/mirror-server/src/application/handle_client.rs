//! Connection handler: the per-session state machine.
//!
//! ```text
//! Start ──record connect──► Receiving ──EOF──────────────────────────► Closing
//!                               │                                        ▲
//!                          payload, record                               │
//!                               ▼                                        │
//!                           Processing ──sleep, mirror, send, record──►  │
//!                                                      CheckTimeout ─────┘ (elapsed > limit)
//!                                                           │
//!                                                           └──► Receiving
//! ```
//!
//! `Closing` records the disconnect and shuts the connection down on every
//! path after `Start`, including failures.
//!
//! The handler is generic over the stream type so tests can drive it over
//! an in-memory `tokio::io::duplex` pipe; the server passes a `TcpStream`.

use std::net::SocketAddr;

use async_trait::async_trait;
use mirror_core::{build_response, LogEvent};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::domain::{Session, SessionEnd, SessionPolicy, SessionSummary};

/// Errors that end a session early.
///
/// No step is retried.  The disconnect is still recorded and the connection
/// closed before the error is returned.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading from the client failed.
    #[error("receive failed: {0}")]
    Receive(#[source] std::io::Error),

    /// Writing the response to the client failed.
    #[error("send failed: {0}")]
    Send(#[source] std::io::Error),

    /// The received bytes are not valid UTF-8.
    #[error("received data is not valid UTF-8: {0}")]
    Decode(#[source] std::str::Utf8Error),

    /// Appending to the event log failed.
    #[error("event log write failed: {0}")]
    Log(#[source] std::io::Error),
}

/// Destination for event-log entries.
///
/// The infrastructure implementation appends to a text file; tests use an
/// in-memory recorder.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Records one event.
    async fn record(&self, event: &LogEvent) -> std::io::Result<()>;
}

/// Serves one client connection to completion.
///
/// Records `ClientConnected`, then loops: one read of up to
/// `policy.receive_buffer` bytes, record it, wait `policy.processing_delay`,
/// send the mirrored response, record it, and stop if the session has run
/// longer than `policy.session_timeout`.  A zero-byte read (the client closed
/// its side) also stops the loop.  Finally records `ClientDisconnected` and
/// shuts the stream down.
///
/// # Errors
///
/// Returns the first [`SessionError`] hit by the receive loop, after the
/// closing step has run.  If the loop succeeded but recording the disconnect
/// failed, that failure is returned.  If recording the connect fails, the
/// error is returned straight away and the stream is dropped.
pub async fn handle_client<S>(
    mut stream: S,
    peer: SocketAddr,
    sink: &dyn EventSink,
    policy: &SessionPolicy,
) -> Result<SessionSummary, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let session = Session::new(peer);

    sink.record(&LogEvent::client_connected(peer))
        .await
        .map_err(SessionError::Log)?;
    debug!("session {}: connected from {peer}", session.id);

    let outcome = serve_messages(&mut stream, &session, sink, policy).await;

    // Closing: runs whatever the outcome.
    let closed = sink.record(&LogEvent::client_disconnected(peer)).await;
    if let Err(e) = stream.shutdown().await {
        debug!("session {}: shutdown after close: {e}", session.id);
    }
    drop(stream);

    debug!(
        "session {}: closed after {:.1?}",
        session.id,
        session.elapsed()
    );

    match outcome {
        Ok(summary) => closed.map(|()| summary).map_err(SessionError::Log),
        Err(e) => {
            if let Err(log_err) = closed {
                warn!(
                    "session {}: could not record disconnect: {log_err}",
                    session.id
                );
            }
            Err(e)
        }
    }
}

/// The Receiving → Processing → CheckTimeout loop.
async fn serve_messages<S>(
    stream: &mut S,
    session: &Session,
    sink: &dyn EventSink,
    policy: &SessionPolicy,
) -> Result<SessionSummary, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let mut buf = vec![0u8; policy.receive_buffer.max(1)];
    let mut messages = 0usize;

    loop {
        // ── Receiving ─────────────────────────────────────────────────────────
        let n = stream.read(&mut buf).await.map_err(SessionError::Receive)?;
        if n == 0 {
            debug!("session {}: client closed the connection", session.id);
            return Ok(SessionSummary {
                messages,
                end: SessionEnd::PeerClosed,
            });
        }

        let payload = std::str::from_utf8(&buf[..n]).map_err(SessionError::Decode)?;
        sink.record(&LogEvent::message_received(payload))
            .await
            .map_err(SessionError::Log)?;
        debug!("session {}: received {n} bytes", session.id);

        // ── Processing ────────────────────────────────────────────────────────
        tokio::time::sleep(policy.processing_delay).await;

        let response = build_response(payload);
        stream
            .write_all(response.as_bytes())
            .await
            .map_err(SessionError::Send)?;
        stream.flush().await.map_err(SessionError::Send)?;
        messages += 1;

        sink.record(&LogEvent::message_sent(response))
            .await
            .map_err(SessionError::Log)?;

        // ── CheckTimeout ──────────────────────────────────────────────────────
        if session.has_exceeded(policy.session_timeout) {
            debug!(
                "session {}: time limit of {:?} exceeded",
                session.id, policy.session_timeout
            );
            return Ok(SessionSummary {
                messages,
                end: SessionEnd::TimedOut,
            });
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::event_log::MemoryEventSink;
    use std::time::{Duration, Instant};
    use tokio::io::duplex;

    fn peer() -> SocketAddr {
        "127.0.0.1:50123".parse().unwrap()
    }

    fn fast_policy() -> SessionPolicy {
        SessionPolicy {
            processing_delay: Duration::from_millis(20),
            session_timeout: Duration::from_secs(10),
            receive_buffer: 1024,
        }
    }

    fn labels(sink: &MemoryEventSink) -> Vec<&'static str> {
        sink.events().iter().map(LogEvent::label).collect()
    }

    #[tokio::test]
    async fn test_single_message_is_mirrored_and_logged() {
        // Arrange
        let sink = MemoryEventSink::new();
        let policy = fast_policy();
        let (mut client, server) = duplex(4096);

        // Act
        let client_task = tokio::spawn(async move {
            client.write_all(b"hello").await.unwrap();
            let mut buf = vec![0u8; 256];
            let n = client.read(&mut buf).await.unwrap();
            let response = String::from_utf8(buf[..n].to_vec()).unwrap();
            drop(client);
            response
        });
        let summary = handle_client(server, peer(), &sink, &policy).await.unwrap();
        let response = client_task.await.unwrap();

        // Assert
        assert_eq!(response, "olleh. Сервер написан Исаевым М.А.\n");
        assert_eq!(
            summary,
            SessionSummary {
                messages: 1,
                end: SessionEnd::PeerClosed
            }
        );
        assert_eq!(
            labels(&sink),
            [
                "Клиент подключен",
                "Получено сообщение",
                "Отправлено сообщение",
                "Клиент отключен"
            ]
        );
    }

    #[tokio::test]
    async fn test_logged_payloads_are_raw_data_and_full_response() {
        let sink = MemoryEventSink::new();
        let (mut client, server) = duplex(4096);

        let client_task = tokio::spawn(async move {
            client.write_all("привет\n".as_bytes()).await.unwrap();
            let mut buf = vec![0u8; 256];
            let _ = client.read(&mut buf).await.unwrap();
        });
        handle_client(server, peer(), &sink, &fast_policy())
            .await
            .unwrap();
        client_task.await.unwrap();

        let events = sink.events();
        assert!(matches!(
            &events[1],
            LogEvent::MessageReceived { data, .. } if data == "привет\n"
        ));
        assert!(matches!(
            &events[2],
            LogEvent::MessageSent { response, .. } if response == "\nтевирп. Сервер написан Исаевым М.А.\n"
        ));
    }

    #[tokio::test]
    async fn test_immediate_close_logs_only_connect_and_disconnect() {
        let sink = MemoryEventSink::new();
        let (client, server) = duplex(64);
        drop(client);

        let summary = handle_client(server, peer(), &sink, &fast_policy())
            .await
            .unwrap();

        assert_eq!(summary.messages, 0);
        assert_eq!(summary.end, SessionEnd::PeerClosed);
        assert_eq!(labels(&sink), ["Клиент подключен", "Клиент отключен"]);
    }

    #[tokio::test]
    async fn test_connect_and_disconnect_carry_peer_address() {
        let sink = MemoryEventSink::new();
        let (client, server) = duplex(64);
        drop(client);

        handle_client(server, peer(), &sink, &fast_policy())
            .await
            .unwrap();

        let events = sink.events();
        assert!(matches!(events[0], LogEvent::ClientConnected { peer: p, .. } if p == peer()));
        assert!(matches!(events[1], LogEvent::ClientDisconnected { peer: p, .. } if p == peer()));
    }

    #[tokio::test]
    async fn test_response_waits_for_processing_delay() {
        let sink = MemoryEventSink::new();
        let policy = SessionPolicy {
            processing_delay: Duration::from_millis(150),
            ..fast_policy()
        };
        let (mut client, server) = duplex(4096);

        let client_task = tokio::spawn(async move {
            let sent_at = Instant::now();
            client.write_all(b"x").await.unwrap();
            let mut buf = vec![0u8; 128];
            client.read(&mut buf).await.unwrap();
            sent_at.elapsed()
        });
        handle_client(server, peer(), &sink, &policy).await.unwrap();
        let waited = client_task.await.unwrap();

        assert!(
            waited >= Duration::from_millis(150),
            "response arrived after {waited:?}, before the processing delay"
        );
    }

    #[tokio::test]
    async fn test_session_closes_after_timeout_once_response_is_sent() {
        // Arrange: the limit is passed during the second or third exchange.
        let sink = MemoryEventSink::new();
        let policy = SessionPolicy {
            processing_delay: Duration::from_millis(40),
            session_timeout: Duration::from_millis(100),
            receive_buffer: 1024,
        };
        let (mut client, server) = duplex(4096);

        // Act: keep sending until the server stops answering.
        let client_task = tokio::spawn(async move {
            let mut responses = 0usize;
            loop {
                if client.write_all(b"ping").await.is_err() {
                    break;
                }
                let mut buf = vec![0u8; 256];
                match client.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => responses += 1,
                }
            }
            responses
        });
        let summary = handle_client(server, peer(), &sink, &policy).await.unwrap();
        let responses = client_task.await.unwrap();

        // Assert
        assert_eq!(summary.end, SessionEnd::TimedOut);
        assert_eq!(summary.messages, responses);
        assert!(responses >= 2, "expected at least two exchanges, got {responses}");

        let labels = labels(&sink);
        assert_eq!(labels.last(), Some(&"Клиент отключен"));
        assert_eq!(
            labels[labels.len() - 2],
            "Отправлено сообщение",
            "no message may be received after the cutoff"
        );
    }

    #[tokio::test]
    async fn test_silent_client_is_not_timed_out() {
        // The limit is only checked after a response, never while waiting.
        let sink = MemoryEventSink::new();
        let policy = SessionPolicy {
            session_timeout: Duration::from_millis(10),
            ..fast_policy()
        };
        let (client, server) = duplex(64);

        let client_task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(80)).await;
            drop(client);
        });
        let summary = handle_client(server, peer(), &sink, &policy).await.unwrap();
        client_task.await.unwrap();

        assert_eq!(summary.end, SessionEnd::PeerClosed);
    }

    #[tokio::test]
    async fn test_invalid_utf8_aborts_session_but_still_logs_disconnect() {
        let sink = MemoryEventSink::new();
        let (mut client, server) = duplex(64);
        client.write_all(&[0xff, 0xfe, 0xfd]).await.unwrap();

        let result = handle_client(server, peer(), &sink, &fast_policy()).await;

        assert!(matches!(result, Err(SessionError::Decode(_))));
        assert_eq!(labels(&sink), ["Клиент подключен", "Клиент отключен"]);
        drop(client);
    }

    #[tokio::test]
    async fn test_send_failure_aborts_session_after_receive_was_logged() {
        // The client sends and disappears before the response is written.
        let sink = MemoryEventSink::new();
        let (mut client, server) = duplex(64);
        client.write_all(b"gone").await.unwrap();
        drop(client);

        let result = handle_client(server, peer(), &sink, &fast_policy()).await;

        assert!(matches!(result, Err(SessionError::Send(_))));
        assert_eq!(
            labels(&sink),
            ["Клиент подключен", "Получено сообщение", "Клиент отключен"]
        );
    }

    #[tokio::test]
    async fn test_log_failure_on_connect_is_returned() {
        let sink = MemoryEventSink::failing();
        let (_client, server) = duplex(64);

        let result = handle_client(server, peer(), &sink, &fast_policy()).await;

        assert!(matches!(result, Err(SessionError::Log(_))));
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_receive_buffer_limits_one_read() {
        // With a 4-byte buffer, "abcdefgh" is served as two messages.
        let sink = MemoryEventSink::new();
        let policy = SessionPolicy {
            receive_buffer: 4,
            ..fast_policy()
        };
        let (mut client, server) = duplex(4096);

        let client_task = tokio::spawn(async move {
            client.write_all(b"abcdefgh").await.unwrap();
            let mut received = String::new();
            let mut buf = vec![0u8; 256];
            while received.matches('\n').count() < 2 {
                let n = client.read(&mut buf).await.unwrap();
                assert!(n > 0, "server closed early");
                received.push_str(std::str::from_utf8(&buf[..n]).unwrap());
            }
            received
        });
        let summary = handle_client(server, peer(), &sink, &policy).await.unwrap();
        let received = client_task.await.unwrap();

        assert_eq!(
            received,
            "dcba. Сервер написан Исаевым М.А.\nhgfe. Сервер написан Исаевым М.А.\n"
        );
        assert_eq!(summary.messages, 2);
    }
}
