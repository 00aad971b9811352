//! Mirror server: entry point.
//!
//! Listens on the host and port named in `server_config.txt`, serves one
//! client at a time, and answers every message with the message reversed and
//! a fixed signature appended.  Connections and messages are recorded in
//! `server_log.txt`.
//!
//! # Usage
//!
//! ```text
//! mirror-server [OPTIONS]
//!
//! Options:
//!   --config <PATH>               Host/port file [default: server_config.txt]
//!   --log-file <PATH>             Event log file [default: server_log.txt]
//!   --continue-on-session-error   Keep accepting clients after a failed session
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                           | Default             |
//! |------------------------------------|---------------------|
//! | `MIRROR_CONFIG`                    | `server_config.txt` |
//! | `MIRROR_LOG_FILE`                  | `server_log.txt`    |
//! | `MIRROR_CONTINUE_ON_SESSION_ERROR` | `false`             |
//!
//! Console diagnostics are controlled with `RUST_LOG` (default `info`).
//!
//! # Configuration file
//!
//! ```text
//! ip=127.0.0.1
//! port=9000
//! ```

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use mirror_server::domain::options::{DEFAULT_CONFIG_PATH, DEFAULT_LOG_PATH};
use mirror_server::domain::{ServerOptions, SessionErrorPolicy, SessionPolicy};
use mirror_server::infrastructure::run_server;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Single-client TCP server that replies with the mirror image of each message.
#[derive(Debug, Parser)]
#[command(
    name = "mirror-server",
    about = "Single-client TCP server that replies with the mirror image of each message",
    version
)]
struct Cli {
    /// Path of the two-line configuration file (`ip=...` / `port=...`).
    #[arg(long, default_value = DEFAULT_CONFIG_PATH, env = "MIRROR_CONFIG")]
    config: PathBuf,

    /// Path of the append-only event log.
    #[arg(long, default_value = DEFAULT_LOG_PATH, env = "MIRROR_LOG_FILE")]
    log_file: PathBuf,

    /// Keep accepting clients after a session fails with an I/O error.
    ///
    /// By default a failed session stops the server.
    #[arg(long, env = "MIRROR_CONTINUE_ON_SESSION_ERROR")]
    continue_on_session_error: bool,
}

impl Cli {
    /// Converts the parsed CLI arguments into [`ServerOptions`].
    ///
    /// Session timings always use their fixed defaults.
    fn into_server_options(self) -> ServerOptions {
        let on_session_error = if self.continue_on_session_error {
            SessionErrorPolicy::Continue
        } else {
            SessionErrorPolicy::Propagate
        };

        ServerOptions {
            config_path: self.config,
            log_path: self.log_file,
            policy: SessionPolicy::default(),
            on_session_error,
        }
    }
}

// ── Interrupt handling ────────────────────────────────────────────────────────

/// Exit status when a second Ctrl+C ends the process (128 + SIGINT).
const FORCED_EXIT_CODE: i32 = 130;

/// What a Ctrl+C does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    /// First Ctrl+C: stop accepting once the current client is done.
    StopAfterSession,
    /// Any later Ctrl+C: exit now, even if a client is still connected.
    ForceExit,
}

/// Clears `running` and reports whether it was already cleared.
fn on_interrupt(running: &AtomicBool) -> Interrupt {
    if running.swap(false, Ordering::Relaxed) {
        Interrupt::StopAfterSession
    } else {
        Interrupt::ForceExit
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// 1. Initialises `tracing_subscriber` (level from `RUST_LOG`, default `info`).
/// 2. Parses the command line into [`ServerOptions`].
/// 3. Spawns a Ctrl+C listener that clears the shared `running` flag, and
///    exits the process on a second Ctrl+C.
/// 4. Runs the server.  Any startup or propagated session error is returned
///    from `main`, which prints it and exits with a non-zero status.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = Cli::parse().into_server_options();

    info!(
        "mirror server starting: config={}, log={}",
        options.config_path.display(),
        options.log_path.display()
    );

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    // The accept loop checks `running` between accepts; a session in progress
    // finishes first unless Ctrl+C is pressed again.
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("failed to listen for Ctrl+C signal: {e}");
                return;
            }
            match on_interrupt(&running_clone) {
                Interrupt::StopAfterSession => {
                    info!("received Ctrl+C, stopping after the current client (press again to exit now)");
                }
                Interrupt::ForceExit => {
                    warn!("received second Ctrl+C, exiting without waiting for the current client");
                    std::process::exit(FORCED_EXIT_CODE);
                }
            }
        }
    });

    run_server(options, running).await
}

// ── Tests ─────────────────────────────────────────────────────────────────────
