//! Session coordinator.
//!
//! A [`Session`] owns one [`Connection`] and one [`Console`]. Running it
//! spawns two tasks, one per direction:
//!
//! ```text
//!   console ──read_line──▶ console loop ──FrameWriter──▶ network
//!   network ──FrameReader─▶ socket loop ──LineWriter───▶ console
//!                 │
//!                 └─ ping/pong ─▶ ControlInterceptor ──▶ console
//! ```
//!
//! The first terminal error from either task settles the shared
//! [`Outcome`]; the other task observes the cancellation and stops, and
//! [`Session::run`] returns the winning error.

use std::sync::Arc;
use std::time::Duration;

use crate::console::{Console, LineWriter};
use crate::error::SessionError;
use crate::ws::{Connection, ControlInterceptor, FrameReader, FrameWriter, Liveness};

pub mod console_loop;
pub mod outcome;
pub mod socket_loop;

pub use console_loop::run_console_loop;
pub use outcome::{Outcome, OutcomeReceiver};
pub use socket_loop::run_socket_loop;

/// Grace period for the closing handshake after the session has ended.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// One interactive session over one connection.
#[derive(Debug)]
pub struct Session {
    writer: FrameWriter,
    reader: FrameReader,
    liveness: Arc<Liveness>,
    console: Console,
    colored: bool,
}

impl Session {
    /// Takes ownership of `connection` and `console` and installs the
    /// control interceptor on the connection.
    #[must_use]
    pub fn new(connection: Connection, console: Console, colored: bool) -> Self {
        let liveness = connection.liveness();
        let Connection {
            writer, mut reader, ..
        } = connection;

        let defaults = reader.control_handlers();
        let interceptor = ControlInterceptor::new(defaults, Arc::clone(&console.writer), colored);
        reader.set_control_handler(Arc::new(interceptor));

        Self {
            writer,
            reader,
            liveness,
            console,
            colored,
        }
    }

    /// Liveness bookkeeping of the underlying connection.
    #[must_use]
    pub fn liveness(&self) -> Arc<Liveness> {
        Arc::clone(&self.liveness)
    }

    /// Runs both loops until the first terminal event and returns it.
    ///
    /// The losing loop is cancelled and joined before this returns, the
    /// connection is closed on a best-effort basis, and console output is
    /// flushed.
    pub async fn run(self) -> SessionError {
        let Self {
            writer,
            reader,
            console,
            colored,
            ..
        } = self;
        let Console {
            reader: input,
            writer: out,
        } = console;

        let (outcome, settled) = Outcome::new();
        let console_task = tokio::spawn(run_console_loop(input, writer, outcome.clone()));
        let socket_task = tokio::spawn(run_socket_loop(
            reader,
            Arc::clone(&out),
            colored,
            outcome.clone(),
        ));
        // Only the loops hold the slot now; if both die without publishing,
        // the receiver resolves with an error instead of hanging.
        drop(outcome);

        let error = settled.await.unwrap_or(SessionError::Aborted);
        tracing::debug!(%error, "session ending");

        match console_task.await {
            Ok(mut writer) => close_quietly(&mut writer).await,
            Err(err) => tracing::warn!(%err, "console loop task failed"),
        }
        if let Err(err) = socket_task.await {
            tracing::warn!(%err, "socket loop task failed");
        }
        release(out.as_ref());

        error
    }
}

async fn close_quietly(writer: &mut FrameWriter) {
    match tokio::time::timeout(CLOSE_GRACE, writer.close()).await {
        Ok(Ok(())) => tracing::debug!("connection closed"),
        Ok(Err(err)) => tracing::debug!(%err, "close after session end failed"),
        Err(_) => tracing::debug!("close after session end timed out"),
    }
}

fn release(out: &dyn LineWriter) {
    if let Err(err) = out.flush() {
        tracing::debug!(%err, "failed to flush console output");
    }
}
