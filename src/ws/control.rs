//! Ping/pong handling.
//!
//! A [`FrameReader`](super::connection::FrameReader) never yields control
//! frames. It hands them to its installed [`ControlHandler`], which starts
//! out as the connection's [`ProtocolDefaults`]. A session replaces it with
//! a [`ControlInterceptor`] that displays the frame and then delegates to
//! the captured defaults, so the connection stays protocol-compliant.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use crate::console::LineWriter;
use crate::error::SessionError;
use crate::format::{Style, paint, rx_line};

/// Marker displayed when the peer pings us.
pub const PING_MARKER: &str = "> PING";

/// Marker displayed when the peer answers our ping.
pub const PONG_MARKER: &str = "< PONG";

/// Responder for inbound control frames.
pub trait ControlHandler: Send + Sync + std::fmt::Debug {
    /// Handles an inbound ping carrying `payload`.
    ///
    /// # Errors
    ///
    /// A returned error ends the session as the read-side outcome.
    fn on_ping(&self, payload: &[u8]) -> Result<(), SessionError>;

    /// Handles an inbound pong carrying `payload`.
    ///
    /// # Errors
    ///
    /// A returned error ends the session as the read-side outcome.
    fn on_pong(&self, payload: &[u8]) -> Result<(), SessionError>;
}

/// Liveness bookkeeping updated by the default handlers.
#[derive(Debug, Default)]
pub struct Liveness {
    pings: AtomicU64,
    pongs: AtomicU64,
    last_pong: Mutex<Option<Instant>>,
}

impl Liveness {
    /// Number of pings received from the peer.
    #[must_use]
    pub fn pings_received(&self) -> u64 {
        self.pings.load(Ordering::Relaxed)
    }

    /// Number of pongs received from the peer.
    #[must_use]
    pub fn pongs_received(&self) -> u64 {
        self.pongs.load(Ordering::Relaxed)
    }

    /// Instant of the most recent pong, if any.
    #[must_use]
    pub fn last_pong(&self) -> Option<Instant> {
        *self.last_pong.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_ping(&self) {
        self.pings.fetch_add(1, Ordering::Relaxed);
    }

    fn record_pong(&self) {
        self.pongs.fetch_add(1, Ordering::Relaxed);
        *self.last_pong.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }
}

/// Built-in control handling of a WebSocket connection.
///
/// The pong answering a ping is queued by the protocol layer while the
/// frame is read, with the ping's payload, unless a close is already in
/// progress. It goes out on the next read or write of the connection.
#[derive(Debug)]
pub struct ProtocolDefaults {
    liveness: Arc<Liveness>,
}

impl ProtocolDefaults {
    /// Creates the defaults recording into `liveness`.
    #[must_use]
    pub fn new(liveness: Arc<Liveness>) -> Self {
        Self { liveness }
    }
}

impl ControlHandler for ProtocolDefaults {
    fn on_ping(&self, payload: &[u8]) -> Result<(), SessionError> {
        self.liveness.record_ping();
        tracing::trace!(len = payload.len(), "ping received; pong queued");
        Ok(())
    }

    fn on_pong(&self, payload: &[u8]) -> Result<(), SessionError> {
        self.liveness.record_pong();
        tracing::trace!(len = payload.len(), "pong received");
        Ok(())
    }
}

/// Handlers a connection had before interception.
#[derive(Debug, Clone)]
pub struct CapturedHandlers {
    /// Original ping responder.
    pub ping: Arc<dyn ControlHandler>,
    /// Original pong responder.
    pub pong: Arc<dyn ControlHandler>,
}

/// Displays control frames on the console, then delegates to the
/// captured handlers.
#[derive(Debug)]
pub struct ControlInterceptor {
    defaults: CapturedHandlers,
    out: Arc<dyn LineWriter>,
    colored: bool,
}

impl ControlInterceptor {
    /// Wraps `defaults`, displaying markers on `out`.
    #[must_use]
    pub fn new(defaults: CapturedHandlers, out: Arc<dyn LineWriter>, colored: bool) -> Self {
        Self {
            defaults,
            out,
            colored,
        }
    }

    /// Display failures are logged; the captured handler still runs.
    fn announce(&self, marker: &str) {
        if let Err(err) = self
            .out
            .write_line(&paint(Style::Received, &rx_line(marker), self.colored))
        {
            tracing::warn!(%err, marker, "failed to display control frame");
        }
    }
}

impl ControlHandler for ControlInterceptor {
    fn on_ping(&self, payload: &[u8]) -> Result<(), SessionError> {
        self.announce(PING_MARKER);
        self.defaults.ping.on_ping(payload)
    }

    fn on_pong(&self, payload: &[u8]) -> Result<(), SessionError> {
        self.announce(PONG_MARKER);
        self.defaults.pong.on_pong(payload)
    }
}
