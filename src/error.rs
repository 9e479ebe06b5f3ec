//! Session error types.
//!
//! [`SessionError`] is the single terminal outcome type of a probing
//! session. Every failure in either I/O direction ends the session; the
//! coordinator only reports the first one it receives.

use std::io;

use tokio_tungstenite::tungstenite;

use crate::ws::frame::FrameKind;

/// Close code reported when the peer closes without a status code.
pub const CLOSE_NO_STATUS: u16 = 1005;

/// Close code of a normal closure.
pub const CLOSE_NORMAL: u16 = 1000;

/// Terminal outcome of a session.
///
/// # Variants
///
/// | Variant            | Direction          | Raised by                    |
/// |--------------------|--------------------|------------------------------|
/// | `Handshake`        | before the session | connection establishment     |
/// | `Console`          | console → network  | console loop                 |
/// | `Write`            | console → network  | console loop                 |
/// | `Read`             | network → console  | socket loop                  |
/// | `UnknownFrameType` | network → console  | socket loop                  |
/// | `Closed`           | network → console  | socket loop                  |
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The opening handshake failed; no session was created.
    #[error("handshake with {url} failed: {source}")]
    Handshake {
        /// Target address of the failed handshake.
        url: String,
        /// Underlying cause.
        #[source]
        source: HandshakeFailure,
    },

    /// Console input reached end-of-input or failed.
    #[error(transparent)]
    Console(#[from] ConsoleError),

    /// Sending a frame failed.
    #[error("write failed: {0}")]
    Write(#[source] tungstenite::Error),

    /// Receiving a frame failed.
    #[error("read failed: {0}")]
    Read(#[source] tungstenite::Error),

    /// A received frame did not match any displayable kind.
    #[error("unknown websocket frame type: {0}")]
    UnknownFrameType(FrameKind),

    /// The peer sent a close frame.
    #[error("connection closed by peer: {code} {reason}")]
    Closed {
        /// Close status code (1005 when the frame carried none).
        code: u16,
        /// Close reason text, possibly empty.
        reason: String,
    },

    /// Both session loops stopped without reporting an outcome.
    #[error("session loops exited without an outcome")]
    Aborted,

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SessionError {
    /// Returns `true` when the session ended the way an operator ends it:
    /// console end-of-input, an interrupt, or a normal close from the peer.
    #[must_use]
    pub const fn is_clean_exit(&self) -> bool {
        matches!(
            self,
            Self::Console(ConsoleError::Eof | ConsoleError::Interrupted)
                | Self::Closed {
                    code: CLOSE_NORMAL,
                    ..
                }
        )
    }
}

/// Console input/output failure.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Input stream reached its end.
    #[error("end of input")]
    Eof,

    /// The operator interrupted input (Ctrl-C).
    #[error("interrupted")]
    Interrupted,

    /// Terminal device failure.
    #[error("console i/o: {0}")]
    Io(#[from] io::Error),
}

/// Cause of a failed opening handshake.
#[derive(Debug, thiserror::Error)]
pub enum HandshakeFailure {
    /// The target address could not be turned into a client request.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The server answered the upgrade with something other than 101.
    #[error("unexpected http status {0}")]
    Status(u16),

    /// A header value could not be encoded.
    #[error("invalid {name} header value")]
    InvalidHeader {
        /// Header name.
        name: &'static str,
    },

    /// The HTTP proxy refused or broke the tunnel.
    #[error("proxy: {0}")]
    Proxy(String),

    /// TLS client configuration could not be built.
    #[error("tls configuration: {0}")]
    Tls(#[from] rustls::Error),

    /// Network failure while dialing.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// WebSocket protocol failure during the upgrade.
    #[error(transparent)]
    Protocol(tungstenite::Error),
}

impl From<tungstenite::Error> for HandshakeFailure {
    fn from(err: tungstenite::Error) -> Self {
        match err {
            tungstenite::Error::Http(response) => Self::Status(response.status().as_u16()),
            tungstenite::Error::Io(io) => Self::Io(io),
            other => Self::Protocol(other),
        }
    }
}
