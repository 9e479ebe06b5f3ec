//! Frame vocabulary: what a session reads off the wire.

use std::fmt;

use bytes::Bytes;
use tokio_tungstenite::tungstenite::Message;

use crate::error::CLOSE_NO_STATUS;

/// Received WebSocket frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text frame.
    Text(String),
    /// Binary frame.
    Binary(Bytes),
    /// Ping control frame with payload.
    Ping(Bytes),
    /// Pong control frame with payload.
    Pong(Bytes),
    /// Close frame with status code and reason.
    Close {
        /// Close status code (1005 when absent).
        code: u16,
        /// Human-readable close reason.
        reason: String,
    },
    /// Raw frame of a kind the session does not display.
    Unknown(FrameKind),
}

impl Frame {
    /// Returns the wire kind of this frame.
    #[must_use]
    pub const fn kind(&self) -> FrameKind {
        match self {
            Self::Text(_) => FrameKind::TEXT,
            Self::Binary(_) => FrameKind::BINARY,
            Self::Ping(_) => FrameKind::PING,
            Self::Pong(_) => FrameKind::PONG,
            Self::Close { .. } => FrameKind::CLOSE,
            Self::Unknown(kind) => *kind,
        }
    }
}

impl From<Message> for Frame {
    fn from(message: Message) -> Self {
        match message {
            Message::Text(text) => Self::Text(text.as_str().to_owned()),
            Message::Binary(data) => Self::Binary(data),
            Message::Ping(data) => Self::Ping(data),
            Message::Pong(data) => Self::Pong(data),
            Message::Close(close_frame) => {
                let (code, reason) = close_frame
                    .map(|cf| (u16::from(cf.code), cf.reason.as_str().to_owned()))
                    .unwrap_or((CLOSE_NO_STATUS, String::new()));
                Self::Close { code, reason }
            }
            Message::Frame(raw) => Self::Unknown(FrameKind::from_opcode(u8::from(raw.header().opcode))),
        }
    }
}

/// Numeric WebSocket opcode with a readable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameKind(u8);

impl FrameKind {
    /// Continuation frame (`0x0`).
    pub const CONTINUATION: Self = Self(0x0);
    /// Text frame (`0x1`).
    pub const TEXT: Self = Self(0x1);
    /// Binary frame (`0x2`).
    pub const BINARY: Self = Self(0x2);
    /// Close frame (`0x8`).
    pub const CLOSE: Self = Self(0x8);
    /// Ping frame (`0x9`).
    pub const PING: Self = Self(0x9);
    /// Pong frame (`0xA`).
    pub const PONG: Self = Self(0xA);

    /// Wraps a raw opcode.
    #[must_use]
    pub const fn from_opcode(opcode: u8) -> Self {
        Self(opcode)
    }

    /// Returns the raw opcode.
    #[must_use]
    pub const fn opcode(self) -> u8 {
        self.0
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::CONTINUATION => f.write_str("continuation"),
            Self::TEXT => f.write_str("text"),
            Self::BINARY => f.write_str("binary"),
            Self::CLOSE => f.write_str("close"),
            Self::PING => f.write_str("ping"),
            Self::PONG => f.write_str("pong"),
            Self(other) => write!(f, "opcode {other:#x}"),
        }
    }
}
