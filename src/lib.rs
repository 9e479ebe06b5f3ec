//! # wsprobe
//!
//! Interactive terminal client for WebSocket servers. Lines typed on the
//! console become outgoing frames; incoming frames, including ping/pong
//! control frames, are rendered live.
//!
//! ## Architecture
//!
//! ```text
//! ClientConfig (config/)
//!     │
//!     ├── connect (ws/connect) ── proxy tunnel, trust policy, upgrade
//!     │
//!     └── Session (session/)
//!             ├── console loop ── Console (console/) → FrameWriter
//!             ├── socket loop  ── FrameReader → format/ → Console
//!             └── ControlInterceptor (ws/control) on ping/pong
//! ```

pub mod config;
pub mod console;
pub mod error;
pub mod format;
pub mod session;
pub mod ws;

pub use config::{Args, ClientConfig};
pub use console::Console;
pub use error::{ConsoleError, HandshakeFailure, SessionError};
pub use session::Session;
