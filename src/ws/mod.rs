//! WebSocket transport: handshake, split connection halves, frames, and
//! control-frame handling.
//!
//! All WebSocket access in the crate goes through this module rather than
//! `tokio-tungstenite` directly.

pub mod connect;
pub mod connection;
pub mod control;
pub mod frame;
pub mod proxy;
pub mod tls;

pub use connect::{ConnectOptions, connect, default_origin};
pub use connection::{Connection, FrameReader, FrameSink, FrameSource, FrameWriter};
pub use control::{CapturedHandlers, ControlHandler, ControlInterceptor, Liveness};
pub use frame::{Frame, FrameKind};
pub use proxy::ProxySettings;
pub use tls::TrustPolicy;
