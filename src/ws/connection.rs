//! Split halves of a framed connection.
//!
//! [`FrameWriter`] is the only path that sends frames and [`FrameReader`]
//! the only path that receives them. Each half is owned by exactly one
//! session loop, so neither needs a lock.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::{self, Message};

use super::control::{CapturedHandlers, ControlHandler, Liveness, ProtocolDefaults};
use super::frame::Frame;
use crate::error::SessionError;

/// Outgoing side of a message transport.
#[async_trait]
pub trait FrameSink: Send {
    /// Sends one message.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the message cannot be sent.
    async fn send_message(&mut self, message: Message) -> Result<(), tungstenite::Error>;

    /// Starts the closing handshake and flushes pending writes.
    ///
    /// # Errors
    ///
    /// Returns the transport error if closing fails.
    async fn shutdown(&mut self) -> Result<(), tungstenite::Error>;
}

/// Incoming side of a message transport.
#[async_trait]
pub trait FrameSource: Send {
    /// Receives the next message, or `None` once the stream has ended.
    async fn next_message(&mut self) -> Option<Result<Message, tungstenite::Error>>;
}

#[async_trait]
impl<S> FrameSink for SplitSink<WebSocketStream<S>, Message>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send_message(&mut self, message: Message) -> Result<(), tungstenite::Error> {
        SinkExt::send(self, message).await
    }

    async fn shutdown(&mut self) -> Result<(), tungstenite::Error> {
        SinkExt::close(self).await
    }
}

#[async_trait]
impl<S> FrameSource for SplitStream<WebSocketStream<S>>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn next_message(&mut self) -> Option<Result<Message, tungstenite::Error>> {
        StreamExt::next(self).await
    }
}

/// Write half of a connection.
pub struct FrameWriter {
    sink: Box<dyn FrameSink>,
}

impl fmt::Debug for FrameWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameWriter").finish_non_exhaustive()
    }
}

impl FrameWriter {
    /// Wraps a message sink.
    #[must_use]
    pub fn new(sink: Box<dyn FrameSink>) -> Self {
        Self { sink }
    }

    /// Sends `text` verbatim as a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Write`] if the frame cannot be sent.
    pub async fn send_text(&mut self, text: String) -> Result<(), SessionError> {
        self.sink
            .send_message(Message::text(text))
            .await
            .map_err(SessionError::Write)
    }

    /// Sends a ping control frame carrying `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Write`] if the frame cannot be sent.
    pub async fn send_ping(&mut self, payload: Bytes) -> Result<(), SessionError> {
        self.sink
            .send_message(Message::Ping(payload))
            .await
            .map_err(SessionError::Write)
    }

    /// Sends a close frame and flushes.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Write`] if closing fails.
    pub async fn close(&mut self) -> Result<(), SessionError> {
        self.sink.shutdown().await.map_err(SessionError::Write)
    }
}

/// Read half of a connection.
///
/// Control frames are consumed by the installed [`ControlHandler`] and never
/// returned from [`FrameReader::next_frame`].
pub struct FrameReader {
    source: Box<dyn FrameSource>,
    control: Arc<dyn ControlHandler>,
}

impl fmt::Debug for FrameReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameReader")
            .field("control", &self.control)
            .finish_non_exhaustive()
    }
}

impl FrameReader {
    /// Wraps a message source with the protocol's default control handling.
    #[must_use]
    pub fn new(source: Box<dyn FrameSource>, liveness: Arc<Liveness>) -> Self {
        Self {
            source,
            control: Arc::new(ProtocolDefaults::new(liveness)),
        }
    }

    /// Returns the installed ping and pong handlers.
    #[must_use]
    pub fn control_handlers(&self) -> CapturedHandlers {
        CapturedHandlers {
            ping: Arc::clone(&self.control),
            pong: Arc::clone(&self.control),
        }
    }

    /// Replaces the control handler.
    pub fn set_control_handler(&mut self, handler: Arc<dyn ControlHandler>) {
        self.control = handler;
    }

    /// Receives the next non-control frame.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Read`] on transport failure or when the
    /// stream ends, and whatever the control handler reports.
    pub async fn next_frame(&mut self) -> Result<Frame, SessionError> {
        loop {
            let message = match self.source.next_message().await {
                Some(Ok(message)) => message,
                Some(Err(err)) => return Err(SessionError::Read(err)),
                None => return Err(SessionError::Read(tungstenite::Error::ConnectionClosed)),
            };
            match Frame::from(message) {
                Frame::Ping(payload) => self.control.on_ping(&payload)?,
                Frame::Pong(payload) => self.control.on_pong(&payload)?,
                frame => return Ok(frame),
            }
        }
    }
}

/// An established connection, split by direction.
#[derive(Debug)]
pub struct Connection {
    /// Send side.
    pub writer: FrameWriter,
    /// Receive side.
    pub reader: FrameReader,
    liveness: Arc<Liveness>,
}

impl Connection {
    /// Assembles a connection from a sink and a source.
    #[must_use]
    pub fn new(sink: Box<dyn FrameSink>, source: Box<dyn FrameSource>) -> Self {
        let liveness = Arc::new(Liveness::default());
        Self {
            writer: FrameWriter::new(sink),
            reader: FrameReader::new(source, Arc::clone(&liveness)),
            liveness,
        }
    }

    /// Splits an upgraded WebSocket stream.
    #[must_use]
    pub fn from_stream<S>(stream: WebSocketStream<S>) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (sink, source) = stream.split();
        Self::new(Box::new(sink), Box::new(source))
    }

    /// Liveness bookkeeping fed by the default control handlers.
    #[must_use]
    pub fn liveness(&self) -> Arc<Liveness> {
        Arc::clone(&self.liveness)
    }
}
