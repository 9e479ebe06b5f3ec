//! Line-oriented console: the operator's side of a session.
//!
//! A [`Console`] is split by direction. The [`LineReader`] is owned by the
//! console loop alone; the [`LineWriter`] is shared between the socket loop
//! and the control interceptor, so every implementation must write each
//! line atomically.

use std::fmt;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ConsoleError;

pub mod scripted;
pub mod stdio;

pub use scripted::{ScriptedConsole, ScriptedHandle};
pub use stdio::stdio;

/// Console input line that triggers a ping control frame.
pub const PING_COMMAND: &str = "ping";

/// Source of operator input lines.
#[async_trait]
pub trait LineReader: Send + fmt::Debug {
    /// Waits for the next line, without its line terminator.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Eof`] at end of input,
    /// [`ConsoleError::Interrupted`] when the operator interrupts, and
    /// [`ConsoleError::Io`] on device failure.
    async fn read_line(&mut self) -> Result<String, ConsoleError>;
}

/// Sink for display lines, safe for concurrent single-line writes.
pub trait LineWriter: Send + Sync + fmt::Debug {
    /// Writes `line` followed by a newline as one unit.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the output device fails.
    fn write_line(&self, line: &str) -> io::Result<()>;

    /// Flushes buffered output.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the output device fails.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Input and output halves of one console.
#[derive(Debug)]
pub struct Console {
    /// Input half, moved into the console loop.
    pub reader: Box<dyn LineReader>,
    /// Output half, shared by every display path.
    pub writer: Arc<dyn LineWriter>,
}

impl Console {
    /// Bundles a reader and a writer.
    #[must_use]
    pub fn new(reader: Box<dyn LineReader>, writer: Arc<dyn LineWriter>) -> Self {
        Self { reader, writer }
    }
}

/// What a console line asks the session to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Send an empty ping control frame.
    Ping,
    /// Send the line verbatim as a text frame.
    Text(String),
}

impl ConsoleCommand {
    /// Maps an input line to an outgoing frame. Only the exact line
    /// `ping` is special; everything else, including the empty line, is text.
    #[must_use]
    pub fn parse(line: String) -> Self {
        if line == PING_COMMAND {
            Self::Ping
        } else {
            Self::Text(line)
        }
    }
}

/// Strips one trailing `\n` or `\r\n`.
pub(crate) fn trim_line_ending(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}
