//! In-memory console driven by a handle.
//!
//! Used to run sessions without a terminal: input lines are pushed through
//! a [`ScriptedHandle`], and everything the session displays is captured.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{Console, LineReader, LineWriter};
use crate::error::ConsoleError;

/// Builder for a scripted [`Console`].
#[derive(Debug)]
pub struct ScriptedConsole;

impl ScriptedConsole {
    /// Creates a console and the handle that drives it.
    #[must_use]
    pub fn pair() -> (Console, ScriptedHandle) {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (output_tx, output_rx) = mpsc::unbounded_channel();
        let lines = Arc::new(Mutex::new(Vec::new()));

        let writer = CapturingWriter {
            lines: Arc::clone(&lines),
            notify: output_tx,
        };
        let console = Console::new(Box::new(ScriptedReader { input: input_rx }), Arc::new(writer));
        let handle = ScriptedHandle {
            input: Some(input_tx),
            output: output_rx,
            lines,
        };
        (console, handle)
    }
}

/// Drives a scripted console from the outside.
#[derive(Debug)]
pub struct ScriptedHandle {
    input: Option<mpsc::UnboundedSender<Result<String, ConsoleError>>>,
    output: mpsc::UnboundedReceiver<String>,
    lines: Arc<Mutex<Vec<String>>>,
}

impl ScriptedHandle {
    /// Queues an input line. Returns `false` once input has ended or the
    /// console is gone.
    pub fn push_line(&self, line: &str) -> bool {
        self.input
            .as_ref()
            .is_some_and(|tx| tx.send(Ok(line.to_owned())).is_ok())
    }

    /// Queues an input failure.
    pub fn fail(&self, err: ConsoleError) -> bool {
        self.input.as_ref().is_some_and(|tx| tx.send(Err(err)).is_ok())
    }

    /// Ends input; the reader reports end-of-input once queued lines drain.
    pub fn end_input(&mut self) {
        self.input = None;
    }

    /// Waits for the next displayed line.
    pub async fn next_output(&mut self) -> Option<String> {
        self.output.recv().await
    }

    /// Returns every line displayed so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[derive(Debug)]
struct ScriptedReader {
    input: mpsc::UnboundedReceiver<Result<String, ConsoleError>>,
}

#[async_trait]
impl LineReader for ScriptedReader {
    async fn read_line(&mut self) -> Result<String, ConsoleError> {
        match self.input.recv().await {
            Some(line) => line,
            None => Err(ConsoleError::Eof),
        }
    }
}

#[derive(Debug)]
struct CapturingWriter {
    lines: Arc<Mutex<Vec<String>>>,
    notify: mpsc::UnboundedSender<String>,
}

impl LineWriter for CapturingWriter {
    fn write_line(&self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_owned());
        // The handle may have been dropped; capture still succeeds.
        let _ = self.notify.send(line.to_owned());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pushed_lines_are_read_in_order() {
        let (mut console, handle) = ScriptedConsole::pair();
        assert!(handle.push_line("one"));
        assert!(handle.push_line("two"));

        let Ok(first) = console.reader.read_line().await else {
            panic!("expected first line");
        };
        let Ok(second) = console.reader.read_line().await else {
            panic!("expected second line");
        };
        assert_eq!(first, "one");
        assert_eq!(second, "two");
    }

    #[tokio::test]
    async fn ended_input_reports_eof() {
        let (mut console, mut handle) = ScriptedConsole::pair();
        handle.push_line("last");
        handle.end_input();
        assert!(!handle.push_line("ignored"));

        assert!(matches!(console.reader.read_line().await, Ok(line) if line == "last"));
        assert!(matches!(console.reader.read_line().await, Err(ConsoleError::Eof)));
    }

    #[tokio::test]
    async fn written_lines_are_captured() {
        let (console, mut handle) = ScriptedConsole::pair();
        tokio_test::assert_ok!(console.writer.write_line("< hi"));

        assert_eq!(handle.next_output().await.as_deref(), Some("< hi"));
        assert_eq!(handle.lines(), vec!["< hi".to_string()]);
    }
}
