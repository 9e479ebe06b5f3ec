//! Terminal console over the process's standard streams.
//!
//! Stdin is read on a dedicated thread and handed to the async side over a
//! channel. A blocking read on the runtime's stdin handle would keep the
//! runtime from shutting down while the operator has not typed anything.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;

use async_trait::async_trait;
use crossterm::queue;
use crossterm::style::Print;
use crossterm::tty::IsTty;
use tokio::sync::mpsc;

use super::{Console, LineReader, LineWriter, trim_line_ending};
use crate::error::ConsoleError;

/// Builds the terminal console. `prompt` is shown before each input line
/// when stdin is a terminal.
///
/// # Errors
///
/// Returns an error if the stdin reader thread cannot be spawned or the
/// interrupt handler cannot be installed.
pub fn stdio(prompt: &str) -> io::Result<Console> {
    let writer = Arc::new(StdoutWriter);
    let prompt = Some(prompt)
        .filter(|p| !p.is_empty() && io::stdin().is_tty())
        .map(str::to_owned);

    let (tx, rx) = mpsc::channel(1);
    let prompt_writer = Arc::clone(&writer);
    thread::Builder::new()
        .name("wsprobe-stdin".to_string())
        .spawn(move || pump_stdin(&tx, prompt.as_deref(), &prompt_writer))?;

    let interrupts = interrupts()?;
    Ok(Console::new(
        Box::new(StdinReader {
            lines: rx,
            interrupts,
        }),
        writer,
    ))
}

/// Interrupt stream registered once, so a Ctrl-C that arrives while no
/// read is pending is still delivered to the next one.
#[cfg(unix)]
type Interrupts = tokio::signal::unix::Signal;
#[cfg(windows)]
type Interrupts = tokio::signal::windows::CtrlC;

#[cfg(unix)]
fn interrupts() -> io::Result<Interrupts> {
    tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
}

#[cfg(windows)]
fn interrupts() -> io::Result<Interrupts> {
    tokio::signal::windows::ctrl_c()
}

/// Reads stdin line by line until EOF, an error, or the receiver is gone.
fn pump_stdin(tx: &mpsc::Sender<io::Result<String>>, prompt: Option<&str>, out: &StdoutWriter) {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        if let Some(prompt) = prompt
            && let Err(err) = out.write_prompt(prompt)
        {
            tracing::debug!(%err, "failed to draw prompt");
        }

        let mut line = String::new();
        let read = match input.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => Ok(trim_line_ending(line)),
            Err(err) => Err(err),
        };
        let failed = read.is_err();
        if tx.blocking_send(read).is_err() || failed {
            break;
        }
    }
    tracing::trace!("stdin reader finished");
}

/// Async side of the stdin reader thread.
#[derive(Debug)]
struct StdinReader {
    lines: mpsc::Receiver<io::Result<String>>,
    interrupts: Interrupts,
}

#[async_trait]
impl LineReader for StdinReader {
    async fn read_line(&mut self) -> Result<String, ConsoleError> {
        tokio::select! {
            biased;
            Some(()) = self.interrupts.recv() => Err(ConsoleError::Interrupted),
            line = self.lines.recv() => match line {
                Some(Ok(line)) => Ok(line),
                Some(Err(err)) => Err(ConsoleError::Io(err)),
                None => Err(ConsoleError::Eof),
            },
        }
    }
}

/// Stdout sink. Each line is queued and flushed under one stdout lock.
#[derive(Debug, Default)]
pub struct StdoutWriter;

impl StdoutWriter {
    fn write_prompt(&self, prompt: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        queue!(out, Print(prompt))?;
        out.flush()
    }
}

impl LineWriter for StdoutWriter {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        queue!(out, Print(line), Print('\n'))?;
        out.flush()
    }

    fn flush(&self) -> io::Result<()> {
        io::stdout().lock().flush()
    }
}
