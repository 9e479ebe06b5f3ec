//! Console → network direction.

use bytes::Bytes;

use super::outcome::Outcome;
use crate::console::{ConsoleCommand, LineReader};
use crate::error::SessionError;
use crate::ws::FrameWriter;

/// Reads console lines and sends them as frames until input ends, a send
/// fails, or the session is settled by the other loop.
///
/// Returns the writer so the coordinator can close the connection.
pub async fn run_console_loop(
    mut input: Box<dyn LineReader>,
    mut writer: FrameWriter,
    outcome: Outcome,
) -> FrameWriter {
    loop {
        let line = tokio::select! {
            biased;
            () = outcome.settled() => break,
            line = input.read_line() => line,
        };
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                outcome.publish(err.into());
                break;
            }
        };

        let sent = tokio::select! {
            biased;
            () = outcome.settled() => break,
            sent = send(&mut writer, ConsoleCommand::parse(line)) => sent,
        };
        if let Err(err) = sent {
            outcome.publish(err);
            break;
        }
    }
    tracing::debug!("console loop stopped");
    writer
}

async fn send(writer: &mut FrameWriter, command: ConsoleCommand) -> Result<(), SessionError> {
    match command {
        ConsoleCommand::Ping => {
            tracing::trace!("sending ping");
            writer.send_ping(Bytes::new()).await
        }
        ConsoleCommand::Text(text) => {
            tracing::trace!(len = text.len(), "sending text frame");
            writer.send_text(text).await
        }
    }
}
