//! Network → console direction.

use std::sync::Arc;

use super::outcome::Outcome;
use crate::console::LineWriter;
use crate::error::{ConsoleError, SessionError};
use crate::format::{Style, format_hex, paint, rx_line};
use crate::ws::{Frame, FrameReader};

/// Reads frames and displays them until a read fails, an undisplayable
/// frame arrives, the peer closes, or the session is settled by the other
/// loop.
pub async fn run_socket_loop(
    mut reader: FrameReader,
    out: Arc<dyn LineWriter>,
    colored: bool,
    outcome: Outcome,
) {
    loop {
        let frame = tokio::select! {
            biased;
            () = outcome.settled() => break,
            frame = reader.next_frame() => frame,
        };
        let text = match render(frame) {
            Ok(text) => text,
            Err(err) => {
                outcome.publish(err);
                break;
            }
        };
        if let Err(err) = out.write_line(&paint(Style::Received, &rx_line(&text), colored)) {
            outcome.publish(SessionError::Console(ConsoleError::Io(err)));
            break;
        }
    }
    tracing::debug!("socket loop stopped");
}

/// Turns a received frame into display text, or into the error ending the
/// session.
fn render(frame: Result<Frame, SessionError>) -> Result<String, SessionError> {
    match frame? {
        Frame::Text(text) => Ok(text),
        Frame::Binary(data) => Ok(format_hex(&data)),
        Frame::Close { code, reason } => Err(SessionError::Closed { code, reason }),
        other => Err(SessionError::UnknownFrameType(other.kind())),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::ws::FrameKind;

    #[test]
    fn text_and_binary_render() {
        assert!(matches!(render(Ok(Frame::Text("hi".to_string()))), Ok(t) if t == "hi"));
        assert!(matches!(
            render(Ok(Frame::Binary(Bytes::from_static(&[0xab, 0xcd])))),
            Ok(t) if t == "ab cd "
        ));
    }

    #[test]
    fn unknown_frames_end_the_session() {
        let result = render(Ok(Frame::Unknown(FrameKind::from_opcode(0x3))));
        let Err(SessionError::UnknownFrameType(kind)) = result else {
            panic!("expected unknown frame type");
        };
        assert_eq!(kind.opcode(), 0x3);
    }

    #[test]
    fn stray_control_frames_are_unknown() {
        let result = render(Ok(Frame::Ping(Bytes::new())));
        assert!(matches!(
            result,
            Err(SessionError::UnknownFrameType(FrameKind::PING))
        ));
    }

    #[test]
    fn close_frames_end_the_session() {
        let result = render(Ok(Frame::Close {
            code: 1001,
            reason: "bye".to_string(),
        }));
        assert!(matches!(result, Err(SessionError::Closed { code: 1001, .. })));
    }
}
