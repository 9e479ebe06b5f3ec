//! First-wins outcome slot shared by the session loops.
//!
//! Either loop may [`Outcome::publish`] its terminal error. Only the first
//! publish reaches the coordinator; later ones are dropped without
//! blocking. Every publish also cancels the shared token, which is how the
//! losing loop learns it should stop.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::error::SessionError;

/// Receiving end of an [`Outcome`], held by the coordinator.
pub type OutcomeReceiver = oneshot::Receiver<SessionError>;

/// Single-publish terminal result with an attached cancellation token.
#[derive(Debug, Clone)]
pub struct Outcome {
    slot: Arc<Mutex<Option<oneshot::Sender<SessionError>>>>,
    cancel: CancellationToken,
}

impl Outcome {
    /// Creates an empty slot and its receiver.
    #[must_use]
    pub fn new() -> (Self, OutcomeReceiver) {
        let (tx, rx) = oneshot::channel();
        let outcome = Self {
            slot: Arc::new(Mutex::new(Some(tx))),
            cancel: CancellationToken::new(),
        };
        (outcome, rx)
    }

    /// Publishes `error` if no outcome has been published yet, and cancels
    /// the session either way. Returns `true` if this call won.
    pub fn publish(&self, error: SessionError) -> bool {
        let sender = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.cancel.cancel();
        match sender {
            Some(tx) => {
                tracing::debug!(%error, "session outcome settled");
                tx.send(error).is_ok()
            }
            None => {
                tracing::trace!(%error, "session already settled; dropping outcome");
                false
            }
        }
    }

    /// Returns `true` once any loop has published.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Completes once the session has been settled.
    pub fn settled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::error::ConsoleError;

    #[tokio::test]
    async fn first_publish_wins() {
        let (outcome, rx) = Outcome::new();
        let other = outcome.clone();

        assert!(outcome.publish(SessionError::from(ConsoleError::Eof)));
        assert!(!other.publish(SessionError::Aborted));

        let Ok(received) = rx.await else {
            panic!("outcome was never delivered");
        };
        assert!(matches!(received, SessionError::Console(ConsoleError::Eof)));
    }

    #[tokio::test]
    async fn publish_cancels_every_clone() {
        let (outcome, _rx) = Outcome::new();
        let loser = outcome.clone();
        assert!(!loser.is_settled());

        outcome.publish(SessionError::Aborted);

        assert!(loser.is_settled());
        tokio_test::assert_ready!(tokio_test::task::spawn(loser.settled()).poll());
    }

    #[tokio::test]
    async fn dropped_slot_closes_receiver() {
        let (outcome, rx) = Outcome::new();
        drop(outcome);
        assert!(rx.await.is_err());
    }

    #[test]
    fn publish_after_receiver_dropped_does_not_block() {
        let (outcome, rx) = Outcome::new();
        drop(rx);
        assert!(!outcome.publish(SessionError::Aborted));
        assert!(outcome.is_settled());
    }
}
