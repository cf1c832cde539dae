// Cooperative Cancellation Token

use tokio::sync::watch;

/// Cancellation signal handed to an action invocation
///
/// Cancellation is cooperative: it unblocks waiters, it never touches processes.
#[derive(Clone, Debug)]
pub struct CancellationToken {
    rx: Option<watch::Receiver<bool>>,
}

impl CancellationToken {
    /// Token that is never cancelled
    pub fn never() -> Self {
        Self { rx: None }
    }

    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Wait for cancellation
    ///
    /// Returns immediately if already cancelled. Pends forever if the source is
    /// dropped without cancelling.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Cancellation sender
#[derive(Debug)]
pub struct CancellationSource {
    tx: watch::Sender<bool>,
}

impl CancellationSource {
    /// Signal cancellation to every token of this source
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Another token observing this source
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            rx: Some(self.tx.subscribe()),
        }
    }
}

/// Create a cancellation channel
pub fn cancellation_channel() -> (CancellationSource, CancellationToken) {
    let (tx, rx) = watch::channel(false);
    (CancellationSource { tx }, CancellationToken { rx: Some(rx) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_test::{assert_pending, assert_ready, task};

    #[tokio::test]
    async fn test_cancel_wakes_waiter() {
        let (source, token) = cancellation_channel();

        let waiter = tokio::spawn({
            let token = token.clone();
            async move { token.cancelled().await }
        });

        assert!(!token.is_cancelled());
        source.cancel();

        timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake up")
            .unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_already_cancelled_returns_immediately() {
        let (source, token) = cancellation_channel();
        source.cancel();

        timeout(Duration::from_millis(100), token.cancelled())
            .await
            .expect("cancelled() should not wait");
    }

    #[test]
    fn test_dropped_source_never_cancels() {
        let (source, token) = cancellation_channel();
        drop(source);

        let mut cancelled = task::spawn(token.cancelled());
        assert_pending!(cancelled.poll());
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_never_token() {
        let token = CancellationToken::never();

        let mut cancelled = task::spawn(token.cancelled());
        assert_pending!(cancelled.poll());
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_notifies_pending_future() {
        let (source, token) = cancellation_channel();

        let mut cancelled = task::spawn(token.cancelled());
        assert_pending!(cancelled.poll());

        source.cancel();
        assert!(cancelled.is_woken());
        assert_ready!(cancelled.poll());
    }

    #[tokio::test]
    async fn test_source_tokens_share_state() {
        let (source, _token) = cancellation_channel();
        let late = source.token();

        source.cancel();
        assert!(late.is_cancelled());
        assert!(source.is_cancelled());
    }
}
