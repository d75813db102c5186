//! Shared cancellation token
//!
//! One token is created per run and handed to every worker, the interval
//! reporter, and the benchmark plug-in. It is fired by whichever comes
//! first: the run deadline, a shutdown signal, a worker observing the event
//! cap, or a worker observing a fatal benchmark error. Firing is idempotent.

use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable cancellation token backed by a watch channel.
///
/// Cheap to clone and to poll; `cancelled()` resolves immediately once the
/// token has fired, however long after the fact it is awaited.
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { inner: Arc::new(tx) }
    }

    /// Fire the token. Safe to call any number of times from any task.
    pub fn cancel(&self) {
        self.inner.send_replace(true);
    }

    /// Non-blocking check, used at the top of each worker iteration.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        *self.inner.borrow()
    }

    /// Resolve once the token fires (immediately if it already has).
    pub async fn cancelled(&self) {
        let mut rx = self.inner.subscribe();
        // The sender lives in self, so wait_for cannot observe a closed
        // channel while we are borrowing it.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_is_observable() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        token.cancel();
        assert!(token.is_cancelled());

        // Resolves immediately after the fact.
        tokio::time::timeout(Duration::from_secs(1), token.cancelled())
            .await
            .expect("cancelled() should resolve after cancel()");
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let token = CancelToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();

        let waiter = tokio::spawn(async move { clone.cancelled().await });

        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("clone should observe cancellation")
            .unwrap();
    }
}
