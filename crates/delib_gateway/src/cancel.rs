//! One cancel signal per session (spec §5). Every model call, retry loop,
//! and recursion level checks it on entry and on each suspension point.
//! Cancellation is idempotent.

use tokio_util::sync::CancellationToken;

/// Thin, cloneable wrapper so the rest of the engine doesn't spell out
/// `tokio_util::sync::CancellationToken` everywhere. Cloning shares the same
/// underlying signal — there is exactly one cancel signal per session
/// (spec §5), installed at session start and threaded explicitly (no
/// globals, spec §5).
#[derive(Clone, Debug, Default)]
pub struct CancelToken(CancellationToken);

impl CancelToken {
    pub fn new() -> Self {
        Self(CancellationToken::new())
    }

    /// Trip the signal. Idempotent: cancelling an already-cancelled token is
    /// a no-op.
    pub fn cancel(&self) {
        self.0.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }

    /// Resolves once `cancel()` has been called. Awaiting this is the
    /// suspension point the spec requires at (a) admission-permit
    /// acquisition, (b) awaiting the next streamed chunk, and (c) awaiting
    /// child group completion.
    pub async fn cancelled(&self) {
        self.0.cancelled().await;
    }

    pub(crate) fn inner(&self) -> &CancellationToken {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancellation_is_idempotent_and_observable() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
        token.cancelled().await; // must resolve immediately
    }

    #[tokio::test]
    async fn clones_share_the_same_signal() {
        let token = CancelToken::new();
        let clone = token.clone();
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
