//! Cooperative cancellation scope
//!
//! A scope combines an explicit cancellation signal with an optional
//! deadline. Scopes form a tree: cancelling a parent cancels every child,
//! and a child's deadline is never later than its parent's.

use std::future::Future;
use std::time::Duration;

use postkit_domain::{CancelReason, PostalError, Result};
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Cancellation signal plus optional deadline, cheap to clone
#[derive(Debug, Clone, Default)]
pub struct CancelScope {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CancelScope {
    /// Root scope with no deadline
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Root scope that expires after `timeout`
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self { token: CancellationToken::new(), deadline: Some(deadline) }
    }

    /// Child scope cancelled together with this one
    #[must_use]
    pub fn child(&self) -> Self {
        Self { token: self.token.child_token(), deadline: self.deadline }
    }

    /// Child scope whose deadline is the earlier of the parent's and
    /// `now + timeout`
    #[must_use]
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(parent) => parent.min(candidate),
            None => candidate,
        };
        Self { token: self.token.child_token(), deadline: Some(deadline) }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Guard that cancels this scope when dropped
    #[must_use]
    pub fn cancel_on_drop(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Why the scope terminated, or `None` while it is still live
    #[must_use]
    pub fn reason(&self) -> Option<CancelReason> {
        if self.token.is_cancelled() {
            Some(CancelReason::Cancelled)
        } else if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            Some(CancelReason::DeadlineExceeded)
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.reason().is_some()
    }

    /// `Err(Cancelled)` once the scope has terminated
    ///
    /// # Errors
    /// Returns `PostalError::Cancelled` with the termination reason.
    pub fn check(&self) -> Result<()> {
        match self.reason() {
            Some(reason) => Err(reason.into()),
            None => Ok(()),
        }
    }

    /// Resolves when the scope is cancelled or its deadline passes
    pub async fn done(&self) -> CancelReason {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                () = self.token.cancelled() => CancelReason::Cancelled,
                () = tokio::time::sleep_until(deadline) => CancelReason::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                CancelReason::Cancelled
            }
        }
    }

    /// Race `future` against the scope
    ///
    /// # Errors
    /// Returns `PostalError::Cancelled` if the scope terminates first.
    pub async fn run<F>(&self, future: F) -> Result<F::Output>
    where
        F: Future,
    {
        self.check()?;
        tokio::select! {
            biased;
            reason = self.done() => Err(PostalError::Cancelled(reason)),
            output = future => Ok(output),
        }
    }

    /// Sleep that wakes early on termination
    ///
    /// # Errors
    /// Returns `PostalError::Cancelled` if the scope terminates first.
    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        self.run(tokio::time::sleep(duration)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_live_scope_runs_future() {
        let scope = CancelScope::new();
        assert_eq!(scope.run(async { 7 }).await.unwrap(), 7);
        assert!(scope.reason().is_none());
    }

    #[tokio::test]
    async fn test_cancel_propagates_to_children() {
        let parent = CancelScope::new();
        let child = parent.child();
        parent.cancel();
        assert_eq!(child.reason(), Some(CancelReason::Cancelled));
        assert!(matches!(
            child.run(std::future::pending::<()>()).await,
            Err(PostalError::Cancelled(CancelReason::Cancelled))
        ));
    }

    #[tokio::test]
    async fn test_child_cancel_does_not_reach_parent() {
        let parent = CancelScope::new();
        let child = parent.child();
        child.cancel();
        assert!(parent.reason().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let scope = CancelScope::with_timeout(Duration::from_millis(50));
        let result = scope.sleep(Duration::from_secs(10)).await;
        assert!(matches!(result, Err(PostalError::Cancelled(CancelReason::DeadlineExceeded))));
        assert_eq!(scope.reason(), Some(CancelReason::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_child_deadline_never_exceeds_parent() {
        let parent = CancelScope::with_timeout(Duration::from_secs(1));
        let child = parent.child_with_timeout(Duration::from_secs(60));
        assert_eq!(child.deadline(), parent.deadline());
    }

    #[tokio::test]
    async fn test_done_wakes_on_cancel() {
        let scope = CancelScope::new();
        let mut done = tokio_test::task::spawn(scope.done());
        tokio_test::assert_pending!(done.poll());

        scope.cancel();
        assert!(done.is_woken());
        assert_eq!(tokio_test::assert_ready!(done.poll()), CancelReason::Cancelled);
    }

    #[tokio::test]
    async fn test_drop_guard_cancels() {
        let scope = CancelScope::new();
        drop(scope.cancel_on_drop());
        assert_eq!(scope.reason(), Some(CancelReason::Cancelled));
    }

    #[tokio::test]
    async fn test_check_after_cancel() {
        let scope = CancelScope::new();
        assert!(scope.check().is_ok());
        scope.cancel();
        assert!(scope.check().unwrap_err().is_cancelled());
    }
}
