//! Request contexts
//!
//! A [`RequestContext`] bounds the lifetime of a single API call. It carries
//! an optional deadline and any number of cancellation signals inherited
//! from the contexts it was derived from. The executor races the request
//! against [`RequestContext::done`] and abandons it as soon as the context
//! finishes.
//!
//! ```rust,ignore
//! let (ctx, cancel) = RequestContext::background()
//!     .with_timeout(Duration::from_secs(5))
//!     .with_cancel();
//!
//! tokio::spawn(async move {
//!     tokio::time::sleep(Duration::from_secs(1)).await;
//!     cancel.cancel();
//! });
//!
//! let user = api.user_details(&ctx).await; // Err(Error::Cancelled) after ~1s
//! ```

use crate::error::Error;
use futures::future::select_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Cancel side of a cancellable [`RequestContext`]
///
/// Cancelling is idempotent. Dropping the handle without calling
/// [`CancelHandle::cancel`] leaves the context running.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Cancel the context and every context derived from it
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Check whether cancel has been called
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Cancellable handle with an optional deadline, scoped to one call
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    signals: Vec<watch::Receiver<bool>>,
}

impl RequestContext {
    /// A context that never expires and is never cancelled
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that expires after `timeout`
    ///
    /// A timeout too large to represent as an instant adds no deadline.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.clone(),
        }
    }

    /// Derive a context that expires at `deadline`
    ///
    /// A parent deadline that is earlier is kept.
    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(current) if current <= deadline => current,
            _ => deadline,
        };
        Self {
            deadline: Some(deadline),
            signals: self.signals.clone(),
        }
    }

    /// Derive a cancellable context
    ///
    /// The returned context is also cancelled when this one is.
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let mut signals = self.signals.clone();
        signals.push(rx);
        (
            Self {
                deadline: self.deadline,
                signals,
            },
            CancelHandle { tx: Arc::new(tx) },
        )
    }

    /// The deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, if any
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Check whether the context has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.signals.iter().any(|rx| *rx.borrow())
    }

    /// The error this context finished with, or `None` while it is live
    ///
    /// Cancellation takes precedence over an elapsed deadline.
    pub fn err(&self) -> Option<Error> {
        if self.is_cancelled() {
            return Some(Error::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Error::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolve once the context is done, yielding why
    pub async fn done(&self) -> Error {
        if let Some(err) = self.err() {
            return err;
        }

        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    () = self.cancelled() => Error::Cancelled,
                    () = tokio::time::sleep_until(deadline) => Error::DeadlineExceeded,
                }
            }
            None => {
                self.cancelled().await;
                Error::Cancelled
            }
        }
    }

    /// Resolve once any inherited cancel signal fires
    async fn cancelled(&self) {
        if self.signals.is_empty() {
            return std::future::pending().await;
        }

        let waits = self.signals.iter().cloned().map(|mut rx| {
            Box::pin(async move {
                let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
                // A dropped handle can no longer cancel
                if closed {
                    std::future::pending::<()>().await;
                }
            })
        });
        select_all(waits).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_live() {
        let ctx = RequestContext::background();
        assert!(ctx.err().is_none());
        assert!(ctx.deadline().is_none());
        assert!(ctx.remaining().is_none());
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_earliest_deadline_wins() {
        let parent = RequestContext::background().with_timeout(Duration::from_secs(1));
        let child = parent.with_timeout(Duration::from_secs(60));
        assert_eq!(child.deadline(), parent.deadline());

        let shorter = parent.with_timeout(Duration::from_millis(10));
        assert!(shorter.deadline() < parent.deadline());
    }

    #[tokio::test]
    async fn test_unrepresentable_timeout_adds_no_deadline() {
        let ctx = RequestContext::background().with_timeout(Duration::MAX);
        assert!(ctx.deadline().is_none());
        assert!(ctx.err().is_none());

        let ctx = RequestContext::background().with_timeout(Duration::from_secs(u64::MAX / 2));
        assert!(ctx.deadline().is_none());

        let parent = RequestContext::background().with_timeout(Duration::from_secs(1));
        let child = parent.with_timeout(Duration::MAX);
        assert_eq!(child.deadline(), parent.deadline());
    }

    #[tokio::test]
    async fn test_done_on_deadline() {
        let ctx = RequestContext::background().with_timeout(Duration::from_millis(50));
        let err = ctx.done().await;
        assert!(matches!(err, Error::DeadlineExceeded));
        assert!(matches!(ctx.err(), Some(Error::DeadlineExceeded)));
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[tokio::test]
    async fn test_done_on_cancel() {
        let (ctx, cancel) = RequestContext::background().with_cancel();
        let waiter = tokio::spawn(async move { ctx.done().await });

        cancel.cancel();
        let err = waiter.await.unwrap();
        assert!(matches!(err, Error::Cancelled));
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let (ctx, cancel) = RequestContext::background().with_cancel();
        cancel.cancel();
        cancel.cancel();
        assert!(matches!(ctx.err(), Some(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_parent_cancel_reaches_child() {
        let (parent, cancel) = RequestContext::background().with_cancel();
        let (child, _child_cancel) = parent.with_cancel();

        cancel.cancel();
        assert!(matches!(child.done().await, Error::Cancelled));
    }

    #[tokio::test]
    async fn test_child_cancel_does_not_reach_parent_or_sibling() {
        let (parent, _cancel) = RequestContext::background().with_cancel();
        let (child, child_cancel) = parent.with_cancel();
        let (sibling, _sibling_cancel) = parent.with_cancel();

        child_cancel.cancel();
        assert!(child.err().is_some());
        assert!(parent.err().is_none());
        assert!(sibling.err().is_none());
    }

    #[tokio::test]
    async fn test_dropped_handle_does_not_cancel() {
        let (ctx, cancel) = RequestContext::background()
            .with_timeout(Duration::from_millis(50))
            .with_cancel();
        drop(cancel);

        assert!(matches!(ctx.done().await, Error::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_cancel_takes_precedence_over_deadline() {
        let (ctx, cancel) = RequestContext::background()
            .with_timeout(Duration::ZERO)
            .with_cancel();
        cancel.cancel();

        assert!(matches!(ctx.err(), Some(Error::Cancelled)));
        assert!(matches!(ctx.done().await, Error::Cancelled));
    }
}
