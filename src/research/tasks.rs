//! Fan-out plumbing for the deep-research orchestrator.
//!
//! Subtasks inside one stage run concurrently, each with its own timeout,
//! and degrade independently: a failing, timed-out, or cancelled subtask
//! yields its documented default instead of aborting its siblings. The
//! wrapper owns those semantics so orchestration code never hand-rolls
//! per-call try/catch.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Cancellation signal a caller hands to `run_deep_research`. Cloneable;
/// every in-flight subtask watches the same signal.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

/// The caller-side handle that triggers cancellation.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// Create a linked (handle, signal) pair.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

impl CancelHandle {
    /// Abandon the query. Every watching subtask unwinds to its default.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

impl CancelSignal {
    /// A signal that never fires, for callers without cancellation needs.
    /// Dropping the sender closes the channel, which `cancelled` treats as
    /// never-cancelled.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation fires. If the handle is dropped without
    /// cancelling, this pends forever (the subtask then runs to its own
    /// timeout).
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow() {
                return;
            }
            if self.rx.changed().await.is_err() {
                futures::future::pending::<()>().await;
            }
        }
    }
}

/// Result of one wrapped subtask: the value (real or default) plus whether
/// the subtask actually ran to success, for the agents-used envelope.
#[derive(Debug)]
pub struct SubtaskOutcome<T> {
    pub label: &'static str,
    pub value: T,
    pub succeeded: bool,
}

/// Run one fallible subtask with a timeout and cancellation watch.
///
/// Failure, timeout, and cancellation all collapse to the supplied default;
/// a cancelled subtask's partial result is discarded exactly like a failure.
pub async fn run_subtask<T, F>(
    label: &'static str,
    timeout: Duration,
    cancel: &CancelSignal,
    default: T,
    fut: F,
) -> SubtaskOutcome<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    let mut cancel = cancel.clone();

    tokio::select! {
        _ = cancel.cancelled() => {
            warn!(subtask = label, "subtask cancelled, discarding partial result");
            SubtaskOutcome { label, value: default, succeeded: false }
        }
        result = tokio::time::timeout(timeout, fut) => match result {
            Ok(Ok(value)) => {
                debug!(subtask = label, "subtask succeeded");
                SubtaskOutcome { label, value, succeeded: true }
            }
            Ok(Err(e)) => {
                warn!(subtask = label, error = %e, "subtask failed, using default");
                SubtaskOutcome { label, value: default, succeeded: false }
            }
            Err(_) => {
                warn!(subtask = label, timeout_s = timeout.as_secs(), "subtask timed out, using default");
                SubtaskOutcome { label, value: default, succeeded: false }
            }
        }
    }
}
