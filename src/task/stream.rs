//! # Status streams and subscription handles.
//!
//! - [`StatusStream`] — `futures::Stream` of statuses, backed by an unbounded
//!   channel fed inside the task's critical section (so it never blocks the
//!   task). Ends after the terminal status. Dropping it detaches.
//! - [`Subscription`] — handle of a callback observer; dropping it detaches.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

use crate::error::TaskFailure;
use crate::status::Status;

/// Stream of status changes of one task.
pub struct StatusStream<S, E> {
    rx: mpsc::UnboundedReceiver<Status<S, E>>,
}

impl<S, E> StatusStream<S, E> {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<Status<S, E>>) -> Self {
        Self { rx }
    }

    /// Next status, or `None` once the stream is complete.
    pub async fn next_status(&mut self) -> Option<Status<S, E>> {
        self.rx.recv().await
    }

    /// Output view: `Ok` for success, `Err` for error/cancellation; statuses
    /// that carry neither are skipped.
    pub fn results(self) -> impl Stream<Item = Result<S, TaskFailure<E>>> {
        self.filter_map(|status| futures::future::ready(status.into_result()))
    }

    /// Detaches from the task.
    pub fn unsubscribe(self) {}
}

impl<S, E> Stream for StatusStream<S, E> {
    type Item = Status<S, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Handle of a registered observer.
#[must_use = "dropping a Subscription detaches its observer"]
#[derive(Debug)]
pub struct Subscription {
    active: Arc<AtomicBool>,
}

impl Subscription {
    pub(crate) fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Subscription to a task that had already finished.
    pub(crate) fn inert() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.active)
    }

    /// True until the subscription is detached.
    pub fn is_active(&self) -> bool {
        self.active.load(AtomicOrdering::Acquire)
    }

    /// Detaches the observer.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.active.store(false, AtomicOrdering::Release);
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use crate::error::TaskFailure;
    use crate::task::Task;

    type T = Task<u32, String>;

    fn parked() -> (T, T) {
        let slot = std::sync::Arc::new(parking_lot::Mutex::new(None));
        let keep = std::sync::Arc::clone(&slot);
        let task: T = Task::new(move |t| *keep.lock() = Some(t));
        task.start();
        let worker = slot.lock().take().unwrap();
        (task, worker)
    }

    #[tokio::test]
    async fn results_yield_success_once_and_end() {
        let (task, worker) = parked();
        let results = task.subscribe().results();
        worker.progress(0.3);
        worker.progress_indeterminate();
        worker.succeed(11);

        let collected: Vec<_> = results.collect().await;
        assert_eq!(collected, vec![Ok(11)]);
    }

    #[tokio::test]
    async fn results_map_failure_and_cancellation() {
        let (task, worker) = parked();
        let results = task.subscribe().results();
        worker.progress(0.5);
        worker.fail("disk full".into());
        let collected: Vec<_> = results.collect().await;
        assert_eq!(collected, vec![Err(TaskFailure::Error("disk full".to_string()))]);

        let (task, _worker) = parked();
        let results = task.subscribe().results();
        task.cancel();
        let collected: Vec<_> = results.collect().await;
        assert_eq!(collected, vec![Err(TaskFailure::Canceled)]);
    }

    #[tokio::test]
    async fn stream_ends_after_terminal_status() {
        let (task, worker) = parked();
        let mut stream = task.subscribe();
        worker.succeed(1);
        assert!(stream.next_status().await.is_some_and(|s| s.is_terminal()));
        assert!(stream.next_status().await.is_none());
    }
}
