//! # Derived tasks.
//!
//! [`Task::map`] builds a task whose status stream mirrors its source with the
//! success value transformed. Starting the derived task starts the source.
//!
//! ```text
//!   source ── Started ── Progress(p) ── Success(v)
//!     │ (forwarder, runs under the source lock)
//!     ▼
//!   mapped ── Started ── Progress(p) ── Success(f(v))
//! ```
//!
//! The forwarder holds the derived task weakly; lock order is always
//! source → derived. Cancelling the derived task cancels the source once the
//! derived lock is released, so work started by the source sees its token
//! fire.

use std::sync::Arc;

use crate::status::{Demand, Status};
use crate::task::Task;

impl<S, E> Task<S, E>
where
    S: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Returns a task mirroring this one with `transform` applied to the
    /// success value. Errors and cancellation propagate unchanged, and
    /// cancelling the returned task cancels this one.
    ///
    /// # Example
    /// ```
    /// use taskreactor::{Status, Task};
    ///
    /// let source: Task<u32, String> = Task::new(|t| t.succeed(20));
    /// let doubled = source.map(|v| v * 2);
    ///
    /// doubled.start();
    /// assert_eq!(doubled.status(), Status::Success(40));
    /// assert_eq!(source.status(), Status::Success(20));
    /// ```
    pub fn map<T, F>(&self, transform: F) -> Task<T, E>
    where
        T: Clone + Send + 'static,
        F: Fn(S) -> T + Send + Sync + 'static,
    {
        let source = self.clone();
        let mapped = Task::new(move |_| source.request(Demand::Unlimited));

        let upstream = self.clone();
        mapped.on_cancel(Box::new(move || {
            let _ = upstream.try_cancel();
        }));

        let target = mapped.downgrade();
        let forward = move |status: &Status<S, E>| {
            if let Some(mapped) = target.upgrade() {
                mapped.adopt(status.clone().map(&transform));
            }
        };
        let subscription = self.observe(Arc::new(forward), true);
        mapped.retain(subscription);
        mapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskFailure;
    use crate::status::Progress;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type T = Task<u32, String>;

    #[test]
    fn mapped_success_is_transformed_once() {
        let source: T = Task::new(|t| {
            t.progress(0.5);
            t.succeed(21);
        });
        let mapped = source.map(|v| format!("v={}", v * 2));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = mapped.on_status(move |s| sink.lock().push(s.clone()));

        mapped.start();

        let seen = seen.lock();
        assert_eq!(
            *seen,
            vec![
                Status::Started,
                Status::Progress(Some(Progress::new(0.5))),
                Status::Success("v=42".to_string()),
            ]
        );
        assert_eq!(seen.iter().filter(|s| s.is_terminal()).count(), 1);
    }

    #[test]
    fn mapped_start_runs_source_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&runs);
        let source: T = Task::new(move |t| {
            r.fetch_add(1, Ordering::SeqCst);
            t.succeed(1);
        });
        let a = source.map(|v| v + 1);
        let b = source.map(|v| v + 2);
        a.start();
        b.start();
        source.start();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(a.status(), Status::Success(2));
        assert_eq!(b.status(), Status::Success(3));
    }

    #[test]
    fn mirrors_source_started_elsewhere() {
        let parked: Arc<Mutex<Option<T>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&parked);
        let source: T = Task::new(move |t| *slot.lock() = Some(t));
        source.start();

        let mapped = source.map(|v| v * 10);
        assert_eq!(mapped.status(), Status::Started);

        parked.lock().take().unwrap().succeed(4);
        assert_eq!(mapped.status(), Status::Success(40));
    }

    #[test]
    fn errors_and_cancellation_propagate() {
        let failing: T = Task::new(|t| t.fail("nope".into()));
        let mapped = failing.map(|v| v);
        mapped.start();
        assert_eq!(mapped.status(), Status::Error("nope".into()));

        let idle: T = Task::new(|_| {});
        let mapped = idle.map(|v| v);
        idle.cancel();
        assert_eq!(mapped.status(), Status::Canceled);
        assert!(mapped.cancellation_token().is_cancelled());
    }

    #[test]
    fn cancelling_mapped_task_cancels_source() {
        let parked: Arc<Mutex<Option<T>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&parked);
        let source: T = Task::new(move |t| *slot.lock() = Some(t));
        let mapped = source.map(|v| v + 1);
        mapped.start();

        mapped.cancel();
        assert_eq!(mapped.status(), Status::Canceled);
        assert_eq!(source.status(), Status::Canceled);
        assert!(source.cancellation_token().is_cancelled());

        let worker = parked.lock().take().unwrap();
        assert!(worker.try_succeed(1).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_mapped_task_stops_spawned_work() {
        let finished = Arc::new(AtomicUsize::new(0));
        let done = Arc::clone(&finished);
        let source: T = Task::spawn(move |_| async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            done.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        });
        let mapped = source.map(|v| v + 1);
        mapped.start();
        tokio::task::yield_now().await;

        mapped.cancel();
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;

        assert_eq!(finished.load(Ordering::SeqCst), 0);
        assert_eq!(source.status(), Status::Canceled);
        assert_eq!(mapped.wait().await, Err(TaskFailure::Canceled));
    }

    #[test]
    fn source_cancel_leaves_no_hook_behind() {
        let source: T = Task::new(|_| {});
        let mapped = source.map(|v| v);
        mapped.start();
        source.cancel();
        assert_eq!(mapped.status(), Status::Canceled);
        assert!(mapped.try_cancel().is_err());
    }

    #[tokio::test]
    async fn map_of_finished_task_replays_result() {
        let source: T = Task::succeeded(5);
        source.start();
        let mapped = source.map(|v| v + 1);
        assert_eq!(mapped.wait().await, Ok(6));

        let failed: T = Task::failed("x".into());
        failed.start();
        assert_eq!(
            failed.map(|v| v).wait().await,
            Err(TaskFailure::Error("x".to_string()))
        );
    }
}
