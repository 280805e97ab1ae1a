//! # Function-backed task constructors.
//!
//! Convenience builders on top of [`Task::new`]:
//!
//! - [`Task::spawn`] — async body spawned on Tokio, raced against the task's
//!   cancellation token;
//! - [`Task::action`] — synchronous body run on start;
//! - [`Task::succeeded`] / [`Task::failed`] — tasks with a fixed outcome;
//! - [`Task::custom_error`] — pre-failed reactor task with a description.
//!
//! ## Cancellation semantics
//! A spawned body is dropped as soon as the task is cancelled. A body finishing
//! after the task was already finished elsewhere is ignored (logged at `debug`).

use std::future::Future;

use crate::error::ActionError;
use crate::task::Task;

impl<S, E> Task<S, E>
where
    S: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Creates a task whose body is an async function spawned on start.
    ///
    /// The body receives the task handle (to report progress) and its result
    /// becomes the terminal status.
    ///
    /// ### Panics
    /// Starting the task outside a Tokio runtime panics.
    ///
    /// ## Example
    /// ```rust
    /// use taskreactor::Task;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let task: Task<u32, String> = Task::spawn(|task| async move {
    ///     task.progress(0.5);
    ///     Ok(7)
    /// });
    /// task.start();
    /// assert_eq!(task.wait().await, Ok(7));
    /// # }
    /// ```
    pub fn spawn<F, Fut>(body: F) -> Self
    where
        F: FnOnce(Task<S, E>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<S, E>> + Send + 'static,
    {
        Task::new(move |task: Task<S, E>| {
            let token = task.cancellation_token();
            let fut = body(task.clone());
            tokio::spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    result = fut => {
                        if let Err(violation) = task.finish(result) {
                            tracing::debug!(
                                task = %task.name(),
                                violation = violation.as_label(),
                                "discarding late task result"
                            );
                        }
                    }
                }
            });
        })
    }

    /// Creates a task whose synchronous body runs on start.
    pub fn action<F>(body: F) -> Self
    where
        F: FnOnce(&Task<S, E>) -> Result<S, E> + Send + 'static,
    {
        Task::new(move |task: Task<S, E>| {
            let result = body(&task);
            if let Err(violation) = task.finish(result) {
                tracing::debug!(
                    task = %task.name(),
                    violation = violation.as_label(),
                    "discarding late task result"
                );
            }
        })
    }

    /// Creates a task that succeeds with `value` once started.
    pub fn succeeded(value: S) -> Self {
        Task::new(move |task: Task<S, E>| task.succeed(value))
    }

    /// Creates a task that fails with `error` once started.
    pub fn failed(error: E) -> Self {
        Task::new(move |task: Task<S, E>| task.fail(error))
    }
}

impl<S> Task<S, ActionError>
where
    S: Clone + Send + 'static,
{
    /// Creates a pre-failed task carrying [`ActionError::Custom`].
    ///
    /// Used by reactors and intercepts to short-circuit an action: dispatch
    /// still returns a task, which fails as soon as it starts.
    pub fn custom_error(description: impl Into<String>) -> Self {
        Task::failed(ActionError::custom(description))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::TaskFailure;
    use crate::status::Status;

    #[tokio::test]
    async fn spawned_body_reports_result() {
        let task: Task<u32, String> = Task::spawn(|t| async move {
            t.progress(0.5);
            Ok(3)
        });
        let mut stream = task.subscribe();
        task.start();

        assert_eq!(stream.next_status().await, Some(Status::Started));
        assert!(matches!(stream.next_status().await, Some(Status::Progress(_))));
        assert_eq!(stream.next_status().await, Some(Status::Success(3)));
        assert_eq!(stream.next_status().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_spawned_body() {
        let task: Task<u32, String> = Task::spawn(|_| async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(1)
        });
        task.start();
        tokio::task::yield_now().await;
        task.cancel();

        assert_eq!(task.wait().await, Err(TaskFailure::Canceled));
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(task.status(), Status::Canceled);
    }

    #[test]
    fn action_body_maps_result() {
        let ok: Task<u32, String> = Task::action(|_| Ok(1));
        ok.start();
        assert_eq!(ok.status(), Status::Success(1));

        let err: Task<u32, String> = Task::action(|_| Err("bad".into()));
        err.start();
        assert_eq!(err.status(), Status::Error("bad".into()));
    }

    #[test]
    fn custom_error_fails_on_start() {
        let task: Task<(), ActionError> = Task::custom_error("not allowed");
        assert!(task.status().is_idle());
        task.start();
        assert_eq!(task.status(), Status::Error(ActionError::custom("not allowed")));
    }
}
