//! # Deadline intercept.
//!
//! [`TimeoutIntercept`] wraps a task into one that mirrors it, but fails with
//! [`ActionError::Timeout`] if the wrapped task has not finished within the
//! deadline. The wrapped task is cancelled on timeout and when the wrapper is
//! cancelled.
//!
//! ```text
//! wrapper.start()
//!   ├─► mirror inner statuses into wrapper
//!   ├─► inner.start()
//!   └─► spawn: select {
//!          inner finished   → done
//!          wrapper canceled → inner.cancel()
//!          sleep(timeout)   → wrapper.fail(Timeout), inner.cancel()
//!       }
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::error::ActionError;
use crate::intercepts::Intercept;
use crate::reactor::{ActionTask, Reactor};
use crate::status::Status;
use crate::task::Task;

/// Fails tasks that run longer than `timeout`.
///
/// Tasks with this intercept must be started inside a Tokio runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeoutIntercept {
    timeout: Duration,
}

impl TimeoutIntercept {
    /// Intercept applying `timeout` to every action.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// The deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wraps `inner` into a task that fails after `timeout`.
    pub fn wrap<S>(&self, inner: Task<S, ActionError>) -> Task<S, ActionError>
    where
        S: Clone + Send + Sync + 'static,
    {
        let timeout = self.timeout;
        Task::new(move |outer: Task<S, ActionError>| {
            let target = outer.downgrade();
            let mirror = inner.observe(
                Arc::new(move |status: &Status<S, ActionError>| {
                    if let Some(outer) = target.upgrade() {
                        outer.adopt(status.clone());
                    }
                }),
                true,
            );
            outer.retain(mirror);

            let token = outer.cancellation_token();
            let watched = inner.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = watched.wait() => {}
                    _ = token.cancelled() => {
                        let _ = watched.try_cancel();
                    }
                    _ = tokio::time::sleep(timeout) => {
                        if outer.try_fail(ActionError::Timeout { timeout }).is_ok() {
                            tracing::warn!(task = %outer.name(), ?timeout, "task timed out");
                        }
                        let _ = watched.try_cancel();
                    }
                }
            });

            inner.start();
        })
    }
}

impl<R: Reactor> Intercept<R> for TimeoutIntercept {
    fn provide(&self, _action: &R::Action, task: ActionTask<R>) -> ActionTask<R> {
        self.wrap(task)
    }
}
