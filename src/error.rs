//! Error types used by tasks, the dispatcher and the pipeline.
//!
//! This module defines the error taxonomy of the crate:
//!
//! - [`ContractViolation`] — misuse of the task state machine or of required
//!   infrastructure (programming errors, fatal in debug builds).
//! - [`TaskFailure`] — how a task that did not succeed ended: with an error
//!   value or by cancellation.
//! - [`ActionError`] — the erased error type carried by reactor action tasks.
//!
//! Every type provides `as_label` (stable snake_case label for logs/metrics) and
//! `as_message` helpers.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// # Misuse of the task state machine.
///
/// These are never runtime failures of the work itself. Public transition
/// methods such as [`Task::succeed`](crate::Task::succeed) treat them as fatal
/// in debug builds; the `try_*` variants hand them back to the caller.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    /// A transition was attempted after the task already reached a terminal status.
    #[error("cannot move to `{attempted}`: task already finished with `{current}`")]
    AlreadyTerminal {
        /// Label of the status that was attempted.
        attempted: &'static str,
        /// Label of the terminal status the task holds.
        current: &'static str,
    },

    /// Progress or a result was reported before the task was started.
    #[error("cannot move to `{attempted}`: task was never started")]
    NotStarted {
        /// Label of the status that was attempted.
        attempted: &'static str,
    },

    /// The transition is not an edge of the state machine (e.g. a second start).
    #[error("cannot move from `{from}` to `{to}`")]
    InvalidTransition {
        /// Label of the current status.
        from: &'static str,
        /// Label of the attempted status.
        to: &'static str,
    },

    /// The reactor environment has no task pipeline bound.
    #[error("reactor `{reactor}` has no task pipeline bound")]
    MissingPipeline {
        /// Type name of the reactor.
        reactor: &'static str,
    },
}

impl ContractViolation {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskreactor::ContractViolation;
    ///
    /// let err = ContractViolation::NotStarted { attempted: "progress" };
    /// assert_eq!(err.as_label(), "contract_not_started");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ContractViolation::AlreadyTerminal { .. } => "contract_already_terminal",
            ContractViolation::NotStarted { .. } => "contract_not_started",
            ContractViolation::InvalidTransition { .. } => "contract_invalid_transition",
            ContractViolation::MissingPipeline { .. } => "contract_missing_pipeline",
        }
    }

    /// Returns a human-readable message with details about the violation.
    pub fn as_message(&self) -> String {
        match self {
            ContractViolation::AlreadyTerminal { attempted, current } => {
                format!("{attempted} after {current}")
            }
            ContractViolation::NotStarted { attempted } => format!("{attempted} before start"),
            ContractViolation::InvalidTransition { from, to } => format!("{from} -> {to}"),
            ContractViolation::MissingPipeline { reactor } => {
                format!("missing pipeline: reactor={reactor}")
            }
        }
    }
}

/// # Failure side of a finished task.
///
/// Cancellation is a distinguished outcome, not an error value, so callers can
/// tell "failed" from "cancelled" without inspecting payloads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskFailure<E> {
    /// The task failed with an error value.
    #[error("task failed: {0}")]
    Error(E),

    /// The task was cancelled.
    #[error("task canceled")]
    Canceled,
}

impl<E> TaskFailure<E> {
    /// Returns `true` for [`TaskFailure::Canceled`].
    pub fn is_canceled(&self) -> bool {
        matches!(self, TaskFailure::Canceled)
    }

    /// Returns the error value, if any.
    pub fn into_error(self) -> Option<E> {
        match self {
            TaskFailure::Error(e) => Some(e),
            TaskFailure::Canceled => None,
        }
    }

    /// Maps the error value, keeping cancellation untouched.
    pub fn map_err<F, T>(self, f: F) -> TaskFailure<T>
    where
        F: FnOnce(E) -> T,
    {
        match self {
            TaskFailure::Error(e) => TaskFailure::Error(f(e)),
            TaskFailure::Canceled => TaskFailure::Canceled,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskFailure::Error(_) => "task_error",
            TaskFailure::Canceled => "task_canceled",
        }
    }
}

/// # Error carried by reactor action tasks.
///
/// Cheap to clone: statuses are broadcast to every subscriber.
#[non_exhaustive]
#[derive(Error, Clone)]
pub enum ActionError {
    /// A custom failure built by a reactor or an intercept
    /// (see [`Task::custom_error`](crate::Task::custom_error)).
    #[error("{0}")]
    Custom(String),

    /// The action did not finish within the allotted time.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// Any other error raised by the action body.
    #[error(transparent)]
    Source(Arc<dyn StdError + Send + Sync>),
}

impl ActionError {
    /// Wraps an arbitrary error.
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        ActionError::Source(Arc::new(err))
    }

    /// Builds a [`ActionError::Custom`] from a description.
    pub fn custom(description: impl Into<String>) -> Self {
        ActionError::Custom(description.into())
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskreactor::ActionError;
    ///
    /// assert_eq!(ActionError::custom("nope").as_label(), "action_custom");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ActionError::Custom(_) => "action_custom",
            ActionError::Timeout { .. } => "action_timeout",
            ActionError::Source(_) => "action_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ActionError::Custom(description) => format!("custom: {description}"),
            ActionError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            ActionError::Source(err) => format!("error: {err}"),
        }
    }
}

impl fmt::Debug for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::Custom(d) => f.debug_tuple("Custom").field(d).finish(),
            ActionError::Timeout { timeout } => {
                f.debug_struct("Timeout").field("timeout", timeout).finish()
            }
            ActionError::Source(err) => f.debug_tuple("Source").field(&err.to_string()).finish(),
        }
    }
}

impl PartialEq for ActionError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ActionError::Custom(a), ActionError::Custom(b)) => a == b,
            (ActionError::Timeout { timeout: a }, ActionError::Timeout { timeout: b }) => a == b,
            (ActionError::Source(a), ActionError::Source(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("disk full")]
    struct DiskFull;

    #[test]
    fn action_error_wraps_sources_transparently() {
        let err = ActionError::new(DiskFull);
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(err.as_label(), "action_failed");
        assert_eq!(err.clone(), err);
    }

    #[test]
    fn failure_distinguishes_cancellation() {
        let failed: TaskFailure<ActionError> = TaskFailure::Error(ActionError::custom("boom"));
        assert!(!failed.is_canceled());
        assert_eq!(failed.clone().into_error(), Some(ActionError::custom("boom")));

        let canceled: TaskFailure<ActionError> = TaskFailure::Canceled;
        assert!(canceled.is_canceled());
        assert_eq!(canceled.as_label(), "task_canceled");
        assert_eq!(canceled.into_error(), None);
    }

    #[test]
    fn violation_messages_name_both_states() {
        let err = ContractViolation::AlreadyTerminal {
            attempted: "success",
            current: "canceled",
        };
        assert_eq!(err.as_message(), "success after canceled");
        assert!(err.to_string().contains("canceled"));
    }
}
