//! # Task lifecycle statuses.
//!
//! [`Status`] is the closed set of states one task moves through:
//!
//! ```text
//!   Idle ──request──► Started ──► Progress* ──► Success | Error | Canceled
//!     │                                               ▲
//!     └──────────────────── cancel ───────────────────┘ (Canceled only)
//! ```
//!
//! Terminal statuses are written once. [`StatusDescription`] is the erased
//! rendering used by the pipeline, which does not know a task's value types.

use std::fmt;
use std::sync::Arc;

use crate::error::TaskFailure;

/// Progress reported by a running task.
///
/// The fraction is clamped to `[0.0, 1.0]`; `NaN` becomes `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    fraction: f64,
    message: Option<Arc<str>>,
}

impl Progress {
    /// Creates progress with the given completed fraction.
    pub fn new(fraction: f64) -> Self {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        Self {
            fraction,
            message: None,
        }
    }

    /// Attaches a human-readable message.
    #[inline]
    pub fn with_message(mut self, message: impl Into<Arc<str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Completed fraction in `[0.0, 1.0]`.
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Optional message.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl From<f64> for Progress {
    fn from(fraction: f64) -> Self {
        Progress::new(fraction)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.fraction * 100.0)?;
        if let Some(message) = &self.message {
            write!(f, " ({message})")?;
        }
        Ok(())
    }
}

/// Lifecycle state of a task producing `S` on success and `E` on failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Status<S, E> {
    /// Created, not yet requested.
    Idle,
    /// Start closure invoked.
    Started,
    /// Intermediate progress update.
    Progress(Option<Progress>),
    /// Finished with a value.
    Success(S),
    /// Finished with an error.
    Error(E),
    /// Cancelled.
    Canceled,
}

impl<S, E> Status<S, E> {
    /// True for [`Status::Idle`].
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, Status::Idle)
    }

    /// True once the task was started and has not finished.
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Started | Status::Progress(_))
    }

    /// True for `Success`, `Error` and `Canceled`.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Success(_) | Status::Error(_) | Status::Canceled)
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Started => "started",
            Status::Progress(_) => "progress",
            Status::Success(_) => "success",
            Status::Error(_) => "error",
            Status::Canceled => "canceled",
        }
    }

    /// Borrows the success value; `None` for every other status.
    pub fn output(&self) -> Option<&S> {
        match self {
            Status::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Takes the success value; `None` for every other status.
    pub fn into_output(self) -> Option<S> {
        match self {
            Status::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Maps the success value, leaving every other variant (and the progress
    /// payload) untouched.
    pub fn map<T, F>(self, transform: F) -> Status<T, E>
    where
        F: FnOnce(S) -> T,
    {
        match self {
            Status::Idle => Status::Idle,
            Status::Started => Status::Started,
            Status::Progress(p) => Status::Progress(p),
            Status::Success(value) => Status::Success(transform(value)),
            Status::Error(e) => Status::Error(e),
            Status::Canceled => Status::Canceled,
        }
    }

    /// Converts a terminal status into a `Result`; `None` while unfinished.
    pub fn into_result(self) -> Option<Result<S, TaskFailure<E>>> {
        match self {
            Status::Success(value) => Some(Ok(value)),
            Status::Error(e) => Some(Err(TaskFailure::Error(e))),
            Status::Canceled => Some(Err(TaskFailure::Canceled)),
            _ => None,
        }
    }
}

impl<S, E: Clone> Status<S, E> {
    /// Failure carried by `Error`/`Canceled`; `None` for every other status.
    pub fn failure(&self) -> Option<TaskFailure<E>> {
        match self {
            Status::Error(e) => Some(TaskFailure::Error(e.clone())),
            Status::Canceled => Some(TaskFailure::Canceled),
            _ => None,
        }
    }
}

impl<S, E: fmt::Display> Status<S, E> {
    /// Erased rendering of this status.
    pub fn describe(&self) -> StatusDescription {
        match self {
            Status::Idle => StatusDescription::Idle,
            Status::Started => StatusDescription::Started,
            Status::Progress(p) => StatusDescription::Progress(p.clone()),
            Status::Success(_) => StatusDescription::Success,
            Status::Error(e) => StatusDescription::Error(e.to_string().into()),
            Status::Canceled => StatusDescription::Canceled,
        }
    }
}

/// Status with the value types erased.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusDescription {
    Idle,
    Started,
    Progress(Option<Progress>),
    Success,
    Error(Arc<str>),
    Canceled,
}

impl StatusDescription {
    /// True for `Success`, `Error` and `Canceled`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StatusDescription::Success | StatusDescription::Error(_) | StatusDescription::Canceled
        )
    }

    /// Returns a short stable label, same as [`Status::label`].
    pub fn label(&self) -> &'static str {
        match self {
            StatusDescription::Idle => "idle",
            StatusDescription::Started => "started",
            StatusDescription::Progress(_) => "progress",
            StatusDescription::Success => "success",
            StatusDescription::Error(_) => "error",
            StatusDescription::Canceled => "canceled",
        }
    }
}

impl fmt::Display for StatusDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusDescription::Progress(Some(p)) => write!(f, "progress {p}"),
            StatusDescription::Error(message) => write!(f, "error: {message}"),
            other => f.write_str(other.label()),
        }
    }
}

/// Demand issued to a task through [`Task::request`](crate::Task::request).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demand {
    /// No demand; never starts a task.
    None,
    /// Bounded demand.
    Max(usize),
    /// Unlimited demand; runs the task to completion without flow control.
    Unlimited,
}

impl Demand {
    /// True when the demand cannot start anything.
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Demand::None | Demand::Max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type S = Status<u32, String>;

    #[test]
    fn terminal_statuses() {
        assert!(!S::Idle.is_terminal());
        assert!(!S::Started.is_terminal());
        assert!(!S::Progress(None).is_terminal());
        assert!(S::Success(1).is_terminal());
        assert!(S::Error("x".into()).is_terminal());
        assert!(S::Canceled.is_terminal());
        assert!(S::Idle.is_idle());
    }

    #[test]
    fn output_and_failure_are_exclusive() {
        assert_eq!(S::Success(7).output(), Some(&7));
        assert_eq!(S::Success(7).failure(), None);
        assert_eq!(S::Error("bad".into()).failure(), Some(TaskFailure::Error("bad".into())));
        assert_eq!(S::Canceled.failure(), Some(TaskFailure::Canceled));
        assert_eq!(S::Canceled.output(), None);
        assert_eq!(S::Started.failure(), None);
    }

    #[test]
    fn map_preserves_tag_and_progress() {
        let p = Progress::new(0.25).with_message("quarter");
        let mapped: Status<String, String> = S::Progress(Some(p.clone())).map(|v| v.to_string());
        assert_eq!(mapped, Status::Progress(Some(p)));

        let mapped: Status<String, String> = S::Success(42).map(|v| format!("#{v}"));
        assert_eq!(mapped, Status::Success("#42".to_string()));

        let mapped: Status<String, String> = S::Error("e".into()).map(|v| v.to_string());
        assert_eq!(mapped, Status::Error("e".to_string()));
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(Progress::new(1.7).fraction(), 1.0);
        assert_eq!(Progress::new(-3.0).fraction(), 0.0);
        assert_eq!(Progress::new(f64::NAN).fraction(), 0.0);
        assert_eq!(Progress::from(0.5).to_string(), "50%");
    }

    #[test]
    fn description_erases_values() {
        assert_eq!(S::Success(3).describe(), StatusDescription::Success);
        let d = S::Error("boom".into()).describe();
        assert_eq!(d.to_string(), "error: boom");
        assert!(d.is_terminal());
        assert_eq!(S::Started.describe().label(), "started");
    }

    #[test]
    fn zero_demand_is_none() {
        assert!(Demand::None.is_none());
        assert!(Demand::Max(0).is_none());
        assert!(!Demand::Max(1).is_none());
        assert!(!Demand::Unlimited.is_none());
    }
}
