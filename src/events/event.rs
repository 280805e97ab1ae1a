//! # Pipeline events.
//!
//! The [`EventKind`] enum classifies what happened to a tracked task:
//! - **Registry events**: tracked, replaced, removed
//! - **Lifecycle events**: started, progress, succeeded, failed, canceled
//! - **Subscriber events**: overflow, panic
//!
//! The [`Event`] struct carries the metadata: timestamp, task label, instance
//! number, reason and progress fraction.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Events of one task are published inside that task's critical
//! section, so their `seq` order is the task's status order.
//!
//! ## Example
//! ```rust
//! use taskreactor::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::TaskFailed)
//!     .with_task("LoadProfile(7)")
//!     .with_instance(12)
//!     .with_reason("offline");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("LoadProfile(7)"));
//! assert_eq!(ev.reason.as_deref(), Some("offline"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::status::StatusDescription;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of pipeline events.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: `"full"` or `"closed"`
    SubscriberOverflow,

    // === Registry events ===
    /// Task registered in the pipeline.
    ///
    /// Sets:
    /// - `task`: identity label
    /// - `instance`: task instance number
    TaskTracked,

    /// An older live task was cancelled because a new one with the same
    /// identity was tracked ([`CollisionPolicy::Replace`](crate::CollisionPolicy::Replace)).
    ///
    /// Sets:
    /// - `task`: identity label
    /// - `instance`: instance number of the **cancelled** task
    TaskReplaced,

    /// Task left the pipeline after reaching a terminal status.
    ///
    /// Sets:
    /// - `task`: identity label
    /// - `instance`: task instance number
    TaskRemoved,

    // === Lifecycle events ===
    /// Tracked task moved to `Started`.
    TaskStarted,

    /// Tracked task reported progress.
    ///
    /// Sets:
    /// - `progress`: fraction in `[0, 1]`, absent for indeterminate progress
    /// - `reason`: progress message, if any
    TaskProgress,

    /// Tracked task succeeded.
    TaskSucceeded,

    /// Tracked task failed.
    ///
    /// Sets:
    /// - `reason`: rendered error
    TaskFailed,

    /// Tracked task was cancelled.
    TaskCanceled,
}

/// Pipeline event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Identity label of the task (or subscriber name).
    pub task: Option<Arc<str>>,
    /// Instance number of the task.
    pub instance: Option<u64>,
    /// Human-readable reason (errors, overflow details, progress message).
    pub reason: Option<Arc<str>>,
    /// Progress fraction.
    pub progress: Option<f64>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            instance: None,
            reason: None,
            progress: None,
        }
    }

    /// Attaches a task label.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a task instance number.
    #[inline]
    pub fn with_instance(mut self, instance: u64) -> Self {
        self.instance = Some(instance);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a progress fraction.
    #[inline]
    pub fn with_progress(mut self, fraction: f64) -> Self {
        self.progress = Some(fraction);
        self
    }

    /// Lifecycle event for a status change, or `None` for `Idle`.
    pub(crate) fn for_status(description: &StatusDescription) -> Option<Self> {
        let ev = match description {
            StatusDescription::Idle => return None,
            StatusDescription::Started => Event::now(EventKind::TaskStarted),
            StatusDescription::Progress(None) => Event::now(EventKind::TaskProgress),
            StatusDescription::Progress(Some(p)) => {
                let ev = Event::now(EventKind::TaskProgress).with_progress(p.fraction());
                match p.message() {
                    Some(message) => ev.with_reason(message),
                    None => ev,
                }
            }
            StatusDescription::Success => Event::now(EventKind::TaskSucceeded),
            StatusDescription::Error(message) => {
                Event::now(EventKind::TaskFailed).with_reason(Arc::clone(message))
            }
            StatusDescription::Canceled => Event::now(EventKind::TaskCanceled),
        };
        Some(ev)
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::now(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::now(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}
