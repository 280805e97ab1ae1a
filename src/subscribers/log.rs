//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] renders pipeline events through `tracing`, one line per
//! event. Install any `tracing` subscriber (e.g. `tracing-subscriber`'s `fmt`)
//! to see them.
//!
//! ## Output format
//! ```text
//! [tracked] task=Load(7) instance=3
//! [started] task=Load(7) instance=3
//! [progress] task=Load(7) instance=3 progress=0.5
//! [failed] task=Load(7) instance=3 err="offline"
//! [removed] task=Load(7) instance=3
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Logging subscriber.
///
/// Enabled via the `logging` feature. Not intended for production use;
/// implement a custom [`Subscribe`] for structured logging or metrics.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("unknown");
        let instance = e.instance.unwrap_or_default();
        match e.kind {
            EventKind::TaskTracked => {
                tracing::info!("[tracked] task={task} instance={instance}");
            }
            EventKind::TaskStarted => {
                tracing::info!("[started] task={task} instance={instance}");
            }
            EventKind::TaskProgress => {
                tracing::debug!(
                    "[progress] task={task} instance={instance} progress={:?} msg={:?}",
                    e.progress,
                    e.reason
                );
            }
            EventKind::TaskSucceeded => {
                tracing::info!("[succeeded] task={task} instance={instance}");
            }
            EventKind::TaskFailed => {
                tracing::warn!(
                    "[failed] task={task} instance={instance} err={:?}",
                    e.reason.as_deref().unwrap_or("unknown")
                );
            }
            EventKind::TaskCanceled => {
                tracing::info!("[canceled] task={task} instance={instance}");
            }
            EventKind::TaskReplaced => {
                tracing::info!("[replaced] task={task} instance={instance}");
            }
            EventKind::TaskRemoved => {
                tracing::debug!("[removed] task={task} instance={instance}");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(
                    "[subscriber-overflow] subscriber={task} reason={:?}",
                    e.reason
                );
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(
                    "[subscriber-panicked] subscriber={task} info={}",
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
