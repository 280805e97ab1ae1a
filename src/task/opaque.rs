//! Type-erased view of a task, used where `S`/`E` are unknown (the pipeline).

use std::any::Any;
use std::fmt;

use crate::status::StatusDescription;
use crate::task::{Task, TaskIdentity};

/// Object-safe view of a [`Task`] of any success/error type.
///
/// Recover the typed handle with [`downcast`](dyn OpaqueTask::downcast).
pub trait OpaqueTask: Send + Sync + 'static {
    /// Process-unique instance number.
    fn instance_id(&self) -> u64;

    /// Identity assigned by the dispatcher, if any.
    fn identity(&self) -> Option<TaskIdentity>;

    /// Identity label, or `task-<instance>`.
    fn name(&self) -> String;

    /// Current status, rendered without its payload types.
    fn status_description(&self) -> StatusDescription;

    /// True once the task finished.
    fn is_terminal(&self) -> bool;

    /// Cancels the task unless it already finished. Returns `true` if this call
    /// cancelled it.
    fn cancel_if_active(&self) -> bool;

    #[doc(hidden)]
    fn as_any(&self) -> &dyn Any;
}

impl dyn OpaqueTask {
    /// Typed handle, if the task is a `Task<S, E>`.
    pub fn downcast<S, E>(&self) -> Option<Task<S, E>>
    where
        S: 'static,
        E: 'static,
    {
        self.as_any().downcast_ref::<Task<S, E>>().cloned()
    }
}

impl fmt::Debug for dyn OpaqueTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueTask")
            .field("instance", &self.instance_id())
            .field("name", &self.name())
            .finish()
    }
}

impl<S, E> OpaqueTask for Task<S, E>
where
    S: Clone + Send + 'static,
    E: Clone + Send + fmt::Display + 'static,
{
    fn instance_id(&self) -> u64 {
        Task::instance_id(self)
    }

    fn identity(&self) -> Option<TaskIdentity> {
        Task::identity(self)
    }

    fn name(&self) -> String {
        Task::name(self)
    }

    fn status_description(&self) -> StatusDescription {
        self.status().describe()
    }

    fn is_terminal(&self) -> bool {
        Task::is_terminal(self)
    }

    fn cancel_if_active(&self) -> bool {
        self.try_cancel().is_ok()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn erased_task_round_trips() {
        let task: Task<u32, String> = Task::new(|_| {});
        let erased: Arc<dyn OpaqueTask> = Arc::new(task.clone());

        assert_eq!(erased.status_description(), StatusDescription::Idle);
        assert!(erased.downcast::<u32, String>().is_some_and(|t| t.ptr_eq(&task)));
        assert!(erased.downcast::<u64, String>().is_none());

        assert!(erased.cancel_if_active());
        assert!(!erased.cancel_if_active());
        assert!(erased.is_terminal());
    }

    #[test]
    fn description_renders_error() {
        let task: Task<u32, String> = Task::failed("disk full".into());
        task.start();
        let erased: &dyn OpaqueTask = &task;
        assert_eq!(
            erased.status_description(),
            StatusDescription::Error("disk full".into())
        );
    }
}
