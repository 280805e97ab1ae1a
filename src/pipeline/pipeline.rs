//! # Task pipeline: registry of in-flight tasks keyed by identity.
//!
//! The pipeline keeps every tracked task alive until it reaches a terminal
//! status, then forgets it. It observes each tracked task and republishes its
//! status changes as [`Event`]s on the pipeline [`Bus`].
//!
//! ## Architecture
//! ```text
//! track(task)
//!   ├─► entries[identity].push(task)            (map lock, released)
//!   ├─► publish TaskTracked
//!   ├─► CollisionPolicy::Replace → cancel older live tasks, publish TaskReplaced
//!   └─► observe(task, replay)
//!          │  (runs under the task's lock)
//!          ├─► publish TaskStarted / TaskProgress / TaskSucceeded / TaskFailed / TaskCanceled
//!          └─► terminal → entries[identity].remove(instance) → history → TaskRemoved
//! ```
//!
//! ## Rules
//! - Lock order is task → pipeline map; the pipeline never touches a task
//!   while holding its map lock.
//! - Queries never lock a tracked task: statuses are answered from the copy
//!   kept by the observer, so they are safe to call from status callbacks.
//! - Entries are keyed by identity and told apart by instance number: two live
//!   tasks of the same action coexist, lookups answer with the newest one.
//! - Growth is bounded by the number of live tasks plus
//!   [`Config::history_capacity`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::builder::PipelineBuilder;
use super::history::History;
use crate::config::{CollisionPolicy, Config};
use crate::events::{Bus, Event, EventKind};
use crate::status::{Status, StatusDescription};
use crate::task::{OpaqueTask, Subscription, Task, TaskIdentity};

/// Live task, its last reported status and the pipeline's observer on it.
struct Entry {
    task: Arc<dyn OpaqueTask>,
    latest: StatusDescription,
    observer: Option<Subscription>,
}

pub(super) struct Inner {
    cfg: Config,
    bus: Bus,
    entries: Mutex<HashMap<TaskIdentity, Vec<Entry>>>,
    history: Mutex<History>,
    listener: Mutex<Option<JoinHandle<()>>>,
    token: CancellationToken,
}

impl Inner {
    /// Handles one status change of a tracked task.
    fn on_status(&self, identity: &TaskIdentity, instance: u64, description: StatusDescription) {
        let label = identity.label_arc();
        if let Some(ev) = Event::for_status(&description) {
            self.bus
                .publish(ev.with_task(Arc::clone(&label)).with_instance(instance));
        }
        if !description.is_terminal() {
            let mut entries = self.entries.lock();
            if let Some(entry) = entries
                .get_mut(identity)
                .and_then(|slot| slot.iter_mut().find(|e| e.task.instance_id() == instance))
            {
                entry.latest = description;
            }
            return;
        }

        let removed = {
            let mut entries = self.entries.lock();
            let mut removed = Vec::new();
            if let Some(slot) = entries.get_mut(identity) {
                let (gone, kept): (Vec<_>, Vec<_>) = slot
                    .drain(..)
                    .partition(|e| e.task.instance_id() == instance);
                *slot = kept;
                removed = gone;
                if slot.is_empty() {
                    entries.remove(identity);
                }
            }
            removed
        };
        self.history
            .lock()
            .record(identity.clone(), instance, description);
        self.bus.publish(
            Event::now(EventKind::TaskRemoved)
                .with_task(label)
                .with_instance(instance),
        );
        drop(removed);
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// # Registry of in-flight tasks keyed by [`TaskIdentity`].
///
/// Cheap to clone; clones share the registry.
///
/// # Example
/// ```
/// use taskreactor::{Config, Status, Task, TaskIdentity, TaskPipeline};
///
/// let pipeline = TaskPipeline::new(Config::default());
/// let task: Task<u32, String> = Task::new(|_| {});
/// task.identify(TaskIdentity::of(&"load"));
///
/// pipeline.track(&task);
/// task.start();
/// assert_eq!(pipeline.len(), 1);
///
/// task.succeed(1);
/// assert!(pipeline.is_empty());
/// assert!(pipeline.status_description(&TaskIdentity::of(&"load")).is_some());
/// ```
#[derive(Clone)]
pub struct TaskPipeline {
    inner: Arc<Inner>,
}

impl fmt::Debug for TaskPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskPipeline")
            .field("live", &self.len())
            .field("collision", &self.inner.cfg.collision)
            .finish_non_exhaustive()
    }
}

impl Default for TaskPipeline {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl TaskPipeline {
    /// Creates a pipeline without subscribers. Does not need a runtime.
    pub fn new(cfg: Config) -> Self {
        PipelineBuilder::new(cfg).build()
    }

    /// Returns a builder, to attach [`Subscribe`](crate::Subscribe)rs.
    pub fn builder(cfg: Config) -> PipelineBuilder {
        PipelineBuilder::new(cfg)
    }

    pub(super) fn from_parts(cfg: Config, bus: Bus, token: CancellationToken) -> Self {
        let history = History::new(cfg.history_limit());
        Self {
            inner: Arc::new(Inner {
                cfg,
                bus,
                entries: Mutex::new(HashMap::new()),
                history: Mutex::new(history),
                listener: Mutex::new(None),
                token,
            }),
        }
    }

    pub(super) fn set_listener(&self, handle: JoinHandle<()>) {
        *self.inner.listener.lock() = Some(handle);
    }

    /// Configuration the pipeline was built with.
    pub fn config(&self) -> &Config {
        &self.inner.cfg
    }

    /// The pipeline event bus.
    pub fn bus(&self) -> &Bus {
        &self.inner.bus
    }

    /// New receiver of pipeline events.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    // ---------------------------
    // Tracking
    // ---------------------------

    /// Tracks `task` until it reaches a terminal status.
    ///
    /// The task is keyed by its identity; an unidentified task gets an
    /// anonymous one. Tracking the same task twice is a no-op. A task that
    /// already finished is recorded in the history and not kept.
    pub fn track<S, E>(&self, task: &Task<S, E>)
    where
        S: Clone + Send + 'static,
        E: Clone + Send + fmt::Display + 'static,
    {
        let identity = match task.identity() {
            Some(identity) => identity,
            None => {
                let identity = TaskIdentity::anonymous();
                task.identify(identity.clone());
                identity
            }
        };
        let instance = task.instance_id();
        let initial = task.status().describe();

        let displaced = {
            let mut entries = self.inner.entries.lock();
            let slot = entries.entry(identity.clone()).or_default();
            if slot.iter().any(|e| e.task.instance_id() == instance) {
                return;
            }
            let displaced: Vec<Entry> = match self.inner.cfg.collision {
                CollisionPolicy::Parallel => Vec::new(),
                CollisionPolicy::Replace => slot.drain(..).collect(),
            };
            slot.push(Entry {
                task: Arc::new(task.clone()),
                latest: initial,
                observer: None,
            });
            displaced
        };

        self.inner.bus.publish(
            Event::now(EventKind::TaskTracked)
                .with_task(identity.label_arc())
                .with_instance(instance),
        );
        tracing::debug!(task = %identity, instance, "task tracked");

        for old in displaced {
            if old.task.cancel_if_active() {
                self.inner.bus.publish(
                    Event::now(EventKind::TaskReplaced)
                        .with_task(identity.label_arc())
                        .with_instance(old.task.instance_id()),
                );
            }
        }

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let key = identity.clone();
        let observer = task.observe(
            Arc::new(move |status: &Status<S, E>| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_status(&key, instance, status.describe());
                }
            }),
            true,
        );

        let mut entries = self.inner.entries.lock();
        if let Some(entry) = entries
            .get_mut(&identity)
            .and_then(|slot| slot.iter_mut().find(|e| e.task.instance_id() == instance))
        {
            entry.observer = Some(observer);
        }
    }

    // ---------------------------
    // Lookup
    // ---------------------------

    /// Newest live task tracked under `identity`.
    pub fn lookup(&self, identity: &TaskIdentity) -> Option<Arc<dyn OpaqueTask>> {
        let entries = self.inner.entries.lock();
        entries
            .get(identity)
            .and_then(|slot| slot.last())
            .map(|e| Arc::clone(&e.task))
    }

    /// Every live task tracked under `identity`, oldest first.
    pub fn lookup_all(&self, identity: &TaskIdentity) -> Vec<Arc<dyn OpaqueTask>> {
        let entries = self.inner.entries.lock();
        entries
            .get(identity)
            .map(|slot| slot.iter().map(|e| Arc::clone(&e.task)).collect())
            .unwrap_or_default()
    }

    /// Typed handle of the newest live task under `identity`.
    ///
    /// `None` if there is none or it is not a `Task<S, E>`.
    pub fn lookup_as<S, E>(&self, identity: &TaskIdentity) -> Option<Task<S, E>>
    where
        S: 'static,
        E: 'static,
    {
        self.lookup(identity).and_then(|task| task.downcast::<S, E>())
    }

    /// Status of the newest task under `identity`: the live one if any, else
    /// the latest remembered completion.
    ///
    /// Does not lock the task, so it may be called while the task notifies.
    pub fn status_description(&self, identity: &TaskIdentity) -> Option<StatusDescription> {
        let live = {
            let entries = self.inner.entries.lock();
            entries
                .get(identity)
                .and_then(|slot| slot.last())
                .map(|e| e.latest.clone())
        };
        if live.is_some() {
            return live;
        }
        self.inner
            .history
            .lock()
            .latest(identity)
            .map(|(_, description)| description)
    }

    /// All live tasks, in instance order.
    pub fn live(&self) -> Vec<Arc<dyn OpaqueTask>> {
        let mut live: Vec<_> = {
            let entries = self.inner.entries.lock();
            entries
                .values()
                .flat_map(|slot| slot.iter().map(|e| Arc::clone(&e.task)))
                .collect()
        };
        live.sort_unstable_by_key(|task| task.instance_id());
        live
    }

    /// Number of live tasks.
    pub fn len(&self) -> usize {
        self.inner.entries.lock().values().map(Vec::len).sum()
    }

    /// True if no task is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ---------------------------
    // Teardown
    // ---------------------------

    /// Cancels every live task. Returns how many were cancelled by this call.
    pub fn cancel_all(&self) -> usize {
        self.live()
            .into_iter()
            .filter(|task| task.cancel_if_active())
            .count()
    }

    /// Cancels every live task, then stops the subscriber listener after it
    /// delivered the resulting events.
    pub async fn shutdown(&self) {
        let cancelled = self.cancel_all();
        tracing::debug!(cancelled, "pipeline shutting down");
        self.inner.token.cancel();
        let handle = self.inner.listener.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActionError;

    type T = Task<u32, String>;

    fn identified(label: &'static str) -> T {
        let task: T = Task::new(|_| {});
        task.identify(TaskIdentity::of(&label));
        task
    }

    #[test]
    fn terminal_task_leaves_the_pipeline() {
        let pipeline = TaskPipeline::default();
        let task = identified("a");
        pipeline.track(&task);
        task.start();
        assert!(pipeline.lookup(&TaskIdentity::of(&"a")).is_some());

        task.progress(0.5);
        assert_eq!(
            pipeline.status_description(&TaskIdentity::of(&"a")),
            Some(StatusDescription::Progress(Some(crate::Progress::new(0.5))))
        );

        task.fail("offline".into());
        assert!(pipeline.lookup(&TaskIdentity::of(&"a")).is_none());
        assert!(pipeline.is_empty());
        assert_eq!(
            pipeline.status_description(&TaskIdentity::of(&"a")),
            Some(StatusDescription::Error("offline".into()))
        );
    }

    #[test]
    fn same_identity_tasks_coexist() {
        let pipeline = TaskPipeline::default();
        let first = identified("dup");
        let second = identified("dup");
        pipeline.track(&first);
        pipeline.track(&second);
        pipeline.track(&second);

        let id = TaskIdentity::of(&"dup");
        assert_eq!(pipeline.lookup_all(&id).len(), 2);
        assert_eq!(
            pipeline.lookup(&id).map(|t| t.instance_id()),
            Some(second.instance_id())
        );

        second.cancel();
        assert_eq!(
            pipeline.lookup(&id).map(|t| t.instance_id()),
            Some(first.instance_id())
        );
        first.cancel();
        assert!(pipeline.is_empty());
    }

    #[test]
    fn replace_policy_cancels_older_task() {
        let cfg = Config {
            collision: CollisionPolicy::Replace,
            ..Config::default()
        };
        let pipeline = TaskPipeline::new(cfg);
        let mut events = pipeline.events();

        let old = identified("search");
        let new = identified("search");
        pipeline.track(&old);
        old.start();
        pipeline.track(&new);

        assert_eq!(old.status(), Status::Canceled);
        assert!(new.status().is_idle());
        assert_eq!(pipeline.len(), 1);

        let kinds: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|ev| (ev.kind, ev.instance))
            .collect();
        assert!(kinds.contains(&(EventKind::TaskReplaced, Some(old.instance_id()))));
        assert!(kinds.contains(&(EventKind::TaskCanceled, Some(old.instance_id()))));
        assert!(kinds.contains(&(EventKind::TaskRemoved, Some(old.instance_id()))));
    }

    #[test]
    fn finished_task_is_not_kept() {
        let pipeline = TaskPipeline::default();
        let task: T = Task::succeeded(3);
        task.start();
        pipeline.track(&task);

        assert!(pipeline.is_empty());
        let id = task.identity().unwrap();
        assert!(id.is_anonymous());
        assert_eq!(pipeline.status_description(&id), Some(StatusDescription::Success));
    }

    #[test]
    fn history_can_be_disabled() {
        let cfg = Config {
            history_capacity: 0,
            ..Config::default()
        };
        let pipeline = TaskPipeline::new(cfg);
        let task = identified("x");
        pipeline.track(&task);
        task.cancel();
        assert_eq!(pipeline.status_description(&TaskIdentity::of(&"x")), None);
    }

    #[test]
    fn lookup_as_recovers_typed_task() {
        let pipeline = TaskPipeline::default();
        let task: Task<u32, ActionError> = Task::new(|_| {});
        task.identify(TaskIdentity::of(&7u8));
        pipeline.track(&task);

        let id = TaskIdentity::of(&7u8);
        let typed = pipeline.lookup_as::<u32, ActionError>(&id).unwrap();
        assert!(typed.ptr_eq(&task));
        assert!(pipeline.lookup_as::<u32, String>(&id).is_none());
    }

    #[test]
    fn cancel_all_empties_pipeline() {
        let pipeline = TaskPipeline::default();
        let a = identified("a");
        let b = identified("b");
        pipeline.track(&a);
        pipeline.track(&b);
        b.start();

        assert_eq!(pipeline.live().len(), 2);
        assert_eq!(pipeline.cancel_all(), 2);
        assert!(pipeline.is_empty());
        assert_eq!(a.status(), Status::Canceled);
        assert_eq!(b.status(), Status::Canceled);
    }

    #[test]
    fn events_follow_status_order() {
        let pipeline = TaskPipeline::default();
        let mut events = pipeline.events();
        let task = identified("e");
        pipeline.track(&task);
        task.start();
        task.progress(0.5);
        task.succeed(1);

        let kinds: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|ev| ev.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::TaskTracked,
                EventKind::TaskStarted,
                EventKind::TaskProgress,
                EventKind::TaskSucceeded,
                EventKind::TaskRemoved,
            ]
        );
    }
}
