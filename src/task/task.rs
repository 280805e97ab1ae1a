//! # Observable, cancellable unit of asynchronous work.
//!
//! A [`Task`] owns one [`Status`] cell, a deferred start closure and the list of
//! observers of its status changes. It coordinates state and notification only:
//! the work itself runs wherever the start closure puts it.
//!
//! ## Rules
//! - Every read and write of the status goes through one task-scoped lock.
//! - Observers are notified **inside** that critical section, so every observer
//!   sees the same total order of statuses, and nothing after the terminal one.
//! - [`Task::request`] is the only way out of `Idle` into `Started`; the start
//!   closure is taken out under the lock and runs at most once.
//! - Terminal statuses are single-write. A second `succeed`/`fail`/`cancel`, or
//!   `progress` after the end, is a [`ContractViolation`]: fatal in debug builds,
//!   logged and ignored in release builds. The `try_*` variants return it instead.
//! - Observers must not call transition methods on the task notifying them.
//!
//! ## Flow
//! ```text
//! Task::new(start) ── Idle
//!       │
//!       ├─► request(demand > 0) ── Started ──► start(task) runs (outside the lock)
//!       │                                        ├─► progress(p)  ── Progress
//!       │                                        ├─► succeed(v)   ── Success
//!       │                                        └─► fail(e)      ── Error
//!       └─► cancel() (any non-terminal state) ── Canceled, token cancelled
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::{ContractViolation, TaskFailure};
use crate::status::{Demand, Progress, Status};
use crate::task::identity::TaskIdentity;
use crate::task::stream::{StatusStream, Subscription};

/// Global instance counter; every task gets a unique number.
static TASK_SEQ: AtomicU64 = AtomicU64::new(1);

pub(crate) type StartFn<S, E> = Box<dyn FnOnce(Task<S, E>) + Send>;
pub(crate) type Callback<S, E> = Arc<dyn Fn(&Status<S, E>) + Send + Sync>;
pub(crate) type CancelHook = Box<dyn FnOnce() + Send>;

/// Receiver bound into a task that gets every status change together with
/// the task's identity. Implemented by [`ReactorReference`](crate::ReactorReference).
pub(crate) trait Binding<S, E>: Send + Sync {
    fn receive(&self, identity: &TaskIdentity, status: &Status<S, E>);
    fn as_any(&self) -> &dyn std::any::Any;
}

enum Sink<S, E> {
    Channel(mpsc::UnboundedSender<Status<S, E>>),
    Callback {
        active: Arc<AtomicBool>,
        callback: Callback<S, E>,
    },
}

struct State<S, E> {
    status: Status<S, E>,
    start: Option<StartFn<S, E>>,
    identity: Option<TaskIdentity>,
    binding: Option<Arc<dyn Binding<S, E>>>,
    sinks: Vec<Sink<S, E>>,
    /// Subscriptions whose lifetime is tied to this task.
    retained: Vec<Subscription>,
    /// Run after the lock is released when the task itself is cancelled.
    cancel_hooks: Vec<CancelHook>,
}

impl<S: Clone, E: Clone> State<S, E> {
    /// Stores `status` and notifies every observer in registration order,
    /// then the bound reactor.
    fn publish(&mut self, status: Status<S, E>) {
        self.status = status.clone();

        self.sinks.retain(|sink| match sink {
            Sink::Channel(tx) => tx.send(status.clone()).is_ok(),
            Sink::Callback { active, callback } => {
                if !active.load(AtomicOrdering::Acquire) {
                    return false;
                }
                callback(&status);
                true
            }
        });

        if let (Some(identity), Some(binding)) = (&self.identity, &self.binding) {
            binding.receive(identity, &status);
        }

        if status.is_terminal() {
            self.sinks.clear();
            self.start = None;
            self.cancel_hooks.clear();
        }
    }
}

struct Inner<S, E> {
    instance: u64,
    token: CancellationToken,
    state: Mutex<State<S, E>>,
}

/// # Cancellable, observable unit of work producing `S` or failing with `E`.
///
/// `Task` is a cheap handle (`Arc` inside); clones refer to the same task.
///
/// # Example
/// ```
/// use taskreactor::{Status, Task};
///
/// let task: Task<u32, String> = Task::new(|task| {
///     task.progress(0.5);
///     task.succeed(42);
/// });
/// assert!(task.status().is_idle());
///
/// task.start();
/// assert_eq!(task.status(), Status::Success(42));
/// ```
pub struct Task<S, E> {
    inner: Arc<Inner<S, E>>,
}

impl<S, E> Clone for Task<S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, E> fmt::Debug for Task<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("instance", &self.inner.instance)
            .finish_non_exhaustive()
    }
}

/// Non-owning handle to a [`Task`].
pub struct WeakTask<S, E> {
    inner: Weak<Inner<S, E>>,
}

impl<S, E> Clone for WeakTask<S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<S, E> WeakTask<S, E> {
    /// Returns the task if it is still alive.
    pub fn upgrade(&self) -> Option<Task<S, E>> {
        self.inner.upgrade().map(|inner| Task { inner })
    }
}

impl<S, E> Task<S, E>
where
    S: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Creates an idle task that runs `start` when first requested.
    ///
    /// `start` receives a handle to the task and reports through
    /// [`progress`](Self::progress), [`succeed`](Self::succeed) and
    /// [`fail`](Self::fail). It may finish synchronously or hand the handle to
    /// some other execution context.
    pub fn new<F>(start: F) -> Self
    where
        F: FnOnce(Task<S, E>) + Send + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                instance: TASK_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
                token: CancellationToken::new(),
                state: Mutex::new(State {
                    status: Status::Idle,
                    start: Some(Box::new(start)),
                    identity: None,
                    binding: None,
                    sinks: Vec::new(),
                    retained: Vec::new(),
                    cancel_hooks: Vec::new(),
                }),
            }),
        }
    }

    /// Process-unique instance number.
    pub fn instance_id(&self) -> u64 {
        self.inner.instance
    }

    /// Current status (snapshot).
    pub fn status(&self) -> Status<S, E> {
        self.inner.state.lock().status.clone()
    }

    /// True once the task reached `Success`, `Error` or `Canceled`.
    pub fn is_terminal(&self) -> bool {
        self.inner.state.lock().status.is_terminal()
    }

    /// Identity assigned by the dispatcher, if any.
    pub fn identity(&self) -> Option<TaskIdentity> {
        self.inner.state.lock().identity.clone()
    }

    /// Assigns the identity used as pipeline key and for reactor callbacks.
    pub fn identify(&self, identity: TaskIdentity) {
        self.inner.state.lock().identity = Some(identity);
    }

    /// Identity label, or `task-<instance>` for unidentified tasks.
    pub fn name(&self) -> String {
        match &self.inner.state.lock().identity {
            Some(identity) => identity.label().to_string(),
            None => format!("task-{}", self.inner.instance),
        }
    }

    /// Token cancelled when the task is cancelled.
    ///
    /// Start closures that hand work to another context should watch it:
    /// cancellation marks the task finished but does not abort that work.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.inner.token.clone()
    }

    /// Non-owning handle.
    pub fn downgrade(&self) -> WeakTask<S, E> {
        WeakTask {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// True if both handles refer to the same task.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ---------------------------
    // Start
    // ---------------------------

    /// Issues demand. The first non-zero demand on an idle task moves it to
    /// `Started` and runs the start closure; every other call is a no-op.
    pub fn request(&self, demand: Demand) {
        if demand.is_none() {
            return;
        }

        let start = {
            let mut state = self.inner.state.lock();
            if !state.status.is_idle() {
                return;
            }
            let Some(start) = state.start.take() else {
                return;
            };
            state.publish(Status::Started);
            start
        };

        start(self.clone());
    }

    /// Shorthand for `request(Demand::Unlimited)`.
    pub fn start(&self) {
        self.request(Demand::Unlimited);
    }

    // ---------------------------
    // Transitions
    // ---------------------------

    /// Reports progress. Precondition: started and not finished.
    pub fn progress(&self, progress: impl Into<Progress>) {
        let result = self.try_progress(Some(progress.into()));
        self.enforce(result);
    }

    /// Reports progress without a measurable fraction.
    pub fn progress_indeterminate(&self) {
        let result = self.try_progress(None);
        self.enforce(result);
    }

    /// Finishes with `value`.
    pub fn succeed(&self, value: S) {
        let result = self.try_succeed(value);
        self.enforce(result);
    }

    /// Finishes with `error`.
    pub fn fail(&self, error: E) {
        let result = self.try_fail(error);
        self.enforce(result);
    }

    /// Finishes as cancelled and cancels the task's token.
    ///
    /// An idle task is cancelled without ever running its start closure.
    pub fn cancel(&self) {
        let result = self.try_cancel();
        self.enforce(result);
    }

    /// Non-enforcing form of [`progress`](Self::progress).
    pub fn try_progress(&self, progress: Option<Progress>) -> Result<(), ContractViolation> {
        self.transition(Status::Progress(progress))
    }

    /// Non-enforcing form of [`succeed`](Self::succeed).
    pub fn try_succeed(&self, value: S) -> Result<(), ContractViolation> {
        self.transition(Status::Success(value))
    }

    /// Non-enforcing form of [`fail`](Self::fail).
    pub fn try_fail(&self, error: E) -> Result<(), ContractViolation> {
        self.transition(Status::Error(error))
    }

    /// Non-enforcing form of [`cancel`](Self::cancel).
    pub fn try_cancel(&self) -> Result<(), ContractViolation> {
        self.transition(Status::Canceled)
    }

    /// Reports a terminal `Result`.
    pub fn finish(&self, result: Result<S, E>) -> Result<(), ContractViolation> {
        match result {
            Ok(value) => self.try_succeed(value),
            Err(error) => self.try_fail(error),
        }
    }

    fn transition(&self, next: Status<S, E>) -> Result<(), ContractViolation> {
        let canceled = matches!(next, Status::Canceled);
        let hooks = {
            let mut state = self.inner.state.lock();
            check_transition(&state.status, &next)?;
            let hooks = if canceled {
                std::mem::take(&mut state.cancel_hooks)
            } else {
                Vec::new()
            };
            state.publish(next);
            hooks
        };
        if canceled {
            self.inner.token.cancel();
            for hook in hooks {
                hook();
            }
        }
        Ok(())
    }

    /// Registers `hook` to run when this task is cancelled through
    /// [`cancel`](Self::cancel). It runs outside the task's lock. Hooks are
    /// dropped unrun when the task finishes any other way, or when it mirrors
    /// a cancellation through [`adopt`](Self::adopt).
    pub(crate) fn on_cancel(&self, hook: CancelHook) {
        let mut state = self.inner.state.lock();
        if !state.status.is_terminal() {
            state.cancel_hooks.push(hook);
        }
    }

    /// Mirrors `status` from another task, as a derived task does.
    ///
    /// An idle mirror jumps to `Started` first (its source is already running,
    /// so its own start closure is dropped). Statuses after the mirror finished
    /// are ignored.
    pub(crate) fn adopt(&self, status: Status<S, E>) {
        let canceled = matches!(status, Status::Canceled);
        {
            let mut state = self.inner.state.lock();
            if state.status.is_terminal() || status.is_idle() {
                return;
            }
            if state.status.is_idle() && !canceled {
                state.start = None;
                state.publish(Status::Started);
            }
            if matches!(status, Status::Started) {
                return;
            }
            state.publish(status);
        }
        if canceled {
            self.inner.token.cancel();
        }
    }

    fn enforce(&self, result: Result<(), ContractViolation>) {
        if let Err(violation) = result {
            if cfg!(debug_assertions) {
                panic!("task `{}` contract violated: {violation}", self.name());
            }
            tracing::error!(
                task = %self.name(),
                violation = violation.as_label(),
                "ignoring invalid task transition: {violation}"
            );
        }
    }

    // ---------------------------
    // Observation
    // ---------------------------

    /// Attaches a status stream.
    ///
    /// The stream yields every status sent after this call and ends after the
    /// terminal one. On an already finished task it yields the terminal status
    /// once and ends.
    pub fn subscribe(&self) -> StatusStream<S, E> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.inner.state.lock();
        if state.status.is_terminal() {
            let _ = tx.send(state.status.clone());
        } else {
            state.sinks.push(Sink::Channel(tx));
        }
        StatusStream::new(rx)
    }

    /// Registers `callback` for every status sent after this call.
    ///
    /// The callback runs inside the task's critical section. Dropping the
    /// returned [`Subscription`] detaches it.
    pub fn on_status<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Status<S, E>) + Send + Sync + 'static,
    {
        self.observe(Arc::new(callback), false)
    }

    /// Registers `callback`, first replaying the current status to it unless
    /// the task is idle. Replay and registration happen atomically, so no
    /// status is missed or seen twice.
    pub(crate) fn observe(&self, callback: Callback<S, E>, replay: bool) -> Subscription {
        let mut state = self.inner.state.lock();
        if replay && !state.status.is_idle() {
            callback(&state.status);
        }
        if state.status.is_terminal() {
            return Subscription::inert();
        }
        let subscription = Subscription::new();
        state.sinks.push(Sink::Callback {
            active: subscription.flag(),
            callback,
        });
        subscription
    }

    /// Keeps `subscription` alive as long as this task.
    pub(crate) fn retain(&self, subscription: Subscription) {
        self.inner.state.lock().retained.push(subscription);
    }

    /// Waits for the terminal status.
    ///
    /// Resolves to `Err(TaskFailure::Canceled)` as well if every other handle
    /// to an unfinished task is dropped.
    pub async fn wait(&self) -> Result<S, TaskFailure<E>> {
        let mut stream = self.subscribe();
        while let Some(status) = stream.next_status().await {
            if let Some(result) = status.into_result() {
                return result;
            }
        }
        Err(TaskFailure::Canceled)
    }

    // ---------------------------
    // Reactor binding
    // ---------------------------

    pub(crate) fn bind(&self, binding: Arc<dyn Binding<S, E>>) {
        self.inner.state.lock().binding = Some(binding);
    }

    pub(crate) fn binding(&self) -> Option<Arc<dyn Binding<S, E>>> {
        self.inner.state.lock().binding.clone()
    }
}

/// Validates one edge of the state machine.
fn check_transition<S, E>(current: &Status<S, E>, next: &Status<S, E>) -> Result<(), ContractViolation> {
    if current.is_terminal() {
        return Err(ContractViolation::AlreadyTerminal {
            attempted: next.label(),
            current: current.label(),
        });
    }
    match (current, next) {
        (Status::Idle, Status::Canceled) => Ok(()),
        (_, Status::Idle | Status::Started) => {
            Err(ContractViolation::InvalidTransition {
                from: current.label(),
                to: next.label(),
            })
        }
        (Status::Idle, _) => Err(ContractViolation::NotStarted {
            attempted: next.label(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    type T = Task<u32, String>;

    fn recorder(task: &T) -> (Arc<Mutex<Vec<Status<u32, String>>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = task.on_status(move |s| sink.lock().push(s.clone()));
        (seen, sub)
    }

    #[test]
    fn created_idle_and_start_is_deferred() {
        let ran = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&ran);
        let task: T = Task::new(move |_| {
            r.fetch_add(1, AtomicOrdering::SeqCst);
        });
        assert!(task.status().is_idle());
        assert_eq!(ran.load(AtomicOrdering::SeqCst), 0);

        task.request(Demand::None);
        task.request(Demand::Max(0));
        assert!(task.status().is_idle());

        task.request(Demand::Max(1));
        assert_eq!(ran.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(task.status(), Status::Started);
    }

    #[test]
    fn observed_path_is_valid() {
        let task: T = Task::new(|t| {
            t.progress(0.25);
            t.progress(0.75);
            t.succeed(9);
        });
        let (seen, _sub) = recorder(&task);
        task.start();

        assert_eq!(
            *seen.lock(),
            vec![
                Status::Started,
                Status::Progress(Some(Progress::new(0.25))),
                Status::Progress(Some(Progress::new(0.75))),
                Status::Success(9),
            ]
        );
    }

    #[test]
    fn request_twice_runs_start_once() {
        let ran = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&ran);
        let task: T = Task::new(move |_| {
            r.fetch_add(1, AtomicOrdering::SeqCst);
        });
        task.start();
        task.start();
        task.request(Demand::Max(3));
        assert_eq!(ran.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn concurrent_requests_run_start_once() {
        let ran = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&ran);
        let task: T = Task::new(move |_| {
            r.fetch_add(1, AtomicOrdering::SeqCst);
        });

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let t = task.clone();
                std::thread::spawn(move || t.start())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(ran.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(task.status(), Status::Started);
    }

    #[test]
    fn second_terminal_is_rejected() {
        let task: T = Task::new(|_| {});
        task.start();
        task.succeed(1);
        assert_eq!(
            task.try_fail("late".into()),
            Err(ContractViolation::AlreadyTerminal {
                attempted: "error",
                current: "success",
            })
        );
        assert!(task.try_cancel().is_err());
        assert!(task.try_succeed(2).is_err());
        assert!(task.try_progress(None).is_err());
        assert_eq!(task.status(), Status::Success(1));
    }

    #[test]
    #[should_panic(expected = "contract violated")]
    fn second_succeed_is_fatal() {
        let task: T = Task::new(|_| {});
        task.start();
        task.succeed(1);
        task.succeed(2);
    }

    #[test]
    #[should_panic(expected = "contract violated")]
    fn progress_after_cancel_is_fatal() {
        let task: T = Task::new(|_| {});
        task.start();
        task.cancel();
        task.progress(0.1);
    }

    #[test]
    fn results_before_start_are_rejected() {
        let task: T = Task::new(|_| {});
        assert_eq!(
            task.try_succeed(1),
            Err(ContractViolation::NotStarted { attempted: "success" })
        );
        assert!(task.try_progress(None).is_err());
        assert!(task.status().is_idle());
    }

    #[test]
    fn cancel_idle_never_runs_start() {
        let ran = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&ran);
        let task: T = Task::new(move |_| {
            r.fetch_add(1, AtomicOrdering::SeqCst);
        });
        let token = task.cancellation_token();
        task.cancel();
        task.start();
        assert_eq!(ran.load(AtomicOrdering::SeqCst), 0);
        assert_eq!(task.status(), Status::Canceled);
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancel_wins_over_pending_work() {
        let parked: Arc<Mutex<Option<T>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&parked);
        let task: T = Task::new(move |t| {
            *slot.lock() = Some(t);
        });
        let (seen, _sub) = recorder(&task);
        task.start();
        task.cancel();

        let worker = parked.lock().take().unwrap();
        assert!(worker.cancellation_token().is_cancelled());
        assert!(matches!(
            worker.try_succeed(5),
            Err(ContractViolation::AlreadyTerminal { current: "canceled", .. })
        ));
        assert_eq!(*seen.lock(), vec![Status::Started, Status::Canceled]);
    }

    #[test]
    fn nothing_is_delivered_after_terminal() {
        let task: T = Task::new(|_| {});
        let (seen, _sub) = recorder(&task);
        task.start();
        task.fail("boom".into());
        let _ = task.try_succeed(1);
        let _ = task.try_cancel();
        assert_eq!(*seen.lock(), vec![Status::Started, Status::Error("boom".into())]);
    }

    #[test]
    fn dropped_subscription_detaches() {
        let task: T = Task::new(|_| {});
        let (seen, sub) = recorder(&task);
        task.start();
        sub.unsubscribe();
        task.succeed(3);
        assert_eq!(*seen.lock(), vec![Status::Started]);
    }

    #[test]
    fn identity_names_the_task() {
        let task: T = Task::new(|_| {});
        assert!(task.name().starts_with("task-"));
        task.identify(TaskIdentity::of(&"load"));
        assert_eq!(task.name(), "\"load\"");
    }

    #[tokio::test]
    async fn stream_ends_after_terminal() {
        use futures::StreamExt;

        let task: T = Task::new(|t| {
            t.progress(0.5);
            t.succeed(42);
        });
        let stream = task.subscribe();
        task.start();

        let statuses: Vec<_> = stream.collect().await;
        assert_eq!(
            statuses,
            vec![
                Status::Started,
                Status::Progress(Some(Progress::new(0.5))),
                Status::Success(42),
            ]
        );
        assert_eq!(task.wait().await, Ok(42));
    }

    #[tokio::test]
    async fn wait_reports_cancellation() {
        let task: T = Task::new(|_| {});
        task.start();
        let waiter = {
            let t = task.clone();
            tokio::spawn(async move { t.wait().await })
        };
        tokio::task::yield_now().await;
        task.cancel();
        assert_eq!(waiter.await.unwrap(), Err(TaskFailure::Canceled));
    }
}
