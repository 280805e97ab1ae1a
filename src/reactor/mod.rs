//! # Reactors: owners of actions and the tasks that perform them.
//!
//! A [`Reactor`] turns its actions into tasks ([`Reactor::task`]) and is told
//! about every status change of the tasks dispatched on its behalf
//! ([`Reactor::handle_status`]).
//!
//! ## Architecture
//! ```text
//!   Arc<R: Reactor> ── dispatch(action) ──► ActionDispatcher
//!        ▲                                       │ task(action), intercepts,
//!        │                                       │ identify, track, start
//!        │ handle_status(status, action)         ▼
//!   ReactorReference<R> (weak) ◄──── bound into ActionTask<R>
//! ```
//!
//! - [`ReactorEnvironment`] — pipeline + intercepts (`environment.rs`)
//! - [`ReactorReference`] — weak back-reference (`reference.rs`)
//! - [`ReactorExt`] — dispatch helpers on `Arc<R>`

mod environment;
mod reference;

use std::sync::Arc;

pub use environment::ReactorEnvironment;
pub use reference::ReactorReference;

use crate::dispatch::ActionDispatcher;
use crate::error::ActionError;
use crate::status::{Status, StatusDescription};
use crate::task::{Action, Task, TaskIdentity};

/// Task type produced for a reactor's actions.
pub type ActionTask<R> = Task<<R as Reactor>::Output, ActionError>;

/// Owner object that maps actions to tasks.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use taskreactor::{
///     ActionError, ActionTask, Reactor, ReactorEnvironment, ReactorExt, Status, Task,
///     TaskPipeline,
/// };
///
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// enum Counter {
///     Add(u32),
/// }
///
/// struct Adder {
///     env: ReactorEnvironment<Adder>,
/// }
///
/// impl Reactor for Adder {
///     type Action = Counter;
///     type Output = u32;
///
///     fn environment(&self) -> &ReactorEnvironment<Self> {
///         &self.env
///     }
///
///     fn task(&self, action: Counter) -> ActionTask<Self> {
///         match action {
///             Counter::Add(n) => Task::action(move |_| Ok(n + 1)),
///         }
///     }
/// }
///
/// let adder = Arc::new(Adder {
///     env: ReactorEnvironment::new().with_pipeline(TaskPipeline::default()),
/// });
/// let task = adder.dispatch(Counter::Add(1));
/// assert_eq!(task.status(), Status::Success(2));
/// ```
pub trait Reactor: Send + Sync + Sized + 'static {
    /// Actions this reactor performs.
    type Action: Action;
    /// Success value of its tasks.
    type Output: Clone + Send + Sync + 'static;

    /// Dispatch context: pipeline and intercepts.
    fn environment(&self) -> &ReactorEnvironment<Self>;

    /// Builds the (idle) task performing `action`.
    fn task(&self, action: Self::Action) -> ActionTask<Self>;

    /// Called for every status change of a task dispatched for `action`,
    /// inside that task's critical section, after the pipeline has seen it.
    ///
    /// No method of the reported task may be called from here: its lock is
    /// held. Pipeline queries such as [`ReactorExt::status_of`] do not touch
    /// the task and are fine.
    fn handle_status(&self, status: &Status<Self::Output, ActionError>, action: &Self::Action) {
        let _ = (status, action);
    }
}

/// Dispatch helpers for shared reactors.
pub trait ReactorExt {
    /// The reactor type.
    type Reactor: Reactor;

    /// Binds `action` to this reactor without dispatching it yet.
    fn dispatcher(&self, action: <Self::Reactor as Reactor>::Action) -> ActionDispatcher<Self::Reactor>;

    /// Dispatches `action`: the returned task is tracked and started.
    ///
    /// ### Panics
    /// Panics if the reactor environment has no pipeline.
    fn dispatch(&self, action: <Self::Reactor as Reactor>::Action) -> ActionTask<Self::Reactor>;

    /// Status of the newest task dispatched for `action`, live or recently
    /// finished.
    fn status_of(&self, action: &<Self::Reactor as Reactor>::Action) -> Option<StatusDescription>;

    /// Newest live task dispatched for `action`.
    fn task_for(&self, action: &<Self::Reactor as Reactor>::Action) -> Option<ActionTask<Self::Reactor>>;
}

impl<R: Reactor> ReactorExt for Arc<R> {
    type Reactor = R;

    fn dispatcher(&self, action: R::Action) -> ActionDispatcher<R> {
        ActionDispatcher::new(Arc::clone(self), action)
    }

    fn dispatch(&self, action: R::Action) -> ActionTask<R> {
        self.dispatcher(action).dispatch()
    }

    fn status_of(&self, action: &R::Action) -> Option<StatusDescription> {
        let pipeline = self.environment().pipeline()?;
        pipeline.status_description(&TaskIdentity::of(action))
    }

    fn task_for(&self, action: &R::Action) -> Option<ActionTask<R>> {
        let pipeline = self.environment().pipeline()?;
        pipeline.lookup_as::<R::Output, ActionError>(&TaskIdentity::of(action))
    }
}
