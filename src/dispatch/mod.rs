//! # Action dispatcher.
//!
//! [`ActionDispatcher`] binds one reactor to one action and turns them into a
//! tracked, started task.
//!
//! ## Flow
//! ```text
//! dispatch()
//!   ├─► pipeline = reactor.environment().pipeline()   (missing → ContractViolation)
//!   ├─► task = reactor.task(action)
//!   ├─► task.bind(ReactorReference(reactor))
//!   ├─► for intercept in environment.intercepts() where applies_to(action):
//!   │       task = intercept.provide(action, task); task.bind(reference)
//!   ├─► task.identify(TaskIdentity::of(action))
//!   ├─► pipeline.track(task)
//!   └─► task.request(Demand::Unlimited)
//! ```
//!
//! Every call produces an independent task instance; dispatching the same
//! action twice tracks two tasks.

use std::fmt;
use std::sync::Arc;

use crate::error::{ActionError, ContractViolation};
use crate::reactor::{ActionTask, Reactor, ReactorReference};
use crate::status::Demand;
use crate::task::{StatusStream, TaskIdentity};

/// One reactor bound to one action, ready to dispatch.
///
/// Besides [`dispatch`](Self::dispatch) it acts as a lazy publisher:
/// [`subscribe`](Self::subscribe) performs the dispatch on call and returns the
/// status stream, attached before the task starts.
pub struct ActionDispatcher<R: Reactor> {
    reactor: Arc<R>,
    action: R::Action,
}

impl<R: Reactor> ActionDispatcher<R> {
    /// Binds `action` to `reactor`.
    pub fn new(reactor: Arc<R>, action: R::Action) -> Self {
        Self { reactor, action }
    }

    /// The bound action.
    pub fn action(&self) -> &R::Action {
        &self.action
    }

    /// Builds, binds, intercepts, identifies and tracks the task, without
    /// starting it.
    pub fn prepare(&self) -> Result<ActionTask<R>, ContractViolation> {
        let env = self.reactor.environment();
        let pipeline = env.pipeline().ok_or(ContractViolation::MissingPipeline {
            reactor: std::any::type_name::<R>(),
        })?;

        let reference = Arc::new(ReactorReference::new(&self.reactor));
        let mut task = self.reactor.task(self.action.clone());
        task.bind(reference.clone());

        for intercept in env.intercepts() {
            if intercept.applies_to(&self.action) {
                task = intercept.provide(&self.action, task);
                task.bind(reference.clone());
            }
        }

        let identity = TaskIdentity::of(&self.action);
        tracing::debug!(task = %identity, instance = task.instance_id(), "dispatching action");
        task.identify(identity);
        pipeline.track(&task);
        Ok(task)
    }

    /// Dispatches the action; returns the started task, or the contract
    /// violation if the reactor has no pipeline.
    pub fn try_dispatch(self) -> Result<ActionTask<R>, ContractViolation> {
        let task = self.prepare()?;
        task.request(Demand::Unlimited);
        Ok(task)
    }

    /// Dispatches the action and returns the started task.
    ///
    /// ### Panics
    /// Panics if the reactor environment has no pipeline.
    pub fn dispatch(self) -> ActionTask<R> {
        match self.try_dispatch() {
            Ok(task) => task,
            Err(violation) => panic!("dispatch failed: {violation}"),
        }
    }

    /// Dispatches the action and returns its status stream, starting from
    /// `Started`.
    ///
    /// ### Panics
    /// Panics if the reactor environment has no pipeline.
    pub fn subscribe(self) -> StatusStream<R::Output, ActionError> {
        let task = match self.prepare() {
            Ok(task) => task,
            Err(violation) => panic!("dispatch failed: {violation}"),
        };
        let stream = task.subscribe();
        task.request(Demand::Unlimited);
        stream
    }
}

impl<R: Reactor> fmt::Debug for ActionDispatcher<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("reactor", &std::any::type_name::<R>())
            .field("action", &self.action)
            .finish()
    }
}
