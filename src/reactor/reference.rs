//! Weak back-reference from a dispatched task to its reactor.

use std::any::Any;
use std::sync::{Arc, Weak};

use crate::error::ActionError;
use crate::reactor::Reactor;
use crate::status::Status;
use crate::task::{Binding, Task, TaskIdentity};

/// Non-owning reference to a reactor, bound into the tasks it dispatches.
///
/// Delivers status changes to [`Reactor::handle_status`] while the reactor is
/// alive. A task outliving its reactor simply stops reporting.
pub struct ReactorReference<R: Reactor> {
    reactor: Weak<R>,
}

impl<R: Reactor> ReactorReference<R> {
    /// References `reactor` without keeping it alive.
    pub fn new(reactor: &Arc<R>) -> Self {
        Self {
            reactor: Arc::downgrade(reactor),
        }
    }

    /// The reactor, if still alive.
    pub fn upgrade(&self) -> Option<Arc<R>> {
        self.reactor.upgrade()
    }
}

impl<R: Reactor> Clone for ReactorReference<R> {
    fn clone(&self) -> Self {
        Self {
            reactor: Weak::clone(&self.reactor),
        }
    }
}

impl<R: Reactor> Binding<R::Output, ActionError> for ReactorReference<R> {
    fn receive(&self, identity: &TaskIdentity, status: &Status<R::Output, ActionError>) {
        let Some(reactor) = self.reactor.upgrade() else {
            return;
        };
        // Fails closed: an identity of another action type is not reported.
        if let Some(action) = identity.cast::<R::Action>() {
            reactor.handle_status(status, action);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<S, E> Task<S, E>
where
    S: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Runs `f` against the reactor that dispatched this task.
    ///
    /// `None` if the task was not dispatched by an `R`, or that reactor is gone.
    pub fn with_reactor<R, T>(&self, f: impl FnOnce(&R) -> T) -> Option<T>
    where
        R: Reactor,
    {
        let binding = self.binding()?;
        let reference = binding.as_any().downcast_ref::<ReactorReference<R>>()?;
        let reactor = reference.upgrade()?;
        Some(f(&reactor))
    }
}
