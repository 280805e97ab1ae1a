//! # Closure-backed intercept.
//!
//! [`InterceptFn`] builds an [`Intercept`] from a predicate and a provider.
//!
//! ## Example
//! ```rust
//! use taskreactor::{ActionTask, InterceptFn, Reactor, ReactorEnvironment, Task};
//! # struct Auth { env: ReactorEnvironment<Auth> }
//! # impl Reactor for Auth {
//! #     type Action = &'static str;
//! #     type Output = ();
//! #     fn environment(&self) -> &ReactorEnvironment<Self> { &self.env }
//! #     fn task(&self, _: &'static str) -> ActionTask<Self> { Task::succeeded(()) }
//! # }
//!
//! let env: ReactorEnvironment<Auth> = ReactorEnvironment::new();
//! env.add_intercept(InterceptFn::new(
//!     |action: &&'static str| *action == "delete",
//!     |_: &&'static str, _: ActionTask<Auth>| Task::custom_error("read-only session"),
//! ));
//! assert_eq!(env.intercepts().len(), 1);
//! ```

use std::fmt;

use crate::intercepts::Intercept;
use crate::reactor::{ActionTask, Reactor};

/// Intercept from a predicate `P` and a provider `F`.
pub struct InterceptFn<P, F> {
    applies: P,
    provide: F,
}

impl<P, F> InterceptFn<P, F> {
    /// Creates the intercept.
    pub fn new(applies: P, provide: F) -> Self {
        Self { applies, provide }
    }
}

impl<P, F> fmt::Debug for InterceptFn<P, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptFn").finish_non_exhaustive()
    }
}

impl<R, P, F> Intercept<R> for InterceptFn<P, F>
where
    R: Reactor,
    P: Fn(&R::Action) -> bool + Send + Sync + 'static,
    F: Fn(&R::Action, ActionTask<R>) -> ActionTask<R> + Send + Sync + 'static,
{
    fn applies_to(&self, action: &R::Action) -> bool {
        (self.applies)(action)
    }

    fn provide(&self, action: &R::Action, task: ActionTask<R>) -> ActionTask<R> {
        (self.provide)(action, task)
    }
}
