//! # Action intercepts.
//!
//! An [`Intercept`] sees every action dispatched by a reactor and may replace
//! the task performing it. Intercepts registered in a
//! [`ReactorEnvironment`](crate::ReactorEnvironment) apply in registration
//! order; each receives the task produced by the previous one.
//!
//! ```text
//! reactor.task(action) ──► intercept 1 ──► intercept 2 ──► ... ──► final task
//!                          (applies_to?)   (applies_to?)            (identified, tracked)
//! ```
//!
//! Only the final task carries the action identity, so only it reports to the
//! reactor's `handle_status`. A replaced task is never started unless the
//! intercept starts it.
//!
//! ## Built-in intercepts
//! - [`InterceptFn`] — closure-backed intercept
//! - [`TimeoutIntercept`] — fails tasks that run longer than a deadline

mod intercept_fn;
mod timeout;

pub use intercept_fn::InterceptFn;
pub use timeout::TimeoutIntercept;

use crate::reactor::{ActionTask, Reactor};

/// Cross-cutting hook over the tasks a reactor dispatches.
pub trait Intercept<R: Reactor>: Send + Sync + 'static {
    /// Whether this intercept handles `action`. Defaults to every action.
    fn applies_to(&self, action: &R::Action) -> bool {
        let _ = action;
        true
    }

    /// Returns the task to use for `action` in place of `task`.
    ///
    /// Returning `task` unchanged is a valid no-op.
    fn provide(&self, action: &R::Action, task: ActionTask<R>) -> ActionTask<R>;
}
