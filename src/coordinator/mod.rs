//! # Coordinators: routes to transitions.
//!
//! Only the trigger contract is modelled here. A [`Router`] turns a route value
//! into a started task that resolves to the performed [`TransitionContext`]; a
//! [`Coordinator`] is a router that decides the [`Transition`] for each route
//! and hands it to its [`Presenter`].
//!
//! ```text
//! trigger(route)
//!   ├─► transition = transition_for(&route)
//!   ├─► presenter.present(&transition)      (weak; gone → PresenterUnavailable)
//!   └─► Task<TransitionContext, RouterError> ── Success(context) | Error(err)
//! ```
//!
//! Coordinators form a tree: a child attached with
//! [`BaseCoordinator::add_child`] presents through its parent.

mod base;
mod empty;
mod transition;

use std::fmt;
use std::sync::{Arc, Weak};

pub use base::BaseCoordinator;
pub use empty::{EmptyRoute, EmptyRouter};
pub use transition::{RouterError, Transition, TransitionContext};

use crate::task::Task;

/// Maps route values to transitions.
pub trait Router: Send + Sync + 'static {
    /// Route values this router understands.
    type Route: fmt::Debug + Send + Sync + 'static;

    /// Performs the transition for `route`. The returned task is already
    /// started.
    fn trigger(&self, route: Self::Route) -> Task<TransitionContext, RouterError>;
}

/// Router that decides the transition itself.
pub trait Coordinator: Router {
    /// Transition to perform for `route`.
    fn transition_for(&self, route: &Self::Route) -> Transition;
}

/// Target that performs transitions.
pub trait Presenter: Send + Sync + 'static {
    /// Performs `transition`.
    fn present(&self, transition: &Transition) -> Result<(), RouterError>;
}

/// Node of the coordinator tree.
pub trait Presentable: Send + Sync + 'static {
    /// Name of the node, if any.
    fn name(&self) -> Option<Arc<str>> {
        None
    }

    /// Attaches this node under `parent`, which becomes its presenter.
    fn become_child_of(&self, parent: Weak<dyn Presenter>);
}
