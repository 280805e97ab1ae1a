use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::{Coordinator, Presentable, Presenter, Router, RouterError, Transition, TransitionContext};
use crate::task::Task;

type TransitionFn<R> = Box<dyn Fn(&R) -> Transition + Send + Sync>;

/// Coordinator driven by a transition function.
///
/// Holds its presenter weakly; children attached with
/// [`add_child`](Self::add_child) present through it.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use taskreactor::{BaseCoordinator, Presenter, Router, RouterError, Status, Transition};
///
/// struct Screen;
/// impl Presenter for Screen {
///     fn present(&self, _: &Transition) -> Result<(), RouterError> {
///         Ok(())
///     }
/// }
///
/// #[derive(Debug)]
/// enum Route {
///     Settings,
/// }
///
/// let screen: Arc<dyn Presenter> = Arc::new(Screen);
/// let coordinator = BaseCoordinator::new(|route: &Route| match route {
///     Route::Settings => Transition::Push("settings".into()),
/// });
/// coordinator.attach(&screen);
///
/// let task = coordinator.trigger(Route::Settings);
/// assert!(matches!(task.status(), Status::Success(_)));
/// ```
pub struct BaseCoordinator<R> {
    name: Option<Arc<str>>,
    transitions: TransitionFn<R>,
    presenter: RwLock<Option<Weak<dyn Presenter>>>,
    children: RwLock<Vec<Arc<dyn Presentable>>>,
}

impl<R> BaseCoordinator<R>
where
    R: fmt::Debug + Send + Sync + 'static,
{
    /// Coordinator deciding transitions with `transitions`.
    pub fn new<F>(transitions: F) -> Self
    where
        F: Fn(&R) -> Transition + Send + Sync + 'static,
    {
        Self {
            name: None,
            transitions: Box::new(transitions),
            presenter: RwLock::new(None),
            children: RwLock::new(Vec::new()),
        }
    }

    /// Names the coordinator.
    pub fn named(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the presenter, held weakly.
    pub fn attach(&self, presenter: &Arc<dyn Presenter>) {
        *self.presenter.write() = Some(Arc::downgrade(presenter));
    }

    /// The presenter, if attached and alive.
    pub fn presenter(&self) -> Option<Arc<dyn Presenter>> {
        self.presenter.read().as_ref().and_then(Weak::upgrade)
    }

    /// Attaches `child` under this coordinator.
    pub fn add_child(self: &Arc<Self>, child: Arc<dyn Presentable>) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let parent: Weak<dyn Presenter> = weak;
        child.become_child_of(parent);
        self.children.write().push(child);
    }

    /// Names of the named children, in insertion order.
    pub fn child_names(&self) -> Vec<Arc<str>> {
        self.children
            .read()
            .iter()
            .filter_map(|child| child.name())
            .collect()
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        self.children.read().len()
    }

    fn unavailable(&self) -> RouterError {
        RouterError::PresenterUnavailable {
            coordinator: self.name.clone().unwrap_or_else(|| Arc::from("coordinator")),
        }
    }
}

impl<R> Router for BaseCoordinator<R>
where
    R: fmt::Debug + Send + Sync + 'static,
{
    type Route = R;

    fn trigger(&self, route: R) -> Task<TransitionContext, RouterError> {
        let transition = self.transition_for(&route);
        let presenter = self.presenter();
        let unavailable = self.unavailable();
        let route: Arc<str> = format!("{route:?}").into();
        tracing::debug!(%route, %transition, "triggering route");

        let task = Task::action(move |_| {
            if transition != Transition::None {
                let Some(presenter) = presenter else {
                    return Err(unavailable);
                };
                presenter.present(&transition)?;
            }
            Ok(TransitionContext { route, transition })
        });
        task.start();
        task
    }
}

impl<R> Coordinator for BaseCoordinator<R>
where
    R: fmt::Debug + Send + Sync + 'static,
{
    fn transition_for(&self, route: &R) -> Transition {
        (self.transitions)(route)
    }
}

impl<R> Presenter for BaseCoordinator<R>
where
    R: fmt::Debug + Send + Sync + 'static,
{
    fn present(&self, transition: &Transition) -> Result<(), RouterError> {
        match self.presenter() {
            Some(presenter) => presenter.present(transition),
            None => Err(self.unavailable()),
        }
    }
}

impl<R> Presentable for BaseCoordinator<R>
where
    R: fmt::Debug + Send + Sync + 'static,
{
    fn name(&self) -> Option<Arc<str>> {
        self.name.clone()
    }

    fn become_child_of(&self, parent: Weak<dyn Presenter>) {
        *self.presenter.write() = Some(parent);
    }
}

impl<R> fmt::Debug for BaseCoordinator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseCoordinator")
            .field("name", &self.name)
            .field("children", &self.children.read().len())
            .finish_non_exhaustive()
    }
}
