//! # Reactor environment.
//!
//! [`ReactorEnvironment`] is the explicit context a reactor dispatches in:
//! the task pipeline its tasks are tracked in, and the intercepts applied to
//! its actions.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::intercepts::Intercept;
use crate::pipeline::TaskPipeline;
use crate::reactor::Reactor;

/// Dispatch context of a reactor `R`.
///
/// # Example
/// ```
/// use taskreactor::{ReactorEnvironment, TaskPipeline};
/// # use taskreactor::{ActionTask, Reactor, Task};
/// # struct Counter { env: ReactorEnvironment<Counter> }
/// # impl Reactor for Counter {
/// #     type Action = u8;
/// #     type Output = u8;
/// #     fn environment(&self) -> &ReactorEnvironment<Self> { &self.env }
/// #     fn task(&self, action: u8) -> ActionTask<Self> { Task::succeeded(action) }
/// # }
///
/// let env: ReactorEnvironment<Counter> =
///     ReactorEnvironment::new().with_pipeline(TaskPipeline::default());
/// assert!(env.pipeline().is_some());
/// assert!(env.intercepts().is_empty());
/// ```
pub struct ReactorEnvironment<R: Reactor> {
    pipeline: Option<TaskPipeline>,
    intercepts: RwLock<Vec<Arc<dyn Intercept<R>>>>,
}

impl<R: Reactor> ReactorEnvironment<R> {
    /// Environment without a pipeline; dispatching in it is a contract
    /// violation until one is set.
    pub fn new() -> Self {
        Self {
            pipeline: None,
            intercepts: RwLock::new(Vec::new()),
        }
    }

    /// Sets the pipeline dispatched tasks are tracked in.
    pub fn with_pipeline(mut self, pipeline: TaskPipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Adds an intercept, builder style.
    pub fn with_intercept(self, intercept: impl Intercept<R>) -> Self {
        self.add_intercept(intercept);
        self
    }

    /// The pipeline, if one is bound.
    pub fn pipeline(&self) -> Option<&TaskPipeline> {
        self.pipeline.as_ref()
    }

    /// Appends an intercept. Intercepts apply in registration order.
    pub fn add_intercept(&self, intercept: impl Intercept<R>) {
        self.intercepts.write().push(Arc::new(intercept));
    }

    /// Removes every intercept.
    pub fn clear_intercepts(&self) {
        self.intercepts.write().clear();
    }

    /// Snapshot of the intercepts, in registration order.
    pub fn intercepts(&self) -> Vec<Arc<dyn Intercept<R>>> {
        self.intercepts.read().clone()
    }
}

impl<R: Reactor> Default for ReactorEnvironment<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Reactor> fmt::Debug for ReactorEnvironment<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactorEnvironment")
            .field("pipeline", &self.pipeline)
            .field("intercepts", &self.intercepts.read().len())
            .finish()
    }
}
