use super::{Router, RouterError, TransitionContext};
use crate::task::Task;

/// Route type with no values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmptyRoute {}

/// Router for screens that navigate nowhere. It can never be triggered.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyRouter;

impl Router for EmptyRouter {
    type Route = EmptyRoute;

    fn trigger(&self, route: EmptyRoute) -> Task<TransitionContext, RouterError> {
        match route {}
    }
}
