//! # Tasks: the status state machine and its observers.
//!
//! - [`Task`] — cancellable, observable unit of work (`task.rs`)
//! - [`TaskIdentity`] / [`Action`] — type-erased identity of the action a task
//!   was dispatched for (`identity.rs`)
//! - [`StatusStream`] / [`Subscription`] — observation handles (`stream.rs`)
//! - [`OpaqueTask`] — erased view used by the pipeline (`opaque.rs`)
//! - [`Task::map`] — derived tasks (`map.rs`)
//! - [`Task::spawn`], [`Task::action`] and friends — constructors (`task_fn.rs`)

mod identity;
mod map;
mod opaque;
mod stream;
#[allow(clippy::module_inception)]
mod task;
mod task_fn;

pub use identity::{Action, TaskIdentity};
pub use opaque::OpaqueTask;
pub use stream::{StatusStream, Subscription};
pub use task::{Task, WeakTask};

pub(crate) use task::Binding;
