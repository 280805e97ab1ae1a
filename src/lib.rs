//! # taskreactor
//!
//! **taskreactor** is a reactive coordination layer for UI-style applications.
//!
//! *Reactors* dispatch *actions* into cancellable, observable *tasks*; a
//! *task pipeline* tracks in-flight tasks by identity; *coordinators* turn
//! route values into transitions against a presentation target. Rendering and
//! layout are left to the host toolkit.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌────────────────┐  dispatch(action)   ┌──────────────────────────────────┐
//!   │ Arc<R: Reactor>│ ──────────────────► │ ActionDispatcher                 │
//!   │  - environment │                     │  task(action) → bind reactor     │
//!   │  - task(action)│                     │  → intercepts → identify         │
//!   │  - handle_     │                     │  → pipeline.track → request      │
//!   │    status      │                     └───────────────┬──────────────────┘
//!   └───────▲────────┘                                     ▼
//!           │ handle_status(status, action)   ┌──────────────────────────────┐
//!           └──────── ReactorReference ◄───── │ Task<Output, ActionError>    │
//!                     (weak)                  │  Idle → Started → Progress*  │
//!                                             │  → Success | Error | Canceled│
//!                                             └──────┬──────────────┬────────┘
//!                                  status streams,   │              │ observed by
//!                                  subscriptions ◄───┘              ▼
//!                                             ┌──────────────────────────────┐
//!                                             │ TaskPipeline                 │
//!                                             │  identity → live tasks       │
//!                                             │  history, CollisionPolicy    │
//!                                             └──────────────┬───────────────┘
//!                                                            ▼ Event
//!                                             Bus ──► listener ──► SubscriberSet
//!                                                                  ├─► LogWriter
//!                                                                  └─► custom
//! ```
//!
//! ### Task lifecycle
//! ```text
//! Task::new(start) ── Idle
//!   ├─► request(demand > 0) ─► Started ─► start(task)
//!   │                             ├─► progress(p)* ─► Progress
//!   │                             ├─► succeed(v)   ─► Success   (terminal)
//!   │                             └─► fail(e)      ─► Error     (terminal)
//!   └─► cancel() at any non-terminal point         ─► Canceled  (terminal)
//!
//! Any transition after a terminal status is a contract violation:
//! fatal in debug builds, logged and ignored in release builds.
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                          |
//! |-------------------|----------------------------------------------------------------|---------------------------------------------|
//! | **Tasks**         | Observable, cancellable state machine.                         | [`Task`], [`Status`], [`StatusStream`]      |
//! | **Reactors**      | Map actions to tasks, receive their statuses.                  | [`Reactor`], [`ReactorExt`]                 |
//! | **Dispatch**      | Reactor + action → tracked, started task.                      | [`ActionDispatcher`]                        |
//! | **Pipeline**      | Registry of in-flight tasks keyed by identity.                 | [`TaskPipeline`], [`TaskIdentity`]          |
//! | **Intercepts**    | Replace or wrap the task of an action.                         | [`Intercept`], [`TimeoutIntercept`]         |
//! | **Subscriber API**| Hook into pipeline events (logging, metrics).                  | [`Subscribe`], [`Event`]                    |
//! | **Coordinators**  | Routes to transitions.                                         | [`Router`], [`Coordinator`]                 |
//! | **Errors**        | Typed errors.                                                  | [`ContractViolation`], [`ActionError`]      |
//! | **Configuration** | Pipeline settings.                                             | [`Config`], [`CollisionPolicy`]             |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use taskreactor::{
//!     ActionError, ActionTask, Config, Reactor, ReactorEnvironment, ReactorExt, Status, Task,
//!     TaskPipeline,
//! };
//!
//! #[derive(Debug, Clone, PartialEq, Eq, Hash)]
//! enum Profile {
//!     Load(u32),
//! }
//!
//! struct ProfileReactor {
//!     env: ReactorEnvironment<ProfileReactor>,
//! }
//!
//! impl Reactor for ProfileReactor {
//!     type Action = Profile;
//!     type Output = String;
//!
//!     fn environment(&self) -> &ReactorEnvironment<Self> {
//!         &self.env
//!     }
//!
//!     fn task(&self, action: Profile) -> ActionTask<Self> {
//!         match action {
//!             Profile::Load(id) => Task::new(move |task| {
//!                 task.progress(0.5);
//!                 task.succeed(format!("user-{id}"));
//!             }),
//!         }
//!     }
//!
//!     fn handle_status(&self, status: &Status<String, ActionError>, action: &Profile) {
//!         println!("{action:?} -> {}", status.label());
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let reactor = Arc::new(ProfileReactor {
//!         env: ReactorEnvironment::new().with_pipeline(TaskPipeline::new(Config::default())),
//!     });
//!
//!     let task = reactor.dispatch(Profile::Load(7));
//!     assert_eq!(task.wait().await, Ok("user-7".to_string()));
//! }
//! ```
mod config;
mod coordinator;
mod dispatch;
mod error;
mod events;
mod intercepts;
mod pipeline;
mod reactor;
mod status;
mod subscribers;
mod task;

// ---- Public re-exports ----

pub use config::{CollisionPolicy, Config};
pub use coordinator::{
    BaseCoordinator, Coordinator, EmptyRoute, EmptyRouter, Presentable, Presenter, Router,
    RouterError, Transition, TransitionContext,
};
pub use dispatch::ActionDispatcher;
pub use error::{ActionError, ContractViolation, TaskFailure};
pub use events::{Bus, Event, EventKind};
pub use intercepts::{Intercept, InterceptFn, TimeoutIntercept};
pub use pipeline::{PipelineBuilder, TaskPipeline};
pub use reactor::{ActionTask, Reactor, ReactorEnvironment, ReactorExt, ReactorReference};
pub use status::{Demand, Progress, Status, StatusDescription};
pub use subscribers::{Subscribe, SubscriberSet};
pub use task::{Action, OpaqueTask, StatusStream, Subscription, Task, TaskIdentity, WeakTask};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
