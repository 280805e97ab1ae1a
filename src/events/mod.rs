//! Pipeline events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the task pipeline.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the pipeline observer of every tracked task,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the pipeline's subscriber listener (fans out to
//!   `SubscriberSet`) and any receiver from [`TaskPipeline::events`](crate::TaskPipeline::events).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
