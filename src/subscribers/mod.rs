//! # Event subscribers for the task pipeline.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the optional [`LogWriter`] (feature `logging`).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   tracked task ── status ──► pipeline observer ── publish(Event) ──► Bus
//!                                                                       │
//!                                                          subscriber listener
//!                                                                       │
//!                                                           SubscriberSet::emit
//!                                                         ┌─────────┼─────────┐
//!                                                         ▼         ▼         ▼
//!                                                     LogWriter  Metrics   Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
