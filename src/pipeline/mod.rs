//! # Task pipeline.
//!
//! - [`TaskPipeline`] — registry of in-flight tasks keyed by identity
//! - [`PipelineBuilder`] — attaches subscribers and spawns their listener

mod builder;
mod history;
#[allow(clippy::module_inception)]
mod pipeline;

pub use builder::PipelineBuilder;
pub use pipeline::TaskPipeline;
