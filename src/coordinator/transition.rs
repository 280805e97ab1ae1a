//! Transitions and their outcome.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Navigation step a coordinator asks its presenter to perform.
///
/// Destinations are opaque names; how they are rendered belongs to the
/// presenter.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to do.
    None,
    /// Present `destination` modally.
    Present(Arc<str>),
    /// Push `destination` onto the current stack.
    Push(Arc<str>),
    /// Pop the top of the current stack.
    Pop,
    /// Dismiss the current modal presentation.
    Dismiss,
    /// Replace the root with `destination`.
    SetRoot(Arc<str>),
}

impl Transition {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Transition::None => "none",
            Transition::Present(_) => "present",
            Transition::Push(_) => "push",
            Transition::Pop => "pop",
            Transition::Dismiss => "dismiss",
            Transition::SetRoot(_) => "set_root",
        }
    }

    /// Destination name, for transitions that have one.
    pub fn destination(&self) -> Option<&str> {
        match self {
            Transition::Present(d) | Transition::Push(d) | Transition::SetRoot(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.destination() {
            Some(destination) => write!(f, "{}({destination})", self.as_label()),
            None => f.write_str(self.as_label()),
        }
    }
}

/// Result of a performed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionContext {
    /// Debug rendering of the triggering route.
    pub route: Arc<str>,
    /// The transition that was performed.
    pub transition: Transition,
}

/// # Errors produced while triggering a route.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// The coordinator has no presenter (never attached, or it was dropped).
    #[error("coordinator `{coordinator}` has no presenter")]
    PresenterUnavailable {
        /// Name of the coordinator missing its presenter.
        coordinator: Arc<str>,
    },

    /// The presenter refused or failed the transition.
    #[error("transition `{transition}` failed: {reason}")]
    TransitionFailed {
        /// The transition that failed.
        transition: Transition,
        /// Presenter-provided reason.
        reason: String,
    },
}

impl RouterError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RouterError::PresenterUnavailable { .. } => "router_presenter_unavailable",
            RouterError::TransitionFailed { .. } => "router_transition_failed",
        }
    }
}
