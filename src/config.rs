//! # Pipeline configuration.
//!
//! Provides [`Config`], the settings of a [`TaskPipeline`](crate::TaskPipeline),
//! and [`CollisionPolicy`], which decides what happens when a task is tracked
//! under an identity that already has a live task.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1
//! - `history_capacity = 0` → no completion history is kept
//!
//! # Example
//! ```
//! use taskreactor::{CollisionPolicy, Config};
//!
//! let mut cfg = Config::default();
//! cfg.collision = CollisionPolicy::Replace;
//! cfg.history_capacity = 0;
//!
//! assert_eq!(cfg.history_limit(), None);
//! ```

/// Policy applied when a task is tracked under an identity that already has
/// live tasks.
///
/// ## Invariants
/// - Every tracked task is always registered; the policy only decides the fate
///   of the older ones.
/// - Lookup by identity always answers with the newest live task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Keep every live task.
    ///
    /// Use when:
    /// - Dispatching the same action twice means two independent requests
    /// - Example: "send message" tapped twice
    #[default]
    Parallel,

    /// Cancel older live tasks with the same identity.
    ///
    /// Use when:
    /// - A new request invalidates the previous one
    /// - Example: "search(query)" or "reload"
    Replace,
}

/// Configuration of a [`TaskPipeline`](crate::TaskPipeline).
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped)
/// - `history_capacity`: Number of finished tasks remembered for
///   `status_description` (`0` = none)
/// - `collision`: Identity collision policy
///
/// ## Notes
/// All fields are public. Prefer the helper accessors over sentinel checks.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events skip
    /// the older ones.
    pub bus_capacity: usize,

    /// How many finished tasks are remembered.
    ///
    /// - `0` = none; `status_description` only answers for live tasks
    /// - `n > 0` = the last `n` completions, oldest evicted first
    pub history_capacity: usize,

    /// What to do with live tasks when another task with the same identity is
    /// tracked.
    pub collision: CollisionPolicy,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the completion history size as an `Option`.
    ///
    /// - `None` → history disabled
    /// - `Some(n)` → at most `n` entries
    #[inline]
    pub fn history_limit(&self) -> Option<usize> {
        if self.history_capacity == 0 {
            None
        } else {
            Some(self.history_capacity)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `history_capacity = 64`
    /// - `collision = CollisionPolicy::Parallel`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            history_capacity: 64,
            collision: CollisionPolicy::default(),
        }
    }
}
