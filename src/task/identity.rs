//! # Task identity derived from an action value.
//!
//! A [`TaskIdentity`] keeps the action it was built from behind a type-erased
//! handle together with its `TypeId`. Two identities are equal when they come
//! from the same action type and equal action values, so re-dispatching an
//! action yields a comparable identity for pipeline lookups.
//!
//! [`TaskIdentity::cast`] recovers the concrete action with a checked match:
//! an identity of another type yields `None`.

use std::any::{Any, TypeId};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Values that can identify a task.
///
/// Blanket-implemented for every `Debug + Hash + Eq + Clone + Send + Sync` type.
pub trait Action: fmt::Debug + Hash + Eq + Clone + Send + Sync + 'static {}

impl<T> Action for T where T: fmt::Debug + Hash + Eq + Clone + Send + Sync + 'static {}

/// Object-safe view over an [`Action`].
trait ErasedAction: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn ErasedAction) -> bool;
}

impl<A: Action> ErasedAction for A {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn ErasedAction) -> bool {
        other.as_any().downcast_ref::<A>() == Some(self)
    }
}

/// Identity of tasks tracked without an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Anonymous(u64);

static ANONYMOUS_SEQ: AtomicU64 = AtomicU64::new(1);

/// Opaque, comparable identity of a task.
#[derive(Clone)]
pub struct TaskIdentity {
    type_id: TypeId,
    type_name: &'static str,
    hash: u64,
    label: Arc<str>,
    action: Arc<dyn ErasedAction>,
}

impl TaskIdentity {
    /// Derives the identity of `action`.
    pub fn of<A: Action>(action: &A) -> Self {
        let mut hasher = DefaultHasher::new();
        action.hash(&mut hasher);
        Self {
            type_id: TypeId::of::<A>(),
            type_name: std::any::type_name::<A>(),
            hash: hasher.finish(),
            label: format!("{action:?}").into(),
            action: Arc::new(action.clone()),
        }
    }

    /// A fresh identity equal to no other.
    pub fn anonymous() -> Self {
        Self::of(&Anonymous(ANONYMOUS_SEQ.fetch_add(1, AtomicOrdering::Relaxed)))
    }

    /// Recovers the action if it has type `A`.
    pub fn cast<A: Action>(&self) -> Option<&A> {
        self.action.as_any().downcast_ref::<A>()
    }

    /// True if the identity was derived from an action of type `A`.
    pub fn is<A: Action>(&self) -> bool {
        self.type_id == TypeId::of::<A>()
    }

    /// True for identities created by [`TaskIdentity::anonymous`].
    pub fn is_anonymous(&self) -> bool {
        self.is::<Anonymous>()
    }

    /// Debug rendering of the action.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Shared label, for events.
    pub(crate) fn label_arc(&self) -> Arc<str> {
        Arc::clone(&self.label)
    }

    /// Type name of the action.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for TaskIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
            && self.hash == other.hash
            && self.action.dyn_eq(other.action.as_ref())
    }
}

impl Eq for TaskIdentity {}

impl Hash for TaskIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.hash.hash(state);
    }
}

impl fmt::Debug for TaskIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskIdentity")
            .field("type", &self.type_name)
            .field("action", &self.label)
            .finish()
    }
}

impl fmt::Display for TaskIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    enum Counter {
        Increment(u32),
        Reset,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Other(u32);

    #[test]
    fn same_action_same_identity() {
        assert_eq!(
            TaskIdentity::of(&Counter::Increment(1)),
            TaskIdentity::of(&Counter::Increment(1))
        );
        assert_ne!(
            TaskIdentity::of(&Counter::Increment(1)),
            TaskIdentity::of(&Counter::Increment(2))
        );
        assert_ne!(TaskIdentity::of(&Counter::Reset), TaskIdentity::of(&Other(0)));
    }

    #[test]
    fn cast_fails_closed() {
        let id = TaskIdentity::of(&Counter::Increment(5));
        assert_eq!(id.cast::<Counter>(), Some(&Counter::Increment(5)));
        assert_eq!(id.cast::<Other>(), None);
        assert!(id.is::<Counter>());
        assert_eq!(id.label(), "Increment(5)");
    }

    #[test]
    fn anonymous_identities_are_unique() {
        let a = TaskIdentity::anonymous();
        let b = TaskIdentity::anonymous();
        assert_ne!(a, b);
        assert!(a.is_anonymous());
        assert!(!TaskIdentity::of(&Counter::Reset).is_anonymous());
    }
}
