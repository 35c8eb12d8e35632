//! Shape classification for values handed to the quiet closer.
//!
//! [`CloseHandle`] is the single point of shape dispatch: a value to be
//! closed is classified exactly once into one of five shapes, and the
//! traversal matches exhaustively instead of scattering runtime type
//! inspection. Classification is pure and thread-safe.

use std::sync::{Arc, Weak};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::resource::Close;

/// The shape of a value to be closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HandleKind {
    /// Nothing to close.
    Absent,
    /// A single closeable resource.
    Single,
    /// An ordered sequence; iteration order is significant.
    Sequence,
    /// A fixed array; index order is significant.
    Array,
    /// A weak reference; dereferencing may yield absent.
    Weak,
}

/// A value to be closed: a heterogeneous, possibly nested graph node.
///
/// The graph is a tree through `Sequence`/`Array` ownership; sharing and
/// back-references enter only through `Weak`, which never extends the
/// referent's lifetime.
pub enum CloseHandle {
    /// Nothing to close; traversal skips it.
    Absent,
    /// One closeable resource.
    Single(Arc<dyn Close>),
    /// Nested handles, visited in iteration order.
    Sequence(Vec<CloseHandle>),
    /// Nested handles, visited in index order.
    Array(Box<[CloseHandle]>),
    /// A weak reference to a shared handle; a dead referent is a no-op.
    Weak(Weak<CloseHandle>),
}

impl CloseHandle {
    /// Classify this value's shape.
    #[must_use]
    pub fn kind(&self) -> HandleKind {
        match self {
            Self::Absent => HandleKind::Absent,
            Self::Single(_) => HandleKind::Single,
            Self::Sequence(_) => HandleKind::Sequence,
            Self::Array(_) => HandleKind::Array,
            Self::Weak(_) => HandleKind::Weak,
        }
    }

    /// Wrap a single resource.
    pub fn single<R: Close + 'static>(resource: Arc<R>) -> Self {
        Self::Single(resource)
    }

    /// Take a weak reference to a shared handle.
    ///
    /// The returned handle does not keep `target` alive; if every strong
    /// reference is dropped before traversal, the branch is a no-op.
    #[must_use]
    pub fn downgrade(target: &Arc<CloseHandle>) -> Self {
        Self::Weak(Arc::downgrade(target))
    }

    /// Dereference a `Weak` handle.
    ///
    /// Returns `None` for every other shape and for a dead referent.
    #[must_use]
    pub fn upgrade(&self) -> Option<Arc<CloseHandle>> {
        match self {
            Self::Weak(weak) => weak.upgrade(),
            _ => None,
        }
    }

    /// Whether there is nothing behind this handle right now.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Weak(weak) => weak.strong_count() == 0,
            _ => false,
        }
    }
}

impl std::fmt::Debug for CloseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Single(r) => f.debug_tuple("Single").field(&r.type_label()).finish(),
            Self::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
            Self::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Self::Weak(weak) => f
                .debug_tuple("Weak")
                .field(&if weak.strong_count() == 0 { "dead" } else { "live" })
                .finish(),
        }
    }
}

impl Default for CloseHandle {
    fn default() -> Self {
        Self::Absent
    }
}

impl<R: Close + 'static> From<Arc<R>> for CloseHandle {
    fn from(resource: Arc<R>) -> Self {
        Self::Single(resource)
    }
}

impl From<Option<CloseHandle>> for CloseHandle {
    fn from(value: Option<CloseHandle>) -> Self {
        value.unwrap_or(Self::Absent)
    }
}

impl From<Vec<CloseHandle>> for CloseHandle {
    fn from(items: Vec<CloseHandle>) -> Self {
        Self::Sequence(items)
    }
}

impl<const N: usize> From<[CloseHandle; N]> for CloseHandle {
    fn from(items: [CloseHandle; N]) -> Self {
        Self::Array(Box::new(items))
    }
}

impl From<Box<[CloseHandle]>> for CloseHandle {
    fn from(items: Box<[CloseHandle]>) -> Self {
        Self::Array(items)
    }
}

impl From<Weak<CloseHandle>> for CloseHandle {
    fn from(weak: Weak<CloseHandle>) -> Self {
        Self::Weak(weak)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    #[derive(Debug)]
    struct Noop;

    impl Close for Noop {
        fn type_label(&self) -> &'static str {
            "Noop"
        }

        fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn classification_is_exhaustive() {
        assert_eq!(CloseHandle::Absent.kind(), HandleKind::Absent);
        assert_eq!(CloseHandle::single(Arc::new(Noop)).kind(), HandleKind::Single);
        assert_eq!(CloseHandle::Sequence(Vec::new()).kind(), HandleKind::Sequence);
        assert_eq!(CloseHandle::from([CloseHandle::Absent]).kind(), HandleKind::Array);
        let shared = Arc::new(CloseHandle::Absent);
        assert_eq!(CloseHandle::downgrade(&shared).kind(), HandleKind::Weak);
    }

    #[test]
    fn weak_does_not_extend_lifetime() {
        let shared = Arc::new(CloseHandle::single(Arc::new(Noop)));
        let weak = CloseHandle::downgrade(&shared);
        assert!(weak.upgrade().is_some());
        assert!(!weak.is_absent());
        drop(shared);
        assert!(weak.upgrade().is_none());
        assert!(weak.is_absent());
    }

    #[test]
    fn upgrade_on_non_weak_is_none() {
        assert!(CloseHandle::Absent.upgrade().is_none());
        assert!(CloseHandle::Sequence(Vec::new()).upgrade().is_none());
    }

    #[test]
    fn option_conversion_maps_none_to_absent() {
        assert_eq!(CloseHandle::from(None).kind(), HandleKind::Absent);
        assert_eq!(
            CloseHandle::from(Some(CloseHandle::Sequence(Vec::new()))).kind(),
            HandleKind::Sequence
        );
    }
}
