//! Failure-containing traversal over closeable graphs.
//!
//! `close_quietly` visits every reachable resource depth-first,
//! left-to-right, invoking close on each exactly once and containing
//! every failure: recoverable failures are routed to the diagnostic sink
//! at low severity, fatal failures and panics at high severity, and the
//! traversal always moves on to the next sibling. Nothing escapes.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{CloseError, Result};
use crate::handle::CloseHandle;
use crate::resource::Close;
use crate::sink::{DiagnosticSink, Severity, TracingSink};

/// Depth at which a branch is abandoned with a high-severity diagnostic
/// instead of risking stack exhaustion.
const MAX_DEPTH: usize = 1024;

/// Recursive, failure-containing closer.
///
/// Stateless apart from the sink; safe to share and to call from any
/// number of threads on disjoint graphs.
pub struct QuietCloser {
    sink: Arc<dyn DiagnosticSink>,
}

impl QuietCloser {
    /// Create a closer routing contained failures to `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink }
    }

    /// The sink this closer routes contained failures to.
    #[must_use]
    pub fn sink(&self) -> &Arc<dyn DiagnosticSink> {
        &self.sink
    }

    /// Close every resource reachable from `roots`, in argument order.
    ///
    /// Never raises, whatever the nested close operations do.
    pub fn close_quietly<'a, I>(&self, roots: I)
    where
        I: IntoIterator<Item = &'a CloseHandle>,
    {
        let mut visited = HashSet::new();
        for root in roots {
            self.visit(root, &mut visited, 0);
        }
    }

    /// Close every resource reachable from a single root.
    pub fn close_handle(&self, root: &CloseHandle) {
        self.close_quietly(std::iter::once(root));
    }

    /// Invoke one resource's close with full containment.
    ///
    /// Useful when a resource is held directly rather than behind a
    /// [`CloseHandle`].
    pub fn close_resource(&self, resource: &dyn Close) {
        self.contain(resource.type_label(), || resource.close());
    }

    fn visit(&self, handle: &CloseHandle, visited: &mut HashSet<usize>, depth: usize) {
        if depth > MAX_DEPTH {
            let _ = self.sink.emit(
                Severity::High,
                "CloseHandle",
                "close graph exceeds maximum depth, abandoning branch",
                None,
            );
            return;
        }
        match handle {
            CloseHandle::Absent => {}
            CloseHandle::Single(resource) => self.close_resource(resource.as_ref()),
            CloseHandle::Sequence(items) => {
                for item in items {
                    self.visit(item, visited, depth + 1);
                }
            }
            CloseHandle::Array(items) => {
                for item in items.iter() {
                    self.visit(item, visited, depth + 1);
                }
            }
            CloseHandle::Weak(weak) => {
                // Dead referent: the branch is a no-op. A live one may be
                // reachable more than once (back-references can form
                // cycles through Weak), so revisits are dropped here.
                if let Some(target) = weak.upgrade() {
                    if visited.insert(Arc::as_ptr(&target) as usize) {
                        self.visit(&target, visited, depth + 1);
                    }
                }
            }
        }
    }

    /// Run `f` containing any failure, keyed by `type_label`.
    pub(crate) fn contain<F>(&self, type_label: &str, f: F)
    where
        F: FnOnce() -> Result<()>,
    {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                let _ = self.sink.emit(
                    error.severity(),
                    type_label,
                    "close failed",
                    Some(&error),
                );
            }
            Err(payload) => {
                let error = CloseError::fatal(panic_reason(&payload));
                let _ = self.sink.emit(
                    Severity::High,
                    type_label,
                    "close panicked",
                    Some(&error),
                );
            }
        }
    }
}

impl Default for QuietCloser {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl std::fmt::Debug for QuietCloser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuietCloser").finish_non_exhaustive()
    }
}

fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
