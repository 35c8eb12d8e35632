//! # Quiesce
//!
//! Failure-containing resource teardown for managed runtimes.
//! Releases heterogeneous graphs of closeable resources without ever
//! propagating failure to the caller, and detects resources discarded
//! without having been explicitly closed.
//!
//! The three core pieces:
//!
//! - [`CloseHandle`] — exhaustive shape classification of a value to be
//!   closed (absent, single, sequence, array, weak reference);
//! - [`QuietCloser`] — depth-first traversal invoking close on every
//!   reachable resource, containing every failure and routing it to a
//!   [`DiagnosticSink`];
//! - [`LifecycleGuard`] — idempotent close via an atomic tri-state flag,
//!   plus the discard safety net, run deterministically at scope exit by
//!   [`Tracked`].
//!
//! ```
//! use std::sync::Arc;
//! use quiesce::{CloseHandle, QuietCloser};
//!
//! # use quiesce::testing::ProbeResource;
//! let closer = QuietCloser::default();
//! let conn = Arc::new(ProbeResource::named("conn"));
//! let graph = CloseHandle::Sequence(vec![
//!     CloseHandle::Absent,
//!     CloseHandle::single(conn.clone()),
//! ]);
//! closer.close_handle(&graph);
//! assert_eq!(conn.release_count(), 1);
//! ```

pub mod closer;
pub mod config;
pub mod error;
pub mod guard;
pub mod handle;
pub mod lifecycle;
pub mod resource;
pub mod sink;
pub mod telemetry;
pub mod testing;
pub mod tracked;

pub use closer::QuietCloser;
pub use config::TraceConfig;
pub use error::{CloseError, Result, SinkError};
pub use guard::LifecycleGuard;
pub use handle::{CloseHandle, HandleKind};
pub use lifecycle::{ClosingState, Lifecycle};
pub use resource::{Close, Managed};
pub use sink::{DiagnosticSink, DiscardWarning, Severity, TracingSink};
pub use tracked::Tracked;
