//! Diagnostic sink: the logging/exception-routing collaborator.
//!
//! The quiet paths never let a close failure escape; instead every
//! contained failure is routed here, keyed by the declared type of the
//! resource that raised it. The sink itself is best-effort — callers
//! swallow [`SinkError`]s.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{CloseError, SinkError};

/// Severity of a routed diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Severity {
    /// Recoverable, domain-level failures. Logged quietly.
    Low,
    /// Fatal runtime-level failures and discard warnings.
    High,
}

/// Destination for severity-tagged diagnostics.
///
/// Implementations must be safe to call from any thread. They may be
/// slow and they may fail; every caller in this crate discards the
/// result (`let _ = sink.emit(..)`).
pub trait DiagnosticSink: Send + Sync {
    /// Route one diagnostic event.
    ///
    /// `source_type` is the declared type label of the resource the
    /// event concerns; `cause` is present for contained close failures
    /// and absent for discard warnings.
    fn emit(
        &self,
        severity: Severity,
        source_type: &str,
        message: &str,
        cause: Option<&CloseError>,
    ) -> Result<(), SinkError>;
}

/// Diagnostic emitted when a resource is discarded without having been
/// explicitly closed.
///
/// Carries the declared type of the resource and a human-readable
/// snapshot of it; deliberately no causal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardWarning {
    type_label: &'static str,
    snapshot: String,
}

impl DiscardWarning {
    /// Build a warning for `resource`, snapshotting it via `Debug`.
    pub fn new<R: fmt::Debug + ?Sized>(type_label: &'static str, resource: &R) -> Self {
        Self {
            type_label,
            snapshot: format!("{resource:?}"),
        }
    }

    /// The declared type of the discarded resource.
    #[must_use]
    pub fn type_label(&self) -> &'static str {
        self.type_label
    }

    /// The snapshot taken when the discard was detected.
    #[must_use]
    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }
}

impl fmt::Display for DiscardWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "discarded without closing: {}", self.snapshot)
    }
}

/// Default sink that forwards to the `tracing` subscriber.
///
/// `Low` maps to `debug!`, `High` to `warn!`. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(
        &self,
        severity: Severity,
        source_type: &str,
        message: &str,
        cause: Option<&CloseError>,
    ) -> Result<(), SinkError> {
        match (severity, cause) {
            (Severity::Low, Some(cause)) => {
                tracing::debug!(source_type, %cause, "{message}");
            }
            (Severity::Low, None) => {
                tracing::debug!(source_type, "{message}");
            }
            (Severity::High, Some(cause)) => {
                tracing::warn!(source_type, %cause, "{message}");
            }
            (Severity::High, None) => {
                tracing::warn!(source_type, "{message}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Conn {
        fd: i32,
    }

    #[test]
    fn discard_warning_snapshot() {
        let conn = Conn { fd: 7 };
        let warning = DiscardWarning::new("Conn", &conn);
        assert_eq!(warning.type_label(), "Conn");
        assert_eq!(warning.snapshot(), "Conn { fd: 7 }");
        assert_eq!(
            warning.to_string(),
            "discarded without closing: Conn { fd: 7 }"
        );
    }

    #[test]
    fn tracing_sink_never_fails() {
        let sink = TracingSink;
        let err = CloseError::fatal("boom");
        assert!(sink.emit(Severity::High, "Conn", "close failed", Some(&err)).is_ok());
        assert!(sink.emit(Severity::Low, "Conn", "close failed", None).is_ok());
    }
}
