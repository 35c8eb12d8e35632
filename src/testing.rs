//! Testing utilities for resource teardown
//!
//! [`CollectingSink`] records every routed diagnostic for assertions;
//! [`ProbeResource`] is a managed resource with a configurable failure
//! mode and a close counter. Used by this crate's own tests and useful
//! for testing code built on top of it.

use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;

use crate::error::{CloseError, Result, SinkError};
use crate::lifecycle::Lifecycle;
use crate::resource::Managed;
use crate::sink::{DiagnosticSink, Severity};

/// One diagnostic captured by a [`CollectingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    /// Severity the event was routed at.
    pub severity: Severity,
    /// The declared type of the resource the event concerns.
    pub source_type: String,
    /// The event message.
    pub message: String,
    /// Rendered cause, when one was attached.
    pub cause: Option<String>,
}

/// Sink that records every emission for later assertions.
#[derive(Debug, Default)]
pub struct CollectingSink {
    records: Mutex<Vec<Recorded>>,
    reject: Mutex<bool>,
}

impl CollectingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `emit` fail, for exercising swallow paths.
    pub fn reject_everything(&self) {
        *self.reject.lock() = true;
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn records(&self) -> Vec<Recorded> {
        self.records.lock().clone()
    }

    /// Number of records at the given severity.
    #[must_use]
    pub fn count_at(&self, severity: Severity) -> usize {
        self.records
            .lock()
            .iter()
            .filter(|r| r.severity == severity)
            .count()
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(
        &self,
        severity: Severity,
        source_type: &str,
        message: &str,
        cause: Option<&CloseError>,
    ) -> std::result::Result<(), SinkError> {
        if *self.reject.lock() {
            return Err(SinkError::new("rejecting everything"));
        }
        self.records.lock().push(Recorded {
            severity,
            source_type: source_type.to_string(),
            message: message.to_string(),
            cause: cause.map(ToString::to_string),
        });
        Ok(())
    }
}

/// How a [`ProbeResource`]'s release behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Release succeeds.
    #[default]
    None,
    /// Release returns [`CloseError::Recoverable`].
    Recoverable,
    /// Release returns [`CloseError::Fatal`].
    Fatal,
    /// Release panics.
    Panic,
}

/// Managed resource double: counts releases, failure mode configurable.
#[derive(Debug)]
pub struct ProbeResource {
    name: &'static str,
    failure: FailureMode,
    lifecycle: Lifecycle,
    releases: AtomicU32,
}

impl ProbeResource {
    /// Create a probe with the given name and a succeeding release.
    #[must_use]
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            failure: FailureMode::None,
            lifecycle: Lifecycle::new(),
            releases: AtomicU32::new(0),
        }
    }

    /// Set the failure mode.
    #[must_use]
    pub fn with_failure(mut self, failure: FailureMode) -> Self {
        self.failure = failure;
        self
    }

    /// How many times the real release logic has run.
    #[must_use]
    pub fn release_count(&self) -> u32 {
        self.releases.load(Ordering::SeqCst)
    }
}

impl Managed for ProbeResource {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn label(&self) -> &'static str {
        self.name
    }

    fn release(&self) -> Result<()> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            FailureMode::None => Ok(()),
            FailureMode::Recoverable => Err(CloseError::recoverable("probe recoverable failure")),
            FailureMode::Fatal => Err(CloseError::fatal("probe fatal failure")),
            FailureMode::Panic => panic!("probe close panic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Close;

    #[test]
    fn probe_counts_guarded_releases() {
        let probe = ProbeResource::named("p");
        probe.close().unwrap();
        probe.close().unwrap();
        assert_eq!(probe.release_count(), 1);
    }

    #[test]
    fn collecting_sink_records_and_counts() {
        let sink = CollectingSink::new();
        let err = CloseError::recoverable("x");
        sink.emit(Severity::Low, "P", "close failed", Some(&err))
            .unwrap();
        sink.emit(Severity::High, "Q", "close panicked", None)
            .unwrap();
        assert_eq!(sink.count_at(Severity::Low), 1);
        assert_eq!(sink.count_at(Severity::High), 1);
        assert_eq!(sink.records()[0].cause.as_deref(), Some("close failed: x"));
    }

    #[test]
    fn rejecting_sink_fails() {
        let sink = CollectingSink::new();
        sink.reject_everything();
        assert!(sink.emit(Severity::Low, "P", "m", None).is_err());
        assert!(sink.records().is_empty());
    }
}
