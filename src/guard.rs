//! Lifecycle guard: idempotent close and the discard safety net.
//!
//! [`LifecycleGuard`] wires the tri-state flag, the quiet closer, and the
//! trace configuration together. `request_close` is the explicit,
//! caller-initiated close; `warn_if_discarded_unclosed` is the safety net
//! invoked when a resource is about to be discarded (typically from
//! [`Tracked`](crate::tracked::Tracked) at scope exit, possibly from a
//! different execution context than the one that created the resource).

use std::sync::{Arc, OnceLock};

use crate::closer::QuietCloser;
use crate::config::TraceConfig;
use crate::error::Result;
use crate::lifecycle::ClosingState;
use crate::resource::Managed;
use crate::sink::{DiagnosticSink, DiscardWarning, Severity, TracingSink};

/// Entry point for idempotent close and discard detection.
#[derive(Debug)]
pub struct LifecycleGuard {
    closer: QuietCloser,
    config: TraceConfig,
}

impl LifecycleGuard {
    /// Create a guard routing diagnostics to `sink` under `config`.
    #[must_use]
    pub fn new(sink: Arc<dyn DiagnosticSink>, config: TraceConfig) -> Self {
        Self {
            closer: QuietCloser::new(sink),
            config,
        }
    }

    /// The process-wide default guard: [`TracingSink`] plus flags
    /// resolved once from the environment.
    pub fn global() -> Arc<LifecycleGuard> {
        static GLOBAL: OnceLock<Arc<LifecycleGuard>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| {
            Arc::new(LifecycleGuard::new(
                Arc::new(TracingSink),
                TraceConfig::resolved(),
            ))
        }))
    }

    /// The quiet closer sharing this guard's sink.
    #[must_use]
    pub fn closer(&self) -> &QuietCloser {
        &self.closer
    }

    /// The configuration this guard was built with.
    #[must_use]
    pub fn config(&self) -> TraceConfig {
        self.config
    }

    /// Explicitly close `resource`, at most once.
    ///
    /// The winning caller runs the real close logic (which may itself
    /// hand nested resources to the quiet closer) and gets its result;
    /// concurrent or repeated callers return `Ok(())` immediately with
    /// no side effects.
    ///
    /// # Errors
    ///
    /// Propagates the resource's own close failure to the first caller.
    /// This is the one close path that does not contain failures.
    pub fn request_close(&self, resource: &dyn Managed) -> Result<()> {
        resource.lifecycle().close_once(|| resource.release())
    }

    /// Safety net for a resource about to be discarded.
    ///
    /// If the resource was never requested to close, tracing is enabled,
    /// and discard warnings are not suppressed: emits exactly one
    /// [`DiscardWarning`], performs a last-chance contained close, and
    /// leaves the resource `Closed`. Any other combination is a no-op.
    /// Never raises.
    pub fn warn_if_discarded_unclosed(&self, resource: &dyn Managed) {
        if resource.lifecycle().state() != ClosingState::Open {
            return;
        }
        if !self.config.warns_on_discard() {
            return;
        }
        // Winning the transition here makes the warning exactly-once even
        // when discard checks race each other or an explicit close.
        let lifecycle = resource.lifecycle();
        if !lifecycle.begin_close() {
            return;
        }
        let warning = DiscardWarning::new(resource.label(), resource);
        let _ = self.closer.sink().emit(
            Severity::High,
            warning.type_label(),
            &warning.to_string(),
            None,
        );
        self.closer.contain(resource.label(), || resource.release());
        lifecycle.finish_close();
    }
}

impl Default for LifecycleGuard {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink), TraceConfig::resolved())
    }
}
