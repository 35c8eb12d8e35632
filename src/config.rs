//! Tracing configuration for discard detection.
//!
//! Feature flags are injected at construction time of the lifecycle
//! subsystem instead of being read from process-wide mutable state; a
//! single process-wide default is resolved once from the environment for
//! ergonomic call sites.

use std::sync::OnceLock;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Environment variable enabling resource tracing.
pub const RESOURCE_TRACING_ENV: &str = "QUIESCE_RESOURCE_TRACING";

/// Environment variable suppressing discard warnings even when tracing.
pub const DISABLE_DISCARD_WARNING_ENV: &str = "QUIESCE_DISABLE_DISCARD_WARNING";

/// Read-only feature flags consumed by the lifecycle guard.
///
/// Treated as immutable for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceConfig {
    /// Whether discard-warning detection and reporting is enabled.
    pub tracing_enabled: bool,
    /// Whether discard warnings are suppressed even when tracing.
    pub suppress_discard_warning: bool,
}

impl TraceConfig {
    /// Both flags off.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            tracing_enabled: false,
            suppress_discard_warning: false,
        }
    }

    /// Set the tracing flag.
    #[must_use]
    pub const fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing_enabled = enabled;
        self
    }

    /// Set the suppression flag.
    #[must_use]
    pub const fn with_suppression(mut self, suppressed: bool) -> Self {
        self.suppress_discard_warning = suppressed;
        self
    }

    /// Resolve flags from the process environment.
    ///
    /// `1`, `true` and `yes` (case-insensitive) count as set.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            tracing_enabled: env_flag(RESOURCE_TRACING_ENV),
            suppress_discard_warning: env_flag(DISABLE_DISCARD_WARNING_ENV),
        }
    }

    /// The process-wide configuration, resolved from the environment once
    /// on first use.
    #[must_use]
    pub fn resolved() -> Self {
        static RESOLVED: OnceLock<TraceConfig> = OnceLock::new();
        *RESOLVED.get_or_init(Self::from_env)
    }

    /// Whether a discard warning would actually be emitted.
    #[must_use]
    pub fn warns_on_discard(&self) -> bool {
        self.tracing_enabled && !self.suppress_discard_warning
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_silent() {
        let config = TraceConfig::default();
        assert!(!config.tracing_enabled);
        assert!(!config.warns_on_discard());
    }

    #[test]
    fn builders_compose() {
        let config = TraceConfig::disabled().with_tracing(true);
        assert!(config.warns_on_discard());
        let config = config.with_suppression(true);
        assert!(!config.warns_on_discard());
    }

    #[test]
    fn suppression_without_tracing_stays_silent() {
        let config = TraceConfig::disabled().with_suppression(true);
        assert!(!config.warns_on_discard());
    }
}
