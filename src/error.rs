//! Error types for resource teardown
use thiserror::Error;

/// Result type for close operations
pub type Result<T> = std::result::Result<T, CloseError>;

/// Failure raised by a resource's close logic.
///
/// Both kinds are fully contained inside the quiet paths
/// ([`QuietCloser::close_quietly`](crate::closer::QuietCloser::close_quietly)
/// and
/// [`LifecycleGuard::warn_if_discarded_unclosed`](crate::guard::LifecycleGuard::warn_if_discarded_unclosed));
/// the only way one reaches a caller is by invoking `close` directly
/// outside those paths.
#[derive(Error, Debug)]
pub enum CloseError {
    /// A recoverable, domain-level failure from the resource's own close logic
    #[error("close failed: {reason}")]
    Recoverable {
        /// The failure reason
        reason: String,
        /// The underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An unrecoverable runtime-level failure surfaced during close
    #[error("fatal failure during close: {reason}")]
    Fatal {
        /// The failure reason
        reason: String,
        /// The underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl CloseError {
    /// Create a recoverable close failure
    pub fn recoverable<S: Into<String>>(reason: S) -> Self {
        Self::Recoverable {
            reason: reason.into(),
            source: None,
        }
    }

    /// Create a recoverable close failure wrapping an underlying error
    pub fn recoverable_with<S, E>(reason: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Recoverable {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a fatal close failure
    pub fn fatal<S: Into<String>>(reason: S) -> Self {
        Self::Fatal {
            reason: reason.into(),
            source: None,
        }
    }

    /// Create a fatal close failure wrapping an underlying error
    pub fn fatal_with<S, E>(reason: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Fatal {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Check if this failure is fatal
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }

    /// The severity the quiet paths log this failure at
    #[must_use]
    pub fn severity(&self) -> crate::sink::Severity {
        match self {
            Self::Recoverable { .. } => crate::sink::Severity::Low,
            Self::Fatal { .. } => crate::sink::Severity::High,
        }
    }
}

/// Failure raised by a diagnostic sink rejecting an event.
///
/// Swallowed by every caller inside this crate; sinks are best-effort.
#[derive(Error, Debug)]
#[error("diagnostic sink rejected event: {reason}")]
pub struct SinkError {
    /// The rejection reason
    pub reason: String,
}

impl SinkError {
    /// Create a sink error
    pub fn new<S: Into<String>>(reason: S) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
