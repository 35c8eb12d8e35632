//! Best-effort feature-usage telemetry boundary.
//!
//! Libraries report start and feature-usage events to an upstream
//! receiver through a [`Telemetry`] handle acquired per
//! (library id, version) pair. Everything here is best-effort:
//! reporting never throws, never blocks, and silently drops events under
//! rate limiting. The whole subsystem is disabled by setting
//! [`TELEMETRY_DISABLE_ENV`] before the first `acquire`.

use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Instant;

use dashmap::DashMap;
use parking_lot::Mutex;

/// Environment variable disabling telemetry process-wide.
pub const TELEMETRY_DISABLE_ENV: &str = "QUIESCE_TELEMETRY_DISABLE";

/// Events dropped once fewer than one token remains; the bucket refills
/// at `REFILL_PER_SEC` up to `BURST` tokens.
const BURST: f64 = 16.0;
const REFILL_PER_SEC: f64 = 0.5;

/// Handle for reporting library feature usage upstream.
///
/// Implementations must be non-throwing and non-blocking; events may be
/// silently dropped.
pub trait Telemetry: Send + Sync {
    /// Notify that the library has started.
    fn on_start(&self, params: &[(&str, &str)]) {
        self.on_feature("started", params);
    }

    /// Notify that the feature identified by `id` was used.
    fn on_feature(&self, id: &str, params: &[(&str, &str)]);
}

/// Acquire the telemetry handle for a (library id, version) pair.
///
/// Handles are cached: repeated calls with the same pair return the same
/// instance. With [`TELEMETRY_DISABLE_ENV`] set, every pair maps to a
/// no-op handle.
pub fn acquire(library_id: &str, library_version: &str) -> Arc<dyn Telemetry> {
    static REGISTRY: OnceLock<DashMap<(String, String), Arc<dyn Telemetry>>> = OnceLock::new();
    static DISABLED: OnceLock<bool> = OnceLock::new();

    let disabled = *DISABLED.get_or_init(|| std::env::var(TELEMETRY_DISABLE_ENV).is_ok());
    let registry = REGISTRY.get_or_init(DashMap::new);
    let key = (library_id.to_string(), library_version.to_string());
    Arc::clone(
        &registry
            .entry(key)
            .or_insert_with(|| {
                if disabled {
                    Arc::new(NoopTelemetry)
                } else {
                    Arc::new(RateLimitedTelemetry::new(library_id, library_version))
                }
            }),
    )
}

/// Handle that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {
    fn on_feature(&self, _id: &str, _params: &[(&str, &str)]) {}
}

/// Default handle: forwards events to the `tracing` subscriber at debug
/// level, dropping silently once the token bucket is empty.
pub struct RateLimitedTelemetry {
    library_id: String,
    library_version: String,
    bucket: Mutex<TokenBucket>,
}

impl RateLimitedTelemetry {
    /// Create a handle for the given library coordinates.
    #[must_use]
    pub fn new(library_id: &str, library_version: &str) -> Self {
        Self {
            library_id: library_id.to_string(),
            library_version: library_version.to_string(),
            bucket: Mutex::new(TokenBucket::full()),
        }
    }
}

impl Telemetry for RateLimitedTelemetry {
    fn on_feature(&self, id: &str, params: &[(&str, &str)]) {
        if !self.bucket.lock().try_take() {
            return;
        }
        tracing::debug!(
            library_id = %self.library_id,
            library_version = %self.library_version,
            feature = %id,
            ?params,
            "feature used"
        );
    }
}

impl std::fmt::Debug for RateLimitedTelemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitedTelemetry")
            .field("library_id", &self.library_id)
            .field("library_version", &self.library_version)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    refilled_at: Instant,
}

impl TokenBucket {
    fn full() -> Self {
        Self {
            tokens: BURST,
            refilled_at: Instant::now(),
        }
    }

    fn try_take(&mut self) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.refilled_at).as_secs_f64();
        self.tokens = (self.tokens + elapsed * REFILL_PER_SEC).min(BURST);
        self.refilled_at = now;
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
