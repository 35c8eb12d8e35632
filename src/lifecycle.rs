//! Tri-state closing flag enforcing at-most-once close

use std::sync::atomic::{AtomicU8, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The closing state of a resource.
///
/// Advances monotonically `Open` → `Closing` → `Closed` and never
/// reverses. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ClosingState {
    /// Close has never been requested.
    Open,
    /// Close has been requested and the real close logic is running.
    Closing,
    /// The real close logic has completed (successfully or not).
    Closed,
}

const OPEN: u8 = 0;
const CLOSING: u8 = 1;
const CLOSED: u8 = 2;

/// Atomic tri-state flag guarding a resource's close.
///
/// Embed one per resource; two threads racing to close the same resource
/// result in exactly one execution of the real close logic. The loser
/// observes `Closing` or `Closed` and returns without side effects.
#[derive(Debug)]
pub struct Lifecycle {
    state: AtomicU8,
}

impl Lifecycle {
    /// Create a new flag in the `Open` state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(OPEN),
        }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> ClosingState {
        match self.state.load(Ordering::Acquire) {
            OPEN => ClosingState::Open,
            CLOSING => ClosingState::Closing,
            _ => ClosingState::Closed,
        }
    }

    /// Whether close has been requested (state is `Closing` or `Closed`).
    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.state.load(Ordering::Acquire) != OPEN
    }

    /// Whether the real close logic has completed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.load(Ordering::Acquire) == CLOSED
    }

    /// Attempt the `Open` → `Closing` transition.
    ///
    /// Returns `true` for exactly one caller; every other (concurrent or
    /// repeated) caller gets `false`.
    #[must_use]
    pub fn begin_close(&self) -> bool {
        self.state
            .compare_exchange(OPEN, CLOSING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Complete the `Closing` → `Closed` transition.
    ///
    /// Must only be called by the caller that won [`begin_close`](Self::begin_close).
    pub fn finish_close(&self) {
        self.state.store(CLOSED, Ordering::Release);
    }

    /// Run `f` at most once, guarded by this flag.
    ///
    /// The winning caller runs `f` and gets its result; the state is
    /// `Closed` afterwards even if `f` failed. Losing callers return
    /// `Ok(())` immediately without side effects.
    pub fn close_once<F>(&self, f: F) -> crate::error::Result<()>
    where
        F: FnOnce() -> crate::error::Result<()>,
    {
        if !self.begin_close() {
            return Ok(());
        }
        let result = f();
        self.finish_close();
        result
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CloseError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn starts_open() {
        let flag = Lifecycle::new();
        assert_eq!(flag.state(), ClosingState::Open);
        assert!(!flag.is_closing());
        assert!(!flag.is_closed());
    }

    #[test]
    fn begin_close_wins_once() {
        let flag = Lifecycle::new();
        assert!(flag.begin_close());
        assert!(!flag.begin_close());
        assert_eq!(flag.state(), ClosingState::Closing);
        flag.finish_close();
        assert_eq!(flag.state(), ClosingState::Closed);
        assert!(!flag.begin_close());
    }

    #[test]
    fn close_once_runs_once() {
        let flag = Lifecycle::new();
        let runs = AtomicU32::new(0);
        for _ in 0..3 {
            flag.close_once(|| {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(flag.is_closed());
    }

    #[test]
    fn close_once_reaches_closed_on_error() {
        let flag = Lifecycle::new();
        let result = flag.close_once(|| Err(CloseError::recoverable("nope")));
        assert!(result.is_err());
        assert!(flag.is_closed());
        // repeat is side-effect-free and Ok
        assert!(flag.close_once(|| panic!("must not run")).is_ok());
    }

    #[test]
    fn concurrent_begin_close_has_one_winner() {
        let flag = Arc::new(Lifecycle::new());
        let wins = Arc::new(AtomicU32::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let flag = Arc::clone(&flag);
                let wins = Arc::clone(&wins);
                std::thread::spawn(move || {
                    if flag.begin_close() {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(wins.load(Ordering::SeqCst), 1);
    }
}
