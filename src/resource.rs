//! Core resource traits.
//!
//! [`Close`] is the capability every closeable resource exposes; [`Managed`]
//! adds the tri-state lifecycle flag that makes close idempotent. A blanket
//! impl routes `Close::close` for every `Managed` type through its flag, so
//! the quiet traversal and the explicit [`LifecycleGuard`](crate::guard::LifecycleGuard)
//! paths agree on at-most-once semantics.

use std::fmt;

use crate::error::Result;
use crate::lifecycle::Lifecycle;

/// Capability exposed by any closeable resource.
///
/// `close` may raise; callers going through the quiet paths never see the
/// failure (it is contained and routed to the diagnostic sink), while a
/// direct `close()` call propagates it.
///
/// The `Debug` supertrait supplies the human-readable snapshot used in
/// discard warnings.
pub trait Close: fmt::Debug + Send + Sync {
    /// The declared type label, used to key diagnostics.
    ///
    /// `std::any::type_name::<Self>()` is the conventional implementation.
    fn type_label(&self) -> &'static str;

    /// Close the resource.
    fn close(&self) -> Result<()>;
}

/// A closeable resource carrying its own closing-state flag.
///
/// Implementors provide the real teardown in [`release`](Self::release);
/// the blanket [`Close`] impl guards it with the flag so it runs at most
/// once no matter how many paths race to close the resource:
///
/// ```
/// use quiesce::{CloseError, Lifecycle, Managed};
///
/// #[derive(Debug)]
/// struct Conn {
///     lifecycle: Lifecycle,
/// }
///
/// impl Managed for Conn {
///     fn lifecycle(&self) -> &Lifecycle {
///         &self.lifecycle
///     }
///
///     fn label(&self) -> &'static str {
///         std::any::type_name::<Self>()
///     }
///
///     fn release(&self) -> Result<(), CloseError> {
///         // tear down the connection
///         Ok(())
///     }
/// }
/// ```
pub trait Managed: fmt::Debug + Send + Sync {
    /// The closing-state flag for this resource.
    fn lifecycle(&self) -> &Lifecycle;

    /// The declared type label, used to key diagnostics.
    fn label(&self) -> &'static str;

    /// The real close logic. Invoked at most once, enforced by the flag.
    ///
    /// May itself hand nested resources to
    /// [`QuietCloser::close_quietly`](crate::closer::QuietCloser::close_quietly).
    fn release(&self) -> Result<()>;
}

impl<T: Managed + ?Sized> Close for T {
    fn type_label(&self) -> &'static str {
        self.label()
    }

    fn close(&self) -> Result<()> {
        self.lifecycle().close_once(|| self.release())
    }
}
