//! The seam between the supervisor and the host window it controls.

use crate::{CaptureSurface, Rect};

/// A request for the host window, executed on its UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    /// Move and resize the host to exactly cover `Rect`.
    Reposition(Rect),
    /// Replace the background with a capture, drawn at actual size.
    Background(CaptureSurface),
    /// Close the host window, ending the UI loop.
    Close,
}

/// Accepts commands for the host window from any thread.
///
/// Most windowing toolkits forbid touching a window from a thread other
/// than the one that created it, so implementations queue the command
/// and wake the UI thread instead of applying it directly.
pub trait HostSink: Send + Sync {
    fn post(&self, command: HostCommand);
}

/// Callbacks raised by the host window on its UI thread.
///
/// Implementations must return quickly: they only toggle state or start
/// non-blocking work.
pub trait HostEvents {
    /// The host window became visible.
    fn on_shown(&self);

    /// The host window received activation focus.
    fn on_activated(&self);

    /// The host window is closing.
    fn on_closed(&self);
}
