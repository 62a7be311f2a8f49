#![cfg(windows)]

/// GDI screen capture.
pub mod capture;

/// Per-monitor DPI awareness.
pub mod dpi;

/// Main-window discovery by process id.
pub mod enumerate;

/// The overlay host window and its command channel.
pub mod host;

/// Process entry point: launch, host window, message pump.
pub mod overlay;

/// `WindowQuery` over raw Win32 handles.
pub mod window;

pub use capture::GdiCapture;
pub use host::{HostHandle, HostWindow};
pub use overlay::run;
pub use window::Win32Windows;
