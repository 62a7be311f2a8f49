use std::io;

/// Result type shared by every window, capture, and launch operation.
pub type WindowResult<T> = Result<T, Error>;

/// Errors raised while supervising the child and its window.
///
/// Only [`Error::Launch`] and [`Error::Platform`] are fatal. The window
/// and capture variants are swallowed by the sync loop: the next tick
/// retries naturally.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The child executable could not be found or started.
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// A window handle was invalid or the window has been destroyed.
    #[error("window 0x{hwnd:X}: {reason}")]
    WindowQuery { hwnd: usize, reason: String },

    /// The screen region could not be captured.
    #[error("capture failed: {0}")]
    Capture(String),

    /// Argument file or config I/O.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Host window setup failed (class registration, window creation).
    #[error("{0}")]
    Platform(String),
}

impl Error {
    /// Builds a [`Error::WindowQuery`] from any displayable OS error.
    pub fn window(hwnd: usize, reason: impl std::fmt::Display) -> Self {
        Self::WindowQuery {
            hwnd,
            reason: reason.to_string(),
        }
    }

    /// Whether the sync loop may swallow this error and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::WindowQuery { .. } | Self::Capture(_))
    }
}
