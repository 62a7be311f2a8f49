pub mod args;
pub mod cancel;
pub mod capture;
pub mod config;
pub mod error;
pub mod hide;
pub mod host;
pub mod log;
pub mod rect;
pub mod scheduler;
pub mod state;
pub mod supervisor;
pub mod sync;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

pub use args::LaunchTarget;
pub use cancel::CancellationToken;
pub use capture::{CaptureSurface, ScreenCapture};
pub use error::{Error, WindowResult};
pub use hide::HideCounter;
pub use host::{HostCommand, HostEvents, HostSink};
pub use rect::Rect;
pub use state::{OverlayEvent, OverlayMachine, OverlayState};
pub use supervisor::{ChildProcess, OverlayController, Supervisor};
pub use sync::{ChildWindow, SyncLoop, TickReport};
pub use window::WindowQuery;
