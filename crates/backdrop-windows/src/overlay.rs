use std::rc::Rc;
use std::sync::Arc;
use std::thread;

use backdrop_core::args::Companions;
use backdrop_core::config::Config;
use backdrop_core::{ChildProcess, Error, LaunchTarget, Supervisor, WindowResult};
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, GetMessageW, MSG, TranslateMessage,
};

use crate::capture::GdiCapture;
use crate::dpi;
use crate::host::HostWindow;
use crate::window::Win32Windows;

/// Runs one overlay session and returns the exit code for the process.
///
/// The child is launched first; if that fails no window is ever shown.
/// The calling thread becomes the UI thread and pumps messages until the
/// host window is destroyed, either because the child exited or because
/// the user closed the host.
pub fn run(target: &LaunchTarget, config: &Config, companions: &Companions) -> WindowResult<i32> {
    dpi::enable_dpi_awareness();

    let child = ChildProcess::launch(target)?;
    let pid = child.pid();

    let (host, handle) = HostWindow::create(
        &companions.stem,
        config.host.background_color(),
        companions.icon(),
    )?;

    let supervisor = Supervisor::new(
        config.sync.clone(),
        pid,
        Arc::new(Win32Windows),
        Arc::new(GdiCapture),
        Arc::new(handle),
    );
    host.set_events(Rc::new(supervisor.controller()));
    host.show();

    let worker = thread::Builder::new()
        .name("backdrop-supervisor".into())
        .spawn(move || supervisor.supervise(child))
        .map_err(|e| Error::Platform(format!("failed to start supervisor: {e}")))?;

    backdrop_core::log_info!("Overlay 0x{:X} tracking PID {pid}", host.hwnd());
    run_message_pump();
    drop(host);

    let code = worker
        .join()
        .map_err(|_| Error::Platform("supervisor thread panicked".into()))?;

    // Closing the host first cancels the wait; that is a clean exit.
    let code = code.unwrap_or(0);
    backdrop_core::log_info!("Backdrop exiting with code {code}");
    Ok(code)
}

/// Blocks until WM_QUIT, which the host posts when it is destroyed.
fn run_message_pump() {
    let mut msg = MSG::default();

    while unsafe { GetMessageW(&mut msg, None, 0, 0).as_bool() } {
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}
