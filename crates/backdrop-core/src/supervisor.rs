//! Child process lifecycle and the supervision session around it.

use std::process::{Child, Command, ExitStatus};
use std::sync::Arc;
use std::time::Duration;

use crate::config::SyncConfig;
use crate::scheduler;
use crate::{
    CancellationToken, ChildWindow, Error, HideCounter, HostCommand, HostEvents, HostSink,
    LaunchTarget, OverlayEvent, OverlayMachine, ScreenCapture, SyncLoop, WindowQuery,
    WindowResult,
};

/// How often the exit wait re-checks the child and the token.
pub const WAIT_QUANTUM: Duration = Duration::from_millis(50);

/// The supervised child process.
///
/// The exit code is recorded once, the first time termination is
/// observed. Dropping the value releases the process handle without
/// killing the child.
#[derive(Debug)]
pub struct ChildProcess {
    child: Child,
    target: LaunchTarget,
    exit_code: Option<i32>,
}

impl ChildProcess {
    /// Starts `target` with inherited stdio.
    pub fn launch(target: &LaunchTarget) -> WindowResult<Self> {
        let mut command = Command::new(&target.program);
        append_args(&mut command, &target.args);

        let child = command.spawn().map_err(|source| Error::Launch {
            program: target.program.clone(),
            source,
        })?;
        crate::log_info!("Launched `{target}` (PID: {})", child.id());

        Ok(Self {
            child,
            target: target.clone(),
            exit_code: None,
        })
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn target(&self) -> &LaunchTarget {
        &self.target
    }

    /// The recorded exit code, `None` while the child is running or when
    /// a wait was cancelled before exit was observed.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Checks without blocking whether the child has terminated,
    /// recording its exit code if so.
    pub fn has_exited(&mut self) -> bool {
        if self.exit_code.is_some() {
            return true;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                self.record_exit(status);
                true
            }
            Ok(None) => false,
            Err(e) => {
                crate::log_warn!("could not query PID {}: {e}", self.pid());
                false
            }
        }
    }

    /// Blocks until the child exits or `token` is cancelled.
    ///
    /// Returns the exit code, or `None` on cancellation.
    pub fn wait_for_exit(&mut self, token: &CancellationToken) -> Option<i32> {
        loop {
            if token.is_cancelled() {
                return None;
            }
            if self.has_exited() {
                return self.exit_code;
            }
            if token.wait_timeout(WAIT_QUANTUM) {
                return None;
            }
        }
    }

    fn record_exit(&mut self, status: ExitStatus) {
        // Signal-terminated processes have no code.
        let code = status.code().unwrap_or(-1);
        crate::log_info!("PID {} exited with code {code}", self.pid());
        self.exit_code = Some(code);
    }
}

/// Passes the argument string through untouched so quoting written by
/// the user reaches the child exactly as typed.
#[cfg(windows)]
fn append_args(command: &mut Command, args: &str) {
    use std::os::windows::process::CommandExt;

    if !args.is_empty() {
        command.raw_arg(args);
    }
}

#[cfg(not(windows))]
fn append_args(command: &mut Command, args: &str) {
    command.args(args.split_whitespace());
}

/// Raises the child's main window. A no-op while the child has none.
///
/// The handle is re-validated first: the child may have replaced its
/// main window since the last tick.
pub fn activate(query: &dyn WindowQuery, window: &ChildWindow) -> bool {
    let Some(hwnd) = window.resolve(query) else {
        return false;
    };
    let granted = query.set_foreground(hwnd);
    if !granted {
        crate::log_debug!("foreground request for 0x{hwnd:X} was refused");
    }
    granted
}

/// Owns one supervision session: the sync loop, the exit wait, and the
/// state shared with the host's event handler.
pub struct Supervisor {
    config: SyncConfig,
    query: Arc<dyn WindowQuery>,
    capture: Arc<dyn ScreenCapture>,
    host: Arc<dyn HostSink>,
    window: Arc<ChildWindow>,
    state: Arc<OverlayMachine>,
    token: CancellationToken,
}

impl Supervisor {
    pub fn new(
        config: SyncConfig,
        pid: u32,
        query: Arc<dyn WindowQuery>,
        capture: Arc<dyn ScreenCapture>,
        host: Arc<dyn HostSink>,
    ) -> Self {
        Self {
            config,
            query,
            capture,
            host,
            window: Arc::new(ChildWindow::new(pid)),
            state: Arc::new(OverlayMachine::new()),
            token: CancellationToken::new(),
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn state(&self) -> Arc<OverlayMachine> {
        self.state.clone()
    }

    pub fn window(&self) -> Arc<ChildWindow> {
        self.window.clone()
    }

    /// The handler the host window should call from its UI thread.
    pub fn controller(&self) -> OverlayController {
        OverlayController {
            query: self.query.clone(),
            window: self.window.clone(),
            state: self.state.clone(),
            token: self.token.clone(),
        }
    }

    /// Supervises `child` until it exits or the session is cancelled,
    /// then tells the host to close.
    ///
    /// Blocks; run it off the UI thread. Returns the child's exit code,
    /// or `None` if supervision was cancelled first.
    pub fn supervise(self, mut child: ChildProcess) -> Option<i32> {
        let code = self.watch(&mut child);

        self.token.cancel();
        let _ = self.state.apply(OverlayEvent::ChildExited);
        self.host.post(HostCommand::Close);
        code
    }

    fn watch(&self, child: &mut ChildProcess) -> Option<i32> {
        // No readiness signal exists; give the child a moment to create
        // its window before the first tick.
        if self.token.wait_timeout(self.config.startup_delay()) {
            return None;
        }
        if child.has_exited() {
            crate::log_info!("PID {} exited before the first tick", child.pid());
            return child.exit_code();
        }

        let mut sync = SyncLoop::new(
            self.query.clone(),
            self.capture.clone(),
            self.host.clone(),
            self.window.clone(),
            self.state.clone(),
            HideCounter::new(self.config.hide_ticks),
        );
        let report = sync.tick();
        crate::log_debug!("initial tick: {report:?}");

        let interval = self.config.interval();
        let ticker = scheduler::spawn_recurring(interval, self.token.clone(), move || {
            let report = sync.tick();
            crate::log_debug!("tick: {report:?}");
        });

        let code = child.wait_for_exit(&self.token);
        self.token.cancel();
        let _ = ticker.join();
        code
    }
}

/// Reacts to host window events. Cheap to clone.
#[derive(Clone)]
pub struct OverlayController {
    query: Arc<dyn WindowQuery>,
    window: Arc<ChildWindow>,
    state: Arc<OverlayMachine>,
    token: CancellationToken,
}

impl HostEvents for OverlayController {
    fn on_shown(&self) {
        let _ = self.state.apply(OverlayEvent::Shown);
    }

    fn on_activated(&self) {
        if self.state.is_closed() {
            return;
        }
        activate(self.query.as_ref(), &self.window);
    }

    fn on_closed(&self) {
        // Only a user-initiated close needs to take the child down; when
        // the child exited first the state is already closed.
        if self.state.apply(OverlayEvent::HostClosed).is_ok()
            && let Some(hwnd) = self.window.resolve(self.query.as_ref())
        {
            crate::log_info!("Host closed, asking 0x{hwnd:X} to close");
            self.query.request_close(hwnd);
        }
        self.token.cancel();
    }
}
