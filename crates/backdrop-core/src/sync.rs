//! One synchronization pass between the child window and the host.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::capture;
use crate::{
    HideCounter, HostCommand, HostSink, OverlayEvent, OverlayMachine, Rect, ScreenCapture,
    WindowQuery,
};

/// The child's main window, discovered lazily from its pid.
///
/// Zero means "not found yet". Written by the sync loop, read by host
/// activation.
#[derive(Debug)]
pub struct ChildWindow {
    pid: u32,
    hwnd: AtomicUsize,
}

impl ChildWindow {
    pub fn new(pid: u32) -> Self {
        Self {
            pid,
            hwnd: AtomicUsize::new(0),
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// The last main window seen, without querying the OS.
    pub fn current(&self) -> Option<usize> {
        match self.hwnd.load(Ordering::Acquire) {
            0 => None,
            hwnd => Some(hwnd),
        }
    }

    /// Returns the main window, looking it up again if the cached handle
    /// was never found or no longer names a live window.
    pub fn resolve(&self, query: &dyn WindowQuery) -> Option<usize> {
        if let Some(hwnd) = self.current() {
            if query.is_window(hwnd) {
                return Some(hwnd);
            }
            crate::log_debug!("main window 0x{hwnd:X} of PID {} is gone", self.pid);
            self.hwnd.store(0, Ordering::Release);
        }

        let hwnd = query.main_window(self.pid)?;
        self.hwnd.store(hwnd, Ordering::Release);
        crate::log_info!("Found main window 0x{hwnd:X} for PID {}", self.pid);
        Some(hwnd)
    }
}

/// What a single tick did. Empty when the child has no window yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub hwnd: Option<usize>,
    pub hid: bool,
    pub repositioned: Option<Rect>,
    pub captured: bool,
}

/// Keeps the host window glued to the child window.
///
/// Owns the [`HideCounter`]; nothing else mutates it.
pub struct SyncLoop {
    query: Arc<dyn WindowQuery>,
    capture: Arc<dyn ScreenCapture>,
    host: Arc<dyn HostSink>,
    window: Arc<ChildWindow>,
    state: Arc<OverlayMachine>,
    hide: HideCounter,
}

impl SyncLoop {
    pub fn new(
        query: Arc<dyn WindowQuery>,
        capture: Arc<dyn ScreenCapture>,
        host: Arc<dyn HostSink>,
        window: Arc<ChildWindow>,
        state: Arc<OverlayMachine>,
        hide: HideCounter,
    ) -> Self {
        Self {
            query,
            capture,
            host,
            window,
            state,
            hide,
        }
    }

    pub fn hide_counter(&self) -> HideCounter {
        self.hide
    }

    /// Runs one pass: taskbar hiding, repositioning, capture fallback.
    ///
    /// Every OS failure skips the affected step for this tick only.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if self.state.is_closed() {
            return report;
        }

        let Some(hwnd) = self.window.resolve(self.query.as_ref()) else {
            crate::log_debug!("tick: PID {} has no main window yet", self.window.pid());
            return report;
        };
        report.hwnd = Some(hwnd);

        if self.hide.take() {
            match self.query.set_tool_window(hwnd, true) {
                Ok(()) => report.hid = true,
                Err(e) => crate::log_debug!("tick: taskbar hide skipped: {e}"),
            }
        }

        match self.query.window_rect(hwnd) {
            Ok(rect) if !rect.is_empty() => {
                self.host.post(HostCommand::Reposition(rect));
                report.repositioned = Some(rect);
            }
            Ok(_) => crate::log_debug!("tick: 0x{hwnd:X} has an empty rect"),
            Err(e) => crate::log_debug!("tick: reposition skipped: {e}"),
        }

        if self.query.foreground_window() == Some(hwnd) {
            report.captured = self.capture_fallback(hwnd);
        }

        report
    }

    /// Snapshots the child into the host background.
    fn capture_fallback(&self, hwnd: usize) -> bool {
        if let Err(state) = self.state.apply(OverlayEvent::CaptureStarted) {
            crate::log_debug!("tick: capture skipped in state {state:?}");
            return false;
        }

        let result = capture::capture_child(self.query.as_ref(), self.capture.as_ref(), hwnd);
        let _ = self.state.apply(OverlayEvent::CaptureFinished);

        match result {
            Ok(surface) => {
                self.host.post(HostCommand::Background(surface));
                true
            }
            Err(e) => {
                crate::log_debug!("tick: capture failed, keeping background: {e}");
                false
            }
        }
    }
}
