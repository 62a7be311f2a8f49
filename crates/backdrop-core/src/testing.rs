//! In-memory fakes for the window, capture, and host seams.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::{
    CaptureSurface, Error, HostCommand, HostSink, Rect, ScreenCapture, WindowQuery, WindowResult,
};

/// Pid the fakes assign to the child unless a test adopts a real one.
pub const CHILD_PID: u32 = 4242;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    MainWindow(u32),
    WindowRect(usize),
    Foreground,
    ReadStyle(usize),
    WriteStyle(usize, u32),
    Hide(usize),
    Show(usize),
    SetForeground(usize),
    RequestClose(usize),
}

#[derive(Debug, Clone, Copy)]
struct FakeWindow {
    rect: Rect,
    style: u32,
}

#[derive(Default)]
struct FakeState {
    windows: HashMap<usize, FakeWindow>,
    owners: HashMap<u32, usize>,
    foreground: Option<usize>,
    calls: Vec<Call>,
    fail_style_writes: bool,
}

/// A scriptable desktop that records every call made against it.
#[derive(Default)]
pub struct FakeWindows {
    state: Mutex<FakeState>,
}

impl FakeWindows {
    /// A desktop holding one window `hwnd` owned by [`CHILD_PID`].
    pub fn with_child(hwnd: usize, rect: Rect) -> Self {
        let fake = Self::default();
        fake.add_window(CHILD_PID, hwnd, rect);
        fake
    }

    pub fn add_window(&self, pid: u32, hwnd: usize, rect: Rect) {
        let mut state = self.state.lock().unwrap();
        state.windows.insert(hwnd, FakeWindow { rect, style: 0 });
        state.owners.insert(pid, hwnd);
    }

    /// Re-assigns the window owned by [`CHILD_PID`] to a real pid.
    pub fn adopt(&self, pid: u32) {
        let mut state = self.state.lock().unwrap();
        if let Some(hwnd) = state.owners.remove(&CHILD_PID) {
            state.owners.insert(pid, hwnd);
        }
    }

    pub fn destroy(&self, hwnd: usize) {
        let mut state = self.state.lock().unwrap();
        state.windows.remove(&hwnd);
        state.owners.retain(|_, h| *h != hwnd);
    }

    pub fn move_window(&self, hwnd: usize, rect: Rect) {
        if let Some(w) = self.state.lock().unwrap().windows.get_mut(&hwnd) {
            w.rect = rect;
        }
    }

    pub fn set_foreground_window(&self, hwnd: Option<usize>) {
        self.state.lock().unwrap().foreground = hwnd;
    }

    pub fn set_style(&self, hwnd: usize, style: u32) {
        if let Some(w) = self.state.lock().unwrap().windows.get_mut(&hwnd) {
            w.style = style;
        }
    }

    pub fn style(&self, hwnd: usize) -> u32 {
        self.state.lock().unwrap().windows[&hwnd].style
    }

    pub fn fail_style_writes(&self) {
        self.state.lock().unwrap().fail_style_writes = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Only the calls that make up the tool-window bracket.
    pub fn style_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| {
                matches!(
                    c,
                    Call::ReadStyle(_) | Call::WriteStyle(..) | Call::Hide(_) | Call::Show(_)
                )
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl WindowQuery for FakeWindows {
    fn main_window(&self, pid: u32) -> Option<usize> {
        self.record(Call::MainWindow(pid));
        self.state.lock().unwrap().owners.get(&pid).copied()
    }

    fn is_window(&self, hwnd: usize) -> bool {
        self.state.lock().unwrap().windows.contains_key(&hwnd)
    }

    fn window_rect(&self, hwnd: usize) -> WindowResult<Rect> {
        self.record(Call::WindowRect(hwnd));
        let state = self.state.lock().unwrap();
        state
            .windows
            .get(&hwnd)
            .map(|w| w.rect)
            .ok_or_else(|| Error::window(hwnd, "invalid window handle"))
    }

    fn foreground_window(&self) -> Option<usize> {
        self.record(Call::Foreground);
        self.state.lock().unwrap().foreground
    }

    fn extended_style(&self, hwnd: usize) -> WindowResult<u32> {
        self.record(Call::ReadStyle(hwnd));
        let state = self.state.lock().unwrap();
        state
            .windows
            .get(&hwnd)
            .map(|w| w.style)
            .ok_or_else(|| Error::window(hwnd, "invalid window handle"))
    }

    fn write_extended_style(&self, hwnd: usize, style: u32) -> WindowResult<()> {
        self.record(Call::WriteStyle(hwnd, style));
        let mut state = self.state.lock().unwrap();
        if state.fail_style_writes {
            return Err(Error::window(hwnd, "access denied"));
        }
        match state.windows.get_mut(&hwnd) {
            Some(w) => {
                w.style = style;
                Ok(())
            }
            None => Err(Error::window(hwnd, "invalid window handle")),
        }
    }

    fn hide(&self, hwnd: usize) {
        self.record(Call::Hide(hwnd));
    }

    fn show(&self, hwnd: usize) {
        self.record(Call::Show(hwnd));
    }

    fn set_foreground(&self, hwnd: usize) -> bool {
        self.record(Call::SetForeground(hwnd));
        self.is_window(hwnd)
    }

    fn request_close(&self, hwnd: usize) {
        self.record(Call::RequestClose(hwnd));
    }
}

/// Produces blank surfaces and records the regions it was asked for.
#[derive(Default)]
pub struct FakeCapture {
    regions: Mutex<Vec<Rect>>,
    forced_size: Option<(i32, i32)>,
}

impl FakeCapture {
    /// A capture that ignores the region and returns a fixed-size surface.
    pub fn returning_size(width: i32, height: i32) -> Self {
        Self {
            regions: Mutex::default(),
            forced_size: Some((width, height)),
        }
    }

    pub fn regions(&self) -> Vec<Rect> {
        self.regions.lock().unwrap().clone()
    }
}

impl ScreenCapture for FakeCapture {
    fn capture(&self, region: Rect) -> WindowResult<CaptureSurface> {
        self.regions.lock().unwrap().push(region);
        let rect = match self.forced_size {
            Some((w, h)) => Rect::new(region.x, region.y, w, h),
            None => region,
        };
        Ok(CaptureSurface::blank(rect))
    }
}

/// Records host commands instead of touching a window.
#[derive(Default)]
pub struct RecordingHost {
    commands: Mutex<Vec<HostCommand>>,
}

impl RecordingHost {
    pub fn commands(&self) -> Vec<HostCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// The rect the host would be showing after applying every command.
    pub fn last_rect(&self) -> Option<Rect> {
        self.commands().iter().rev().find_map(|c| match c {
            HostCommand::Reposition(rect) => Some(*rect),
            _ => None,
        })
    }

    pub fn backgrounds(&self) -> Vec<CaptureSurface> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                HostCommand::Background(surface) => Some(surface),
                _ => None,
            })
            .collect()
    }

    pub fn closed(&self) -> bool {
        self.commands().contains(&HostCommand::Close)
    }
}

impl HostSink for RecordingHost {
    fn post(&self, command: HostCommand) {
        self.commands.lock().unwrap().push(command);
    }
}
