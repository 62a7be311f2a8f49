//! The host window: a borderless, colour-keyed popup that sits exactly
//! over the child and stands in for it on the taskbar.
//!
//! The window belongs to the thread that created it. Other threads talk
//! to it through [`HostHandle`], which queues a [`HostCommand`] and wakes
//! the UI thread with a private message.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Once};

use backdrop_core::config::Color;
use backdrop_core::{CaptureSurface, Error, HostCommand, HostEvents, HostSink, WindowResult};
use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, CreateSolidBrush, DIB_RGB_COLORS, DeleteObject, EndPaint, FillRect, HBRUSH,
    InvalidateRect, PAINTSTRUCT, SetDIBitsToDevice,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DI_NORMAL, DefWindowProcW, DestroyIcon, DestroyWindow, DrawIconEx,
    GetClientRect, HICON, ICON_BIG, ICON_SMALL, IMAGE_ICON, IsWindow, LR_LOADFROMFILE,
    LWA_COLORKEY, LoadImageW, PostMessageW, PostQuitMessage, RegisterClassW, SW_SHOW,
    SWP_NOACTIVATE, SWP_NOZORDER, SetLayeredWindowAttributes, SetWindowPos, ShowWindow,
    WA_INACTIVE, WM_ACTIVATE, WM_APP, WM_CLOSE, WM_DESTROY, WM_ERASEBKGND, WM_PAINT, WM_SETICON,
    WNDCLASSW, WS_EX_APPWINDOW, WS_EX_LAYERED, WS_POPUP,
};
use windows::core::{HSTRING, w};

use crate::capture::bitmap_info;

/// Wakes the UI thread to drain the command channel.
const WM_HOST_COMMAND: u32 = WM_APP + 1;

/// Off-screen and empty until the first reposition.
const INITIAL_POS: (i32, i32) = (-100, -100);

static REGISTER_CLASS: Once = Once::new();

fn ensure_class_registered() {
    REGISTER_CLASS.call_once(|| {
        let wc = WNDCLASSW {
            lpfnWndProc: Some(host_wnd_proc),
            lpszClassName: w!("BackdropHost"),
            ..Default::default()
        };
        unsafe {
            RegisterClassW(&wc);
        }
    });
}

/// UI-thread state reachable from the window procedure.
struct HostState {
    /// Shared with every [`HostHandle`]; zeroed once the window is destroyed.
    slot: Arc<AtomicUsize>,
    events: Option<Rc<dyn HostEvents>>,
    commands: Receiver<HostCommand>,
    key_brush: HBRUSH,
    icon: Option<HICON>,
    capture: Option<CaptureSurface>,
}

thread_local! {
    static HOST: RefCell<Option<HostState>> = const { RefCell::new(None) };
}

/// Runs `f` with the event handler, outside any borrow of the host state.
///
/// Handlers call back into user32, which may re-enter the window
/// procedure synchronously.
fn dispatch(f: impl FnOnce(&dyn HostEvents)) {
    let events = HOST.with(|cell| {
        cell.try_borrow()
            .ok()
            .and_then(|state| state.as_ref().and_then(|s| s.events.clone()))
    });
    if let Some(events) = events {
        f(events.as_ref());
    }
}

/// Sends commands to the host window from any thread.
#[derive(Debug, Clone)]
pub struct HostHandle {
    slot: Arc<AtomicUsize>,
    sender: Sender<HostCommand>,
}

impl HostHandle {
    /// Whether the host window still exists. Once it is destroyed its
    /// handle value may be reused by another window, so nothing more is
    /// posted to it.
    pub fn is_attached(&self) -> bool {
        self.slot.load(Ordering::Acquire) != 0
    }
}

impl HostSink for HostHandle {
    fn post(&self, command: HostCommand) {
        let hwnd = self.slot.load(Ordering::Acquire);
        if hwnd == 0 || self.sender.send(command).is_err() {
            // Host is gone; nothing left to update.
            return;
        }
        // SAFETY: PostMessageW is thread-safe. The slot is cleared in
        // WM_DESTROY, so a destroyed host is only reachable in the
        // instant between that load and this call, where the post fails.
        unsafe {
            let _ = PostMessageW(
                Some(HWND(hwnd as *mut _)),
                WM_HOST_COMMAND,
                WPARAM(0),
                LPARAM(0),
            );
        }
    }
}

/// The overlay window. Must be created, used, and dropped on one thread,
/// which also runs the message pump.
pub struct HostWindow {
    hwnd: HWND,
}

impl HostWindow {
    /// Creates the hidden host window.
    ///
    /// `key` becomes both the fill colour and the transparency key, so
    /// anything not covered by the icon or a capture is see-through.
    pub fn create(
        title: &str,
        key: Color,
        icon: Option<&Path>,
    ) -> WindowResult<(Self, HostHandle)> {
        ensure_class_registered();

        let title = HSTRING::from(title);
        let hwnd = unsafe {
            CreateWindowExW(
                WS_EX_LAYERED | WS_EX_APPWINDOW,
                w!("BackdropHost"),
                &title,
                WS_POPUP,
                INITIAL_POS.0,
                INITIAL_POS.1,
                0,
                0,
                None,
                None,
                None,
                None,
            )
        }
        .map_err(|e| Error::Platform(format!("failed to create host window: {e}")))?;

        let colorref = COLORREF(key.to_colorref());
        unsafe { SetLayeredWindowAttributes(hwnd, colorref, 255, LWA_COLORKEY) }
            .map_err(|e| Error::Platform(format!("failed to set colour key: {e}")))?;

        let icon = icon.and_then(load_icon);
        if let Some(icon) = icon {
            for size in [ICON_BIG, ICON_SMALL] {
                unsafe {
                    let _ = PostMessageW(
                        Some(hwnd),
                        WM_SETICON,
                        WPARAM(size as usize),
                        LPARAM(icon.0 as isize),
                    );
                }
            }
        }

        let (sender, commands) = mpsc::channel();
        let slot = Arc::new(AtomicUsize::new(hwnd.0 as usize));
        HOST.with(|cell| {
            *cell.borrow_mut() = Some(HostState {
                slot: slot.clone(),
                events: None,
                commands,
                // SAFETY: plain GDI allocation, released in Drop.
                key_brush: unsafe { CreateSolidBrush(colorref) },
                icon,
                capture: None,
            });
        });

        let handle = HostHandle { slot, sender };
        Ok((Self { hwnd }, handle))
    }

    /// Installs the handler for activation and close events.
    pub fn set_events(&self, events: Rc<dyn HostEvents>) {
        HOST.with(|cell| {
            if let Some(state) = cell.borrow_mut().as_mut() {
                state.events = Some(events);
            }
        });
    }

    /// Shows the window and raises `on_shown`.
    pub fn show(&self) {
        unsafe {
            let _ = ShowWindow(self.hwnd, SW_SHOW);
        }
        dispatch(|events| events.on_shown());
    }

    pub fn hwnd(&self) -> usize {
        self.hwnd.0 as usize
    }
}

impl Drop for HostWindow {
    fn drop(&mut self) {
        unsafe {
            if IsWindow(Some(self.hwnd)).as_bool() {
                let _ = DestroyWindow(self.hwnd);
            }
        }
        if let Some(state) = HOST.with(|cell| cell.borrow_mut().take()) {
            state.slot.store(0, Ordering::Release);
            unsafe {
                let _ = DeleteObject(state.key_brush.into());
                if let Some(icon) = state.icon {
                    let _ = DestroyIcon(icon);
                }
            }
        }
    }
}

fn load_icon(path: &Path) -> Option<HICON> {
    let wide = HSTRING::from(path);
    // SAFETY: LoadImageW reads the file; a bad or missing file is an Err.
    match unsafe { LoadImageW(None, &wide, IMAGE_ICON, 0, 0, LR_LOADFROMFILE) } {
        Ok(handle) => Some(HICON(handle.0)),
        Err(e) => {
            backdrop_core::log_warn!("could not load icon {}: {e}", path.display());
            None
        }
    }
}

unsafe extern "system" fn host_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_HOST_COMMAND => {
            drain_commands(hwnd);
            LRESULT(0)
        }
        WM_ACTIVATE => {
            if (wparam.0 & 0xFFFF) as u32 != WA_INACTIVE {
                dispatch(|events| events.on_activated());
            }
            LRESULT(0)
        }
        WM_CLOSE => {
            dispatch(|events| events.on_closed());
            unsafe {
                let _ = DestroyWindow(hwnd);
            }
            LRESULT(0)
        }
        WM_DESTROY => {
            detach();
            unsafe { PostQuitMessage(0) };
            LRESULT(0)
        }
        // Everything is painted in WM_PAINT.
        WM_ERASEBKGND => LRESULT(1),
        WM_PAINT => {
            paint(hwnd);
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

/// Stops handles from posting to this window's handle value.
fn detach() {
    HOST.with(|cell| {
        if let Ok(state) = cell.try_borrow()
            && let Some(state) = state.as_ref()
        {
            state.slot.store(0, Ordering::Release);
        }
    });
}

fn drain_commands(hwnd: HWND) {
    let pending: Vec<HostCommand> = HOST.with(|cell| {
        cell.try_borrow()
            .ok()
            .and_then(|state| state.as_ref().map(|s| s.commands.try_iter().collect()))
            .unwrap_or_default()
    });

    for command in pending {
        match command {
            HostCommand::Reposition(rect) => unsafe {
                let _ = SetWindowPos(
                    hwnd,
                    None,
                    rect.x,
                    rect.y,
                    rect.width,
                    rect.height,
                    SWP_NOZORDER | SWP_NOACTIVATE,
                );
            },
            HostCommand::Background(surface) => {
                HOST.with(|cell| {
                    if let Ok(mut state) = cell.try_borrow_mut()
                        && let Some(state) = state.as_mut()
                    {
                        state.capture = Some(surface);
                    }
                });
                unsafe {
                    let _ = InvalidateRect(Some(hwnd), None, false);
                }
            }
            HostCommand::Close => unsafe {
                let _ = PostMessageW(Some(hwnd), WM_CLOSE, WPARAM(0), LPARAM(0));
            },
        }
    }
}

/// Fills with the colour key, then draws the capture at actual size or,
/// before any capture, the icon stretched over the whole client area.
fn paint(hwnd: HWND) {
    let mut ps = PAINTSTRUCT::default();
    let mut client = RECT::default();

    unsafe {
        let hdc = BeginPaint(hwnd, &mut ps);
        let _ = GetClientRect(hwnd, &mut client);

        HOST.with(|cell| {
            let Ok(state) = cell.try_borrow() else {
                return;
            };
            let Some(state) = state.as_ref() else {
                return;
            };

            FillRect(hdc, &client, state.key_brush);

            if let Some(surface) = &state.capture {
                let bmi = bitmap_info(surface.width, surface.height);
                SetDIBitsToDevice(
                    hdc,
                    0,
                    0,
                    surface.width as u32,
                    surface.height as u32,
                    0,
                    0,
                    0,
                    surface.height as u32,
                    surface.pixels.as_ptr().cast(),
                    &bmi,
                    DIB_RGB_COLORS,
                );
            } else if let Some(icon) = state.icon {
                let _ = DrawIconEx(
                    hdc,
                    0,
                    0,
                    icon,
                    client.right,
                    client.bottom,
                    0,
                    None,
                    DI_NORMAL,
                );
            }
        });

        let _ = EndPaint(hwnd, &ps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_detaches_when_host_is_destroyed() {
        // Arrange
        let (host, handle) = HostWindow::create("backdrop-test", Color::TAN, None).unwrap();
        assert!(handle.is_attached());

        // Act
        drop(host);
        handle.post(HostCommand::Close);

        // Assert
        assert!(!handle.is_attached());
    }

    #[test]
    fn close_command_destroys_host_and_detaches_handle() {
        // Arrange
        let (host, handle) = HostWindow::create("backdrop-test", Color::TAN, None).unwrap();
        let hwnd = host.hwnd;

        // Act
        handle.post(HostCommand::Close);
        let mut msg = windows::Win32::UI::WindowsAndMessaging::MSG::default();
        unsafe {
            use windows::Win32::UI::WindowsAndMessaging::{
                DispatchMessageW, PM_REMOVE, PeekMessageW,
            };
            while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                DispatchMessageW(&msg);
            }
        }

        // Assert
        assert!(!handle.is_attached());
        assert!(!unsafe { IsWindow(Some(hwnd)) }.as_bool());
        drop(host);
    }
}
