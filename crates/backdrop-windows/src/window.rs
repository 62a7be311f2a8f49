use backdrop_core::{Error, Rect, WindowQuery, WindowResult};

use windows::Win32::Foundation::{
    GetLastError, HWND, LPARAM, RECT, SetLastError, WIN32_ERROR, WPARAM,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GWL_EXSTYLE, GetForegroundWindow, GetWindowLongPtrW, GetWindowRect, IsWindow, PostMessageW,
    SW_HIDE, SW_SHOW, SetForegroundWindow, SetWindowLongPtrW, ShowWindow, WM_CLOSE,
};

use crate::enumerate;

/// Converts a raw handle value back into an `HWND`.
pub(crate) fn hwnd(handle: usize) -> HWND {
    HWND(handle as *mut _)
}

/// [`WindowQuery`] backed by user32.
///
/// Stateless: every call goes straight to the OS, so a handle that died
/// since the last tick shows up as an error rather than stale data.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32Windows;

impl WindowQuery for Win32Windows {
    fn main_window(&self, pid: u32) -> Option<usize> {
        enumerate::main_window(pid)
    }

    fn is_window(&self, handle: usize) -> bool {
        // SAFETY: IsWindow accepts any value, including dead handles.
        unsafe { IsWindow(Some(hwnd(handle))).as_bool() }
    }

    fn window_rect(&self, handle: usize) -> WindowResult<Rect> {
        let mut rect = RECT::default();

        // SAFETY: GetWindowRect fails cleanly on invalid handles.
        unsafe { GetWindowRect(hwnd(handle), &mut rect) }.map_err(|e| Error::window(handle, e))?;

        Ok(Rect::from_edges(rect.left, rect.top, rect.right, rect.bottom))
    }

    fn foreground_window(&self) -> Option<usize> {
        // SAFETY: simple query, null when no window has focus.
        let foreground = unsafe { GetForegroundWindow() };
        (!foreground.is_invalid()).then_some(foreground.0 as usize)
    }

    fn extended_style(&self, handle: usize) -> WindowResult<u32> {
        if !self.is_window(handle) {
            return Err(Error::window(handle, "invalid window handle"));
        }

        // SAFETY: the handle was valid a moment ago; if it died since,
        // GetWindowLongPtrW returns 0 rather than faulting.
        Ok(unsafe { GetWindowLongPtrW(hwnd(handle), GWL_EXSTYLE) } as u32)
    }

    fn write_extended_style(&self, handle: usize, style: u32) -> WindowResult<()> {
        // SetWindowLongPtrW returns the previous value, so 0 is only a
        // failure when the thread's last-error code says so.
        unsafe {
            SetLastError(WIN32_ERROR(0));
            let previous = SetWindowLongPtrW(hwnd(handle), GWL_EXSTYLE, style as isize);
            let code = GetLastError();
            if previous == 0 && code.0 != 0 {
                return Err(Error::window(
                    handle,
                    format!("SetWindowLongPtrW failed (error {})", code.0),
                ));
            }
        }

        backdrop_core::log_debug!("exstyle 0x{handle:X} <- 0x{style:08X}");
        Ok(())
    }

    fn hide(&self, handle: usize) {
        // SAFETY: ShowWindow ignores invalid handles.
        unsafe {
            let _ = ShowWindow(hwnd(handle), SW_HIDE);
        }
    }

    fn show(&self, handle: usize) {
        unsafe {
            let _ = ShowWindow(hwnd(handle), SW_SHOW);
        }
    }

    fn set_foreground(&self, handle: usize) -> bool {
        // SAFETY: may be refused by focus-stealing prevention, reported
        // through the return value.
        unsafe { SetForegroundWindow(hwnd(handle)).as_bool() }
    }

    fn request_close(&self, handle: usize) {
        // SAFETY: posting WM_CLOSE is the same request the user's close
        // button makes; the child decides what to do with it.
        let posted = unsafe { PostMessageW(Some(hwnd(handle)), WM_CLOSE, WPARAM(0), LPARAM(0)) };
        if let Err(e) = posted {
            backdrop_core::log_warn!("WM_CLOSE to 0x{handle:X} failed: {e}");
        }
    }
}
