use windows::Win32::Foundation::{HWND, LPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GW_OWNER, GetWindow, GetWindowThreadProcessId, IsWindowVisible,
};
use windows::core::BOOL;

/// Accumulator threaded through `EnumWindows` as its `LPARAM`.
struct MainWindowSearch {
    pid: u32,
    found: Option<HWND>,
}

/// Finds the main window of process `pid`: the first visible, unowned
/// top-level window it created.
///
/// Returns `None` while the process has not shown a window yet, which
/// is normal for the first moments after launch.
pub fn main_window(pid: u32) -> Option<usize> {
    let mut search = MainWindowSearch { pid, found: None };

    // SAFETY: EnumWindows runs synchronously and the callback is the only
    // user of the pointer, so `search` outlives every access through it.
    // Stopping early makes EnumWindows report an error, which carries no
    // information here.
    unsafe {
        let _ = EnumWindows(
            Some(main_window_callback),
            LPARAM(&mut search as *mut MainWindowSearch as isize),
        );
    }

    search.found.map(|hwnd| hwnd.0 as usize)
}

unsafe extern "system" fn main_window_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // SAFETY: lparam is the MainWindowSearch passed in by main_window().
    let search = unsafe { &mut *(lparam.0 as *mut MainWindowSearch) };

    if is_main_window_of(hwnd, search.pid) {
        search.found = Some(hwnd);
        return BOOL(0); // stop
    }

    BOOL(1)
}

fn is_main_window_of(hwnd: HWND, pid: u32) -> bool {
    let mut owner_pid = 0u32;

    // SAFETY: read-only queries on a handle EnumWindows just gave us.
    unsafe {
        GetWindowThreadProcessId(hwnd, Some(&mut owner_pid));
        if owner_pid != pid || !IsWindowVisible(hwnd).as_bool() {
            return false;
        }

        // An owned window is a dialog or tool palette, not the main window.
        match GetWindow(hwnd, GW_OWNER) {
            Ok(owner) => owner.is_invalid(),
            Err(_) => true,
        }
    }
}
