use windows::Win32::UI::HiDpi::{
    DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, SetProcessDpiAwarenessContext,
};

/// Declares the process per-monitor DPI aware (V2).
///
/// The host must cover the child pixel for pixel. A DPI-unaware process
/// gets virtualised coordinates from `GetWindowRect`, and the overlay
/// drifts on any monitor not at 100% scale.
///
/// Call once, before the host window is created.
pub fn enable_dpi_awareness() {
    // SAFETY: safe to call once at startup. Fails harmlessly when a
    // manifest already set the awareness.
    unsafe {
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }
}
