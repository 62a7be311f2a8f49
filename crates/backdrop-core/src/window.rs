use crate::{Rect, WindowResult};

/// `WS_EX_TOOLWINDOW`: removes a window's taskbar button.
pub const EX_TOOL_WINDOW: u32 = 0x0000_0080;

/// `WS_EX_APPWINDOW`: forces a taskbar button, overriding the tool style.
pub const EX_APP_WINDOW: u32 = 0x0004_0000;

/// Queries and mutations on windows identified by opaque handles.
///
/// Handles are pointer-sized integers so callers don't depend on the
/// platform crate. Every query is advisory: the child may close its
/// window between two calls, so implementations report failures
/// instead of panicking and callers skip the action for the tick.
pub trait WindowQuery: Send + Sync {
    /// Returns the main window of the process `pid`: the first visible,
    /// unowned top-level window it created.
    fn main_window(&self, pid: u32) -> Option<usize>;

    /// Returns whether `hwnd` still identifies a live window.
    fn is_window(&self, hwnd: usize) -> bool;

    /// Returns the window's bounding rectangle in screen coordinates.
    fn window_rect(&self, hwnd: usize) -> WindowResult<Rect>;

    /// Returns the window currently receiving input, from any process.
    fn foreground_window(&self) -> Option<usize>;

    /// Reads the extended style bits.
    fn extended_style(&self, hwnd: usize) -> WindowResult<u32>;

    /// Writes the extended style bits.
    ///
    /// The window manager only honours style changes made while the
    /// window is hidden; use [`WindowQuery::set_tool_window`].
    fn write_extended_style(&self, hwnd: usize, style: u32) -> WindowResult<()>;

    fn hide(&self, hwnd: usize);

    fn show(&self, hwnd: usize);

    /// Asks the OS to move focus to `hwnd`. Focus-stealing prevention may
    /// refuse, in which case `false` is returned.
    fn set_foreground(&self, hwnd: usize) -> bool;

    /// Posts a graceful close request to the window.
    fn request_close(&self, hwnd: usize);

    /// Adds or removes the tool-window style, taking the window in or
    /// out of the taskbar.
    ///
    /// Runs the hide, restyle, show sequence in that order. The window is
    /// shown again even when the style write fails.
    fn set_tool_window(&self, hwnd: usize, add: bool) -> WindowResult<()> {
        let current = self.extended_style(hwnd)?;
        let style = if add {
            (current | EX_TOOL_WINDOW) & !EX_APP_WINDOW
        } else {
            current & !EX_TOOL_WINDOW
        };

        self.hide(hwnd);
        let written = self.write_extended_style(hwnd, style);
        self.show(hwnd);
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeWindows};

    #[test]
    fn tool_window_bracket_runs_in_order() {
        // Arrange
        let fake = FakeWindows::with_child(0x100, Rect::new(0, 0, 640, 480));

        // Act
        fake.set_tool_window(0x100, true).unwrap();

        // Assert
        assert_eq!(
            fake.style_calls(),
            vec![
                Call::ReadStyle(0x100),
                Call::Hide(0x100),
                Call::WriteStyle(0x100, EX_TOOL_WINDOW),
                Call::Show(0x100),
            ]
        );
    }

    #[test]
    fn adding_tool_style_clears_app_window_bit() {
        let fake = FakeWindows::with_child(0x100, Rect::new(0, 0, 640, 480));
        fake.set_style(0x100, EX_APP_WINDOW | 0x8);

        fake.set_tool_window(0x100, true).unwrap();

        assert_eq!(fake.style(0x100), EX_TOOL_WINDOW | 0x8);
    }

    #[test]
    fn removing_tool_style_keeps_other_bits() {
        let fake = FakeWindows::with_child(0x100, Rect::new(0, 0, 640, 480));
        fake.set_style(0x100, EX_TOOL_WINDOW | 0x8);

        fake.set_tool_window(0x100, false).unwrap();

        assert_eq!(fake.style(0x100), 0x8);
    }

    #[test]
    fn failed_style_write_still_shows_window() {
        // Arrange
        let fake = FakeWindows::with_child(0x100, Rect::new(0, 0, 640, 480));
        fake.fail_style_writes();

        // Act
        let result = fake.set_tool_window(0x100, true);

        // Assert
        assert!(result.is_err());
        assert_eq!(fake.style_calls().last(), Some(&Call::Show(0x100)));
    }

    #[test]
    fn unreadable_style_skips_the_bracket() {
        let fake = FakeWindows::default();

        let result = fake.set_tool_window(0x999, true);

        assert!(result.is_err());
        assert_eq!(fake.style_calls(), vec![Call::ReadStyle(0x999)]);
    }
}
