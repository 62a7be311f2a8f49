/// Default number of ticks that force the child out of the taskbar.
pub const DEFAULT_HIDE_TICKS: u32 = 5;

/// Countdown of ticks that should still apply the tool-window style.
///
/// Some applications re-add their taskbar button shortly after startup,
/// so the style is re-applied on the first few ticks only. After that
/// the style is assumed to stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HideCounter {
    remaining: u32,
}

impl HideCounter {
    pub fn new(ticks: u32) -> Self {
        Self { remaining: ticks }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Consumes one tick. Returns `true` if the hide action should run.
    pub fn take(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

impl Default for HideCounter {
    fn default() -> Self {
        Self::new(DEFAULT_HIDE_TICKS)
    }
}
