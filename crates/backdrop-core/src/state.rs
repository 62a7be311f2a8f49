//! Overlay lifecycle as an explicit state machine.
//!
//! Host callbacks, the sync loop, and the supervisor never act on the
//! host directly based on their own view of the world; they raise
//! events here and check the resulting state.

use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// Child launched, host window not yet shown.
    Starting,
    /// Host shown and tracking the child.
    Supervising,
    /// A screenshot of the child is being taken (transient).
    Capturing,
    /// Child exited or host closed. Absorbing.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEvent {
    Shown,
    CaptureStarted,
    CaptureFinished,
    ChildExited,
    HostClosed,
}

impl OverlayState {
    /// Returns the state after `event`. Events that don't apply to the
    /// current state leave it unchanged.
    pub fn on(self, event: OverlayEvent) -> Self {
        use OverlayEvent as E;
        use OverlayState as S;

        match (self, event) {
            (S::Closed, _) => S::Closed,
            (_, E::ChildExited | E::HostClosed) => S::Closed,
            (S::Starting, E::Shown) => S::Supervising,
            (S::Supervising, E::CaptureStarted) => S::Capturing,
            (S::Capturing, E::CaptureFinished) => S::Supervising,
            (state, _) => state,
        }
    }
}

/// Thread-safe holder for the current [`OverlayState`].
#[derive(Debug)]
pub struct OverlayMachine {
    state: Mutex<OverlayState>,
}

impl OverlayMachine {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(OverlayState::Starting),
        }
    }

    pub fn current(&self) -> OverlayState {
        match self.state.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.current() == OverlayState::Closed
    }

    /// Applies `event`.
    ///
    /// Returns `Ok(new_state)` when the event caused a transition and
    /// `Err(current_state)` when it was ignored.
    pub fn apply(&self, event: OverlayEvent) -> Result<OverlayState, OverlayState> {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let next = state.on(event);
        if next == *state {
            return Err(next);
        }
        crate::log_debug!("overlay {:?} --{:?}--> {:?}", *state, event, next);
        *state = next;
        Ok(next)
    }
}

impl Default for OverlayMachine {
    fn default() -> Self {
        Self::new()
    }
}
