//! Cooperative cancellation shared by the sync loop and the exit wait.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// A one-way cancellation signal.
///
/// Clones share the same state. Once cancelled the token stays
/// cancelled; sleepers blocked in [`CancellationToken::wait_timeout`]
/// are woken immediately rather than at the end of their interval.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token and wakes every waiter. Idempotent.
    pub fn cancel(&self) {
        let (lock, cvar) = &*self.inner;
        let mut cancelled = match lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *cancelled = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        let (lock, _) = &*self.inner;
        match lock.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Sleeps for up to `timeout`, returning early if the token is
    /// cancelled.
    ///
    /// Returns `true` when the token is cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let (lock, cvar) = &*self.inner;
        let mut cancelled = match lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        // Loop guards against spurious wakeups.
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            cancelled = match cvar.wait_timeout(cancelled, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn new_token_is_not_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(!token.wait_timeout(Duration::from_millis(1)));
    }

    #[test]
    fn cancel_is_visible_through_clones_and_sticks() {
        // Arrange
        let token = CancellationToken::new();
        let reader = token.clone();

        // Act
        token.cancel();
        token.cancel();

        // Assert
        assert!(reader.is_cancelled());
        assert!(reader.wait_timeout(Duration::from_secs(10)));
    }

    #[test]
    fn cancel_wakes_a_sleeping_waiter_early() {
        // Arrange
        let token = CancellationToken::new();
        let waiter = token.clone();
        let started = Instant::now();
        let handle = thread::spawn(move || waiter.wait_timeout(Duration::from_secs(30)));

        // Act
        thread::sleep(Duration::from_millis(50));
        token.cancel();
        let woke_cancelled = handle.join().unwrap();

        // Assert
        assert!(woke_cancelled);
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
