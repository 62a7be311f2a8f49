use std::thread;
use std::time::Duration;

use crate::CancellationToken;

/// Spawns a thread that runs `action` every `interval` until `token` is
/// cancelled.
///
/// The first run happens one interval after spawning; callers that want
/// an immediate run do it themselves before spawning. Cancellation
/// wakes the sleeping thread, so shutdown never waits out an interval.
/// An `action` that is already running is not interrupted.
pub fn spawn_recurring<F>(
    interval: Duration,
    token: CancellationToken,
    mut action: F,
) -> thread::JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    thread::spawn(move || {
        while !token.wait_timeout(interval) {
            action();
        }
    })
}
