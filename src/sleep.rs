use std::time::Duration;

use crate::cancel::Canceled;
use crate::sync::blocking::SyncBlocker;
use crate::sync::ParkError;

/// block the current worker until timeout
///
/// returns early with `Err(Canceled)` if the worker is canceled while sleeping.
/// on a plain thread this is an ordinary sleep
pub fn sleep(dur: Duration) -> Result<(), Canceled> {
    if dur.is_zero() {
        return Ok(());
    }

    let sleeper = SyncBlocker::current();
    match sleeper.park(Some(dur)) {
        // the timeout is the normal wake up
        Err(ParkError::Timeout) => Ok(()),
        Err(ParkError::Canceled) => Err(Canceled),
        // nobody else holds this blocker
        Ok(()) => Ok(()),
    }
}
