use parking_lot::{Condvar, Mutex};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::cancel::{current_cancel_data, Canceled};

/// why a park returned without being unparked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParkError {
    Canceled,
    Timeout,
}

#[derive(Debug)]
#[allow(clippy::mutex_atomic)]
pub struct ThreadPark {
    lock: Mutex<bool>,
    cvar: Condvar,
}

#[allow(clippy::mutex_atomic)]
impl ThreadPark {
    fn new() -> Self {
        ThreadPark {
            lock: Mutex::new(false),
            cvar: Condvar::new(),
        }
    }

    fn park_timeout(&self, dur: Option<Duration>) -> Result<(), ParkError> {
        let mut result = Ok(());
        let mut guard = self.lock.lock();
        while !*guard && result.is_ok() {
            match dur {
                None => self.cvar.wait(&mut guard),
                Some(t) => {
                    let t = self.cvar.wait_for(&mut guard, t);
                    if t.timed_out() && !*guard {
                        result = Err(ParkError::Timeout);
                    }
                }
            };
        }
        // must clear the status
        *guard = false;
        result
    }

    fn unpark(&self) {
        let mut guard = self.lock.lock();
        if !*guard {
            *guard = true;
            self.cvar.notify_one();
        }
    }
}

/// a blocker type with async release support
///
/// a fresh instance is created for every blocking call. the `unparked` flag
/// tells a real wakeup (a `post`) apart from a cancel wakeup, and the
/// `release` flag lets a canceled waiter hand back a permit that raced in
#[derive(Debug)]
pub struct SyncBlocker {
    // flag to tell unparked
    unparked: AtomicBool,
    // used to register release action
    release: AtomicBool,
    parker: ThreadPark,
}

impl SyncBlocker {
    pub fn current() -> Arc<Self> {
        Arc::new(SyncBlocker {
            unparked: AtomicBool::new(false),
            release: AtomicBool::new(false),
            parker: ThreadPark::new(),
        })
    }

    #[inline]
    pub fn is_unparked(&self) -> bool {
        self.unparked.load(Ordering::SeqCst)
    }

    // set the Flag for the release action
    #[inline]
    pub fn set_release(&self) {
        self.release.store(true, Ordering::SeqCst);
    }

    // take the release Flag
    #[inline]
    pub fn take_release(&self) -> bool {
        self.release.swap(false, Ordering::SeqCst)
    }

    /// park the calling thread until `unpark`, the timeout, or a cancel
    ///
    /// when the calling thread runs as a worker its cancel data is armed with
    /// this blocker for the duration of the park
    pub fn park(self: &Arc<Self>, timeout: Option<Duration>) -> Result<(), ParkError> {
        let cancel = current_cancel_data();
        if let Some(ref cancel) = cancel {
            cancel.set_blocker(self.clone());
            // re-check the cancel status
            if cancel.is_canceled() {
                cancel.clear();
                return Err(ParkError::Canceled);
            }
        }

        let ret = self.parker.park_timeout(timeout);

        if let Some(ref cancel) = cancel {
            cancel.clear();
            if ret.is_ok() && !self.is_unparked() {
                // only the cancel path wakes us without the flag
                return Err(ParkError::Canceled);
            }
        }
        ret
    }

    /// wake the thread parked on this blocker as a real wakeup
    #[inline]
    pub fn unpark(&self) {
        // the flag must be visible before the parked thread can run
        self.unparked.store(true, Ordering::SeqCst);
        self.parker.unpark();
    }

    /// wake the parked thread without marking it unparked
    #[inline]
    pub(crate) fn interrupt(&self) {
        self.parker.unpark();
    }
}

impl From<ParkError> for Canceled {
    fn from(_: ParkError) -> Self {
        Canceled
    }
}
