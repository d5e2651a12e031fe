use std::cell::RefCell;
use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::sync::blocking::SyncBlocker;

/// returned from a suspension point once the worker has been canceled
///
/// this is the normal termination signal of a worker, not a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canceled;

impl fmt::Display for Canceled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("worker canceled")
    }
}

impl Error for Canceled {}

// each worker has it's own Cancel data
#[derive(Debug, Default)]
pub struct Cancel {
    // first bit is set when the worker need to stop
    state: AtomicUsize,
    // the blocker the worker is currently parked on, if any
    blocker: Mutex<Option<Arc<SyncBlocker>>>,
}

impl Cancel {
    pub fn new() -> Self {
        Cancel::default()
    }

    /// judge if the cancel flag is set
    #[inline]
    pub fn is_canceled(&self) -> bool {
        self.state.load(Ordering::SeqCst) & 1 == 1
    }

    /// return `Err(Canceled)` if the cancel flag is set
    #[inline]
    pub fn check(&self) -> Result<(), Canceled> {
        if self.is_canceled() {
            return Err(Canceled);
        }
        Ok(())
    }

    /// set the cancel flag and wake the worker if it is parked
    ///
    /// calling it more than once is harmless
    pub fn cancel(&self) {
        self.state.fetch_or(1, Ordering::SeqCst);
        if let Some(blocker) = self.blocker.lock().take() {
            blocker.interrupt();
        }
    }

    // register the blocker before parking on it
    // the caller must re-check `is_canceled` after this
    pub(crate) fn set_blocker(&self, blocker: Arc<SyncBlocker>) {
        *self.blocker.lock() = Some(blocker);
    }

    // clear the blocker after the park returned
    pub(crate) fn clear(&self) {
        self.blocker.lock().take();
    }
}

thread_local! {
    static CURRENT: RefCell<Option<Arc<Cancel>>> = const { RefCell::new(None) };
}

/// get the cancel data of the running worker
///
/// plain threads have none, so their blocking calls are not cancelable
pub fn current_cancel_data() -> Option<Arc<Cancel>> {
    CURRENT.with(|c| c.borrow().clone())
}

/// check the cancel flag of the running worker
///
/// always `Ok` on a plain thread
pub fn check_cancel() -> Result<(), Canceled> {
    CURRENT.with(|c| match *c.borrow() {
        Some(ref cancel) => cancel.check(),
        None => Ok(()),
    })
}

/// install `cancel` as the current thread's cancel data
///
/// the previous value is restored when the guard is dropped
pub fn enter(cancel: Arc<Cancel>) -> CancelGuard {
    let prev = CURRENT.with(|c| c.borrow_mut().replace(cancel));
    CancelGuard { prev }
}

#[must_use]
pub struct CancelGuard {
    prev: Option<Arc<Cancel>>,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        let prev = self.prev.take();
        CURRENT.with(|c| *c.borrow_mut() = prev);
    }
}
