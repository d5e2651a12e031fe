use std::fmt;
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;

use super::blocking::SyncBlocker;
use crate::cancel::Canceled;
use crossbeam::queue::SegQueue;

/// Semaphore primitive
///
/// semaphores allow threads to synchronize their actions.
///
/// A semaphore is an integer whose value is never allowed to fall below
/// zero.  Two operations can be performed on semaphores: increment the
/// semaphore value by one (post()); and decrement the semaphore
/// value by one (wait()).  If the value of a semaphore is currently
/// zero, then a wait() operation will block until the value becomes
/// greater than zero.
///
/// A worker blocked in `wait()` returns `Err(Canceled)` as soon as its
/// cancel data is set; in that case no resource is taken from the semaphore.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
/// use semsim::sync::Semaphore;
///
/// let sem = Arc::new(Semaphore::new(0));
/// let sem2 = sem.clone();
///
/// // spawn a thread, and then wait for it to start
/// thread::spawn(move || {
///     sem2.post();
/// });
///
/// // wait for the thread to start up
/// sem.wait().unwrap();
/// ```
pub struct Semaphore {
    // track how many resources available for the semaphore
    // if it's negative means how many threads are waiting for
    cnt: AtomicIsize,
    // the waiting blocker list, must be mpmc
    to_wake: SegQueue<Arc<SyncBlocker>>,
}

impl Semaphore {
    /// create a semaphore with the initial value
    pub fn new(init: usize) -> Self {
        assert!(init < isize::MAX as usize);
        Semaphore {
            to_wake: SegQueue::new(),
            cnt: AtomicIsize::new(init as isize),
        }
    }

    #[inline]
    fn wakeup_one(&self) {
        // a negative count always has a registered blocker behind it
        if let Some(w) = self.to_wake.pop() {
            w.unpark();
            if w.take_release() {
                self.post();
            }
        } else {
            unreachable!("got null blocker!");
        }
    }

    /// wait for a semaphore
    ///
    /// if the semaphore value is bigger than zero the function returns immediately
    /// otherwise it would block the until a `post` is executed, or until the
    /// calling worker is canceled
    pub fn wait(&self) -> Result<(), Canceled> {
        // try wait first
        if self.try_wait() {
            return Ok(());
        }

        let cur = SyncBlocker::current();
        // register blocker first
        self.to_wake.push(cur.clone());
        // dec the cnt, if it's positive, unpark one waiter
        if self.cnt.fetch_sub(1, Ordering::SeqCst) > 0 {
            self.wakeup_one();
        }

        match cur.park(None) {
            Ok(_) => Ok(()),
            Err(err) => {
                // check the unpark status
                if cur.is_unparked() {
                    self.post();
                } else {
                    // register
                    cur.set_release();
                    // re-check unpark status
                    if cur.is_unparked() && cur.take_release() {
                        self.post();
                    }
                }
                Err(err.into())
            }
        }
    }

    /// return false if would block
    /// return true if successfully acquire one semaphore resource
    pub fn try_wait(&self) -> bool {
        // we not register ourself at all
        // just manipulate the cnt is enough
        let mut cnt = self.cnt.load(Ordering::SeqCst);
        while cnt > 0 {
            match self
                .cnt
                .compare_exchange(cnt, cnt - 1, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return true,
                Err(x) => cnt = x,
            }
        }
        false
    }

    /// increment the semaphore value
    /// and would wakeup a thread that is calling `wait`
    ///
    /// never blocks
    pub fn post(&self) {
        let cnt = self.cnt.fetch_add(1, Ordering::SeqCst);
        assert!(cnt < isize::MAX);

        // try to wakeup one waiter first
        if cnt < 0 {
            self.wakeup_one();
        }
    }

    /// return the current semaphore value
    pub fn get_value(&self) -> usize {
        let cnt = self.cnt.load(Ordering::SeqCst);
        if cnt > 0 {
            return cnt as usize;
        }
        0
    }
}

impl fmt::Debug for Semaphore {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let cnt = self.cnt.load(Ordering::SeqCst);
        f.debug_struct("Semaphore").field("cnt", &cnt).finish()
    }
}
