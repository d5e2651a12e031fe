use std::fmt;

use parking_lot::Mutex;

use crate::buffer::BoundedBuffer;
use crate::cancel::Canceled;
use crate::item::Item;
use crate::sync::Semaphore;

/// the bounded buffer together with the three primitives that gate it
///
/// every access follows the same order: acquire a slot, lock the buffer,
/// mutate, unlock, release the opposite slot. taking the slot before the lock
/// is what keeps a full or empty buffer from deadlocking the lock holder.
///
/// one instance is built per run and shared by all workers through an `Arc`.
pub struct SharedBuffer {
    // slots that can still take an item
    empty: Semaphore,
    // items waiting to be removed
    filled: Semaphore,
    buffer: Mutex<BoundedBuffer>,
}

/// a consistent view of the shared state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub len: usize,
    pub capacity: usize,
    pub empty_slots: usize,
    pub filled_slots: usize,
    pub produced: u64,
    pub consumed: u64,
    pub peak: usize,
}

impl Snapshot {
    /// the invariants that hold whenever no worker is inside a critical section
    pub fn is_consistent(&self) -> bool {
        self.len <= self.capacity
            && self.empty_slots + self.filled_slots == self.capacity
            && self.filled_slots == self.len
            && self.produced - self.consumed == self.len as u64
    }
}

impl SharedBuffer {
    pub fn new(capacity: usize) -> Self {
        SharedBuffer {
            empty: Semaphore::new(capacity),
            filled: Semaphore::new(0),
            buffer: Mutex::new(BoundedBuffer::new(capacity)),
        }
    }

    /// insert `item`, blocking while the buffer is full
    ///
    /// returns the buffer length right after the insert. when the wait for a
    /// slot is canceled the buffer is left untouched
    pub fn produce(&self, item: Item) -> Result<usize, Canceled> {
        self.empty.wait()?;
        let len = {
            let mut buffer = self.buffer.lock();
            buffer.try_insert(item);
            buffer.len()
        };
        self.filled.post();
        Ok(len)
    }

    /// remove the head item, blocking while the buffer is empty
    pub fn consume(&self) -> Result<Item, Canceled> {
        self.filled.wait()?;
        let item = self.buffer.lock().try_remove();
        self.empty.post();
        Ok(item)
    }

    /// read the counters and slot values
    ///
    /// only meaningful as a whole once the workers are quiescent
    pub fn snapshot(&self) -> Snapshot {
        let buffer = self.buffer.lock();
        Snapshot {
            len: buffer.len(),
            capacity: buffer.capacity(),
            empty_slots: self.empty.get_value(),
            filled_slots: self.filled.get_value(),
            produced: buffer.produced(),
            consumed: buffer.consumed(),
            peak: buffer.peak(),
        }
    }
}

impl fmt::Debug for SharedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedBuffer")
            .field("empty", &self.empty)
            .field("filled", &self.filled)
            .field("buffer", &*self.buffer.lock())
            .finish()
    }
}
