//! the fixed capacity FIFO that workers exchange items through
//!
//! `BoundedBuffer` is plain data. it does no locking of its own and relies on
//! the caller holding a slot reservation, see `SharedBuffer`.

use std::collections::VecDeque;

use crate::item::Item;

/// capacity of the buffer in the reference configuration
pub const DEFAULT_CAPACITY: usize = 10;

#[derive(Debug)]
pub struct BoundedBuffer {
    items: VecDeque<Item>,
    capacity: usize,
    produced: u64,
    consumed: u64,
    // highest length ever observed
    peak: usize,
}

impl BoundedBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "buffer capacity must be at least 1");
        BoundedBuffer {
            items: VecDeque::with_capacity(capacity),
            capacity,
            produced: 0,
            consumed: 0,
            peak: 0,
        }
    }

    /// append `item` at the tail and count it as produced
    ///
    /// the caller holds an empty slot, so there is always room
    pub fn try_insert(&mut self, item: Item) {
        assert!(
            self.items.len() < self.capacity,
            "insert without a reserved slot, len={} capacity={}",
            self.items.len(),
            self.capacity
        );
        self.items.push_back(item);
        self.produced += 1;
        self.peak = self.peak.max(self.items.len());
    }

    /// pop the head item and count it as consumed
    ///
    /// the caller holds a filled slot, so there is always an item
    pub fn try_remove(&mut self) -> Item {
        match self.items.pop_front() {
            Some(item) => {
                self.consumed += 1;
                item
            }
            None => panic!("remove without a reserved item"),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn produced(&self) -> u64 {
        self.produced
    }

    #[inline]
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    #[inline]
    pub fn peak(&self) -> usize {
        self.peak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(v: u32) -> Item {
        Item::new(v).unwrap()
    }

    #[test]
    fn fifo_order() {
        let mut buf = BoundedBuffer::new(3);
        buf.try_insert(item(5));
        buf.try_insert(item(1));
        buf.try_insert(item(5));
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.try_remove(), item(5));
        assert_eq!(buf.try_remove(), item(1));
        buf.try_insert(item(9));
        assert_eq!(buf.try_remove(), item(5));
        assert_eq!(buf.try_remove(), item(9));
        assert!(buf.is_empty());
    }

    #[test]
    fn counters_track_operations() {
        let mut buf = BoundedBuffer::new(2);
        buf.try_insert(item(1));
        buf.try_insert(item(2));
        buf.try_remove();
        buf.try_insert(item(3));
        assert_eq!(buf.produced(), 3);
        assert_eq!(buf.consumed(), 1);
        assert_eq!(buf.produced() - buf.consumed(), buf.len() as u64);
        assert_eq!(buf.peak(), 2);
    }

    #[test]
    #[should_panic(expected = "insert without a reserved slot")]
    fn overrun_panics() {
        let mut buf = BoundedBuffer::new(1);
        buf.try_insert(item(1));
        buf.try_insert(item(2));
    }

    #[test]
    #[should_panic(expected = "remove without a reserved item")]
    fn underrun_panics() {
        let mut buf = BoundedBuffer::new(1);
        buf.try_remove();
    }

    #[test]
    #[should_panic]
    fn zero_capacity_rejected() {
        BoundedBuffer::new(0);
    }
}
