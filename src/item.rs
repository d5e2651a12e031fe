//! items exchanged through the buffer and the sources that produce them

use std::fmt;

/// exclusive upper bound of an item value
pub const ITEM_RANGE: u32 = 100;

/// an integer value in `[0, ITEM_RANGE)`
///
/// items carry no identity beyond their value, duplicates are expected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item(u32);

impl Item {
    /// create an item, `None` if the value is out of range
    pub fn new(value: u32) -> Option<Self> {
        if value < ITEM_RANGE {
            Some(Item(value))
        } else {
            None
        }
    }

    #[inline]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// where a producer gets its next item from
pub trait ItemSource: Send {
    fn next_item(&mut self) -> Item;
}

impl<F> ItemSource for F
where
    F: FnMut() -> Item + Send,
{
    fn next_item(&mut self) -> Item {
        self()
    }
}

/// uniformly random items, one generator per producer
#[derive(Debug)]
pub struct RandomSource {
    rng: fastrand::Rng,
}

impl RandomSource {
    pub fn new() -> Self {
        RandomSource {
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        RandomSource {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemSource for RandomSource {
    fn next_item(&mut self) -> Item {
        Item(self.rng.u32(0..ITEM_RANGE))
    }
}

/// cycles through `0, 1, .. ITEM_RANGE - 1` and wraps, handy for ordering checks
#[derive(Debug, Default)]
pub struct SequenceSource {
    next: u32,
}

impl SequenceSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ItemSource for SequenceSource {
    fn next_item(&mut self) -> Item {
        let item = Item(self.next);
        self.next = (self.next + 1) % ITEM_RANGE;
        item
    }
}
