//! Producer and consumer workers
//!
//! both are a two state machine. a worker is `Running` from the moment its
//! loop starts until a suspension point reports the cancel, then `Stopped`.
//! the suspension points are the slot wait inside `SharedBuffer` and the idle
//! sleep; the critical section in between is never abandoned half way.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::cancel::{check_cancel, Canceled};
use crate::item::{Item, ItemSource};
use crate::shared::SharedBuffer;
use crate::sleep::sleep;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerKind {
    Producer,
    Consumer,
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            WorkerKind::Producer => f.write_str("Producer"),
            WorkerKind::Consumer => f.write_str("Consumer"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Running,
    Stopped,
}

/// what a worker reports back when it stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub kind: WorkerKind,
    pub id: usize,
    /// items inserted by a producer or removed by a consumer
    pub handled: u64,
    pub state: WorkerState,
}

/// random idle interval in `[0, max]` milliseconds
#[derive(Debug)]
pub struct Jitter {
    max_ms: u64,
    rng: fastrand::Rng,
}

impl Jitter {
    pub fn new(max_ms: u64) -> Self {
        Jitter {
            max_ms,
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_seed(max_ms: u64, seed: u64) -> Self {
        Jitter {
            max_ms,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// no idle time at all
    pub fn none() -> Self {
        Self::new(0)
    }

    pub fn next_interval(&mut self) -> Duration {
        if self.max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.rng.u64(0..=self.max_ms))
    }
}

/// where a consumer hands the items it removed
pub trait ItemSink: Send {
    fn accept(&mut self, item: Item);
}

impl<F> ItemSink for F
where
    F: FnMut(Item) + Send,
{
    fn accept(&mut self, item: Item) {
        self(item)
    }
}

/// drops every item
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl ItemSink for Discard {
    fn accept(&mut self, _item: Item) {}
}

pub struct Producer<S> {
    id: usize,
    shared: Arc<SharedBuffer>,
    source: S,
    idle: Jitter,
    state: WorkerState,
    handled: u64,
}

impl<S: ItemSource> Producer<S> {
    pub fn new(id: usize, shared: Arc<SharedBuffer>, source: S, idle: Jitter) -> Self {
        Producer {
            id,
            shared,
            source,
            idle,
            state: WorkerState::Running,
            handled: 0,
        }
    }

    // only returns once canceled
    fn work(&mut self) -> Result<(), Canceled> {
        loop {
            check_cancel()?;
            let item = self.source.next_item();
            self.shared.produce(item)?;
            self.handled += 1;
            info!("Producer {} produced: {}", self.id, item);
            sleep(self.idle.next_interval())?;
        }
    }

    /// run until canceled
    pub fn run(mut self) -> WorkerStats {
        debug!("Producer {} started", self.id);
        if let Err(Canceled) = self.work() {
            self.state = WorkerState::Stopped;
        }
        debug!("Producer {} stopped after {} items", self.id, self.handled);
        WorkerStats {
            kind: WorkerKind::Producer,
            id: self.id,
            handled: self.handled,
            state: self.state,
        }
    }
}

impl<S> fmt::Debug for Producer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("handled", &self.handled)
            .finish()
    }
}

pub struct Consumer<K = Discard> {
    id: usize,
    shared: Arc<SharedBuffer>,
    sink: K,
    idle: Jitter,
    state: WorkerState,
    handled: u64,
}

impl Consumer<Discard> {
    pub fn new(id: usize, shared: Arc<SharedBuffer>, idle: Jitter) -> Self {
        Consumer::with_sink(id, shared, Discard, idle)
    }
}

impl<K: ItemSink> Consumer<K> {
    pub fn with_sink(id: usize, shared: Arc<SharedBuffer>, sink: K, idle: Jitter) -> Self {
        Consumer {
            id,
            shared,
            sink,
            idle,
            state: WorkerState::Running,
            handled: 0,
        }
    }

    // only returns once canceled
    fn work(&mut self) -> Result<(), Canceled> {
        loop {
            check_cancel()?;
            let item = self.shared.consume()?;
            self.handled += 1;
            info!("Consumer {} consumed: {}", self.id, item);
            self.sink.accept(item);
            sleep(self.idle.next_interval())?;
        }
    }

    /// run until canceled
    pub fn run(mut self) -> WorkerStats {
        debug!("Consumer {} started", self.id);
        if let Err(Canceled) = self.work() {
            self.state = WorkerState::Stopped;
        }
        debug!("Consumer {} stopped after {} items", self.id, self.handled);
        WorkerStats {
            kind: WorkerKind::Consumer,
            id: self.id,
            handled: self.handled,
            state: self.state,
        }
    }
}

impl<K> fmt::Debug for Consumer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("handled", &self.handled)
            .finish()
    }
}
