//! Run coordinator
//!
//! builds the shared buffer once, spawns the workers, lets them run for the
//! configured duration, cancels them all and collects the counters. it never
//! touches the buffer itself.

use std::any::Any;
use std::panic;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::{ConfigError, Error};
use crate::item::RandomSource;
use crate::join::{self, WorkerHandle};
use crate::report::Report;
use crate::shared::{SharedBuffer, Snapshot};
use crate::worker::{Consumer, Jitter, Producer, WorkerKind, WorkerStats};

/// the outcome of a finished run
#[derive(Debug, Clone)]
pub struct Summary {
    pub config: Config,
    /// shared state once every worker stopped
    pub snapshot: Snapshot,
    pub workers: Vec<WorkerStats>,
    /// wall clock time from the first spawn to the last join
    pub turnaround: Duration,
}

impl Summary {
    pub fn items_produced(&self) -> u64 {
        self.snapshot.produced
    }

    pub fn items_consumed(&self) -> u64 {
        self.snapshot.consumed
    }

    /// items still in the buffer at shutdown, they are not drained
    pub fn in_flight(&self) -> usize {
        self.snapshot.len
    }

    pub fn report(&self) -> Report {
        Report::new(
            &self.config,
            self.items_produced(),
            self.items_consumed(),
            self.turnaround,
        )
    }

    /// append the report to the configured report file
    pub fn write_report(&self) -> Result<(), Error> {
        self.report()
            .append_to(self.config.get_report_path())
            .map_err(Error::Report)
    }
}

#[derive(Debug)]
pub struct Coordinator {
    config: Config,
}

impl Coordinator {
    /// fails fast on an invalid configuration, before anything is spawned
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Coordinator { config })
    }

    fn spawn_workers(
        &self,
        shared: &Arc<SharedBuffer>,
        workers: &mut Vec<WorkerHandle<WorkerStats>>,
    ) -> Result<(), Error> {
        for id in 0..self.config.get_producers() {
            let producer = Producer::new(
                id,
                shared.clone(),
                RandomSource::new(),
                Jitter::new(self.config.get_producer_idle_max_ms()),
            );
            let handle = join::spawn(format!("producer-{id}"), move || producer.run())
                .map_err(Error::Spawn)?;
            workers.push(handle);
        }

        for id in 0..self.config.get_consumers() {
            let consumer = Consumer::new(
                id,
                shared.clone(),
                Jitter::new(self.config.get_consumer_idle_max_ms()),
            );
            let handle = join::spawn(format!("consumer-{id}"), move || consumer.run())
                .map_err(Error::Spawn)?;
            workers.push(handle);
        }
        Ok(())
    }

    /// run the simulation to completion
    ///
    /// the only error is a worker thread that could not be spawned, in which
    /// case the workers already running are stopped before returning
    pub fn run(&self) -> Result<Summary, Error> {
        let shared = Arc::new(SharedBuffer::new(self.config.get_capacity()));
        let total = self.config.get_producers() + self.config.get_consumers();
        let mut workers = Vec::with_capacity(total);

        let start = Instant::now();
        if let Err(e) = self.spawn_workers(&shared, &mut workers) {
            error!("{}, stopping {} started workers", e, workers.len());
            shutdown(workers);
            return Err(e);
        }

        info!(
            "running {} producers and {} consumers for {:?}",
            self.config.get_producers(),
            self.config.get_consumers(),
            self.config.duration()
        );
        thread::sleep(self.config.duration());

        let stats = shutdown(workers);
        let turnaround = start.elapsed();

        let snapshot = shared.snapshot();
        debug_assert!(snapshot.is_consistent(), "{:?}", snapshot);
        if snapshot.len > 0 {
            info!("{} items left in the buffer at shutdown", snapshot.len);
        }

        Ok(Summary {
            config: self.config.clone(),
            snapshot,
            workers: stats,
            turnaround,
        })
    }
}

/// validate `config` and run it
pub fn run(config: Config) -> Result<Summary, Error> {
    Coordinator::new(config)?.run()
}

// cancel every worker, then wait for all of them
//
// a worker panic means a broken invariant, it is re-raised once all the
// other workers are joined
fn shutdown(workers: Vec<WorkerHandle<WorkerStats>>) -> Vec<WorkerStats> {
    debug!("canceling {} workers", workers.len());
    for w in workers.iter() {
        w.cancel();
    }

    let mut stats = Vec::with_capacity(workers.len());
    let mut panicked: Option<Box<dyn Any + Send>> = None;
    for w in workers {
        let name = w.name().to_owned();
        match w.join() {
            Ok(s) => stats.push(s),
            Err(p) => {
                error!("worker {} panicked", name);
                panicked.get_or_insert(p);
            }
        }
    }

    if let Some(p) = panicked {
        panic::resume_unwind(p);
    }

    let producers = stats
        .iter()
        .filter(|s| s.kind == WorkerKind::Producer)
        .count();
    debug!(
        "{} producers and {} consumers stopped",
        producers,
        stats.len() - producers
    );
    stats
}
