//! Run configuration
//!
//! supplied once before the run starts and never changed after

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::buffer::DEFAULT_CAPACITY;
use crate::error::ConfigError;

// default configs
const DEFAULT_PRODUCERS: usize = 1;
const DEFAULT_CONSUMERS: usize = 1;
const DEFAULT_DURATION_SECS: u64 = 1;
const DEFAULT_REPORT_PATH: &str = "report.txt";

/// upper bound on producers + consumers, each worker is an os thread
pub const MAX_WORKERS: usize = 4096;

/// the run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    producers: usize,
    consumers: usize,
    duration_secs: u64,
    producer_idle_max_ms: u64,
    consumer_idle_max_ms: u64,
    capacity: usize,
    report_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            producers: DEFAULT_PRODUCERS,
            consumers: DEFAULT_CONSUMERS,
            duration_secs: DEFAULT_DURATION_SECS,
            producer_idle_max_ms: 0,
            consumer_idle_max_ms: 0,
            capacity: DEFAULT_CAPACITY,
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
        }
    }
}

/// the setters are meant to be chained before the run
impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// set the producer worker number, 0 is allowed
    pub fn set_producers(&mut self, producers: usize) -> &mut Self {
        info!("set producers={:?}", producers);
        self.producers = producers;
        self
    }

    pub fn get_producers(&self) -> usize {
        self.producers
    }

    /// set the consumer worker number, 0 is allowed
    pub fn set_consumers(&mut self, consumers: usize) -> &mut Self {
        info!("set consumers={:?}", consumers);
        self.consumers = consumers;
        self
    }

    pub fn get_consumers(&self) -> usize {
        self.consumers
    }

    /// set how long the workers run before they are canceled
    pub fn set_duration_secs(&mut self, secs: u64) -> &mut Self {
        info!("set duration={:?}s", secs);
        self.duration_secs = secs;
        self
    }

    pub fn get_duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    /// set the inclusive upper bound of a producer's idle interval
    pub fn set_producer_idle_max_ms(&mut self, ms: u64) -> &mut Self {
        info!("set producer idle max={:?}ms", ms);
        self.producer_idle_max_ms = ms;
        self
    }

    pub fn get_producer_idle_max_ms(&self) -> u64 {
        self.producer_idle_max_ms
    }

    /// set the inclusive upper bound of a consumer's idle interval
    pub fn set_consumer_idle_max_ms(&mut self, ms: u64) -> &mut Self {
        info!("set consumer idle max={:?}ms", ms);
        self.consumer_idle_max_ms = ms;
        self
    }

    pub fn get_consumer_idle_max_ms(&self) -> u64 {
        self.consumer_idle_max_ms
    }

    /// set the buffer capacity
    pub fn set_capacity(&mut self, capacity: usize) -> &mut Self {
        info!("set capacity={:?}", capacity);
        self.capacity = capacity;
        self
    }

    pub fn get_capacity(&self) -> usize {
        self.capacity
    }

    /// set the file the summary is appended to
    pub fn set_report_path<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        info!("set report path={:?}", path.as_ref());
        self.report_path = path.as_ref().to_path_buf();
        self
    }

    pub fn get_report_path(&self) -> &Path {
        &self.report_path
    }

    /// check the configuration, nothing is spawned for an invalid one
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.capacity >= isize::MAX as usize {
            return Err(ConfigError::CapacityTooLarge(self.capacity));
        }
        let requested = self.producers.saturating_add(self.consumers);
        if requested > MAX_WORKERS {
            return Err(ConfigError::TooManyWorkers {
                requested,
                max: MAX_WORKERS,
            });
        }
        Ok(())
    }
}
