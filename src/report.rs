//! the summary record written once per run

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use crate::config::Config;

/// the values of one summary block, in output order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub producers: usize,
    pub consumers: usize,
    pub duration_secs: u64,
    pub producer_idle_max_ms: u64,
    pub consumer_idle_max_ms: u64,
    pub items_produced: u64,
    pub items_consumed: u64,
    pub turnaround: Duration,
}

impl Report {
    pub fn new(config: &Config, produced: u64, consumed: u64, turnaround: Duration) -> Self {
        Report {
            producers: config.get_producers(),
            consumers: config.get_consumers(),
            duration_secs: config.get_duration_secs(),
            producer_idle_max_ms: config.get_producer_idle_max_ms(),
            consumer_idle_max_ms: config.get_consumer_idle_max_ms(),
            items_produced: produced,
            items_consumed: consumed,
            turnaround,
        }
    }

    /// append the block to `path`, creating the file if needed
    pub fn append_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        // the whole block in one write
        file.write_all(self.to_string().as_bytes())?;
        file.flush()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "========= SUMMARY =========")?;
        writeln!(f, "Producers: {}", self.producers)?;
        writeln!(f, "Consumers: {}", self.consumers)?;
        writeln!(f, "Duration: {} seconds", self.duration_secs)?;
        writeln!(f, "Producer Sleep Max: {} ms", self.producer_idle_max_ms)?;
        writeln!(f, "Consumer Sleep Max: {} ms", self.consumer_idle_max_ms)?;
        writeln!(f, "Items Produced: {}", self.items_produced)?;
        writeln!(f, "Items Consumed: {}", self.items_consumed)?;
        writeln!(f, "Turnaround Time: {} ms", self.turnaround.as_millis())?;
        // blank line between blocks
        writeln!(f, "===========================\n")
    }
}
