//! # Bounded Buffer Producer/Consumer Simulator
//!
//! A configurable number of producer and consumer workers exchange integer
//! items through one fixed capacity buffer for a fixed wall clock duration.
//! Access to the buffer is gated by three primitives only: a counting
//! semaphore of empty slots, a counting semaphore of filled slots and a mutex.
//! When the duration is over every worker is canceled, joined, and a summary
//! of the run is produced.
//!
//! ## Features
//!
//! * Counting semaphore whose blocking `wait` can be interrupted by a cancel
//! * Per worker cancel data, checked at every suspension point
//! * Lossless cancellation, a canceled waiter never takes a slot
//! * Explicit shared context, several runs can live in one process
//! * Append-only summary report in a fixed layout
//!
//! ```rust,no_run
//! let mut config = semsim::Config::new();
//! config
//!     .set_producers(2)
//!     .set_consumers(2)
//!     .set_duration_secs(2)
//!     .set_producer_idle_max_ms(50)
//!     .set_consumer_idle_max_ms(50);
//!
//! let summary = semsim::run(config).unwrap();
//! assert!(summary.items_produced() >= summary.items_consumed());
//! ```

#[macro_use]
#[doc(hidden)]
extern crate log;

mod config;
mod join;
mod sleep;

pub mod buffer;
pub mod cancel;
pub mod coordinator;
pub mod error;
pub mod item;
pub mod logger;
pub mod report;
pub mod shared;
pub mod sync;
pub mod worker;

pub use crate::config::{Config, MAX_WORKERS};
pub use crate::coordinator::{run, Coordinator, Summary};
pub use crate::error::{ConfigError, Error};
pub use crate::join::{spawn, WorkerHandle};
pub use crate::sleep::sleep;
