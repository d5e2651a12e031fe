//! a minimal stdout sink for the `log` facade, used by the binary

use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

struct Logger;

static LOGGER: Logger = Logger;

/// install the logger, fails if another logger is already set
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => " WARN",
            Level::Info => " INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        println!("[{}] {}", tag, record.args());
    }

    fn flush(&self) {}
}
