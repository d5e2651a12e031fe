// errors surfaced to the caller of a run
//
// cancellation is not here, it is the normal way a worker stops

use std::error;
use std::fmt;
use std::io;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroCapacity,
    CapacityTooLarge(usize),
    TooManyWorkers { requested: usize, max: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ConfigError::ZeroCapacity => write!(f, "buffer capacity must be at least 1"),
            ConfigError::CapacityTooLarge(c) => write!(f, "buffer capacity {} is too large", c),
            ConfigError::TooManyWorkers { requested, max } => {
                write!(f, "{} workers requested, at most {} allowed", requested, max)
            }
        }
    }
}

impl error::Error for ConfigError {}

#[derive(Debug)]
pub enum Error {
    Config(ConfigError),
    // a worker thread could not be started
    Spawn(io::Error),
    Report(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::Config(ref e) => write!(f, "invalid configuration: {}", e),
            Error::Spawn(ref e) => write!(f, "failed to spawn worker: {}", e),
            Error::Report(ref e) => write!(f, "failed to write report: {}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Config(ref e) => Some(e),
            Error::Spawn(ref e) | Error::Report(ref e) => Some(e),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}
