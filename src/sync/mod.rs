//! blocking primitives that a worker's cancel data can interrupt

pub(crate) mod blocking;
mod semaphore;

pub use self::blocking::ParkError;
pub use self::semaphore::Semaphore;
