use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread;

use crate::cancel::{self, Cancel};

/// A handle to a running worker
///
/// the worker runs on its own named thread with its own cancel data
pub struct WorkerHandle<T> {
    name: String,
    cancel: Arc<Cancel>,
    handle: thread::JoinHandle<T>,
}

/// spawn `f` as a worker thread called `name`
///
/// every blocking call `f` makes through this crate returns `Err(Canceled)`
/// once the handle is canceled
pub fn spawn<F, T>(name: String, f: F) -> io::Result<WorkerHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let cancel = Arc::new(Cancel::new());
    let worker_cancel = cancel.clone();
    let handle = thread::Builder::new().name(name.clone()).spawn(move || {
        let _guard = cancel::enter(worker_cancel);
        f()
    })?;

    Ok(WorkerHandle {
        name,
        cancel,
        handle,
    })
}

impl<T> WorkerHandle<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// ask the worker to stop, it wakes up from any blocking call
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.cancel.is_canceled()
    }

    /// Join the worker, returning the result it produced.
    pub fn join(self) -> thread::Result<T> {
        self.handle.join()
    }
}

impl<T> fmt::Debug for WorkerHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("name", &self.name)
            .field("canceled", &self.is_canceled())
            .finish()
    }
}
