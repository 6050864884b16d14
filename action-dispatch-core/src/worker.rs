//! Background execution
//!
//! [`WorkerPool`] is the single capability the dispatcher needs from a
//! background executor: accept a work item and run it later on some other
//! thread. Two adapters ship with the crate:
//!
//! - [`tokio::runtime::Handle`]: submits to the runtime's blocking pool
//! - [`SpawnThread`]: starts one dedicated OS thread per work item, used when
//!   no pool is supplied
//!
//! # Example
//!
//! ```ignore
//! let pool: Arc<dyn WorkerPool> = Arc::new(tokio::runtime::Handle::current());
//! let dispatcher = Dispatcher::new(ui, &controller, Some(pool));
//! ```

use std::thread;

use crate::error::SubmitError;

/// A unit of work handed to an execution context.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Accepts work items for asynchronous execution.
///
/// Pools are owned by the host. Implementations decide scheduling, ordering
/// and concurrency; callers only submit.
pub trait WorkerPool: Send + Sync {
    /// Submit a work item. Must not block until the item has run.
    ///
    /// An `Err` means the item was dropped without running.
    fn execute(&self, job: Job) -> Result<(), SubmitError>;
}

impl WorkerPool for tokio::runtime::Handle {
    fn execute(&self, job: Job) -> Result<(), SubmitError> {
        // Detached: the JoinHandle is not needed, the job reports its own faults.
        drop(self.spawn_blocking(job));
        Ok(())
    }
}

/// Runs every work item on a freshly spawned, named OS thread.
#[derive(Debug, Clone)]
pub struct SpawnThread {
    name: String,
}

impl Default for SpawnThread {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_WORKER_THREAD_NAME)
    }
}

impl SpawnThread {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Name given to spawned threads.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl WorkerPool for SpawnThread {
    fn execute(&self, job: Job) -> Result<(), SubmitError> {
        tracing::trace!(thread = %self.name, "worker.spawn_thread");
        thread::Builder::new()
            .name(self.name.clone())
            .spawn(job)
            .map(drop)
            .map_err(|source| SubmitError::Spawn {
                name: self.name.clone(),
                source,
            })
    }
}
