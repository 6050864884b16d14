//! Test utilities for action-dispatch users
//!
//! - [`ManualUi`]: a [`UiContext`] that holds work items until the test runs them
//! - [`CountingPool`]: a [`WorkerPool`] that counts submissions and runs them inline
//!
//! # Example
//!
//! ```ignore
//! use action_dispatch::testing::{CountingPool, ManualUi};
//!
//! let ui = Arc::new(ManualUi::new());
//! let pool = Arc::new(CountingPool::new());
//! let dispatcher = Dispatcher::new(ui.clone(), &controller, Some(pool.clone()));
//!
//! dispatcher.invoke(InvocationPolicy::UiAffinity, "redraw", params![])?;
//! assert_eq!(ui.pending(), 1);
//! ui.run_pending();
//!
//! dispatcher.invoke(InvocationPolicy::BackgroundWorker, "index", params![])?;
//! assert_eq!(pool.submissions(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::SubmitError;
use crate::ui::UiContext;
use crate::worker::{Job, WorkerPool};

/// UI context driven by the test.
///
/// Work items queue up until [`ManualUi::run_pending`] runs them in
/// submission order on the calling thread. After [`ManualUi::close`] it
/// refuses new items, like a UI loop that has shut down.
#[derive(Default)]
pub struct ManualUi {
    queue: Mutex<VecDeque<Job>>,
    closed: AtomicBool,
}

impl ManualUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued work items.
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Refuse every item submitted from now on.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Run queued items, including ones queued while running. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        // The lock is released before each job so jobs may queue more work.
        loop {
            let next = self
                .queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            match next {
                Some(job) => {
                    job();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }
}

impl UiContext for ManualUi {
    fn run_on_ui(&self, job: Job) -> Result<(), SubmitError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SubmitError::Closed);
        }
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(job);
        Ok(())
    }
}

impl std::fmt::Debug for ManualUi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualUi")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Worker pool that counts submissions and runs each one immediately.
///
/// Test-only: running inline means `execute` returns after the item has run,
/// which real pools must not do. It keeps background dispatch deterministic.
#[derive(Debug, Default)]
pub struct CountingPool {
    submissions: AtomicUsize,
}

impl CountingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times [`WorkerPool::execute`] was called.
    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }
}

impl WorkerPool for CountingPool {
    fn execute(&self, job: Job) -> Result<(), SubmitError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        job();
        Ok(())
    }
}
