//! UI-affinity execution context
//!
//! A [`UiContext`] accepts work items and runs them later, one at a time, on
//! its own thread, in submission order. Hosts with their own UI loop implement
//! the trait directly. Otherwise [`ui_channel`] provides a queue the host
//! drains on the thread that owns the UI:
//!
//! ```ignore
//! let (ui, mut queue) = ui_channel();
//! let dispatcher = Dispatcher::new(Arc::new(ui), &controller, None);
//!
//! // In the UI thread's own loop, never in a `tokio::spawn`ed task.
//! let cancel = CancellationToken::new();
//! loop {
//!     tokio::select! {
//!         _ = cancel.cancelled() => break,
//!         ran = queue.next() => if !ran { break },
//!         // ... terminal events, redraws
//!     }
//! }
//! ```
//!
//! Without a UI loop of its own, a host can start one with
//! [`UiQueue::spawn_thread`].

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::SubmitError;
use crate::worker::Job;

/// A single-threaded context that runs submitted work items in FIFO order.
pub trait UiContext: Send + Sync {
    /// Queue `job` to run later on the context's thread. Must not run it inline.
    ///
    /// An `Err` means the item was dropped without running.
    fn run_on_ui(&self, job: Job) -> Result<(), SubmitError>;
}

/// Create a connected UI handle and queue.
pub fn ui_channel() -> (UiHandle, UiQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiHandle { tx }, UiQueue { rx })
}

/// Submitting side of a [`UiQueue`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct UiHandle {
    tx: mpsc::UnboundedSender<Job>,
}

impl UiHandle {
    /// Whether the queue side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl UiContext for UiHandle {
    fn run_on_ui(&self, job: Job) -> Result<(), SubmitError> {
        self.tx.send(job).map_err(|_| SubmitError::Closed)
    }
}

/// Receiving side: runs queued work items on the thread that drains it.
#[derive(Debug)]
pub struct UiQueue {
    rx: mpsc::UnboundedReceiver<Job>,
}

impl UiQueue {
    /// Run every item queued so far without waiting. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            run_guarded(job);
            ran += 1;
        }
        ran
    }

    /// Wait for the next item and run it.
    ///
    /// Returns `false` once every [`UiHandle`] is gone and the queue is empty.
    ///
    /// Items run on the thread polling this future. Await it from the UI
    /// thread (`block_on`, a current-thread runtime or a `LocalSet`); a task
    /// spawned on a multi-thread runtime hops between workers at every
    /// `.await`, and the items with it.
    pub async fn next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(job) => {
                run_guarded(job);
                true
            }
            None => false,
        }
    }

    /// Run items until `cancel` fires or every handle is dropped.
    ///
    /// Items still queued at cancellation are dropped without running. Like
    /// [`UiQueue::next`], the future must stay on one thread: do not
    /// `tokio::spawn` it onto a multi-thread runtime.
    pub async fn run(mut self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(pending = self.rx.len(), "UI queue cancelled");
                    break;
                }
                ran = self.next() => {
                    if !ran {
                        debug!("UI queue closed");
                        break;
                    }
                }
            }
        }
    }

    /// Run items on the current thread until every handle is dropped.
    ///
    /// # Panics
    ///
    /// Panics when called from within an async runtime.
    pub fn run_blocking(mut self) {
        while let Some(job) = self.rx.blocking_recv() {
            run_guarded(job);
        }
        debug!("UI queue closed");
    }

    /// Start a dedicated UI thread draining a new queue.
    ///
    /// The thread exits once every returned handle (and its clones) is dropped.
    pub fn spawn_thread(name: impl Into<String>) -> io::Result<(UiHandle, thread::JoinHandle<()>)> {
        let (handle, queue) = ui_channel();
        let join = thread::Builder::new()
            .name(name.into())
            .spawn(move || queue.run_blocking())?;
        Ok((handle, join))
    }
}

/// A panicking item ends only itself; the queue keeps serving.
fn run_guarded(job: Job) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(panic = %message, "UI work item panicked");
    }
}
