//! Diagnostic sinks for dispatch events
//!
//! The dispatcher reports every rejected or undelivered action to a
//! [`DiagnosticSink`], and every dispatched one. Sinks are fire-and-forget: they never
//! fail the caller.
//!
//! - [`TracingSink`] (default): logs rejections and refused submissions via `tracing::error!()`
//! - [`DispatchLog`]: in-memory ring buffer, e.g. for a debug overlay
//! - [`ComposedSink`]: fans out to several sinks
//!
//! # Example
//!
//! ```ignore
//! let log = Arc::new(DispatchLog::new(50));
//! let sink = ComposedSink::new().with(TracingSink::new()).with_shared(log.clone());
//! let dispatcher = Dispatcher::new(ui, &controller, None).with_sink(Arc::new(sink));
//!
//! for entry in log.recent(10) {
//!     println!("{}: {}", entry.elapsed_display(), entry.action);
//! }
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::action::ActionId;
use crate::error::{BindingError, SubmitError};
use crate::policy::InvocationPolicy;

/// Receives dispatch diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// An action was dropped because its method binding is invalid.
    fn rejected(&self, action: &ActionId, error: &BindingError);

    /// A valid action was handed to its execution context.
    fn dispatched(&self, _action: &ActionId, _policy: InvocationPolicy) {}

    /// A valid action was dropped because its execution context refused it.
    fn undelivered(&self, action: &ActionId, policy: InvocationPolicy, error: &SubmitError);
}

/// Sink that logs through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    /// Also log dispatched actions at debug level
    pub log_dispatched: bool,
}

impl TracingSink {
    /// Log rejections only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log rejections and every dispatched action.
    pub fn verbose() -> Self {
        Self {
            log_dispatched: true,
        }
    }
}

impl DiagnosticSink for TracingSink {
    fn rejected(&self, action: &ActionId, error: &BindingError) {
        tracing::error!(action = %action, error = %error, "The action method is not valid");
    }

    fn dispatched(&self, action: &ActionId, policy: InvocationPolicy) {
        if self.log_dispatched {
            tracing::debug!(action = %action, policy = %policy, "Action dispatched");
        }
    }

    fn undelivered(&self, action: &ActionId, policy: InvocationPolicy, error: &SubmitError) {
        tracing::error!(
            action = %action,
            policy = %policy,
            error = %error,
            "Action dropped, not scheduled"
        );
    }
}

/// Fans diagnostics out to several sinks, in insertion order.
#[derive(Default)]
pub struct ComposedSink {
    sinks: Vec<Arc<dyn DiagnosticSink>>,
}

impl std::fmt::Debug for ComposedSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedSink")
            .field("sinks_count", &self.sinks.len())
            .finish()
    }
}

impl ComposedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an owned sink.
    pub fn with<S: DiagnosticSink + 'static>(self, sink: S) -> Self {
        self.with_shared(Arc::new(sink))
    }

    /// Add a sink the caller keeps a handle to.
    pub fn with_shared(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl DiagnosticSink for ComposedSink {
    fn rejected(&self, action: &ActionId, error: &BindingError) {
        for sink in &self.sinks {
            sink.rejected(action, error);
        }
    }

    fn dispatched(&self, action: &ActionId, policy: InvocationPolicy) {
        for sink in &self.sinks {
            sink.dispatched(action, policy);
        }
    }

    fn undelivered(&self, action: &ActionId, policy: InvocationPolicy, error: &SubmitError) {
        for sink in &self.sinks {
            sink.undelivered(action, policy, error);
        }
    }
}

// ============================================================================
// In-Memory Dispatch Log
// ============================================================================

/// What happened to a logged action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    Rejected(BindingError),
    Dispatched(InvocationPolicy),
    Undelivered {
        policy: InvocationPolicy,
        reason: String,
    },
}

/// An entry in the dispatch log
#[derive(Debug, Clone)]
pub struct DispatchLogEntry {
    pub action: ActionId,
    pub event: DispatchEvent,
    /// Timestamp when the entry was recorded
    pub timestamp: Instant,
    /// Sequence number for ordering
    pub sequence: u64,
}

impl DispatchLogEntry {
    pub fn is_rejected(&self) -> bool {
        matches!(self.event, DispatchEvent::Rejected(_))
    }

    /// Time since this entry was recorded
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }

    /// Format the elapsed time for display (e.g., "2.3s", "150ms")
    pub fn elapsed_display(&self) -> String {
        let elapsed = self.elapsed();
        if elapsed.as_secs() >= 1 {
            format!("{:.1}s", elapsed.as_secs_f64())
        } else {
            format!("{}ms", elapsed.as_millis())
        }
    }
}

#[derive(Debug, Default)]
struct LogState {
    entries: VecDeque<DispatchLogEntry>,
    next_sequence: u64,
}

/// Ring buffer of recent dispatch events.
///
/// Older entries are discarded once capacity is reached. Shared between
/// threads; readers get snapshots.
#[derive(Debug)]
pub struct DispatchLog {
    state: Mutex<LogState>,
    capacity: usize,
}

impl Default for DispatchLog {
    fn default() -> Self {
        Self::new(100)
    }
}

impl DispatchLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(LogState {
                entries: VecDeque::with_capacity(capacity),
                next_sequence: 0,
            }),
            capacity,
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, action: &ActionId, event: DispatchEvent) {
        if self.capacity == 0 {
            return;
        }

        let mut state = self.state();
        let sequence = state.next_sequence;
        state.next_sequence += 1;

        if state.entries.len() >= self.capacity {
            state.entries.pop_front();
        }
        state.entries.push_back(DispatchLogEntry {
            action: action.clone(),
            event,
            timestamp: Instant::now(),
            sequence,
        });
    }

    /// All entries (oldest first)
    pub fn entries(&self) -> Vec<DispatchLogEntry> {
        self.state().entries.iter().cloned().collect()
    }

    /// The most recent N entries (newest first)
    pub fn recent(&self, count: usize) -> Vec<DispatchLogEntry> {
        self.state().entries.iter().rev().take(count).cloned().collect()
    }

    /// Rejected entries (oldest first)
    pub fn rejected(&self) -> Vec<DispatchLogEntry> {
        self.state()
            .entries
            .iter()
            .filter(|entry| entry.is_rejected())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.state().entries.clear();
    }
}

impl DiagnosticSink for DispatchLog {
    fn rejected(&self, action: &ActionId, error: &BindingError) {
        self.record(action, DispatchEvent::Rejected(error.clone()));
    }

    fn dispatched(&self, action: &ActionId, policy: InvocationPolicy) {
        self.record(action, DispatchEvent::Dispatched(policy));
    }

    fn undelivered(&self, action: &ActionId, policy: InvocationPolicy, error: &SubmitError) {
        self.record(
            action,
            DispatchEvent::Undelivered {
                policy,
                reason: error.to_string(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unresolved(id: &str) -> BindingError {
        BindingError::UnresolvedAction {
            id: id.into(),
            controller: "Viewer".into(),
        }
    }

    #[test]
    fn test_log_basic() {
        let log = DispatchLog::default();
        assert!(log.is_empty());

        log.dispatched(&"save".into(), InvocationPolicy::Direct);
        DiagnosticSink::rejected(&log, &"print".into(), &unresolved("print"));

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].sequence, 0);
        assert_eq!(entries[0].event, DispatchEvent::Dispatched(InvocationPolicy::Direct));
        assert!(entries[1].is_rejected());

        let rejected = log.rejected();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].action.as_str(), "print");
    }

    #[test]
    fn test_log_capacity() {
        let log = DispatchLog::new(3);
        for _ in 0..4 {
            log.dispatched(&"nextPage".into(), InvocationPolicy::UiAffinity);
        }

        assert_eq!(log.len(), 3);
        // sequence 0 was evicted
        assert_eq!(log.entries()[0].sequence, 1);
    }

    #[test]
    fn test_log_zero_capacity_records_nothing() {
        let log = DispatchLog::new(0);
        DiagnosticSink::rejected(&log, &"print".into(), &unresolved("print"));
        assert!(log.is_empty());
    }

    #[test]
    fn test_log_recent_newest_first() {
        let log = DispatchLog::new(10);
        for _ in 0..5 {
            log.dispatched(&"zoom".into(), InvocationPolicy::Direct);
        }

        let recent = log.recent(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].sequence, 4);
        assert_eq!(recent[1].sequence, 3);
        assert_eq!(recent[2].sequence, 2);

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_entry_elapsed_display() {
        let log = DispatchLog::new(1);
        log.dispatched(&"save".into(), InvocationPolicy::Direct);
        let display = log.entries()[0].elapsed_display();
        assert!(display.ends_with("ms") || display.ends_with('s'));
    }

    #[test]
    fn test_composed_sink_fans_out() {
        let a = Arc::new(DispatchLog::default());
        let b = Arc::new(DispatchLog::default());
        let sink = ComposedSink::new()
            .with(TracingSink::verbose())
            .with_shared(a.clone())
            .with_shared(b.clone());

        sink.rejected(&"print".into(), &unresolved("print"));
        sink.dispatched(&"save".into(), InvocationPolicy::BackgroundWorker);
        sink.undelivered(&"zoom".into(), InvocationPolicy::UiAffinity, &SubmitError::Closed);

        assert_eq!(sink.len(), 3);
        assert_eq!(a.len(), 3);
        assert_eq!(b.rejected().len(), 1);
        assert_eq!(
            b.entries()[2].event,
            DispatchEvent::Undelivered {
                policy: InvocationPolicy::UiAffinity,
                reason: "execution context is closed".into(),
            }
        );
    }
}
