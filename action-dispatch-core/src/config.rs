//! Dispatcher configuration

use serde::Deserialize;

pub(crate) const DEFAULT_WORKER_THREAD_NAME: &str = "action-worker";

/// Settings for a [`Dispatcher`](crate::Dispatcher).
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```
/// use action_dispatch_core::DispatcherConfig;
///
/// let config = DispatcherConfig::from_json(r#"{ "trace_dispatch": true }"#).unwrap();
/// assert!(config.trace_dispatch);
/// assert_eq!(config.worker_thread_name, "action-worker");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatcherConfig {
    /// Name of threads spawned for background actions when no pool is supplied
    pub worker_thread_name: String,
    /// Emit a debug event for every dispatched action
    pub trace_dispatch: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            worker_thread_name: DEFAULT_WORKER_THREAD_NAME.to_string(),
            trace_dispatch: false,
        }
    }
}

impl DispatcherConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn worker_thread_name(mut self, name: impl Into<String>) -> Self {
        self.worker_thread_name = name.into();
        self
    }

    pub fn trace_dispatch(mut self, enabled: bool) -> Self {
        self.trace_dispatch = enabled;
        self
    }
}
