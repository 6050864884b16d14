//! Where an action runs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Execution context choice for a dispatched action.
///
/// The policy decides only *where* an action runs, never *whether* it runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationPolicy {
    /// Run on the calling thread before `invoke` returns.
    #[default]
    Direct,
    /// Queue on the UI-affinity context; runs FIFO on that context's thread.
    #[serde(alias = "AsyncUI")]
    UiAffinity,
    /// Hand to the worker pool, or to a fresh thread when there is no pool.
    #[serde(alias = "SeparatedThread")]
    BackgroundWorker,
}

impl InvocationPolicy {
    pub const ALL: [InvocationPolicy; 3] = [
        InvocationPolicy::Direct,
        InvocationPolicy::UiAffinity,
        InvocationPolicy::BackgroundWorker,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InvocationPolicy::Direct => "direct",
            InvocationPolicy::UiAffinity => "ui_affinity",
            InvocationPolicy::BackgroundWorker => "background_worker",
        }
    }

    /// Whether `invoke` blocks until the action finished.
    pub fn is_blocking(self) -> bool {
        matches!(self, InvocationPolicy::Direct)
    }
}

impl fmt::Display for InvocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a policy name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown invocation policy `{0}` (expected direct, ui or background)")]
pub struct ParsePolicyError(String);

impl FromStr for InvocationPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "direct" => Ok(InvocationPolicy::Direct),
            "ui" | "ui_affinity" | "asyncui" => Ok(InvocationPolicy::UiAffinity),
            "background" | "background_worker" | "worker" | "separatedthread" => {
                Ok(InvocationPolicy::BackgroundWorker)
            }
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}
