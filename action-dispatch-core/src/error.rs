//! Error types for binding and running actions
//!
//! Two families of failure exist at this layer:
//!
//! - [`BindingError`]: the action cannot be bound to a callable target. The
//!   dispatcher absorbs these (logs and drops the action); they never surface
//!   as an `Err` from `invoke`.
//! - [`ActionFault`]: the bound target failed while running, or a context
//!   refused to take it. `Direct` failures and refused submissions are handed
//!   back to the caller; scheduled actions report their own failures on the
//!   context that ran them.

use std::io;

use thiserror::Error;

use crate::action::ActionId;
use crate::policy::InvocationPolicy;

/// Boxed error returned by action handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of running an action.
pub type ActionResult = Result<(), ActionFault>;

/// Why an action id could not be bound to a callable target.
///
/// Each variant carries a distinct diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// The action id is empty.
    #[error("action id is empty")]
    EmptyId,

    /// No controller in the chain knows this action id.
    #[error("action `{id}` is not handled by controller `{controller}`")]
    UnresolvedAction { id: ActionId, controller: String },

    /// The id is routed to a method the controller does not provide.
    #[error("action `{id}` is routed to method `{method}`, which controller `{controller}` does not provide")]
    UnresolvedMethod {
        id: ActionId,
        method: String,
        controller: String,
    },

    /// The controller was dropped, so the target can no longer be reached.
    #[error("controller for action `{id}` has been released")]
    ControllerReleased { id: ActionId },
}

impl BindingError {
    /// The action id this error refers to, if any.
    pub fn action_id(&self) -> Option<&ActionId> {
        match self {
            BindingError::EmptyId => None,
            BindingError::UnresolvedAction { id, .. }
            | BindingError::UnresolvedMethod { id, .. }
            | BindingError::ControllerReleased { id } => Some(id),
        }
    }
}

/// Failure raised while an action runs.
#[derive(Debug, Error)]
pub enum ActionFault {
    /// The action was run although its binding is invalid.
    #[error("action `{id}` is not runnable: {source}")]
    Unbound {
        id: ActionId,
        #[source]
        source: BindingError,
    },

    /// The controller was dropped between binding and execution.
    #[error("controller for action `{0}` was released before the action ran")]
    ControllerReleased(ActionId),

    /// The action's handler returned an error.
    #[error("action `{id}` failed: {source}")]
    Failed {
        id: ActionId,
        #[source]
        source: BoxError,
    },

    /// The execution context refused the work item, so the action never ran.
    #[error("action `{id}` was not scheduled on {policy}: {source}")]
    Undelivered {
        id: ActionId,
        policy: InvocationPolicy,
        #[source]
        source: SubmitError,
    },
}

impl ActionFault {
    /// The id of the action that faulted.
    pub fn action_id(&self) -> &ActionId {
        match self {
            ActionFault::Unbound { id, .. }
            | ActionFault::Failed { id, .. }
            | ActionFault::Undelivered { id, .. } => id,
            ActionFault::ControllerReleased(id) => id,
        }
    }
}

/// Why an execution context did not accept a work item.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The receiving side of the context is gone.
    #[error("execution context is closed")]
    Closed,

    /// A dedicated worker thread could not be started.
    #[error("failed to spawn worker thread `{name}`")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_error_messages_are_distinct() {
        let id = ActionId::new("save");
        let unresolved = BindingError::UnresolvedAction {
            id: id.clone(),
            controller: "Viewer".into(),
        };
        let method = BindingError::UnresolvedMethod {
            id: id.clone(),
            method: "doSave".into(),
            controller: "Viewer".into(),
        };
        let released = BindingError::ControllerReleased { id };

        let messages = [
            unresolved.to_string(),
            method.to_string(),
            released.to_string(),
            BindingError::EmptyId.to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(messages[0].contains("`save`"));
        assert!(messages[1].contains("doSave"));
    }

    #[test]
    fn test_fault_action_id() {
        let fault = ActionFault::Failed {
            id: ActionId::new("open"),
            source: "disk full".into(),
        };
        assert_eq!(fault.action_id().as_str(), "open");
        assert_eq!(fault.to_string(), "action `open` failed: disk full");
    }

    #[test]
    fn test_undelivered_names_policy() {
        let fault = ActionFault::Undelivered {
            id: ActionId::new("nextPage"),
            policy: InvocationPolicy::UiAffinity,
            source: SubmitError::Closed,
        };
        assert_eq!(fault.action_id().as_str(), "nextPage");
        assert_eq!(
            fault.to_string(),
            "action `nextPage` was not scheduled on ui_affinity: execution context is closed"
        );
    }
}
