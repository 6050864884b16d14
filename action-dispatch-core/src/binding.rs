//! Binding action ids to callable targets

use std::fmt;
use std::sync::{Arc, Weak};

use crate::action::{Action, ActionId};
use crate::controller::ActionController;
use crate::error::{ActionResult, BindingError};

/// Upper bound on parent hops while resolving, guards against cycles.
pub const MAX_CONTROLLER_DEPTH: usize = 16;

type Target = Arc<dyn Fn(&Action) -> ActionResult + Send + Sync>;

/// A resolved, callable controller method.
#[derive(Clone)]
pub struct ActionMethod {
    name: Arc<str>,
    target: Target,
}

impl ActionMethod {
    pub fn new<F>(name: impl Into<Arc<str>>, target: F) -> Self
    where
        F: Fn(&Action) -> ActionResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            target: Arc::new(target),
        }
    }

    /// Method name the action id was routed to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call the target synchronously.
    pub fn call(&self, action: &Action) -> ActionResult {
        (self.target)(action)
    }
}

impl fmt::Debug for ActionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionMethod")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Outcome of resolving an action id against a controller.
///
/// Computed once when the [`Action`] is created and never changes.
#[derive(Clone, Debug)]
pub struct MethodBinding {
    result: Result<ActionMethod, BindingError>,
}

impl MethodBinding {
    /// Resolve `id` against `controller`, falling back to its parents when
    /// the id is unknown locally.
    pub fn resolve(controller: &Weak<dyn ActionController>, id: &ActionId) -> Self {
        if id.is_empty() {
            return Self::invalid(BindingError::EmptyId);
        }

        let Some(mut current) = controller.upgrade() else {
            return Self::invalid(BindingError::ControllerReleased { id: id.clone() });
        };
        let origin = current.name().to_string();

        for _ in 0..MAX_CONTROLLER_DEPTH {
            match Arc::clone(&current).resolve(id) {
                Err(BindingError::UnresolvedAction { .. }) => match current.parent() {
                    Some(parent) => current = parent,
                    None => break,
                },
                result => return Self { result },
            }
        }

        Self::invalid(BindingError::UnresolvedAction {
            id: id.clone(),
            controller: origin,
        })
    }

    pub fn invalid(error: BindingError) -> Self {
        Self { result: Err(error) }
    }

    pub fn is_valid(&self) -> bool {
        self.result.is_ok()
    }

    /// Why the binding is invalid, `None` when it is valid.
    pub fn error_info(&self) -> Option<&BindingError> {
        self.result.as_ref().err()
    }

    pub fn method(&self) -> Result<&ActionMethod, &BindingError> {
        self.result.as_ref()
    }
}
