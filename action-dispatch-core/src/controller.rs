//! Controllers and their method tables
//!
//! A controller owns the business logic actions call into. It resolves an
//! [`ActionId`] to an [`ActionMethod`], or reports why it cannot.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use action_dispatch_core::prelude::*;
//!
//! struct Viewer {
//!     methods: MethodTable<Viewer>,
//! }
//!
//! impl ActionController for Viewer {
//!     fn resolve(self: Arc<Self>, id: &ActionId) -> Result<ActionMethod, BindingError> {
//!         self.methods.resolve(&self, id)
//!     }
//! }
//!
//! let methods = MethodTable::new()
//!     .method("save", |viewer: &Viewer, action: &Action| Ok(()))
//!     .route("save", "save")
//!     .route("saveAs", "save");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::action::{Action, ActionId};
use crate::binding::ActionMethod;
use crate::error::{ActionFault, BindingError, BoxError};

/// Owner of the methods actions are bound to.
pub trait ActionController: Send + Sync + 'static {
    /// Resolve `id` to a callable method.
    ///
    /// Return [`BindingError::UnresolvedAction`] for unknown ids so that
    /// resolution can continue with [`ActionController::parent`].
    fn resolve(self: Arc<Self>, id: &ActionId) -> Result<ActionMethod, BindingError>;

    /// Controller consulted for ids this one does not know.
    fn parent(&self) -> Option<Arc<dyn ActionController>> {
        None
    }

    /// Name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A controller method: receives the controller and the running action.
pub type Handler<C> = Arc<dyn Fn(&C, &Action) -> Result<(), BoxError> + Send + Sync>;

/// Maps action ids to named methods, and method names to handlers.
///
/// Several ids may route to the same method.
pub struct MethodTable<C> {
    methods: HashMap<String, Handler<C>>,
    routes: HashMap<ActionId, String>,
}

impl<C> Default for MethodTable<C> {
    fn default() -> Self {
        Self {
            methods: HashMap::new(),
            routes: HashMap::new(),
        }
    }
}

impl<C> fmt::Debug for MethodTable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodTable")
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("routes", &self.routes)
            .finish()
    }
}

impl<C: ActionController> MethodTable<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method under `name`.
    pub fn method<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&C, &Action) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(handler));
        self
    }

    /// Route action `id` to the method called `method`.
    ///
    /// The method does not have to exist yet; a missing method surfaces as
    /// [`BindingError::UnresolvedMethod`] when the id is resolved.
    pub fn route(mut self, id: impl Into<ActionId>, method: impl Into<String>) -> Self {
        self.routes.insert(id.into(), method.into());
        self
    }

    /// Register a method and route the id of the same name to it.
    pub fn action<F>(self, id: &str, handler: F) -> Self
    where
        F: Fn(&C, &Action) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.method(id, handler).route(id, id)
    }

    /// Whether `id` is routed by this table.
    pub fn handles(&self, id: &ActionId) -> bool {
        self.routes.contains_key(id)
    }

    /// Routed action ids.
    pub fn action_ids(&self) -> impl Iterator<Item = &ActionId> {
        self.routes.keys()
    }

    /// Resolve `id` for `controller`.
    ///
    /// The returned method holds only a weak reference to the controller.
    pub fn resolve(
        &self,
        controller: &Arc<C>,
        id: &ActionId,
    ) -> Result<ActionMethod, BindingError> {
        let method = self
            .routes
            .get(id)
            .ok_or_else(|| BindingError::UnresolvedAction {
                id: id.clone(),
                controller: controller.name().to_string(),
            })?;

        let handler = self
            .methods
            .get(method)
            .cloned()
            .ok_or_else(|| BindingError::UnresolvedMethod {
                id: id.clone(),
                method: method.clone(),
                controller: controller.name().to_string(),
            })?;

        let weak = Arc::downgrade(controller);
        Ok(ActionMethod::new(method.as_str(), move |action: &Action| {
            let controller = weak
                .upgrade()
                .ok_or_else(|| ActionFault::ControllerReleased(action.id().clone()))?;
            handler(&controller, action).map_err(|source| ActionFault::Failed {
                id: action.id().clone(),
                source,
            })
        }))
    }
}
