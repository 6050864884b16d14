//! Runnable actions bound to a controller
//!
//! An [`Action`] is built fresh for every dispatch, carries its parameters,
//! and is consumed by [`Action::run`], so it executes at most once and its
//! parameters cannot change after it has started.

use std::fmt;
use std::sync::{Arc, Weak};

use crate::binding::MethodBinding;
use crate::controller::ActionController;
use crate::error::{ActionFault, ActionResult};
use crate::params::{ActionParams, ActionValue, PARAMETERS};

/// Identifies an action within a controller.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ActionId(String);

impl ActionId {
    /// Create a new action id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ActionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&ActionId> for ActionId {
    fn from(id: &ActionId) -> Self {
        id.clone()
    }
}

/// What triggered an action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionSource {
    /// Chained from another action.
    Action(ActionId),
    /// Raised by a host event (menu item, key binding, gesture, ...).
    Event(String),
}

/// A parameterized unit of work bound to a controller method.
pub struct Action {
    id: ActionId,
    controller: Weak<dyn ActionController>,
    source: Option<ActionSource>,
    params: ActionParams,
    binding: MethodBinding,
}

impl Action {
    /// Create an action and bind it against `controller`.
    ///
    /// Binding never fails loudly; check [`Action::binding`] for validity.
    pub fn new(
        controller: Weak<dyn ActionController>,
        source: Option<ActionSource>,
        id: impl Into<ActionId>,
    ) -> Self {
        let id = id.into();
        let binding = MethodBinding::resolve(&controller, &id);
        Self {
            id,
            controller,
            source,
            params: ActionParams::new(),
            binding,
        }
    }

    pub fn id(&self) -> &ActionId {
        &self.id
    }

    pub fn source(&self) -> Option<&ActionSource> {
        self.source.as_ref()
    }

    pub fn binding(&self) -> &MethodBinding {
        &self.binding
    }

    pub fn params(&self) -> &ActionParams {
        &self.params
    }

    /// The owning controller, if it is still alive.
    pub fn controller(&self) -> Option<Arc<dyn ActionController>> {
        self.controller.upgrade()
    }

    /// Set a named parameter.
    pub fn put_value(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ActionValue>,
    ) -> &mut Self {
        self.params.insert(name, value);
        self
    }

    /// Set a named parameter whose value is produced right before the action runs.
    pub fn put_deferred<F>(&mut self, name: impl Into<String>, producer: F) -> &mut Self
    where
        F: Fn() -> ActionValue + Send + Sync + 'static,
    {
        self.params.insert_deferred(name, producer);
        self
    }

    /// Store the caller's positional values under [`PARAMETERS`].
    pub fn with_arguments(mut self, values: impl IntoIterator<Item = ActionValue>) -> Self {
        self.params.insert(PARAMETERS, ActionValue::List(values.into_iter().collect()));
        self
    }

    /// Get a named parameter.
    pub fn parameter(&self, name: &str) -> Option<&ActionValue> {
        self.params.get(name)
    }

    /// Get a named parameter or `default` when it is missing.
    pub fn parameter_or<'a>(&'a self, name: &str, default: &'a ActionValue) -> &'a ActionValue {
        self.params.get(name).unwrap_or(default)
    }

    /// Positional values passed to `invoke`.
    pub fn arguments(&self) -> &[ActionValue] {
        self.params.positional()
    }

    /// Positional value at `index`.
    pub fn arg(&self, index: usize) -> Option<&ActionValue> {
        self.params.positional().get(index)
    }

    /// Execute the bound method on the calling thread.
    ///
    /// Deferred parameters are produced first. Returns
    /// [`ActionFault::Unbound`] without running anything if the binding is
    /// invalid.
    pub fn run(mut self) -> ActionResult {
        let method = match self.binding.method() {
            Ok(method) => method.clone(),
            Err(source) => {
                return Err(ActionFault::Unbound {
                    id: self.id.clone(),
                    source: source.clone(),
                })
            }
        };

        self.params.resolve_deferred();
        tracing::trace!(action = %self.id, method = method.name(), "running action");
        method.call(&self)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("params", &self.params)
            .field("valid", &self.binding.is_valid())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::MethodTable;
    use crate::error::BindingError;
    use crate::params;
    use std::sync::Mutex;

    struct Reader {
        opened: Mutex<Vec<String>>,
        methods: MethodTable<Reader>,
    }

    impl Reader {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                opened: Mutex::new(Vec::new()),
                methods: MethodTable::new()
                    .method("open", |reader: &Reader, action: &Action| {
                        let path = action
                            .arg(0)
                            .and_then(ActionValue::as_str)
                            .ok_or("missing path")?;
                        reader.opened.lock().unwrap().push(path.to_string());
                        Ok(())
                    })
                    .route("open", "open")
                    .route("openRecent", "open"),
            })
        }
    }

    impl ActionController for Reader {
        fn resolve(
            self: Arc<Self>,
            id: &ActionId,
        ) -> Result<crate::binding::ActionMethod, BindingError> {
            self.methods.resolve(&self, id)
        }
    }

    fn action_for(reader: &Arc<Reader>, id: &str) -> Action {
        let controller: Arc<dyn ActionController> = reader.clone();
        Action::new(Arc::downgrade(&controller), None, id)
    }

    #[test]
    fn test_action_id() {
        let a = ActionId::new("save");
        let b = ActionId::from("save");
        let c: ActionId = String::from("save").into();

        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.to_string(), "save");
        assert!(ActionId::new("").is_empty());
    }

    #[test]
    fn test_run_passes_arguments() {
        let reader = Reader::new();
        let action = action_for(&reader, "openRecent").with_arguments(params!["/tmp/book.pdf"]);

        assert!(action.binding().is_valid());
        action.run().unwrap();

        assert_eq!(*reader.opened.lock().unwrap(), vec!["/tmp/book.pdf"]);
    }

    #[test]
    fn test_run_reports_handler_error() {
        let reader = Reader::new();
        let fault = action_for(&reader, "open").run().unwrap_err();

        assert!(matches!(fault, ActionFault::Failed { .. }));
        assert_eq!(fault.action_id().as_str(), "open");
        assert!(reader.opened.lock().unwrap().is_empty());
    }

    #[test]
    fn test_run_unbound_does_nothing() {
        let reader = Reader::new();
        let action = action_for(&reader, "print");

        assert!(!action.binding().is_valid());
        assert!(matches!(action.run(), Err(ActionFault::Unbound { .. })));
    }

    #[test]
    fn test_named_and_deferred_parameters() {
        let reader = Reader::new();
        let mut action = action_for(&reader, "open");
        action
            .put_value("zoom", 2)
            .put_deferred("page", || ActionValue::Int(9));

        assert_eq!(action.parameter("zoom"), Some(&ActionValue::Int(2)));
        assert!(action.parameter("page").is_none());
        assert_eq!(action.params().names().collect::<Vec<_>>(), vec!["page", "zoom"]);
        assert_eq!(
            action.parameter_or("missing", &ActionValue::Bool(false)),
            &ActionValue::Bool(false)
        );
        assert!(action.arguments().is_empty());
    }

    #[test]
    fn test_source_and_controller_backref() {
        let reader = Reader::new();
        let controller: Arc<dyn ActionController> = reader.clone();
        let action = Action::new(
            Arc::downgrade(&controller),
            Some(ActionSource::Event("menu:open".into())),
            "open",
        );

        assert_eq!(action.source(), Some(&ActionSource::Event("menu:open".into())));
        assert!(action.controller().is_some());

        drop(controller);
        drop(reader);
        assert!(action.controller().is_none());
    }
}
