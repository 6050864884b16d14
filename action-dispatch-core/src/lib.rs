//! Core traits and types for action-dispatch
//!
//! This crate routes named controller actions to an execution context chosen
//! at call time: the caller's thread, a single UI-affinity thread, or a
//! background worker.
//!
//! # Core Concepts
//!
//! - **Action**: a parameterized unit of work bound to a controller method
//! - **MethodBinding**: the resolved target of an action, or why there is none
//! - **ActionController**: owns the methods actions call into
//! - **InvocationPolicy**: `Direct`, `UiAffinity` or `BackgroundWorker`
//! - **Dispatcher**: validates actions and routes them by policy
//!
//! # Basic Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use action_dispatch_core::prelude::*;
//!
//! struct Editor {
//!     methods: MethodTable<Editor>,
//! }
//!
//! impl ActionController for Editor {
//!     fn resolve(self: Arc<Self>, id: &ActionId) -> Result<ActionMethod, BindingError> {
//!         self.methods.resolve(&self, id)
//!     }
//! }
//!
//! let editor = Arc::new(Editor {
//!     methods: MethodTable::new().action("save", |_editor: &Editor, _action: &Action| Ok(())),
//! });
//!
//! let (ui, queue) = ui_channel();
//! let dispatcher = Dispatcher::new(Arc::new(ui), &editor, None);
//!
//! // Runs now, on this thread
//! dispatcher.invoke(InvocationPolicy::Direct, "save", params![])?;
//!
//! // Logged and dropped: no such action
//! dispatcher.invoke(InvocationPolicy::Direct, "unknownAction", params![])?;
//! ```
//!
//! # Failure Handling
//!
//! Binding failures (unknown id, missing method, released controller) are
//! reported to the [`DiagnosticSink`] and returned as
//! [`DispatchOutcome::Rejected`]; they are never errors. A failure inside a
//! running action is returned to the caller for `Direct` dispatch and logged
//! by the executing context otherwise. A UI queue or worker pool that refuses
//! a work item yields [`ActionFault::Undelivered`], so a dropped action is
//! never reported as scheduled.

pub mod action;
pub mod binding;
pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod dispatcher;
pub mod error;
pub mod params;
pub mod policy;
pub mod testing;
pub mod ui;
pub mod worker;

// Core exports
pub use action::{Action, ActionId, ActionSource};
pub use binding::{ActionMethod, MethodBinding};
pub use controller::{ActionController, Handler, MethodTable};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use params::{ActionParams, ActionValue, PARAMETERS};
pub use policy::{InvocationPolicy, ParsePolicyError};

// Error exports
pub use error::{ActionFault, ActionResult, BindingError, BoxError, SubmitError};

// Execution context exports
pub use ui::{ui_channel, UiContext, UiHandle, UiQueue};
pub use worker::{Job, SpawnThread, WorkerPool};

// Diagnostics and config exports
pub use config::DispatcherConfig;
pub use diagnostics::{
    ComposedSink, DiagnosticSink, DispatchEvent, DispatchLog, DispatchLogEntry, TracingSink,
};

// Testing exports
pub use testing::{CountingPool, ManualUi};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionId, ActionSource};
    pub use crate::binding::ActionMethod;
    pub use crate::controller::{ActionController, MethodTable};
    pub use crate::diagnostics::{DiagnosticSink, DispatchLog, TracingSink};
    pub use crate::dispatcher::{DispatchOutcome, Dispatcher};
    pub use crate::error::{ActionFault, BindingError, BoxError, SubmitError};
    pub use crate::params;
    pub use crate::params::{ActionValue, PARAMETERS};
    pub use crate::policy::InvocationPolicy;
    pub use crate::ui::{ui_channel, UiContext, UiQueue};
    pub use crate::worker::WorkerPool;
}
