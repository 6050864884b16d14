//! action-dispatch: run controller actions where they belong
//!
//! Actions are named, parameterized calls into a controller. The dispatcher
//! validates each one and runs it on the caller's thread, on the UI thread,
//! or on a background worker, depending on the invocation policy.
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use action_dispatch::prelude::*;
//!
//! let (ui, mut queue) = ui_channel();
//! let dispatcher = Dispatcher::new(Arc::new(ui), &viewer, None);
//!
//! dispatcher.invoke(InvocationPolicy::UiAffinity, "nextPage", params![])?;
//!
//! // later, on the UI thread
//! queue.run_pending();
//! ```

// Re-export everything from core
pub use action_dispatch_core::*;

/// Prelude for convenient imports
pub mod prelude {
    // Actions and controllers
    pub use action_dispatch_core::{
        params, Action, ActionController, ActionId, ActionMethod, ActionSource, ActionValue,
        MethodTable, PARAMETERS,
    };

    // Dispatch
    pub use action_dispatch_core::{DispatchOutcome, Dispatcher, DispatcherConfig, InvocationPolicy};

    // Execution contexts
    pub use action_dispatch_core::{ui_channel, UiContext, UiHandle, UiQueue, WorkerPool};

    // Errors and diagnostics
    pub use action_dispatch_core::{
        ActionFault, BindingError, BoxError, DiagnosticSink, DispatchLog, SubmitError,
        TracingSink,
    };
}
