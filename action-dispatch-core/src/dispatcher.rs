//! Action dispatcher
//!
//! Builds an [`Action`] per call, drops it with a diagnostic when its method
//! binding is invalid, and otherwise runs it where the [`InvocationPolicy`]
//! says:
//!
//! | policy             | runs on                                   | `invoke` returns     |
//! |--------------------|-------------------------------------------|----------------------|
//! | `Direct`           | the calling thread                        | after the action     |
//! | `UiAffinity`       | the [`UiContext`], FIFO                   | immediately          |
//! | `BackgroundWorker` | the [`WorkerPool`], or a one-shot thread  | immediately          |
//!
//! # Example
//!
//! ```ignore
//! let (ui, queue) = ui_channel();
//! let dispatcher = Dispatcher::new(Arc::new(ui), &viewer, None);
//!
//! dispatcher.invoke(InvocationPolicy::Direct, "save", params![])?;
//! dispatcher.invoke(InvocationPolicy::UiAffinity, "nextPage", params![])?;
//! dispatcher.invoke(InvocationPolicy::BackgroundWorker, "open", params!["/tmp/book.pdf"])?;
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use tracing::{debug, error};

use crate::action::{Action, ActionId, ActionSource};
use crate::config::DispatcherConfig;
use crate::controller::ActionController;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::{ActionFault, BindingError};
use crate::params::ActionValue;
use crate::policy::InvocationPolicy;
use crate::ui::UiContext;
use crate::worker::{Job, SpawnThread, WorkerPool};

/// What `invoke` did with an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The binding was invalid; the action never ran.
    Rejected(BindingError),
    /// The action ran on the calling thread and finished.
    Completed,
    /// The action was handed to another execution context.
    Scheduled(InvocationPolicy),
}

impl DispatchOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, DispatchOutcome::Rejected(_))
    }
}

/// Routes a controller's actions to their execution context.
///
/// Holds only a weak reference to the controller. The worker pool and UI
/// context are shared with the host; the dispatcher submits work to them and
/// never configures or shuts them down.
pub struct Dispatcher {
    ui: Arc<dyn UiContext>,
    controller: Weak<dyn ActionController>,
    worker: Arc<dyn WorkerPool>,
    pooled: bool,
    sink: Arc<dyn DiagnosticSink>,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Create a dispatcher for `controller`.
    ///
    /// Without a `pool`, background actions each get a dedicated thread.
    pub fn new<C: ActionController>(
        ui: Arc<dyn UiContext>,
        controller: &Arc<C>,
        pool: Option<Arc<dyn WorkerPool>>,
    ) -> Self {
        Self::with_config(ui, controller, pool, DispatcherConfig::default())
    }

    /// Create a dispatcher with explicit configuration.
    pub fn with_config<C: ActionController>(
        ui: Arc<dyn UiContext>,
        controller: &Arc<C>,
        pool: Option<Arc<dyn WorkerPool>>,
        config: DispatcherConfig,
    ) -> Self {
        let controller: Arc<dyn ActionController> = controller.clone();
        let pooled = pool.is_some();
        let worker = pool.unwrap_or_else(|| {
            Arc::new(SpawnThread::new(config.worker_thread_name.clone())) as Arc<dyn WorkerPool>
        });

        Self {
            ui,
            controller: Arc::downgrade(&controller),
            worker,
            pooled,
            sink: Arc::new(TracingSink::new()),
            config,
        }
    }

    /// Replace the diagnostic sink (defaults to [`TracingSink`]).
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Whether background actions go to a supplied pool.
    pub fn has_pool(&self) -> bool {
        self.pooled
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Build and dispatch an action.
    ///
    /// `parameters` are stored under [`PARAMETERS`](crate::PARAMETERS). An
    /// invalid binding is logged and reported as
    /// [`DispatchOutcome::Rejected`], never as an error. `Err` is returned
    /// when a `Direct` action itself fails, or when the execution context
    /// refuses the work item ([`ActionFault::Undelivered`]).
    pub fn invoke(
        &self,
        policy: InvocationPolicy,
        id: impl Into<ActionId>,
        parameters: impl IntoIterator<Item = ActionValue>,
    ) -> Result<DispatchOutcome, ActionFault> {
        let action = self.action(id).with_arguments(parameters);
        self.dispatch(policy, action)
    }

    /// Build an action bound to this dispatcher's controller without running it.
    pub fn action(&self, id: impl Into<ActionId>) -> Action {
        Action::new(self.controller.clone(), None, id)
    }

    /// Build an action that records what triggered it.
    pub fn action_from(&self, source: ActionSource, id: impl Into<ActionId>) -> Action {
        Action::new(self.controller.clone(), Some(source), id)
    }

    /// Validate and route a prepared action.
    pub fn dispatch(
        &self,
        policy: InvocationPolicy,
        action: Action,
    ) -> Result<DispatchOutcome, ActionFault> {
        if let Some(error) = action.binding().error_info() {
            self.sink.rejected(action.id(), error);
            return Ok(DispatchOutcome::Rejected(error.clone()));
        }

        if self.config.trace_dispatch {
            debug!(
                action = %action.id(),
                policy = %policy,
                pooled = self.pooled,
                "Dispatching action"
            );
        }

        let id = action.id().clone();
        let submitted = match policy {
            InvocationPolicy::Direct => {
                self.sink.dispatched(&id, policy);
                action.run()?;
                return Ok(DispatchOutcome::Completed);
            }
            InvocationPolicy::UiAffinity => self.ui.run_on_ui(into_job(action, policy)),
            InvocationPolicy::BackgroundWorker => self.worker.execute(into_job(action, policy)),
        };

        match submitted {
            Ok(()) => {
                self.sink.dispatched(&id, policy);
                Ok(DispatchOutcome::Scheduled(policy))
            }
            Err(source) => {
                self.sink.undelivered(&id, policy, &source);
                Err(ActionFault::Undelivered { id, policy, source })
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("controller_alive", &(self.controller.strong_count() > 0))
            .field("pooled", &self.pooled)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Wrap an action for another context. Faults end only this work item.
fn into_job(action: Action, policy: InvocationPolicy) -> Job {
    Box::new(move || {
        if let Err(fault) = action.run() {
            error!(
                action = %fault.action_id(),
                policy = %policy,
                error = %fault,
                "Action failed on execution"
            );
        }
    })
}
