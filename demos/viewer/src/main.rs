//! Viewer - scripted document viewer driven by actions
//!
//! Each positional argument is one action, optionally with comma-separated
//! arguments: `open=book.pdf nextPage zoom=1.5 save close quit`.
//!
//! Try `--policy ui` or `--policy background --pool` and watch where each
//! action runs. `RUST_LOG=action_dispatch_core=trace` shows binding and
//! execution details.

mod viewer;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use action_dispatch::prelude::*;
use action_dispatch::{ComposedSink, UiHandle};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::viewer::{AppController, Viewer};

/// Viewer - run document actions under an invocation policy
#[derive(Parser, Debug)]
#[command(name = "viewer")]
#[command(about = "Dispatch document viewer actions")]
struct Args {
    /// Invocation policy: direct, ui or background
    #[arg(short, long, default_value = "direct")]
    policy: InvocationPolicy,

    /// Run background actions on the tokio blocking pool instead of fresh threads
    #[arg(long)]
    pool: bool,

    /// Dispatcher config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Time to let scheduled actions finish before exiting
    #[arg(long, default_value_t = 250)]
    settle_ms: u64,

    /// Actions to run, as `id` or `id=arg,arg`
    #[arg(default_values = ["open=manual.pdf", "nextPage", "save"])]
    actions: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_thread_names(true)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => DispatcherConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => DispatcherConfig::default(),
    };

    let app = AppController::new();
    let viewer = Viewer::new(app.clone());

    let (ui, ui_thread) = start_ui()?;

    let pool = args
        .pool
        .then(|| Arc::new(tokio::runtime::Handle::current()) as Arc<dyn WorkerPool>);
    let log = Arc::new(DispatchLog::default());
    let sink = ComposedSink::new()
        .with(TracingSink::new())
        .with_shared(log.clone());
    let dispatcher =
        Dispatcher::with_config(Arc::new(ui), &viewer, pool, config).with_sink(Arc::new(sink));

    for step in &args.actions {
        let (id, values) = parse_step(step);
        let action = dispatcher
            .action_from(ActionSource::Event(format!("cli:{step}")), id)
            .with_arguments(values);

        match dispatcher.dispatch(args.policy, action) {
            Ok(DispatchOutcome::Rejected(_)) => {}
            Ok(outcome) => info!(action = id, ?outcome, "dispatched"),
            Err(fault) => warn!(error = %fault, "action failed"),
        }
        if app.quit_requested() {
            break;
        }
    }

    tokio::time::sleep(Duration::from_millis(args.settle_ms)).await;
    // Last UI handle: the UI thread drains what is queued, then exits.
    drop(dispatcher);
    if tokio::task::spawn_blocking(move || ui_thread.join())
        .await?
        .is_err()
    {
        warn!("UI thread panicked");
    }

    let page = viewer.page();
    let summary = serde_json::json!({
        "policy": args.policy.as_str(),
        "document": page.document,
        "page": page.number,
        "pages": page.page_count,
        "zoom": page.zoom,
        "dispatched": log.len() - log.rejected().len(),
        "rejected": log
            .rejected()
            .iter()
            .map(|entry| entry.action.to_string())
            .collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Start the UI thread every UI-affinity action runs on.
///
/// The queue gets a thread of its own: a task on the multi-thread runtime
/// would move between workers and take the UI items with it.
fn start_ui() -> io::Result<(UiHandle, thread::JoinHandle<()>)> {
    UiQueue::spawn_thread("viewer-ui")
}

/// Split `id=a,b` into the action id and its positional values.
fn parse_step(step: &str) -> (&str, Vec<ActionValue>) {
    match step.split_once('=') {
        Some((id, rest)) => (id, rest.split(',').map(parse_value).collect()),
        None => (step, Vec::new()),
    }
}

fn parse_value(raw: &str) -> ActionValue {
    if let Ok(int) = raw.parse::<i64>() {
        ActionValue::Int(int)
    } else if let Ok(float) = raw.parse::<f64>() {
        ActionValue::Float(float)
    } else if let Ok(flag) = raw.parse::<bool>() {
        ActionValue::Bool(flag)
    } else {
        ActionValue::Text(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_ui_items_share_one_thread() {
        let app = AppController::new();
        let viewer = Viewer::new(app);
        let (ui, ui_thread) = start_ui().unwrap();
        let dispatcher = Dispatcher::new(Arc::new(ui.clone()), &viewer, None);
        let ran_on = Arc::new(Mutex::new(Vec::new()));

        for _ in 0..200 {
            dispatcher
                .invoke(InvocationPolicy::UiAffinity, "nextPage", params![])
                .unwrap();
            let ran_on = ran_on.clone();
            ui.run_on_ui(Box::new(move || {
                ran_on.lock().unwrap().push(thread::current().id());
            }))
            .unwrap();
            tokio::spawn(async { tokio::task::yield_now().await });
            tokio::task::yield_now().await;
        }

        drop(dispatcher);
        drop(ui);
        tokio::task::spawn_blocking(move || ui_thread.join())
            .await
            .unwrap()
            .unwrap();

        let ran_on = ran_on.lock().unwrap();
        assert_eq!(ran_on.len(), 200);
        assert!(ran_on.iter().all(|id| *id == ran_on[0]));
        assert_ne!(ran_on[0], thread::current().id());
    }

    #[test]
    fn test_parse_step() {
        let (id, values) = parse_step("open=book.pdf,3,true");
        assert_eq!(id, "open");
        assert_eq!(
            values,
            vec![
                ActionValue::Text("book.pdf".into()),
                ActionValue::Int(3),
                ActionValue::Bool(true),
            ]
        );

        let (id, values) = parse_step("nextPage");
        assert_eq!(id, "nextPage");
        assert!(values.is_empty());
    }

    #[test]
    fn test_parse_value_float() {
        assert_eq!(parse_value("1.5"), ActionValue::Float(1.5));
    }
}
