//! Log events emitted while dispatching

use std::fmt;
use std::sync::{Arc, Mutex};

use action_dispatch::prelude::*;
use action_dispatch::testing::ManualUi;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

#[derive(Debug, Clone)]
struct Captured {
    level: Level,
    message: String,
    fields: Vec<(String, String)>,
}

impl Captured {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields
                .push((field.name().to_string(), format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }
}

/// Collects every event into a shared list.
#[derive(Clone, Default)]
struct CaptureLayer {
    events: Arc<Mutex<Vec<Captured>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor {
            message: String::new(),
            fields: Vec::new(),
        };
        event.record(&mut visitor);
        self.events.lock().unwrap().push(Captured {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

/// Run `f` with a capturing subscriber and return what it logged.
fn capture(f: impl FnOnce()) -> Vec<Captured> {
    let layer = CaptureLayer::default();
    let events = layer.events.clone();
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let events = events.lock().unwrap().clone();
    events
}

struct Editor {
    methods: MethodTable<Editor>,
}

impl ActionController for Editor {
    fn resolve(self: Arc<Self>, id: &ActionId) -> Result<ActionMethod, BindingError> {
        self.methods.resolve(&self, id)
    }
}

fn editor() -> Arc<Editor> {
    Arc::new(Editor {
        methods: MethodTable::new().action("save", |_: &Editor, _: &Action| Ok(())),
    })
}

#[test]
fn test_unknown_action_logs_one_error() {
    let editor = editor();
    let dispatcher = Dispatcher::new(Arc::new(ManualUi::new()), &editor, None);

    let events = capture(|| {
        dispatcher
            .invoke(InvocationPolicy::Direct, "unknownAction", params![])
            .unwrap();
    });

    let errors: Vec<_> = events.iter().filter(|e| e.level == Level::ERROR).collect();
    assert_eq!(errors.len(), 1, "{events:?}");
    assert_eq!(errors[0].message, "The action method is not valid");
    assert_eq!(errors[0].field("action"), Some("unknownAction"));
    assert!(errors[0]
        .field("error")
        .is_some_and(|error| error.contains("unknownAction")));
}

#[test]
fn test_trace_dispatch_logs_each_dispatch() {
    let editor = editor();
    let quiet = Dispatcher::new(Arc::new(ManualUi::new()), &editor, None);
    let traced = Dispatcher::with_config(
        Arc::new(ManualUi::new()),
        &editor,
        None,
        DispatcherConfig::default().trace_dispatch(true),
    );

    let dispatching = |events: &[Captured]| {
        events
            .iter()
            .filter(|e| e.message == "Dispatching action")
            .cloned()
            .collect::<Vec<_>>()
    };

    let events = capture(|| {
        quiet
            .invoke(InvocationPolicy::Direct, "save", params![])
            .unwrap();
    });
    assert!(dispatching(&events).is_empty());

    let events = capture(|| {
        traced
            .invoke(InvocationPolicy::Direct, "save", params![])
            .unwrap();
    });
    let logged = dispatching(&events);
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].level, Level::DEBUG);
    assert_eq!(logged[0].field("action"), Some("save"));
    assert_eq!(logged[0].field("policy"), Some("direct"));
}

#[test]
fn test_refused_ui_item_logs_error() {
    let editor = editor();
    let ui = Arc::new(ManualUi::new());
    let dispatcher = Dispatcher::new(ui.clone(), &editor, None);
    ui.close();

    let events = capture(|| {
        let fault = dispatcher
            .invoke(InvocationPolicy::UiAffinity, "save", params![])
            .unwrap_err();
        assert!(matches!(fault, ActionFault::Undelivered { .. }));
    });

    let errors: Vec<_> = events.iter().filter(|e| e.level == Level::ERROR).collect();
    assert_eq!(errors.len(), 1, "{events:?}");
    assert_eq!(errors[0].message, "Action dropped, not scheduled");
    assert_eq!(errors[0].field("action"), Some("save"));
    assert_eq!(errors[0].field("policy"), Some("ui_affinity"));
}
