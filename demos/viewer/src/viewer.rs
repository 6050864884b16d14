//! Viewer controller and its application-level parent

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use action_dispatch::prelude::*;
use tracing::info;

/// Page and zoom state of the open document.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub document: Option<String>,
    pub number: i64,
    pub page_count: i64,
    pub zoom: f64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            document: None,
            number: 1,
            page_count: 1,
            zoom: 1.0,
        }
    }
}

/// Answers actions the viewer does not route itself.
pub struct AppController {
    quit: AtomicBool,
    methods: MethodTable<AppController>,
}

impl AppController {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            quit: AtomicBool::new(false),
            methods: MethodTable::new()
                .action("about", |_app: &AppController, _: &Action| {
                    info!(version = env!("CARGO_PKG_VERSION"), "viewer demo");
                    Ok(())
                })
                .action("quit", |app: &AppController, _: &Action| {
                    app.quit.store(true, Ordering::SeqCst);
                    Ok(())
                }),
        })
    }

    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::SeqCst)
    }
}

impl ActionController for AppController {
    fn resolve(self: Arc<Self>, id: &ActionId) -> Result<ActionMethod, BindingError> {
        self.methods.resolve(&self, id)
    }

    fn name(&self) -> &str {
        "AppController"
    }
}

pub struct Viewer {
    page: Mutex<Page>,
    app: Arc<AppController>,
    methods: MethodTable<Viewer>,
}

impl Viewer {
    pub fn new(app: Arc<AppController>) -> Arc<Self> {
        Arc::new(Self {
            page: Mutex::new(Page::default()),
            app,
            methods: MethodTable::new()
                .action("open", Viewer::open)
                .action("nextPage", |viewer: &Viewer, _: &Action| {
                    viewer.turn(1);
                    Ok(())
                })
                .action("prevPage", |viewer: &Viewer, _: &Action| {
                    viewer.turn(-1);
                    Ok(())
                })
                .action("zoom", Viewer::zoom)
                .action("save", Viewer::save)
                // Routed, but the method was never written.
                .route("close", "closeDocument"),
        })
    }

    pub fn page(&self) -> Page {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Page> {
        self.page.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn open(&self, action: &Action) -> Result<(), BoxError> {
        let path = action
            .arg(0)
            .and_then(ActionValue::as_str)
            .unwrap_or("untitled.pdf")
            .to_string();
        let pages = action
            .parameter("pages")
            .and_then(ActionValue::as_i64)
            .unwrap_or(12);

        let mut page = self.lock();
        *page = Page {
            document: Some(path.clone()),
            page_count: pages.max(1),
            ..Page::default()
        };
        info!(document = %path, pages = page.page_count, "opened");
        Ok(())
    }

    fn turn(&self, delta: i64) {
        let mut page = self.lock();
        page.number = (page.number + delta).clamp(1, page.page_count);
        info!(page = page.number, of = page.page_count, "page");
    }

    fn zoom(&self, action: &Action) -> Result<(), BoxError> {
        let factor = action
            .arg(0)
            .and_then(ActionValue::as_f64)
            .ok_or("zoom needs a numeric factor")?;
        if factor <= 0.0 {
            return Err(format!("zoom factor must be positive, got {factor}").into());
        }
        let mut page = self.lock();
        page.zoom = factor;
        info!(zoom = factor, "zoom");
        Ok(())
    }

    fn save(&self, _action: &Action) -> Result<(), BoxError> {
        let document = self.lock().document.clone().ok_or("nothing to save")?;
        // Stand-in for slow IO, so background dispatch is visible.
        thread::sleep(Duration::from_millis(50));
        info!(
            document = %document,
            thread = thread::current().name().unwrap_or("<unnamed>"),
            "saved"
        );
        Ok(())
    }
}

impl ActionController for Viewer {
    fn resolve(self: Arc<Self>, id: &ActionId) -> Result<ActionMethod, BindingError> {
        self.methods.resolve(&self, id)
    }

    fn parent(&self) -> Option<Arc<dyn ActionController>> {
        Some(self.app.clone())
    }

    fn name(&self) -> &str {
        "Viewer"
    }
}
