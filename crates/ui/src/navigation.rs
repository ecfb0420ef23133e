use std::sync::{Arc, Mutex};

use gpui::*;
use snafu::Snafu;
use tokio::sync::mpsc;

/// Path of the application root.
pub const HOME_PATH: &str = "/";
pub const CHAT_PATH: &str = "/chat";

/// Top-level location inside the main window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    #[default]
    Home,
    Chat,
}

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub(crate)))]
pub enum RouteError {
    #[snafu(display("no route matches path '{path}'"))]
    Unknown { stage: &'static str, path: String },
}

impl Route {
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let trimmed = path.trim();
        let normalized = match trimmed.strip_suffix('/') {
            Some(rest) if !rest.is_empty() => rest,
            _ => trimmed,
        };

        match normalized {
            "" | HOME_PATH => Ok(Self::Home),
            CHAT_PATH => Ok(Self::Chat),
            _ => UnknownSnafu {
                stage: "parse-route",
                path: path.to_string(),
            }
            .fail(),
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Home => HOME_PATH,
            Self::Chat => CHAT_PATH,
        }
    }
}

/// Platform helper that opens an application location.
///
/// Calls are fire-and-forget: implementations queue the request and return.
pub trait Navigator: Send + Sync {
    fn open_window(&self, path: &str);
}

/// Navigator backed by an unbounded channel drained by [`Router`].
#[derive(Debug, Clone)]
pub struct NavigationRequests {
    sender: mpsc::UnboundedSender<String>,
}

impl NavigationRequests {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Navigator for NavigationRequests {
    fn open_window(&self, path: &str) {
        if self.sender.send(path.to_string()).is_err() {
            tracing::warn!("navigation to '{path}' dropped: router is gone");
        }
    }
}

/// Navigator that only records requested paths.
#[derive(Debug, Default, Clone)]
pub struct RecordingNavigator {
    opened: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn opened(&self) -> Vec<String> {
        self.opened
            .lock()
            .map(|opened| opened.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn open_window(&self, path: &str) {
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(path.to_string());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteChanged {
    pub route: Route,
}

/// Owns the current route and applies queued navigation requests.
pub struct Router {
    route: Route,
    navigator: Arc<NavigationRequests>,
    _drain_task: Task<()>,
}

impl EventEmitter<RouteChanged> for Router {}

impl Router {
    pub fn new(cx: &mut Context<Self>) -> Self {
        let (navigator, mut requests) = NavigationRequests::channel();

        let drain_task = cx.spawn(async move |this, cx| {
            while let Some(path) = requests.recv().await {
                let applied = this.update(cx, |router, cx| router.open(&path, cx));
                if applied.is_err() {
                    break;
                }
            }
        });

        Self {
            route: Route::default(),
            navigator: Arc::new(navigator),
            _drain_task: drain_task,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn navigator(&self) -> Arc<dyn Navigator> {
        self.navigator.clone()
    }

    /// Resolves `path` and switches to it. Unknown paths are logged and ignored.
    pub fn open(&mut self, path: &str, cx: &mut Context<Self>) {
        match Route::parse(path) {
            Ok(route) => self.set_route(route, cx),
            Err(error) => tracing::warn!("ignoring navigation request: {error}"),
        }
    }

    pub fn set_route(&mut self, route: Route, cx: &mut Context<Self>) {
        if self.route == route {
            return;
        }

        tracing::debug!("route changed to {}", route.path());
        self.route = route;
        cx.emit(RouteChanged { route });
        cx.notify();
    }
}
