//! Page bootstrap
//!
//! [`App`] wires one window, one [`Store`] and one [`Router`] together,
//! registers the configured routes and mounts an [`Outlet`] under
//! `<main id="app">` that follows the current route.

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::{
    component::Lifecycle,
    dom::{handler, Document, ListenerId, Window},
    infrastructure::config::Config,
    router::{Params, Route, Router},
    store::Store,
    subscription::Unsubscribe,
    Result,
};

pub mod outlet;

pub use outlet::{Outlet, PageFactory, PageView};

/// Id of the element the outlet renders into
pub const ROOT_ID: &str = "app";

pub struct App {
    window: Window,
    store: Store,
    router: Router,
    outlet: Outlet,
    route_subscription: Option<Unsubscribe>,
    keydown: Option<ListenerId>,
}

impl App {
    /// Boot against a fresh window at the configured origin and start path
    pub fn new(config: &Config) -> Self {
        let window = Window::new(&config.app.origin, &config.app.start_path);
        Self::with_window(window, config)
    }

    pub fn with_window(window: Window, config: &Config) -> Self {
        let store = Store::new();
        let router = Router::new(window.clone(), store.clone(), config.router_options());
        router.register_routes(config.routes.iter().cloned());

        let document = window.document();
        let container = document
            .create_element("main")
            .with_attribute("id", ROOT_ID);
        document.body().append_child(&container);
        let outlet = Outlet::new(document, container);

        let pages = outlet.clone();
        let route_subscription = router.subscribe(move |route, params| pages.show(route, params));

        let modal_store = store.clone();
        let keydown = document.add_event_listener(
            "keydown",
            handler(move |event| {
                if event.key.as_deref() == Some("Escape") && modal_store.modal().is_open() {
                    debug!("escape closes modal");
                    modal_store.close_modal();
                }
            }),
        );

        Self {
            window,
            store,
            router,
            outlet,
            route_subscription: Some(route_subscription),
            keydown: Some(keydown),
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        self.window.document()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn outlet(&self) -> &Outlet {
        &self.outlet
    }

    /// Mount pages built by `factory` for routes naming `component`
    pub fn register_page<F>(&self, component: &str, factory: F)
    where
        F: Fn(&Document, &Route, &Params) -> Box<dyn Lifecycle> + 'static,
    {
        self.outlet.register(component, factory);
    }

    /// Resolve the path the window was opened with
    pub fn start(&self) -> Result<()> {
        self.router.init()?;
        Ok(())
    }

    /// Remove every global listener and the outlet; idempotent
    pub fn dispose(&mut self) {
        let Some(keydown) = self.keydown.take() else {
            return;
        };
        if let Some(subscription) = self.route_subscription.take() {
            subscription.unsubscribe();
        }
        self.document().remove_event_listener(keydown);
        self.router.dispose();
        self.outlet.clear();
        self.outlet.container().remove();
        info!("app disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.keydown.is_none()
    }

    /// JSON summary of the page: location, route, state and history
    pub fn report(&self, include_html: bool) -> Result<Value> {
        let history = self.window.history();
        let mut report = json!({
            "location": self.window.location(),
            "title": self.document().title(),
            "route": self.router.current_route().as_deref(),
            "params": self.router.current_params(),
            "state": serde_json::to_value(self.store.get_state())?,
            "version": self.store.version(),
            "history": {"length": history.len(), "index": history.index()},
        });
        if include_html {
            report["html"] = Value::String(self.document().body().outer_html());
        }
        Ok(report)
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dom::Event;

    fn app() -> App {
        let mut config = Config::embedded().unwrap();
        config.app.start_path = "/products/9".to_string();
        App::new(&config)
    }

    #[test]
    fn test_start_mounts_page_for_start_path() {
        let app = app();
        app.start().unwrap();

        let page = app.document().get_element_by_id(ROOT_ID).unwrap().children()[0].clone();
        assert_eq!(page.attribute("data-param-id").as_deref(), Some("9"));
        assert_eq!(app.store().route().pattern.as_deref(), Some("/products/:id"));
    }

    #[test]
    fn test_escape_closes_modal() {
        let app = app();
        app.store().open_modal("cart-preview");
        app.document().dispatch_event(&mut Event::key_down("Enter"));
        assert!(app.store().modal().is_open());
        app.document().dispatch_event(&mut Event::key_down("Escape"));
        assert!(!app.store().modal().is_open());
    }

    #[test]
    fn test_dispose_is_symmetric() {
        let mut app = app();
        app.start().unwrap();
        app.dispose();
        app.dispose();

        assert!(app.is_disposed());
        assert_eq!(app.window().listener_count(), 0);
        assert_eq!(app.document().listener_count(), 0);
        assert_eq!(app.router().subscriber_count(), 0);
        assert!(app.document().get_element_by_id(ROOT_ID).is_none());
    }

    #[test]
    fn test_report() {
        let app = app();
        app.start().unwrap();
        let report = app.report(false).unwrap();
        assert_eq!(report["location"]["pathname"], "/products/9");
        assert_eq!(report["params"]["id"], "9");
        assert_eq!(report["history"]["length"], 1);
        assert!(report.get("html").is_none());
    }
}
