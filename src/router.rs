//! Single-page-application router
//!
//! Resolves paths against registered [`Route`]s, enforces auth guards against
//! the [`Store`], keeps the window history in sync and intercepts same-origin
//! link clicks.
//!
//! ## Resolution pipeline
//!
//! 1. Match the current `location.pathname` (see [`RouteTable::match_path`]).
//!    No match and no catch-all: log, return [`RouterError::RouteNotFound`],
//!    leave the current route as it was.
//! 2. Guard: a `requires_auth` route while the store is signed out issues a
//!    *replace* navigation to the route's `auth_redirect` (or the configured
//!    default) and runs the whole pipeline again for that target.
//! 3. Commit: set the document title, write the `route` slice, notify route
//!    subscribers with `(route, params)`.
//!
//! Redirect chains that revisit a path, or grow past
//! [`RouterOptions::max_redirects`], stop with
//! [`RouterError::GuardRedirectLoop`] instead of recursing forever.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::{
    dom::{handler, ListenerId, Window},
    store::{RouteState, Store},
    subscription::{Subscribers, Unsubscribe},
    Result,
};

pub mod error;
pub mod links;
pub mod route;
pub mod table;

pub use error::RouterError;
pub use route::{Params, Route, RouteMatch};
pub use table::RouteTable;

/// Listener for committed navigations
pub type RouteListener = dyn Fn(&Route, &Params) -> Result<()>;

/// Router behavior that is not part of the route table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterOptions {
    /// Document title for routes without their own
    pub default_title: String,
    /// Guard redirect target for routes without `auth_redirect`
    pub default_auth_redirect: String,
    /// Longest guard redirect chain followed for a single navigation
    pub max_redirects: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            default_title: "Storefront".to_string(),
            default_auth_redirect: "/".to_string(),
            max_redirects: 8,
        }
    }
}

/// Options for [`Router::navigate`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing one
    pub replace: bool,
    /// State stored with the history entry
    pub state: Value,
}

impl NavigateOptions {
    pub fn push() -> Self {
        Self::default()
    }

    pub fn replace() -> Self {
        Self {
            replace: true,
            ..Self::default()
        }
    }

    pub fn with_state(mut self, state: Value) -> Self {
        self.state = state;
        self
    }
}

struct DomListeners {
    popstate: ListenerId,
    click: ListenerId,
}

struct RouterInner {
    window: Window,
    store: Store,
    options: RouterOptions,
    table: RefCell<RouteTable>,
    current: RefCell<Option<RouteMatch>>,
    current_path: RefCell<Option<String>>,
    subscribers: Subscribers<RouteListener>,
    dom_listeners: RefCell<Option<DomListeners>>,
    // Outcome of the last popstate-driven resolution
    traversal_error: RefCell<Option<RouterError>>,
}

impl RouterInner {
    fn detach(&self) {
        if let Some(listeners) = self.dom_listeners.borrow_mut().take() {
            self.window.remove_event_listener(listeners.popstate);
            self.window
                .document()
                .remove_event_listener(listeners.click);
            debug!("router detached from window");
        }
    }
}

impl Drop for RouterInner {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Shared handle to the page's router
///
/// Construction registers one `popstate` listener on the window and one
/// `click` listener on the document; [`dispose`](Self::dispose) (or dropping
/// the last handle) removes both.
#[derive(Clone)]
pub struct Router(Rc<RouterInner>);

impl Router {
    pub fn new(window: Window, store: Store, options: RouterOptions) -> Self {
        let router = Self(Rc::new(RouterInner {
            window,
            store,
            options,
            table: RefCell::new(RouteTable::new()),
            current: RefCell::new(None),
            current_path: RefCell::new(None),
            subscribers: Subscribers::new(),
            dom_listeners: RefCell::new(None),
            traversal_error: RefCell::new(None),
        }));
        router.attach();
        router
    }

    fn attach(&self) {
        let weak: Weak<RouterInner> = Rc::downgrade(&self.0);
        let popstate = self.0.window.add_event_listener(
            "popstate",
            handler(move |_| {
                if let Some(inner) = weak.upgrade() {
                    let router = Router(inner);
                    let outcome = router.resolve(Vec::new()).err();
                    *router.0.traversal_error.borrow_mut() = outcome;
                }
            }),
        );

        let weak: Weak<RouterInner> = Rc::downgrade(&self.0);
        let click = self.0.window.document().add_event_listener(
            "click",
            handler(move |event| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let router = Router(inner);
                let location = router.0.window.location();
                if let Some(path) = links::intercepted_path(event, &location) {
                    event.prevent_default();
                    debug!(%path, "intercepted link click");
                    let _ = router.navigate(&path, NavigateOptions::push());
                }
            }),
        );

        *self.0.dom_listeners.borrow_mut() = Some(DomListeners { popstate, click });
    }

    /// Remove the window and document listeners; idempotent
    pub fn dispose(&self) {
        self.0.detach();
    }

    pub fn is_attached(&self) -> bool {
        self.0.dom_listeners.borrow().is_some()
    }

    pub fn window(&self) -> &Window {
        &self.0.window
    }

    pub fn store(&self) -> &Store {
        &self.0.store
    }

    pub fn options(&self) -> &RouterOptions {
        &self.0.options
    }

    /// Add routes in order; see [`RouteTable::insert`] for duplicates
    pub fn register_routes<I>(&self, routes: I)
    where
        I: IntoIterator<Item = Route>,
    {
        let mut table = self.0.table.borrow_mut();
        table.extend(routes);
        debug!(routes = table.len(), "routes registered");
    }

    pub fn routes(&self) -> Vec<Rc<Route>> {
        self.0.table.borrow().routes().cloned().collect()
    }

    /// Match without navigating
    pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
        self.0.table.borrow().match_path(path)
    }

    /// Resolve the path the page loaded with
    pub fn init(&self) -> std::result::Result<(), RouterError> {
        info!(path = %self.0.window.location().full_path(), "router init");
        self.resolve(Vec::new())
    }

    /// Go to `path`
    ///
    /// Does nothing when `path` is exactly the current browser path (query
    /// and hash included, no normalization). Otherwise pushes or replaces the
    /// history entry and resolves synchronously.
    pub fn navigate(
        &self,
        path: &str,
        options: NavigateOptions,
    ) -> std::result::Result<(), RouterError> {
        if path == self.0.window.location().full_path() {
            debug!(%path, "already at path, navigation skipped");
            return Ok(());
        }
        self.go_to(path, options, Vec::new())
    }

    /// Step back one history entry
    ///
    /// Returns the error the `popstate` resolution ran into, if any. At the
    /// start of history nothing happens and this is `Ok`.
    pub fn back(&self) -> std::result::Result<(), RouterError> {
        self.traverse(-1)
    }

    pub fn forward(&self) -> std::result::Result<(), RouterError> {
        self.traverse(1)
    }

    fn traverse(&self, delta: isize) -> std::result::Result<(), RouterError> {
        self.0.traversal_error.borrow_mut().take();
        self.0.window.history().go(delta);
        match self.0.traversal_error.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Listen to committed navigations
    pub fn subscribe<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&Route, &Params) -> Result<()> + 'static,
    {
        let id = self.0.subscribers.add(Rc::new(listener));
        let router: Weak<RouterInner> = Rc::downgrade(&self.0);
        Unsubscribe::new(move || {
            if let Some(inner) = router.upgrade() {
                inner.subscribers.remove(id);
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.0.subscribers.len()
    }

    /// True when `path` is the pathname of the current route
    pub fn is_active(&self, path: &str) -> bool {
        self.0.current_path.borrow().as_deref() == Some(path)
    }

    pub fn current_route(&self) -> Option<Rc<Route>> {
        self.0
            .current
            .borrow()
            .as_ref()
            .map(|matched| Rc::clone(&matched.route))
    }

    pub fn current_params(&self) -> Params {
        self.0
            .current
            .borrow()
            .as_ref()
            .map(|matched| matched.params.clone())
            .unwrap_or_default()
    }

    pub fn current_match(&self) -> Option<RouteMatch> {
        self.0.current.borrow().clone()
    }

    pub fn current_path(&self) -> Option<String> {
        self.0.current_path.borrow().clone()
    }

    fn go_to(
        &self,
        path: &str,
        options: NavigateOptions,
        chain: Vec<String>,
    ) -> std::result::Result<(), RouterError> {
        let history = self.0.window.history();
        let moved = if options.replace {
            history.replace_state(options.state, path)
        } else {
            history.push_state(options.state, path)
        };
        if !moved {
            let err = RouterError::CrossOrigin {
                url: path.to_string(),
            };
            error!("navigation aborted: {err}");
            return Err(err);
        }
        self.resolve(chain)
    }

    /// Run the pipeline for the current location
    ///
    /// `chain` holds the guarded paths already redirected away from during
    /// this navigation.
    fn resolve(&self, mut chain: Vec<String>) -> std::result::Result<(), RouterError> {
        let location = self.0.window.location();
        let path = location.pathname.clone();

        let Some(matched) = self.match_path(&path) else {
            let err = RouterError::RouteNotFound { path };
            error!("navigation aborted: {err}");
            return Err(err);
        };

        if matched.route.requires_auth && !self.0.store.is_authenticated() {
            let target = matched
                .route
                .auth_redirect
                .clone()
                .unwrap_or_else(|| self.0.options.default_auth_redirect.clone());
            chain.push(location.full_path());

            let revisits = chain.contains(&target);
            if revisits || chain.len() > self.0.options.max_redirects {
                chain.push(target);
                let err = RouterError::GuardRedirectLoop {
                    chain,
                    limit: self.0.options.max_redirects,
                };
                error!("navigation aborted: {err}");
                return Err(err);
            }

            info!(from = %path, to = %target, "auth guard redirect");
            return self.go_to(&target, NavigateOptions::replace(), chain);
        }

        self.commit(&path, matched);
        Ok(())
    }

    fn commit(&self, path: &str, matched: RouteMatch) {
        let route = Rc::clone(&matched.route);
        let params = matched.params.clone();

        let title = route
            .title
            .clone()
            .unwrap_or_else(|| self.0.options.default_title.clone());
        self.0.window.document().set_title(&title);

        *self.0.current.borrow_mut() = Some(matched);
        *self.0.current_path.borrow_mut() = Some(path.to_string());
        info!(%path, component = %route.component, "navigated");

        self.0
            .store
            .set_route(RouteState::new(path, &route.pattern, params.clone()));

        let subscribers = &self.0.subscribers;
        for (id, listener) in subscribers.snapshot() {
            if !subscribers.contains(id) {
                continue;
            }
            if let Err(err) = listener(&route, &params) {
                error!(%path, "route listener failed: {err:?}");
            }
        }
    }
}
