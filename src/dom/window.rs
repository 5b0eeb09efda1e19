use std::{cell::RefCell, rc::Rc};

use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::{
    document::Document,
    event::{Event, EventHandler, ListenerId},
};

/// Parsed view of the current URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub origin: String,
    pub pathname: String,
    pub search: String,
    pub hash: String,
}

impl Location {
    /// Split a same-origin path (`/a/b?x=1#top`) into its parts
    pub fn parse(origin: &str, path: &str) -> Self {
        let (rest, hash) = match path.find('#') {
            Some(i) => (&path[..i], &path[i..]),
            None => (path, ""),
        };
        let (pathname, search) = match rest.find('?') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };
        Self {
            origin: origin.to_string(),
            pathname: if pathname.is_empty() {
                "/".to_string()
            } else {
                pathname.to_string()
            },
            search: search.to_string(),
            hash: hash.to_string(),
        }
    }

    /// Path, query and fragment exactly as stored in the history entry
    pub fn full_path(&self) -> String {
        format!("{}{}{}", self.pathname, self.search, self.hash)
    }

    pub fn href(&self) -> String {
        format!("{}{}", self.origin, self.full_path())
    }

    /// Resolve `url` against this location the way an anchor would
    ///
    /// Returns the path, query and fragment of the result, or `None` when it
    /// leaves this origin (other host, scheme or port, `mailto:` and the
    /// like) or does not parse.
    pub fn resolve(&self, url: &str) -> Option<String> {
        let base = Url::parse(&self.href()).ok()?;
        let joined = base.join(url).ok()?;
        (joined.origin() == base.origin()).then(|| path_of(&joined))
    }
}

fn path_of(url: &Url) -> String {
    let mut path = url.path().to_string();
    if let Some(query) = url.query() {
        path.push('?');
        path.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        path.push('#');
        path.push_str(fragment);
    }
    path
}

#[derive(Debug, Clone)]
struct HistoryEntry {
    path: String,
    state: Value,
}

struct WindowListener {
    id: ListenerId,
    event: String,
    handler: EventHandler,
}

struct WindowInner {
    origin: String,
    document: Document,
    entries: RefCell<Vec<HistoryEntry>>,
    index: RefCell<usize>,
    listeners: RefCell<Vec<WindowListener>>,
}

/// The browsing context: document, session history and window listeners
///
/// History traversal (`back`, `forward`, `go`) dispatches `popstate`
/// synchronously; there is no event loop to defer it to.
#[derive(Clone)]
pub struct Window(Rc<WindowInner>);

impl Window {
    /// A window that loaded `start_path` on `origin`
    pub fn new(origin: &str, start_path: &str) -> Self {
        let origin = origin.trim_end_matches('/').to_string();
        let start = Location::parse(&origin, "/")
            .resolve(start_path)
            .unwrap_or_else(|| "/".to_string());
        Self(Rc::new(WindowInner {
            origin,
            document: Document::new(),
            entries: RefCell::new(vec![HistoryEntry {
                path: start,
                state: Value::Null,
            }]),
            index: RefCell::new(0),
            listeners: RefCell::new(Vec::new()),
        }))
    }

    pub fn origin(&self) -> &str {
        &self.0.origin
    }

    pub fn document(&self) -> &Document {
        &self.0.document
    }

    pub fn location(&self) -> Location {
        Location::parse(&self.0.origin, &self.current_entry().path)
    }

    pub fn history(&self) -> History {
        History(self.clone())
    }

    fn current_entry(&self) -> HistoryEntry {
        let index = *self.0.index.borrow();
        self.0.entries.borrow()[index].clone()
    }

    pub fn add_event_listener(&self, event: &str, handler: EventHandler) -> ListenerId {
        let id = ListenerId::next();
        self.0.listeners.borrow_mut().push(WindowListener {
            id,
            event: event.to_string(),
            handler,
        });
        id
    }

    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.0.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.0.listeners.borrow().len()
    }

    pub fn dispatch_event(&self, event: &mut Event) -> bool {
        let handlers: Vec<(ListenerId, EventHandler)> = self
            .0
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.event == event.kind())
            .map(|l| (l.id, Rc::clone(&l.handler)))
            .collect();
        for (id, handler) in handlers {
            let still_registered = self.0.listeners.borrow().iter().any(|l| l.id == id);
            if !still_registered {
                continue;
            }
            handler(event);
            if event.immediate_propagation_stopped() {
                break;
            }
        }
        !event.default_prevented()
    }

    pub fn ptr_eq(&self, other: &Window) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Session history of a [`Window`]
#[derive(Clone)]
pub struct History(Window);

impl History {
    pub fn len(&self) -> usize {
        self.0 .0.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index(&self) -> usize {
        *self.0 .0.index.borrow()
    }

    pub fn state(&self) -> Value {
        self.0.current_entry().state
    }

    /// Add an entry after the current one, dropping any forward entries
    ///
    /// Returns `false` and leaves history alone when `url` is not on this
    /// window's origin.
    pub fn push_state(&self, state: Value, url: &str) -> bool {
        let Some(path) = self.0.location().resolve(url) else {
            return false;
        };
        let inner = &self.0 .0;
        let mut entries = inner.entries.borrow_mut();
        let mut index = inner.index.borrow_mut();
        entries.truncate(*index + 1);
        entries.push(HistoryEntry { path, state });
        *index = entries.len() - 1;
        true
    }

    /// Overwrite the current entry; same origin rule as [`push_state`](Self::push_state)
    pub fn replace_state(&self, state: Value, url: &str) -> bool {
        let Some(path) = self.0.location().resolve(url) else {
            return false;
        };
        let inner = &self.0 .0;
        let index = *inner.index.borrow();
        inner.entries.borrow_mut()[index] = HistoryEntry { path, state };
        true
    }

    pub fn back(&self) {
        self.go(-1);
    }

    pub fn forward(&self) {
        self.go(1);
    }

    /// Move `delta` entries; out-of-range traversal does nothing
    pub fn go(&self, delta: isize) {
        if delta == 0 {
            return;
        }
        let target = self.index() as isize + delta;
        if target < 0 || target >= self.len() as isize {
            return;
        }
        *self.0 .0.index.borrow_mut() = target as usize;
        let mut event = Event::pop_state(self.state());
        self.0.dispatch_event(&mut event);
    }
}
