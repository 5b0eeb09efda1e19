use std::{
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use serde_json::Value;

use super::element::Element;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Callback attached to an element or the window
pub type EventHandler = Rc<dyn Fn(&mut Event)>;

/// Wrap a closure into an [`EventHandler`]
pub fn handler<F>(f: F) -> EventHandler
where
    F: Fn(&mut Event) + 'static,
{
    Rc::new(f)
}

/// Identifies one registered listener so it can be removed later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Modifier keys held while a pointer or keyboard event fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.alt || self.ctrl || self.meta || self.shift
    }
}

/// A dispatched DOM event
#[derive(Debug, Clone)]
pub struct Event {
    kind: String,
    bubbles: bool,
    target: Option<Element>,
    current_target: Option<Element>,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
    /// Mouse button for pointer events; 0 is the primary button
    pub button: i16,
    pub modifiers: Modifiers,
    /// Key name for keyboard events (`"Escape"`, `"Enter"`, ...)
    pub key: Option<String>,
    /// History state carried by `popstate`
    pub state: Value,
}

impl Event {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            bubbles: true,
            target: None,
            current_target: None,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
            button: 0,
            modifiers: Modifiers::default(),
            key: None,
            state: Value::Null,
        }
    }

    /// Primary-button click without modifiers
    pub fn click() -> Self {
        Self::new("click")
    }

    pub fn click_with(button: i16, modifiers: Modifiers) -> Self {
        Self {
            button,
            modifiers,
            ..Self::click()
        }
    }

    pub fn key_down(key: &str) -> Self {
        Self {
            key: Some(key.to_string()),
            ..Self::new("keydown")
        }
    }

    /// `popstate` does not bubble and carries the entry's state
    pub fn pop_state(state: Value) -> Self {
        Self {
            bubbles: false,
            state,
            ..Self::new("popstate")
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn target(&self) -> Option<&Element> {
        self.target.as_ref()
    }

    pub fn current_target(&self) -> Option<&Element> {
        self.current_target.as_ref()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn immediate_propagation_stopped(&self) -> bool {
        self.immediate_propagation_stopped
    }

    pub(crate) fn set_target(&mut self, target: Element) {
        self.target = Some(target);
    }

    pub(crate) fn set_current_target(&mut self, target: Option<Element>) {
        self.current_target = target;
    }
}
