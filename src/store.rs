//! Centralized reactive state container
//!
//! One [`Store`] exists per page. It is the only piece of shared mutable state
//! in the runtime and every mutation goes through [`Store::set_state`].
//!
//! ## Notification contract
//!
//! - For each slice listed in the patch whose reference changed, that slice's
//!   subscribers run in registration order with the new slice.
//! - Global subscribers then run with the full new state, whether or not any
//!   slice changed.
//! - Listeners run synchronously. A listener that calls `set_state` gets a
//!   depth-first nested notification pass that completes before the outer
//!   pass resumes with its remaining listeners; the outer pass keeps handing
//!   out the state its own call produced.
//! - A listener returning `Err` is logged and skipped; the rest still run.

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::{Rc, Weak},
};

use strum::IntoEnumIterator;
use tracing::{debug, error};

use crate::{
    subscription::{Subscribers, Unsubscribe},
    Result,
};

pub mod state;

pub use state::{
    AppState, CartItem, CartState, ModalState, RouteState, Slice, SliceKey, StatePatch, UiState,
    User, UserState,
};

/// Listener for one slice
pub type SliceListener = dyn Fn(&Slice) -> Result<()>;

/// Listener for the whole state
pub type StateListener = dyn Fn(&AppState) -> Result<()>;

struct StoreInner {
    initial: AppState,
    state: RefCell<AppState>,
    version: Cell<u64>,
    slice_listeners: BTreeMap<SliceKey, Subscribers<SliceListener>>,
    global_listeners: Subscribers<StateListener>,
}

/// Shared handle to the page's state container
///
/// Clones share the same state and subscriber lists.
#[derive(Clone)]
pub struct Store(Rc<StoreInner>);

impl Store {
    pub fn new() -> Self {
        Self::with_state(AppState::default())
    }

    /// Store whose initial (and reset) state is `initial`
    pub fn with_state(initial: AppState) -> Self {
        Self(Rc::new(StoreInner {
            state: RefCell::new(initial.clone()),
            initial,
            version: Cell::new(0),
            slice_listeners: SliceKey::iter()
                .map(|key| (key, Subscribers::new()))
                .collect(),
            global_listeners: Subscribers::new(),
        }))
    }

    /// Snapshot of the whole state
    ///
    /// Slices are shared immutable references; holding a snapshot never
    /// blocks or observes later writes.
    pub fn get_state(&self) -> AppState {
        self.0.state.borrow().clone()
    }

    pub fn get_slice(&self, key: SliceKey) -> Slice {
        self.0.state.borrow().slice(key)
    }

    pub fn user(&self) -> Rc<UserState> {
        Rc::clone(&self.0.state.borrow().user)
    }

    pub fn cart(&self) -> Rc<CartState> {
        Rc::clone(&self.0.state.borrow().cart)
    }

    pub fn route(&self) -> Rc<RouteState> {
        Rc::clone(&self.0.state.borrow().route)
    }

    pub fn modal(&self) -> Rc<ModalState> {
        Rc::clone(&self.0.state.borrow().modal)
    }

    pub fn ui(&self) -> Rc<UiState> {
        Rc::clone(&self.0.state.borrow().ui)
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.state.borrow().user.is_authenticated
    }

    /// Number of `set_state`/`reset` calls so far
    pub fn version(&self) -> u64 {
        self.0.version.get()
    }

    /// Replace the slices listed in `patch` and notify subscribers
    pub fn set_state(&self, patch: StatePatch) {
        let (previous, next) = {
            let mut state = self.0.state.borrow_mut();
            let previous = state.clone();
            let next = previous.merged(&patch);
            *state = next.clone();
            (previous, next)
        };
        let version = self.bump_version();
        debug!(version, keys = ?patch.keys().collect::<Vec<_>>(), "set_state");

        for key in patch.keys() {
            let slice = next.slice(key);
            if !slice.ptr_eq(&previous.slice(key)) {
                self.notify_slice(key, &slice);
            }
        }
        self.notify_all(&next);
    }

    /// Restore the initial state and notify every slice and global subscriber
    pub fn reset(&self) {
        let initial = self.0.initial.clone();
        *self.0.state.borrow_mut() = initial.clone();
        let version = self.bump_version();
        debug!(version, "reset");

        for key in SliceKey::iter() {
            self.notify_slice(key, &initial.slice(key));
        }
        self.notify_all(&initial);
    }

    /// Listen to one slice
    pub fn subscribe<F>(&self, key: SliceKey, listener: F) -> Unsubscribe
    where
        F: Fn(&Slice) -> Result<()> + 'static,
    {
        let id = self.slice_subscribers(key).add(Rc::new(listener));
        let store: Weak<StoreInner> = Rc::downgrade(&self.0);
        Unsubscribe::new(move || {
            if let Some(inner) = store.upgrade() {
                if let Some(subscribers) = inner.slice_listeners.get(&key) {
                    subscribers.remove(id);
                }
            }
        })
    }

    /// Listen to every `set_state` and `reset`
    pub fn subscribe_all<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&AppState) -> Result<()> + 'static,
    {
        let id = self.0.global_listeners.add(Rc::new(listener));
        let store: Weak<StoreInner> = Rc::downgrade(&self.0);
        Unsubscribe::new(move || {
            if let Some(inner) = store.upgrade() {
                inner.global_listeners.remove(id);
            }
        })
    }

    pub fn subscriber_count(&self, key: SliceKey) -> usize {
        self.slice_subscribers(key).len()
    }

    pub fn global_subscriber_count(&self) -> usize {
        self.0.global_listeners.len()
    }

    // Typed setters

    /// Sign a user in (`Some`) or out (`None`)
    pub fn set_user(&self, user: Option<User>) {
        self.set_state(StatePatch::new().user(UserState::from(user)));
    }

    pub fn set_route(&self, route: RouteState) {
        self.set_state(StatePatch::new().route(route));
    }

    pub fn open_modal(&self, id: &str) {
        self.set_state(StatePatch::new().modal(ModalState::open(id)));
    }

    pub fn close_modal(&self) {
        self.set_state(StatePatch::new().modal(ModalState::default()));
    }

    pub fn set_cart(&self, items: Vec<CartItem>) {
        self.set_state(StatePatch::new().cart(CartState::new(items)));
    }

    pub fn add_to_cart(&self, item: CartItem) {
        let cart = self.cart().with_item(item);
        self.set_state(StatePatch::new().cart(cart));
    }

    pub fn remove_from_cart(&self, product_id: &str) {
        let cart = self.cart().without_product(product_id);
        self.set_state(StatePatch::new().cart(cart));
    }

    pub fn clear_cart(&self) {
        self.set_state(StatePatch::new().cart(CartState::default()));
    }

    pub fn set_loading(&self, loading: bool) {
        let ui = UiState {
            loading,
            ..(*self.ui()).clone()
        };
        self.set_state(StatePatch::new().ui(ui));
    }

    pub fn set_error(&self, error: Option<String>) {
        let ui = UiState {
            error,
            ..(*self.ui()).clone()
        };
        self.set_state(StatePatch::new().ui(ui));
    }

    fn bump_version(&self) -> u64 {
        let version = self.0.version.get() + 1;
        self.0.version.set(version);
        version
    }

    fn slice_subscribers(&self, key: SliceKey) -> &Subscribers<SliceListener> {
        // Populated for every key at construction
        &self.0.slice_listeners[&key]
    }

    fn notify_slice(&self, key: SliceKey, slice: &Slice) {
        let subscribers = self.slice_subscribers(key);
        for (id, listener) in subscribers.snapshot() {
            if !subscribers.contains(id) {
                continue;
            }
            if let Err(err) = listener(slice) {
                error!(slice = %key, "store listener failed: {err:?}");
            }
        }
    }

    fn notify_all(&self, state: &AppState) {
        let subscribers = &self.0.global_listeners;
        for (id, listener) in subscribers.snapshot() {
            if !subscribers.contains(id) {
                continue;
            }
            if let Err(err) = listener(state) {
                error!("global store listener failed: {err:?}");
            }
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
