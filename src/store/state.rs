use std::rc::Rc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

pub mod cart;
pub mod route;
pub mod ui;
pub mod user;

pub use cart::{CartItem, CartState};
pub use route::RouteState;
pub use ui::{ModalState, UiState};
pub use user::{User, UserState};

/// Names of the top-level slices of [`AppState`]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SliceKey {
    User,
    Cart,
    Route,
    Modal,
    Ui,
}

/// The value of one slice, behind the same shared reference the state holds
#[derive(Debug, Clone)]
pub enum Slice {
    User(Rc<UserState>),
    Cart(Rc<CartState>),
    Route(Rc<RouteState>),
    Modal(Rc<ModalState>),
    Ui(Rc<UiState>),
}

impl Slice {
    pub fn key(&self) -> SliceKey {
        match self {
            Slice::User(_) => SliceKey::User,
            Slice::Cart(_) => SliceKey::Cart,
            Slice::Route(_) => SliceKey::Route,
            Slice::Modal(_) => SliceKey::Modal,
            Slice::Ui(_) => SliceKey::Ui,
        }
    }

    /// Reference identity; two slices of different keys are never equal
    pub fn ptr_eq(&self, other: &Slice) -> bool {
        match (self, other) {
            (Slice::User(a), Slice::User(b)) => Rc::ptr_eq(a, b),
            (Slice::Cart(a), Slice::Cart(b)) => Rc::ptr_eq(a, b),
            (Slice::Route(a), Slice::Route(b)) => Rc::ptr_eq(a, b),
            (Slice::Modal(a), Slice::Modal(b)) => Rc::ptr_eq(a, b),
            (Slice::Ui(a), Slice::Ui(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn as_user(&self) -> Option<&UserState> {
        match self {
            Slice::User(user) => Some(user),
            _ => None,
        }
    }

    pub fn as_cart(&self) -> Option<&CartState> {
        match self {
            Slice::Cart(cart) => Some(cart),
            _ => None,
        }
    }

    pub fn as_route(&self) -> Option<&RouteState> {
        match self {
            Slice::Route(route) => Some(route),
            _ => None,
        }
    }

    pub fn as_modal(&self) -> Option<&ModalState> {
        match self {
            Slice::Modal(modal) => Some(modal),
            _ => None,
        }
    }

    pub fn as_ui(&self) -> Option<&UiState> {
        match self {
            Slice::Ui(ui) => Some(ui),
            _ => None,
        }
    }
}

/// Shared application state
///
/// Every slice sits behind an `Rc`. Replacing a slice swaps the reference;
/// untouched slices keep theirs, which is how the store tells what changed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppState {
    pub user: Rc<UserState>,
    pub cart: Rc<CartState>,
    pub route: Rc<RouteState>,
    pub modal: Rc<ModalState>,
    pub ui: Rc<UiState>,
}

impl AppState {
    pub fn slice(&self, key: SliceKey) -> Slice {
        match key {
            SliceKey::User => Slice::User(Rc::clone(&self.user)),
            SliceKey::Cart => Slice::Cart(Rc::clone(&self.cart)),
            SliceKey::Route => Slice::Route(Rc::clone(&self.route)),
            SliceKey::Modal => Slice::Modal(Rc::clone(&self.modal)),
            SliceKey::Ui => Slice::Ui(Rc::clone(&self.ui)),
        }
    }

    /// Swap in one slice reference
    pub fn put(&mut self, slice: Slice) {
        match slice {
            Slice::User(user) => self.user = user,
            Slice::Cart(cart) => self.cart = cart,
            Slice::Route(route) => self.route = route,
            Slice::Modal(modal) => self.modal = modal,
            Slice::Ui(ui) => self.ui = ui,
        }
    }

    /// `{...self, ...patch}`
    pub fn merged(&self, patch: &StatePatch) -> AppState {
        let mut next = self.clone();
        for slice in patch.slices() {
            next.put(slice.clone());
        }
        next
    }
}

/// Partial state: the slices a `set_state` call replaces
///
/// Keys keep the position of their first insertion; setting a key twice keeps
/// the last value.
#[derive(Debug, Clone, Default)]
pub struct StatePatch {
    slices: Vec<Slice>,
}

impl StatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slice(mut self, slice: Slice) -> Self {
        match self.slices.iter_mut().find(|s| s.key() == slice.key()) {
            Some(existing) => *existing = slice,
            None => self.slices.push(slice),
        }
        self
    }

    pub fn user(self, user: UserState) -> Self {
        self.slice(Slice::User(Rc::new(user)))
    }

    pub fn cart(self, cart: CartState) -> Self {
        self.slice(Slice::Cart(Rc::new(cart)))
    }

    pub fn route(self, route: RouteState) -> Self {
        self.slice(Slice::Route(Rc::new(route)))
    }

    pub fn modal(self, modal: ModalState) -> Self {
        self.slice(Slice::Modal(Rc::new(modal)))
    }

    pub fn ui(self, ui: UiState) -> Self {
        self.slice(Slice::Ui(Rc::new(ui)))
    }

    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    pub fn keys(&self) -> impl Iterator<Item = SliceKey> + '_ {
        self.slices.iter().map(Slice::key)
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

impl From<Slice> for StatePatch {
    fn from(slice: Slice) -> Self {
        StatePatch::new().slice(slice)
    }
}
