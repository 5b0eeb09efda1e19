//! Listener bookkeeping shared by the store and the router

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

/// Identifies one subscription within its list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Registration-ordered list of listeners
///
/// Notification loops iterate over a [`snapshot`](Self::snapshot) and check
/// [`contains`](Self::contains) before each call, so listeners may subscribe
/// or unsubscribe while a notification is running.
pub struct Subscribers<L: ?Sized> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(SubscriptionId, Rc<L>)>>,
}

impl<L: ?Sized> Subscribers<L> {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            entries: RefCell::new(Vec::new()),
        }
    }

    pub fn add(&self, listener: Rc<L>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.entries.borrow_mut().push((id, listener));
        id
    }

    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.entries.borrow().iter().any(|(entry, _)| *entry == id)
    }

    pub fn snapshot(&self) -> Vec<(SubscriptionId, Rc<L>)> {
        self.entries
            .borrow()
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<L: ?Sized> Default for Subscribers<L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by `subscribe`
///
/// Dropping the handle keeps the subscription alive; only
/// [`unsubscribe`](Self::unsubscribe) removes the listener.
pub struct Unsubscribe(Option<Box<dyn FnOnce()>>);

impl Unsubscribe {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self(Some(Box::new(f)))
    }

    /// Remove the listener; it receives no further notifications
    pub fn unsubscribe(mut self) {
        if let Some(f) = self.0.take() {
            f();
        }
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Unsubscribe").field(&self.0.is_some()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Listener = dyn Fn(u32) -> u32;

    #[test]
    fn test_snapshot_keeps_registration_order() {
        let subscribers: Subscribers<Listener> = Subscribers::new();
        subscribers.add(Rc::new(|x: u32| x + 1));
        subscribers.add(Rc::new(|x: u32| x * 10));

        let results: Vec<u32> = subscribers
            .snapshot()
            .iter()
            .map(|(_, listener)| listener(2))
            .collect();
        assert_eq!(results, vec![3, 20]);
    }

    #[test]
    fn test_remove() {
        let subscribers: Subscribers<Listener> = Subscribers::new();
        let id = subscribers.add(Rc::new(|x: u32| x));
        assert!(subscribers.contains(id));
        assert!(subscribers.remove(id));
        assert!(!subscribers.remove(id));
        assert!(subscribers.is_empty());
    }

    #[test]
    fn test_unsubscribe_runs_once() {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let handle = Unsubscribe::new(move || counter.set(counter.get() + 1));
        handle.unsubscribe();
        assert_eq!(count.get(), 1);
    }
}
