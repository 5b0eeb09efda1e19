use std::collections::BTreeMap;

use crate::dom::{Element, EventHandler, ListenerId, NodeId};

/// Listeners a component attached, keyed by `(element, event)`
///
/// At most one handler is tracked per pair: registering the same pair again
/// removes the previous handler from the element first (last write wins).
#[derive(Default)]
pub struct ListenerRegistry {
    entries: BTreeMap<(NodeId, String), (Element, ListenerId)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, element: &Element, event: &str, handler: EventHandler) {
        let key = (element.node_id(), event.to_string());
        if let Some((previous, id)) = self.entries.remove(&key) {
            previous.remove_event_listener(id);
        }
        let id = element.add_event_listener(event, handler);
        self.entries.insert(key, (element.clone(), id));
    }

    pub fn remove(&mut self, element: &Element, event: &str) -> bool {
        match self.entries.remove(&(element.node_id(), event.to_string())) {
            Some((element, id)) => element.remove_event_listener(id),
            None => false,
        }
    }

    /// Drop every listener attached inside `root`'s subtree
    pub fn remove_within(&mut self, root: &Element) -> usize {
        let keys: Vec<(NodeId, String)> = self
            .entries
            .iter()
            .filter(|(_, (element, _))| root.contains(element))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &keys {
            if let Some((element, id)) = self.entries.remove(key) {
                element.remove_event_listener(id);
            }
        }
        keys.len()
    }

    /// Detach everything; returns how many listeners were removed
    pub fn remove_all(&mut self) -> usize {
        let entries = std::mem::take(&mut self.entries);
        let count = entries.len();
        for (element, id) in entries.into_values() {
            element.remove_event_listener(id);
        }
        count
    }

    pub fn contains(&self, element: &Element, event: &str) -> bool {
        self.entries
            .contains_key(&(element.node_id(), event.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
