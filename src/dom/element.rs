use std::{
    cell::RefCell,
    collections::BTreeMap,
    fmt,
    rc::{Rc, Weak},
    sync::atomic::{AtomicU64, Ordering},
};

use strum::{Display, EnumString};

use super::event::{Event, EventHandler, ListenerId};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a node for the lifetime of the process
pub type NodeId = u64;

/// Tag used for text nodes
pub const TEXT_TAG: &str = "#text";

/// Where to insert an element relative to a reference element
///
/// Mirrors `insertAdjacentElement` positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum InsertPosition {
    /// Before the reference element, as a sibling
    BeforeBegin,
    /// As the first child of the reference element
    AfterBegin,
    /// As the last child of the reference element
    #[default]
    BeforeEnd,
    /// After the reference element, as a sibling
    AfterEnd,
}

struct Listener {
    id: ListenerId,
    event: String,
    handler: EventHandler,
}

struct ElementData {
    id: NodeId,
    tag: String,
    text: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    children: Vec<Element>,
    parent: Weak<RefCell<ElementData>>,
    listeners: Vec<Listener>,
}

/// Shared handle to a node of the in-memory document tree
///
/// Cloning the handle does not clone the node. Two handles are equal when they
/// point at the same node.
#[derive(Clone)]
pub struct Element(Rc<RefCell<ElementData>>);

impl Element {
    /// Create a detached element with the given tag name
    pub fn new(tag: &str) -> Self {
        Self(Rc::new(RefCell::new(ElementData {
            id: NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed),
            tag: tag.to_ascii_lowercase(),
            text: String::new(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            children: Vec::new(),
            parent: Weak::new(),
            listeners: Vec::new(),
        })))
    }

    /// Create a detached text node
    pub fn text_node(text: &str) -> Self {
        let node = Self::new(TEXT_TAG);
        node.0.borrow_mut().text = text.to_string();
        node
    }

    pub fn node_id(&self) -> NodeId {
        self.0.borrow().id
    }

    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    pub fn is_text(&self) -> bool {
        self.0.borrow().tag == TEXT_TAG
    }

    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // Attributes

    pub fn attribute(&self, name: &str) -> Option<String> {
        if name == "class" {
            let data = self.0.borrow();
            return (!data.classes.is_empty()).then(|| data.classes.join(" "));
        }
        self.0.borrow().attributes.get(name).cloned()
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Set an attribute; `class` is routed to the class list
    pub fn set_attribute(&self, name: &str, value: &str) {
        if name == "class" {
            self.0.borrow_mut().classes = split_classes(value);
            return;
        }
        self.0
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove_attribute(&self, name: &str) {
        if name == "class" {
            self.0.borrow_mut().classes.clear();
            return;
        }
        self.0.borrow_mut().attributes.remove(name);
    }

    /// Builder-style attribute setter
    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    // Class list

    pub fn classes(&self) -> Vec<String> {
        self.0.borrow().classes.clone()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.0.borrow().classes.iter().any(|c| c == class)
    }

    pub fn add_class(&self, class: &str) {
        let mut data = self.0.borrow_mut();
        if !data.classes.iter().any(|c| c == class) {
            data.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&self, class: &str) {
        self.0.borrow_mut().classes.retain(|c| c != class);
    }

    /// Add or remove `class` depending on `on`
    pub fn toggle_class(&self, class: &str, on: bool) {
        if on {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }

    pub fn with_class(self, class: &str) -> Self {
        for c in split_classes(class) {
            self.add_class(&c);
        }
        self
    }

    // Text

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        let data = self.0.borrow();
        if data.tag == TEXT_TAG {
            return data.text.clone();
        }
        data.children.iter().map(Element::text_content).collect()
    }

    /// Replace all children with a single text node
    pub fn set_text_content(&self, text: &str) {
        if self.is_text() {
            self.0.borrow_mut().text = text.to_string();
            return;
        }
        for child in self.children() {
            child.remove();
        }
        self.append_child(&Element::text_node(text));
    }

    pub fn with_text(self, text: &str) -> Self {
        self.set_text_content(text);
        self
    }

    // Tree

    pub fn parent(&self) -> Option<Element> {
        self.0.borrow().parent.upgrade().map(Element)
    }

    pub fn children(&self) -> Vec<Element> {
        self.0.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    /// Walk up to the top-most ancestor
    pub fn root(&self) -> Element {
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }

    pub fn contains(&self, other: &Element) -> bool {
        let mut node = Some(other.clone());
        while let Some(current) = node {
            if current.ptr_eq(self) {
                return true;
            }
            node = current.parent();
        }
        false
    }

    /// Nearest inclusive ancestor with the given tag
    pub fn closest(&self, tag: &str) -> Option<Element> {
        let tag = tag.to_ascii_lowercase();
        let mut node = Some(self.clone());
        while let Some(current) = node {
            if current.0.borrow().tag == tag {
                return Some(current);
            }
            node = current.parent();
        }
        None
    }

    /// First descendant (depth-first, pre-order) matching the predicate
    pub fn find(&self, predicate: &dyn Fn(&Element) -> bool) -> Option<Element> {
        for child in self.children() {
            if predicate(&child) {
                return Some(child);
            }
            if let Some(found) = child.find(predicate) {
                return Some(found);
            }
        }
        None
    }

    /// First descendant carrying `id="..."`
    pub fn find_by_id(&self, id: &str) -> Option<Element> {
        self.find(&|el| el.attribute("id").as_deref() == Some(id))
    }

    pub fn append_child(&self, child: &Element) {
        self.insert_child_at(self.child_count(), child);
    }

    pub fn with_child(self, child: Element) -> Self {
        self.append_child(&child);
        self
    }

    /// Insert `child` at `index`, detaching it from any previous parent first
    pub fn insert_child_at(&self, index: usize, child: &Element) {
        child.remove();
        let mut data = self.0.borrow_mut();
        let index = index.min(data.children.len());
        data.children.insert(index, child.clone());
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
    }

    /// Insert `element` relative to `self`
    ///
    /// Sibling positions are ignored when `self` has no parent.
    pub fn insert_adjacent(&self, position: InsertPosition, element: &Element) {
        match position {
            InsertPosition::AfterBegin => self.insert_child_at(0, element),
            InsertPosition::BeforeEnd => self.append_child(element),
            InsertPosition::BeforeBegin | InsertPosition::AfterEnd => {
                let Some(parent) = self.parent() else {
                    return;
                };
                // Detach first so a sibling move does not shift the index
                element.remove();
                let Some(index) = parent.index_of(self) else {
                    return;
                };
                let offset = usize::from(position == InsertPosition::AfterEnd);
                parent.insert_child_at(index + offset, element);
            }
        }
    }

    fn index_of(&self, child: &Element) -> Option<usize> {
        self.0
            .borrow()
            .children
            .iter()
            .position(|c| c.ptr_eq(child))
    }

    /// Detach from the parent, if any
    pub fn remove(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        parent.0.borrow_mut().children.retain(|c| !c.ptr_eq(self));
        self.0.borrow_mut().parent = Weak::new();
    }

    /// Put `replacement` where `self` currently sits
    ///
    /// A detached `self` leaves `replacement` untouched.
    pub fn replace_with(&self, replacement: &Element) {
        let Some(parent) = self.parent() else {
            return;
        };
        let Some(index) = parent.index_of(self) else {
            return;
        };
        self.remove();
        parent.insert_child_at(index, replacement);
    }

    // Events

    pub fn add_event_listener(&self, event: &str, handler: EventHandler) -> ListenerId {
        let id = ListenerId::next();
        self.0.borrow_mut().listeners.push(Listener {
            id,
            event: event.to_string(),
            handler,
        });
        id
    }

    /// Remove a listener; returns false when it was not registered here
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut data = self.0.borrow_mut();
        let before = data.listeners.len();
        data.listeners.retain(|l| l.id != id);
        data.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.0.borrow().listeners.len()
    }

    pub fn listener_count_for(&self, event: &str) -> usize {
        self.0
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.event == event)
            .count()
    }

    fn handlers_for(&self, event: &str) -> Vec<(ListenerId, EventHandler)> {
        self.0
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.event == event)
            .map(|l| (l.id, Rc::clone(&l.handler)))
            .collect()
    }

    fn has_listener(&self, id: ListenerId) -> bool {
        self.0.borrow().listeners.iter().any(|l| l.id == id)
    }

    /// Invoke listeners registered on this node only, without bubbling
    pub(crate) fn fire(&self, event: &mut Event) {
        event.set_current_target(Some(self.clone()));
        for (id, handler) in self.handlers_for(event.kind()) {
            // A previous handler may have removed this one
            if !self.has_listener(id) {
                continue;
            }
            handler(event);
            if event.immediate_propagation_stopped() {
                break;
            }
        }
    }

    /// Dispatch `event` at this node and bubble it up to the root
    ///
    /// Returns false when a handler called `prevent_default`.
    pub fn dispatch_event(&self, event: &mut Event) -> bool {
        event.set_target(self.clone());
        let mut node = Some(self.clone());
        while let Some(current) = node {
            current.fire(event);
            if event.propagation_stopped() || !event.bubbles() {
                break;
            }
            node = current.parent();
        }
        event.set_current_target(None);
        !event.default_prevented()
    }

    /// Convenience for dispatching a primary-button click
    pub fn click(&self) -> bool {
        self.dispatch_event(&mut Event::click())
    }

    /// Serialize the subtree as markup, for debugging and snapshots
    pub fn outer_html(&self) -> String {
        let data = self.0.borrow();
        if data.tag == TEXT_TAG {
            return escape_text(&data.text);
        }
        let mut html = format!("<{}", data.tag);
        if !data.classes.is_empty() {
            html.push_str(&format!(" class=\"{}\"", escape_attr(&data.classes.join(" "))));
        }
        for (name, value) in &data.attributes {
            if value.is_empty() {
                html.push_str(&format!(" {name}"));
            } else {
                html.push_str(&format!(" {name}=\"{}\"", escape_attr(value)));
            }
        }
        html.push('>');
        for child in &data.children {
            html.push_str(&child.outer_html());
        }
        html.push_str(&format!("</{}>", data.tag));
        html
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Element")
            .field("id", &data.id)
            .field("tag", &data.tag)
            .field("children", &data.children.len())
            .finish()
    }
}

fn split_classes(value: &str) -> Vec<String> {
    let mut classes: Vec<String> = Vec::new();
    for class in value.split_whitespace() {
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }
    classes
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dom::event::handler;

    #[test]
    fn test_insert_positions() {
        let parent = Element::new("div");
        let reference = Element::new("p");
        parent.append_child(&reference);

        let before = Element::new("span");
        let after = Element::new("em");
        let first = Element::new("b");
        let last = Element::new("i");
        reference.insert_adjacent(InsertPosition::BeforeBegin, &before);
        reference.insert_adjacent(InsertPosition::AfterEnd, &after);
        reference.insert_adjacent(InsertPosition::AfterBegin, &first);
        reference.insert_adjacent(InsertPosition::BeforeEnd, &last);

        let tags: Vec<String> = parent.children().iter().map(Element::tag).collect();
        assert_eq!(tags, vec!["span", "p", "em"]);
        let inner: Vec<String> = reference.children().iter().map(Element::tag).collect();
        assert_eq!(inner, vec!["b", "i"]);
    }

    #[test]
    fn test_insert_position_from_str() {
        assert_eq!(
            InsertPosition::from_str("afterbegin").unwrap(),
            InsertPosition::AfterBegin
        );
        assert_eq!(InsertPosition::default().to_string(), "beforeend");
    }

    #[test]
    fn test_replace_with_keeps_position() {
        let parent = Element::new("ul");
        let a = Element::new("li").with_text("a");
        let b = Element::new("li").with_text("b");
        parent.append_child(&a);
        parent.append_child(&b);

        let replacement = Element::new("li").with_text("c");
        a.replace_with(&replacement);

        assert_eq!(parent.text_content(), "cb");
        assert!(a.parent().is_none());
        assert_eq!(replacement.parent(), Some(parent));
    }

    #[test]
    fn test_append_moves_between_parents() {
        let left = Element::new("div");
        let right = Element::new("div");
        let child = Element::new("span");
        left.append_child(&child);
        right.append_child(&child);

        assert_eq!(left.child_count(), 0);
        assert_eq!(right.child_count(), 1);
    }

    #[test]
    fn test_class_attribute_roundtrips_through_class_list() {
        let el = Element::new("div");
        el.set_attribute("class", "a b a");
        assert_eq!(el.classes(), vec!["a", "b"]);
        el.toggle_class("c", true);
        assert_eq!(el.attribute("class").as_deref(), Some("a b c"));
        el.remove_attribute("class");
        assert!(!el.has_attribute("class"));
    }

    #[test]
    fn test_event_bubbles_to_ancestors() {
        let outer = Element::new("div");
        let inner = Element::new("button");
        outer.append_child(&inner);

        let seen = Rc::new(Cell::new(0));
        let seen_outer = Rc::clone(&seen);
        outer.add_event_listener(
            "click",
            handler(move |event| {
                seen_outer.set(seen_outer.get() + 1);
                event.prevent_default();
            }),
        );

        assert!(!inner.click());
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn test_stop_propagation() {
        let outer = Element::new("div");
        let inner = Element::new("button");
        outer.append_child(&inner);

        let seen = Rc::new(Cell::new(false));
        let seen_outer = Rc::clone(&seen);
        outer.add_event_listener("click", handler(move |_| seen_outer.set(true)));
        inner.add_event_listener("click", handler(|event| event.stop_propagation()));

        inner.click();
        assert!(!seen.get());
    }

    #[test]
    fn test_remove_event_listener() {
        let el = Element::new("a");
        let id = el.add_event_listener("click", handler(|_| {}));
        assert_eq!(el.listener_count_for("click"), 1);
        assert!(el.remove_event_listener(id));
        assert!(!el.remove_event_listener(id));
        assert_eq!(el.listener_count(), 0);
    }

    #[test]
    fn test_closest_and_find() {
        let anchor = Element::new("a").with_attribute("href", "/cart");
        let label = Element::new("span").with_text("Cart");
        anchor.append_child(&label);
        let nav = Element::new("nav").with_child(anchor.clone());

        assert_eq!(label.closest("A"), Some(anchor.clone()));
        assert_eq!(nav.find(&|el| el.tag() == "span"), Some(label));
        assert!(nav.contains(&anchor));
    }

    #[test]
    fn test_outer_html() {
        let el = Element::new("button")
            .with_class("btn primary")
            .with_attribute("disabled", "")
            .with_attribute("data-id", "7")
            .with_text("Add <1>");
        assert_eq!(
            el.outer_html(),
            "<button class=\"btn primary\" data-id=\"7\" disabled>Add &lt;1&gt;</button>"
        );
    }
}
