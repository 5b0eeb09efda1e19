use std::{cell::RefCell, rc::Rc};

use super::{
    element::Element,
    event::{Event, EventHandler, ListenerId},
};

struct DocumentInner {
    root: Element,
    body: Element,
    title: RefCell<String>,
}

/// The page document: a root node with a `<body>`, and a title
///
/// Document-level listeners live on the root node, so every bubbling event
/// dispatched inside the tree reaches them last.
#[derive(Clone)]
pub struct Document(Rc<DocumentInner>);

impl Document {
    pub fn new() -> Self {
        let root = Element::new("#document");
        let body = Element::new("body");
        root.append_child(&body);
        Self(Rc::new(DocumentInner {
            root,
            body,
            title: RefCell::new(String::new()),
        }))
    }

    pub fn root(&self) -> &Element {
        &self.0.root
    }

    pub fn body(&self) -> &Element {
        &self.0.body
    }

    pub fn create_element(&self, tag: &str) -> Element {
        Element::new(tag)
    }

    pub fn create_text_node(&self, text: &str) -> Element {
        Element::text_node(text)
    }

    pub fn title(&self) -> String {
        self.0.title.borrow().clone()
    }

    pub fn set_title(&self, title: &str) {
        *self.0.title.borrow_mut() = title.to_string();
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        self.0.root.find_by_id(id)
    }

    /// True when `element` is attached under this document
    pub fn is_connected(&self, element: &Element) -> bool {
        self.0.root.contains(element)
    }

    pub fn add_event_listener(&self, event: &str, handler: EventHandler) -> ListenerId {
        self.0.root.add_event_listener(event, handler)
    }

    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        self.0.root.remove_event_listener(id)
    }

    pub fn listener_count(&self) -> usize {
        self.0.root.listener_count()
    }

    /// Dispatch directly at the document, as keyboard events without focus do
    pub fn dispatch_event(&self, event: &mut Event) -> bool {
        self.0.root.dispatch_event(event)
    }

    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::dom::event::handler;

    #[test]
    fn test_new_document_has_body() {
        let document = Document::new();
        assert_eq!(document.body().tag(), "body");
        assert_eq!(document.body().parent(), Some(document.root().clone()));
        assert!(document.title().is_empty());
    }

    #[test]
    fn test_document_listener_sees_bubbling_click() {
        let document = Document::new();
        let button = document.create_element("button");
        document.body().append_child(&button);

        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        let id = document.add_event_listener(
            "click",
            handler(move |_| counter.set(counter.get() + 1)),
        );

        button.click();
        assert_eq!(clicks.get(), 1);

        assert!(document.remove_event_listener(id));
        button.click();
        assert_eq!(clicks.get(), 1);
        assert_eq!(document.listener_count(), 0);
    }

    #[test]
    fn test_get_element_by_id() {
        let document = Document::new();
        let main = document.create_element("main").with_attribute("id", "app");
        document.body().append_child(&main);
        assert_eq!(document.get_element_by_id("app"), Some(main.clone()));
        assert!(document.is_connected(&main));
        main.remove();
        assert!(!document.is_connected(&main));
    }
}
