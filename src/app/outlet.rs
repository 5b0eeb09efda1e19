use std::{cell::RefCell, collections::HashMap, rc::Rc};

use serde_json::{json, Value};
use tracing::debug;

use crate::{
    component::{Component, Lifecycle, Props, View},
    dom::{Document, Element, InsertPosition},
    router::{Params, Route},
    Result,
};

/// Builds the page component for a resolved route
pub type PageFactory = dyn Fn(&Document, &Route, &Params) -> Box<dyn Lifecycle>;

/// Placeholder page for components without a registered factory
///
/// Renders `<section class="page" data-component="...">` with the title as a
/// heading and one `data-param-*` attribute per captured parameter.
#[derive(Debug, Default, Clone, Copy)]
pub struct PageView;

impl PageView {
    /// Props the placeholder renders from
    pub fn props(route: &Route, params: &Params) -> Props {
        let heading = route.title.as_deref().unwrap_or(&route.component);
        Props::from(json!({
            "component": route.component,
            "title": heading,
            "params": params,
        }))
    }
}

impl View for PageView {
    fn render(&self, props: &Props, document: &Document) -> Result<Element> {
        let section = document
            .create_element("section")
            .with_class("page")
            .with_attribute("data-component", props.str("component").unwrap_or(""));
        if let Some(Value::Object(params)) = props.get("params") {
            for (name, value) in params {
                let value = value.as_str().unwrap_or_default();
                section.set_attribute(&format!("data-param-{name}"), value);
            }
        }
        let heading = document
            .create_element("h1")
            .with_text(props.str("title").unwrap_or(""));
        Ok(section.with_child(heading))
    }
}

struct OutletInner {
    document: Document,
    container: Element,
    factories: HashMap<String, Rc<PageFactory>>,
    page: Option<Box<dyn Lifecycle>>,
}

/// Root element that holds the page for the current route
///
/// [`show`](Self::show) unmounts the previous page before mounting the next,
/// so at most one page is mounted at a time.
#[derive(Clone)]
pub struct Outlet(Rc<RefCell<OutletInner>>);

impl Outlet {
    pub fn new(document: &Document, container: Element) -> Self {
        Self(Rc::new(RefCell::new(OutletInner {
            document: document.clone(),
            container,
            factories: HashMap::new(),
            page: None,
        })))
    }

    pub fn container(&self) -> Element {
        self.0.borrow().container.clone()
    }

    /// Use `factory` for routes whose `component` is `component`
    pub fn register<F>(&self, component: &str, factory: F)
    where
        F: Fn(&Document, &Route, &Params) -> Box<dyn Lifecycle> + 'static,
    {
        self.0
            .borrow_mut()
            .factories
            .insert(component.to_string(), Rc::new(factory));
    }

    pub fn has_page(&self) -> bool {
        self.0.borrow().page.is_some()
    }

    /// Swap in the page for `route`
    pub fn show(&self, route: &Route, params: &Params) -> Result<()> {
        // Hooks may navigate again, so nothing stays borrowed across them
        let (previous, factory, document, container) = {
            let mut inner = self.0.borrow_mut();
            (
                inner.page.take(),
                inner.factories.get(&route.component).map(Rc::clone),
                inner.document.clone(),
                inner.container.clone(),
            )
        };
        if let Some(mut previous) = previous {
            previous.unmount();
        }

        let mut page: Box<dyn Lifecycle> = match factory {
            Some(factory) => factory(&document, route, params),
            None => Box::new(Component::new(
                &document,
                PageView,
                PageView::props(route, params),
            )),
        };
        if let Err(err) = page.mount(&container, InsertPosition::BeforeEnd) {
            page.unmount();
            return Err(err);
        }
        debug!(component = %route.component, "page mounted");

        let mut inner = self.0.borrow_mut();
        if inner.page.is_some() {
            // A nested navigation already replaced this page
            drop(inner);
            page.unmount();
        } else {
            inner.page = Some(page);
        }
        Ok(())
    }

    /// Unmount the current page, if any
    pub fn clear(&self) {
        let page = self.0.borrow_mut().page.take();
        if let Some(mut page) = page {
            page.unmount();
        }
    }
}
