//! Component lifecycle
//!
//! A [`Component`] wraps a [`View`] (the part that knows how to render) and
//! owns what the view produces: one mounted element, its props, the child
//! components mounted through it and every listener it attached.
//!
//! Rendering is always from scratch. [`Component::update`] renders a new tree
//! and swaps it in with `replace_with`; there is no diffing. Cheap attribute
//! changes go through [`Component::set_props`] instead, which patches the
//! mounted element in place.
//!
//! Errors returned by [`View::render`] are not caught here: `mount` and
//! `update` hand them straight back to the caller.

use tracing::debug;

use crate::{
    dom::{Document, Element, EventHandler, InsertPosition},
    Result,
};

pub mod listeners;
pub mod props;

pub use listeners::ListenerRegistry;
pub use props::Props;

use props::attribute_value;

/// Class toggled by [`Component::hide`] / [`Component::show`]
pub const HIDDEN_CLASS: &str = "hidden";
/// Class toggled by [`Component::disable`] / [`Component::enable`]
pub const DISABLED_CLASS: &str = "disabled";

/// What a component renders and how it reacts to its lifecycle
pub trait View {
    /// Build a fresh, detached element tree from `props`
    fn render(&self, props: &Props, document: &Document) -> Result<Element>;

    /// After the element was inserted; runs once per mount
    fn on_mounted(&mut self, _scope: &mut Scope<'_>) -> Result<()> {
        Ok(())
    }

    /// After `update` swapped in a freshly rendered element
    fn on_updated(&mut self, _scope: &mut Scope<'_>) -> Result<()> {
        Ok(())
    }

    /// After the element was detached and listeners removed
    fn on_unmounted(&mut self) {}
}

/// A [`View`] made from a render closure
pub struct FnView<F>(F);

/// Wrap a render closure as a [`View`] without lifecycle hooks
pub fn view_fn<F>(render: F) -> FnView<F>
where
    F: Fn(&Props, &Document) -> Result<Element>,
{
    FnView(render)
}

impl<F> View for FnView<F>
where
    F: Fn(&Props, &Document) -> Result<Element>,
{
    fn render(&self, props: &Props, document: &Document) -> Result<Element> {
        (self.0)(props, document)
    }
}

/// Object-safe lifecycle, used to own heterogeneous child components
pub trait Lifecycle {
    fn mount(&mut self, container: &Element, position: InsertPosition) -> Result<()>;
    fn unmount(&mut self);
    fn update(&mut self) -> Result<()>;
    fn element(&self) -> Option<Element>;

    fn is_mounted(&self) -> bool {
        self.element().is_some()
    }
}

/// Access to the owning component from inside a lifecycle hook
pub struct Scope<'a> {
    element: &'a Element,
    props: &'a Props,
    document: &'a Document,
    listeners: &'a mut ListenerRegistry,
    children: &'a mut Vec<Box<dyn Lifecycle>>,
}

impl Scope<'_> {
    /// The component's mounted element
    pub fn element(&self) -> &Element {
        self.element
    }

    pub fn props(&self) -> &Props {
        self.props
    }

    pub fn document(&self) -> &Document {
        self.document
    }

    /// Attach a tracked listener; see [`Component::add_event_listener`]
    pub fn add_event_listener(&mut self, element: &Element, event: &str, handler: EventHandler) {
        self.listeners.add(element, event, handler);
    }

    /// Mount `child` and make it owned by this component
    ///
    /// A child whose `on_mounted` fails is unmounted again before the error
    /// is returned, so it leaves nothing in `container`.
    pub fn mount_child(
        &mut self,
        mut child: Box<dyn Lifecycle>,
        container: &Element,
        position: InsertPosition,
    ) -> Result<()> {
        if let Err(err) = child.mount(container, position) {
            child.unmount();
            return Err(err);
        }
        self.children.push(child);
        Ok(())
    }
}

/// A mounted (or mountable) instance of a [`View`]
pub struct Component<V: View> {
    view: V,
    document: Document,
    props: Props,
    element: Option<Element>,
    children: Vec<Box<dyn Lifecycle>>,
    listeners: ListenerRegistry,
}

impl<V: View> Component<V> {
    pub fn new(document: &Document, view: V, props: Props) -> Self {
        Self {
            view,
            document: document.clone(),
            props,
            element: None,
            children: Vec::new(),
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn element(&self) -> Option<&Element> {
        self.element.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.element.is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Render without mounting
    pub fn render(&self) -> Result<Element> {
        self.view.render(&self.props, &self.document)
    }

    /// Insert into `container` at `position`, then run `on_mounted`
    ///
    /// Renders only when there is no element yet. Mounting a mounted
    /// component moves its element and runs `on_mounted` again.
    pub fn mount(&mut self, container: &Element, position: InsertPosition) -> Result<()> {
        let element = match self.element.take() {
            Some(element) => element,
            None => self.render()?,
        };
        container.insert_adjacent(position, &element);
        debug!(tag = %element.tag(), %position, "component mounted");
        self.element = Some(element);

        let Some(element) = self.element.as_ref() else {
            return Ok(());
        };
        let mut scope = Scope {
            element,
            props: &self.props,
            document: &self.document,
            listeners: &mut self.listeners,
            children: &mut self.children,
        };
        self.view.on_mounted(&mut scope)
    }

    /// Tear down children, listeners and the element, then run `on_unmounted`
    ///
    /// Does nothing when not mounted.
    pub fn unmount(&mut self) {
        let Some(element) = self.element.take() else {
            return;
        };
        for mut child in self.children.drain(..) {
            child.unmount();
        }
        let removed = self.listeners.remove_all();
        element.remove();
        debug!(tag = %element.tag(), listeners = removed, "component unmounted");
        self.view.on_unmounted();
    }

    /// Re-render and replace the mounted element wholesale
    ///
    /// Listeners and children that lived inside the old tree are torn down
    /// first; `on_updated` can attach new ones. Does nothing when not mounted.
    pub fn update(&mut self) -> Result<()> {
        let Some(old) = self.element.clone() else {
            return Ok(());
        };
        let fresh = self.render()?;

        let mut kept = Vec::with_capacity(self.children.len());
        for mut child in self.children.drain(..) {
            let inside = child.element().is_some_and(|el| old.contains(&el));
            if inside {
                child.unmount();
            } else {
                kept.push(child);
            }
        }
        self.children = kept;
        self.listeners.remove_within(&old);

        old.replace_with(&fresh);
        self.element = Some(fresh);
        debug!(tag = %old.tag(), "component updated");

        let Some(element) = self.element.as_ref() else {
            return Ok(());
        };
        let mut scope = Scope {
            element,
            props: &self.props,
            document: &self.document,
            listeners: &mut self.listeners,
            children: &mut self.children,
        };
        self.view.on_updated(&mut scope)
    }

    /// Merge `patch` into the props and patch the mounted element's
    /// attributes without re-rendering
    ///
    /// Recognized keys: `id`, `class`, `data` (object of `data-*` values),
    /// `data-*`, `disabled` and `visible`. Anything else only lands in props
    /// and shows up on the next [`update`](Self::update).
    pub fn set_props(&mut self, patch: Props) {
        self.props.merge(patch.clone());
        if let Some(element) = &self.element {
            apply_attribute_patch(element, &patch, &self.props);
        }
    }

    /// Attach a listener that is removed on unmount
    ///
    /// Registering the same `(element, event)` pair again replaces the
    /// previous handler instead of adding a second one.
    pub fn add_event_listener(&mut self, element: &Element, event: &str, handler: EventHandler) {
        self.listeners.add(element, event, handler);
    }

    pub fn remove_event_listener(&mut self, element: &Element, event: &str) -> bool {
        self.listeners.remove(element, event)
    }

    /// Take ownership of an already mounted child
    pub fn adopt_child(&mut self, child: Box<dyn Lifecycle>) {
        self.children.push(child);
    }

    pub fn show(&self) {
        if let Some(element) = &self.element {
            set_visible(element, true);
        }
    }

    pub fn hide(&self) {
        if let Some(element) = &self.element {
            set_visible(element, false);
        }
    }

    pub fn enable(&self) {
        if let Some(element) = &self.element {
            set_enabled(element, true);
        }
    }

    pub fn disable(&self) {
        if let Some(element) = &self.element {
            set_enabled(element, false);
        }
    }
}

impl<V: View> Lifecycle for Component<V> {
    fn mount(&mut self, container: &Element, position: InsertPosition) -> Result<()> {
        Component::mount(self, container, position)
    }

    fn unmount(&mut self) {
        Component::unmount(self);
    }

    fn update(&mut self) -> Result<()> {
        Component::update(self)
    }

    fn element(&self) -> Option<Element> {
        self.element.clone()
    }
}

fn set_visible(element: &Element, visible: bool) {
    element.toggle_class(HIDDEN_CLASS, !visible);
    element.set_attribute("aria-hidden", if visible { "false" } else { "true" });
}

fn set_enabled(element: &Element, enabled: bool) {
    element.toggle_class(DISABLED_CLASS, !enabled);
    if enabled {
        element.remove_attribute("disabled");
    } else {
        element.set_attribute("disabled", "");
    }
    element.set_attribute("aria-disabled", if enabled { "false" } else { "true" });
}

fn set_or_remove(element: &Element, name: &str, value: &serde_json::Value) {
    match attribute_value(value) {
        Some(value) => element.set_attribute(name, &value),
        None => element.remove_attribute(name),
    }
}

fn apply_attribute_patch(element: &Element, patch: &Props, props: &Props) {
    for (key, value) in patch.iter() {
        match key.as_str() {
            "id" => set_or_remove(element, "id", value),
            "class" => {
                set_or_remove(element, "class", value);
                // State classes survive a class rewrite
                if props.bool("visible") == Some(false) {
                    element.add_class(HIDDEN_CLASS);
                }
                if props.bool("disabled") == Some(true) {
                    element.add_class(DISABLED_CLASS);
                }
            }
            "data" => {
                if let Some(entries) = value.as_object() {
                    for (name, value) in entries {
                        set_or_remove(element, &format!("data-{name}"), value);
                    }
                }
            }
            "disabled" => set_enabled(element, !value.as_bool().unwrap_or(false)),
            "visible" => set_visible(element, value.as_bool().unwrap_or(true)),
            name if name.starts_with("data-") => set_or_remove(element, name, value),
            _ => {}
        }
    }
}
