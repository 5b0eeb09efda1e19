use crate::dom::{Event, Location};

/// Same-origin path `href` points at, or `None` for cross-origin and
/// non-navigational URLs (`mailto:`, `javascript:`, ...)
pub fn same_origin_path(href: &str, location: &Location) -> Option<String> {
    location.resolve(href.trim())
}

/// Path to navigate to when `event` is a click the router should take over
///
/// The click must be a plain primary-button click on (or inside) an `<a>`
/// with an `href`, no `target` and no `download`, pointing at this origin.
pub fn intercepted_path(event: &Event, location: &Location) -> Option<String> {
    if event.default_prevented() || event.button != 0 || event.modifiers.any() {
        return None;
    }
    let anchor = event.target()?.closest("a")?;
    if anchor.has_attribute("target") || anchor.has_attribute("download") {
        return None;
    }
    let href = anchor.attribute("href")?;
    same_origin_path(&href, location)
}
