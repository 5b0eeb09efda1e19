use std::{collections::BTreeMap, rc::Rc};

use derive_deref::{Deref, DerefMut};
use serde::{Deserialize, Serialize};

/// Values captured from `:name` segments, keyed by name
#[derive(Debug, Clone, PartialEq, Eq, Default, Deref, DerefMut, Serialize, Deserialize)]
pub struct Params(pub BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured value as `&str`
    pub fn value(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Params {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// A registered route
///
/// `pattern` is a `/`-separated template where a segment starting with `:`
/// captures the path segment in its position, or the single catch-all `*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    #[serde(alias = "path")]
    pub pattern: String,
    /// Tag of the page component to mount
    pub component: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub requires_auth: bool,
    /// Where to send unauthenticated visitors; the router default when unset
    #[serde(default)]
    pub auth_redirect: Option<String>,
}

impl Route {
    pub const CATCH_ALL: &'static str = "*";

    pub fn new(pattern: &str, component: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            component: component.to_string(),
            title: None,
            requires_auth: false,
            auth_redirect: None,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn requires_auth(mut self, requires_auth: bool) -> Self {
        self.requires_auth = requires_auth;
        self
    }

    pub fn auth_redirect(mut self, path: &str) -> Self {
        self.auth_redirect = Some(path.to_string());
        self
    }

    pub fn is_catch_all(&self) -> bool {
        self.pattern == Self::CATCH_ALL
    }
}

/// Outcome of matching one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: Rc<Route>,
    pub params: Params,
}

impl RouteMatch {
    pub fn new(route: Rc<Route>, params: Params) -> Self {
        Self { route, params }
    }
}
