use std::{collections::HashMap, rc::Rc};

use super::route::{Params, Route, RouteMatch};

/// Registered routes in registration order
///
/// Matching is first-match-wins over that order with no backtracking and no
/// specificity ranking: a `/:id` registered before `/about` shadows it for
/// every path the exact lookup misses.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Rc<Route>>,
    by_pattern: HashMap<String, usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `route`
    ///
    /// Re-registering a pattern replaces the route but keeps the position the
    /// pattern was first registered at.
    pub fn insert(&mut self, route: Route) {
        let route = Rc::new(route);
        match self.by_pattern.get(&route.pattern) {
            Some(&index) => self.routes[index] = route,
            None => {
                self.by_pattern
                    .insert(route.pattern.clone(), self.routes.len());
                self.routes.push(route);
            }
        }
    }

    pub fn extend<I>(&mut self, routes: I)
    where
        I: IntoIterator<Item = Route>,
    {
        for route in routes {
            self.insert(route);
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> impl Iterator<Item = &Rc<Route>> {
        self.routes.iter()
    }

    pub fn get(&self, pattern: &str) -> Option<&Rc<Route>> {
        self.by_pattern.get(pattern).map(|&index| &self.routes[index])
    }

    /// Resolve `path` to a route
    ///
    /// 1. exact lookup of the whole path;
    /// 2. ordered scan of dynamic patterns, first full match wins;
    /// 3. the `*` route, if registered, with no params.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
        if let Some(route) = self.get(path) {
            return Some(RouteMatch::new(Rc::clone(route), Params::new()));
        }

        let found = self
            .routes
            .iter()
            .filter(|route| !route.is_catch_all())
            .find_map(|route| {
                match_segments(&route.pattern, path)
                    .map(|params| RouteMatch::new(Rc::clone(route), params))
            });
        if found.is_some() {
            return found;
        }

        self.get(Route::CATCH_ALL)
            .map(|route| RouteMatch::new(Rc::clone(route), Params::new()))
    }
}

/// Compare `pattern` and `path` segment by segment
///
/// Both are split on `/` as-is, so empty segments count: `/a/` has three
/// segments and does not match `/:x`.
pub fn match_segments(pattern: &str, path: &str) -> Option<Params> {
    let pattern_segments: Vec<&str> = pattern.split('/').collect();
    let path_segments: Vec<&str> = path.split('/').collect();
    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = Params::new();
    for (expected, actual) in pattern_segments.iter().zip(path_segments.iter()) {
        match expected.strip_prefix(':') {
            Some(name) => {
                params.insert(name.to_string(), (*actual).to_string());
            }
            None if expected == actual => {}
            None => return None,
        }
    }
    Some(params)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn table(routes: &[(&str, &str)]) -> RouteTable {
        let mut table = RouteTable::new();
        table.extend(routes.iter().map(|(p, c)| Route::new(p, c)));
        table
    }

    fn component_for(table: &RouteTable, path: &str) -> Option<String> {
        table.match_path(path).map(|m| m.route.component.clone())
    }

    #[test]
    fn test_static_route_beats_earlier_dynamic_on_exact_lookup() {
        let table = table(&[("/:id", "Item"), ("/a", "A")]);
        assert_eq!(component_for(&table, "/a").as_deref(), Some("A"));
        assert_eq!(component_for(&table, "/b").as_deref(), Some("Item"));
    }

    #[test]
    fn test_static_then_dynamic() {
        let table = table(&[("/a", "A"), ("/:id", "Item")]);
        let matched = table.match_path("/a").unwrap();
        assert_eq!(matched.route.component, "A");
        assert!(matched.params.is_empty());

        let matched = table.match_path("/42").unwrap();
        assert_eq!(matched.route.component, "Item");
        assert_eq!(matched.params, Params::from([("id", "42")]));
    }

    #[test]
    fn test_first_dynamic_match_wins_without_specificity() {
        let table = table(&[
            ("/products/:id", "Product"),
            ("/products/featured", "Featured"),
            ("/:section/:id", "Generic"),
        ]);
        // Exact lookup still finds the static pattern
        assert_eq!(
            component_for(&table, "/products/featured").as_deref(),
            Some("Featured")
        );
        assert_eq!(component_for(&table, "/products/9").as_deref(), Some("Product"));
        assert_eq!(component_for(&table, "/orders/9").as_deref(), Some("Generic"));
    }

    #[test]
    fn test_catch_all_fallback() {
        let table = table(&[("/", "Home"), ("*", "NotFound")]);
        let matched = table.match_path("/missing").unwrap();
        assert_eq!(matched.route.component, "NotFound");
        assert!(matched.params.is_empty());
    }

    #[test]
    fn test_no_match_without_catch_all() {
        let table = table(&[("/", "Home")]);
        assert!(table.match_path("/missing").is_none());
    }

    #[test]
    fn test_reregistering_keeps_position() {
        let mut table = table(&[("/:a", "First"), ("/:b", "Second")]);
        table.insert(Route::new("/:a", "Replaced"));
        assert_eq!(table.len(), 2);
        assert_eq!(component_for(&table, "/x").as_deref(), Some("Replaced"));
    }

    #[rstest]
    #[case("/users/:id", "/users/7", Some(vec![("id", "7")]))]
    #[case("/users/:id/orders/:order", "/users/7/orders/99", Some(vec![("id", "7"), ("order", "99")]))]
    #[case("/users/:id", "/users/7/", None)]
    #[case("/users/:id", "/users", None)]
    #[case("/users/:id", "/people/7", None)]
    #[case("/users/:id", "/users/", Some(vec![("id", "")]))]
    fn test_match_segments(
        #[case] pattern: &str,
        #[case] path: &str,
        #[case] expected: Option<Vec<(&str, &str)>>,
    ) {
        let expected = expected.map(|pairs| {
            Params(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            )
        });
        assert_eq!(match_segments(pattern, path), expected);
    }
}
