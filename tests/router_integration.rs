//! Router navigation against the in-memory window

use std::{cell::RefCell, rc::Rc};

use pretty_assertions::assert_eq;
use rstest::rstest;

use storefront_shell::{
    dom::{Element, Event, Modifiers, Window},
    router::{NavigateOptions, Params, Route, Router, RouterError, RouterOptions},
    store::{Store, User},
};

const ORIGIN: &str = "http://shop.test";

fn storefront_routes() -> Vec<Route> {
    vec![
        Route::new("/", "Home"),
        Route::new("/products", "ProductList"),
        Route::new("/products/:id", "ProductDetail").title("Product"),
        Route::new("/cart", "Cart"),
        Route::new("/login", "Login").title("Sign in"),
        Route::new("/account", "Account")
            .requires_auth(true)
            .auth_redirect("/login"),
        Route::new("*", "NotFound"),
    ]
}

fn router_with(routes: Vec<Route>, options: RouterOptions) -> Router {
    let window = Window::new(ORIGIN, "/");
    let router = Router::new(window, Store::new(), options);
    router.register_routes(routes);
    router.init().unwrap();
    router
}

fn storefront() -> Router {
    router_with(storefront_routes(), RouterOptions::default())
}

fn component(router: &Router) -> String {
    router
        .current_route()
        .map(|route| route.component.clone())
        .unwrap_or_default()
}

#[rstest]
#[case("/a", "Static", &[])]
#[case("/42", "Dynamic", &[("id", "42")])]
fn test_static_route_registered_first_wins(
    #[case] path: &str,
    #[case] expected: &str,
    #[case] params: &[(&str, &str)],
) {
    let router = router_with(
        vec![
            Route::new("/", "Home"),
            Route::new("/a", "Static"),
            Route::new("/:id", "Dynamic"),
        ],
        RouterOptions::default(),
    );

    router.navigate(path, NavigateOptions::push()).unwrap();

    assert_eq!(component(&router), expected);
    let expected_params = Params(
        params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );
    assert_eq!(router.current_params(), expected_params);
}

#[test]
fn test_exact_lookup_beats_earlier_dynamic_pattern() {
    let router = router_with(
        vec![
            Route::new("/", "Home"),
            Route::new("/:id", "Dynamic"),
            Route::new("/a", "Static"),
        ],
        RouterOptions::default(),
    );
    router.navigate("/a", NavigateOptions::push()).unwrap();
    assert_eq!(component(&router), "Static");
}

#[test]
fn test_catch_all_takes_unknown_paths() {
    let router = router_with(
        vec![Route::new("/", "Home"), Route::new("*", "NotFound")],
        RouterOptions::default(),
    );

    router.navigate("/missing", NavigateOptions::push()).unwrap();

    assert_eq!(component(&router), "NotFound");
    assert!(router.current_params().is_empty());
    assert_eq!(router.store().route().pattern.as_deref(), Some("*"));
}

#[test]
fn test_unknown_path_without_catch_all_is_an_error() {
    let router = router_with(vec![Route::new("/", "Home")], RouterOptions::default());

    let err = router
        .navigate("/missing", NavigateOptions::push())
        .unwrap_err();

    assert!(matches!(err, RouterError::RouteNotFound { .. }));
    assert_eq!(component(&router), "Home");
    assert!(router.is_active("/"));
}

#[test]
fn test_guard_redirects_signed_out_visitor_to_login() {
    let router = storefront();

    router.navigate("/account", NavigateOptions::push()).unwrap();

    assert_eq!(router.window().location().pathname, "/login");
    assert_eq!(component(&router), "Login");
    assert_eq!(router.store().route().path, "/login");
    assert_eq!(router.window().document().title(), "Sign in");
    // The guarded entry was replaced, not kept
    assert_eq!(router.window().history().len(), 2);
}

#[test]
fn test_guard_reevaluated_on_popstate() {
    let router = storefront();
    router.store().set_user(Some(User::new("u1", "Ada")));
    router.navigate("/account", NavigateOptions::push()).unwrap();
    router.navigate("/cart", NavigateOptions::push()).unwrap();

    router.store().set_user(None);
    router.back().unwrap();

    assert_eq!(component(&router), "Login");
    assert_eq!(router.window().location().pathname, "/login");
}

#[test]
fn test_guard_redirect_loop_is_reported() {
    let router = router_with(
        vec![
            Route::new("/", "Home"),
            Route::new("/a", "A").requires_auth(true).auth_redirect("/b"),
            Route::new("/b", "B").requires_auth(true).auth_redirect("/a"),
        ],
        RouterOptions::default(),
    );

    let err = router.navigate("/a", NavigateOptions::push()).unwrap_err();

    assert_eq!(
        err,
        RouterError::GuardRedirectLoop {
            chain: vec!["/a".into(), "/b".into(), "/a".into()],
            limit: 8,
        }
    );
    assert_eq!(component(&router), "Home");
}

#[test]
fn test_self_redirect_is_a_loop() {
    let router = router_with(
        vec![
            Route::new("/", "Home"),
            Route::new("/vault", "Vault")
                .requires_auth(true)
                .auth_redirect("/vault"),
        ],
        RouterOptions::default(),
    );
    let err = router
        .navigate("/vault", NavigateOptions::push())
        .unwrap_err();
    assert!(matches!(err, RouterError::GuardRedirectLoop { .. }));
}

#[test]
fn test_redirect_chain_is_bounded() {
    let options = RouterOptions {
        max_redirects: 2,
        ..RouterOptions::default()
    };
    let mut routes = vec![Route::new("/", "Home")];
    for step in 0..4 {
        routes.push(
            Route::new(&format!("/r{step}"), "Step")
                .requires_auth(true)
                .auth_redirect(&format!("/r{}", step + 1)),
        );
    }
    let router = router_with(routes, options);

    let err = router.navigate("/r0", NavigateOptions::push()).unwrap_err();

    assert_eq!(
        err,
        RouterError::GuardRedirectLoop {
            chain: vec!["/r0".into(), "/r1".into(), "/r2".into(), "/r3".into()],
            limit: 2,
        }
    );
}

#[test]
fn test_back_and_forward_resolve_without_new_entries() {
    let router = storefront();
    router.navigate("/products", NavigateOptions::push()).unwrap();
    router.navigate("/cart", NavigateOptions::push()).unwrap();

    router.back().unwrap();
    assert_eq!(component(&router), "ProductList");
    assert!(router.is_active("/products"));

    router.forward().unwrap();
    assert_eq!(component(&router), "Cart");
    assert_eq!(router.window().history().len(), 3);
}

#[test]
fn test_replace_keeps_history_length() {
    let router = storefront();
    router.navigate("/products", NavigateOptions::push()).unwrap();
    router
        .navigate(
            "/products/3",
            NavigateOptions::replace().with_state(serde_json::json!({"from": "list"})),
        )
        .unwrap();

    let history = router.window().history();
    assert_eq!(history.len(), 2);
    assert_eq!(history.state()["from"], "list");
    assert_eq!(router.current_params().value("id"), Some("3"));
}

#[test]
fn test_subscribers_receive_route_and_params() {
    let router = storefront();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let sub = router.subscribe(move |route, params| {
        sink.borrow_mut()
            .push((route.component.clone(), params.value("id").map(str::to_string)));
        Ok(())
    });

    router.navigate("/products/8", NavigateOptions::push()).unwrap();
    sub.unsubscribe();
    router.navigate("/cart", NavigateOptions::push()).unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![("ProductDetail".to_string(), Some("8".to_string()))]
    );
}

fn link(router: &Router, href: &str) -> Element {
    let document = router.window().document();
    let anchor = document.create_element("a").with_attribute("href", href);
    let label = document.create_text_node("go");
    anchor.append_child(&label);
    document.body().append_child(&anchor);
    anchor
}

#[test]
fn test_same_origin_link_click_is_intercepted() {
    let router = storefront();
    let anchor = link(&router, "/products/5");

    let allowed = anchor.children()[0].click();

    assert!(!allowed);
    assert_eq!(component(&router), "ProductDetail");
    assert_eq!(router.window().history().len(), 2);
}

#[rstest]
#[case("/products/5", "../cart", "/cart", "Cart")]
#[case("/products/5", "./9", "/products/9", "ProductDetail")]
#[case("/", "http://shop.test:80/login", "/login", "Login")]
fn test_link_hrefs_resolve_like_a_browser(
    #[case] start: &str,
    #[case] href: &str,
    #[case] expected_path: &str,
    #[case] expected: &str,
) {
    let router = storefront();
    router.navigate(start, NavigateOptions::push()).unwrap();
    let anchor = link(&router, href);

    assert!(!anchor.click());

    assert_eq!(router.window().location().full_path(), expected_path);
    assert_eq!(component(&router), expected);
}

#[rstest]
#[case("http://elsewhere.test/deals", None)]
#[case("http://shop.test:8080/cart", None)]
#[case("/cart", Some(("target", "_blank")))]
#[case("/cart", Some(("download", "receipt.pdf")))]
fn test_links_left_to_the_browser(#[case] href: &str, #[case] attribute: Option<(&str, &str)>) {
    let router = storefront();
    let anchor = link(&router, href);
    if let Some((name, value)) = attribute {
        anchor.set_attribute(name, value);
    }

    assert!(anchor.click());
    assert_eq!(component(&router), "Home");
    assert_eq!(router.window().history().len(), 1);
}

#[test]
fn test_modified_click_is_not_intercepted() {
    let router = storefront();
    let anchor = link(&router, "/cart");
    let mut event = Event::click_with(
        0,
        Modifiers {
            meta: true,
            ..Modifiers::default()
        },
    );

    assert!(anchor.dispatch_event(&mut event));
    assert_eq!(component(&router), "Home");
}

#[test]
fn test_clicks_after_dispose_are_ignored() {
    let router = storefront();
    let anchor = link(&router, "/cart");
    router.dispose();

    assert!(anchor.click());
    assert_eq!(component(&router), "Home");
    assert_eq!(router.window().listener_count(), 0);
    assert_eq!(router.window().document().listener_count(), 0);
}

#[test]
fn test_routers_on_separate_windows_are_isolated() {
    let a = storefront();
    let b = storefront();
    a.navigate("/cart", NavigateOptions::push()).unwrap();
    assert_eq!(component(&a), "Cart");
    assert_eq!(component(&b), "Home");
}
