use thiserror::Error;

/// Navigation failures
///
/// Every variant leaves the current route and page untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// No pattern matched and no catch-all is registered
    #[error("no route matches path {path:?}")]
    RouteNotFound { path: String },

    /// Guard redirects kept landing on guarded routes
    #[error("guard redirect chain exceeded {limit} hops: {}", .chain.join(" -> "))]
    GuardRedirectLoop { chain: Vec<String>, limit: usize },

    /// The target resolves outside the window's origin
    #[error("cannot navigate off origin to {url:?}")]
    CrossOrigin { url: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = RouterError::RouteNotFound {
            path: "/nope".into(),
        };
        assert_eq!(err.to_string(), "no route matches path \"/nope\"");

        let err = RouterError::GuardRedirectLoop {
            chain: vec!["/a".into(), "/b".into(), "/a".into()],
            limit: 2,
        };
        assert_eq!(
            err.to_string(),
            "guard redirect chain exceeded 2 hops: /a -> /b -> /a"
        );

        let err = RouterError::CrossOrigin {
            url: "https://elsewhere.test/".into(),
        };
        assert_eq!(
            err.to_string(),
            "cannot navigate off origin to \"https://elsewhere.test/\""
        );
    }
}
