use serde::{Deserialize, Serialize};

use crate::router::Params;

/// Last navigation resolved by the router
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteState {
    /// Resolved path, after any guard redirect
    pub path: String,
    /// Pattern of the matched route
    pub pattern: Option<String>,
    #[serde(default)]
    pub params: Params,
}

impl RouteState {
    pub fn new(path: &str, pattern: &str, params: Params) -> Self {
        Self {
            path: path.to_string(),
            pattern: Some(pattern.to_string()),
            params,
        }
    }
}
