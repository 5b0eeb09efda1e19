use std::path::{Path, PathBuf};

use config::ConfigError;
use serde::{Deserialize, Serialize};

use crate::{
    router::{Route, RouterOptions},
    utils,
};

const CONFIG: &str = include_str!("../../.config/config.json5");

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default document title
    pub title: String,
    /// Origin the page is served from
    pub origin: String,
    /// Path the page loads with
    pub start_path: String,
    pub _data_dir: PathBuf,
    pub _config_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Storefront".to_string(),
            origin: "http://localhost:8080".to_string(),
            start_path: "/".to_string(),
            _data_dir: PathBuf::new(),
            _config_dir: PathBuf::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub default_auth_redirect: String,
    pub max_redirects: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        let options = RouterOptions::default();
        Self {
            default_auth_redirect: options.default_auth_redirect,
            max_redirects: options.max_redirects,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl Config {
    /// Load from the platform config directory over the embedded defaults
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(&utils::get_config_dir(), &utils::get_data_dir())
    }

    /// The defaults compiled into the binary
    pub fn embedded() -> Result<Self, ConfigError> {
        json5::from_str(CONFIG)
            .map_err(|e| ConfigError::Message(format!("Failed to load default config: {e}")))
    }

    /// Layer `config.{json5,json,yaml,toml,ini}` from `config_dir` over the
    /// embedded defaults; every file is optional
    pub fn load(config_dir: &Path, data_dir: &Path) -> Result<Self, ConfigError> {
        let default_config = Self::embedded()?;
        let mut builder = config::Config::builder()
            .set_default("app.title", default_config.app.title.as_str())?
            .set_default("app.origin", default_config.app.origin.as_str())?
            .set_default("app.start_path", default_config.app.start_path.as_str())?
            .set_default("app._data_dir", data_dir.to_string_lossy().as_ref())?
            .set_default("app._config_dir", config_dir.to_string_lossy().as_ref())?
            .set_default(
                "router.default_auth_redirect",
                default_config.router.default_auth_redirect.as_str(),
            )?
            .set_default("router.max_redirects", default_config.router.max_redirects as u64)?;

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.json", config::FileFormat::Json),
            ("config.yaml", config::FileFormat::Yaml),
            ("config.toml", config::FileFormat::Toml),
            ("config.ini", config::FileFormat::Ini),
        ];
        let mut found_config = false;
        for (file, format) in &config_files {
            let path = config_dir.join(file);
            if path.exists() {
                found_config = true;
            }
            builder = builder.add_source(config::File::from(path).format(*format).required(false));
        }
        if !found_config {
            log::info!("No configuration file found, using defaults");
        }

        let mut cfg: Self = builder.build()?.try_deserialize()?;

        // Routes are replaced as a whole, never merged entry by entry
        if cfg.routes.is_empty() {
            cfg.routes = default_config.routes;
        }
        for route in &cfg.routes {
            if route.pattern != Route::CATCH_ALL && !route.pattern.starts_with('/') {
                return Err(ConfigError::Message(format!(
                    "route pattern must start with '/': {}",
                    route.pattern
                )));
            }
        }

        Ok(cfg)
    }

    pub fn router_options(&self) -> RouterOptions {
        RouterOptions {
            default_title: self.app.title.clone(),
            default_auth_redirect: self.router.default_auth_redirect.clone(),
            max_redirects: self.router.max_redirects,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        env, fs, process,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use pretty_assertions::assert_eq;

    use super::*;

    fn scratch_dir() -> PathBuf {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        let dir = env::temp_dir().join(format!(
            "storefront-shell-config-{}-{}",
            process::id(),
            NEXT.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_embedded_defaults() {
        let cfg = Config::embedded().unwrap();
        assert_eq!(cfg.app.title, "Storefront");
        assert_eq!(cfg.router.default_auth_redirect, "/");
        assert_eq!(cfg.routes.len(), 8);

        let account = cfg.routes.iter().find(|r| r.pattern == "/account").unwrap();
        assert!(account.requires_auth);
        assert_eq!(account.auth_redirect.as_deref(), Some("/login"));
        assert!(cfg.routes.last().unwrap().is_catch_all());
    }

    #[test]
    fn test_load_without_user_files() {
        let dir = scratch_dir();
        let cfg = Config::load(&dir, &dir).unwrap();
        let embedded = Config::embedded().unwrap();

        assert_eq!(cfg.app.origin, embedded.app.origin);
        assert_eq!(cfg.routes, embedded.routes);
    }

    #[test]
    fn test_user_file_overrides() {
        let dir = scratch_dir();
        fs::write(
            dir.join("config.json5"),
            r#"{
                app: { title: "Acme", start_path: "/cart" },
                router: { max_redirects: 2 },
                routes: [{ pattern: "/", component: "Landing" }],
            }"#,
        )
        .unwrap();

        let cfg = Config::load(&dir, &dir).unwrap();
        assert_eq!(cfg.app.title, "Acme");
        assert_eq!(cfg.app.start_path, "/cart");
        assert_eq!(cfg.app.origin, "http://localhost:8080");
        assert_eq!(cfg.routes, vec![Route::new("/", "Landing")]);

        let options = cfg.router_options();
        assert_eq!(options.default_title, "Acme");
        assert_eq!(options.max_redirects, 2);
        assert_eq!(options.default_auth_redirect, "/");
    }

    #[test]
    fn test_rejects_relative_pattern() {
        let dir = scratch_dir();
        fs::write(
            dir.join("config.json"),
            r#"{"routes": [{"pattern": "cart", "component": "Cart"}]}"#,
        )
        .unwrap();
        assert!(Config::load(&dir, &dir).is_err());
    }
}
