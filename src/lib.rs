//! # storefront-shell
//!
//! Browser-side runtime of the storefront: a component lifecycle, one
//! reactive state container and a single-page-application router, running
//! against a deterministic in-memory page.
//!
//! ## Architecture Overview
//!
//! - **Store** (`store`): the only shared mutable state; slices behind `Rc`,
//!   per-slice and global subscriptions
//! - **Router** (`router`): ordered pattern matching, history integration,
//!   auth guards and link interception; writes the `route` slice
//! - **Component** (`component`): owns one element subtree, its listeners and
//!   its children from mount to unmount
//! - **App** (`app`): wires the three together for one page
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_shell::{
//!     dom::Window,
//!     router::{NavigateOptions, Route, Router, RouterOptions},
//!     store::Store,
//! };
//!
//! let window = Window::new("http://shop.test", "/");
//! let store = Store::new();
//! let router = Router::new(window.clone(), store.clone(), RouterOptions::default());
//! router.register_routes([Route::new("/", "Home"), Route::new("/products/:id", "Product")]);
//!
//! router.init()?;
//! router.navigate("/products/42", NavigateOptions::push())?;
//!
//! assert_eq!(store.route().params.value("id"), Some("42"));
//! assert_eq!(window.history().len(), 2);
//! # Ok::<(), storefront_shell::router::RouterError>(())
//! ```
//!
//! ## Modules
//!
//! - [`dom`] - In-memory document, elements, events and history
//! - [`store`] - Application state and subscriptions
//! - [`router`] - Route table, navigation and guards
//! - [`component`] - Component lifecycle
//! - [`app`] - Page bootstrap
//! - [`infrastructure`] - Configuration and CLI
//! - [`utils`] - Logging, panic handling and paths

pub mod app;
pub mod component;
pub mod dom;
pub mod infrastructure;
pub mod router;
pub mod store;
pub mod subscription;
pub mod utils;

// Re-exports for convenience
pub use app::App;
pub use component::{Component, Lifecycle, Props, View};
pub use router::{NavigateOptions, Route, Router, RouterError};
pub use store::{AppState, Store};
pub use subscription::Unsubscribe;

/// Result type used throughout the library
pub type Result<T> = color_eyre::eyre::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
