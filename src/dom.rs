//! In-memory browser host
//!
//! A deterministic, host-driven model of the parts of the DOM and History API
//! the runtime consumes:
//! - Element trees with attributes, class lists and bubbling events
//! - A document with a `<body>` and a title
//! - A window with session history, `popstate` and a parsed location
//!
//! All handles are cheap `Rc` clones and are `!Send`: the runtime is
//! single-threaded like the page it models.

pub mod document;
pub mod element;
pub mod event;
pub mod window;

pub use document::Document;
pub use element::{Element, InsertPosition, NodeId};
pub use event::{handler, Event, EventHandler, ListenerId, Modifiers};
pub use window::{History, Location, Window};
