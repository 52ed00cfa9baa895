//! Terminal triage for unread Miniflux entries.
//!
//! Entries are fetched once at startup into an [`store::EntryStore`]; the
//! [`navigation::NavigationController`] owns cursor and screen state and
//! dispatches mark-read updates to the server without waiting on them.

pub mod app;
pub mod config;
pub mod content;
pub mod credentials;
pub mod keybindings;
pub mod miniflux;
pub mod navigation;
pub mod store;
pub mod sync;
pub mod ui;
pub mod util;
pub mod view;
