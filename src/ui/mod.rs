//! Terminal front end.
//!
//! - `loop_runner` - event loop and terminal setup/teardown
//! - `input` - key and mouse translation into controller calls
//! - `events` - background task results
//! - `render` - the terminal [`ViewAdapter`](crate::view::ViewAdapter)
//! - `entries`, `detail`, `status`, `help` - widgets

mod detail;
mod entries;
mod events;
mod help;
mod input;
mod loop_runner;
mod render;
mod status;

pub use detail::render_markdown;
pub use entries::format_relative_time;
pub use loop_runner::{run, Action};
