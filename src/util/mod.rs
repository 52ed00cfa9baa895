//! Shared helpers: terminal-safe text handling, URL checks and
//! panic-catching for background tasks.
//!
//! ```
//! use termflux::util::{display_width, strip_control_chars, truncate_to_width};
//!
//! let title = strip_control_chars("Breaking\x1b[2J news");
//! assert_eq!(title, "Breaking news");
//! assert_eq!(display_width("Hello 世界"), 10);
//! assert_eq!(truncate_to_width(&title, 10), "Breakin...");
//! ```

mod task;
mod text;
mod url_validator;

pub use task::catch_task_panic;
pub use text::{display_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_instance_url, validate_url_for_open, UrlValidationError};
