//! Content rendering for the detail screen.
//!
//! Converts an entry's raw HTML into a markdown-flavoured text document.
//! The navigation layer treats the result as an opaque string.

mod html;

pub use html::HtmlRenderer;

use crate::store::Entry;

/// Produces the display document for an opened entry.
///
/// Called once per open; implementations must not cache across opens.
pub trait ContentRenderer: Send {
    fn render(&self, entry: &Entry) -> String;
}
