use super::ContentRenderer;
use crate::store::Entry;
use crate::util::strip_control_chars;

/// Narrowest wrap width handed to the converter; narrower widths make
/// html2text fail on nested lists and tables.
const MIN_WIDTH: usize = 20;

/// Stand-in for leading spaces, which markdown would otherwise strip.
const NBSP: char = '\u{a0}';
const TAB_WIDTH: usize = 4;

/// Renders entry HTML into a document headed by the entry title.
///
/// The converted text is escaped so that the markdown stage of the detail
/// pane shows it verbatim: `*`, `_`, `<tag>` and friends stay literal, line
/// breaks become hard breaks and leading indentation survives.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    width: usize,
}

impl HtmlRenderer {
    /// Create a renderer that wraps text at `width` columns.
    ///
    /// Widths below 20 are raised to 20.
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(MIN_WIDTH),
        }
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new(100)
    }
}

impl ContentRenderer for HtmlRenderer {
    fn render(&self, entry: &Entry) -> String {
        let body = html2text::config::plain()
            .string_from_read(entry.content.as_bytes(), self.width)
            .unwrap_or_else(|e| {
                tracing::warn!(
                    entry_id = %entry.id,
                    error = %e,
                    "HTML conversion failed, showing raw content"
                );
                entry.content.clone()
            });
        let title = strip_control_chars(&entry.title).replace(['\n', '\r'], " ");
        let body = escape_markdown(&strip_control_chars(body.trim_end()));

        tracing::debug!(
            entry_id = %entry.id,
            width = self.width,
            html_len = entry.content.len(),
            doc_len = body.len(),
            "Rendered entry content"
        );

        let mut doc = String::with_capacity(title.len() + body.len() + 8);
        doc.push_str("# ");
        doc.push_str(&escape_markdown(title.trim()));
        if !body.is_empty() {
            doc.push_str("\n\n");
            doc.push_str(&body);
        }
        doc
    }
}

/// Escape plain text so a CommonMark parser reproduces it line for line.
///
/// Every ASCII punctuation character gets a backslash, leading spaces and
/// tabs become non-breaking spaces, and a line followed by another
/// non-empty line ends in a backslash (hard break). Blank lines still
/// separate paragraphs.
fn escape_markdown(text: &str) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let mut out = String::with_capacity(text.len() + text.len() / 8);

    for (i, line) in lines.iter().enumerate() {
        let content = line.trim_start_matches([' ', '\t']);
        for c in line[..line.len() - content.len()].chars() {
            let n = if c == '\t' { TAB_WIDTH } else { 1 };
            out.extend(std::iter::repeat(NBSP).take(n));
        }
        for c in content.chars() {
            if c.is_ascii_punctuation() {
                out.push('\\');
            }
            out.push(c);
        }

        let next_line_continues = lines.get(i + 1).is_some_and(|next| !next.is_empty());
        if !line.is_empty() && next_line_continues {
            out.push('\\');
        }
        if i + 1 < lines.len() {
            out.push('\n');
        }
    }
    out
}
