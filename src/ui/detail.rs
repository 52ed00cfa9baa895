use crate::app::DetailPane;
use crate::store::Entry;
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::entries::format_relative_time;

/// Render the detail pane for `entry`.
///
/// Styled lines are built once per opened entry and kept in the pane until
/// the next open or back.
pub(super) fn render(
    f: &mut Frame,
    area: Rect,
    pane: &mut DetailPane,
    entry: &Entry,
    document: &str,
) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let viewport_width = area.width.saturating_sub(2) as usize;
    pane.visible_lines = area.height.saturating_sub(2) as usize;

    let stale = pane.rendered.as_ref().map(|(id, _)| *id) != Some(entry.id);
    if stale {
        let mut lines = Vec::with_capacity(document.lines().count() + 2);
        lines.push(metadata_line(entry));
        lines.push(Line::from(""));
        lines.extend(render_markdown(document));
        pane.rendered = Some((entry.id, lines));
    }
    let lines = pane
        .rendered
        .as_ref()
        .map(|(_, lines)| lines.as_slice())
        .unwrap_or_default();

    pane.line_count = wrapped_line_count(lines, viewport_width);
    pane.scroll = pane.scroll.min(pane.max_scroll());

    let read_marker = if entry.is_read() { "read" } else { "unread" };
    let paragraph = Paragraph::new(Text::from(lines.to_vec()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" Entry ({}) ", read_marker)),
        )
        .wrap(Wrap { trim: false })
        .scroll((pane.scroll as u16, 0));

    f.render_widget(paragraph, area);
}

fn metadata_line(entry: &Entry) -> Line<'static> {
    let mut meta = entry.feed_title.clone();
    let age = format_relative_time(entry.published);
    if !age.is_empty() {
        meta.push_str(" \u{2022} ");
        meta.push_str(&age);
    }
    Line::from(Span::styled(meta, Style::default().fg(Color::DarkGray)))
}

/// Rows the lines occupy once wrapped at `width` columns.
fn wrapped_line_count(lines: &[Line<'_>], width: usize) -> usize {
    if width == 0 {
        return lines.len();
    }
    lines
        .iter()
        .map(|line| line.width().div_ceil(width).max(1))
        .sum()
}

#[derive(Default)]
struct InlineStyle {
    heading: Option<HeadingLevel>,
    strong: bool,
    emphasis: bool,
    code_block: bool,
    link: bool,
    quote_depth: usize,
}

impl InlineStyle {
    fn current(&self) -> Style {
        if self.code_block {
            return Style::default().fg(Color::Yellow);
        }
        let mut style = Style::default();
        match self.heading {
            Some(HeadingLevel::H1) => {
                style = style
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
            }
            Some(_) => style = style.fg(Color::Cyan).add_modifier(Modifier::BOLD),
            None => {}
        }
        if self.strong {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.emphasis {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.link {
            style = style.fg(Color::Blue).add_modifier(Modifier::UNDERLINED);
        }
        if self.quote_depth > 0 {
            style = style.fg(Color::Gray);
        }
        style
    }
}

/// Convert a markdown document into styled terminal lines.
pub fn render_markdown(md: &str) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::with_capacity(md.lines().count());
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut state = InlineStyle::default();
    let mut list_depth = 0usize;
    let mut link_target: Option<String> = None;

    let flush = |spans: &mut Vec<Span<'static>>, lines: &mut Vec<Line<'static>>| {
        if !spans.is_empty() {
            lines.push(Line::from(std::mem::take(spans)));
        }
    };

    for event in Parser::new(md) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => state.heading = Some(level),
            Event::End(TagEnd::Heading(_)) => {
                flush(&mut spans, &mut lines);
                lines.push(Line::from(""));
                state.heading = None;
            }
            Event::End(TagEnd::Paragraph) => {
                flush(&mut spans, &mut lines);
                if list_depth == 0 {
                    lines.push(Line::from(""));
                }
            }
            Event::Start(Tag::BlockQuote { .. }) => state.quote_depth += 1,
            Event::End(TagEnd::BlockQuote { .. }) => {
                state.quote_depth = state.quote_depth.saturating_sub(1);
            }
            Event::Start(Tag::CodeBlock(_)) => state.code_block = true,
            Event::End(TagEnd::CodeBlock) => {
                flush(&mut spans, &mut lines);
                state.code_block = false;
                lines.push(Line::from(""));
            }
            Event::Start(Tag::List { .. }) => list_depth += 1,
            Event::End(TagEnd::List { .. }) => {
                list_depth = list_depth.saturating_sub(1);
                if list_depth == 0 {
                    lines.push(Line::from(""));
                }
            }
            Event::Start(Tag::Item) => {
                flush(&mut spans, &mut lines);
                let indent = "  ".repeat(list_depth.saturating_sub(1));
                spans.push(Span::raw(format!("{}\u{2022} ", indent)));
            }
            Event::End(TagEnd::Item) => flush(&mut spans, &mut lines),
            Event::Start(Tag::Emphasis) => state.emphasis = true,
            Event::End(TagEnd::Emphasis) => state.emphasis = false,
            Event::Start(Tag::Strong) => state.strong = true,
            Event::End(TagEnd::Strong) => state.strong = false,
            Event::Start(Tag::Link { dest_url, .. }) => {
                state.link = true;
                link_target = Some(dest_url.into_string());
            }
            Event::End(TagEnd::Link) => {
                state.link = false;
                if let Some(url) = link_target.take() {
                    spans.push(Span::styled(
                        format!(" <{}>", url),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                spans.push(Span::styled(
                    format!("[Image: {}]", dest_url),
                    Style::default().fg(Color::Blue),
                ));
            }
            Event::Text(text) if state.code_block => {
                for code_line in text.lines() {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", code_line),
                        state.current(),
                    )));
                }
            }
            Event::Text(text) => {
                if spans.is_empty() && state.quote_depth > 0 {
                    spans.push(Span::styled(
                        "\u{2502} ".repeat(state.quote_depth),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                spans.push(Span::styled(text.into_string(), state.current()));
            }
            Event::Code(code) => {
                spans.push(Span::styled(
                    format!("`{}`", code),
                    Style::default().fg(Color::Yellow),
                ));
            }
            // Markup that reaches this point was part of the text
            Event::InlineHtml(html) => {
                spans.push(Span::styled(html.into_string(), state.current()));
            }
            Event::Html(html) => {
                spans.push(Span::styled(
                    html.trim_end_matches('\n').to_string(),
                    state.current(),
                ));
                flush(&mut spans, &mut lines);
            }
            Event::SoftBreak => spans.push(Span::raw(" ")),
            Event::HardBreak => flush(&mut spans, &mut lines),
            Event::Rule => {
                flush(&mut spans, &mut lines);
                lines.push(Line::from(Span::styled(
                    "\u{2500}".repeat(20),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            _ => {}
        }
    }

    flush(&mut spans, &mut lines);

    // Trailing blank lines only add dead scroll space
    while lines.last().is_some_and(|l| l.width() == 0) {
        lines.pop();
    }
    lines
}
