use crate::app::ListPane;
use crate::store::Entry;
use crate::util::truncate_to_width;
use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

const UNREAD_MARK: &str = "*";
const AGE_WIDTH: u16 = 6;
const MAX_FEED_WIDTH: u16 = 24;
const COLUMN_SPACING: u16 = 1;

/// Format a timestamp relative to now: `5m`, `3h`, `2d`, then `Jan 02`.
pub fn format_relative_time(timestamp: Option<i64>) -> String {
    format_relative_time_at(timestamp, Utc::now().timestamp())
}

fn format_relative_time_at(timestamp: Option<i64>, now: i64) -> String {
    let Some(ts) = timestamp else {
        return String::new();
    };

    let diff = now - ts;
    match diff {
        // Future dates from skewed feeds
        d if d < 0 => "now".to_string(),
        d if d < 3600 => format!("{}m", d / 60),
        d if d < 86_400 => format!("{}h", d / 3600),
        d if d < 604_800 => format!("{}d", d / 86_400),
        _ => DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.format("%b %d").to_string())
            .unwrap_or_default(),
    }
}

/// Render the entry table and record where its rows landed.
pub(super) fn render(
    f: &mut Frame,
    area: Rect,
    pane: &mut ListPane,
    entries: &[Entry],
    cursor: Option<usize>,
) {
    if area.width < 3 || area.height < 3 {
        pane.rows_area = Rect::default();
        return;
    }

    let unread = entries.iter().filter(|e| !e.is_read()).count();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" Unread {}/{} ", unread, entries.len()));

    let inner = block.inner(area);
    // First inner line is the header
    pane.rows_area = Rect {
        y: inner.y.saturating_add(1),
        height: inner.height.saturating_sub(1),
        ..inner
    };

    if entries.is_empty() {
        pane.rows_area = Rect::default();
        let empty = Paragraph::new("No unread entries")
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let feed_width = (inner.width / 4).min(MAX_FEED_WIDTH);
    let title_width = inner
        .width
        .saturating_sub(1 + feed_width + AGE_WIDTH + 3 * COLUMN_SPACING);

    let rows: Vec<Row> = entries
        .iter()
        .map(|entry| {
            let (mark, style) = if entry.is_read() {
                ("", Style::default().fg(Color::Gray))
            } else {
                (UNREAD_MARK, Style::default().add_modifier(Modifier::BOLD))
            };
            Row::new(vec![
                Cell::from(mark),
                Cell::from(truncate_to_width(&entry.title, title_width as usize).into_owned()),
                Cell::from(truncate_to_width(&entry.feed_title, feed_width as usize).into_owned())
                    .style(Style::default().fg(Color::Blue)),
                Cell::from(format_relative_time(entry.published))
                    .style(Style::default().fg(Color::DarkGray)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(1),
        Constraint::Min(title_width),
        Constraint::Length(feed_width),
        Constraint::Length(AGE_WIDTH),
    ];

    let header = Row::new(vec!["R", "Title", "Feed", "Age"]).style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::UNDERLINED),
    );

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(COLUMN_SPACING)
        .block(block)
        .row_highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    pane.table_state.select(cursor);
    f.render_stateful_widget(table, area, &mut pane.table_state);
}
