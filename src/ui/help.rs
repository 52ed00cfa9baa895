//! Help overlay: scrollable table of the effective keybindings, grouped by
//! screen.

use crate::app::App;
use crate::keybindings::Context;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
    Frame,
};

const CONTEXT_ORDER: [Context; 3] = [Context::Global, Context::List, Context::Detail];

pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(80, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }
    f.render_widget(Clear, overlay);

    let bindings = app.keybindings.all_bindings();
    let mut rows: Vec<Row> = Vec::new();

    for ctx in CONTEXT_ORDER {
        let group: Vec<_> = bindings.iter().filter(|(c, ..)| *c == ctx).collect();
        if group.is_empty() {
            continue;
        }
        if !rows.is_empty() {
            rows.push(Row::new(vec![String::new(), String::new()]));
        }
        rows.push(
            Row::new(vec![
                Line::from(Span::styled(
                    format!("-- {} --", ctx.label()),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
            ])
            .style(Style::default().fg(Color::Cyan)),
        );
        for (_, key, _, description) in group {
            rows.push(Row::new(vec![format!("  {}", key), description.to_string()]));
        }
    }

    // -2 border, -2 header with its margin
    let visible_height = overlay.height.saturating_sub(4) as usize;
    let max_scroll = rows.len().saturating_sub(visible_height);
    let scroll = app.help_scroll_offset.min(max_scroll);
    let visible_rows: Vec<Row> = rows.into_iter().skip(scroll).take(visible_height).collect();

    let title = if max_scroll > 0 {
        format!(" Help ({}/{}) ", scroll + 1, max_scroll + 1)
    } else {
        " Help (? to close) ".to_string()
    };

    let table = Table::new(visible_rows, [Constraint::Length(16), Constraint::Min(20)])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title),
        )
        .header(
            Row::new(vec!["Key", "Action"])
                .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
                .bottom_margin(1),
        );
    f.render_widget(table, overlay);

    if scroll < max_scroll {
        let hint_area = Rect {
            x: overlay.x + 1,
            y: overlay.y + overlay.height.saturating_sub(1),
            width: overlay.width.saturating_sub(2),
            height: 1,
        };
        let hint = Span::styled(
            " j/k to scroll, ? or Esc to close ",
            Style::default().fg(Color::DarkGray),
        );
        f.render_widget(Paragraph::new(Line::from(hint)), hint_area);
    }
}

/// Rectangle covering the given percentages of `area`, centered.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let r = centered_rect(50, 50, Rect::new(0, 0, 100, 40));
        assert_eq!(r, Rect::new(25, 10, 50, 20));
    }

    #[test]
    fn test_centered_rect_offset_parent() {
        let r = centered_rect(80, 80, Rect::new(10, 5, 50, 20));
        assert_eq!(r, Rect::new(15, 7, 40, 16));
    }
}
