use crate::app::App;
use crate::keybindings::{Action, Context};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

const LIST_HINTS: &[(Action, &str)] = &[
    (Action::NavDown, "down"),
    (Action::Open, "open"),
    (Action::MarkRead, "read"),
    (Action::OpenInBrowser, "browser"),
    (Action::ShowHelp, "help"),
    (Action::Quit, "quit"),
];

const DETAIL_HINTS: &[(Action, &str)] = &[
    (Action::Back, "back"),
    (Action::Next, "next"),
    (Action::MarkRead, "read"),
    (Action::ScrollDown, "scroll"),
    (Action::OpenInBrowser, "browser"),
    (Action::ShowHelp, "help"),
];

/// Key hints for the active screen, using the effective bindings.
fn hints(app: &App) -> String {
    let context = app.context();
    let table = match context {
        Context::Detail => DETAIL_HINTS,
        _ => LIST_HINTS,
    };
    table
        .iter()
        .filter_map(|(action, label)| {
            app.keybindings
                .key_for(*action, context)
                .map(|key| format!("[{}] {}", key, label))
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn sync_indicator(app: &App) -> Option<String> {
    match app.syncing() {
        0 => None,
        n => Some(format!("syncing {} ", n)),
    }
}

/// Render the status bar: a notification if one is live, otherwise key
/// hints; pending syncs on the right.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = match &app.status_message {
        Some((msg, _)) => Cow::Borrowed(msg.as_ref()),
        None => Cow::Owned(hints(app)),
    };
    let style = Style::default().bg(Color::DarkGray).fg(Color::White);

    let Some(sync) = sync_indicator(app) else {
        f.render_widget(Paragraph::new(text).style(style), area);
        return;
    };

    let sync_width = (sync.chars().count() as u16).min(area.width);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(sync_width)])
        .split(area);
    f.render_widget(Paragraph::new(text).style(style), chunks[0]);
    f.render_widget(
        Paragraph::new(sync).style(style.fg(Color::Yellow)),
        chunks[1],
    );
}
