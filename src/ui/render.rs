//! Frame composition and the terminal [`ViewAdapter`].

use crate::app::{App, DetailPane, ListPane};
use crate::store::Entry;
use crate::view::{present, ViewAdapter};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    widgets::Paragraph,
    Frame,
};

use super::{detail, entries, help, status};

/// Minimum terminal dimensions for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 8;

/// Draws controller snapshots into one region of the frame.
struct TerminalView<'a, 'f> {
    frame: &'a mut Frame<'f>,
    area: Rect,
    list: &'a mut ListPane,
    detail: &'a mut DetailPane,
}

impl ViewAdapter for TerminalView<'_, '_> {
    fn render_list(&mut self, entries: &[Entry], cursor: Option<usize>) {
        entries::render(self.frame, self.area, self.list, entries, cursor);
    }

    fn render_detail(&mut self, entry: &Entry, document: &str) {
        detail::render(self.frame, self.area, self.detail, entry, document);
    }
}

pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        // Mouse hits must not land on rows from a previous, larger frame
        app.list.rows_area = Rect::default();
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    {
        let App {
            nav, list, detail, ..
        } = &mut *app;
        let mut view = TerminalView {
            frame: &mut *f,
            area: chunks[0],
            list,
            detail,
        };
        present(nav, &mut view);
    }

    status::render(f, app, chunks[1]);

    if app.show_help {
        help::render(f, app);
    }
}
