//! Key and mouse handling.
//!
//! Keys are resolved through the keybinding registry, then handed to
//! [`dispatch_input`]; only presentation actions are handled here.

use crate::app::App;
use crate::keybindings::Action as KbAction;
use crate::util::validate_url_for_open;
use crate::view::{dispatch_input, Dispatch, ViewInput};
use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use super::Action;

const ERR_NO_URL: &str = "Entry has no link";

/// Lines moved per mouse wheel notch on the detail screen.
const WHEEL_LINES: isize = 3;

pub(super) fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    if app.show_help {
        handle_help_input(app, code);
        return Action::Continue;
    }

    let context = app.context();
    match app.keybindings.action_for_key(code, modifiers, context) {
        Some(action) => apply(app, ViewInput::Key(action)),
        None => Action::Continue,
    }
}

/// Captures all keys while the help overlay is visible.
fn handle_help_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
}

pub(super) fn handle_mouse(app: &mut App, mouse: MouseEvent) -> Action {
    if app.show_help {
        match mouse.kind {
            MouseEventKind::ScrollDown => {
                app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
            }
            MouseEventKind::ScrollUp => {
                app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
            }
            _ => return Action::Continue,
        }
        app.needs_redraw = true;
        return Action::Continue;
    }

    let on_list = app.nav.screen().is_list();
    let control = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if on_list => {
            let len = app.nav.store().len();
            match app.list.row_at(mouse.column, mouse.row, len) {
                Some(index) if app.nav.cursor() == Some(index) => {
                    apply(app, ViewInput::RowActivated(index))
                }
                Some(index) => apply(app, ViewInput::RowHighlighted(index)),
                None => return Action::Continue,
            }
        }
        MouseEventKind::ScrollDown if on_list => apply(app, ViewInput::Key(KbAction::NavDown)),
        MouseEventKind::ScrollUp if on_list => apply(app, ViewInput::Key(KbAction::NavUp)),
        MouseEventKind::ScrollDown => {
            app.detail.scroll_by(WHEEL_LINES);
            Action::Continue
        }
        MouseEventKind::ScrollUp => {
            app.detail.scroll_by(-WHEEL_LINES);
            Action::Continue
        }
        _ => return Action::Continue,
    };
    app.needs_redraw = true;
    control
}

/// Forward one input to the controller and finish whatever it leaves over.
fn apply(app: &mut App, input: ViewInput) -> Action {
    let was_detail = app.nav.screen().is_detail();
    let page = app.list.visible_rows();

    match dispatch_input(&mut app.nav, input, page) {
        Ok(Dispatch::Quit) => return Action::Quit,
        Ok(Dispatch::Handled) => {}
        Ok(Dispatch::Unhandled(action)) => handle_view_action(app, action),
        Err(e) => {
            tracing::error!(error = %e, ?input, "Navigation state out of range");
            app.set_status(format!("Error: {}", e));
        }
    }

    // A new document (or leaving one) invalidates scroll and cached lines
    let is_detail = app.nav.screen().is_detail();
    if was_detail != is_detail || input == ViewInput::Key(KbAction::Next) {
        app.detail.reset();
    }
    Action::Continue
}

fn handle_view_action(app: &mut App, action: KbAction) {
    match action {
        KbAction::ShowHelp => {
            app.show_help = !app.show_help;
            app.help_scroll_offset = 0;
        }
        KbAction::OpenInBrowser => open_current_in_browser(app),
        KbAction::ScrollDown => app.detail.scroll_by(1),
        KbAction::ScrollUp => app.detail.scroll_by(-1),
        KbAction::ScrollPageDown => {
            let page = app.detail.page();
            app.detail.scroll_by(page);
        }
        KbAction::ScrollPageUp => {
            let page = app.detail.page();
            app.detail.scroll_by(-page);
        }
        other => tracing::debug!(action = ?other, "Action has no view handler"),
    }
}

fn open_current_in_browser(app: &mut App) {
    let entry = if app.nav.screen().is_detail() {
        app.nav.detail_entry()
    } else {
        app.nav.selected_entry()
    };
    let Some(entry) = entry else {
        return;
    };
    let Some(url) = entry.url.clone() else {
        app.set_status(ERR_NO_URL);
        return;
    };

    // Entry links come from feed content; only hand http(s) to the OS
    match validate_url_for_open(&url) {
        Err(e) => app.set_status(format!("Refusing to open link: {}", e)),
        Ok(valid) => match open::that(valid.as_str()) {
            Ok(()) => {
                tracing::debug!(url = %valid, "Opened entry in browser");
                app.set_status("Opened in browser");
            }
            Err(e) => app.set_status(format!("Failed to open browser: {}", e)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::HtmlRenderer;
    use crate::keybindings::KeybindingRegistry;
    use crate::navigation::{NavigationController, ReadDispatcher};
    use crate::store::{Entry, EntryId, EntryStore};
    use crossterm::event::KeyModifiers;
    use ratatui::layout::Rect;
    use std::sync::Arc;

    struct NoSync;

    impl ReadDispatcher for NoSync {
        fn dispatch(&self, _id: EntryId) {}
    }

    fn test_app(n: i64) -> App {
        let entries = (1..=n)
            .map(|i| Entry::new(EntryId(i), format!("Entry {i}"), "Feed", "<p>body</p>"))
            .collect();
        let nav = NavigationController::new(
            EntryStore::load(entries),
            Box::new(NoSync),
            Box::new(HtmlRenderer::default()),
        );
        let mut app = App::new(nav, KeybindingRegistry::new(), Arc::default());
        app.list.rows_area = Rect::new(1, 2, 60, 10);
        app
    }

    fn press(app: &mut App, code: KeyCode) -> Action {
        handle_input(app, code, KeyModifiers::NONE)
    }

    fn click(app: &mut App, column: u16, row: u16) -> Action {
        handle_mouse(
            app,
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                modifiers: KeyModifiers::NONE,
            },
        )
    }

    fn wheel(app: &mut App, kind: MouseEventKind) -> Action {
        handle_mouse(
            app,
            MouseEvent {
                kind,
                column: 5,
                row: 5,
                modifiers: KeyModifiers::NONE,
            },
        )
    }

    #[test]
    fn test_triage_from_keyboard() {
        let mut app = test_app(3);
        press(&mut app, KeyCode::Char('r'));
        assert!(app.nav.store().get(0).unwrap().is_read());
        assert_eq!(app.nav.cursor(), Some(1));

        press(&mut app, KeyCode::Enter);
        assert!(app.nav.screen().is_detail());
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.nav.detail().map(|d| d.index), Some(2));
        assert!(app.nav.store().get(1).unwrap().is_read());
    }

    #[test]
    fn test_q_backs_out_of_detail_then_quits() {
        let mut app = test_app(2);
        press(&mut app, KeyCode::Enter);
        assert_eq!(press(&mut app, KeyCode::Char('q')), Action::Continue);
        assert!(app.nav.screen().is_list());
        assert_eq!(press(&mut app, KeyCode::Char('q')), Action::Quit);
    }

    #[test]
    fn test_scroll_reset_when_next_entry_opens() {
        let mut app = test_app(3);
        press(&mut app, KeyCode::Enter);
        app.detail.line_count = 100;
        app.detail.visible_lines = 10;
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.detail.scroll, 1);

        press(&mut app, KeyCode::Right);
        assert_eq!(app.detail.scroll, 0);
    }

    #[test]
    fn test_help_captures_keys() {
        let mut app = test_app(2);
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);

        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.help_scroll_offset, 1);
        assert_eq!(app.nav.cursor(), Some(0));

        assert_eq!(press(&mut app, KeyCode::Char('q')), Action::Continue);
        assert!(!app.show_help);
    }

    #[test]
    fn test_click_highlights_then_activates() {
        let mut app = test_app(5);
        // rows_area starts at y = 2, so row 5 is index 3
        click(&mut app, 10, 5);
        assert_eq!(app.nav.cursor(), Some(3));
        assert!(app.nav.screen().is_list());

        click(&mut app, 10, 5);
        assert_eq!(app.nav.detail().map(|d| d.index), Some(3));
    }

    #[test]
    fn test_click_outside_rows_ignored() {
        let mut app = test_app(2);
        click(&mut app, 10, 8);
        assert_eq!(app.nav.cursor(), Some(0));
    }

    #[test]
    fn test_wheel_moves_cursor_or_scrolls() {
        let mut app = test_app(3);
        wheel(&mut app, MouseEventKind::ScrollDown);
        assert_eq!(app.nav.cursor(), Some(1));

        press(&mut app, KeyCode::Enter);
        app.detail.line_count = 50;
        app.detail.visible_lines = 10;
        wheel(&mut app, MouseEventKind::ScrollDown);
        assert_eq!(app.detail.scroll, 3);
        assert_eq!(app.nav.cursor(), Some(1));
    }

    #[test]
    fn test_open_in_browser_without_link() {
        let mut app = test_app(1);
        press(&mut app, KeyCode::Char('o'));
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg, ERR_NO_URL);
    }

    #[test]
    fn test_open_in_browser_rejects_unsafe_scheme() {
        let entries = vec![Entry::new(EntryId(1), "t", "f", "").with_url("file:///etc/passwd")];
        let nav = NavigationController::new(
            EntryStore::load(entries),
            Box::new(NoSync),
            Box::new(HtmlRenderer::default()),
        );
        let mut app = App::new(nav, KeybindingRegistry::new(), Arc::default());

        press(&mut app, KeyCode::Char('o'));
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert!(msg.starts_with("Refusing to open link"));
    }
}
