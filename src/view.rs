//! Boundary between the navigation state machine and whatever draws it.
//!
//! A [`ViewAdapter`] receives snapshots of controller state through
//! [`present`]; widget events come back as [`ViewInput`] and are turned
//! into controller calls by [`dispatch_input`]. No rules live here beyond
//! that translation.

use crate::keybindings::Action;
use crate::navigation::{NavigationController, Screen};
use crate::store::{Entry, StoreError};

/// Drawing surface for the two screens.
pub trait ViewAdapter {
    /// Show the entry table with `cursor` highlighted.
    fn render_list(&mut self, entries: &[Entry], cursor: Option<usize>);

    /// Show one entry and its rendered document.
    fn render_detail(&mut self, entry: &Entry, document: &str);
}

/// Event reported by a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewInput {
    /// A list row became highlighted (e.g. mouse click).
    RowHighlighted(usize),
    /// A list row was activated (e.g. click on the highlighted row).
    RowActivated(usize),
    /// A key already resolved to an action by the keybinding registry.
    Key(Action),
}

/// What the caller still has to do after [`dispatch_input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The controller handled it.
    Handled,
    /// The user asked to quit.
    Quit,
    /// Presentation-only action (scrolling, help, browser) left to the view.
    Unhandled(Action),
}

/// Draw the active screen.
pub fn present<V: ViewAdapter + ?Sized>(nav: &NavigationController, view: &mut V) {
    match nav.screen() {
        Screen::List => view.render_list(nav.store().entries(), nav.cursor()),
        Screen::Detail(detail) => {
            if let Some(entry) = nav.detail_entry() {
                view.render_detail(entry, &detail.document);
            }
        }
    }
}

/// Apply one widget event to the controller.
///
/// `page` is the number of list rows currently visible, used for
/// page-wise cursor movement.
pub fn dispatch_input(
    nav: &mut NavigationController,
    input: ViewInput,
    page: usize,
) -> Result<Dispatch, StoreError> {
    let action = match input {
        ViewInput::RowHighlighted(index) => {
            nav.highlight(index);
            return Ok(Dispatch::Handled);
        }
        ViewInput::RowActivated(index) => {
            nav.activate(index)?;
            return Ok(Dispatch::Handled);
        }
        ViewInput::Key(action) => action,
    };

    let page = isize::try_from(page.max(1)).unwrap_or(isize::MAX);
    match action {
        Action::Quit => return Ok(Dispatch::Quit),
        Action::NavDown => nav.move_cursor(1),
        Action::NavUp => nav.move_cursor(-1),
        Action::PageDown => nav.move_cursor(page),
        Action::PageUp => nav.move_cursor(-page),
        Action::Top => nav.highlight(0),
        Action::Bottom => nav.highlight(usize::MAX),
        Action::Open => nav.open()?,
        Action::Back => nav.back(),
        Action::MarkRead => nav.mark_current_read()?,
        Action::Next => nav.open_next()?,
        Action::ShowHelp
        | Action::OpenInBrowser
        | Action::ScrollDown
        | Action::ScrollUp
        | Action::ScrollPageDown
        | Action::ScrollPageUp => return Ok(Dispatch::Unhandled(action)),
    }
    Ok(Dispatch::Handled)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentRenderer;
    use crate::navigation::ReadDispatcher;
    use crate::store::{EntryId, EntryStore};
    use pretty_assertions::assert_eq;

    struct NoSync;

    impl ReadDispatcher for NoSync {
        fn dispatch(&self, _id: EntryId) {}
    }

    struct TitleRenderer;

    impl ContentRenderer for TitleRenderer {
        fn render(&self, entry: &Entry) -> String {
            format!("# {}", entry.title)
        }
    }

    #[derive(Debug, PartialEq)]
    enum Drawn {
        List { rows: usize, cursor: Option<usize>, unread: usize },
        Detail { id: EntryId, document: String },
    }

    #[derive(Default)]
    struct RecordingView {
        frames: Vec<Drawn>,
    }

    impl ViewAdapter for RecordingView {
        fn render_list(&mut self, entries: &[Entry], cursor: Option<usize>) {
            self.frames.push(Drawn::List {
                rows: entries.len(),
                cursor,
                unread: entries.iter().filter(|e| !e.is_read()).count(),
            });
        }

        fn render_detail(&mut self, entry: &Entry, document: &str) {
            self.frames.push(Drawn::Detail {
                id: entry.id,
                document: document.to_string(),
            });
        }
    }

    fn controller(n: i64) -> NavigationController {
        let entries = (1..=n)
            .map(|i| Entry::new(EntryId(i), format!("E{i}"), "Feed", ""))
            .collect();
        NavigationController::new(
            EntryStore::load(entries),
            Box::new(NoSync),
            Box::new(TitleRenderer),
        )
    }

    fn key(nav: &mut NavigationController, action: Action) -> Dispatch {
        dispatch_input(nav, ViewInput::Key(action), 10).unwrap()
    }

    #[test]
    fn test_present_list_then_detail() {
        let mut nav = controller(3);
        let mut view = RecordingView::default();

        present(&nav, &mut view);
        key(&mut nav, Action::NavDown);
        key(&mut nav, Action::Open);
        present(&nav, &mut view);

        assert_eq!(
            view.frames,
            vec![
                Drawn::List {
                    rows: 3,
                    cursor: Some(0),
                    unread: 3,
                },
                Drawn::Detail {
                    id: EntryId(2),
                    document: "# E2".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_present_reflects_mark_read_immediately() {
        let mut nav = controller(2);
        let mut view = RecordingView::default();

        key(&mut nav, Action::MarkRead);
        present(&nav, &mut view);

        assert_eq!(
            view.frames,
            vec![Drawn::List {
                rows: 2,
                cursor: Some(1),
                unread: 1,
            }]
        );
    }

    #[test]
    fn test_present_empty_store() {
        let nav = controller(0);
        let mut view = RecordingView::default();
        present(&nav, &mut view);
        assert_eq!(
            view.frames,
            vec![Drawn::List {
                rows: 0,
                cursor: None,
                unread: 0,
            }]
        );
    }

    #[test]
    fn test_row_events_drive_controller() {
        let mut nav = controller(5);

        dispatch_input(&mut nav, ViewInput::RowHighlighted(3), 10).unwrap();
        assert_eq!(nav.cursor(), Some(3));

        dispatch_input(&mut nav, ViewInput::RowActivated(1), 10).unwrap();
        assert_eq!(nav.cursor(), Some(1));
        assert_eq!(nav.detail().map(|d| d.index), Some(1));
    }

    #[test]
    fn test_page_top_bottom() {
        let mut nav = controller(30);
        dispatch_input(&mut nav, ViewInput::Key(Action::PageDown), 12).unwrap();
        assert_eq!(nav.cursor(), Some(12));
        dispatch_input(&mut nav, ViewInput::Key(Action::PageUp), 5).unwrap();
        assert_eq!(nav.cursor(), Some(7));
        key(&mut nav, Action::Bottom);
        assert_eq!(nav.cursor(), Some(29));
        key(&mut nav, Action::Top);
        assert_eq!(nav.cursor(), Some(0));
    }

    #[test]
    fn test_zero_page_still_moves() {
        let mut nav = controller(3);
        dispatch_input(&mut nav, ViewInput::Key(Action::PageDown), 0).unwrap();
        assert_eq!(nav.cursor(), Some(1));
    }

    #[test]
    fn test_next_from_detail() {
        let mut nav = controller(3);
        key(&mut nav, Action::Open);
        key(&mut nav, Action::Next);

        assert_eq!(nav.detail().map(|d| d.index), Some(1));
        assert!(nav.store().get(0).unwrap().is_read());
    }

    #[test]
    fn test_quit_and_view_only_actions() {
        let mut nav = controller(1);
        assert_eq!(key(&mut nav, Action::Quit), Dispatch::Quit);
        assert_eq!(
            key(&mut nav, Action::ScrollDown),
            Dispatch::Unhandled(Action::ScrollDown)
        );
        assert_eq!(
            key(&mut nav, Action::OpenInBrowser),
            Dispatch::Unhandled(Action::OpenInBrowser)
        );
    }

    #[test]
    fn test_empty_store_keys_are_noops() {
        let mut nav = controller(0);
        for action in [
            Action::NavDown,
            Action::Open,
            Action::MarkRead,
            Action::Next,
            Action::Bottom,
        ] {
            assert_eq!(key(&mut nav, action), Dispatch::Handled);
        }
        assert!(nav.screen().is_list());
        assert_eq!(nav.cursor(), None);
    }
}
