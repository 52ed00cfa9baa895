//! Cursor and screen state machine.
//!
//! All user-driven transitions go through [`NavigationController`], so the
//! terminal layer only forwards events and draws whatever state results.
//!
//! States are `List` and `Detail`; the session starts in `List` and never
//! terminates on its own. Operations that do not apply to the current
//! screen, or that need an entry while the store is empty, are silent
//! no-ops. The only errors are [`StoreError`]s, which indicate a broken
//! cursor invariant rather than anything a user can trigger.

use crate::content::ContentRenderer;
use crate::store::{Entry, EntryId, EntryStore, StoreError};

/// Fire-and-forget delivery of a mark-read to the feed service.
///
/// Implementations must return immediately; the outcome is reported out of
/// band and never feeds back into local state.
pub trait ReadDispatcher: Send {
    /// Queue the remote update for `id`. Must not block.
    fn dispatch(&self, id: EntryId);
}

/// The entry currently shown on the detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    /// Store index of the displayed entry.
    pub index: usize,
    /// Rendered document, produced fresh on every open.
    pub document: String,
}

/// Which screen is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    List,
    Detail(DetailView),
}

impl Screen {
    pub fn is_list(&self) -> bool {
        matches!(self, Screen::List)
    }

    pub fn is_detail(&self) -> bool {
        matches!(self, Screen::Detail(_))
    }
}

/// Owns the entry store, the cursor and the active screen.
pub struct NavigationController {
    store: EntryStore,
    /// `None` only when the store is empty.
    cursor: Option<usize>,
    /// Cached `store[cursor]` lookup.
    selected: Option<usize>,
    screen: Screen,
    dispatcher: Box<dyn ReadDispatcher>,
    renderer: Box<dyn ContentRenderer>,
}

impl NavigationController {
    /// Start a session on the list screen.
    ///
    /// # Arguments
    ///
    /// * `store` - The loaded batch; the controller is its only writer
    /// * `dispatcher` - Receives one call per local mark-read
    /// * `renderer` - Turns an entry into its detail document on each open
    ///
    /// # Examples
    ///
    /// ```
    /// use termflux::content::HtmlRenderer;
    /// use termflux::navigation::{NavigationController, ReadDispatcher};
    /// use termflux::store::{Entry, EntryId, EntryStore};
    ///
    /// struct Offline;
    ///
    /// impl ReadDispatcher for Offline {
    ///     fn dispatch(&self, _id: EntryId) {}
    /// }
    ///
    /// let store = EntryStore::load(vec![
    ///     Entry::new(EntryId(1), "First", "Feed", "<p>one</p>"),
    ///     Entry::new(EntryId(2), "Second", "Feed", "<p>two</p>"),
    /// ]);
    /// let mut nav =
    ///     NavigationController::new(store, Box::new(Offline), Box::new(HtmlRenderer::default()));
    ///
    /// assert_eq!(nav.cursor(), Some(0));
    /// nav.mark_current_read().unwrap();
    /// assert_eq!(nav.cursor(), Some(1));
    /// assert_eq!(nav.store().unread_count(), 1);
    /// ```
    pub fn new(
        store: EntryStore,
        dispatcher: Box<dyn ReadDispatcher>,
        renderer: Box<dyn ContentRenderer>,
    ) -> Self {
        let cursor = if store.is_empty() { None } else { Some(0) };
        let mut nav = Self {
            store,
            cursor,
            selected: None,
            screen: Screen::List,
            dispatcher,
            renderer,
        };
        nav.select_current();
        nav
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Highlighted row; `None` only for an empty store.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Entry under the cursor.
    pub fn selected_entry(&self) -> Option<&Entry> {
        self.selected.and_then(|i| self.store.get(i).ok())
    }

    pub fn detail(&self) -> Option<&DetailView> {
        match &self.screen {
            Screen::Detail(view) => Some(view),
            Screen::List => None,
        }
    }

    /// Entry shown on the detail screen, if it is active.
    pub fn detail_entry(&self) -> Option<&Entry> {
        self.detail().and_then(|d| self.store.get(d.index).ok())
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Move the cursor by `delta` rows, clamped to the list bounds.
    pub fn move_cursor(&mut self, delta: isize) {
        if !self.screen.is_list() {
            return;
        }
        let Some(cursor) = self.cursor else {
            return;
        };
        let last = self.store.len().saturating_sub(1);
        let target = if delta < 0 {
            cursor.saturating_sub(delta.unsigned_abs())
        } else {
            cursor.saturating_add(delta.unsigned_abs()).min(last)
        };
        self.cursor = Some(target);
        self.select_current();
    }

    /// Put the cursor on `index` (clamped). Used when the list widget
    /// reports a highlighted row.
    pub fn highlight(&mut self, index: usize) {
        if !self.screen.is_list() || self.cursor.is_none() {
            return;
        }
        let last = self.store.len().saturating_sub(1);
        self.cursor = Some(index.min(last));
        self.select_current();
    }

    /// Highlight `index` and open it. Used when the list widget reports an
    /// activated row.
    pub fn activate(&mut self, index: usize) -> Result<(), StoreError> {
        self.highlight(index);
        self.open()
    }

    /// Recompute the selected entry from the cursor.
    pub fn select_current(&mut self) {
        self.selected = match self.cursor {
            Some(i) if i < self.store.len() => Some(i),
            _ => None,
        };
    }

    /// Switch to the detail screen for the selected entry.
    pub fn open(&mut self) -> Result<(), StoreError> {
        if !self.screen.is_list() {
            return Ok(());
        }
        let Some(index) = self.selected else {
            return Ok(());
        };
        let entry = self.store.get(index)?;
        let document = self.renderer.render(entry);
        tracing::debug!(entry_id = %entry.id, index, "Opened entry");
        self.screen = Screen::Detail(DetailView { index, document });
        Ok(())
    }

    /// Return to the list. Cursor and read flags are left alone.
    pub fn back(&mut self) {
        if self.screen.is_detail() {
            self.screen = Screen::List;
        }
    }

    /// Mark the current entry read locally and dispatch the remote update.
    ///
    /// On the list screen the cursor then advances one row; on the detail
    /// screen it stays put.
    pub fn mark_current_read(&mut self) -> Result<(), StoreError> {
        let index = match &self.screen {
            Screen::List => self.selected,
            Screen::Detail(view) => Some(view.index),
        };
        let Some(index) = index else {
            return Ok(());
        };

        self.store.mark_read(index)?;
        let id = self.store.get(index)?.id;
        tracing::debug!(entry_id = %id, index, "Marked entry read");
        self.dispatcher.dispatch(id);

        if self.screen.is_list() {
            self.move_cursor(1);
        }
        Ok(())
    }

    /// From the detail screen: mark the shown entry read and open the next
    /// one. At the end of the list the last entry is shown again.
    pub fn open_next(&mut self) -> Result<(), StoreError> {
        if !self.screen.is_detail() {
            return Ok(());
        }
        self.back();
        self.mark_current_read()?;
        self.select_current();
        self.open()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingDispatcher {
        sent: Arc<Mutex<Vec<EntryId>>>,
    }

    impl RecordingDispatcher {
        fn sent(&self) -> Vec<EntryId> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl ReadDispatcher for RecordingDispatcher {
        fn dispatch(&self, id: EntryId) {
            self.sent.lock().unwrap().push(id);
        }
    }

    #[derive(Clone, Default)]
    struct CountingRenderer {
        calls: Arc<Mutex<usize>>,
    }

    impl ContentRenderer for CountingRenderer {
        fn render(&self, entry: &Entry) -> String {
            *self.calls.lock().unwrap() += 1;
            format!("# {}", entry.title)
        }
    }

    fn entries(n: i64) -> Vec<Entry> {
        (1..=n)
            .map(|i| Entry::new(EntryId(i), format!("E{i}"), "Feed", "<p>x</p>"))
            .collect()
    }

    fn controller(n: i64) -> (NavigationController, RecordingDispatcher, CountingRenderer) {
        let dispatcher = RecordingDispatcher::default();
        let renderer = CountingRenderer::default();
        let nav = NavigationController::new(
            EntryStore::load(entries(n)),
            Box::new(dispatcher.clone()),
            Box::new(renderer.clone()),
        );
        (nav, dispatcher, renderer)
    }

    fn read_flags(nav: &NavigationController) -> Vec<bool> {
        nav.store().entries().iter().map(Entry::is_read).collect()
    }

    #[test]
    fn test_initial_state() {
        let (nav, _, _) = controller(3);
        assert_eq!(nav.screen(), &Screen::List);
        assert_eq!(nav.cursor(), Some(0));
        assert_eq!(nav.selected_entry().map(|e| e.id), Some(EntryId(1)));
    }

    #[test]
    fn test_initial_state_empty() {
        let (nav, _, _) = controller(0);
        assert_eq!(nav.cursor(), None);
        assert!(nav.selected_entry().is_none());
    }

    #[test]
    fn test_move_cursor_clamps_both_ends() {
        let (mut nav, _, _) = controller(3);
        nav.move_cursor(-5);
        assert_eq!(nav.cursor(), Some(0));
        nav.move_cursor(10);
        assert_eq!(nav.cursor(), Some(2));
        assert_eq!(nav.selected_entry().map(|e| e.id), Some(EntryId(3)));
        nav.move_cursor(isize::MAX);
        assert_eq!(nav.cursor(), Some(2));
        nav.move_cursor(isize::MIN);
        assert_eq!(nav.cursor(), Some(0));
    }

    #[test]
    fn test_move_cursor_ignored_in_detail() {
        let (mut nav, _, _) = controller(3);
        nav.open().unwrap();
        nav.move_cursor(1);
        assert_eq!(nav.cursor(), Some(0));
    }

    #[test]
    fn test_highlight_and_activate() {
        let (mut nav, _, _) = controller(3);
        nav.highlight(1);
        assert_eq!(nav.cursor(), Some(1));
        nav.highlight(99);
        assert_eq!(nav.cursor(), Some(2));

        nav.activate(0).unwrap();
        assert_eq!(nav.cursor(), Some(0));
        assert_eq!(nav.detail().map(|d| d.index), Some(0));
    }

    // Scenario A
    #[test]
    fn test_mark_read_in_list_advances() {
        let (mut nav, dispatcher, _) = controller(3);
        nav.mark_current_read().unwrap();

        assert_eq!(read_flags(&nav), vec![true, false, false]);
        assert_eq!(nav.cursor(), Some(1));
        assert_eq!(nav.selected_entry().map(|e| e.id), Some(EntryId(2)));
        assert_eq!(dispatcher.sent(), vec![EntryId(1)]);
    }

    // Scenario B
    #[test]
    fn test_mark_read_on_last_row_stays() {
        let (mut nav, _, _) = controller(3);
        nav.move_cursor(2);
        nav.mark_current_read().unwrap();

        assert_eq!(read_flags(&nav), vec![false, false, true]);
        assert_eq!(nav.cursor(), Some(2));
        let selected = nav.selected_entry().unwrap();
        assert_eq!(selected.id, EntryId(3));
        assert!(selected.is_read());
    }

    // Scenario C
    #[test]
    fn test_empty_store_operations_are_noops() {
        let (mut nav, dispatcher, renderer) = controller(0);
        nav.move_cursor(1);
        nav.move_cursor(-1);
        nav.highlight(3);
        nav.open().unwrap();
        nav.mark_current_read().unwrap();
        nav.open_next().unwrap();
        nav.back();

        assert_eq!(nav.cursor(), None);
        assert_eq!(nav.screen(), &Screen::List);
        assert!(dispatcher.sent().is_empty());
        assert_eq!(*renderer.calls.lock().unwrap(), 0);
    }

    // Scenario D
    #[test]
    fn test_open_next_advances_detail() {
        let (mut nav, dispatcher, _) = controller(3);
        nav.move_cursor(1);
        nav.open().unwrap();
        assert_eq!(nav.detail_entry().map(|e| e.id), Some(EntryId(2)));

        nav.open_next().unwrap();
        assert!(nav.screen().is_detail());
        assert_eq!(nav.detail_entry().map(|e| e.id), Some(EntryId(3)));
        assert!(nav.store().get(1).unwrap().is_read());
        assert!(!nav.store().get(2).unwrap().is_read());
        assert_eq!(nav.cursor(), Some(2));
        assert_eq!(dispatcher.sent(), vec![EntryId(2)]);
    }

    #[test]
    fn test_open_next_at_end_reopens_last() {
        let (mut nav, _, _) = controller(2);
        nav.move_cursor(1);
        nav.open().unwrap();
        nav.open_next().unwrap();

        assert_eq!(nav.cursor(), Some(1));
        assert_eq!(nav.detail().map(|d| d.index), Some(1));
        assert!(nav.detail_entry().unwrap().is_read());
    }

    #[test]
    fn test_open_next_ignored_in_list() {
        let (mut nav, dispatcher, _) = controller(3);
        nav.open_next().unwrap();
        assert_eq!(nav.screen(), &Screen::List);
        assert_eq!(nav.cursor(), Some(0));
        assert!(dispatcher.sent().is_empty());
    }

    #[test]
    fn test_mark_read_in_detail_keeps_cursor() {
        let (mut nav, dispatcher, _) = controller(3);
        nav.open().unwrap();
        nav.mark_current_read().unwrap();

        assert!(nav.screen().is_detail());
        assert_eq!(nav.cursor(), Some(0));
        assert!(nav.detail_entry().unwrap().is_read());
        assert_eq!(dispatcher.sent(), vec![EntryId(1)]);
    }

    #[test]
    fn test_back_preserves_cursor_and_flags() {
        let (mut nav, _, _) = controller(3);
        nav.move_cursor(2);
        nav.open().unwrap();
        nav.back();
        assert_eq!(nav.screen(), &Screen::List);
        assert_eq!(nav.cursor(), Some(2));
        assert_eq!(read_flags(&nav), vec![false, false, false]);
    }

    #[test]
    fn test_back_in_list_is_noop() {
        let (mut nav, _, _) = controller(1);
        nav.back();
        assert_eq!(nav.screen(), &Screen::List);
    }

    #[test]
    fn test_open_renders_every_time() {
        let (mut nav, _, renderer) = controller(2);
        nav.open().unwrap();
        nav.back();
        nav.open().unwrap();
        assert_eq!(*renderer.calls.lock().unwrap(), 2);
        assert_eq!(nav.detail().unwrap().document, "# E1");
    }

    #[test]
    fn test_open_while_in_detail_is_noop() {
        let (mut nav, _, renderer) = controller(2);
        nav.open().unwrap();
        nav.open().unwrap();
        assert_eq!(*renderer.calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_marking_twice_dispatches_twice() {
        let (mut nav, dispatcher, _) = controller(1);
        nav.mark_current_read().unwrap();
        nav.mark_current_read().unwrap();
        assert_eq!(read_flags(&nav), vec![true]);
        assert_eq!(dispatcher.sent(), vec![EntryId(1), EntryId(1)]);
    }

    proptest! {
        #[test]
        fn prop_cursor_stays_in_bounds(
            len in 0i64..30,
            deltas in proptest::collection::vec(-50isize..50, 0..20),
        ) {
            let (mut nav, _, _) = controller(len);
            for delta in deltas {
                nav.move_cursor(delta);
                match nav.cursor() {
                    Some(c) => prop_assert!(c < len as usize),
                    None => prop_assert_eq!(len, 0),
                }
            }
        }

        #[test]
        fn prop_open_back_round_trip(len in 1i64..30, start in 0usize..30) {
            let (mut nav, _, _) = controller(len);
            nav.highlight(start);
            let cursor = nav.cursor();
            let flags = read_flags(&nav);

            nav.open().unwrap();
            nav.back();

            prop_assert_eq!(nav.cursor(), cursor);
            prop_assert_eq!(read_flags(&nav), flags);
            prop_assert!(nav.screen().is_list());
        }
    }
}
