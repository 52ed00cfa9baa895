use crate::keybindings::{Context, KeybindingRegistry};
use crate::navigation::{NavigationController, Screen};
use crate::store::EntryId;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::TableState;
use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Maximum scroll offset for the detail pane (ratatui u16 limit).
pub const MAX_SCROLL: usize = u16::MAX as usize;

/// How long a status-bar notification stays up.
pub const STATUS_TTL: Duration = Duration::from_secs(3);

// ============================================================================
// Background Events
// ============================================================================

/// Results delivered from background tasks to the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    /// The service acknowledged a mark-read.
    MarkReadSynced {
        entry_id: EntryId,
    },
    /// The service rejected or never received a mark-read. Local state is
    /// unaffected.
    MarkReadFailed {
        entry_id: EntryId,
        error: String,
    },
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

// ============================================================================
// Pane State
// ============================================================================

/// Widget state for the entry table, updated while drawing.
#[derive(Debug, Default)]
pub struct ListPane {
    pub table_state: TableState,
    /// Screen area of the data rows (below the header), for mouse hit tests.
    pub rows_area: Rect,
}

impl ListPane {
    /// Data rows that fit in the last drawn frame; the page size for
    /// PageUp/PageDown.
    pub fn visible_rows(&self) -> usize {
        self.rows_area.height as usize
    }

    /// Store index under a mouse position, if it hits a drawn row.
    pub fn row_at(&self, column: u16, row: u16, len: usize) -> Option<usize> {
        let area = self.rows_area;
        let inside = column >= area.x
            && column < area.x.saturating_add(area.width)
            && row >= area.y
            && row < area.y.saturating_add(area.height);
        if !inside {
            return None;
        }
        let index = self.table_state.offset() + (row - area.y) as usize;
        (index < len).then_some(index)
    }
}

/// Scroll and layout state for the detail document.
#[derive(Debug, Default)]
pub struct DetailPane {
    pub scroll: usize,
    pub visible_lines: usize,
    /// Wrapped line count of the last drawn document.
    pub line_count: usize,
    /// Styled lines for the entry currently shown, built once per open.
    pub rendered: Option<(EntryId, Vec<Line<'static>>)>,
}

impl DetailPane {
    pub fn max_scroll(&self) -> usize {
        self.line_count
            .saturating_sub(self.visible_lines)
            .min(MAX_SCROLL)
    }

    /// Scroll by `delta` lines, clamped to `0..=max_scroll()`.
    pub fn scroll_by(&mut self, delta: isize) {
        let target = if delta < 0 {
            self.scroll.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll.saturating_add(delta.unsigned_abs())
        };
        self.scroll = target.min(self.max_scroll());
    }

    pub fn page(&self) -> isize {
        isize::try_from(self.visible_lines.saturating_sub(1).max(1)).unwrap_or(1)
    }

    /// Forget the previous document: scroll to top and drop cached lines.
    pub fn reset(&mut self) {
        self.scroll = 0;
        self.line_count = 0;
        self.rendered = None;
    }
}

// ============================================================================
// Application State
// ============================================================================

/// UI state wrapped around the navigation controller.
pub struct App {
    pub nav: NavigationController,
    pub keybindings: KeybindingRegistry,

    pub list: ListPane,
    pub detail: DetailPane,

    pub status_message: Option<(Cow<'static, str>, Instant)>,

    /// Dirty flag; the loop only draws when set.
    pub needs_redraw: bool,

    pub show_help: bool,
    pub help_scroll_offset: usize,

    /// Mark-read requests still on the wire.
    pub pending_syncs: Arc<AtomicUsize>,
    /// Failed mark-read requests this session.
    pub sync_failures: usize,
}

impl App {
    pub fn new(
        nav: NavigationController,
        keybindings: KeybindingRegistry,
        pending_syncs: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            nav,
            keybindings,
            list: ListPane::default(),
            detail: DetailPane::default(),
            status_message: None,
            needs_redraw: true,
            show_help: false,
            help_scroll_offset: 0,
            pending_syncs,
            sync_failures: 0,
        }
    }

    /// Keybinding context for the active screen.
    pub fn context(&self) -> Context {
        match self.nav.screen() {
            Screen::List => Context::List,
            Screen::Detail(_) => Context::Detail,
        }
    }

    pub fn syncing(&self) -> usize {
        self.pending_syncs.load(Ordering::Relaxed)
    }

    /// Set status message (auto-expires after [`STATUS_TTL`]).
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Drop the status message once it has expired.
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        match &self.status_message {
            Some((_, since)) if since.elapsed() >= STATUS_TTL => {
                self.status_message = None;
                true
            }
            _ => false,
        }
    }
}
