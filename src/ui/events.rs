//! Background task results.
//!
//! Sync outcomes only ever produce notifications; the store and cursor are
//! never touched from here.

use crate::app::{App, AppEvent};
use crate::util::strip_control_chars;

/// Apply one background event to the UI state.
///
/// Always requests a redraw so the "syncing N" indicator follows the
/// in-flight count.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    app.needs_redraw = true;
    match event {
        AppEvent::MarkReadSynced { entry_id } => {
            tracing::debug!(entry_id = %entry_id, "Server acknowledged mark-read");
        }
        AppEvent::MarkReadFailed { entry_id, error } => {
            app.sync_failures += 1;
            tracing::warn!(
                entry_id = %entry_id,
                error = %error,
                failures = app.sync_failures,
                "Entry stays read locally but the server was not updated"
            );
            // Server error bodies may echo arbitrary text
            let error = strip_control_chars(&error).into_owned();
            app.set_status(format!("Sync failed for entry {}: {}", entry_id, error));
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            app.set_status(format!("Internal error in {} task", task));
        }
    }
}
