//! Detached mark-read delivery to the feed service.
//!
//! Each dispatch spawns its own task; the outcome comes back to the UI as an
//! [`AppEvent`] and is only ever used for a notification.

use crate::app::AppEvent;
use crate::miniflux::MinifluxClient;
use crate::navigation::ReadDispatcher;
use crate::store::EntryId;
use crate::util::catch_task_panic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// [`ReadDispatcher`] that reports mark-read results back to the UI loop.
pub struct RemoteReadDispatcher {
    client: MinifluxClient,
    event_tx: mpsc::Sender<AppEvent>,
    runtime: Handle,
    in_flight: Arc<AtomicUsize>,
}

impl RemoteReadDispatcher {
    /// Create a dispatcher that spawns onto `runtime`.
    ///
    /// # Arguments
    ///
    /// * `client` - Feed service client; cloned into every task
    /// * `event_tx` - Channel the UI loop drains for [`AppEvent`]s
    /// * `runtime` - Handle used to spawn, since `dispatch` is called from
    ///   synchronous controller code
    pub fn new(client: MinifluxClient, event_tx: mpsc::Sender<AppEvent>, runtime: Handle) -> Self {
        Self {
            client,
            event_tx,
            runtime,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter of dispatches that have not reported back yet.
    pub fn in_flight(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.in_flight)
    }
}

impl ReadDispatcher for RemoteReadDispatcher {
    fn dispatch(&self, id: EntryId) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);

        let client = self.client.clone();
        let tx = self.event_tx.clone();
        let in_flight = Arc::clone(&self.in_flight);

        self.runtime.spawn(async move {
            let outcome = catch_task_panic(client.mark_read(&[id])).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);

            let event = match outcome {
                Ok(Ok(())) => {
                    tracing::debug!(entry_id = %id, "Mark-read synced");
                    AppEvent::MarkReadSynced { entry_id: id }
                }
                Ok(Err(e)) => {
                    tracing::warn!(entry_id = %id, error = %e, "Mark-read sync failed");
                    AppEvent::MarkReadFailed {
                        entry_id: id,
                        error: e.to_string(),
                    }
                }
                Err(panic_msg) => {
                    tracing::error!(entry_id = %id, error = %panic_msg, "Mark-read task panicked");
                    AppEvent::TaskPanicked {
                        task: "mark_read",
                        error: panic_msg,
                    }
                }
            };

            if tx.send(event).await.is_err() {
                tracing::debug!(entry_id = %id, "Event channel closed, dropping sync result");
            }
        });
    }
}
