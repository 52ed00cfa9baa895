use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Run `future`, turning a panic into `Err(message)`.
///
/// Background tasks use this so a panic becomes an `AppEvent::TaskPanicked`
/// for the UI instead of vanishing inside the runtime.
pub async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|payload| {
            if let Some(s) = payload.downcast_ref::<&'static str>() {
                (*s).to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            }
        })
}
