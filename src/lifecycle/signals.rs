//! OS signal handling.

use crate::lifecycle::Shutdown;

/// Spawn a task that triggers `shutdown` on Ctrl-C.
pub fn spawn_ctrl_c_handler(shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let notified = shutdown.trigger();
                tracing::info!(waiters = notified, "Interrupt received, cancelling pending work");
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    })
}
