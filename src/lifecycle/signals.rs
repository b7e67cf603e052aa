//! OS signal handling.
//!
//! # Responsibilities
//! - Register the interrupt handler (Ctrl+C / SIGINT)
//! - Translate the signal into the internal shutdown event
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)

use crate::lifecycle::Shutdown;

/// Wait for Ctrl+C and trigger the shutdown coordinator.
///
/// If the handler cannot be installed the process would otherwise be
/// unstoppable; shutdown is triggered immediately in that case.
pub async fn wait_for_signal(shutdown: Shutdown) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install Ctrl+C handler");
    } else {
        tracing::info!("shutdown signal received");
    }
    shutdown.trigger();
}
