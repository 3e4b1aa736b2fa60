//! Graceful shutdown signal handling.

/// Resolve when the process receives ctrl-c.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => {
            tracing::error!("failed to install ctrl-c handler: {e}");
            // Without a signal handler there is nothing to wait for.
            std::future::pending::<()>().await;
        }
    }
}
