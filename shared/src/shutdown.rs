use std::time::Duration;

/// Upper bound on how long in-flight requests may take to drain after a
/// shutdown signal.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolves once Ctrl+C or SIGTERM is received, for use with
/// `axum::serve(..).with_graceful_shutdown(..)`.
///
/// # Panics
///
/// Panics if a signal handler cannot be installed.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        () = ctrl_c => "Ctrl+C",
        () = terminate => "SIGTERM",
    };

    tracing::info!(
        signal,
        timeout_secs = DEFAULT_SHUTDOWN_TIMEOUT.as_secs(),
        "Shutdown signal received, draining in-flight requests"
    );
}
