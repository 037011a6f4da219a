//! Graceful shutdown on SIGINT (Ctrl+C) or SIGTERM

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Owns the root cancellation token for the process.
#[derive(Clone, Default)]
pub struct ShutdownController {
    token: CancellationToken,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller cancelled by the first SIGINT or SIGTERM.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_signals() -> Self {
        let controller = Self::new();
        let token = controller.token.clone();

        tokio::spawn(async move {
            if let Some(signal) = wait_for_signal().await {
                info!(signal, "Shutdown signal received, draining connections");
                token.cancel();
            }
        });

        controller
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn shutdown(&self) {
        info!("Manual shutdown triggered");
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Token cancelled on SIGINT or SIGTERM
pub fn shutdown_signal() -> CancellationToken {
    ShutdownController::on_signals().token()
}

/// Name of the first signal received, `None` if no handler could be installed.
async fn wait_for_signal() -> Option<&'static str> {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some("SIGINT"),
            Err(e) => {
                warn!(error = %e, "Failed to listen for Ctrl+C");
                None
            }
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => tokio::select! {
                received = ctrl_c => received,
                _ = terminate.recv() => Some("SIGTERM"),
            },
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                ctrl_c.await
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_shutdown_cancels_tokens() {
        let controller = ShutdownController::new();
        let token = controller.token();
        let child = token.child_token();

        assert!(!controller.is_cancelled());

        controller.shutdown();

        assert!(controller.is_cancelled());
        assert!(token.is_cancelled());
        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn test_signal_controller_starts_live() {
        let controller = ShutdownController::on_signals();
        assert!(!controller.is_cancelled());
    }
}
