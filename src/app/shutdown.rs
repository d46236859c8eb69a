//! Graceful shutdown handling.

use tokio_util::sync::CancellationToken;

/// Cancels `token` when the process receives Ctrl-C.
///
/// Background tasks (server loop, counter sweeper, in-flight dispatches) all
/// watch the same token, so one signal winds everything down.
pub fn spawn_ctrl_c_listener(token: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => log::info!("Received Ctrl-C, shutting down"),
                    Err(e) => {
                        log::warn!("Failed to listen for Ctrl-C: {}", e);
                        return;
                    }
                }
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    });
}
