use std::time::Duration;

use tokio::signal;
use tracing::{info, warn};

use crate::analytics::AnalyticsPublisher;

/// 等待 Ctrl+C 或 SIGTERM
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown signal received");
}

/// 关闭发布器：不再接收新事件，已入队的事件在 grace 内尽量发完
pub async fn drain_publisher(publisher: &AnalyticsPublisher, grace: Duration) {
    info!(
        "Draining analytics publisher (grace {}s)...",
        grace.as_secs()
    );
    publisher.shutdown(grace).await;
}
