use crate::{create_router, AppState};
use osintviz_core::{OsintVizConfig, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

pub struct Server {
    state: AppState,
    listener: TcpListener,
}

impl Server {
    pub async fn new(config: &OsintVizConfig) -> Result<Self> {
        let state = AppState::new(config);
        let listener =
            TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
        Ok(Self { state, listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn run(self) -> Result<()> {
        let addr = self.local_addr()?;
        let tracker = self.state.tracker.clone();
        let router = create_router(self.state);

        info!("Starting OSINT visualizer API server on http://{}", addr);
        info!("API endpoints:");
        info!("  GET    /health - Service health");
        info!("  POST   /search - Submit a search");
        info!("  GET    /search?status=<filter> - Search history");
        info!("  GET    /search/stats - Aggregate counts");
        info!("  GET    /search/{{id}} - Search status and results");
        info!("  DELETE /search/{{id}} - Cancel and delete a search");

        let served = axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        tracker.shutdown();
        served?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
