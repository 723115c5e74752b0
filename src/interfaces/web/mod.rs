mod handlers;
mod router;
mod ws;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};
use tracing::info;

use crate::core::agent::HunterAgent;
use crate::core::broadcast::DashboardBroadcaster;
use crate::core::hunt::HuntCoordinator;
use crate::core::lifecycle::LifecycleComponent;
use crate::core::store::AgentStore;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: Arc<AgentStore>,
    pub(crate) agent: Arc<HunterAgent>,
    pub(crate) hunts: Arc<HuntCoordinator>,
    pub(crate) broadcaster: DashboardBroadcaster,
    pub(crate) log_tx: tokio::sync::broadcast::Sender<String>,
}

/// REST + WebSocket dashboard server, run as a lifecycle component.
pub struct ApiServer {
    state: AppState,
    api_host: String,
    api_port: u16,
}

impl ApiServer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<AgentStore>,
        agent: Arc<HunterAgent>,
        hunts: Arc<HuntCoordinator>,
        broadcaster: DashboardBroadcaster,
        log_tx: tokio::sync::broadcast::Sender<String>,
        api_host: String,
        api_port: u16,
    ) -> Self {
        Self {
            state: AppState {
                store,
                agent,
                hunts,
                broadcaster,
                log_tx,
            },
            api_host,
            api_port,
        }
    }
}

// --- SSE Logs (used by router) ---

async fn sse_logs_endpoint(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.log_tx.subscribe();
    let stream = BroadcastStream::new(receiver).map(|msg| match msg {
        Ok(line) => Ok(Event::default().data(line)),
        Err(_) => Ok(Event::default().data("Log stream lagged")),
    });

    Sse::new(stream)
}

#[async_trait]
impl LifecycleComponent for ApiServer {
    async fn on_init(&mut self) -> Result<()> {
        info!("API Server initializing...");
        Ok(())
    }

    async fn on_start(&mut self) -> Result<()> {
        let state = self.state.clone();
        let addr = format!("{}:{}", self.api_host, self.api_port);
        let api_port = self.api_port;

        tokio::spawn(async move {
            let app = router::build_api_router(state, api_port);
            match tokio::net::TcpListener::bind(&addr).await {
                Ok(listener) => {
                    info!("API Server running at http://{addr}");
                    if let Err(e) = axum::serve(listener, app).await {
                        tracing::error!("API Server crashed: {}", e);
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to bind API server to {}: {}", addr, e);
                }
            }
        });
        Ok(())
    }

    async fn on_shutdown(&mut self) -> Result<()> {
        info!("API Server shutting down...");
        Ok(())
    }
}
