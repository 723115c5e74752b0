use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::core::agent::{HunterAgent, MASTER_AGENT_NAME};
use crate::core::broadcast::DashboardBroadcaster;
use crate::core::config::HunterConfig;
use crate::core::hunt::{HuntCoordinator, default_sources};
use crate::core::lifecycle::LifecycleManager;
use crate::core::llm::CompletionBackend;
use crate::core::llm::novita::NovitaClient;
use crate::core::store::AgentStore;
use crate::interfaces::web::ApiServer;
use crate::logging::LogTap;

pub async fn run(host_override: Option<String>, port_override: Option<u16>) -> Result<()> {
    let (log_tx, _) = tokio::sync::broadcast::channel::<String>(500);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(LogTap {
            sender: log_tx.clone(),
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let data_dir = HunterConfig::resolve_data_dir();
    let mut config = HunterConfig::load(&data_dir)?;
    if let Some(host) = host_override {
        config.api_host = host;
    }
    if let Some(port) = port_override {
        config.api_port = port;
    }
    if config.api_key.is_empty() {
        warn!("No API key configured (SCHOLARHUNT_API_KEY); completion calls will fail");
    }

    info!("Starting scholarhunt daemon (data dir: {})", data_dir.display());

    let store = Arc::new(AgentStore::open(data_dir.join("hunter.db")).await?);
    let broadcaster = DashboardBroadcaster::new();
    let config = Arc::new(config);

    let backend: Arc<dyn CompletionBackend> = Arc::new(NovitaClient::new(&config)?);
    let agent = Arc::new(
        HunterAgent::initialize(
            store.clone(),
            backend,
            broadcaster.clone(),
            config.clone(),
            MASTER_AGENT_NAME,
            "master",
        )
        .await?,
    );

    let sources = if config.hunt_sources.is_empty() {
        default_sources()
    } else {
        config.hunt_sources.clone()
    };
    let hunts = Arc::new(HuntCoordinator::new(
        store.clone(),
        agent.clone(),
        broadcaster.clone(),
        sources,
        config.hunt_pace_ms,
    ));

    let api_server = ApiServer::new(
        store,
        agent,
        hunts,
        broadcaster,
        log_tx,
        config.api_host.clone(),
        config.api_port,
    );

    let mut lifecycle = LifecycleManager::new();
    lifecycle.attach(Arc::new(Mutex::new(api_server)));
    lifecycle.start().await?;

    tokio::signal::ctrl_c().await?;
    lifecycle.shutdown().await?;
    Ok(())
}
