use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, PartialEq)]
pub enum LifecycleState {
    Init,
    Ready,
    Shutdown,
}

#[async_trait::async_trait]
pub trait LifecycleComponent {
    async fn on_init(&mut self) -> Result<()> {
        Ok(())
    }
    async fn on_start(&mut self) -> Result<()> {
        Ok(())
    }
    async fn on_shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Drives attached components through Init -> Ready -> Shutdown.
pub struct LifecycleManager {
    state: LifecycleState,
    components: Vec<Arc<Mutex<dyn LifecycleComponent + Send + Sync>>>,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Init,
            components: Vec::new(),
        }
    }

    pub fn attach(&mut self, component: Arc<Mutex<dyn LifecycleComponent + Send + Sync>>) {
        self.components.push(component);
    }

    pub async fn start(&mut self) -> Result<()> {
        info!("Lifecycle Phase: Init");
        self.state = LifecycleState::Init;
        for comp in &self.components {
            comp.lock().await.on_init().await?;
        }

        for comp in &self.components {
            comp.lock().await.on_start().await?;
        }

        info!("Lifecycle Phase: Ready");
        self.state = LifecycleState::Ready;
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        info!("Lifecycle Phase: Shutdown");
        self.state = LifecycleState::Shutdown;

        for comp in &self.components {
            if let Err(e) = comp.lock().await.on_shutdown().await {
                warn!("Component shutdown error: {}", e);
            }
        }
        Ok(())
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        inits: u32,
        starts: u32,
        shutdowns: u32,
    }

    #[async_trait::async_trait]
    impl LifecycleComponent for Probe {
        async fn on_init(&mut self) -> Result<()> {
            self.inits += 1;
            Ok(())
        }
        async fn on_start(&mut self) -> Result<()> {
            self.starts += 1;
            Ok(())
        }
        async fn on_shutdown(&mut self) -> Result<()> {
            self.shutdowns += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn start_runs_init_then_start_once_each() {
        let probe = Arc::new(Mutex::new(Probe {
            inits: 0,
            starts: 0,
            shutdowns: 0,
        }));
        let mut lifecycle = LifecycleManager::new();
        lifecycle.attach(probe.clone());

        lifecycle.start().await.unwrap();
        assert_eq!(*lifecycle.state(), LifecycleState::Ready);

        lifecycle.shutdown().await.unwrap();
        assert_eq!(*lifecycle.state(), LifecycleState::Shutdown);

        let p = probe.lock().await;
        assert_eq!((p.inits, p.starts, p.shutdowns), (1, 1, 1));
    }
}
