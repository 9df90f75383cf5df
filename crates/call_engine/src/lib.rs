//! Seam between the call session controller and whatever actually carries the call.

use anyhow::anyhow;
use async_trait::async_trait;
use shared::domain::SessionTargetId;
use tokio::sync::broadcast;

mod http;
mod simulated;

pub use http::{HttpCallEngine, DEFAULT_API_BASE};
pub use simulated::SimulatedCallEngine;

pub(crate) const ENGINE_EVENT_CAPACITY: usize = 64;

/// Acknowledgment returned by a successful `begin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCall {
    pub call_id: String,
    pub join_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEngineEvent {
    SessionStarted { call_id: String },
    SessionEnded { call_id: String },
    Error(String),
}

#[async_trait]
pub trait CallEngine: Send + Sync {
    async fn begin(&self, target: &SessionTargetId) -> anyhow::Result<EngineCall>;
    /// Tears down `call_id`. Ids the engine no longer tracks are a no-op.
    async fn end(&self, call_id: &str) -> anyhow::Result<()>;
    fn subscribe_events(&self) -> broadcast::Receiver<CallEngineEvent>;
}

pub struct MissingCallEngine {
    events: broadcast::Sender<CallEngineEvent>,
}

impl MissingCallEngine {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(1);
        Self { events }
    }
}

impl Default for MissingCallEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CallEngine for MissingCallEngine {
    async fn begin(&self, _target: &SessionTargetId) -> anyhow::Result<EngineCall> {
        Err(anyhow!("call engine is unavailable"))
    }

    async fn end(&self, _call_id: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn subscribe_events(&self) -> broadcast::Receiver<CallEngineEvent> {
        self.events.subscribe()
    }
}
