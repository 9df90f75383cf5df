use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use shared::domain::SessionTargetId;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{CallEngine, CallEngineEvent, EngineCall, ENGINE_EVENT_CAPACITY};

/// Offline engine for demos: acknowledges after `latency`, or fails with the
/// configured reason.
pub struct SimulatedCallEngine {
    latency: Duration,
    fail_start: Option<String>,
    open_calls: Mutex<Vec<String>>,
    events: broadcast::Sender<CallEngineEvent>,
}

impl SimulatedCallEngine {
    pub fn new(latency: Duration) -> Self {
        let (events, _) = broadcast::channel(ENGINE_EVENT_CAPACITY);
        Self {
            latency,
            fail_start: None,
            open_calls: Mutex::new(Vec::new()),
            events,
        }
    }

    pub fn failing(latency: Duration, reason: impl Into<String>) -> Self {
        Self {
            fail_start: Some(reason.into()),
            ..Self::new(latency)
        }
    }

    /// Ends the most recent call as if the remote side hung up.
    pub async fn hang_up(&self) -> bool {
        let Some(call_id) = self.open_calls.lock().await.pop() else {
            return false;
        };
        info!(call_id = %call_id, "simulated engine: remote hang-up");
        let _ = self.events.send(CallEngineEvent::SessionEnded { call_id });
        true
    }
}

#[async_trait]
impl CallEngine for SimulatedCallEngine {
    async fn begin(&self, target: &SessionTargetId) -> anyhow::Result<EngineCall> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(reason) = &self.fail_start {
            let _ = self.events.send(CallEngineEvent::Error(reason.clone()));
            return Err(anyhow!("{reason}"));
        }

        let call_id = Uuid::new_v4().to_string();
        debug!(call_id = %call_id, target = %target, "simulated engine: session started");
        self.open_calls.lock().await.push(call_id.clone());
        let _ = self.events.send(CallEngineEvent::SessionStarted {
            call_id: call_id.clone(),
        });
        Ok(EngineCall {
            call_id,
            join_url: None,
        })
    }

    async fn end(&self, call_id: &str) -> anyhow::Result<()> {
        let mut open_calls = self.open_calls.lock().await;
        if let Some(index) = open_calls.iter().position(|open| open == call_id) {
            open_calls.remove(index);
            debug!(call_id, "simulated engine: session ended");
            let _ = self.events.send(CallEngineEvent::SessionEnded {
                call_id: call_id.to_string(),
            });
        }
        Ok(())
    }

    fn subscribe_events(&self) -> broadcast::Receiver<CallEngineEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/simulated_tests.rs"]
mod tests;
