use std::{sync::Arc, time::Duration};

use call_engine::{CallEngine, CallEngineEvent};
use chrono::{DateTime, Utc};
use shared::domain::{CallStatus, SessionTargetId};
use thiserror::Error;
use tokio::{
    sync::{broadcast, broadcast::error::RecvError, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

pub mod panel;
pub mod settings;

pub use panel::CallPanelView;
pub use settings::{CallSettings, EngineKind};

const SESSION_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallSessionError {
    #[error("call engine failed to start session: {0}")]
    EngineStart(String),
    #[error("call engine did not acknowledge start within {0:?}")]
    StartTimedOut(Duration),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSessionSnapshot {
    pub status: CallStatus,
    /// A `begin` is in flight; `status` stays `Idle` until it resolves.
    pub starting: bool,
    pub call_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallSessionEvent {
    StateChanged(CallSessionSnapshot),
    StartFailed(String),
    StopFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started(CallSessionSnapshot),
    AlreadyActive,
    AlreadyStarting,
    /// A stop cancelled this attempt before the engine answered.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    CancelledPendingStart,
    AlreadyIdle,
}

struct PendingStart {
    attempt: u64,
    requested_at: DateTime<Utc>,
}

struct ActiveCall {
    call_id: String,
    started_at: DateTime<Utc>,
    engine_watch: JoinHandle<()>,
}

#[derive(Default)]
struct SessionState {
    status: CallStatus,
    pending: Option<PendingStart>,
    active: Option<ActiveCall>,
    last_attempt: u64,
    last_error: Option<String>,
    teardowns: Vec<JoinHandle<()>>,
}

impl SessionState {
    fn snapshot(&self) -> CallSessionSnapshot {
        CallSessionSnapshot {
            status: self.status,
            starting: self.pending.is_some(),
            call_id: self.active.as_ref().map(|active| active.call_id.clone()),
            started_at: self.active.as_ref().map(|active| active.started_at),
            last_error: self.last_error.clone(),
        }
    }
}

/// Owns the Idle/Active lifecycle of the single call this app can hold and
/// turns start/stop intents into calls on the injected engine.
pub struct CallSessionController {
    engine: Arc<dyn CallEngine>,
    target: SessionTargetId,
    start_timeout: Option<Duration>,
    inner: Mutex<SessionState>,
    events: broadcast::Sender<CallSessionEvent>,
}

impl CallSessionController {
    pub fn new(engine: Arc<dyn CallEngine>, target: SessionTargetId) -> Arc<Self> {
        Self::with_start_timeout(engine, target, None)
    }

    pub fn with_start_timeout(
        engine: Arc<dyn CallEngine>,
        target: SessionTargetId,
        start_timeout: Option<Duration>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        Arc::new(Self {
            engine,
            target,
            start_timeout,
            inner: Mutex::new(SessionState::default()),
            events,
        })
    }

    pub fn from_settings(settings: &CallSettings) -> anyhow::Result<Arc<Self>> {
        let engine = settings.build_engine()?;
        Ok(Self::with_start_timeout(
            engine,
            settings.session_target(),
            settings.start_timeout(),
        ))
    }

    pub fn target(&self) -> &SessionTargetId {
        &self.target
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CallSessionEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> CallSessionSnapshot {
        self.inner.lock().await.snapshot()
    }

    pub async fn status(&self) -> CallStatus {
        self.inner.lock().await.status
    }

    pub async fn request_start(self: &Arc<Self>) -> Result<StartOutcome, CallSessionError> {
        let attempt = {
            let mut state = self.inner.lock().await;
            if state.status.is_active() {
                debug!("call session: start ignored, call already active");
                return Ok(StartOutcome::AlreadyActive);
            }
            if state.pending.is_some() {
                debug!("call session: start ignored, start already pending");
                return Ok(StartOutcome::AlreadyStarting);
            }
            state.last_attempt += 1;
            let attempt = state.last_attempt;
            state.pending = Some(PendingStart {
                attempt,
                requested_at: Utc::now(),
            });
            state.last_error = None;
            self.publish(&state);
            attempt
        };
        info!(attempt, target = %self.target, "call session: start requested");

        let engine_events = self.engine.subscribe_events();
        let result = self.begin_with_timeout().await;

        let mut state = self.inner.lock().await;
        let pending = match state.pending.take() {
            Some(pending) if pending.attempt == attempt => pending,
            other => {
                state.pending = other;
                match result {
                    Ok(call) => {
                        warn!(
                            attempt,
                            call_id = %call.call_id,
                            "call session: start acknowledged after stop, releasing late session"
                        );
                        self.spawn_engine_end(&mut state, call.call_id);
                    }
                    Err(err) => {
                        debug!(attempt, %err, "call session: cancelled start resolved with failure");
                    }
                }
                return Ok(StartOutcome::Superseded);
            }
        };

        match result {
            Ok(call) => {
                let engine_watch = self.spawn_engine_watch(call.call_id.clone(), engine_events);
                let started_at = Utc::now();
                state.status = CallStatus::Active;
                state.active = Some(ActiveCall {
                    call_id: call.call_id.clone(),
                    started_at,
                    engine_watch,
                });
                let snapshot = self.publish(&state);
                info!(
                    attempt,
                    call_id = %call.call_id,
                    ack_ms = (started_at - pending.requested_at).num_milliseconds(),
                    "call session: active"
                );
                Ok(StartOutcome::Started(snapshot))
            }
            Err(err) => {
                state.last_error = Some(err.to_string());
                self.publish(&state);
                drop(state);
                warn!(attempt, %err, "call session: start failed");
                let _ = self.events.send(CallSessionEvent::StartFailed(err.to_string()));
                Err(err)
            }
        }
    }

    pub async fn request_stop(&self) -> StopOutcome {
        let mut state = self.inner.lock().await;
        if let Some(pending) = state.pending.take() {
            self.publish(&state);
            info!(attempt = pending.attempt, "call session: pending start cancelled");
            return StopOutcome::CancelledPendingStart;
        }

        let Some(active) = state.active.take() else {
            debug!("call session: stop ignored, no active call");
            return StopOutcome::AlreadyIdle;
        };
        active.engine_watch.abort();
        state.status = CallStatus::Idle;
        self.publish(&state);

        info!(
            call_id = %active.call_id,
            duration_secs = (Utc::now() - active.started_at).num_seconds(),
            "call session: stopped"
        );
        self.spawn_engine_end(&mut state, active.call_id);
        StopOutcome::Stopped
    }

    /// Stops any call, then waits for every engine teardown issued so far.
    ///
    /// Call before dropping the runtime. A start still waiting on the engine is
    /// cancelled but not awaited.
    pub async fn shutdown(&self) {
        self.request_stop().await;
        let teardowns = std::mem::take(&mut self.inner.lock().await.teardowns);
        for teardown in teardowns {
            if let Err(err) = teardown.await {
                warn!(%err, "call session: engine teardown task failed");
            }
        }
    }

    async fn begin_with_timeout(&self) -> Result<call_engine::EngineCall, CallSessionError> {
        let begin = self.engine.begin(&self.target);
        let result = match self.start_timeout {
            Some(limit) => match tokio::time::timeout(limit, begin).await {
                Ok(result) => result,
                Err(_) => return Err(CallSessionError::StartTimedOut(limit)),
            },
            None => begin.await,
        };
        result.map_err(|err| CallSessionError::EngineStart(format!("{err:#}")))
    }

    fn publish(&self, state: &SessionState) -> CallSessionSnapshot {
        let snapshot = state.snapshot();
        let _ = self
            .events
            .send(CallSessionEvent::StateChanged(snapshot.clone()));
        snapshot
    }

    /// Ends `call_id` on the engine without blocking the caller. Scoped to the
    /// id so a slow teardown never reaches a call started after it.
    fn spawn_engine_end(&self, state: &mut SessionState, call_id: String) {
        let engine = Arc::clone(&self.engine);
        let events = self.events.clone();
        state.teardowns.retain(|teardown| !teardown.is_finished());
        state.teardowns.push(tokio::spawn(async move {
            if let Err(err) = engine.end(&call_id).await {
                warn!(
                    call_id = %call_id,
                    error = %format!("{err:#}"),
                    "call session: engine failed to end session"
                );
                let _ = events.send(CallSessionEvent::StopFailed(err.to_string()));
            }
        }));
    }

    fn spawn_engine_watch(
        self: &Arc<Self>,
        call_id: String,
        mut engine_events: broadcast::Receiver<CallEngineEvent>,
    ) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match engine_events.recv().await {
                    Ok(CallEngineEvent::SessionEnded { call_id: ended }) if ended == call_id => {
                        controller.handle_engine_end(&call_id).await;
                        break;
                    }
                    Ok(CallEngineEvent::Error(message)) => {
                        warn!(call_id = %call_id, %message, "call engine reported an error");
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "call session: engine events lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    async fn handle_engine_end(&self, call_id: &str) {
        let mut state = self.inner.lock().await;
        if state
            .active
            .as_ref()
            .map_or(true, |active| active.call_id != call_id)
        {
            return;
        }
        // Dropping the handle detaches this very task.
        state.active = None;
        state.status = CallStatus::Idle;
        self.publish(&state);
        info!(call_id, "call session: engine ended the call");
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
