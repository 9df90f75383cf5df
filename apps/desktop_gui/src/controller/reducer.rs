//! UI-side call state: folds backend events and gates the two controls.

use client_core::{CallPanelView, CallSessionSnapshot};
use crossbeam_channel::Sender;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

#[derive(Debug, Default)]
pub struct CallUiState {
    pub snapshot: CallSessionSnapshot,
    /// Start was queued but the worker has not echoed a snapshot yet.
    pub start_queued: bool,
    pub backend_ready: bool,
    pub target: Option<String>,
    pub status: String,
    pub error_banner: Option<String>,
}

impl CallUiState {
    pub fn view(&self) -> CallPanelView {
        let mut view = CallPanelView::from_snapshot(&self.snapshot);
        if !self.backend_ready {
            view.start_enabled = false;
            view.stop_enabled = false;
        }
        if self.start_queued {
            view.start_enabled = false;
        }
        view
    }

    pub fn start_call(&mut self, cmd_tx: &Sender<BackendCommand>) {
        if !self.view().start_enabled {
            return;
        }
        if dispatch_backend_command(cmd_tx, BackendCommand::StartCall, &mut self.status) {
            self.start_queued = true;
            self.error_banner = None;
        }
    }

    pub fn stop_call(&mut self, cmd_tx: &Sender<BackendCommand>) {
        if !self.view().stop_enabled {
            return;
        }
        dispatch_backend_command(cmd_tx, BackendCommand::StopCall, &mut self.status);
    }

    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::BackendReady { target } => {
                self.backend_ready = true;
                self.status = format!("Ready (session target {target})");
                self.target = Some(target);
            }
            UiEvent::Info(message) => {
                self.status = message;
            }
            UiEvent::Error(err) => {
                self.backend_ready = false;
                self.start_queued = false;
                self.status = err.message().to_string();
                self.error_banner = Some(err.user_message());
            }
            UiEvent::SessionChanged(snapshot) => {
                self.start_queued = false;
                if snapshot.status.is_active() {
                    self.error_banner = None;
                }
                self.snapshot = snapshot;
            }
            UiEvent::StartFailed(message) => {
                self.start_queued = false;
                let err = UiError::from_message(UiErrorContext::StartCall, message);
                tracing::warn!(category = ?err.category(), context = ?err.context(), "call start failed: {}", err.message());
                self.error_banner = Some(err.user_message());
            }
            UiEvent::StopFailed(message) => {
                // The session is already idle locally; nothing to show.
                tracing::warn!("call engine teardown failed: {message}");
            }
        }
    }
}
