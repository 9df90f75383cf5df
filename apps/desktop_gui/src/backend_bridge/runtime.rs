//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{CallSessionController, CallSessionEvent, CallSettings};
use crossbeam_channel::{Receiver, Sender};
use tokio::sync::broadcast::error::RecvError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    settings: anyhow::Result<CallSettings>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let controller =
                match settings.and_then(|settings| CallSessionController::from_settings(&settings)) {
                    Ok(controller) => controller,
                    Err(err) => {
                        let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                            UiErrorContext::BackendStartup,
                            format!("{err:#}"),
                        )));
                        tracing::error!("unable to set up call session: {err:#}");
                        return;
                    }
                };

            let forward_task = spawn_event_forwarder(&controller, ui_tx.clone());
            let _ = ui_tx.try_send(UiEvent::SessionChanged(controller.snapshot().await));
            let _ = ui_tx.try_send(UiEvent::BackendReady {
                target: controller.target().to_string(),
            });

            // Ends when the UI drops its sender.
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::StartCall => {
                        let controller = Arc::clone(&controller);
                        tokio::spawn(async move {
                            // Failures are forwarded as StartFailed events.
                            let _ = controller.request_start().await;
                        });
                    }
                    BackendCommand::StopCall => {
                        controller.request_stop().await;
                    }
                }
            }

            // Waits for engine teardown before the runtime is dropped.
            controller.shutdown().await;
            forward_task.abort();
        });
    });
}

fn spawn_event_forwarder(
    controller: &Arc<CallSessionController>,
    ui_tx: Sender<UiEvent>,
) -> tokio::task::JoinHandle<()> {
    let mut events = controller.subscribe_events();
    tokio::spawn(async move {
        loop {
            let evt = match events.recv().await {
                Ok(CallSessionEvent::StateChanged(snapshot)) => UiEvent::SessionChanged(snapshot),
                Ok(CallSessionEvent::StartFailed(err)) => UiEvent::StartFailed(err),
                Ok(CallSessionEvent::StopFailed(err)) => UiEvent::StopFailed(err),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "ui event forwarder lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            if ui_tx.try_send(evt).is_err() {
                tracing::warn!("ui event queue unavailable; dropping call session event");
            }
        }
    })
}
