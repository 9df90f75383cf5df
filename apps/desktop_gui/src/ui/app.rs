use std::time::Duration;

use client_core::panel::{START_LABEL, STOP_LABEL};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::reducer::CallUiState;

pub struct CallpadApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    state: CallUiState,
}

impl CallpadApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            state: CallUiState {
                status: "Starting backend...".to_string(),
                ..CallUiState::default()
            },
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.state.apply(event);
        }
    }

    fn show_call_panel(&mut self, ctx: &egui::Context) {
        let view = self.state.view();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.small(&self.state.status);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading("Callpad");
                if let Some(target) = &self.state.target {
                    ui.weak(format!("Assistant {target}"));
                }
                ui.add_space(16.0);

                ui.horizontal(|ui| {
                    let start = ui.add_enabled(
                        view.start_enabled,
                        egui::Button::new(START_LABEL).min_size(egui::vec2(120.0, 32.0)),
                    );
                    if start.clicked() {
                        self.state.start_call(&self.cmd_tx);
                    }

                    let stop = ui.add_enabled(
                        view.stop_enabled,
                        egui::Button::new(STOP_LABEL).min_size(egui::vec2(120.0, 32.0)),
                    );
                    if stop.clicked() {
                        self.state.stop_call(&self.cmd_tx);
                    }
                });

                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    if self.state.snapshot.starting || self.state.start_queued {
                        ui.add(egui::Spinner::new());
                    }
                    ui.label(view.readout);
                });

                if let Some(banner) = &self.state.error_banner {
                    ui.add_space(8.0);
                    ui.colored_label(egui::Color32::from_rgb(220, 80, 80), banner);
                }
            });
        });
    }
}

impl eframe::App for CallpadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.show_call_panel(ctx);
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
