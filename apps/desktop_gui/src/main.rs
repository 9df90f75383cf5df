mod backend_bridge;
mod controller;
mod ui;

use clap::{Parser, ValueEnum};
use client_core::settings::{load_settings, EngineKind};
use crossbeam_channel::bounded;
use eframe::egui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::CallpadApp;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EngineArg {
    Http,
    Simulated,
}

impl From<EngineArg> for EngineKind {
    fn from(value: EngineArg) -> Self {
        match value {
            EngineArg::Http => EngineKind::Http,
            EngineArg::Simulated => EngineKind::Simulated,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "callpad-gui", about = "Two-button voice call panel")]
struct Args {
    /// Overrides the `engine` setting from callpad.toml / CALLPAD__ENGINE.
    #[arg(long, value_enum)]
    engine: Option<EngineArg>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let settings = load_settings().map(|mut settings| {
        if let Some(engine) = args.engine {
            settings.engine = engine.into();
        }
        settings
    });

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Callpad")
            .with_inner_size([380.0, 240.0])
            .with_min_inner_size([320.0, 200.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Callpad",
        options,
        Box::new(|_cc| Ok(Box::new(CallpadApp::new(cmd_tx, ui_rx)))),
    )
}
