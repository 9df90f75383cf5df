use std::{sync::Arc, time::Duration};

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use client_core::{
    panel::{START_LABEL, STOP_LABEL},
    settings::load_settings,
    CallPanelView, CallSessionController, CallSessionEvent, EngineKind, StartOutcome,
    StopOutcome,
};
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::warn;
use tracing_subscriber::EnvFilter;

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

/// Start and stop a voice call from the terminal.
#[derive(Parser, Debug)]
#[command(name = "callpad")]
struct Args {
    /// Overrides `engine` from callpad.toml / CALLPAD__ENGINE.
    #[arg(long, value_enum)]
    engine: Option<EngineArg>,
    #[arg(long)]
    session_target: Option<String>,
    /// Start one call, keep it open this long, then stop and exit.
    #[arg(long)]
    hold_seconds: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings()?;
    if let Some(engine) = args.engine {
        settings.engine = engine.into();
    }
    if let Some(target) = args.session_target {
        settings.session_target = target;
    }
    let controller = CallSessionController::from_settings(&settings)?;

    match args.hold_seconds {
        Some(secs) => run_scripted(&controller, Duration::from_secs(secs)).await,
        None => run_interactive(controller).await,
    }
}

async fn run_scripted(controller: &Arc<CallSessionController>, hold: Duration) -> Result<()> {
    render(&CallPanelView::from_snapshot(&controller.snapshot().await));

    match controller.request_start().await? {
        StartOutcome::Started(snapshot) => render(&CallPanelView::from_snapshot(&snapshot)),
        other => bail!("call did not start: {other:?}"),
    }

    tokio::time::sleep(hold).await;
    controller.shutdown().await;
    render(&CallPanelView::from_snapshot(&controller.snapshot().await));
    Ok(())
}

async fn run_interactive(controller: Arc<CallSessionController>) -> Result<()> {
    let mut events = BroadcastStream::new(controller.subscribe_events());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("commands: start, stop, status, quit");
    render(&CallPanelView::from_snapshot(&controller.snapshot().await));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match line.trim() {
                    "start" | "s" => {
                        let controller = Arc::clone(&controller);
                        // Failures arrive as StartFailed events.
                        tokio::spawn(async move {
                            let _ = controller.request_start().await;
                        });
                    }
                    "stop" | "x" => {
                        if controller.request_stop().await == StopOutcome::AlreadyIdle {
                            println!("no call to stop");
                        }
                    }
                    "status" => render(&CallPanelView::from_snapshot(&controller.snapshot().await)),
                    "quit" | "q" => break,
                    "" => {}
                    other => println!("unknown command '{other}' (start, stop, status, quit)"),
                }
            }
            Some(event) = events.next() => match event {
                Ok(CallSessionEvent::StateChanged(snapshot)) => {
                    if snapshot.starting {
                        println!("starting call with {}...", controller.target());
                    }
                    render(&CallPanelView::from_snapshot(&snapshot));
                }
                Ok(CallSessionEvent::StartFailed(err)) => println!("start failed: {err}"),
                Ok(CallSessionEvent::StopFailed(err)) => println!("engine teardown failed: {err}"),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(skipped, "dropped call session events");
                }
            },
        }
    }

    controller.shutdown().await;
    Ok(())
}

fn render(view: &CallPanelView) {
    println!("{}", panel_text(view));
}

fn panel_text(view: &CallPanelView) -> String {
    let mut text = format!(
        "{} {}  {}",
        control(START_LABEL, view.start_enabled),
        control(STOP_LABEL, view.stop_enabled),
        view.readout
    );
    if let Some(err) = &view.error {
        text.push_str(&format!("\n  last start failed: {err}"));
    }
    text
}

fn control(label: &str, enabled: bool) -> String {
    if enabled {
        format!("[ {label} ]")
    } else {
        format!("( {label} )")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::CallSessionSnapshot;

    #[test]
    fn idle_panel_shows_start_enabled() {
        assert_eq!(
            panel_text(&CallPanelView::default()),
            "[ Start Call ] ( Stop Call )  Call ended"
        );
    }

    #[test]
    fn failed_start_is_printed_under_the_controls() {
        let view = CallPanelView::from_snapshot(&CallSessionSnapshot {
            last_error: Some("call engine is unavailable".to_string()),
            ..CallSessionSnapshot::default()
        });
        assert_eq!(
            panel_text(&view),
            "[ Start Call ] ( Stop Call )  Call ended\n  last start failed: call engine is unavailable"
        );
    }
}
