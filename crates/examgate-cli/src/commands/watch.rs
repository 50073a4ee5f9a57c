use std::io::{BufRead, Write};
use std::time::Duration;

use chrono::Local;
use clap::Args;
use examgate_core::error::Result;
use examgate_core::timer::DEFAULT_TICK;
use examgate_core::{CoreError, Event, SettingsUpdate, StatusLoop, SystemClock};
use tokio::sync::mpsc;

use super::SourceArgs;
use crate::render::TerminalRenderer;

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Tick period in milliseconds
    #[arg(long, default_value_t = DEFAULT_TICK.as_millis() as u64)]
    period_ms: u64,
    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    stop_after: Option<u64>,
    /// Write each loop event as a JSON line to stderr
    #[arg(long)]
    events: bool,
}

/// Each line on stdin is merged onto the running settings as a query string.
fn spawn_stdin_updates(tx: mpsc::Sender<SettingsUpdate>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if tx.blocking_send(SettingsUpdate::Query(line.to_string())).is_err() {
                break;
            }
        }
    });
}

fn event_line(event: &Event) -> Result<String> {
    serde_json::to_string(event).map_err(CoreError::from)
}

async fn print_events(mut rx: mpsc::UnboundedReceiver<Event>) {
    while let Some(event) = rx.recv().await {
        match event_line(&event) {
            Ok(line) => {
                let mut stderr = std::io::stderr().lock();
                let _ = writeln!(stderr, "{line}");
            }
            Err(err) => tracing::warn!(%err, "cannot encode event"),
        }
    }
}

pub fn run(args: WatchArgs) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let settings = args.source.load(&Local::now())?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let (tx, rx) = mpsc::channel(8);
    spawn_stdin_updates(tx);

    let stop_after = args.stop_after.map(Duration::from_secs);
    runtime.block_on(async move {
        let mut status = StatusLoop::new(settings, SystemClock, TerminalRenderer);
        let printer = if args.events {
            let (event_tx, event_rx) = mpsc::unbounded_channel();
            status = status.with_events(event_tx);
            Some(tokio::spawn(print_events(event_rx)))
        } else {
            None
        };

        let shutdown = async move {
            match stop_after {
                Some(after) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = tokio::time::sleep(after) => {}
                    }
                }
                None => {
                    if let Err(err) = tokio::signal::ctrl_c().await {
                        tracing::warn!(%err, "cannot listen for Ctrl-C");
                        std::future::pending::<()>().await;
                    }
                }
            }
        };
        status
            .run(Duration::from_millis(args.period_ms), &Local, rx, shutdown)
            .await;

        // Dropping the loop closes the event channel so the printer drains and exits.
        drop(status);
        if let Some(printer) = printer {
            let _ = printer.await;
        }
    });
    Ok(())
}
