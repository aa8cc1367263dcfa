//! Primary-site navigation from stdin.

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use alextras::App;
use alextras_core::AppResult;
use alextras_module::{ChannelNavigationSource, NavigationWatcher};

use crate::output::{self, OutputFormat};

/// Arguments for the watch command
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Print lifecycle events as they are emitted
    #[arg(long)]
    pub events: bool,
}

/// Execute the watch command
pub async fn execute(args: &WatchArgs, app: &App, format: OutputFormat) -> AppResult<()> {
    let watcher = NavigationWatcher::new(app.orchestrator());
    let (locations, source) = ChannelNavigationSource::channel(64);
    let shutdown = CancellationToken::new();
    let printer_stop = CancellationToken::new();

    let printer = args.events.then(|| {
        let mut events = app.bus.subscribe();
        let stop = printer_stop.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    event = events.recv() => match event {
                        Ok(event) => output::print_event(&event, format),
                        Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event printer lagged"),
                        Err(RecvError::Closed) => break,
                    },
                    _ = stop.cancelled() => {
                        while let Ok(event) = events.try_recv() {
                            output::print_event(&event, format);
                        }
                        break;
                    }
                }
            }
        })
    });

    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if locations.send(line.to_string()).await.is_err() {
                break;
            }
        }
    });

    let interrupt = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        })
    };

    watcher.run(source, shutdown).await;
    watcher.drain().await;
    reader.abort();
    interrupt.abort();

    if let Some(printer) = printer {
        printer_stop.cancel();
        let _ = printer.await;
    }

    output::print_overlay(&app.overlay.snapshot(), format);
    Ok(())
}
