//! Navigation watcher for the client-routed primary site.
//!
//! The source reports the location after every document mutation batch.
//! Almost all of those reports are unchanged, so the comparison is a cheap
//! synchronous string check; only real changes mint a generation and hand
//! off to the orchestrator without waiting for it.

use std::sync::{Arc, Mutex, PoisonError};

use futures::StreamExt;
use futures::stream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use alextras_core::traits::navigation::{NavigationSource, NavigationStream};
use alextras_core::types::PageUrl;

use crate::generation::GenerationToken;
use crate::orchestrator::LifecycleOrchestrator;

/// A detected route change.
#[derive(Debug, Clone)]
pub struct NavigationChange {
    /// The new page.
    pub current_page: PageUrl,
    /// The page before the change, if any.
    pub previous_page: Option<PageUrl>,
    /// Generation minted for the change.
    pub token: GenerationToken,
}

#[derive(Debug)]
struct LastSeen {
    /// Location with its fragment stripped, for the fast comparison.
    raw: String,
    page: PageUrl,
}

/// Detects route changes and starts lifecycle cycles.
#[derive(Debug)]
pub struct NavigationWatcher {
    orchestrator: Arc<LifecycleOrchestrator>,
    last_seen: Mutex<Option<LastSeen>>,
    tracker: TaskTracker,
}

fn strip_fragment(href: &str) -> &str {
    let href = href.trim();
    href.split_once('#').map_or(href, |(before, _)| before)
}

impl NavigationWatcher {
    /// Create a watcher driving `orchestrator`.
    pub fn new(orchestrator: Arc<LifecycleOrchestrator>) -> Self {
        Self {
            orchestrator,
            last_seen: Mutex::new(None),
            tracker: TaskTracker::new(),
        }
    }

    /// The last seen page.
    pub fn current_page(&self) -> Option<PageUrl> {
        self.last_seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|seen| seen.page.clone())
    }

    /// Compare an observed location with the last seen one.
    ///
    /// Returns the change, with a freshly minted generation, if the
    /// normalized location differs.
    pub fn observe(&self, href: &str) -> Option<NavigationChange> {
        let raw = strip_fragment(href);
        let mut last_seen = self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);
        if last_seen.as_ref().is_some_and(|seen| seen.raw == raw) {
            return None;
        }

        let page = match PageUrl::parse(raw) {
            Ok(page) => page,
            Err(e) => {
                warn!(href = %raw, error = %e, "Ignoring unparseable location");
                return None;
            }
        };
        if last_seen.as_ref().is_some_and(|seen| seen.page == page) {
            return None;
        }

        let token = self.orchestrator.clock().advance();
        let previous = last_seen.replace(LastSeen {
            raw: raw.to_string(),
            page: page.clone(),
        });
        Some(NavigationChange {
            current_page: page,
            previous_page: previous.map(|seen| seen.page),
            token,
        })
    }

    /// Start the cycle of a change in the background.
    pub fn dispatch(&self, change: NavigationChange) {
        let orchestrator = self.orchestrator.clone();
        self.tracker.spawn(async move {
            let report = orchestrator
                .run_cycle(change.current_page, change.previous_page, change.token)
                .await;
            debug!(
                generation = report.generation,
                loaded = report.loaded().len(),
                "Cycle finished"
            );
        });
    }

    /// Handle one location observation. Returns whether a cycle was started.
    pub fn on_location(&self, href: &str) -> bool {
        match self.observe(href) {
            Some(change) => {
                self.dispatch(change);
                true
            }
            None => false,
        }
    }

    /// Consume observations from `source` until it ends or `shutdown` fires.
    pub async fn run<S: NavigationSource>(&self, mut source: S, shutdown: CancellationToken) {
        let mut locations = source.subscribe();
        info!("Navigation watcher started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                next = locations.next() => match next {
                    Some(href) => {
                        self.on_location(&href);
                    }
                    None => break,
                },
            }
        }
        info!("Navigation watcher stopped");
    }

    /// Wait for every dispatched cycle to finish.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}

/// Navigation source fed through a channel; used by the command line and tests.
#[derive(Debug)]
pub struct ChannelNavigationSource {
    rx: Option<mpsc::Receiver<String>>,
}

impl ChannelNavigationSource {
    /// Create a source and the sender that feeds it.
    pub fn channel(buffer: usize) -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self { rx: Some(rx) })
    }
}

impl NavigationSource for ChannelNavigationSource {
    fn subscribe(&mut self) -> NavigationStream {
        match self.rx.take() {
            Some(rx) => stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|href| (href, rx))
            })
            .boxed(),
            None => stream::empty().boxed(),
        }
    }
}
