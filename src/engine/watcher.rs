use std::sync::Arc;
use std::sync::mpsc::Sender;

use tokio::sync::watch;

use crate::store::ProjectStore;
use crate::types::IdentityTriple;
use crate::views::cycle::{CycleView, SyncOutcome};

use super::coordinator::FetchError;

/// Events the watcher pushes back to whoever renders the view.
#[derive(Debug)]
pub enum Event {
    Synced(SyncOutcome),
    /// A coordinated fetch failed. Nothing is retried.
    FetchError(FetchError),
}

/// Handle held by the navigation layer.
///
/// Dropping it closes the identity channel, which stops the watcher.
pub struct WatcherHandle {
    tx: watch::Sender<IdentityTriple>,
}

impl WatcherHandle {
    /// Publish a new identity triple. Non-blocking.
    pub fn navigate(&self, identity: IdentityTriple) {
        self.tx.send_replace(identity);
    }
}

/// Explicit observer over the identity signal.
///
/// On every change the latest published triple starts a [`CycleView::sync`]
/// on its own task, so a newer key never waits for an older key's in-flight
/// fetch. Triples replaced before the watcher observes them are skipped.
pub struct IdentityWatcher;

impl IdentityWatcher {
    /// Spawn the watcher on the current Tokio runtime, seeded with `initial`.
    pub fn spawn<S: ProjectStore>(
        view: Arc<CycleView<S>>,
        initial: IdentityTriple,
        notify_tx: Sender<Event>,
    ) -> WatcherHandle {
        let (tx, rx) = watch::channel(initial);
        tokio::spawn(Self::run(view, rx, notify_tx));
        WatcherHandle { tx }
    }

    async fn run<S: ProjectStore>(
        view: Arc<CycleView<S>>,
        mut rx: watch::Receiver<IdentityTriple>,
        notify_tx: Sender<Event>,
    ) {
        loop {
            let identity = rx.borrow_and_update().clone();
            let view = Arc::clone(&view);
            let notify_tx = notify_tx.clone();
            tokio::spawn(async move {
                let event = match view.sync(identity).await {
                    Ok(outcome) => Event::Synced(outcome),
                    Err(e) => {
                        tracing::debug!("watcher: sync error: {e}");
                        Event::FetchError(e)
                    }
                };
                // Ignore errors: if the receiver is gone nobody renders anymore.
                let _ = notify_tx.send(event);
            });

            if rx.changed().await.is_err() {
                tracing::debug!("watcher: identity channel closed, stopping");
                break;
            }
        }
    }
}
