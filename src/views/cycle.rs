use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::types::FetchConfig;
use crate::engine::{FetchCoordinator, FetchError, FetchOutcome};
use crate::store::ProjectStore;
use crate::types::{CycleScope, CycleStatus, FetchKey, IdentityTriple, IssueLayout};

use super::layout::{self, LayoutRenderer};
use super::state::ViewState;
use super::transfer::TransferWorkflow;

// ---------------------------------------------------------------------------
// Screen model
// ---------------------------------------------------------------------------

/// What the cycle view mounts for the current identity and store state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Identity triple incomplete: nothing is rendered.
    Blank,
    Loading(LoadingIndicator),
    Ready(ReadyScreen),
}

/// Loader shown while the view is `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingIndicator {
    /// Filters already known: a placeholder shaped like the active layout.
    Layout(IssueLayout),
    Spinner,
}

impl LoadingIndicator {
    fn for_layout(layout: Option<IssueLayout>) -> Self {
        layout.map_or(Self::Spinner, Self::Layout)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyScreen {
    pub scope: CycleScope,
    pub status: CycleStatus,
    /// "Transfer issues" banner, offered for completed cycles only.
    pub transfer_affordance: bool,
    pub transfer_modal_open: bool,
    pub active_layout: Option<IssueLayout>,
    pub body: Body,
    /// The peek overlay host is mounted whenever the view is not loading.
    pub peek_overlay: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Loaded, zero groups.
    Empty,
    /// `None` when the active layout has no renderer.
    Layout(Option<LayoutRenderer>),
}

impl ReadyScreen {
    pub fn renderer(&self) -> Option<LayoutRenderer> {
        match self.body {
            Body::Layout(renderer) => renderer,
            Body::Empty => None,
        }
    }
}

impl Screen {
    pub fn state(&self) -> Option<ViewState> {
        match self {
            Self::Blank => None,
            Self::Loading(_) => Some(ViewState::Loading),
            Self::Ready(ready) if ready.body == Body::Empty => Some(ViewState::Empty),
            Self::Ready(_) => Some(ViewState::Populated),
        }
    }
}

// ---------------------------------------------------------------------------
// Sync outcome
// ---------------------------------------------------------------------------

/// Result of feeding an identity triple into [`CycleView::sync`].
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// Incomplete triple; no fetch was attempted.
    NotReady,
    /// Key already resolved; no fetch was attempted.
    Unchanged(FetchKey),
    Fetched(FetchOutcome),
    /// Loaded, but navigation moved to another key meanwhile. The result does
    /// not count as resolved for the current identity.
    Superseded(FetchKey),
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Session {
    identity: IdentityTriple,
    current: Option<FetchKey>,
    resolved: Option<FetchKey>,
    transfer: TransferWorkflow,
}

/// Keeps the view of one cycle's issues in step with navigation.
///
/// Holds a shared reference to the store and never mutates its data; it only
/// triggers loads, reads derived state and owns the transfer modal flag.
pub struct CycleView<S> {
    store: Arc<S>,
    coordinator: FetchCoordinator<S>,
    session: Mutex<Session>,
}

impl<S: ProjectStore> CycleView<S> {
    pub fn new(store: Arc<S>, config: &FetchConfig) -> Self {
        Self {
            coordinator: FetchCoordinator::new(Arc::clone(&store), config),
            store,
            session: Mutex::new(Session::default()),
        }
    }

    pub fn identity(&self) -> IdentityTriple {
        self.lock().identity.clone()
    }

    /// Apply a new identity triple and fetch when its key is not resolved yet.
    ///
    /// Fetch failures are returned unchanged; nothing is retried.
    pub async fn sync(&self, identity: IdentityTriple) -> Result<SyncOutcome, FetchError> {
        let scope = {
            let mut session = self.lock();
            let scope = identity.resolve();
            let key = scope.as_ref().map(CycleScope::fetch_key);
            if session.current != key {
                // The modal belongs to the cycle it was opened for.
                session.transfer.close();
            }
            session.identity = identity;

            let (Some(scope), Some(key)) = (scope, key) else {
                session.current = None;
                return Ok(SyncOutcome::NotReady);
            };
            if session.current.as_ref() == Some(&key) && session.resolved.as_ref() == Some(&key) {
                return Ok(SyncOutcome::Unchanged(key));
            }
            session.current = Some(key);
            scope
        };

        self.fetch_current(&scope).await
    }

    /// Mark the current key stale and reload it, keeping the content visible.
    pub async fn revalidate(&self) -> Result<SyncOutcome, FetchError> {
        let Some(scope) = self.lock().identity.resolve() else {
            return Ok(SyncOutcome::NotReady);
        };
        self.coordinator.invalidate(&scope.fetch_key()).await;
        self.fetch_current(&scope).await
    }

    async fn fetch_current(&self, scope: &CycleScope) -> Result<SyncOutcome, FetchError> {
        let outcome = self.coordinator.fetch(scope).await?;

        let mut session = self.lock();
        if session.current.as_ref() != Some(&outcome.record.key) {
            tracing::debug!(
                "cycle view: {} resolved after navigation moved on, ignoring",
                outcome.record.key
            );
            return Ok(SyncOutcome::Superseded(outcome.record.key));
        }
        session.resolved = Some(outcome.record.key.clone());
        Ok(SyncOutcome::Fetched(outcome))
    }

    /// Compose the screen from the current identity and store state.
    pub fn screen(&self) -> Screen {
        let session = self.lock();
        let Some(scope) = session.identity.resolve() else {
            return Screen::Blank;
        };

        let active_layout = self.store.active_layout(&scope);
        let grouped = self.store.grouped_issue_ids(&scope);
        let state = ViewState::classify(self.store.loader(&scope), grouped.as_ref());
        if state.is_loading() {
            return Screen::Loading(LoadingIndicator::for_layout(active_layout));
        }

        let status = CycleStatus::of(self.store.cycle_by_id(&scope.cycle).as_ref());
        let body = if state == ViewState::Empty {
            Body::Empty
        } else {
            Body::Layout(layout::dispatch(active_layout))
        };
        Screen::Ready(ReadyScreen {
            transfer_affordance: TransferWorkflow::affordance_visible(&status),
            transfer_modal_open: session.transfer.is_open(),
            scope,
            status,
            active_layout,
            body,
            peek_overlay: true,
        })
    }

    /// Open the transfer modal. Returns `false` unless the cycle is completed.
    pub fn open_transfer(&self) -> bool {
        let mut session = self.lock();
        let Some(scope) = session.identity.resolve() else {
            return false;
        };
        let status = CycleStatus::of(self.store.cycle_by_id(&scope.cycle).as_ref());
        session.transfer.open(&status)
    }

    pub fn close_transfer(&self) {
        self.lock().transfer.close();
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        // Session is plain data; a poisoned lock still holds a usable value.
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
