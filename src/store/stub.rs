use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::Deserialize;

use crate::types::{Cycle, CycleScope, GroupedIssueIds, IssueLayout, LoaderMode, LoaderPhase};

use super::{CycleStore, FilterStore, IssueStore, StoreError};

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// Pre-loaded data served by [`StubStore`], keyed by cycle id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreFixture {
    pub cycles: Vec<Cycle>,
    pub filters: HashMap<String, FixtureFilters>,
    pub issues: HashMap<String, GroupedIssueIds>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FixtureFilters {
    pub layout: Option<IssueLayout>,
}

/// A remote call observed by the stub, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    FetchFilters {
        workspace: String,
        project: String,
        cycle: String,
    },
    FetchIssues {
        workspace: String,
        project: String,
        mode: LoaderMode,
        cycle: String,
    },
}

// ---------------------------------------------------------------------------
// Stub store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct IssueSlot {
    phase: LoaderPhase,
    grouped: Option<GroupedIssueIds>,
}

#[derive(Default)]
struct StubState {
    calls: Vec<StoreCall>,
    layouts: HashMap<CycleScope, Option<IssueLayout>>,
    issues: HashMap<CycleScope, IssueSlot>,
    fail_filters: Option<String>,
    fail_issues: Option<String>,
}

/// A store that serves fixture data without any network calls and records
/// every fetch it receives.
///
/// Useful for integration tests and the CLI, which must not require a
/// backend.
pub struct StubStore {
    fixture: StoreFixture,
    latency: Duration,
    state: Mutex<StubState>,
}

impl StubStore {
    pub fn new(fixture: StoreFixture) -> Self {
        Self {
            fixture,
            latency: Duration::ZERO,
            state: Mutex::new(StubState::default()),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let fixture: StoreFixture =
            serde_json::from_str(json).map_err(|e| StoreError::Fixture(e.to_string()))?;
        Ok(Self::new(fixture))
    }

    /// Delay every fetch by `latency`, so callers can overlap requests.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make every following `fetch_filters` fail with `message` (`None` heals).
    pub fn fail_filters(&self, message: Option<&str>) {
        self.lock().fail_filters = message.map(str::to_owned);
    }

    /// Make every following `fetch_issues` fail with `message` (`None` heals).
    pub fn fail_issues(&self, message: Option<&str>) {
        self.lock().fail_issues = message.map(str::to_owned);
    }

    /// Install an already-loaded collection for `scope`.
    pub fn seed_issues(&self, scope: &CycleScope, grouped: GroupedIssueIds) {
        self.lock().issues.insert(
            scope.clone(),
            IssueSlot {
                phase: LoaderPhase::Ready,
                grouped: Some(grouped),
            },
        );
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StubState> {
        // A panic while holding the lock leaves plain data behind; keep serving it.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn known_cycle(&self, cycle: &str) -> Result<(), StoreError> {
        if self.fixture.cycles.iter().any(|c| c.id == cycle) {
            Ok(())
        } else {
            Err(StoreError::CycleNotFound(cycle.to_owned()))
        }
    }
}

fn scope_of(workspace: &str, project: &str, cycle: &str) -> CycleScope {
    CycleScope {
        workspace: workspace.to_owned(),
        project: project.to_owned(),
        cycle: cycle.to_owned(),
    }
}

impl FilterStore for StubStore {
    async fn fetch_filters(
        &self,
        workspace: &str,
        project: &str,
        cycle: &str,
    ) -> Result<(), StoreError> {
        self.lock().calls.push(StoreCall::FetchFilters {
            workspace: workspace.to_owned(),
            project: project.to_owned(),
            cycle: cycle.to_owned(),
        });
        self.simulate_latency().await;

        let failure = self.lock().fail_filters.clone();
        if let Some(message) = failure {
            return Err(StoreError::Remote {
                context: format!("fetch_filters {cycle}"),
                message,
            });
        }
        self.known_cycle(cycle)?;

        let layout = self.fixture.filters.get(cycle).and_then(|f| f.layout);
        self.lock()
            .layouts
            .insert(scope_of(workspace, project, cycle), layout);
        tracing::debug!("stub: filters loaded for {cycle} layout={layout:?}");
        Ok(())
    }

    fn active_layout(&self, scope: &CycleScope) -> Option<IssueLayout> {
        self.lock().layouts.get(scope).copied().flatten()
    }
}

impl IssueStore for StubStore {
    async fn fetch_issues(
        &self,
        workspace: &str,
        project: &str,
        mode: LoaderMode,
        cycle: &str,
    ) -> Result<(), StoreError> {
        let scope = scope_of(workspace, project, cycle);
        {
            let mut state = self.lock();
            state.calls.push(StoreCall::FetchIssues {
                workspace: workspace.to_owned(),
                project: project.to_owned(),
                mode,
                cycle: cycle.to_owned(),
            });
            state.issues.entry(scope.clone()).or_default().phase = match mode {
                LoaderMode::InitLoader => LoaderPhase::Initial,
                LoaderMode::Mutation => LoaderPhase::Mutating,
            };
        }
        self.simulate_latency().await;

        let failure = self.lock().fail_issues.clone();
        if let Some(message) = failure {
            return Err(StoreError::Remote {
                context: format!("fetch_issues {cycle}"),
                message,
            });
        }
        self.known_cycle(cycle)?;

        let grouped = self.fixture.issues.get(cycle).cloned().unwrap_or_default();
        tracing::debug!(
            "stub: issues loaded for {cycle} mode={mode} groups={}",
            grouped.group_count()
        );
        let mut state = self.lock();
        let slot = state.issues.entry(scope).or_default();
        slot.grouped = Some(grouped);
        slot.phase = LoaderPhase::Ready;
        Ok(())
    }

    fn loader(&self, scope: &CycleScope) -> LoaderPhase {
        self.lock()
            .issues
            .get(scope)
            .map_or(LoaderPhase::Initial, |slot| slot.phase)
    }

    fn grouped_issue_ids(&self, scope: &CycleScope) -> Option<GroupedIssueIds> {
        self.lock()
            .issues
            .get(scope)
            .and_then(|slot| slot.grouped.clone())
    }
}

impl CycleStore for StubStore {
    fn cycle_by_id(&self, cycle_id: &str) -> Option<Cycle> {
        self.fixture.cycles.iter().find(|c| c.id == cycle_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "cycles": [{ "id": "cyc1", "name": "Sprint 1", "status": "COMPLETED" }],
        "filters": { "cyc1": { "layout": "list" } },
        "issues": { "cyc1": { "backlog": ["i1"], "done": ["i2", "i3"] } }
    }"#;

    fn scope() -> CycleScope {
        scope_of("ws1", "proj1", "cyc1")
    }

    #[test]
    fn fixture_parses() {
        let store = StubStore::from_json(FIXTURE).unwrap();
        let cycle = store.cycle_by_id("cyc1").unwrap();
        assert_eq!(cycle.status.as_deref(), Some("COMPLETED"));
        assert!(store.cycle_by_id("nope").is_none());
    }

    #[test]
    fn bad_fixture_is_reported() {
        assert!(matches!(
            StubStore::from_json("{ not json"),
            Err(StoreError::Fixture(_))
        ));
    }

    #[tokio::test]
    async fn reads_are_empty_until_fetched() {
        let store = StubStore::from_json(FIXTURE).unwrap();
        assert_eq!(store.active_layout(&scope()), None);
        assert_eq!(store.loader(&scope()), LoaderPhase::Initial);
        assert!(store.grouped_issue_ids(&scope()).is_none());

        store.fetch_filters("ws1", "proj1", "cyc1").await.unwrap();
        store
            .fetch_issues("ws1", "proj1", LoaderMode::InitLoader, "cyc1")
            .await
            .unwrap();

        assert_eq!(store.active_layout(&scope()), Some(IssueLayout::List));
        assert_eq!(store.loader(&scope()), LoaderPhase::Ready);
        assert_eq!(store.grouped_issue_ids(&scope()).unwrap().group_count(), 2);
    }

    #[tokio::test]
    async fn unknown_cycle_fails() {
        let store = StubStore::from_json(FIXTURE).unwrap();
        let err = store.fetch_filters("ws1", "proj1", "cyc9").await.unwrap_err();
        assert!(matches!(err, StoreError::CycleNotFound(ref id) if id == "cyc9"));
    }

    #[tokio::test]
    async fn failed_issue_fetch_keeps_partial_state() {
        let store = StubStore::from_json(FIXTURE).unwrap();
        store.fail_issues(Some("boom"));
        let err = store
            .fetch_issues("ws1", "proj1", LoaderMode::InitLoader, "cyc1")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "fetch_issues cyc1: boom");
        assert_eq!(store.loader(&scope()), LoaderPhase::Initial);
        assert!(store.grouped_issue_ids(&scope()).is_none());
    }
}
