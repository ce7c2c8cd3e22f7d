// store module — contracts of the remote filter/issue/cycle stores

mod stub;

use thiserror::Error;

use crate::types::{Cycle, CycleScope, GroupedIssueIds, IssueLayout, LoaderMode, LoaderPhase};

pub use stub::{StoreCall, StoreFixture, StubStore};

/// Failure reported by a store operation.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("{context}: {message}")]
    Remote { context: String, message: String },
    #[error("cycle {0:?} not found")]
    CycleNotFound(String),
    #[error("invalid store fixture: {0}")]
    Fixture(String),
}

/// Display-filter configuration per cycle.
pub trait FilterStore: Send + Sync + 'static {
    fn fetch_filters(
        &self,
        workspace: &str,
        project: &str,
        cycle: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// `None` until filters have been loaded for `scope`.
    fn active_layout(&self, scope: &CycleScope) -> Option<IssueLayout>;
}

/// Grouped issue collection per cycle. Owns its own cache and grouping.
pub trait IssueStore: Send + Sync + 'static {
    fn fetch_issues(
        &self,
        workspace: &str,
        project: &str,
        mode: LoaderMode,
        cycle: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn loader(&self, scope: &CycleScope) -> LoaderPhase;

    /// `None` while nothing has been loaded for `scope`.
    fn grouped_issue_ids(&self, scope: &CycleScope) -> Option<GroupedIssueIds>;
}

pub trait CycleStore: Send + Sync + 'static {
    fn cycle_by_id(&self, cycle_id: &str) -> Option<Cycle>;
}

/// The single authoritative store object the cycle view reads from.
///
/// Consumers only hold a shared reference; data is mutated exclusively by the
/// store's own fetch methods.
pub trait ProjectStore: FilterStore + IssueStore + CycleStore {}

impl<T: FilterStore + IssueStore + CycleStore> ProjectStore for T {}
