use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity triple
// ---------------------------------------------------------------------------

/// The `(workspace, project, cycle)` triple supplied by navigation.
///
/// Any member may be absent while the route is still resolving. An empty
/// string counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityTriple {
    pub workspace: Option<String>,
    pub project: Option<String>,
    pub cycle: Option<String>,
}

impl IdentityTriple {
    pub fn new(workspace: &str, project: &str, cycle: &str) -> Self {
        Self {
            workspace: Some(workspace.to_owned()),
            project: Some(project.to_owned()),
            cycle: Some(cycle.to_owned()),
        }
    }

    /// Resolve into a [`CycleScope`], or `None` when the triple is not ready.
    ///
    /// Not being ready is a normal navigation state, not an error.
    pub fn resolve(&self) -> Option<CycleScope> {
        let present = |s: &Option<String>| {
            s.as_deref()
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };
        Some(CycleScope {
            workspace: present(&self.workspace)?,
            project: present(&self.project)?,
            cycle: present(&self.cycle)?,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.resolve().is_some()
    }
}

// ---------------------------------------------------------------------------
// Resolved scope
// ---------------------------------------------------------------------------

/// A fully resolved identity triple: every member is a non-empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CycleScope {
    pub workspace: String,
    pub project: String,
    pub cycle: String,
}

impl CycleScope {
    pub fn fetch_key(&self) -> FetchKey {
        FetchKey {
            workspace: self.workspace.clone(),
            project: self.project.clone(),
            cycle: self.cycle.clone(),
        }
    }
}

impl fmt::Display for CycleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.workspace, self.project, self.cycle)
    }
}

// ---------------------------------------------------------------------------
// Fetch key
// ---------------------------------------------------------------------------

/// Deduplication unit for cycle issue fetches.
///
/// Equality and hashing run over the three members, so `("a_b", "c", ..)` and
/// `("a", "b_c", ..)` stay distinct even though their display strings would
/// be identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    workspace: String,
    project: String,
    cycle: String,
}

impl FetchKey {
    pub fn cycle(&self) -> &str {
        &self.cycle
    }
}

impl fmt::Display for FetchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CYCLE_ISSUES_{}_{}_{}",
            self.workspace, self.project, self.cycle
        )
    }
}
