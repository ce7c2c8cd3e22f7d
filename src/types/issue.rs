use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Issue-view enums
// ---------------------------------------------------------------------------

/// Layout selected in the cycle's display filters.
///
/// Values the crate does not know deserialize to `Unknown` instead of failing;
/// the layout dispatcher renders nothing for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueLayout {
    List,
    Kanban,
    Calendar,
    GanttChart,
    Spreadsheet,
    #[serde(other)]
    Unknown,
}

impl IssueLayout {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Kanban => "kanban",
            Self::Calendar => "calendar",
            Self::GanttChart => "gantt_chart",
            Self::Spreadsheet => "spreadsheet",
            Self::Unknown => "unknown",
        }
    }
}

/// Loading phase reported by the issue store for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderPhase {
    /// Nothing has ever been loaded for this cycle.
    #[default]
    Initial,
    /// A refresh is running; previous data may still be shown.
    Mutating,
    Ready,
}

/// Mode flag passed to the issue store's fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoaderMode {
    /// No collection exists yet: hard loading state.
    #[serde(rename = "init-loader")]
    InitLoader,
    /// Refresh of an existing collection: keep showing it while in flight.
    #[serde(rename = "mutation")]
    Mutation,
}

impl LoaderMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InitLoader => "init-loader",
            Self::Mutation => "mutation",
        }
    }
}

impl fmt::Display for LoaderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Grouped issue ids
// ---------------------------------------------------------------------------

/// Group label to the ids of the issues in that group, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupedIssueIds(pub IndexMap<String, Vec<String>>);

impl GroupedIssueIds {
    pub fn group_count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn issue_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<String>)> for GroupedIssueIds {
    fn from_iter<T: IntoIterator<Item = (K, Vec<String>)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
