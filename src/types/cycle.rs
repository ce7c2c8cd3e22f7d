use serde::{Deserialize, Serialize};

/// A cycle as returned by the cycle store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Free-form status as the backend reports it (`"COMPLETED"`, `"current"`, ...).
    pub status: Option<String>,
}

/// Cycle status normalized to lower case.
///
/// Only `"completed"` drives behavior; an absent status reads as `"draft"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleStatus(String);

impl CycleStatus {
    pub const COMPLETED: &'static str = "completed";
    const DEFAULT: &'static str = "draft";

    pub fn of(cycle: Option<&Cycle>) -> Self {
        Self::from_raw(cycle.and_then(|c| c.status.as_deref()))
    }

    pub fn from_raw(raw: Option<&str>) -> Self {
        Self(raw.map_or_else(|| Self::DEFAULT.to_owned(), str::to_lowercase))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_completed(&self) -> bool {
        self.0 == Self::COMPLETED
    }
}
