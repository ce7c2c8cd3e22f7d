use std::path::PathBuf;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub defaults: Defaults,
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// How long a resolved load counts as fresh for its key.
    pub stale_after_secs: u64,
    /// Upper bound on keys remembered by the dedup cache.
    pub max_cached_keys: u64,
}

impl FetchConfig {
    /// Longest freshness window the dedup cache accepts (1000 years).
    pub const MAX_STALE_AFTER_SECS: u64 = 1000 * 365 * 24 * 60 * 60;
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: 300,
            max_cached_keys: 500,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Store fixture served to the CLI when `--fixture` is not given.
    pub fixture: Option<PathBuf>,
}
