use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use thiserror::Error;

use crate::config::types::FetchConfig;
use crate::store::{ProjectStore, StoreError};
use crate::types::{CycleScope, FetchKey, LoaderMode};

/// Which step of a coordinated fetch failed.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("loading filters for {key} failed")]
    Filters {
        key: FetchKey,
        #[source]
        source: StoreError,
    },
    #[error("loading issues for {key} ({mode}) failed")]
    Issues {
        key: FetchKey,
        mode: LoaderMode,
        #[source]
        source: StoreError,
    },
}

impl FetchError {
    pub fn key(&self) -> &FetchKey {
        match self {
            Self::Filters { key, .. } | Self::Issues { key, .. } => key,
        }
    }
}

/// A completed filter+issue load for one key.
#[derive(Debug, Clone)]
pub struct FetchRecord {
    pub key: FetchKey,
    pub mode: LoaderMode,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub record: FetchRecord,
    /// `false` when this trigger joined an in-flight load or hit a fresh
    /// cached result instead of calling the stores itself.
    pub issued: bool,
}

/// Runs the two dependent store calls for a cycle, at most once at a time per
/// [`FetchKey`].
///
/// Concurrent triggers for the same key wait on the same load. A successful
/// load stays fresh for `stale_after_secs`; failures are not cached.
pub struct FetchCoordinator<S> {
    store: Arc<S>,
    cache: Cache<FetchKey, FetchRecord>,
}

impl<S: ProjectStore> FetchCoordinator<S> {
    /// Out-of-range settings are clamped; `load_config` rejects them earlier.
    pub fn new(store: Arc<S>, config: &FetchConfig) -> Self {
        let ttl = config.stale_after_secs.min(FetchConfig::MAX_STALE_AFTER_SECS);
        let cache = Cache::builder()
            .max_capacity(config.max_cached_keys.max(1))
            .time_to_live(Duration::from_secs(ttl))
            .build();
        Self { store, cache }
    }

    pub async fn fetch(&self, scope: &CycleScope) -> Result<FetchOutcome, FetchError> {
        let key = scope.fetch_key();
        let entry = self
            .cache
            .entry(key.clone())
            .or_try_insert_with(self.load(scope, key.clone()))
            .await
            .map_err(Arc::unwrap_or_clone)?;

        let issued = entry.is_fresh();
        if !issued {
            tracing::debug!("coordinator: {key} already loaded or in flight, not refetching");
        }
        Ok(FetchOutcome {
            record: entry.into_value(),
            issued,
        })
    }

    /// Mark `key` stale so the next trigger reloads it.
    pub async fn invalidate(&self, key: &FetchKey) {
        self.cache.invalidate(key).await;
    }

    pub fn is_fresh(&self, key: &FetchKey) -> bool {
        self.cache.contains_key(key)
    }

    async fn load(&self, scope: &CycleScope, key: FetchKey) -> Result<FetchRecord, FetchError> {
        tracing::debug!("coordinator: {key} fetching filters");
        self.store
            .fetch_filters(&scope.workspace, &scope.project, &scope.cycle)
            .await
            .map_err(|source| FetchError::Filters {
                key: key.clone(),
                source,
            })?;

        // Decided after the filter load completes, against this scope's collection only.
        let mode = if self.store.grouped_issue_ids(scope).is_some() {
            LoaderMode::Mutation
        } else {
            LoaderMode::InitLoader
        };

        tracing::debug!("coordinator: {key} fetching issues mode={mode}");
        self.store
            .fetch_issues(&scope.workspace, &scope.project, mode, &scope.cycle)
            .await
            .map_err(|source| FetchError::Issues {
                key: key.clone(),
                mode,
                source,
            })?;

        Ok(FetchRecord {
            key,
            mode,
            fetched_at: Utc::now(),
        })
    }
}
