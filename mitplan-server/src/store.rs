//! Cache/store coordination for mitplan documents
//!
//! Read path: hot cache first, durable store on miss with a cache-aside
//! fill. Write path: write-through, cache then durable store. Neither
//! write rolls the other back on failure; with at most one writer per
//! live session the stores re-converge on the next successful commit,
//! and the durable store remains the system of record throughout.

use crate::cache::StateCache;
use mitplan_common::db::queries;
use mitplan_common::model::Mitplan;
use mitplan_common::{idgen, Result};
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Coordinated access to the hot cache and the durable store
pub struct MitplanStore {
    cache: StateCache,
    db: SqlitePool,
}

impl MitplanStore {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            cache: StateCache::new(),
            db,
        }
    }

    /// Load a mitplan document: cache first, durable store on miss
    ///
    /// A durable-store hit repopulates the cache before returning, so the
    /// next load for the same id is served hot.
    pub async fn load(&self, mitplan_id: &str) -> Result<Option<Mitplan>> {
        if let Some(raw) = self.cache.get(mitplan_id).await {
            debug!(mitplan_id, "cache hit");
            return Ok(Some(serde_json::from_str(&raw)?));
        }

        match queries::fetch_state(&self.db, mitplan_id).await? {
            Some(raw) => {
                debug!(mitplan_id, "cache miss, filled from durable store");
                self.cache.set(mitplan_id, &raw).await;
                Ok(Some(serde_json::from_str(&raw)?))
            }
            None => Ok(None),
        }
    }

    /// Commit a document write-through: cache unconditionally, then the
    /// durable store
    pub async fn commit(&self, mitplan_id: &str, state: &Mitplan) -> Result<()> {
        let raw = serde_json::to_string(state)?;
        self.cache.set(mitplan_id, &raw).await;
        queries::upsert_state(&self.db, mitplan_id, &raw, None).await?;
        debug!(mitplan_id, bytes = raw.len(), "committed state");
        Ok(())
    }

    /// Flush the cached state for a mitplan into the durable store
    ///
    /// Returns `false` when no cached document exists for the id (the
    /// caller surfaces that as not-found).
    pub async fn flush(&self, mitplan_id: &str) -> Result<bool> {
        match self.cache.get(mitplan_id).await {
            Some(raw) => {
                queries::upsert_state(&self.db, mitplan_id, &raw, None).await?;
                info!(mitplan_id, "flushed cached state to durable store");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Create a new mitplan: allocate an unused id, seed the initial
    /// document, commit it
    ///
    /// Id allocation retries until the generator produces an id with no
    /// live cache entry. The word-list id space is small; see
    /// `mitplan_common::idgen` for the documented scaling boundary.
    pub async fn create(&self) -> Result<(String, Mitplan)> {
        let mitplan_id = loop {
            let candidate = idgen::generate();
            if !self.cache.exists(&candidate).await {
                break candidate;
            }
        };

        let state = Mitplan::initial(&mitplan_id);
        self.commit(&mitplan_id, &state).await?;
        info!(%mitplan_id, "created mitplan");
        Ok((mitplan_id, state))
    }

    /// Whether a mitplan id currently has a cache entry
    pub async fn cached(&self, mitplan_id: &str) -> bool {
        self.cache.exists(mitplan_id).await
    }

    /// Direct cache read, for tests asserting cache-aside fills
    pub async fn cached_raw(&self, mitplan_id: &str) -> Option<String> {
        self.cache.get(mitplan_id).await
    }
}
