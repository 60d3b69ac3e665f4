//! Hot cache of live mitplan documents
//!
//! Fast, non-authoritative key-value store holding the serialized document
//! for active mitplans, keyed `mitplan:<id>`. The cache is rebuildable
//! from the durable store at any time (cache-aside fill on load), so
//! losing it costs latency, never data.
//!
//! Values are the serialized JSON form, not parsed documents: the cache
//! sits between the wire and the durable store, and both sides speak the
//! serialized form.

use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process hot cache of serialized mitplan state
#[derive(Default)]
pub struct StateCache {
    entries: RwLock<HashMap<String, String>>,
}

fn cache_key(mitplan_id: &str) -> String {
    format!("mitplan:{mitplan_id}")
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached serialized state for a mitplan id
    pub async fn get(&self, mitplan_id: &str) -> Option<String> {
        self.entries.read().await.get(&cache_key(mitplan_id)).cloned()
    }

    /// Set the cached serialized state for a mitplan id
    pub async fn set(&self, mitplan_id: &str, state: &str) {
        self.entries
            .write()
            .await
            .insert(cache_key(mitplan_id), state.to_string());
    }

    /// Check whether a mitplan id is currently cached
    pub async fn exists(&self, mitplan_id: &str) -> bool {
        self.entries.read().await.contains_key(&cache_key(mitplan_id))
    }
}
