use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::role::Role;

/// What a cache entry holds a snapshot of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CachedEntity {
    ProposalList,
    ProposalDetail,
    ProposalRevisions,
}

/// Explicit cache key: entity kind, the role the view was scoped to, and
/// the record id for detail views. No string keys anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub entity: CachedEntity,
    pub role: Role,
    pub id: Option<i64>,
}

/// Read-mostly response cache for the proposal read endpoints. Mutation
/// handlers call `invalidate_proposal` after every successful write; there
/// is no merge of cached state with in-flight edits, the next read simply
/// refetches.
#[derive(Debug, Default)]
pub struct Cache {
    entries: Mutex<HashMap<CacheKey, serde_json::Value>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    pub fn put(&self, key: CacheKey, value: serde_json::Value) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, value);
        }
    }

    /// Drop every entry touching the given proposal, plus all list views
    /// (a status or version change moves the proposal between lists).
    pub fn invalidate_proposal(&self, proposal_id: i64) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|key, _| {
                key.entity != CachedEntity::ProposalList && key.id != Some(proposal_id)
            });
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}
