//! Franchise persistence: one JSON document per franchise key, merged on write, with change
//! notices for anyone watching.

use crate::models::LeagueState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::broadcast;

/// Pending notices a slow subscriber may fall behind by before it starts missing some.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Errors from the persistence layer. The caller's in-memory state is never touched.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreError {
    /// No document stored under this key.
    NotFound(String),
    /// The document could not be converted to or from a league state.
    Serialization(String),
    /// A writer panicked while holding the store lock.
    LockPoisoned,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(key) => write!(f, "No franchise stored under {}", key),
            StoreError::Serialization(msg) => write!(f, "Franchise document is invalid: {}", msg),
            StoreError::LockPoisoned => write!(f, "Store lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Sent to subscribers after every successful write.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeNotice {
    pub key: String,
    pub updated_at: DateTime<Utc>,
}

/// Where franchises live between requests.
pub trait FranchiseStore {
    fn load(&self, key: &str) -> Result<LeagueState, StoreError>;

    /// Merge `document`'s top-level fields over the stored ones; fields it lacks are kept.
    fn save_document(&self, key: &str, document: Value) -> Result<DateTime<Utc>, StoreError>;

    fn subscribe(&self) -> broadcast::Receiver<ChangeNotice>;

    /// Write a whole league state.
    fn save(&self, key: &str, state: &LeagueState) -> Result<DateTime<Utc>, StoreError> {
        self.save_document(key, serde_json::to_value(state)?)
    }
}

/// Stored document plus its last write time.
#[derive(Clone, Debug)]
struct StoredDocument {
    document: Value,
    updated_at: DateTime<Utc>,
}

/// Process-local store. Documents are gone when the process exits.
pub struct MemoryStore {
    documents: RwLock<HashMap<String, StoredDocument>>,
    changes: broadcast::Sender<ChangeNotice>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            documents: RwLock::new(HashMap::new()),
            changes,
        }
    }

    /// Drop documents last written before `cutoff`. Returns how many were removed.
    pub fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut g = self.documents.write().map_err(|_| StoreError::LockPoisoned)?;
        let before = g.len();
        g.retain(|_, doc| doc.updated_at >= cutoff);
        Ok(before - g.len())
    }

    pub fn updated_at(&self, key: &str) -> Result<DateTime<Utc>, StoreError> {
        let g = self.documents.read().map_err(|_| StoreError::LockPoisoned)?;
        g.get(key)
            .map(|doc| doc.updated_at)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}

impl FranchiseStore for MemoryStore {
    fn load(&self, key: &str) -> Result<LeagueState, StoreError> {
        let g = self.documents.read().map_err(|_| StoreError::LockPoisoned)?;
        let doc = g.get(key).ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        Ok(serde_json::from_value(doc.document.clone())?)
    }

    fn save_document(&self, key: &str, document: Value) -> Result<DateTime<Utc>, StoreError> {
        let Value::Object(fields) = document else {
            return Err(StoreError::Serialization("document must be a JSON object".to_string()));
        };
        let updated_at = Utc::now();
        {
            let mut g = self.documents.write().map_err(|_| StoreError::LockPoisoned)?;
            let entry = g.entry(key.to_string()).or_insert_with(|| StoredDocument {
                document: Value::Object(serde_json::Map::new()),
                updated_at,
            });
            match &mut entry.document {
                Value::Object(stored) => stored.extend(fields),
                other => *other = Value::Object(fields),
            }
            entry.updated_at = updated_at;
        }
        // No subscribers is fine.
        let _ = self.changes.send(ChangeNotice {
            key: key.to_string(),
            updated_at,
        });
        Ok(updated_at)
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeNotice> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{new_league, LeagueConfig};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use serde_json::json;

    fn league() -> LeagueState {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        new_league(&LeagueConfig::with_team_count(2), &mut rng).unwrap()
    }

    #[test]
    fn saved_state_loads_back() {
        let store = MemoryStore::new();
        let state = league();
        store.save("club", &state).unwrap();
        assert_eq!(store.load("club").unwrap(), state);
    }

    #[test]
    fn missing_key_is_not_found() {
        let store = MemoryStore::new();
        assert_eq!(store.load("nobody"), Err(StoreError::NotFound("nobody".to_string())));
    }

    #[test]
    fn partial_write_keeps_other_fields() {
        let store = MemoryStore::new();
        let state = league();
        store.save("club", &state).unwrap();
        store.save_document("club", json!({ "year": 7 })).unwrap();
        let loaded = store.load("club").unwrap();
        assert_eq!(loaded.year, 7);
        assert_eq!(loaded.teams, state.teams);
        assert_eq!(loaded.schedule, state.schedule);
    }

    #[test]
    fn non_object_documents_are_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.save_document("club", json!([1, 2])),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn subscribers_hear_about_writes() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();
        let at = store.save("club", &league()).unwrap();
        let notice = rx.try_recv().unwrap();
        assert_eq!(notice, ChangeNotice { key: "club".to_string(), updated_at: at });
    }

    #[test]
    fn prune_drops_stale_documents() {
        let store = MemoryStore::new();
        store.save("old", &league()).unwrap();
        let cutoff = Utc::now() + chrono::Duration::seconds(1);
        assert_eq!(store.prune_before(cutoff).unwrap(), 1);
        assert!(store.updated_at("old").is_err());
    }
}
