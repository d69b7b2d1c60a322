//! Generic `Store` abstraction over typed entities, replacing the
//! teacher's `sqlx`-backed `PersistenceLayer` with a trait the rest of the
//! workspace programs against. The relational database itself is an
//! external collaborator the core never speaks to directly.

use crate::error::{CoreError, CoreResult};
use async_trait::async_trait;
use dashmap::DashMap;
use std::hash::Hash;
use uuid::Uuid;

#[async_trait]
pub trait Store<K, V>: Send + Sync
where
    K: Eq + Hash + Send + Sync + std::fmt::Display,
    V: Clone + Send + Sync,
{
    async fn save(&self, key: K, value: V) -> CoreResult<()>;
    async fn load(&self, key: &K) -> CoreResult<V>;
    async fn delete(&self, key: &K) -> CoreResult<()>;
    async fn list(&self) -> CoreResult<Vec<V>>;
    async fn exists(&self, key: &K) -> bool;
}

/// In-memory default implementation, `dashmap`-backed like the teacher's
/// registry maps.
pub struct InMemoryStore<K, V> {
    entity_kind: &'static str,
    rows: DashMap<K, V>,
}

impl<K, V> InMemoryStore<K, V>
where
    K: Eq + Hash,
{
    pub fn new(entity_kind: &'static str) -> Self {
        Self { entity_kind, rows: DashMap::new() }
    }
}

#[async_trait]
impl<K, V> Store<K, V> for InMemoryStore<K, V>
where
    K: Eq + Hash + Send + Sync + std::fmt::Display + Clone,
    V: Clone + Send + Sync,
{
    async fn save(&self, key: K, value: V) -> CoreResult<()> {
        self.rows.insert(key, value);
        Ok(())
    }

    async fn load(&self, key: &K) -> CoreResult<V> {
        self.rows
            .get(key)
            .map(|v| v.clone())
            .ok_or_else(|| CoreError::not_found(self.entity_kind, key.to_string()))
    }

    async fn delete(&self, key: &K) -> CoreResult<()> {
        self.rows.remove(key);
        Ok(())
    }

    async fn list(&self) -> CoreResult<Vec<V>> {
        Ok(self.rows.iter().map(|e| e.value().clone()).collect())
    }

    async fn exists(&self, key: &K) -> bool {
        self.rows.contains_key(key)
    }
}

/// Newtype key wrapper so each entity kind's store is distinctly typed
/// even though all of them key on a `Uuid` internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub Uuid);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_load_round_trip() {
        let store: InMemoryStore<EntityId, String> = InMemoryStore::new("Widget");
        let id = EntityId::new();
        store.save(id, "hello".to_string()).await.unwrap();
        assert_eq!(store.load(&id).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn load_missing_is_not_found() {
        let store: InMemoryStore<EntityId, String> = InMemoryStore::new("Widget");
        let err = store.load(&EntityId::new()).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn delete_then_list_empty() {
        let store: InMemoryStore<EntityId, String> = InMemoryStore::new("Widget");
        let id = EntityId::new();
        store.save(id, "x".to_string()).await.unwrap();
        store.delete(&id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }
}
