//! Content-addressed blob store for Resource and SkillSet specs.
//!
//! Storage representation is the canonical byte-serialization of
//! `{version, type, description, spec, entropy}`; the content hash is the
//! SHA-512 hex digest of that serialization. `entropy` is
//! `catalog + ":" + type` so that identical specs in different catalogs
//! never collide.

use crate::error::{CoreError, CoreResult};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha512};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectType {
    Resource,
    Skillset,
}

impl ObjectType {
    fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Resource => "Resource",
            ObjectType::Skillset => "Skillset",
        }
    }
}

/// The hex-encoded SHA-512 content hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectHash(pub String);

impl std::fmt::Display for ObjectHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredObject {
    pub version: String,
    pub object_type: ObjectType,
    pub description: String,
    pub spec: Value,
    pub catalog: String,
}

impl StoredObject {
    fn entropy(&self) -> String {
        format!("{}:{}", self.catalog, self.object_type.as_str())
    }

    /// Recursively sort object keys so that semantically identical specs
    /// serialize identically regardless of field order.
    fn canonicalize(&self) -> Value {
        canonicalize_json(&serde_json::json!({
            "version": self.version,
            "type": self.object_type.as_str(),
            "description": self.description,
            "spec": self.spec,
            "entropy": self.entropy(),
        }))
    }

    pub fn hash(&self) -> ObjectHash {
        let canonical = self.canonicalize();
        let bytes = serde_json::to_vec(&canonical).expect("canonical value always serializes");
        let digest = Sha512::digest(&bytes);
        ObjectHash(hex::encode(digest))
    }
}

/// Recursive key-sorting for stable hashing, grounded on the teacher's
/// `canonicalize_json` helper used ahead of schema digesting.
pub fn canonicalize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.iter().map(|(k, v)| (k.clone(), canonicalize_json(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize_json).collect()),
        other => other.clone(),
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, object: StoredObject) -> CoreResult<ObjectHash>;
    async fn get_by_hash(&self, hash: &ObjectHash) -> CoreResult<StoredObject>;
    async fn get_by_path(&self, path: &str, variant_directory_id: Uuid) -> CoreResult<StoredObject>;
    async fn delete(&self, path: &str, variant_directory_id: Uuid) -> CoreResult<()>;
}

struct Blob {
    object: StoredObject,
    refcount: u64,
}

/// In-memory reference implementation backed by `dashmap`, matching the
/// teacher's registry concurrency style.
pub struct InMemoryObjectStore {
    blobs: DashMap<ObjectHash, Blob>,
    index: DashMap<(String, Uuid), ObjectHash>,
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self { blobs: DashMap::new(), index: DashMap::new() }
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, object: StoredObject) -> CoreResult<ObjectHash> {
        let hash = object.hash();
        self.blobs
            .entry(hash.clone())
            .and_modify(|b| b.refcount += 1)
            .or_insert(Blob { object, refcount: 1 });
        Ok(hash)
    }

    async fn get_by_hash(&self, hash: &ObjectHash) -> CoreResult<StoredObject> {
        self.blobs
            .get(hash)
            .map(|b| b.object.clone())
            .ok_or_else(|| CoreError::not_found("Object", hash.to_string()))
    }

    async fn get_by_path(&self, path: &str, variant_directory_id: Uuid) -> CoreResult<StoredObject> {
        let hash = self
            .index
            .get(&(path.to_string(), variant_directory_id))
            .map(|e| e.value().clone())
            .ok_or_else(|| CoreError::not_found("Object", path.to_string()))?;
        self.get_by_hash(&hash).await
    }

    async fn delete(&self, path: &str, variant_directory_id: Uuid) -> CoreResult<()> {
        let key = (path.to_string(), variant_directory_id);
        let Some((_, hash)) = self.index.remove(&key) else {
            // Soft success: deleting a non-existent index entry is not an error.
            return Ok(());
        };
        let mut remove_blob = false;
        if let Some(mut blob) = self.blobs.get_mut(&hash) {
            blob.refcount = blob.refcount.saturating_sub(1);
            remove_blob = blob.refcount == 0;
        }
        if remove_blob {
            self.blobs.remove(&hash);
        }
        Ok(())
    }
}

impl InMemoryObjectStore {
    /// Upsert the `(path, variantDirectoryID) -> hash` index row after a
    /// successful `put`. Kept separate from `put` so callers can compute
    /// the hash first (e.g. for dedup checks) before committing the index.
    pub async fn put_indexed(
        &self,
        path: &str,
        variant_directory_id: Uuid,
        object: StoredObject,
    ) -> CoreResult<ObjectHash> {
        let hash = self.put(object).await?;
        self.index.insert((path.to_string(), variant_directory_id), hash.clone());
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(spec: Value) -> StoredObject {
        StoredObject {
            version: "0.1.0-alpha.1".into(),
            object_type: ObjectType::Resource,
            description: "a widget".into(),
            spec,
            catalog: "acme".into(),
        }
    }

    #[tokio::test]
    async fn dedup_by_hash() {
        let store = InMemoryObjectStore::new();
        let vdir = Uuid::new_v4();
        let h1 = store.put_indexed("/a", vdir, obj(serde_json::json!({"x": 1}))).await.unwrap();
        let h2 = store.put_indexed("/b", vdir, obj(serde_json::json!({"x": 1}))).await.unwrap();
        assert_eq!(h1, h2);
    }

    #[tokio::test]
    async fn different_catalogs_do_not_collide() {
        let store = InMemoryObjectStore::new();
        let vdir = Uuid::new_v4();
        let mut other = obj(serde_json::json!({"x": 1}));
        other.catalog = "other-catalog".into();
        let h1 = store.put_indexed("/a", vdir, obj(serde_json::json!({"x": 1}))).await.unwrap();
        let h2 = store.put_indexed("/b", vdir, other).await.unwrap();
        assert_ne!(h1, h2);
    }

    #[tokio::test]
    async fn get_by_path_round_trips() {
        let store = InMemoryObjectStore::new();
        let vdir = Uuid::new_v4();
        let hash = store.put_indexed("/a", vdir, obj(serde_json::json!({"x": 1}))).await.unwrap();
        let fetched = store.get_by_path("/a", vdir).await.unwrap();
        assert_eq!(fetched.hash(), hash);
    }

    #[tokio::test]
    async fn delete_missing_index_is_soft_success() {
        let store = InMemoryObjectStore::new();
        assert!(store.delete("/nonexistent", Uuid::new_v4()).await.is_ok());
    }

    #[tokio::test]
    async fn delete_removes_blob_when_unreferenced() {
        let store = InMemoryObjectStore::new();
        let vdir = Uuid::new_v4();
        let hash = store.put_indexed("/a", vdir, obj(serde_json::json!({"x": 1}))).await.unwrap();
        store.delete("/a", vdir).await.unwrap();
        assert!(store.get_by_hash(&hash).await.is_err());
    }

    #[test]
    fn canonicalize_is_idempotent_and_order_independent() {
        let a = serde_json::json!({"b": 1, "a": 2});
        let b = serde_json::json!({"a": 2, "b": 1});
        assert_eq!(canonicalize_json(&a), canonicalize_json(&b));
        assert_eq!(canonicalize_json(&canonicalize_json(&a)), canonicalize_json(&a));
    }
}
