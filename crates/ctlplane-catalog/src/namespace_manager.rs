//! `NamespaceManager`: Load/Save/Delete/JSON for the Namespace kind. The
//! default namespace literal is `default`.

use crate::entities::Namespace;
use crate::validation::ValidationResult;
use ctlplane_core::error::{CoreError, CoreResult};
use ctlplane_core::{EntityId, InMemoryStore, Metadata, Store, Validators};
use dashmap::DashMap;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_NAMESPACE: &str = "default";

pub struct NamespaceManager {
    validators: Arc<Validators>,
    store: InMemoryStore<EntityId, Namespace>,
    by_variant_name: DashMap<(Uuid, String), EntityId>,
}

impl NamespaceManager {
    pub fn new(validators: Arc<Validators>) -> Self {
        Self { validators, store: InMemoryStore::new("Namespace"), by_variant_name: DashMap::new() }
    }

    fn validate(&self, metadata: &Metadata) -> ValidationResult {
        let mut result = ValidationResult::success();
        result.extend(self.validators.validate_resource_name(&metadata.name));
        result
    }

    pub async fn create(&self, variant_id: Uuid, metadata: Metadata, api_version: &str) -> CoreResult<Namespace> {
        let validation = self.validate(&metadata);
        if !validation.is_valid() {
            return Err(CoreError::InvalidSchema(validation.errors));
        }
        let key = (variant_id, metadata.name.clone());
        if self.by_variant_name.contains_key(&key) {
            return Err(CoreError::already_exists("Namespace", metadata.name.clone()));
        }
        let version = self
            .validators
            .validate_version(api_version)
            .map_err(|issue| CoreError::InvalidVersion(issue.message))?;
        let namespace = Namespace { id: Uuid::new_v4(), variant_id, api_version: version, metadata };
        self.store.save(EntityId(namespace.id), namespace.clone()).await?;
        self.by_variant_name.insert(key, EntityId(namespace.id));
        Ok(namespace)
    }

    pub async fn get(&self, variant_id: Uuid, name: &str) -> CoreResult<Namespace> {
        let id = self
            .by_variant_name
            .get(&(variant_id, name.to_string()))
            .map(|e| *e.value())
            .ok_or_else(|| CoreError::not_found("Namespace", name))?;
        self.store.load(&id).await
    }

    pub async fn delete(&self, variant_id: Uuid, name: &str) -> CoreResult<()> {
        let key = (variant_id, name.to_string());
        if let Some((_, id)) = self.by_variant_name.remove(&key) {
            self.store.delete(&id).await?;
        }
        Ok(())
    }

    pub async fn list_for_variant(&self, variant_id: Uuid) -> CoreResult<Vec<Namespace>> {
        let all = self.store.list().await?;
        Ok(all.into_iter().filter(|n| n.variant_id == variant_id).collect())
    }

    pub fn to_json(namespace: &Namespace) -> serde_json::Value {
        json!({
            "apiVersion": namespace.api_version.to_string(),
            "kind": "Namespace",
            "metadata": namespace.metadata,
            "spec": {},
        })
    }
}
