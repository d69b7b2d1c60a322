//! `VariantManager`: Load/Save/Delete/JSON for the Variant kind. A Variant
//! owns a `ResourceDirectory` and `SkillsetDirectory` — opaque ids used to
//! namespace content-addressed objects.

use crate::entities::Variant;
use crate::validation::ValidationResult;
use ctlplane_core::error::{CoreError, CoreResult};
use ctlplane_core::{EntityId, InMemoryStore, Metadata, RequestContext, Store, Validators};
use dashmap::DashMap;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

pub struct VariantManager {
    validators: Arc<Validators>,
    store: InMemoryStore<EntityId, Variant>,
    by_catalog_name: DashMap<(Uuid, String), EntityId>,
}

impl VariantManager {
    pub fn new(validators: Arc<Validators>) -> Self {
        Self { validators, store: InMemoryStore::new("Variant"), by_catalog_name: DashMap::new() }
    }

    fn validate(&self, metadata: &Metadata) -> ValidationResult {
        let mut result = ValidationResult::success();
        result.extend(self.validators.validate_resource_name(&metadata.name));
        result
    }

    pub async fn create(&self, catalog_id: Uuid, metadata: Metadata, api_version: &str) -> CoreResult<Variant> {
        let validation = self.validate(&metadata);
        if !validation.is_valid() {
            return Err(CoreError::InvalidSchema(validation.errors));
        }
        let key = (catalog_id, metadata.name.clone());
        if self.by_catalog_name.contains_key(&key) {
            return Err(CoreError::already_exists("Variant", metadata.name.clone()));
        }
        let version = self
            .validators
            .validate_version(api_version)
            .map_err(|issue| CoreError::InvalidVersion(issue.message))?;
        let variant = Variant {
            id: Uuid::new_v4(),
            catalog_id,
            api_version: version,
            metadata,
            resource_directory_id: Uuid::new_v4(),
            skillset_directory_id: Uuid::new_v4(),
        };
        self.store.save(EntityId(variant.id), variant.clone()).await?;
        self.by_catalog_name.insert(key, EntityId(variant.id));
        Ok(variant)
    }

    pub async fn get(&self, catalog_id: Uuid, name: &str) -> CoreResult<Variant> {
        let id = self
            .by_catalog_name
            .get(&(catalog_id, name.to_string()))
            .map(|e| *e.value())
            .ok_or_else(|| CoreError::not_found("Variant", name))?;
        self.store.load(&id).await
    }

    /// Cascade delete: removing a Catalog removes its Variants (the caller
    /// is responsible for cascading further into Namespaces/directories).
    pub async fn delete(&self, catalog_id: Uuid, name: &str) -> CoreResult<()> {
        let key = (catalog_id, name.to_string());
        if let Some((_, id)) = self.by_catalog_name.remove(&key) {
            self.store.delete(&id).await?;
        }
        Ok(())
    }

    pub async fn list_for_catalog(&self, catalog_id: Uuid) -> CoreResult<Vec<Variant>> {
        let all = self.store.list().await?;
        Ok(all.into_iter().filter(|v| v.catalog_id == catalog_id).collect())
    }

    pub fn to_json(variant: &Variant) -> serde_json::Value {
        json!({
            "apiVersion": variant.api_version.to_string(),
            "kind": "Variant",
            "metadata": variant.metadata,
            "spec": {},
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &str) -> Metadata {
        Metadata { name: name.to_string(), catalog: "acme".into(), ..Default::default() }
    }

    #[tokio::test]
    async fn create_get_delete_cycle() {
        let mgr = VariantManager::new(Arc::new(Validators::new()));
        let catalog_id = Uuid::new_v4();
        let created = mgr.create(catalog_id, meta("dev"), "0.1.0-alpha.1").await.unwrap();
        assert_eq!(mgr.get(catalog_id, "dev").await.unwrap().id, created.id);
        mgr.delete(catalog_id, "dev").await.unwrap();
        assert!(mgr.get(catalog_id, "dev").await.is_err());
    }

    #[tokio::test]
    async fn duplicate_within_same_catalog_conflicts() {
        let mgr = VariantManager::new(Arc::new(Validators::new()));
        let catalog_id = Uuid::new_v4();
        mgr.create(catalog_id, meta("dev"), "0.1.0-alpha.1").await.unwrap();
        assert!(mgr.create(catalog_id, meta("dev"), "0.1.0-alpha.1").await.is_err());
    }

    #[tokio::test]
    async fn same_name_allowed_across_catalogs() {
        let mgr = VariantManager::new(Arc::new(Validators::new()));
        mgr.create(Uuid::new_v4(), meta("dev"), "0.1.0-alpha.1").await.unwrap();
        assert!(mgr.create(Uuid::new_v4(), meta("dev"), "0.1.0-alpha.1").await.is_ok());
    }
}
