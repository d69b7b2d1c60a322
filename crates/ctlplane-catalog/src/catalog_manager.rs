//! `CatalogManager`: Load/Save/Delete/JSON for the Catalog kind.

use crate::entities::Catalog;
use crate::validation::ValidationResult;
use ctlplane_core::error::{CoreError, CoreResult};
use ctlplane_core::{EntityId, InMemoryStore, Metadata, RequestContext, Store, Validators};
use dashmap::DashMap;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

pub struct CatalogManager {
    validators: Arc<Validators>,
    store: InMemoryStore<EntityId, Catalog>,
    by_project_name: DashMap<(String, String), EntityId>,
}

impl CatalogManager {
    pub fn new(validators: Arc<Validators>) -> Self {
        Self { validators, store: InMemoryStore::new("Catalog"), by_project_name: DashMap::new() }
    }

    pub fn validate(&self, metadata: &Metadata) -> ValidationResult {
        let mut result = ValidationResult::success();
        result.extend(self.validators.validate_resource_name(&metadata.name));
        result
    }

    pub async fn create(&self, ctx: &RequestContext, metadata: Metadata, api_version: &str) -> CoreResult<Catalog> {
        let validation = self.validate(&metadata);
        if !validation.is_valid() {
            return Err(CoreError::InvalidSchema(validation.errors));
        }
        let key = (ctx.project.clone(), metadata.name.clone());
        if self.by_project_name.contains_key(&key) {
            return Err(CoreError::already_exists("Catalog", metadata.name.clone()));
        }
        let version = self
            .validators
            .validate_version(api_version)
            .map_err(|issue| CoreError::InvalidVersion(issue.message))?;
        let catalog = Catalog { id: Uuid::new_v4(), api_version: version, metadata };
        self.store.save(EntityId(catalog.id), catalog.clone()).await?;
        self.by_project_name.insert(key, EntityId(catalog.id));
        Ok(catalog)
    }

    pub async fn get(&self, ctx: &RequestContext, name: &str) -> CoreResult<Catalog> {
        let id = self
            .by_project_name
            .get(&(ctx.project.clone(), name.to_string()))
            .map(|e| *e.value())
            .ok_or_else(|| CoreError::not_found("Catalog", name))?;
        self.store.load(&id).await
    }

    pub async fn update(&self, ctx: &RequestContext, name: &str, description: String) -> CoreResult<Catalog> {
        let mut catalog = self.get(ctx, name).await?;
        catalog.metadata.description = description;
        self.store.save(EntityId(catalog.id), catalog.clone()).await?;
        Ok(catalog)
    }

    pub async fn delete(&self, ctx: &RequestContext, name: &str) -> CoreResult<()> {
        let key = (ctx.project.clone(), name.to_string());
        if let Some((_, id)) = self.by_project_name.remove(&key) {
            self.store.delete(&id).await?;
        }
        // Idempotent: deleting an already-absent catalog is a soft success.
        Ok(())
    }

    pub async fn list(&self, _ctx: &RequestContext) -> CoreResult<Vec<Catalog>> {
        self.store.list().await
    }

    pub fn to_json(catalog: &Catalog) -> serde_json::Value {
        json!({
            "apiVersion": catalog.api_version.to_string(),
            "kind": "Catalog",
            "metadata": catalog.metadata,
            "spec": {},
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RequestContext {
        RequestContext::new("tenant-a", "proj-a", "unused", "user-1")
    }

    fn meta(name: &str) -> Metadata {
        Metadata { name: name.to_string(), catalog: name.to_string(), ..Default::default() }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let mgr = CatalogManager::new(Arc::new(Validators::new()));
        let created = mgr.create(&ctx(), meta("valid-catalog"), "0.1.0-alpha.1").await.unwrap();
        let fetched = mgr.get(&ctx(), "valid-catalog").await.unwrap();
        assert_eq!(created.id, fetched.id);
    }

    #[tokio::test]
    async fn duplicate_create_conflicts() {
        let mgr = CatalogManager::new(Arc::new(Validators::new()));
        mgr.create(&ctx(), meta("dup"), "0.1.0-alpha.1").await.unwrap();
        let err = mgr.create(&ctx(), meta("dup"), "0.1.0-alpha.1").await.unwrap_err();
        assert_eq!(err.kind(), ctlplane_core::error::ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let mgr = CatalogManager::new(Arc::new(Validators::new()));
        mgr.create(&ctx(), meta("to-delete"), "0.1.0-alpha.1").await.unwrap();
        mgr.delete(&ctx(), "to-delete").await.unwrap();
        assert!(mgr.delete(&ctx(), "to-delete").await.is_ok());
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let mgr = CatalogManager::new(Arc::new(Validators::new()));
        let err = mgr.get(&ctx(), "nope").await.unwrap_err();
        assert_eq!(err.kind(), ctlplane_core::error::ErrorKind::NotFound);
    }
}
