//! `ViewManager`: Load/Save/Delete/JSON for the View kind, plus
//! derived-view validation against a parent.

use crate::entities::View;
use crate::validation::ValidationResult;
use ctlplane_core::error::{CoreError, CoreResult};
use ctlplane_core::{EntityId, InMemoryStore, Metadata, Store, Validators};
use ctlplane_policy::{validate_derived_view, ViewDefinition};
use dashmap::DashMap;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

pub struct ViewManager {
    validators: Arc<Validators>,
    store: InMemoryStore<EntityId, View>,
    by_catalog_name: DashMap<(String, String), EntityId>,
}

impl ViewManager {
    pub fn new(validators: Arc<Validators>) -> Self {
        Self { validators, store: InMemoryStore::new("View"), by_catalog_name: DashMap::new() }
    }

    fn validate_metadata(&self, metadata: &Metadata) -> ValidationResult {
        let mut result = ValidationResult::success();
        result.extend(self.validators.validate_resource_name(&metadata.name));
        result
    }

    pub async fn create(
        &self,
        catalog: &str,
        metadata: Metadata,
        definition: ViewDefinition,
        api_version: &str,
        parent: Option<&ViewDefinition>,
    ) -> CoreResult<View> {
        let validation = self.validate_metadata(&metadata);
        if !validation.is_valid() {
            return Err(CoreError::InvalidSchema(validation.errors));
        }
        if let Some(parent) = parent {
            validate_derived_view(&definition, parent)?;
        }
        let key = (catalog.to_string(), metadata.name.clone());
        if self.by_catalog_name.contains_key(&key) {
            return Err(CoreError::already_exists("View", metadata.name.clone()));
        }
        let version = self
            .validators
            .validate_version(api_version)
            .map_err(|issue| CoreError::InvalidVersion(issue.message))?;
        let view = View { id: Uuid::new_v4(), api_version: version, metadata, definition };
        self.store.save(EntityId(view.id), view.clone()).await?;
        self.by_catalog_name.insert(key, EntityId(view.id));
        Ok(view)
    }

    pub async fn get(&self, catalog: &str, name: &str) -> CoreResult<View> {
        let id = self
            .by_catalog_name
            .get(&(catalog.to_string(), name.to_string()))
            .map(|e| *e.value())
            .ok_or_else(|| CoreError::not_found("View", name))?;
        self.store.load(&id).await
    }

    pub async fn delete(&self, catalog: &str, name: &str) -> CoreResult<()> {
        let key = (catalog.to_string(), name.to_string());
        if let Some((_, id)) = self.by_catalog_name.remove(&key) {
            self.store.delete(&id).await?;
        }
        Ok(())
    }

    pub async fn list(&self, catalog: &str) -> CoreResult<Vec<View>> {
        let all = self.store.list().await?;
        Ok(all
            .into_iter()
            .filter(|v| v.metadata.catalog == catalog)
            .collect())
    }

    pub fn to_json(view: &View) -> serde_json::Value {
        json!({
            "apiVersion": view.api_version.to_string(),
            "kind": "View",
            "metadata": view.metadata,
            "spec": view.definition,
        })
    }
}
