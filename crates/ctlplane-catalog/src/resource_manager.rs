//! `ResourceManager`: validates a Resource's `value` against its `schema`,
//! then stores the spec as a content-addressed blob via `ObjectStore`.

use crate::entities::{Resource, ResourceSpec};
use crate::validation::ValidationResult;
use ctlplane_core::error::{CoreError, CoreResult};
use ctlplane_core::objectstore::{ObjectStore, ObjectType, StoredObject};
use ctlplane_core::{EntityId, InMemoryStore, Metadata, Store, Validators};
use dashmap::DashMap;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

pub struct ResourceManager {
    validators: Arc<Validators>,
    object_store: Arc<dyn ObjectStore>,
    store: InMemoryStore<EntityId, Resource>,
    by_variant_path: DashMap<(Uuid, String), EntityId>,
}

impl ResourceManager {
    pub fn new(validators: Arc<Validators>, object_store: Arc<dyn ObjectStore>) -> Self {
        Self {
            validators,
            object_store,
            store: InMemoryStore::new("Resource"),
            by_variant_path: DashMap::new(),
        }
    }

    fn validate_metadata(&self, metadata: &Metadata) -> ValidationResult {
        let mut result = ValidationResult::success();
        result.extend(self.validators.validate_resource_name(&metadata.name));
        result
    }

    /// Invariant: `value` validates against `schema` (or is null when the
    /// schema permits).
    fn validate_spec(&self, spec: &ResourceSpec) -> CoreResult<()> {
        let issues = self
            .validators
            .validate_instance(&spec.schema, &spec.value)
            .map_err(|issue| CoreError::InvalidSchema(vec![issue]))?;
        if !issues.is_empty() {
            return Err(CoreError::InvalidResourceValue(issues));
        }
        Ok(())
    }

    pub async fn create(
        &self,
        catalog: &str,
        variant_id: Uuid,
        metadata: Metadata,
        spec: ResourceSpec,
        api_version: &str,
    ) -> CoreResult<Resource> {
        let validation = self.validate_metadata(&metadata);
        if !validation.is_valid() {
            return Err(CoreError::InvalidSchema(validation.errors));
        }
        self.validate_spec(&spec)?;

        let path = metadata.storage_path();
        let key = (variant_id, path.clone());
        if self.by_variant_path.contains_key(&key) {
            return Err(CoreError::already_exists("Resource", path));
        }
        let version = self
            .validators
            .validate_version(api_version)
            .map_err(|issue| CoreError::InvalidVersion(issue.message))?;

        let stored = StoredObject {
            version: api_version.to_string(),
            object_type: ObjectType::Resource,
            description: metadata.description.clone(),
            spec: json!({"schema": spec.schema, "value": spec.value, "annotations": spec.annotations}),
            catalog: catalog.to_string(),
        };
        let hash = self.object_store.put(stored).await?;

        let resource = Resource { id: Uuid::new_v4(), variant_id, api_version: version, metadata, spec, hash: Some(hash) };
        self.store.save(EntityId(resource.id), resource.clone()).await?;
        self.by_variant_path.insert(key, EntityId(resource.id));
        Ok(resource)
    }

    pub async fn get(&self, variant_id: Uuid, path: &str) -> CoreResult<Resource> {
        let id = self
            .by_variant_path
            .get(&(variant_id, path.to_string()))
            .map(|e| *e.value())
            .ok_or_else(|| CoreError::not_found("Resource", path))?;
        self.store.load(&id).await
    }

    pub async fn update(&self, variant_id: Uuid, path: &str, value: serde_json::Value) -> CoreResult<Resource> {
        let mut resource = self.get(variant_id, path).await?;
        resource.spec.value = value;
        self.validate_spec(&resource.spec)?;

        let stored = StoredObject {
            version: resource.api_version.to_string(),
            object_type: ObjectType::Resource,
            description: resource.metadata.description.clone(),
            spec: json!({"schema": resource.spec.schema, "value": resource.spec.value, "annotations": resource.spec.annotations}),
            catalog: resource.metadata.catalog.clone(),
        };
        let hash = self.object_store.put(stored).await?;
        resource.hash = Some(hash);

        self.store.save(EntityId(resource.id), resource.clone()).await?;
        Ok(resource)
    }

    pub async fn delete(&self, catalog: &str, variant_id: Uuid, path: &str) -> CoreResult<()> {
        let _ = catalog;
        let key = (variant_id, path.to_string());
        if let Some((_, id)) = self.by_variant_path.remove(&key) {
            self.store.delete(&id).await?;
        }
        Ok(())
    }

    pub async fn list_for_variant(&self, variant_id: Uuid) -> CoreResult<Vec<Resource>> {
        let all = self.store.list().await?;
        Ok(all.into_iter().filter(|r| r.variant_id == variant_id).collect())
    }

    pub fn to_json(resource: &Resource) -> serde_json::Value {
        json!({
            "apiVersion": resource.api_version.to_string(),
            "kind": "Resource",
            "metadata": resource.metadata,
            "spec": {
                "schema": resource.spec.schema,
                "value": resource.spec.value,
                "annotations": resource.spec.annotations,
            },
        })
    }
}
