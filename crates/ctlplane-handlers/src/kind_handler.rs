//! `KindHandler`: a tagged-variant dispatch table keyed by `Kind`, not a
//! class hierarchy. Each variant wraps its own manager and owns its own
//! envelope parsing; the registry just matches on `Kind` and forwards.

use async_trait::async_trait;
use ctlplane_catalog::{
    CatalogManager, NamespaceManager, ResourceManager, ResourceSpec, VariantManager, ViewManager,
};
use ctlplane_core::error::{CoreError, CoreResult, ErrorKind};
use ctlplane_core::{Kind, Metadata, RequestContext};
use ctlplane_policy::ViewDefinition;
use ctlplane_skillset::{SkillSet, SkillSetManager};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// HTTP status code for an error, delegating to the taxonomy's own mapping.
pub fn status_code(err: &CoreError) -> u16 {
    err.kind().http_status()
}

fn missing(field: &str) -> CoreError {
    CoreError::InvalidObject(format!("request context missing {field}"))
}

fn require_catalog_id(ctx: &RequestContext) -> CoreResult<Uuid> {
    ctx.catalog_id.ok_or_else(|| missing("catalogID"))
}

fn require_variant_id(ctx: &RequestContext) -> CoreResult<Uuid> {
    ctx.variant_id.ok_or_else(|| missing("variantID"))
}

fn parse_envelope(body: &Value) -> CoreResult<(String, Metadata)> {
    let api_version = body
        .get("apiVersion")
        .and_then(Value::as_str)
        .ok_or_else(|| CoreError::InvalidObject("missing apiVersion".into()))?
        .to_string();
    let metadata: Metadata = serde_json::from_value(body.get("metadata").cloned().unwrap_or(Value::Null))
        .map_err(|e| CoreError::InvalidObject(format!("invalid metadata: {e}")))?;
    Ok((api_version, metadata))
}

fn parse_spec<S: serde::de::DeserializeOwned>(body: &Value) -> CoreResult<S> {
    serde_json::from_value(body.get("spec").cloned().unwrap_or(Value::Null))
        .map_err(|e| CoreError::InvalidObject(format!("invalid spec: {e}")))
}

/// The five-operation surface every entity kind exposes: `ErrorKind` drives
/// the HTTP status, the handler never does.
#[async_trait]
pub trait KindHandler: Send + Sync {
    async fn create(&self, ctx: &RequestContext, body: Value) -> CoreResult<Value>;
    async fn get(&self, ctx: &RequestContext, name: &str) -> CoreResult<Value>;
    async fn update(&self, ctx: &RequestContext, name: &str, body: Value) -> CoreResult<Value>;
    async fn delete(&self, ctx: &RequestContext, name: &str) -> CoreResult<()>;
    async fn list(&self, ctx: &RequestContext) -> CoreResult<Value>;
}

pub struct CatalogHandler {
    manager: Arc<CatalogManager>,
}

impl CatalogHandler {
    pub fn new(manager: Arc<CatalogManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl KindHandler for CatalogHandler {
    async fn create(&self, ctx: &RequestContext, body: Value) -> CoreResult<Value> {
        let (api_version, metadata) = parse_envelope(&body)?;
        let catalog = self.manager.create(ctx, metadata, &api_version).await?;
        Ok(CatalogManager::to_json(&catalog))
    }

    async fn get(&self, ctx: &RequestContext, name: &str) -> CoreResult<Value> {
        Ok(CatalogManager::to_json(&self.manager.get(ctx, name).await?))
    }

    async fn update(&self, ctx: &RequestContext, name: &str, body: Value) -> CoreResult<Value> {
        let description = body.get("description").and_then(Value::as_str).unwrap_or_default().to_string();
        let catalog = self.manager.update(ctx, name, description).await?;
        Ok(CatalogManager::to_json(&catalog))
    }

    async fn delete(&self, ctx: &RequestContext, name: &str) -> CoreResult<()> {
        self.manager.delete(ctx, name).await
    }

    async fn list(&self, ctx: &RequestContext) -> CoreResult<Value> {
        let catalogs = self.manager.list(ctx).await?;
        Ok(Value::Array(catalogs.iter().map(CatalogManager::to_json).collect()))
    }
}

pub struct VariantHandler {
    manager: Arc<VariantManager>,
}

impl VariantHandler {
    pub fn new(manager: Arc<VariantManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl KindHandler for VariantHandler {
    async fn create(&self, ctx: &RequestContext, body: Value) -> CoreResult<Value> {
        let (api_version, metadata) = parse_envelope(&body)?;
        let catalog_id = require_catalog_id(ctx)?;
        let variant = self.manager.create(catalog_id, metadata, &api_version).await?;
        Ok(VariantManager::to_json(&variant))
    }

    async fn get(&self, ctx: &RequestContext, name: &str) -> CoreResult<Value> {
        let catalog_id = require_catalog_id(ctx)?;
        Ok(VariantManager::to_json(&self.manager.get(catalog_id, name).await?))
    }

    async fn update(&self, _ctx: &RequestContext, _name: &str, _body: Value) -> CoreResult<Value> {
        Err(CoreError::UnableToUpdate(
            "Variant has no mutable fields; delete and recreate".into(),
        ))
    }

    async fn delete(&self, ctx: &RequestContext, name: &str) -> CoreResult<()> {
        let catalog_id = require_catalog_id(ctx)?;
        self.manager.delete(catalog_id, name).await
    }

    async fn list(&self, ctx: &RequestContext) -> CoreResult<Value> {
        let catalog_id = require_catalog_id(ctx)?;
        let variants = self.manager.list_for_catalog(catalog_id).await?;
        Ok(Value::Array(variants.iter().map(VariantManager::to_json).collect()))
    }
}

pub struct NamespaceHandler {
    manager: Arc<NamespaceManager>,
}

impl NamespaceHandler {
    pub fn new(manager: Arc<NamespaceManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl KindHandler for NamespaceHandler {
    async fn create(&self, ctx: &RequestContext, body: Value) -> CoreResult<Value> {
        let (api_version, metadata) = parse_envelope(&body)?;
        let variant_id = require_variant_id(ctx)?;
        let namespace = self.manager.create(variant_id, metadata, &api_version).await?;
        Ok(NamespaceManager::to_json(&namespace))
    }

    async fn get(&self, ctx: &RequestContext, name: &str) -> CoreResult<Value> {
        let variant_id = require_variant_id(ctx)?;
        Ok(NamespaceManager::to_json(&self.manager.get(variant_id, name).await?))
    }

    async fn update(&self, _ctx: &RequestContext, _name: &str, _body: Value) -> CoreResult<Value> {
        Err(CoreError::UnableToUpdate(
            "Namespace has no mutable fields; delete and recreate".into(),
        ))
    }

    async fn delete(&self, ctx: &RequestContext, name: &str) -> CoreResult<()> {
        let variant_id = require_variant_id(ctx)?;
        self.manager.delete(variant_id, name).await
    }

    async fn list(&self, ctx: &RequestContext) -> CoreResult<Value> {
        let variant_id = require_variant_id(ctx)?;
        let namespaces = self.manager.list_for_variant(variant_id).await?;
        Ok(Value::Array(namespaces.iter().map(NamespaceManager::to_json).collect()))
    }
}

pub struct ResourceHandler {
    manager: Arc<ResourceManager>,
}

impl ResourceHandler {
    pub fn new(manager: Arc<ResourceManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl KindHandler for ResourceHandler {
    async fn create(&self, ctx: &RequestContext, body: Value) -> CoreResult<Value> {
        let (api_version, metadata) = parse_envelope(&body)?;
        let spec: ResourceSpec = parse_spec(&body)?;
        let variant_id = require_variant_id(ctx)?;
        let resource = self
            .manager
            .create(&ctx.catalog, variant_id, metadata, spec, &api_version)
            .await?;
        Ok(ResourceManager::to_json(&resource))
    }

    async fn get(&self, ctx: &RequestContext, name: &str) -> CoreResult<Value> {
        let variant_id = require_variant_id(ctx)?;
        Ok(ResourceManager::to_json(&self.manager.get(variant_id, name).await?))
    }

    async fn update(&self, ctx: &RequestContext, name: &str, body: Value) -> CoreResult<Value> {
        let variant_id = require_variant_id(ctx)?;
        let value = body
            .get("value")
            .cloned()
            .ok_or_else(|| CoreError::InvalidObject("missing value".into()))?;
        let resource = self.manager.update(variant_id, name, value).await?;
        Ok(ResourceManager::to_json(&resource))
    }

    async fn delete(&self, ctx: &RequestContext, name: &str) -> CoreResult<()> {
        let variant_id = require_variant_id(ctx)?;
        self.manager.delete(&ctx.catalog, variant_id, name).await
    }

    async fn list(&self, ctx: &RequestContext) -> CoreResult<Value> {
        let variant_id = require_variant_id(ctx)?;
        let resources = self.manager.list_for_variant(variant_id).await?;
        Ok(Value::Array(resources.iter().map(ResourceManager::to_json).collect()))
    }
}

pub struct SkillSetHandler {
    manager: Arc<SkillSetManager>,
}

impl SkillSetHandler {
    pub fn new(manager: Arc<SkillSetManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl KindHandler for SkillSetHandler {
    async fn create(&self, _ctx: &RequestContext, body: Value) -> CoreResult<Value> {
        let (_, metadata) = parse_envelope(&body)?;
        let skillset: SkillSet = parse_spec(&body)?;
        let path = metadata.storage_path();
        self.manager.create(path.clone(), skillset).await?;
        self.manager.get_json(&path).await
    }

    async fn get(&self, _ctx: &RequestContext, name: &str) -> CoreResult<Value> {
        self.manager.get_json(name).await
    }

    async fn update(&self, _ctx: &RequestContext, name: &str, body: Value) -> CoreResult<Value> {
        let skillset: SkillSet = parse_spec(&body)?;
        self.manager.delete(name).await?;
        self.manager.create(name.to_string(), skillset).await?;
        self.manager.get_json(name).await
    }

    async fn delete(&self, _ctx: &RequestContext, name: &str) -> CoreResult<()> {
        self.manager.delete(name).await
    }

    async fn list(&self, _ctx: &RequestContext) -> CoreResult<Value> {
        let mut out = Vec::new();
        for path in self.manager.paths() {
            out.push(self.manager.get_json(&path).await?);
        }
        Ok(Value::Array(out))
    }
}

pub struct ViewHandler {
    manager: Arc<ViewManager>,
}

impl ViewHandler {
    pub fn new(manager: Arc<ViewManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl KindHandler for ViewHandler {
    async fn create(&self, ctx: &RequestContext, body: Value) -> CoreResult<Value> {
        let (api_version, metadata) = parse_envelope(&body)?;
        let definition: ViewDefinition = parse_spec(&body)?;
        let parent_definition = match body.get("parentView").and_then(Value::as_str) {
            Some(parent_name) => Some(self.manager.get(&ctx.catalog, parent_name).await?.definition),
            None => None,
        };
        let view = self
            .manager
            .create(&ctx.catalog, metadata, definition, &api_version, parent_definition.as_ref())
            .await?;
        Ok(ViewManager::to_json(&view))
    }

    async fn get(&self, ctx: &RequestContext, name: &str) -> CoreResult<Value> {
        Ok(ViewManager::to_json(&self.manager.get(&ctx.catalog, name).await?))
    }

    async fn update(&self, ctx: &RequestContext, name: &str, body: Value) -> CoreResult<Value> {
        let definition: ViewDefinition = parse_spec(&body)?;
        let api_version = body.get("apiVersion").and_then(Value::as_str).unwrap_or("0.1.0-alpha.1").to_string();
        self.manager.delete(&ctx.catalog, name).await?;
        let metadata = Metadata { name: name.to_string(), catalog: ctx.catalog.clone(), ..Default::default() };
        let view = self.manager.create(&ctx.catalog, metadata, definition, &api_version, None).await?;
        Ok(ViewManager::to_json(&view))
    }

    async fn delete(&self, ctx: &RequestContext, name: &str) -> CoreResult<()> {
        self.manager.delete(&ctx.catalog, name).await
    }

    async fn list(&self, ctx: &RequestContext) -> CoreResult<Value> {
        let views = self.manager.list(&ctx.catalog).await?;
        Ok(Value::Array(views.iter().map(ViewManager::to_json).collect()))
    }
}

/// Dispatch table keyed by `Kind`; the only place that knows all six exist.
pub struct HandlerRegistry {
    catalogs: Arc<CatalogHandler>,
    variants: Arc<VariantHandler>,
    namespaces: Arc<NamespaceHandler>,
    resources: Arc<ResourceHandler>,
    skillsets: Arc<SkillSetHandler>,
    views: Arc<ViewHandler>,
}

impl HandlerRegistry {
    pub fn new(
        catalogs: Arc<CatalogManager>,
        variants: Arc<VariantManager>,
        namespaces: Arc<NamespaceManager>,
        resources: Arc<ResourceManager>,
        skillsets: Arc<SkillSetManager>,
        views: Arc<ViewManager>,
    ) -> Self {
        Self {
            catalogs: Arc::new(CatalogHandler::new(catalogs)),
            variants: Arc::new(VariantHandler::new(variants)),
            namespaces: Arc::new(NamespaceHandler::new(namespaces)),
            resources: Arc::new(ResourceHandler::new(resources)),
            skillsets: Arc::new(SkillSetHandler::new(skillsets)),
            views: Arc::new(ViewHandler::new(views)),
        }
    }

    pub fn for_kind(&self, kind: Kind) -> Arc<dyn KindHandler> {
        match kind {
            Kind::Catalog => self.catalogs.clone(),
            Kind::Variant => self.variants.clone(),
            Kind::Namespace => self.namespaces.clone(),
            Kind::Resource => self.resources.clone(),
            Kind::SkillSet => self.skillsets.clone(),
            Kind::View => self.views.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctlplane_core::Validators;
    use ctlplane_skillset::SyntacticTransformValidator;
    use serde_json::json;

    fn ctx() -> RequestContext {
        RequestContext::new("tenant-a", "proj-a", "acme", "user-1")
    }

    fn registry() -> HandlerRegistry {
        let validators = Arc::new(Validators::new());
        HandlerRegistry::new(
            Arc::new(CatalogManager::new(validators.clone())),
            Arc::new(VariantManager::new(validators.clone())),
            Arc::new(NamespaceManager::new(validators.clone())),
            Arc::new(ResourceManager::new(validators.clone(), ctlplane_core::InMemoryObjectStore::arc())),
            Arc::new(SkillSetManager::new(validators.clone(), Arc::new(SyntacticTransformValidator))),
            Arc::new(ViewManager::new(validators)),
        )
    }

    #[tokio::test]
    async fn catalog_create_get_list_delete_round_trips() {
        let registry = registry();
        let handler = registry.for_kind(Kind::Catalog);
        let body = json!({"apiVersion": "0.1.0-alpha.1", "metadata": {"name": "acme", "catalog": "acme"}});
        let created = handler.create(&ctx(), body).await.unwrap();
        assert_eq!(created["metadata"]["name"], "acme");

        let fetched = handler.get(&ctx(), "acme").await.unwrap();
        assert_eq!(fetched["metadata"]["name"], "acme");

        let listed = handler.list(&ctx()).await.unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);

        handler.delete(&ctx(), "acme").await.unwrap();
        assert!(handler.get(&ctx(), "acme").await.is_err());
    }

    #[tokio::test]
    async fn duplicate_catalog_create_maps_to_409() {
        let registry = registry();
        let handler = registry.for_kind(Kind::Catalog);
        let body = json!({"apiVersion": "0.1.0-alpha.1", "metadata": {"name": "dup", "catalog": "dup"}});
        handler.create(&ctx(), body.clone()).await.unwrap();
        let err = handler.create(&ctx(), body).await.unwrap_err();
        assert_eq!(status_code(&err), 409);
    }

    #[tokio::test]
    async fn variant_requires_catalog_id_in_context() {
        let registry = registry();
        let handler = registry.for_kind(Kind::Variant);
        let body = json!({"apiVersion": "0.1.0-alpha.1", "metadata": {"name": "dev", "catalog": "acme"}});
        let err = handler.create(&ctx(), body).await.unwrap_err();
        assert_eq!(status_code(&err), 400);
    }

    #[tokio::test]
    async fn skillset_create_get_list_round_trips() {
        let registry = registry();
        let handler = registry.for_kind(Kind::SkillSet);
        let body = json!({
            "apiVersion": "0.1.0-alpha.1",
            "metadata": {"name": "ops-set", "catalog": "acme", "namespace": "default"},
            "spec": {"sources": [], "context": [], "skills": [], "dependencies": []},
        });
        handler.create(&ctx(), body).await.unwrap();
        let listed = handler.list(&ctx()).await.unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }
}
