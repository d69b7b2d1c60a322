//! The five catalog entity kinds and their declarative envelope.

use ctlplane_core::{ApiVersion, Metadata, ObjectHash};
use ctlplane_policy::ViewDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// The `{apiVersion, kind, metadata, spec}` declarative envelope every
/// entity round-trips through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<S> {
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    pub spec: S,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSpec {}

#[derive(Debug, Clone)]
pub struct Catalog {
    pub id: Uuid,
    pub api_version: ApiVersion,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantSpec {}

#[derive(Debug, Clone)]
pub struct Variant {
    pub id: Uuid,
    pub catalog_id: Uuid,
    pub api_version: ApiVersion,
    pub metadata: Metadata,
    pub resource_directory_id: Uuid,
    pub skillset_directory_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamespaceSpec {}

#[derive(Debug, Clone)]
pub struct Namespace {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub api_version: ApiVersion,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub schema: serde_json::Value,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct Resource {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub api_version: ApiVersion,
    pub metadata: Metadata,
    pub spec: ResourceSpec,
    pub hash: Option<ObjectHash>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewSpec {
    #[serde(flatten)]
    pub definition: ViewDefinition,
}

#[derive(Debug, Clone)]
pub struct View {
    pub id: Uuid,
    pub api_version: ApiVersion,
    pub metadata: Metadata,
    pub definition: ViewDefinition,
}
