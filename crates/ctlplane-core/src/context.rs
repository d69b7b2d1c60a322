//! `RequestContext`: the explicit, per-call context threaded through every
//! operation instead of goroutine-local/thread-local state (design notes
//! §9).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub tenant: String,
    pub project: String,
    pub catalog: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub user_id: String,
}

impl RequestContext {
    pub fn new(tenant: impl Into<String>, project: impl Into<String>, catalog: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            project: project.into(),
            catalog: catalog.into(),
            catalog_id: None,
            variant: None,
            variant_id: None,
            namespace: None,
            user_id: user_id.into(),
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}
