//! Kind-keyed CRUD dispatch: a plain trait plus a match-based table, keyed
//! by `ctlplane_core::Kind`, fronting the per-kind managers in
//! `ctlplane-catalog` and `ctlplane-skillset`.

pub mod kind_handler;

pub use kind_handler::{
    status_code, CatalogHandler, HandlerRegistry, KindHandler, NamespaceHandler, ResourceHandler,
    SkillSetHandler, VariantHandler, ViewHandler,
};
