//! Catalog, Variant, Namespace, Resource, and View entity managers: the
//! canonical data model atop `ctlplane-core`'s `Store`/`ObjectStore`.

pub mod catalog_manager;
pub mod entities;
pub mod namespace_manager;
pub mod resource_manager;
pub mod validation;
pub mod variant_manager;
pub mod view_manager;

pub use catalog_manager::CatalogManager;
pub use entities::{Catalog, Envelope, Namespace, Resource, ResourceSpec, Variant, View, ViewSpec};
pub use namespace_manager::{NamespaceManager, DEFAULT_NAMESPACE};
pub use resource_manager::ResourceManager;
pub use validation::ValidationResult;
pub use variant_manager::VariantManager;
pub use view_manager::ViewManager;
