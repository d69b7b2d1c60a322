//! Schema validation, error taxonomy, content-addressed object store, and
//! the generic `Store` abstraction underlying the rest of the control
//! plane workspace.

pub mod context;
pub mod error;
pub mod metadata;
pub mod nullable;
pub mod objectstore;
pub mod store;
pub mod validate;

pub use context::RequestContext;
pub use error::{CoreError, CoreResult, ErrorKind, ValidationIssue};
pub use metadata::{ApiVersion, Kind, Metadata};
pub use nullable::Nullable;
pub use objectstore::{InMemoryObjectStore, ObjectHash, ObjectStore, ObjectType, StoredObject};
pub use store::{EntityId, InMemoryStore, Store};
pub use validate::Validators;
