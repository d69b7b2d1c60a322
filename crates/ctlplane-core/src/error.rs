//! Error taxonomy shared by every crate in the workspace.
//!
//! Mirrors the kind table in the governing specification: each variant
//! carries enough detail to report a useful message while still mapping
//! onto a single stable `ErrorKind` the handler layer uses for HTTP status
//! codes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single structural validation failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    /// JSON-pointer-style path to the offending field.
    pub field: String,
    pub value: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}

/// The stable taxonomy used for HTTP status mapping and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidSchema,
    InvalidName,
    InvalidVersion,
    InvalidResourceUri,
    NotFound,
    AlreadyExists,
    EqualToExisting,
    DisallowedByPolicy,
    BlockedByPolicy,
    Unauthorized,
    InvalidObject,
    InvalidInput,
    InvalidSession,
    ToolGraphError,
    JsRuntimeError,
    JsExecutionError,
    JsRuntimeTimeout,
    UnableToLoad,
    UnableToUpdate,
    UnableToDelete,
}

impl ErrorKind {
    /// HTTP status code for this taxonomy kind, per the spec's mapping table.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::InvalidSchema
            | ErrorKind::InvalidName
            | ErrorKind::InvalidVersion
            | ErrorKind::InvalidResourceUri
            | ErrorKind::InvalidObject
            | ErrorKind::InvalidInput
            | ErrorKind::InvalidSession => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::AlreadyExists | ErrorKind::EqualToExisting => 409,
            ErrorKind::DisallowedByPolicy | ErrorKind::BlockedByPolicy | ErrorKind::Unauthorized => 403,
            ErrorKind::ToolGraphError
            | ErrorKind::JsRuntimeError
            | ErrorKind::JsExecutionError
            | ErrorKind::JsRuntimeTimeout => 422,
            ErrorKind::UnableToLoad | ErrorKind::UnableToUpdate | ErrorKind::UnableToDelete => 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid schema")]
    InvalidSchema(Vec<ValidationIssue>),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("invalid version: {0}")]
    InvalidVersion(String),

    #[error("invalid resource uri: {0}")]
    InvalidResourceUri(String),

    #[error("resource value does not validate against schema")]
    InvalidResourceValue(Vec<ValidationIssue>),

    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: String, id: String },

    #[error("value is equal to existing")]
    EqualToExisting,

    #[error("disallowed by policy: {0}")]
    DisallowedByPolicy(String),

    #[error("blocked by policy: {0}")]
    BlockedByPolicy(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid object: {0}")]
    InvalidObject(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid session: {0}")]
    InvalidSession(String),

    #[error("tool graph error: {0}")]
    ToolGraphError(String),

    #[error("js runtime error: {0}")]
    JsRuntimeError(String),

    #[error("js execution error: {0}")]
    JsExecutionError(String),

    #[error("js runtime timeout")]
    JsRuntimeTimeout,

    #[error("unable to load: {0}")]
    UnableToLoad(String),

    #[error("unable to update: {0}")]
    UnableToUpdate(String),

    #[error("unable to delete: {0}")]
    UnableToDelete(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidSchema(_) => ErrorKind::InvalidSchema,
            CoreError::InvalidName(_) => ErrorKind::InvalidName,
            CoreError::InvalidVersion(_) => ErrorKind::InvalidVersion,
            CoreError::InvalidResourceUri(_) => ErrorKind::InvalidResourceUri,
            CoreError::InvalidResourceValue(_) => ErrorKind::InvalidObject,
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            CoreError::EqualToExisting => ErrorKind::EqualToExisting,
            CoreError::DisallowedByPolicy(_) => ErrorKind::DisallowedByPolicy,
            CoreError::BlockedByPolicy(_) => ErrorKind::BlockedByPolicy,
            CoreError::Unauthorized => ErrorKind::Unauthorized,
            CoreError::InvalidObject(_) => ErrorKind::InvalidObject,
            CoreError::InvalidInput(_) => ErrorKind::InvalidInput,
            CoreError::InvalidSession(_) => ErrorKind::InvalidSession,
            CoreError::ToolGraphError(_) => ErrorKind::ToolGraphError,
            CoreError::JsRuntimeError(_) => ErrorKind::JsRuntimeError,
            CoreError::JsExecutionError(_) => ErrorKind::JsExecutionError,
            CoreError::JsRuntimeTimeout => ErrorKind::JsRuntimeTimeout,
            CoreError::UnableToLoad(_) => ErrorKind::UnableToLoad,
            CoreError::UnableToUpdate(_) => ErrorKind::UnableToUpdate,
            CoreError::UnableToDelete(_) => ErrorKind::UnableToDelete,
        }
    }

    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound { kind: kind.into(), id: id.into() }
    }

    pub fn already_exists(kind: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::AlreadyExists { kind: kind.into(), id: id.into() }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
