//! `JsRuntime`: the external collaborator that executes a skill's
//! `transform` function. The real engine is explicitly out of core scope;
//! this trait is the seam the broker calls through, with `EchoJsRuntime`
//! as a deterministic test double.

use async_trait::async_trait;
use ctlplane_core::error::CoreError;
use serde_json::Value;
use std::time::Duration;

#[async_trait]
pub trait JsRuntime: Send + Sync {
    /// Run `source` as `(sessionVariables, inputArgs) => inputArgs`,
    /// returning the transformed `inputArgs` or a typed error. A thrown
    /// JS exception must surface as `CoreError::JsRuntimeError`; exceeding
    /// `timeout` must surface as `CoreError::JsRuntimeTimeout`.
    async fn run_transform(
        &self,
        source: &str,
        session_variables: &Value,
        input_args: &Value,
        timeout: Duration,
    ) -> Result<Value, CoreError>;
}

/// Identity transform, for tests that exercise the broker's per-call flow
/// without a real JS engine.
pub struct EchoJsRuntime;

#[async_trait]
impl JsRuntime for EchoJsRuntime {
    async fn run_transform(
        &self,
        _source: &str,
        _session_variables: &Value,
        input_args: &Value,
        _timeout: Duration,
    ) -> Result<Value, CoreError> {
        Ok(input_args.clone())
    }
}

/// Always throws, for exercising the per-call flow's failure path.
pub struct ThrowingJsRuntime;

#[async_trait]
impl JsRuntime for ThrowingJsRuntime {
    async fn run_transform(
        &self,
        _source: &str,
        _session_variables: &Value,
        _input_args: &Value,
        _timeout: Duration,
    ) -> Result<Value, CoreError> {
        Err(CoreError::JsRuntimeError("transform threw".into()))
    }
}
