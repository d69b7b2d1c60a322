pub mod audit;
pub mod broker;
pub mod graph;
pub mod js_runtime;
pub mod runner;
pub mod session;

pub use audit::{AuditLog, AuditRecord, SNAPPY_FRAMED_HEADER};
pub use broker::{BrokerConfig, McpToolDescriptor, SessionBroker};
pub use graph::{CallNode, ToolCallGraph};
pub use js_runtime::{EchoJsRuntime, JsRuntime, ThrowingJsRuntime};
pub use runner::{select_runner, Invocation, Runner, RunnerError, RunnerOutput, SandboxRunner};
pub use session::{
    split_skill_path, validate_session_variables, CreateSessionRequest, SessionHandle, SessionInfo, SessionState,
    TerminationReason,
};
