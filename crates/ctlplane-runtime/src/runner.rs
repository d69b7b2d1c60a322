//! `Runner` dispatch: an external process that executes a skill under the
//! broker's supervision. `SandboxRunner` adapts the teacher's
//! `skillsrs-runtime::sandbox` timeout-enforced subprocess executor.

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("runner dispatch failed: {0}")]
    DispatchFailed(String),
    #[error("runner timed out after {0}ms")]
    Timeout(u64),
    #[error("runner io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RunnerResult<T> = Result<T, RunnerError>;

#[derive(Debug, Clone)]
pub struct Invocation {
    pub invocation_id: Uuid,
    pub program: String,
    pub args: Vec<String>,
    pub input_args: Value,
    pub working_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct RunnerOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
}

/// A `Tangent`: an executor selected for its declared capabilities.
#[async_trait]
pub trait Runner: Send + Sync {
    fn name(&self) -> &str;
    /// Runner-type identifiers this runner can service, matched against
    /// `SkillSet::GetRunnerTypes()`.
    fn capabilities(&self) -> &[String];
    async fn dispatch(&self, invocation: &Invocation, cancel: CancellationToken) -> RunnerResult<RunnerOutput>;
}

/// Subprocess execution under a hard timeout. No filesystem/network
/// restriction beyond what the invoked program itself enforces — a fuller
/// sandbox backend is out of scope here.
pub struct SandboxRunner {
    name: String,
    capabilities: Vec<String>,
    timeout: Duration,
}

impl SandboxRunner {
    pub fn new(name: impl Into<String>, capabilities: Vec<String>, timeout: Duration) -> Self {
        Self { name: name.into(), capabilities, timeout }
    }
}

#[async_trait]
impl Runner for SandboxRunner {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    async fn dispatch(&self, invocation: &Invocation, cancel: CancellationToken) -> RunnerResult<RunnerOutput> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let start = std::time::Instant::now();
        let run = async {
            tokio::select! {
                output = cmd.output() => output.map_err(RunnerError::Io),
                _ = cancel.cancelled() => Err(RunnerError::DispatchFailed("cancelled".into())),
            }
        };

        let output = match tokio::time::timeout(self.timeout, run).await {
            Ok(result) => result?,
            Err(_) => return Err(RunnerError::Timeout(self.timeout.as_millis() as u64)),
        };

        Ok(RunnerOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Selects the first runner whose capabilities cover every runner type the
/// skillset declares.
pub fn select_runner<'a>(runners: &'a [std::sync::Arc<dyn Runner>], required: &[String]) -> Option<&'a std::sync::Arc<dyn Runner>> {
    runners
        .iter()
        .find(|runner| required.iter().all(|r| runner.capabilities().iter().any(|c| c == r)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn invocation(program: &str, args: &[&str]) -> Invocation {
        Invocation {
            invocation_id: Uuid::new_v4(),
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            input_args: Value::Null,
            working_dir: env::current_dir().unwrap(),
        }
    }

    #[tokio::test]
    async fn quick_command_succeeds() {
        let runner = SandboxRunner::new("shell", vec!["shell".into()], Duration::from_millis(500));
        let output = runner.dispatch(&invocation("echo", &["hello"]), CancellationToken::new()).await.unwrap();
        assert!(output.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn slow_command_times_out() {
        let runner = SandboxRunner::new("shell", vec!["shell".into()], Duration::from_millis(50));
        let err = runner.dispatch(&invocation("sleep", &["5"]), CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, RunnerError::Timeout(_)));
    }

    #[test]
    fn select_runner_requires_full_capability_coverage() {
        let runner: std::sync::Arc<dyn Runner> =
            std::sync::Arc::new(SandboxRunner::new("shell", vec!["shell".into()], Duration::from_millis(500)));
        let runners = vec![runner];
        assert!(select_runner(&runners, &["shell".into()]).is_some());
        assert!(select_runner(&runners, &["shell".into(), "python".into()]).is_none());
    }
}
