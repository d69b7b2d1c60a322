//! Session state machine and persisted `SessionInfo`.

use chrono::{DateTime, Utc};
use ctlplane_core::error::{CoreError, CoreResult};
use ctlplane_policy::ViewDefinition;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    Expired,
    Completed,
    Failed,
}

/// `Created → Validated → Authorized → Dispatched → (CallAuthorized →
/// CallTransformed → CallRun → CallEnded)* → Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Created,
    Validated,
    Authorized,
    Dispatched,
    CallAuthorized,
    CallTransformed,
    CallRun,
    CallEnded,
    Terminated(TerminationReason),
}

impl SessionState {
    fn rank(self) -> u8 {
        match self {
            SessionState::Created => 0,
            SessionState::Validated => 1,
            SessionState::Authorized => 2,
            SessionState::Dispatched => 3,
            SessionState::CallAuthorized => 4,
            SessionState::CallTransformed => 5,
            SessionState::CallRun => 6,
            SessionState::CallEnded => 7,
            SessionState::Terminated(_) => 8,
        }
    }
}

/// Guards a session's state with monotonic transitions, except the
/// deliberate per-call loop-back from `CallEnded`/`Dispatched` to
/// `CallAuthorized` that starts the next invocation.
pub struct SessionHandle {
    state: Mutex<SessionState>,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self { state: Mutex::new(SessionState::Created) }
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    pub fn transition(&self, next: SessionState) -> CoreResult<()> {
        let mut current = self.state.lock();
        if matches!(*current, SessionState::Terminated(_)) {
            return Err(CoreError::InvalidSession(format!(
                "session already terminated, cannot transition to {next:?}"
            )));
        }
        let loop_back = matches!(
            (*current, next),
            (SessionState::CallEnded, SessionState::CallAuthorized)
                | (SessionState::Dispatched, SessionState::CallAuthorized)
        );
        let sequential = next.rank() == current.rank() + 1;
        let terminating = matches!(next, SessionState::Terminated(_));
        if !loop_back && !sequential && !terminating {
            return Err(CoreError::InvalidSession(format!(
                "illegal session transition {current:?} -> {next:?}"
            )));
        }
        *current = next;
        Ok(())
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub skill_path: String,
    pub view_name: String,
    #[serde(default)]
    pub session_variables: Option<Value>,
    #[serde(default)]
    pub input_args: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub session_variables: Value,
    pub input_args: Value,
    pub view_definition: ViewDefinition,
    pub interactive: bool,
    #[serde(default)]
    pub code_challenge: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// `(dirname(skillPath), basename(skillPath))`.
pub fn split_skill_path(skill_path: &str) -> CoreResult<(String, String)> {
    let trimmed = skill_path.trim_end_matches('/');
    let idx = trimmed
        .rfind('/')
        .ok_or_else(|| CoreError::InvalidObject(format!("skillPath {skill_path:?} has no skill name")))?;
    let (dir, name) = trimmed.split_at(idx);
    let dir = if dir.is_empty() { "/" } else { dir };
    Ok((dir.to_string(), name.trim_start_matches('/').to_string()))
}

pub fn validate_session_variables(value: &Value, max_variables: usize) -> CoreResult<()> {
    let obj = value
        .as_object()
        .ok_or_else(|| CoreError::InvalidObject("sessionVariables must be a JSON object".into()))?;
    if obj.len() > max_variables {
        return Err(CoreError::InvalidObject(format!(
            "sessionVariables has {} keys, exceeding the maximum of {max_variables}",
            obj.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn forward_transitions_allowed() {
        let handle = SessionHandle::new();
        handle.transition(SessionState::Validated).unwrap();
        handle.transition(SessionState::Authorized).unwrap();
        handle.transition(SessionState::Dispatched).unwrap();
        assert_eq!(handle.state(), SessionState::Dispatched);
    }

    #[test]
    fn per_call_loop_back_allowed() {
        let handle = SessionHandle::new();
        handle.transition(SessionState::Validated).unwrap();
        handle.transition(SessionState::Authorized).unwrap();
        handle.transition(SessionState::Dispatched).unwrap();
        handle.transition(SessionState::CallAuthorized).unwrap();
        handle.transition(SessionState::CallTransformed).unwrap();
        handle.transition(SessionState::CallRun).unwrap();
        handle.transition(SessionState::CallEnded).unwrap();
        // Next invocation.
        assert!(handle.transition(SessionState::CallAuthorized).is_ok());
    }

    #[test]
    fn backward_or_skipped_transition_rejected() {
        let handle = SessionHandle::new();
        assert!(handle.transition(SessionState::Dispatched).is_err());
    }

    #[test]
    fn terminated_is_a_dead_end() {
        let handle = SessionHandle::new();
        handle.transition(SessionState::Terminated(TerminationReason::Failed)).unwrap();
        assert!(handle.transition(SessionState::Validated).is_err());
    }

    #[test]
    fn max_variables_boundary() {
        let mut obj = serde_json::Map::new();
        for i in 0..8 {
            obj.insert(i.to_string(), json!(i));
        }
        assert!(validate_session_variables(&Value::Object(obj.clone()), 8).is_ok());
        obj.insert("extra".into(), json!(true));
        assert!(validate_session_variables(&Value::Object(obj), 8).is_err());
    }

    #[test]
    fn skill_path_splits_dir_and_name() {
        let (dir, name) = split_skill_path("/ops/restart-pod").unwrap();
        assert_eq!(dir, "/ops");
        assert_eq!(name, "restart-pod");
    }
}
