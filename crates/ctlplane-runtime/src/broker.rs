//! `SessionBroker`: implements the Create flow and per-call flow of
//! spec.md §4.5 end to end, wiring policy, catalog/skillset lookups, the
//! tool-call graph, the JS transform, runner dispatch, and the audit log
//! together.

use crate::audit::{AuditLog, AuditRecord};
use crate::graph::ToolCallGraph;
use crate::js_runtime::JsRuntime;
use crate::runner::{select_runner, Invocation, Runner, RunnerOutput};
use crate::session::{
    split_skill_path, validate_session_variables, CreateSessionRequest, SessionHandle, SessionInfo, SessionState,
    TerminationReason,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use ctlplane_catalog::ViewManager;
use ctlplane_core::error::{CoreError, CoreResult};
use ctlplane_core::Validators;
use ctlplane_policy::{are_actions_allowed_on_resource, can_adopt_view, can_use_skillset, Action, TargetResource};
use ctlplane_skillset::{McpFilterMode, SkillSetManager};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub max_variables: usize,
    pub session_expiration: ChronoDuration,
    pub transform_timeout: Duration,
    pub working_dir: PathBuf,
    pub single_user_mode: bool,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            max_variables: 32,
            session_expiration: ChronoDuration::hours(1),
            transform_timeout: Duration::from_millis(500),
            working_dir: PathBuf::from("."),
            single_user_mode: false,
        }
    }
}

struct SessionRow {
    handle: SessionHandle,
    info: SessionInfo,
    graph: ToolCallGraph,
    audit: Mutex<AuditLog>,
    /// The skill the session was opened against: its skillset path,
    /// `mcp:tools` annotation, and `source` govern every per-call dispatch
    /// for the life of the session. A bare `tool_name` passed to
    /// `run_call` is looked up under this path rather than re-derived from
    /// the name alone, which would misresolve to the root skillset.
    skillset_path: String,
    source: String,
    mcp_filter_mode: McpFilterMode,
}

/// A tool a proxied MCP server advertises, prior to filtering.
#[derive(Debug, Clone)]
pub struct McpToolDescriptor {
    pub name: String,
    pub source: String,
}

pub struct SessionBroker {
    config: BrokerConfig,
    validators: Arc<Validators>,
    views: Arc<ViewManager>,
    skillsets: Arc<SkillSetManager>,
    runners: Vec<Arc<dyn Runner>>,
    js_runtime: Arc<dyn JsRuntime>,
    sessions: DashMap<Uuid, SessionRow>,
}

impl SessionBroker {
    pub fn new(
        config: BrokerConfig,
        validators: Arc<Validators>,
        views: Arc<ViewManager>,
        skillsets: Arc<SkillSetManager>,
        runners: Vec<Arc<dyn Runner>>,
        js_runtime: Arc<dyn JsRuntime>,
    ) -> Self {
        Self { config, validators, views, skillsets, runners, js_runtime, sessions: DashMap::new() }
    }

    /// `NewSession`: the 7-step Create flow.
    pub async fn new_session(
        &self,
        catalog: &str,
        user_id: &str,
        subject_is_user: bool,
        request: CreateSessionRequest,
        now: DateTime<Utc>,
    ) -> CoreResult<Uuid> {
        // 1. non-empty catalog/userID.
        if catalog.is_empty() || user_id.is_empty() {
            return Err(CoreError::InvalidObject("catalogID and userID are required".into()));
        }

        // 2. structural validation.
        let issues = self.validators.validate_skill_path(&request.skill_path);
        if !issues.is_empty() {
            return Err(CoreError::InvalidSchema(issues));
        }
        let issues = self.validators.validate_resource_name(&request.view_name);
        if !issues.is_empty() {
            return Err(CoreError::InvalidSchema(issues));
        }
        let session_variables = request.session_variables.unwrap_or(Value::Object(Default::default()));
        validate_session_variables(&session_variables, self.config.max_variables)?;
        let input_args = request.input_args.unwrap_or(Value::Object(Default::default()));

        let (skillset_path, skill_name) = split_skill_path(&request.skill_path)?;
        let view = self.views.get(catalog, &request.view_name).await?;

        // 3. policy gates on using the skillset and adopting the view.
        if !can_use_skillset(&view.definition, &skillset_path)? {
            return Err(CoreError::DisallowedByPolicy(format!(
                "view {} may not use skillset {skillset_path}",
                request.view_name
            )));
        }
        if !can_adopt_view(&view.definition, &request.view_name, self.config.single_user_mode, subject_is_user)? {
            return Err(CoreError::DisallowedByPolicy(format!("may not adopt view {}", request.view_name)));
        }

        // 4. resolve skillset/skill, validate input.
        let skillset = self.skillsets.get(&skillset_path).await?;
        let skill = self.skillsets.get_skill(&skillset_path, &skill_name).await?;
        let issues = self
            .validators
            .validate_instance(&skill.input_schema, &input_args)
            .map_err(|issue| CoreError::InvalidSchema(vec![issue]))?;
        if !issues.is_empty() {
            return Err(CoreError::InvalidInput(format!("inputArgs does not validate against {skill_name}'s schema")));
        }

        // 5. exported actions must all be allowed on the skillset's resource.
        let resource = TargetResource::parse(&format!("res://skillsets/{}", skillset_path.trim_start_matches('/')))?;
        let actions: Vec<Action> =
            skill.exported_actions.iter().map(|a| Action::new(a.clone())).collect::<Result<_, _>>()?;

        let session_id = Uuid::new_v4();
        let audit = Mutex::new(AuditLog::new(session_id));
        if !are_actions_allowed_on_resource(&view.definition, &resource, &actions)? {
            audit.lock().append(blocked_record(now, &skill_name, &request.view_name));
            return Err(CoreError::BlockedByPolicy(format!(
                "view {} does not authorize {skill_name}'s exported actions",
                request.view_name
            )));
        }

        // 6. select a runner covering the skillset's declared runner types.
        let runner_types = skillset.sources.iter().map(|s| s.runner.clone()).collect::<Vec<_>>();
        if select_runner(&self.runners, &runner_types).is_none() {
            return Err(CoreError::UnableToLoad(format!(
                "no runner covers capabilities {runner_types:?}"
            )));
        }

        // 7. assemble and persist.
        let info = SessionInfo {
            session_id,
            session_variables,
            input_args,
            view_definition: view.definition,
            interactive: false,
            code_challenge: None,
            expires_at: now + self.config.session_expiration,
        };

        let handle = SessionHandle::new();
        handle.transition(SessionState::Validated)?;
        handle.transition(SessionState::Authorized)?;
        handle.transition(SessionState::Dispatched)?;

        audit.lock().append(created_record(now, &skill_name, &request.view_name));
        let mcp_filter_mode = skill.annotations.mcp_tools.unwrap_or(McpFilterMode::AllowOnly);
        self.sessions.insert(
            session_id,
            SessionRow {
                handle,
                info,
                graph: ToolCallGraph::new(),
                audit,
                skillset_path: skillset_path.clone(),
                source: skill.source.clone(),
                mcp_filter_mode,
            },
        );
        Ok(session_id)
    }

    /// `RunMCPProxy`/`MCPCallTool`: the 5-step per-call flow.
    pub async fn run_call(
        &self,
        session_id: Uuid,
        parent_call_id: Option<Uuid>,
        tool_name: &str,
        now: DateTime<Utc>,
        cancel: CancellationToken,
    ) -> CoreResult<RunnerOutput> {
        let row = self.sessions.get(&session_id).ok_or_else(|| CoreError::not_found("Session", session_id.to_string()))?;
        if now >= row.info.expires_at {
            return Err(CoreError::InvalidSession(format!("session {session_id} has expired")));
        }

        let invocation_id = Uuid::new_v4();
        row.graph.register(invocation_id, parent_call_id, tool_name)?;

        // Looked up under the session's own skillset path, not re-derived
        // from the bare `tool_name` — every skillset in this codebase lives
        // under a non-root path, so resolving against "/" would always miss.
        let skillset_path = row.skillset_path.clone();
        let skill_name = tool_name.to_string();
        let declared_skill = self.skillsets.get_skill(&skillset_path, &skill_name).await.ok();

        row.handle.transition(SessionState::CallAuthorized)?;

        // MCP filter (spec.md 4.5): the session's own `mcp:tools` annotation
        // decides whether an undeclared tool is rejected, policy-checked, or
        // let through.
        match (row.mcp_filter_mode, &declared_skill) {
            (McpFilterMode::NoFilter, _) => {
                row.audit.lock().append(mcp_passthrough_record(now, tool_name, "no-filter, policy bypassed"));
            }
            (McpFilterMode::AllowOnly, Some(skill)) if skill.source == row.source => {
                let resource = TargetResource::parse(&format!("res://skillsets/{}", skillset_path.trim_start_matches('/')))?;
                let actions: Vec<Action> =
                    skill.exported_actions.iter().map(|a| Action::new(a.clone())).collect::<Result<_, _>>()?;
                if !are_actions_allowed_on_resource(&row.info.view_definition, &resource, &actions)? {
                    row.audit.lock().append(blocked_record(now, &skill_name, "session"));
                    return Err(CoreError::BlockedByPolicy(format!("{tool_name} blocked by session policy")));
                }
            }
            (McpFilterMode::AllowOnly, _) => {
                row.audit.lock().append(blocked_record(now, &skill_name, "allow-only, unknown tool"));
                return Err(CoreError::BlockedByPolicy(format!(
                    "{tool_name} is not declared under the session's source, rejected under allow-only filtering"
                )));
            }
            (McpFilterMode::Overlay, Some(skill)) => {
                let resource = TargetResource::parse(&format!("res://skillsets/{}", skillset_path.trim_start_matches('/')))?;
                let actions: Vec<Action> =
                    skill.exported_actions.iter().map(|a| Action::new(a.clone())).collect::<Result<_, _>>()?;
                if !are_actions_allowed_on_resource(&row.info.view_definition, &resource, &actions)? {
                    row.audit.lock().append(blocked_record(now, &skill_name, "session"));
                    return Err(CoreError::BlockedByPolicy(format!("{tool_name} blocked by session policy")));
                }
            }
            (McpFilterMode::Overlay, None) => {
                row.audit.lock().append(mcp_passthrough_record(now, tool_name, "overlay, no policy filter, allowed"));
            }
        };
        let skill = declared_skill.unwrap_or_else(|| fallback_skill(&skill_name, &row.source));

        row.handle.transition(SessionState::CallTransformed)?;
        let input_args = if let Some(transform) = &skill.transform {
            match self
                .js_runtime
                .run_transform(transform, &row.info.session_variables, &row.info.input_args, self.config.transform_timeout)
                .await
            {
                Ok(transformed) => transformed,
                Err(err) => {
                    row.audit.lock().append(transform_failed_record(now, &skill_name, &err));
                    return Err(err);
                }
            }
        } else {
            row.info.input_args.clone()
        };

        row.handle.transition(SessionState::CallRun)?;
        let runner_types = vec![skill.source.clone()];
        let runner = select_runner(&self.runners, &runner_types)
            .ok_or_else(|| CoreError::UnableToLoad(format!("no runner for {tool_name}")))?;
        let invocation = Invocation {
            invocation_id,
            program: tool_name.to_string(),
            args: Vec::new(),
            input_args,
            working_dir: self.config.working_dir.clone(),
        };
        let result = runner.dispatch(&invocation, cancel).await;

        row.handle.transition(SessionState::CallEnded)?;
        match result {
            Ok(output) => {
                row.audit.lock().append(skill_end_record(now, &skill_name, "success"));
                Ok(output)
            }
            Err(err) => {
                row.audit.lock().append(skill_end_record(now, &skill_name, "failed"));
                Err(CoreError::ToolGraphError(err.to_string()))
            }
        }
    }

    /// Applies the session's `mcp:tools` filter mode to a proxied MCP
    /// server's advertised tool list (spec.md 4.5's "MCP filter").
    pub async fn list_mcp_tools(
        &self,
        session_id: Uuid,
        candidates: Vec<McpToolDescriptor>,
        now: DateTime<Utc>,
    ) -> CoreResult<Vec<McpToolDescriptor>> {
        let row = self.sessions.get(&session_id).ok_or_else(|| CoreError::not_found("Session", session_id.to_string()))?;
        match row.mcp_filter_mode {
            McpFilterMode::NoFilter => {
                row.audit.lock().append(mcp_passthrough_record(now, "*", "no-filter, policy bypassed"));
                Ok(candidates)
            }
            McpFilterMode::AllowOnly => {
                let mut allowed = Vec::new();
                for tool in candidates {
                    if tool.source == row.source {
                        allowed.push(tool);
                    }
                }
                Ok(allowed)
            }
            McpFilterMode::Overlay => {
                row.audit.lock().append(mcp_passthrough_record(now, "*", "overlay, no policy filter, allowed"));
                Ok(candidates)
            }
        }
    }

    pub fn audit_records(&self, session_id: Uuid) -> CoreResult<Vec<AuditRecord>> {
        let row = self.sessions.get(&session_id).ok_or_else(|| CoreError::not_found("Session", session_id.to_string()))?;
        let records = row.audit.lock().records().to_vec();
        Ok(records)
    }

    pub fn session_state(&self, session_id: Uuid) -> CoreResult<SessionState> {
        let row = self.sessions.get(&session_id).ok_or_else(|| CoreError::not_found("Session", session_id.to_string()))?;
        Ok(row.handle.state())
    }

    pub fn terminate(&self, session_id: Uuid, reason: TerminationReason) -> CoreResult<()> {
        let row = self.sessions.get(&session_id).ok_or_else(|| CoreError::not_found("Session", session_id.to_string()))?;
        row.handle.transition(SessionState::Terminated(reason))
    }
}

fn created_record(now: DateTime<Utc>, skill: &str, view: &str) -> AuditRecord {
    let mut record = AuditRecord::new("session_created", now);
    record.skill = Some(skill.to_string());
    record.view = Some(view.to_string());
    record
}

fn blocked_record(now: DateTime<Utc>, skill: &str, view: &str) -> AuditRecord {
    let mut record = AuditRecord::new("policy_decision", now);
    record.decision = Some("blocked".to_string());
    record.skill = Some(skill.to_string());
    record.view = Some(view.to_string());
    record
}

fn transform_failed_record(now: DateTime<Utc>, skill: &str, err: &CoreError) -> AuditRecord {
    let mut record = AuditRecord::new("skill_input_transformed", now);
    record.status = Some("failed".to_string());
    record.skill = Some(skill.to_string());
    record.decision = Some(err.to_string());
    record
}

fn skill_end_record(now: DateTime<Utc>, skill: &str, status: &str) -> AuditRecord {
    let mut record = AuditRecord::new("skill_end", now);
    record.status = Some(status.to_string());
    record.skill = Some(skill.to_string());
    record
}

fn mcp_passthrough_record(now: DateTime<Utc>, tool: &str, basis: &str) -> AuditRecord {
    let mut record = AuditRecord::new("policy_decision", now);
    record.decision = Some("allowed".to_string());
    record.basis = Some(Value::String(basis.to_string()));
    record.skill = Some(tool.to_string());
    record
}

/// Proxied MCP tools with no declared skill use the session's own
/// `Source` as their authorization and runner-selection surface.
fn fallback_skill(name: &str, source: &str) -> ctlplane_skillset::Skill {
    ctlplane_skillset::Skill {
        name: name.to_string(),
        source: source.to_string(),
        input_schema: Value::Object(Default::default()),
        output_schema: Value::Object(Default::default()),
        transform: None,
        exported_actions: Vec::new(),
        annotations: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::js_runtime::EchoJsRuntime;
    use crate::runner::SandboxRunner;
    use ctlplane_core::Metadata;
    use ctlplane_policy::{Intent, Rule, Scope, ViewDefinition};
    use ctlplane_skillset::{Skill, SkillAnnotations, SkillSet, Source};
    use serde_json::json;

    fn view_definition(actions: &[&str]) -> ViewDefinition {
        ViewDefinition {
            scope: Scope { catalog: "acme".into(), variant: None, namespace: None },
            rules: vec![Rule {
                intent: Intent::Allow,
                actions: actions.iter().map(|a| Action::new(*a).unwrap()).collect(),
                targets: vec![TargetResource::parse("res://*").unwrap()],
            }],
        }
    }

    async fn broker_with_skill(actions: &[&str]) -> (Arc<SessionBroker>, Arc<ViewManager>, Arc<SkillSetManager>) {
        let validators = Arc::new(Validators::new());
        let views = Arc::new(ViewManager::new(validators.clone()));
        views
            .create(
                "acme",
                Metadata { name: "dev-view".into(), catalog: "acme".into(), ..Default::default() },
                view_definition(actions),
                "0.1.0-alpha.1",
                None,
            )
            .await
            .unwrap();

        let skillsets = Arc::new(SkillSetManager::new(
            validators.clone(),
            Arc::new(ctlplane_skillset::SyntacticTransformValidator),
        ));
        skillsets
            .create(
                "/ops".into(),
                SkillSet {
                    sources: vec![Source { name: "shell".into(), runner: "shell".into(), config: Default::default() }],
                    context: vec![],
                    skills: vec![Skill {
                        name: "restart-pod".into(),
                        source: "shell".into(),
                        input_schema: json!({"type": "object"}),
                        output_schema: json!({"type": "object"}),
                        transform: None,
                        exported_actions: actions.iter().map(|a| a.to_string()).collect(),
                        annotations: SkillAnnotations::default(),
                    }],
                    dependencies: vec![],
                },
            )
            .await
            .unwrap();

        let runner: Arc<dyn Runner> =
            Arc::new(SandboxRunner::new("shell", vec!["shell".into()], Duration::from_millis(500)));
        let broker = Arc::new(SessionBroker::new(
            BrokerConfig::default(),
            validators,
            views.clone(),
            skillsets.clone(),
            vec![runner],
            Arc::new(EchoJsRuntime),
        ));
        (broker, views, skillsets)
    }

    #[tokio::test]
    async fn create_session_succeeds_when_policy_allows() {
        let (broker, _, _) = broker_with_skill(&["kubernetes.pods.restart"]).await;
        let session_id = broker
            .new_session(
                "acme",
                "user-1",
                true,
                CreateSessionRequest {
                    skill_path: "/ops/restart-pod".into(),
                    view_name: "dev-view".into(),
                    session_variables: None,
                    input_args: Some(json!({})),
                },
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(broker.session_state(session_id).unwrap(), SessionState::Dispatched);
    }

    #[tokio::test]
    async fn create_session_blocked_by_policy_scenario_5() {
        let (broker, _, _) =
            broker_with_skill(&["kubernetes.deployments.restart"]).await;
        // Rewrite the view to withhold the exported action the skill needs.
        let validators = Arc::new(Validators::new());
        let views = Arc::new(ViewManager::new(validators));
        views
            .create(
                "acme",
                Metadata { name: "dev-view".into(), catalog: "acme".into(), ..Default::default() },
                view_definition(&["system.skillset.use", "kubernetes.pods.list", "kubernetes.troubleshoot"]),
                "0.1.0-alpha.1",
                None,
            )
            .await
            .unwrap();
        let broker = SessionBroker::new(
            BrokerConfig::default(),
            broker.validators.clone(),
            views,
            broker.skillsets.clone(),
            broker.runners.clone(),
            broker.js_runtime.clone(),
        );
        let err = broker
            .new_session(
                "acme",
                "user-1",
                true,
                CreateSessionRequest {
                    skill_path: "/ops/restart-pod".into(),
                    view_name: "dev-view".into(),
                    session_variables: None,
                    input_args: Some(json!({})),
                },
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ctlplane_core::error::ErrorKind::BlockedByPolicy);
    }

    /// A session opened against a skill with a given `mcp:tools` mode,
    /// with a second, undeclared "shadow-probe" tool never registered under
    /// any skillset — simulating a tool the proxied MCP server advertises
    /// that has no corresponding declared skill.
    async fn broker_with_mcp_mode(mode: McpFilterMode) -> (Arc<SessionBroker>, Uuid) {
        broker_with_mcp_mode_and_skill(mode, "restart-pod").await
    }

    async fn broker_with_mcp_mode_and_skill(mode: McpFilterMode, skill_name: &str) -> (Arc<SessionBroker>, Uuid) {
        let actions = ["kubernetes.pods.restart"];
        let validators = Arc::new(Validators::new());
        let views = Arc::new(ViewManager::new(validators.clone()));
        views
            .create(
                "acme",
                Metadata { name: "dev-view".into(), catalog: "acme".into(), ..Default::default() },
                view_definition(&actions),
                "0.1.0-alpha.1",
                None,
            )
            .await
            .unwrap();

        let skillsets = Arc::new(SkillSetManager::new(
            validators.clone(),
            Arc::new(ctlplane_skillset::SyntacticTransformValidator),
        ));
        skillsets
            .create(
                "/ops".into(),
                SkillSet {
                    sources: vec![Source { name: "shell".into(), runner: "shell".into(), config: Default::default() }],
                    context: vec![],
                    skills: vec![Skill {
                        name: skill_name.to_string(),
                        source: "shell".into(),
                        input_schema: json!({"type": "object"}),
                        output_schema: json!({"type": "object"}),
                        transform: None,
                        exported_actions: actions.iter().map(|a| a.to_string()).collect(),
                        annotations: SkillAnnotations { mcp_tools: Some(mode), ..Default::default() },
                    }],
                    dependencies: vec![],
                },
            )
            .await
            .unwrap();

        let runner: Arc<dyn Runner> =
            Arc::new(SandboxRunner::new("shell", vec!["shell".into()], Duration::from_millis(500)));
        let broker = Arc::new(SessionBroker::new(
            BrokerConfig::default(),
            validators,
            views,
            skillsets,
            vec![runner],
            Arc::new(EchoJsRuntime),
        ));
        let session_id = broker
            .new_session(
                "acme",
                "user-1",
                true,
                CreateSessionRequest {
                    skill_path: format!("/ops/{skill_name}"),
                    view_name: "dev-view".into(),
                    session_variables: None,
                    input_args: Some(json!({})),
                },
                Utc::now(),
            )
            .await
            .unwrap();
        (broker, session_id)
    }

    #[tokio::test]
    async fn allow_only_reauthorizes_and_runs_its_own_declared_skill() {
        let (broker, session_id) = broker_with_mcp_mode_and_skill(McpFilterMode::AllowOnly, "echo").await;
        let output = broker
            .run_call(session_id, None, "echo", Utc::now(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(output.exit_code, Some(0));
    }

    #[tokio::test]
    async fn allow_only_rejects_a_tool_not_declared_under_the_session_source() {
        let (broker, session_id) = broker_with_mcp_mode(McpFilterMode::AllowOnly).await;
        let err = broker
            .run_call(session_id, None, "shadow-probe", Utc::now(), CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ctlplane_core::error::ErrorKind::BlockedByPolicy);
    }

    #[tokio::test]
    async fn overlay_lets_an_undeclared_tool_through_without_policy_check() {
        let (broker, session_id) = broker_with_mcp_mode(McpFilterMode::Overlay).await;
        let output = broker
            .run_call(session_id, None, "echo", Utc::now(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(output.exit_code, Some(0));
    }

    #[tokio::test]
    async fn no_filter_bypasses_policy_even_for_an_undeclared_tool() {
        let (broker, session_id) = broker_with_mcp_mode(McpFilterMode::NoFilter).await;
        let output = broker
            .run_call(session_id, None, "echo", Utc::now(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(output.exit_code, Some(0));
    }

    #[tokio::test]
    async fn list_mcp_tools_allow_only_filters_by_source() {
        let (broker, session_id) = broker_with_mcp_mode(McpFilterMode::AllowOnly).await;
        let candidates = vec![
            McpToolDescriptor { name: "restart-pod".into(), source: "shell".into() },
            McpToolDescriptor { name: "other".into(), source: "python".into() },
        ];
        let filtered = broker.list_mcp_tools(session_id, candidates, Utc::now()).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "restart-pod");
    }

    #[tokio::test]
    async fn list_mcp_tools_no_filter_passes_everything_through() {
        let (broker, session_id) = broker_with_mcp_mode(McpFilterMode::NoFilter).await;
        let candidates = vec![
            McpToolDescriptor { name: "restart-pod".into(), source: "shell".into() },
            McpToolDescriptor { name: "other".into(), source: "python".into() },
        ];
        let filtered = broker.list_mcp_tools(session_id, candidates, Utc::now()).await.unwrap();
        assert_eq!(filtered.len(), 2);
    }
}
