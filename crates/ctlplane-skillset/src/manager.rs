//! `SkillSetManager`: load-time validation, policy-filtered LLM-tool
//! projection, runner-type discovery, context mutation, and hidden-context
//! redaction on read.

use crate::redact::short_hash8;
use crate::transform::TransformValidator;
use crate::types::{LlmTool, SkillSet, SkillSetSummary};
use ctlplane_core::error::{CoreError, CoreResult, ValidationIssue};
use ctlplane_core::{EntityId, InMemoryStore, Store, Validators};
use ctlplane_policy::{are_actions_allowed_on_resource, Action, TargetResource, ViewDefinition};
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Entry {
    id: Uuid,
    path: String,
    skillset: SkillSet,
}

pub struct SkillSetManager {
    validators: Arc<Validators>,
    transform_validator: Arc<dyn TransformValidator>,
    store: InMemoryStore<EntityId, Entry>,
    by_path: DashMap<String, EntityId>,
}

impl SkillSetManager {
    pub fn new(validators: Arc<Validators>, transform_validator: Arc<dyn TransformValidator>) -> Self {
        Self {
            validators,
            transform_validator,
            store: InMemoryStore::new("SkillSet"),
            by_path: DashMap::new(),
        }
    }

    /// Validate on load: all skills point to a declared source; input/
    /// output schemas and transforms compile; each context value validates
    /// against its schema.
    pub fn validate(&self, skillset: &SkillSet) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let source_names: std::collections::HashSet<&str> =
            skillset.sources.iter().map(|s| s.name.as_str()).collect();

        for skill in &skillset.skills {
            for error in self.validators.validate_skill_name(&skill.name) {
                issues.push(error);
            }
            if !source_names.contains(skill.source.as_str()) {
                issues.push(ValidationIssue::new(
                    format!("skills[{}].source", skill.name),
                    &skill.source,
                    "does not name a declared source",
                ));
            }
            if let Err(e) = self.validators.validate_json_schema(
                serde_json::to_vec(&skill.input_schema).unwrap_or_default().as_slice(),
            ) {
                issues.push(e);
            }
            if let Err(e) = self.validators.validate_json_schema(
                serde_json::to_vec(&skill.output_schema).unwrap_or_default().as_slice(),
            ) {
                issues.push(e);
            }
            if let Some(transform) = &skill.transform {
                if !self.transform_validator.is_valid_function(transform) {
                    issues.push(ValidationIssue::new(
                        format!("skills[{}].transform", skill.name),
                        transform,
                        "is not a syntactically valid JS function",
                    ));
                }
            }
        }

        for context in &skillset.context {
            if let Some(value) = &context.value {
                match self.validators.validate_instance(&context.schema, value) {
                    Ok(errs) if errs.is_empty() => {}
                    Ok(errs) => issues.extend(errs),
                    Err(e) => issues.push(e),
                }
            }
        }

        issues
    }

    pub async fn create(&self, path: String, skillset: SkillSet) -> CoreResult<()> {
        let issues = self.validate(&skillset);
        if !issues.is_empty() {
            return Err(CoreError::InvalidSchema(issues));
        }
        if self.by_path.contains_key(&path) {
            return Err(CoreError::already_exists("SkillSet", path));
        }
        let id = Uuid::new_v4();
        self.store.save(EntityId(id), Entry { id, path: path.clone(), skillset }).await?;
        self.by_path.insert(path, EntityId(id));
        Ok(())
    }

    async fn entry(&self, path: &str) -> CoreResult<Entry> {
        let id = self
            .by_path
            .get(path)
            .map(|e| *e.value())
            .ok_or_else(|| CoreError::not_found("SkillSet", path))?;
        self.store.load(&id).await
    }

    pub async fn delete(&self, path: &str) -> CoreResult<()> {
        if let Some((_, id)) = self.by_path.remove(path) {
            self.store.delete(&id).await?;
        }
        Ok(())
    }

    pub async fn summary(&self, path: &str) -> CoreResult<SkillSetSummary> {
        Ok(self.entry(path).await?.skillset.summary())
    }

    /// All known paths, for enumeration (`List`).
    pub fn paths(&self) -> Vec<String> {
        self.by_path.iter().map(|e| e.key().clone()).collect()
    }

    pub async fn get(&self, path: &str) -> CoreResult<SkillSet> {
        Ok(self.entry(path).await?.skillset)
    }

    pub async fn get_skill(&self, path: &str, skill_name: &str) -> CoreResult<crate::types::Skill> {
        let entry = self.entry(path).await?;
        entry
            .skillset
            .skills
            .into_iter()
            .find(|s| s.name == skill_name)
            .ok_or_else(|| CoreError::not_found("Skill", skill_name))
    }

    /// `GetRunnerTypes`: distinct `Source.Runner` identifiers.
    pub async fn runner_types(&self, path: &str) -> CoreResult<Vec<String>> {
        let entry = self.entry(path).await?;
        let mut seen = std::collections::BTreeSet::new();
        for source in &entry.skillset.sources {
            seen.insert(source.runner.clone());
        }
        Ok(seen.into_iter().collect())
    }

    /// `SetContextValue`: validates `value` against `context.schema` before
    /// assignment.
    pub async fn set_context_value(&self, path: &str, name: &str, value: Value) -> CoreResult<()> {
        let mut entry = self.entry(path).await?;
        let context = entry
            .skillset
            .context
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| CoreError::not_found("Context", name))?;
        let issues = self
            .validators
            .validate_instance(&context.schema, &value)
            .map_err(|issue| CoreError::InvalidObject(issue.message))?;
        if !issues.is_empty() {
            return Err(CoreError::InvalidObject(format!(
                "context {name} value does not validate against schema"
            )));
        }
        context.value = Some(value);
        self.store.save(EntityId(entry.id), entry.clone()).await?;
        Ok(())
    }

    /// `GetAllSkillsAsLLMTools`: filter skills by policy, then emit tools.
    /// Skills without an `llm:description` annotation are omitted.
    pub async fn all_skills_as_llm_tools(&self, path: &str, view: &ViewDefinition) -> CoreResult<Vec<LlmTool>> {
        let entry = self.entry(path).await?;
        let resource = TargetResource::parse(&format!("res://skillsets/{}", path.trim_start_matches('/')))?;
        let mut tools = Vec::new();
        for skill in &entry.skillset.skills {
            let Some(description) = skill.annotations.llm_description.clone() else {
                continue;
            };
            let actions: Vec<Action> = skill
                .exported_actions
                .iter()
                .map(|a| Action::new(a.clone()))
                .collect::<Result<_, _>>()?;
            if !are_actions_allowed_on_resource(view, &resource, &actions)? {
                continue;
            }
            tools.push(LlmTool {
                name: skill.name.clone(),
                description,
                input_schema: skill.input_schema.clone(),
                output_schema: skill.output_schema.clone(),
            });
        }
        Ok(tools)
    }

    /// `Get` (read JSON): redact hidden context values to an 8-hex SHA-256
    /// prefix. Null values and `hidden=false` values are returned
    /// unchanged.
    pub async fn get_json(&self, path: &str) -> CoreResult<Value> {
        let entry = self.entry(path).await?;
        let mut value = serde_json::to_value(&entry.skillset).expect("SkillSet always serializes");
        if let Some(contexts) = value.get_mut("context").and_then(Value::as_array_mut) {
            for context in contexts {
                let hidden = context
                    .get("attributes")
                    .and_then(|a| a.get("hidden"))
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                if !hidden {
                    continue;
                }
                if let Some(v) = context.get_mut("value") {
                    if let Some(s) = v.as_str() {
                        let redacted = short_hash8(s);
                        *v = Value::String(redacted);
                    }
                    // Null values pass through unchanged.
                }
            }
        }
        Ok(value)
    }
}
