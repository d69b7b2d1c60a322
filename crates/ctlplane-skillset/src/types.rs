//! SkillSet vocabulary: Sources, Contexts, Skills, and Dependencies.
//!
//! Grounded on the teacher's `SkillManifest`/`ToolPolicy`/`SkillHints`
//! (`skillsrs-skillstore`), restructured from a flat per-skill manifest
//! into the spec's SkillSet shape: one set of Sources/Context shared by
//! many Skills.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    /// Typed runner identifier, e.g. `shell`, `python`, `mcp`.
    pub runner: String,
    #[serde(default)]
    pub config: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextAttributes {
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    pub schema: serde_json::Value,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub attributes: ContextAttributes,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillAnnotations {
    #[serde(rename = "llm:description", skip_serializing_if = "Option::is_none")]
    pub llm_description: Option<String>,
    #[serde(rename = "mcp:tools", skip_serializing_if = "Option::is_none")]
    pub mcp_tools: Option<McpFilterMode>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum McpFilterMode {
    NoFilter,
    AllowOnly,
    Overlay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub source: String,
    pub input_schema: serde_json::Value,
    pub output_schema: serde_json::Value,
    #[serde(default)]
    pub transform: Option<String>,
    #[serde(default)]
    pub exported_actions: Vec<String>,
    #[serde(default)]
    pub annotations: SkillAnnotations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependencyKind {
    Skill,
    Resource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependency {
    pub path: String,
    pub kind: DependencyKind,
    pub alias: String,
    #[serde(default)]
    pub export: bool,
    #[serde(default)]
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillSet {
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub context: Vec<Context>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

/// Compact summary persisted alongside the full metadata row, so List
/// operations can enumerate tools without reading the full blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillSetSummary {
    pub skills: Vec<SkillSummary>,
    pub dependencies: Vec<Dependency>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillSummary {
    pub name: String,
    pub exported_actions: Vec<String>,
}

impl SkillSet {
    pub fn summary(&self) -> SkillSetSummary {
        SkillSetSummary {
            skills: self
                .skills
                .iter()
                .map(|s| SkillSummary { name: s.name.clone(), exported_actions: s.exported_actions.clone() })
                .collect(),
            dependencies: self.dependencies.clone(),
        }
    }
}

/// `{name, description, inputSchema, outputSchema}` emitted by
/// `GetAllSkillsAsLLMTools`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmTool {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
    pub output_schema: serde_json::Value,
}
