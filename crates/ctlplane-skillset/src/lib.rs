pub mod manager;
pub mod redact;
pub mod transform;
pub mod types;

pub use manager::SkillSetManager;
pub use redact::short_hash8;
pub use transform::{SyntacticTransformValidator, TransformValidator};
pub use types::{
    Context, ContextAttributes, Dependency, DependencyKind, LlmTool, McpFilterMode, Skill,
    SkillAnnotations, SkillSet, SkillSetSummary, SkillSummary, Source,
};
