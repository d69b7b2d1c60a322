//! Core policy vocabulary: actions, resource targets, rules, scopes, and
//! the view definition they compose into.

use ctlplane_core::error::CoreError;
use serde::{Deserialize, Serialize};

/// A dotted action token, e.g. `system.catalog.list`. The literal string
/// `"allow"` is reserved as an internal sentinel and is never accepted as
/// an externally-supplied action (closes the spec's Open Question about
/// the sentinel's reachability).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Action(String);

const ADMIN_ACTIONS: &[&str] =
    &["system.catalog.admin", "system.variant.admin", "system.namespace.admin"];

impl Action {
    pub fn new(value: impl Into<String>) -> Result<Self, CoreError> {
        let value = value.into();
        if value == "allow" {
            return Err(CoreError::InvalidInput(
                "\"allow\" is a reserved internal sentinel, not a valid action".into(),
            ));
        }
        let segments: Vec<&str> = value.split('.').collect();
        if segments.len() < 2 || segments.iter().any(|s| s.is_empty() || !is_token(s)) {
            return Err(CoreError::InvalidInput(format!("invalid action token: {value:?}")));
        }
        Ok(Self(value))
    }

    /// Construct the internal `"allow"` sentinel, used only by the policy
    /// engine itself, never accepted from external input.
    pub(crate) fn allow_sentinel() -> Self {
        Self("allow".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        ADMIN_ACTIONS.contains(&self.0.as_str())
    }

    /// The "List" action family: actions whose final dotted component is
    /// `list`.
    pub fn is_list_action(&self) -> bool {
        self.0.ends_with(".list")
    }
}

fn is_token(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

impl TryFrom<String> for Action {
    type Error = CoreError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Action::new(value)
    }
}

impl From<Action> for String {
    fn from(value: Action) -> Self {
        value.0
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A `res://` canonical URI, kept in its original (pre-canonicalization)
/// form; canonicalization is scope-dependent and happens at evaluation
/// time, not at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetResource(String);

const RECOGNIZED_KINDS: &[&str] =
    &["catalogs", "variants", "namespaces", "resources", "skillsets", "views"];

impl TargetResource {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let rest = raw
            .strip_prefix("res://")
            .ok_or_else(|| CoreError::InvalidResourceUri(raw.to_string()))?;
        let raw_segments: Vec<&str> = rest.split('/').collect();
        let n = raw_segments.len();
        let mut cleaned: Vec<&str> = Vec::new();
        for (i, seg) in raw_segments.iter().enumerate() {
            if seg.is_empty() || *seg == "." {
                continue;
            }
            if *seg == "*" && i + 1 != n {
                return Err(CoreError::InvalidResourceUri(format!(
                    "{raw}: '*' only permitted as the final segment"
                )));
            }
            cleaned.push(seg);
        }
        if cleaned.is_empty() {
            return Err(CoreError::InvalidResourceUri(raw.to_string()));
        }
        if cleaned[0] != "*" && !RECOGNIZED_KINDS.contains(&cleaned[0]) {
            return Err(CoreError::InvalidResourceUri(format!(
                "{raw}: unrecognized kind {:?}",
                cleaned[0]
            )));
        }
        Ok(Self(format!("res://{}", cleaned.join("/"))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TargetResource {
    type Error = CoreError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        TargetResource::parse(&value)
    }
}

impl From<TargetResource> for String {
    fn from(value: TargetResource) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub intent: Intent,
    pub actions: Vec<Action>,
    #[serde(default)]
    pub targets: Vec<TargetResource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub catalog: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDefinition {
    pub scope: Scope,
    pub rules: Vec<Rule>,
}

pub(crate) fn allow_sentinel_action() -> Action {
    Action::allow_sentinel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_rejects_allow_sentinel() {
        assert!(Action::new("allow").is_err());
    }

    #[test]
    fn action_requires_two_segments() {
        assert!(Action::new("single").is_err());
        assert!(Action::new("system.catalog.list").is_ok());
    }

    #[test]
    fn target_rejects_nonterminal_wildcard() {
        assert!(TargetResource::parse("res://resources/*/foo").is_err());
    }

    #[test]
    fn target_accepts_terminal_wildcard_and_global() {
        assert!(TargetResource::parse("res://resources/*").is_ok());
        assert!(TargetResource::parse("res://*").is_ok());
    }

    #[test]
    fn target_rejects_unrecognized_kind() {
        assert!(TargetResource::parse("res://bogus/x").is_err());
    }
}
