//! The central, immutable validator set: name/path regexes, kind checks,
//! version compatibility, and JSON Schema compilation.
//!
//! Constructed once at startup and shared behind an `Arc` — this is the
//! "single immutable `Validators` value" the design notes call for,
//! replacing the teacher's process-global registry pattern.

use crate::error::ValidationIssue;
use crate::metadata::{ApiVersion, Kind};
use regex::Regex;
use std::str::FromStr;

pub const RESOURCE_NAME_PATTERN: &str = r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$";
pub const SKILL_NAME_PATTERN: &str = r"^[a-z0-9](?:[_-]?[a-z0-9]+)*$";
pub const MAX_NAME_LEN: usize = 63;

#[derive(Debug)]
pub struct Validators {
    resource_name: Regex,
    skill_name: Regex,
}

impl Default for Validators {
    fn default() -> Self {
        Self::new()
    }
}

impl Validators {
    pub fn new() -> Self {
        Self {
            resource_name: Regex::new(RESOURCE_NAME_PATTERN).expect("static regex"),
            skill_name: Regex::new(SKILL_NAME_PATTERN).expect("static regex"),
        }
    }

    /// `resourceNameValidator`.
    pub fn validate_resource_name(&self, value: &str) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if value.len() > MAX_NAME_LEN {
            issues.push(ValidationIssue::new("name", value, format!("exceeds {MAX_NAME_LEN} characters")));
        }
        if !self.resource_name.is_match(value) {
            issues.push(ValidationIssue::new("name", value, "does not match resource name pattern"));
        }
        issues
    }

    /// `skillNameValidator`.
    pub fn validate_skill_name(&self, value: &str) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if value.len() > MAX_NAME_LEN {
            issues.push(ValidationIssue::new("name", value, format!("exceeds {MAX_NAME_LEN} characters")));
        }
        if !self.skill_name.is_match(value) {
            issues.push(ValidationIssue::new("name", value, "does not match skill name pattern"));
        }
        issues
    }

    /// `resourcePathValidator`: must begin with `/`; each non-empty segment
    /// matches the resource-name regex.
    pub fn validate_resource_path(&self, value: &str) -> Vec<ValidationIssue> {
        self.validate_path(value, &self.resource_name, &self.resource_name)
    }

    /// `skillPathValidator`: same as resource path, with the final segment
    /// validated by the skill-name regex.
    pub fn validate_skill_path(&self, value: &str) -> Vec<ValidationIssue> {
        self.validate_path(value, &self.resource_name, &self.skill_name)
    }

    fn validate_path(&self, value: &str, segment_re: &Regex, final_re: &Regex) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if !value.starts_with('/') {
            issues.push(ValidationIssue::new("path", value, "must begin with '/'"));
            return issues;
        }
        let segments: Vec<&str> = value.split('/').filter(|s| !s.is_empty()).collect();
        for (i, seg) in segments.iter().enumerate() {
            let re = if i + 1 == segments.len() { final_re } else { segment_re };
            if !re.is_match(seg) {
                issues.push(ValidationIssue::new(
                    format!("path[{i}]"),
                    *seg,
                    "segment does not match required pattern",
                ));
            }
        }
        issues
    }

    /// `kindValidator`.
    pub fn validate_kind(&self, value: &str) -> Result<Kind, ValidationIssue> {
        Kind::from_str(value).map_err(|_| {
            ValidationIssue::new(
                "kind",
                value,
                "must be one of Catalog, Variant, Namespace, Resource, SkillSet, View",
            )
        })
    }

    /// `validateVersion`.
    pub fn validate_version(&self, value: &str) -> Result<ApiVersion, ValidationIssue> {
        ApiVersion::parse(value).map_err(|e| ValidationIssue::new("apiVersion", value, e.to_string()))
    }

    /// `jsonSchemaValidator`: the buffer is valid JSON and compiles as a
    /// JSON Schema.
    pub fn validate_json_schema(&self, buffer: &[u8]) -> Result<serde_json::Value, ValidationIssue> {
        let value: serde_json::Value = serde_json::from_slice(buffer)
            .map_err(|e| ValidationIssue::new("schema", "<buffer>", format!("invalid JSON: {e}")))?;
        jsonschema::validator_for(&value)
            .map_err(|e| ValidationIssue::new("schema", "<buffer>", format!("invalid JSON Schema: {e}")))?;
        Ok(value)
    }

    /// Compile a JSON Schema value into a reusable validator.
    pub fn compile_schema(&self, schema: &serde_json::Value) -> Result<jsonschema::Validator, ValidationIssue> {
        jsonschema::validator_for(schema)
            .map_err(|e| ValidationIssue::new("schema", "<value>", format!("invalid JSON Schema: {e}")))
    }

    /// Validate an instance against a schema value, returning issues (empty
    /// = valid). Used for Resource `value`-against-`schema` and SkillSet
    /// Context/Skill schema checks.
    pub fn validate_instance(
        &self,
        schema: &serde_json::Value,
        instance: &serde_json::Value,
    ) -> Result<Vec<ValidationIssue>, ValidationIssue> {
        let compiled = self.compile_schema(schema)?;
        let issues = compiled
            .iter_errors(instance)
            .map(|e| ValidationIssue::new(e.instance_path.to_string(), e.instance.to_string(), e.to_string()))
            .collect();
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn name_length_boundary() {
        let v = Validators::new();
        let ok = "a".repeat(63);
        let bad = "a".repeat(64);
        assert!(v.validate_resource_name(&ok).is_empty());
        assert!(!v.validate_resource_name(&bad).is_empty());
    }

    #[test]
    fn resource_path_requires_leading_slash() {
        let v = Validators::new();
        assert!(!v.validate_resource_path("no-leading-slash").is_empty());
        assert!(v.validate_resource_path("/a/b/c").is_empty());
    }

    #[test]
    fn skill_path_validates_final_segment_with_skill_regex() {
        let v = Validators::new();
        assert!(v.validate_skill_path("/ns/my_skill").is_empty());
        assert!(!v.validate_skill_path("/ns/Invalid_Name!").is_empty());
    }

    #[test]
    fn kind_validator_rejects_unknown() {
        let v = Validators::new();
        assert!(v.validate_kind("Catalog").is_ok());
        assert!(v.validate_kind("Bogus").is_err());
    }

    #[test]
    fn instance_validation_accepts_and_rejects() {
        let v = Validators::new();
        let schema = json!({"type": "integer"});
        assert!(v.validate_instance(&schema, &json!(42)).unwrap().is_empty());
        assert!(!v.validate_instance(&schema, &json!("x")).unwrap().is_empty());
    }
}
