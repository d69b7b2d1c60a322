//! Scope-dependent canonicalization of `res://` targets into an absolute
//! segment path.

use crate::types::{Scope, TargetResource};
use ctlplane_core::error::CoreError;

/// Kinds whose targets are already absolute (they carry their own
/// catalog/variant/namespace identifiers) and are never scope-prefixed.
const ABSOLUTE_KINDS: &[&str] = &["catalogs", "variants", "namespaces"];

/// Expand `target` against `scope` into a canonical absolute segment path
/// (no `res://` prefix), rewriting `/resources/definition/...` to
/// `/resources/...` first.
pub fn canonicalize(scope: &Scope, target: &TargetResource) -> Result<Vec<String>, CoreError> {
    let rest = target
        .as_str()
        .strip_prefix("res://")
        .ok_or_else(|| CoreError::InvalidResourceUri(target.as_str().to_string()))?;
    let mut segments: Vec<String> = rest.split('/').map(str::to_string).collect();

    if segments.first().map(String::as_str) == Some("resources")
        && segments.get(1).map(String::as_str) == Some("definition")
    {
        segments.remove(1);
    }

    let kind = segments.first().cloned().unwrap_or_default();
    if ABSOLUTE_KINDS.contains(&kind.as_str()) {
        return Ok(segments);
    }

    // Scoped kinds (resources, skillsets, views) and the bare `*` wildcard
    // are relative to the current catalog/variant/namespace.
    let mut prefix = vec!["catalogs".to_string(), scope.catalog.clone()];
    if let Some(variant) = &scope.variant {
        prefix.push("variants".to_string());
        prefix.push(variant.clone());
    }
    if let Some(namespace) = &scope.namespace {
        prefix.push("namespaces".to_string());
        prefix.push(namespace.clone());
    }
    prefix.extend(segments);
    Ok(prefix)
}

pub fn canonical_string(scope: &Scope, target: &TargetResource) -> Result<String, CoreError> {
    Ok(format!("res://{}", canonicalize(scope, target)?.join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Scope {
        Scope { catalog: "acme".into(), variant: Some("dev".into()), namespace: None }
    }

    #[test]
    fn scoped_kind_gets_prefixed() {
        let target = TargetResource::parse("res://resources/*").unwrap();
        let segs = canonicalize(&scope(), &target).unwrap();
        assert_eq!(segs, vec!["catalogs", "acme", "variants", "dev", "resources", "*"]);
    }

    #[test]
    fn absolute_kind_is_unchanged() {
        let target = TargetResource::parse("res://catalogs/other-catalog").unwrap();
        let segs = canonicalize(&scope(), &target).unwrap();
        assert_eq!(segs, vec!["catalogs", "other-catalog"]);
    }

    #[test]
    fn resources_definition_prefix_is_rewritten() {
        let target = TargetResource::parse("res://resources/definition/widget").unwrap();
        let segs = canonicalize(&scope(), &target).unwrap();
        assert_eq!(
            segs,
            vec!["catalogs", "acme", "variants", "dev", "resources", "widget"]
        );
    }

    #[test]
    fn idempotent_on_already_canonical_absolute_targets() {
        let target = TargetResource::parse("res://catalogs/acme/variants/dev").unwrap();
        let once = canonicalize(&scope(), &target).unwrap();
        let reparsed = TargetResource::parse(&format!("res://{}", once.join("/"))).unwrap();
        let twice = canonicalize(&scope(), &reparsed).unwrap();
        assert_eq!(once, twice);
    }
}
