//! Rule evaluation: action-on-target authorization, subset-containment
//! for derived views, and the context helpers built atop both.

use crate::canonicalize::canonicalize;
use crate::types::{allow_sentinel_action, Action, Intent, Rule, TargetResource, ViewDefinition};
use ctlplane_core::error::{CoreError, CoreResult};

/// The rules that contributed to an authorization decision, surfaced to
/// callers (and audit records) as the "matched-rule basis".
#[derive(Debug, Clone, Default)]
pub struct MatchBasis {
    pub allow: Vec<Rule>,
    pub deny: Vec<Rule>,
}

/// Split both rule and actual segment vectors per the spec's segment-match
/// semantics: a rule `*` matches any single segment, and a trailing rule
/// `*` matches arbitrary trailing segments.
pub fn segment_match(rule: &[String], actual: &[String]) -> bool {
    let r = rule.len();
    let a = actual.len();
    if r > a {
        return false;
    }
    if r < a && rule.last().map(String::as_str) != Some("*") {
        return false;
    }
    for (i, rule_seg) in rule.iter().enumerate() {
        if rule_seg == "*" {
            continue;
        }
        if rule_seg != &actual[i] {
            return false;
        }
    }
    true
}

/// `resource` is a prefix of `target`: every segment of `resource` equals
/// the corresponding segment of `target`, and `resource` is no longer.
fn is_prefix(resource: &[String], target: &[String]) -> bool {
    resource.len() <= target.len() && resource.iter().zip(target.iter()).all(|(r, t)| r == t)
}

fn admin_boundary_grants(admin_action: &str, target: &[String], resource: &[String]) -> bool {
    let check = |depth: usize| -> bool {
        if target.len() < depth || resource.len() < depth {
            return false;
        }
        target[..depth] == resource[..depth]
    };
    match admin_action {
        "system.catalog.admin" => target.first().map(String::as_str) == Some("catalogs") && check(2),
        "system.variant.admin" => {
            target.get(2).map(String::as_str) == Some("variants")
                && resource.get(2).map(String::as_str) == Some("variants")
                && check(4)
        }
        "system.namespace.admin" => {
            target.get(4).map(String::as_str) == Some("namespaces")
                && resource.get(4).map(String::as_str) == Some("namespaces")
                && check(6)
        }
        _ => false,
    }
}

/// `IsActionAllowedOnResource`.
pub fn is_action_allowed_on_resource(
    view: &ViewDefinition,
    action: &Action,
    resource: &TargetResource,
) -> CoreResult<(bool, MatchBasis)> {
    let sentinel = allow_sentinel_action();
    let mut allow_match = action == &sentinel;
    let mut basis = MatchBasis::default();
    let resource_segments = canonicalize(&view.scope, resource)?;

    let mut admin_matched = false;
    for rule in view.rules.iter().filter(|r| r.intent == Intent::Allow) {
        for admin_action in rule.actions.iter().filter(|a| a.is_admin()) {
            for target in &rule.targets {
                let target_segments = canonicalize(&view.scope, target)?;
                if admin_boundary_grants(admin_action.as_str(), &target_segments, &resource_segments) {
                    allow_match = true;
                    admin_matched = true;
                    if !basis.allow.contains(rule) {
                        basis.allow.push(rule.clone());
                    }
                }
            }
        }
    }

    for rule in &view.rules {
        if !rule.actions.contains(action) {
            continue;
        }
        match rule.intent {
            Intent::Allow => {
                for target in &rule.targets {
                    let target_segments = canonicalize(&view.scope, target)?;
                    if segment_match(&target_segments, &resource_segments) {
                        allow_match = true;
                        if !basis.allow.contains(rule) {
                            basis.allow.push(rule.clone());
                        }
                    }
                }
            }
            Intent::Deny => {
                for target in &rule.targets {
                    let target_segments = canonicalize(&view.scope, target)?;
                    if segment_match(&target_segments, &resource_segments)
                        || is_prefix(&resource_segments, &target_segments)
                    {
                        allow_match = false;
                        if !basis.deny.contains(rule) {
                            basis.deny.push(rule.clone());
                        }
                    }
                }
            }
        }
    }

    // The List action family bypasses Deny when an Allow-admin match
    // exists for the same kind (resolved Open Question: deliberate).
    if action.is_list_action() && admin_matched {
        allow_match = true;
    }

    Ok((allow_match, basis))
}

/// `IsSubsetOf`: child is a subset of parent iff every `(action, target)`
/// pair from an Allow rule in child is allowed by parent. Scopes must be
/// identical.
pub fn is_subset_of(child: &ViewDefinition, parent: &ViewDefinition) -> CoreResult<bool> {
    if child.scope != parent.scope {
        return Ok(false);
    }
    for rule in child.rules.iter().filter(|r| r.intent == Intent::Allow) {
        for action in &rule.actions {
            for target in &rule.targets {
                let (allowed, _) = is_action_allowed_on_resource(parent, action, target)?;
                if !allowed {
                    return Ok(false);
                }
            }
        }
    }
    Ok(true)
}

/// `CanAdoptView`: the authorized view must allow `system.catalog.adoptView`
/// on `/views/<viewName>`. In single-user mode with a User subject, default
/// allow.
pub fn can_adopt_view(
    view: &ViewDefinition,
    view_name: &str,
    single_user_mode: bool,
    subject_is_user: bool,
) -> CoreResult<bool> {
    if single_user_mode && subject_is_user {
        return Ok(true);
    }
    let action = Action::new("system.catalog.adoptView")?;
    let target = TargetResource::parse(&format!("res://views/{view_name}"))?;
    is_action_allowed_on_resource(view, &action, &target).map(|(allowed, _)| allowed)
}

/// `CanUseSkillSet`: authorized view must allow `system.skillset.use` on
/// `/skillsets/<path>`.
pub fn can_use_skillset(view: &ViewDefinition, path: &str) -> CoreResult<bool> {
    let action = Action::new("system.skillset.use")?;
    let trimmed = path.trim_start_matches('/');
    let target = TargetResource::parse(&format!("res://skillsets/{trimmed}"))?;
    is_action_allowed_on_resource(view, &action, &target).map(|(allowed, _)| allowed)
}

/// `AreActionsAllowedOnResource`: every action must be allowed on the
/// canonicalized resource.
pub fn are_actions_allowed_on_resource(
    view: &ViewDefinition,
    resource: &TargetResource,
    actions: &[Action],
) -> CoreResult<bool> {
    for action in actions {
        let (allowed, _) = is_action_allowed_on_resource(view, action, resource)?;
        if !allowed {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Derived-view validation: parent and child must share scope and the
/// child's rules must be a subset of the parent's.
pub fn validate_derived_view(child: &ViewDefinition, parent: &ViewDefinition) -> CoreResult<()> {
    if child.scope != parent.scope {
        return Err(CoreError::InvalidObject(
            "derived view scope must match parent scope".into(),
        ));
    }
    if !is_subset_of(child, parent)? {
        return Err(CoreError::DisallowedByPolicy(
            "derived view rules are not a subset of the parent view".into(),
        ));
    }
    Ok(())
}
