//! The policy engine: rule representation, `res://` canonicalization,
//! action-on-target evaluation, subset-containment, and the view-context
//! helpers the session broker consumes.

pub mod canonicalize;
pub mod engine;
pub mod types;

pub use canonicalize::{canonical_string, canonicalize};
pub use engine::{
    are_actions_allowed_on_resource, can_adopt_view, can_use_skillset, is_action_allowed_on_resource,
    is_subset_of, segment_match, validate_derived_view, MatchBasis,
};
pub use types::{Action, Intent, Rule, Scope, TargetResource, ViewDefinition};
