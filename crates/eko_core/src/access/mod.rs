//! Route gating for the dashboard UI.
//!
//! # Responsibility
//! - Parse the role hierarchy and allow-rules.
//! - Answer "may this role perform this action on this route object".
//!
//! # Invariants
//! - Id-bearing actions are checked against `resource/id`, so a rule on
//!   `resource/*` covers every record while a rule on `resource` does not.

pub mod matcher;
pub mod policy;

pub use matcher::{compile_action_pattern, key_match};
pub use policy::{AccessPolicy, PolicyError, PolicyRule, DEFAULT_POLICY};

use once_cell::sync::Lazy;

static DEFAULT: Lazy<AccessPolicy> =
    Lazy::new(|| AccessPolicy::parse(DEFAULT_POLICY).expect("valid built-in policy"));

/// The parsed [`DEFAULT_POLICY`].
pub fn default_policy() -> &'static AccessPolicy {
    &DEFAULT
}

/// Object/action pair for one UI route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest {
    pub object: String,
    pub action: String,
}

impl AccessRequest {
    /// Builds the request a route check needs.
    ///
    /// `edit`, `show`, `delete` and `clone` with an id target `resource/id`;
    /// everything else targets `resource`.
    pub fn for_route(resource: &str, action: &str, id: Option<&str>) -> Self {
        let id = id.map(str::trim).filter(|id| !id.is_empty());
        let object = match (action, id) {
            ("edit" | "show" | "delete" | "clone", Some(id)) => format!("{resource}/{id}"),
            _ => resource.to_string(),
        };
        Self {
            object,
            action: action.to_string(),
        }
    }
}

/// Seam the UI gates routes on.
pub trait PolicyEvaluator {
    fn can(&self, subject: &str, request: &AccessRequest) -> bool;
}

impl PolicyEvaluator for AccessPolicy {
    fn can(&self, subject: &str, request: &AccessRequest) -> bool {
        self.enforce(subject, &request.object, &request.action)
    }
}

impl<P: PolicyEvaluator + ?Sized> PolicyEvaluator for &P {
    fn can(&self, subject: &str, request: &AccessRequest) -> bool {
        (**self).can(subject, request)
    }
}
