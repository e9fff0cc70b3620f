use std::collections::{BTreeMap, BTreeSet};

use backoffice_domain::Permission;
use tracing::debug;

use crate::RbacEvaluator;

/// Permission condition attached to one UI element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// A single permission.
    Permission(Permission),
    /// At least one of the permissions.
    AnyOf(Vec<Permission>),
    /// Every one of the permissions.
    AllOf(Vec<Permission>),
}

impl Requirement {
    /// Evaluates the requirement against the current session.
    #[must_use]
    pub fn is_met(&self, evaluator: &RbacEvaluator) -> bool {
        match self {
            Self::Permission(permission) => evaluator.has_permission(permission.as_str()),
            Self::AnyOf(permissions) => evaluator.has_any(permissions.iter().map(Permission::as_str)),
            Self::AllOf(permissions) => evaluator.has_all(permissions.iter().map(Permission::as_str)),
        }
    }
}

impl From<Permission> for Requirement {
    fn from(value: Permission) -> Self {
        Self::Permission(value)
    }
}

/// Receiver of hide instructions, e.g. a view's element registry.
pub trait GateTarget {
    /// Hides the element with the given identifier.
    fn hide(&mut self, element_id: &str);
}

/// Set of hidden element identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visibility {
    hidden: BTreeSet<String>,
}

impl Visibility {
    /// Returns whether the element is still shown.
    #[must_use]
    pub fn is_visible(&self, element_id: &str) -> bool {
        !self.hidden.contains(element_id)
    }

    /// Returns hidden element identifiers.
    #[must_use]
    pub fn hidden(&self) -> &BTreeSet<String> {
        &self.hidden
    }
}

impl GateTarget for Visibility {
    fn hide(&mut self, element_id: &str) {
        self.hidden.insert(element_id.to_owned());
    }
}

/// Declarative element → permission map applied after every role change.
///
/// Hiding is cosmetic; the server enforces authorization.
#[derive(Debug, Clone, Default)]
pub struct UiGate {
    rules: BTreeMap<String, Requirement>,
    applied_generation: Option<u64>,
}

impl UiGate {
    /// Creates a gate without rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule for one element.
    #[must_use]
    pub fn rule(mut self, element_id: impl Into<String>, requirement: impl Into<Requirement>) -> Self {
        self.rules.insert(element_id.into(), requirement.into());
        self
    }

    /// Hides every element whose requirement fails and returns their ids.
    ///
    /// Never un-hides anything on the target.
    pub fn apply(&mut self, evaluator: &RbacEvaluator, target: &mut dyn GateTarget) -> Vec<String> {
        let hidden: Vec<String> = self
            .rules
            .iter()
            .filter(|(_, requirement)| !requirement.is_met(evaluator))
            .map(|(element_id, _)| element_id.clone())
            .collect();

        for element_id in &hidden {
            target.hide(element_id.as_str());
        }

        self.applied_generation = Some(evaluator.generation());
        debug!(
            rule_count = self.rules.len(),
            hidden_count = hidden.len(),
            generation = evaluator.generation(),
            "ui gate applied"
        );

        hidden
    }

    /// Returns whether the evaluator's session changed since the last pass.
    #[must_use]
    pub fn needs_refresh(&self, evaluator: &RbacEvaluator) -> bool {
        self.applied_generation != Some(evaluator.generation())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use backoffice_domain::{Action, Resource};
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use crate::{PermissionRegistry, RbacEvaluator, UninitializedPolicy};

    use super::{Requirement, UiGate, Visibility};

    fn token_for_role(role: &str) -> String {
        format!(
            "h.{}.s",
            URL_SAFE_NO_PAD.encode(format!(r#"{{"userId":"u-1","role":"{role}"}}"#))
        )
    }

    fn gate() -> UiGate {
        UiGate::new()
            .rule("add-company", Resource::Companies.permission(Action::Create))
            .rule("delete-user", Resource::Users.permission(Action::Delete))
            .rule(
                "settings-menu",
                Requirement::AnyOf(vec![
                    Resource::Roles.permission(Action::View),
                    Resource::Plans.permission(Action::Edit),
                ]),
            )
            .rule(
                "bulk-import",
                Requirement::AllOf(vec![
                    Resource::Users.permission(Action::Create),
                    Resource::Companies.permission(Action::Create),
                ]),
            )
    }

    #[test]
    fn hides_elements_the_role_cannot_use() {
        let mut evaluator = RbacEvaluator::new(Arc::new(PermissionRegistry::builtin()));
        let token = token_for_role("manager");
        assert!(evaluator.initialize(Some(token.as_str())));

        let mut visibility = Visibility::default();
        let hidden = gate().apply(&evaluator, &mut visibility);

        assert_eq!(hidden, vec!["delete-user".to_owned(), "settings-menu".to_owned()]);
        assert!(visibility.is_visible("add-company"));
        assert!(visibility.is_visible("bulk-import"));
    }

    #[test]
    fn second_pass_never_reshows_elements() {
        let registry = Arc::new(PermissionRegistry::builtin());
        let mut evaluator = RbacEvaluator::new(registry)
            .with_uninitialized_policy(UninitializedPolicy::FailClosed);
        let mut gate = gate();
        let mut visibility = Visibility::default();

        gate.apply(&evaluator, &mut visibility);
        assert_eq!(visibility.hidden().len(), 4);

        let token = token_for_role("superadmin");
        assert!(evaluator.initialize(Some(token.as_str())));
        assert!(gate.needs_refresh(&evaluator));

        let hidden = gate.apply(&evaluator, &mut visibility);
        assert!(hidden.is_empty());
        assert_eq!(visibility.hidden().len(), 4);
        assert!(!gate.needs_refresh(&evaluator));
    }

    #[test]
    fn fresh_gate_needs_refresh() {
        let evaluator = RbacEvaluator::new(Arc::new(PermissionRegistry::builtin()));
        assert!(UiGate::new().needs_refresh(&evaluator));
    }
}
