use std::collections::BTreeSet;
use std::str::FromStr;

use backoffice_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::resource::{Action, Resource};

/// Wildcard grant value accepted in role documents.
pub const WILDCARD_GRANT: &str = "*";

/// Name of the builtin role that always has every permission.
pub const SUPER_ROLE_NAME: &str = "SUPERADMIN";

/// Permission identifier namespaced as `resource:action`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Permission(String);

impl Permission {
    /// Creates a permission from its two halves.
    pub fn new(resource: &str, action: &str) -> AppResult<Self> {
        let resource = resource.trim().to_lowercase();
        let action = action.trim().to_lowercase();

        if resource.is_empty() || action.is_empty() {
            return Err(AppError::Validation(format!(
                "permission '{resource}:{action}' must name both a resource and an action"
            )));
        }

        if resource.contains(':') || action.contains(':') {
            return Err(AppError::Validation(format!(
                "permission '{resource}:{action}' must contain exactly one ':'"
            )));
        }

        Ok(Self(format!("{resource}:{action}")))
    }

    /// Builds a permission from static lowercase identifiers without ':'.
    pub(crate) fn from_static(resource: &'static str, action: &'static str) -> Self {
        Self(format!("{resource}:{action}"))
    }

    /// Returns the canonical `resource:action` value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the resource half.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.0.split_once(':').map_or("", |(resource, _)| resource)
    }

    /// Returns the action half.
    #[must_use]
    pub fn action(&self) -> &str {
        self.0.split_once(':').map_or("", |(_, action)| action)
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (resource, action) = value.split_once(':').ok_or_else(|| {
            AppError::Validation(format!(
                "permission '{value}' must be formatted as 'resource:action'"
            ))
        })?;

        Self::new(resource, action)
    }
}

impl TryFrom<String> for Permission {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(value.as_str())
    }
}

impl From<Permission> for String {
    fn from(value: Permission) -> Self {
        value.0
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// One entry of a role's permission list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PermissionGrant {
    /// Expands to every defined permission.
    AllPermissions,
    /// A single concrete permission.
    Permission(Permission),
}

impl PermissionGrant {
    /// Returns the transport value for this grant.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::AllPermissions => WILDCARD_GRANT,
            Self::Permission(permission) => permission.as_str(),
        }
    }
}

impl FromStr for PermissionGrant {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim() == WILDCARD_GRANT {
            return Ok(Self::AllPermissions);
        }

        Permission::from_str(value).map(Self::Permission)
    }
}

impl TryFrom<String> for PermissionGrant {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(value.as_str())
    }
}

impl From<PermissionGrant> for String {
    fn from(value: PermissionGrant) -> Self {
        match value {
            PermissionGrant::AllPermissions => WILDCARD_GRANT.to_owned(),
            PermissionGrant::Permission(permission) => permission.into(),
        }
    }
}

impl From<Permission> for PermissionGrant {
    fn from(value: Permission) -> Self {
        Self::Permission(value)
    }
}

/// Normalized role name.
///
/// Role claims arrive in mixed case (`admin`, `Admin`, ` ADMIN `); every
/// comparison happens on the trimmed, uppercased form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName(String);

impl RoleName {
    /// Creates a validated, normalized role name.
    pub fn new(value: &str) -> AppResult<Self> {
        let normalized = Self::normalize(value);
        if normalized.is_empty() {
            return Err(AppError::Validation(
                "role name must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the builtin super-role name.
    #[must_use]
    pub fn super_role() -> Self {
        Self(SUPER_ROLE_NAME.to_owned())
    }

    /// Returns the normalized form of a raw role name.
    #[must_use]
    pub fn normalize(value: &str) -> String {
        value.trim().to_uppercase()
    }

    /// Returns the normalized role name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for RoleName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value.as_str())
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Role definition as cached by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    id: String,
    name: RoleName,
    grants: Vec<PermissionGrant>,
    is_system: bool,
}

impl Role {
    /// Creates a role definition.
    pub fn new(
        id: impl Into<String>,
        name: &str,
        grants: Vec<PermissionGrant>,
        is_system: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            id: id.into(),
            name: RoleName::new(name)?,
            grants,
            is_system,
        })
    }

    /// Returns the stable role identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the normalized role name.
    #[must_use]
    pub fn name(&self) -> &RoleName {
        &self.name
    }

    /// Returns the grants exactly as defined.
    #[must_use]
    pub fn grants(&self) -> &[PermissionGrant] {
        &self.grants
    }

    /// Indicates a system-managed role.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.is_system
    }

    /// Returns whether the role carries the wildcard grant.
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        self.grants
            .iter()
            .any(|grant| matches!(grant, PermissionGrant::AllPermissions))
    }

    /// Returns the concrete permissions named by this role.
    pub fn concrete_permissions(&self) -> impl Iterator<Item = &Permission> {
        self.grants.iter().filter_map(|grant| match grant {
            PermissionGrant::AllPermissions => None,
            PermissionGrant::Permission(permission) => Some(permission),
        })
    }

    /// Fails when the role is system-managed and may not be edited.
    pub fn ensure_mutable(&self) -> AppResult<()> {
        if self.is_system {
            return Err(AppError::Conflict(format!(
                "system role '{}' cannot be modified",
                self.name
            )));
        }

        Ok(())
    }

    /// Fails when the role is system-managed and may not be deleted.
    pub fn ensure_deletable(&self) -> AppResult<()> {
        if self.is_system {
            return Err(AppError::Conflict(format!(
                "system role '{}' cannot be deleted",
                self.name
            )));
        }

        Ok(())
    }
}

/// Returns every permission defined by the dashboard itself.
#[must_use]
pub fn builtin_permissions() -> BTreeSet<Permission> {
    let mut permissions = BTreeSet::from([dashboard_view()]);
    for resource in Resource::all() {
        for action in Action::all() {
            permissions.insert(resource.permission(*action));
        }
    }

    permissions
}

/// Returns the roles shipped with the dashboard.
#[must_use]
pub fn builtin_roles() -> Vec<Role> {
    let admin_grants = builtin_permissions()
        .into_iter()
        .filter(|permission| {
            *permission != Resource::Roles.permission(Action::Delete)
                && *permission != Resource::Plans.permission(Action::Delete)
        })
        .map(PermissionGrant::from)
        .collect();

    let manager_grants = [
        Resource::Companies.permission(Action::View),
        Resource::Companies.permission(Action::Create),
        Resource::Companies.permission(Action::Edit),
        Resource::Users.permission(Action::View),
        Resource::Users.permission(Action::Create),
        Resource::Users.permission(Action::Edit),
        Resource::Modules.permission(Action::View),
        Resource::Plans.permission(Action::View),
    ];

    let user_grants = [
        Resource::Companies.permission(Action::View),
        Resource::Users.permission(Action::View),
        Resource::Modules.permission(Action::View),
    ];

    vec![
        Role {
            id: "builtin-superadmin".to_owned(),
            name: RoleName::super_role(),
            grants: vec![PermissionGrant::AllPermissions],
            is_system: true,
        },
        Role {
            id: "builtin-admin".to_owned(),
            name: RoleName("ADMIN".to_owned()),
            grants: admin_grants,
            is_system: true,
        },
        Role {
            id: "builtin-manager".to_owned(),
            name: RoleName("MANAGER".to_owned()),
            grants: with_dashboard(manager_grants),
            is_system: false,
        },
        Role {
            id: "builtin-user".to_owned(),
            name: RoleName("USER".to_owned()),
            grants: with_dashboard(user_grants),
            is_system: false,
        },
    ]
}

fn dashboard_view() -> Permission {
    Permission::from_static("dashboard", "view")
}

fn with_dashboard<const N: usize>(permissions: [Permission; N]) -> Vec<PermissionGrant> {
    std::iter::once(dashboard_view())
        .chain(permissions)
        .map(PermissionGrant::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::{
        Permission, PermissionGrant, RoleName, SUPER_ROLE_NAME, builtin_permissions,
        builtin_roles,
    };

    #[test]
    fn permission_parses_resource_and_action() {
        let permission = Permission::from_str("Users:Create");
        assert!(permission.is_ok());

        let permission = permission.unwrap_or_else(|_| panic!("test"));
        assert_eq!(permission.as_str(), "users:create");
        assert_eq!(permission.resource(), "users");
        assert_eq!(permission.action(), "create");
    }

    #[test]
    fn malformed_permissions_are_rejected() {
        assert!(Permission::from_str("users").is_err());
        assert!(Permission::from_str(":create").is_err());
        assert!(Permission::from_str("users:").is_err());
        assert!(Permission::from_str("users:create:all").is_err());
    }

    #[test]
    fn wildcard_parses_to_all_permissions_variant() {
        let grant = PermissionGrant::from_str(" * ");
        assert_eq!(grant.ok(), Some(PermissionGrant::AllPermissions));
    }

    #[test]
    fn grants_deserialize_from_role_documents() {
        let grants: Result<Vec<PermissionGrant>, _> =
            serde_json::from_str(r#"["*", "companies:view"]"#);
        assert!(grants.is_ok());
        assert_eq!(grants.map(|grants| grants.len()).ok(), Some(2));

        let invalid: Result<Vec<PermissionGrant>, _> = serde_json::from_str(r#"["nope"]"#);
        assert!(invalid.is_err());
    }

    #[test]
    fn builtin_catalogue_covers_every_resource_action() {
        let permissions = builtin_permissions();
        assert_eq!(permissions.len(), 21);
        assert!(permissions.contains(&Permission::from_str("dashboard:view").unwrap_or_else(
            |_| panic!("test")
        )));
    }

    #[test]
    fn builtin_super_role_is_system_wildcard() {
        let roles = builtin_roles();
        let super_role = roles
            .iter()
            .find(|role| role.name().as_str() == SUPER_ROLE_NAME);

        assert!(super_role.is_some_and(|role| role.is_system() && role.has_wildcard()));
        assert!(super_role.is_some_and(|role| role.ensure_deletable().is_err()));
    }

    #[test]
    fn custom_roles_are_mutable() {
        let roles = builtin_roles();
        let manager = roles.iter().find(|role| role.name().as_str() == "MANAGER");
        assert!(manager.is_some_and(|role| role.ensure_mutable().is_ok()));
    }

    #[test]
    fn blank_role_name_is_rejected() {
        assert!(RoleName::new("  ").is_err());
    }

    #[test]
    fn deserialized_role_names_are_normalized() {
        let name: Result<RoleName, _> = serde_json::from_str(r#"" manager ""#);
        assert_eq!(name.ok().as_ref().map(RoleName::as_str), Some("MANAGER"));

        let blank: Result<RoleName, _> = serde_json::from_str(r#""   ""#);
        assert!(blank.is_err());
    }

    proptest! {
        #[test]
        fn role_name_normalization_is_idempotent(raw in "[ a-zA-Z_]{1,16}") {
            let once = RoleName::normalize(raw.as_str());
            let twice = RoleName::normalize(once.as_str());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn permission_display_roundtrips(resource in "[a-z]{1,10}", action in "[a-z]{1,10}") {
            let permission = Permission::new(resource.as_str(), action.as_str());
            prop_assert!(permission.is_ok());
            let permission = permission.unwrap_or_else(|_| panic!("test"));
            let reparsed = Permission::from_str(permission.to_string().as_str());
            prop_assert_eq!(reparsed.ok(), Some(permission));
        }
    }
}
