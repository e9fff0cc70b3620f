use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use backoffice_core::AppResult;
use backoffice_domain::{Permission, Role, RoleName, builtin_permissions, builtin_roles};
use tracing::debug;

use crate::RoleRepository;

/// Resolved permission set shared between the registry and evaluators.
pub type PermissionSet = Arc<BTreeSet<Permission>>;

/// Read-only mapping from role name to its resolved permission set.
///
/// Built once per session. Wildcard roles are expanded against the universe
/// of defined permissions at construction time.
#[derive(Debug, Clone)]
pub struct PermissionRegistry {
    roles: BTreeMap<RoleName, Role>,
    resolved: BTreeMap<RoleName, PermissionSet>,
    universe: PermissionSet,
    empty: PermissionSet,
}

impl PermissionRegistry {
    /// Builds a registry from the dashboard's builtin roles.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_roles(builtin_roles())
    }

    /// Builds a registry from role definitions.
    ///
    /// The universe is the builtin catalogue plus every concrete permission
    /// named by any role. Later roles with a duplicate name replace earlier
    /// ones.
    #[must_use]
    pub fn from_roles(roles: impl IntoIterator<Item = Role>) -> Self {
        let roles: BTreeMap<RoleName, Role> = roles
            .into_iter()
            .map(|role| (role.name().clone(), role))
            .collect();

        let mut universe = builtin_permissions();
        for role in roles.values() {
            universe.extend(role.concrete_permissions().cloned());
        }
        let universe = Arc::new(universe);

        let resolved = roles
            .iter()
            .map(|(name, role)| {
                let permissions = if role.has_wildcard() {
                    Arc::clone(&universe)
                } else {
                    Arc::new(role.concrete_permissions().cloned().collect())
                };
                (name.clone(), permissions)
            })
            .collect();

        Self {
            roles,
            resolved,
            universe,
            empty: Arc::new(BTreeSet::new()),
        }
    }

    /// Loads roles through the repository port and builds a registry.
    pub async fn load(repository: &dyn RoleRepository) -> AppResult<Self> {
        let roles = repository.list_roles().await?;
        debug!(role_count = roles.len(), "loaded role definitions");
        Ok(Self::from_roles(roles))
    }

    /// Returns the permission set for a role name; unknown names resolve to
    /// the empty set.
    #[must_use]
    pub fn resolve(&self, role_name: &str) -> PermissionSet {
        RoleName::new(role_name)
            .ok()
            .and_then(|name| self.resolved.get(&name))
            .map_or_else(|| Arc::clone(&self.empty), Arc::clone)
    }

    /// Returns the role definition for a name.
    #[must_use]
    pub fn role(&self, role_name: &str) -> Option<&Role> {
        RoleName::new(role_name)
            .ok()
            .and_then(|name| self.roles.get(&name))
    }

    /// Returns the role definition with a given identifier.
    #[must_use]
    pub fn role_by_id(&self, role_id: &str) -> Option<&Role> {
        self.roles.values().find(|role| role.id() == role_id)
    }

    /// Returns all role definitions ordered by name.
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    /// Returns every defined permission.
    #[must_use]
    pub fn universe(&self) -> &BTreeSet<Permission> {
        &self.universe
    }
}
