use std::str::FromStr;

use backoffice_core::AppError;
use serde::{Deserialize, Serialize};

use crate::security::Permission;

/// Collections managed through the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Customer companies.
    Companies,
    /// Dashboard user accounts.
    Users,
    /// Access roles.
    Roles,
    /// Product modules that can be enabled per company.
    Modules,
    /// Billing plans.
    Plans,
}

impl Resource {
    /// Returns the REST collection path segment.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Companies => "companies",
            Self::Users => "users",
            Self::Roles => "roles",
            Self::Modules => "modules",
            Self::Plans => "plans",
        }
    }

    /// Returns all managed resources.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Resource] = &[
            Resource::Companies,
            Resource::Users,
            Resource::Roles,
            Resource::Modules,
            Resource::Plans,
        ];

        ALL
    }

    /// Returns the permission gating `action` on this resource.
    #[must_use]
    pub fn permission(&self, action: Action) -> Permission {
        Permission::from_static(self.as_str(), action.as_str())
    }
}

impl FromStr for Resource {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "companies" => Ok(Self::Companies),
            "users" => Ok(Self::Users),
            "roles" => Ok(Self::Roles),
            "modules" => Ok(Self::Modules),
            "plans" => Ok(Self::Plans),
            _ => Err(AppError::Validation(format!("unknown resource '{value}'"))),
        }
    }
}

/// Action a permission grants on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// List and read records.
    View,
    /// Create records.
    Create,
    /// Update records, including status toggles.
    Edit,
    /// Delete records.
    Delete,
}

impl Action {
    /// Returns stable permission suffix.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }

    /// Returns all actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Action] = &[Action::View, Action::Create, Action::Edit, Action::Delete];

        ALL
    }
}
