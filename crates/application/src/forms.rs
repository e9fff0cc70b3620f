use std::str::FromStr;

use backoffice_core::{AppError, AppResult};
use backoffice_domain::{FieldError, FieldRule, FormValidation, PermissionGrant, Resource};
use serde::Serialize;
use serde_json::Value;

/// Minimum length of record names.
pub const NAME_MIN_LENGTH: usize = 2;

/// Minimum length of new user passwords.
pub const PASSWORD_MIN_LENGTH: usize = 6;

/// Create/edit form of one managed resource.
pub trait RecordForm: Serialize {
    /// Resource the form writes to.
    fn resource(&self) -> Resource;

    /// Runs client-side field checks.
    fn validate(&self) -> FormValidation;

    /// Serializes the form as a request body.
    fn to_payload(&self) -> AppResult<Value> {
        serde_json::to_value(self)
            .map_err(|error| AppError::Internal(format!("failed to encode form payload: {error}")))
    }
}

/// Company create/edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyForm {
    /// Company name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl RecordForm for CompanyForm {
    fn resource(&self) -> Resource {
        Resource::Companies
    }

    fn validate(&self) -> FormValidation {
        FormValidation::new()
            .field(
                "name",
                "Company name",
                self.name.as_str(),
                &[FieldRule::Required, FieldRule::MinLength(NAME_MIN_LENGTH)],
            )
            .field(
                "email",
                "Email",
                self.email.as_str(),
                &[FieldRule::Required, FieldRule::Email],
            )
    }
}

/// User invite form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    /// Full name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Assigned role name.
    pub role: String,
}

impl RecordForm for UserForm {
    fn resource(&self) -> Resource {
        Resource::Users
    }

    fn validate(&self) -> FormValidation {
        FormValidation::new()
            .field(
                "name",
                "Name",
                self.name.as_str(),
                &[FieldRule::Required, FieldRule::MinLength(NAME_MIN_LENGTH)],
            )
            .field(
                "email",
                "Email",
                self.email.as_str(),
                &[FieldRule::Required, FieldRule::Email],
            )
            .field(
                "password",
                "Password",
                self.password.as_str(),
                &[FieldRule::Required, FieldRule::MinLength(PASSWORD_MIN_LENGTH)],
            )
            .field("role", "Role", self.role.as_str(), &[FieldRule::Required])
    }
}

/// Custom role form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleForm {
    /// Role name.
    pub name: String,
    /// Permission strings, `*` for all.
    pub permissions: Vec<String>,
}

impl RecordForm for RoleForm {
    fn resource(&self) -> Resource {
        Resource::Roles
    }

    fn validate(&self) -> FormValidation {
        let mut validation = FormValidation::new().field(
            "name",
            "Role name",
            self.name.as_str(),
            &[FieldRule::Required, FieldRule::MinLength(NAME_MIN_LENGTH)],
        );

        if self.permissions.is_empty() {
            validation = validation.with_error(FieldError {
                field: "permissions".to_owned(),
                message: "Select at least one permission".to_owned(),
            });
        } else if let Some(invalid) = self
            .permissions
            .iter()
            .find(|value| PermissionGrant::from_str(value).is_err())
        {
            validation = validation.with_error(FieldError {
                field: "permissions".to_owned(),
                message: format!("'{invalid}' is not a valid permission"),
            });
        }

        validation
    }
}
