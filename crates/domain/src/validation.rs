//! Client-side form validation rules.
//!
//! Every failing field is reported; submission is blocked until the list of
//! field errors is empty.

use backoffice_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one `@`,
    /// local part and domain are non-empty, domain contains at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty()
            || !domain.contains('.')
            || domain.starts_with('.')
            || domain.ends_with('.')
        {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(
                "email address must not contain whitespace".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// One check applied to a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Value must not be blank.
    Required,
    /// Value must have at least this many characters (blank values skip).
    MinLength(usize),
    /// Value must look like an email address (blank values skip).
    Email,
}

impl FieldRule {
    fn check(&self, label: &str, value: &str) -> Option<String> {
        let trimmed = value.trim();
        match self {
            Self::Required if trimmed.is_empty() => Some(format!("{label} is required")),
            Self::MinLength(min) if !trimmed.is_empty() && trimmed.chars().count() < *min => {
                Some(format!("{label} must be at least {min} characters"))
            }
            Self::Email if !trimmed.is_empty() => EmailAddress::new(trimmed)
                .err()
                .map(|_| format!("{label} must be a valid email address")),
            _ => None,
        }
    }
}

/// Inline message attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Form field identifier.
    pub field: String,
    /// Human-readable message shown under the field.
    pub message: String,
}

/// Accumulates field errors for one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValidation {
    errors: Vec<FieldError>,
}

impl FormValidation {
    /// Starts an empty validation pass.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `rules` to one field; only the first failing rule is recorded.
    #[must_use]
    pub fn field(mut self, field: &str, label: &str, value: &str, rules: &[FieldRule]) -> Self {
        if let Some(message) = rules.iter().find_map(|rule| rule.check(label, value)) {
            self.errors.push(FieldError {
                field: field.to_owned(),
                message,
            });
        }

        self
    }

    /// Records an error produced by a check outside the builtin rules.
    #[must_use]
    pub fn with_error(mut self, error: FieldError) -> Self {
        self.errors.push(error);
        self
    }

    /// Returns recorded field errors.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns whether any field failed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts the pass into a result listing every failing field.
    pub fn finish(self) -> AppResult<()> {
        if self.errors.is_empty() {
            return Ok(());
        }

        let messages = self
            .errors
            .iter()
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Err(AppError::Validation(messages))
    }
}

#[cfg(test)]
mod tests {
    use super::{EmailAddress, FieldRule, FormValidation};

    #[test]
    fn valid_email_is_accepted() {
        let email = EmailAddress::new("USER@Example.COM");
        assert!(email.is_ok());
        assert_eq!(
            email.unwrap_or_else(|_| panic!("test")).as_str(),
            "user@example.com"
        );
    }

    #[test]
    fn malformed_emails_are_rejected() {
        assert!(EmailAddress::new("noatsign").is_err());
        assert!(EmailAddress::new("user@nodot").is_err());
        assert!(EmailAddress::new("a@b@c.com").is_err());
        assert!(EmailAddress::new("@example.com").is_err());
        assert!(EmailAddress::new("us er@example.com").is_err());
        assert!(EmailAddress::new("").is_err());
    }

    #[test]
    fn every_failing_field_is_reported() {
        let validation = FormValidation::new()
            .field("name", "Name", "  ", &[FieldRule::Required])
            .field(
                "email",
                "Email",
                "not-an-email",
                &[FieldRule::Required, FieldRule::Email],
            )
            .field(
                "password",
                "Password",
                "abc",
                &[FieldRule::Required, FieldRule::MinLength(6)],
            );

        assert!(!validation.is_valid());
        let fields: Vec<&str> = validation
            .errors()
            .iter()
            .map(|error| error.field.as_str())
            .collect();
        assert_eq!(fields, vec!["name", "email", "password"]);
        assert_eq!(validation.errors()[0].message, "Name is required");
        assert!(validation.finish().is_err());
    }

    #[test]
    fn optional_fields_skip_shape_checks_when_blank() {
        let validation = FormValidation::new()
            .field("website_email", "Contact email", "", &[FieldRule::Email])
            .field("notes", "Notes", "", &[FieldRule::MinLength(10)]);

        assert!(validation.finish().is_ok());
    }
}
