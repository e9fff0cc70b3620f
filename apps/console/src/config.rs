use std::env;
use std::time::Duration;

use backoffice_application::{ResponseOrdering, UninitializedPolicy};
use backoffice_core::{AppError, AppResult};
use backoffice_domain::{DEFAULT_PAGE_SIZE, Resource, RoleName, SUPER_ROLE_NAME};

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub api_base_url: String,
    pub auth_token: String,
    pub resource: Resource,
    pub page_size: u32,
    pub search: Option<String>,
    pub http_timeout: Duration,
    pub super_role: RoleName,
    pub uninitialized_policy: UninitializedPolicy,
    pub response_ordering: ResponseOrdering,
}

impl ConsoleConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let api_base_url = lookup("BACKOFFICE_API_BASE_URL")
            .unwrap_or_else(|| "http://127.0.0.1:5000/api".to_owned())
            .trim_end_matches('/')
            .to_owned();
        let auth_token = optional(&lookup, "BACKOFFICE_AUTH_TOKEN")
            .ok_or_else(|| AppError::Validation("BACKOFFICE_AUTH_TOKEN is required".to_owned()))?;
        let resource = parse_or(&lookup, "BACKOFFICE_RESOURCE", Resource::Companies)?;
        let page_size = parse_or(&lookup, "BACKOFFICE_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        let search = optional(&lookup, "BACKOFFICE_SEARCH");
        let http_timeout_secs = parse_or(&lookup, "BACKOFFICE_HTTP_TIMEOUT_SECS", 15_u64)?;
        let super_role = RoleName::new(
            lookup("RBAC_SUPER_ROLE")
                .unwrap_or_else(|| SUPER_ROLE_NAME.to_owned())
                .as_str(),
        )
        .map_err(|error| AppError::Validation(format!("invalid RBAC_SUPER_ROLE: {error}")))?;
        let uninitialized_policy = parse_or(
            &lookup,
            "RBAC_UNINITIALIZED_POLICY",
            UninitializedPolicy::default(),
        )?;
        let response_ordering =
            parse_or(&lookup, "RBAC_RESPONSE_ORDERING", ResponseOrdering::default())?;

        if page_size == 0 {
            return Err(AppError::Validation(
                "BACKOFFICE_PAGE_SIZE must be greater than zero".to_owned(),
            ));
        }

        if http_timeout_secs == 0 {
            return Err(AppError::Validation(
                "BACKOFFICE_HTTP_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            api_base_url,
            auth_token,
            resource,
            page_size,
            search,
            http_timeout: Duration::from_secs(http_timeout_secs),
            super_role,
            uninitialized_policy,
            response_ordering,
        })
    }
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> AppResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional(lookup, name) {
        Some(value) => value.parse::<T>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}
