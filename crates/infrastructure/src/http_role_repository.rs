use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use backoffice_application::RoleRepository;
use backoffice_core::{AppError, AppResult};
use backoffice_domain::{PermissionGrant, Role};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::HttpRestClient;

/// Role repository backed by the dashboard `roles` endpoint.
#[derive(Clone)]
pub struct HttpRoleRepository {
    client: Arc<HttpRestClient>,
}

impl HttpRoleRepository {
    /// Creates a repository using a shared REST client.
    #[must_use]
    pub fn new(client: Arc<HttpRestClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleDocument {
    #[serde(rename = "_id")]
    object_id: Option<String>,
    id: Option<String>,
    name: String,
    #[serde(default)]
    permissions: Vec<String>,
    #[serde(default)]
    is_system: bool,
}

impl RoleDocument {
    fn into_role(self) -> AppResult<Role> {
        let id = self
            .object_id
            .or(self.id)
            .unwrap_or_else(|| self.name.trim().to_uppercase());

        let grants = self
            .permissions
            .iter()
            .filter_map(|entry| match PermissionGrant::from_str(entry) {
                Ok(grant) => Some(grant),
                Err(error) => {
                    warn!(
                        role = %self.name,
                        permission = %entry,
                        error = %error,
                        "skipping malformed permission grant"
                    );
                    None
                }
            })
            .collect();

        Role::new(id, self.name.as_str(), grants, self.is_system)
    }
}

/// Converts the `roles` payload into role definitions.
///
/// Documents with an unusable name are skipped so that one bad record does not
/// hide every other role.
pub(crate) fn roles_from_payload(payload: Value) -> AppResult<Vec<Role>> {
    let documents: Vec<RoleDocument> = serde_json::from_value(payload).map_err(|error| {
        AppError::Internal(format!("failed to decode role definitions: {error}"))
    })?;

    Ok(documents
        .into_iter()
        .filter_map(|document| {
            let name = document.name.clone();
            document
                .into_role()
                .map_err(|error| {
                    warn!(role = %name, error = %error, "skipping invalid role definition");
                })
                .ok()
        })
        .collect())
}

#[async_trait]
impl RoleRepository for HttpRoleRepository {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let url = self.client.endpoint(&["roles"], &[])?;
        let payload = self
            .client
            .execute(reqwest::Method::GET, url, None)
            .await?
            .into_payload();

        roles_from_payload(payload)
    }
}
