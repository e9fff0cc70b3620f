use std::sync::Arc;

use backoffice_core::{AppError, AppResult, NonEmptyString};
use backoffice_domain::{Action, Resource};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::{
    CollectionClient, MutationMethod, MutationRequest, Notification, Notifier,
    PermissionRegistry, RbacEvaluator, RecordForm,
};

/// Permission-checked record mutations for the management screens.
///
/// Checks here only spare the user a round trip; the server re-validates.
#[derive(Clone)]
pub struct ResourceActions {
    client: Arc<dyn CollectionClient>,
    registry: Arc<PermissionRegistry>,
    notifier: Arc<dyn Notifier>,
}

impl ResourceActions {
    /// Creates the action handler.
    #[must_use]
    pub fn new(
        client: Arc<dyn CollectionClient>,
        registry: Arc<PermissionRegistry>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            registry,
            notifier,
        }
    }

    /// Validates a form and creates the record it describes.
    pub async fn submit<F>(&self, evaluator: &RbacEvaluator, form: &F) -> AppResult<Value>
    where
        F: RecordForm + Sync,
    {
        evaluator.require(&form.resource().permission(Action::Create))?;
        form.validate().finish()?;
        let payload = form.to_payload()?;

        self.create(evaluator, form.resource(), payload).await
    }

    /// Creates a record.
    pub async fn create(
        &self,
        evaluator: &RbacEvaluator,
        resource: Resource,
        payload: Value,
    ) -> AppResult<Value> {
        evaluator.require(&resource.permission(Action::Create))?;

        self.send(
            resource,
            MutationMethod::Post,
            vec![resource.as_str().to_owned()],
            Some(payload),
        )
        .await
    }

    /// Replaces a record.
    pub async fn update(
        &self,
        evaluator: &RbacEvaluator,
        resource: Resource,
        record_id: &str,
        payload: Value,
    ) -> AppResult<Value> {
        let record_id = record_id_of(record_id)?;
        evaluator.require(&resource.permission(Action::Edit))?;
        self.ensure_role_mutable(resource, record_id.as_str())?;

        self.send(
            resource,
            MutationMethod::Put,
            vec![resource.as_str().to_owned(), record_id.into()],
            Some(payload),
        )
        .await
    }

    /// Activates or deactivates a record.
    pub async fn set_status(
        &self,
        evaluator: &RbacEvaluator,
        resource: Resource,
        record_id: &str,
        is_active: bool,
    ) -> AppResult<Value> {
        let record_id = record_id_of(record_id)?;
        evaluator.require(&resource.permission(Action::Edit))?;
        self.ensure_role_mutable(resource, record_id.as_str())?;

        self.send(
            resource,
            MutationMethod::Patch,
            vec![
                resource.as_str().to_owned(),
                record_id.into(),
                "status".to_owned(),
            ],
            Some(json!({ "isActive": is_active })),
        )
        .await
    }

    /// Deletes a record.
    pub async fn delete(
        &self,
        evaluator: &RbacEvaluator,
        resource: Resource,
        record_id: &str,
    ) -> AppResult<Value> {
        let record_id = record_id_of(record_id)?;
        evaluator.require(&resource.permission(Action::Delete))?;

        if resource == Resource::Roles
            && let Some(role) = self.registry.role_by_id(record_id.as_str())
        {
            role.ensure_deletable()?;
        }

        self.send(
            resource,
            MutationMethod::Delete,
            vec![resource.as_str().to_owned(), record_id.into()],
            None,
        )
        .await
    }

    /// Converts an action result into a notification.
    ///
    /// Returns the value on success so the caller can refresh its list.
    pub fn report<T>(&self, success_message: &str, result: AppResult<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.notifier.notify(Notification::success(success_message));
                Some(value)
            }
            Err(error) => {
                warn!(error = %error, "resource action failed");
                self.notifier.notify(Notification::error(error.message()));
                None
            }
        }
    }

    fn ensure_role_mutable(&self, resource: Resource, record_id: &str) -> AppResult<()> {
        if resource != Resource::Roles {
            return Ok(());
        }

        self.registry
            .role_by_id(record_id)
            .map_or(Ok(()), |role| role.ensure_mutable())
    }

    async fn send(
        &self,
        resource: Resource,
        method: MutationMethod,
        segments: Vec<String>,
        body: Option<Value>,
    ) -> AppResult<Value> {
        let request = MutationRequest {
            method,
            segments,
            body,
        };
        let path = request.display_path();
        let response = self.client.send(request).await?;

        info!(
            resource = resource.as_str(),
            method = method.as_str(),
            path = %path,
            "resource mutation completed"
        );

        Ok(response)
    }
}

/// Validates a record id; it is sent as one path segment, so the dot
/// segments that would address another path are rejected.
fn record_id_of(value: &str) -> AppResult<NonEmptyString> {
    let record_id = NonEmptyString::new(value.trim())?;
    if matches!(record_id.as_str(), "." | "..") {
        return Err(AppError::Validation(format!(
            "record id '{value}' is not a valid identifier"
        )));
    }

    Ok(record_id)
}
