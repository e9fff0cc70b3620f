use async_trait::async_trait;
use backoffice_core::AppResult;
use backoffice_domain::{ListQuery, Resource, Role};
use serde_json::Value;

/// One page of raw records returned by a collection endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    /// Records of the requested page.
    pub items: Vec<Value>,
    /// Total number of records matching the filters.
    pub total_items: u64,
}

/// HTTP verb used by a record mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationMethod {
    /// Create a record.
    Post,
    /// Replace a record.
    Put,
    /// Partially update a record.
    Patch,
    /// Delete a record.
    Delete,
}

impl MutationMethod {
    /// Returns the HTTP method name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// Record mutation sent to a collection endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRequest {
    /// HTTP verb.
    pub method: MutationMethod,
    /// Path segments below the API base; each one is sent as a single,
    /// percent-encoded segment.
    pub segments: Vec<String>,
    /// JSON body, if any.
    pub body: Option<Value>,
}

impl MutationRequest {
    /// Returns the segments joined with `/`, for logging.
    #[must_use]
    pub fn display_path(&self) -> String {
        self.segments.join("/")
    }
}

/// Port for the authenticated REST collaborator.
#[async_trait]
pub trait CollectionClient: Send + Sync {
    /// Fetches one page of a collection.
    async fn list(&self, resource: Resource, query: &ListQuery) -> AppResult<ListPage>;

    /// Sends a record mutation and returns the response payload.
    async fn send(&self, request: MutationRequest) -> AppResult<Value>;
}

/// Port loading role definitions once per session.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists every role known to the server.
    async fn list_roles(&self) -> AppResult<Vec<Role>>;
}

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Informational message.
    Info,
    /// Completed action.
    Success,
    /// Recoverable problem.
    Warning,
    /// Failed action.
    Error,
}

/// Transient message shown to the dashboard user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Message text.
    pub message: String,
}

impl Notification {
    /// Creates an error notification.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    /// Creates a warning notification.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    /// Creates a success notification.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }
}

/// Port surfacing notifications to the user.
pub trait Notifier: Send + Sync {
    /// Shows one notification.
    fn notify(&self, notification: Notification);
}
