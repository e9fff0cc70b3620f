use async_trait::async_trait;
use backoffice_application::{CollectionClient, ListPage, MutationMethod, MutationRequest};
use backoffice_core::{AppError, AppResult};
use backoffice_domain::{ListQuery, Resource};
use reqwest::header;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Response envelope shared by every dashboard endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ApiEnvelope {
    success: Option<bool>,
    data: Option<Value>,
    items: Option<Value>,
    message: Option<String>,
    pagination: Option<PaginationMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PaginationMeta {
    total: Option<u64>,
}

impl ApiEnvelope {
    /// Returns the record payload, preferring `data` over `items`.
    pub(crate) fn into_payload(self) -> Value {
        self.data.or(self.items).unwrap_or(Value::Null)
    }

    fn into_list_page(self) -> AppResult<ListPage> {
        let reported_total = self.pagination.as_ref().and_then(|meta| meta.total);
        let items = match self.items.or(self.data) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(AppError::Internal(format!(
                    "expected a list of records, got {}",
                    json_kind(&other)
                )));
            }
        };

        let total_items = reported_total
            .unwrap_or_else(|| u64::try_from(items.len()).unwrap_or(u64::MAX));

        Ok(ListPage { items, total_items })
    }
}

/// Authenticated client for the dashboard REST API.
#[derive(Clone)]
pub struct HttpRestClient {
    http_client: reqwest::Client,
    base_url: Url,
    bearer_token: String,
}

impl HttpRestClient {
    /// Creates a client for `base_url` authenticating with `bearer_token`.
    pub fn new(
        http_client: reqwest::Client,
        base_url: &str,
        bearer_token: impl Into<String>,
    ) -> AppResult<Self> {
        let mut base_url = Url::parse(base_url.trim()).map_err(|error| {
            AppError::Validation(format!("invalid API base URL '{base_url}': {error}"))
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(path.as_str());
        }

        Ok(Self {
            http_client,
            base_url,
            bearer_token: bearer_token.into(),
        })
    }

    /// Builds the absolute URL for `segments` with query pairs.
    ///
    /// Each segment is percent-encoded as a single path segment.
    pub(crate) fn endpoint<S>(&self, segments: &[S], query: &[(String, String)]) -> AppResult<Url>
    where
        S: AsRef<str>,
    {
        if let Some(segment) = segments
            .iter()
            .map(|segment| segment.as_ref())
            .find(|segment| segment.is_empty() || matches!(*segment, "." | ".."))
        {
            return Err(AppError::Validation(format!(
                "invalid API path segment '{segment}'"
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Internal(format!(
                    "API base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url)
    }

    /// Issues one request and decodes the response envelope.
    pub(crate) async fn execute(
        &self,
        method: reqwest::Method,
        url: Url,
        body: Option<&Value>,
    ) -> AppResult<ApiEnvelope> {
        debug!(method = %method, url = %url, "calling dashboard API");

        let mut builder = self
            .http_client
            .request(method.clone(), url.clone())
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.bearer_token),
            );
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|error| {
            AppError::Internal(format!("failed to call {method} {url}: {error}"))
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|error| AppError::Internal(format!("failed to read response body: {error}")))?;

        decode_envelope(status.as_u16(), text.as_str())
    }
}

#[async_trait]
impl CollectionClient for HttpRestClient {
    async fn list(&self, resource: Resource, query: &ListQuery) -> AppResult<ListPage> {
        let url = self.endpoint(&[resource.as_str()], &query.to_query_pairs())?;
        self.execute(reqwest::Method::GET, url, None)
            .await?
            .into_list_page()
    }

    async fn send(&self, request: MutationRequest) -> AppResult<Value> {
        let method = match request.method {
            MutationMethod::Post => reqwest::Method::POST,
            MutationMethod::Put => reqwest::Method::PUT,
            MutationMethod::Patch => reqwest::Method::PATCH,
            MutationMethod::Delete => reqwest::Method::DELETE,
        };
        let url = self.endpoint(request.segments.as_slice(), &[])?;

        Ok(self
            .execute(method, url, request.body.as_ref())
            .await?
            .into_payload())
    }
}

/// Maps a status code and raw body to an envelope or a typed error.
pub(crate) fn decode_envelope(status: u16, body: &str) -> AppResult<ApiEnvelope> {
    let envelope = if body.trim().is_empty() {
        Ok(ApiEnvelope::default())
    } else {
        serde_json::from_str::<ApiEnvelope>(body)
    };

    if !(200..300).contains(&status) {
        let message = envelope
            .ok()
            .and_then(|envelope| envelope.message)
            .unwrap_or_else(|| format!("request failed with status {status}"));
        return Err(error_for_status(status, message));
    }

    let envelope = envelope.map_err(|error| {
        AppError::Internal(format!("failed to parse API response body: {error}"))
    })?;

    if envelope.success == Some(false) {
        return Err(AppError::Internal(
            envelope
                .message
                .unwrap_or_else(|| "request was not successful".to_owned()),
        ));
    }

    Ok(envelope)
}

fn error_for_status(status: u16, message: String) -> AppError {
    match status {
        401 => AppError::Unauthorized(format!("session expired: {message}")),
        403 => AppError::Forbidden(message),
        404 => AppError::NotFound(message),
        409 => AppError::Conflict(message),
        400 | 422 => AppError::Validation(message),
        _ => AppError::Internal(format!("API returned status {status}: {message}")),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
