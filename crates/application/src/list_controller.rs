use std::str::FromStr;
use std::sync::Arc;

use backoffice_core::{AppError, AppResult};
use backoffice_domain::{ListQuery, Pagination, Resource, SortOrder, total_pages};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{CollectionClient, ListPage, Notification, Notifier};

/// Lifecycle of a list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStatus {
    /// Nothing has been requested yet.
    Idle,
    /// A request is in flight.
    Loading,
    /// The last applied response succeeded.
    Loaded,
    /// The last applied response failed; previous items are kept.
    Errored,
}

/// Decides which of several overlapping responses updates the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseOrdering {
    /// Only the response to the most recently issued request is applied.
    #[default]
    LatestIssued,
    /// Every response is applied in arrival order; the last to arrive wins.
    ArrivalOrder,
}

impl ResponseOrdering {
    /// Returns stable configuration value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LatestIssued => "latest_issued",
            Self::ArrivalOrder => "arrival_order",
        }
    }
}

impl FromStr for ResponseOrdering {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "latest_issued" => Ok(Self::LatestIssued),
            "arrival_order" => Ok(Self::ArrivalOrder),
            _ => Err(AppError::Validation(format!(
                "unknown response ordering '{value}'"
            ))),
        }
    }
}

/// Handle for one issued list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    sequence: u64,
    query: ListQuery,
}

impl LoadTicket {
    /// Monotonic sequence number assigned at issue time.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Query snapshot sent with the request.
    #[must_use]
    pub fn query(&self) -> &ListQuery {
        &self.query
    }
}

/// Result of feeding one response into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Items and totals were replaced.
    Applied,
    /// The request failed; the error was surfaced and items kept.
    Failed,
    /// A newer request was issued meanwhile; the response was dropped.
    Stale,
    /// The operation was a no-op and nothing was requested.
    Skipped,
}

/// Filter, sort and pagination state machine behind one CRUD table.
///
/// One instance per mounted screen; dropped on navigation.
pub struct ListController<T> {
    resource: Resource,
    client: Arc<dyn CollectionClient>,
    notifier: Arc<dyn Notifier>,
    ordering: ResponseOrdering,
    query: ListQuery,
    status: ListStatus,
    items: Vec<T>,
    total_items: u64,
    last_issued: u64,
}

impl<T: DeserializeOwned> ListController<T> {
    /// Creates an idle controller for a resource collection.
    #[must_use]
    pub fn new(
        resource: Resource,
        client: Arc<dyn CollectionClient>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            resource,
            client,
            notifier,
            ordering: ResponseOrdering::default(),
            query: ListQuery::default(),
            status: ListStatus::Idle,
            items: Vec::new(),
            total_items: 0,
            last_issued: 0,
        }
    }

    /// Sets how overlapping responses are applied.
    #[must_use]
    pub fn with_ordering(mut self, ordering: ResponseOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Replaces the initial query.
    #[must_use]
    pub fn with_query(mut self, query: ListQuery) -> Self {
        self.query = query;
        self
    }

    /// Returns the managed resource.
    #[must_use]
    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Returns the current query state.
    #[must_use]
    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub fn status(&self) -> ListStatus {
        self.status
    }

    /// Returns the displayed items.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Returns the total number of matching records.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    /// Returns `ceil(total_items / page_size)`.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_items, self.query.page_size())
    }

    /// Returns derived pagination metadata, including the page window.
    #[must_use]
    pub fn pagination(&self) -> Pagination {
        Pagination::new(
            self.query.page(),
            self.query.page_size(),
            self.total_items,
            self.total_pages(),
        )
    }

    /// Updates one filter, returns to page 1 and reloads.
    pub async fn set_filter(&mut self, key: &str, value: &str) -> LoadOutcome {
        if let Err(error) = self.query.set_filter(key, value) {
            return self.reject(error);
        }

        self.load().await
    }

    /// Removes every filter, returns to page 1 and reloads.
    pub async fn clear_filters(&mut self) -> LoadOutcome {
        self.query.clear_filters();
        self.load().await
    }

    /// Changes the sort, returns to page 1 and reloads.
    pub async fn set_sort(&mut self, field: &str, order: SortOrder) -> LoadOutcome {
        if let Err(error) = self.query.set_sort(field, order) {
            return self.reject(error);
        }

        self.load().await
    }

    /// Moves to `page` and reloads; out-of-range pages are ignored.
    pub async fn set_page(&mut self, page: u32) -> LoadOutcome {
        if !self.query.go_to_page(page, self.total_pages()) {
            debug!(
                resource = self.resource.as_str(),
                page,
                total_pages = self.total_pages(),
                "ignored out-of-range page change"
            );
            return LoadOutcome::Skipped;
        }

        self.load().await
    }

    /// Changes the page size, returns to page 1 and reloads.
    pub async fn set_page_size(&mut self, page_size: u32) -> LoadOutcome {
        if let Err(error) = self.query.set_page_size(page_size) {
            return self.reject(error);
        }

        self.load().await
    }

    /// Issues one request for the current query and applies its response.
    pub async fn load(&mut self) -> LoadOutcome {
        let ticket = self.begin_load();
        let client = Arc::clone(&self.client);
        let result = client.list(self.resource, ticket.query()).await;
        self.complete_load(ticket, result)
    }

    /// Marks the controller as loading and issues a ticket for the current
    /// query. The caller performs the fetch and hands the result to
    /// [`Self::complete_load`].
    pub fn begin_load(&mut self) -> LoadTicket {
        self.last_issued = self.last_issued.saturating_add(1);
        self.status = ListStatus::Loading;

        LoadTicket {
            sequence: self.last_issued,
            query: self.query.clone(),
        }
    }

    /// Applies the response belonging to `ticket`.
    pub fn complete_load(&mut self, ticket: LoadTicket, result: AppResult<ListPage>) -> LoadOutcome {
        if self.ordering == ResponseOrdering::LatestIssued && ticket.sequence != self.last_issued {
            debug!(
                resource = self.resource.as_str(),
                sequence = ticket.sequence,
                latest = self.last_issued,
                "dropped stale list response"
            );
            return LoadOutcome::Stale;
        }

        match result.and_then(decode_page::<T>) {
            Ok((items, total_items)) => {
                self.items = items;
                self.total_items = total_items;
                self.query.clamp_page(self.total_pages());
                self.status = ListStatus::Loaded;
                LoadOutcome::Applied
            }
            Err(error) => {
                warn!(
                    resource = self.resource.as_str(),
                    sequence = ticket.sequence,
                    error = %error,
                    "list request failed"
                );
                self.status = ListStatus::Errored;
                self.notifier.notify(Notification::error(format!(
                    "Failed to load {}: {}",
                    self.resource.as_str(),
                    error.message()
                )));
                LoadOutcome::Failed
            }
        }
    }

    fn reject(&self, error: AppError) -> LoadOutcome {
        self.notifier.notify(Notification::warning(error.message()));
        LoadOutcome::Skipped
    }
}

fn decode_page<T: DeserializeOwned>(page: ListPage) -> AppResult<(Vec<T>, u64)> {
    let items = page
        .items
        .into_iter()
        .map(serde_json::from_value::<T>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| AppError::Internal(format!("unexpected list item shape: {error}")))?;

    Ok((items, page.total_items))
}

#[cfg(test)]
mod tests;
