use std::collections::BTreeMap;
use std::str::FromStr;

use backoffice_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Page size used when a screen does not choose one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Sort field used when a screen does not choose one.
pub const DEFAULT_SORT_FIELD: &str = "createdAt";

/// Query parameters owned by pagination and sorting; never usable as filters.
pub const RESERVED_QUERY_KEYS: [&str; 4] = ["page", "limit", "sortBy", "sortOrder"];

/// Sort order for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Ascending order.
    Asc,
    /// Descending order.
    #[default]
    Desc,
}

impl SortOrder {
    /// Returns stable query-string value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(AppError::Validation(format!("unknown sort order '{value}'"))),
        }
    }
}

/// Filter, sort and pagination parameters of one list screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    page: u32,
    page_size: u32,
    filters: BTreeMap<String, String>,
    sort_field: String,
    sort_order: SortOrder,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            filters: BTreeMap::new(),
            sort_field: DEFAULT_SORT_FIELD.to_owned(),
            sort_order: SortOrder::Desc,
        }
    }
}

impl ListQuery {
    /// Creates a first-page query with the given page size.
    pub fn with_page_size(page_size: u32) -> AppResult<Self> {
        let mut query = Self::default();
        query.set_page_size(page_size)?;
        Ok(query)
    }

    /// Returns the 1-based page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns active filters.
    #[must_use]
    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    /// Returns the sort field.
    #[must_use]
    pub fn sort_field(&self) -> &str {
        self.sort_field.as_str()
    }

    /// Returns the sort order.
    #[must_use]
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Sets one filter; blank values remove the filter. Resets to page 1.
    ///
    /// Keys in [`RESERVED_QUERY_KEYS`] are rejected.
    pub fn set_filter(&mut self, key: &str, value: &str) -> AppResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::Validation(
                "filter key must not be empty".to_owned(),
            ));
        }

        if RESERVED_QUERY_KEYS.contains(&key) {
            return Err(AppError::Validation(format!(
                "'{key}' is a reserved query parameter and cannot be used as a filter"
            )));
        }

        let value = value.trim();
        if value.is_empty() {
            self.filters.remove(key);
        } else {
            self.filters.insert(key.to_owned(), value.to_owned());
        }
        self.page = 1;

        Ok(())
    }

    /// Removes every filter. Resets to page 1.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.page = 1;
    }

    /// Sets the sort field and order. Resets to page 1.
    pub fn set_sort(&mut self, field: &str, order: SortOrder) -> AppResult<()> {
        let field = field.trim();
        if field.is_empty() {
            return Err(AppError::Validation(
                "sort field must not be empty".to_owned(),
            ));
        }

        self.sort_field = field.to_owned();
        self.sort_order = order;
        self.page = 1;

        Ok(())
    }

    /// Sets the page size. Resets to page 1.
    pub fn set_page_size(&mut self, page_size: u32) -> AppResult<()> {
        if page_size == 0 {
            return Err(AppError::Validation(
                "page size must be greater than zero".to_owned(),
            ));
        }

        self.page_size = page_size;
        self.page = 1;

        Ok(())
    }

    /// Moves to `page` when it lies within `1..=total_pages`.
    ///
    /// Returns whether the page was accepted.
    pub fn go_to_page(&mut self, page: u32, total_pages: u32) -> bool {
        if page < 1 || page > total_pages {
            return false;
        }

        self.page = page;
        true
    }

    /// Pulls the page back into range after the total changed.
    pub fn clamp_page(&mut self, total_pages: u32) {
        self.page = self.page.clamp(1, total_pages.max(1));
    }

    /// Returns the query-string pairs sent to the collection endpoint.
    ///
    /// Order: `page`, `limit`, filters by key, `sortBy`, `sortOrder`.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 4);
        pairs.push(("page".to_owned(), self.page.to_string()));
        pairs.push(("limit".to_owned(), self.page_size.to_string()));
        pairs.extend(
            self.filters
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        pairs.push(("sortBy".to_owned(), self.sort_field.clone()));
        pairs.push(("sortOrder".to_owned(), self.sort_order.as_str().to_owned()));
        pairs
    }
}

/// Returns `ceil(total_items / page_size)`, zero when `page_size` is zero.
#[must_use]
pub fn total_pages(total_items: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }

    let pages = total_items.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}
