//! Query parameters for list and find endpoints.

use serde::{Deserialize, Serialize};

/// Field a listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderByField {
    #[default]
    CreateTime,
    LastUpdateTime,
    Id,
}

impl OrderByField {
    /// Wire value for the `orderBy` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::CreateTime => "CREATE_TIME",
            Self::LastUpdateTime => "LAST_UPDATE_TIME",
            Self::Id => "ID",
        }
    }
}

/// Sort direction. The server defaults to ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Wire value for the `sortOrder` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Options for listing resources.
///
/// Pagination is cursor-based: pass the `next_page_token` of one page
/// verbatim to retrieve the next. Nothing prefetches subsequent pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    /// Maximum number of resources per page.
    pub page_size: Option<u32>,
    /// Field to order by.
    pub order_by: Option<OrderByField>,
    /// Sort direction.
    pub sort_order: Option<SortOrder>,
    /// Opaque continuation token from a previous page.
    pub next_page_token: Option<String>,
}

impl ListOptions {
    /// Options with a page size, the common case.
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    /// Continue a listing from the given page's token.
    #[must_use]
    pub fn after(mut self, token: impl Into<String>) -> Self {
        self.next_page_token = Some(token.into());
        self
    }

    /// Encode as camelCase query pairs, omitting unset options.
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(size) = self.page_size {
            pairs.push(("pageSize", size.to_string()));
        }
        if let Some(order_by) = self.order_by {
            pairs.push(("orderBy", order_by.as_param().to_string()));
        }
        if let Some(sort_order) = self.sort_order {
            pairs.push(("sortOrder", sort_order.as_param().to_string()));
        }
        if let Some(token) = &self.next_page_token {
            pairs.push(("nextPageToken", token.clone()));
        }
        pairs
    }
}
