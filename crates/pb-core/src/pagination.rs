//! Pagination types for API responses.

use serde::{Deserialize, Serialize};

/// Pagination parameters (from query string)
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    /// Items per page
    #[serde(default = "default_page_size")]
    pub page_size: i64,

    /// Offset into the collection
    #[serde(default)]
    pub offset: i64,
}

fn default_page_size() -> i64 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            offset: 0,
        }
    }
}

impl PaginationParams {
    pub fn new(page_size: i64, offset: i64) -> Self {
        Self {
            page_size: page_size.clamp(1, 1000),
            offset: offset.max(0),
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }
}

/// HAL-flavoured collection envelope returned by all list endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionResponse<T> {
    #[serde(rename = "_type")]
    pub type_name: &'static str,

    /// Total count of items matching the query
    pub total: i64,

    /// Number of items in this page
    pub count: i64,

    pub page_size: i64,

    pub offset: i64,

    #[serde(rename = "_embedded")]
    pub embedded: CollectionEmbedded<T>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionEmbedded<T> {
    pub elements: Vec<T>,
}

impl<T> CollectionResponse<T> {
    pub fn new(elements: Vec<T>, total: i64, params: PaginationParams) -> Self {
        Self {
            type_name: "Collection",
            total,
            count: elements.len() as i64,
            page_size: params.page_size,
            offset: params.offset,
            embedded: CollectionEmbedded { elements },
        }
    }

    pub fn has_next(&self) -> bool {
        self.offset + self.count < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_clamp() {
        let params = PaginationParams::new(5000, -3);
        assert_eq!(params.limit(), 1000);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_collection_envelope() {
        let response = CollectionResponse::new(vec![1, 2, 3], 10, PaginationParams::new(3, 0));
        assert_eq!(response.count, 3);
        assert_eq!(response.total, 10);
        assert!(response.has_next());

        let last_page = CollectionResponse::new(vec![1], 10, PaginationParams::new(3, 9));
        assert!(!last_page.has_next());
    }
}
