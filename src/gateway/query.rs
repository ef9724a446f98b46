//! List query construction.
//!
//! Optional filters are dropped from the query string when empty; the service
//! treats a present-but-empty parameter as a real predicate.

use serde::{Deserialize, Serialize};

use crate::types::DEFAULT_PAGE_SIZE;

/// The four server-side filter predicates, AND-combined
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filters {
    pub search: String,
    pub status: String,
    pub environment: String,
    pub data_source_type: String,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_data_source_type(mut self, data_source_type: impl Into<String>) -> Self {
        self.data_source_type = data_source_type.into();
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// True when no predicate is set
    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.status.is_empty()
            && self.environment.is_empty()
            && self.data_source_type.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Parameters of one list request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListQuery {
    pub page: u32,
    pub size: u32,
    pub filters: Filters,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            filters: Filters::default(),
        }
    }
}

impl ListQuery {
    pub fn new(page: u32, size: u32, filters: Filters) -> Self {
        Self {
            page,
            size,
            filters,
        }
    }

    /// True for the view that feeds new-record detection
    pub fn is_unfiltered_first_page(&self) -> bool {
        self.page == 0 && self.filters.is_empty()
    }

    /// Query parameters in wire order, empty filters omitted
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("size", self.size.to_string())];

        let optional = [
            ("status", &self.filters.status),
            ("environment", &self.filters.environment),
            ("data_source_type", &self.filters.data_source_type),
            ("search", &self.filters.search),
        ];
        pairs.extend(
            optional
                .into_iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(key, value)| (key, value.clone())),
        );

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters_are_omitted() {
        let query = ListQuery::default();
        let keys: Vec<_> = query.to_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["page", "size"]);
    }

    #[test]
    fn test_every_filter_combination_omits_empty_fields() {
        for mask in 0u8..16 {
            let pick = |bit: u8, value: &str| {
                if mask & (1 << bit) != 0 {
                    value.to_string()
                } else {
                    String::new()
                }
            };
            let filters = Filters {
                status: pick(0, "pending"),
                environment: pick(1, "prod"),
                data_source_type: pick(2, "azure_blob"),
                search: pick(3, "sales"),
            };
            let pairs = ListQuery::new(0, 50, filters).to_pairs();

            assert_eq!(pairs.len(), 2 + mask.count_ones() as usize);
            assert!(
                pairs.iter().all(|(_, value)| !value.is_empty()),
                "mask {mask:04b} produced an empty value: {pairs:?}"
            );
        }
    }

    #[test]
    fn test_wire_order() {
        let filters = Filters::new()
            .with_search("orders")
            .with_status("pending")
            .with_environment("prod")
            .with_data_source_type("azure_blob");
        let query = ListQuery::new(2, 25, filters);
        let encoded: Vec<String> = query
            .to_pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        insta::assert_snapshot!(
            encoded.join("&"),
            @"page=2&size=25&status=pending&environment=prod&data_source_type=azure_blob&search=orders"
        );
    }

    #[test]
    fn test_unfiltered_first_page() {
        assert!(ListQuery::default().is_unfiltered_first_page());
        assert!(!ListQuery::new(1, 50, Filters::new()).is_unfiltered_first_page());
        assert!(
            !ListQuery::new(0, 50, Filters::new().with_status("pending"))
                .is_unfiltered_first_page()
        );
    }
}
