//! Pagination metadata shared by list endpoints.

use serde::{Deserialize, Serialize};

/// Page bookkeeping returned alongside every paginated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub items_per_page: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_deserialize() {
        let json = r#"{
            "current_page": 2,
            "total_pages": 5,
            "total_items": 93,
            "items_per_page": 20,
            "has_next": true,
            "has_prev": true
        }"#;

        let page: Pagination = serde_json::from_str(json).unwrap();
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_items, 93);
        assert!(page.has_next);
        assert!(page.has_prev);
    }
}
