//! Free-agent endpoints.

use std::sync::Arc;

use serde::Deserialize;

use crate::fetch::{ApiClient, ApiError};
use crate::models::{FreeAgent, Pagination};

use super::study_groups::SortOrder;

/// Filter, sort and pagination parameters for the free-agent listing.
#[derive(Debug, Clone, Default)]
pub struct FreeAgentFilters {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    /// Rank labels (e.g. "GOLD"), matched against the agent's rank string
    pub min_rank: Option<String>,
    pub max_rank: Option<String>,
    pub availability_days: Option<String>,
    pub availability_time: Option<String>,
    pub availability_timezone: Option<String>,
    pub region: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl FreeAgentFilters {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        if let Some(min_rank) = &self.min_rank {
            query.push(("minRank", min_rank.clone()));
        }
        if let Some(max_rank) = &self.max_rank {
            query.push(("maxRank", max_rank.clone()));
        }
        if let Some(days) = &self.availability_days {
            query.push(("availabilityDays", days.clone()));
        }
        if let Some(time) = &self.availability_time {
            query.push(("availabilityTime", time.clone()));
        }
        if let Some(timezone) = &self.availability_timezone {
            query.push(("availabilityTimezone", timezone.clone()));
        }
        if let Some(region) = &self.region {
            query.push(("region", region.clone()));
        }
        if let Some(sort_by) = &self.sort_by {
            query.push(("sort_by", sort_by.clone()));
        }
        if let Some(order) = self.sort_order {
            query.push(("sort_order", order.as_str().to_string()));
        }
        query
    }
}

/// Paginated free-agent listing response.
#[derive(Debug, Clone, Deserialize)]
pub struct FreeAgentsResponse {
    pub free_agents: Vec<FreeAgent>,
    pub pagination: Pagination,
}

/// Client for free-agent endpoints.
pub struct FreeAgentService {
    client: Arc<ApiClient>,
}

impl FreeAgentService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// List free agents with filtering, sorting and pagination.
    pub async fn list(&self, filters: &FreeAgentFilters) -> Result<FreeAgentsResponse, ApiError> {
        self.client
            .get_json("free-agents", &filters.to_query())
            .await
    }

    /// Fetch a single free agent by user ID.
    pub async fn get(&self, id: i64) -> Result<FreeAgent, ApiError> {
        self.client
            .get_json(&format!("free-agents/{}", id), &[])
            .await
    }
}
