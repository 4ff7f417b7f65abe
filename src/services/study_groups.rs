//! Study-group endpoints.
//!
//! Read-side client for group listings, single groups and membership
//! queries, plus the "my groups" composite which degrades gracefully
//! when the member-enriched endpoint is slow or down.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::fetch::{ApiClient, ApiError};
use crate::models::{Pagination, StudyGroup, UserStudyGroup};

/// Hard ceiling on the whole "fetch my groups" composite operation.
pub const MY_GROUPS_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-attempt timeout inside the composite.
const MEMBER_FETCH_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);

const MEMBER_FETCH_ATTEMPTS: u32 = 3;

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Filter, sort and pagination parameters for the group listing.
#[derive(Debug, Clone, Default)]
pub struct GroupListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub min_elo: Option<u32>,
    pub max_elo: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl GroupListParams {
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
        if let Some(min) = self.min_elo {
            query.push(("minEloFilter", min.to_string()));
        }
        if let Some(max) = self.max_elo {
            query.push(("maxEloFilter", max.to_string()));
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

/// Paginated group listing response.
#[derive(Debug, Clone, Deserialize)]
pub struct StudyGroupsResponse {
    pub groups: Vec<StudyGroup>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
struct StudyGroupUsersResponse {
    #[serde(default)]
    study_group_users: Vec<UserStudyGroup>,
}

#[derive(Debug, Deserialize)]
struct UserStudyGroupsResponse {
    #[serde(default)]
    user_study_groups: Vec<UserStudyGroup>,
}

#[derive(Debug, Deserialize)]
struct OwnedGroupsResponse {
    #[serde(default)]
    study_groups: Vec<StudyGroup>,
}

/// Client for study-group endpoints.
pub struct StudyGroupService {
    client: Arc<ApiClient>,
}

impl StudyGroupService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// List study groups with filtering, sorting and pagination.
    pub async fn list(&self, params: &GroupListParams) -> Result<StudyGroupsResponse, ApiError> {
        self.client
            .get_json("study-groups", &params.to_query())
            .await
    }

    /// Fetch a single study group.
    pub async fn get(&self, group_id: i64) -> Result<StudyGroup, ApiError> {
        self.client
            .get_json(&format!("study-groups/{}", group_id), &[])
            .await
    }

    /// Members of a group. `update_ranks` asks the backend to refresh
    /// each member's stored rank first.
    pub async fn group_members(
        &self,
        group_id: i64,
        update_ranks: bool,
    ) -> Result<Vec<UserStudyGroup>, ApiError> {
        let response: StudyGroupUsersResponse = self
            .client
            .get_json(
                &format!("study-groups/{}/users", group_id),
                &[("update_ranks", update_ranks.to_string())],
            )
            .await?;
        Ok(response.study_group_users)
    }

    /// Groups a user belongs to.
    pub async fn groups_for_user(&self, user_id: i64) -> Result<Vec<UserStudyGroup>, ApiError> {
        let response: UserStudyGroupsResponse = self
            .client
            .get_json(&format!("users/{}/study-groups", user_id), &[])
            .await?;
        Ok(response.user_study_groups)
    }

    /// Groups created by a user.
    pub async fn owned_groups(&self, owner_id: i64) -> Result<Vec<StudyGroup>, ApiError> {
        let response: OwnedGroupsResponse = self
            .client
            .get_json(&format!("users/{}/owned-study-groups", owner_id), &[])
            .await?;
        Ok(response.study_groups)
    }

    /// Groups created by a user, with member rows attached.
    ///
    /// The member-enriched endpoint can be slow, so each attempt gets its
    /// own 15 s deadline and the whole composite is bounded by
    /// [`MY_GROUPS_TIMEOUT`]. After three failed attempts the plain
    /// owned-groups endpoint is used as a fallback, returning groups with
    /// empty member lists rather than nothing at all.
    pub async fn owned_groups_with_members(
        &self,
        owner_id: i64,
    ) -> Result<Vec<StudyGroup>, ApiError> {
        match tokio::time::timeout(
            MY_GROUPS_TIMEOUT,
            self.owned_groups_with_members_inner(owner_id),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout(MY_GROUPS_TIMEOUT)),
        }
    }

    async fn owned_groups_with_members_inner(
        &self,
        owner_id: i64,
    ) -> Result<Vec<StudyGroup>, ApiError> {
        let path = format!("users/{}/owned-study-groups-with-members", owner_id);
        let mut last_error: Option<ApiError> = None;

        for attempt in 1..=MEMBER_FETCH_ATTEMPTS {
            let fetch = async {
                let response: OwnedGroupsResponse = self.client.get_json(&path, &[]).await?;
                Ok::<_, ApiError>(response.study_groups)
            };

            match tokio::time::timeout(MEMBER_FETCH_ATTEMPT_TIMEOUT, fetch).await {
                Ok(Ok(groups)) => return Ok(groups),
                Ok(Err(err @ (ApiError::Client { .. } | ApiError::NotFound(_)))) => {
                    // The request itself is wrong; the fallback won't help.
                    return Err(err);
                }
                Ok(Err(err)) => {
                    warn!(
                        "owned-groups-with-members attempt {} failed: {}",
                        attempt, err
                    );
                    last_error = Some(err);
                }
                Err(_) => {
                    warn!(
                        "owned-groups-with-members attempt {} timed out after {:?}",
                        attempt, MEMBER_FETCH_ATTEMPT_TIMEOUT
                    );
                    last_error = Some(ApiError::Timeout(MEMBER_FETCH_ATTEMPT_TIMEOUT));
                }
            }

            if attempt < MEMBER_FETCH_ATTEMPTS {
                tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
            }
        }

        info!("falling back to plain owned-groups for user {}", owner_id);
        match self.owned_groups(owner_id).await {
            Ok(mut groups) => {
                for group in &mut groups {
                    group.members = Vec::new();
                }
                Ok(groups)
            }
            Err(fallback_err) => Err(last_error.unwrap_or(fallback_err)),
        }
    }
}
