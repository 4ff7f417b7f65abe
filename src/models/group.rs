//! Study-group models.

use serde::{Deserialize, Serialize};

/// A study group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyGroup {
    pub id: i64,

    pub group_name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub image_url: Option<String>,

    pub created_at: String,

    #[serde(default)]
    pub updated_at: Option<String>,

    /// Number of members, when the endpoint includes it
    #[serde(default)]
    pub member_count: Option<u32>,

    #[serde(default)]
    pub total_elo: Option<u32>,

    #[serde(default)]
    pub avg_elo: Option<u32>,

    /// User ID of the group creator
    #[serde(default)]
    pub owner: Option<i64>,

    /// Member rows; populated only by the owned-groups-with-members endpoint
    #[serde(default)]
    pub members: Vec<UserStudyGroup>,
}

/// A user's membership row in a study group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStudyGroup {
    pub id: i64,

    pub created_at: String,

    /// Opaque player identifier (join key against the name lookup)
    pub riot_id: String,

    pub study_group_id: i64,

    #[serde(default)]
    pub owner: Option<i64>,

    #[serde(default)]
    pub elo: Option<u32>,

    #[serde(default)]
    pub rank: Option<String>,

    #[serde(default)]
    pub summoner_name: Option<String>,

    #[serde(default)]
    pub icon_id: Option<i64>,

    #[serde(default)]
    pub user_id: Option<i64>,
}

impl UserStudyGroup {
    /// Display name for this member, falling back to the riot id.
    pub fn display_name(&self) -> &str {
        self.summoner_name.as_deref().unwrap_or(&self.riot_id)
    }
}

/// A current member row from the combined team-stats response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberData {
    pub summoner_name: String,

    #[serde(default)]
    pub elo: u32,

    #[serde(default)]
    pub owner: Option<i64>,

    #[serde(default)]
    pub rank: Option<String>,

    #[serde(default)]
    pub icon_id: Option<i64>,

    #[serde(default)]
    pub user_id: Option<i64>,

    /// Live ELO, merged in by the backend when available
    #[serde(default)]
    pub current_elo: Option<u32>,

    #[serde(default)]
    pub current_wins: Option<u32>,

    #[serde(default)]
    pub current_losses: Option<u32>,
}
