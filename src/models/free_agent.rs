//! Free-agent models.

use serde::{Deserialize, Serialize};

/// A player advertising themselves as available for recruitment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreeAgent {
    /// User ID of the advertising player
    pub id: i64,

    pub summoner_name: String,

    pub elo: u32,

    /// Full rank string (e.g. "GOLD II 45LP")
    #[serde(default)]
    pub rank: String,

    #[serde(default)]
    pub looking_for: String,

    #[serde(default)]
    pub availability: Vec<String>,

    #[serde(default)]
    pub time: Option<String>,

    #[serde(default)]
    pub timezone: Option<String>,

    #[serde(default)]
    pub experience: String,

    #[serde(default)]
    pub created_date: Option<String>,

    #[serde(default)]
    pub region: String,

    #[serde(default)]
    pub date_updated: Option<String>,

    #[serde(default)]
    pub icon_id: Option<i64>,

    #[serde(default)]
    pub riot_id: Option<String>,
}
