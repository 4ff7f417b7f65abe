//! Per-player rank-audit history.

use std::sync::Arc;

use serde::Deserialize;

use crate::fetch::{ApiClient, ApiError};
use crate::models::RankAuditEvent;

/// Rank-audit history for one player.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerStatsData {
    #[serde(default)]
    pub events: Vec<RankAuditEvent>,
}

/// Client for the player-stats endpoint.
pub struct PlayerStatsService {
    client: Arc<ApiClient>,
}

impl PlayerStatsService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch a player's rank-audit events. An empty list is valid data,
    /// not an error.
    pub async fn get(&self, riot_id: &str) -> Result<PlayerStatsData, ApiError> {
        self.client
            .get_json(&format!("player-stats/{}", riot_id), &[])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_stats_deserialize() {
        let json = r#"{
            "events": [
                {"id": 1, "created_at": "2024-01-01", "elo": 800, "wins": 10, "losses": 5, "riot_id": "p1"}
            ]
        }"#;

        let data: PlayerStatsData = serde_json::from_str(json).unwrap();
        assert_eq!(data.events.len(), 1);
        assert_eq!(data.events[0].elo, 800);
    }

    #[test]
    fn test_empty_events_is_valid() {
        let data: PlayerStatsData = serde_json::from_str("{}").unwrap();
        assert!(data.events.is_empty());
    }
}
