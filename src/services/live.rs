//! Live player statistics.
//!
//! Assembles a current rank snapshot for every member of a group by
//! fanning out one league lookup per member. Lookups settle
//! independently: a member whose lookup fails is logged and skipped, so
//! one bad account never sinks the whole group.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::cache::{cache_key, CacheStats, TtlCache};
use crate::config::CacheSettings;
use crate::fetch::{ApiClient, ApiError};
use crate::models::{LivePlayerData, LiveStats, UserStudyGroup};
use crate::rank::{rank_to_elo, Division, RankDescriptor, Tier};

/// The ranked queue whose entry feeds live stats. Turbo entries are
/// ignored here.
pub const RANKED_QUEUE: &str = "RANKED_TFT";

/// One queue entry from the upstream league endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LeagueEntry {
    #[serde(rename = "queueType")]
    pub queue_type: String,

    pub tier: String,

    /// Division numeral; absent for apex tiers
    #[serde(default)]
    pub rank: Option<String>,

    #[serde(rename = "leaguePoints", default)]
    pub league_points: i32,

    #[serde(default)]
    pub wins: u32,

    #[serde(default)]
    pub losses: u32,
}

impl LeagueEntry {
    /// Derive the ELO score for this entry via the rank codec.
    pub fn elo(&self) -> u32 {
        let tier = self.tier.parse::<Tier>().ok();
        let division = self
            .rank
            .as_deref()
            .and_then(|rank| rank.parse::<Division>().ok());
        rank_to_elo(&RankDescriptor::new(tier, division, self.league_points))
    }
}

#[derive(Debug, Deserialize)]
struct StudyGroupUsersResponse {
    #[serde(default)]
    study_group_users: Vec<UserStudyGroup>,
}

/// Client for live rank snapshots.
pub struct LivePlayerService {
    client: Arc<ApiClient>,
    live_cache: TtlCache<LiveStats>,
    member_cache: TtlCache<Vec<UserStudyGroup>>,
}

impl LivePlayerService {
    pub fn new(client: Arc<ApiClient>, cache: &CacheSettings) -> Self {
        Self {
            client,
            live_cache: TtlCache::new(cache.live_ttl()),
            member_cache: TtlCache::new(cache.member_list_ttl()),
        }
    }

    fn live_key(group_id: i64) -> String {
        cache_key("live-player-stats", &[("group_id", group_id.to_string())])
    }

    /// Group member rows, cached with the member-list TTL.
    async fn group_members(&self, group_id: i64) -> Result<Vec<UserStudyGroup>, ApiError> {
        let key = cache_key(
            "study-groups/users",
            &[("group_id", group_id.to_string())],
        );
        self.member_cache
            .get_or_fetch(&key, || async {
                let response: StudyGroupUsersResponse = self
                    .client
                    .get_json(&format!("study-groups/{}/users", group_id), &[])
                    .await?;
                Ok(response.study_group_users)
            })
            .await
    }

    /// Current rank snapshots for every member of a group, keyed by
    /// summoner name. Members with no ranked entry (or a failing lookup)
    /// are absent from the map; an empty map is valid data.
    pub async fn live_stats(&self, group_id: i64) -> Result<LiveStats, ApiError> {
        let key = Self::live_key(group_id);
        self.live_cache
            .get_or_fetch(&key, || self.fetch_live_stats(group_id))
            .await
    }

    async fn fetch_live_stats(&self, group_id: i64) -> Result<LiveStats, ApiError> {
        let members = self.group_members(group_id).await?;
        debug!(
            "fetching live stats for {} members of group {}",
            members.len(),
            group_id
        );

        let mut lookups = JoinSet::new();
        for member in members {
            let client = Arc::clone(&self.client);
            lookups.spawn(async move {
                let name = member.display_name().to_string();
                match fetch_member_snapshot(&client, &member).await {
                    Ok(Some(snapshot)) => Some((name, snapshot)),
                    Ok(None) => {
                        debug!("no ranked entry for {}", name);
                        None
                    }
                    Err(err) => {
                        warn!("live lookup failed for {}: {}", name, err);
                        None
                    }
                }
            });
        }

        let mut stats = LiveStats::new();
        while let Some(joined) = lookups.join_next().await {
            if let Ok(Some((name, snapshot))) = joined {
                stats.insert(name, snapshot);
            }
        }

        info!(
            "live stats for group {}: {} of the lookups yielded data",
            group_id,
            stats.len()
        );
        Ok(stats)
    }

    /// Drop the cached snapshots for one group, forcing the next call to
    /// refetch.
    pub fn invalidate_group(&self, group_id: i64) {
        self.live_cache.invalidate(&Self::live_key(group_id));
    }

    /// Drop all cached live data and member lists.
    pub fn clear_cache(&self) {
        self.live_cache.clear();
        self.member_cache.clear();
    }

    /// Combined statistics over the internal caches.
    pub fn cache_stats(&self) -> CacheStats {
        self.live_cache.stats().merge(self.member_cache.stats())
    }
}

/// Fetch one member's league data and build their live snapshot.
///
/// Returns `Ok(None)` when the member has no entry in the ranked queue.
async fn fetch_member_snapshot(
    client: &ApiClient,
    member: &UserStudyGroup,
) -> Result<Option<LivePlayerData>, ApiError> {
    let entries: Vec<LeagueEntry> = client
        .get_json(&format!("tft-league/{}", member.riot_id), &[])
        .await?;

    let Some(ranked) = entries.iter().find(|entry| entry.queue_type == RANKED_QUEUE) else {
        return Ok(None);
    };

    Ok(Some(LivePlayerData {
        riot_id: member.riot_id.clone(),
        summoner_name: member.display_name().to_string(),
        tier: ranked.tier.clone(),
        rank: ranked.rank.clone(),
        league_points: ranked.league_points,
        wins: ranked.wins,
        losses: ranked.losses,
        elo: ranked.elo(),
        created_at: Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_league_entry_elo_with_division() {
        let entry = LeagueEntry {
            queue_type: RANKED_QUEUE.to_string(),
            tier: "GOLD".to_string(),
            rank: Some("II".to_string()),
            league_points: 45,
            wins: 12,
            losses: 8,
        };
        assert_eq!(entry.elo(), 1445);
    }

    #[test]
    fn test_league_entry_elo_apex() {
        let entry = LeagueEntry {
            queue_type: RANKED_QUEUE.to_string(),
            tier: "CHALLENGER".to_string(),
            rank: None,
            league_points: 950,
            wins: 200,
            losses: 150,
        };
        assert_eq!(entry.elo(), 3750);
    }

    #[test]
    fn test_league_entry_elo_unknown_tier() {
        let entry = LeagueEntry {
            queue_type: RANKED_QUEUE.to_string(),
            tier: "COPPER".to_string(),
            rank: Some("I".to_string()),
            league_points: 10,
            wins: 0,
            losses: 0,
        };
        assert_eq!(entry.elo(), 0);
    }

    #[test]
    fn test_league_entry_deserialize() {
        let json = r#"{
            "queueType": "RANKED_TFT",
            "tier": "DIAMOND",
            "rank": "IV",
            "leaguePoints": 12,
            "wins": 40,
            "losses": 33
        }"#;

        let entry: LeagueEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.queue_type, RANKED_QUEUE);
        assert_eq!(entry.elo(), 2412);
    }
}
