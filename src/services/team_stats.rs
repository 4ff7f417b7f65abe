//! Team statistics endpoints.
//!
//! The member-stats endpoint has grown two response shapes over time.
//! Both are decoded into one tagged union here and normalized into a
//! single bundle, so nothing downstream ever inspects raw shapes.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::{cache_key, CacheStats, TtlCache};
use crate::config::CacheSettings;
use crate::fetch::{ApiClient, ApiError};
use crate::models::{LivePlayerData, MemberData, RankAuditEvent};

/// Aggregated team stats as served by the basic team-stats endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStatsData {
    #[serde(default)]
    pub events: Vec<RankAuditEvent>,

    #[serde(default)]
    pub member_count: u32,

    #[serde(default)]
    pub average_elo: u32,

    #[serde(default)]
    pub total_wins: u32,

    #[serde(default)]
    pub total_losses: u32,
}

/// The current member-stats shape: events plus name map and live data.
#[derive(Debug, Clone, Deserialize)]
pub struct CombinedTeamStats {
    /// Required; its presence is what distinguishes this shape from the
    /// legacy one.
    pub events: Vec<RankAuditEvent>,

    #[serde(default, rename = "memberNames")]
    pub member_names: HashMap<String, String>,

    #[serde(default, rename = "liveData")]
    pub live_data: HashMap<String, LivePlayerData>,

    #[serde(default)]
    pub members: Vec<MemberData>,
}

/// The two historical shapes of the member-stats endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MemberStatsResponse {
    /// Current shape with an explicit name map and live data.
    Combined(CombinedTeamStats),

    /// Legacy shape: a plain mapping from display name (or riot id) to
    /// that player's events, with no separate name map.
    Legacy(HashMap<String, Vec<RankAuditEvent>>),
}

/// Normalized team-stats payload handed to the merge engine.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TeamStatsBundle {
    pub events: Vec<RankAuditEvent>,

    /// riot_id → display name
    pub member_names: HashMap<String, String>,

    /// summoner name → live snapshot
    pub live_data: HashMap<String, LivePlayerData>,

    pub members: Vec<MemberData>,
}

impl MemberStatsResponse {
    /// Collapse either shape into one bundle.
    ///
    /// The legacy shape carries no name map, so each key maps to itself;
    /// the flattened event list preserves per-player grouping only
    /// through riot ids.
    pub fn normalize(self) -> TeamStatsBundle {
        match self {
            MemberStatsResponse::Combined(combined) => TeamStatsBundle {
                events: combined.events,
                member_names: combined.member_names,
                live_data: combined.live_data,
                members: combined.members,
            },
            MemberStatsResponse::Legacy(map) => {
                let mut events = Vec::new();
                let mut member_names = HashMap::new();
                for (name, mut player_events) in map {
                    member_names.insert(name.clone(), name);
                    events.append(&mut player_events);
                }
                TeamStatsBundle {
                    events,
                    member_names,
                    ..Default::default()
                }
            }
        }
    }
}

/// Client for team-stats endpoints, with per-endpoint TTL caching.
pub struct TeamStatsService {
    client: Arc<ApiClient>,
    stats_cache: TtlCache<TeamStatsData>,
    bundle_cache: TtlCache<TeamStatsBundle>,
    live_bundle_cache: TtlCache<TeamStatsBundle>,
}

impl TeamStatsService {
    pub fn new(client: Arc<ApiClient>, cache: &CacheSettings) -> Self {
        Self {
            client,
            stats_cache: TtlCache::new(cache.stats_ttl()),
            bundle_cache: TtlCache::new(cache.stats_ttl()),
            live_bundle_cache: TtlCache::new(cache.live_ttl()),
        }
    }

    fn base_query(group_id: i64, start_date: &str) -> Vec<(&'static str, String)> {
        vec![
            ("group_id", group_id.to_string()),
            ("start_date", start_date.to_string()),
        ]
    }

    /// Aggregated team stats for a group since `start_date`.
    pub async fn team_stats(
        &self,
        group_id: i64,
        start_date: &str,
    ) -> Result<TeamStatsData, ApiError> {
        let query = Self::base_query(group_id, start_date);
        let key = cache_key("team-stats", &query);
        self.stats_cache
            .get_or_fetch(&key, || self.client.get_json("team-stats", &query))
            .await
    }

    /// Per-member events for a group, accepting both response shapes.
    pub async fn member_stats(
        &self,
        group_id: i64,
        start_date: &str,
    ) -> Result<TeamStatsBundle, ApiError> {
        let query = Self::base_query(group_id, start_date);
        let key = cache_key("team-stats/members", &query);
        self.bundle_cache
            .get_or_fetch(&key, || async {
                let response: MemberStatsResponse =
                    self.client.get_json("team-stats/members", &query).await?;
                Ok(response.normalize())
            })
            .await
    }

    /// Member events plus current member rows and live data.
    pub async fn combined_stats(
        &self,
        group_id: i64,
        start_date: &str,
    ) -> Result<TeamStatsBundle, ApiError> {
        let mut query = Self::base_query(group_id, start_date);
        query.push(("include_members", "true".to_string()));
        let key = cache_key("team-stats/members-combined", &query);
        self.bundle_cache
            .get_or_fetch(&key, || async {
                let response: MemberStatsResponse =
                    self.client.get_json("team-stats/members", &query).await?;
                Ok(response.normalize())
            })
            .await
    }

    /// Everything needed for the team view in one call.
    ///
    /// Tries the combined endpoint first and falls back to plain member
    /// stats (no live data, no member rows) when it fails, so a degraded
    /// backend still yields charts.
    pub async fn optimized_stats(
        &self,
        group_id: i64,
        start_date: &str,
        include_live_data: bool,
    ) -> Result<TeamStatsBundle, ApiError> {
        let key = self.optimized_key(group_id, start_date, include_live_data);
        let cache = self.optimized_cache(include_live_data);

        cache
            .get_or_fetch(&key, || async {
                match self.combined_stats(group_id, start_date).await {
                    Ok(bundle) => Ok(bundle),
                    Err(err) => {
                        warn!(
                            "combined stats failed for group {} ({}), falling back to member stats",
                            group_id, err
                        );
                        self.member_stats(group_id, start_date).await
                    }
                }
            })
            .await
    }

    /// Drop the cached optimized bundle for one query, forcing the next
    /// call to refetch.
    pub fn invalidate_optimized(&self, group_id: i64, start_date: &str, include_live_data: bool) {
        let key = self.optimized_key(group_id, start_date, include_live_data);
        self.optimized_cache(include_live_data).invalidate(&key);
        debug!("invalidated optimized stats for group {}", group_id);
    }

    fn optimized_key(&self, group_id: i64, start_date: &str, include_live_data: bool) -> String {
        let mut query = Self::base_query(group_id, start_date);
        query.push(("includeLiveData", include_live_data.to_string()));
        cache_key("team-stats/optimized", &query)
    }

    fn optimized_cache(&self, include_live_data: bool) -> &TtlCache<TeamStatsBundle> {
        // Live-inclusive bundles go stale with the live data they carry.
        if include_live_data {
            &self.live_bundle_cache
        } else {
            &self.bundle_cache
        }
    }

    /// Drop all cached team-stats data.
    pub fn clear_cache(&self) {
        self.stats_cache.clear();
        self.bundle_cache.clear();
        self.live_bundle_cache.clear();
    }

    /// Combined statistics over all internal caches.
    pub fn cache_stats(&self) -> CacheStats {
        self.stats_cache
            .stats()
            .merge(self.bundle_cache.stats())
            .merge(self.live_bundle_cache.stats())
    }
}
