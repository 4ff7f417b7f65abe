//! Live rank snapshots.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Live snapshots keyed by summoner name.
pub type LiveStats = HashMap<String, LivePlayerData>;

/// A current, non-persisted snapshot of a player's rank.
///
/// Constructed fresh on every fetch. When merged with historical events
/// the live snapshot is the authoritative latest point and takes
/// precedence over any same-day audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivePlayerData {
    pub riot_id: String,
    pub summoner_name: String,

    /// Rank tier as reported upstream (e.g. "GOLD")
    pub tier: String,

    /// Division numeral ("I".."IV"); absent for apex tiers
    #[serde(default)]
    pub rank: Option<String>,

    #[serde(rename = "leaguePoints", default)]
    pub league_points: i32,

    pub wins: u32,
    pub losses: u32,

    /// Derived from tier/rank/LP via the rank codec, not supplied upstream
    pub elo: u32,

    /// Fetch timestamp; always "now", never historical
    pub created_at: String,
}
