//! Historical rank-audit events.

use serde::{Deserialize, Serialize};

/// A persisted snapshot of a player's competitive standing.
///
/// Created by an external audit process whenever a player's rank is
/// refreshed and immutable afterwards. The backend does not guarantee
/// any ordering between events for the same player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankAuditEvent {
    /// Unique event identifier
    pub id: i64,

    /// When the snapshot was recorded (ISO 8601)
    pub created_at: String,

    /// Numeric rank score at that moment
    pub elo: u32,

    /// Cumulative win count at that moment (not a delta)
    pub wins: u32,

    /// Cumulative loss count at that moment (not a delta)
    pub losses: u32,

    /// Opaque player identifier; a join key, not a display name
    pub riot_id: String,
}

impl RankAuditEvent {
    /// The calendar-date component of `created_at`.
    ///
    /// Handles both "2024-01-05" and "2024-01-05T12:30:00.000Z" formats.
    pub fn created_date(&self) -> &str {
        if self.created_at.len() >= 10 {
            &self.created_at[..10]
        } else {
            &self.created_at
        }
    }
}
