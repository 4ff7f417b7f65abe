//! Chart-facing output models.
//!
//! These are the shapes handed to chart and summary renderers; the merge
//! engine is the only producer.

use serde::{Deserialize, Serialize};

/// X-axis label for the trailing live point.
///
/// Must sort after every real ISO date label so the live point always
/// lands at the end of a series.
pub const CURRENT_LABEL: &str = "Current";

/// A single point on a rank progression chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Calendar-date label, or [`CURRENT_LABEL`] for a live point
    pub label: String,

    pub elo: u32,

    /// Cumulative wins at this point
    pub wins: u32,

    /// Cumulative losses at this point
    pub losses: u32,

    pub is_live: bool,
}

/// One member's full chart series, ordered oldest to newest with any
/// live point last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSeries {
    /// Resolved display name (raw riot id when no mapping exists)
    pub name: String,

    pub points: Vec<ChartPoint>,
}

/// A point on the team-average series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamAveragePoint {
    pub label: String,

    /// Rounded mean ELO of the members contributing at this label
    pub elo: u32,

    /// Cumulative wins summed across contributing members
    pub total_wins: u32,

    /// Cumulative losses summed across contributing members
    pub total_losses: u32,

    /// How many members contributed at this label
    pub member_count: usize,

    /// Whether any contributing point was live
    pub is_live: bool,
}

/// The team-average series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamAverageSeries {
    pub name: String,
    pub points: Vec<TeamAveragePoint>,
}

/// Aggregate current-snapshot statistics for a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSummary {
    /// Rounded mean of each member's latest ELO
    pub average_elo: u32,

    pub total_wins: u32,

    pub total_losses: u32,

    /// Percentage with one decimal place; "0.0" when no games
    pub win_rate: String,

    /// Size of the full member-identity mapping, including members with
    /// no stats data
    pub member_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_label_sorts_after_iso_dates() {
        // Label ordering is lexical; the sentinel must come last.
        assert!(CURRENT_LABEL > "2024-12-31");
        assert!(CURRENT_LABEL > "2099-01-01");
    }

    #[test]
    fn test_chart_point_serialization() {
        let point = ChartPoint {
            label: "2024-01-05".to_string(),
            elo: 1450,
            wins: 12,
            losses: 8,
            is_live: false,
        };

        let json = serde_json::to_string(&point).unwrap();
        let parsed: ChartPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(point, parsed);
    }
}
