//! Merging historical rank audits with live snapshots.
//!
//! Produces the chart-facing outputs: per-player progression series, the
//! team-average series, and the current-snapshot summary. Everything here
//! is pure; absence of data yields empty series or `None`, never an error.
//!
//! Two rules hold throughout: `elo` is a snapshot value, averaged only
//! across players at one instant, while `wins`/`losses` are cumulative
//! counts summed across players. A live snapshot unconditionally beats
//! historical data as a player's latest point, even when its ELO is lower.

use std::collections::{BTreeSet, HashMap};

use crate::models::{
    ChartPoint, LivePlayerData, LiveStats, PlayerSeries, RankAuditEvent, TeamAveragePoint,
    TeamAverageSeries, TeamSummary, CURRENT_LABEL,
};

/// Resolve an event's riot id to a display name.
///
/// Unmapped ids are used verbatim: events are never dropped or blanked
/// for lack of a name entry.
pub fn resolve_name<'a>(member_names: &'a HashMap<String, String>, riot_id: &'a str) -> &'a str {
    member_names
        .get(riot_id)
        .map(String::as_str)
        .unwrap_or(riot_id)
}

/// Group events by resolved display name.
pub fn group_events_by_member(
    events: &[RankAuditEvent],
    member_names: &HashMap<String, String>,
) -> HashMap<String, Vec<RankAuditEvent>> {
    let mut grouped: HashMap<String, Vec<RankAuditEvent>> = HashMap::new();
    for event in events {
        let name = resolve_name(member_names, &event.riot_id);
        grouped.entry(name.to_string()).or_default().push(event.clone());
    }
    grouped
}

/// Find a live snapshot for a display name, tolerating inconsistent
/// casing between data sources.
fn live_entry<'a>(live_data: &'a LiveStats, name: &str) -> Option<&'a LivePlayerData> {
    live_data
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, data)| data)
}

/// Build one player's chart series.
///
/// Historical events are sorted ascending by timestamp (the source does
/// not guarantee ordering) and truncated to date-only labels. A live
/// snapshot, when present, appends exactly one trailing point labeled
/// [`CURRENT_LABEL`] — always last, regardless of the current real date.
pub fn player_series(events: &[RankAuditEvent], live: Option<&LivePlayerData>) -> Vec<ChartPoint> {
    let mut ordered: Vec<&RankAuditEvent> = events.iter().collect();
    ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let mut points: Vec<ChartPoint> = ordered
        .into_iter()
        .map(|event| ChartPoint {
            label: event.created_date().to_string(),
            elo: event.elo,
            wins: event.wins,
            losses: event.losses,
            is_live: false,
        })
        .collect();

    if let Some(live) = live {
        points.push(ChartPoint {
            label: CURRENT_LABEL.to_string(),
            elo: live.elo,
            wins: live.wins,
            losses: live.losses,
            is_live: true,
        });
    }

    points
}

/// Build every member's series from events, the name map and live data.
///
/// Members known only through live data still get a (single-point)
/// series. Output is sorted by name for stable rendering.
pub fn all_player_series(
    events: &[RankAuditEvent],
    member_names: &HashMap<String, String>,
    live_data: &LiveStats,
) -> Vec<PlayerSeries> {
    let grouped = group_events_by_member(events, member_names);

    let mut series: Vec<PlayerSeries> = grouped
        .iter()
        .map(|(name, player_events)| PlayerSeries {
            name: name.clone(),
            points: player_series(player_events, live_entry(live_data, name)),
        })
        .collect();

    for (name, live) in live_data {
        let already_present = grouped
            .keys()
            .any(|existing| existing.eq_ignore_ascii_case(name));
        if !already_present {
            series.push(PlayerSeries {
                name: name.clone(),
                points: player_series(&[], Some(live)),
            });
        }
    }

    series.sort_by(|a, b| a.name.cmp(&b.name));
    series
}

/// Build the team-average series across all member series.
///
/// For each distinct label, only members with a point at that label
/// contribute — a member with no event on a date is skipped, not
/// forward-filled or zeroed. Labels sort lexically, which orders ISO
/// dates chronologically and places the "Current" sentinel last.
pub fn team_average_series(series: &[PlayerSeries]) -> TeamAverageSeries {
    let labels: BTreeSet<&str> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.label.as_str()))
        .collect();

    let mut points = Vec::with_capacity(labels.len());
    for label in labels {
        let contributors: Vec<&ChartPoint> = series
            .iter()
            .filter_map(|s| s.points.iter().find(|p| p.label == label))
            .collect();
        if contributors.is_empty() {
            continue;
        }

        let elo_sum: u64 = contributors.iter().map(|p| p.elo as u64).sum();
        let average_elo = (elo_sum as f64 / contributors.len() as f64).round() as u32;

        points.push(TeamAveragePoint {
            label: label.to_string(),
            elo: average_elo,
            total_wins: contributors.iter().map(|p| p.wins).sum(),
            total_losses: contributors.iter().map(|p| p.losses).sum(),
            member_count: contributors.len(),
            is_live: contributors.iter().any(|p| p.is_live),
        });
    }

    TeamAverageSeries {
        name: "Team Average".to_string(),
        points,
    }
}

/// A player's most recent known standing.
#[derive(Debug, Clone, Copy)]
struct LatestPoint {
    elo: u32,
    wins: u32,
    losses: u32,
}

/// Latest known point per member. Live data overrides history
/// unconditionally: recency wins over magnitude.
fn latest_points(
    events: &[RankAuditEvent],
    member_names: &HashMap<String, String>,
    live_data: &LiveStats,
) -> HashMap<String, LatestPoint> {
    let mut latest: HashMap<String, LatestPoint> = HashMap::new();

    for (name, player_events) in group_events_by_member(events, member_names) {
        if let Some(newest) = player_events
            .iter()
            .max_by(|a, b| a.created_at.cmp(&b.created_at))
        {
            latest.insert(
                name,
                LatestPoint {
                    elo: newest.elo,
                    wins: newest.wins,
                    losses: newest.losses,
                },
            );
        }
    }

    for (name, live) in live_data {
        let key = latest
            .keys()
            .find(|existing| existing.eq_ignore_ascii_case(name))
            .cloned()
            .unwrap_or_else(|| name.clone());
        latest.insert(
            key,
            LatestPoint {
                elo: live.elo,
                wins: live.wins,
                losses: live.losses,
            },
        );
    }

    latest
}

/// Win rate as a percentage string with one decimal place.
///
/// Zero games reports "0.0" rather than dividing by zero.
pub fn format_win_rate(wins: u32, losses: u32) -> String {
    let total = wins + losses;
    if total == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", wins as f64 / total as f64 * 100.0)
}

/// Aggregate current-snapshot statistics for a group.
///
/// `member_count` is the size of the full identity mapping: members with
/// no stats data still count toward group size. Returns `None` when
/// there is no historical and no live data at all — callers must render
/// that as "no data", not as zeros.
pub fn team_summary(
    events: &[RankAuditEvent],
    member_names: &HashMap<String, String>,
    live_data: &LiveStats,
) -> Option<TeamSummary> {
    if events.is_empty() && live_data.is_empty() {
        return None;
    }

    let latest = latest_points(events, member_names, live_data);
    if latest.is_empty() {
        return None;
    }

    let elo_sum: u64 = latest.values().map(|p| p.elo as u64).sum();
    let average_elo = (elo_sum as f64 / latest.len() as f64).round() as u32;
    let total_wins: u32 = latest.values().map(|p| p.wins).sum();
    let total_losses: u32 = latest.values().map(|p| p.losses).sum();

    Some(TeamSummary {
        average_elo,
        total_wins,
        total_losses,
        win_rate: format_win_rate(total_wins, total_losses),
        member_count: member_names.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn event(riot_id: &str, elo: u32, wins: u32, losses: u32, created_at: &str) -> RankAuditEvent {
        RankAuditEvent {
            id: 0,
            created_at: created_at.to_string(),
            elo,
            wins,
            losses,
            riot_id: riot_id.to_string(),
        }
    }

    fn live(name: &str, elo: u32, wins: u32, losses: u32) -> LivePlayerData {
        LivePlayerData {
            riot_id: format!("riot-{}", name),
            summoner_name: name.to_string(),
            tier: "GOLD".to_string(),
            rank: Some("II".to_string()),
            league_points: 45,
            wins,
            losses,
            elo,
            created_at: "2024-03-01T12:00:00Z".to_string(),
        }
    }

    fn names(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_name_fallback_to_riot_id() {
        let map = names(&[("p1", "Alice")]);
        assert_eq!(resolve_name(&map, "p1"), "Alice");
        assert_eq!(resolve_name(&map, "unknown-id"), "unknown-id");
    }

    #[test]
    fn test_player_series_sorts_out_of_order_events() {
        let events = vec![
            event("p1", 900, 12, 6, "2024-01-10"),
            event("p1", 800, 10, 5, "2024-01-01"),
            event("p1", 850, 11, 5, "2024-01-05"),
        ];

        let series = player_series(&events, None);
        let labels: Vec<&str> = series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["2024-01-01", "2024-01-05", "2024-01-10"]);
        assert!(series.iter().all(|p| !p.is_live));
    }

    #[test]
    fn test_player_series_live_point_last() {
        let events = vec![
            event("p1", 1000, 20, 10, "2099-12-31"),
            event("p1", 900, 15, 9, "2024-01-01"),
        ];
        let snapshot = live("Alice", 950, 21, 10);

        let series = player_series(&events, Some(&snapshot));
        let last = series.last().unwrap();
        assert_eq!(last.label, CURRENT_LABEL);
        assert_eq!(last.elo, 950);
        assert!(last.is_live);
        // Exactly one live point.
        assert_eq!(series.iter().filter(|p| p.is_live).count(), 1);
    }

    #[test]
    fn test_player_series_truncates_timestamps() {
        let events = vec![event("p1", 800, 10, 5, "2024-01-01T18:45:00.000Z")];
        let series = player_series(&events, None);
        assert_eq!(series[0].label, "2024-01-01");
    }

    #[test]
    fn test_average_skips_missing_members() {
        // Player A has no event on 2024-01-02; the average there is
        // exactly B's elo, not a mean with a missing value.
        let a = PlayerSeries {
            name: "A".to_string(),
            points: player_series(&[event("a", 1000, 5, 5, "2024-01-01")], None),
        };
        let b = PlayerSeries {
            name: "B".to_string(),
            points: player_series(
                &[
                    event("b", 2000, 9, 1, "2024-01-01"),
                    event("b", 2100, 10, 1, "2024-01-02"),
                ],
                None,
            ),
        };

        let average = team_average_series(&[a, b]);
        assert_eq!(average.name, "Team Average");
        assert_eq!(average.points.len(), 2);

        let day_one = &average.points[0];
        assert_eq!(day_one.label, "2024-01-01");
        assert_eq!(day_one.elo, 1500);
        assert_eq!(day_one.total_wins, 14);
        assert_eq!(day_one.member_count, 2);

        let day_two = &average.points[1];
        assert_eq!(day_two.label, "2024-01-02");
        assert_eq!(day_two.elo, 2100);
        assert_eq!(day_two.member_count, 1);
    }

    #[test]
    fn test_average_rounds_to_nearest() {
        let a = PlayerSeries {
            name: "A".to_string(),
            points: player_series(&[event("a", 1000, 0, 0, "2024-01-01")], None),
        };
        let b = PlayerSeries {
            name: "B".to_string(),
            points: player_series(&[event("b", 1001, 0, 0, "2024-01-01")], None),
        };

        let average = team_average_series(&[a, b]);
        assert_eq!(average.points[0].elo, 1001); // 1000.5 rounds up
    }

    #[test]
    fn test_average_current_label_sorts_last() {
        let snapshot = live("Alice", 1500, 30, 20);
        let series = vec![PlayerSeries {
            name: "Alice".to_string(),
            points: player_series(
                &[event("a", 1400, 28, 19, "2024-02-01")],
                Some(&snapshot),
            ),
        }];

        let average = team_average_series(&series);
        let labels: Vec<&str> = average.points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["2024-02-01", CURRENT_LABEL]);
        assert!(average.points.last().unwrap().is_live);
    }

    #[test]
    fn test_win_rate_zero_guard() {
        assert_eq!(format_win_rate(0, 0), "0.0");
    }

    #[test]
    fn test_win_rate_one_decimal() {
        assert_eq!(format_win_rate(11, 5), "68.8");
        assert_eq!(format_win_rate(1, 1), "50.0");
        assert_eq!(format_win_rate(10, 0), "100.0");
    }

    #[test]
    fn test_live_overrides_history_even_when_lower() {
        let events = vec![event("p1", 1000, 10, 5, "2024-03-01")];
        let map = names(&[("p1", "Alice")]);
        let mut live_data = LiveStats::new();
        live_data.insert("Alice".to_string(), live("Alice", 900, 11, 5));

        let summary = team_summary(&events, &map, &live_data).unwrap();
        assert_eq!(summary.average_elo, 900);
        assert_eq!(summary.total_wins, 11);

        // The per-player series keeps the historical point and appends
        // the live one.
        let all = all_player_series(&events, &map, &live_data);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].points.len(), 2);
        assert_eq!(all[0].points[0].elo, 1000);
        assert_eq!(all[0].points[1].elo, 900);
        assert_eq!(all[0].points[1].label, CURRENT_LABEL);
    }

    #[test]
    fn test_live_matching_is_case_insensitive() {
        let events = vec![event("p1", 1000, 10, 5, "2024-03-01")];
        let map = names(&[("p1", "Alice")]);
        let mut live_data = LiveStats::new();
        live_data.insert("ALICE".to_string(), live("ALICE", 1100, 11, 5));

        // One member, not two: "ALICE" and "Alice" are the same player.
        let all = all_player_series(&events, &map, &live_data);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].points.last().unwrap().elo, 1100);

        let summary = team_summary(&events, &map, &live_data).unwrap();
        assert_eq!(summary.average_elo, 1100);
    }

    #[test]
    fn test_live_only_member_gets_series() {
        let map = HashMap::new();
        let mut live_data = LiveStats::new();
        live_data.insert("Newcomer".to_string(), live("Newcomer", 1234, 4, 4));

        let all = all_player_series(&[], &map, &live_data);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Newcomer");
        assert_eq!(all[0].points.len(), 1);
        assert!(all[0].points[0].is_live);
    }

    #[test]
    fn test_summary_none_when_no_data() {
        let map = names(&[("p1", "Alice")]);
        assert_eq!(team_summary(&[], &map, &LiveStats::new()), None);
    }

    #[test]
    fn test_summary_member_count_includes_dataless_members() {
        // Two known members, only one with data: count is still 2.
        let events = vec![event("p1", 1500, 10, 10, "2024-01-01")];
        let map = names(&[("p1", "Alice"), ("p2", "Bob")]);

        let summary = team_summary(&events, &map, &LiveStats::new()).unwrap();
        assert_eq!(summary.member_count, 2);
        assert_eq!(summary.average_elo, 1500);
    }

    #[test]
    fn test_end_to_end_scenario_single_player() {
        let events = vec![
            event("p1", 800, 10, 5, "2024-01-01"),
            event("p1", 850, 11, 5, "2024-01-05"),
        ];
        let map = names(&[("p1", "Alice")]);
        let live_data = LiveStats::new();

        let all = all_player_series(&events, &map, &live_data);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Alice");
        assert_eq!(
            all[0].points,
            vec![
                ChartPoint {
                    label: "2024-01-01".to_string(),
                    elo: 800,
                    wins: 10,
                    losses: 5,
                    is_live: false,
                },
                ChartPoint {
                    label: "2024-01-05".to_string(),
                    elo: 850,
                    wins: 11,
                    losses: 5,
                    is_live: false,
                },
            ]
        );

        let summary = team_summary(&events, &map, &live_data).unwrap();
        assert_eq!(
            summary,
            TeamSummary {
                average_elo: 850,
                total_wins: 11,
                total_losses: 5,
                win_rate: "68.8".to_string(),
                member_count: 1,
            }
        );
    }
}
