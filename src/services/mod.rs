//! Typed clients for the stats backend endpoints.

pub mod free_agents;
pub mod live;
pub mod player_stats;
pub mod study_groups;
pub mod team_stats;

pub use free_agents::{FreeAgentFilters, FreeAgentService, FreeAgentsResponse};
pub use live::{LeagueEntry, LivePlayerService};
pub use player_stats::{PlayerStatsData, PlayerStatsService};
pub use study_groups::{GroupListParams, SortOrder, StudyGroupService, StudyGroupsResponse};
pub use team_stats::{
    CombinedTeamStats, MemberStatsResponse, TeamStatsBundle, TeamStatsData, TeamStatsService,
};
