use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tft_tracker::config::AppConfig;
use tft_tracker::fetch::ApiClient;
use tft_tracker::merge;
use tft_tracker::rank::elo_to_tier;
use tft_tracker::services::{
    FreeAgentFilters, FreeAgentService, GroupListParams, LivePlayerService, PlayerStatsService,
    SortOrder, StudyGroupService, TeamStatsService,
};
use tft_tracker::tracker::{TeamStatsTracker, TrackerOptions, DEFAULT_REFRESH_INTERVAL};

#[derive(Parser)]
#[command(name = "tft-tracker")]
#[command(about = "Client for the TFT study-group stats backend")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Backend base URL (overrides config and environment)
    #[arg(long)]
    api_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List study groups
    Groups {
        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        limit: Option<u32>,

        /// Search groups by name
        #[arg(long)]
        search: Option<String>,

        /// Minimum average ELO filter
        #[arg(long)]
        min_elo: Option<u32>,

        /// Maximum average ELO filter
        #[arg(long)]
        max_elo: Option<u32>,

        /// Sort field (e.g. "avg_elo", "created_at")
        #[arg(long)]
        sort_by: Option<String>,

        /// Sort descending instead of ascending
        #[arg(long)]
        desc: bool,
    },

    /// Show one study group and its members
    Group {
        group_id: i64,

        /// Ask the backend to refresh member ranks first
        #[arg(long)]
        update_ranks: bool,
    },

    /// List free agents
    FreeAgents {
        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        region: Option<String>,

        /// Minimum rank label (e.g. "GOLD")
        #[arg(long)]
        min_rank: Option<String>,

        /// Maximum rank label
        #[arg(long)]
        max_rank: Option<String>,
    },

    /// Show a player's rank history
    Player {
        riot_id: String,
    },

    /// Show merged team stats for a group
    TeamStats {
        group_id: i64,

        /// Start of the date range (YYYY-MM-DD)
        #[arg(long)]
        start_date: String,

        /// Include live rank snapshots
        #[arg(long)]
        live: bool,

        /// Keep refreshing live data until interrupted
        #[arg(long)]
        watch: bool,
    },

    /// List groups owned by a user, with members
    MyGroups {
        owner_id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting tft-tracker v{}", env!("CARGO_PKG_VERSION"));

    // Missing config file just means defaults; a broken one is an error.
    let config_path = Path::new(&cli.config);
    let mut config = if config_path.exists() {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::default()
    };
    if let Some(api_url) = cli.api_url {
        config.api.base_url = api_url;
    }

    let client = Arc::new(ApiClient::new(config.api_client_config())?);

    match cli.command {
        Commands::Groups {
            page,
            limit,
            search,
            min_elo,
            max_elo,
            sort_by,
            desc,
        } => {
            let service = StudyGroupService::new(client);
            let params = GroupListParams {
                page,
                limit,
                search,
                min_elo,
                max_elo,
                sort_by,
                sort_order: Some(if desc { SortOrder::Desc } else { SortOrder::Asc }),
            };

            let response = service.list(&params).await?;
            println!(
                "=== Study Groups (page {}/{}, {} total) ===\n",
                response.pagination.current_page,
                response.pagination.total_pages,
                response.pagination.total_items
            );
            for group in &response.groups {
                let elo = group
                    .avg_elo
                    .map(|e| format!("{} avg ELO", e))
                    .unwrap_or_else(|| "no ELO data".to_string());
                let members = group
                    .member_count
                    .map(|m| format!("{} members", m))
                    .unwrap_or_else(|| "members unknown".to_string());
                println!("  #{:<5} {} — {}, {}", group.id, group.group_name, members, elo);
            }
            if response.pagination.has_next {
                println!("\n(more pages available)");
            }
        }

        Commands::Group {
            group_id,
            update_ranks,
        } => {
            let service = StudyGroupService::new(client);
            let group = service.get(group_id).await?;
            let members = service.group_members(group_id, update_ranks).await?;

            println!("=== {} (#{}) ===", group.group_name, group.id);
            if !group.description.is_empty() {
                println!("{}", group.description);
            }
            println!("\nMembers ({}):", members.len());
            for member in &members {
                let rank = member.rank.as_deref().unwrap_or("UNRANKED");
                println!(
                    "  {} — {} ({})",
                    member.display_name(),
                    rank,
                    member.elo.unwrap_or(0)
                );
            }
        }

        Commands::FreeAgents {
            page,
            limit,
            search,
            region,
            min_rank,
            max_rank,
        } => {
            let service = FreeAgentService::new(client);
            let filters = FreeAgentFilters {
                page,
                limit,
                search,
                region,
                min_rank,
                max_rank,
                ..Default::default()
            };

            let response = service.list(&filters).await?;
            println!(
                "=== Free Agents (page {}/{}, {} total) ===\n",
                response.pagination.current_page,
                response.pagination.total_pages,
                response.pagination.total_items
            );
            for agent in &response.free_agents {
                println!(
                    "  {:<20} {:<18} {:>5} ELO  [{}]",
                    agent.summoner_name, agent.rank, agent.elo, agent.region
                );
            }
        }

        Commands::Player { riot_id } => {
            let service = PlayerStatsService::new(client);
            let stats = service.get(&riot_id).await?;

            if stats.events.is_empty() {
                println!("No rank history for {}", riot_id);
                return Ok(());
            }

            let series = merge::player_series(&stats.events, None);
            println!("=== Rank history for {} ===\n", riot_id);
            for point in &series {
                let tier = elo_to_tier(point.elo)
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "UNRANKED".to_string());
                println!(
                    "  {}  {:>5} ELO ({})  {}W/{}L",
                    point.label, point.elo, tier, point.wins, point.losses
                );
            }
        }

        Commands::TeamStats {
            group_id,
            start_date,
            live,
            watch,
        } => {
            let team_stats = Arc::new(TeamStatsService::new(Arc::clone(&client), &config.cache));
            let live_service = Arc::new(LivePlayerService::new(client, &config.cache));

            // Watching is only meaningful for live data.
            let include_live = live || watch;
            let mut tracker = TeamStatsTracker::new(
                team_stats,
                live_service,
                group_id,
                start_date,
                TrackerOptions {
                    include_live_data: include_live,
                    auto_refresh: watch,
                    refresh_interval: DEFAULT_REFRESH_INTERVAL,
                },
            );

            tracker.load().await;
            if include_live {
                tracker.refresh_live_data().await;
            }
            print_team_stats(&tracker).await;

            if watch {
                tracker.start_auto_refresh();
                println!(
                    "\nWatching live data (refresh every {:?}, Ctrl-C to stop)...",
                    DEFAULT_REFRESH_INTERVAL
                );
                loop {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => break,
                        _ = tokio::time::sleep(DEFAULT_REFRESH_INTERVAL) => {
                            print_team_stats(&tracker).await;
                        }
                    }
                }
            }
        }

        Commands::MyGroups { owner_id } => {
            let service = StudyGroupService::new(client);
            let groups = service.owned_groups_with_members(owner_id).await?;

            println!("=== Groups owned by user {} ===\n", owner_id);
            if groups.is_empty() {
                println!("  (none)");
            }
            for group in &groups {
                println!("  #{:<5} {} — {} members", group.id, group.group_name, group.members.len());
                for member in &group.members {
                    println!("      {}", member.display_name());
                }
            }
        }
    }

    Ok(())
}

/// Print the current tracker snapshot: summary, then the team-average
/// series.
async fn print_team_stats(tracker: &TeamStatsTracker) {
    let state = tracker.snapshot().await;

    if let Some(error) = &state.error {
        eprintln!("Error fetching team stats: {}", error);
        return;
    }
    if let Some(live_error) = &state.live_error {
        eprintln!("(live data unavailable: {})", live_error);
    }

    let Some(bundle) = &state.bundle else {
        println!("No team stats loaded.");
        return;
    };

    match merge::team_summary(&bundle.events, &bundle.member_names, &state.live_data) {
        Some(summary) => {
            let tier = elo_to_tier(summary.average_elo)
                .map(|t| t.to_string())
                .unwrap_or_else(|| "UNRANKED".to_string());
            println!("=== Team Summary ===");
            println!("  Average ELO: {} ({})", summary.average_elo, tier);
            println!("  Members:     {}", summary.member_count);
            println!("  Record:      {}W/{}L ({}%)", summary.total_wins, summary.total_losses, summary.win_rate);
        }
        None => {
            println!("No team stats data available.");
            return;
        }
    }

    let series = merge::all_player_series(&bundle.events, &bundle.member_names, &state.live_data);
    let average = merge::team_average_series(&series);

    println!("\n=== Team Average ===");
    for point in &average.points {
        let live_marker = if point.is_live { " [LIVE]" } else { "" };
        println!(
            "  {:<12} {:>5} ELO  {}W/{}L  ({} members){}",
            point.label,
            point.elo,
            point.total_wins,
            point.total_losses,
            point.member_count,
            live_marker
        );
    }
}
