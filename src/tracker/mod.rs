//! Stateful team-stats tracking.
//!
//! A tracker owns one (group, start-date) query: it loads the stats
//! bundle once, lets callers force-refresh the base data or only the
//! live portion, and can keep live data fresh on an interval for as long
//! as it is alive. Base and live failures are recorded independently, so
//! a live hiccup never discards already-loaded base data (and vice
//! versa). The auto-refresh task is aborted on drop; no dangling timers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::CacheStats;
use crate::models::LiveStats;
use crate::services::live::LivePlayerService;
use crate::services::team_stats::{TeamStatsBundle, TeamStatsService};

/// Default live-data refresh interval.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(120);

/// Tracker behavior switches.
#[derive(Debug, Clone)]
pub struct TrackerOptions {
    /// Fetch live snapshots alongside the base bundle
    pub include_live_data: bool,

    /// Periodically refresh live data while the tracker is alive.
    /// Only effective together with `include_live_data`.
    pub auto_refresh: bool,

    pub refresh_interval: Duration,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            include_live_data: false,
            auto_refresh: false,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

/// Observable tracker state.
///
/// Loading and error fields for the base and live fetches are
/// independent; callers can distinguish "loading", "error" and
/// "loaded but empty" for each side.
#[derive(Debug, Clone, Default)]
pub struct TeamStatsState {
    /// Base stats bundle; `None` until the first successful load
    pub bundle: Option<TeamStatsBundle>,

    /// Most recent live snapshots (may be newer than `bundle.live_data`)
    pub live_data: LiveStats,

    pub loading: bool,
    pub live_loading: bool,

    pub error: Option<String>,
    pub live_error: Option<String>,
}

/// Stateful view over one team-stats query.
pub struct TeamStatsTracker {
    team_stats: Arc<TeamStatsService>,
    live: Arc<LivePlayerService>,
    group_id: i64,
    start_date: String,
    options: TrackerOptions,
    state: Arc<RwLock<TeamStatsState>>,
    refresh_task: Option<JoinHandle<()>>,
}

impl TeamStatsTracker {
    pub fn new(
        team_stats: Arc<TeamStatsService>,
        live: Arc<LivePlayerService>,
        group_id: i64,
        start_date: impl Into<String>,
        options: TrackerOptions,
    ) -> Self {
        Self {
            team_stats,
            live,
            group_id,
            start_date: start_date.into(),
            options,
            state: Arc::new(RwLock::new(TeamStatsState::default())),
            refresh_task: None,
        }
    }

    /// Load the bundle unless already loaded. The first activation for a
    /// key fetches exactly once; later calls are no-ops until
    /// [`refresh`](Self::refresh).
    pub async fn load(&self) {
        if self.state.read().await.bundle.is_some() {
            return;
        }
        self.fetch_base(false).await;
    }

    /// Unconditionally refetch the base data, bypassing the cache.
    pub async fn refresh(&self) {
        self.fetch_base(true).await;
    }

    /// Unconditionally refetch only the live portion, independent of the
    /// base data.
    pub async fn refresh_live_data(&self) {
        refresh_live(&self.live, &self.state, self.group_id, true).await;
    }

    async fn fetch_base(&self, bypass_cache: bool) {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        if bypass_cache {
            self.team_stats.invalidate_optimized(
                self.group_id,
                &self.start_date,
                self.options.include_live_data,
            );
        }

        let result = self
            .team_stats
            .optimized_stats(
                self.group_id,
                &self.start_date,
                self.options.include_live_data,
            )
            .await;

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(bundle) => {
                // Seed live data from the bundle; refresh_live_data may
                // overwrite it with a newer snapshot later.
                if self.options.include_live_data && !bundle.live_data.is_empty() {
                    state.live_data = bundle.live_data.clone();
                }
                state.bundle = Some(bundle);
            }
            Err(err) => {
                warn!("team stats fetch failed for group {}: {}", self.group_id, err);
                state.error = Some(err.to_string());
            }
        }
    }

    /// Start the periodic live refresh, replacing any previous task.
    /// Does nothing unless both live data and auto-refresh are enabled.
    pub fn start_auto_refresh(&mut self) {
        if !(self.options.auto_refresh && self.options.include_live_data) {
            return;
        }
        self.stop_auto_refresh();

        let live = Arc::clone(&self.live);
        let state = Arc::clone(&self.state);
        let group_id = self.group_id;
        let interval = self.options.refresh_interval;

        self.refresh_task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; skip it so the task
            // only fires after a full interval.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                debug!("auto-refreshing live data for group {}", group_id);
                refresh_live(&live, &state, group_id, true).await;
            }
        }));
    }

    /// Cancel the periodic live refresh, if running.
    pub fn stop_auto_refresh(&mut self) {
        if let Some(task) = self.refresh_task.take() {
            task.abort();
        }
    }

    /// Whether the auto-refresh task is currently running.
    pub fn auto_refresh_running(&self) -> bool {
        self.refresh_task
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    /// Drop all cached entries, process-wide, for every key.
    pub fn clear_cache(&self) {
        self.team_stats.clear_cache();
        self.live.clear_cache();
        debug!("cleared team-stats and live caches");
    }

    /// Combined cache statistics across both services.
    pub fn cache_stats(&self) -> CacheStats {
        self.team_stats.cache_stats().merge(self.live.cache_stats())
    }

    /// A snapshot of the current state.
    pub async fn snapshot(&self) -> TeamStatsState {
        self.state.read().await.clone()
    }
}

impl Drop for TeamStatsTracker {
    fn drop(&mut self) {
        self.stop_auto_refresh();
    }
}

/// Fetch live snapshots and fold the outcome into the shared state.
/// Failures touch only the live fields; loaded base data stays intact.
async fn refresh_live(
    live: &LivePlayerService,
    state: &RwLock<TeamStatsState>,
    group_id: i64,
    bypass_cache: bool,
) {
    {
        let mut state = state.write().await;
        state.live_loading = true;
        state.live_error = None;
    }

    if bypass_cache {
        live.invalidate_group(group_id);
    }

    let result = live.live_stats(group_id).await;

    let mut state = state.write().await;
    state.live_loading = false;
    match result {
        Ok(stats) => state.live_data = stats,
        Err(err) => {
            warn!("live refresh failed for group {}: {}", group_id, err);
            state.live_error = Some(err.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheSettings;
    use crate::fetch::{ApiClient, ApiClientConfig};

    fn services() -> (Arc<TeamStatsService>, Arc<LivePlayerService>) {
        // Discard-port base URL: connections are refused immediately, so
        // error paths run without reaching any real backend.
        let client = Arc::new(
            ApiClient::new(ApiClientConfig {
                base_url: "http://127.0.0.1:9".to_string(),
                ..Default::default()
            })
            .unwrap(),
        );
        let cache = CacheSettings::default();
        (
            Arc::new(TeamStatsService::new(Arc::clone(&client), &cache)),
            Arc::new(LivePlayerService::new(client, &cache)),
        )
    }

    fn tracker(options: TrackerOptions) -> TeamStatsTracker {
        let (team_stats, live) = services();
        TeamStatsTracker::new(team_stats, live, 7, "2024-01-01", options)
    }

    #[test]
    fn test_default_options() {
        let options = TrackerOptions::default();
        assert!(!options.include_live_data);
        assert!(!options.auto_refresh);
        assert_eq!(options.refresh_interval, DEFAULT_REFRESH_INTERVAL);
    }

    #[test]
    fn test_default_state_is_empty() {
        let state = TeamStatsState::default();
        assert!(state.bundle.is_none());
        assert!(state.live_data.is_empty());
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert!(state.live_error.is_none());
    }

    #[tokio::test]
    async fn test_auto_refresh_requires_live_data() {
        let mut tracker = tracker(TrackerOptions {
            auto_refresh: true,
            include_live_data: false,
            ..Default::default()
        });

        tracker.start_auto_refresh();
        assert!(!tracker.auto_refresh_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_start_stop() {
        let mut tracker = tracker(TrackerOptions {
            auto_refresh: true,
            include_live_data: true,
            refresh_interval: Duration::from_secs(3600),
        });

        tracker.start_auto_refresh();
        assert!(tracker.auto_refresh_running());

        tracker.stop_auto_refresh();
        assert!(!tracker.auto_refresh_running());

        // Stopping again is a no-op.
        tracker.stop_auto_refresh();
    }

    #[tokio::test(start_paused = true)]
    async fn test_base_failure_recorded_without_touching_live_state() {
        let tracker = tracker(TrackerOptions::default());
        tracker.load().await;

        let state = tracker.snapshot().await;
        assert!(state.bundle.is_none());
        assert!(state.error.is_some());
        assert!(!state.loading);
        // The live side was never touched.
        assert!(state.live_error.is_none());
        assert!(state.live_data.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_failure_recorded_independently() {
        let tracker = tracker(TrackerOptions {
            include_live_data: true,
            ..Default::default()
        });

        tracker.refresh_live_data().await;

        let state = tracker.snapshot().await;
        assert!(state.live_error.is_some());
        assert!(!state.live_loading);
        // Base state untouched.
        assert!(state.error.is_none());
        assert!(state.bundle.is_none());
    }

    #[tokio::test]
    async fn test_cache_stats_empty_initially() {
        let tracker = tracker(TrackerOptions::default());
        let stats = tracker.cache_stats();
        assert_eq!(stats.size, 0);
        assert!(stats.keys.is_empty());
    }
}
