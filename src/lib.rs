//! # TFT Tracker
//!
//! Typed async client for a TFT study-group stats backend.
//!
//! ## Architecture
//!
//! - **models**: wire and chart data structures
//! - **rank**: pure rank ⇄ ELO conversion
//! - **fetch**: HTTP transport with retry/backoff and the error taxonomy
//! - **services**: typed endpoint clients (groups, agents, stats, live)
//! - **merge**: historical + live data merging for charts and summaries
//! - **cache**: TTL caches with request de-duplication
//! - **tracker**: stateful team-stats view with auto-refresh
//! - **config**: configuration loading and validation

pub mod cache;
pub mod config;
pub mod fetch;
pub mod merge;
pub mod models;
pub mod rank;
pub mod services;
pub mod tracker;

pub use models::*;
