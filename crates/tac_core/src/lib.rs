//! # tac_core - Round-Based Tactical Match Simulation Engine
//!
//! A deterministic 5v5 bomb-defusal match simulator: seeded tick engine,
//! agent behavior state machines, probabilistic duel resolution, a team
//! economy and a full round/match state machine, all behind a snapshot
//! boundary so a UI layer can render matches without touching live state.
//!
//! ## Features
//! - 100% deterministic simulation (same seed = same match)
//! - Pure Monte-Carlo duel estimation, safe to call mid-match
//! - Owned per-tick snapshots; no shared mutable state at the boundary
//! - Embedded demo map and roster; real content loads via serde

pub mod data;
pub mod engine;
pub mod error;
pub mod models;
pub mod nav;

pub use engine::{
    estimate_win_probability, Bot, BotState, BuyPlan, BuyStrategy, CtTactic, DuelContext,
    MatchSimulator, MatchState, Phase, PlayerStats, RoundEndReason, SimConfig, SimEvent,
    StrategyCommand, TTactic, TickSnapshot, WinEstimate,
};
pub use error::{Result, SimError};
pub use models::{CombatAttributes, PlayerRecord, Roster, TeamSide, Weapon};
pub use nav::{MapDefinition, NavMesh, NavMeshDefinition, ZoneGraph};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
