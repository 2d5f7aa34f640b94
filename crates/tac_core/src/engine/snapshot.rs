//! Boundary snapshot emitted after every tick.
//!
//! The snapshot is an owned value built fresh from simulation state; it
//! never aliases live state, so the consuming UI layer cannot corrupt
//! simulation invariants. Everything here serializes with serde for
//! transport or logging.

use serde::Serialize;

use crate::engine::bomb::BombState;
use crate::engine::bot::{Bot, BotState};
use crate::engine::round::{MatchState, Phase, RoundRecord};
use crate::engine::stats::PlayerStats;
use crate::models::{PerSide, TeamSide, Weapon};
use crate::nav::ZoneId;

#[derive(Debug, Clone, Serialize)]
pub struct BotSnap {
    pub id: usize,
    pub name: String,
    pub side: TeamSide,
    pub hp: u32,
    pub state: BotState,
    pub pos: (f32, f32),
    pub zone: String,
    pub role: &'static str,
    pub weapon: Weapon,
    pub money: u32,
    pub has_bomb: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BombSnap {
    pub state: BombState,
    pub zone: Option<String>,
    pub countdown_ticks: u32,
    pub defuse_remaining_ticks: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchStateSnap {
    pub round_number: u32,
    pub phase: Phase,
    pub scores: PerSide<u8>,
    pub loss_streaks: PerSide<u32>,
    pub history: Vec<RoundRecord>,
}

/// Transient per-zone world state: dropped weapons and live presence.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneStateSnap {
    pub zone: String,
    pub zone_id: ZoneId,
    pub dropped_weapons: Vec<Weapon>,
    pub t_alive: u8,
    pub ct_alive: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickSnapshot {
    pub tick_count: u64,
    pub round_timer_ticks: u32,
    pub bots: Vec<BotSnap>,
    /// Ordered human-readable log of everything that happened this tick.
    pub events: Vec<String>,
    pub stats: Vec<PlayerStats>,
    pub match_state: MatchStateSnap,
    pub bomb: BombSnap,
    pub zone_states: Vec<ZoneStateSnap>,
}

impl BotSnap {
    pub fn from_bot(bot: &Bot, zone_name: &str) -> Self {
        Self {
            id: bot.id,
            name: bot.name.clone(),
            side: bot.side,
            hp: bot.hp,
            state: bot.state,
            pos: bot.pos,
            zone: zone_name.to_string(),
            role: bot.role.name.label(),
            weapon: bot.weapon(),
            money: bot.inventory.money,
            has_bomb: bot.has_bomb,
        }
    }
}

impl MatchStateSnap {
    pub fn from_state(state: &MatchState) -> Self {
        Self {
            round_number: state.round_number,
            phase: state.phase,
            scores: state.scores,
            loss_streaks: state.loss_streaks,
            history: state.history.clone(),
        }
    }
}
