//! Per-player performance accounting, accumulated across rounds.

use std::collections::HashMap;

use serde::Serialize;

use crate::engine::bot::BotId;
use crate::engine::constants::bot::ASSIST_DAMAGE;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlayerStats {
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub damage_dealt: u32,
    /// Model-derived kill expectation, for performance-above-expectation
    /// comparisons against actual kills.
    pub expected_kills: f32,
}

/// Match-long stat book plus the round-local damage ledger that backs
/// assist attribution.
#[derive(Debug, Default)]
pub struct StatsBook {
    totals: Vec<PlayerStats>,
    /// (attacker, victim) -> damage dealt this round.
    round_damage: HashMap<(BotId, BotId), u32>,
}

impl StatsBook {
    pub fn new(player_count: usize) -> Self {
        Self { totals: vec![PlayerStats::default(); player_count], round_damage: HashMap::new() }
    }

    pub fn get(&self, bot: BotId) -> PlayerStats {
        self.totals[bot]
    }

    pub fn all(&self) -> &[PlayerStats] {
        &self.totals
    }

    pub fn record_damage(&mut self, attacker: BotId, victim: BotId, amount: u32) {
        if amount == 0 {
            return;
        }
        self.totals[attacker].damage_dealt += amount;
        *self.round_damage.entry((attacker, victim)).or_default() += amount;
    }

    /// Credits the kill and grants assists to other agents whose round
    /// damage on the victim crossed the assist threshold.
    pub fn record_kill(&mut self, killer: BotId, victim: BotId) {
        self.totals[killer].kills += 1;
        self.totals[victim].deaths += 1;
        for (&(attacker, hit), &damage) in &self.round_damage {
            if hit == victim && attacker != killer && damage >= ASSIST_DAMAGE {
                self.totals[attacker].assists += 1;
            }
        }
    }

    pub fn record_expected_kill(&mut self, bot: BotId, probability: f32) {
        self.totals[bot].expected_kills += probability;
    }

    /// Called at round reset; totals persist, the damage ledger does not.
    pub fn end_round(&mut self) {
        self.round_damage.clear();
    }
}
