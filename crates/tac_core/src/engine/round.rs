//! Round and match state machine.
//!
//! Phases: `Buy` (clock frozen, strategy confirmation) → `Live` →
//! optionally `BombPlanted` → `RoundEnd` (display, clock frozen) → `Buy`
//! again, or `MatchEnd` at the score/round cap. Win conditions are
//! evaluated every live tick; entering `RoundEnd` appends exactly one
//! history record and is the settlement guard.

use serde::Serialize;

use crate::engine::bomb::BombState;
use crate::models::{PerSide, TeamSide};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Buy,
    Live,
    BombPlanted,
    RoundEnd,
    MatchEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoundEndReason {
    Elimination,
    TimeExpired,
    BombExploded,
    BombDefused,
}

impl RoundEndReason {
    pub fn describe(self) -> &'static str {
        match self {
            RoundEndReason::Elimination => "enemy team eliminated",
            RoundEndReason::TimeExpired => "round time expired",
            RoundEndReason::BombExploded => "bomb detonated",
            RoundEndReason::BombDefused => "bomb defused",
        }
    }
}

/// One line of round history; never removed once appended.
#[derive(Debug, Clone, Serialize)]
pub struct RoundRecord {
    pub round: u32,
    pub winner: TeamSide,
    pub reason: RoundEndReason,
    pub duration_ticks: u32,
    pub t_alive: u8,
    pub ct_alive: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchState {
    pub round_number: u32,
    pub phase: Phase,
    pub scores: PerSide<u8>,
    /// Consecutive-loss counters driving the loss bonus.
    pub loss_streaks: PerSide<u32>,
    pub history: Vec<RoundRecord>,
    pub win_threshold: u8,
    pub max_rounds: u32,
    pub half_length: u32,
}

impl MatchState {
    pub fn new(win_threshold: u8, max_rounds: u32, half_length: u32) -> Self {
        Self {
            round_number: 1,
            phase: Phase::Buy,
            scores: PerSide::default(),
            loss_streaks: PerSide::default(),
            history: Vec::new(),
            win_threshold,
            max_rounds,
            half_length,
        }
    }

    pub fn go_live(&mut self) {
        debug_assert_eq!(self.phase, Phase::Buy);
        self.phase = Phase::Live;
    }

    pub fn bomb_planted(&mut self) {
        if self.phase == Phase::Live {
            self.phase = Phase::BombPlanted;
        }
    }

    /// Commits a round outcome: score, loss streaks, history, phase.
    /// Returns the loss tier to settle the losing side at.
    pub fn commit_round(
        &mut self,
        winner: TeamSide,
        reason: RoundEndReason,
        duration_ticks: u32,
        t_alive: u8,
        ct_alive: u8,
    ) -> usize {
        debug_assert!(matches!(self.phase, Phase::Live | Phase::BombPlanted));
        let loser = winner.opponent();
        *self.scores.get_mut(winner) += 1;
        *self.loss_streaks.get_mut(winner) = 0;
        *self.loss_streaks.get_mut(loser) += 1;
        self.history.push(RoundRecord {
            round: self.round_number,
            winner,
            reason,
            duration_ticks,
            t_alive,
            ct_alive,
        });
        self.phase = if self.is_match_over() { Phase::MatchEnd } else { Phase::RoundEnd };
        (*self.loss_streaks.get(loser) as usize).saturating_sub(1)
    }

    pub fn is_match_over(&self) -> bool {
        self.scores.t >= self.win_threshold
            || self.scores.ct >= self.win_threshold
            || self.round_number >= self.max_rounds
    }

    /// True right after the last round of the first half has been committed.
    pub fn at_halftime(&self) -> bool {
        self.round_number == self.half_length && self.phase == Phase::RoundEnd
    }

    /// Advances to the next round's buy phase.
    pub fn begin_next_round(&mut self) {
        debug_assert_eq!(self.phase, Phase::RoundEnd);
        self.round_number += 1;
        self.phase = Phase::Buy;
    }

    /// Half-time: side labels swap on the roster; the counters follow the
    /// same group of players under their new label.
    pub fn swap_sides(&mut self) {
        std::mem::swap(&mut self.scores.t, &mut self.scores.ct);
        std::mem::swap(&mut self.loss_streaks.t, &mut self.loss_streaks.ct);
    }
}

/// Win-condition check for one live tick. `None` means play on.
///
/// While the bomb is planted elimination of the T side does not end the
/// round; the bomb itself decides (defuse or detonation).
pub fn evaluate_win_conditions(
    t_alive: u8,
    ct_alive: u8,
    bomb: BombState,
    round_timer: u32,
) -> Option<(TeamSide, RoundEndReason)> {
    match bomb {
        BombState::Exploded => return Some((TeamSide::T, RoundEndReason::BombExploded)),
        BombState::Defused => return Some((TeamSide::Ct, RoundEndReason::BombDefused)),
        _ => {}
    }
    let planted = matches!(bomb, BombState::Planted | BombState::Defusing);
    if ct_alive == 0 {
        return Some((TeamSide::T, RoundEndReason::Elimination));
    }
    if t_alive == 0 && !planted {
        return Some((TeamSide::Ct, RoundEndReason::Elimination));
    }
    if round_timer == 0 && !planted {
        return Some((TeamSide::Ct, RoundEndReason::TimeExpired));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> MatchState {
        MatchState::new(13, 24, 12)
    }

    #[test]
    fn test_history_grows_by_one_per_round_end() {
        let mut ms = state();
        for round in 1..=3 {
            ms.go_live();
            ms.commit_round(TeamSide::T, RoundEndReason::Elimination, 40, 3, 0);
            assert_eq!(ms.history.len(), round as usize);
            ms.begin_next_round();
        }
        assert_eq!(ms.scores.t, 3);
    }

    #[test]
    fn test_loss_streak_tiers() {
        let mut ms = state();
        for expected_tier in 0..4 {
            ms.go_live();
            let tier = ms.commit_round(TeamSide::T, RoundEndReason::Elimination, 40, 3, 0);
            assert_eq!(tier, expected_tier);
            ms.begin_next_round();
        }
        // CT finally win: their streak resets, T start one of their own.
        ms.go_live();
        let tier = ms.commit_round(TeamSide::Ct, RoundEndReason::TimeExpired, 230, 0, 5);
        assert_eq!(tier, 0);
        assert_eq!(ms.loss_streaks.ct, 0);
        assert_eq!(ms.loss_streaks.t, 1);
    }

    #[test]
    fn test_match_ends_at_threshold() {
        let mut ms = MatchState::new(2, 24, 12);
        ms.go_live();
        ms.commit_round(TeamSide::Ct, RoundEndReason::BombDefused, 100, 1, 2);
        assert_eq!(ms.phase, Phase::RoundEnd);
        ms.begin_next_round();
        ms.go_live();
        ms.commit_round(TeamSide::Ct, RoundEndReason::Elimination, 80, 0, 4);
        assert_eq!(ms.phase, Phase::MatchEnd);
    }

    #[test]
    fn test_elimination_deferred_while_bomb_planted() {
        assert_eq!(
            evaluate_win_conditions(0, 3, BombState::Planted, 50),
            None,
            "planted bomb keeps the round alive without T players"
        );
        assert_eq!(
            evaluate_win_conditions(0, 3, BombState::Carried, 50),
            Some((TeamSide::Ct, RoundEndReason::Elimination))
        );
    }

    #[test]
    fn test_timer_expiry_needs_unplanted_bomb() {
        assert_eq!(
            evaluate_win_conditions(3, 3, BombState::Planted, 0),
            None,
            "bomb timer replaces the round timer after the plant"
        );
        assert_eq!(
            evaluate_win_conditions(3, 3, BombState::Carried, 0),
            Some((TeamSide::Ct, RoundEndReason::TimeExpired))
        );
    }

    #[test]
    fn test_bomb_outcomes_dominate() {
        assert_eq!(
            evaluate_win_conditions(0, 0, BombState::Exploded, 10),
            Some((TeamSide::T, RoundEndReason::BombExploded))
        );
        assert_eq!(
            evaluate_win_conditions(5, 5, BombState::Defused, 10),
            Some((TeamSide::Ct, RoundEndReason::BombDefused))
        );
    }

    #[test]
    fn test_halftime_swap_moves_counters() {
        let mut ms = state();
        ms.scores.t = 8;
        ms.scores.ct = 4;
        ms.swap_sides();
        assert_eq!(ms.scores.t, 4);
        assert_eq!(ms.scores.ct, 8);
    }
}
