//! Bomb lifecycle: one bomb per round.
//!
//! `Carried` is implicit (a T bot's `has_bomb` flag, or dropped on the
//! ground after the carrier dies). This struct tracks the explicit states
//! from the plant onward. At most one of planted/defused/exploded holds.

use serde::Serialize;

use crate::engine::bot::BotId;
use crate::engine::constants::round;
use crate::nav::{NodeId, ZoneId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BombState {
    Carried,
    Dropped,
    Planted,
    Defusing,
    Defused,
    Exploded,
}

#[derive(Debug, Clone, Serialize)]
pub struct Bomb {
    pub state: BombState,
    /// Where the bomb sits once dropped or planted.
    pub node: Option<NodeId>,
    pub zone: Option<ZoneId>,
    /// Ticks until detonation while planted.
    pub countdown: u32,
    /// Ticks of defuse work remaining while defusing.
    pub defuse_remaining: u32,
    pub defuser: Option<BotId>,
}

impl Bomb {
    pub fn new() -> Self {
        Self {
            state: BombState::Carried,
            node: None,
            zone: None,
            countdown: 0,
            defuse_remaining: 0,
            defuser: None,
        }
    }

    pub fn drop_at(&mut self, node: NodeId, zone: ZoneId) {
        debug_assert!(matches!(self.state, BombState::Carried));
        self.state = BombState::Dropped;
        self.node = Some(node);
        self.zone = Some(zone);
    }

    pub fn pick_up(&mut self) {
        debug_assert!(matches!(self.state, BombState::Dropped));
        self.state = BombState::Carried;
        self.node = None;
        self.zone = None;
    }

    pub fn plant(&mut self, node: NodeId, zone: ZoneId) {
        self.state = BombState::Planted;
        self.node = Some(node);
        self.zone = Some(zone);
        self.countdown = round::BOMB_TIMER_TICKS;
    }

    pub fn is_planted(&self) -> bool {
        matches!(self.state, BombState::Planted | BombState::Defusing)
    }

    /// One tick of the detonation countdown. Returns true exactly on the
    /// tick the timer reaches zero.
    pub fn tick_countdown(&mut self) -> bool {
        if !self.is_planted() {
            return false;
        }
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            self.state = BombState::Exploded;
            self.defuser = None;
            true
        } else {
            false
        }
    }

    /// A living CT co-located with the bomb starts (or resumes) defusing.
    /// Without a kit the time penalty doubles the work.
    pub fn start_defuse(&mut self, defuser: BotId, has_kit: bool) {
        if self.state != BombState::Planted {
            return;
        }
        self.state = BombState::Defusing;
        self.defuser = Some(defuser);
        self.defuse_remaining =
            if has_kit { round::DEFUSE_TICKS_WITH_KIT } else { round::DEFUSE_TICKS };
    }

    /// Defuser died or broke contact; progress is lost.
    pub fn cancel_defuse(&mut self) {
        if self.state == BombState::Defusing {
            self.state = BombState::Planted;
            self.defuser = None;
            self.defuse_remaining = 0;
        }
    }

    /// One tick of defuse work. Returns true when the defuse completes.
    pub fn tick_defuse(&mut self) -> bool {
        if self.state != BombState::Defusing {
            return false;
        }
        self.defuse_remaining = self.defuse_remaining.saturating_sub(1);
        if self.defuse_remaining == 0 {
            self.state = BombState::Defused;
            true
        } else {
            false
        }
    }
}

impl Default for Bomb {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_explodes_exactly_at_zero() {
        let mut bomb = Bomb::new();
        bomb.plant(3, 1);
        for tick in 1..=round::BOMB_TIMER_TICKS {
            let exploded = bomb.tick_countdown();
            if tick < round::BOMB_TIMER_TICKS {
                assert!(!exploded, "exploded early at tick {}", tick);
            } else {
                assert!(exploded, "did not explode at tick {}", tick);
            }
        }
        assert_eq!(bomb.state, BombState::Exploded);
    }

    #[test]
    fn test_kit_halves_defuse_time() {
        let mut with_kit = Bomb::new();
        with_kit.plant(0, 0);
        with_kit.start_defuse(6, true);
        let mut without = Bomb::new();
        without.plant(0, 0);
        without.start_defuse(6, false);
        assert_eq!(with_kit.defuse_remaining * 2, without.defuse_remaining);
    }

    #[test]
    fn test_cancel_loses_progress() {
        let mut bomb = Bomb::new();
        bomb.plant(0, 0);
        bomb.start_defuse(6, false);
        for _ in 0..5 {
            bomb.tick_defuse();
        }
        bomb.cancel_defuse();
        assert_eq!(bomb.state, BombState::Planted);
        bomb.start_defuse(8, false);
        assert_eq!(bomb.defuse_remaining, round::DEFUSE_TICKS);
    }

    #[test]
    fn test_defuse_completes() {
        let mut bomb = Bomb::new();
        bomb.plant(0, 0);
        bomb.start_defuse(6, true);
        let mut done = false;
        for _ in 0..round::DEFUSE_TICKS_WITH_KIT {
            done = bomb.tick_defuse();
        }
        assert!(done);
        assert_eq!(bomb.state, BombState::Defused);
    }

    #[test]
    fn test_drop_and_pickup_cycle() {
        let mut bomb = Bomb::new();
        bomb.drop_at(4, 2);
        assert_eq!(bomb.state, BombState::Dropped);
        assert_eq!(bomb.zone, Some(2));
        bomb.pick_up();
        assert_eq!(bomb.state, BombState::Carried);
        assert_eq!(bomb.node, None);
    }
}
