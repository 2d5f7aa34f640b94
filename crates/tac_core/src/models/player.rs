//! Roster player records.
//!
//! # Boundary Contract
//! - The engine never generates players; rosters are supplied externally
//!   (JSON through serde, or the embedded demo roster).
//! - Attributes use a 1..=100 scale. The duel engine normalizes to 0..1.

use serde::{Deserialize, Serialize};

use super::team::TeamSide;

/// Combat-relevant attribute block of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatAttributes {
    /// Raw precision: drives hit probability.
    pub aim: u8,
    /// Reaction time (higher = faster): first-shot advantage and the
    /// documented tie-break for simultaneous lethal hits.
    pub reaction: u8,
    /// Shot-to-shot consistency: damps damage variance.
    pub consistency: u8,
    /// Positioning awareness: resistance to being surprised, cover usage.
    pub awareness: u8,
}

impl CombatAttributes {
    pub fn uniform(value: u8) -> Self {
        Self { aim: value, reaction: value, consistency: value, awareness: value }
    }

    /// Attribute on the 0..1 scale used by probability formulas.
    pub fn normalized(attr: u8) -> f32 {
        (attr.clamp(1, 100) as f32) / 100.0
    }
}

/// One roster entry. Stable identity for the whole match; round-local state
/// (hp, position, inventory) lives on the engine's `Bot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub side: TeamSide,
    pub attributes: CombatAttributes,
    #[serde(default = "default_starting_money")]
    pub starting_money: u32,
}

fn default_starting_money() -> u32 {
    crate::engine::constants::economy::START_MONEY
}

/// A full match roster: exactly five players per side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub players: Vec<PlayerRecord>,
}

impl Roster {
    pub const TEAM_SIZE: usize = 5;

    /// Validates the 5v5 shape. Fails fast on malformed input rather than
    /// simulating a lopsided match.
    pub fn validate(&self) -> crate::error::Result<()> {
        let t = self.players.iter().filter(|p| p.side == TeamSide::T).count();
        let ct = self.players.iter().filter(|p| p.side == TeamSide::Ct).count();
        if t != Self::TEAM_SIZE || ct != Self::TEAM_SIZE {
            return Err(crate::error::SimError::DataIntegrity(format!(
                "roster must be {}v{}, found {}T / {}CT",
                Self::TEAM_SIZE,
                Self::TEAM_SIZE,
                t,
                ct
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, side: TeamSide) -> PlayerRecord {
        PlayerRecord {
            name: name.to_string(),
            side,
            attributes: CombatAttributes::uniform(60),
            starting_money: 800,
        }
    }

    #[test]
    fn test_roster_validation_rejects_lopsided_teams() {
        let roster = Roster {
            players: (0..9)
                .map(|i| {
                    record(&format!("p{}", i), if i < 5 { TeamSide::T } else { TeamSide::Ct })
                })
                .collect(),
        };
        assert!(roster.validate().is_err());
    }

    #[test]
    fn test_roster_validation_accepts_5v5() {
        let roster = Roster {
            players: (0..10)
                .map(|i| {
                    record(&format!("p{}", i), if i < 5 { TeamSide::T } else { TeamSide::Ct })
                })
                .collect(),
        };
        assert!(roster.validate().is_ok());
    }

    #[test]
    fn test_normalized_clamps_to_scale() {
        assert!((CombatAttributes::normalized(100) - 1.0).abs() < f32::EPSILON);
        assert!(CombatAttributes::normalized(0) > 0.0);
    }
}
