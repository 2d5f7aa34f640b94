//! Typed simulation events, rendered to human-readable strings for the
//! boundary snapshot. The UI layer consumes the rendered strings; tests and
//! the CLI can match on the typed values.

use serde::Serialize;

use crate::engine::bot::BotId;
use crate::models::{TeamSide, Weapon};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SimEvent {
    RoundStart { round: u32 },
    Kill { attacker: String, victim: String, weapon: Weapon },
    BombPlanted { by: String, zone: String },
    BombDropped { by: String, zone: String },
    BombPickedUp { by: String },
    DefuseStarted { by: String, with_kit: bool },
    DefuseInterrupted { by: String },
    BombDefused { by: String },
    BombExploded,
    Flashed { by: String, target: String },
    SmokePopped { by: String },
    WeaponPickup { by: String, weapon: Weapon },
    RoundEnd { winner: TeamSide, reason: String },
    MatchEnd { t_score: u8, ct_score: u8 },
    /// Per-agent failure surfaced as an event so the tick keeps going.
    Anomaly { bot: BotId, detail: String },
}

impl std::fmt::Display for SimEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimEvent::RoundStart { round } => write!(f, "Round {} is live", round),
            SimEvent::Kill { attacker, victim, weapon } => {
                write!(f, "{} killed {} ({})", attacker, victim, weapon.name())
            }
            SimEvent::BombPlanted { by, zone } => {
                write!(f, "{} planted the bomb at {}", by, zone)
            }
            SimEvent::BombDropped { by, zone } => {
                write!(f, "{} dropped the bomb at {}", by, zone)
            }
            SimEvent::BombPickedUp { by } => write!(f, "{} picked up the bomb", by),
            SimEvent::DefuseStarted { by, with_kit } => {
                if *with_kit {
                    write!(f, "{} is defusing with a kit", by)
                } else {
                    write!(f, "{} is defusing", by)
                }
            }
            SimEvent::DefuseInterrupted { by } => write!(f, "{} broke off the defuse", by),
            SimEvent::BombDefused { by } => write!(f, "{} defused the bomb", by),
            SimEvent::BombExploded => write!(f, "The bomb exploded"),
            SimEvent::Flashed { by, target } => write!(f, "{} flashed {}", by, target),
            SimEvent::SmokePopped { by } => write!(f, "{} popped smoke", by),
            SimEvent::WeaponPickup { by, weapon } => {
                write!(f, "{} picked up a {}", by, weapon.name())
            }
            SimEvent::RoundEnd { winner, reason } => {
                write!(f, "Round over: {} win ({})", winner.label(), reason)
            }
            SimEvent::MatchEnd { t_score, ct_score } => {
                write!(f, "Match over: T {} - {} CT", t_score, ct_score)
            }
            SimEvent::Anomaly { bot, detail } => {
                write!(f, "Anomaly for agent {}: {}", bot, detail)
            }
        }
    }
}

/// Ordered per-tick event buffer; drained into each snapshot.
#[derive(Debug, Default)]
pub struct EventLog {
    pending: Vec<SimEvent>,
}

impl EventLog {
    pub fn push(&mut self, event: SimEvent) {
        log::debug!("event: {}", event);
        self.pending.push(event);
    }

    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
