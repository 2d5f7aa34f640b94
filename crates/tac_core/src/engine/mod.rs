//! Simulation core: tick orchestration, agents, combat, economy and the
//! round state machine.

pub mod bomb;
pub mod bot;
pub mod constants;
pub mod duel;
pub mod economy;
pub mod events;
pub mod round;
pub mod sim;
pub mod snapshot;
pub mod stats;
pub mod tactics;

pub use bomb::{Bomb, BombState};
pub use bot::{Bot, BotId, BotState};
pub use duel::{estimate_win_probability, DuelContext, DuelTick, WinEstimate};
pub use economy::{BuyPlan, BuyStrategy};
pub use events::SimEvent;
pub use round::{MatchState, Phase, RoundEndReason, RoundRecord};
pub use sim::{MatchSimulator, SimConfig, StrategyCommand};
pub use snapshot::TickSnapshot;
pub use stats::{PlayerStats, StatsBook};
pub use tactics::{CtTactic, RoleName, RoleSpec, TTactic};
