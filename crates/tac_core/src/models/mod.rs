pub mod player;
pub mod team;
pub mod weapon;

pub use player::{CombatAttributes, PlayerRecord, Roster};
pub use team::{PerSide, TeamSide};
pub use weapon::{Grenade, Inventory, Weapon, WeaponProfile};
