//! Weapon catalog and per-bot inventory.
//!
//! The catalog is a closed enum: every weapon the economy can purchase and
//! the duel engine can resolve is listed here with its price, damage profile
//! and effective range. Values are tunable; the duel engine only relies on
//! the qualitative ordering (rifles beat pistols, the AWP hits hardest).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weapon {
    Knife,
    Pistol,
    HeavyPistol,
    Smg,
    Shotgun,
    Rifle,
    Awp,
}

/// Static combat profile of one weapon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub price: u32,
    /// Expected damage of one landed hit, before armor and variance.
    pub base_damage: u32,
    /// Accuracy multiplier applied to the wielder's hit probability (0..1].
    pub accuracy: f32,
    /// Effective range in map units; past it the bot will not open fire.
    pub range: f32,
    /// Money awarded to the killer's player for a kill with this weapon.
    pub kill_reward: u32,
}

impl Weapon {
    pub fn profile(self) -> WeaponProfile {
        match self {
            Weapon::Knife => WeaponProfile {
                price: 0,
                base_damage: 55,
                accuracy: 0.95,
                range: 18.0,
                kill_reward: 1500,
            },
            Weapon::Pistol => WeaponProfile {
                price: 200,
                base_damage: 26,
                accuracy: 0.62,
                range: 220.0,
                kill_reward: 300,
            },
            Weapon::HeavyPistol => WeaponProfile {
                price: 700,
                base_damage: 38,
                accuracy: 0.60,
                range: 240.0,
                kill_reward: 300,
            },
            Weapon::Smg => WeaponProfile {
                price: 1500,
                base_damage: 30,
                accuracy: 0.70,
                range: 260.0,
                kill_reward: 600,
            },
            Weapon::Shotgun => WeaponProfile {
                price: 1300,
                base_damage: 70,
                accuracy: 0.55,
                range: 90.0,
                kill_reward: 900,
            },
            Weapon::Rifle => WeaponProfile {
                price: 2900,
                base_damage: 36,
                accuracy: 0.82,
                range: 420.0,
                kill_reward: 300,
            },
            Weapon::Awp => WeaponProfile {
                price: 4750,
                base_damage: 110,
                accuracy: 0.78,
                range: 600.0,
                kill_reward: 100,
            },
        }
    }

    /// Rough purchase preference order; used when comparing a dropped
    /// weapon against what a bot already carries.
    pub fn tier(self) -> u8 {
        match self {
            Weapon::Knife => 0,
            Weapon::Pistol => 1,
            Weapon::HeavyPistol => 2,
            Weapon::Shotgun => 3,
            Weapon::Smg => 4,
            Weapon::Rifle => 5,
            Weapon::Awp => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Weapon::Knife => "Knife",
            Weapon::Pistol => "Pistol",
            Weapon::HeavyPistol => "Heavy Pistol",
            Weapon::Smg => "SMG",
            Weapon::Shotgun => "Shotgun",
            Weapon::Rifle => "Rifle",
            Weapon::Awp => "AWP",
        }
    }
}

/// Utility the economy can buy. A flash blinds the target of the opening
/// exchange; a smoke grants cover over bomb work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grenade {
    Flash,
    Smoke,
}

impl Grenade {
    pub fn price(self) -> u32 {
        match self {
            Grenade::Flash => 200,
            Grenade::Smoke => 300,
        }
    }
}

pub const ARMOR_PRICE: u32 = 650;
pub const HELMET_PRICE: u32 = 350;
pub const DEFUSE_KIT_PRICE: u32 = 400;

/// What one bot carries into a round. Money lives here too so the economy
/// manager settles and spends through a single structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub money: u32,
    pub primary: Option<Weapon>,
    pub secondary: Weapon,
    pub armor: bool,
    pub helmet: bool,
    pub defuse_kit: bool,
    pub grenades: Vec<Grenade>,
}

impl Inventory {
    pub fn starting(money: u32) -> Self {
        Self {
            money,
            primary: None,
            secondary: Weapon::Pistol,
            armor: false,
            helmet: false,
            defuse_kit: false,
            grenades: Vec::new(),
        }
    }

    /// Best weapon currently held.
    pub fn best_weapon(&self) -> Weapon {
        self.primary.unwrap_or(self.secondary)
    }

    /// Survivors keep their guns between rounds; utility and kits are
    /// consumed, armor persists only while intact (modeled as kept).
    pub fn carry_over(&mut self) {
        self.grenades.clear();
        self.defuse_kit = false;
    }

    /// Death wipes everything except the bankroll.
    pub fn strip(&mut self) {
        self.primary = None;
        self.secondary = Weapon::Pistol;
        self.armor = false;
        self.helmet = false;
        self.defuse_kit = false;
        self.grenades.clear();
    }
}
