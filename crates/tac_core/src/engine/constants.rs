//! Tuning constants for the simulation core.
//!
//! Grouped by concern. Exact coefficients are a design surface; tests assert
//! qualitative ordering (better attributes win more) rather than the numbers.

/// Tick timing: two simulation ticks per second of game time.
pub mod tick {
    pub const TICKS_PER_SECOND: u32 = 2;
}

/// Round and bomb timers, in ticks.
pub mod round {
    use super::tick::TICKS_PER_SECOND;

    /// 115 seconds of live play.
    pub const ROUND_TIME_TICKS: u32 = 115 * TICKS_PER_SECOND;
    /// Plant-to-detonation countdown, 40 seconds.
    pub const BOMB_TIMER_TICKS: u32 = 40 * TICKS_PER_SECOND;
    /// Planting takes 3 seconds of uninterrupted work.
    pub const PLANT_TICKS: u32 = 3 * TICKS_PER_SECOND;
    /// Defusing bare-handed takes 10 seconds; a kit halves it.
    pub const DEFUSE_TICKS: u32 = 10 * TICKS_PER_SECOND;
    pub const DEFUSE_TICKS_WITH_KIT: u32 = DEFUSE_TICKS / 2;

    pub const MAX_ROUNDS: u32 = 24;
    pub const WIN_THRESHOLD: u8 = 13;
    /// Sides swap after this many rounds.
    pub const HALF_LENGTH: u32 = 12;
}

/// Money rules. A side's loss bonus climbs one tier per consecutive loss
/// and resets on a win.
pub mod economy {
    pub const START_MONEY: u32 = 800;
    pub const MAX_MONEY: u32 = 16_000;
    pub const WIN_BONUS: u32 = 3_250;
    pub const LOSS_BONUS_TIERS: [u32; 5] = [1_400, 1_900, 2_400, 2_900, 3_400];
    /// Awarded to every T player when the bomb is planted, win or lose.
    pub const PLANT_BONUS: u32 = 800;
    /// Awarded to the defuser.
    pub const DEFUSE_BONUS: u32 = 300;
}

/// Duel resolution weights. The hit probability is a convex blend of the
/// attacker's attributes scaled by weapon accuracy, range falloff and the
/// defender's cover.
pub mod duel {
    pub const AIM_WEIGHT: f32 = 0.45;
    pub const REACTION_WEIGHT: f32 = 0.25;
    pub const CONSISTENCY_WEIGHT: f32 = 0.15;
    pub const AWARENESS_WEIGHT: f32 = 0.15;

    /// Hit probability per tick for a perfect shooter at point blank.
    pub const MAX_HIT_CHANCE: f32 = 0.85;
    /// Floor so even a terrible shooter can land something.
    pub const MIN_HIT_CHANCE: f32 = 0.02;
    /// Fraction of hit chance removed by full cover.
    pub const COVER_DAMP: f32 = 0.5;
    /// Multiplier for shooting at a surprised (flashed / flanked) target.
    pub const SURPRISE_BONUS: f32 = 1.35;
    /// Damage roll spread around the weapon's base damage.
    pub const DAMAGE_VARIANCE: f32 = 0.25;
    /// Armor soaks this fraction of incoming damage.
    pub const ARMOR_ABSORB: f32 = 0.35;
    /// Cover floor granted to an agent working under a popped smoke.
    pub const SMOKE_COVER: f32 = 0.6;
    /// Batch estimation gives up and calls a draw after this many ticks.
    pub const ESTIMATE_TICK_CAP: u32 = 60;
}

/// Bot behavior thresholds.
pub mod bot {
    /// Damage contributed to a victim within the round that earns an assist.
    pub const ASSIST_DAMAGE: u32 = 40;
    pub const MAX_HP: u32 = 100;
    /// Fraction of weapon range at which a fully passive role opens fire;
    /// aggression scales the commit distance up to the full range.
    pub const ENGAGE_RANGE_FLOOR: f32 = 0.6;
}
