//! Duel Engine: probabilistic combat resolution.
//!
//! Two modes share one per-tick model:
//! - `resolve_duel` advances a live engagement by one tick and returns the
//!   damage to apply (the simulator applies it, keeping all cross-agent
//!   effects centralized).
//! - `estimate_win_probability` runs N independent simulated duels on local
//!   hp copies. It is pure with respect to match state and safe to call
//!   while a match is ticking, for what-if analysis.
//!
//! Hit probability is a convex blend of aim, reaction, consistency and
//! awareness, scaled by weapon accuracy and range falloff, damped by the
//! target's cover and boosted against a surprised target. Coefficients live
//! in `constants::duel`; only the qualitative ordering is contractual.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::engine::bot::{Bot, BotId};
use crate::engine::constants::duel;
use crate::error::{Result, SimError};
use crate::models::{CombatAttributes, Weapon};

/// Situational modifiers for one engagement, symmetric in structure.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuelContext {
    /// Distance between the two bots in map units.
    pub distance: f32,
    /// Cover score of the node each side occupies.
    pub cover_a: f32,
    pub cover_b: f32,
    /// Whether each side was caught off guard (flashed, flanked).
    pub surprised_a: bool,
    pub surprised_b: bool,
}

/// Result of one resolved duel tick. Damage is reported, not applied.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DuelTick {
    pub damage_to_a: u32,
    pub damage_to_b: u32,
    /// Set when a side would be dead after applying the damage.
    pub winner: Option<BotId>,
    /// False while both survive and the engagement continues next tick.
    pub concluded: bool,
}

/// Batch estimation output. `a_win_rate + b_win_rate == 1.0` (draws are
/// split evenly between the sides).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WinEstimate {
    pub a_win_rate: f64,
    pub b_win_rate: f64,
}

/// Per-tick probability that the shooter lands a hit.
pub fn hit_probability(
    attrs: &CombatAttributes,
    weapon: Weapon,
    distance: f32,
    target_cover: f32,
    target_surprised: bool,
) -> f32 {
    let profile = weapon.profile();
    if distance > profile.range {
        return 0.0;
    }
    let skill = CombatAttributes::normalized(attrs.aim) * duel::AIM_WEIGHT
        + CombatAttributes::normalized(attrs.reaction) * duel::REACTION_WEIGHT
        + CombatAttributes::normalized(attrs.consistency) * duel::CONSISTENCY_WEIGHT
        + CombatAttributes::normalized(attrs.awareness) * duel::AWARENESS_WEIGHT;

    // Linear falloff from point blank to the weapon's effective range.
    let falloff = 1.0 - 0.5 * (distance / profile.range).clamp(0.0, 1.0);
    let cover_damp = 1.0 - duel::COVER_DAMP * target_cover.clamp(0.0, 1.0);
    let surprise = if target_surprised { duel::SURPRISE_BONUS } else { 1.0 };

    (skill * profile.accuracy * falloff * cover_damp * surprise * duel::MAX_HIT_CHANCE)
        .clamp(duel::MIN_HIT_CHANCE, duel::MAX_HIT_CHANCE)
}

/// Damage of one landed hit. Consistency narrows the variance band; armor
/// soaks a flat fraction.
fn damage_roll(
    attrs: &CombatAttributes,
    weapon: Weapon,
    target_armored: bool,
    rng: &mut ChaCha8Rng,
) -> u32 {
    let profile = weapon.profile();
    let spread = duel::DAMAGE_VARIANCE * (1.0 - 0.5 * CombatAttributes::normalized(attrs.consistency));
    let factor = 1.0 + rng.gen_range(-spread..=spread);
    let mut damage = profile.base_damage as f32 * factor;
    if target_armored {
        damage *= 1.0 - duel::ARMOR_ABSORB;
    }
    (damage.round() as u32).max(1)
}

/// Stat view the estimator clones instead of touching live bots.
#[derive(Debug, Clone, Copy)]
struct Duelist {
    id: BotId,
    attrs: CombatAttributes,
    weapon: Weapon,
    armored: bool,
    hp: u32,
}

impl Duelist {
    fn of(bot: &Bot) -> Self {
        Self {
            id: bot.id,
            attrs: bot.attributes,
            weapon: bot.weapon(),
            armored: bot.inventory.armor,
            hp: bot.hp,
        }
    }
}

fn resolve_tick(
    a: &Duelist,
    b: &Duelist,
    ctx: &DuelContext,
    rng: &mut ChaCha8Rng,
) -> DuelTick {
    let p_a = hit_probability(&a.attrs, a.weapon, ctx.distance, ctx.cover_b, ctx.surprised_b);
    let p_b = hit_probability(&b.attrs, b.weapon, ctx.distance, ctx.cover_a, ctx.surprised_a);

    let a_hits = rng.gen::<f32>() < p_a;
    let b_hits = rng.gen::<f32>() < p_b;

    let mut damage_to_b = if a_hits { damage_roll(&a.attrs, a.weapon, b.armored, rng) } else { 0 };
    let mut damage_to_a = if b_hits { damage_roll(&b.attrs, b.weapon, a.armored, rng) } else { 0 };

    let a_dies = damage_to_a >= a.hp;
    let b_dies = damage_to_b >= b.hp;

    // Simultaneous lethal hits: the faster reactor's shot lands first and
    // the other never fires. Equal reaction falls to a fair roll on the
    // injected generator, so the outcome is reproducible per seed and
    // carries no directional bias between identical agents.
    if a_dies && b_dies {
        let a_first = match a.attrs.reaction.cmp(&b.attrs.reaction) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => rng.gen::<bool>(),
        };
        if a_first {
            damage_to_a = 0;
        } else {
            damage_to_b = 0;
        }
    }

    let winner = if damage_to_a >= a.hp {
        Some(b.id)
    } else if damage_to_b >= b.hp {
        Some(a.id)
    } else {
        None
    };

    DuelTick { damage_to_a, damage_to_b, winner, concluded: winner.is_some() }
}

/// Resolves one tick of a live duel. Precondition: both participants alive.
pub fn resolve_duel(a: &Bot, b: &Bot, ctx: &DuelContext, rng: &mut ChaCha8Rng) -> Result<DuelTick> {
    if !a.is_alive() || a.hp == 0 {
        return Err(SimError::InvalidDuelist(a.id));
    }
    if !b.is_alive() || b.hp == 0 {
        return Err(SimError::InvalidDuelist(b.id));
    }
    Ok(resolve_tick(&Duelist::of(a), &Duelist::of(b), ctx, rng))
}

/// Monte-Carlo win estimate over `trials` independent duels fought to a
/// finish (or a tick cap, counted as a draw and split evenly). Pure: the
/// bots are read once into stat views and a private generator is derived
/// from `seed`, so concurrent live ticking is unaffected.
pub fn estimate_win_probability(
    a: &Bot,
    b: &Bot,
    ctx: &DuelContext,
    trials: u32,
    seed: u64,
) -> Result<WinEstimate> {
    if !a.is_alive() {
        return Err(SimError::InvalidDuelist(a.id));
    }
    if !b.is_alive() {
        return Err(SimError::InvalidDuelist(b.id));
    }
    let base_a = Duelist::of(a);
    let base_b = Duelist::of(b);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut a_wins = 0u32;
    let mut b_wins = 0u32;
    let mut draws = 0u32;

    for _ in 0..trials.max(1) {
        let mut da = base_a;
        let mut db = base_b;
        let mut ticks = 0;
        loop {
            let outcome = resolve_tick(&da, &db, ctx, &mut rng);
            da.hp = da.hp.saturating_sub(outcome.damage_to_a);
            db.hp = db.hp.saturating_sub(outcome.damage_to_b);
            if da.hp == 0 {
                b_wins += 1;
                break;
            }
            if db.hp == 0 {
                a_wins += 1;
                break;
            }
            ticks += 1;
            if ticks >= duel::ESTIMATE_TICK_CAP {
                draws += 1;
                break;
            }
        }
    }

    let total = (a_wins + b_wins + draws) as f64;
    Ok(WinEstimate {
        a_win_rate: (a_wins as f64 + draws as f64 * 0.5) / total,
        b_win_rate: (b_wins as f64 + draws as f64 * 0.5) / total,
    })
}

/// Closed-form approximation of the duel winner, used for the
/// expected-kills baseline without paying for a batch estimate per contact.
pub fn quick_win_chance(a: &Bot, b: &Bot, ctx: &DuelContext) -> f32 {
    let p_a = hit_probability(&a.attributes, a.weapon(), ctx.distance, ctx.cover_b, ctx.surprised_b);
    let p_b = hit_probability(&b.attributes, b.weapon(), ctx.distance, ctx.cover_a, ctx.surprised_a);
    if p_a + p_b <= f32::EPSILON {
        return 0.5;
    }
    p_a / (p_a + p_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlayerRecord, TeamSide};
    use crate::nav::{NavMesh, NavMeshDefinition, NavNodeDefinition};

    fn mesh() -> NavMesh {
        NavMesh::from_definition(&NavMeshDefinition {
            nodes: vec![NavNodeDefinition { id: 0, x: 0.0, y: 0.0, neighbors: vec![], cover: 0.0 }],
            visibility: Some(vec![]),
            walls: vec![],
        })
        .unwrap()
    }

    fn bot(id: BotId, skill: u8) -> Bot {
        let record = PlayerRecord {
            name: format!("bot{}", id),
            side: if id < 5 { TeamSide::T } else { TeamSide::Ct },
            attributes: CombatAttributes::uniform(skill),
            starting_money: 800,
        };
        Bot::from_record(id, &record, 0, 0, &mesh())
    }

    fn ctx() -> DuelContext {
        DuelContext { distance: 100.0, ..Default::default() }
    }

    #[test]
    fn test_dead_participant_fails_fast() {
        let mut a = bot(0, 60);
        let b = bot(5, 60);
        a.take_damage(500);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            resolve_duel(&a, &b, &ctx(), &mut rng),
            Err(SimError::InvalidDuelist(0))
        ));
        assert!(estimate_win_probability(&a, &b, &ctx(), 10, 1).is_err());
    }

    #[test]
    fn test_estimate_rates_sum_to_one() {
        let a = bot(0, 70);
        let b = bot(5, 55);
        let est = estimate_win_probability(&a, &b, &ctx(), 1000, 42).unwrap();
        assert!((est.a_win_rate + est.b_win_rate - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_does_not_mutate_bots() {
        let a = bot(0, 70);
        let b = bot(5, 55);
        let (hp_a, hp_b) = (a.hp, b.hp);
        estimate_win_probability(&a, &b, &ctx(), 500, 42).unwrap();
        assert_eq!((a.hp, b.hp), (hp_a, hp_b));
    }

    #[test]
    fn test_identical_bots_converge_to_even_odds() {
        let a = bot(0, 60);
        let b = bot(5, 60);
        let est = estimate_win_probability(&a, &b, &ctx(), 10_000, 7).unwrap();
        assert!(
            (est.a_win_rate - 0.5).abs() < 0.03,
            "expected ~50/50, got {:.3}/{:.3}",
            est.a_win_rate,
            est.b_win_rate
        );
    }

    #[test]
    fn test_better_shooter_wins_more() {
        let strong = bot(0, 85);
        let weak = bot(5, 40);
        let est = estimate_win_probability(&strong, &weak, &ctx(), 2000, 11).unwrap();
        assert!(est.a_win_rate > 0.65, "strong side won only {:.3}", est.a_win_rate);
    }

    #[test]
    fn test_estimate_is_reproducible_for_same_seed() {
        let a = bot(0, 70);
        let b = bot(5, 55);
        let first = estimate_win_probability(&a, &b, &ctx(), 500, 99).unwrap();
        let second = estimate_win_probability(&a, &b, &ctx(), 500, 99).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_simultaneous_lethal_tie_breaks_on_reaction() {
        let mut a = bot(0, 60);
        let mut b = bot(5, 60);
        a.hp = 1;
        b.hp = 1;
        a.attributes.reaction = 90;
        b.attributes.reaction = 30;
        // Force a context where both always hit: point blank, no cover.
        let close = DuelContext { distance: 1.0, ..Default::default() };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            let tick = resolve_duel(&a, &b, &close, &mut rng).unwrap();
            if tick.concluded {
                // b may win outright on a tick where only b hits, but a
                // simultaneous lethal exchange must always fall to a.
                if tick.damage_to_a > 0 && tick.damage_to_b > 0 {
                    panic!("tie-break left both lethal hits standing");
                }
            }
        }
    }

    #[test]
    fn test_cover_reduces_hit_probability() {
        let attrs = CombatAttributes::uniform(70);
        let open = hit_probability(&attrs, Weapon::Rifle, 100.0, 0.0, false);
        let covered = hit_probability(&attrs, Weapon::Rifle, 100.0, 0.9, false);
        assert!(covered < open);
    }

    #[test]
    fn test_out_of_range_cannot_hit() {
        let attrs = CombatAttributes::uniform(99);
        assert_eq!(hit_probability(&attrs, Weapon::Shotgun, 500.0, 0.0, false), 0.0);
    }

    #[test]
    fn test_quick_win_chance_favors_better_weapon() {
        let mut rifle = bot(0, 60);
        rifle.inventory.primary = Some(Weapon::Rifle);
        let pistol = bot(5, 60);
        assert!(quick_win_chance(&rifle, &pistol, &ctx()) > 0.5);
    }
}
