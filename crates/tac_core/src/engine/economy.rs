//! Team economy: buy planning, purchase commits and round settlement.
//!
//! Planning is pure: `plan_buys` models a side's spend under a strategy and
//! returns projected numbers without touching any inventory. The simulator
//! commits the plan exactly once at round start, and `settle_round` pays
//! win/loss/objective bonuses exactly once per round transition (guarded by
//! the round state machine, not by re-entrancy of the function). Kill
//! rewards are the one exception to end-of-round settlement: `award_kill`
//! pays the instant a kill lands, so mid-round money is already live.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::engine::bot::{Bot, BotId};
use crate::engine::constants::economy;
use crate::engine::tactics::RoleName;
use crate::models::weapon::{ARMOR_PRICE, DEFUSE_KIT_PRICE, HELMET_PRICE};
use crate::models::{Grenade, TeamSide, Weapon};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuyStrategy {
    /// Maximal loadout per role.
    Full,
    /// Buy despite a broken bank: SMG-bracket weapons plus armor.
    Force,
    /// Mid-tier weapons, partial utility.
    #[default]
    Half,
    /// Spend near zero to bank for a later full buy.
    Eco,
    /// Spend only the loss-bonus surplus.
    Bonus,
    /// One player (the richest) buys full, the rest save.
    Hero,
}

/// One agent's modeled purchase.
#[derive(Debug, Clone, Serialize)]
pub struct BuyOrder {
    pub bot: BotId,
    pub weapon: Option<Weapon>,
    pub armor: bool,
    pub helmet: bool,
    pub defuse_kit: bool,
    pub grenades: Vec<Grenade>,
    pub cost: u32,
}

/// Projection returned to the boundary before anything is committed.
#[derive(Debug, Clone, Serialize)]
pub struct BuyPlan {
    pub strategy: BuyStrategy,
    /// Total money available across the side right now.
    pub total_bank: u32,
    /// Modeled spend under the strategy.
    pub estimated_spend: u32,
    /// Worst-case money any single agent holds entering the next round
    /// (assumes this round is lost at the current loss tier).
    pub min_next_round: u32,
    pub orders: Vec<BuyOrder>,
}

fn weapon_bracket(strategy: BuyStrategy, role: RoleName, money: u32) -> Option<Weapon> {
    let pick = |candidates: &[Weapon]| {
        candidates.iter().copied().find(|w| w.profile().price <= money)
    };
    match strategy {
        BuyStrategy::Full => {
            if role.prefers_awp() {
                pick(&[Weapon::Awp, Weapon::Rifle, Weapon::Smg, Weapon::HeavyPistol])
            } else {
                pick(&[Weapon::Rifle, Weapon::Smg, Weapon::HeavyPistol])
            }
        }
        BuyStrategy::Force => pick(&[Weapon::Smg, Weapon::Shotgun, Weapon::HeavyPistol]),
        BuyStrategy::Half => pick(&[Weapon::Smg, Weapon::HeavyPistol]),
        BuyStrategy::Bonus => pick(&[Weapon::HeavyPistol]),
        BuyStrategy::Eco => None,
        // Hero is resolved per-agent in plan_buys.
        BuyStrategy::Hero => None,
    }
}

fn order_for(bot: &Bot, role: RoleName, strategy: BuyStrategy, is_ct: bool) -> BuyOrder {
    let mut remaining = bot.inventory.money;
    let mut cost = 0u32;
    let mut spend = |price: u32, remaining: &mut u32| -> bool {
        if price <= *remaining {
            *remaining -= price;
            cost += price;
            true
        } else {
            false
        }
    };

    // Keep a carried-over primary instead of re-buying the same bracket.
    let mut weapon = None;
    if bot.inventory.primary.is_none() {
        if let Some(candidate) = weapon_bracket(strategy, role, remaining) {
            if spend(candidate.profile().price, &mut remaining) {
                weapon = Some(candidate);
            }
        }
    }

    let wants_armor = matches!(strategy, BuyStrategy::Full | BuyStrategy::Force);
    let armor = !bot.inventory.armor && wants_armor && spend(ARMOR_PRICE, &mut remaining);
    let helmet = armor && strategy == BuyStrategy::Full && spend(HELMET_PRICE, &mut remaining);
    let defuse_kit = is_ct
        && matches!(strategy, BuyStrategy::Full | BuyStrategy::Force)
        && !bot.inventory.defuse_kit
        && spend(DEFUSE_KIT_PRICE, &mut remaining);

    let mut grenades = Vec::new();
    if strategy == BuyStrategy::Full {
        for grenade in [Grenade::Flash, Grenade::Smoke] {
            if spend(grenade.price(), &mut remaining) {
                grenades.push(grenade);
            }
        }
    } else if strategy == BuyStrategy::Force {
        if spend(Grenade::Flash.price(), &mut remaining) {
            grenades.push(Grenade::Flash);
        }
    }

    BuyOrder { bot: bot.id, weapon, armor, helmet, defuse_kit, grenades, cost }
}

/// Models the side's spend without mutating any agent. `overrides` replaces
/// the side strategy for individual agents. `roles` carries the role
/// bindings of the round being bought for; an agent missing from it is
/// priced against the role it already holds.
pub fn plan_buys(
    bots: &[&Bot],
    side: TeamSide,
    strategy: BuyStrategy,
    loss_tier: usize,
    overrides: &HashMap<BotId, BuyStrategy>,
    roles: &HashMap<BotId, RoleName>,
) -> BuyPlan {
    let is_ct = side == TeamSide::Ct;
    let hero = match strategy {
        BuyStrategy::Hero => bots.iter().max_by_key(|b| b.inventory.money).map(|b| b.id),
        _ => None,
    };

    let mut orders = Vec::with_capacity(bots.len());
    for bot in bots {
        let effective = overrides.get(&bot.id).copied().unwrap_or(match hero {
            Some(hero_id) if bot.id == hero_id => BuyStrategy::Full,
            Some(_) => BuyStrategy::Eco,
            None => strategy,
        });
        let role = roles.get(&bot.id).copied().unwrap_or(bot.role.name);
        orders.push(order_for(bot, role, effective, is_ct));
    }

    let total_bank: u32 = bots.iter().map(|b| b.inventory.money).sum();
    let estimated_spend: u32 = orders.iter().map(|o| o.cost).sum();
    let loss_bonus = loss_bonus_for_tier(loss_tier);
    let min_next_round = bots
        .iter()
        .zip(&orders)
        .map(|(bot, order)| {
            (bot.inventory.money - order.cost + loss_bonus).min(economy::MAX_MONEY)
        })
        .min()
        .unwrap_or(0);

    BuyPlan { strategy, total_bank, estimated_spend, min_next_round, orders }
}

/// Applies a plan to the live roster. Called exactly once per round start.
pub fn commit_buys(plan: &BuyPlan, bots: &mut [Bot]) {
    for order in &plan.orders {
        let bot = &mut bots[order.bot];
        debug_assert!(order.cost <= bot.inventory.money);
        bot.inventory.money = bot.inventory.money.saturating_sub(order.cost);
        if let Some(weapon) = order.weapon {
            bot.inventory.primary = Some(weapon);
        }
        if order.armor {
            bot.inventory.armor = true;
        }
        if order.helmet {
            bot.inventory.helmet = true;
        }
        if order.defuse_kit {
            bot.inventory.defuse_kit = true;
        }
        bot.inventory.grenades.extend(order.grenades.iter().copied());
        log::debug!(
            "buy: {} spends ${} ({:?})",
            bot.name,
            order.cost,
            order.weapon,
        );
    }
}

pub fn loss_bonus_for_tier(tier: usize) -> u32 {
    let capped = tier.min(economy::LOSS_BONUS_TIERS.len() - 1);
    economy::LOSS_BONUS_TIERS[capped]
}

/// Pays round-end money to every player. The caller (round state machine)
/// guarantees this runs once per round transition.
///
/// `planted` pays the plant bonus to all T players even on a lost round;
/// `defuser` receives the defuse bonus on top of the win bonus.
pub fn settle_round(
    bots: &mut [Bot],
    winner: TeamSide,
    loss_tier_of_loser: usize,
    planted: bool,
    defuser: Option<BotId>,
) {
    let loss_bonus = loss_bonus_for_tier(loss_tier_of_loser);
    for bot in bots.iter_mut() {
        let mut payout = if bot.side == winner { economy::WIN_BONUS } else { loss_bonus };
        if planted && bot.side == TeamSide::T {
            payout += economy::PLANT_BONUS;
        }
        if defuser == Some(bot.id) {
            payout += economy::DEFUSE_BONUS;
        }
        bot.inventory.money = (bot.inventory.money + payout).min(economy::MAX_MONEY);
    }
}

/// Kill reward, applied immediately when a kill lands.
pub fn award_kill(bots: &mut [Bot], killer: BotId, weapon: Weapon) {
    let reward = weapon.profile().kill_reward;
    let bot = &mut bots[killer];
    bot.inventory.money = (bot.inventory.money + reward).min(economy::MAX_MONEY);
}
