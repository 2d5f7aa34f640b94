//! Match simulator: the tick orchestrator.
//!
//! Single-threaded cooperative model. One authoritative `tick` advances all
//! shared state in a fixed pass: clocks → round-state evaluation → per-agent
//! decisions in roster order → effect application → snapshot emission.
//! Nothing here blocks; an external driver (timer or manual stepping) calls
//! `tick` at whatever cadence `speed` suggests. All cross-agent effects
//! (damage, kills, bomb hand-offs) flow through this module, which keeps
//! ordering deterministic for a given seed.

use std::collections::{HashMap, HashSet};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::engine::bomb::{Bomb, BombState};
use crate::engine::bot::{Bot, BotId, BotState};
use crate::engine::constants::{bot as bot_consts, duel as duel_consts, round as round_consts};
use crate::engine::duel::{self, DuelContext};
use crate::engine::economy::{self, BuyPlan, BuyStrategy};
use crate::engine::events::{EventLog, SimEvent};
use crate::engine::round::{evaluate_win_conditions, MatchState, Phase, RoundEndReason};
use crate::engine::snapshot::{BombSnap, BotSnap, MatchStateSnap, TickSnapshot, ZoneStateSnap};
use crate::engine::stats::StatsBook;
use crate::engine::tactics::{self, CtTactic, RoleName, RoleSpec, TTactic};
use crate::error::{Result, SimError};
use crate::models::{Grenade, Roster, TeamSide, Weapon};
use crate::nav::{mesh::distance, NavMesh, NodeId, ZoneGraph, ZoneId};

#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    pub seed: u64,
    pub win_threshold: u8,
    pub max_rounds: u32,
    pub half_length: u32,
    pub round_time_ticks: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            win_threshold: round_consts::WIN_THRESHOLD,
            max_rounds: round_consts::MAX_ROUNDS,
            half_length: round_consts::HALF_LENGTH,
            round_time_ticks: round_consts::ROUND_TIME_TICKS,
        }
    }
}

/// Everything the boundary may set while the buy phase is open.
#[derive(Debug, Clone, Default)]
pub struct StrategyCommand {
    pub t_buy: BuyStrategy,
    pub t_tactic: TTactic,
    pub ct_buy: BuyStrategy,
    pub ct_tactic: CtTactic,
    /// Bot id → index into the side's role list for this tactic.
    pub role_overrides: HashMap<BotId, usize>,
    pub buy_overrides: HashMap<BotId, BuyStrategy>,
}

#[derive(Debug, Clone, Copy)]
struct DroppedWeapon {
    weapon: Weapon,
    node: NodeId,
    zone: ZoneId,
}

type Observer = Box<dyn FnMut(&TickSnapshot)>;

pub struct MatchSimulator {
    mesh: NavMesh,
    zones: ZoneGraph,
    roster: Roster,
    config: SimConfig,

    bots: Vec<Bot>,
    bomb: Bomb,
    state: MatchState,
    stats: StatsBook,
    events: EventLog,
    dropped: Vec<DroppedWeapon>,

    rng: ChaCha8Rng,
    tick_count: u64,
    round_timer: u32,
    round_ticks_elapsed: u32,
    planted_this_round: bool,

    running: bool,
    speed: f32,
    pending: StrategyCommand,
    observer: Option<Observer>,
}

impl MatchSimulator {
    /// Builds the orchestrator from explicitly loaded resources. The mesh
    /// and zone graph are injected (never ambient globals) and shared
    /// read-only across all per-agent decisions.
    pub fn new(mesh: NavMesh, zones: ZoneGraph, roster: Roster, config: SimConfig) -> Result<Self> {
        roster.validate()?;
        let bots = spawn_bots(&roster, &mesh, &zones);
        Ok(Self {
            mesh,
            zones,
            roster,
            config,
            bots,
            bomb: Bomb::new(),
            state: MatchState::new(config.win_threshold, config.max_rounds, config.half_length),
            stats: StatsBook::new(Roster::TEAM_SIZE * 2),
            events: EventLog::default(),
            dropped: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            tick_count: 0,
            round_timer: config.round_time_ticks,
            round_ticks_elapsed: 0,
            planted_this_round: false,
            running: false,
            speed: 1.0,
            pending: StrategyCommand::default(),
            observer: None,
        })
    }

    pub fn set_observer(&mut self, observer: impl FnMut(&TickSnapshot) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn match_state(&self) -> &MatchState {
        &self.state
    }

    pub fn bots(&self) -> &[Bot] {
        &self.bots
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    // ========================================================================
    // Boundary commands
    // ========================================================================

    /// Starts the tick driver. Idempotent on the running flag; from the buy
    /// phase it also launches the round with the pending (or default)
    /// strategies.
    pub fn start(&mut self) {
        self.running = true;
        if self.state.phase == Phase::Buy {
            self.begin_round();
        }
    }

    /// Stops the driver flag. Idempotent; an in-flight tick is never torn
    /// mid-pass because `tick` is synchronous.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Discards all round and match state and returns to round 1 buy phase.
    /// The generator is reseeded, so `reset` + `start` reproduces a match.
    pub fn reset(&mut self) {
        self.bots = spawn_bots(&self.roster, &self.mesh, &self.zones);
        self.bomb = Bomb::new();
        self.state = MatchState::new(
            self.config.win_threshold,
            self.config.max_rounds,
            self.config.half_length,
        );
        self.stats = StatsBook::new(Roster::TEAM_SIZE * 2);
        self.events.clear();
        self.dropped.clear();
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.tick_count = 0;
        self.round_timer = self.config.round_time_ticks;
        self.round_ticks_elapsed = 0;
        self.planted_this_round = false;
        self.running = false;
        self.pending = StrategyCommand::default();
    }

    /// External speed multiplier for the tick driver. Stored and surfaced;
    /// the engine itself never sleeps.
    pub fn set_speed(&mut self, multiplier: f32) {
        self.speed = multiplier.clamp(0.1, 16.0);
    }

    /// Confirms buy strategies and tactics for the upcoming round. Valid
    /// only while the buy phase is open; returns the modeled buy plans so
    /// the boundary can warn about eco-forcing before committing.
    pub fn apply_strategies(&mut self, command: StrategyCommand) -> Result<(BuyPlan, BuyPlan)> {
        if self.state.phase != Phase::Buy {
            return Err(SimError::InvalidPhase {
                command: "apply_strategies",
                phase: self.state.phase,
            });
        }
        let t_plan = self.plan_for(TeamSide::T, &command);
        let ct_plan = self.plan_for(TeamSide::Ct, &command);
        self.pending = command;
        Ok((t_plan, ct_plan))
    }

    /// Advances from round-end display into the next round's buy phase.
    pub fn next_round(&mut self) -> Result<()> {
        if self.state.phase != Phase::RoundEnd {
            return Err(SimError::InvalidPhase { command: "next_round", phase: self.state.phase });
        }
        if self.state.at_halftime() {
            for bot in &mut self.bots {
                bot.side = bot.side.opponent();
            }
            self.state.swap_sides();
            // Fresh half, fresh economy: everyone restarts on pistols.
            for bot in &mut self.bots {
                bot.inventory.strip();
                bot.inventory.money = crate::engine::constants::economy::START_MONEY;
            }
        }
        self.state.begin_next_round();
        let t_spawn = self.zones.t_spawn();
        let ct_spawn = self.zones.ct_spawn();
        for bot in &mut self.bots {
            let spawn_zone = if bot.side == TeamSide::T { t_spawn } else { ct_spawn };
            let spawn_node = self.mesh.nearest_node(self.zones.centroid(spawn_zone));
            bot.reset_for_round(spawn_node, spawn_zone, &self.mesh);
        }
        self.bomb = Bomb::new();
        self.dropped.clear();
        self.round_timer = self.config.round_time_ticks;
        self.round_ticks_elapsed = 0;
        self.planted_this_round = false;
        self.pending = StrategyCommand::default();
        Ok(())
    }

    /// One simulation step. In frozen phases (buy, round end, match end)
    /// only a snapshot is emitted; the clocks do not move.
    pub fn tick(&mut self) -> TickSnapshot {
        self.tick_count += 1;

        if matches!(self.state.phase, Phase::Live | Phase::BombPlanted) {
            self.advance_clocks();
            if let Some((winner, reason)) = self.check_win() {
                self.finish_round(winner, reason);
            } else {
                self.run_agent_pass();
                if let Some((winner, reason)) = self.check_win() {
                    self.finish_round(winner, reason);
                }
            }
        }

        self.emit_snapshot()
    }

    // ========================================================================
    // Round lifecycle
    // ========================================================================

    /// Models a side's buys under a command. Role bindings are resolved
    /// from the command's tactics so the plan prices the round being
    /// bought for, not the roles of the round just played.
    fn plan_for(&self, side: TeamSide, command: &StrategyCommand) -> BuyPlan {
        let members: Vec<&Bot> = self.bots.iter().filter(|b| b.side == side).collect();
        let strategy = match side {
            TeamSide::T => command.t_buy,
            TeamSide::Ct => command.ct_buy,
        };
        let roles: HashMap<BotId, RoleName> = self
            .resolved_roles(side, command)
            .into_iter()
            .map(|(id, role)| (id, role.name))
            .collect();
        let loss_tier = *self.state.loss_streaks.get(side) as usize;
        economy::plan_buys(&members, side, strategy, loss_tier, &command.buy_overrides, &roles)
    }

    fn begin_round(&mut self) {
        // Roles bind before money moves so the buys are priced for the
        // round about to be played.
        self.assign_roles(TeamSide::T);
        self.assign_roles(TeamSide::Ct);
        self.assign_bomb_carrier();

        let pending = self.pending.clone();
        let t_plan = self.plan_for(TeamSide::T, &pending);
        let ct_plan = self.plan_for(TeamSide::Ct, &pending);
        economy::commit_buys(&t_plan, &mut self.bots);
        economy::commit_buys(&ct_plan, &mut self.bots);

        self.state.go_live();
        self.events.push(SimEvent::RoundStart { round: self.state.round_number });
        log::info!(
            "round {} live: T {:?} vs CT {:?}",
            self.state.round_number,
            self.pending.t_tactic,
            self.pending.ct_tactic
        );
    }

    /// Resolves a command's tactic into per-agent role bindings, in roster
    /// order. Overrides pick a different slot from the same tactic's list,
    /// never a foreign role.
    fn resolved_roles(&self, side: TeamSide, command: &StrategyCommand) -> Vec<(BotId, RoleSpec)> {
        let roles = match side {
            TeamSide::T => tactics::roles_for_t(command.t_tactic),
            TeamSide::Ct => tactics::roles_for_ct(command.ct_tactic),
        };
        self.bots
            .iter()
            .filter(|b| b.side == side)
            .enumerate()
            .map(|(slot, bot)| {
                let index = command.role_overrides.get(&bot.id).copied().unwrap_or(slot);
                (bot.id, roles.get(index).cloned().unwrap_or_else(RoleSpec::fallback))
            })
            .collect()
    }

    /// Role bindings are fixed here for the whole round.
    fn assign_roles(&mut self, side: TeamSide) {
        let bindings = self.resolved_roles(side, &self.pending);
        for (id, role) in bindings {
            let goal = match self.zones.zone_id(role.target_zone) {
                Some(zone) => zone,
                None => {
                    self.events.push(SimEvent::Anomaly {
                        bot: id,
                        detail: format!("role zone `{}` missing from map", role.target_zone),
                    });
                    self.zones.nearest_zone(self.bots[id].pos)
                }
            };
            self.bots[id].role = role;
            if !self.bots[id].assign_goal(goal, &self.mesh, &self.zones) {
                self.events.push(SimEvent::Anomaly {
                    bot: id,
                    detail: format!("pathfinding failed for agent {}", self.bots[id].name),
                });
            }
        }
    }

    fn assign_bomb_carrier(&mut self) {
        let carrier = self
            .bots
            .iter()
            .find(|b| b.side == TeamSide::T && b.role.name == RoleName::BombCarrier)
            .or_else(|| self.bots.iter().find(|b| b.side == TeamSide::T))
            .map(|b| b.id);
        if let Some(id) = carrier {
            self.bots[id].has_bomb = true;
        }
    }

    fn advance_clocks(&mut self) {
        self.round_ticks_elapsed += 1;
        match self.state.phase {
            Phase::Live => {
                self.round_timer = self.round_timer.saturating_sub(1);
            }
            Phase::BombPlanted => {
                if self.bomb.tick_countdown() {
                    self.events.push(SimEvent::BombExploded);
                    return;
                }
                if self.bomb.state == BombState::Defusing {
                    // The defuser must still be working; death cancels the
                    // defuse at effect-application time.
                    if self.bomb.tick_defuse() {
                        let name = self
                            .bomb
                            .defuser
                            .map(|id| self.bots[id].name.clone())
                            .unwrap_or_default();
                        self.events.push(SimEvent::BombDefused { by: name });
                    }
                }
            }
            _ => {}
        }
    }

    fn alive_count(&self, side: TeamSide) -> u8 {
        self.bots.iter().filter(|b| b.side == side && b.is_alive()).count() as u8
    }

    fn check_win(&self) -> Option<(TeamSide, RoundEndReason)> {
        evaluate_win_conditions(
            self.alive_count(TeamSide::T),
            self.alive_count(TeamSide::Ct),
            self.bomb.state,
            self.round_timer,
        )
    }

    fn finish_round(&mut self, winner: TeamSide, reason: RoundEndReason) {
        let defuser = match reason {
            RoundEndReason::BombDefused => self.bomb.defuser,
            _ => None,
        };
        let tier = self.state.commit_round(
            winner,
            reason,
            self.round_ticks_elapsed,
            self.alive_count(TeamSide::T),
            self.alive_count(TeamSide::Ct),
        );
        economy::settle_round(&mut self.bots, winner, tier, self.planted_this_round, defuser);
        self.stats.end_round();
        self.events
            .push(SimEvent::RoundEnd { winner, reason: reason.describe().to_string() });
        if self.state.phase == Phase::MatchEnd {
            self.running = false;
            self.events.push(SimEvent::MatchEnd {
                t_score: self.state.scores.t,
                ct_score: self.state.scores.ct,
            });
        }
        log::info!(
            "round {} to {} ({})",
            self.state.round_number,
            winner,
            reason.describe()
        );
    }

    // ========================================================================
    // Per-agent pass
    // ========================================================================

    fn run_agent_pass(&mut self) {
        let mut resolved_pairs: HashSet<(BotId, BotId)> = HashSet::new();

        for id in 0..self.bots.len() {
            if !self.bots[id].is_alive() {
                continue;
            }

            // Committed objective work is not interrupted by new contacts;
            // the worker can still be shot.
            if let BotState::ExecutingObjective { progress } = self.bots[id].state {
                self.continue_objective(id, progress);
                continue;
            }

            self.scan_for_contact(id);

            if let BotState::Engaging { target } = self.bots[id].state {
                self.handle_engagement(id, target, &mut resolved_pairs);
                continue;
            }

            if self.bots[id].state == BotState::Navigating {
                self.bots[id].advance_path(&self.mesh, &self.zones);
            }

            self.try_start_objective(id);
            self.try_pickups(id);
            self.continue_push(id);
        }
    }

    /// Re-evaluates visible enemies and picks the highest-threat target:
    /// nearest, tie-broken by lower hp. Passive roles let a contact close
    /// in before committing to the fight.
    fn scan_for_contact(&mut self, id: BotId) {
        let bot = &self.bots[id];
        let engage_range = engage_range(bot.weapon().profile().range, bot.role.aggression);
        let mut best: Option<(BotId, f32, u32)> = None;
        for enemy in &self.bots {
            if enemy.side == bot.side || !enemy.is_alive() {
                continue;
            }
            if !self.mesh.is_visible(bot.node, enemy.node) {
                continue;
            }
            let dist = distance(bot.pos, enemy.pos);
            if dist > engage_range {
                continue;
            }
            let better = match best {
                None => true,
                Some((_, best_dist, best_hp)) => {
                    dist < best_dist || (dist == best_dist && enemy.hp < best_hp)
                }
            };
            if better {
                best = Some((enemy.id, dist, enemy.hp));
            }
        }

        if let Some((target, dist, _)) = best {
            let already = matches!(self.bots[id].state, BotState::Engaging { target: t } if t == target);
            if !already {
                // A carried flash opens the engagement: the target is blind
                // for the first exchange.
                if let Some(slot) =
                    self.bots[id].inventory.grenades.iter().position(|g| *g == Grenade::Flash)
                {
                    self.bots[id].inventory.grenades.remove(slot);
                    self.bots[target].flashed = true;
                    self.events.push(SimEvent::Flashed {
                        by: self.bots[id].name.clone(),
                        target: self.bots[target].name.clone(),
                    });
                }
                // Engage first so the context sees this side as aware.
                self.bots[id].begin_engage(target);
                let ctx = self.duel_context(id, target, dist);
                let expectation = duel::quick_win_chance(&self.bots[id], &self.bots[target], &ctx);
                self.stats.record_expected_kill(id, expectation);
            }
        }
    }

    fn duel_context(&self, a: BotId, b: BotId, dist: f32) -> DuelContext {
        // A side is aware of its attacker when it is already trading with
        // them, or holding an angle on the zone they are coming from. A
        // flash overrides awareness either way.
        let aware = |x: &Bot, other: &Bot| {
            matches!(x.state, BotState::Engaging { target } if target == other.id)
                || (x.state == BotState::Holding && x.focus_zone == Some(other.zone))
        };
        let (bot_a, bot_b) = (&self.bots[a], &self.bots[b]);
        DuelContext {
            distance: dist,
            cover_a: self.effective_cover(bot_a),
            cover_b: self.effective_cover(bot_b),
            surprised_a: bot_a.flashed || !aware(bot_a, bot_b),
            surprised_b: bot_b.flashed || !aware(bot_b, bot_a),
        }
    }

    /// Node cover, raised to the smoke floor while the agent works under a
    /// popped smoke.
    fn effective_cover(&self, bot: &Bot) -> f32 {
        let cover = self.mesh.cover(bot.node);
        if bot.smoked {
            cover.max(duel_consts::SMOKE_COVER)
        } else {
            cover
        }
    }

    fn handle_engagement(
        &mut self,
        id: BotId,
        target: BotId,
        resolved_pairs: &mut HashSet<(BotId, BotId)>,
    ) {
        let target_gone = !self.bots[target].is_alive()
            || !self.mesh.is_visible(self.bots[id].node, self.bots[target].node);
        if target_gone {
            self.bots[id].disengage();
            return;
        }
        let pair = (id.min(target), id.max(target));
        if !resolved_pairs.insert(pair) {
            return;
        }

        let dist = distance(self.bots[id].pos, self.bots[target].pos);
        let ctx = self.duel_context(id, target, dist);
        let outcome = match duel::resolve_duel(&self.bots[id], &self.bots[target], &ctx, &mut self.rng)
        {
            Ok(outcome) => outcome,
            Err(err) => {
                // One agent's failure must not abort the rest of the tick.
                self.events.push(SimEvent::Anomaly { bot: id, detail: err.to_string() });
                self.bots[id].disengage();
                return;
            }
        };

        self.stats.record_damage(id, target, outcome.damage_to_b);
        self.stats.record_damage(target, id, outcome.damage_to_a);

        if self.bots[target].take_damage(outcome.damage_to_b) {
            self.on_death(target, id);
        } else {
            // The defender saw the shot; it fights back from the next tick.
            let defender = &mut self.bots[target];
            if !matches!(defender.state, BotState::Engaging { .. } | BotState::ExecutingObjective { .. }) {
                defender.begin_engage(id);
            }
        }
        if self.bots[id].take_damage(outcome.damage_to_a) {
            self.on_death(id, target);
        }
        // A flash covers the opening exchange only.
        self.bots[id].flashed = false;
        self.bots[target].flashed = false;
        if self.bots[id].is_alive() && !self.bots[target].is_alive() {
            self.bots[id].disengage();
        }
    }

    fn on_death(&mut self, victim: BotId, killer: BotId) {
        let weapon = self.bots[killer].weapon();
        self.stats.record_kill(killer, victim);
        economy::award_kill(&mut self.bots, killer, weapon);
        self.events.push(SimEvent::Kill {
            attacker: self.bots[killer].name.clone(),
            victim: self.bots[victim].name.clone(),
            weapon,
        });

        let (node, zone) = (self.bots[victim].node, self.bots[victim].zone);
        if let Some(dropped) = self.bots[victim].inventory.primary.take() {
            self.dropped.push(DroppedWeapon { weapon: dropped, node, zone });
        }
        if self.bots[victim].has_bomb {
            self.bots[victim].has_bomb = false;
            self.bomb.drop_at(node, zone);
            self.events.push(SimEvent::BombDropped {
                by: self.bots[victim].name.clone(),
                zone: self.zones.name(zone).to_string(),
            });
        }
        if self.bomb.defuser == Some(victim) {
            self.bomb.cancel_defuse();
            self.events
                .push(SimEvent::DefuseInterrupted { by: self.bots[victim].name.clone() });
        }
    }

    fn continue_objective(&mut self, id: BotId, progress: u32) {
        let bot_side = self.bots[id].side;
        if bot_side == TeamSide::T {
            let done = progress + 1 >= round_consts::PLANT_TICKS;
            if done {
                let (node, zone) = (self.bots[id].node, self.bots[id].zone);
                self.bomb.plant(node, zone);
                self.bots[id].has_bomb = false;
                self.bots[id].state = BotState::Holding;
                self.planted_this_round = true;
                self.state.bomb_planted();
                self.events.push(SimEvent::BombPlanted {
                    by: self.bots[id].name.clone(),
                    zone: self.zones.name(zone).to_string(),
                });
                self.reroute_after_plant(zone);
            } else {
                self.bots[id].state = BotState::ExecutingObjective { progress: progress + 1 };
            }
        } else {
            // Defuse work is accounted on the bomb in `advance_clocks`; the
            // bot just stays committed until the bomb resolves.
            if !matches!(self.bomb.state, BombState::Defusing) {
                self.bots[id].state = BotState::Holding;
            } else {
                self.bots[id].state = BotState::ExecutingObjective { progress: progress + 1 };
            }
        }
    }

    /// Post-plant: both sides converge on the bomb zone, T to hold the
    /// plant and CT to retake. Roles stay fixed; this is movement, not a
    /// reassignment.
    fn reroute_after_plant(&mut self, bomb_zone: ZoneId) {
        for id in 0..self.bots.len() {
            if !self.bots[id].is_alive() {
                continue;
            }
            if matches!(self.bots[id].state, BotState::Engaging { .. })
                || matches!(self.bots[id].state, BotState::ExecutingObjective { .. })
            {
                continue;
            }
            if !self.bots[id].assign_goal(bomb_zone, &self.mesh, &self.zones) {
                self.events.push(SimEvent::Anomaly {
                    bot: id,
                    detail: format!("pathfinding failed for agent {}", self.bots[id].name),
                });
            }
        }
    }

    /// Roles without a hold order keep pushing, one zone at a time toward
    /// the enemy spawn, once their staging zone is reached. The carrier is
    /// exempt (plant routing owns it) and post-plant movement belongs to
    /// `reroute_after_plant`.
    fn continue_push(&mut self, id: BotId) {
        if self.bomb.is_planted()
            || matches!(self.bomb.state, BombState::Defused | BombState::Exploded)
        {
            return;
        }
        let bot = &self.bots[id];
        if bot.state != BotState::Holding || bot.role.hold || bot.has_bomb || !bot.at_goal() {
            return;
        }
        let enemy_spawn = match bot.side {
            TeamSide::T => self.zones.ct_spawn(),
            TeamSide::Ct => self.zones.t_spawn(),
        };
        if bot.zone == enemy_spawn {
            return;
        }
        let next = match self.zones.zone_path(bot.zone, enemy_spawn).first() {
            Some(&zone) => zone,
            None => return,
        };
        if !self.bots[id].assign_goal(next, &self.mesh, &self.zones) {
            self.events.push(SimEvent::Anomaly {
                bot: id,
                detail: format!("pathfinding failed for agent {}", self.bots[id].name),
            });
        }
    }

    /// Starting bomb work under a carried smoke: consume it for cover.
    fn pop_smoke(&mut self, id: BotId) {
        if let Some(slot) =
            self.bots[id].inventory.grenades.iter().position(|g| *g == Grenade::Smoke)
        {
            self.bots[id].inventory.grenades.remove(slot);
            self.bots[id].smoked = true;
            self.events.push(SimEvent::SmokePopped { by: self.bots[id].name.clone() });
        }
    }

    fn try_start_objective(&mut self, id: BotId) {
        let bot = &self.bots[id];
        if !bot.is_alive() || bot.state != BotState::Holding {
            return;
        }
        if bot.side == TeamSide::T {
            if bot.has_bomb && self.zones.is_plant_zone(bot.zone) {
                self.pop_smoke(id);
                self.bots[id].state = BotState::ExecutingObjective { progress: 0 };
            } else if bot.has_bomb && bot.at_goal() {
                // Carrier parked outside a site (tactic staged it there);
                // push on to the closest plant zone.
                let pos = bot.pos;
                let site = self
                    .zones
                    .plant_zones()
                    .iter()
                    .copied()
                    .min_by(|&a, &b| {
                        let da = distance(pos, self.zones.centroid(a));
                        let db = distance(pos, self.zones.centroid(b));
                        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                    });
                if let Some(site) = site {
                    if !self.bots[id].assign_goal(site, &self.mesh, &self.zones) {
                        self.events.push(SimEvent::Anomaly {
                            bot: id,
                            detail: format!(
                                "pathfinding failed for agent {}",
                                self.bots[id].name
                            ),
                        });
                    }
                }
            }
        } else if self.bomb.state == BombState::Planted && Some(bot.zone) == self.bomb.zone {
            let kit = bot.inventory.defuse_kit;
            self.pop_smoke(id);
            self.bomb.start_defuse(id, kit);
            self.bots[id].state = BotState::ExecutingObjective { progress: 0 };
            self.events
                .push(SimEvent::DefuseStarted { by: self.bots[id].name.clone(), with_kit: kit });
        }
    }

    fn try_pickups(&mut self, id: BotId) {
        if !self.bots[id].is_alive() {
            return;
        }
        // Dropped bomb: any T in the zone retrieves it.
        if self.bots[id].side == TeamSide::T
            && self.bomb.state == BombState::Dropped
            && self.bomb.zone == Some(self.bots[id].zone)
        {
            self.bomb.pick_up();
            self.bots[id].has_bomb = true;
            self.events.push(SimEvent::BombPickedUp { by: self.bots[id].name.clone() });
        }
        // Dropped weapons: take the best upgrade available in the zone.
        let current_tier = self.bots[id].weapon().tier();
        let best = self
            .dropped
            .iter()
            .enumerate()
            .filter(|(_, d)| d.zone == self.bots[id].zone && d.weapon.tier() > current_tier)
            .max_by_key(|(_, d)| d.weapon.tier())
            .map(|(index, _)| index);
        if let Some(index) = best {
            let drop = self.dropped.swap_remove(index);
            if let Some(old) = self.bots[id].inventory.primary.replace(drop.weapon) {
                self.dropped.push(DroppedWeapon { weapon: old, node: drop.node, zone: drop.zone });
            }
            self.events
                .push(SimEvent::WeaponPickup { by: self.bots[id].name.clone(), weapon: drop.weapon });
        }
    }

    // ========================================================================
    // Snapshot
    // ========================================================================

    fn emit_snapshot(&mut self) -> TickSnapshot {
        let bots = self
            .bots
            .iter()
            .map(|bot| BotSnap::from_bot(bot, self.zones.name(bot.zone)))
            .collect();
        let events = self.events.drain().iter().map(|e| e.to_string()).collect();
        let zone_states = (0..self.zones.zone_count())
            .map(|zone| ZoneStateSnap {
                zone: self.zones.name(zone).to_string(),
                zone_id: zone,
                dropped_weapons: self
                    .dropped
                    .iter()
                    .filter(|d| d.zone == zone)
                    .map(|d| d.weapon)
                    .collect(),
                t_alive: self
                    .bots
                    .iter()
                    .filter(|b| b.zone == zone && b.side == TeamSide::T && b.is_alive())
                    .count() as u8,
                ct_alive: self
                    .bots
                    .iter()
                    .filter(|b| b.zone == zone && b.side == TeamSide::Ct && b.is_alive())
                    .count() as u8,
            })
            .collect();

        let snapshot = TickSnapshot {
            tick_count: self.tick_count,
            round_timer_ticks: self.round_timer,
            bots,
            events,
            stats: self.stats.all().to_vec(),
            match_state: MatchStateSnap::from_state(&self.state),
            bomb: BombSnap {
                state: self.bomb.state,
                zone: self.bomb.zone.map(|z| self.zones.name(z).to_string()),
                countdown_ticks: self.bomb.countdown,
                defuse_remaining_ticks: self.bomb.defuse_remaining,
            },
            zone_states,
        };
        if let Some(observer) = &mut self.observer {
            observer(&snapshot);
        }
        snapshot
    }
}

/// Distance at which a role commits to a new engagement. A fully passive
/// role opens fire at the floor fraction of weapon range; aggression scales
/// linearly up to the full range. Defenders returning fire are not gated.
fn engage_range(weapon_range: f32, aggression: f32) -> f32 {
    let scale = bot_consts::ENGAGE_RANGE_FLOOR
        + (1.0 - bot_consts::ENGAGE_RANGE_FLOOR) * aggression.clamp(0.0, 1.0);
    weapon_range * scale
}

fn spawn_bots(roster: &Roster, mesh: &NavMesh, zones: &ZoneGraph) -> Vec<Bot> {
    roster
        .players
        .iter()
        .enumerate()
        .map(|(id, record)| {
            let spawn_zone =
                if record.side == TeamSide::T { zones.t_spawn() } else { zones.ct_spawn() };
            let spawn_node = mesh.nearest_node(zones.centroid(spawn_zone));
            Bot::from_record(id, record, spawn_node, spawn_zone, mesh)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::embedded;

    fn simulator(seed: u64) -> MatchSimulator {
        let mesh = embedded::demo_mesh().unwrap();
        let zones = embedded::demo_map().unwrap();
        let roster = embedded::demo_roster();
        MatchSimulator::new(mesh, zones, roster, SimConfig { seed, ..Default::default() }).unwrap()
    }

    #[test]
    fn test_commands_rejected_outside_their_phase() {
        let mut sim = simulator(1);
        assert!(sim.next_round().is_err(), "next_round before any round end");
        sim.start();
        let err = sim.apply_strategies(StrategyCommand::default()).unwrap_err();
        assert!(matches!(err, SimError::InvalidPhase { command: "apply_strategies", .. }));
        assert!(err.is_rejection());
    }

    #[test]
    fn test_buy_phase_tick_freezes_clock() {
        let mut sim = simulator(2);
        let before = sim.round_timer;
        let snap = sim.tick();
        assert_eq!(snap.round_timer_ticks, before, "buy phase must not consume round time");
        assert_eq!(sim.phase(), Phase::Buy);
    }

    #[test]
    fn test_reset_reproduces_initial_state() {
        let mut sim = simulator(3);
        sim.start();
        for _ in 0..200 {
            sim.tick();
            if sim.phase() == Phase::RoundEnd {
                sim.next_round().unwrap();
                sim.start();
            }
            if sim.phase() == Phase::MatchEnd {
                break;
            }
        }
        sim.reset();
        assert_eq!(sim.phase(), Phase::Buy);
        assert_eq!(sim.match_state().round_number, 1);
        assert_eq!(sim.match_state().scores.t, 0);
        assert_eq!(sim.match_state().scores.ct, 0);
        assert!(sim.match_state().history.is_empty());
        assert!(!sim.is_running());
        assert!(sim.bots().iter().all(|b| b.hp == 100 && b.is_alive()));
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let run = |seed| {
            let mut sim = simulator(seed);
            sim.start();
            for _ in 0..2000 {
                sim.tick();
                if sim.phase() == Phase::RoundEnd {
                    sim.next_round().unwrap();
                    sim.start();
                }
                if sim.phase() == Phase::MatchEnd {
                    break;
                }
            }
            (sim.match_state().scores, sim.match_state().history.len())
        };
        assert_eq!(run(77), run(77));
    }

    #[test]
    fn test_start_stop_idempotent() {
        let mut sim = simulator(4);
        sim.start();
        sim.start();
        assert!(sim.is_running());
        sim.stop();
        sim.stop();
        assert!(!sim.is_running());
    }

    #[test]
    fn test_set_speed_is_clamped() {
        let mut sim = simulator(5);
        sim.set_speed(0.0);
        assert!(sim.speed() > 0.0);
        sim.set_speed(100.0);
        assert!(sim.speed() <= 16.0);
    }

    #[test]
    fn test_settlement_happens_once_per_round() {
        let mut sim = simulator(6);
        sim.start();
        for _ in 0..1000 {
            sim.tick();
            if sim.phase() == Phase::RoundEnd || sim.phase() == Phase::MatchEnd {
                break;
            }
        }
        assert!(matches!(sim.phase(), Phase::RoundEnd | Phase::MatchEnd));
        let settled: Vec<u32> = sim.bots().iter().map(|b| b.inventory.money).collect();
        // Extra ticks in the frozen round-end phase must not re-settle.
        sim.tick();
        sim.tick();
        let after: Vec<u32> = sim.bots().iter().map(|b| b.inventory.money).collect();
        assert_eq!(settled, after);
    }

    #[test]
    fn test_buys_are_priced_for_the_round_being_bought() {
        let mut sim = simulator(8);
        for bot in &mut sim.bots {
            bot.inventory.money = 16_000;
        }
        let command = StrategyCommand {
            t_buy: BuyStrategy::Full,
            ct_buy: BuyStrategy::Full,
            ..Default::default()
        };
        let (_, ct_plan) = sim.apply_strategies(command).unwrap();
        // The returned plan already prices this round's AWP anchor.
        assert!(ct_plan.orders.iter().any(|o| o.weapon == Some(Weapon::Awp)));
        sim.start();
        let awps = sim
            .bots
            .iter()
            .filter(|b| b.side == TeamSide::Ct && b.inventory.primary == Some(Weapon::Awp))
            .count();
        assert_eq!(awps, 1, "the standard setup fields exactly one AWP");
    }

    #[test]
    fn test_opening_flash_blinds_the_target() {
        let mut sim = simulator(9);
        // Stage a T and a CT on a listed mid sight line, inside pistol range.
        sim.bots[0].node = 5;
        sim.bots[0].pos = sim.mesh.position(5);
        sim.bots[0].zone = sim.zones.nearest_zone(sim.bots[0].pos);
        sim.bots[0].state = BotState::Holding;
        sim.bots[0].role.aggression = 1.0;
        sim.bots[0].inventory.grenades.push(Grenade::Flash);
        sim.bots[5].node = 6;
        sim.bots[5].pos = sim.mesh.position(6);
        sim.bots[5].zone = sim.zones.nearest_zone(sim.bots[5].pos);
        sim.bots[5].state = BotState::Engaging { target: 0 };

        sim.scan_for_contact(0);

        assert!(matches!(sim.bots[0].state, BotState::Engaging { target: 5 }));
        assert!(sim.bots[5].flashed);
        assert!(sim.bots[0].inventory.grenades.is_empty(), "the flash is consumed");
        // Awareness does not help a flashed defender.
        let ctx = sim.duel_context(0, 5, 50.0);
        assert!(ctx.surprised_b);
    }

    #[test]
    fn test_holding_an_angle_on_a_zone_prevents_surprise() {
        let mut sim = simulator(10);
        sim.bots[0].state = BotState::Holding;
        sim.bots[0].focus_zone = Some(sim.bots[5].zone);
        assert!(!sim.duel_context(0, 5, 120.0).surprised_a);
        sim.bots[0].focus_zone = None;
        assert!(sim.duel_context(0, 5, 120.0).surprised_a);
    }

    #[test]
    fn test_push_roles_advance_past_their_staging_zone() {
        let mut sim = simulator(11);
        let mid = sim.zones.zone_id("Mid").unwrap();
        let node = sim.mesh.nearest_node(sim.zones.centroid(mid));
        for id in [0usize, 1] {
            sim.bots[id].node = node;
            sim.bots[id].pos = sim.mesh.position(node);
            sim.bots[id].zone = mid;
            sim.bots[id].goal_zone = Some(mid);
            sim.bots[id].state = BotState::Holding;
        }
        sim.bots[0].role =
            RoleSpec { name: RoleName::Entry, target_zone: "Mid", aggression: 0.8, hold: false, description: "push through" };
        sim.bots[1].role =
            RoleSpec { name: RoleName::MidControl, target_zone: "Mid", aggression: 0.4, hold: true, description: "hold mid" };

        sim.continue_push(0);
        sim.continue_push(1);

        assert_eq!(sim.bots[0].state, BotState::Navigating);
        assert_ne!(sim.bots[0].goal_zone, Some(mid), "push role moves on toward the enemy spawn");
        assert_eq!(sim.bots[1].state, BotState::Holding);
        assert_eq!(sim.bots[1].goal_zone, Some(mid), "hold role stays on its zone");
    }

    #[test]
    fn test_passive_roles_commit_at_shorter_range() {
        let range = 400.0;
        assert!(engage_range(range, 0.2) < engage_range(range, 0.9));
        assert_eq!(engage_range(range, 1.0), range);
        assert!(engage_range(range, 0.0) >= range * 0.5);
    }

    #[test]
    fn test_planter_pops_smoke_for_cover() {
        let mut sim = simulator(12);
        let site = sim.zones.zone_id("A Site").unwrap();
        let node = sim.mesh.nearest_node(sim.zones.centroid(site));
        sim.bots[0].has_bomb = true;
        sim.bots[0].node = node;
        sim.bots[0].pos = sim.mesh.position(node);
        sim.bots[0].zone = site;
        sim.bots[0].goal_zone = Some(site);
        sim.bots[0].state = BotState::Holding;
        sim.bots[0].inventory.grenades.push(Grenade::Smoke);

        sim.try_start_objective(0);

        assert!(matches!(sim.bots[0].state, BotState::ExecutingObjective { .. }));
        assert!(sim.bots[0].smoked);
        assert!(sim.bots[0].inventory.grenades.is_empty(), "the smoke is consumed");
        assert!(sim.duel_context(0, 5, 100.0).cover_a >= duel_consts::SMOKE_COVER);
    }
}
