//! Per-agent entity and behavior state machine.
//!
//! A `Bot` is created once per match from a roster record. Round-local state
//! (hp, position, path, inventory loadout, role) resets at round start; the
//! identity and bankroll persist. The tick-time decision logic lives in the
//! simulator so that all cross-agent effects flow through one place; this
//! module owns the state data and its legal transitions.
//!
//! States: `Spawn → Navigating → Holding`, any live state `→ Engaging` on
//! contact, `Navigating/Holding → ExecutingObjective` at the bomb, any
//! `→ Dead` at zero hp (terminal for the round).

use std::collections::VecDeque;

use serde::Serialize;

use crate::engine::constants::bot::MAX_HP;
use crate::engine::tactics::RoleSpec;
use crate::models::{CombatAttributes, Inventory, PlayerRecord, TeamSide, Weapon};
use crate::nav::{NavMesh, NodeId, ZoneGraph, ZoneId};

pub type BotId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BotState {
    /// Pre-assignment idle at the spawn point.
    Spawn,
    /// Following the queued path toward the goal zone.
    Navigating,
    /// Stationary, watching the focus zone.
    Holding,
    /// Actively dueling the target.
    Engaging { target: BotId },
    /// Planting or defusing; `progress` counts completed work ticks.
    ExecutingObjective { progress: u32 },
    /// Terminal for the round.
    Dead,
}

#[derive(Debug, Clone, Serialize)]
pub struct Bot {
    pub id: BotId,
    pub name: String,
    pub side: TeamSide,
    pub attributes: CombatAttributes,

    pub hp: u32,
    pub state: BotState,
    pub pos: (f32, f32),
    pub node: NodeId,
    pub path: VecDeque<NodeId>,

    pub zone: ZoneId,
    pub goal_zone: Option<ZoneId>,
    pub focus_zone: Option<ZoneId>,

    pub role: RoleSpec,
    pub inventory: Inventory,
    pub has_bomb: bool,

    /// Blinded by an opening flash; cleared after the exchange resolves.
    pub flashed: bool,
    /// Working under a popped smoke; lingers for the rest of the round.
    pub smoked: bool,
}

impl Bot {
    pub fn from_record(id: BotId, record: &PlayerRecord, spawn_node: NodeId, spawn_zone: ZoneId, mesh: &NavMesh) -> Self {
        Self {
            id,
            name: record.name.clone(),
            side: record.side,
            attributes: record.attributes,
            hp: MAX_HP,
            state: BotState::Spawn,
            pos: mesh.position(spawn_node),
            node: spawn_node,
            path: VecDeque::new(),
            zone: spawn_zone,
            goal_zone: None,
            focus_zone: None,
            role: RoleSpec::fallback(),
            inventory: Inventory::starting(record.starting_money),
            has_bomb: false,
            flashed: false,
            smoked: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state != BotState::Dead
    }

    pub fn weapon(&self) -> Weapon {
        self.inventory.best_weapon()
    }

    /// Applies damage, clamping hp at zero. Returns true when this hit
    /// killed the bot; the state flips to `Dead` in the same call so the
    /// `Dead ⇔ hp == 0` invariant never has an observable gap.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.hp = self.hp.saturating_sub(amount);
        if self.hp == 0 {
            self.state = BotState::Dead;
            self.path.clear();
            true
        } else {
            false
        }
    }

    /// Round reset: back to full hp at the side's spawn. Survivors keep
    /// their loadout, dead bots restart with pistol and no armor.
    pub fn reset_for_round(&mut self, spawn_node: NodeId, spawn_zone: ZoneId, mesh: &NavMesh) {
        if self.state == BotState::Dead {
            self.inventory.strip();
        } else {
            self.inventory.carry_over();
        }
        self.hp = MAX_HP;
        self.state = BotState::Spawn;
        self.node = spawn_node;
        self.pos = mesh.position(spawn_node);
        self.zone = spawn_zone;
        self.path.clear();
        self.goal_zone = None;
        self.focus_zone = None;
        self.has_bomb = false;
        self.flashed = false;
        self.smoked = false;
    }

    /// Routes toward the goal zone's centroid node. On an unreachable goal
    /// the bot degrades to `Holding` at its current node and reports false;
    /// the caller logs the anomaly instead of erroring mid-tick.
    pub fn assign_goal(&mut self, goal: ZoneId, mesh: &NavMesh, zones: &ZoneGraph) -> bool {
        self.goal_zone = Some(goal);
        self.focus_zone = Some(goal);
        let target_node = mesh.nearest_node(zones.centroid(goal));
        let path = mesh.path(self.node, target_node);
        if path.is_empty() && self.node != target_node {
            self.state = BotState::Holding;
            return false;
        }
        self.path = path.into();
        self.state = if self.path.is_empty() { BotState::Holding } else { BotState::Navigating };
        true
    }

    /// Consumes one waypoint. Returns the node reached, or None when the
    /// path is exhausted (the bot transitions to `Holding`).
    pub fn advance_path(&mut self, mesh: &NavMesh, zones: &ZoneGraph) -> Option<NodeId> {
        match self.path.pop_front() {
            Some(next) => {
                self.node = next;
                self.pos = mesh.position(next);
                self.zone = zones.nearest_zone(self.pos);
                if self.path.is_empty() {
                    self.state = BotState::Holding;
                }
                Some(next)
            }
            None => {
                self.state = BotState::Holding;
                None
            }
        }
    }

    pub fn begin_engage(&mut self, target: BotId) {
        if self.is_alive() {
            self.state = BotState::Engaging { target };
        }
    }

    /// Contact over: back to navigating if a path remains, else hold.
    pub fn disengage(&mut self) {
        if !self.is_alive() {
            return;
        }
        self.state = if self.path.is_empty() { BotState::Holding } else { BotState::Navigating };
    }

    pub fn at_goal(&self) -> bool {
        self.goal_zone == Some(self.zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::{MapDefinition, NavMeshDefinition, NavNodeDefinition, ZoneDefinition};

    fn fixture() -> (NavMesh, ZoneGraph) {
        let mesh = NavMesh::from_definition(&NavMeshDefinition {
            nodes: vec![
                NavNodeDefinition { id: 0, x: 0.0, y: 0.0, neighbors: vec![1], cover: 0.0 },
                NavNodeDefinition { id: 1, x: 10.0, y: 0.0, neighbors: vec![2], cover: 0.0 },
                NavNodeDefinition { id: 2, x: 20.0, y: 0.0, neighbors: vec![], cover: 0.0 },
                NavNodeDefinition { id: 3, x: 90.0, y: 90.0, neighbors: vec![], cover: 0.0 },
            ],
            visibility: Some(vec![]),
            walls: vec![],
        })
        .unwrap();
        let zones = ZoneGraph::from_definition(&MapDefinition {
            name: "fixture".into(),
            zones: vec![
                ZoneDefinition { name: "T Spawn".into(), x: 0.0, y: 0.0, connections: vec!["Target".into()] },
                ZoneDefinition { name: "Target".into(), x: 20.0, y: 0.0, connections: vec![] },
                ZoneDefinition { name: "Island".into(), x: 90.0, y: 90.0, connections: vec![] },
            ],
            plant_zones: vec!["Target".into()],
            t_spawn: "T Spawn".into(),
            ct_spawn: "Target".into(),
        })
        .unwrap();
        (mesh, zones)
    }

    fn test_bot(mesh: &NavMesh) -> Bot {
        let record = PlayerRecord {
            name: "bot".into(),
            side: TeamSide::T,
            attributes: CombatAttributes::uniform(60),
            starting_money: 800,
        };
        Bot::from_record(0, &record, 0, 0, mesh)
    }

    #[test]
    fn test_path_of_length_n_takes_n_advances() {
        let (mesh, zones) = fixture();
        let mut bot = test_bot(&mesh);
        let goal = zones.zone_id("Target").unwrap();
        assert!(bot.assign_goal(goal, &mesh, &zones));
        let n = bot.path.len();
        assert_eq!(n, 2);
        for _ in 0..n {
            bot.advance_path(&mesh, &zones);
        }
        assert!(bot.at_goal());
        assert_eq!(bot.state, BotState::Holding);
    }

    #[test]
    fn test_unreachable_goal_degrades_to_holding() {
        let (mesh, zones) = fixture();
        let mut bot = test_bot(&mesh);
        let island = zones.zone_id("Island").unwrap();
        assert!(!bot.assign_goal(island, &mesh, &zones));
        assert_eq!(bot.state, BotState::Holding);
    }

    #[test]
    fn test_dead_iff_zero_hp() {
        let (mesh, _zones) = fixture();
        let mut bot = test_bot(&mesh);
        assert!(!bot.take_damage(99));
        assert_eq!(bot.hp, 1);
        assert!(bot.is_alive());
        assert!(bot.take_damage(500));
        assert_eq!(bot.hp, 0);
        assert_eq!(bot.state, BotState::Dead);
        // Further damage on a corpse is a no-op.
        assert!(!bot.take_damage(50));
    }

    #[test]
    fn test_round_reset_strips_dead_keeps_survivors() {
        let (mesh, _zones) = fixture();
        let mut dead = test_bot(&mesh);
        dead.inventory.primary = Some(Weapon::Rifle);
        dead.take_damage(200);
        dead.reset_for_round(0, 0, &mesh);
        assert_eq!(dead.hp, MAX_HP);
        assert_eq!(dead.inventory.primary, None);

        let mut alive = test_bot(&mesh);
        alive.inventory.primary = Some(Weapon::Rifle);
        alive.take_damage(40);
        alive.reset_for_round(0, 0, &mesh);
        assert_eq!(alive.hp, MAX_HP);
        assert_eq!(alive.inventory.primary, Some(Weapon::Rifle));
    }
}
