//! Built-in demo map and roster.
//!
//! A compact two-site layout good enough to exercise every system: two
//! plant sites, a contested mid, a long flank and a tunnel route. Real
//! deployments load maps and rosters from JSON through the same
//! definition types; this one exists so the engine runs out of the box.

use crate::error::Result;
use crate::models::{CombatAttributes, PlayerRecord, Roster, TeamSide};
use crate::nav::{
    MapDefinition, NavMesh, NavMeshDefinition, NavNodeDefinition, ZoneDefinition, ZoneGraph,
};

pub const DEMO_MAP_NAME: &str = "Crossfire";

fn zone(name: &str, x: f32, y: f32, connections: &[&str]) -> ZoneDefinition {
    ZoneDefinition {
        name: name.to_string(),
        x,
        y,
        connections: connections.iter().map(|s| s.to_string()).collect(),
    }
}

/// Zone graph of the demo map. Connections are declared one way and
/// symmetrized on load.
pub fn demo_map() -> Result<ZoneGraph> {
    let def = MapDefinition {
        name: DEMO_MAP_NAME.to_string(),
        zones: vec![
            zone("T Spawn", 100.0, 600.0, &["Mid", "Long A", "B Tunnels"]),
            zone("B Tunnels", 150.0, 350.0, &["B Site"]),
            zone("Mid", 400.0, 450.0, &["Short A", "CT Spawn"]),
            zone("Long A", 650.0, 600.0, &["A Site"]),
            zone("Short A", 550.0, 350.0, &["A Site"]),
            zone("A Site", 750.0, 300.0, &["CT Spawn"]),
            zone("B Site", 150.0, 120.0, &["CT Spawn"]),
            zone("CT Spawn", 500.0, 120.0, &[]),
        ],
        plant_zones: vec!["A Site".to_string(), "B Site".to_string()],
        t_spawn: "T Spawn".to_string(),
        ct_spawn: "CT Spawn".to_string(),
    };
    ZoneGraph::from_definition(&def)
}

fn node(id: usize, x: f32, y: f32, neighbors: &[usize], cover: f32) -> NavNodeDefinition {
    NavNodeDefinition { id, x, y, neighbors: neighbors.to_vec(), cover }
}

/// Walkability mesh of the demo map, with hand-listed sight lines.
///
/// Node layout:
/// ```text
///   4 (B Site)          9 (CT Spawn)
///   |             8 /        \ 13 (A Site)
///   3             7          /    | \
///   2 (Tunnels)   6 (Mid)  15     |  12
///   |             5        14 (Short)  \
///   1            /   \______/          11 (Long A)
///   0 (T Spawn) ------- 10 -----------/
/// ```
pub fn demo_mesh() -> Result<NavMesh> {
    let def = NavMeshDefinition {
        nodes: vec![
            node(0, 100.0, 600.0, &[1, 5, 10], 0.3),
            node(1, 140.0, 480.0, &[2], 0.1),
            node(2, 150.0, 350.0, &[3], 0.2),
            node(3, 150.0, 230.0, &[4], 0.1),
            node(4, 150.0, 120.0, &[9], 0.6),
            node(5, 300.0, 520.0, &[6], 0.1),
            node(6, 400.0, 450.0, &[7, 14], 0.2),
            node(7, 430.0, 300.0, &[8], 0.2),
            node(8, 470.0, 200.0, &[9], 0.1),
            node(9, 500.0, 120.0, &[13], 0.3),
            node(10, 400.0, 620.0, &[11], 0.0),
            node(11, 650.0, 600.0, &[12], 0.2),
            node(12, 760.0, 480.0, &[13], 0.4),
            node(13, 750.0, 300.0, &[], 0.6),
            node(14, 550.0, 350.0, &[15], 0.3),
            node(15, 640.0, 330.0, &[13], 0.2),
        ],
        // Adjacent nodes see each other, plus the long unbroken lines.
        visibility: Some(vec![
            (0, 1),
            (0, 5),
            (0, 10),
            (1, 2),
            (2, 3),
            (3, 4),
            (4, 9),
            (5, 6),
            (5, 7),
            (6, 7),
            (6, 8),
            (6, 14),
            (7, 8),
            (8, 9),
            (9, 13),
            (10, 11),
            (10, 12),
            (11, 12),
            (12, 13),
            (13, 14),
            (13, 15),
            (14, 15),
        ]),
        walls: vec![],
    };
    NavMesh::from_definition(&def)
}

fn player(name: &str, side: TeamSide, aim: u8, reaction: u8, consistency: u8, awareness: u8) -> PlayerRecord {
    PlayerRecord {
        name: name.to_string(),
        side,
        attributes: CombatAttributes { aim, reaction, consistency, awareness },
        starting_money: crate::engine::constants::economy::START_MONEY,
    }
}

/// Ten demo players with spread-out attribute profiles: a star, a sniper
/// type with high aim and low consistency, solid fraggers, an anchor.
pub fn demo_roster() -> Roster {
    Roster {
        players: vec![
            player("Viper", TeamSide::T, 82, 78, 70, 65),
            player("Havoc", TeamSide::T, 74, 80, 58, 55),
            player("Mirage", TeamSide::T, 68, 62, 75, 72),
            player("Rook", TeamSide::T, 60, 58, 66, 80),
            player("Dagger", TeamSide::T, 71, 69, 62, 60),
            player("Sentinel", TeamSide::Ct, 79, 72, 74, 70),
            player("Frost", TeamSide::Ct, 85, 66, 52, 61),
            player("Warden", TeamSide::Ct, 64, 60, 78, 76),
            player("Echo", TeamSide::Ct, 70, 74, 63, 58),
            player("Talon", TeamSide::Ct, 66, 71, 68, 66),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamSide;

    #[test]
    fn test_demo_map_loads() {
        let zones = demo_map().unwrap();
        assert_eq!(zones.map_name, DEMO_MAP_NAME);
        assert_eq!(zones.plant_zones().len(), 2);
        assert!(zones.zone_id("Mid").is_some());
    }

    #[test]
    fn test_demo_roster_is_valid_5v5() {
        let roster = demo_roster();
        assert!(roster.validate().is_ok());
        assert_eq!(roster.players.len(), 10);
    }

    #[test]
    fn test_demo_map_covers_all_tactic_targets() {
        let zones = demo_map().unwrap();
        let tactics_t = [
            crate::engine::tactics::TTactic::Default,
            crate::engine::tactics::TTactic::RushA,
            crate::engine::tactics::TTactic::RushB,
            crate::engine::tactics::TTactic::ExecuteA,
            crate::engine::tactics::TTactic::ExecuteB,
            crate::engine::tactics::TTactic::SplitA,
            crate::engine::tactics::TTactic::SplitB,
            crate::engine::tactics::TTactic::ContactA,
            crate::engine::tactics::TTactic::ContactB,
        ];
        for tactic in tactics_t {
            for role in crate::engine::tactics::roles_for_t(tactic) {
                assert!(
                    zones.zone_id(role.target_zone).is_some(),
                    "{:?} targets unknown zone {}",
                    tactic,
                    role.target_zone
                );
            }
        }
        let tactics_ct = [
            crate::engine::tactics::CtTactic::Standard,
            crate::engine::tactics::CtTactic::AggressivePush,
            crate::engine::tactics::CtTactic::GambleStackA,
            crate::engine::tactics::CtTactic::GambleStackB,
            crate::engine::tactics::CtTactic::RetakeSetup,
        ];
        for tactic in tactics_ct {
            for role in crate::engine::tactics::roles_for_ct(tactic) {
                assert!(zones.zone_id(role.target_zone).is_some());
            }
        }
    }

    #[test]
    fn test_demo_mesh_is_fully_connected() {
        let mesh = demo_mesh().unwrap();
        for node in 1..mesh.node_count() {
            assert!(!mesh.path(0, node).is_empty(), "node {} unreachable from spawn", node);
        }
    }

    #[test]
    fn test_both_sites_reachable_from_both_spawns() {
        let mesh = demo_mesh().unwrap();
        let zones = demo_map().unwrap();
        for spawn in [zones.t_spawn(), zones.ct_spawn()] {
            let from = mesh.nearest_node(zones.centroid(spawn));
            for &site in zones.plant_zones() {
                let to = mesh.nearest_node(zones.centroid(site));
                assert!(from == to || !mesh.path(from, to).is_empty());
            }
        }
    }

    #[test]
    fn test_zone_centroids_resolve_to_distinct_nodes() {
        let mesh = demo_mesh().unwrap();
        let zones = demo_map().unwrap();
        let mut seen = std::collections::HashSet::new();
        for zone in 0..zones.zone_count() {
            seen.insert(mesh.nearest_node(zones.centroid(zone)));
        }
        assert_eq!(seen.len(), zones.zone_count(), "zones must not collapse onto one node");
    }

    #[test]
    fn test_sides_split_evenly() {
        let roster = demo_roster();
        let t = roster.players.iter().filter(|p| p.side == TeamSide::T).count();
        assert_eq!(t, 5);
    }
}
