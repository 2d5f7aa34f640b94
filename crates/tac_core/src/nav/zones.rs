//! Coarse named map areas ("Long A", "Mid") used for tactics and high-level
//! routing. Distinct from the fine NavMesh: a bot has both a mesh node and
//! a current zone, and role targets are expressed in zones.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::nav::mesh::distance;

pub type ZoneId = usize;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneDefinition {
    pub name: String,
    pub x: f32,
    pub y: f32,
    /// Names of directly connected zones.
    pub connections: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDefinition {
    pub name: String,
    pub zones: Vec<ZoneDefinition>,
    /// Zone names where the T side may plant the bomb.
    pub plant_zones: Vec<String>,
    pub t_spawn: String,
    pub ct_spawn: String,
}

/// Validated zone graph. Read-only once built.
#[derive(Debug, Clone)]
pub struct ZoneGraph {
    pub map_name: String,
    names: Vec<String>,
    centroids: Vec<(f32, f32)>,
    adjacency: Vec<Vec<ZoneId>>,
    plant_zones: Vec<ZoneId>,
    t_spawn: ZoneId,
    ct_spawn: ZoneId,
    by_name: HashMap<String, ZoneId>,
}

impl ZoneGraph {
    pub fn from_definition(def: &MapDefinition) -> Result<Self> {
        if def.zones.is_empty() {
            return Err(SimError::DataIntegrity(format!("map {} has no zones", def.name)));
        }
        let mut by_name = HashMap::new();
        for (id, zone) in def.zones.iter().enumerate() {
            if by_name.insert(zone.name.clone(), id).is_some() {
                return Err(SimError::DataIntegrity(format!("duplicate zone name {}", zone.name)));
            }
        }

        let resolve = |name: &str| -> Result<ZoneId> {
            by_name.get(name).copied().ok_or_else(|| SimError::UnknownZone(name.to_string()))
        };

        let mut adjacency = vec![Vec::new(); def.zones.len()];
        for (id, zone) in def.zones.iter().enumerate() {
            for connection in &zone.connections {
                let other = resolve(connection)?;
                if other == id {
                    continue;
                }
                if !adjacency[id].contains(&other) {
                    adjacency[id].push(other);
                }
                if !adjacency[other].contains(&id) {
                    adjacency[other].push(id);
                }
            }
        }

        let plant_zones =
            def.plant_zones.iter().map(|name| resolve(name)).collect::<Result<Vec<_>>>()?;
        if plant_zones.is_empty() {
            return Err(SimError::DataIntegrity(format!("map {} has no plant zones", def.name)));
        }

        Ok(Self {
            map_name: def.name.clone(),
            names: def.zones.iter().map(|zone| zone.name.clone()).collect(),
            centroids: def.zones.iter().map(|zone| (zone.x, zone.y)).collect(),
            adjacency,
            plant_zones,
            t_spawn: resolve(&def.t_spawn)?,
            ct_spawn: resolve(&def.ct_spawn)?,
            by_name,
        })
    }

    pub fn zone_count(&self) -> usize {
        self.names.len()
    }

    pub fn name(&self, zone: ZoneId) -> &str {
        &self.names[zone]
    }

    pub fn centroid(&self, zone: ZoneId) -> (f32, f32) {
        self.centroids[zone]
    }

    pub fn zone_id(&self, name: &str) -> Option<ZoneId> {
        self.by_name.get(name).copied()
    }

    pub fn plant_zones(&self) -> &[ZoneId] {
        &self.plant_zones
    }

    pub fn is_plant_zone(&self, zone: ZoneId) -> bool {
        self.plant_zones.contains(&zone)
    }

    pub fn t_spawn(&self) -> ZoneId {
        self.t_spawn
    }

    pub fn ct_spawn(&self) -> ZoneId {
        self.ct_spawn
    }

    /// Zone containing an arbitrary point: the nearest centroid.
    pub fn nearest_zone(&self, point: (f32, f32)) -> ZoneId {
        let mut best = 0;
        let mut best_dist = f32::INFINITY;
        for (id, &centroid) in self.centroids.iter().enumerate() {
            let d = distance(point, centroid);
            if d < best_dist {
                best_dist = d;
                best = id;
            }
        }
        best
    }

    /// BFS route through zone connections, `from` exclusive, `to` inclusive.
    /// Empty when already there or unreachable.
    pub fn zone_path(&self, from: ZoneId, to: ZoneId) -> Vec<ZoneId> {
        if from == to {
            return Vec::new();
        }
        let mut prev: Vec<Option<ZoneId>> = vec![None; self.names.len()];
        let mut queue = VecDeque::new();
        prev[from] = Some(from);
        queue.push_back(from);
        while let Some(zone) = queue.pop_front() {
            if zone == to {
                break;
            }
            for &next in &self.adjacency[zone] {
                if prev[next].is_none() {
                    prev[next] = Some(zone);
                    queue.push_back(next);
                }
            }
        }
        if prev[to].is_none() {
            return Vec::new();
        }
        let mut path = vec![to];
        let mut cursor = to;
        while let Some(parent) = prev[cursor] {
            if parent == from || parent == cursor {
                break;
            }
            path.push(parent);
            cursor = parent;
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(name: &str, x: f32, connections: &[&str]) -> ZoneDefinition {
        ZoneDefinition {
            name: name.to_string(),
            x,
            y: 0.0,
            connections: connections.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn test_map() -> MapDefinition {
        MapDefinition {
            name: "test".to_string(),
            zones: vec![
                zone("T Spawn", 0.0, &["Mid"]),
                zone("Mid", 10.0, &["A Site"]),
                zone("A Site", 20.0, &[]),
                zone("CT Spawn", 30.0, &["A Site"]),
            ],
            plant_zones: vec!["A Site".to_string()],
            t_spawn: "T Spawn".to_string(),
            ct_spawn: "CT Spawn".to_string(),
        }
    }

    #[test]
    fn test_zone_path_routes_through_connections() {
        let graph = ZoneGraph::from_definition(&test_map()).unwrap();
        let t = graph.zone_id("T Spawn").unwrap();
        let a = graph.zone_id("A Site").unwrap();
        let mid = graph.zone_id("Mid").unwrap();
        assert_eq!(graph.zone_path(t, a), vec![mid, a]);
        assert!(graph.zone_path(a, a).is_empty());
    }

    #[test]
    fn test_unknown_connection_is_fatal() {
        let mut map = test_map();
        map.zones[0].connections.push("Nowhere".to_string());
        assert!(matches!(ZoneGraph::from_definition(&map), Err(SimError::UnknownZone(_))));
    }

    #[test]
    fn test_connections_are_symmetric() {
        let graph = ZoneGraph::from_definition(&test_map()).unwrap();
        // "CT Spawn" declared the connection; "A Site" did not.
        let a = graph.zone_id("A Site").unwrap();
        let ct = graph.zone_id("CT Spawn").unwrap();
        assert_eq!(graph.zone_path(a, ct), vec![ct]);
    }

    #[test]
    fn test_nearest_zone() {
        let graph = ZoneGraph::from_definition(&test_map()).unwrap();
        assert_eq!(graph.nearest_zone((11.0, 0.0)), graph.zone_id("Mid").unwrap());
    }
}
