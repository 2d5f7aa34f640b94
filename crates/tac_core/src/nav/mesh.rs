//! Fine-grained walkability and line-of-sight graph.
//!
//! Built once from a serialized definition at load time and read-only for
//! the rest of the match: every per-bot decision in a tick may query it
//! without synchronization. Adjacency and visibility are symmetrized during
//! construction, so both relations are symmetric by the time queries run.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

pub type NodeId = usize;

/// One node of the serialized mesh definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavNodeDefinition {
    pub id: NodeId,
    pub x: f32,
    pub y: f32,
    pub neighbors: Vec<NodeId>,
    /// Cover quality at this node, 0.0 (open) .. 1.0 (full cover).
    #[serde(default)]
    pub cover: f32,
}

/// Opaque static obstacle used only for line-of-sight precomputation when
/// the definition does not ship explicit visibility pairs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Wall {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// Serialized mesh: nodes plus either explicit visibility pairs or wall
/// segments to precompute them from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavMeshDefinition {
    pub nodes: Vec<NavNodeDefinition>,
    #[serde(default)]
    pub visibility: Option<Vec<(NodeId, NodeId)>>,
    #[serde(default)]
    pub walls: Vec<Wall>,
}

/// Immutable spatial graph answering path, nearest-node and visibility
/// queries in the hot tick loop.
#[derive(Debug, Clone)]
pub struct NavMesh {
    positions: Vec<(f32, f32)>,
    adjacency: Vec<Vec<NodeId>>,
    cover: Vec<f32>,
    /// Dense symmetric matrix; O(1) lookups after load.
    visible: Vec<Vec<bool>>,
}

impl NavMesh {
    /// Builds and validates the mesh. Malformed input (dangling node ids,
    /// non-contiguous ids) is fatal here, never silently skipped.
    pub fn from_definition(def: &NavMeshDefinition) -> Result<Self> {
        let n = def.nodes.len();
        if n == 0 {
            return Err(SimError::DataIntegrity("nav mesh has no nodes".into()));
        }
        for (index, node) in def.nodes.iter().enumerate() {
            if node.id != index {
                return Err(SimError::DataIntegrity(format!(
                    "nav node ids must be contiguous: expected {}, found {}",
                    index, node.id
                )));
            }
        }

        let positions: Vec<(f32, f32)> = def.nodes.iter().map(|node| (node.x, node.y)).collect();
        let cover: Vec<f32> = def.nodes.iter().map(|node| node.cover.clamp(0.0, 1.0)).collect();

        let mut adjacency = vec![Vec::new(); n];
        for node in &def.nodes {
            for &neighbor in &node.neighbors {
                if neighbor >= n {
                    return Err(SimError::DataIntegrity(format!(
                        "nav node {} references missing neighbor {}",
                        node.id, neighbor
                    )));
                }
                if neighbor == node.id {
                    continue;
                }
                push_unique(&mut adjacency[node.id], neighbor);
                push_unique(&mut adjacency[neighbor], node.id);
            }
        }

        let visible = match &def.visibility {
            Some(pairs) => {
                let mut matrix = vec![vec![false; n]; n];
                for &(a, b) in pairs {
                    if a >= n || b >= n {
                        return Err(SimError::DataIntegrity(format!(
                            "visibility pair ({}, {}) references a missing node",
                            a, b
                        )));
                    }
                    matrix[a][b] = true;
                    matrix[b][a] = true;
                }
                for (id, row) in matrix.iter_mut().enumerate() {
                    row[id] = true;
                }
                matrix
            }
            None => precompute_visibility(&positions, &def.walls),
        };

        Ok(Self { positions, adjacency, cover, visible })
    }

    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    pub fn position(&self, node: NodeId) -> (f32, f32) {
        self.positions[node]
    }

    pub fn cover(&self, node: NodeId) -> f32 {
        self.cover[node]
    }

    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        &self.adjacency[node]
    }

    /// Symmetric line-of-sight predicate, O(1).
    pub fn is_visible(&self, a: NodeId, b: NodeId) -> bool {
        self.visible[a][b]
    }

    /// Index of the node closest to an arbitrary point.
    pub fn nearest_node(&self, point: (f32, f32)) -> NodeId {
        let mut best = 0;
        let mut best_dist = f32::INFINITY;
        for (id, &pos) in self.positions.iter().enumerate() {
            let d = distance(point, pos);
            if d < best_dist {
                best_dist = d;
                best = id;
            }
        }
        best
    }

    /// Shortest walkable path, Dijkstra over distance-weighted edges.
    ///
    /// Returns the node sequence from `from` (exclusive) to `to` (inclusive);
    /// empty when `from == to` or when the nodes are disconnected. The caller
    /// distinguishes the two cases by comparing endpoints.
    pub fn path(&self, from: NodeId, to: NodeId) -> Vec<NodeId> {
        if from == to {
            return Vec::new();
        }
        let n = self.positions.len();
        let mut dist = vec![f32::INFINITY; n];
        let mut prev: Vec<Option<NodeId>> = vec![None; n];
        let mut heap: BinaryHeap<Reverse<(ordered::F32, NodeId)>> = BinaryHeap::new();
        dist[from] = 0.0;
        heap.push(Reverse((ordered::F32(0.0), from)));

        while let Some(Reverse((ordered::F32(d), node))) = heap.pop() {
            if node == to {
                break;
            }
            if d > dist[node] {
                continue;
            }
            for &next in &self.adjacency[node] {
                let step = distance(self.positions[node], self.positions[next]);
                let candidate = d + step;
                if candidate < dist[next] {
                    dist[next] = candidate;
                    prev[next] = Some(node);
                    heap.push(Reverse((ordered::F32(candidate), next)));
                }
            }
        }

        if dist[to].is_infinite() {
            return Vec::new();
        }
        let mut path = vec![to];
        let mut cursor = to;
        while let Some(parent) = prev[cursor] {
            if parent == from {
                break;
            }
            path.push(parent);
            cursor = parent;
        }
        path.reverse();
        path
    }
}

fn push_unique(list: &mut Vec<NodeId>, value: NodeId) {
    if !list.contains(&value) {
        list.push(value);
    }
}

pub(crate) fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// Pairwise segment test against the wall set. Quadratic in node count but
/// runs once at load time.
fn precompute_visibility(positions: &[(f32, f32)], walls: &[Wall]) -> Vec<Vec<bool>> {
    let n = positions.len();
    let mut matrix = vec![vec![false; n]; n];
    for a in 0..n {
        matrix[a][a] = true;
        for b in (a + 1)..n {
            let clear = walls
                .iter()
                .all(|wall| !segments_intersect(positions[a], positions[b], (wall.x1, wall.y1), (wall.x2, wall.y2)));
            matrix[a][b] = clear;
            matrix[b][a] = clear;
        }
    }
    matrix
}

fn orientation(p: (f32, f32), q: (f32, f32), r: (f32, f32)) -> f32 {
    (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
}

fn segments_intersect(a1: (f32, f32), a2: (f32, f32), b1: (f32, f32), b2: (f32, f32)) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);
    (d1 * d2 < 0.0) && (d3 * d4 < 0.0)
}

/// f32 wrapper with a total order for the Dijkstra heap. Edge weights are
/// finite distances, so the NaN case cannot occur in practice.
mod ordered {
    #[derive(PartialEq, PartialOrd)]
    pub struct F32(pub f32);

    impl Eq for F32 {}

    #[allow(clippy::derive_ord_xor_partial_ord)]
    impl Ord for F32 {
        fn cmp(&self, other: &Self) -> std::cmp::Ordering {
            self.partial_cmp(other).unwrap_or(std::cmp::Ordering::Equal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0 - 1 - 2
    ///     |
    ///     3   4 (isolated)
    fn test_mesh() -> NavMesh {
        let def = NavMeshDefinition {
            nodes: vec![
                NavNodeDefinition { id: 0, x: 0.0, y: 0.0, neighbors: vec![1], cover: 0.2 },
                NavNodeDefinition { id: 1, x: 10.0, y: 0.0, neighbors: vec![2, 3], cover: 0.0 },
                NavNodeDefinition { id: 2, x: 20.0, y: 0.0, neighbors: vec![], cover: 0.8 },
                NavNodeDefinition { id: 3, x: 10.0, y: 10.0, neighbors: vec![], cover: 0.5 },
                NavNodeDefinition { id: 4, x: 99.0, y: 99.0, neighbors: vec![], cover: 0.0 },
            ],
            visibility: Some(vec![(0, 1), (1, 2), (1, 3)]),
            walls: vec![],
        };
        NavMesh::from_definition(&def).unwrap()
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        let mesh = test_mesh();
        for a in 0..mesh.node_count() {
            for &b in mesh.neighbors(a) {
                assert!(mesh.neighbors(b).contains(&a), "adjacency {}->{} not mirrored", a, b);
            }
        }
    }

    #[test]
    fn test_visibility_is_symmetric() {
        let mesh = test_mesh();
        for a in 0..mesh.node_count() {
            for b in 0..mesh.node_count() {
                assert_eq!(mesh.is_visible(a, b), mesh.is_visible(b, a));
            }
        }
    }

    #[test]
    fn test_path_follows_graph() {
        let mesh = test_mesh();
        assert_eq!(mesh.path(0, 2), vec![1, 2]);
        assert_eq!(mesh.path(0, 3), vec![1, 3]);
        assert!(mesh.path(2, 2).is_empty());
    }

    #[test]
    fn test_disconnected_path_is_empty() {
        let mesh = test_mesh();
        assert!(mesh.path(0, 4).is_empty());
    }

    #[test]
    fn test_nearest_node() {
        let mesh = test_mesh();
        assert_eq!(mesh.nearest_node((9.0, 1.0)), 1);
        assert_eq!(mesh.nearest_node((100.0, 100.0)), 4);
    }

    #[test]
    fn test_dangling_neighbor_is_fatal() {
        let def = NavMeshDefinition {
            nodes: vec![NavNodeDefinition { id: 0, x: 0.0, y: 0.0, neighbors: vec![7], cover: 0.0 }],
            visibility: None,
            walls: vec![],
        };
        assert!(NavMesh::from_definition(&def).is_err());
    }

    #[test]
    fn test_wall_blocks_precomputed_visibility() {
        let def = NavMeshDefinition {
            nodes: vec![
                NavNodeDefinition { id: 0, x: 0.0, y: 0.0, neighbors: vec![1], cover: 0.0 },
                NavNodeDefinition { id: 1, x: 10.0, y: 0.0, neighbors: vec![], cover: 0.0 },
                NavNodeDefinition { id: 2, x: 5.0, y: 10.0, neighbors: vec![0, 1], cover: 0.0 },
            ],
            visibility: None,
            walls: vec![Wall { x1: 5.0, y1: -5.0, x2: 5.0, y2: 5.0 }],
        };
        let mesh = NavMesh::from_definition(&def).unwrap();
        assert!(!mesh.is_visible(0, 1), "wall between 0 and 1");
        assert!(mesh.is_visible(0, 2), "no wall between 0 and 2");
        assert!(mesh.is_visible(1, 2));
    }
}
