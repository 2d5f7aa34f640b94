pub mod mesh;
pub mod zones;

pub use mesh::{NavMesh, NavMeshDefinition, NavNodeDefinition, NodeId, Wall};
pub use zones::{MapDefinition, ZoneDefinition, ZoneGraph, ZoneId};
