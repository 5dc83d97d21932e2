//! Deterministic procedural generation core for city districts and
//! building interiors: seeded randomness, topology graphs, binary space
//! partitioning, and the district composition pipeline.

pub mod bsp;
pub mod district;
pub mod graph;
pub mod grid;
pub mod rng;
pub mod types;

pub use bsp::{BspConfig, BspCorridor, BspLayout, BspRoom, SpacePartitioner};
pub use district::{
    DistrictArchetype, DistrictComposer, DistrictConfig, DistrictCorridor, DistrictMetadata,
    DoorKind, GeneratedDistrict, PlacementSummary, RoomInstance, RoomType, ValidationReport,
    generate_district,
};
pub use graph::{GraphError, GraphSnapshot, LayoutGraph};
pub use grid::TileGrid;
pub use rng::DeterministicRng;
pub use types::{GenerationError, Pos, Rotation, Tile};
