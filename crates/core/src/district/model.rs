//! Public data models for generated districts.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::graph::LayoutGraph;
use crate::grid::TileGrid;
use crate::types::{Pos, Rotation};

use super::archetype::{DistrictArchetype, RoomType};

/// One placed room: semantic type, world position of the layout box's
/// top-left corner, rotation, raw interior dimensions, rotated layout
/// dimensions, and the interior grid itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomInstance {
    pub id: String,
    pub room_type: RoomType,
    pub x: i32,
    pub y: i32,
    pub rotation: Rotation,
    pub width: i32,
    pub height: i32,
    pub layout_width: i32,
    pub layout_height: i32,
    pub interior: TileGrid,
}

impl RoomInstance {
    /// Center of the rotated layout bounding box in district coordinates.
    pub fn layout_center(&self) -> Pos {
        Pos { y: self.y + self.layout_height / 2, x: self.x + self.layout_width / 2 }
    }
}

/// A routed connection between two graph-adjacent rooms, in district-global
/// tile coordinates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictCorridor {
    pub from: String,
    pub to: String,
    pub tiles: Vec<Pos>,
}

/// Door seam coordinates and tags reported by a variant resolver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeamMetadata {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub edge: Option<String>,
    #[serde(default)]
    pub door_type: Option<String>,
}

/// Per-room compositing summary for downstream consumers (entity
/// population, seam painting, save inspection).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementSummary {
    pub room_id: String,
    pub room_type: RoomType,
    pub position: Pos,
    pub stamped_width: i32,
    pub stamped_height: i32,
    pub rotation: Rotation,
    pub variant_id: Option<String>,
    pub variant_strategy: String,
    pub seams: Vec<SeamMetadata>,
}

/// Validation outcome. Issues mean the district is structurally wrong for
/// play; warnings flag quality concerns. Neither aborts generation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistrictMetadata {
    pub seed: i64,
    pub archetype: DistrictArchetype,
    /// Wall-clock generation time. Not part of the canonical output.
    pub generation_time_ms: f64,
    pub room_count: usize,
    pub corridor_count: usize,
    /// Room pairs still closer than the configured spacing after the
    /// bounded resolution passes.
    pub unresolved_overlaps: usize,
    /// Recoverable collaborator failures that fell back during compositing.
    pub warnings: Vec<String>,
    pub validation: ValidationReport,
    pub placements: Vec<PlacementSummary>,
}

/// Complete output of one composer run.
#[derive(Clone, Debug)]
pub struct GeneratedDistrict {
    pub graph: LayoutGraph,
    pub rooms: Vec<RoomInstance>,
    pub corridors: Vec<DistrictCorridor>,
    pub grid: TileGrid,
    pub metadata: DistrictMetadata,
}

impl GeneratedDistrict {
    /// Stable byte encoding of everything seed-determined: the composited
    /// grid, room placements, corridor tiles, and topology counts. Timing
    /// and validation text are deliberately excluded.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.grid.width() as u32).to_le_bytes());
        bytes.extend((self.grid.height() as u32).to_le_bytes());
        for y in 0..self.grid.height() as i32 {
            for x in 0..self.grid.width() as i32 {
                bytes.push(self.grid.tile(x, y).code());
            }
        }

        bytes.extend((self.rooms.len() as u32).to_le_bytes());
        for room in &self.rooms {
            bytes.extend((room.id.len() as u32).to_le_bytes());
            bytes.extend(room.id.as_bytes());
            bytes.push(room.room_type as u8);
            bytes.extend(room.x.to_le_bytes());
            bytes.extend(room.y.to_le_bytes());
            bytes.extend(room.rotation.degrees().to_le_bytes());
            bytes.extend(room.width.to_le_bytes());
            bytes.extend(room.height.to_le_bytes());
            bytes.extend(room.layout_width.to_le_bytes());
            bytes.extend(room.layout_height.to_le_bytes());
        }

        bytes.extend((self.corridors.len() as u32).to_le_bytes());
        for corridor in &self.corridors {
            bytes.extend((corridor.tiles.len() as u32).to_le_bytes());
            for tile in &corridor.tiles {
                bytes.extend(tile.x.to_le_bytes());
                bytes.extend(tile.y.to_le_bytes());
            }
        }

        bytes.extend((self.graph.node_count() as u32).to_le_bytes());
        bytes.extend((self.graph.edge_count() as u32).to_le_bytes());
        bytes
    }

    /// xxh3 fingerprint of `canonical_bytes`, for determinism checks and
    /// batch reporting.
    pub fn snapshot_hash(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}
