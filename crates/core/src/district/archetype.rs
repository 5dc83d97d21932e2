//! Semantic room types and per-archetype room count tables.

use serde::{Deserialize, Serialize};

/// Semantic room types a district is composed of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    DetectiveOffice,
    CrimeScene,
    Apartment,
    Office,
    Street,
    Alley,
    Warehouse,
    Shop,
    Restaurant,
    Rooftop,
}

impl RoomType {
    /// Table order; node ids are assigned in this order.
    pub const ALL: [RoomType; 10] = [
        RoomType::DetectiveOffice,
        RoomType::CrimeScene,
        RoomType::Apartment,
        RoomType::Office,
        RoomType::Street,
        RoomType::Alley,
        RoomType::Warehouse,
        RoomType::Shop,
        RoomType::Restaurant,
        RoomType::Rooftop,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RoomType::DetectiveOffice => "detective_office",
            RoomType::CrimeScene => "crime_scene",
            RoomType::Apartment => "apartment",
            RoomType::Office => "office",
            RoomType::Street => "street",
            RoomType::Alley => "alley",
            RoomType::Warehouse => "warehouse",
            RoomType::Shop => "shop",
            RoomType::Restaurant => "restaurant",
            RoomType::Rooftop => "rooftop",
        }
    }

    pub fn from_str_tag(tag: &str) -> Option<RoomType> {
        RoomType::ALL.into_iter().find(|room_type| room_type.as_str() == tag)
    }

    /// Building types get a partitioned interior; everything else is laid
    /// out as a simple bordered outdoor rectangle.
    pub fn is_building(self) -> bool {
        matches!(
            self,
            RoomType::DetectiveOffice
                | RoomType::Apartment
                | RoomType::Office
                | RoomType::Warehouse
                | RoomType::Shop
                | RoomType::Restaurant
        )
    }

    /// Streets and alleys never get locked doors.
    pub fn is_open_passage(self) -> bool {
        matches!(self, RoomType::Street | RoomType::Alley)
    }
}

/// Door classification carried on graph edges as the `door_type` tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorKind {
    Main,
    Locked,
}

impl DoorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DoorKind::Main => "main",
            DoorKind::Locked => "locked",
        }
    }
}

/// District flavor selecting the default room mix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistrictArchetype {
    Residential,
    Commercial,
    Industrial,
    Mixed,
}

const RESIDENTIAL_COUNTS: [usize; 10] = [1, 2, 20, 3, 8, 6, 1, 4, 2, 3];
const COMMERCIAL_COUNTS: [usize; 10] = [1, 3, 5, 15, 10, 4, 2, 10, 5, 2];
const INDUSTRIAL_COUNTS: [usize; 10] = [1, 3, 3, 8, 7, 8, 12, 3, 1, 4];
const MIXED_COUNTS: [usize; 10] = [1, 3, 15, 10, 8, 5, 4, 6, 3, 2];

impl DistrictArchetype {
    pub fn as_str(self) -> &'static str {
        match self {
            DistrictArchetype::Residential => "residential",
            DistrictArchetype::Commercial => "commercial",
            DistrictArchetype::Industrial => "industrial",
            DistrictArchetype::Mixed => "mixed",
        }
    }

    /// Room counts in `RoomType::ALL` order.
    pub fn room_counts(self) -> Vec<(RoomType, usize)> {
        let counts = match self {
            DistrictArchetype::Residential => RESIDENTIAL_COUNTS,
            DistrictArchetype::Commercial => COMMERCIAL_COUNTS,
            DistrictArchetype::Industrial => INDUSTRIAL_COUNTS,
            DistrictArchetype::Mixed => MIXED_COUNTS,
        };
        RoomType::ALL.into_iter().zip(counts).collect()
    }
}
