//! Shared primitive types used across the generation pipeline.

use serde::{Deserialize, Serialize};

/// Fatal construction-time contract violations. Generation-time edge cases
/// never surface here; the pipeline degrades gracefully instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationError {
    InvalidConfig(String),
    MapTooSmall { width: i32, height: i32, minimum: i32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub fn manhattan(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The four edge-adjacent neighbors, clockwise from north.
    pub fn neighbors4(self) -> [Pos; 4] {
        [
            Pos { y: self.y - 1, x: self.x },
            Pos { y: self.y, x: self.x + 1 },
            Pos { y: self.y + 1, x: self.x },
            Pos { y: self.y, x: self.x - 1 },
        ]
    }
}

/// Tile byte codes shared by interiors and the composited district grid.
///
/// The discriminants are the on-wire byte values; unknown bytes decode to
/// `Empty` so stale serialized grids never fail to load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tile {
    Empty = 0,
    Floor = 1,
    Wall = 2,
    Door = 3,
    Window = 4,
    StairsUp = 5,
    StairsDown = 6,
    Debris = 7,
    Blood = 8,
    Evidence = 9,
}

impl Tile {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Tile {
        match code {
            1 => Tile::Floor,
            2 => Tile::Wall,
            3 => Tile::Door,
            4 => Tile::Window,
            5 => Tile::StairsUp,
            6 => Tile::StairsDown,
            7 => Tile::Debris,
            8 => Tile::Blood,
            9 => Tile::Evidence,
            _ => Tile::Empty,
        }
    }

    pub fn is_walkable(self) -> bool {
        matches!(self, Tile::Floor | Tile::Door | Tile::StairsUp | Tile::StairsDown)
    }

    pub fn is_solid(self) -> bool {
        self == Tile::Wall
    }
}

/// Quarter-turn rotation applied to room interiors during placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", from = "i32")]
pub enum Rotation {
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }

    /// Normalize an arbitrary angle to the nearest supported quarter turn.
    pub fn from_degrees(degrees: i32) -> Rotation {
        let wrapped = degrees.rem_euclid(360);
        let mut closest = Rotation::R0;
        let mut smallest_diff = i32::MAX;
        for candidate in Rotation::ALL {
            let diff = (candidate.degrees() - wrapped).abs();
            if diff < smallest_diff {
                smallest_diff = diff;
                closest = candidate;
            }
        }
        closest
    }

    /// Whether this rotation swaps the width/height extents of a rectangle.
    pub fn swaps_extents(self) -> bool {
        matches!(self, Rotation::R90 | Rotation::R270)
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> i32 {
        rotation.degrees()
    }
}

impl From<i32> for Rotation {
    fn from(degrees: i32) -> Rotation {
        Rotation::from_degrees(degrees)
    }
}
