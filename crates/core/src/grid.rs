//! Row-major tile grid consumed by interior generation and district
//! compositing.
//!
//! Reads outside the bounds return `Tile::Empty` and writes outside the
//! bounds report failure instead of panicking, so callers can stamp and
//! carve without pre-clipping.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::types::{Pos, Tile};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersistedGrid", into = "PersistedGrid")]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

/// Packed wire form: one byte code per tile, row-major.
#[derive(Serialize, Deserialize)]
struct PersistedGrid {
    width: usize,
    height: usize,
    tiles: Vec<u8>,
}

impl From<TileGrid> for PersistedGrid {
    fn from(grid: TileGrid) -> Self {
        PersistedGrid {
            width: grid.width,
            height: grid.height,
            tiles: grid.tiles.iter().map(|tile| tile.code()).collect(),
        }
    }
}

impl TryFrom<PersistedGrid> for TileGrid {
    type Error = String;

    fn try_from(persisted: PersistedGrid) -> Result<Self, String> {
        if persisted.width == 0 || persisted.height == 0 {
            return Err("grid dimensions must be positive".to_string());
        }
        if persisted.tiles.len() != persisted.width * persisted.height {
            return Err(format!(
                "serialized tile count {} does not match {}x{}",
                persisted.tiles.len(),
                persisted.width,
                persisted.height
            ));
        }
        Ok(TileGrid {
            width: persisted.width,
            height: persisted.height,
            tiles: persisted.tiles.into_iter().map(Tile::from_code).collect(),
        })
    }
}

impl TileGrid {
    /// Create a grid filled with `Tile::Empty`.
    ///
    /// Panics if either dimension is zero; grids always cover at least one
    /// tile.
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be positive");
        Self { width, height, tiles: vec![Tile::Empty; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Tile at the coordinate, or `Tile::Empty` when out of bounds.
    pub fn tile(&self, x: i32, y: i32) -> Tile {
        if !self.in_bounds(x, y) {
            return Tile::Empty;
        }
        self.tiles[(y as usize) * self.width + (x as usize)]
    }

    /// Write a tile; returns whether the coordinate was inside the grid.
    pub fn set_tile(&mut self, x: i32, y: i32, tile: Tile) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        self.tiles[(y as usize) * self.width + (x as usize)] = tile;
        true
    }

    pub fn fill(&mut self, tile: Tile) {
        self.tiles.fill(tile);
    }

    /// Fill a rectangle, silently clipping the parts outside the grid.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, tile: Tile) {
        for dy in 0..h {
            for dx in 0..w {
                self.set_tile(x + dx, y + dy, tile);
            }
        }
    }

    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).is_walkable()
    }

    /// Maximal 4-connected groups of walkable tiles, discovered in scan
    /// order. Used by district validation to detect unreachable pockets.
    pub fn find_connected_regions(&self) -> Vec<Vec<Pos>> {
        let mut visited = vec![false; self.width * self.height];
        let mut regions = Vec::new();

        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let index = (y as usize) * self.width + (x as usize);
                if visited[index] || !self.is_walkable(x, y) {
                    continue;
                }

                let mut region = Vec::new();
                let mut open = VecDeque::from([Pos { y, x }]);
                visited[index] = true;

                while let Some(pos) = open.pop_front() {
                    region.push(pos);
                    for next in pos.neighbors4() {
                        if !self.in_bounds(next.x, next.y) || !self.is_walkable(next.x, next.y) {
                            continue;
                        }
                        let next_index = (next.y as usize) * self.width + (next.x as usize);
                        if !visited[next_index] {
                            visited[next_index] = true;
                            open.push_back(next);
                        }
                    }
                }

                regions.push(region);
            }
        }

        regions
    }
}
