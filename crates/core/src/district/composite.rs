//! Final compositing: stamp rotated interiors onto the district grid, carve
//! corridors, then hand the grid to the seam painter.

use crate::grid::TileGrid;
use crate::types::{Pos, Rotation, Tile};

use super::DistrictConfig;
use super::collab::{
    SeamContext, SeamPainter, TileTransformer, TransformedTiles, VariantRequest, VariantResolver,
};
use super::model::{DistrictCorridor, PlacementSummary, RoomInstance};

pub(super) struct CompositeInput<'a> {
    pub config: &'a DistrictConfig,
    pub rooms: &'a [RoomInstance],
    pub corridors: &'a [DistrictCorridor],
    pub variants: &'a dyn VariantResolver,
    pub transformer: &'a dyn TileTransformer,
    pub seam_painter: &'a dyn SeamPainter,
}

pub(super) struct CompositeOutput {
    pub grid: TileGrid,
    pub placements: Vec<PlacementSummary>,
    pub warnings: Vec<String>,
}

/// Composite every room and corridor onto a fresh district grid.
///
/// Collaborator failures never abort the run: a failed variant resolution
/// falls back to the base interior, a failed transform falls back to the
/// untransformed interior at identity rotation, and out-of-bounds stamps
/// are clipped by the grid itself.
pub(super) fn composite_district(input: &CompositeInput<'_>) -> CompositeOutput {
    let mut grid = TileGrid::new(
        input.config.district_width as usize,
        input.config.district_height as usize,
    );
    grid.fill(Tile::Empty);

    let mut placements = Vec::with_capacity(input.rooms.len());
    let mut warnings = Vec::new();

    for room in input.rooms {
        let request = VariantRequest {
            room_id: &room.id,
            room_type: room.room_type,
            grid: &room.interior,
            rotation: room.rotation,
        };
        let (resolved_grid, resolved_rotation, variant_id, strategy, seams) =
            match input.variants.resolve(&request) {
                Ok(resolution) => (
                    resolution.grid,
                    resolution.rotation,
                    resolution.variant_id,
                    resolution.strategy,
                    resolution.seams,
                ),
                Err(error) => {
                    warnings.push(format!(
                        "variant resolution failed for {}; using base interior: {}",
                        room.id, error.message
                    ));
                    (room.interior.clone(), room.rotation, None, "rotate".to_string(), Vec::new())
                }
            };

        let (transformed, stamped_rotation) =
            match input.transformer.transform(&resolved_grid, resolved_rotation) {
                Ok(transformed) => (transformed, resolved_rotation),
                Err(error) => {
                    warnings.push(format!(
                        "tile transform failed for {}; stamping untransformed interior: {}",
                        room.id, error.message
                    ));
                    (identity_tiles(&resolved_grid), Rotation::R0)
                }
            };

        for &(local_x, local_y, tile) in &transformed.tiles {
            grid.set_tile(room.x + local_x, room.y + local_y, tile);
        }

        placements.push(PlacementSummary {
            room_id: room.id.clone(),
            room_type: room.room_type,
            position: Pos { y: room.y, x: room.x },
            stamped_width: transformed.width,
            stamped_height: transformed.height,
            rotation: stamped_rotation,
            variant_id,
            variant_strategy: strategy,
            seams,
        });
    }

    // Corridors never overwrite room interiors, only empty ground and walls.
    for corridor in input.corridors {
        for tile in &corridor.tiles {
            let current = grid.tile(tile.x, tile.y);
            if current == Tile::Empty || current == Tile::Wall {
                grid.set_tile(tile.x, tile.y, Tile::Floor);
            }
        }
    }

    let context = SeamContext { corridors: input.corridors, placements: &placements };
    input.seam_painter.paint(&mut grid, &context);

    CompositeOutput { grid, placements, warnings }
}

fn identity_tiles(grid: &TileGrid) -> TransformedTiles {
    let width = grid.width() as i32;
    let height = grid.height() as i32;
    let mut tiles = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            tiles.push((x, y, grid.tile(x, y)));
        }
    }
    TransformedTiles { width, height, tiles }
}
