//! Per-room interior generation: authored template, partitioned building,
//! or simple bordered outdoor rectangle.

use std::collections::HashMap;

use crate::bsp::{BspConfig, SpacePartitioner};
use crate::graph::LayoutGraph;
use crate::grid::TileGrid;
use crate::rng::DeterministicRng;
use crate::types::{Rotation, Tile};

use super::DistrictConfig;
use super::archetype::RoomType;
use super::collab::TemplateProvider;

/// Partitioning profile for building interiors. `building_min_size` in the
/// district config is validated against this minimum, so interior
/// generation cannot hit the too-small failure path.
const INTERIOR_BSP_CONFIG: BspConfig = BspConfig {
    min_room_size: 6,
    max_room_size: 12,
    corridor_width: 2,
    margin_size: 1,
    split_ratio: [0.35, 0.65],
    max_depth: 3,
};

pub(super) const INTERIOR_MIN_BUILDING_SPAN: i32 = INTERIOR_BSP_CONFIG.min_room_size * 2;

const OUTDOOR_MIN_SIZE: i32 = 8;
const OUTDOOR_MAX_SIZE: i32 = 16;

#[derive(Clone, Debug)]
pub(super) struct InteriorPlan {
    pub room_type: RoomType,
    pub width: i32,
    pub height: i32,
    pub rotation: Rotation,
    pub layout_width: i32,
    pub layout_height: i32,
    pub grid: TileGrid,
}

/// Generate an interior plan for every graph node, in node insertion order.
///
/// Draw order per node is fixed: authored rooms draw a rotation only;
/// buildings draw size, then a child seed for the partitioner, then a
/// rotation; outdoor rooms draw width, height, then a rotation.
pub(super) fn generate_interiors(
    graph: &LayoutGraph,
    config: &DistrictConfig,
    templates: &dyn TemplateProvider,
    rng: &mut DeterministicRng,
) -> HashMap<String, InteriorPlan> {
    let partitioner =
        SpacePartitioner::new(INTERIOR_BSP_CONFIG).expect("interior profile is valid");

    let mut plans = HashMap::new();
    for node in graph.nodes() {
        let room_type = RoomType::from_str_tag(&node.node_type)
            .expect("district nodes carry known room types");

        let plan = if let Some(template) = templates.template_for(room_type) {
            let rotation = *rng.choice(&config.rotation_angles);
            plan_from_grid(room_type, template.grid, rotation)
        } else if room_type.is_building() {
            let span = rng.next_int(config.building_min_size, config.building_max_size);
            // Each building partitions under its own derived generator, so
            // its internal draw count never shifts later rooms.
            let child_seed = (rng.next() * 999_999.0) as i64;
            let layout = partitioner
                .generate(span, span, child_seed)
                .expect("validated building span fits the interior profile");
            let rotation = *rng.choice(&config.rotation_angles);
            plan_from_grid(room_type, layout.grid, rotation)
        } else {
            let width = rng.next_int(OUTDOOR_MIN_SIZE, OUTDOOR_MAX_SIZE);
            let height = rng.next_int(OUTDOOR_MIN_SIZE, OUTDOOR_MAX_SIZE);
            let rotation_grid = outdoor_grid(width, height);
            let rotation = *rng.choice(&config.rotation_angles);
            plan_from_grid(room_type, rotation_grid, rotation)
        };

        plans.insert(node.id.clone(), plan);
    }
    plans
}

fn plan_from_grid(room_type: RoomType, grid: TileGrid, rotation: Rotation) -> InteriorPlan {
    let width = grid.width() as i32;
    let height = grid.height() as i32;
    let (layout_width, layout_height) =
        if rotation.swaps_extents() { (height, width) } else { (width, height) };
    InteriorPlan { room_type, width, height, rotation, layout_width, layout_height, grid }
}

/// Open ground with a one-tile wall boundary.
fn outdoor_grid(width: i32, height: i32) -> TileGrid {
    let mut grid = TileGrid::new(width as usize, height as usize);
    grid.fill(Tile::Floor);
    for x in 0..width {
        grid.set_tile(x, 0, Tile::Wall);
        grid.set_tile(x, height - 1, Tile::Wall);
    }
    for y in 0..height {
        grid.set_tile(0, y, Tile::Wall);
        grid.set_tile(width - 1, y, Tile::Wall);
    }
    grid
}
