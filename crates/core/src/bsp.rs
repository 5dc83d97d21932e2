//! Recursive binary space partitioning for building interiors.
//!
//! A rectangle is split recursively into an arena-backed tree; each leaf may
//! carve an inset room, each internal node may synthesize one L-shaped
//! corridor between its two subtrees, and the result is rasterized onto a
//! tile grid with doors only at room/corridor seams.
//!
//! Bad configuration and undersized generation requests are fatal. Every
//! structural edge case during generation (a node that cannot split, a
//! corridor side with no rooms, a leaf too tight for its margins) is
//! silently skipped.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::grid::TileGrid;
use crate::rng::DeterministicRng;
use crate::types::{GenerationError, Pos, Tile};

new_key_type! {
    pub struct BspNodeKey;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// A carved room, inset inside its leaf rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BspRoom {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub center: Pos,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BspCorridor {
    pub start: Pos,
    pub end: Pos,
    pub width: i32,
    /// Every covered tile, two straight bands forming an L.
    pub tiles: Vec<Pos>,
}

#[derive(Clone, Debug)]
pub struct BspNode {
    pub rect: Rect,
    pub children: Option<[BspNodeKey; 2]>,
    pub room: Option<BspRoom>,
    pub corridor: Option<BspCorridor>,
}

impl BspNode {
    fn leaf(rect: Rect) -> Self {
        Self { rect, children: None, room: None, corridor: None }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Arena-backed split tree. Children are referenced by key, never by
/// nesting, so traversal code stays free of ownership gymnastics.
#[derive(Clone, Debug)]
pub struct BspTree {
    nodes: SlotMap<BspNodeKey, BspNode>,
    root: BspNodeKey,
}

impl BspTree {
    fn with_root(rect: Rect) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(BspNode::leaf(rect));
        Self { nodes, root }
    }

    pub fn root(&self) -> BspNodeKey {
        self.root
    }

    pub fn node(&self, key: BspNodeKey) -> &BspNode {
        &self.nodes[key]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BspConfig {
    /// Minimum carved room dimension; also bounds where splits may land.
    pub min_room_size: i32,
    pub max_room_size: i32,
    /// Corridor band width; the band straddles the centerline by
    /// `width / 2` tiles on each side.
    pub corridor_width: i32,
    /// Lower bound of the random inset between a leaf rectangle and its room.
    pub margin_size: i32,
    /// `[lo, hi]` fractions of the split dimension the offset is drawn from.
    pub split_ratio: [f64; 2],
    pub max_depth: u32,
}

impl Default for BspConfig {
    fn default() -> Self {
        Self {
            min_room_size: 8,
            max_room_size: 20,
            corridor_width: 2,
            margin_size: 1,
            split_ratio: [0.35, 0.65],
            max_depth: 5,
        }
    }
}

impl BspConfig {
    fn validate(&self) -> Result<(), GenerationError> {
        if self.min_room_size < 4 {
            return Err(GenerationError::InvalidConfig(format!(
                "min_room_size must be at least 4, got {}",
                self.min_room_size
            )));
        }
        if !(1..=3).contains(&self.corridor_width) {
            return Err(GenerationError::InvalidConfig(format!(
                "corridor_width must be between 1 and 3, got {}",
                self.corridor_width
            )));
        }
        let [lo, hi] = self.split_ratio;
        if !(0.1..=0.9).contains(&lo) || !(0.1..=0.9).contains(&hi) || lo > hi {
            return Err(GenerationError::InvalidConfig(format!(
                "split_ratio must be an ordered pair within [0.1, 0.9], got [{lo}, {hi}]"
            )));
        }
        if self.margin_size < 0 {
            return Err(GenerationError::InvalidConfig(format!(
                "margin_size must not be negative, got {}",
                self.margin_size
            )));
        }
        Ok(())
    }
}

/// Everything one partitioning run produces.
#[derive(Clone, Debug)]
pub struct BspLayout {
    pub grid: TileGrid,
    pub rooms: Vec<BspRoom>,
    pub corridors: Vec<BspCorridor>,
    pub tree: BspTree,
}

pub struct SpacePartitioner {
    config: BspConfig,
}

impl SpacePartitioner {
    pub fn new(config: BspConfig) -> Result<Self, GenerationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BspConfig {
        &self.config
    }

    /// Partition a `width` x `height` rectangle from the given seed.
    ///
    /// Fails only when the requested area cannot hold two minimum-size
    /// rooms per axis.
    pub fn generate(
        &self,
        width: i32,
        height: i32,
        seed: i64,
    ) -> Result<BspLayout, GenerationError> {
        let minimum = self.config.min_room_size * 2;
        if width < minimum || height < minimum {
            return Err(GenerationError::MapTooSmall { width, height, minimum });
        }

        let mut rng = DeterministicRng::new(seed);
        let mut tree = BspTree::with_root(Rect { x: 0, y: 0, w: width, h: height });
        let root = tree.root;

        self.split_node(&mut tree, root, 0, &mut rng);
        self.carve_rooms(&mut tree, root, &mut rng);
        self.synthesize_corridors(&mut tree, root, &mut rng);

        let mut rooms = Vec::new();
        let mut corridors = Vec::new();
        collect_output(&tree, root, &mut rooms, &mut corridors);

        let grid = rasterize(width, height, &rooms, &corridors);

        Ok(BspLayout { grid, rooms, corridors, tree })
    }

    fn split_node(
        &self,
        tree: &mut BspTree,
        key: BspNodeKey,
        depth: u32,
        rng: &mut DeterministicRng,
    ) {
        if depth >= self.config.max_depth {
            return;
        }

        let rect = tree.nodes[key].rect;
        let min_split_size = self.config.min_room_size * 2 + self.config.corridor_width;
        if rect.w < min_split_size && rect.h < min_split_size {
            return;
        }

        let split_horizontally = self.choose_split_orientation(rect, rng);
        let splittable =
            if split_horizontally { rect.h >= min_split_size } else { rect.w >= min_split_size };
        if !splittable {
            return;
        }

        let dimension = if split_horizontally { rect.h } else { rect.w };
        let ratio_lo = (f64::from(dimension) * self.config.split_ratio[0]).floor() as i32;
        let ratio_hi = (f64::from(dimension) * self.config.split_ratio[1]).floor() as i32;
        let offset_min = ratio_lo.max(self.config.min_room_size);
        let offset_max = ratio_hi.min(dimension - self.config.min_room_size);
        if offset_min >= offset_max {
            return;
        }

        let offset = rng.next_int(offset_min, offset_max);
        let (first, second) = if split_horizontally {
            (
                Rect { x: rect.x, y: rect.y, w: rect.w, h: offset },
                Rect { x: rect.x, y: rect.y + offset, w: rect.w, h: rect.h - offset },
            )
        } else {
            (
                Rect { x: rect.x, y: rect.y, w: offset, h: rect.h },
                Rect { x: rect.x + offset, y: rect.y, w: rect.w - offset, h: rect.h },
            )
        };

        let first_key = tree.nodes.insert(BspNode::leaf(first));
        let second_key = tree.nodes.insert(BspNode::leaf(second));
        tree.nodes[key].children = Some([first_key, second_key]);

        self.split_node(tree, first_key, depth + 1, rng);
        self.split_node(tree, second_key, depth + 1, rng);
    }

    /// Prefer cutting across the longer dimension; draw only for
    /// square-ish rectangles.
    fn choose_split_orientation(&self, rect: Rect, rng: &mut DeterministicRng) -> bool {
        let aspect_ratio = f64::from(rect.w) / f64::from(rect.h);
        if aspect_ratio > 1.5 {
            return false;
        }
        if aspect_ratio < 0.66 {
            return true;
        }
        rng.next_bool(0.5)
    }

    fn carve_rooms(&self, tree: &mut BspTree, key: BspNodeKey, rng: &mut DeterministicRng) {
        match tree.nodes[key].children {
            None => {
                let rect = tree.nodes[key].rect;
                tree.nodes[key].room = self.carve_room(rect, rng);
            }
            Some(children) => {
                for child in children {
                    self.carve_rooms(tree, child, rng);
                }
            }
        }
    }

    fn carve_room(&self, rect: Rect, rng: &mut DeterministicRng) -> Option<BspRoom> {
        let lo = self.config.margin_size;
        // 20% of a side caps the inset; tight leaves collapse the range to
        // [lo, lo] rather than failing.
        let bound = |side: i32| ((f64::from(side) * 0.2).floor() as i32).min(lo * 2).max(lo);

        let margin_left = rng.next_int(lo, bound(rect.w));
        let margin_right = rng.next_int(lo, bound(rect.w));
        let margin_top = rng.next_int(lo, bound(rect.h));
        let margin_bottom = rng.next_int(lo, bound(rect.h));

        let w = rect.w - margin_left - margin_right;
        let h = rect.h - margin_top - margin_bottom;
        if w < self.config.min_room_size || h < self.config.min_room_size {
            return None;
        }

        let x = rect.x + margin_left;
        let y = rect.y + margin_top;
        Some(BspRoom { x, y, w, h, center: Pos { y: y + h / 2, x: x + w / 2 } })
    }

    /// Children first, then connect one random room from each subtree.
    fn synthesize_corridors(
        &self,
        tree: &mut BspTree,
        key: BspNodeKey,
        rng: &mut DeterministicRng,
    ) {
        let Some([first, second]) = tree.nodes[key].children else {
            return;
        };
        self.synthesize_corridors(tree, first, rng);
        self.synthesize_corridors(tree, second, rng);

        let mut first_rooms = Vec::new();
        let mut second_rooms = Vec::new();
        collect_leaf_rooms(tree, first, &mut first_rooms);
        collect_leaf_rooms(tree, second, &mut second_rooms);
        if first_rooms.is_empty() || second_rooms.is_empty() {
            return;
        }

        let from = *rng.choice(&first_rooms);
        let to = *rng.choice(&second_rooms);
        let horizontal_first = rng.next_bool(0.5);
        tree.nodes[key].corridor = Some(BspCorridor {
            start: from.center,
            end: to.center,
            width: self.config.corridor_width,
            tiles: corridor_band_tiles(
                from.center,
                to.center,
                self.config.corridor_width,
                horizontal_first,
            ),
        });
    }
}

/// Full-width L-band between two points: two straight bands, each covering
/// every integer coordinate between the endpoints inclusive and straddling
/// the centerline by `width / 2` on each side.
pub(crate) fn corridor_band_tiles(
    start: Pos,
    end: Pos,
    width: i32,
    horizontal_first: bool,
) -> Vec<Pos> {
    let half_width = width / 2;
    let mut tiles = Vec::new();
    if horizontal_first {
        push_horizontal_band(start.x, end.x, start.y, half_width, &mut tiles);
        push_vertical_band(start.y, end.y, end.x, half_width, &mut tiles);
    } else {
        push_vertical_band(start.y, end.y, start.x, half_width, &mut tiles);
        push_horizontal_band(start.x, end.x, end.y, half_width, &mut tiles);
    }
    tiles
}

fn push_horizontal_band(x1: i32, x2: i32, y: i32, half_width: i32, tiles: &mut Vec<Pos>) {
    for x in x1.min(x2)..=x1.max(x2) {
        for dy in -half_width..=half_width {
            tiles.push(Pos { y: y + dy, x });
        }
    }
}

fn push_vertical_band(y1: i32, y2: i32, x: i32, half_width: i32, tiles: &mut Vec<Pos>) {
    for y in y1.min(y2)..=y1.max(y2) {
        for dx in -half_width..=half_width {
            tiles.push(Pos { y, x: x + dx });
        }
    }
}

fn collect_leaf_rooms(tree: &BspTree, key: BspNodeKey, rooms: &mut Vec<BspRoom>) {
    let node = tree.node(key);
    match node.children {
        None => {
            if let Some(room) = node.room {
                rooms.push(room);
            }
        }
        Some(children) => {
            for child in children {
                collect_leaf_rooms(tree, child, rooms);
            }
        }
    }
}

fn collect_output(
    tree: &BspTree,
    key: BspNodeKey,
    rooms: &mut Vec<BspRoom>,
    corridors: &mut Vec<BspCorridor>,
) {
    let node = tree.node(key);
    match node.children {
        None => {
            if let Some(room) = node.room {
                rooms.push(room);
            }
        }
        Some(children) => {
            if let Some(corridor) = &node.corridor {
                corridors.push(corridor.clone());
            }
            for child in children {
                collect_output(tree, child, rooms, corridors);
            }
        }
    }
}

fn rasterize(width: i32, height: i32, rooms: &[BspRoom], corridors: &[BspCorridor]) -> TileGrid {
    let mut grid = TileGrid::new(width as usize, height as usize);
    grid.fill(Tile::Wall);

    for room in rooms {
        grid.fill_rect(room.x, room.y, room.w, room.h, Tile::Floor);
    }

    let mut corridor_tiles = HashSet::new();
    for corridor in corridors {
        for &tile in &corridor.tiles {
            grid.set_tile(tile.x, tile.y, Tile::Floor);
            corridor_tiles.insert(tile);
        }
    }

    place_doors(&mut grid, rooms, &corridor_tiles);
    grid
}

/// Convert wall tiles on a room's exterior border to doors where they touch
/// corridor floor. Room/room seams never produce doors; only recorded
/// corridor tiles count.
fn place_doors(grid: &mut TileGrid, rooms: &[BspRoom], corridor_tiles: &HashSet<Pos>) {
    for room in rooms {
        for pos in room_border(room) {
            if grid.tile(pos.x, pos.y) != Tile::Wall {
                continue;
            }
            let touches_corridor = pos.neighbors4().into_iter().any(|neighbor| {
                grid.tile(neighbor.x, neighbor.y) == Tile::Floor && corridor_tiles.contains(&neighbor)
            });
            if touches_corridor {
                grid.set_tile(pos.x, pos.y, Tile::Door);
            }
        }
    }
}

/// The one-tile ring just outside a room's rectangle, corners excluded.
fn room_border(room: &BspRoom) -> Vec<Pos> {
    let mut border = Vec::new();
    for x in room.x..room.x + room.w {
        border.push(Pos { y: room.y - 1, x });
        border.push(Pos { y: room.y + room.h, x });
    }
    for y in room.y..room.y + room.h {
        border.push(Pos { y, x: room.x - 1 });
        border.push(Pos { y, x: room.x + room.w });
    }
    border
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, VecDeque};

    use proptest::prelude::*;

    use super::*;

    fn partitioner(min_room_size: i32) -> SpacePartitioner {
        SpacePartitioner::new(BspConfig { min_room_size, ..BspConfig::default() })
            .expect("test config is valid")
    }

    fn assert_children_tile_parent(tree: &BspTree, key: BspNodeKey) {
        let node = tree.node(key);
        let Some([first_key, second_key]) = node.children else {
            return;
        };
        let parent = node.rect;
        let first = tree.node(first_key).rect;
        let second = tree.node(second_key).rect;

        let area = |r: Rect| i64::from(r.w) * i64::from(r.h);
        assert_eq!(
            area(first) + area(second),
            area(parent),
            "child areas must sum to the parent area"
        );

        if first.x == second.x {
            // horizontal split: stacked top/bottom
            assert_eq!((first.x, first.w), (parent.x, parent.w));
            assert_eq!((second.x, second.w), (parent.x, parent.w));
            assert_eq!(first.y, parent.y);
            assert_eq!(second.y, parent.y + first.h);
            assert_eq!(first.h + second.h, parent.h);
        } else {
            // vertical split: side by side
            assert_eq!((first.y, first.h), (parent.y, parent.h));
            assert_eq!((second.y, second.h), (parent.y, parent.h));
            assert_eq!(first.x, parent.x);
            assert_eq!(second.x, parent.x + first.w);
            assert_eq!(first.w + second.w, parent.w);
        }

        assert_children_tile_parent(tree, first_key);
        assert_children_tile_parent(tree, second_key);
    }

    fn assert_rooms_inside_leaves(tree: &BspTree, key: BspNodeKey, min_room_size: i32) {
        let node = tree.node(key);
        match node.children {
            Some(children) => {
                for child in children {
                    assert_rooms_inside_leaves(tree, child, min_room_size);
                }
            }
            None => {
                if let Some(room) = node.room {
                    let rect = node.rect;
                    assert!(room.w >= min_room_size && room.h >= min_room_size);
                    assert!(room.x > rect.x && room.y > rect.y);
                    assert!(room.x + room.w < rect.x + rect.w);
                    assert!(room.y + room.h < rect.y + rect.h);
                }
            }
        }
    }

    fn walkable_route_exists(grid: &TileGrid, start: Pos, goal: Pos) -> bool {
        if start == goal {
            return true;
        }
        let mut open = VecDeque::from([start]);
        let mut seen = BTreeSet::from([start]);
        while let Some(pos) = open.pop_front() {
            for next in pos.neighbors4() {
                if seen.contains(&next) || !grid.is_walkable(next.x, next.y) {
                    continue;
                }
                if next == goal {
                    return true;
                }
                seen.insert(next);
                open.push_back(next);
            }
        }
        false
    }

    #[test]
    fn config_validation_rejects_contract_violations() {
        let too_small = BspConfig { min_room_size: 3, ..BspConfig::default() };
        assert!(matches!(
            SpacePartitioner::new(too_small),
            Err(GenerationError::InvalidConfig(_))
        ));

        for corridor_width in [0, 4] {
            let bad_width = BspConfig { corridor_width, ..BspConfig::default() };
            assert!(matches!(
                SpacePartitioner::new(bad_width),
                Err(GenerationError::InvalidConfig(_))
            ));
        }

        let bad_ratio = BspConfig { split_ratio: [0.05, 0.65], ..BspConfig::default() };
        assert!(matches!(
            SpacePartitioner::new(bad_ratio),
            Err(GenerationError::InvalidConfig(_))
        ));
        let inverted_ratio = BspConfig { split_ratio: [0.7, 0.3], ..BspConfig::default() };
        assert!(matches!(
            SpacePartitioner::new(inverted_ratio),
            Err(GenerationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn minimal_map_produces_a_room_and_undersized_maps_fail() {
        let generated = partitioner(8).generate(16, 16, 12_345).expect("16x16 fits min size 8");
        assert!(!generated.rooms.is_empty());

        let failure = partitioner(8).generate(10, 10, 12_345);
        assert_eq!(
            failure.err(),
            Some(GenerationError::MapTooSmall { width: 10, height: 10, minimum: 16 })
        );
    }

    #[test]
    fn repeated_generation_is_identical_for_the_same_seed() {
        let first = partitioner(6).generate(60, 50, 54_321).unwrap();
        let second = partitioner(6).generate(60, 50, 54_321).unwrap();

        assert_eq!(first.rooms, second.rooms);
        assert_eq!(first.corridors.len(), second.corridors.len());
        assert_eq!(first.corridors, second.corridors);
        assert_eq!(first.grid, second.grid);
    }

    #[test]
    fn different_seeds_change_the_layout() {
        let first = partitioner(6).generate(60, 50, 1).unwrap();
        let second = partitioner(6).generate(60, 50, 2).unwrap();
        assert_ne!(first.rooms, second.rooms);
    }

    #[test]
    fn splits_exactly_tile_the_parent_rectangle() {
        for seed in [7_i64, 99, 54_321, 443_322] {
            let generated = partitioner(6).generate(64, 48, seed).unwrap();
            assert_children_tile_parent(&generated.tree, generated.tree.root());
        }
    }

    #[test]
    fn carved_rooms_respect_margins_and_minimum_size() {
        for seed in [3_i64, 12_345, 777_777] {
            let generated = partitioner(6).generate(72, 56, seed).unwrap();
            assert_rooms_inside_leaves(&generated.tree, generated.tree.root(), 6);
        }
    }

    #[test]
    fn every_door_touches_recorded_corridor_floor() {
        let generated = partitioner(6).generate(60, 50, 2_024).unwrap();
        let corridor_tiles: HashSet<Pos> =
            generated.corridors.iter().flat_map(|c| c.tiles.iter().copied()).collect();

        let mut doors = 0;
        for y in 0..50 {
            for x in 0..60 {
                if generated.grid.tile(x, y) != Tile::Door {
                    continue;
                }
                doors += 1;
                let pos = Pos { y, x };
                assert!(
                    pos.neighbors4().into_iter().any(|n| {
                        generated.grid.tile(n.x, n.y) == Tile::Floor && corridor_tiles.contains(&n)
                    }),
                    "door at {pos:?} has no adjacent corridor floor"
                );
            }
        }
        assert!(doors > 0, "a 60x50 layout should produce at least one door");
    }

    #[test]
    fn all_room_centers_are_mutually_reachable() {
        let generated = partitioner(6).generate(60, 50, 9_876).unwrap();
        assert!(generated.rooms.len() > 1, "layout should hold several rooms");
        let first = generated.rooms[0].center;
        for room in &generated.rooms[1..] {
            assert!(
                walkable_route_exists(&generated.grid, first, room.center),
                "room at {:?} unreachable from {:?}",
                room.center,
                first
            );
        }
    }

    #[test]
    fn corridor_bands_cover_the_full_width() {
        let tiles = corridor_band_tiles(Pos { y: 5, x: 2 }, Pos { y: 9, x: 8 }, 2, true);
        // horizontal leg at y=5 from x=2..=8, vertical leg at x=8 from y=5..=9,
        // each 3 wide for corridor width 2.
        for x in 2..=8 {
            for dy in -1..=1 {
                assert!(tiles.contains(&Pos { y: 5 + dy, x }), "missing band tile at x={x}");
            }
        }
        for y in 5..=9 {
            for dx in -1..=1 {
                assert!(tiles.contains(&Pos { y, x: 8 + dx }), "missing band tile at y={y}");
            }
        }
    }

    #[test]
    fn unsplittable_requests_still_return_a_layout() {
        // 16x16 at min size 8 cannot split (16 < 2*8 + corridor), so the
        // tree stays a single leaf and no corridors exist.
        let generated = partitioner(8).generate(16, 16, 5).unwrap();
        assert!(generated.tree.node(generated.tree.root()).is_leaf());
        assert!(generated.corridors.is_empty());
        assert_eq!(generated.tree.len(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(96))]
        #[test]
        fn partition_invariants_hold_for_random_seeds_and_sizes(
            seed in any::<i64>(),
            width in 30_i32..=90,
            height in 30_i32..=90,
        ) {
            let generated = partitioner(6).generate(width, height, seed).unwrap();
            assert_children_tile_parent(&generated.tree, generated.tree.root());
            assert_rooms_inside_leaves(&generated.tree, generated.tree.root(), 6);
        }

        #[test]
        fn room_centers_stay_connected_for_random_seeds(seed in any::<i64>()) {
            let generated = partitioner(6).generate(60, 50, seed).unwrap();
            if let Some((first, rest)) = generated.rooms.split_first() {
                for room in rest {
                    prop_assert!(
                        walkable_route_exists(&generated.grid, first.center, room.center),
                        "seed {seed}: room at {:?} unreachable",
                        room.center
                    );
                }
            }
        }
    }
}
