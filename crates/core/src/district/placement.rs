//! Spatial placement: force-directed layout followed by bounded overlap
//! resolution.
//!
//! Both loops are fixed-budget. The force simulation always runs its
//! configured iteration count and the overlap pass stops at its pass budget
//! whether or not residual overlap remains; leftovers are counted, not
//! fixed.

use std::collections::HashMap;

use crate::rng::DeterministicRng;
use crate::types::Pos;

use super::DistrictConfig;
use super::interiors::InteriorPlan;
use super::model::RoomInstance;

const DAMPING: f64 = 0.85;
const INITIAL_JITTER: f64 = 30.0;
const DISTANCE_FLOOR: f64 = 0.01;

#[derive(Clone, Copy, Debug, Default)]
struct Vec2 {
    x: f64,
    y: f64,
}

/// Run the force simulation and return each node's integer top-left
/// position, keyed by node id.
///
/// Nodes start jittered around the district center. Every iteration applies
/// pairwise repulsion inside the spacing envelope, spring attraction along
/// each directed edge, and a weak centering pull, then integrates with
/// fixed damping and clamps layout boxes inside the district.
pub(super) fn place_rooms(
    node_ids: &[String],
    interiors: &HashMap<String, InteriorPlan>,
    edges: &[(usize, usize)],
    config: &DistrictConfig,
    rng: &mut DeterministicRng,
) -> HashMap<String, Pos> {
    let center_x = f64::from(config.district_width) / 2.0;
    let center_y = f64::from(config.district_height) / 2.0;

    let extents: Vec<(f64, f64)> = node_ids
        .iter()
        .map(|id| {
            let plan = &interiors[id];
            (f64::from(plan.layout_width), f64::from(plan.layout_height))
        })
        .collect();

    let mut positions: Vec<Vec2> = node_ids
        .iter()
        .map(|_| Vec2 {
            x: center_x + rng.next_float(-INITIAL_JITTER, INITIAL_JITTER),
            y: center_y + rng.next_float(-INITIAL_JITTER, INITIAL_JITTER),
        })
        .collect();
    let mut velocities = vec![Vec2::default(); node_ids.len()];

    for _ in 0..config.force_iterations {
        let mut forces = vec![Vec2::default(); node_ids.len()];

        // Pairwise repulsion inside the spacing envelope.
        for i in 0..node_ids.len() {
            for j in (i + 1)..node_ids.len() {
                let dx = positions[j].x - positions[i].x;
                let dy = positions[j].y - positions[i].y;
                let dist = (dx * dx + dy * dy).sqrt() + DISTANCE_FLOOR;

                let half_extent = |extent: (f64, f64)| extent.0.max(extent.1) / 2.0;
                let min_dist = half_extent(extents[i])
                    + half_extent(extents[j])
                    + f64::from(config.min_room_spacing);
                if dist < min_dist {
                    let force = config.repulsion_force / (dist * dist);
                    let fx = dx / dist * force;
                    let fy = dy / dist * force;
                    forces[i].x -= fx;
                    forces[i].y -= fy;
                    forces[j].x += fx;
                    forces[j].y += fy;
                }
            }
        }

        // Spring attraction along every directed edge.
        for &(from, to) in edges {
            let dx = positions[to].x - positions[from].x;
            let dy = positions[to].y - positions[from].y;
            let dist = (dx * dx + dy * dy).sqrt() + DISTANCE_FLOOR;
            let force = dist * config.attraction_force;
            let fx = dx / dist * force;
            let fy = dy / dist * force;
            forces[from].x += fx;
            forces[from].y += fy;
            forces[to].x -= fx;
            forces[to].y -= fy;
        }

        // Weak pull toward the district center.
        for (index, position) in positions.iter().enumerate() {
            forces[index].x += (center_x - position.x) * config.centering_force;
            forces[index].y += (center_y - position.y) * config.centering_force;
        }

        for index in 0..node_ids.len() {
            let velocity = &mut velocities[index];
            velocity.x = (velocity.x + forces[index].x) * DAMPING;
            velocity.y = (velocity.y + forces[index].y) * DAMPING;

            let position = &mut positions[index];
            position.x += velocity.x;
            position.y += velocity.y;

            let (layout_w, layout_h) = extents[index];
            position.x =
                position.x.min(f64::from(config.district_width) - layout_w / 2.0).max(layout_w / 2.0);
            position.y = position
                .y
                .min(f64::from(config.district_height) - layout_h / 2.0)
                .max(layout_h / 2.0);
        }
    }

    node_ids
        .iter()
        .enumerate()
        .map(|(index, id)| {
            let (layout_w, layout_h) = extents[index];
            let top_left = Pos {
                y: (positions[index].y - layout_h / 2.0).floor() as i32,
                x: (positions[index].x - layout_w / 2.0).floor() as i32,
            };
            (id.clone(), top_left)
        })
        .collect()
}

/// Push overlapping room pairs apart along the smaller-overlap axis, at
/// most `overlap_passes` sweeps. Returns the number of pairs still inside
/// each other's spacing envelope afterwards.
pub(super) fn resolve_overlaps(rooms: &mut [RoomInstance], config: &DistrictConfig) -> usize {
    for _ in 0..config.overlap_passes {
        let mut changed = false;
        for i in 0..rooms.len() {
            for j in (i + 1)..rooms.len() {
                let Some((overlap_x, overlap_y)) = pair_overlap(&rooms[i], &rooms[j], config)
                else {
                    continue;
                };

                let center_i = rooms[i].layout_center();
                let center_j = rooms[j].layout_center();
                if overlap_x <= overlap_y {
                    let push = push_amount(overlap_x);
                    if center_i.x <= center_j.x {
                        rooms[i].x -= push;
                        rooms[j].x += push;
                    } else {
                        rooms[i].x += push;
                        rooms[j].x -= push;
                    }
                } else {
                    let push = push_amount(overlap_y);
                    if center_i.y <= center_j.y {
                        rooms[i].y -= push;
                        rooms[j].y += push;
                    } else {
                        rooms[i].y += push;
                        rooms[j].y -= push;
                    }
                }
                clamp_to_district(&mut rooms[i], config);
                clamp_to_district(&mut rooms[j], config);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let mut unresolved = 0;
    for i in 0..rooms.len() {
        for j in (i + 1)..rooms.len() {
            if pair_overlap(&rooms[i], &rooms[j], config).is_some() {
                unresolved += 1;
            }
        }
    }
    unresolved
}

/// Per-axis penetration depth of the spacing envelopes, when both axes
/// overlap.
fn pair_overlap(a: &RoomInstance, b: &RoomInstance, config: &DistrictConfig) -> Option<(f64, f64)> {
    let spacing = f64::from(config.min_room_spacing);
    let center_a = a.layout_center();
    let center_b = b.layout_center();

    let overlap_x = f64::from(a.layout_width + b.layout_width) / 2.0 + spacing
        - f64::from((center_a.x - center_b.x).abs());
    let overlap_y = f64::from(a.layout_height + b.layout_height) / 2.0 + spacing
        - f64::from((center_a.y - center_b.y).abs());

    (overlap_x > 0.0 && overlap_y > 0.0).then_some((overlap_x, overlap_y))
}

fn push_amount(overlap: f64) -> i32 {
    ((overlap / 2.0).ceil() as i32).max(1)
}

fn clamp_to_district(room: &mut RoomInstance, config: &DistrictConfig) {
    room.x = room.x.clamp(0, (config.district_width - room.layout_width).max(0));
    room.y = room.y.clamp(0, (config.district_height - room.layout_height).max(0));
}

#[cfg(test)]
mod tests {
    use crate::grid::TileGrid;
    use crate::types::Rotation;

    use super::super::archetype::RoomType;
    use super::*;

    fn room(id: &str, x: i32, y: i32, w: i32, h: i32) -> RoomInstance {
        RoomInstance {
            id: id.to_string(),
            room_type: RoomType::Apartment,
            x,
            y,
            rotation: Rotation::R0,
            width: w,
            height: h,
            layout_width: w,
            layout_height: h,
            interior: TileGrid::new(w as usize, h as usize),
        }
    }

    fn plan(w: i32, h: i32) -> InteriorPlan {
        InteriorPlan {
            room_type: RoomType::Street,
            width: w,
            height: h,
            rotation: Rotation::R0,
            layout_width: w,
            layout_height: h,
            grid: TileGrid::new(w as usize, h as usize),
        }
    }

    #[test]
    fn placement_keeps_layout_boxes_inside_the_district() {
        let config = DistrictConfig::default();
        let node_ids: Vec<String> = (0..12).map(|i| format!("room_{i}")).collect();
        let interiors: HashMap<String, InteriorPlan> =
            node_ids.iter().map(|id| (id.clone(), plan(14, 10))).collect();
        let edges: Vec<(usize, usize)> = (1..12).map(|i| (i - 1, i)).collect();

        let mut rng = DeterministicRng::new(606);
        let positions = place_rooms(&node_ids, &interiors, &edges, &config, &mut rng);

        assert_eq!(positions.len(), 12);
        for id in &node_ids {
            let pos = positions[id];
            assert!(pos.x >= 0 && pos.y >= 0, "{id} at {pos:?} escaped the district");
            assert!(pos.x + 14 <= config.district_width);
            assert!(pos.y + 10 <= config.district_height);
        }
    }

    #[test]
    fn placement_is_seed_deterministic() {
        let config = DistrictConfig::default();
        let node_ids: Vec<String> = (0..6).map(|i| format!("room_{i}")).collect();
        let interiors: HashMap<String, InteriorPlan> =
            node_ids.iter().map(|id| (id.clone(), plan(10, 10))).collect();
        let edges = vec![(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)];

        let mut first_rng = DeterministicRng::new(99);
        let first = place_rooms(&node_ids, &interiors, &edges, &config, &mut first_rng);
        let mut second_rng = DeterministicRng::new(99);
        let second = place_rooms(&node_ids, &interiors, &edges, &config, &mut second_rng);
        assert_eq!(first, second);
    }

    #[test]
    fn overlap_resolution_separates_stacked_rooms() {
        let config = DistrictConfig::default();
        let mut rooms =
            vec![room("a", 100, 100, 10, 10), room("b", 102, 101, 10, 10), room("c", 60, 60, 8, 8)];
        let unresolved = resolve_overlaps(&mut rooms, &config);
        assert_eq!(unresolved, 0, "two loose rooms must separate within the pass budget");

        for i in 0..rooms.len() {
            for j in (i + 1)..rooms.len() {
                assert!(
                    pair_overlap(&rooms[i], &rooms[j], &config).is_none(),
                    "{} and {} still overlap",
                    rooms[i].id,
                    rooms[j].id
                );
            }
        }
    }

    #[test]
    fn overlap_resolution_clamps_rooms_to_the_district() {
        let config = DistrictConfig::default();
        let mut rooms = vec![room("a", 0, 0, 20, 20), room("b", 1, 1, 20, 20)];
        resolve_overlaps(&mut rooms, &config);
        for r in &rooms {
            assert!(r.x >= 0 && r.y >= 0);
            assert!(r.x + r.layout_width <= config.district_width);
            assert!(r.y + r.layout_height <= config.district_height);
        }
    }

    #[test]
    fn crowded_layouts_report_unresolved_pairs_instead_of_looping() {
        let mut config = DistrictConfig::default();
        config.district_width = 30;
        config.district_height = 30;
        // Ten 20-tile rooms cannot fit a 30-tile district; the pass budget
        // must expire and report leftovers rather than spin.
        let mut rooms: Vec<RoomInstance> =
            (0..10).map(|i| room(&format!("r{i}"), 5, 5, 20, 20)).collect();
        let unresolved = resolve_overlaps(&mut rooms, &config);
        assert!(unresolved > 0);
    }

    #[test]
    fn resolution_makes_no_change_to_already_spaced_rooms() {
        let config = DistrictConfig::default();
        let mut rooms = vec![room("a", 10, 10, 10, 10), room("b", 60, 60, 10, 10)];
        let before: Vec<(i32, i32)> = rooms.iter().map(|r| (r.x, r.y)).collect();
        let unresolved = resolve_overlaps(&mut rooms, &config);
        let after: Vec<(i32, i32)> = rooms.iter().map(|r| (r.x, r.y)).collect();
        assert_eq!(before, after);
        assert_eq!(unresolved, 0);
    }
}
