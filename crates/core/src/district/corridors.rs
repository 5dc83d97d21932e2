//! Corridor routing between graph-adjacent rooms.

use std::collections::HashMap;

use crate::bsp::corridor_band_tiles;
use crate::graph::LayoutGraph;
use crate::rng::DeterministicRng;

use super::model::{DistrictCorridor, RoomInstance};

/// One L-shaped corridor per directed edge, connecting the rooms' layout
/// box centers in district coordinates. The bend direction is drawn per
/// edge.
pub(super) fn route_corridors(
    graph: &LayoutGraph,
    rooms: &[RoomInstance],
    corridor_width: i32,
    rng: &mut DeterministicRng,
) -> Vec<DistrictCorridor> {
    let rooms_by_id: HashMap<&str, &RoomInstance> =
        rooms.iter().map(|room| (room.id.as_str(), room)).collect();

    let mut corridors = Vec::new();
    for from_id in graph.node_ids() {
        for edge in graph.edges_from(from_id) {
            let (Some(from_room), Some(to_room)) =
                (rooms_by_id.get(edge.from.as_str()), rooms_by_id.get(edge.to.as_str()))
            else {
                continue;
            };

            let start = from_room.layout_center();
            let end = to_room.layout_center();
            let horizontal_first = rng.next_bool(0.5);
            corridors.push(DistrictCorridor {
                from: edge.from.clone(),
                to: edge.to.clone(),
                tiles: corridor_band_tiles(start, end, corridor_width, horizontal_first),
            });
        }
    }
    corridors
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::grid::TileGrid;
    use crate::types::{Pos, Rotation};

    use super::super::archetype::RoomType;
    use super::*;

    fn room(id: &str, x: i32, y: i32, w: i32, h: i32) -> RoomInstance {
        RoomInstance {
            id: id.to_string(),
            room_type: RoomType::Street,
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

    #[test]
    fn each_directed_edge_gets_one_corridor_touching_both_centers() {
        let mut graph = LayoutGraph::new();
        graph.add_node("a", "street", json!({})).unwrap();
        graph.add_node("b", "street", json!({})).unwrap();
        graph.add_edge("a", "b", json!({})).unwrap();
        graph.add_edge("b", "a", json!({})).unwrap();

        let rooms = vec![room("a", 10, 10, 8, 8), room("b", 40, 30, 8, 8)];
        let mut rng = DeterministicRng::new(5);
        let corridors = route_corridors(&graph, &rooms, 3, &mut rng);

        assert_eq!(corridors.len(), 2);
        for corridor in &corridors {
            let start = Pos { y: 14, x: 14 };
            let end = Pos { y: 34, x: 44 };
            assert!(corridor.tiles.contains(&start), "corridor must cover a's center");
            assert!(corridor.tiles.contains(&end), "corridor must cover b's center");
        }
    }

    #[test]
    fn edges_to_unplaced_rooms_are_skipped() {
        let mut graph = LayoutGraph::new();
        graph.add_node("a", "street", json!({})).unwrap();
        graph.add_node("ghost", "street", json!({})).unwrap();
        graph.add_edge("a", "ghost", json!({})).unwrap();

        let rooms = vec![room("a", 0, 0, 8, 8)];
        let mut rng = DeterministicRng::new(5);
        let corridors = route_corridors(&graph, &rooms, 3, &mut rng);
        assert!(corridors.is_empty());
    }

    #[test]
    fn routing_is_seed_deterministic() {
        let mut graph = LayoutGraph::new();
        for id in ["a", "b", "c"] {
            graph.add_node(id, "street", json!({})).unwrap();
        }
        graph.add_edge("a", "b", json!({})).unwrap();
        graph.add_edge("b", "c", json!({})).unwrap();
        graph.add_edge("c", "a", json!({})).unwrap();

        let rooms =
            vec![room("a", 5, 5, 10, 10), room("b", 50, 5, 10, 10), room("c", 25, 60, 10, 10)];
        let mut first_rng = DeterministicRng::new(21);
        let first = route_corridors(&graph, &rooms, 3, &mut first_rng);
        let mut second_rng = DeterministicRng::new(21);
        let second = route_corridors(&graph, &rooms, 3, &mut second_rng);
        assert_eq!(first, second);
    }
}
