//! District topology construction: one node per room instance, a randomized
//! spanning pass rooted at the detective office, then a loop-edge pass.
//!
//! The spanning pass guarantees full connectivity before any spatial work
//! happens; later stages may rely on it as a precondition.

use std::collections::HashMap;

use serde_json::json;

use crate::graph::LayoutGraph;
use crate::rng::DeterministicRng;

use super::archetype::{DoorKind, RoomType};

pub(super) fn build_district_graph(
    room_counts: &[(RoomType, usize)],
    rng: &mut DeterministicRng,
) -> LayoutGraph {
    let mut graph = LayoutGraph::new();
    let mut specs: Vec<(String, RoomType)> = Vec::new();

    let mut node_serial = 0_usize;
    for &(room_type, count) in room_counts {
        for index in 0..count {
            let id = format!("{}_{node_serial}", room_type.as_str());
            node_serial += 1;
            graph
                .add_node(
                    id.clone(),
                    room_type.as_str(),
                    json!({ "room_type": room_type.as_str(), "index": index }),
                )
                .expect("generated node ids are unique");
            specs.push((id, room_type));
        }
    }

    connect_spanning_structure(&mut graph, &specs, rng);
    add_loop_edges(&mut graph, &specs, rng);
    graph
}

/// Randomized-Prim-like pass: repeatedly wire a random already-connected
/// node to a random unconnected one with a bidirectional edge pair.
fn connect_spanning_structure(
    graph: &mut LayoutGraph,
    specs: &[(String, RoomType)],
    rng: &mut DeterministicRng,
) {
    let Some(start) = specs
        .iter()
        .find(|(_, room_type)| *room_type == RoomType::DetectiveOffice)
        .or_else(|| specs.first())
    else {
        return;
    };

    let types: HashMap<&str, RoomType> =
        specs.iter().map(|(id, room_type)| (id.as_str(), *room_type)).collect();

    let mut connected = vec![start.0.clone()];
    let mut remaining: Vec<String> =
        specs.iter().filter(|(id, _)| *id != start.0).map(|(id, _)| id.clone()).collect();

    while !remaining.is_empty() {
        let from_id = rng.choice(&connected).clone();
        let to_index = rng.next_int(0, remaining.len() as i32 - 1) as usize;
        let to_id = remaining[to_index].clone();

        let from_type = types[from_id.as_str()];
        let to_type = types[to_id.as_str()];

        let forward = door_kind(from_type, to_type, rng);
        graph
            .add_edge(&from_id, &to_id, json!({ "door_type": forward.as_str() }))
            .expect("spanning edges reference created nodes");
        let backward = door_kind(to_type, from_type, rng);
        graph
            .add_edge(&to_id, &from_id, json!({ "door_type": backward.as_str() }))
            .expect("spanning edges reference created nodes");

        connected.push(to_id);
        remaining.remove(to_index);
    }
}

/// Attempt `15% x node count` extra shortcut edges between pairs with no
/// existing path. The candidate draws are part of the fixed draw order even
/// when no edge gets added.
fn add_loop_edges(graph: &mut LayoutGraph, specs: &[(String, RoomType)], rng: &mut DeterministicRng) {
    if specs.is_empty() {
        return;
    }
    let ids: Vec<&str> = specs.iter().map(|(id, _)| id.as_str()).collect();
    let extra_edges = (specs.len() as f64 * 0.15).floor() as usize;
    for _ in 0..extra_edges {
        let from = *rng.choice(&ids);
        let to = *rng.choice(&ids);
        if from != to && !graph.has_path(from, to) {
            graph
                .add_edge(from, to, json!({ "door_type": DoorKind::Main.as_str() }))
                .expect("loop edges reference created nodes");
        }
    }
}

/// Streets and alleys stay open; other pairs are locked one time in five.
fn door_kind(from: RoomType, to: RoomType, rng: &mut DeterministicRng) -> DoorKind {
    if from.is_open_passage() || to.is_open_passage() {
        return DoorKind::Main;
    }
    if rng.next_bool(0.2) { DoorKind::Locked } else { DoorKind::Main }
}
