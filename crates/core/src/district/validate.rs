//! Structural validation of a composited district. Findings are reported,
//! never thrown; batch tooling decides what to do with flawed seeds.

use crate::graph::LayoutGraph;
use crate::grid::TileGrid;

use super::archetype::RoomType;
use super::model::ValidationReport;

const RECOMMENDED_MIN_ROOMS: usize = 20;
const RECOMMENDED_MAX_ROOMS: usize = 100;

pub(super) fn validate_district(graph: &LayoutGraph, grid: &TileGrid) -> ValidationReport {
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    if !graph.is_fully_connected(None) {
        issues.push("graph is not fully connected".to_string());
    }

    let room_count = graph.node_count();
    if room_count > RECOMMENDED_MAX_ROOMS {
        warnings.push(format!(
            "room count ({room_count}) exceeds recommended limit ({RECOMMENDED_MAX_ROOMS})"
        ));
    }
    if room_count < RECOMMENDED_MIN_ROOMS {
        warnings.push(format!(
            "room count ({room_count}) is below recommended minimum ({RECOMMENDED_MIN_ROOMS})"
        ));
    }

    let regions = grid.find_connected_regions();
    if regions.is_empty() {
        issues.push("no walkable tiles found".to_string());
    } else if regions.len() > 1 {
        warnings.push(format!("multiple disconnected walkable regions found: {}", regions.len()));
    }

    if graph.nodes_by_type(RoomType::DetectiveOffice.as_str()).is_empty() {
        warnings.push("no detective office found".to_string());
    }

    ValidationReport { valid: issues.is_empty(), issues, warnings }
}
