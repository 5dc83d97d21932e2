//! District composition: semantic topology, per-room interiors, spatial
//! placement, corridor routing, and final tile compositing, all drawing
//! from one seeded generator in a fixed stage order.

use std::collections::HashMap;
use std::time::Instant;

use crate::graph::LayoutGraph;
use crate::rng::DeterministicRng;
use crate::types::{GenerationError, Pos, Rotation};

pub mod archetype;
pub mod collab;
pub mod model;

mod composite;
mod corridors;
mod graph_build;
mod interiors;
mod placement;
mod validate;

pub use archetype::{DistrictArchetype, DoorKind, RoomType};
pub use model::{
    DistrictCorridor, DistrictMetadata, GeneratedDistrict, PlacementSummary, RoomInstance,
    SeamMetadata, ValidationReport,
};

use collab::{
    GenericVariantResolver, NoSeams, NoTemplates, QuarterTurnTransformer, SeamPainter,
    TemplateProvider, TileTransformer, VariantResolver,
};
use composite::{CompositeInput, composite_district};
use corridors::route_corridors;
use graph_build::build_district_graph;
use interiors::{INTERIOR_MIN_BUILDING_SPAN, generate_interiors};
use placement::{place_rooms, resolve_overlaps};
use validate::validate_district;

#[derive(Clone, Debug)]
pub struct DistrictConfig {
    pub district_width: i32,
    pub district_height: i32,
    /// Overrides the archetype's room mix when set.
    pub room_counts: Option<Vec<(RoomType, usize)>>,
    pub min_room_spacing: i32,
    /// Width of the streets routed between rooms.
    pub corridor_width: i32,
    pub force_iterations: u32,
    pub building_min_size: i32,
    pub building_max_size: i32,
    pub repulsion_force: f64,
    pub attraction_force: f64,
    pub centering_force: f64,
    /// Rotations eligible for room interiors.
    pub rotation_angles: Vec<Rotation>,
    pub overlap_passes: u32,
}

impl Default for DistrictConfig {
    fn default() -> Self {
        Self {
            district_width: 200,
            district_height: 200,
            room_counts: None,
            min_room_spacing: 3,
            corridor_width: 3,
            force_iterations: 100,
            building_min_size: 12,
            building_max_size: 30,
            repulsion_force: 50.0,
            attraction_force: 0.05,
            centering_force: 0.01,
            rotation_angles: Rotation::ALL.to_vec(),
            overlap_passes: 16,
        }
    }
}

impl DistrictConfig {
    fn validate(&self) -> Result<(), GenerationError> {
        if self.district_width < 1 || self.district_height < 1 {
            return Err(GenerationError::InvalidConfig(format!(
                "district size must be positive, got {}x{}",
                self.district_width, self.district_height
            )));
        }
        if self.corridor_width < 1 {
            return Err(GenerationError::InvalidConfig(format!(
                "corridor_width must be at least 1, got {}",
                self.corridor_width
            )));
        }
        if self.min_room_spacing < 0 {
            return Err(GenerationError::InvalidConfig(format!(
                "min_room_spacing must not be negative, got {}",
                self.min_room_spacing
            )));
        }
        if self.force_iterations < 1 {
            return Err(GenerationError::InvalidConfig(
                "force_iterations must be at least 1".to_string(),
            ));
        }
        if self.building_min_size < INTERIOR_MIN_BUILDING_SPAN {
            return Err(GenerationError::InvalidConfig(format!(
                "building_min_size must be at least {INTERIOR_MIN_BUILDING_SPAN} \
                 so building interiors can partition, got {}",
                self.building_min_size
            )));
        }
        if self.building_max_size < self.building_min_size {
            return Err(GenerationError::InvalidConfig(format!(
                "building_max_size ({}) must not be below building_min_size ({})",
                self.building_max_size, self.building_min_size
            )));
        }
        if self.rotation_angles.is_empty() {
            return Err(GenerationError::InvalidConfig(
                "rotation_angles must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Orchestrates the full generation pipeline. Collaborator seams default to
/// inert implementations and can be replaced before generating.
pub struct DistrictComposer {
    config: DistrictConfig,
    templates: Box<dyn TemplateProvider>,
    variants: Box<dyn VariantResolver>,
    transformer: Box<dyn TileTransformer>,
    seam_painter: Box<dyn SeamPainter>,
}

impl DistrictComposer {
    pub fn new(config: DistrictConfig) -> Result<Self, GenerationError> {
        config.validate()?;
        Ok(Self {
            config,
            templates: Box::new(NoTemplates),
            variants: Box::new(GenericVariantResolver),
            transformer: Box::new(QuarterTurnTransformer),
            seam_painter: Box::new(NoSeams),
        })
    }

    pub fn config(&self) -> &DistrictConfig {
        &self.config
    }

    pub fn with_template_provider(mut self, provider: Box<dyn TemplateProvider>) -> Self {
        self.templates = provider;
        self
    }

    pub fn with_variant_resolver(mut self, resolver: Box<dyn VariantResolver>) -> Self {
        self.variants = resolver;
        self
    }

    pub fn with_tile_transformer(mut self, transformer: Box<dyn TileTransformer>) -> Self {
        self.transformer = transformer;
        self
    }

    pub fn with_seam_painter(mut self, painter: Box<dyn SeamPainter>) -> Self {
        self.seam_painter = painter;
        self
    }

    /// Generate a complete district. Never fails: structural edge cases
    /// degrade gracefully and quality problems land in the validation
    /// report.
    pub fn generate(&self, seed: i64, archetype: DistrictArchetype) -> GeneratedDistrict {
        let started = Instant::now();
        let mut rng = DeterministicRng::new(seed);

        let room_counts = self
            .config
            .room_counts
            .clone()
            .unwrap_or_else(|| archetype.room_counts());

        let graph = build_district_graph(&room_counts, &mut rng);
        let interiors = generate_interiors(&graph, &self.config, self.templates.as_ref(), &mut rng);

        let node_ids: Vec<String> = graph.node_ids().map(str::to_string).collect();
        let edges = directed_edge_indices(&graph, &node_ids);
        let positions = place_rooms(&node_ids, &interiors, &edges, &self.config, &mut rng);

        let mut rooms = instantiate_rooms(&graph, interiors, &positions);
        let unresolved_overlaps = resolve_overlaps(&mut rooms, &self.config);

        let corridors = route_corridors(&graph, &rooms, self.config.corridor_width, &mut rng);

        let composite = composite_district(&CompositeInput {
            config: &self.config,
            rooms: &rooms,
            corridors: &corridors,
            variants: self.variants.as_ref(),
            transformer: self.transformer.as_ref(),
            seam_painter: self.seam_painter.as_ref(),
        });

        let validation = validate_district(&graph, &composite.grid);

        let metadata = DistrictMetadata {
            seed,
            archetype,
            generation_time_ms: started.elapsed().as_secs_f64() * 1_000.0,
            room_count: rooms.len(),
            corridor_count: corridors.len(),
            unresolved_overlaps,
            warnings: composite.warnings,
            validation,
            placements: composite.placements,
        };

        GeneratedDistrict { graph, rooms, corridors, grid: composite.grid, metadata }
    }
}

/// Generate a district with the default configuration.
pub fn generate_district(seed: i64, archetype: DistrictArchetype) -> GeneratedDistrict {
    DistrictComposer::new(DistrictConfig::default())
        .expect("default configuration is valid")
        .generate(seed, archetype)
}

/// Directed edges as (from, to) indices into the node order, preserving
/// node and edge insertion order for the force simulation.
fn directed_edge_indices(graph: &LayoutGraph, node_ids: &[String]) -> Vec<(usize, usize)> {
    let index_of: HashMap<&str, usize> =
        node_ids.iter().enumerate().map(|(index, id)| (id.as_str(), index)).collect();
    let mut edges = Vec::new();
    for id in node_ids {
        for edge in graph.edges_from(id) {
            edges.push((index_of[edge.from.as_str()], index_of[edge.to.as_str()]));
        }
    }
    edges
}

fn instantiate_rooms(
    graph: &LayoutGraph,
    mut interiors: HashMap<String, interiors::InteriorPlan>,
    positions: &HashMap<String, Pos>,
) -> Vec<RoomInstance> {
    graph
        .node_ids()
        .map(|id| {
            let plan = interiors.remove(id).expect("every node has an interior plan");
            let position = positions[id];
            RoomInstance {
                id: id.to_string(),
                room_type: plan.room_type,
                x: position.x,
                y: position.y,
                rotation: plan.rotation,
                width: plan.width,
                height: plan.height,
                layout_width: plan.layout_width,
                layout_height: plan.layout_height,
                interior: plan.grid,
            }
        })
        .collect()
}
