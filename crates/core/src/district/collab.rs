//! Collaborator seams of the district composer.
//!
//! Authored templates, variant resolution, tile transformation, and seam
//! painting are supplied from outside the core. Each seam is a trait with a
//! first-class default implementation, so "no override available" is an
//! ordinary branch instead of an exception path. The composer treats a
//! resolver or transformer error as recoverable: it records a warning and
//! falls back to the untransformed interior.

use serde_json::Value;

use crate::grid::TileGrid;
use crate::types::{Rotation, Tile};

use super::archetype::RoomType;
use super::model::{DistrictCorridor, PlacementSummary, SeamMetadata};

/// Opaque failure from an external collaborator. The pipeline only ever
/// logs the message; it never branches on it.
#[derive(Clone, Debug, PartialEq)]
pub struct CollaboratorError {
    pub message: String,
}

impl CollaboratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// A pre-built interior delivered by a template provider.
#[derive(Clone, Debug)]
pub struct AuthoredTemplate {
    pub grid: TileGrid,
    pub metadata: Value,
}

/// Supplies authored interiors for semantic room types. Returning `None`
/// sends the room down the procedural path.
pub trait TemplateProvider {
    fn template_for(&self, room_type: RoomType) -> Option<AuthoredTemplate>;
}

/// Default provider with no authored content.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTemplates;

impl TemplateProvider for NoTemplates {
    fn template_for(&self, _room_type: RoomType) -> Option<AuthoredTemplate> {
        None
    }
}

pub struct VariantRequest<'a> {
    pub room_id: &'a str,
    pub room_type: RoomType,
    pub grid: &'a TileGrid,
    pub rotation: Rotation,
}

/// Outcome of variant resolution: a possibly substituted interior, the
/// rotation actually applied, door seams, and a strategy tag.
#[derive(Clone, Debug)]
pub struct VariantResolution {
    pub grid: TileGrid,
    pub rotation: Rotation,
    pub variant_id: Option<String>,
    pub strategy: String,
    pub seams: Vec<SeamMetadata>,
}

/// Picks a rotation-specific interior variant for a room, when one exists.
/// Must tolerate rotations with no bespoke variant.
pub trait VariantResolver {
    fn resolve(&self, request: &VariantRequest<'_>) -> Result<VariantResolution, CollaboratorError>;
}

/// Generic-rotation fallback: keep the base interior and let the tile
/// transformer do the turning.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenericVariantResolver;

impl VariantResolver for GenericVariantResolver {
    fn resolve(
        &self,
        request: &VariantRequest<'_>,
    ) -> Result<VariantResolution, CollaboratorError> {
        Ok(VariantResolution {
            grid: request.grid.clone(),
            rotation: request.rotation,
            variant_id: None,
            strategy: "rotate".to_string(),
            seams: Vec::new(),
        })
    }
}

/// An interior expressed in the rotated frame as a flat tile list.
#[derive(Clone, Debug)]
pub struct TransformedTiles {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<(i32, i32, Tile)>,
}

pub trait TileTransformer {
    fn transform(
        &self,
        grid: &TileGrid,
        rotation: Rotation,
    ) -> Result<TransformedTiles, CollaboratorError>;
}

/// Default transformer: quarter-turn coordinate remap with an extent swap
/// on 90 and 270 degrees.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuarterTurnTransformer;

impl TileTransformer for QuarterTurnTransformer {
    fn transform(
        &self,
        grid: &TileGrid,
        rotation: Rotation,
    ) -> Result<TransformedTiles, CollaboratorError> {
        let w = grid.width() as i32;
        let h = grid.height() as i32;
        let (out_w, out_h) = if rotation.swaps_extents() { (h, w) } else { (w, h) };

        let mut tiles = Vec::with_capacity((w * h) as usize);
        for y in 0..h {
            for x in 0..w {
                let (tx, ty) = match rotation {
                    Rotation::R0 => (x, y),
                    Rotation::R90 => (h - 1 - y, x),
                    Rotation::R180 => (w - 1 - x, h - 1 - y),
                    Rotation::R270 => (y, w - 1 - x),
                };
                tiles.push((tx, ty, grid.tile(x, y)));
            }
        }

        Ok(TransformedTiles { width: out_w, height: out_h, tiles })
    }
}

/// Everything a seam painter may consult when upgrading wall tiles to doors
/// along corridors.
pub struct SeamContext<'a> {
    pub corridors: &'a [DistrictCorridor],
    pub placements: &'a [PlacementSummary],
}

/// May upgrade selected wall tiles adjoining corridors to doors. Painting
/// nothing is a valid response, and implementations must swallow malformed
/// input rather than fail the pipeline.
pub trait SeamPainter {
    fn paint(&self, grid: &mut TileGrid, context: &SeamContext<'_>);
}

/// Default painter: leaves the grid untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSeams;

impl SeamPainter for NoSeams {
    fn paint(&self, _grid: &mut TileGrid, _context: &SeamContext<'_>) {}
}
