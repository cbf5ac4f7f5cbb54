//! Border textures along the perimeter of a region.
//!
//! An edge of a region hex is exposed when its neighbor lies outside the
//! grid or holds a different terrain. Each exposed edge gets a border texture
//! picked from the terrain's manifest for that slot's orientation.

use bevy::prelude::*;

use super::entities::{SIDE_AWARE_TERRAINS, TerrainMap, TerrainValue};
use super::manifest::{ManifestCache, TerrainManifest, TextureAsset};
use super::regions::Region;
use crate::grid::{GridSize, HexCoord, SLOT_ORIENTATIONS, hex_neighbors};

/// A region hex and its exposed neighbor slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExposedHex {
    /// The region hex.
    pub hex: HexCoord,
    /// Exposed slots, ascending.
    pub slots: Vec<usize>,
}

/// One pending border texture write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BorderPlacement {
    /// Hex that receives the texture.
    pub hex: HexCoord,
    /// Neighbor slot of the exposed edge.
    pub slot: usize,
    /// Texture name.
    pub texture: String,
    /// Texture path.
    pub path: String,
    /// Rotation in sixth turns.
    pub rotation: u8,
    /// Horizontal mirror.
    pub flipped: bool,
}

impl BorderPlacement {
    /// The terrain value this placement paints.
    pub fn terrain_value(&self) -> TerrainValue {
        TerrainValue::Texture {
            name: self.texture.clone(),
            path: Some(self.path.clone()),
            rotation: self.rotation,
            flipped: self.flipped,
        }
    }
}

/// Whether automatic borders apply to `region`.
///
/// Needs at least two hexes and a terrain with side-aware textures.
pub fn can_apply_borders(region: &Region) -> bool {
    region.hexes.len() >= 2 && SIDE_AWARE_TERRAINS.contains(&region.terrain_type.as_str())
}

/// Region hexes with at least one exposed edge, in row-major order.
pub fn detect_region_border_hexes(
    region: &Region,
    terrain: &TerrainMap,
    grid: GridSize,
) -> Vec<ExposedHex> {
    let mut hexes: Vec<HexCoord> = region.hexes.iter().copied().collect();
    hexes.sort_unstable();

    hexes
        .into_iter()
        .filter_map(|hex| {
            let slots: Vec<usize> = hex_neighbors(hex)
                .into_iter()
                .enumerate()
                .filter(|(_, n)| {
                    !grid.contains(*n)
                        || terrain.get(n).and_then(TerrainValue::base_terrain).as_deref()
                            != Some(region.terrain_type.as_str())
                })
                .map(|(slot, _)| slot)
                .collect();
            (!slots.is_empty()).then_some(ExposedHex { hex, slots })
        })
        .collect()
}

/// Picks a border texture for `slot` of `hex`.
///
/// Exact `(angle, side)` matches come first, narrowed to special variants
/// when `prefer_special` is set and one exists, otherwise to regular
/// variants. Without an exact match any texture with the same side tag is
/// used. The variant is chosen deterministically from the hex and slot.
pub fn select_border_texture<'a>(
    manifest: &'a TerrainManifest,
    hex: HexCoord,
    slot: usize,
    prefer_special: bool,
) -> Option<&'a TextureAsset> {
    let orientation = SLOT_ORIENTATIONS.get(slot)?;
    let exact: Vec<&TextureAsset> = manifest.exact(orientation.angle, orientation.side).collect();

    let (special, regular): (Vec<&TextureAsset>, Vec<&TextureAsset>) =
        exact.iter().copied().partition(|t| t.special.is_some());
    let candidates = match (prefer_special, special.is_empty(), regular.is_empty()) {
        (true, false, _) => special,
        (_, _, false) => regular,
        _ => exact,
    };
    let candidates = if candidates.is_empty() {
        manifest.with_side(orientation.side).collect()
    } else {
        candidates
    };

    if candidates.is_empty() {
        return None;
    }
    let pick = (hex.row.unsigned_abs() as usize * 31 + hex.col.unsigned_abs() as usize * 17 + slot)
        % candidates.len();
    candidates.get(pick).copied()
}

/// Border placements for every exposed edge of `region`.
///
/// Edges without a usable texture are skipped. Placements come out in
/// row-major hex order, then slot order.
pub fn create_region_border_placements(
    region: &Region,
    terrain: &TerrainMap,
    grid: GridSize,
    manifests: &mut ManifestCache,
    prefer_special: bool,
) -> Vec<BorderPlacement> {
    let Some(manifest) = manifests.load(&region.terrain_type) else {
        debug!("no border manifest for {}", region.terrain_type);
        return Vec::new();
    };

    let mut placements = Vec::new();
    for exposed in detect_region_border_hexes(region, terrain, grid) {
        for slot in exposed.slots {
            let Some(texture) = select_border_texture(manifest, exposed.hex, slot, prefer_special)
            else {
                debug!("no border texture for {} slot {slot}", exposed.hex);
                continue;
            };
            let orientation = SLOT_ORIENTATIONS[slot];
            placements.push(BorderPlacement {
                hex: exposed.hex,
                slot,
                texture: texture.name.clone(),
                path: texture.path(),
                rotation: (orientation.angle / 60) as u8,
                flipped: orientation.flipped,
            });
        }
    }
    placements
}
