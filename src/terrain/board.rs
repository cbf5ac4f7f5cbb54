//! The painted map: terrain, icons, borders and regions behind one API.
//!
//! Every mutation goes through [`MapBoard`], which keeps the region map in
//! step with the terrain map. Out-of-grid coordinates are rejected with
//! [`MapError::OutOfBounds`]; lookups just return `None`.

use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use thiserror::Error;

use super::entities::{PaintTool, TerrainMap, TerrainPalette, TerrainValue};
use super::manifest::ManifestCache;
use super::region_borders::{self, BorderPlacement};
use super::regions::{Region, RegionId, RegionMap, RegionStats};
use crate::edges::{BorderEdge, BorderMap, EdgeKey};
use crate::grid::{GridSize, HexCoord, are_adjacent};

static EMPTY_TERRAIN: TerrainValue = TerrainValue::Default;

/// Errors from board mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapError {
    /// The coordinate lies outside the grid.
    #[error("hex {hex} is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Offending coordinate.
        hex: HexCoord,
        /// Grid columns.
        width: u32,
        /// Grid rows.
        height: u32,
    },
    /// Borders only go between neighbors.
    #[error("hexes {0} and {1} are not adjacent")]
    NotAdjacent(HexCoord, HexCoord),
    /// The operation needs a texture terrain.
    #[error("hex {0} has no texture")]
    NotATexture(HexCoord),
    /// No region with this id.
    #[error("{0} not found")]
    RegionNotFound(RegionId),
    /// A border application is still running.
    #[error("border application already in progress")]
    AlreadyApplying,
}

/// Plain copy of the board contents without derived region data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapSnapshot {
    /// Grid dimensions.
    pub grid: GridSize,
    /// Terrain per hex.
    pub terrain: TerrainMap,
    /// Icon per hex.
    pub icons: HashMap<HexCoord, String>,
    /// Painted borders.
    pub borders: BorderMap,
}

/// Board state shared by input, rendering and UI.
#[derive(Resource, Clone, Debug)]
pub struct MapBoard {
    grid: GridSize,
    terrain: TerrainMap,
    icons: HashMap<HexCoord, String>,
    borders: BorderMap,
    regions: RegionMap,
}

impl MapBoard {
    /// An empty board.
    pub fn new(grid: GridSize) -> Self {
        Self {
            grid,
            terrain: TerrainMap::new(),
            icons: HashMap::new(),
            borders: BorderMap::new(),
            regions: RegionMap::new(),
        }
    }

    /// Restores a board from a snapshot, dropping out-of-grid entries and
    /// rebuilding the regions.
    pub fn from_snapshot(snapshot: MapSnapshot) -> Self {
        let grid = snapshot.grid;
        let mut terrain = snapshot.terrain;
        terrain.retain(|c, v| grid.contains(*c) && *v != TerrainValue::Default);
        let mut icons = snapshot.icons;
        icons.retain(|c, _| grid.contains(*c));
        let mut borders = snapshot.borders;
        borders.retain(|_, b| grid.contains(b.from) && grid.contains(b.to));

        let regions = RegionMap::rebuild(&terrain, grid);
        info!(
            "restored {}x{} board with {} regions",
            grid.width,
            grid.height,
            regions.len()
        );
        Self {
            grid,
            terrain,
            icons,
            borders,
            regions,
        }
    }

    /// Copy of the board contents.
    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            grid: self.grid,
            terrain: self.terrain.clone(),
            icons: self.icons.clone(),
            borders: self.borders.clone(),
        }
    }

    /// Grid dimensions.
    pub fn grid(&self) -> GridSize {
        self.grid
    }

    fn check(&self, hex: HexCoord) -> Result<(), MapError> {
        if self.grid.contains(hex) {
            Ok(())
        } else {
            Err(MapError::OutOfBounds {
                hex,
                width: self.grid.width,
                height: self.grid.height,
            })
        }
    }

    // ── paint input ─────────────────────────────────────────────────

    /// Terrain at `hex`; [`TerrainValue::Default`] when unpainted.
    pub fn terrain_at(&self, hex: HexCoord) -> &TerrainValue {
        self.terrain.get(&hex).unwrap_or(&EMPTY_TERRAIN)
    }

    /// All painted terrain.
    pub fn terrain(&self) -> &TerrainMap {
        &self.terrain
    }

    /// Paints `value` on `hex` and updates its region membership.
    pub fn paint_hex(&mut self, hex: HexCoord, value: TerrainValue) -> Result<(), MapError> {
        self.check(hex)?;
        let base = value.base_terrain();
        if value == TerrainValue::Default {
            self.terrain.remove(&hex);
        } else {
            self.terrain.insert(hex, value);
        }
        self.regions.update_hex(hex, base.as_deref(), self.grid);
        Ok(())
    }

    /// Clears terrain and icon of `hex`.
    pub fn erase_hex(&mut self, hex: HexCoord) -> Result<(), MapError> {
        self.check(hex)?;
        self.icons.remove(&hex);
        self.paint_hex(hex, TerrainValue::Default)
    }

    /// Applies `tool` to a clicked hex. Border tools act on edges only.
    pub fn on_hex_click(&mut self, hex: HexCoord, tool: &PaintTool) -> Result<(), MapError> {
        match tool {
            PaintTool::Terrain(value) => self.paint_hex(hex, value.clone()),
            PaintTool::Icon(icon) => self.set_icon(hex, icon.clone()),
            PaintTool::Eraser => self.erase_hex(hex),
            PaintTool::Border(_) => self.check(hex),
        }
    }

    /// Toggles the border between two neighbors.
    ///
    /// Clicking an edge that already has a border of `color` removes it; any
    /// other click sets the border to `color`. Returns whether a border is
    /// present afterwards.
    pub fn on_edge_click(
        &mut self,
        from: HexCoord,
        to: HexCoord,
        color: [u8; 3],
    ) -> Result<bool, MapError> {
        self.check(from)?;
        self.check(to)?;
        if !are_adjacent(from, to) {
            return Err(MapError::NotAdjacent(from, to));
        }
        let key = EdgeKey::new(from, to);
        if self.borders.get(&key).is_some_and(|b| b.color == color) {
            self.borders.remove(&key);
            return Ok(false);
        }
        self.borders.insert(key, BorderEdge { from, to, color });
        Ok(true)
    }

    /// Rotates the texture on `hex` by `steps` sixth turns.
    pub fn rotate_texture(&mut self, hex: HexCoord, steps: i8) -> Result<u8, MapError> {
        self.check(hex)?;
        let Some(TerrainValue::Texture { rotation, .. }) = self.terrain.get_mut(&hex) else {
            return Err(MapError::NotATexture(hex));
        };
        *rotation = (i16::from(*rotation) + i16::from(steps)).rem_euclid(6) as u8;
        Ok(*rotation)
    }

    /// Places `icon` on `hex`.
    pub fn set_icon(&mut self, hex: HexCoord, icon: String) -> Result<(), MapError> {
        self.check(hex)?;
        self.icons.insert(hex, icon);
        Ok(())
    }

    /// Removes the icon from `hex`.
    pub fn clear_icon(&mut self, hex: HexCoord) -> Result<Option<String>, MapError> {
        self.check(hex)?;
        Ok(self.icons.remove(&hex))
    }

    /// Writes one border placement onto the board.
    pub fn apply_border_placement(&mut self, placement: &BorderPlacement) -> Result<(), MapError> {
        self.paint_hex(placement.hex, placement.terrain_value())
    }

    // ── render queries ──────────────────────────────────────────────

    /// Flat color painted on `hex`, if any.
    pub fn hex_color(&self, hex: HexCoord) -> Option<[u8; 3]> {
        match self.terrain.get(&hex)? {
            TerrainValue::Color { rgb } => Some(*rgb),
            _ => None,
        }
    }

    /// Fill color for `hex`: its flat color, or the swatch of its terrain.
    pub fn hex_background_color(&self, hex: HexCoord, palette: &TerrainPalette) -> Option<[u8; 3]> {
        match self.terrain.get(&hex)? {
            TerrainValue::Default => None,
            TerrainValue::Color { rgb } => Some(*rgb),
            texture => texture.base_terrain().map(|base| palette.swatch(&base)),
        }
    }

    /// Icon on `hex`.
    pub fn hex_icon(&self, hex: HexCoord) -> Option<&str> {
        self.icons.get(&hex).map(String::as_str)
    }

    /// All icons.
    pub fn icons(&self) -> &HashMap<HexCoord, String> {
        &self.icons
    }

    /// All painted borders.
    pub fn borders(&self) -> &BorderMap {
        &self.borders
    }

    // ── region queries ──────────────────────────────────────────────

    /// Region containing `hex`.
    pub fn region_for_hex(&self, hex: HexCoord) -> Option<RegionId> {
        self.regions.region_for_hex(hex)
    }

    /// Region by id.
    pub fn region_data(&self, id: RegionId) -> Option<&Region> {
        self.regions.region(id)
    }

    /// Region summary.
    pub fn region_stats(&self) -> RegionStats {
        self.regions.stats()
    }

    /// The region map.
    pub fn regions(&self) -> &RegionMap {
        &self.regions
    }

    /// Recomputes every region from the terrain.
    pub fn rebuild_regions(&mut self) {
        self.regions = RegionMap::rebuild(&self.terrain, self.grid);
        info!("rebuilt {} regions", self.regions.len());
    }

    /// Whether automatic borders can be applied to region `id`.
    pub fn can_apply_borders(&self, id: RegionId) -> bool {
        self.regions
            .region(id)
            .is_some_and(region_borders::can_apply_borders)
    }

    /// Border placements for region `id`.
    pub fn region_border_placements(
        &self,
        id: RegionId,
        manifests: &mut ManifestCache,
        prefer_special: bool,
    ) -> Result<Vec<BorderPlacement>, MapError> {
        let region = self.regions.region(id).ok_or(MapError::RegionNotFound(id))?;
        Ok(region_borders::create_region_border_placements(
            region,
            &self.terrain,
            self.grid,
            manifests,
            prefer_special,
        ))
    }
}
