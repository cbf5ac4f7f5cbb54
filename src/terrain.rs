//! The painted map and the region engine behind it.
//!
//! [`MapBoard`] owns terrain, icons, borders and regions. This plugin adds
//! the board as a resource, seeds it from noise when asked, turns pointer
//! input into paint operations and runs paced region border application.

mod application;
mod board;
mod entities;
pub mod manifest;
pub mod region_borders;
pub mod regions;
mod startup_systems;
mod systems;

pub use application::BorderApplication;
pub use board::{MapBoard, MapError, MapSnapshot};
pub use entities::{
    ActiveTool, DragState, PaintTool, SIDE_AWARE_TERRAINS, TerrainMap, TerrainPalette,
    TerrainValue, base_terrain_name,
};
pub use manifest::ManifestCache;
pub use regions::{Region, RegionId, RegionMap, RegionStats};
pub use startup_systems::noise_terrain;

use std::time::Duration;

use bevy::prelude::*;

use crate::grid::GridSize;
use crate::{PainterSet, PainterState};

/// Nested configuration for the map board.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct TerrainConfig {
    /// Grid size and starter map.
    pub grid: GridSettings,
    /// Region border textures.
    pub borders: BorderSettings,
    /// Palette contents.
    pub palette: TerrainPalette,
    /// Key that exposes the sub-hex buttons while held.
    pub button_modifier: KeyCode,
}

/// Grid dimensions and noise parameters for the starter map.
#[derive(Clone, Debug, Reflect)]
pub struct GridSettings {
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// Seed for the starter map; `None` starts empty.
    pub noise_seed: Option<u32>,
    /// Octaves of the starter-map noise.
    pub noise_octaves: usize,
    /// Spatial scale divisor for noise sampling, in hexes.
    pub noise_scale: f64,
}

/// Region border settings.
#[derive(Clone, Debug, Reflect)]
pub struct BorderSettings {
    /// Pause between two border textures.
    pub apply_delay_secs: f32,
    /// Use special texture variants where the manifest has them.
    pub prefer_special: bool,
    /// Initial edge color of the border tool.
    pub default_color: [u8; 3],
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            grid: GridSettings {
                width: 20,
                height: 15,
                noise_seed: None,
                noise_octaves: 4,
                noise_scale: 8.0,
            },
            borders: BorderSettings {
                apply_delay_secs: 0.05,
                prefer_special: false,
                default_color: [20, 20, 20],
            },
            palette: TerrainPalette::default(),
            button_modifier: KeyCode::ShiftLeft,
        }
    }
}

impl TerrainConfig {
    /// Grid size from the settings.
    pub fn grid_size(&self) -> GridSize {
        GridSize::new(self.grid.width, self.grid.height)
    }
}

/// Request to border a region with textures.
#[derive(Message, Clone, Copy, Debug)]
pub struct ApplyRegionBorders(pub RegionId);

/// Map board, paint input and region border application.
pub struct TerrainPlugin(pub TerrainConfig);

impl Plugin for TerrainPlugin {
    fn build(&self, app: &mut App) {
        let delay = Duration::from_secs_f32(self.0.borders.apply_delay_secs.max(0.0));
        app.register_type::<TerrainConfig>()
            .insert_resource(self.0.clone())
            .insert_resource(MapBoard::new(self.0.grid_size()))
            .insert_resource(BorderApplication::new(delay))
            .init_resource::<ManifestCache>()
            .init_resource::<ActiveTool>()
            .init_resource::<DragState>()
            .add_message::<ApplyRegionBorders>()
            .add_systems(Startup, startup_systems::seed_board)
            .add_systems(
                Update,
                systems::paint_input
                    .in_set(PainterSet::Paint)
                    .run_if(in_state(PainterState::Painting)),
            )
            .add_systems(
                Update,
                (
                    systems::start_border_application,
                    systems::tick_border_application,
                )
                    .chain()
                    .after(systems::paint_input)
                    .in_set(PainterSet::Paint),
            );
    }
}
