#![warn(missing_docs)]
//! Hex map painter.
//!
//! Paints terrain, colors, icons and borders onto an offset-column grid of
//! flat-top hexes, tracks connected same-terrain regions as the map is
//! edited, and can border a region with side-aware edge textures. The view
//! zooms toward the cursor or pinch center and pans within the grid's
//! overflow.
//!
//! The geometry, hit-testing and region modules are plain functions over
//! values; the plugins wire them into a Bevy app.

pub mod buttons;
pub mod camera;
pub mod edges;
pub mod grid;
pub mod math;
pub mod terrain;
pub mod ui;
pub mod visuals;

use bevy::prelude::*;

/// Whether the canvas takes input or the world inspector is open.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub enum PainterState {
    /// Normal painting.
    #[default]
    Painting,
    /// World inspector open (Tab to toggle).
    Inspecting,
}

/// Per-frame ordering of the painter systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PainterSet {
    /// Zoom, pan and gesture tracking.
    Input,
    /// Board edits from pointer input and border application.
    Paint,
    /// Throttled view geometry refresh.
    Geometry,
    /// Tiles and overlays.
    Draw,
}

/// Plugin configuration for a painter app.
#[derive(Clone, Debug, Default)]
pub struct PainterConfig {
    /// Board and region settings.
    pub terrain: terrain::TerrainConfig,
    /// Zoom/pan settings.
    pub camera: camera::CameraConfig,
    /// Canvas colors.
    pub visuals: visuals::VisualsConfig,
}

/// Adds every painter plugin, state and system set to an app that already
/// has `DefaultPlugins` and the egui plugin.
pub struct PainterPlugin(pub PainterConfig);

impl Plugin for PainterPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<PainterState>()
            .init_state::<PainterState>()
            .configure_sets(
                Update,
                (
                    PainterSet::Input,
                    PainterSet::Paint,
                    PainterSet::Geometry,
                    PainterSet::Draw,
                )
                    .chain(),
            )
            .add_plugins(terrain::TerrainPlugin(self.0.terrain.clone()))
            .add_plugins(camera::CameraPlugin(self.0.camera.clone()))
            .add_plugins(visuals::VisualsPlugin(self.0.visuals.clone()))
            .add_plugins(ui::UiPlugin);
    }
}
