//! Canvas rendering: hex tiles, painted borders, hover feedback and icons.
//!
//! View geometry (radius, hex centers, border segments) is cached in
//! [`ViewGeometry`] and recomputed at most once per frame, only when a
//! redraw was requested through [`RedrawThrottle`]. Tiles are 2D meshes;
//! borders and overlays are gizmos; icons are egui text.

mod entities;
mod systems;

pub use entities::{
    BorderSegment, HexTile, RedrawThrottle, ViewGeometry, canvas_to_world, window_canvas_size,
};

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::PainterSet;

/// Colors and proportions of the canvas.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct VisualsConfig {
    /// Background behind the grid.
    pub clear_color: Color,
    /// Fill of unpainted hexes.
    pub empty_color: Color,
    /// Hex outline color.
    pub outline_color: Color,
    /// Outline of the hex under the cursor.
    pub hover_color: Color,
    /// Sub-hex button outlines.
    pub button_color: Color,
    /// Tile size relative to the hex radius; below 1 leaves a seam.
    pub tile_scale: f32,
    /// Icon font size relative to the hex radius.
    pub icon_scale: f32,
    /// Draw a tick showing each texture's rotation.
    pub show_rotation_marks: bool,
}

impl Default for VisualsConfig {
    fn default() -> Self {
        Self {
            clear_color: Color::srgb(0.09, 0.09, 0.11),
            empty_color: Color::srgb(0.85, 0.85, 0.82),
            outline_color: Color::srgba(0.0, 0.0, 0.0, 0.35),
            hover_color: Color::srgb(1.0, 0.85, 0.2),
            button_color: Color::WHITE,
            tile_scale: 0.97,
            icon_scale: 0.8,
            show_rotation_marks: true,
        }
    }
}

/// Tile meshes, gizmo overlays and icon labels.
pub struct VisualsPlugin(pub VisualsConfig);

impl Plugin for VisualsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<VisualsConfig>()
            .register_type::<HexTile>()
            .insert_resource(self.0.clone())
            .insert_resource(ClearColor(self.0.clear_color))
            .init_resource::<RedrawThrottle>()
            .init_resource::<ViewGeometry>()
            .add_systems(PostStartup, systems::spawn_tiles)
            .add_systems(
                Update,
                systems::refresh_geometry.in_set(PainterSet::Geometry),
            )
            .add_systems(
                Update,
                (
                    systems::sync_tiles,
                    systems::draw_overlay,
                    systems::draw_hover,
                )
                    .in_set(PainterSet::Draw),
            )
            .add_systems(EguiPrimaryContextPass, systems::draw_icon_labels);
    }
}
