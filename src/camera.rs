//! Zoom/pan controller for the painter canvas.
//!
//! Wheel zoom keeps the point under the cursor fixed, pinch zoom does the same
//! around the pinch center, and drag panning is limited to the grid overflow.
//! The math lives in [`view`]; this module wires it to input.

mod entities;
mod systems;
pub mod view;

pub use entities::{GestureState, PainterCamera, PinchUpdate, ViewState};

use bevy::prelude::*;

use crate::PainterSet;
use view::ZoomSettings;

/// Per-plugin configuration for the zoom/pan controller.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct CameraConfig {
    /// Zoom limits and step size.
    pub zoom: ZoomSettings,
    /// Mouse button that drags the view.
    pub pan_button: MouseButton,
    /// Pixel-unit scroll deltas per wheel line (touchpads report pixels).
    pub scroll_pixels_per_line: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom: ZoomSettings::default(),
            pan_button: MouseButton::Right,
            scroll_pixels_per_line: 40.0,
        }
    }
}

/// Zoom/pan input handling and the view transform resources.
pub struct CameraPlugin(pub CameraConfig);

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<CameraConfig>()
            .register_type::<ViewState>()
            .register_type::<PainterCamera>()
            .insert_resource(self.0.clone())
            .init_resource::<ViewState>()
            .init_resource::<GestureState>()
            .add_systems(Startup, systems::spawn_camera)
            .add_systems(
                Update,
                (
                    systems::pinch_zoom,
                    systems::zoom_on_scroll,
                    systems::pan_on_drag,
                )
                    .chain()
                    .in_set(PainterSet::Input),
            );
    }
}
