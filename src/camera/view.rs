//! Zoom and pan math: zoom-to-cursor, pan limits, and pinch gestures.
//!
//! Free of ECS types so the invariants can be tested directly. The rendered
//! grid is centered on the canvas, shifted by the pan offset, and scales
//! linearly with zoom (see [`crate::math::calculate_hex_radius`]).

use bevy::prelude::*;

use crate::grid::GridSize;
use crate::math::{calculate_hex_radius, grid_pixel_size};

/// Zoom limits and step size.
#[derive(Clone, Debug, Reflect)]
pub struct ZoomSettings {
    /// Zoom at which the whole grid fits; also the minimum zoom.
    pub base_zoom: f32,
    /// Zoom change per wheel notch.
    pub zoom_speed: f32,
    /// How many columns should still fill the canvas at maximum zoom.
    pub target_tiles_at_max_zoom: f32,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            base_zoom: 1.0,
            zoom_speed: 0.1,
            target_tiles_at_max_zoom: 5.0,
        }
    }
}

impl ZoomSettings {
    /// Lowest allowed zoom.
    pub fn min_zoom(&self) -> f32 {
        self.base_zoom
    }

    /// Highest allowed zoom; larger grids may zoom deeper.
    pub fn max_zoom(&self, grid: GridSize) -> f32 {
        (grid.width as f32 / self.target_tiles_at_max_zoom).max(self.base_zoom)
    }

    /// `zoom` clamped into `[min_zoom, max_zoom]`.
    pub fn clamp(&self, zoom: f32, grid: GridSize) -> f32 {
        zoom.clamp(self.min_zoom(), self.max_zoom(grid))
    }

    /// Whether `zoom` sits at the fully zoomed-out level.
    pub fn is_at_min(&self, zoom: f32) -> bool {
        zoom <= self.min_zoom() + f32::EPSILON
    }
}

/// Result of a zoom operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomStep {
    /// New zoom level.
    pub zoom: f32,
    /// New pan offset, already constrained.
    pub pan_offset: Vec2,
}

/// Pan offset that keeps the world point under `focus` fixed on screen when
/// zooming from `old_zoom` to `new_zoom`.
///
/// `world = focus − canvas_center − old_pan`, then
/// `new_pan = focus − canvas_center − world × new_zoom / old_zoom`.
pub fn focus_preserving_pan(
    focus: Vec2,
    canvas_size: Vec2,
    old_pan: Vec2,
    old_zoom: f32,
    new_zoom: f32,
) -> Vec2 {
    let center = canvas_size / 2.0;
    let world = focus - center - old_pan;
    focus - center - world * (new_zoom / old_zoom)
}

/// Clamps `offset` so the grid can be panned only far enough to reveal its
/// overflow plus one hex radius of margin.
///
/// At the minimum zoom panning is disabled entirely and the result is
/// always `(0, 0)`.
pub fn constrain_pan_offset(
    offset: Vec2,
    radius: f32,
    grid: GridSize,
    canvas_size: Vec2,
    zoom_level: f32,
    settings: &ZoomSettings,
) -> Vec2 {
    if settings.is_at_min(zoom_level) {
        return Vec2::ZERO;
    }
    let overflow = (grid_pixel_size(radius, grid) - canvas_size).max(Vec2::ZERO);
    let limit = Vec2::new(
        if overflow.x > 0.0 { overflow.x / 2.0 + radius } else { 0.0 },
        if overflow.y > 0.0 { overflow.y / 2.0 + radius } else { 0.0 },
    );
    offset.clamp(-limit, limit)
}

/// Zooms to `target_zoom` (clamped) around `focus`.
///
/// Landing on the minimum zoom recenters the view with a zero pan; otherwise
/// the focus point is preserved and the pan constrained.
pub fn zoom_to_level(
    current_zoom: f32,
    target_zoom: f32,
    focus: Vec2,
    pan_offset: Vec2,
    canvas_size: Vec2,
    grid: GridSize,
    settings: &ZoomSettings,
) -> ZoomStep {
    let zoom = settings.clamp(target_zoom, grid);
    if settings.is_at_min(zoom) {
        return ZoomStep {
            zoom,
            pan_offset: Vec2::ZERO,
        };
    }

    let pan = focus_preserving_pan(focus, canvas_size, pan_offset, current_zoom, zoom);
    let radius = calculate_hex_radius(canvas_size, grid, zoom);
    ZoomStep {
        zoom,
        pan_offset: constrain_pan_offset(pan, radius, grid, canvas_size, zoom, settings),
    }
}

/// One wheel step toward (`direction > 0`) or away from the cursor.
pub fn calculate_zoom_to_point(
    current_zoom: f32,
    direction: f32,
    cursor: Vec2,
    pan_offset: Vec2,
    canvas_size: Vec2,
    grid: GridSize,
    settings: &ZoomSettings,
) -> ZoomStep {
    let target = current_zoom + direction * settings.zoom_speed;
    zoom_to_level(current_zoom, target, cursor, pan_offset, canvas_size, grid, settings)
}

/// Two-finger pinch in progress, bound to the touches that started it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchGesture {
    fingers: [u64; 2],
    start_distance: f32,
    start_zoom: f32,
}

impl PinchGesture {
    /// Starts a pinch between touches `fingers` at `a` and `b`; `None` when
    /// the fingers coincide.
    pub fn begin(fingers: [u64; 2], a: Vec2, b: Vec2, zoom: f32) -> Option<Self> {
        let start_distance = a.distance(b);
        (start_distance > 1.0).then_some(Self {
            fingers,
            start_distance,
            start_zoom: zoom,
        })
    }

    /// Touch ids of the two fingers driving the pinch.
    pub fn fingers(&self) -> [u64; 2] {
        self.fingers
    }

    /// Unclamped zoom implied by the current finger spread.
    pub fn target_zoom(&self, a: Vec2, b: Vec2) -> f32 {
        self.start_zoom * a.distance(b) / self.start_distance
    }

    /// Point the pinch zooms around.
    pub fn focus(a: Vec2, b: Vec2) -> Vec2 {
        (a + b) / 2.0
    }
}
